mod controller;
mod line;
mod set;
mod store;

pub use controller::{Access, Cache};
pub use line::CacheLine;
pub use set::CacheSet;
pub use store::CacheStore;
