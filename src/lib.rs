//! A write-back, LRU set-associative cache in front of a word-addressed memory, driven by a
//! small LC-2K processor.

pub mod cache;
pub mod commons;
pub mod events;
pub mod instr;
pub mod memory;
pub mod processor;
pub mod utils;

pub use cache::{Access, Cache};
pub use commons::*;
pub use events::*;
pub use memory::{Memory, MemoryPort};
