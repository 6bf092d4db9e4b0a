use std::fmt;

use crate::commons::Addr;

// data transfers

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferKind {
    CacheToProcessor,   // load or fetch served by the cache
    ProcessorToCache,   // store into the cache
    MemoryToCache,      // block fill
    CacheToMemory,      // dirty write-back
    CacheToNowhere,     // clean eviction
}

/// One movement of `size` words starting at `addr`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub addr: Addr,
    pub size: u32,
    pub kind: TransferKind,
}

impl Transfer {
    pub fn new(addr: Addr, size: u32, kind: TransferKind) -> Self {
        Transfer { addr, size, kind }
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let route = match self.kind {
            TransferKind::CacheToProcessor => "from the cache to the processor",
            TransferKind::ProcessorToCache => "from the processor to the cache",
            TransferKind::MemoryToCache => "from the memory to the cache",
            TransferKind::CacheToMemory => "from the cache to the memory",
            TransferKind::CacheToNowhere => "from the cache to nowhere",
        };
        let last = self.addr.0 + self.size - 1;
        write!(f, "transferring word [{}-{}] {}", self.addr, last, route)
    }
}

/// Receives every transfer the cache performs. Purely observational.
pub trait EventLog {
    fn record(&mut self, transfer: Transfer);
}

/// Prints each transfer on its own line of stdout.
pub struct PrintLog;

impl EventLog for PrintLog {
    fn record(&mut self, transfer: Transfer) {
        println!("{}", transfer);
    }
}

impl EventLog for Vec<Transfer> {
    fn record(&mut self, transfer: Transfer) {
        self.push(transfer);
    }
}

impl EventLog for () {
    fn record(&mut self, _: Transfer) {}
}

// statistics

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub hits: u64,
    pub misses: u64,
}

impl Stats {
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn hit_rate(&self) -> f64 {
        match self.accesses() {
            0 => 0.0,
            n => self.hits as f64 / n as f64,
        }
    }
}
