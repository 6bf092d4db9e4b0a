use log::{debug, info, trace, warn};

use crate::cache::{CacheLine, CacheSet, CacheStore};
use crate::commons::{Addr, CacheSpec, ConfigError, Pos, Word};
use crate::events::{EventLog, Stats, Transfer, TransferKind};
use crate::memory::MemoryPort;

/// A processor-visible access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Fetch,
    Load,
    Store(Word),
}

/// Write-back, write-allocate, LRU set-associative cache.
///
/// The cache never owns memory: every access borrows the [`MemoryPort`] it fills from and
/// writes back to, along with the [`EventLog`] that observes each transfer. Before the cache
/// is discarded it must be [flushed](Cache::flush), otherwise stores still sitting in dirty
/// lines never reach memory.
pub struct Cache {
    spec: CacheSpec,
    store: CacheStore,
}

impl Cache {
    pub fn new(spec: CacheSpec) -> Result<Self, ConfigError> {
        spec.validate()?;
        Ok(Cache {
            spec,
            store: CacheStore::new(&spec),
        })
    }

    pub fn spec(&self) -> &CacheSpec {
        &self.spec
    }

    pub fn stats(&self) -> Stats {
        self.store.stats()
    }

    pub fn sets(&self) -> &[CacheSet] {
        self.store.sets()
    }

    pub fn line(&self, set: usize, way: usize) -> &CacheLine {
        self.store.set(set).line(way)
    }

    pub fn dirty_lines(&self) -> usize {
        self.lines().filter(|l| l.dirty).count()
    }

    fn lines(&self) -> impl Iterator<Item = &CacheLine> {
        self.store.sets().iter().flat_map(|s| s.lines())
    }

    // processor requests

    pub fn fetch<M, L>(&mut self, addr: Addr, mem: &mut M, log: &mut L) -> Word
    where
        M: MemoryPort + ?Sized,
        L: EventLog + ?Sized,
    {
        self.access(addr, Access::Fetch, mem, log)
    }

    pub fn load<M, L>(&mut self, addr: Addr, mem: &mut M, log: &mut L) -> Word
    where
        M: MemoryPort + ?Sized,
        L: EventLog + ?Sized,
    {
        self.access(addr, Access::Load, mem, log)
    }

    pub fn store<M, L>(&mut self, addr: Addr, word: Word, mem: &mut M, log: &mut L)
    where
        M: MemoryPort + ?Sized,
        L: EventLog + ?Sized,
    {
        self.access(addr, Access::Store(word), mem, log);
    }

    /// Performs one processor access and returns the word read, or the word stored.
    ///
    /// On a miss the LRU way of the set is evicted (written back if dirty), the requested
    /// block is filled from `mem`, and the access is then served from the new line.
    pub fn access<M, L>(&mut self, addr: Addr, req: Access, mem: &mut M, log: &mut L) -> Word
    where
        M: MemoryPort + ?Sized,
        L: EventLog + ?Sized,
    {
        let pos = addr.pos(&self.spec);
        let way = match self.store.lookup(pos.set, pos.tag) {
            Some(way) => {
                trace!("Cache hit (addr={}, set={}, way={})", addr, pos.set, way);
                way
            }
            None => {
                trace!("Cache miss (addr={}, set={})", addr, pos.set);
                let way = self.store.set(pos.set).victim();
                self.evict(pos.set, way, mem, log);
                self.fill(pos, way, mem, log);
                way
            }
        };
        self.store.set_mut(pos.set).touch(way);
        self.serve(addr, pos, way, req, log)
    }

    // helper functions

    fn serve<L>(&mut self, addr: Addr, pos: Pos, way: usize, req: Access, log: &mut L) -> Word
    where
        L: EventLog + ?Sized,
    {
        match req {
            Access::Fetch | Access::Load => {
                log.record(Transfer::new(addr, 1, TransferKind::CacheToProcessor));
                self.store.read(pos.set, way, pos.offset)
            }
            Access::Store(word) => {
                log.record(Transfer::new(addr, 1, TransferKind::ProcessorToCache));
                self.store.write(pos.set, way, pos.offset, word);
                word
            }
        }
    }

    /// Empties a way: dirty data goes back to memory, clean data is dropped.
    fn evict<M, L>(&mut self, set: usize, way: usize, mem: &mut M, log: &mut L)
    where
        M: MemoryPort + ?Sized,
        L: EventLog + ?Sized,
    {
        let spec = self.spec;
        let line = self.store.set_mut(set).line_mut(way);
        if line.dirty {
            write_back(line, set, &spec, mem, log);
        } else if line.valid {
            let base = Addr::from_pos(line.tag, set, &spec);
            debug!("Discarding clean block (base={}, set={}, way={})", base, set, way);
            log.record(Transfer::new(base, spec.block_size, TransferKind::CacheToNowhere));
        }
    }

    fn fill<M, L>(&mut self, pos: Pos, way: usize, mem: &mut M, log: &mut L)
    where
        M: MemoryPort + ?Sized,
        L: EventLog + ?Sized,
    {
        let base = Addr::from_pos(pos.tag, pos.set, &self.spec);
        debug!("Filling block (base={}, set={}, way={})", base, pos.set, way);
        let data = (0..self.spec.block_size)
            .map(|i| mem.read_word(base.offset(i)))
            .collect::<Vec<_>>();
        log.record(Transfer::new(base, self.spec.block_size, TransferKind::MemoryToCache));
        self.store.install(pos.set, way, pos.tag, &data);
    }

    // shutdown

    /// Writes every dirty line back to memory, then invalidates the whole cache.
    pub fn flush<M, L>(&mut self, mem: &mut M, log: &mut L)
    where
        M: MemoryPort + ?Sized,
        L: EventLog + ?Sized,
    {
        let spec = self.spec;
        let mut written = 0;
        for (set_idx, set) in self.store.sets_mut().enumerate() {
            for line in set.lines_mut() {
                if line.dirty {
                    write_back(line, set_idx, &spec, mem, log);
                    written += 1;
                }
                line.valid = false;
            }
        }
        info!("Flushed cache ({} dirty blocks written back)", written);
    }
}

fn write_back<M, L>(line: &mut CacheLine, set: usize, spec: &CacheSpec, mem: &mut M, log: &mut L)
where
    M: MemoryPort + ?Sized,
    L: EventLog + ?Sized,
{
    let base = Addr::from_pos(line.tag, set, spec);
    debug!("Writing back dirty block (base={}, set={})", base, set);
    for (i, word) in line.block.iter().enumerate() {
        mem.write_word(base.offset(i as u32), *word);
    }
    log.record(Transfer::new(base, spec.block_size, TransferKind::CacheToMemory));
    line.dirty = false;
}

impl Drop for Cache {
    fn drop(&mut self) {
        let dirty = self.dirty_lines();
        if dirty > 0 {
            warn!("Cache dropped without flushing, {} dirty lines lost", dirty);
        }
    }
}
