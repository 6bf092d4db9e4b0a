use crate::cache::CacheSet;
use crate::commons::{CacheSpec, Word};
use crate::events::Stats;

/// All sets of the cache, plus the hit/miss counters.
#[derive(Clone, Debug)]
pub struct CacheStore {
    sets: Vec<CacheSet>,
    stats: Stats,
}

impl CacheStore {
    pub fn new(spec: &CacheSpec) -> Self {
        CacheStore {
            sets: (0..spec.num_sets).map(|_| CacheSet::new(spec)).collect(),
            stats: Stats::default(),
        }
    }

    pub fn sets(&self) -> &[CacheSet] {
        &self.sets
    }

    pub fn set(&self, set: usize) -> &CacheSet {
        &self.sets[set]
    }

    pub(crate) fn set_mut(&mut self, set: usize) -> &mut CacheSet {
        &mut self.sets[set]
    }

    pub(crate) fn sets_mut(&mut self) -> impl Iterator<Item = &mut CacheSet> {
        self.sets.iter_mut()
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Looks `tag` up in `set` and counts the outcome. Call exactly once per processor access.
    pub fn lookup(&mut self, set: usize, tag: u32) -> Option<usize> {
        let way = self.sets[set].lookup(tag);
        match way {
            Some(_) => self.stats.hits += 1,
            None => self.stats.misses += 1,
        }
        way
    }

    pub fn read(&self, set: usize, way: usize, offset: usize) -> Word {
        self.sets[set].line(way).block[offset]
    }

    pub fn write(&mut self, set: usize, way: usize, offset: usize, word: Word) {
        let line = self.sets[set].line_mut(way);
        line.block[offset] = word;
        line.dirty = true;
    }

    /// Replaces the contents of a line with a freshly fetched block.
    pub fn install(&mut self, set: usize, way: usize, tag: u32, data: &[Word]) {
        let line = self.sets[set].line_mut(way);
        line.block.copy_from_slice(data);
        line.tag = tag;
        line.valid = true;
        line.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_counts_once_per_call() {
        let spec = CacheSpec::new(2, 2, 1).unwrap();
        let mut store = CacheStore::new(&spec);
        assert_eq!(store.lookup(1, 3), None);
        store.install(1, 0, 3, &[10, 11]);
        assert_eq!(store.lookup(1, 3), Some(0));
        assert_eq!(store.lookup(0, 3), None);
        assert_eq!(store.stats(), Stats { hits: 1, misses: 2 });
    }

    #[test]
    fn write_marks_dirty_and_install_cleans() {
        let spec = CacheSpec::new(2, 1, 1).unwrap();
        let mut store = CacheStore::new(&spec);
        store.install(0, 0, 0, &[1, 2]);
        assert!(!store.set(0).line(0).is_dirty());
        store.write(0, 0, 1, 42);
        assert_eq!(store.read(0, 0, 1), 42);
        assert!(store.set(0).line(0).is_dirty());
        store.install(0, 0, 1, &[3, 4]);
        let line = store.set(0).line(0);
        assert!(line.is_valid() && !line.is_dirty());
        assert_eq!(line.tag(), 1);
        assert_eq!(line.block(), &[3, 4]);
    }
}
