use crate::cache::CacheLine;
use crate::commons::CacheSpec;

/// The ways of one set plus their LRU order.
///
/// Ranks always form a permutation of `0..assoc`, invalid lines included.
#[derive(Clone, Debug)]
pub struct CacheSet {
    lines: Vec<CacheLine>,
}

impl CacheSet {
    pub fn new(spec: &CacheSpec) -> Self {
        // way 0 starts as the oldest so cold misses fill ways in order
        let lines = (0..spec.assoc)
            .map(|way| CacheLine::new(spec.block_size, spec.assoc - 1 - way))
            .collect();
        CacheSet { lines }
    }

    pub fn lines(&self) -> &[CacheLine] {
        &self.lines
    }

    pub fn line(&self, way: usize) -> &CacheLine {
        &self.lines[way]
    }

    pub(crate) fn line_mut(&mut self, way: usize) -> &mut CacheLine {
        &mut self.lines[way]
    }

    pub(crate) fn lines_mut(&mut self) -> impl Iterator<Item = &mut CacheLine> {
        self.lines.iter_mut()
    }

    /// Way holding a valid copy of `tag`, if any.
    pub fn lookup(&self, tag: u32) -> Option<usize> {
        let mut ways = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.valid && l.tag == tag)
            .map(|(way, _)| way);
        let way = ways.next();
        assert!(ways.next().is_none(), "tag {:#x} is cached in more than one way", tag);
        way
    }

    /// Makes `way` the most recently used line. Every line that was more recent than `way` ages
    /// by one.
    pub fn touch(&mut self, way: usize) {
        let old = self.lines[way].lru;
        for line in self.lines.iter_mut() {
            if line.lru < old {
                line.lru += 1;
            }
        }
        self.lines[way].lru = 0;
        debug_assert!(self.lru_is_permutation());
    }

    /// The least recently used way. Invalid lines win ties.
    pub fn victim(&self) -> usize {
        self.lines
            .iter()
            .enumerate()
            .max_by_key(|(_, l)| (l.lru, !l.valid))
            .map(|(way, _)| way)
            .expect("cache set has no ways")
    }

    pub fn lru_is_permutation(&self) -> bool {
        let mut seen = vec![false; self.lines.len()];
        for line in &self.lines {
            match seen.get_mut(line.lru as usize) {
                Some(s) if !*s => *s = true,
                _ => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranks(set: &CacheSet) -> Vec<u32> {
        set.lines().iter().map(|l| l.lru()).collect()
    }

    #[test]
    fn starts_as_a_permutation() {
        let set = CacheSet::new(&CacheSpec::new(1, 1, 4).unwrap());
        assert_eq!(ranks(&set), vec![3, 2, 1, 0]);
        assert_eq!(set.victim(), 0);
    }

    #[test]
    fn touch_keeps_lru_order() {
        let mut set = CacheSet::new(&CacheSpec::new(1, 1, 4).unwrap());
        set.touch(0);
        assert_eq!(ranks(&set), vec![0, 3, 2, 1]);
        set.touch(2);
        assert_eq!(ranks(&set), vec![1, 3, 0, 2]);
        // touching the most recent way changes nothing
        set.touch(2);
        assert_eq!(ranks(&set), vec![1, 3, 0, 2]);
        assert_eq!(set.victim(), 1);
        set.touch(1);
        assert_eq!(ranks(&set), vec![2, 0, 1, 3]);
        assert_eq!(set.victim(), 3);
    }

    #[test]
    fn lookup_ignores_invalid_lines() {
        let mut set = CacheSet::new(&CacheSpec::new(1, 1, 2).unwrap());
        assert_eq!(set.lookup(0), None);
        let line = set.line_mut(1);
        line.valid = true;
        line.tag = 5;
        assert_eq!(set.lookup(5), Some(1));
        assert_eq!(set.lookup(0), None);
    }

    #[test]
    #[should_panic(expected = "more than one way")]
    fn duplicate_tags_are_a_bug() {
        let mut set = CacheSet::new(&CacheSpec::new(1, 1, 2).unwrap());
        for way in 0..2 {
            let line = set.line_mut(way);
            line.valid = true;
            line.tag = 9;
        }
        set.lookup(9);
    }

    #[test]
    fn detects_broken_ranks() {
        let mut set = CacheSet::new(&CacheSpec::new(1, 1, 2).unwrap());
        assert!(set.lru_is_permutation());
        set.line_mut(0).lru = 0;
        assert!(!set.lru_is_permutation());
    }
}
