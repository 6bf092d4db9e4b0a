use crate::commons::Word;

/// One way of a set.
///
/// `lru` is the line's recency rank within its set: 0 is the most recently used, `assoc - 1`
/// the next to be evicted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheLine {
    pub(crate) valid: bool,
    pub(crate) dirty: bool,
    pub(crate) tag: u32,
    pub(crate) lru: u32,
    pub(crate) block: Vec<Word>,
}

impl CacheLine {
    pub(crate) fn new(block_size: u32, lru: u32) -> Self {
        CacheLine {
            valid: false,
            dirty: false,
            tag: 0,
            lru,
            block: vec![0; block_size as usize],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn tag(&self) -> u32 {
        self.tag
    }

    pub fn lru(&self) -> u32 {
        self.lru
    }

    pub fn block(&self) -> &[Word] {
        &self.block
    }
}
