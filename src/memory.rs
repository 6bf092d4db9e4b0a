use anyhow::{bail, Result};

use crate::commons::{Addr, Word};

/// Number of words in main memory.
pub const MEM_SIZE: usize = 65536;

/// Word-addressed backing store the cache fills from and writes back to.
///
/// Addresses handed to a port are always in `[0, size())`; implementations may treat anything
/// else as a fatal bug.
pub trait MemoryPort {
    fn read_word(&self, addr: Addr) -> Word;
    fn write_word(&mut self, addr: Addr, word: Word);
    fn size(&self) -> usize;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Memory {
    words: Vec<Word>,
}

impl Default for Memory {
    fn default() -> Self {
        Memory {
            words: vec![0; MEM_SIZE],
        }
    }
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a memory whose first words are `image`, the rest zeroed.
    pub fn from_image(image: &[Word]) -> Result<Self> {
        if image.len() > MEM_SIZE {
            bail!(
                "memory image holds {} words, memory only has {}",
                image.len(),
                MEM_SIZE,
            );
        }
        let mut mem = Memory::new();
        mem.words[..image.len()].copy_from_slice(image);
        Ok(mem)
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }
}

impl MemoryPort for Memory {
    fn read_word(&self, addr: Addr) -> Word {
        match self.words.get(addr.0 as usize) {
            Some(word) => *word,
            None => panic!("memory read out of bounds (addr={})", addr),
        }
    }

    fn write_word(&mut self, addr: Addr, word: Word) {
        match self.words.get_mut(addr.0 as usize) {
            Some(slot) => *slot = word,
            None => panic!("memory write out of bounds (addr={})", addr),
        }
    }

    fn size(&self) -> usize {
        self.words.len()
    }
}
