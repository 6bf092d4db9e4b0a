use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::commons::Word;

/// Reads a memory image: one signed decimal word per line, blank lines skipped.
pub fn read_memory_image(path: impl AsRef<Path>) -> Result<Vec<Word>> {
    let path = path.as_ref();
    let s = fs::read_to_string(path)
        .with_context(|| format!("cannot open memory image '{}'", path.display()))?;
    parse_memory_image(&s).with_context(|| format!("in memory image '{}'", path.display()))
}

pub fn parse_memory_image(s: &str) -> Result<Vec<Word>> {
    let mut words = Vec::new();
    for (i, line) in s.lines().enumerate() {
        let Some(field) = line.split_whitespace().next() else {
            continue;
        };
        let word = field
            .parse::<Word>()
            .with_context(|| format!("line {}: '{}' is not a word", i + 1, field))?;
        words.push(word);
    }
    Ok(words)
}
