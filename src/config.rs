use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunables for loading words and searching a board. Missing JSON fields fall back to the defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Shortest word kept when reading a word list
    pub min_word_length: usize,
    /// Keep extending a path after it spells a word, so CAT does not hide CATS
    pub extend_past_words: bool,
    /// Report each word once, at its first occurrence
    pub dedup: bool,
    /// Upper bound on remove-and-compact rounds
    pub max_rounds: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            min_word_length: 2,
            extend_past_words: true,
            dedup: false,
            max_rounds: 64,
        }
    }
}

impl SolverConfig {
    pub fn from_json_str(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut data = String::new();
        file.read_to_string(&mut data)?;
        Self::from_json_str(&data)
    }
}
