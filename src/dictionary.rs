use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utils::serialization;

/// Outcome of testing a letter sequence against a dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordMatch {
    /// No word starts with the sequence
    NoMatch,
    /// Some longer word starts with the sequence, but the sequence is not a word
    PrefixOnly,
    /// The sequence is a word. It may still be the prefix of a longer one.
    CompleteWord,
}

impl WordMatch {
    /// Whether a search should keep extending a path with this outcome
    pub fn can_extend(&self) -> bool {
        !matches!(self, WordMatch::NoMatch)
    }
}

/// Anything the board solver can ask "is this a word, a prefix, or neither".
pub trait Matcher {
    fn match_sequence(&self, sequence: &[char]) -> WordMatch;
}

impl<F> Matcher for F
where
    F: Fn(&[char]) -> WordMatch,
{
    fn match_sequence(&self, sequence: &[char]) -> WordMatch {
        self(sequence)
    }
}

/// Prefix tree node
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TrieNode {
    /// Letter on the edge leading here. None only for the root
    letter: Option<char>,
    next: HashMap<char, TrieNode>,
    terminal: bool,
    /// Number of edges between the root and this node
    depth: usize,
}

impl TrieNode {
    fn child(letter: char, depth: usize) -> Self {
        Self {
            letter: Some(letter),
            next: HashMap::new(),
            terminal: false,
            depth,
        }
    }

    /// Adds a word below this node. Returns true when the word was not already present
    pub fn add_word(&mut self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }
        let mut node = self;
        for c in word.chars() {
            let depth = node.depth + 1;
            node = node.next.entry(c).or_insert_with(|| TrieNode::child(c, depth));
        }
        let added = !node.terminal;
        node.terminal = true;
        added
    }

    pub fn next_node(&self, c: char) -> Option<&TrieNode> {
        self.next.get(&c)
    }

    pub fn letter(&self) -> Option<char> {
        self.letter
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_word(&self) -> bool {
        self.terminal
    }

    pub fn has_children(&self) -> bool {
        !self.next.is_empty()
    }

    /// Follows the sequence one letter at a time, stopping at the first missing edge
    fn walk(&self, sequence: &[char]) -> Option<&TrieNode> {
        sequence.iter().try_fold(self, |node, c| node.next_node(*c))
    }
}

/// Upper-cases one letter. Letters whose upper case is more than one char
/// (such as 'ß') are kept as they are, so a word and a grid cell always fold alike
pub fn fold_case(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Upper-cases a raw word list entry and keeps it only if it is alphabetic
/// and at least `min_length` characters long
pub fn normalize_word(raw: &str, min_length: usize) -> Option<String> {
    let word = raw.trim().chars().map(fold_case).collect::<String>();
    if word.chars().count() < min_length.max(1) || !word.chars().all(char::is_alphabetic) {
        return None;
    }
    Some(word)
}

/// Character trie over a word list, built once and queried by the solver.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PrefixDictionary {
    root: TrieNode,
    n_words: usize,
}

impl PrefixDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dictionary from already normalized words
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dict = Self::new();
        for w in words {
            dict.insert(w.as_ref());
        }
        dict
    }

    /// Reads a newline-delimited word list, normalizing each line with [`normalize_word`]
    pub fn from_reader<R: BufRead>(reader: R, min_length: usize) -> Result<Self> {
        let mut dict = Self::new();
        let mut n_lines = 0;
        for line in reader.lines() {
            let line = line?;
            n_lines += 1;
            if let Some(word) = normalize_word(&line, min_length) {
                dict.insert(&word);
            }
        }

        if dict.is_empty() {
            warn!("Word list of {} lines produced no usable words", n_lines);
        } else {
            debug!("Loaded {} words from {} lines", dict.len(), n_lines);
        }
        Ok(dict)
    }

    pub fn load<P: AsRef<Path>>(path: P, min_length: usize) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        debug!("Reading word list {}", path.as_ref().display());
        Self::from_reader(BufReader::new(file), min_length)
    }

    /// Writes the built trie to disk so later runs can skip parsing the word list
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        serialization::save_to_disk(self, path)
    }

    pub fn load_cached<P: AsRef<Path>>(path: P) -> Result<Self> {
        let dict: Self = serialization::load_from_disk(path)?;
        debug!("Loaded cached dictionary with {} words", dict.len());
        Ok(dict)
    }

    /// Cache file for a word list. The minimum length is part of the name since
    /// it changes which words end up in the trie
    pub fn cache_path<P: AsRef<Path>>(words_path: P, min_length: usize) -> PathBuf {
        let mut name = words_path.as_ref().as_os_str().to_owned();
        name.push(format!(".min{}.trie", min_length));
        PathBuf::from(name)
    }

    /// Loads the word list through its cache. The cache is only used when it is
    /// newer than the word list; otherwise the list is parsed and the cache rewritten
    pub fn load_with_cache<P: AsRef<Path>>(words_path: P, min_length: usize) -> Result<Self> {
        let cache = Self::cache_path(&words_path, min_length);
        if is_newer(&cache, words_path.as_ref())? {
            return Self::load_cached(&cache);
        }
        let dict = Self::load(&words_path, min_length)?;
        dict.save(&cache)?;
        Ok(dict)
    }

    /// Adds a word. The word is expected to already be normalized; empty strings are ignored
    pub fn insert(&mut self, word: &str) {
        if self.root.add_word(word) {
            self.n_words += 1;
        }
    }

    /// Classifies the sequence in O(sequence length).
    ///
    /// The empty sequence is `PrefixOnly` when any word has been inserted and
    /// `NoMatch` otherwise.
    pub fn match_sequence(&self, sequence: &[char]) -> WordMatch {
        match self.root.walk(sequence) {
            None => WordMatch::NoMatch,
            Some(node) if node.is_word() => WordMatch::CompleteWord,
            Some(node) if node.depth() == 0 && !node.has_children() => WordMatch::NoMatch,
            Some(_) => WordMatch::PrefixOnly,
        }
    }

    pub fn match_str(&self, sequence: &str) -> WordMatch {
        let chars = sequence.chars().collect::<Vec<_>>();
        self.match_sequence(&chars)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.match_str(word) == WordMatch::CompleteWord
    }

    /// Number of distinct words inserted
    pub fn len(&self) -> usize {
        self.n_words
    }

    pub fn is_empty(&self) -> bool {
        self.n_words == 0
    }
}

/// True when `path` exists and was modified after `than`
fn is_newer(path: &Path, than: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    let modified = path.metadata()?.modified()?;
    Ok(modified > than.metadata()?.modified()?)
}

impl Matcher for PrefixDictionary {
    fn match_sequence(&self, sequence: &[char]) -> WordMatch {
        PrefixDictionary::match_sequence(self, sequence)
    }
}
