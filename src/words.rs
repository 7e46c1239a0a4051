use std::fs;
use std::path::Path;

use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::from_str;

use crate::error::WordListError;

static WORDS_DIR: Dir = include_dir!("src/words");

pub const DEFAULT_WORD_LIST: &str = "calm";

/// Ordered list of words cycled through during a session
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct WordList {
    pub name: String,
    pub words: Vec<String>,
}

impl WordList {
    /// Load one of the word lists compiled into the binary
    pub fn bundled(name: &str) -> Result<Self, WordListError> {
        let file = WORDS_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| WordListError::Missing(name.to_string()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| WordListError::Missing(name.to_string()))?;
        Self::parse(contents)
    }

    /// Load a user supplied JSON file with the same shape as the bundled lists
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, WordListError> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Result<Self, WordListError> {
        let mut list: WordList = from_str(contents)?;
        list.words.retain(|w| !w.trim().is_empty());
        if list.words.is_empty() {
            return Err(WordListError::Empty(list.name));
        }
        Ok(list)
    }

    pub fn shuffled(mut self) -> Self {
        self.words.shuffle(&mut rand::thread_rng());
        self
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Word for an index produced by the session, wrapping past the end
    pub fn get(&self, index: usize) -> &str {
        if self.words.is_empty() {
            return "";
        }
        &self.words[index % self.words.len()]
    }
}
