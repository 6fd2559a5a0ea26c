//! Practice word use-cases over the dictionary gate.
//!
//! # Invariants
//! - Random picks are uniform over the whole word set.
//! - An empty word set is reported as `NotFound`, never as a made-up word.

use crate::repo::error::RepoError;
use crate::repo::word_repo::Dictionary;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum WordServiceError {
    /// The word set is empty.
    NotFound,
    Repo(RepoError),
}

impl WordServiceError {
    /// Stable error code for transport layers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Repo(_) => "store_unavailable",
        }
    }
}

impl Display for WordServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "word list is empty"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WordServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for WordServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub struct WordService<D: Dictionary> {
    dictionary: D,
}

impl<D: Dictionary> WordService<D> {
    pub fn new(dictionary: D) -> Self {
        Self { dictionary }
    }

    /// Picks a practice word uniformly at random.
    pub fn pick_random_word(&self) -> Result<String, WordServiceError> {
        let word = self
            .dictionary
            .pick_random()?
            .ok_or(WordServiceError::NotFound)?;
        info!(
            "event=word_random module=service status=ok word_len={}",
            word.chars().count()
        );
        Ok(word)
    }

    pub fn is_valid_word(&self, word: &str) -> Result<bool, WordServiceError> {
        Ok(self.dictionary.contains(word)?)
    }
}
