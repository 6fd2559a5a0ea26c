//! Phonetic pattern domain model.
//!
//! # Responsibility
//! - Define the `(letters, sound, reference)` triple that forms the
//!   substitution vocabulary of puzzles.
//! - Normalize and validate author input before it reaches storage.
//! - Parse author-supplied hyphen-delimited sound strings.
//!
//! # Invariants
//! - Stored fields are trimmed, lowercase ASCII letters.
//! - `letters` and `sound` hold 1..=10 characters, `reference` 1..=50.
//! - A pattern is immutable once created.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Catalog-assigned pattern identifier.
pub type PatternId = i64;

pub const MAX_LETTERS_CHARS: usize = 10;
pub const MAX_SOUND_CHARS: usize = 10;
pub const MAX_REFERENCE_CHARS: usize = 50;

static ASCII_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]+$").expect("valid ascii word regex"));

/// One unconventional spelling-to-sound mapping in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneticPattern {
    pub id: PatternId,
    /// Spelling fragment, e.g. `gh`.
    pub letters: String,
    /// Phoneme the fragment encodes, e.g. `f`.
    pub sound: String,
    /// Example word carrying the pair, e.g. `enough`.
    pub reference: String,
}

/// Pattern content before the catalog assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewPattern {
    pub letters: String,
    pub sound: String,
    pub reference: String,
}

/// Validation failures for pattern input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternValidationError {
    EmptyField(&'static str),
    FieldTooLong { field: &'static str, max_chars: usize },
    NonAlphabetic { field: &'static str, value: String },
}

impl Display for PatternValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "pattern `{field}` cannot be empty"),
            Self::FieldTooLong { field, max_chars } => {
                write!(f, "pattern `{field}` exceeds {max_chars} characters")
            }
            Self::NonAlphabetic { field, value } => {
                write!(f, "pattern `{field}` must be ASCII letters, got `{value}`")
            }
        }
    }
}

impl Error for PatternValidationError {}

impl NewPattern {
    /// Builds normalized pattern input (trimmed, lowercase).
    pub fn new(
        letters: impl AsRef<str>,
        sound: impl AsRef<str>,
        reference: impl AsRef<str>,
    ) -> Self {
        Self {
            letters: normalize_field(letters.as_ref()),
            sound: normalize_field(sound.as_ref()),
            reference: normalize_field(reference.as_ref()),
        }
    }

    /// Parses one catalog file line, `letters<TAB>sound<TAB>reference`.
    ///
    /// Returns `None` unless the line has exactly three tab-separated fields.
    /// Field content is normalized but not validated.
    pub fn from_tsv_line(line: &str) -> Option<Self> {
        let mut fields = line.trim().split('\t');
        let (letters, sound, reference) = (fields.next()?, fields.next()?, fields.next()?);
        if fields.next().is_some() {
            return None;
        }
        Some(Self::new(letters, sound, reference))
    }

    /// Checks field presence, length and alphabet.
    pub fn validate(&self) -> Result<(), PatternValidationError> {
        validate_field("letters", &self.letters, MAX_LETTERS_CHARS)?;
        validate_field("sound", &self.sound, MAX_SOUND_CHARS)?;
        validate_field("reference", &self.reference, MAX_REFERENCE_CHARS)?;
        Ok(())
    }
}

/// Splits an author sound string such as `f-i-sh` into lookup tokens.
///
/// Tokens are trimmed and lowercased; empty tokens (`f--sh`, trailing `-`)
/// are dropped.
pub fn split_sounds(input: &str) -> Vec<String> {
    input
        .split('-')
        .map(normalize_field)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Returns whether `value` is a non-empty run of lowercase ASCII letters.
pub(crate) fn is_ascii_word(value: &str) -> bool {
    ASCII_WORD_RE.is_match(value)
}

fn normalize_field(value: &str) -> String {
    value.trim().to_lowercase()
}

fn validate_field(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), PatternValidationError> {
    if value.is_empty() {
        return Err(PatternValidationError::EmptyField(field));
    }
    if value.chars().count() > max_chars {
        return Err(PatternValidationError::FieldTooLong { field, max_chars });
    }
    if !is_ascii_word(value) {
        return Err(PatternValidationError::NonAlphabetic {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
