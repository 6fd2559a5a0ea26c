//! Puzzle (daily word) domain model.
//!
//! # Responsibility
//! - Define the scheduled puzzle record and its phonetic components.
//! - Validate author input for secret and respelling.
//!
//! # Invariants
//! - `secret` and `date` are each unique across all puzzles.
//! - Components of one puzzle have unique patterns and gap-free positions
//!   starting at 0.
//! - A puzzle is immutable once scheduled; it owns its components.

use crate::model::pattern::PatternId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable puzzle identifier.
pub type PuzzleId = Uuid;

pub const MAX_SECRET_CHARS: usize = 50;
pub const MAX_PHONETIC_CHARS: usize = 50;

/// One scheduled puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    pub id: PuzzleId,
    /// Answer word, lowercase.
    pub secret: String,
    /// Respelled puzzle string shown to players.
    pub phonetic: String,
    /// The only calendar date on which this puzzle is active.
    pub date: NaiveDate,
}

/// Link between a puzzle and one respelling slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneticComponent {
    /// `None` only for recorded keep-as-is slots.
    pub pattern_id: Option<PatternId>,
    pub position: u32,
    pub no_change: bool,
}

/// A puzzle together with its components, ordered by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedPuzzle {
    pub puzzle: Puzzle,
    pub components: Vec<PhoneticComponent>,
}

impl ComposedPuzzle {
    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

/// How the store picks the date of a new puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateAssignment {
    /// Day after the latest scheduled puzzle, or `today` on an empty schedule.
    Fifo { today: NaiveDate },
    /// Exactly this date; fails when already taken.
    Exact(NaiveDate),
}

/// Validated puzzle content before scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPuzzle {
    pub secret: String,
    pub phonetic: String,
}

/// Validation failures for puzzle input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleValidationError {
    EmptyField(&'static str),
    FieldTooLong { field: &'static str, max_chars: usize },
}

impl Display for PuzzleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "puzzle `{field}` cannot be empty"),
            Self::FieldTooLong { field, max_chars } => {
                write!(f, "puzzle `{field}` exceeds {max_chars} characters")
            }
        }
    }
}

impl Error for PuzzleValidationError {}

impl NewPuzzle {
    /// Normalizes and validates author input.
    ///
    /// Both fields are trimmed and lowercased; length is counted in characters.
    pub fn parse(secret: &str, phonetic: &str) -> Result<Self, PuzzleValidationError> {
        let secret = secret.trim().to_lowercase();
        let phonetic = phonetic.trim().to_lowercase();
        check_field("secret", &secret, MAX_SECRET_CHARS)?;
        check_field("phonetic", &phonetic, MAX_PHONETIC_CHARS)?;
        Ok(Self { secret, phonetic })
    }
}

fn check_field(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), PuzzleValidationError> {
    if value.is_empty() {
        return Err(PuzzleValidationError::EmptyField(field));
    }
    if value.chars().count() > max_chars {
        return Err(PuzzleValidationError::FieldTooLong { field, max_chars });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NewPuzzle, PuzzleValidationError};

    #[test]
    fn parse_normalizes_fields() {
        let parsed = NewPuzzle::parse("  Fish ", "GHOTI").unwrap();
        assert_eq!(parsed.secret, "fish");
        assert_eq!(parsed.phonetic, "ghoti");
    }

    #[test]
    fn parse_rejects_blank_and_oversized_fields() {
        assert_eq!(
            NewPuzzle::parse("   ", "ghoti"),
            Err(PuzzleValidationError::EmptyField("secret"))
        );
        assert_eq!(
            NewPuzzle::parse("fish", ""),
            Err(PuzzleValidationError::EmptyField("phonetic"))
        );
        let long = "a".repeat(51);
        assert_eq!(
            NewPuzzle::parse(&long, "ghoti"),
            Err(PuzzleValidationError::FieldTooLong {
                field: "secret",
                max_chars: 50
            })
        );
        assert!(NewPuzzle::parse(&"a".repeat(50), "ghoti").is_ok());
    }
}
