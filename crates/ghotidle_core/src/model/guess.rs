//! Guess feedback model.
//!
//! # Invariants
//! - `feedback` holds one entry per guess character, ordered by `position`.
//! - `length_match == false` implies every entry is `Absent`.
//! - `is_correct == true` implies every entry is `Correct`.

use serde::{Deserialize, Serialize};

/// Per-letter verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterStatus {
    /// Right letter, right position.
    Correct,
    /// Letter occurs in the secret at an unclaimed position.
    Present,
    /// No unclaimed occurrence left in the secret.
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterFeedback {
    /// Normalized (lowercase) guess character.
    pub letter: char,
    pub status: LetterStatus,
    pub position: usize,
}

/// Outcome of scoring one guess against one secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessResult {
    pub feedback: Vec<LetterFeedback>,
    pub is_correct: bool,
    pub length_match: bool,
}

impl GuessResult {
    /// Returns statuses in position order.
    pub fn statuses(&self) -> Vec<LetterStatus> {
        self.feedback.iter().map(|item| item.status).collect()
    }
}
