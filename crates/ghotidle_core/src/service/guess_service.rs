//! Guess evaluation use-cases.
//!
//! # Responsibility
//! - Score a guess against a secret with duplicate-letter-safe feedback.
//! - Resolve the secret of a scheduled puzzle for play-time evaluation.
//!
//! # Invariants
//! - Scoring is a pure function of `(secret, guess)` and case-insensitive.
//! - A length mismatch marks every letter absent and is reported through
//!   `length_match=false`; no partial scoring across lengths.
//! - A secret letter instance is claimed at most once: exact matches first,
//!   then left-to-right presence matches.

use crate::model::guess::{GuessResult, LetterFeedback, LetterStatus};
use crate::model::puzzle::PuzzleId;
use crate::repo::error::RepoError;
use crate::repo::puzzle_repo::PuzzleRepository;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Scores `guess` against `secret`.
///
/// Total over any two strings. Exact position matches are claimed first; the
/// remaining secret letters form a multiset that presence matches consume
/// left to right, so surplus repeats in the guess stay absent.
pub fn evaluate_guess(secret: &str, guess: &str) -> GuessResult {
    let secret: Vec<char> = secret.to_lowercase().chars().collect();
    let guess: Vec<char> = guess.to_lowercase().chars().collect();
    let length_match = secret.len() == guess.len();

    let mut feedback: Vec<LetterFeedback> = guess
        .iter()
        .enumerate()
        .map(|(position, &letter)| LetterFeedback {
            letter,
            status: LetterStatus::Absent,
            position,
        })
        .collect();

    if length_match {
        let mut remaining: HashMap<char, usize> = HashMap::new();
        for (item, &target) in feedback.iter_mut().zip(secret.iter()) {
            if item.letter == target {
                item.status = LetterStatus::Correct;
            } else {
                *remaining.entry(target).or_insert(0) += 1;
            }
        }

        for item in feedback
            .iter_mut()
            .filter(|item| item.status == LetterStatus::Absent)
        {
            if let Some(count) = remaining.get_mut(&item.letter) {
                if *count > 0 {
                    *count -= 1;
                    item.status = LetterStatus::Present;
                }
            }
        }
    }

    GuessResult {
        feedback,
        is_correct: secret == guess,
        length_match,
    }
}

/// Scores a guess against a literal secret without touching any store.
///
/// # Errors
/// - `EmptyGuess` when `guess` is blank after trimming.
pub fn evaluate_practice_guess(
    secret: &str,
    guess: &str,
) -> Result<GuessResult, GuessServiceError> {
    let guess = non_empty_guess(guess)?;
    Ok(evaluate_guess(secret.trim(), guess))
}

/// Service error for play-time guess evaluation.
#[derive(Debug)]
pub enum GuessServiceError {
    /// Guess is blank after trimming.
    EmptyGuess,
    PuzzleNotFound(PuzzleId),
    NoPuzzleOnDate(NaiveDate),
    Repo(RepoError),
}

impl GuessServiceError {
    /// Stable error code for transport layers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyGuess => "invalid_input",
            Self::PuzzleNotFound(_) | Self::NoPuzzleOnDate(_) => "not_found",
            Self::Repo(_) => "store_unavailable",
        }
    }
}

impl Display for GuessServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyGuess => write!(f, "guess cannot be empty"),
            Self::PuzzleNotFound(id) => write!(f, "puzzle not found: {id}"),
            Self::NoPuzzleOnDate(date) => write!(f, "no puzzle scheduled on {date}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GuessServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for GuessServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Evaluates guesses against scheduled puzzles.
pub struct GuessService<R: PuzzleRepository> {
    repo: R,
}

impl<R: PuzzleRepository> GuessService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Scores a guess against a literal secret, rejecting a blank guess.
    pub fn evaluate(&self, secret: &str, guess: &str) -> Result<GuessResult, GuessServiceError> {
        evaluate_practice_guess(secret, guess)
    }

    /// Scores a guess against the puzzle with the given id.
    pub fn evaluate_for_puzzle(
        &self,
        id: PuzzleId,
        guess: &str,
    ) -> Result<GuessResult, GuessServiceError> {
        let guess = non_empty_guess(guess)?;
        let puzzle = self
            .repo
            .find_by_id(id)?
            .ok_or(GuessServiceError::PuzzleNotFound(id))?;
        Ok(evaluate_guess(&puzzle.secret, guess))
    }

    /// Scores a guess against the puzzle active on `date`.
    pub fn evaluate_for_date(
        &self,
        date: NaiveDate,
        guess: &str,
    ) -> Result<GuessResult, GuessServiceError> {
        let guess = non_empty_guess(guess)?;
        let puzzle = self
            .repo
            .find_by_date(date)?
            .ok_or(GuessServiceError::NoPuzzleOnDate(date))?;
        Ok(evaluate_guess(&puzzle.secret, guess))
    }
}

fn non_empty_guess(guess: &str) -> Result<&str, GuessServiceError> {
    let trimmed = guess.trim();
    if trimmed.is_empty() {
        return Err(GuessServiceError::EmptyGuess);
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::{evaluate_guess, evaluate_practice_guess};
    use crate::model::guess::LetterStatus::{Absent, Correct, Present};

    #[test]
    fn identical_words_are_all_correct() {
        let result = evaluate_guess("fish", "fish");
        assert_eq!(result.statuses(), vec![Correct; 4]);
        assert!(result.is_correct);
        assert!(result.length_match);
    }

    #[test]
    fn comparison_ignores_case() {
        let result = evaluate_guess("Fish", "fISH");
        assert!(result.is_correct);
        assert_eq!(result.feedback[0].letter, 'f');
    }

    #[test]
    fn anagram_is_all_present() {
        let result = evaluate_guess("fish", "hsif");
        assert_eq!(result.statuses(), vec![Present; 4]);
        assert!(!result.is_correct);
    }

    #[test]
    fn exact_match_claims_letter_before_presence() {
        let result = evaluate_guess("ball", "allo");
        assert_eq!(result.statuses(), vec![Present, Present, Correct, Absent]);
    }

    #[test]
    fn surplus_repeats_are_absent() {
        let result = evaluate_guess("fish", "ffsh");
        assert_eq!(result.statuses(), vec![Correct, Absent, Correct, Correct]);

        let result = evaluate_guess("abcd", "eaae");
        assert_eq!(result.statuses(), vec![Absent, Present, Absent, Absent]);
    }

    #[test]
    fn length_mismatch_is_all_absent() {
        let result = evaluate_guess("fish", "fishy");
        assert_eq!(result.feedback.len(), 5);
        assert_eq!(result.statuses(), vec![Absent; 5]);
        assert!(!result.length_match);
        assert!(!result.is_correct);
    }

    #[test]
    fn practice_guess_trims_and_rejects_blank_input() {
        assert!(evaluate_practice_guess(" fish ", " FISH ").unwrap().is_correct);
        let err = evaluate_practice_guess("fish", " \t ").unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn empty_inputs_are_total() {
        let result = evaluate_guess("", "");
        assert!(result.feedback.is_empty());
        assert!(result.is_correct);
        assert!(result.length_match);
    }
}
