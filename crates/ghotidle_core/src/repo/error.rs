//! Repository error shared by the word, pattern and puzzle stores.

use crate::db::DbError;
use crate::model::pattern::{NewPattern, PatternId, PatternValidationError};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Store-level failures.
///
/// `Db` is transport failure; every other variant is a semantic rejection the
/// caller can act on.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidPattern(PatternValidationError),
    /// A puzzle with this secret is already scheduled.
    DuplicateSecret(String),
    /// The exact `(letters, sound, reference)` triple already exists.
    DuplicatePattern(NewPattern),
    /// A component references a pattern id absent from the catalog.
    UnknownPattern(PatternId),
    /// Another puzzle already owns this date.
    DateTaken(NaiveDate),
    /// At least one component still references the pattern.
    PatternInUse(PatternId),
    PatternNotFound(PatternId),
    /// Persisted data cannot be decoded into a valid model.
    InvalidData(String),
}

impl RepoError {
    /// Whether the store was only temporarily locked by another writer.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Db(err) if err.is_busy())
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidPattern(err) => write!(f, "{err}"),
            Self::DuplicateSecret(secret) => {
                write!(f, "a puzzle for `{secret}` is already scheduled")
            }
            Self::DuplicatePattern(pattern) => write!(
                f,
                "pattern `{}` -> `{}` ({}) already exists",
                pattern.letters, pattern.sound, pattern.reference
            ),
            Self::UnknownPattern(id) => write!(f, "phonetic pattern not found: {id}"),
            Self::DateTaken(date) => write!(f, "a puzzle is already scheduled on {date}"),
            Self::PatternInUse(id) => {
                write!(f, "phonetic pattern {id} is referenced by a puzzle")
            }
            Self::PatternNotFound(id) => write!(f, "phonetic pattern not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted puzzle data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidPattern(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PatternValidationError> for RepoError {
    fn from(value: PatternValidationError) -> Self {
        Self::InvalidPattern(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::from(value))
    }
}
