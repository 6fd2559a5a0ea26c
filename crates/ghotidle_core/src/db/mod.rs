//! Puzzle store bootstrap and storage failure classification.
//!
//! Connections come from [`open_db`] / [`open_db_in_memory`] with the schema
//! already migrated. Failures are split into lock contention (another writer
//! held the schedule past [`BUSY_TIMEOUT`]) and everything else, so callers
//! can tell "retry later" apart from a broken store.

use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// How long a connection waits on another writer before failing with `Busy`.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// The write lock stayed taken for the whole busy timeout.
    Busy(rusqlite::Error),
    Sqlite(rusqlite::Error),
    /// The file was migrated by a newer engine.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Whether retrying the same call later can succeed.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy(err) => write!(
                f,
                "puzzle store is locked by another writer (waited {}s): {err}",
                BUSY_TIMEOUT.as_secs()
            ),
            Self::Sqlite(err) => write!(f, "puzzle store failure: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "puzzle store schema v{db_version} is newer than this engine (v{latest_supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Busy(err) | Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        match value.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => Self::Busy(value),
            _ => Self::Sqlite(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;
    use rusqlite::ffi;

    fn sqlite_failure(code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), None)
    }

    #[test]
    fn lock_contention_is_classified_as_busy() {
        assert!(DbError::from(sqlite_failure(ffi::SQLITE_BUSY)).is_busy());
        assert!(DbError::from(sqlite_failure(ffi::SQLITE_LOCKED)).is_busy());
    }

    #[test]
    fn other_failures_stay_generic() {
        let err = DbError::from(sqlite_failure(ffi::SQLITE_CONSTRAINT));
        assert!(matches!(err, DbError::Sqlite(_)));
        assert!(!err.is_busy());
        assert!(!DbError::from(rusqlite::Error::QueryReturnedNoRows).is_busy());
    }
}
