//! Puzzle composition and guess evaluation engine for Ghotidle.
//! This crate is the single source of truth for puzzle invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, init_logging_from_env, logging_status};
pub use model::guess::{GuessResult, LetterFeedback, LetterStatus};
pub use model::pattern::{split_sounds, NewPattern, PatternId, PhoneticPattern};
pub use model::puzzle::{ComposedPuzzle, PhoneticComponent, Puzzle, PuzzleId};
pub use repo::error::{RepoError, RepoResult};
pub use repo::pattern_repo::{PatternRepository, SqlitePatternRepository};
pub use repo::puzzle_repo::{PuzzleRepository, SqlitePuzzleRepository};
pub use repo::word_repo::{Dictionary, MemoryDictionary, SqliteDictionary};
pub use repo::ImportReport;
pub use service::guess_service::{
    evaluate_guess, evaluate_practice_guess, GuessService, GuessServiceError,
};
pub use service::pattern_service::{PatternService, PatternServiceError, SoundSuggestion};
pub use service::puzzle_service::{
    ComposeRequest, ComposerConfig, PuzzleService, PuzzleServiceError, Scheduling,
};
pub use service::word_service::{WordService, WordServiceError};

/// Engine version, stamped into the `engine_start` log event and `ghotidle info`.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_semver_like() {
        assert_eq!(core_version().split('.').count(), 3);
    }
}
