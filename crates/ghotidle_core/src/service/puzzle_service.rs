//! Puzzle composition and schedule lookup use-cases.
//!
//! # Responsibility
//! - Validate author input and compose a puzzle from catalog selections.
//! - Assign publication dates through the store (FIFO by default).
//! - Serve scheduled puzzles by date or id.
//!
//! # Invariants
//! - Validation is fail-fast in a fixed order: input, dictionary, duplicate
//!   secret, pattern existence.
//! - Date assignment, duplicate check and component writes happen in one
//!   store transaction; a failed composition leaves no rows behind.
//! - Component positions are gap-free from 0; keep-as-is slots consume no
//!   position unless `record_no_change` is set.

use crate::model::pattern::PatternId;
use crate::model::puzzle::{
    ComposedPuzzle, DateAssignment, NewPuzzle, PhoneticComponent, Puzzle, PuzzleId,
    PuzzleValidationError,
};
use crate::repo::error::RepoError;
use crate::repo::puzzle_repo::PuzzleRepository;
use crate::repo::word_repo::Dictionary;
use chrono::{Local, NaiveDate};
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Date policy for new puzzles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scheduling {
    /// Next day after the latest scheduled puzzle; caller dates are ignored.
    #[default]
    Fifo,
    /// Caller supplies the date; it must be free.
    Manual,
}

/// Composer behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComposerConfig {
    pub scheduling: Scheduling,
    /// Store keep-as-is slots as `no_change` components instead of omitting them.
    pub record_no_change: bool,
}

/// Author input for one puzzle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeRequest {
    pub secret: String,
    pub phonetic: String,
    /// One token per sound position, e.g. `["f", "i", "sh"]`.
    pub sounds: Vec<String>,
    /// Parallel to `sounds`; `None` keeps that sound's conventional spelling.
    pub selections: Vec<Option<PatternId>>,
    /// Only read under `Scheduling::Manual`.
    pub date: Option<NaiveDate>,
}

/// Service error for composition and lookup.
#[derive(Debug)]
pub enum PuzzleServiceError {
    Invalid(PuzzleValidationError),
    SelectionMismatch { sounds: usize, selections: usize },
    RepeatedPattern(PatternId),
    MissingDate,
    NotAValidWord(String),
    DuplicatePuzzle(String),
    UnknownPattern(PatternId),
    DateTaken(NaiveDate),
    PuzzleNotFound(PuzzleId),
    NoPuzzleOnDate(NaiveDate),
    Repo(RepoError),
}

impl PuzzleServiceError {
    /// Stable error code for transport layers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Invalid(_)
            | Self::SelectionMismatch { .. }
            | Self::RepeatedPattern(_)
            | Self::MissingDate => "invalid_input",
            Self::NotAValidWord(_) => "not_a_valid_word",
            Self::DuplicatePuzzle(_) => "duplicate_puzzle",
            Self::UnknownPattern(_) => "unknown_pattern",
            Self::DateTaken(_) => "date_taken",
            Self::PuzzleNotFound(_) | Self::NoPuzzleOnDate(_) => "not_found",
            Self::Repo(_) => "store_unavailable",
        }
    }
}

impl Display for PuzzleServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::SelectionMismatch { sounds, selections } => write!(
                f,
                "expected one pattern selection per sound: {sounds} sounds, {selections} selections"
            ),
            Self::RepeatedPattern(id) => {
                write!(f, "pattern {id} is selected more than once")
            }
            Self::MissingDate => write!(f, "manual scheduling requires a date"),
            Self::NotAValidWord(secret) => write!(f, "`{secret}` is not a valid word"),
            Self::DuplicatePuzzle(secret) => {
                write!(f, "a puzzle for `{secret}` is already scheduled")
            }
            Self::UnknownPattern(id) => write!(f, "phonetic pattern not found: {id}"),
            Self::DateTaken(date) => write!(f, "a puzzle is already scheduled on {date}"),
            Self::PuzzleNotFound(id) => write!(f, "puzzle not found: {id}"),
            Self::NoPuzzleOnDate(date) => write!(f, "no puzzle scheduled on {date}"),
            Self::Repo(err) if err.is_busy() => {
                write!(f, "puzzle schedule is busy, retry later: {err}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PuzzleServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PuzzleServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateSecret(secret) => Self::DuplicatePuzzle(secret),
            RepoError::UnknownPattern(id) => Self::UnknownPattern(id),
            RepoError::DateTaken(date) => Self::DateTaken(date),
            other => Self::Repo(other),
        }
    }
}

/// Composer and schedule facade.
pub struct PuzzleService<D: Dictionary, R: PuzzleRepository> {
    dictionary: D,
    repo: R,
    config: ComposerConfig,
}

impl<D: Dictionary, R: PuzzleRepository> PuzzleService<D, R> {
    pub fn new(dictionary: D, repo: R) -> Self {
        Self::with_config(dictionary, repo, ComposerConfig::default())
    }

    pub fn with_config(dictionary: D, repo: R, config: ComposerConfig) -> Self {
        Self {
            dictionary,
            repo,
            config,
        }
    }

    /// Composes and schedules a puzzle using the local calendar date as today.
    pub fn compose(&self, request: &ComposeRequest) -> Result<ComposedPuzzle, PuzzleServiceError> {
        self.compose_on(request, Local::now().date_naive())
    }

    /// Composes and schedules a puzzle with an explicit notion of today.
    ///
    /// # Errors
    /// - `invalid_input` family for blank/oversized fields, mismatched or
    ///   repeated selections, or a missing manual date.
    /// - `NotAValidWord`, `DuplicatePuzzle`, `UnknownPattern`, `DateTaken`.
    /// - `Repo` when storage fails.
    pub fn compose_on(
        &self,
        request: &ComposeRequest,
        today: NaiveDate,
    ) -> Result<ComposedPuzzle, PuzzleServiceError> {
        let started_at = Instant::now();
        info!(
            "event=puzzle_compose module=service status=start sounds={} selections={}",
            request.sounds.len(),
            request.selections.len()
        );

        match self.compose_inner(request, today) {
            Ok(composed) => {
                info!(
                    "event=puzzle_compose module=service status=ok date={} components={} duration_ms={}",
                    composed.puzzle.date,
                    composed.component_count(),
                    started_at.elapsed().as_millis()
                );
                Ok(composed)
            }
            Err(err) => {
                warn!(
                    "event=puzzle_compose module=service status=error error_code={} busy={} duration_ms={}",
                    err.code(),
                    matches!(&err, PuzzleServiceError::Repo(repo) if repo.is_busy()),
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    fn compose_inner(
        &self,
        request: &ComposeRequest,
        today: NaiveDate,
    ) -> Result<ComposedPuzzle, PuzzleServiceError> {
        let puzzle = NewPuzzle::parse(&request.secret, &request.phonetic)
            .map_err(PuzzleServiceError::Invalid)?;
        if request.sounds.len() != request.selections.len() {
            return Err(PuzzleServiceError::SelectionMismatch {
                sounds: request.sounds.len(),
                selections: request.selections.len(),
            });
        }
        let mut selected = HashSet::new();
        for pattern_id in request.selections.iter().flatten() {
            if !selected.insert(*pattern_id) {
                return Err(PuzzleServiceError::RepeatedPattern(*pattern_id));
            }
        }
        let assignment = match self.config.scheduling {
            Scheduling::Fifo => DateAssignment::Fifo { today },
            Scheduling::Manual => {
                DateAssignment::Exact(request.date.ok_or(PuzzleServiceError::MissingDate)?)
            }
        };

        if !self.dictionary.contains(&puzzle.secret)? {
            return Err(PuzzleServiceError::NotAValidWord(puzzle.secret));
        }

        let components = plan_components(&request.selections, self.config.record_no_change);
        Ok(self
            .repo
            .create_puzzle_with_components(&puzzle, &components, assignment)?)
    }

    /// Returns the puzzle active on `date`.
    pub fn puzzle_for_date(&self, date: NaiveDate) -> Result<Puzzle, PuzzleServiceError> {
        self.repo
            .find_by_date(date)?
            .ok_or(PuzzleServiceError::NoPuzzleOnDate(date))
    }

    /// Returns the puzzle active today (local calendar).
    pub fn todays_puzzle(&self) -> Result<Puzzle, PuzzleServiceError> {
        self.puzzle_for_date(Local::now().date_naive())
    }

    pub fn puzzle_by_id(&self, id: PuzzleId) -> Result<Puzzle, PuzzleServiceError> {
        self.repo
            .find_by_id(id)?
            .ok_or(PuzzleServiceError::PuzzleNotFound(id))
    }

    /// Returns a puzzle with its components ordered by position.
    pub fn puzzle_detail(&self, id: PuzzleId) -> Result<ComposedPuzzle, PuzzleServiceError> {
        let puzzle = self.puzzle_by_id(id)?;
        let components = self.repo.components_for(id)?;
        Ok(ComposedPuzzle { puzzle, components })
    }

    /// Latest scheduled date, if any.
    pub fn latest_date(&self) -> Result<Option<NaiveDate>, PuzzleServiceError> {
        Ok(self.repo.max_date()?)
    }
}

/// Turns per-sound selections into positioned components.
///
/// The position counter advances only for slots that produce a component.
pub fn plan_components(
    selections: &[Option<PatternId>],
    record_no_change: bool,
) -> Vec<PhoneticComponent> {
    let mut components = Vec::new();
    let mut position = 0u32;
    for selection in selections {
        let component = match selection {
            Some(pattern_id) => PhoneticComponent {
                pattern_id: Some(*pattern_id),
                position,
                no_change: false,
            },
            None if record_no_change => PhoneticComponent {
                pattern_id: None,
                position,
                no_change: true,
            },
            None => continue,
        };
        components.push(component);
        position += 1;
    }
    components
}

#[cfg(test)]
mod tests {
    use super::plan_components;

    #[test]
    fn keep_as_is_slots_consume_no_position() {
        let components = plan_components(&[Some(7), None, Some(3)], false);
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].pattern_id, Some(7));
        assert_eq!(components[0].position, 0);
        assert_eq!(components[1].pattern_id, Some(3));
        assert_eq!(components[1].position, 1);
    }

    #[test]
    fn recorded_keep_as_is_slots_are_flagged() {
        let components = plan_components(&[None, Some(3)], true);
        assert_eq!(components.len(), 2);
        assert!(components[0].no_change);
        assert_eq!(components[0].pattern_id, None);
        assert_eq!(components[1].position, 1);
        assert!(!components[1].no_change);
    }
}
