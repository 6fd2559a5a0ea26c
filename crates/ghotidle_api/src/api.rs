//! Envelope-returning operations for serving layers.
//!
//! # Responsibility
//! - Expose evaluate-guess, suggest-patterns, compose-puzzle and random-word,
//!   plus catalog/word loading used by authoring tools.
//! - Keep error semantics simple: `ok`, `error_code`, `message`.
//!
//! # Invariants
//! - Operations never panic and never return partial data with `ok=false`.
//! - Player-facing views never include the secret.

use chrono::NaiveDate;
use ghotidle_core::db::open_db;
use ghotidle_core::{
    evaluate_practice_guess, split_sounds, ComposeRequest, ComposedPuzzle, ComposerConfig,
    GuessResult, GuessService, ImportReport, NewPattern, PatternId, PatternService,
    PhoneticComponent, PhoneticPattern, Puzzle, PuzzleId, PuzzleService, SoundSuggestion,
    SqliteDictionary, SqlitePatternRepository, SqlitePuzzleRepository, WordService,
};
use log::info;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const ERROR_INVALID_INPUT: &str = "invalid_input";
pub const ERROR_STORE_UNAVAILABLE: &str = "store_unavailable";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Response envelope shared by every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    /// Stable taxonomy code; `None` on success.
    pub error_code: Option<String>,
    /// Human-readable diagnostics.
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            ok: true,
            error_code: None,
            message: message.into(),
            data: Some(data),
        }
    }

    fn failure(code: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error_code: Some(code.to_string()),
            message: message.into(),
            data: None,
        }
    }
}

/// How a guess names its secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SecretRef {
    /// Literal secret (practice rounds).
    Value(String),
    /// Scheduled puzzle id.
    PuzzleId(String),
    /// Puzzle active on a `YYYY-MM-DD` date.
    Date(String),
}

/// Player-facing puzzle view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleView {
    pub id: String,
    pub phonetic: String,
    pub date: String,
    /// Secret length in characters.
    pub length: usize,
}

impl From<&Puzzle> for PuzzleView {
    fn from(puzzle: &Puzzle) -> Self {
        Self {
            id: puzzle.id.to_string(),
            phonetic: puzzle.phonetic.clone(),
            date: puzzle.date.format(DATE_FORMAT).to_string(),
            length: puzzle.secret.chars().count(),
        }
    }
}

/// Author-facing view of a freshly composed puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedView {
    pub id: String,
    pub secret: String,
    pub phonetic: String,
    pub date: String,
    pub component_count: usize,
    pub components: Vec<PhoneticComponent>,
}

impl From<ComposedPuzzle> for ComposedView {
    fn from(composed: ComposedPuzzle) -> Self {
        Self {
            id: composed.puzzle.id.to_string(),
            date: composed.puzzle.date.format(DATE_FORMAT).to_string(),
            component_count: composed.component_count(),
            secret: composed.puzzle.secret,
            phonetic: composed.puzzle.phonetic,
            components: composed.components,
        }
    }
}

/// Engine handle bound to one database file and composer configuration.
#[derive(Debug, Clone)]
pub struct Ghotidle {
    db_path: PathBuf,
    config: ComposerConfig,
}

impl Ghotidle {
    pub fn new(db_path: impl Into<PathBuf>, config: ComposerConfig) -> Self {
        Self {
            db_path: db_path.into(),
            config,
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Returns the puzzle active today.
    pub fn today_puzzle(&self) -> ApiResponse<PuzzleView> {
        self.with_conn("today_puzzle", |conn| {
            let service =
                PuzzleService::new(SqliteDictionary::new(conn), SqlitePuzzleRepository::new(conn));
            respond("today_puzzle", service.todays_puzzle(), |puzzle| {
                ("Puzzle found.".to_string(), PuzzleView::from(&puzzle))
            })
        })
    }

    /// Returns the puzzle active on a `YYYY-MM-DD` date.
    pub fn puzzle_on(&self, date: &str) -> ApiResponse<PuzzleView> {
        let date = match parse_date(date) {
            Ok(date) => date,
            Err(response) => return response,
        };
        self.with_conn("puzzle_on", |conn| {
            let service =
                PuzzleService::new(SqliteDictionary::new(conn), SqlitePuzzleRepository::new(conn));
            respond("puzzle_on", service.puzzle_for_date(date), |puzzle| {
                ("Puzzle found.".to_string(), PuzzleView::from(&puzzle))
            })
        })
    }

    /// Scores a guess against a literal secret or a stored puzzle.
    pub fn evaluate_guess(&self, secret: &SecretRef, guess: &str) -> ApiResponse<GuessResult> {
        let describe = |result: GuessResult| {
            let message = if result.is_correct {
                "Correct!".to_string()
            } else if !result.length_match {
                "Guess length does not match the secret.".to_string()
            } else {
                "Not quite.".to_string()
            };
            (message, result)
        };

        match secret {
            // Practice rounds are pure scoring; the store is not opened.
            SecretRef::Value(secret) => respond(
                "evaluate_guess",
                evaluate_practice_guess(secret, guess),
                describe,
            ),
            SecretRef::PuzzleId(raw) => {
                let id = match parse_puzzle_id(raw) {
                    Ok(id) => id,
                    Err(response) => return response,
                };
                self.with_conn("evaluate_guess", |conn| {
                    let service = GuessService::new(SqlitePuzzleRepository::new(conn));
                    respond(
                        "evaluate_guess",
                        service.evaluate_for_puzzle(id, guess),
                        describe,
                    )
                })
            }
            SecretRef::Date(raw) => {
                let date = match parse_date(raw) {
                    Ok(date) => date,
                    Err(response) => return response,
                };
                self.with_conn("evaluate_guess", |conn| {
                    let service = GuessService::new(SqlitePuzzleRepository::new(conn));
                    respond(
                        "evaluate_guess",
                        service.evaluate_for_date(date, guess),
                        describe,
                    )
                })
            }
        }
    }

    /// Lists catalog matches per sound of a hyphen-delimited string (`f-i-sh`).
    pub fn suggest_patterns(&self, sounds: &str) -> ApiResponse<Vec<SoundSuggestion>> {
        let tokens = split_sounds(sounds);
        if tokens.is_empty() {
            return ApiResponse::failure(ERROR_INVALID_INPUT, "suggest_patterns failed: no sounds");
        }
        self.with_conn("suggest_patterns", |conn| {
            let service = PatternService::new(SqlitePatternRepository::new(conn));
            respond("suggest_patterns", service.suggest(&tokens), |suggestions| {
                (
                    format!("Found suggestions for {} sound(s).", suggestions.len()),
                    suggestions,
                )
            })
        })
    }

    /// Composes and schedules a puzzle.
    ///
    /// `pattern_ids` is parallel to the sounds in `sounds`; `None` keeps a
    /// sound's conventional spelling. `date` is only read under manual
    /// scheduling.
    pub fn compose_puzzle(
        &self,
        secret: &str,
        phonetic: &str,
        sounds: &str,
        pattern_ids: &[Option<PatternId>],
        date: Option<&str>,
    ) -> ApiResponse<ComposedView> {
        let date = match date.map(parse_date).transpose() {
            Ok(date) => date,
            Err(response) => return response,
        };
        let request = ComposeRequest {
            secret: secret.to_string(),
            phonetic: phonetic.to_string(),
            sounds: split_sounds(sounds),
            selections: pattern_ids.to_vec(),
            date,
        };
        self.with_conn("compose_puzzle", |conn| {
            let service = PuzzleService::with_config(
                SqliteDictionary::new(conn),
                SqlitePuzzleRepository::new(conn),
                self.config,
            );
            respond("compose_puzzle", service.compose(&request), |composed| {
                let view = ComposedView::from(composed);
                (format!("Puzzle scheduled for {}.", view.date), view)
            })
        })
    }

    /// Picks a uniformly random practice word.
    pub fn random_word(&self) -> ApiResponse<String> {
        self.with_conn("random_word", |conn| {
            let service = WordService::new(SqliteDictionary::new(conn));
            respond("random_word", service.pick_random_word(), |word| {
                ("Random word picked.".to_string(), word)
            })
        })
    }

    /// Adds one catalog pattern.
    pub fn add_pattern(
        &self,
        letters: &str,
        sound: &str,
        reference: &str,
    ) -> ApiResponse<PhoneticPattern> {
        self.with_conn("add_pattern", |conn| {
            let service = PatternService::new(SqlitePatternRepository::new(conn));
            respond(
                "add_pattern",
                service.add_pattern(letters, sound, reference),
                |pattern| ("Pattern created.".to_string(), pattern),
            )
        })
    }

    /// Loads the built-in pattern catalog, skipping existing entries.
    pub fn seed_patterns(&self) -> ApiResponse<ImportReport> {
        self.with_conn("seed_patterns", |conn| {
            let service = PatternService::new(SqlitePatternRepository::new(conn));
            respond("seed_patterns", service.seed_default_catalog(), |report| {
                (import_message(&report), report)
            })
        })
    }

    /// Loads catalog patterns, skipping exact duplicates and counting invalid
    /// entries as rejected.
    pub fn import_patterns(&self, patterns: &[NewPattern]) -> ApiResponse<ImportReport> {
        self.import_pattern_batch(patterns, 0)
    }

    /// Loads a catalog file's lines (`letters<TAB>sound<TAB>reference`).
    ///
    /// Blank lines are ignored; lines without exactly three fields count as
    /// rejected next to entries that fail validation.
    pub fn import_pattern_lines(&self, lines: &[String]) -> ApiResponse<ImportReport> {
        let mut patterns = Vec::with_capacity(lines.len());
        let mut malformed = 0;
        for line in lines.iter().filter(|line| !line.trim().is_empty()) {
            match NewPattern::from_tsv_line(line) {
                Some(pattern) => patterns.push(pattern),
                None => malformed += 1,
            }
        }
        self.import_pattern_batch(&patterns, malformed)
    }

    fn import_pattern_batch(
        &self,
        patterns: &[NewPattern],
        malformed: usize,
    ) -> ApiResponse<ImportReport> {
        self.with_conn("import_patterns", |conn| {
            let service = PatternService::new(SqlitePatternRepository::new(conn));
            respond(
                "import_patterns",
                service.import_patterns(patterns),
                |mut report| {
                    report.rejected += malformed;
                    (import_message(&report), report)
                },
            )
        })
    }

    /// Loads dictionary words, skipping existing and malformed entries.
    pub fn import_words(&self, words: &[String]) -> ApiResponse<ImportReport> {
        self.with_conn("import_words", |conn| {
            let dictionary = SqliteDictionary::new(conn);
            match dictionary.import_words(words) {
                Ok(report) => {
                    info!(
                        "event=word_import module=api status=ok inserted={} skipped={} rejected={}",
                        report.inserted, report.skipped, report.rejected
                    );
                    ApiResponse::success(import_message(&report), report)
                }
                Err(err) => {
                    ApiResponse::failure(ERROR_STORE_UNAVAILABLE, format!("import_words failed: {err}"))
                }
            }
        })
    }

    fn with_conn<T>(
        &self,
        operation: &str,
        f: impl FnOnce(&Connection) -> ApiResponse<T>,
    ) -> ApiResponse<T> {
        match open_db(&self.db_path) {
            Ok(conn) => f(&conn),
            Err(err) => ApiResponse::failure(
                ERROR_STORE_UNAVAILABLE,
                format!("{operation} failed: database open failed: {err}"),
            ),
        }
    }
}

/// Error shape every service error exposes to this layer.
trait CodedError: Display {
    fn error_code(&self) -> &'static str;
}

macro_rules! coded_error {
    ($($ty:ty),* $(,)?) => {
        $(impl CodedError for $ty {
            fn error_code(&self) -> &'static str {
                self.code()
            }
        })*
    };
}

coded_error!(
    ghotidle_core::GuessServiceError,
    ghotidle_core::PatternServiceError,
    ghotidle_core::PuzzleServiceError,
    ghotidle_core::WordServiceError,
);

fn respond<V, T, E: CodedError>(
    operation: &str,
    result: Result<V, E>,
    on_ok: impl FnOnce(V) -> (String, T),
) -> ApiResponse<T> {
    match result {
        Ok(value) => {
            let (message, data) = on_ok(value);
            ApiResponse::success(message, data)
        }
        Err(err) => ApiResponse::failure(err.error_code(), format!("{operation} failed: {err}")),
    }
}

fn parse_date<T>(raw: &str) -> Result<NaiveDate, ApiResponse<T>> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        ApiResponse::failure(
            ERROR_INVALID_INPUT,
            format!("invalid date `{}`; expected YYYY-MM-DD", raw.trim()),
        )
    })
}

fn parse_puzzle_id<T>(raw: &str) -> Result<PuzzleId, ApiResponse<T>> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        ApiResponse::failure(
            ERROR_INVALID_INPUT,
            format!("invalid puzzle id `{}`", raw.trim()),
        )
    })
}

fn import_message(report: &ImportReport) -> String {
    format!(
        "Inserted {}, skipped {}, rejected {}.",
        report.inserted, report.skipped, report.rejected
    )
}

#[cfg(test)]
mod tests {
    use super::{ApiResponse, Ghotidle, SecretRef, ERROR_INVALID_INPUT, ERROR_STORE_UNAVAILABLE};
    use ghotidle_core::{ComposerConfig, NewPattern};

    fn engine() -> (tempfile::TempDir, Ghotidle) {
        let dir = tempfile::tempdir().unwrap();
        let engine = Ghotidle::new(dir.path().join("api.sqlite3"), ComposerConfig::default());
        (dir, engine)
    }

    #[test]
    fn literal_secret_guess_needs_no_schedule() {
        let (_dir, engine) = engine();
        let response = engine.evaluate_guess(&SecretRef::Value("fish".to_string()), "FISH");
        assert!(response.ok);
        assert!(response.data.unwrap().is_correct);
    }

    #[test]
    fn literal_secret_guess_works_without_a_store() {
        let dir = tempfile::tempdir().unwrap();
        let unreachable = dir.path().join("missing").join("dir").join("x.sqlite3");
        let engine = Ghotidle::new(unreachable, ComposerConfig::default());

        let response = engine.evaluate_guess(&SecretRef::Value("fish".to_string()), "fish");
        assert!(response.ok, "{}", response.message);
        assert!(response.data.unwrap().is_correct);

        // Stored references still need the database.
        let by_date = engine.evaluate_guess(&SecretRef::Date("2026-10-18".to_string()), "fish");
        assert_eq!(by_date.error_code.as_deref(), Some(ERROR_STORE_UNAVAILABLE));
    }

    #[test]
    fn pattern_file_lines_import_with_rejections() {
        let (_dir, engine) = engine();
        let lines: Vec<String> = [
            "GH\tF\tEnough",
            "",
            "ph\tf\tphone",
            "gh\tf\tenough",
            "only\ttwo",
            "a\tb\tc\td",
            "t-t\tt\tbutter",
        ]
        .iter()
        .map(|line| line.to_string())
        .collect();

        let response = engine.import_pattern_lines(&lines);
        assert!(response.ok, "{}", response.message);
        let report = response.data.unwrap();
        assert_eq!(report.inserted, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.rejected, 3);

        let matches = &engine.suggest_patterns("f").data.unwrap()[0].matches;
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].reference, "enough");

        let again = engine.import_patterns(&[NewPattern::new("ph", "f", "phone")]);
        assert_eq!(again.data.unwrap().skipped, 1);
    }

    #[test]
    fn blank_guess_is_invalid_input() {
        let (_dir, engine) = engine();
        let response = engine.evaluate_guess(&SecretRef::Value("fish".to_string()), "   ");
        assert!(!response.ok);
        assert_eq!(response.error_code.as_deref(), Some(ERROR_INVALID_INPUT));
        assert!(response.data.is_none());
    }

    #[test]
    fn malformed_references_are_invalid_input() {
        let (_dir, engine) = engine();
        let by_id = engine.evaluate_guess(&SecretRef::PuzzleId("nope".to_string()), "fish");
        assert_eq!(by_id.error_code.as_deref(), Some(ERROR_INVALID_INPUT));
        let by_date = engine.puzzle_on("18/10/2026");
        assert_eq!(by_date.error_code.as_deref(), Some(ERROR_INVALID_INPUT));
    }

    #[test]
    fn authoring_flow_schedules_and_serves_a_puzzle() {
        let (_dir, engine) = engine();
        assert!(engine.import_words(&["fish".to_string()]).ok);
        let seeded = engine.seed_patterns();
        assert!(seeded.data.unwrap().inserted > 0);

        let suggestions = engine.suggest_patterns("f-i-sh").data.unwrap();
        let pick = |sound: &str, letters: &str| {
            suggestions
                .iter()
                .find(|s| s.sound == sound)
                .and_then(|s| s.matches.iter().find(|p| p.letters == letters))
                .map(|p| p.id)
        };
        let ids = [pick("f", "gh"), pick("i", "o"), pick("sh", "ti")];
        assert!(ids.iter().all(Option::is_some));

        let composed = engine.compose_puzzle("fish", "ghoti", "f-i-sh", &ids, None);
        assert!(composed.ok, "{}", composed.message);
        let composed = composed.data.unwrap();
        assert_eq!(composed.component_count, 3);

        let served = engine.puzzle_on(&composed.date).data.unwrap();
        assert_eq!(served.id, composed.id);
        assert_eq!(served.length, 4);

        let guess = engine.evaluate_guess(&SecretRef::PuzzleId(composed.id.clone()), "fish");
        assert!(guess.data.unwrap().is_correct);

        let again = engine.compose_puzzle("fish", "ghoti", "f-i-sh", &ids, None);
        assert_eq!(again.error_code.as_deref(), Some("duplicate_puzzle"));
    }

    #[test]
    fn compose_reports_unknown_words_and_empty_word_sets() {
        let (_dir, engine) = engine();
        let composed = engine.compose_puzzle("fish", "ghoti", "", &[], None);
        assert_eq!(composed.error_code.as_deref(), Some("not_a_valid_word"));

        let random = engine.random_word();
        assert_eq!(random.error_code.as_deref(), Some("not_found"));
        assert!(engine.suggest_patterns(" - ").error_code.is_some());
    }

    #[test]
    fn envelope_serializes_with_stable_field_names() {
        let response: ApiResponse<String> = ApiResponse::failure("not_found", "missing");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error_code"], "not_found");
        assert!(json["data"].is_null());
    }
}
