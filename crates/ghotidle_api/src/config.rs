//! Environment-driven configuration for the API boundary.
//!
//! # Invariants
//! - Values are read once per process and then reused.
//! - Unknown values fall back to defaults instead of failing.

use crate::api::Ghotidle;
use ghotidle_core::{ComposerConfig, Scheduling};
use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;

pub const DB_PATH_ENV: &str = "GHOTIDLE_DB_PATH";
const SCHEDULING_ENV: &str = "GHOTIDLE_SCHEDULING";
const RECORD_NO_CHANGE_ENV: &str = "GHOTIDLE_RECORD_NO_CHANGE";
const DEFAULT_DB_FILE_NAME: &str = "ghotidle.sqlite3";

static DEFAULT_ENGINE: OnceLock<Ghotidle> = OnceLock::new();

pub(crate) fn default_engine() -> &'static Ghotidle {
    DEFAULT_ENGINE.get_or_init(|| Ghotidle::new(resolve_db_path(), composer_config_from_env()))
}

/// Returns `GHOTIDLE_DB_PATH`, or `ghotidle.sqlite3` in the temp dir.
pub fn resolve_db_path() -> PathBuf {
    if let Ok(raw) = std::env::var(DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}

/// Reads `GHOTIDLE_SCHEDULING` (`fifo|manual`) and `GHOTIDLE_RECORD_NO_CHANGE`.
pub fn composer_config_from_env() -> ComposerConfig {
    let scheduling = std::env::var(SCHEDULING_ENV)
        .map(|value| parse_scheduling(&value))
        .unwrap_or_default();
    let record_no_change = std::env::var(RECORD_NO_CHANGE_ENV)
        .map(|value| parse_flag(&value))
        .unwrap_or(false);
    ComposerConfig {
        scheduling,
        record_no_change,
    }
}

fn parse_scheduling(value: &str) -> Scheduling {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "fifo" => Scheduling::Fifo,
        "manual" => Scheduling::Manual,
        other => {
            warn!("event=config_load module=api status=error key={SCHEDULING_ENV} value={other}");
            Scheduling::Fifo
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::{parse_flag, parse_scheduling};
    use ghotidle_core::Scheduling;

    #[test]
    fn scheduling_values_parse_with_fifo_fallback() {
        assert_eq!(parse_scheduling("MANUAL"), Scheduling::Manual);
        assert_eq!(parse_scheduling("fifo"), Scheduling::Fifo);
        assert_eq!(parse_scheduling("sometimes"), Scheduling::Fifo);
    }

    #[test]
    fn flag_values_parse() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" True "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}
