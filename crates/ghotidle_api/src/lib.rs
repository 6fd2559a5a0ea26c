//! Caller-facing operations of the Ghotidle engine.
//!
//! # Responsibility
//! - Map serving-layer calls onto core services with one DB connection each.
//! - Resolve database path and composer configuration from the environment.
//!
//! # Invariants
//! - Exported operations never panic; every failure becomes an envelope with
//!   `ok=false` and a stable `error_code`.

mod api;
mod config;

pub use api::{
    ApiResponse, ComposedView, Ghotidle, PuzzleView, SecretRef, ERROR_INVALID_INPUT,
    ERROR_STORE_UNAVAILABLE,
};
pub use config::{composer_config_from_env, resolve_db_path, DB_PATH_ENV};

/// Returns the process-wide engine handle configured from the environment.
pub fn engine() -> &'static Ghotidle {
    config::default_engine()
}
