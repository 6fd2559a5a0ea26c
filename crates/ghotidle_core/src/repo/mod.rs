//! Store contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the narrow capabilities the engine consumes (dictionary
//!   membership, pattern lookup, atomic puzzle scheduling).
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes persist normalized, validated model values only.
//! - Repository APIs return semantic errors in addition to DB transport errors.

pub mod error;
pub mod pattern_repo;
pub mod puzzle_repo;
pub mod word_repo;

use serde::{Deserialize, Serialize};

/// Outcome of a bulk load that skips existing rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Rows written.
    pub inserted: usize,
    /// Rows already present (or repeated within the input).
    pub skipped: usize,
    /// Rows failing normalization/validation.
    pub rejected: usize,
}
