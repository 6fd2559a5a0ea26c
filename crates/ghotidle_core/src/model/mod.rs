//! Domain model for phonetic puzzles.
//!
//! # Responsibility
//! - Define canonical data structures used by the puzzle engine.
//! - Own input normalization/validation shared by storage and services.
//!
//! # Invariants
//! - Patterns are shared and outlive puzzles; puzzles own their components.
//! - Nothing in this module touches storage.

pub mod guess;
pub mod pattern;
pub mod puzzle;
