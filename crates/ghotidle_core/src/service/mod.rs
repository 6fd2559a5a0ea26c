//! Puzzle engine use-case services.
//!
//! # Responsibility
//! - Orchestrate store capabilities into authoring and play-time APIs.
//! - Keep transport layers decoupled from storage details.
//!
//! # Invariants
//! - Services depend on capability traits only, so they run unchanged
//!   against SQLite or in-memory stores.

pub mod guess_service;
pub mod pattern_service;
pub mod puzzle_service;
pub mod word_service;
