//! Phonetic pattern catalog use-cases.
//!
//! # Responsibility
//! - Answer "which patterns produce these sounds" for puzzle authoring.
//! - Add single patterns and load catalogs (including the built-in seed).
//!
//! # Invariants
//! - Suggestions keep input token order; matches keep catalog order.
//! - A token without matches yields an empty list, never an error.
//! - Catalog loads skip exact duplicates silently; single adds reject them.

use crate::model::pattern::{NewPattern, PatternId, PatternValidationError, PhoneticPattern};
use crate::repo::error::RepoError;
use crate::repo::pattern_repo::PatternRepository;
use crate::repo::ImportReport;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Built-in catalog: `(letters, sound, reference)`.
const SEED_PATTERNS: &[(&str, &str, &str)] = &[
    // ghoti
    ("gh", "f", "enough"),
    ("o", "i", "women"),
    ("ti", "sh", "nation"),
    ("ph", "f", "phone"),
    // silent letters
    ("bt", "t", "debt"),
    ("pt", "t", "receipt"),
    ("cht", "t", "yacht"),
    ("tch", "ch", "watch"),
    ("dge", "j", "bridge"),
    ("gu", "g", "guitar"),
    ("rh", "r", "rhythm"),
    ("kn", "n", "knight"),
    ("mb", "m", "lamb"),
    // vowels
    ("ai", "ay", "rain"),
    ("ay", "ay", "day"),
    ("ei", "ee", "ceiling"),
    ("ey", "ee", "key"),
    ("y", "i", "gym"),
    ("y", "ee", "happy"),
    ("ie", "y", "pie"),
    ("ui", "oo", "fruit"),
    ("au", "aw", "autumn"),
    ("aw", "aw", "law"),
    // consonants
    ("sh", "sh", "shop"),
    ("th", "th", "think"),
    ("wh", "w", "what"),
    ("qu", "kw", "queen"),
    ("x", "ks", "box"),
    ("c", "s", "city"),
    ("c", "k", "cat"),
    ("ce", "s", "nice"),
    ("ci", "sh", "special"),
    // longer fragments
    ("tion", "shun", "action"),
    ("sion", "zhun", "vision"),
    ("cian", "shun", "musician"),
    ("ough", "aw", "bought"),
    ("augh", "aw", "caught"),
    ("eigh", "a", "neighbor"),
    ("igh", "i", "night"),
    ("aigh", "ay", "straight"),
    // doubled letters
    ("ff", "f", "off"),
    ("ll", "l", "ball"),
    ("ss", "s", "pass"),
    ("tt", "t", "butter"),
    ("ck", "k", "back"),
    ("ng", "ng", "sing"),
    ("nk", "nk", "think"),
    // tricky
    ("oo", "uh", "blood"),
    ("ou", "u", "country"),
    ("a", "o", "want"),
    ("o", "u", "son"),
    ("e", "i", "pretty"),
    ("i", "ee", "machine"),
    ("u", "oo", "put"),
];

/// Returns the built-in seed catalog in load order.
pub fn seed_patterns() -> Vec<NewPattern> {
    SEED_PATTERNS
        .iter()
        .map(|(letters, sound, reference)| NewPattern::new(letters, sound, reference))
        .collect()
}

/// Catalog entries producing one sound token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundSuggestion {
    pub sound: String,
    pub matches: Vec<PhoneticPattern>,
}

/// Service error for catalog use-cases.
#[derive(Debug)]
pub enum PatternServiceError {
    Invalid(PatternValidationError),
    DuplicatePattern(NewPattern),
    PatternInUse(PatternId),
    PatternNotFound(PatternId),
    Repo(RepoError),
}

impl PatternServiceError {
    /// Stable error code for transport layers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "invalid_input",
            Self::DuplicatePattern(_) => "duplicate_pattern",
            Self::PatternInUse(_) => "pattern_in_use",
            Self::PatternNotFound(_) => "not_found",
            Self::Repo(_) => "store_unavailable",
        }
    }
}

impl Display for PatternServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::DuplicatePattern(pattern) => write!(
                f,
                "pattern `{}` -> `{}` ({}) already exists",
                pattern.letters, pattern.sound, pattern.reference
            ),
            Self::PatternInUse(id) => write!(f, "pattern {id} is used by a puzzle"),
            Self::PatternNotFound(id) => write!(f, "pattern not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PatternServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PatternServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::InvalidPattern(err) => Self::Invalid(err),
            RepoError::DuplicatePattern(pattern) => Self::DuplicatePattern(pattern),
            RepoError::PatternInUse(id) => Self::PatternInUse(id),
            RepoError::PatternNotFound(id) => Self::PatternNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Catalog service facade over repository implementations.
pub struct PatternService<R: PatternRepository> {
    repo: R,
}

impl<R: PatternRepository> PatternService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns, per sound token, every catalog entry producing it.
    ///
    /// Tokens are trimmed and lowercased; `sound` in each result is that key.
    pub fn suggest<S: AsRef<str>>(
        &self,
        sounds: &[S],
    ) -> Result<Vec<SoundSuggestion>, PatternServiceError> {
        let started_at = Instant::now();
        let mut suggestions = Vec::with_capacity(sounds.len());
        for sound in sounds {
            // Echo the key actually looked up, not the raw author token.
            let sound = sound.as_ref().trim().to_lowercase();
            let matches = self.repo.find_by_sound(&sound)?;
            suggestions.push(SoundSuggestion { sound, matches });
        }

        info!(
            "event=pattern_suggest module=service status=ok sounds={} matches={} duration_ms={}",
            suggestions.len(),
            suggestions.iter().map(|s| s.matches.len()).sum::<usize>(),
            started_at.elapsed().as_millis()
        );
        Ok(suggestions)
    }

    /// Adds one pattern from raw author input.
    pub fn add_pattern(
        &self,
        letters: &str,
        sound: &str,
        reference: &str,
    ) -> Result<PhoneticPattern, PatternServiceError> {
        let pattern = NewPattern::new(letters, sound, reference);
        pattern.validate().map_err(PatternServiceError::Invalid)?;

        match self.repo.create(&pattern) {
            Ok(created) => {
                info!(
                    "event=pattern_add module=service status=ok pattern_id={}",
                    created.id
                );
                Ok(created)
            }
            Err(err) => {
                let err = PatternServiceError::from(err);
                warn!(
                    "event=pattern_add module=service status=error error_code={}",
                    err.code()
                );
                Err(err)
            }
        }
    }

    /// Loads patterns, skipping exact duplicates.
    pub fn import_patterns(
        &self,
        patterns: &[NewPattern],
    ) -> Result<ImportReport, PatternServiceError> {
        let report = self.repo.import(patterns)?;
        info!(
            "event=pattern_import module=service status=ok inserted={} skipped={} rejected={}",
            report.inserted, report.skipped, report.rejected
        );
        Ok(report)
    }

    /// Loads the built-in seed catalog; safe to run repeatedly.
    pub fn seed_default_catalog(&self) -> Result<ImportReport, PatternServiceError> {
        self.import_patterns(&seed_patterns())
    }

    pub fn get_pattern(&self, id: PatternId) -> Result<PhoneticPattern, PatternServiceError> {
        self.repo
            .find_by_id(id)?
            .ok_or(PatternServiceError::PatternNotFound(id))
    }

    pub fn list_patterns(&self) -> Result<Vec<PhoneticPattern>, PatternServiceError> {
        Ok(self.repo.list_all()?)
    }

    /// Deletes a pattern no puzzle references.
    pub fn delete_pattern(&self, id: PatternId) -> Result<(), PatternServiceError> {
        self.repo.delete(id)?;
        info!("event=pattern_delete module=service status=ok pattern_id={id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::seed_patterns;
    use std::collections::HashSet;

    #[test]
    fn seed_catalog_is_valid_and_unique() {
        let seeds = seed_patterns();
        let mut seen = HashSet::new();
        for pattern in &seeds {
            pattern.validate().unwrap();
            assert!(seen.insert(pattern.clone()), "duplicate seed {pattern:?}");
        }
        assert!(seeds.iter().any(|p| p.letters == "gh" && p.sound == "f"));
    }
}
