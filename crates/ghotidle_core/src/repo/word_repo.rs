//! Dictionary gate: legal-word membership and random word selection.
//!
//! # Responsibility
//! - Answer "is this a legal secret/guess" for the composer.
//! - Pick a uniformly random word for practice rounds.
//! - Bulk-load word lists into the `valid_words` table.
//!
//! # Invariants
//! - Stored words are lowercase ASCII letters, at most 50 characters.
//! - Membership is case-insensitive.
//! - Random selection draws a uniform index over the whole set; it never
//!   depends on insertion order.

use crate::model::pattern::is_ascii_word;
use crate::model::puzzle::MAX_SECRET_CHARS;
use crate::repo::error::RepoResult;
use crate::repo::ImportReport;
use rand::Rng;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::collections::BTreeSet;

/// Membership capability consumed by the engine.
pub trait Dictionary {
    /// Returns whether `word` is a legal secret.
    fn contains(&self, word: &str) -> RepoResult<bool>;
    /// Returns a uniformly random word, or `None` for an empty set.
    fn pick_random(&self) -> RepoResult<Option<String>>;
}

/// SQLite-backed dictionary over `valid_words`.
pub struct SqliteDictionary<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDictionary<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts words, skipping existing ones, in one transaction.
    ///
    /// Entries that do not normalize to a plain ASCII word are counted as
    /// rejected and not stored.
    pub fn import_words<I, S>(&self, words: I) -> RepoResult<ImportReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut report = ImportReport::default();
        {
            let mut insert = tx.prepare("INSERT OR IGNORE INTO valid_words (word) VALUES (?1);")?;
            for raw in words {
                let raw = raw.as_ref();
                if raw.trim().is_empty() {
                    continue;
                }
                let Some(word) = normalize_word(raw) else {
                    report.rejected += 1;
                    continue;
                };
                if insert.execute([word.as_str()])? == 1 {
                    report.inserted += 1;
                } else {
                    report.skipped += 1;
                }
            }
        }
        tx.commit()?;
        Ok(report)
    }

    /// Returns the number of stored words.
    pub fn word_count(&self) -> RepoResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM valid_words;", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

impl Dictionary for SqliteDictionary<'_> {
    fn contains(&self, word: &str) -> RepoResult<bool> {
        let Some(word) = normalize_word(word) else {
            return Ok(false);
        };
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM valid_words WHERE word = ?1);",
            [word.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn pick_random(&self) -> RepoResult<Option<String>> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM valid_words;", [], |row| row.get(0))?;
        if count <= 0 {
            return Ok(None);
        }

        let offset = rand::thread_rng().gen_range(0..count);
        let word = self
            .conn
            .query_row(
                "SELECT word FROM valid_words ORDER BY word LIMIT 1 OFFSET ?1;",
                [offset],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(word)
    }
}

/// In-memory dictionary, for tests and embedders without a database.
#[derive(Debug, Clone, Default)]
pub struct MemoryDictionary {
    words: BTreeSet<String>,
}

impl MemoryDictionary {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .filter_map(|word| normalize_word(word.as_ref()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Dictionary for MemoryDictionary {
    fn contains(&self, word: &str) -> RepoResult<bool> {
        Ok(normalize_word(word).is_some_and(|word| self.words.contains(&word)))
    }

    fn pick_random(&self) -> RepoResult<Option<String>> {
        if self.words.is_empty() {
            return Ok(None);
        }
        let index = rand::thread_rng().gen_range(0..self.words.len());
        Ok(self.words.iter().nth(index).cloned())
    }
}

impl<D: Dictionary + ?Sized> Dictionary for &D {
    fn contains(&self, word: &str) -> RepoResult<bool> {
        (**self).contains(word)
    }

    fn pick_random(&self) -> RepoResult<Option<String>> {
        (**self).pick_random()
    }
}

/// Normalizes one dictionary entry; `None` when it is not a storable word.
pub fn normalize_word(word: &str) -> Option<String> {
    let normalized = word.trim().to_lowercase();
    if normalized.chars().count() > MAX_SECRET_CHARS || !is_ascii_word(&normalized) {
        return None;
    }
    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::{normalize_word, Dictionary, MemoryDictionary};
    use std::collections::HashSet;

    #[test]
    fn normalize_word_accepts_plain_words_only() {
        assert_eq!(normalize_word(" Fish "), Some("fish".to_string()));
        assert_eq!(normalize_word("don't"), None);
        assert_eq!(normalize_word(""), None);
        assert_eq!(normalize_word(&"a".repeat(51)), None);
    }

    #[test]
    fn memory_dictionary_membership_is_case_insensitive() {
        let dictionary = MemoryDictionary::new(["fish", "Ghost"]);
        assert!(dictionary.contains("FISH").unwrap());
        assert!(dictionary.contains("ghost").unwrap());
        assert!(!dictionary.contains("ghoti").unwrap());
    }

    #[test]
    fn memory_dictionary_random_pick_reaches_every_word() {
        let dictionary = MemoryDictionary::new(["ant", "bee", "cat"]);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            seen.insert(dictionary.pick_random().unwrap().unwrap());
        }
        assert_eq!(seen.len(), 3);
        assert_eq!(MemoryDictionary::default().pick_random().unwrap(), None);
    }
}
