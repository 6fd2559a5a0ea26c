//! Phonetic pattern catalog contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide exact and sound-indexed lookups over `phonetic_patterns`.
//! - Create single patterns and bulk-load catalogs with duplicate skipping.
//! - Guard deletion of patterns still referenced by puzzles.
//!
//! # Invariants
//! - No two rows share the same `(letters, sound, reference)` triple.
//! - Lookups that return several rows order them by catalog id.
//! - Write paths call `NewPattern::validate()` before SQL mutations.

use crate::model::pattern::{NewPattern, PatternId, PhoneticPattern};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::ImportReport;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const PATTERN_SELECT_SQL: &str = "SELECT id, letters, sound, reference FROM phonetic_patterns";

/// Catalog capability consumed by the engine.
pub trait PatternRepository {
    /// Returns every pattern producing `sound`, in catalog order.
    fn find_by_sound(&self, sound: &str) -> RepoResult<Vec<PhoneticPattern>>;
    fn find_by_id(&self, id: PatternId) -> RepoResult<Option<PhoneticPattern>>;
    fn exists_exact(&self, pattern: &NewPattern) -> RepoResult<bool>;
    /// Creates one pattern; an exact duplicate fails with `DuplicatePattern`.
    fn create(&self, pattern: &NewPattern) -> RepoResult<PhoneticPattern>;
    /// Inserts many patterns, silently skipping exact duplicates.
    fn import(&self, patterns: &[NewPattern]) -> RepoResult<ImportReport>;
    /// Returns the whole catalog in id order.
    fn list_all(&self) -> RepoResult<Vec<PhoneticPattern>>;
    /// Deletes an unreferenced pattern.
    fn delete(&self, id: PatternId) -> RepoResult<()>;
}

/// SQLite-backed pattern catalog.
pub struct SqlitePatternRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePatternRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PatternRepository for SqlitePatternRepository<'_> {
    fn find_by_sound(&self, sound: &str) -> RepoResult<Vec<PhoneticPattern>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PATTERN_SELECT_SQL} WHERE sound = ?1 ORDER BY id ASC;"))?;
        let mut rows = stmt.query([sound.trim().to_lowercase()])?;
        let mut patterns = Vec::new();
        while let Some(row) = rows.next()? {
            patterns.push(parse_pattern_row(row)?);
        }
        Ok(patterns)
    }

    fn find_by_id(&self, id: PatternId) -> RepoResult<Option<PhoneticPattern>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PATTERN_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_pattern_row(row)?));
        }
        Ok(None)
    }

    fn exists_exact(&self, pattern: &NewPattern) -> RepoResult<bool> {
        exists_exact_in(self.conn, pattern)
    }

    fn create(&self, pattern: &NewPattern) -> RepoResult<PhoneticPattern> {
        pattern.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if exists_exact_in(&tx, pattern)? {
            return Err(RepoError::DuplicatePattern(pattern.clone()));
        }
        tx.execute(
            "INSERT INTO phonetic_patterns (letters, sound, reference) VALUES (?1, ?2, ?3);",
            params![
                pattern.letters.as_str(),
                pattern.sound.as_str(),
                pattern.reference.as_str()
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(PhoneticPattern {
            id,
            letters: pattern.letters.clone(),
            sound: pattern.sound.clone(),
            reference: pattern.reference.clone(),
        })
    }

    fn import(&self, patterns: &[NewPattern]) -> RepoResult<ImportReport> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut report = ImportReport::default();
        {
            let mut insert = tx.prepare(
                "INSERT OR IGNORE INTO phonetic_patterns (letters, sound, reference)
                 VALUES (?1, ?2, ?3);",
            )?;
            for pattern in patterns {
                if pattern.validate().is_err() {
                    report.rejected += 1;
                    continue;
                }
                let changed = insert.execute(params![
                    pattern.letters.as_str(),
                    pattern.sound.as_str(),
                    pattern.reference.as_str()
                ])?;
                if changed == 1 {
                    report.inserted += 1;
                } else {
                    report.skipped += 1;
                }
            }
        }
        tx.commit()?;
        Ok(report)
    }

    fn list_all(&self) -> RepoResult<Vec<PhoneticPattern>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PATTERN_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut patterns = Vec::new();
        while let Some(row) = rows.next()? {
            patterns.push(parse_pattern_row(row)?);
        }
        Ok(patterns)
    }

    fn delete(&self, id: PatternId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let referenced: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM phonetic_components WHERE pattern_id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        if referenced == 1 {
            return Err(RepoError::PatternInUse(id));
        }

        let changed = tx.execute("DELETE FROM phonetic_patterns WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::PatternNotFound(id));
        }
        tx.commit()?;
        Ok(())
    }
}

fn exists_exact_in(conn: &Connection, pattern: &NewPattern) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM phonetic_patterns
            WHERE letters = ?1 AND sound = ?2 AND reference = ?3
        );",
        params![
            pattern.letters.as_str(),
            pattern.sound.as_str(),
            pattern.reference.as_str()
        ],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_pattern_row(row: &Row<'_>) -> RepoResult<PhoneticPattern> {
    Ok(PhoneticPattern {
        id: row.get("id")?,
        letters: row.get("letters")?,
        sound: row.get("sound")?,
        reference: row.get("reference")?,
    })
}
