//! Puzzle schedule contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist puzzles together with their phonetic components as one unit.
//! - Assign publication dates from stored state (FIFO) or check an exact one.
//! - Serve puzzles by id, secret and date.
//!
//! # Invariants
//! - Duplicate check, date assignment, puzzle insert and component inserts run
//!   in one `BEGIN IMMEDIATE` transaction; concurrent writers serialize on the
//!   write lock and each sees the other's committed date.
//! - Any failure inside that transaction rolls back every row it wrote.
//! - The latest date is always read from storage, never cached in-process.

use crate::model::pattern::PatternId;
use crate::model::puzzle::{
    ComposedPuzzle, DateAssignment, NewPuzzle, PhoneticComponent, Puzzle, PuzzleId,
};
use crate::repo::error::{RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

const PUZZLE_SELECT_SQL: &str = "SELECT uuid, secret, phonetic, puzzle_date FROM puzzles";

/// Schedule capability consumed by the composer and the serving layer.
pub trait PuzzleRepository {
    fn find_by_secret(&self, secret: &str) -> RepoResult<Option<Puzzle>>;
    /// Latest scheduled date, `None` on an empty schedule.
    fn max_date(&self) -> RepoResult<Option<NaiveDate>>;
    /// Atomically checks, dates and stores one puzzle with its components.
    ///
    /// # Errors
    /// - `DuplicateSecret` when the secret is already scheduled.
    /// - `DateTaken` when an exact date is already owned.
    /// - `UnknownPattern` when a component names a missing pattern.
    fn create_puzzle_with_components(
        &self,
        puzzle: &NewPuzzle,
        components: &[PhoneticComponent],
        assignment: DateAssignment,
    ) -> RepoResult<ComposedPuzzle>;
    fn find_by_date(&self, date: NaiveDate) -> RepoResult<Option<Puzzle>>;
    fn find_by_id(&self, id: PuzzleId) -> RepoResult<Option<Puzzle>>;
    /// Components of one puzzle ordered by position.
    fn components_for(&self, id: PuzzleId) -> RepoResult<Vec<PhoneticComponent>>;
}

/// SQLite-backed puzzle schedule.
pub struct SqlitePuzzleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePuzzleRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PuzzleRepository for SqlitePuzzleRepository<'_> {
    fn find_by_secret(&self, secret: &str) -> RepoResult<Option<Puzzle>> {
        find_one(
            self.conn,
            &format!("{PUZZLE_SELECT_SQL} WHERE secret = ?1;"),
            secret.trim().to_lowercase(),
        )
    }

    fn max_date(&self) -> RepoResult<Option<NaiveDate>> {
        max_date_in(self.conn)
    }

    fn create_puzzle_with_components(
        &self,
        puzzle: &NewPuzzle,
        components: &[PhoneticComponent],
        assignment: DateAssignment,
    ) -> RepoResult<ComposedPuzzle> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let secret_taken: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM puzzles WHERE secret = ?1);",
            [puzzle.secret.as_str()],
            |row| row.get(0),
        )?;
        if secret_taken == 1 {
            return Err(RepoError::DuplicateSecret(puzzle.secret.clone()));
        }

        let date = match assignment {
            DateAssignment::Fifo { today } => match max_date_in(&tx)? {
                Some(latest) => latest.succ_opt().ok_or_else(|| {
                    RepoError::InvalidData(format!("no calendar date follows {latest}"))
                })?,
                None => today,
            },
            DateAssignment::Exact(date) => {
                let date_taken: i64 = tx.query_row(
                    "SELECT EXISTS(SELECT 1 FROM puzzles WHERE puzzle_date = ?1);",
                    [format_date(date)],
                    |row| row.get(0),
                )?;
                if date_taken == 1 {
                    return Err(RepoError::DateTaken(date));
                }
                date
            }
        };

        let id = Uuid::new_v4();
        tx.execute(
            "INSERT INTO puzzles (uuid, secret, phonetic, puzzle_date)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                id.to_string(),
                puzzle.secret.as_str(),
                puzzle.phonetic.as_str(),
                format_date(date),
            ],
        )?;

        for component in components {
            if let Some(pattern_id) = component.pattern_id {
                if !pattern_exists_in(&tx, pattern_id)? {
                    return Err(RepoError::UnknownPattern(pattern_id));
                }
            }
            tx.execute(
                "INSERT INTO phonetic_components (puzzle_uuid, pattern_id, position, no_change)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    id.to_string(),
                    component.pattern_id,
                    i64::from(component.position),
                    i64::from(component.no_change),
                ],
            )?;
        }

        tx.commit()?;

        let mut components = components.to_vec();
        components.sort_by_key(|component| component.position);
        Ok(ComposedPuzzle {
            puzzle: Puzzle {
                id,
                secret: puzzle.secret.clone(),
                phonetic: puzzle.phonetic.clone(),
                date,
            },
            components,
        })
    }

    fn find_by_date(&self, date: NaiveDate) -> RepoResult<Option<Puzzle>> {
        find_one(
            self.conn,
            &format!("{PUZZLE_SELECT_SQL} WHERE puzzle_date = ?1;"),
            format_date(date),
        )
    }

    fn find_by_id(&self, id: PuzzleId) -> RepoResult<Option<Puzzle>> {
        find_one(
            self.conn,
            &format!("{PUZZLE_SELECT_SQL} WHERE uuid = ?1;"),
            id.to_string(),
        )
    }

    fn components_for(&self, id: PuzzleId) -> RepoResult<Vec<PhoneticComponent>> {
        let mut stmt = self.conn.prepare(
            "SELECT pattern_id, position, no_change
             FROM phonetic_components
             WHERE puzzle_uuid = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        let mut components = Vec::new();
        while let Some(row) = rows.next()? {
            components.push(parse_component_row(row)?);
        }
        Ok(components)
    }
}

fn find_one(conn: &Connection, sql: &str, key: String) -> RepoResult<Option<Puzzle>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([key])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_puzzle_row(row)?));
    }
    Ok(None)
}

fn max_date_in(conn: &Connection) -> RepoResult<Option<NaiveDate>> {
    let latest: Option<String> = conn
        .query_row("SELECT MAX(puzzle_date) FROM puzzles;", [], |row| row.get(0))
        .optional()?
        .flatten();
    latest.as_deref().map(parse_date).transpose()
}

fn pattern_exists_in(conn: &Connection, pattern_id: PatternId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM phonetic_patterns WHERE id = ?1);",
        [pattern_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_puzzle_row(row: &Row<'_>) -> RepoResult<Puzzle> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in puzzles.uuid"))
    })?;
    let date_text: String = row.get("puzzle_date")?;

    Ok(Puzzle {
        id,
        secret: row.get("secret")?,
        phonetic: row.get("phonetic")?,
        date: parse_date(&date_text)?,
    })
}

fn parse_component_row(row: &Row<'_>) -> RepoResult<PhoneticComponent> {
    let position: i64 = row.get("position")?;
    let position = u32::try_from(position).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid position `{position}` in phonetic_components.position"
        ))
    })?;
    let no_change = match row.get::<_, i64>("no_change")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid no_change value `{other}` in phonetic_components.no_change"
            )));
        }
    };

    Ok(PhoneticComponent {
        pattern_id: row.get("pattern_id")?,
        position,
        no_change,
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(value: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{value}` in puzzles.puzzle_date"))
    })
}
