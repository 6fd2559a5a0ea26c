use ghotidle_core::db::migrations::latest_version;
use ghotidle_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "valid_words");
    assert_table_exists(&conn, "phonetic_patterns");
    assert_table_exists(&conn, "puzzles");
    assert_table_exists(&conn, "phonetic_components");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ghotidle.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "puzzles");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn schema_rejects_oversized_words_and_orphan_components() {
    let conn = open_db_in_memory().unwrap();

    let long_word = "a".repeat(51);
    assert!(conn
        .execute("INSERT INTO valid_words (word) VALUES (?1);", [long_word])
        .is_err());

    conn.execute(
        "INSERT INTO puzzles (uuid, secret, phonetic, puzzle_date)
         VALUES ('p1', 'fish', 'ghoti', '2026-10-18');",
        [],
    )
    .unwrap();
    // A component must name a pattern unless it is a keep-as-is slot.
    assert!(conn
        .execute(
            "INSERT INTO phonetic_components (puzzle_uuid, pattern_id, position, no_change)
             VALUES ('p1', NULL, 0, 0);",
            [],
        )
        .is_err());
    assert!(conn
        .execute(
            "INSERT INTO phonetic_components (puzzle_uuid, pattern_id, position, no_change)
             VALUES ('p1', 4242, 0, 0);",
            [],
        )
        .is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
