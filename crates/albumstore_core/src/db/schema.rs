//! Album table DDL and sample data.
//!
//! # Invariants
//! - `ensure_schema` is idempotent; it never alters an existing table.
//! - Sample rows are only written into an empty table.

use super::DbResult;
use rusqlite::{params, Connection};

const SCHEMA_SQL: &str = include_str!("schema.sql");

const SAMPLE_ALBUMS: &[(&str, &str, f64)] = &[
    ("Blue Train", "John Coltrane", 56.99),
    ("Giant Steps", "John Coltrane", 63.99),
    ("Jeru", "Gerry Mulligan", 17.99),
    ("Sarah Vaughan", "Sarah Vaughan", 34.98),
];

/// Creates the `album` table when it does not exist yet.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Inserts the sample catalogue into an empty `album` table.
///
/// Returns the number of inserted rows; `0` when the table already had data.
pub fn seed_sample_albums(conn: &mut Connection) -> DbResult<usize> {
    let tx = conn.transaction()?;
    let existing: i64 = tx.query_row("SELECT COUNT(*) FROM album;", [], |row| row.get(0))?;
    if existing > 0 {
        return Ok(0);
    }

    {
        let mut stmt =
            tx.prepare("INSERT INTO album (title, artist, price) VALUES (?1, ?2, ?3);")?;
        for (title, artist, price) in SAMPLE_ALBUMS {
            stmt.execute(params![title, artist, price])?;
        }
    }
    tx.commit()?;

    Ok(SAMPLE_ALBUMS.len())
}
