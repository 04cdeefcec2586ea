//! SQLite storage shim.
//!
//! The engine consumes a narrow storage contract: point insert, delete, and
//! read keyed by position, bulk renumbering of the position column over a
//! range predicate, a MIN/MAX bounds query, and all-or-nothing transactions.
//!
//! Everything here is a stateless helper over [`rusqlite::Connection`].
//! [`rusqlite::Transaction`] derefs to `Connection`, so the same helpers run
//! against a bare connection for read-only queries and inside a transaction
//! for multi-statement mutations.

use rusqlite::{params, Connection, OptionalExtension};

/// Table and index bootstrap. Idempotent; the index duplicates the primary
/// key and is kept for parity with the on-disk schema this format inherits.
const SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS queue (
        position INTEGER PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS index_queue ON queue(position);
";

pub(crate) fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}

/// Smallest and largest occupied positions; both `None` when the table is
/// empty (SQLite aggregates return NULL over zero rows).
pub(crate) fn position_bounds(conn: &Connection) -> rusqlite::Result<(Option<i64>, Option<i64>)> {
    conn.query_row("SELECT MIN(position), MAX(position) FROM queue", [], |row| {
        Ok((row.get(0)?, row.get(1)?))
    })
}

pub(crate) fn insert_record(conn: &Connection, position: i64, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO queue (position, value) VALUES (?1, ?2)",
        params![position, value],
    )?;
    Ok(())
}

/// Deletes the record at `position`, reporting whether a row existed.
pub(crate) fn delete_record(conn: &Connection, position: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM queue WHERE position = ?1", params![position])?;
    Ok(rows > 0)
}

pub(crate) fn value_at(conn: &Connection, position: i64) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM queue WHERE position = ?1",
        params![position],
        |row| row.get(0),
    )
    .optional()
}

/// Renumbers every record with `position >= from` by the signed `delta`.
///
/// Callers pick deltas so that every row lands in unoccupied key space;
/// the primary key is checked per row as the update walks the table.
pub(crate) fn shift_at_or_after(conn: &Connection, from: i64, delta: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE queue SET position = position + ?1 WHERE position >= ?2",
        params![delta, from],
    )
}

/// Renumbers every record with `position > after` by the signed `delta`.
pub(crate) fn shift_after(conn: &Connection, after: i64, delta: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE queue SET position = position + ?1 WHERE position > ?2",
        params![delta, after],
    )
}
