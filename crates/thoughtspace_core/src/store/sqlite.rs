//! SQLite-backed key-value store.
//!
//! # Responsibility
//! - Persist key-value entries in the `kv_entries` table.
//! - Commit batched writes in one transaction.
//!
//! # Invariants
//! - The wrapped connection has migrations applied (see `db::open_db`).
//! - `apply_batch` commits all writes or none.

use super::{KeyValueStore, KvWrite, StoreResult};
use crate::db::{open_db, open_db_in_memory, DbResult};
use log::error;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const UPSERT_SQL: &str = "INSERT INTO kv_entries (key, value, updated_at)
    VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at;";
const DELETE_SQL: &str = "DELETE FROM kv_entries WHERE key = ?1;";

/// Key-value store over one SQLite connection.
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Opens (or creates) a store file and applies pending migrations.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Underlying connection, for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(UPSERT_SQL, params![key, value])?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.conn.execute(DELETE_SQL, [key])?;
        Ok(())
    }

    fn apply_batch(&self, writes: &[KvWrite]) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for write in writes {
            let result = match write {
                KvWrite::Set { key, value } => tx.execute(UPSERT_SQL, params![key, value]),
                KvWrite::Remove { key } => tx.execute(DELETE_SQL, [key]),
            };
            if let Err(err) = result {
                // Dropping `tx` rolls back the writes applied so far.
                error!(
                    "event=kv_batch module=store status=error writes={} error={}",
                    writes.len(),
                    err
                );
                return Err(err.into());
            }
        }
        tx.commit()?;
        Ok(())
    }
}
