//! SQLite-backed key-value medium.
//!
//! # Responsibility
//! - Persist string entries in the `kv_entries` table.
//! - Keep SQL details inside the storage boundary.
//!
//! # Invariants
//! - One row per key; `set` is an upsert of the whole value.
//! - The connection is only touched under its mutex, and the lock is never
//!   held across store notifications.

use super::medium::{KeyValueMedium, MediumResult};
use crate::db::{open_db, open_db_in_memory};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Key-value medium stored in a SQLite database.
pub struct SqliteMedium {
    conn: Mutex<Connection>,
}

impl SqliteMedium {
    /// Opens (or creates) a database file and applies the schema.
    pub fn open(path: impl AsRef<Path>) -> MediumResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> MediumResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps a connection whose schema has already been applied.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueMedium for SqliteMedium {
    fn get(&self, key: &str) -> MediumResult<Option<String>> {
        let value = self
            .lock()
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> MediumResult<()> {
        self.lock().execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> MediumResult<()> {
        self.lock()
            .execute("DELETE FROM kv_entries WHERE key = ?1;", params![key])?;
        Ok(())
    }
}
