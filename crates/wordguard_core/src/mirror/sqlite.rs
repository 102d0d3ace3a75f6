//! Mirror store backed by a separate SQLite database.
//!
//! Stands in for a store owned by another process: it never shares a
//! connection with the local word store.

use super::types::{MirrorError, MirrorRecord, MirrorResult, MirrorStore};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

const MIRROR_SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS mirror_words (
    id INTEGER PRIMARY KEY,
    text TEXT NOT NULL,
    matched INTEGER NOT NULL DEFAULT 0
);";

/// SQLite-backed external mirror.
pub struct SqliteMirrorStore {
    authority: String,
    conn: Mutex<Connection>,
    supports_wipe: bool,
}

impl SqliteMirrorStore {
    /// Opens or creates a mirror database file.
    pub fn open(authority: impl Into<String>, path: impl AsRef<Path>) -> MirrorResult<Self> {
        let conn = Connection::open(path).map_err(unavailable)?;
        Self::from_connection(authority.into(), conn)
    }

    /// Opens a private in-memory mirror.
    pub fn open_in_memory(authority: impl Into<String>) -> MirrorResult<Self> {
        let conn = Connection::open_in_memory().map_err(unavailable)?;
        Self::from_connection(authority.into(), conn)
    }

    /// Marks whether the hosting platform supports `wipe`.
    pub fn with_wipe_support(mut self, supported: bool) -> Self {
        self.supports_wipe = supported;
        self
    }

    fn from_connection(authority: String, conn: Connection) -> MirrorResult<Self> {
        conn.execute_batch(MIRROR_SCHEMA_SQL).map_err(unavailable)?;
        Ok(Self {
            authority,
            conn: Mutex::new(conn),
            supports_wipe: true,
        })
    }
}

impl MirrorStore for SqliteMirrorStore {
    fn authority(&self) -> &str {
        &self.authority
    }

    fn insert(&self, record: &MirrorRecord) -> MirrorResult<()> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.execute(
            "INSERT OR REPLACE INTO mirror_words (id, text, matched) VALUES (?1, ?2, ?3);",
            params![record.id, record.text.as_str(), record.matched],
        )
        .map_err(|err| MirrorError::WriteFailed(err.to_string()))?;
        Ok(())
    }

    fn fetch_all(&self) -> MirrorResult<Vec<MirrorRecord>> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stmt = conn
            .prepare("SELECT id, text, matched FROM mirror_words ORDER BY id ASC;")
            .map_err(fetch_failed)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(MirrorRecord {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    matched: row.get::<_, i64>(2)? > 0,
                })
            })
            .map_err(fetch_failed)?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|err| MirrorError::Malformed(err.to_string()))
    }

    fn wipe(&self) -> MirrorResult<()> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.execute("DELETE FROM mirror_words;", [])
            .map_err(|err| MirrorError::WriteFailed(err.to_string()))?;
        Ok(())
    }

    fn supports_wipe(&self) -> bool {
        self.supports_wipe
    }
}

fn unavailable(err: rusqlite::Error) -> MirrorError {
    MirrorError::NotAvailable(err.to_string())
}

fn fetch_failed(err: rusqlite::Error) -> MirrorError {
    MirrorError::FetchFailed(err.to_string())
}
