//! SQLite key-value backend.
//!
//! The collection is an opaque JSON blob stored under one key of the
//! `kv_store` table; SQLite provides durability, not structure.
//!
//! # Invariants
//! - Each save is a single upsert, so the stored blob is always complete.
//! - A missing key loads as an empty collection.

use crate::db::{open_db, open_db_in_memory};
use crate::model::note::Note;
use crate::repo::note_repo::{decode_notes, encode_notes, NoteRepository, RepoError, RepoResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Key under which the note collection blob is stored.
pub const NOTES_KEY: &str = "notes";

/// SQLite-backed key-value note repository.
pub struct SqliteNoteRepository {
    conn: Mutex<Connection>,
    key: String,
}

impl SqliteNoteRepository {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self::with_key(conn, NOTES_KEY)
    }

    /// Uses a custom blob key, e.g. to keep several boards in one file.
    pub fn with_key(conn: Connection, key: impl Into<String>) -> Self {
        Self {
            conn: Mutex::new(conn),
            key: key.into(),
        }
    }

    /// Opens (or creates) the database file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn conn(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::LockPoisoned)
    }
}

impl NoteRepository for SqliteNoteRepository {
    fn load_notes(&self) -> RepoResult<Vec<Note>> {
        let conn = self.conn()?;
        let document: Option<String> = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                params![self.key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match document {
            Some(document) => decode_notes(&document),
            None => Ok(Vec::new()),
        }
    }

    fn save_notes(&self, notes: &[Note]) -> RepoResult<()> {
        let document = encode_notes(notes)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![
                self.key.as_str(),
                document,
                Utc::now().timestamp_millis()
            ],
        )?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
