//! Repository contract shared by every note backend.

use crate::db::DbError;
use crate::model::note::{validate_collection, Note, NoteValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure while loading or saving a note collection.
#[derive(Debug)]
pub enum RepoError {
    /// File-system failure on the backing file.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Db(DbError),
    /// Stored document is not a valid JSON note array.
    Serialization(serde_json::Error),
    /// Stored document decodes but breaks note invariants.
    Validation(NoteValidationError),
    /// A previous writer panicked while holding the backend lock.
    LockPoisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error on `{}`: {source}", path.display()),
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "invalid notes document: {err}"),
            Self::Validation(err) => write!(f, "invalid persisted notes: {err}"),
            Self::LockPoisoned => write!(f, "note repository lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::LockPoisoned => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Durable home of the note collection.
///
/// Implementations treat every save as a full-state snapshot overwrite, so
/// overlapping or reordered writes resolve as last-write-wins.
pub trait NoteRepository: Send + Sync {
    /// Returns the stored collection, or an empty one when nothing is stored.
    fn load_notes(&self) -> RepoResult<Vec<Note>>;

    /// Replaces the stored collection with `notes`.
    fn save_notes(&self, notes: &[Note]) -> RepoResult<()>;

    /// Short backend name for log lines.
    fn backend_name(&self) -> &'static str;
}

/// Decodes a stored JSON array and validates it. Blank documents are empty.
pub fn decode_notes(document: &str) -> RepoResult<Vec<Note>> {
    if document.trim().is_empty() {
        return Ok(Vec::new());
    }
    let notes: Vec<Note> = serde_json::from_str(document)?;
    validate_collection(&notes)?;
    Ok(notes)
}

/// Encodes a collection as the JSON array wire document.
///
/// Refuses collections that [`decode_notes`] would reject, so a bad snapshot
/// never replaces a readable document.
pub fn encode_notes(notes: &[Note]) -> RepoResult<String> {
    validate_collection(notes)?;
    Ok(serde_json::to_string_pretty(notes)?)
}
