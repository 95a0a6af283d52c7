//! JSON file backend.
//!
//! # Invariants
//! - A missing file loads as an empty collection.
//! - Writes replace the file atomically (temp file + rename in the same
//!   directory), so readers never observe a half-written document.

use crate::model::note::Note;
use crate::repo::note_repo::{decode_notes, encode_notes, NoteRepository, RepoError, RepoResult};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Stores the collection as one pretty-printed JSON array file.
#[derive(Debug, Clone)]
pub struct JsonFileNoteRepository {
    path: PathBuf,
}

impl JsonFileNoteRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NoteRepository for JsonFileNoteRepository {
    fn load_notes(&self) -> RepoResult<Vec<Note>> {
        match std::fs::read_to_string(&self.path) {
            Ok(document) => decode_notes(&document),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(io_error(&self.path, err)),
        }
    }

    fn save_notes(&self, notes: &[Note]) -> RepoResult<()> {
        let document = encode_notes(notes)?;
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|err| io_error(&dir, err))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|err| io_error(&dir, err))?;
        tmp.write_all(document.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|err| io_error(tmp.path(), err))?;
        tmp.persist(&self.path)
            .map_err(|err| io_error(&self.path, err.error))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "json"
    }
}

fn io_error(path: &Path, source: std::io::Error) -> RepoError {
    RepoError::Io {
        path: path.to_path_buf(),
        source,
    }
}
