//! In-process backend.
//!
//! Keeps the encoded JSON document in memory, so saves and loads go through
//! the same wire format as durable backends.

use crate::model::note::Note;
use crate::repo::note_repo::{decode_notes, encode_notes, NoteRepository, RepoError, RepoResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct InMemoryNoteRepository {
    document: Mutex<Option<String>>,
    saves: AtomicUsize,
}

impl InMemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the repository with a raw stored document.
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(document.into())),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Raw stored document, if anything has been saved or seeded.
    pub fn document(&self) -> RepoResult<Option<String>> {
        let guard = self.document.lock().map_err(|_| RepoError::LockPoisoned)?;
        Ok(guard.clone())
    }
}

impl NoteRepository for InMemoryNoteRepository {
    fn load_notes(&self) -> RepoResult<Vec<Note>> {
        match self.document()? {
            Some(document) => decode_notes(&document),
            None => Ok(Vec::new()),
        }
    }

    fn save_notes(&self, notes: &[Note]) -> RepoResult<()> {
        let document = encode_notes(notes)?;
        let mut guard = self.document.lock().map_err(|_| RepoError::LockPoisoned)?;
        *guard = Some(document);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
