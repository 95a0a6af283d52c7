//! Note id allocation.
//!
//! Ids are `max(last + 1, wall-clock millis)`: strictly increasing within a
//! process, never reused, and in the same range as ids stored by earlier
//! versions that used raw millisecond timestamps.

use crate::model::note::NoteId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default)]
pub struct NoteIdAllocator {
    last: NoteId,
}

impl NoteIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an id that already exists so it is never handed out again.
    pub fn observe(&mut self, id: NoteId) {
        self.last = self.last.max(id);
    }

    /// Returns a fresh id, strictly greater than every id seen so far.
    pub fn next(&mut self, now: DateTime<Utc>) -> NoteId {
        let wall_millis = NoteId::try_from(now.timestamp_millis()).unwrap_or(0);
        let id = wall_millis.max(self.last.saturating_add(1));
        self.last = id;
        id
    }
}
