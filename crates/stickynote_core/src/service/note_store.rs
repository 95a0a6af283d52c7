//! Canonical in-memory note collection.
//!
//! # Responsibility
//! - Own the ordered note collection and its four mutations.
//! - Persist a full snapshot after every effective mutation.
//! - Notify subscribers after every state change.
//!
//! # Invariants
//! - Collection order is insertion order; deletion never reorders survivors.
//! - Ids are unique; `created_at` is immutable; `updated_at` never regresses.
//! - Lookup misses leave the collection untouched and emit nothing.
//! - Persistence and load failures are logged, never returned.

use crate::clock::{Clock, SystemClock};
use crate::model::note::{Note, NoteId, Position};
use crate::repo::note_repo::NoteRepository;
use crate::service::ids::NoteIdAllocator;
use crate::service::persist::{PersistMode, Persister};
use log::{info, warn};
use std::sync::Arc;

/// State-change notification delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// The collection was replaced by a load.
    Loaded { count: usize },
    Added(NoteId),
    ContentUpdated(NoteId),
    Moved(NoteId),
    Deleted(NoteId),
}

impl StoreEvent {
    /// Note the event refers to, if it is a single-note change.
    pub fn note_id(&self) -> Option<NoteId> {
        match self {
            Self::Loaded { .. } => None,
            Self::Added(id) | Self::ContentUpdated(id) | Self::Moved(id) | Self::Deleted(id) => {
                Some(*id)
            }
        }
    }
}

/// Handle returned by [`NoteStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&StoreEvent)>;

/// Single owner of the note collection.
pub struct NoteStore {
    notes: Vec<Note>,
    persister: Persister,
    clock: Arc<dyn Clock>,
    ids: NoteIdAllocator,
    default_position: Position,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl NoteStore {
    /// Creates an empty store persisting through `repo`.
    ///
    /// Call [`NoteStore::load`] to pull in previously stored notes.
    pub fn new(repo: Arc<dyn NoteRepository>, mode: PersistMode) -> Self {
        Self {
            notes: Vec::new(),
            persister: Persister::new(repo, mode),
            clock: Arc::new(SystemClock),
            ids: NoteIdAllocator::new(),
            default_position: Position::DEFAULT_NOTE,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Overrides where [`NoteStore::add`] places new notes.
    pub fn with_default_position(mut self, position: Position) -> Self {
        self.default_position = position;
        self
    }

    /// Replaces the collection with the stored one.
    ///
    /// Fails soft: a missing or unreadable store yields an empty collection.
    /// Loading does not trigger a save.
    pub fn load(&mut self) -> &[Note] {
        // Pending background writes must land before reading back.
        self.persister.flush();

        let repo = self.persister.repository();
        self.notes = match repo.load_notes() {
            Ok(notes) => {
                info!(
                    "event=notes_load module=store status=ok backend={} notes={}",
                    repo.backend_name(),
                    notes.len()
                );
                notes
            }
            Err(err) => {
                warn!(
                    "event=notes_load module=store status=error backend={} fallback=empty error={}",
                    repo.backend_name(),
                    err
                );
                Vec::new()
            }
        };

        for note in &self.notes {
            self.ids.observe(note.id);
        }
        self.notify(StoreEvent::Loaded {
            count: self.notes.len(),
        });
        &self.notes
    }

    /// Appends an empty note at the default position and returns its id.
    pub fn add(&mut self) -> NoteId {
        let now = self.clock.now();
        let id = self.ids.next(now);
        self.notes.push(Note::new(id, self.default_position, now));
        self.commit(StoreEvent::Added(id));
        id
    }

    /// Replaces the content of note `id`. Returns `false` on a lookup miss.
    pub fn update(&mut self, id: NoteId, content: impl Into<String>) -> bool {
        let now = self.clock.now();
        let Some(note) = self.find_mut(id) else {
            return false;
        };
        note.set_content(content.into(), now);
        self.commit(StoreEvent::ContentUpdated(id));
        true
    }

    /// Moves note `id` to `position`. Returns `false` on a lookup miss or
    /// when `position` has a NaN or infinite coordinate.
    pub fn move_note(&mut self, id: NoteId, position: Position) -> bool {
        // Non-finite coordinates would be written as `null` and make the
        // whole stored document unreadable.
        if !position.is_finite() {
            warn!(
                "event=note_move module=store status=rejected reason=non_finite note_id={} x={} y={}",
                id, position.x, position.y
            );
            return false;
        }
        let now = self.clock.now();
        let Some(note) = self.find_mut(id) else {
            return false;
        };
        note.set_position(position, now);
        self.commit(StoreEvent::Moved(id));
        true
    }

    /// Removes note `id`, keeping survivors in order. Returns `false` on a
    /// lookup miss.
    pub fn delete(&mut self, id: NoteId) -> bool {
        let Some(index) = self.notes.iter().position(|note| note.id == id) else {
            return false;
        };
        self.notes.remove(index);
        self.commit(StoreEvent::Deleted(id));
        true
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Blocks until every issued snapshot has reached the repository.
    pub fn flush(&self) {
        self.persister.flush();
    }

    /// Registers a callback invoked after every state change.
    pub fn subscribe(&mut self, observer: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn find_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|note| note.id == id)
    }

    fn commit(&mut self, event: StoreEvent) {
        self.persister.persist(self.notes.clone());
        self.notify(event);
    }

    fn notify(&mut self, event: StoreEvent) {
        for (_, observer) in &mut self.observers {
            observer(&event);
        }
    }
}
