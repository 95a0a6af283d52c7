//! Input/view event facade over the note store.
//!
//! # Responsibility
//! - Translate discrete UI events into store mutations.
//! - Keep one drag controller per note and route pointer events to them.
//!
//! # Invariants
//! - Pointer moves and pointer-up reach every controller, mirroring
//!   document-level listeners; only dragging controllers react.
//! - Deleting a note discards its controller and any drag in progress.

use crate::model::note::{Note, NoteId, Position};
use crate::service::drag::DragController;
use crate::service::note_store::{NoteStore, StoreEvent, SubscriptionId};
use std::collections::BTreeMap;

pub struct Board {
    store: NoteStore,
    drags: BTreeMap<NoteId, DragController>,
}

impl Board {
    /// Wraps a store, creating idle controllers for the notes it holds.
    pub fn new(store: NoteStore) -> Self {
        let mut board = Self {
            store,
            drags: BTreeMap::new(),
        };
        board.sync_controllers();
        board
    }

    /// Reloads the stored collection; all drags are dropped.
    pub fn load(&mut self) -> &[Note] {
        self.store.load();
        self.drags.clear();
        self.sync_controllers();
        self.store.notes()
    }

    pub fn on_add_clicked(&mut self) -> NoteId {
        let id = self.store.add();
        self.drags.insert(id, DragController::new(id));
        id
    }

    pub fn on_content_changed(&mut self, id: NoteId, text: impl Into<String>) -> bool {
        self.store.update(id, text)
    }

    /// Pointer pressed on the drag handle of note `id`.
    ///
    /// Returns `false` when the note does not exist.
    pub fn on_drag_start(&mut self, id: NoteId, pointer: Position) -> bool {
        let Some(position) = self.store.get(id).map(|note| note.position) else {
            return false;
        };
        self.drags
            .entry(id)
            .or_insert_with(|| DragController::new(id))
            .begin(pointer, position);
        true
    }

    /// Pointer moved anywhere. Returns how many notes were moved.
    pub fn on_drag_move(&mut self, pointer: Position) -> usize {
        let targets: Vec<(NoteId, Position)> = self
            .drags
            .values()
            .filter_map(|drag| drag.target_for(pointer).map(|target| (drag.note_id(), target)))
            .collect();

        let mut moved = 0;
        for (id, target) in targets {
            if self.store.move_note(id, target) {
                moved += 1;
            }
        }
        moved
    }

    /// Pointer released anywhere. Returns how many drags ended.
    pub fn on_drag_end(&mut self) -> usize {
        self.drags
            .values_mut()
            .map(|drag| drag.end())
            .filter(|ended| *ended)
            .count()
    }

    pub fn on_delete_clicked(&mut self, id: NoteId) -> bool {
        self.drags.remove(&id);
        self.store.delete(id)
    }

    /// Ids of notes currently being dragged.
    pub fn dragging(&self) -> Vec<NoteId> {
        self.drags
            .values()
            .filter(|drag| drag.is_dragging())
            .map(DragController::note_id)
            .collect()
    }

    pub fn notes(&self) -> &[Note] {
        self.store.notes()
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        self.store.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn flush(&self) {
        self.store.flush();
    }

    fn sync_controllers(&mut self) {
        for note in self.store.notes() {
            self.drags
                .entry(note.id)
                .or_insert_with(|| DragController::new(note.id));
        }
    }
}
