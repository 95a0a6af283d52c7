//! Per-note drag state machine.
//!
//! `Idle --pointer down on handle--> Dragging{offset} --pointer up--> Idle`
//!
//! The offset `pointer - note_position` is captured once at pointer-down and
//! held constant, so every pointer move maps to `pointer - offset`. The
//! controller only computes targets; applying them is the caller's job.

use crate::model::note::{NoteId, Offset, Position};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        offset: Offset,
    },
}

/// Drag tracking for one note. Holds the note by id only.
#[derive(Debug, Clone, PartialEq)]
pub struct DragController {
    note_id: NoteId,
    state: DragState,
}

impl DragController {
    pub fn new(note_id: NoteId) -> Self {
        Self {
            note_id,
            state: DragState::Idle,
        }
    }

    pub fn note_id(&self) -> NoteId {
        self.note_id
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Pointer pressed on the note's drag handle.
    ///
    /// A second press while already dragging re-captures the offset.
    pub fn begin(&mut self, pointer: Position, note_position: Position) {
        let offset = pointer - note_position;
        debug!(
            "event=drag_start module=drag note_id={} offset_x={} offset_y={}",
            self.note_id, offset.dx, offset.dy
        );
        self.state = DragState::Dragging { offset };
    }

    /// Where the note should be for this pointer position, if dragging.
    pub fn target_for(&self, pointer: Position) -> Option<Position> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { offset } => Some(pointer - offset),
        }
    }

    /// Pointer released anywhere. Returns whether a drag was in progress.
    pub fn end(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        if was_dragging {
            debug!("event=drag_end module=drag note_id={}", self.note_id);
        }
        self.state = DragState::Idle;
        was_dragging
    }
}
