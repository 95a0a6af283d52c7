//! Sticky note domain model.
//!
//! # Responsibility
//! - Define the data structures shared by store, drag and persistence code.
//!
//! # Invariants
//! - Every note is identified by a `NoteId` unique within its collection.
//! - Deletion removes the record outright; there are no tombstones.

pub mod note;
