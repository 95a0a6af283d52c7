//! Persistence backends for the note collection.
//!
//! # Responsibility
//! - Define the load/save contract the store persists through.
//! - Keep file, SQLite and in-process details out of the store.
//!
//! # Invariants
//! - A save always writes the full collection; there are no partial updates.
//! - "Nothing stored yet" loads as an empty collection, never an error.
//! - Loaded collections are validated before they reach the store.

pub mod json_repo;
pub mod memory_repo;
pub mod note_repo;
pub mod sqlite_repo;
