//! Note store, persistence scheduling and drag interaction.
//!
//! Control flow is one-directional: UI event -> [`board::Board`] ->
//! [`note_store::NoteStore`] mutation -> snapshot persist -> observers.

pub mod board;
pub mod drag;
pub mod ids;
pub mod note_store;
pub mod persist;
