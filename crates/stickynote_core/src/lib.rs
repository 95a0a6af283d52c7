//! Core of the sticky notes board.
//!
//! Owns the note collection, its mutations, drag interaction and
//! persistence. Rendering and window management live outside this crate.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, ConfigError, StorageBackend};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{
    format_timestamp, validate_collection, Note, NoteId, NoteValidationError, Offset, Position,
};
pub use repo::json_repo::JsonFileNoteRepository;
pub use repo::memory_repo::InMemoryNoteRepository;
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult};
pub use repo::sqlite_repo::SqliteNoteRepository;
pub use service::board::Board;
pub use service::drag::{DragController, DragState};
pub use service::note_store::{NoteStore, StoreEvent, SubscriptionId};
pub use service::persist::{PersistMode, Persister, MAX_HOLD_DEBOUNCES};

/// Minimal health-check API for wiring checks.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
