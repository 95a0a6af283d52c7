//! Sticky note domain model.
//!
//! # Responsibility
//! - Define the canonical note record and its canvas geometry.
//! - Own the wire shape used by every persistence backend.
//!
//! # Invariants
//! - `id` is unique within one collection.
//! - `created_at <= updated_at` for every valid note.
//! - `created_at` never changes after construction.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::{Add, Sub};

/// Stable identifier of one note inside a collection.
///
/// Serialized as a plain JSON integer to stay compatible with stored
/// collections whose ids were wall-clock milliseconds.
pub type NoteId = u64;

/// Label format used by note footers, e.g. `Mar 5, 2024 09:07`.
const TIMESTAMP_LABEL_FORMAT: &str = "%b %-d, %Y %H:%M";

/// A point in canvas pixel space. The canvas is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Where freshly added notes land.
    pub const DEFAULT_NOTE: Position = Position { x: 50.0, y: 50.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// `false` for NaN or infinite coordinates, which JSON cannot carry.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Vector difference between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

impl Sub for Position {
    type Output = Offset;

    fn sub(self, rhs: Position) -> Offset {
        Offset::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Sub<Offset> for Position {
    type Output = Position;

    fn sub(self, rhs: Offset) -> Position {
        Position::new(self.x - rhs.dx, self.y - rhs.dy)
    }
}

impl Add<Offset> for Position {
    type Output = Position;

    fn add(self, rhs: Offset) -> Position {
        Position::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

/// Validation failures for single notes and whole collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// `updated_at` precedes `created_at`.
    TimestampsOutOfOrder {
        id: NoteId,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    },
    /// The same id appears more than once in one collection.
    DuplicateId(NoteId),
    /// A coordinate is NaN or infinite.
    NonFinitePosition(NoteId),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimestampsOutOfOrder {
                id,
                created_at,
                updated_at,
            } => write!(
                f,
                "note {id}: updatedAt ({}) must be >= createdAt ({})",
                updated_at.to_rfc3339(),
                created_at.to_rfc3339()
            ),
            Self::DuplicateId(id) => write!(f, "duplicate note id {id}"),
            Self::NonFinitePosition(id) => write!(f, "note {id}: position is not finite"),
        }
    }
}

impl Error for NoteValidationError {}

/// One sticky note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    /// Free text, no length limit.
    pub content: String,
    pub position: Position,
    /// Set once at creation.
    pub created_at: DateTime<Utc>,
    /// Stamped on every content or position change.
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Creates an empty note at `position`, stamped with `now`.
    pub fn new(id: NoteId, position: Position, now: DateTime<Utc>) -> Self {
        Self {
            id,
            content: String::new(),
            position,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks per-note invariants.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.updated_at < self.created_at {
            return Err(NoteValidationError::TimestampsOutOfOrder {
                id: self.id,
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        if !self.position.is_finite() {
            return Err(NoteValidationError::NonFinitePosition(self.id));
        }
        Ok(())
    }

    /// Replaces content and stamps `updated_at`.
    pub fn set_content(&mut self, content: String, now: DateTime<Utc>) {
        self.content = content;
        self.touch(now);
    }

    /// Replaces position and stamps `updated_at`.
    pub fn set_position(&mut self, position: Position, now: DateTime<Utc>) {
        self.position = position;
        self.touch(now);
    }

    pub fn created_label(&self, offset: &FixedOffset) -> String {
        format_timestamp(&self.created_at, offset)
    }

    pub fn updated_label(&self, offset: &FixedOffset) -> String {
        format_timestamp(&self.updated_at, offset)
    }

    // A clock stepping backwards must not break `created_at <= updated_at`
    // or make `updated_at` regress.
    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.updated_at).max(self.created_at);
    }
}

/// Validates every note and checks id uniqueness across the collection.
pub fn validate_collection(notes: &[Note]) -> Result<(), NoteValidationError> {
    let mut seen = HashSet::with_capacity(notes.len());
    for note in notes {
        note.validate()?;
        if !seen.insert(note.id) {
            return Err(NoteValidationError::DuplicateId(note.id));
        }
    }
    Ok(())
}

/// Formats a timestamp as a short human label in the given offset.
pub fn format_timestamp(timestamp: &DateTime<Utc>, offset: &FixedOffset) -> String {
    timestamp
        .with_timezone(offset)
        .format(TIMESTAMP_LABEL_FORMAT)
        .to_string()
}
