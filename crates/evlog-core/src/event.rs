#![forbid(unsafe_code)]

//! Undoable document events as seen by the log.
//!
//! An [`Event`] is created by the document's undo engine when a mutation is
//! committed. The engine hands a reference to every observer; the log clones
//! it into the node that wraps it and drops it when the node is pruned.

use std::fmt;

use serde::Serialize;

/// Identifier assigned by the document engine to each committed event.
///
/// Undo and redo notifications carry the same id as the commit, which lets
/// the log check that it is stepping over the event the engine expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EventId(u64);

impl EventId {
    /// Wrap a raw id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Action category of an event (`"move"`, `"delete"`, ...).
///
/// Consecutive events of the same kind are grouped in the log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EventKind(String);

impl EventKind {
    /// Create a kind from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The kind name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EventKind {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One undoable document change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    id: EventId,
    kind: EventKind,
    description: String,
}

impl Event {
    /// Create an event.
    #[must_use]
    pub fn new(id: EventId, kind: impl Into<EventKind>, description: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            description: description.into(),
        }
    }

    /// Engine-assigned id.
    #[must_use]
    pub fn id(&self) -> EventId {
        self.id
    }

    /// Action category.
    #[must_use]
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}
