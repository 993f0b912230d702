#![forbid(unsafe_code)]

//! evlog core
//!
//! An undo/redo event log: a grouped, cursor-tracked mirror of a document's
//! linear undo history.
//!
//! # Key Components
//!
//! - [`Event`] - One undoable action as reported by the document
//! - [`EventLogTree`] - Two-level history store with run grouping
//! - [`UndoObserver`] - Notification protocol the document's undo engine calls
//! - [`EventLog`] - The observer that keeps the tree and the cursor in step
//! - [`CursorObserver`] - Seam through which a view follows the cursor
//! - [`EventLogConfig`] - Grouping, labels and view behaviour
//!
//! # How it fits in the system
//! The document engine owns the real undo stack and notifies an
//! [`EventLog`] (usually through a [`CompositeUndoObserver`]). The log never
//! drives the engine. A view layer (`evlog-view`) attaches as a
//! [`CursorObserver`] and reflects every cursor move.

pub mod config;
pub mod error;
pub mod event;
pub mod log;
pub mod observer;
pub mod tree;

pub use config::{EventLogConfig, GroupingConfig, LabelConfig, ViewConfig};
pub use error::{ConfigError, ViewError};
pub use event::{Event, EventId, EventKind};
pub use log::{EventLog, LogRow, VerbState, Walk};
pub use observer::{
    ChangeCause, CompositeUndoObserver, CursorChange, CursorObserver, ObserverId,
    SharedObserver, TracingUndoObserver, UndoObserver,
};
pub use tree::{
    Appended, EventLogTree, LogNode, NodeId, NodeRef, Placement, Position, TreeEntry,
};
