#![forbid(unsafe_code)]

//! evlog view layer
//!
//! Keeps a tree-shaped history view in step with an
//! [`EventLog`](evlog_core::EventLog) and turns user actions in that view
//! back into undo/redo calls on the document.
//!
//! # Key Components
//!
//! - [`TreeView`] - What a widget must offer (rows, selection, expand state, signals)
//! - [`ViewSync`] - Pushes every cursor change into a view under suppression
//! - [`SyncHandle`] - Pause, block or disconnect a sync after handing it to a log
//! - [`HistoryTree`] - Headless, text-rendering tree view
//! - [`UndoHistory`] - Controller from view signals to the document's [`UndoEngine`]
//!
//! # How it fits in the system
//!
//! ```text
//! UndoEngine ──notify──> EventLog ──CursorChange──> ViewSync ──> TreeView
//!     ^                                                             │
//!     └────────────── UndoHistory <──── user signals ──────────────┘
//! ```
//!
//! Signals fired while `ViewSync` is pushing are suppressed, so the loop
//! only closes for real user actions.

pub mod history_tree;
pub mod suppress;
pub mod sync;
pub mod undo_history;
pub mod view;

pub use history_tree::{HistoryTree, TreeGuides, VisibleRow};
pub use suppress::{SuppressionFlag, SuppressionGuard};
pub use sync::{CallbackMap, SyncHandle, ViewHandlers, ViewSync};
pub use undo_history::{HistoryError, SharedEngine, Step, UndoEngine, UndoHistory};
pub use view::{Callback, CallbackKind, Connection, SignalHub, TreeView, ViewSignal};
