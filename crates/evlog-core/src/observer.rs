#![forbid(unsafe_code)]

//! Observer protocols.
//!
//! Two seams meet here:
//!
//! - [`UndoObserver`]: the document's undo engine calls into this on every
//!   commit, undo, redo and history clear. [`EventLog`](crate::EventLog)
//!   implements it; [`CompositeUndoObserver`] fans a notification out to
//!   several observers.
//! - [`CursorObserver`]: the log calls into this after every cursor move so
//!   a view can follow. The view crate implements it.
//!
//! # Failure Modes
//!
//! - **Re-entrant notification**: an observer that makes the document commit,
//!   undo or redo from inside a notification re-borrows itself through the
//!   composite and panics (`RefCell` borrow rules). Notifications are a trace
//!   of what the engine did, not a place to drive it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::error::ViewError;
use crate::event::Event;
use crate::tree::{EventLogTree, Position};

/// Notifications sent by a document's undo engine.
///
/// Calls arrive synchronously, in the order the actions happened.
pub trait UndoObserver {
    /// `event` was undone.
    fn notify_undo_event(&mut self, event: &Event);

    /// `event` was redone.
    fn notify_redo_event(&mut self, event: &Event);

    /// `event` was committed as a new undoable action.
    fn notify_undo_commit_event(&mut self, event: &Event);

    /// Every undoable event was discarded.
    fn notify_clear_undo_event(&mut self);

    /// Every redoable event was discarded.
    fn notify_clear_redo_event(&mut self);
}

/// Shared handle to an observer registered with a composite.
pub type SharedObserver = Rc<RefCell<dyn UndoObserver>>;

/// Handle returned by [`CompositeUndoObserver::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Forwards every notification to its observers in registration order.
#[derive(Default)]
pub struct CompositeUndoObserver {
    observers: Vec<(ObserverId, SharedObserver)>,
    next_id: u64,
}

impl fmt::Debug for CompositeUndoObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeUndoObserver")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl CompositeUndoObserver {
    /// Create an empty composite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer.
    pub fn add(&mut self, observer: SharedObserver) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Unregister an observer. Returns whether it was registered.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(registered, _)| *registered != id);
        self.observers.len() != before
    }

    /// Number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether no observer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    fn each(&self, mut f: impl FnMut(&mut (dyn UndoObserver + 'static))) {
        for (_, observer) in &self.observers {
            f(&mut *observer.borrow_mut());
        }
    }
}

impl UndoObserver for CompositeUndoObserver {
    fn notify_undo_event(&mut self, event: &Event) {
        self.each(|o| o.notify_undo_event(event));
    }

    fn notify_redo_event(&mut self, event: &Event) {
        self.each(|o| o.notify_redo_event(event));
    }

    fn notify_undo_commit_event(&mut self, event: &Event) {
        self.each(|o| o.notify_undo_commit_event(event));
    }

    fn notify_clear_undo_event(&mut self) {
        self.each(|o| o.notify_clear_undo_event());
    }

    fn notify_clear_redo_event(&mut self) {
        self.each(|o| o.notify_clear_redo_event());
    }
}

/// Traces every notification at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingUndoObserver;

impl UndoObserver for TracingUndoObserver {
    fn notify_undo_event(&mut self, event: &Event) {
        debug!(event_id = %event.id(), kind = %event.kind(), "undo");
    }

    fn notify_redo_event(&mut self, event: &Event) {
        debug!(event_id = %event.id(), kind = %event.kind(), "redo");
    }

    fn notify_undo_commit_event(&mut self, event: &Event) {
        debug!(
            event_id = %event.id(),
            kind = %event.kind(),
            description = event.description(),
            "commit"
        );
    }

    fn notify_clear_undo_event(&mut self) {
        debug!("clear undo history");
    }

    fn notify_clear_redo_event(&mut self) {
        debug!("clear redo history");
    }
}

// ============================================================================
// Cursor observation
// ============================================================================

/// What moved the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCause {
    Commit,
    Undo,
    Redo,
    ClearUndo,
    ClearRedo,
    /// A view was attached to the log.
    Attach,
    /// Explicit re-push, e.g. after a blocked cascade.
    Resync,
}

/// One cursor update, as handed to a [`CursorObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorChange {
    /// Cursor before the update. Only meaningful against the tree when
    /// `structure_changed` is false or the cause is a commit.
    pub previous: Position,
    /// Cursor after the update.
    pub current: Position,
    pub cause: ChangeCause,
    /// Nodes were added or removed.
    pub structure_changed: bool,
    /// Run the cursor just left, if any. Views collapse it.
    pub left_group: Option<usize>,
}

/// Follows the log's cursor (a view sync layer).
pub trait CursorObserver {
    /// Called after every cursor update with the updated tree.
    fn cursor_changed(
        &mut self,
        tree: &EventLogTree,
        change: &CursorChange,
    ) -> Result<(), ViewError>;

    /// Called when the log drops or hands back this observer.
    fn detached(&mut self) {}
}
