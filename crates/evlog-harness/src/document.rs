#![forbid(unsafe_code)]

//! A fake document with a real undo stack.
//!
//! [`FakeDocument`] keeps applied and undone events on two stacks and
//! notifies its observers of every change, the way an editor's undo engine
//! does. It implements [`UndoEngine`] so the undo-history controller can
//! drive it.

use std::fmt;

use evlog_core::{
    CompositeUndoObserver, Event, EventId, EventKind, ObserverId, SharedObserver, UndoObserver,
};
use evlog_view::UndoEngine;
use tracing::trace;

/// In-memory document whose only state is its undo history.
#[derive(Default)]
pub struct FakeDocument {
    undo_stack: Vec<Event>,
    redo_stack: Vec<Event>,
    next_id: u64,
    observers: CompositeUndoObserver,
}

impl fmt::Debug for FakeDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeDocument")
            .field("undo", &self.undo_stack.len())
            .field("redo", &self.redo_stack.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl FakeDocument {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for undo notifications.
    pub fn add_observer(&mut self, observer: SharedObserver) -> ObserverId {
        self.observers.add(observer)
    }

    /// Unregister an observer.
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    /// Record a new undoable action. Discards the redo stack.
    pub fn commit(&mut self, kind: impl Into<EventKind>, description: impl Into<String>) -> Event {
        let event = Event::new(EventId::new(self.next_id), kind, description);
        self.next_id += 1;
        self.redo_stack.clear();
        self.undo_stack.push(event.clone());
        trace!(event_id = %event.id(), "document commit");
        self.observers.notify_undo_commit_event(&event);
        event
    }

    /// Undo the last applied action.
    pub fn undo(&mut self) -> bool {
        let Some(event) = self.undo_stack.pop() else {
            return false;
        };
        self.observers.notify_undo_event(&event);
        self.redo_stack.push(event);
        true
    }

    /// Redo the last undone action.
    pub fn redo(&mut self) -> bool {
        let Some(event) = self.redo_stack.pop() else {
            return false;
        };
        self.observers.notify_redo_event(&event);
        self.undo_stack.push(event);
        true
    }

    /// Forget every applied action.
    pub fn clear_undo(&mut self) {
        self.undo_stack.clear();
        self.observers.notify_clear_undo_event();
    }

    /// Forget every undone action.
    pub fn clear_redo(&mut self) {
        self.redo_stack.clear();
        self.observers.notify_clear_redo_event();
    }

    /// Applied actions, oldest first.
    #[must_use]
    pub fn applied(&self) -> &[Event] {
        &self.undo_stack
    }

    /// Undone actions, next to redo first.
    pub fn undone(&self) -> impl Iterator<Item = &Event> + '_ {
        self.redo_stack.iter().rev()
    }

    /// Whether an action can be undone.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether an action can be redone.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

impl UndoEngine for FakeDocument {
    fn undo(&mut self) -> bool {
        FakeDocument::undo(self)
    }

    fn redo(&mut self) -> bool {
        FakeDocument::redo(self)
    }
}
