#![forbid(unsafe_code)]

//! Undo-history controller.
//!
//! [`UndoHistory`] turns user actions in the history view into undo/redo
//! calls on the document:
//!
//! - selecting a row walks the document there, one step at a time;
//! - collapsing the run that holds the cursor at its head steps to the end
//!   of that run;
//! - expanding the run that holds the cursor re-selects the real current
//!   event.
//!
//! The document is reached through [`UndoEngine`]. Each step the engine
//! takes is reported back to the log through the normal observer path, so
//! the view follows the walk on its own.
//!
//! # Failure Modes
//!
//! - **Engine refuses a step**: the walk stops and
//!   [`HistoryError::EngineRefused`] reports how far it got.
//! - **Walk ends elsewhere**: the engine and log disagree about the history;
//!   [`HistoryError::WalkDiverged`].
//! - **Signal while the controller is busy**: dropped with a warning. This
//!   only happens if view callbacks bypass suppression.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use evlog_core::{EventLog, NodeRef, Position, Walk};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::sync::ViewHandlers;

/// The document side: performs one undo or redo step.
pub trait UndoEngine {
    /// Undo the last applied action. Returns `false` if there was none.
    fn undo(&mut self) -> bool;

    /// Redo the next undone action. Returns `false` if there was none.
    fn redo(&mut self) -> bool;
}

/// Direction of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Undo,
    Redo,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
        })
    }
}

/// Errors raised while driving the document from the view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("engine refused to {step} after {done} of {requested} steps")]
    EngineRefused {
        step: Step,
        done: usize,
        requested: usize,
    },

    #[error("walk to {target} ended at {reached}")]
    WalkDiverged { target: Position, reached: Position },

    #[error("{0} is not in the log")]
    UnknownTarget(Position),
}

/// Shared undo engine handle.
pub type SharedEngine = Rc<RefCell<dyn UndoEngine>>;

/// Re-enables log notifications when dropped.
struct NotificationBlock<'a> {
    log: &'a RefCell<EventLog>,
}

impl<'a> NotificationBlock<'a> {
    fn new(log: &'a RefCell<EventLog>) -> Self {
        log.borrow_mut().block_notifications(true);
        Self { log }
    }
}

impl Drop for NotificationBlock<'_> {
    fn drop(&mut self) {
        self.log.borrow_mut().block_notifications(false);
    }
}

/// Controller between the history view, the log and the document.
pub struct UndoHistory {
    log: Rc<RefCell<EventLog>>,
    engine: SharedEngine,
    last_error: Option<HistoryError>,
}

impl fmt::Debug for UndoHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoHistory")
            .field("log", &self.log)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl UndoHistory {
    /// Create a controller for `log` driving `engine`.
    #[must_use]
    pub fn new(log: Rc<RefCell<EventLog>>, engine: SharedEngine) -> Self {
        Self {
            log,
            engine,
            last_error: None,
        }
    }

    /// The log this controller reads.
    #[must_use]
    pub fn log(&self) -> &Rc<RefCell<EventLog>> {
        &self.log
    }

    /// Error of the last signal-driven action, if it failed.
    pub fn take_error(&mut self) -> Option<HistoryError> {
        self.last_error.take()
    }

    /// Walk the document to `target`.
    ///
    /// Returns the walk that was performed.
    pub fn on_selection_changed(&mut self, target: Position) -> Result<Walk, HistoryError> {
        let walk = {
            let log = self.log.borrow();
            if !log.tree().contains(target) {
                return Err(HistoryError::UnknownTarget(target));
            }
            log.steps_to(target)
        };
        debug!(%target, ?walk, "history selection");

        match walk {
            Walk::Stay => {}
            Walk::Undo(n) => self.step(Step::Undo, n)?,
            Walk::Redo(n) => self.step(Step::Redo, n)?,
        }

        let reached = self.log.borrow().current();
        if reached != target {
            return Err(HistoryError::WalkDiverged { target, reached });
        }
        Ok(walk)
    }

    /// Handle the run headed by `group` being collapsed.
    ///
    /// When the cursor sits on that head, collapsing means "the whole run":
    /// the remaining children are redone with log notifications blocked and
    /// the cursor is placed on the last one. Returns whether anything was
    /// redone.
    pub fn on_row_collapsed(&mut self, group: usize) -> Result<bool, HistoryError> {
        let head = NodeRef::head(group);
        let children = {
            let log = self.log.borrow();
            if log.current() != Position::At(head) {
                return Ok(false);
            }
            log.tree().get(head).map_or(0, |node| node.child_count())
        };
        if children == 0 {
            return Ok(false);
        }

        debug!(group, children, "collapse steps through run");
        let result = {
            let _block = NotificationBlock::new(&self.log);
            self.step(Step::Redo, children)
        };

        let done = match &result {
            Ok(()) => children,
            Err(HistoryError::EngineRefused { done, .. }) => *done,
            Err(_) => 0,
        };
        if done > 0 {
            self.log
                .borrow_mut()
                .set_current(Position::At(NodeRef::child(group, done - 1)));
        }
        result.map(|()| true)
    }

    /// Handle the run headed by `group` being expanded.
    ///
    /// If the cursor is inside that run, the view is re-synced so the real
    /// current event is selected. Returns whether it was.
    pub fn on_row_expanded(&mut self, group: usize) -> Result<bool, HistoryError> {
        let inside = self.log.borrow().current().group() == Some(group);
        if inside {
            trace!(group, "expanded run holds cursor, resyncing");
            self.log.borrow_mut().resync_view();
        }
        Ok(inside)
    }

    fn step(&self, step: Step, requested: usize) -> Result<(), HistoryError> {
        for done in 0..requested {
            let ok = {
                let mut engine = self.engine.borrow_mut();
                match step {
                    Step::Undo => engine.undo(),
                    Step::Redo => engine.redo(),
                }
            };
            if !ok {
                return Err(HistoryError::EngineRefused {
                    step,
                    done,
                    requested,
                });
            }
            trace!(%step, done = done + 1, requested, "history step");
        }
        Ok(())
    }

    /// View handlers that forward user actions to `this`.
    ///
    /// The handlers hold a weak reference; once the controller is dropped
    /// they do nothing.
    pub fn handlers(this: &Rc<RefCell<Self>>) -> ViewHandlers {
        let select = Rc::downgrade(this);
        let expand = Rc::downgrade(this);
        let collapse = Rc::downgrade(this);
        ViewHandlers::new()
            .with_selection_changed(move |target| {
                dispatch(&select, "selection_changed", |c| {
                    c.on_selection_changed(target).map(drop)
                });
            })
            .with_row_expanded(move |group| {
                dispatch(&expand, "row_expanded", |c| c.on_row_expanded(group).map(drop));
            })
            .with_row_collapsed(move |group| {
                dispatch(&collapse, "row_collapsed", |c| {
                    c.on_row_collapsed(group).map(drop)
                });
            })
    }
}

fn dispatch(
    controller: &Weak<RefCell<UndoHistory>>,
    signal: &'static str,
    f: impl FnOnce(&mut UndoHistory) -> Result<(), HistoryError>,
) {
    let Some(controller) = controller.upgrade() else {
        trace!(signal, "undo history gone, signal ignored");
        return;
    };
    let Ok(mut controller) = controller.try_borrow_mut() else {
        warn!(signal, "undo history busy, signal dropped");
        return;
    };
    if let Err(err) = f(&mut controller) {
        warn!(signal, error = %err, "history action failed");
        controller.last_error = Some(err);
    }
}
