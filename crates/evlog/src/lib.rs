#![forbid(unsafe_code)]

//! evlog public facade.
//!
//! Re-exports the log model from `evlog-core` and the view layer from
//! `evlog-view`, plus [`bind_history`] to wire a view to a log and an undo
//! engine in one call.
//!
//! ```ignore
//! use evlog::prelude::*;
//!
//! let log = Rc::new(RefCell::new(EventLog::new(config.clone())));
//! engine.borrow_mut().add_observer(log.clone());
//! let tree = HistoryTree::new(&config);
//! let binding = evlog::bind_history(&log, engine, tree.clone());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

// --- Core re-exports -------------------------------------------------------

pub use evlog_core::{
    Appended, ChangeCause, CompositeUndoObserver, ConfigError, CursorChange, CursorObserver,
    Event, EventId, EventKind, EventLog, EventLogConfig, EventLogTree, GroupingConfig,
    LabelConfig, LogNode, LogRow, NodeId, NodeRef, ObserverId, Placement, Position,
    SharedObserver, TracingUndoObserver, TreeEntry, UndoObserver, VerbState, ViewConfig,
    ViewError, Walk,
};

// --- View re-exports -------------------------------------------------------

pub use evlog_view::{
    Callback, CallbackKind, Connection, HistoryError, HistoryTree, SharedEngine, SignalHub, Step,
    SuppressionFlag, SuppressionGuard, SyncHandle, TreeGuides, TreeView, UndoEngine, UndoHistory,
    ViewHandlers, ViewSignal, ViewSync, VisibleRow,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error for evlog users.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Standard result type for evlog APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Wiring ---------------------------------------------------------------

/// Handles kept by the caller after [`bind_history`].
#[derive(Debug, Clone)]
pub struct HistoryBinding {
    /// Controller turning user actions into engine steps.
    pub controller: Rc<RefCell<UndoHistory>>,
    /// Control handle of the sync attached to the log.
    pub sync: SyncHandle,
}

impl HistoryBinding {
    /// Stop pushing cursor changes into the view, e.g. around a bulk load.
    pub fn pause(&self) {
        self.sync.pause();
    }

    /// Resume pushes and bring the view up to date at once.
    pub fn resume(&self) {
        self.sync.resume();
        let log = Rc::clone(self.controller.borrow().log());
        log.borrow_mut().resync_view();
        debug!("history view resumed");
    }
}

/// Connect `view` to `log` and `engine`.
///
/// Builds the [`UndoHistory`] controller, registers its handlers with the
/// view through a [`ViewSync`], and attaches that sync to the log, which
/// pushes the current state into the view at once. View behaviour comes
/// from the log's configuration.
///
/// The caller must already have registered `log` as an observer of the
/// engine.
pub fn bind_history<V: TreeView + 'static>(
    log: &Rc<RefCell<EventLog>>,
    engine: SharedEngine,
    view: V,
) -> HistoryBinding {
    let controller = Rc::new(RefCell::new(UndoHistory::new(Rc::clone(log), engine)));
    let view_config = log.borrow().config().view.clone();
    let sync = ViewSync::connect(view, UndoHistory::handlers(&controller), &view_config);
    let handle = sync.handle();
    log.borrow_mut().attach(Box::new(sync));
    debug!("history view bound");
    HistoryBinding {
        controller,
        sync: handle,
    }
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, Event, EventId, EventKind, EventLog, EventLogConfig, NodeRef, Position, Result,
        UndoObserver,
    };

    pub use crate::{HistoryTree, SyncHandle, TreeView, UndoEngine, UndoHistory, bind_history};

    pub use crate::core;
    pub use crate::view;
}

pub use evlog_core as core;
pub use evlog_view as view;
