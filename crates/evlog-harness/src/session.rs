#![forbid(unsafe_code)]

//! Fully wired editing session.
//!
//! A [`Session`] connects every piece the way an application would:
//!
//! ```text
//! FakeDocument ──notify──> EventLog ──> ViewSync ──> RecordingView<HistoryTree>
//!      ^                                                     │ user signals
//!      └──────────────────── UndoHistory <───────────────────┘
//! ```
//!
//! Document-side operations ([`commit`](Session::commit),
//! [`undo`](Session::undo), ...) and view-side user actions
//! ([`click`](Session::click), [`collapse`](Session::collapse), ...) can be
//! mixed freely. The user-action handlers are probed: any handler that runs
//! while the sync layer is inside a view call counts as a suppression
//! violation.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use evlog_core::{
    Event, EventKind, EventLog, EventLogConfig, LogRow, Position, SharedObserver, VerbState,
    ViewError,
};
use evlog_view::{
    HistoryError, HistoryTree, SharedEngine, SyncHandle, UndoHistory, ViewHandlers, ViewSync,
};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::document::FakeDocument;
use crate::recording::{CallLog, RecordingView};

/// Failure of a session action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Counts handler invocations and the ones that broke suppression.
#[derive(Debug, Clone, Default)]
struct HandlerProbe {
    runs: Rc<Cell<usize>>,
    violations: Rc<Cell<usize>>,
}

impl HandlerProbe {
    fn enter(&self, calls: &CallLog) {
        self.runs.set(self.runs.get() + 1);
        if calls.in_view_call() {
            self.violations.set(self.violations.get() + 1);
        }
    }

    fn wrap(&self, handlers: ViewHandlers, calls: &CallLog) -> ViewHandlers {
        let mut wrapped = ViewHandlers::new();
        if let Some(inner) = handlers.on_selection_changed {
            let (probe, calls) = (self.clone(), calls.clone());
            wrapped = wrapped.with_selection_changed(move |target| {
                probe.enter(&calls);
                inner(target);
            });
        }
        if let Some(inner) = handlers.on_row_expanded {
            let (probe, calls) = (self.clone(), calls.clone());
            wrapped = wrapped.with_row_expanded(move |group| {
                probe.enter(&calls);
                inner(group);
            });
        }
        if let Some(inner) = handlers.on_row_collapsed {
            let (probe, calls) = (self.clone(), calls.clone());
            wrapped = wrapped.with_row_collapsed(move |group| {
                probe.enter(&calls);
                inner(group);
            });
        }
        wrapped
    }
}

/// Serializable picture of a session at one moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Cursor, `"start"` or a node address.
    pub current: String,
    pub undo: VerbState,
    pub redo: VerbState,
    pub rows: Vec<LogRow>,
    /// The history view as text.
    pub view: Vec<String>,
    /// Descriptions of the document's applied actions, oldest first.
    pub applied: Vec<String>,
}

/// Document, log, view and controller wired together.
pub struct Session {
    document: Rc<RefCell<FakeDocument>>,
    log: Rc<RefCell<EventLog>>,
    tree: HistoryTree,
    calls: CallLog,
    sync: SyncHandle,
    history: Rc<RefCell<UndoHistory>>,
    probe: HandlerProbe,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("document", &self.document)
            .field("log", &self.log)
            .field("sync", &self.sync)
            .finish_non_exhaustive()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EventLogConfig::default())
    }
}

impl Session {
    /// Wire a fresh session.
    #[must_use]
    pub fn new(config: EventLogConfig) -> Self {
        let tree = HistoryTree::new(&config);
        Self::with_tree(config, tree)
    }

    /// Wire a fresh session around an already configured view, e.g. one
    /// with other guides or a viewport.
    #[must_use]
    pub fn with_tree(config: EventLogConfig, tree: HistoryTree) -> Self {
        let log = Rc::new(RefCell::new(EventLog::new(config.clone())));
        let document = Rc::new(RefCell::new(FakeDocument::new()));
        let observer: SharedObserver = log.clone();
        document.borrow_mut().add_observer(observer);

        let engine: SharedEngine = document.clone();
        let history = Rc::new(RefCell::new(UndoHistory::new(Rc::clone(&log), engine)));

        let view = RecordingView::new(tree.clone());
        let calls = view.call_log();
        let probe = HandlerProbe::default();
        let handlers = probe.wrap(UndoHistory::handlers(&history), &calls);

        let sync = ViewSync::connect(view, handlers, &config.view);
        let handle = sync.handle();
        log.borrow_mut().attach(Box::new(sync));
        debug!("session wired");

        Self {
            document,
            log,
            tree,
            calls,
            sync: handle,
            history,
            probe,
        }
    }

    // ========================================================================
    // Document side
    // ========================================================================

    /// Perform a new action in the document.
    pub fn commit(&self, kind: impl Into<EventKind>, description: impl Into<String>) -> Event {
        self.document.borrow_mut().commit(kind, description)
    }

    /// Undo in the document. Returns whether there was anything to undo.
    pub fn undo(&self) -> bool {
        self.document.borrow_mut().undo()
    }

    /// Redo in the document. Returns whether there was anything to redo.
    pub fn redo(&self) -> bool {
        self.document.borrow_mut().redo()
    }

    pub fn clear_undo(&self) {
        self.document.borrow_mut().clear_undo();
    }

    pub fn clear_redo(&self) {
        self.document.borrow_mut().clear_redo();
    }

    // ========================================================================
    // View side (user actions)
    // ========================================================================

    /// Click the visible row at `row`.
    pub fn click(&self, row: usize) -> Result<(), SessionError> {
        self.tree.click_row(row)?;
        self.take_history_error()
    }

    /// Collapse the run at visible row `row`. Returns whether it was expanded.
    pub fn collapse(&self, row: usize) -> Result<bool, SessionError> {
        let changed = self.tree.collapse_row(row)?;
        self.take_history_error()?;
        Ok(changed)
    }

    /// Expand the run at visible row `row`. Returns whether it was collapsed.
    pub fn expand(&self, row: usize) -> Result<bool, SessionError> {
        let changed = self.tree.expand_row(row)?;
        self.take_history_error()?;
        Ok(changed)
    }

    fn take_history_error(&self) -> Result<(), SessionError> {
        match self.history.borrow_mut().take_error() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// The shared log.
    #[must_use]
    pub fn log(&self) -> &Rc<RefCell<EventLog>> {
        &self.log
    }

    /// The shared document.
    #[must_use]
    pub fn document(&self) -> &Rc<RefCell<FakeDocument>> {
        &self.document
    }

    /// The history view.
    #[must_use]
    pub fn tree(&self) -> &HistoryTree {
        &self.tree
    }

    /// Traffic between the sync layer and the view.
    #[must_use]
    pub fn calls(&self) -> &CallLog {
        &self.calls
    }

    /// Control handle of the view sync.
    #[must_use]
    pub fn sync(&self) -> &SyncHandle {
        &self.sync
    }

    /// The log cursor.
    #[must_use]
    pub fn current(&self) -> Position {
        self.log.borrow().current()
    }

    /// Display rows of the log.
    #[must_use]
    pub fn rows(&self) -> Vec<LogRow> {
        self.log.borrow().rows()
    }

    /// Undo and redo affordances.
    #[must_use]
    pub fn verbs(&self) -> (VerbState, VerbState) {
        let log = self.log.borrow();
        (log.undo_verb(), log.redo_verb())
    }

    /// The history view as text.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        self.tree.render_lines()
    }

    /// How many times a user-action handler ran.
    #[must_use]
    pub fn handler_runs(&self) -> usize {
        self.probe.runs.get()
    }

    /// How many handler runs happened inside a view call.
    #[must_use]
    pub fn violations(&self) -> usize {
        self.probe.violations.get()
    }

    /// Whether the log's cursor sits exactly after the document's applied
    /// actions, in the same order.
    #[must_use]
    pub fn document_matches_log(&self) -> bool {
        let log = self.log.borrow();
        let document = self.document.borrow();
        let applied = document.applied();
        let tree = log.tree();
        tree.ordinal(log.current()) == applied.len()
            && tree
                .iter()
                .zip(applied)
                .all(|(entry, event)| entry.log_node.event().id() == event.id())
    }

    /// Capture the whole session state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let (undo, redo) = self.verbs();
        Snapshot {
            current: self.current().to_string(),
            undo,
            redo,
            rows: self.rows(),
            view: self.render(),
            applied: self
                .document
                .borrow()
                .applied()
                .iter()
                .map(|event| event.description().to_string())
                .collect(),
        }
    }
}
