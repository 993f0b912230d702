#![forbid(unsafe_code)]

//! Instrumented tree view.
//!
//! [`RecordingView`] wraps any [`TreeView`] and records every call the sync
//! layer makes and every signal the view fires. It also tracks whether a
//! signal fired from inside one of those calls (log-driven) or from a user
//! action, and can inject an error or a panic into the next call of a given
//! kind.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use evlog_core::{EventLogTree, NodeRef, ViewError};
use evlog_view::{Callback, CallbackKind, Connection, SuppressionFlag, TreeView, ViewSignal};

/// One recorded interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCall {
    /// Rebuild with this many events.
    Rebuild(usize),
    Select(NodeRef),
    ClearSelection,
    ExpandTo(NodeRef),
    CollapseGroup(usize),
    ScrollTo(NodeRef),
    /// A signal delivered to a connected callback; `programmatic` when it
    /// fired from inside a view call.
    Signal {
        signal: ViewSignal,
        programmatic: bool,
    },
}

/// Which view operation a fault targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewOp {
    Rebuild,
    Select,
    ClearSelection,
    ExpandTo,
    CollapseGroup,
    ScrollTo,
}

/// What an injected fault does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Error,
    Panic,
}

/// Shared record of a [`RecordingView`]'s traffic.
///
/// Cloning shares the record.
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Rc<RefCell<Vec<ViewCall>>>,
    in_call: SuppressionFlag,
    fault: Rc<Cell<Option<(ViewOp, Fault)>>>,
}

impl fmt::Debug for CallLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallLog")
            .field("calls", &self.calls.borrow().len())
            .field("in_call", &self.in_call.is_set())
            .finish()
    }
}

impl CallLog {
    /// Everything recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.borrow().clone()
    }

    /// Signals recorded so far, with their origin.
    #[must_use]
    pub fn signals(&self) -> Vec<(ViewSignal, bool)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match *call {
                ViewCall::Signal {
                    signal,
                    programmatic,
                } => Some((signal, programmatic)),
                _ => None,
            })
            .collect()
    }

    /// Forget everything recorded.
    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Whether a view call is in progress.
    #[must_use]
    pub fn in_view_call(&self) -> bool {
        self.in_call.is_set()
    }

    /// Make the next `op` fail with `fault`.
    pub fn inject(&self, op: ViewOp, fault: Fault) {
        self.fault.set(Some((op, fault)));
    }

    fn push(&self, call: ViewCall) {
        self.calls.borrow_mut().push(call);
    }

    fn take_fault(&self, op: ViewOp) -> Option<Fault> {
        match self.fault.get() {
            Some((target, fault)) if target == op => {
                self.fault.set(None);
                Some(fault)
            }
            _ => None,
        }
    }
}

/// [`TreeView`] wrapper that records traffic into a [`CallLog`].
pub struct RecordingView<V> {
    inner: V,
    log: CallLog,
}

impl<V: fmt::Debug> fmt::Debug for RecordingView<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingView")
            .field("inner", &self.inner)
            .field("log", &self.log)
            .finish()
    }
}

impl<V: TreeView> RecordingView<V> {
    /// Wrap `inner`.
    #[must_use]
    pub fn new(inner: V) -> Self {
        Self {
            inner,
            log: CallLog::default(),
        }
    }

    /// The shared record.
    #[must_use]
    pub fn call_log(&self) -> CallLog {
        self.log.clone()
    }

    fn record(
        &mut self,
        op: ViewOp,
        call: ViewCall,
        f: impl FnOnce(&mut V) -> Result<(), ViewError>,
    ) -> Result<(), ViewError> {
        self.log.push(call);
        match self.log.take_fault(op) {
            Some(Fault::Error) => return Err(ViewError::Backend(format!("injected {op:?} failure"))),
            Some(Fault::Panic) => panic!("injected {op:?} panic"),
            None => {}
        }
        let _in_call = self.log.in_call.guard();
        f(&mut self.inner)
    }
}

impl<V: TreeView> TreeView for RecordingView<V> {
    fn rebuild(&mut self, tree: &EventLogTree) -> Result<(), ViewError> {
        self.record(ViewOp::Rebuild, ViewCall::Rebuild(tree.len()), |v| {
            v.rebuild(tree)
        })
    }

    fn select(&mut self, node: NodeRef) -> Result<(), ViewError> {
        self.record(ViewOp::Select, ViewCall::Select(node), |v| v.select(node))
    }

    fn clear_selection(&mut self) -> Result<(), ViewError> {
        self.record(ViewOp::ClearSelection, ViewCall::ClearSelection, |v| {
            v.clear_selection()
        })
    }

    fn expand_to(&mut self, node: NodeRef) -> Result<(), ViewError> {
        self.record(ViewOp::ExpandTo, ViewCall::ExpandTo(node), |v| {
            v.expand_to(node)
        })
    }

    fn collapse_group(&mut self, group: usize) -> Result<(), ViewError> {
        self.record(ViewOp::CollapseGroup, ViewCall::CollapseGroup(group), |v| {
            v.collapse_group(group)
        })
    }

    fn scroll_to(&mut self, node: NodeRef) -> Result<(), ViewError> {
        self.record(ViewOp::ScrollTo, ViewCall::ScrollTo(node), |v| {
            v.scroll_to(node)
        })
    }

    fn connect(&mut self, kind: CallbackKind, callback: Callback) -> Connection {
        let log = self.log.clone();
        self.inner.connect(
            kind,
            Rc::new(move |signal: &ViewSignal| {
                log.push(ViewCall::Signal {
                    signal: *signal,
                    programmatic: log.in_view_call(),
                });
                callback(signal);
            }),
        )
    }
}
