#![forbid(unsafe_code)]

//! The tree-view seam.
//!
//! [`TreeView`] is what the sync layer needs from a widget: rebuild rows,
//! move the selection, expand and collapse runs, and register change
//! callbacks. Widgets fire their callbacks synchronously, including for
//! programmatic changes, the way GUI toolkits do.
//!
//! [`SignalHub`] is a ready-made callback registry a view can embed. It
//! hands out [`Connection`] handles that can block, unblock and disconnect
//! their callback, and disconnect on drop.
//!
//! # Failure Modes
//!
//! - **Callback mutates the hub while it is being emitted**: allowed. The
//!   callbacks of one emission are collected before any is called, so a
//!   callback that disconnects itself or connects another only affects the
//!   next emission.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use evlog_core::{EventLogTree, NodeRef, Position, ViewError};
use tracing::trace;

/// The three view signals the sync layer listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallbackKind {
    SelectionChanged,
    RowExpanded,
    RowCollapsed,
}

/// A signal fired by a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewSignal {
    /// The selected row changed. `None` when the selection was cleared;
    /// `Some(Position::Start)` for the sentinel row.
    SelectionChanged(Option<Position>),
    /// The run headed by this top-level index was expanded.
    RowExpanded(usize),
    /// The run headed by this top-level index was collapsed.
    RowCollapsed(usize),
}

impl ViewSignal {
    /// Which callbacks this signal goes to.
    #[must_use]
    pub const fn kind(&self) -> CallbackKind {
        match self {
            Self::SelectionChanged(_) => CallbackKind::SelectionChanged,
            Self::RowExpanded(_) => CallbackKind::RowExpanded,
            Self::RowCollapsed(_) => CallbackKind::RowCollapsed,
        }
    }
}

/// A registered view callback.
pub type Callback = Rc<dyn Fn(&ViewSignal)>;

/// What the sync layer drives.
pub trait TreeView {
    /// Replace all rows with the content of `tree`.
    fn rebuild(&mut self, tree: &EventLogTree) -> Result<(), ViewError>;

    /// Select the row of `node`.
    fn select(&mut self, node: NodeRef) -> Result<(), ViewError>;

    /// Select nothing.
    fn clear_selection(&mut self) -> Result<(), ViewError>;

    /// Expand whatever is needed for `node`'s row to be visible.
    fn expand_to(&mut self, node: NodeRef) -> Result<(), ViewError>;

    /// Collapse the run headed by top-level index `group`.
    fn collapse_group(&mut self, group: usize) -> Result<(), ViewError>;

    /// Scroll so that `node`'s row is visible.
    fn scroll_to(&mut self, node: NodeRef) -> Result<(), ViewError>;

    /// Register a callback for one kind of signal.
    fn connect(&mut self, kind: CallbackKind, callback: Callback) -> Connection;
}

// ============================================================================
// SignalHub
// ============================================================================

struct Slot {
    id: u64,
    kind: CallbackKind,
    callback: Callback,
    blocked: bool,
}

#[derive(Default)]
struct HubInner {
    slots: Vec<Slot>,
    next_id: u64,
}

impl HubInner {
    fn slot_mut(&mut self, id: u64) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|slot| slot.id == id)
    }
}

/// Callback registry with per-connection blocking.
///
/// Cloning shares the registry.
#[derive(Clone, Default)]
pub struct SignalHub {
    inner: Rc<RefCell<HubInner>>,
}

impl fmt::Debug for SignalHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalHub")
            .field("connections", &self.inner.borrow().slots.len())
            .finish()
    }
}

impl SignalHub {
    /// Create an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for signals of `kind`.
    pub fn connect(&self, kind: CallbackKind, callback: Callback) -> Connection {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.slots.push(Slot {
            id,
            kind,
            callback,
            blocked: false,
        });
        Connection {
            hub: Rc::downgrade(&self.inner),
            id,
            kind,
        }
    }

    /// Call every unblocked callback registered for the signal's kind, in
    /// registration order.
    pub fn emit(&self, signal: &ViewSignal) {
        let kind = signal.kind();
        let callbacks: Vec<Callback> = self
            .inner
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.kind == kind && !slot.blocked)
            .map(|slot| Rc::clone(&slot.callback))
            .collect();
        trace!(?signal, receivers = callbacks.len(), "view signal");
        for callback in callbacks {
            callback(signal);
        }
    }

    /// Number of live connections for `kind`.
    #[must_use]
    pub fn handler_count(&self, kind: CallbackKind) -> usize {
        self.inner
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.kind == kind)
            .count()
    }

    /// Number of live connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().slots.len()
    }

    /// Whether no callback is connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().slots.is_empty()
    }
}

// ============================================================================
// Connection
// ============================================================================

/// Handle to one registered callback.
///
/// Dropping the handle disconnects the callback.
pub struct Connection {
    hub: Weak<RefCell<HubInner>>,
    id: u64,
    kind: CallbackKind,
}

impl Connection {
    /// A connection that is not attached to anything.
    #[must_use]
    pub fn detached(kind: CallbackKind) -> Self {
        Self {
            hub: Weak::new(),
            id: 0,
            kind,
        }
    }

    /// Signal kind this connection listens to.
    #[must_use]
    pub fn kind(&self) -> CallbackKind {
        self.kind
    }

    /// Whether the callback is still registered.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.with_slot(|_| ()).is_some()
    }

    /// Whether the callback is currently blocked.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.with_slot(|slot| slot.blocked).unwrap_or(false)
    }

    /// Stop delivering signals to the callback until [`unblock`](Self::unblock).
    pub fn block(&self) {
        self.set_blocked(true);
    }

    /// Resume delivering signals.
    pub fn unblock(&self) {
        self.set_blocked(false);
    }

    fn set_blocked(&self, blocked: bool) {
        self.with_slot(|slot| slot.blocked = blocked);
    }

    fn with_slot<R>(&self, f: impl FnOnce(&mut Slot) -> R) -> Option<R> {
        let hub = self.hub.upgrade()?;
        let mut inner = hub.borrow_mut();
        let result = inner.slot_mut(self.id).map(f);
        result
    }

    /// Remove the callback from the view. Idempotent.
    pub fn disconnect(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.borrow_mut().slots.retain(|slot| slot.id != self.id);
        }
        self.hub = Weak::new();
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("kind", &self.kind)
            .field("connected", &self.is_connected())
            .finish()
    }
}
