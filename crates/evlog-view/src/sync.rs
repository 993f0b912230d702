#![forbid(unsafe_code)]

//! Keeps a [`TreeView`] in step with the log's cursor.
//!
//! [`ViewSync`] is the [`CursorObserver`] an [`EventLog`](evlog_core::EventLog)
//! pushes every cursor change into. Each push runs under a
//! [`SuppressionGuard`](crate::SuppressionGuard), and the three view
//! callbacks registered by [`ViewSync::connect`] drop anything that arrives
//! while the guard is alive. The view's echo of a log-driven selection or
//! collapse therefore never reaches the user-action handlers.
//!
//! ```ignore
//! let sync = ViewSync::connect(tree.clone(), handlers, &config.view);
//! let handle = sync.handle();
//! log.borrow_mut().attach(Box::new(sync));
//! ```
//!
//! # Push order
//!
//! 1. Rebuild the rows if nodes were added or removed.
//! 2. Collapse the run the cursor just left.
//! 3. Expand to the current node and select it, or clear the selection at
//!    start.
//! 4. Scroll the current row into view.
//!
//! # Failure Modes
//!
//! - **View error mid-push**: the push stops at the failing step, the error
//!   goes back to the log (which logs it) and the next push rebuilds the
//!   rows from scratch.
//! - **Push while paused**: skipped; the next push after
//!   [`SyncHandle::resume`] rebuilds and collapses every run the cursor left
//!   in the meantime.

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use evlog_core::{
    CursorChange, CursorObserver, EventLogTree, NodeId, NodeRef, Position, ViewConfig, ViewError,
};
use tracing::{debug, debug_span, trace};

use crate::suppress::SuppressionFlag;
use crate::view::{Callback, CallbackKind, Connection, TreeView, ViewSignal};

/// User-action handlers the sync layer wires to the view.
///
/// Each handler is only called for changes the user made; changes made by
/// the sync layer itself are filtered out.
#[derive(Default, Clone)]
pub struct ViewHandlers {
    /// Row selected by the user.
    pub on_selection_changed: Option<Rc<dyn Fn(Position)>>,
    /// Run expanded by the user.
    pub on_row_expanded: Option<Rc<dyn Fn(usize)>>,
    /// Run collapsed by the user.
    pub on_row_collapsed: Option<Rc<dyn Fn(usize)>>,
}

impl fmt::Debug for ViewHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewHandlers")
            .field("on_selection_changed", &self.on_selection_changed.is_some())
            .field("on_row_expanded", &self.on_row_expanded.is_some())
            .field("on_row_collapsed", &self.on_row_collapsed.is_some())
            .finish()
    }
}

impl ViewHandlers {
    /// No handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selection handler.
    #[must_use]
    pub fn with_selection_changed(mut self, f: impl Fn(Position) + 'static) -> Self {
        self.on_selection_changed = Some(Rc::new(f));
        self
    }

    /// Set the expand handler.
    #[must_use]
    pub fn with_row_expanded(mut self, f: impl Fn(usize) + 'static) -> Self {
        self.on_row_expanded = Some(Rc::new(f));
        self
    }

    /// Set the collapse handler.
    #[must_use]
    pub fn with_row_collapsed(mut self, f: impl Fn(usize) + 'static) -> Self {
        self.on_row_collapsed = Some(Rc::new(f));
        self
    }
}

/// Connection handles of the wrapped callbacks, by signal kind.
pub type CallbackMap = BTreeMap<CallbackKind, Connection>;

struct SyncShared {
    flag: SuppressionFlag,
    paused: Cell<bool>,
    stale: Cell<bool>,
    /// Heads of runs the cursor left while paused.
    left_while_paused: RefCell<BTreeSet<NodeId>>,
    disconnected: Cell<bool>,
    connections: RefCell<CallbackMap>,
}

impl SyncShared {
    fn disconnect(&self) {
        if self.disconnected.replace(true) {
            return;
        }
        let mut connections = std::mem::take(&mut *self.connections.borrow_mut());
        for connection in connections.values_mut() {
            connection.disconnect();
        }
        debug!("view sync disconnected");
    }
}

/// Cloneable control handle for a [`ViewSync`] that has been handed to a
/// log.
#[derive(Clone)]
pub struct SyncHandle {
    shared: Rc<SyncShared>,
}

impl fmt::Debug for SyncHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncHandle")
            .field("suppressed", &self.is_suppressed())
            .field("paused", &self.is_paused())
            .field("disconnected", &self.is_disconnected())
            .finish()
    }
}

impl SyncHandle {
    /// Skip pushes until [`resume`](Self::resume), e.g. during a bulk
    /// replay. The first push after resuming rebuilds the view.
    pub fn pause(&self) {
        self.shared.paused.set(true);
    }

    /// Undo [`pause`](Self::pause).
    ///
    /// The view catches up on the next push. Call `EventLog::resync_view`
    /// afterwards to catch up at once; `evlog::HistoryBinding::resume` does
    /// both.
    pub fn resume(&self) {
        self.shared.paused.set(false);
    }

    /// Whether pushes are skipped.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.shared.paused.get()
    }

    /// Stop delivering view callbacks to the handlers.
    pub fn block_callbacks(&self) {
        for connection in self.shared.connections.borrow().values() {
            connection.block();
        }
    }

    /// Resume delivering view callbacks.
    pub fn unblock_callbacks(&self) {
        for connection in self.shared.connections.borrow().values() {
            connection.unblock();
        }
    }

    /// Remove the callbacks from the view. Later pushes fail with
    /// [`ViewError::Disconnected`].
    pub fn disconnect(&self) {
        self.shared.disconnect();
    }

    /// Whether [`disconnect`](Self::disconnect) was called.
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        self.shared.disconnected.get()
    }

    /// Whether a push is in progress (view callbacks are being dropped).
    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.shared.flag.is_set()
    }

    /// The suppression flag shared with the wrapped callbacks.
    #[must_use]
    pub fn flag(&self) -> SuppressionFlag {
        self.shared.flag.clone()
    }
}

/// Pushes cursor changes into a view.
pub struct ViewSync<V> {
    view: V,
    config: ViewConfig,
    shared: Rc<SyncShared>,
}

impl<V: fmt::Debug> fmt::Debug for ViewSync<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewSync")
            .field("view", &self.view)
            .field("config", &self.config)
            .field("connections", &self.shared.connections.borrow().len())
            .finish()
    }
}

impl<V: TreeView> ViewSync<V> {
    /// Register the handlers with `view`, each wrapped so that it ignores
    /// signals fired during a push.
    pub fn connect(mut view: V, handlers: ViewHandlers, config: &ViewConfig) -> Self {
        let flag = SuppressionFlag::new();
        let mut connections = CallbackMap::new();

        if let Some(handler) = handlers.on_selection_changed {
            let callback = suppressed(&flag, move |signal| {
                if let ViewSignal::SelectionChanged(Some(target)) = *signal {
                    handler(target);
                }
            });
            connections.insert(
                CallbackKind::SelectionChanged,
                view.connect(CallbackKind::SelectionChanged, callback),
            );
        }
        if let Some(handler) = handlers.on_row_expanded {
            let callback = suppressed(&flag, move |signal| {
                if let ViewSignal::RowExpanded(group) = *signal {
                    handler(group);
                }
            });
            connections.insert(
                CallbackKind::RowExpanded,
                view.connect(CallbackKind::RowExpanded, callback),
            );
        }
        if let Some(handler) = handlers.on_row_collapsed {
            let callback = suppressed(&flag, move |signal| {
                if let ViewSignal::RowCollapsed(group) = *signal {
                    handler(group);
                }
            });
            connections.insert(
                CallbackKind::RowCollapsed,
                view.connect(CallbackKind::RowCollapsed, callback),
            );
        }

        debug!(callbacks = connections.len(), "view sync connected");
        Self {
            view,
            config: config.clone(),
            shared: Rc::new(SyncShared {
                flag,
                paused: Cell::new(false),
                stale: Cell::new(true),
                left_while_paused: RefCell::new(BTreeSet::new()),
                disconnected: Cell::new(false),
                connections: RefCell::new(connections),
            }),
        }
    }

    /// A control handle sharing this sync's state.
    #[must_use]
    pub fn handle(&self) -> SyncHandle {
        SyncHandle {
            shared: Rc::clone(&self.shared),
        }
    }

    /// The driven view.
    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    fn push(&mut self, tree: &EventLogTree, change: &CursorChange) -> Result<(), ViewError> {
        let rebuild = change.structure_changed || self.shared.stale.get();
        if rebuild {
            self.view.rebuild(tree)?;
            self.shared.stale.set(false);
        }

        if self.config.collapse_on_leave {
            for group in self.groups_left_while_paused(tree, change) {
                self.view.collapse_group(group)?;
            }
            if let Some(group) = change.left_group
                && group < tree.group_count()
            {
                self.view.collapse_group(group)?;
            }
        }

        match change.current {
            Position::Start => self.view.clear_selection()?,
            Position::At(node) => {
                self.view.expand_to(node)?;
                self.view.select(node)?;
                if self.config.scroll_to_current {
                    self.view.scroll_to(node)?;
                }
            }
        }
        Ok(())
    }

    /// Runs left during a pause that still head children and do not hold the
    /// cursor now.
    fn groups_left_while_paused(&self, tree: &EventLogTree, change: &CursorChange) -> Vec<usize> {
        let heads = std::mem::take(&mut *self.shared.left_while_paused.borrow_mut());
        heads
            .into_iter()
            .filter_map(|id| tree.find(id))
            .filter(|node| !node.is_child())
            .map(|node| node.group)
            .filter(|&group| {
                change.current.group() != Some(group)
                    && change.left_group != Some(group)
                    && tree
                        .get(NodeRef::head(group))
                        .is_some_and(|head| head.has_children())
            })
            .collect()
    }

    fn skip_while_paused(&self, tree: &EventLogTree, change: &CursorChange) {
        self.shared.stale.set(true);
        if let Some(head) = change
            .left_group
            .and_then(|group| tree.get(NodeRef::head(group)))
        {
            self.shared.left_while_paused.borrow_mut().insert(head.id());
        }
        trace!(cause = ?change.cause, "view push skipped, paused");
    }
}

fn suppressed(flag: &SuppressionFlag, f: impl Fn(&ViewSignal) + 'static) -> Callback {
    let flag = flag.clone();
    Rc::new(move |signal: &ViewSignal| {
        if flag.is_set() {
            trace!(?signal, "view signal suppressed");
            return;
        }
        f(signal);
    })
}

impl<V: TreeView> CursorObserver for ViewSync<V> {
    fn cursor_changed(
        &mut self,
        tree: &EventLogTree,
        change: &CursorChange,
    ) -> Result<(), ViewError> {
        if self.shared.disconnected.get() {
            return Err(ViewError::Disconnected);
        }
        if self.shared.paused.get() {
            self.skip_while_paused(tree, change);
            return Ok(());
        }

        let _span = debug_span!(
            "evlog.view_push",
            cause = ?change.cause,
            current = %change.current,
            rebuild = change.structure_changed
        )
        .entered();
        let _guard = self.shared.flag.guard();

        let result = self.push(tree, change);
        if result.is_err() {
            self.shared.stale.set(true);
        } else {
            debug!(from = %change.previous, to = %change.current, "view synced");
        }
        result
    }

    fn detached(&mut self) {
        self.shared.disconnect();
    }
}

impl<V> Drop for ViewSync<V> {
    fn drop(&mut self) {
        self.shared.disconnect();
    }
}
