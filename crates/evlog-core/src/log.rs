#![forbid(unsafe_code)]

//! The event log: an [`UndoObserver`] that mirrors a document's undo history.
//!
//! [`EventLog`] owns an [`EventLogTree`] and a cursor. The document's undo
//! engine notifies it of every commit, undo, redo and clear; the log updates
//! the tree, moves the cursor, and hands a [`CursorChange`] to the attached
//! view sync, if any.
//!
//! ```text
//! commit A(move), B(move), C(fill); undo
//!
//!   [0] A            undoable
//!    └─ [0:0] B      undoable   <- cursor
//!   [1] C            redoable
//! ```
//!
//! # Invariants
//!
//! 1. The cursor is [`Position::Start`] or addresses a node in the tree.
//! 2. `undoable()` is false iff the cursor is `Start`.
//! 3. `redoable()` is false iff the cursor is on the last node (or the log
//!    is empty).
//! 4. A commit while redoable events exist discards them first: history is
//!    linear.
//!
//! # Failure Modes
//!
//! - **Undo/redo with nothing to step over, or with an event that is not the
//!   one the log expects**: ignored with a warning. The log is a trace of
//!   the engine, not a gate on it.
//! - **View errors**: logged and dropped; the document never sees them.

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::EventLogConfig;
use crate::event::Event;
use crate::observer::{ChangeCause, CursorChange, CursorObserver, UndoObserver};
use crate::tree::{EventLogTree, LogNode, NodeId, NodeRef, Placement, Position};

/// Enablement and label of an undo or redo affordance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerbState {
    /// There is an event to undo or redo.
    pub enabled: bool,
    /// `"Undo: Move"` when enabled, the bare verb otherwise.
    pub label: String,
}

/// Steps needed to move the cursor to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Already there.
    Stay,
    /// Undo this many events.
    Undo(usize),
    /// Redo this many events.
    Redo(usize),
}

/// One display row of the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRow {
    /// Address of the node in the tree.
    pub node: NodeRef,
    /// Stable node identity.
    pub id: NodeId,
    /// 0 for heads, 1 for grouped children.
    pub depth: usize,
    /// Event kind, e.g. `"move"`.
    pub kind: String,
    /// Event description.
    pub description: String,
    /// Children grouped under this row; 0 for children themselves.
    pub child_count: usize,
    /// The cursor is on this row.
    pub is_current: bool,
    /// This row is after the cursor.
    pub is_redo: bool,
}

/// Undo/redo history of one document.
pub struct EventLog {
    tree: EventLogTree,
    current: Position,
    config: EventLogConfig,
    notifications_blocked: bool,
    view: Option<Box<dyn CursorObserver>>,
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("events", &self.tree.len())
            .field("groups", &self.tree.group_count())
            .field("current", &self.current)
            .field("notifications_blocked", &self.notifications_blocked)
            .field("attached", &self.view.is_some())
            .finish()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(EventLogConfig::default())
    }
}

impl EventLog {
    /// Create an empty log.
    #[must_use]
    pub fn new(config: EventLogConfig) -> Self {
        Self {
            tree: EventLogTree::new().with_grouping(config.grouping.enabled),
            current: Position::Start,
            config,
            notifications_blocked: false,
            view: None,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The history tree.
    #[must_use]
    pub fn tree(&self) -> &EventLogTree {
        &self.tree
    }

    /// The configuration the log was built with.
    #[must_use]
    pub fn config(&self) -> &EventLogConfig {
        &self.config
    }

    /// Cursor: the last applied event, or [`Position::Start`].
    #[must_use]
    pub fn current(&self) -> Position {
        self.current
    }

    /// Head of the run the cursor is inside, when the cursor is on a grouped
    /// child.
    #[must_use]
    pub fn current_parent(&self) -> Option<NodeRef> {
        self.current
            .node()
            .filter(|node| node.is_child())
            .map(NodeRef::head_ref)
    }

    /// Node under the cursor.
    #[must_use]
    pub fn current_node(&self) -> Option<&LogNode> {
        self.current.node().and_then(|node| self.tree.get(node))
    }

    /// Whether an event can be undone.
    #[must_use]
    pub fn undoable(&self) -> bool {
        !self.current.is_start()
    }

    /// Whether an event can be redone.
    #[must_use]
    pub fn redoable(&self) -> bool {
        self.current != self.tree.last_position()
    }

    /// Event the next undo will revert.
    #[must_use]
    pub fn undo_event(&self) -> Option<&Event> {
        self.current_node().map(LogNode::event)
    }

    /// Event the next redo will re-apply.
    #[must_use]
    pub fn redo_event(&self) -> Option<&Event> {
        self.tree
            .next(self.current)
            .and_then(Position::node)
            .and_then(|node| self.tree.get(node))
            .map(LogNode::event)
    }

    /// State of the undo affordance.
    #[must_use]
    pub fn undo_verb(&self) -> VerbState {
        self.verb(&self.config.labels.undo, self.undo_event())
    }

    /// State of the redo affordance.
    #[must_use]
    pub fn redo_verb(&self) -> VerbState {
        self.verb(&self.config.labels.redo, self.redo_event())
    }

    fn verb(&self, verb: &str, event: Option<&Event>) -> VerbState {
        match event {
            Some(event) => VerbState {
                enabled: true,
                label: format!(
                    "{verb}{}{}",
                    self.config.labels.separator,
                    event.description()
                ),
            },
            None => VerbState {
                enabled: false,
                label: verb.to_string(),
            },
        }
    }

    /// Whether the document is back where the history starts: nothing in the
    /// log is applied.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        self.current.is_start()
    }

    /// Rows for display, in commit order.
    #[must_use]
    pub fn rows(&self) -> Vec<LogRow> {
        let cursor = self.tree.ordinal(self.current);
        self.tree
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let ordinal = index + 1;
                let event = entry.log_node.event();
                LogRow {
                    node: entry.node,
                    id: entry.log_node.id(),
                    depth: entry.depth,
                    kind: event.kind().to_string(),
                    description: event.description().to_string(),
                    child_count: entry.log_node.child_count(),
                    is_current: ordinal == cursor,
                    is_redo: ordinal > cursor,
                }
            })
            .collect()
    }

    /// Steps from the cursor to `target`.
    ///
    /// # Panics
    ///
    /// Panics if `target` does not address a node.
    #[must_use]
    pub fn steps_to(&self, target: Position) -> Walk {
        let delta = self.tree.distance(self.current, target);
        match delta {
            0 => Walk::Stay,
            d if d < 0 => Walk::Undo(d.unsigned_abs()),
            d => Walk::Redo(d.unsigned_abs()),
        }
    }

    // ========================================================================
    // Cursor control
    // ========================================================================

    /// Ignore undo and redo notifications while `blocked`.
    ///
    /// Used by callers that drive a cascade of undos themselves and re-place
    /// the cursor with [`set_current`](Self::set_current) afterwards. Commits
    /// and clears are always applied.
    pub fn block_notifications(&mut self, blocked: bool) {
        self.notifications_blocked = blocked;
    }

    /// Whether undo/redo notifications are ignored.
    #[must_use]
    pub fn notifications_blocked(&self) -> bool {
        self.notifications_blocked
    }

    /// Move the cursor without telling the view.
    ///
    /// # Panics
    ///
    /// Panics if `pos` does not address a node.
    pub fn set_current(&mut self, pos: Position) {
        assert!(
            self.tree.contains(pos),
            "event log set_current: {pos} is not in the log"
        );
        trace!(from = %self.current, to = %pos, "cursor placed");
        self.current = pos;
    }

    // ========================================================================
    // View attachment
    // ========================================================================

    /// Attach a view sync and push the current state into it.
    ///
    /// A previously attached observer is detached first.
    pub fn attach(&mut self, observer: Box<dyn CursorObserver>) {
        if let Some(mut old) = self.view.replace(observer) {
            old.detached();
        }
        debug!(current = %self.current, "view attached");
        self.publish(CursorChange {
            previous: self.current,
            current: self.current,
            cause: ChangeCause::Attach,
            structure_changed: true,
            left_group: None,
        });
    }

    /// Detach the view sync and hand it back still connected.
    ///
    /// [`CursorObserver::detached`] is not called; attaching it again resumes
    /// pushes with a full state push.
    pub fn detach(&mut self) -> Option<Box<dyn CursorObserver>> {
        let view = self.view.take()?;
        debug!("view detached");
        Some(view)
    }

    /// Whether a view sync is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.view.is_some()
    }

    /// Push the full current state into the attached view again.
    pub fn resync_view(&mut self) {
        self.publish(CursorChange {
            previous: self.current,
            current: self.current,
            cause: ChangeCause::Resync,
            structure_changed: true,
            left_group: None,
        });
    }

    fn publish(&mut self, change: CursorChange) {
        if let Some(view) = self.view.as_mut()
            && let Err(err) = view.cursor_changed(&self.tree, &change)
        {
            warn!(
                error = %err,
                cause = ?change.cause,
                current = %change.current,
                "view sync failed"
            );
        }
    }

    /// Run the cursor left when moving from `previous` to `current`, if it
    /// still heads children.
    fn left_group(&self, previous: Position, current: Position) -> Option<usize> {
        let group = previous.group()?;
        if current.group() == Some(group) {
            return None;
        }
        self.tree
            .get(NodeRef::head(group))
            .filter(|head| head.has_children())
            .map(|_| group)
    }

    fn moved(&mut self, previous: Position, cause: ChangeCause) {
        let left_group = self.left_group(previous, self.current);
        self.publish(CursorChange {
            previous,
            current: self.current,
            cause,
            structure_changed: false,
            left_group,
        });
    }
}

impl Drop for EventLog {
    fn drop(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.detached();
        }
    }
}

impl UndoObserver for EventLog {
    fn notify_undo_event(&mut self, event: &Event) {
        if self.notifications_blocked {
            trace!(event_id = %event.id(), "undo ignored, notifications blocked");
            return;
        }
        let Some(expected) = self.undo_event() else {
            warn!(event_id = %event.id(), "undo notified with nothing to undo");
            return;
        };
        if expected.id() != event.id() {
            warn!(
                event_id = %event.id(),
                expected = %expected.id(),
                "undo notified for an event that is not at the cursor"
            );
            return;
        }

        let previous = self.current;
        // undo_event() found a node, so there is a predecessor.
        self.current = self.tree.prev(previous).unwrap_or(Position::Start);
        debug!(from = %previous, to = %self.current, event_id = %event.id(), "undo");
        self.moved(previous, ChangeCause::Undo);
    }

    fn notify_redo_event(&mut self, event: &Event) {
        if self.notifications_blocked {
            trace!(event_id = %event.id(), "redo ignored, notifications blocked");
            return;
        }
        let Some(expected) = self.redo_event() else {
            warn!(event_id = %event.id(), "redo notified with nothing to redo");
            return;
        };
        if expected.id() != event.id() {
            warn!(
                event_id = %event.id(),
                expected = %expected.id(),
                "redo notified for an event that is not next"
            );
            return;
        }

        let previous = self.current;
        self.current = self.tree.next(previous).unwrap_or(previous);
        debug!(from = %previous, to = %self.current, event_id = %event.id(), "redo");
        self.moved(previous, ChangeCause::Redo);
    }

    fn notify_undo_commit_event(&mut self, event: &Event) {
        let previous = self.current;
        if self.redoable() {
            let dropped = self.tree.truncate_after(previous);
            debug!(at = %previous, dropped, "redo tail discarded by commit");
        }

        let appended = self.tree.append(event.clone());
        self.current = Position::At(appended.node);
        match appended.placement {
            Placement::NewGroup => debug!(
                node = %appended.node,
                event_id = %event.id(),
                kind = %event.kind(),
                "commit"
            ),
            Placement::Extended { head } => debug!(
                node = %appended.node,
                head = %head,
                event_id = %event.id(),
                kind = %event.kind(),
                "commit extends run"
            ),
        }

        let left_group = self.left_group(previous, self.current);
        self.publish(CursorChange {
            previous,
            current: self.current,
            cause: ChangeCause::Commit,
            structure_changed: true,
            left_group,
        });
    }

    fn notify_clear_undo_event(&mut self) {
        let previous = self.current;
        let dropped = self.tree.truncate_through(previous);
        self.current = Position::Start;
        debug!(dropped, remaining = self.tree.len(), "undo history cleared");
        self.publish(CursorChange {
            previous,
            current: self.current,
            cause: ChangeCause::ClearUndo,
            structure_changed: dropped > 0,
            left_group: None,
        });
    }

    fn notify_clear_redo_event(&mut self) {
        let dropped = self.tree.truncate_after(self.current);
        debug!(dropped, remaining = self.tree.len(), "redo history cleared");
        self.publish(CursorChange {
            previous: self.current,
            current: self.current,
            cause: ChangeCause::ClearRedo,
            structure_changed: dropped > 0,
            left_group: None,
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
