#![forbid(unsafe_code)]

//! Two-level history store.
//!
//! [`EventLogTree`] keeps committed events in commit order. Consecutive
//! events of the same [`EventKind`](crate::EventKind) are folded into a run:
//! the first event becomes the *head* (a top-level node) and the following
//! ones become its children.
//!
//! ```text
//! commit move, move, move, fill, move
//!
//! [0] move          <- head of a run
//!  ├─ [0:0] move
//!  └─ [0:1] move
//! [1] fill
//! [2] move
//! ```
//!
//! # Sequence order
//!
//! Undo and redo walk the *sequence*: a head, then its children in order,
//! then the next head. [`Position::Start`] sits before the first node.
//!
//! # Invariants
//!
//! 1. Children never have children (at most one level of nesting).
//! 2. Every child has the same kind as its head.
//! 3. `len()` equals the number of heads plus the number of children.
//!
//! # Failure Modes
//!
//! A [`NodeRef`] that does not address a node means the document and the log
//! have desynchronised. Operations that take one panic instead of guessing.

use std::fmt;
use std::iter;

use serde::Serialize;

use crate::event::Event;

/// Stable identity of a node, unique for the lifetime of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u64);

impl NodeId {
    /// The raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Address of a node: the top-level group and, for grouped events, the index
/// inside the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeRef {
    /// Index of the top-level node.
    pub group: usize,
    /// Index inside the run, `None` for the head itself.
    pub child: Option<usize>,
}

impl NodeRef {
    /// Address a top-level node.
    #[must_use]
    pub const fn head(group: usize) -> Self {
        Self { group, child: None }
    }

    /// Address a grouped child.
    #[must_use]
    pub const fn child(group: usize, index: usize) -> Self {
        Self {
            group,
            child: Some(index),
        }
    }

    /// Whether this addresses a grouped child.
    #[must_use]
    pub const fn is_child(self) -> bool {
        self.child.is_some()
    }

    /// The head of the run this node belongs to.
    #[must_use]
    pub const fn head_ref(self) -> Self {
        Self::head(self.group)
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.child {
            Some(child) => write!(f, "{}:{}", self.group, child),
            None => write!(f, "{}", self.group),
        }
    }
}

/// A cursor position: before all events, or on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Position {
    /// Nothing applied (fully undone, or right after a clear).
    #[default]
    Start,
    /// On a node; that node and everything before it are applied.
    At(NodeRef),
}

impl Position {
    /// The node, unless this is [`Position::Start`].
    #[must_use]
    pub const fn node(self) -> Option<NodeRef> {
        match self {
            Self::Start => None,
            Self::At(node) => Some(node),
        }
    }

    /// Whether this is the start sentinel.
    #[must_use]
    pub const fn is_start(self) -> bool {
        matches!(self, Self::Start)
    }

    /// Top-level group this position lies in.
    #[must_use]
    pub const fn group(self) -> Option<usize> {
        match self {
            Self::Start => None,
            Self::At(node) => Some(node.group),
        }
    }
}

impl From<NodeRef> for Position {
    fn from(node: NodeRef) -> Self {
        Self::At(node)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::At(node) => node.fmt(f),
        }
    }
}

/// A node wrapping one event, with the rest of its run as children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogNode {
    id: NodeId,
    event: Event,
    children: Vec<LogNode>,
}

impl LogNode {
    fn leaf(id: NodeId, event: Event) -> Self {
        Self {
            id,
            event,
            children: Vec::new(),
        }
    }

    /// Turn the survivors of a cut run back into a run: the first one heads
    /// the rest.
    fn reroot(mut survivors: Vec<LogNode>) -> Option<LogNode> {
        if survivors.is_empty() {
            return None;
        }
        let rest = survivors.split_off(1);
        let mut head = survivors.pop()?;
        head.children = rest;
        Some(head)
    }

    /// Stable id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The wrapped event.
    #[must_use]
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Grouped children (empty unless this node heads a run).
    #[must_use]
    pub fn children(&self) -> &[LogNode] {
        &self.children
    }

    /// Number of grouped children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Number of events this row stands for: the head plus its children.
    #[must_use]
    pub fn run_len(&self) -> usize {
        self.children.len() + 1
    }

    /// Whether this node heads a run.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Where [`EventLogTree::append`] placed an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The event started a new top-level node.
    NewGroup,
    /// The event extended the run headed by `head`.
    Extended {
        /// Head of the extended run.
        head: NodeRef,
    },
}

/// Result of an append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appended {
    /// Address of the new node.
    pub node: NodeRef,
    /// Stable id of the new node.
    pub id: NodeId,
    /// Whether a run was started or extended.
    pub placement: Placement,
}

/// One step of [`EventLogTree::iter`].
#[derive(Debug, Clone, Copy)]
pub struct TreeEntry<'a> {
    /// Address of the node.
    pub node: NodeRef,
    /// 0 for heads, 1 for children.
    pub depth: usize,
    /// The node itself.
    pub log_node: &'a LogNode,
}

/// Ordered, grouped history of committed events.
#[derive(Debug, Clone)]
pub struct EventLogTree {
    groups: Vec<LogNode>,
    grouping: bool,
    next_id: u64,
    len: usize,
}

impl Default for EventLogTree {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLogTree {
    /// Create an empty tree with grouping enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            grouping: true,
            next_id: 0,
            len: 0,
        }
    }

    /// Enable or disable grouping of consecutive same-kind events.
    #[must_use]
    pub fn with_grouping(mut self, enabled: bool) -> Self {
        self.grouping = enabled;
        self
    }

    /// Whether consecutive same-kind events are grouped.
    #[must_use]
    pub fn grouping_enabled(&self) -> bool {
        self.grouping
    }

    /// Total number of events (heads and children).
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of top-level nodes.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Top-level nodes in commit order.
    #[must_use]
    pub fn groups(&self) -> &[LogNode] {
        &self.groups
    }

    /// Look up a node.
    #[must_use]
    pub fn get(&self, node: NodeRef) -> Option<&LogNode> {
        let head = self.groups.get(node.group)?;
        match node.child {
            None => Some(head),
            Some(index) => head.children.get(index),
        }
    }

    /// Whether `pos` is [`Position::Start`] or addresses a node.
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        match pos {
            Position::Start => true,
            Position::At(node) => self.get(node).is_some(),
        }
    }

    /// Find a node by stable id.
    #[must_use]
    pub fn find(&self, id: NodeId) -> Option<NodeRef> {
        self.iter()
            .find(|entry| entry.log_node.id == id)
            .map(|entry| entry.node)
    }

    /// First node in sequence order.
    #[must_use]
    pub fn first(&self) -> Option<NodeRef> {
        if self.groups.is_empty() {
            None
        } else {
            Some(NodeRef::head(0))
        }
    }

    /// Last node in sequence order.
    #[must_use]
    pub fn last(&self) -> Option<NodeRef> {
        let group = self.groups.len().checked_sub(1)?;
        let head = &self.groups[group];
        Some(match head.children.len().checked_sub(1) {
            Some(child) => NodeRef::child(group, child),
            None => NodeRef::head(group),
        })
    }

    /// Position of the last node, or [`Position::Start`] when empty.
    #[must_use]
    pub fn last_position(&self) -> Position {
        self.last().map_or(Position::Start, Position::At)
    }

    /// The node after `pos` in sequence order.
    ///
    /// # Panics
    ///
    /// Panics if `pos` does not address a node.
    #[must_use]
    pub fn next(&self, pos: Position) -> Option<Position> {
        let Position::At(node) = pos else {
            return self.first().map(Position::At);
        };
        let head = self.expect_node(node.head_ref(), "next");
        let following = match node.child {
            None if head.has_children() => Some(NodeRef::child(node.group, 0)),
            Some(index) if index + 1 < head.children.len() => {
                Some(NodeRef::child(node.group, index + 1))
            }
            Some(index) => {
                self.expect_node(NodeRef::child(node.group, index), "next");
                None
            }
            None => None,
        };
        following
            .or_else(|| (node.group + 1 < self.groups.len()).then(|| NodeRef::head(node.group + 1)))
            .map(Position::At)
    }

    /// The node before `pos` in sequence order; the first node steps back to
    /// [`Position::Start`].
    ///
    /// # Panics
    ///
    /// Panics if `pos` does not address a node.
    #[must_use]
    pub fn prev(&self, pos: Position) -> Option<Position> {
        let Position::At(node) = pos else {
            return None;
        };
        self.expect_node(node, "prev");
        let previous = match node.child {
            Some(0) => Position::At(node.head_ref()),
            Some(index) => Position::At(NodeRef::child(node.group, index - 1)),
            None if node.group == 0 => Position::Start,
            None => {
                let group = node.group - 1;
                match self.groups[group].children.len().checked_sub(1) {
                    Some(last) => Position::At(NodeRef::child(group, last)),
                    None => Position::At(NodeRef::head(group)),
                }
            }
        };
        Some(previous)
    }

    /// Number of events at or before `pos` (0 for [`Position::Start`]).
    ///
    /// # Panics
    ///
    /// Panics if `pos` does not address a node.
    #[must_use]
    pub fn ordinal(&self, pos: Position) -> usize {
        let Position::At(node) = pos else {
            return 0;
        };
        self.expect_node(node, "ordinal");
        let before: usize = self.groups[..node.group].iter().map(LogNode::run_len).sum();
        before + node.child.map_or(0, |index| index + 1) + 1
    }

    /// Inverse of [`ordinal`](Self::ordinal).
    #[must_use]
    pub fn position_at(&self, ordinal: usize) -> Option<Position> {
        if ordinal == 0 {
            return Some(Position::Start);
        }
        let mut remaining = ordinal - 1;
        for (group, head) in self.groups.iter().enumerate() {
            if remaining < head.run_len() {
                return Some(Position::At(match remaining {
                    0 => NodeRef::head(group),
                    n => NodeRef::child(group, n - 1),
                }));
            }
            remaining -= head.run_len();
        }
        None
    }

    /// Signed number of sequence steps from `from` to `to`.
    ///
    /// # Panics
    ///
    /// Panics if either position does not address a node.
    #[must_use]
    pub fn distance(&self, from: Position, to: Position) -> isize {
        let from = self.ordinal(from);
        let to = self.ordinal(to);
        // History lengths stay far below isize::MAX.
        #[allow(clippy::cast_possible_wrap)]
        let delta = to as isize - from as isize;
        delta
    }

    /// Nodes in commit order.
    pub fn iter(&self) -> impl Iterator<Item = TreeEntry<'_>> + '_ {
        self.groups.iter().enumerate().flat_map(|(group, head)| {
            iter::once(TreeEntry {
                node: NodeRef::head(group),
                depth: 0,
                log_node: head,
            })
            .chain(
                head.children
                    .iter()
                    .enumerate()
                    .map(move |(index, child)| TreeEntry {
                        node: NodeRef::child(group, index),
                        depth: 1,
                        log_node: child,
                    }),
            )
        })
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Append an event at the end of the sequence.
    ///
    /// With grouping enabled, an event whose kind matches the last top-level
    /// node extends that node's run; otherwise it starts a new top-level node.
    pub fn append(&mut self, event: Event) -> Appended {
        let id = self.alloc_id();
        self.len += 1;

        if self.grouping
            && let Some(group) = self.groups.len().checked_sub(1)
            && self.groups[group].event.kind() == event.kind()
        {
            let head = &mut self.groups[group];
            head.children.push(LogNode::leaf(id, event));
            return Appended {
                node: NodeRef::child(group, head.children.len() - 1),
                id,
                placement: Placement::Extended {
                    head: NodeRef::head(group),
                },
            };
        }

        self.groups.push(LogNode::leaf(id, event));
        Appended {
            node: NodeRef::head(self.groups.len() - 1),
            id,
            placement: Placement::NewGroup,
        }
    }

    /// Remove every node after `pos` in sequence order.
    ///
    /// Returns the number of events removed.
    ///
    /// # Panics
    ///
    /// Panics if `pos` does not address a node.
    pub fn truncate_after(&mut self, pos: Position) -> usize {
        let Position::At(node) = pos else {
            return self.clear();
        };
        self.expect_node(node, "truncate_after");

        let later: usize = self.groups[node.group + 1..]
            .iter()
            .map(LogNode::run_len)
            .sum();
        self.groups.truncate(node.group + 1);

        let head = &mut self.groups[node.group];
        let keep = node.child.map_or(0, |index| index + 1);
        let cut = head.children.len() - keep;
        head.children.truncate(keep);

        let removed = later + cut;
        self.len -= removed;
        removed
    }

    /// Remove `pos` and every node before it.
    ///
    /// When `pos` is inside a run, the later children of that run survive:
    /// the first of them becomes a top-level head for the rest.
    ///
    /// Returns the number of events removed.
    ///
    /// # Panics
    ///
    /// Panics if `pos` does not address a node.
    pub fn truncate_through(&mut self, pos: Position) -> usize {
        let Position::At(node) = pos else {
            return 0;
        };
        self.expect_node(node, "truncate_through");

        let tail = self.groups.split_off(node.group + 1);
        let Some(mut head) = self.groups.pop() else {
            return 0;
        };
        let before: usize = self.groups.iter().map(LogNode::run_len).sum();
        let keep_from = node.child.map_or(0, |index| index + 1);
        let survivors = head.children.split_off(keep_from);

        self.groups.clear();
        self.groups.extend(LogNode::reroot(survivors));
        self.groups.extend(tail);

        let removed = before + 1 + keep_from;
        self.len -= removed;
        removed
    }

    /// Remove every node. Returns the number of events removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.len;
        self.groups.clear();
        self.len = 0;
        removed
    }

    fn alloc_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn expect_node(&self, node: NodeRef, op: &str) -> &LogNode {
        match self.get(node) {
            Some(found) => found,
            None => panic!(
                "event log {op}: node {node} is not in the log ({} groups, {} events)",
                self.groups.len(),
                self.len
            ),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
