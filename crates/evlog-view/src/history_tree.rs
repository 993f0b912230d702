#![forbid(unsafe_code)]

//! Headless history tree.
//!
//! [`HistoryTree`] is a [`TreeView`] that keeps its rows, expand state and
//! selection in memory and renders them as text. It behaves like a toolkit
//! tree widget: programmatic changes fire the matching signal
//! synchronously, and user actions ([`click_row`](HistoryTree::click_row),
//! [`toggle_row`](HistoryTree::toggle_row)) fire after the widget's own
//! state is released, so handlers may drive the log straight back into it.
//!
//! ```text
//!   0   [Unchanged]
//!   1 ↶ ▾ move 0
//!   2 ↶   ├── move 1
//!       ─── current ───
//!   3 ↷   └── move 2
//!   4 ↷ fill 3
//! ```
//!
//! # Invariants
//!
//! 1. Expand state and selection are keyed by [`NodeId`], so they survive
//!    rebuilds that shift node addresses.
//! 2. No signal is emitted while the widget state is borrowed.
//! 3. "No selection" is shown as the sentinel row being current.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use evlog_core::{EventLogConfig, EventLogTree, NodeId, NodeRef, Position, ViewError};
use tracing::debug;

use crate::view::{Callback, CallbackKind, Connection, SignalHub, TreeView, ViewSignal};

/// Guide character styles for child rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeGuides {
    /// ASCII guides: `+--`, `` `-- ``.
    Ascii,
    /// Unicode box-drawing characters (default).
    #[default]
    Unicode,
    /// Rounded Unicode characters.
    Rounded,
}

impl TreeGuides {
    /// Branch guide (more children below).
    #[must_use]
    pub const fn branch(&self) -> &str {
        match self {
            Self::Ascii => "+-- ",
            Self::Unicode | Self::Rounded => "\u{251C}\u{2500}\u{2500} ",
        }
    }

    /// Last-child guide.
    #[must_use]
    pub const fn last(&self) -> &str {
        match self {
            Self::Ascii => "`-- ",
            Self::Unicode => "\u{2514}\u{2500}\u{2500} ",
            Self::Rounded => "\u{2570}\u{2500}\u{2500} ",
        }
    }

    /// Expander of a collapsed run head.
    #[must_use]
    pub const fn collapsed(&self) -> &str {
        match self {
            Self::Ascii => "[+] ",
            Self::Unicode | Self::Rounded => "\u{25B8} ",
        }
    }

    /// Expander of an expanded run head.
    #[must_use]
    pub const fn expanded(&self) -> &str {
        match self {
            Self::Ascii => "[-] ",
            Self::Unicode | Self::Rounded => "\u{25BE} ",
        }
    }
}

/// Identity of a row across rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RowKey {
    Sentinel,
    Node(NodeId),
}

#[derive(Debug, Clone)]
struct RowData {
    key: RowKey,
    position: Position,
    label: String,
    /// Sequence ordinal, 0 for the sentinel.
    ordinal: usize,
    child_count: usize,
    last_child: bool,
}

impl RowData {
    fn group(&self) -> Option<usize> {
        self.position.group()
    }

    fn is_child(&self) -> bool {
        self.position.node().is_some_and(NodeRef::is_child)
    }
}

/// One visible row, as returned by [`HistoryTree::visible_rows`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub index: usize,
    /// `Position::Start` for the sentinel row.
    pub position: Position,
    pub label: String,
    /// 0 for the sentinel and heads, 1 for grouped children.
    pub depth: usize,
    pub child_count: usize,
    pub expanded: bool,
    pub selected: bool,
}

struct TreeState {
    rows: Vec<RowData>,
    expanded: HashSet<NodeId>,
    selected: Option<RowKey>,
    show_sentinel: bool,
    unchanged_label: String,
    guides: TreeGuides,
    viewport: usize,
    scroll_offset: usize,
}

impl TreeState {
    fn row(&self, key: RowKey) -> Option<&RowData> {
        self.rows.iter().find(|row| row.key == key)
    }

    fn row_at(&self, position: Position) -> Option<&RowData> {
        self.rows.iter().find(|row| row.position == position)
    }

    fn head_key(&self, group: usize) -> Option<NodeId> {
        match self.row_at(Position::At(NodeRef::head(group)))?.key {
            RowKey::Node(id) => Some(id),
            RowKey::Sentinel => None,
        }
    }

    fn is_expanded(&self, group: usize) -> bool {
        self.head_key(group)
            .is_some_and(|id| self.expanded.contains(&id))
    }

    fn is_visible(&self, row: &RowData) -> bool {
        match row.key {
            RowKey::Sentinel => self.show_sentinel,
            RowKey::Node(_) => match row.position.node() {
                Some(node) if node.is_child() => self.is_expanded(node.group),
                _ => true,
            },
        }
    }

    fn visible(&self) -> impl Iterator<Item = &RowData> + '_ {
        self.rows.iter().filter(move |row| self.is_visible(row))
    }

    fn visible_index_of(&self, key: RowKey) -> Option<usize> {
        self.visible().position(|row| row.key == key)
    }

    fn selected_position(&self) -> Option<Position> {
        self.selected
            .and_then(|key| self.row(key))
            .map(|row| row.position)
    }

    /// Ordinal of the current row: the selection, or the sentinel.
    fn current_ordinal(&self) -> usize {
        self.selected
            .and_then(|key| self.row(key))
            .map_or(0, |row| row.ordinal)
    }
}

/// In-memory tree view of an event log.
///
/// Cloning shares the same widget.
#[derive(Clone)]
pub struct HistoryTree {
    state: Rc<RefCell<TreeState>>,
    hub: SignalHub,
}

impl fmt::Debug for HistoryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("HistoryTree")
            .field("rows", &state.rows.len())
            .field("expanded", &state.expanded.len())
            .field("selected", &state.selected)
            .field("connections", &self.hub.len())
            .finish()
    }
}

impl Default for HistoryTree {
    fn default() -> Self {
        Self::new(&EventLogConfig::default())
    }
}

impl HistoryTree {
    /// Create an empty tree using the sentinel label and visibility from
    /// `config`.
    #[must_use]
    pub fn new(config: &EventLogConfig) -> Self {
        let state = TreeState {
            rows: Vec::new(),
            expanded: HashSet::new(),
            selected: None,
            show_sentinel: config.view.show_sentinel,
            unchanged_label: config.labels.unchanged.clone(),
            guides: TreeGuides::default(),
            viewport: 0,
            scroll_offset: 0,
        };
        let tree = Self {
            state: Rc::new(RefCell::new(state)),
            hub: SignalHub::new(),
        };
        let rows = tree.sentinel_rows();
        tree.state.borrow_mut().rows = rows;
        tree
    }

    /// Set the guide style.
    #[must_use]
    pub fn with_guides(self, guides: TreeGuides) -> Self {
        self.state.borrow_mut().guides = guides;
        self
    }

    /// Number of rows that fit on screen; 0 means unlimited.
    #[must_use]
    pub fn with_viewport(self, rows: usize) -> Self {
        self.state.borrow_mut().viewport = rows;
        self
    }

    fn sentinel_rows(&self) -> Vec<RowData> {
        let state = self.state.borrow();
        vec![RowData {
            key: RowKey::Sentinel,
            position: Position::Start,
            label: state.unchanged_label.clone(),
            ordinal: 0,
            child_count: 0,
            last_child: false,
        }]
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Rows currently visible (sentinel, heads, children of expanded runs).
    #[must_use]
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        let state = self.state.borrow();
        state
            .visible()
            .enumerate()
            .map(|(index, row)| VisibleRow {
                index,
                position: row.position,
                label: row.label.clone(),
                depth: usize::from(row.is_child()),
                child_count: row.child_count,
                expanded: match row.position.node() {
                    Some(node) if !node.is_child() => state.is_expanded(node.group),
                    _ => false,
                },
                selected: state.selected == Some(row.key),
            })
            .collect()
    }

    /// Number of visible rows.
    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.state.borrow().visible().count()
    }

    /// Position of the selected row.
    #[must_use]
    pub fn selected(&self) -> Option<Position> {
        self.state.borrow().selected_position()
    }

    /// Whether the run headed by `group` is expanded.
    #[must_use]
    pub fn is_expanded(&self, group: usize) -> bool {
        self.state.borrow().is_expanded(group)
    }

    /// First visible row shown on screen.
    #[must_use]
    pub fn scroll_offset(&self) -> usize {
        self.state.borrow().scroll_offset
    }

    /// Number of connected callbacks.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.hub.len()
    }

    /// Render the visible rows as text, with a marker line after the current
    /// row.
    #[must_use]
    pub fn render_lines(&self) -> Vec<String> {
        const MARKER: &str = "    \u{2500}\u{2500}\u{2500} current \u{2500}\u{2500}\u{2500}";

        let state = self.state.borrow();
        let current = state.current_ordinal();
        let guides = state.guides;
        let mut lines = Vec::new();
        if current == 0 && !state.show_sentinel {
            lines.push(MARKER.to_string());
        }

        for (index, row) in state.visible().enumerate() {
            let line = match row.key {
                RowKey::Sentinel => format!("{index:>3}   {}", row.label),
                RowKey::Node(_) => {
                    let icon = if row.ordinal <= current { "\u{21B6}" } else { "\u{21B7}" };
                    let lead = if row.is_child() {
                        let guide = if row.last_child {
                            guides.last()
                        } else {
                            guides.branch()
                        };
                        format!("  {guide}")
                    } else if row.child_count == 0 {
                        String::new()
                    } else if row.group().is_some_and(|g| state.is_expanded(g)) {
                        guides.expanded().to_string()
                    } else {
                        guides.collapsed().to_string()
                    };
                    format!("{index:>3} {icon} {lead}{}", row.label)
                }
            };
            lines.push(line);
            if row.ordinal == current {
                lines.push(MARKER.to_string());
            }
        }
        lines
    }

    // ========================================================================
    // User actions
    // ========================================================================

    /// Select the visible row at `index`, as a user click would.
    pub fn click_row(&self, index: usize) -> Result<(), ViewError> {
        let changed = {
            let mut state = self.state.borrow_mut();
            let (key, position) = state
                .visible()
                .nth(index)
                .map(|row| (row.key, row.position))
                .ok_or(ViewError::NoVisibleRow(index))?;
            let changed = state.selected != Some(key);
            state.selected = Some(key);
            changed.then_some(position)
        };
        debug!(visible_index = index, source = "click", "history_tree.select");
        if let Some(position) = changed {
            self.hub.emit(&ViewSignal::SelectionChanged(Some(position)));
        }
        Ok(())
    }

    /// Expand or collapse the run at visible row `index`, as a user click on
    /// the expander would. Returns whether anything changed.
    pub fn toggle_row(&self, index: usize) -> Result<bool, ViewError> {
        let group = self.expandable_group(index)?;
        let Some(group) = group else {
            return Ok(false);
        };
        if self.is_expanded(group) {
            self.collapse_row(index)
        } else {
            self.expand_row(index)
        }
    }

    /// Expand the run at visible row `index`. Returns whether it was
    /// collapsed.
    pub fn expand_row(&self, index: usize) -> Result<bool, ViewError> {
        let Some(group) = self.expandable_group(index)? else {
            return Ok(false);
        };
        let expanded = self.set_expanded(group, true);
        Self::log_expand_collapse("expand", "user", index, expanded);
        if expanded {
            self.hub.emit(&ViewSignal::RowExpanded(group));
        }
        Ok(expanded)
    }

    /// Collapse the run at visible row `index`. Returns whether it was
    /// expanded.
    pub fn collapse_row(&self, index: usize) -> Result<bool, ViewError> {
        let Some(group) = self.expandable_group(index)? else {
            return Ok(false);
        };
        Ok(self.collapse_and_emit(group, "user"))
    }

    fn expandable_group(&self, index: usize) -> Result<Option<usize>, ViewError> {
        let state = self.state.borrow();
        let row = state
            .visible()
            .nth(index)
            .ok_or(ViewError::NoVisibleRow(index))?;
        Ok(if row.is_child() || row.child_count == 0 {
            None
        } else {
            row.group()
        })
    }

    fn log_expand_collapse(action: &str, source: &str, group: usize, changed: bool) {
        debug!(
            message = "history_tree.toggle",
            action, source, group, changed
        );
    }

    /// Returns whether the state changed.
    fn set_expanded(&self, group: usize, expanded: bool) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(id) = state.head_key(group) else {
            return false;
        };
        if expanded {
            state.expanded.insert(id)
        } else {
            state.expanded.remove(&id)
        }
    }

    /// Collapse `group`. A selected child moves the selection to the head
    /// first, as toolkits do.
    fn collapse_and_emit(&self, group: usize, source: &str) -> bool {
        let collapsed = self.set_expanded(group, false);
        Self::log_expand_collapse("collapse", source, group, collapsed);
        if !collapsed {
            return false;
        }

        let moved = {
            let mut state = self.state.borrow_mut();
            let selected_child = state
                .selected_position()
                .and_then(Position::node)
                .is_some_and(|node| node.is_child() && node.group == group);
            match state.head_key(group) {
                Some(head) if selected_child => {
                    state.selected = Some(RowKey::Node(head));
                    true
                }
                _ => false,
            }
        };
        if moved {
            self.hub.emit(&ViewSignal::SelectionChanged(Some(Position::At(
                NodeRef::head(group),
            ))));
        }
        self.hub.emit(&ViewSignal::RowCollapsed(group));
        true
    }
}

impl TreeView for HistoryTree {
    fn rebuild(&mut self, tree: &EventLogTree) -> Result<(), ViewError> {
        let mut rows = self.sentinel_rows();
        rows.extend(tree.iter().enumerate().map(|(index, entry)| {
            let last_child = entry.node.child.is_some_and(|child| {
                tree.get(entry.node.head_ref())
                    .is_some_and(|head| child + 1 == head.child_count())
            });
            RowData {
                key: RowKey::Node(entry.log_node.id()),
                position: Position::At(entry.node),
                label: entry.log_node.event().description().to_string(),
                ordinal: index + 1,
                child_count: entry.log_node.child_count(),
                last_child,
            }
        }));

        let lost_selection = {
            let mut state = self.state.borrow_mut();
            let live: HashSet<NodeId> = rows
                .iter()
                .filter_map(|row| match row.key {
                    RowKey::Node(id) => Some(id),
                    RowKey::Sentinel => None,
                })
                .collect();
            state.expanded.retain(|id| live.contains(id));
            state.rows = rows;
            let lost = state
                .selected
                .is_some_and(|key| state.row(key).is_none());
            if lost {
                state.selected = None;
            }
            lost
        };
        debug!(rows = tree.len(), "history_tree.rebuild");
        if lost_selection {
            self.hub.emit(&ViewSignal::SelectionChanged(None));
        }
        Ok(())
    }

    fn select(&mut self, node: NodeRef) -> Result<(), ViewError> {
        let changed = {
            let mut state = self.state.borrow_mut();
            let key = state
                .row_at(Position::At(node))
                .map(|row| row.key)
                .ok_or(ViewError::UnknownRow(node))?;
            let changed = state.selected != Some(key);
            state.selected = Some(key);
            changed
        };
        if changed {
            self.hub
                .emit(&ViewSignal::SelectionChanged(Some(Position::At(node))));
        }
        Ok(())
    }

    fn clear_selection(&mut self) -> Result<(), ViewError> {
        let changed = self.state.borrow_mut().selected.take().is_some();
        if changed {
            self.hub.emit(&ViewSignal::SelectionChanged(None));
        }
        Ok(())
    }

    fn expand_to(&mut self, node: NodeRef) -> Result<(), ViewError> {
        if self.state.borrow().row_at(Position::At(node)).is_none() {
            return Err(ViewError::UnknownRow(node));
        }
        if !node.is_child() {
            return Ok(());
        }
        let expanded = self.set_expanded(node.group, true);
        if expanded {
            Self::log_expand_collapse("expand", "sync", node.group, true);
            self.hub.emit(&ViewSignal::RowExpanded(node.group));
        }
        Ok(())
    }

    fn collapse_group(&mut self, group: usize) -> Result<(), ViewError> {
        if self.state.borrow().head_key(group).is_none() {
            return Err(ViewError::UnknownGroup(group));
        }
        self.collapse_and_emit(group, "sync");
        Ok(())
    }

    fn scroll_to(&mut self, node: NodeRef) -> Result<(), ViewError> {
        let mut state = self.state.borrow_mut();
        let key = state
            .row_at(Position::At(node))
            .map(|row| row.key)
            .ok_or(ViewError::UnknownRow(node))?;
        let head = state.head_key(node.group).map(RowKey::Node);
        let Some(index) = state
            .visible_index_of(key)
            .or_else(|| head.and_then(|head| state.visible_index_of(head)))
        else {
            return Ok(());
        };
        let viewport = state.viewport;
        if viewport == 0 {
            return Ok(());
        }
        if index < state.scroll_offset {
            state.scroll_offset = index;
        } else if index >= state.scroll_offset + viewport {
            state.scroll_offset = index + 1 - viewport;
        }
        Ok(())
    }

    fn connect(&mut self, kind: CallbackKind, callback: Callback) -> Connection {
        self.hub.connect(kind, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evlog_core::{Event, EventId};

    fn log_tree(kinds: &[&str]) -> EventLogTree {
        let mut tree = EventLogTree::new();
        for (i, kind) in kinds.iter().enumerate() {
            tree.append(Event::new(EventId::new(i as u64), *kind, format!("{kind} {i}")));
        }
        tree
    }

    fn recorded(view: &mut HistoryTree) -> (Rc<RefCell<Vec<ViewSignal>>>, Vec<Connection>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let connections = [
            CallbackKind::SelectionChanged,
            CallbackKind::RowExpanded,
            CallbackKind::RowCollapsed,
        ]
        .into_iter()
        .map(|kind| {
            let seen = Rc::clone(&seen);
            view.connect(kind, Rc::new(move |signal: &ViewSignal| seen.borrow_mut().push(*signal)))
        })
        .collect();
        (seen, connections)
    }

    fn labels(view: &HistoryTree) -> Vec<String> {
        view.visible_rows().into_iter().map(|row| row.label).collect()
    }

    #[test]
    fn empty_tree_shows_sentinel() {
        let view = HistoryTree::default();
        assert_eq!(labels(&view), vec!["[Unchanged]"]);
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn runs_start_collapsed() {
        let mut view = HistoryTree::default();
        view.rebuild(&log_tree(&["move", "move", "fill"])).unwrap();
        assert_eq!(labels(&view), vec!["[Unchanged]", "move 0", "fill 2"]);
        assert_eq!(view.visible_rows()[1].child_count, 1);
    }

    #[test]
    fn expand_to_child_reveals_run_and_signals() {
        let mut view = HistoryTree::default();
        let (seen, _conns) = recorded(&mut view);
        view.rebuild(&log_tree(&["move", "move", "fill"])).unwrap();
        view.expand_to(NodeRef::child(0, 0)).unwrap();
        view.expand_to(NodeRef::child(0, 0)).unwrap();
        assert!(view.is_expanded(0));
        assert_eq!(labels(&view), vec!["[Unchanged]", "move 0", "move 1", "fill 2"]);
        assert_eq!(*seen.borrow(), vec![ViewSignal::RowExpanded(0)]);
    }

    #[test]
    fn select_fires_only_on_change() {
        let mut view = HistoryTree::default();
        let (seen, _conns) = recorded(&mut view);
        view.rebuild(&log_tree(&["a", "b"])).unwrap();
        view.select(NodeRef::head(1)).unwrap();
        view.select(NodeRef::head(1)).unwrap();
        view.clear_selection().unwrap();
        view.clear_selection().unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![
                ViewSignal::SelectionChanged(Some(Position::At(NodeRef::head(1)))),
                ViewSignal::SelectionChanged(None),
            ]
        );
    }

    #[test]
    fn unknown_nodes_are_errors() {
        let mut view = HistoryTree::default();
        view.rebuild(&log_tree(&["a"])).unwrap();
        assert_eq!(
            view.select(NodeRef::head(3)),
            Err(ViewError::UnknownRow(NodeRef::head(3)))
        );
        assert_eq!(view.collapse_group(2), Err(ViewError::UnknownGroup(2)));
        assert_eq!(view.click_row(9), Err(ViewError::NoVisibleRow(9)));
    }

    #[test]
    fn collapsing_moves_child_selection_to_head() {
        let mut view = HistoryTree::default();
        view.rebuild(&log_tree(&["move", "move", "move"])).unwrap();
        view.expand_to(NodeRef::child(0, 1)).unwrap();
        view.select(NodeRef::child(0, 1)).unwrap();
        let (seen, _conns) = recorded(&mut view);

        assert!(view.collapse_row(1).unwrap());
        assert_eq!(view.selected(), Some(Position::At(NodeRef::head(0))));
        assert_eq!(
            *seen.borrow(),
            vec![
                ViewSignal::SelectionChanged(Some(Position::At(NodeRef::head(0)))),
                ViewSignal::RowCollapsed(0),
            ]
        );
    }

    #[test]
    fn click_handler_may_reenter_the_view() {
        let mut view = HistoryTree::default();
        view.rebuild(&log_tree(&["a", "b"])).unwrap();
        let inner = view.clone();
        let _conn = view.connect(
            CallbackKind::SelectionChanged,
            Rc::new(move |_: &ViewSignal| {
                // Would panic if the click still held the state borrow.
                let _ = inner.visible_rows();
            }),
        );
        view.click_row(2).unwrap();
        assert_eq!(view.selected(), Some(Position::At(NodeRef::head(1))));
    }

    #[test]
    fn toggle_ignores_leaf_rows() {
        let mut view = HistoryTree::default();
        view.rebuild(&log_tree(&["move", "move", "fill"])).unwrap();
        assert!(!view.toggle_row(2).unwrap());
        assert!(view.toggle_row(1).unwrap());
        assert!(view.is_expanded(0));
        assert!(view.toggle_row(1).unwrap());
        assert!(!view.is_expanded(0));
    }

    #[test]
    fn expand_state_survives_rebuild() {
        let mut view = HistoryTree::default();
        view.rebuild(&log_tree(&["move", "move", "fill"])).unwrap();
        view.expand_to(NodeRef::child(0, 0)).unwrap();
        view.rebuild(&log_tree(&["move", "move", "fill", "del"])).unwrap();
        assert!(view.is_expanded(0));
    }

    #[test]
    fn rebuild_drops_selection_of_removed_rows() {
        let mut view = HistoryTree::default();
        view.rebuild(&log_tree(&["a", "b"])).unwrap();
        view.select(NodeRef::head(1)).unwrap();
        let (seen, _conns) = recorded(&mut view);
        view.rebuild(&log_tree(&["a"])).unwrap();
        assert_eq!(view.selected(), None);
        assert_eq!(*seen.borrow(), vec![ViewSignal::SelectionChanged(None)]);
    }

    #[test]
    fn hidden_sentinel_is_not_listed() {
        let mut config = EventLogConfig::default();
        config.view.show_sentinel = false;
        let mut view = HistoryTree::new(&config);
        view.rebuild(&log_tree(&["a"])).unwrap();
        assert_eq!(labels(&view), vec!["a 0"]);
        assert_eq!(view.render_lines()[0].trim(), "\u{2500}\u{2500}\u{2500} current \u{2500}\u{2500}\u{2500}");
    }

    #[test]
    fn render_marks_current_and_redo_rows() {
        let mut view = HistoryTree::default().with_guides(TreeGuides::Ascii);
        view.rebuild(&log_tree(&["move", "move", "move", "fill"])).unwrap();
        view.expand_to(NodeRef::child(0, 0)).unwrap();
        view.select(NodeRef::child(0, 0)).unwrap();
        assert_eq!(
            view.render_lines(),
            vec![
                "  0   [Unchanged]",
                "  1 \u{21B6} [-] move 0",
                "  2 \u{21B6}   +-- move 1",
                "    \u{2500}\u{2500}\u{2500} current \u{2500}\u{2500}\u{2500}",
                "  3 \u{21B7}   `-- move 2",
                "  4 \u{21B7} fill 3",
            ]
        );
    }

    #[test]
    fn scroll_keeps_row_in_viewport() {
        let mut view = HistoryTree::default().with_viewport(2);
        view.rebuild(&log_tree(&["a", "b", "c", "d"])).unwrap();
        view.scroll_to(NodeRef::head(3)).unwrap();
        assert_eq!(view.scroll_offset(), 3);
        view.scroll_to(NodeRef::head(0)).unwrap();
        assert_eq!(view.scroll_offset(), 1);
    }
}
