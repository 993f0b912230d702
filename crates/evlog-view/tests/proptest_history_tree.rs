#![forbid(unsafe_code)]

//! Property tests for the headless history tree.
//!
//! For any history and any sequence of user expand/collapse/click actions:
//! - the visible rows are the sentinel, every run head, and the children of
//!   expanded runs, in commit order;
//! - at most one row is selected, and a selected row is always visible;
//! - expand and collapse signals fire only for real state changes.

use std::cell::RefCell;
use std::rc::Rc;

use evlog_core::{Event, EventId, EventLogConfig, EventLogTree, Position};
use evlog_view::{CallbackKind, Connection, HistoryTree, TreeView, ViewSignal};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Action {
    Click(usize),
    Expand(usize),
    Collapse(usize),
    Toggle(usize),
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0usize..24).prop_map(Action::Click),
        (0usize..24).prop_map(Action::Expand),
        (0usize..24).prop_map(Action::Collapse),
        (0usize..24).prop_map(Action::Toggle),
    ]
}

fn build(kinds: &[u8]) -> EventLogTree {
    let mut tree = EventLogTree::new();
    for (i, kind) in kinds.iter().enumerate() {
        let kind = if *kind == 0 { "move" } else { "fill" };
        tree.append(Event::new(EventId::new(i as u64), kind, format!("{kind} {i}")));
    }
    tree
}

fn record_all(view: &mut HistoryTree) -> (Rc<RefCell<Vec<ViewSignal>>>, Vec<Connection>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let connections = [
        CallbackKind::SelectionChanged,
        CallbackKind::RowExpanded,
        CallbackKind::RowCollapsed,
    ]
    .into_iter()
    .map(|kind| {
        let seen = Rc::clone(&seen);
        view.connect(
            kind,
            Rc::new(move |signal: &ViewSignal| seen.borrow_mut().push(*signal)),
        )
    })
    .collect();
    (seen, connections)
}

fn expected_visible(tree: &EventLogTree, view: &HistoryTree) -> Vec<Position> {
    let mut rows = vec![Position::Start];
    for (group, head) in tree.groups().iter().enumerate() {
        rows.push(Position::At(evlog_core::NodeRef::head(group)));
        if view.is_expanded(group) {
            rows.extend(
                (0..head.child_count())
                    .map(|child| Position::At(evlog_core::NodeRef::child(group, child))),
            );
        }
    }
    rows
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn visible_rows_and_selection_stay_consistent(
        kinds in prop::collection::vec(0u8..2, 0..16),
        actions in prop::collection::vec(action_strategy(), 0..30),
    ) {
        let tree = build(&kinds);
        let mut view = HistoryTree::new(&EventLogConfig::default());
        view.rebuild(&tree).unwrap();
        let (seen, _connections) = record_all(&mut view);

        for action in &actions {
            let expanded_before: Vec<bool> =
                (0..tree.group_count()).map(|g| view.is_expanded(g)).collect();
            seen.borrow_mut().clear();

            let changed = match *action {
                Action::Click(row) => view.click_row(row).map(|()| false),
                Action::Expand(row) => view.expand_row(row),
                Action::Collapse(row) => view.collapse_row(row),
                Action::Toggle(row) => view.toggle_row(row),
            };
            // Rows past the end are errors; nothing may change then.
            if changed.is_err() {
                prop_assert!(seen.borrow().is_empty());
            }

            let positions: Vec<Position> =
                view.visible_rows().into_iter().map(|row| row.position).collect();
            prop_assert_eq!(positions, expected_visible(&tree, &view));

            let rows = view.visible_rows();
            let selected: Vec<_> = rows.iter().filter(|row| row.selected).collect();
            prop_assert!(selected.len() <= 1);
            if let Some(position) = view.selected() {
                prop_assert_eq!(selected.len(), 1);
                prop_assert_eq!(selected[0].position, position);
            }

            for signal in seen.borrow().iter() {
                match *signal {
                    ViewSignal::RowExpanded(group) => {
                        prop_assert!(!expanded_before[group] && view.is_expanded(group));
                    }
                    ViewSignal::RowCollapsed(group) => {
                        prop_assert!(expanded_before[group] && !view.is_expanded(group));
                    }
                    ViewSignal::SelectionChanged(_) => {}
                }
            }
        }
    }
}
