//! # Menu and tool-bar item lists
//!
//! Item lists are rebuilt with an index-positional policy: the first
//! `min(old, new)` child nodes are updated in place, extras are appended,
//! and a shrinking list truncates the tail. This is intentionally NOT a
//! keyed diff — reordering items produces in-place rewrites, matching the
//! configuration contract (order-sensitive, tail append/remove).
//!
//! A tool bar holds at most [`MAXIMUM_TOOLBAR_ITEMS_IN_BAR`] slots; when
//! more items are configured, one slot becomes a "more" overflow button and
//! the remainder is handed back to the host to show in its popup.

use pagoda_core::theme::MAXIMUM_TOOLBAR_ITEMS_IN_BAR;
use pagoda_core::tree::{Arena, BarItem, IconId, NodeId, NodeKind};

/// Sentinel icon for the overflow button; hosts map it to their ellipsis
/// asset.
pub const MORE_BUTTON_ICON: IconId = IconId::MAX;

/// Positional update of a container's `BarItem` children. Non-item children
/// (a custom subtree, say) are left alone.
pub fn set_bar_items(arena: &mut Arena, container: NodeId, items: &[BarItem]) {
    let existing: Vec<NodeId> = arena
        .children(container)
        .iter()
        .copied()
        .filter(|&c| arena.get(c).is_some_and(|n| n.kind.is_bar_item()))
        .collect();
    let shared = existing.len().min(items.len());

    for (node, item) in existing.iter().zip(items.iter().take(shared)) {
        if let Some(n) = arena.get_mut(*node) {
            n.kind = NodeKind::BarItem(item.clone());
        }
    }
    for item in items.iter().skip(shared) {
        arena.alloc_child(container, NodeKind::BarItem(item.clone()));
    }
    for node in existing.iter().skip(items.len()) {
        arena.remove(*node);
    }
    arena.mark_dirty(container);
}

/// Items that did not fit in the bar, plus the overflow button node when one
/// was appended.
#[derive(Clone, Debug, Default)]
pub struct ToolbarOverflow {
    pub more_node: Option<NodeId>,
    pub overflow: Vec<BarItem>,
}

impl ToolbarOverflow {
    pub fn needs_more_button(&self) -> bool {
        self.more_node.is_some()
    }
}

fn more_item() -> BarItem {
    BarItem {
        text: None,
        icon: Some(MORE_BUTTON_ICON),
        active_icon: None,
        action: None,
        status: Default::default(),
    }
}

/// Apply a tool-bar item list, spilling the excess behind a "more" button.
pub fn set_toolbar_items(arena: &mut Arena, toolbar: NodeId, items: &[BarItem]) -> ToolbarOverflow {
    if items.len() <= MAXIMUM_TOOLBAR_ITEMS_IN_BAR {
        set_bar_items(arena, toolbar, items);
        return ToolbarOverflow::default();
    }

    // One slot goes to the overflow button, leaving MAX-1 direct items.
    let direct = MAXIMUM_TOOLBAR_ITEMS_IN_BAR - 1;
    let mut rendered: Vec<BarItem> = items[..direct].to_vec();
    rendered.push(more_item());
    set_bar_items(arena, toolbar, &rendered);

    ToolbarOverflow {
        more_node: arena.children(toolbar).last().copied(),
        overflow: items[direct..].to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagoda_core::tree::ItemStatus;

    fn item(text: &str) -> BarItem {
        BarItem {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    fn texts(arena: &Arena, container: NodeId) -> Vec<String> {
        arena
            .children(container)
            .iter()
            .filter_map(|&c| match &arena.get(c).unwrap().kind {
                NodeKind::BarItem(b) => Some(b.text.clone().unwrap_or_default()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn shrinking_list_truncates_in_place() {
        let mut arena = Arena::new();
        let menu = arena.alloc(NodeKind::Menu);
        set_bar_items(&mut arena, menu, &[item("A"), item("B"), item("C")]);
        let before: Vec<NodeId> = arena.children(menu).to_vec();
        assert_eq!(before.len(), 3);

        set_bar_items(&mut arena, menu, &[item("A2"), item("B2")]);
        let after: Vec<NodeId> = arena.children(menu).to_vec();
        assert_eq!(after.len(), 2);
        // First two nodes keep their identity, diffed in place.
        assert_eq!(&after[..], &before[..2]);
        assert_eq!(texts(&arena, menu), vec!["A2", "B2"]);
        assert!(!arena.contains(before[2]));
    }

    #[test]
    fn growing_list_appends_exactly_the_new_tail() {
        let mut arena = Arena::new();
        let menu = arena.alloc(NodeKind::Menu);
        set_bar_items(&mut arena, menu, &[item("A"), item("B"), item("C")]);
        let before: Vec<NodeId> = arena.children(menu).to_vec();

        set_bar_items(&mut arena, menu, &[item("A"), item("B"), item("C"), item("D")]);
        let after: Vec<NodeId> = arena.children(menu).to_vec();
        assert_eq!(after.len(), 4);
        assert_eq!(&after[..3], &before[..]);
        assert_eq!(texts(&arena, menu), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn status_updates_apply_in_place() {
        let mut arena = Arena::new();
        let menu = arena.alloc(NodeKind::Menu);
        set_bar_items(&mut arena, menu, &[item("A")]);
        let node = arena.children(menu)[0];

        let mut active = item("A");
        active.status = ItemStatus::Active;
        set_bar_items(&mut arena, menu, &[active]);
        match &arena.get(node).unwrap().kind {
            NodeKind::BarItem(b) => assert_eq!(b.status, ItemStatus::Active),
            other => panic!("expected bar item, got {other:?}"),
        }
    }

    #[test]
    fn toolbar_overflow_spills_behind_more_button() {
        let mut arena = Arena::new();
        let toolbar = arena.alloc(NodeKind::ToolBar);
        let items: Vec<BarItem> = (0..6).map(|i| item(&format!("t{i}"))).collect();

        let overflow = set_toolbar_items(&mut arena, toolbar, &items);
        assert!(overflow.needs_more_button());
        assert_eq!(overflow.overflow.len(), 2);

        // MAX-1 direct items plus the more button.
        let children = arena.children(toolbar);
        assert_eq!(children.len(), MAXIMUM_TOOLBAR_ITEMS_IN_BAR);
        let direct = children.len() - 1;
        assert_eq!(direct, MAXIMUM_TOOLBAR_ITEMS_IN_BAR - 1);
        match &arena.get(*children.last().unwrap()).unwrap().kind {
            NodeKind::BarItem(b) => assert_eq!(b.icon, Some(MORE_BUTTON_ICON)),
            other => panic!("expected more button, got {other:?}"),
        }
    }

    #[test]
    fn toolbar_at_capacity_has_no_more_button() {
        let mut arena = Arena::new();
        let toolbar = arena.alloc(NodeKind::ToolBar);
        let items: Vec<BarItem> = (0..5).map(|i| item(&format!("t{i}"))).collect();

        let overflow = set_toolbar_items(&mut arena, toolbar, &items);
        assert!(!overflow.needs_more_button());
        assert!(overflow.overflow.is_empty());
        assert_eq!(arena.children(toolbar).len(), 5);
    }
}
