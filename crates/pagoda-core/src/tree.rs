//! # Node arena
//!
//! Pagoda keeps the navigation/bar node tree in a [`slotmap`] arena addressed
//! by stable [`NodeId`] handles. Each node is a record with a closed
//! [`NodeKind`] tag; measure/layout dispatch matches on the tag instead of
//! downcasting through an inheritance chain.
//!
//! Geometry is a per-node cache written only during measure/layout passes;
//! paint state (opacity, font size, scale, vertical offset) is written by the
//! collapse engine and read by whatever paints the tree.

use crate::geometry::{Size, Vec2};
use bitflags::bitflags;
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;
use std::rc::Rc;

new_key_type! {
    pub struct NodeId;
}

/// Opaque icon resource handle, resolved by the paint layer.
pub type IconId = u64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ItemStatus {
    #[default]
    Normal,
    Active,
    Disabled,
}

/// A configurable menu/toolbar entry.
#[derive(Clone, Default)]
pub struct BarItem {
    pub text: Option<String>,
    pub icon: Option<IconId>,
    pub active_icon: Option<IconId>,
    pub action: Option<Rc<dyn Fn()>>,
    pub status: ItemStatus,
}

impl std::fmt::Debug for BarItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BarItem")
            .field("text", &self.text)
            .field("icon", &self.icon)
            .field("status", &self.status)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Root host: owns the nav bar, the content pane, and the pane divider.
    Navigation,
    NavBar,
    /// A pushed page. Carries its own title bar.
    Destination,
    TitleBar,
    Title { text: String },
    Subtitle { text: String },
    BackButton,
    Menu,
    ToolBar,
    /// Hairline between content and tool bar (or between panes).
    Divider,
    Content,
    BarItem(BarItem),
    /// Caller-supplied title/toolbar subtree; measured as a black box.
    Custom,
}

impl NodeKind {
    pub fn is_bar_item(&self) -> bool {
        matches!(self, NodeKind::BarItem(_))
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        const HIDDEN = 1 << 0;
        /// Geometry is stale; the next frame must re-measure this subtree.
        const DIRTY  = 1 << 1;
        /// Node hosts caller-supplied content (custom title, custom toolbar).
        const CUSTOM = 1 << 2;
    }
}

/// Measured size and laid-out offset, relative to the parent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Geometry {
    pub size: Size,
    pub offset: Vec2,
}

/// Render properties published per frame by the collapse engine and the
/// transition orchestration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintState {
    pub opacity: f32,
    pub font_size: f32,
    /// Uniform content scale, 1.0 when no over-drag feedback is active.
    pub scale: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            font_size: 0.0,
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: SmallVec<[NodeId; 4]>,
    pub flags: NodeFlags,
    pub geometry: Geometry,
    pub paint: PaintState,
}

#[derive(Default)]
pub struct Arena {
    nodes: SlotMap<NodeId, Node>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.insert(Node {
            kind,
            parent: None,
            children: SmallVec::new(),
            flags: NodeFlags::DIRTY,
            geometry: Geometry::default(),
            paint: PaintState::default(),
        })
    }

    pub fn alloc_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.alloc(kind);
        self.attach(parent, id);
        id
    }

    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            log::warn!("attach with a freed node handle ignored");
            return;
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
    }

    /// Unlink from the parent without freeing; the caller keeps the handle.
    pub fn detach(&mut self, child: NodeId) {
        let parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = parent
            && let Some(node) = self.nodes.get_mut(p)
        {
            node.children.retain(|c| *c != child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
        }
    }

    /// Free a node and its whole subtree.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
        let mut pending: Vec<NodeId> = vec![id];
        while let Some(n) = pending.pop() {
            if let Some(node) = self.nodes.remove(n) {
                pending.extend(node.children);
            }
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// First direct child matching `pred`, in insertion order.
    pub fn find_child(&self, id: NodeId, pred: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.nodes.get(c).is_some_and(|n| pred(&n.kind)))
    }

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|n| n.flags.contains(NodeFlags::HIDDEN))
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.flags.set(NodeFlags::HIDDEN, hidden);
        }
        self.mark_dirty(id);
    }

    pub fn geometry(&self, id: NodeId) -> Geometry {
        self.nodes.get(id).map(|n| n.geometry).unwrap_or_default()
    }

    pub fn set_size(&mut self, id: NodeId, size: Size) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.geometry.size = size.sanitized();
        }
    }

    pub fn set_offset(&mut self, id: NodeId, offset: Vec2) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.geometry.offset = offset;
        }
    }

    pub fn paint(&self, id: NodeId) -> PaintState {
        self.nodes.get(id).map(|n| n.paint).unwrap_or_default()
    }

    pub fn paint_mut(&mut self, id: NodeId) -> Option<&mut PaintState> {
        self.nodes.get_mut(id).map(|n| &mut n.paint)
    }

    /// Mark a node and its ancestors as needing re-layout.
    pub fn mark_dirty(&mut self, id: NodeId) {
        let mut cursor = Some(id);
        while let Some(n) = cursor {
            let Some(node) = self.nodes.get_mut(n) else {
                break;
            };
            if node.flags.contains(NodeFlags::DIRTY) {
                break;
            }
            node.flags.insert(NodeFlags::DIRTY);
            cursor = node.parent;
        }
    }

    pub fn clear_dirty(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.flags.remove(NodeFlags::DIRTY);
        }
    }

    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|n| n.flags.contains(NodeFlags::DIRTY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_attach_remove() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::Navigation);
        let bar = arena.alloc_child(root, NodeKind::NavBar);
        let title = arena.alloc_child(bar, NodeKind::TitleBar);
        assert_eq!(arena.children(root), &[bar]);
        assert_eq!(arena.children(bar), &[title]);

        arena.remove(bar);
        assert!(!arena.contains(bar));
        assert!(!arena.contains(title));
        assert!(arena.children(root).is_empty());
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn dirty_propagates_to_ancestors() {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::Navigation);
        let bar = arena.alloc_child(root, NodeKind::NavBar);
        let title = arena.alloc_child(bar, NodeKind::TitleBar);
        for id in [root, bar, title] {
            arena.clear_dirty(id);
        }

        arena.mark_dirty(title);
        assert!(arena.is_dirty(title));
        assert!(arena.is_dirty(bar));
        assert!(arena.is_dirty(root));
    }

    #[test]
    fn missing_nodes_read_as_defaults() {
        let mut arena = Arena::new();
        let id = arena.alloc(NodeKind::Content);
        arena.remove(id);
        assert_eq!(arena.geometry(id), Geometry::default());
        assert!(!arena.is_hidden(id));
        assert!(arena.children(id).is_empty());
    }
}
