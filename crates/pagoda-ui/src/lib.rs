//! # Pagoda UI
//!
//! The composite-bar half of Pagoda: two-phase measure/layout for the
//! title-bar/tool-bar/divider/content stack, the free-mode title collapse
//! engine, bar item lists, and a [`host::NavHost`] that wires those to the
//! navigation stack and mode controller.
//!
//! ```rust
//! use pagoda_core::theme::{DeviceEnv, Theme};
//! use pagoda_ui::host::NavHost;
//!
//! let mut host = NavHost::new(Theme::default(), DeviceEnv::default());
//! host.set_nav_title("Library", Some("32 items"));
//! host.push("detail", "Detail", None);
//! let frame = host.frame(900.0, 800.0);
//! assert!(frame.mode == pagoda_navigation::NavigationMode::Split);
//! ```

pub mod collapse;
pub mod host;
pub mod items;
pub mod layout;
pub mod titlebar;

use pagoda_core::tree::{Arena, NodeId, NodeKind};

pub use collapse::{CollapseEngine, Published};
pub use items::{MORE_BUTTON_ICON, ToolbarOverflow, set_bar_items, set_toolbar_items};
pub use layout::{BarConfig, BarGeometry, layout_bar, measure_bar, should_hide_toolbar};
pub use titlebar::{
    BackButtonRule, CharMetrics, TextMeasurer, TitleBarAttrs, TitleBarParts, TitleMode,
    layout_title_bar, locate_parts, measure_title_bar,
};

/// Handles into one composite bar's subtree.
#[derive(Clone, Copy, Debug)]
pub struct BarHandles {
    pub root: NodeId,
    pub title_bar: NodeId,
    pub back: NodeId,
    pub title: NodeId,
    pub subtitle: Option<NodeId>,
    pub menu: NodeId,
    pub tool_bar: NodeId,
    pub divider: NodeId,
    pub content: NodeId,
}

fn build_bar(
    arena: &mut Arena,
    root_kind: NodeKind,
    title: &str,
    subtitle: Option<&str>,
) -> BarHandles {
    let root = arena.alloc(root_kind);
    let title_bar = arena.alloc_child(root, NodeKind::TitleBar);
    let back = arena.alloc_child(title_bar, NodeKind::BackButton);
    let title_node = arena.alloc_child(
        title_bar,
        NodeKind::Title {
            text: title.to_owned(),
        },
    );
    let subtitle_node = subtitle.map(|s| {
        arena.alloc_child(
            title_bar,
            NodeKind::Subtitle {
                text: s.to_owned(),
            },
        )
    });
    let menu = arena.alloc_child(title_bar, NodeKind::Menu);
    let content = arena.alloc_child(root, NodeKind::Content);
    let divider = arena.alloc_child(root, NodeKind::Divider);
    let tool_bar = arena.alloc_child(root, NodeKind::ToolBar);
    BarHandles {
        root,
        title_bar,
        back,
        title: title_node,
        subtitle: subtitle_node,
        menu,
        tool_bar,
        divider,
        content,
    }
}

/// Allocate a nav-bar subtree: title bar (back/title/subtitle/menu),
/// content, toolbar divider, tool bar.
pub fn build_nav_bar(arena: &mut Arena, title: &str, subtitle: Option<&str>) -> BarHandles {
    build_bar(arena, NodeKind::NavBar, title, subtitle)
}

/// Allocate a destination subtree with the same bar structure.
pub fn build_destination(arena: &mut Arena, title: &str, subtitle: Option<&str>) -> BarHandles {
    build_bar(arena, NodeKind::Destination, title, subtitle)
}
