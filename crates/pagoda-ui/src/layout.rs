//! # Composite bar layout
//!
//! Two passes over a bar root (nav bar or destination):
//!
//! 1. **Measure**, top-down, in fixed structural order — title bar, tool
//!    bar, toolbar divider, content — because each height feeds the next.
//!    The composite is match-parent horizontally; vertically it either fills
//!    the constraint or, in auto-height mode, lets the content drive the
//!    total.
//! 2. **Layout**, purely additive offsets: title bar at the top, content
//!    under it, tool bar pinned to the bottom, divider immediately above the
//!    tool bar. Nothing is re-measured in this pass.
//!
//! Missing children are not errors; each step degrades to a zero
//! contribution so a partially-built bar still gets best-effort sizes.

use crate::collapse::CollapseEngine;
use crate::titlebar::{self, TextMeasurer, TitleBarAttrs};
use pagoda_core::geometry::{Constraint, Size, Vec2};
use pagoda_core::theme::{Compatibility, DeviceEnv, DeviceType, Orientation, Theme};
use pagoda_core::tree::{Arena, NodeFlags, NodeId, NodeKind};

/// Grid breakpoint past which a landscape phone drops its tool bar.
const TOOLBAR_HIDE_COLUMNS: u32 = 8;

#[derive(Clone, Copy, Debug, Default)]
pub struct BarConfig {
    pub title: TitleBarAttrs,
    pub tool_bar_hidden: bool,
    /// Items were supplied through the structured toolbar API; only that
    /// path gets the divider.
    pub structured_toolbar: bool,
    /// Content drives the total height instead of filling the constraint.
    pub auto_height: bool,
    pub compat: Compatibility,
}

/// Per-instance result of one measure pass. `total()` is the invariant the
/// composite's own geometry must equal.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BarGeometry {
    pub title_bar: f32,
    pub tool_bar: f32,
    pub divider: f32,
    pub content: f32,
}

impl BarGeometry {
    pub fn total(&self) -> f32 {
        self.title_bar + self.tool_bar + self.divider + self.content
    }
}

/// Rotation heuristic: a landscape phone at a wide grid breakpoint hides
/// the bottom tool bar (its items move into the menu).
pub fn should_hide_toolbar(env: &DeviceEnv) -> bool {
    env.device == DeviceType::Phone
        && env.orientation == Orientation::Landscape
        && env.grid_columns >= TOOLBAR_HIDE_COLUMNS
}

fn find_kind(arena: &Arena, bar: NodeId, pred: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
    arena.find_child(bar, pred)
}

fn measure_tool_bar(
    arena: &mut Arena,
    tool_bar: Option<NodeId>,
    width: f32,
    cfg: &BarConfig,
    theme: &Theme,
    env: &DeviceEnv,
) -> f32 {
    let Some(tool_bar) = tool_bar else {
        return 0.0;
    };
    let hidden = cfg.tool_bar_hidden
        || arena.is_hidden(tool_bar)
        || arena.children(tool_bar).is_empty()
        || should_hide_toolbar(env);
    if hidden {
        arena.set_size(tool_bar, Size::new(width, 0.0));
        return 0.0;
    }

    let custom = arena
        .get(tool_bar)
        .is_some_and(|n| n.flags.contains(NodeFlags::CUSTOM));
    // A custom tool bar was measured by its owner; propagate the actual
    // height rather than the requested theme height.
    let height = if custom {
        arena.geometry(tool_bar).size.height
    } else {
        theme.tool_bar_height
    };
    arena.set_size(tool_bar, Size::new(width, height));

    // Items split the width evenly across the occupied slots.
    let items = arena.children(tool_bar).to_vec();
    if !custom && !items.is_empty() {
        let slot = width / items.len() as f32;
        for &item in &items {
            arena.set_size(item, Size::new(slot, height));
        }
    }
    height
}

fn measure_divider(
    arena: &mut Arena,
    divider: Option<NodeId>,
    width: f32,
    cfg: &BarConfig,
    theme: &Theme,
    tool_bar_height: f32,
    tool_bar_custom: bool,
) -> f32 {
    let Some(divider) = divider else {
        return 0.0;
    };
    let height = if cfg.structured_toolbar
        && !tool_bar_custom
        && tool_bar_height > 0.0
        && cfg.compat == Compatibility::Modern
    {
        theme.divider_stroke
    } else {
        0.0
    };
    arena.set_size(divider, Size::new(width, height));
    height
}

/// Measure the whole composite. Child sizes land in the geometry cache; the
/// returned breakdown satisfies `total() == composite height`.
#[allow(clippy::too_many_arguments)]
pub fn measure_bar(
    arena: &mut Arena,
    bar: NodeId,
    constraint: Constraint,
    cfg: &BarConfig,
    theme: &Theme,
    env: &DeviceEnv,
    engine: Option<&CollapseEngine>,
    measurer: &dyn TextMeasurer,
) -> BarGeometry {
    let width = constraint.max.width;

    let title_bar = find_kind(arena, bar, |k| matches!(k, NodeKind::TitleBar));
    let tool_bar = find_kind(arena, bar, |k| matches!(k, NodeKind::ToolBar));
    let divider = find_kind(arena, bar, |k| matches!(k, NodeKind::Divider));
    let content = find_kind(arena, bar, |k| matches!(k, NodeKind::Content));

    let title_height = match title_bar {
        Some(tb) => titlebar::measure_title_bar(
            arena, tb, width, &cfg.title, theme, cfg.compat, engine, measurer,
        ),
        None => {
            log::debug!("bar has no title bar; measuring without one");
            0.0
        }
    };

    let tool_height = measure_tool_bar(arena, tool_bar, width, cfg, theme, env);
    let tool_bar_custom = tool_bar
        .and_then(|t| arena.get(t))
        .is_some_and(|n| n.flags.contains(NodeFlags::CUSTOM));
    let divider_height = measure_divider(
        arena,
        divider,
        width,
        cfg,
        theme,
        tool_height,
        tool_bar_custom,
    );

    let chrome = title_height + tool_height + divider_height;
    let content_height = if cfg.auto_height {
        // Content keeps whatever its owner measured; it drives the total.
        content.map(|c| arena.geometry(c).size.height).unwrap_or(0.0)
    } else {
        (constraint.max.height - chrome).max(0.0)
    };
    if let Some(content) = content {
        arena.set_size(content, Size::new(width, content_height));
    }

    let geometry = BarGeometry {
        title_bar: title_height,
        tool_bar: tool_height,
        divider: divider_height,
        content: content_height,
    };
    arena.set_size(bar, Size::new(width, geometry.total()));
    arena.clear_dirty(bar);
    geometry
}

/// Position the measured children. Offsets only; call after `measure_bar`
/// has finished for the whole subtree.
pub fn layout_bar(
    arena: &mut Arena,
    bar: NodeId,
    cfg: &BarConfig,
    theme: &Theme,
    engine: Option<&CollapseEngine>,
) {
    let total = arena.geometry(bar).size.height;

    let title_bar = find_kind(arena, bar, |k| matches!(k, NodeKind::TitleBar));
    let tool_bar = find_kind(arena, bar, |k| matches!(k, NodeKind::ToolBar));
    let divider = find_kind(arena, bar, |k| matches!(k, NodeKind::Divider));
    let content = find_kind(arena, bar, |k| matches!(k, NodeKind::Content));

    let title_height = title_bar.map(|t| arena.geometry(t).size.height).unwrap_or(0.0);
    let tool_height = tool_bar.map(|t| arena.geometry(t).size.height).unwrap_or(0.0);
    let divider_height = divider.map(|d| arena.geometry(d).size.height).unwrap_or(0.0);

    if let Some(title_bar) = title_bar {
        arena.set_offset(title_bar, Vec2::default());
        titlebar::layout_title_bar(arena, title_bar, &cfg.title, theme, engine);
    }
    if let Some(content) = content {
        arena.set_offset(content, Vec2::new(0.0, title_height));
    }
    // Tool bar pins to the bottom; divider sits immediately above it.
    if let Some(tool_bar) = tool_bar {
        arena.set_offset(tool_bar, Vec2::new(0.0, total - tool_height));
        let items = arena.children(tool_bar).to_vec();
        let mut x = 0.0;
        for item in items {
            let w = arena.geometry(item).size.width;
            arena.set_offset(item, Vec2::new(x, 0.0));
            x += w;
        }
    }
    if let Some(divider) = divider {
        arena.set_offset(divider, Vec2::new(0.0, total - tool_height - divider_height));
    }
}
