//! # Title bar sub-layout
//!
//! The title bar nests its own measure/layout: back button and menu anchor
//! the ends, the title (and optional subtitle) fills what remains. MINI mode
//! centers the title block vertically; FULL parks it at the expanded resting
//! offset; FREE reads the live offset published by the collapse engine,
//! already clamped to its range.
//!
//! Text measurement is an external concern. [`TextMeasurer`] is the seam;
//! [`CharMetrics`] is a deterministic stand-in good enough for layout tests.

use crate::collapse::CollapseEngine;
use pagoda_core::geometry::{Size, Vec2};
use pagoda_core::theme::{
    Compatibility, DOUBLE_LINE_TITLE_HEIGHT, FULL_DOUBLE_TITLE_HEIGHT, FULL_TITLE_HEIGHT,
    MAX_TITLE_FONT_SIZE, MIN_TITLE_FONT_SIZE, SINGLE_LINE_TITLE_HEIGHT, Theme,
};
use pagoda_core::tree::{Arena, NodeId, NodeKind};

/// Gap between the back button and the title block.
const BACK_TITLE_GAP: f32 = 8.0;
/// Fraction of an over-drag that feeds into the measured bar height.
const OVER_DRAG_HEIGHT_RATIO: f32 = 1.0 / 6.0;
const LINE_HEIGHT_RATIO: f32 = 1.4;

pub trait TextMeasurer {
    fn measure(&self, text: &str, font_size: f32, max_width: f32) -> Size;
}

/// Average-advance metrics: half an em per glyph, 1.4em line height. No
/// wrapping; width clamps to the available run.
#[derive(Default)]
pub struct CharMetrics;

impl TextMeasurer for CharMetrics {
    fn measure(&self, text: &str, font_size: f32, max_width: f32) -> Size {
        let natural = text.chars().count() as f32 * font_size * 0.5;
        Size::new(
            natural.min(max_width.max(0.0)),
            font_size * LINE_HEIGHT_RATIO,
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TitleMode {
    Mini,
    #[default]
    Free,
    Full,
}

/// Back-button policy. A nav bar shows it only in MINI mode; a destination
/// sets an explicit rule independent of title mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackButtonRule {
    #[default]
    MiniOnly,
    Shown,
    Hidden,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TitleBarAttrs {
    pub mode: TitleMode,
    pub explicit_height: Option<f32>,
    pub hidden: bool,
    /// Caller-supplied title subtree; skips the fixed horizontal paddings
    /// and the over-drag height contribution.
    pub custom: bool,
    pub back_button: BackButtonRule,
}

/// Direct children of a title bar, located by kind.
#[derive(Clone, Copy, Debug, Default)]
pub struct TitleBarParts {
    pub back: Option<NodeId>,
    pub title: Option<NodeId>,
    pub subtitle: Option<NodeId>,
    pub menu: Option<NodeId>,
    pub custom: Option<NodeId>,
}

pub fn locate_parts(arena: &Arena, title_bar: NodeId) -> TitleBarParts {
    let mut parts = TitleBarParts::default();
    for &child in arena.children(title_bar) {
        let Some(node) = arena.get(child) else {
            continue;
        };
        match node.kind {
            NodeKind::BackButton => parts.back = Some(child),
            NodeKind::Title { .. } => parts.title = Some(child),
            NodeKind::Subtitle { .. } => parts.subtitle = Some(child),
            NodeKind::Menu => parts.menu = Some(child),
            NodeKind::Custom => parts.custom = Some(child),
            _ => {}
        }
    }
    parts
}

fn node_text(arena: &Arena, id: Option<NodeId>) -> Option<String> {
    match &arena.get(id?)?.kind {
        NodeKind::Title { text } | NodeKind::Subtitle { text } => Some(text.clone()),
        _ => None,
    }
}

fn back_button_visible(attrs: &TitleBarAttrs, arena: &Arena, parts: &TitleBarParts) -> bool {
    let Some(back) = parts.back else { return false };
    if arena.is_hidden(back) {
        return false;
    }
    match attrs.back_button {
        BackButtonRule::Hidden => false,
        BackButtonRule::Shown => true,
        BackButtonRule::MiniOnly => attrs.mode == TitleMode::Mini,
    }
}

fn has_visible_subtitle(arena: &Arena, parts: &TitleBarParts) -> bool {
    parts.subtitle.is_some_and(|s| !arena.is_hidden(s))
}

/// Height of the bar itself, before any children are measured. FREE mode
/// reads the engine's live height; the over-drag contribution applies only
/// to non-custom titles.
fn resolve_height(
    attrs: &TitleBarAttrs,
    has_subtitle: bool,
    engine: Option<&CollapseEngine>,
) -> f32 {
    if let Some(h) = attrs.explicit_height {
        return if h.is_finite() { h.max(0.0) } else { 0.0 };
    }
    match attrs.mode {
        TitleMode::Mini => {
            if has_subtitle {
                DOUBLE_LINE_TITLE_HEIGHT
            } else {
                SINGLE_LINE_TITLE_HEIGHT
            }
        }
        TitleMode::Full => {
            if has_subtitle {
                FULL_DOUBLE_TITLE_HEIGHT
            } else {
                FULL_TITLE_HEIGHT
            }
        }
        TitleMode::Free => match engine {
            Some(engine) => {
                let mut h = engine.temp_height();
                if !attrs.custom {
                    h += engine.over_drag() * OVER_DRAG_HEIGHT_RATIO;
                }
                h
            }
            None => {
                if has_subtitle {
                    FULL_DOUBLE_TITLE_HEIGHT
                } else {
                    FULL_TITLE_HEIGHT
                }
            }
        },
    }
}

/// Measure the title bar and its children. Returns the bar height; all
/// child sizes land in the geometry cache.
#[allow(clippy::too_many_arguments)]
pub fn measure_title_bar(
    arena: &mut Arena,
    title_bar: NodeId,
    width: f32,
    attrs: &TitleBarAttrs,
    theme: &Theme,
    compat: Compatibility,
    engine: Option<&CollapseEngine>,
    measurer: &dyn TextMeasurer,
) -> f32 {
    let parts = locate_parts(arena, title_bar);

    if attrs.hidden {
        for id in [parts.back, parts.title, parts.subtitle, parts.menu, parts.custom]
            .into_iter()
            .flatten()
        {
            arena.set_size(id, Size::default());
        }
        arena.set_size(title_bar, Size::new(width, 0.0));
        return 0.0;
    }

    let has_subtitle = has_visible_subtitle(arena, &parts);
    let height = resolve_height(attrs, has_subtitle, engine);

    // Ends first; the title block gets what's left.
    let back_w = if back_button_visible(attrs, arena, &parts) {
        let s = theme.back_button_size(compat);
        if let Some(back) = parts.back {
            arena.set_size(back, Size::new(s, s));
        }
        s
    } else {
        if let Some(back) = parts.back {
            arena.set_size(back, Size::default());
        }
        0.0
    };

    let menu_w = match parts.menu {
        Some(menu) if !arena.is_hidden(menu) => {
            let slots = arena.children(menu).len() as f32;
            let w = slots * theme.menu_item_size;
            arena.set_size(menu, Size::new(w, theme.menu_item_size.min(height)));
            for &item in &arena.children(menu).to_vec() {
                arena.set_size(item, Size::new(theme.menu_item_size, theme.menu_item_size));
            }
            w
        }
        _ => {
            if let Some(menu) = parts.menu {
                arena.set_size(menu, Size::default());
            }
            0.0
        }
    };

    // Custom titles run edge to edge; standard titles pay the paddings.
    let padding = if attrs.custom { 0.0 } else { theme.title_padding };
    let occupied = back_w
        + if back_w > 0.0 { BACK_TITLE_GAP } else { 0.0 }
        + menu_w
        + 2.0 * padding;
    let title_avail = (width - occupied).max(0.0);

    if let Some(custom) = parts.custom {
        arena.set_size(custom, Size::new(title_avail, height));
    }

    let title_font = match (attrs.mode, engine) {
        (TitleMode::Free, Some(engine)) => engine.published().font_size,
        (TitleMode::Mini, _) => MIN_TITLE_FONT_SIZE,
        _ => MAX_TITLE_FONT_SIZE,
    };
    if let Some(title) = parts.title {
        let text = node_text(arena, Some(title)).unwrap_or_default();
        arena.set_size(title, measurer.measure(&text, title_font, title_avail));
    }
    if let Some(subtitle) = parts.subtitle {
        if has_subtitle {
            let text = node_text(arena, Some(subtitle)).unwrap_or_default();
            arena.set_size(
                subtitle,
                measurer.measure(&text, theme.subtitle_font_size, title_avail),
            );
        } else {
            arena.set_size(subtitle, Size::default());
        }
    }

    arena.set_size(title_bar, Size::new(width, height));
    height
}

/// Position the title bar's children. Pure offset arithmetic; nothing is
/// re-measured here.
pub fn layout_title_bar(
    arena: &mut Arena,
    title_bar: NodeId,
    attrs: &TitleBarAttrs,
    theme: &Theme,
    engine: Option<&CollapseEngine>,
) {
    if attrs.hidden {
        return;
    }
    let parts = locate_parts(arena, title_bar);
    let bar = arena.geometry(title_bar).size;
    let padding = if attrs.custom { 0.0 } else { theme.title_padding };

    let back_size = parts.back.map(|b| arena.geometry(b).size).unwrap_or_default();
    if let Some(back) = parts.back {
        // Vertically centered in the collapsed band, which every mode keeps
        // at the top of the bar.
        let y = (SINGLE_LINE_TITLE_HEIGHT - back_size.height) / 2.0;
        arena.set_offset(back, Vec2::new(theme.title_padding, y.max(0.0)));
    }

    if let Some(menu) = parts.menu {
        let menu_size = arena.geometry(menu).size;
        let x = (bar.width - theme.title_padding - menu_size.width).max(0.0);
        let y = (SINGLE_LINE_TITLE_HEIGHT - menu_size.height) / 2.0;
        arena.set_offset(menu, Vec2::new(x, y.max(0.0)));
        let mut item_x = 0.0;
        for &item in &arena.children(menu).to_vec() {
            let w = arena.geometry(item).size.width;
            arena.set_offset(item, Vec2::new(item_x, 0.0));
            item_x += w;
        }
    }

    let title_x = padding
        + if back_size.width > 0.0 {
            back_size.width + BACK_TITLE_GAP
        } else {
            0.0
        };

    if let Some(custom) = parts.custom {
        arena.set_offset(custom, Vec2::new(title_x, 0.0));
    }

    let title_size = parts.title.map(|t| arena.geometry(t).size).unwrap_or_default();
    let subtitle_size = parts
        .subtitle
        .map(|s| arena.geometry(s).size)
        .unwrap_or_default();
    let block_height = title_size.height
        + if subtitle_size.height > 0.0 {
            theme.subtitle_space + subtitle_size.height
        } else {
            0.0
        };

    let (title_y, subtitle_y) = match (attrs.mode, engine) {
        (TitleMode::Free, Some(engine)) => {
            let p = engine.published();
            (p.title_offset_y, p.subtitle_offset_y)
        }
        (TitleMode::Full, _) | (TitleMode::Free, None) => {
            let y = theme.full_title_offset;
            (y, y + title_size.height + theme.subtitle_space)
        }
        (TitleMode::Mini, _) => {
            let y = ((bar.height - block_height) / 2.0).max(0.0);
            (y, y + title_size.height + theme.subtitle_space)
        }
    };

    if let Some(title) = parts.title {
        arena.set_offset(title, Vec2::new(title_x, title_y));
    }
    if let Some(subtitle) = parts.subtitle
        && subtitle_size.height > 0.0
    {
        arena.set_offset(subtitle, Vec2::new(title_x, subtitle_y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(arena: &mut Arena, subtitle: bool) -> (NodeId, TitleBarParts) {
        let bar = arena.alloc(NodeKind::TitleBar);
        arena.alloc_child(bar, NodeKind::BackButton);
        arena.alloc_child(
            bar,
            NodeKind::Title {
                text: "Inbox".into(),
            },
        );
        if subtitle {
            arena.alloc_child(
                bar,
                NodeKind::Subtitle {
                    text: "12 unread".into(),
                },
            );
        }
        arena.alloc_child(bar, NodeKind::Menu);
        let parts = locate_parts(arena, bar);
        (bar, parts)
    }

    #[test]
    fn hidden_bar_is_zero() {
        let mut arena = Arena::new();
        let (bar, parts) = build(&mut arena, true);
        let attrs = TitleBarAttrs {
            hidden: true,
            ..Default::default()
        };
        let h = measure_title_bar(
            &mut arena,
            bar,
            400.0,
            &attrs,
            &Theme::default(),
            Compatibility::Modern,
            None,
            &CharMetrics,
        );
        assert_eq!(h, 0.0);
        assert_eq!(arena.geometry(parts.title.unwrap()).size, Size::default());
    }

    #[test]
    fn mini_mode_uses_line_constants() {
        let mut arena = Arena::new();
        let (bar, _) = build(&mut arena, false);
        let attrs = TitleBarAttrs {
            mode: TitleMode::Mini,
            ..Default::default()
        };
        let h = measure_title_bar(
            &mut arena,
            bar,
            400.0,
            &attrs,
            &Theme::default(),
            Compatibility::Modern,
            None,
            &CharMetrics,
        );
        assert_eq!(h, SINGLE_LINE_TITLE_HEIGHT);

        let (bar2, _) = build(&mut arena, true);
        let h2 = measure_title_bar(
            &mut arena,
            bar2,
            400.0,
            &attrs,
            &Theme::default(),
            Compatibility::Modern,
            None,
            &CharMetrics,
        );
        assert_eq!(h2, DOUBLE_LINE_TITLE_HEIGHT);
    }

    #[test]
    fn back_button_only_in_mini_for_nav_bar_rule() {
        let mut arena = Arena::new();
        let (bar, parts) = build(&mut arena, false);
        let theme = Theme::default();

        let full = TitleBarAttrs {
            mode: TitleMode::Full,
            ..Default::default()
        };
        measure_title_bar(
            &mut arena,
            bar,
            400.0,
            &full,
            &theme,
            Compatibility::Modern,
            None,
            &CharMetrics,
        );
        assert_eq!(arena.geometry(parts.back.unwrap()).size, Size::default());

        let mini = TitleBarAttrs {
            mode: TitleMode::Mini,
            ..Default::default()
        };
        measure_title_bar(
            &mut arena,
            bar,
            400.0,
            &mini,
            &theme,
            Compatibility::Modern,
            None,
            &CharMetrics,
        );
        assert_eq!(
            arena.geometry(parts.back.unwrap()).size.width,
            theme.back_button_size
        );
    }

    #[test]
    fn destination_rule_overrides_mode() {
        let mut arena = Arena::new();
        let (bar, parts) = build(&mut arena, false);
        let theme = Theme::default();
        let attrs = TitleBarAttrs {
            mode: TitleMode::Full,
            back_button: BackButtonRule::Shown,
            ..Default::default()
        };
        measure_title_bar(
            &mut arena,
            bar,
            400.0,
            &attrs,
            &theme,
            Compatibility::Legacy,
            None,
            &CharMetrics,
        );
        // Legacy hosts keep the smaller button.
        assert_eq!(
            arena.geometry(parts.back.unwrap()).size.width,
            theme.back_button_size_legacy
        );
    }

    #[test]
    fn title_width_subtracts_ends_and_padding() {
        let mut arena = Arena::new();
        let (bar, parts) = build(&mut arena, false);
        let theme = Theme::default();
        let menu = parts.menu.unwrap();
        arena.alloc_child(menu, NodeKind::BarItem(Default::default()));
        arena.alloc_child(menu, NodeKind::BarItem(Default::default()));

        let long = "A very long title that cannot possibly fit in the run";
        if let Some(node) = arena.get_mut(parts.title.unwrap()) {
            node.kind = NodeKind::Title { text: long.into() };
        }

        let attrs = TitleBarAttrs {
            mode: TitleMode::Mini,
            ..Default::default()
        };
        measure_title_bar(
            &mut arena,
            bar,
            400.0,
            &attrs,
            &theme,
            Compatibility::Modern,
            None,
            &CharMetrics,
        );

        // Long text is clamped by what back button + menu + paddings leave.
        let avail = 400.0
            - theme.back_button_size
            - 8.0
            - 2.0 * theme.menu_item_size
            - 2.0 * theme.title_padding;
        assert_eq!(arena.geometry(parts.title.unwrap()).size.width, avail);
    }

    #[test]
    fn measure_then_layout_is_idempotent() {
        let mut arena = Arena::new();
        let (bar, parts) = build(&mut arena, true);
        let theme = Theme::default();
        let attrs = TitleBarAttrs::default();
        let engine = CollapseEngine::new(&theme, true);

        let mut pass = |arena: &mut Arena| {
            measure_title_bar(
                arena,
                bar,
                420.0,
                &attrs,
                &theme,
                Compatibility::Modern,
                Some(&engine),
                &CharMetrics,
            );
            layout_title_bar(arena, bar, &attrs, &theme, Some(&engine));
            (
                arena.geometry(bar),
                arena.geometry(parts.title.unwrap()),
                arena.geometry(parts.subtitle.unwrap()),
            )
        };
        let first = pass(&mut arena);
        let second = pass(&mut arena);
        assert_eq!(first, second);
    }
}
