//! # Title-bar collapse engine
//!
//! Owns the continuous state of a free-mode title bar: the live height
//! between the single-line minimum and the expanded maximum, plus everything
//! derived from it (title/subtitle vertical offsets, title font size,
//! subtitle opacity, over-drag scale).
//!
//! MINI and FULL are not stored states; they are read-only classifications
//! of the live height against its range. Drags and associated scrolls move
//! the height directly; releasing snaps it to the nearer extreme with a
//! 200ms deceleration tween while any over-drag springs back to zero
//! independently. Both animations advance from `update()` on the frame loop
//! and are driven by the installed clock, so tests use `TestClock`.

use pagoda_core::animation::{AnimatedValue, AnimationSpec, Easing, SpringMotion};
use pagoda_core::theme::{
    FULL_DOUBLE_TITLE_HEIGHT, FULL_TITLE_HEIGHT, MAX_OVER_DRAG_SCALE, MAX_TITLE_FONT_SIZE,
    MIN_TITLE_FONT_SIZE, SINGLE_LINE_TITLE_HEIGHT, Theme,
};
use pagoda_core::tree::{Arena, NodeId};

/// Over-drag distance that maps to the full 10% scale feedback.
const OVER_DRAG_FULL_SCALE_PX: f32 = 180.0;

/// Spring releasing an over-drag: mass 1, stiffness 228, damping 30.
const SPRING_MASS: f32 = 1.0;
const SPRING_STIFFNESS: f32 = 228.0;
const SPRING_DAMPING: f32 = 30.0;

const RANGE_EPS: f32 = 1e-3;

/// Values published once per frame for layout and paint to read.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Published {
    pub height: f32,
    pub title_offset_y: f32,
    pub subtitle_offset_y: f32,
    pub font_size: f32,
    pub subtitle_opacity: f32,
    /// Uniform content scale in `[1.0, 1.1]`.
    pub scale: f32,
}

pub struct CollapseEngine {
    // Range.
    max_height: f32,
    has_subtitle: bool,
    explicit_max: Option<f32>,

    // Live state.
    default_height: f32,
    temp_height: f32,
    over_drag: f32,
    dragging: bool,

    // Offset mapping.
    min_title_offset: f32,
    max_title_offset: f32,
    move_ratio: f32,
    title_move_distance: f32,
    title_height: f32,
    subtitle_space: f32,

    can_over_drag: bool,
    associated_scroll_enabled: bool,
    scroll_tracking: bool,

    snap: AnimatedValue<f32>,
    spring: SpringMotion,
    published: Published,
}

impl CollapseEngine {
    pub fn new(theme: &Theme, has_subtitle: bool) -> Self {
        let max_height = Self::full_height(has_subtitle);
        let mut engine = Self {
            max_height,
            has_subtitle,
            explicit_max: None,
            default_height: max_height,
            temp_height: max_height,
            over_drag: 0.0,
            dragging: false,
            min_title_offset: 0.0,
            max_title_offset: theme.full_title_offset,
            move_ratio: 0.0,
            title_move_distance: 0.0,
            title_height: MAX_TITLE_FONT_SIZE,
            subtitle_space: theme.subtitle_space,
            can_over_drag: true,
            associated_scroll_enabled: true,
            scroll_tracking: false,
            snap: AnimatedValue::new(max_height, AnimationSpec::title_snap()),
            spring: SpringMotion::new(SPRING_MASS, SPRING_STIFFNESS, SPRING_DAMPING),
            published: Published {
                height: max_height,
                title_offset_y: theme.full_title_offset,
                subtitle_offset_y: theme.full_title_offset,
                font_size: MAX_TITLE_FONT_SIZE,
                subtitle_opacity: 1.0,
                scale: 1.0,
            },
        };
        engine.recompute_ratio();
        engine.derive_published();
        engine
    }

    fn full_height(has_subtitle: bool) -> f32 {
        if has_subtitle {
            FULL_DOUBLE_TITLE_HEIGHT
        } else {
            FULL_TITLE_HEIGHT
        }
    }

    pub fn set_has_subtitle(&mut self, has_subtitle: bool) {
        if self.has_subtitle == has_subtitle {
            return;
        }
        self.has_subtitle = has_subtitle;
        self.refresh_range();
    }

    /// Pin the expanded height explicitly (an explicit title-height
    /// property). Heights at or below the single-line minimum leave no room
    /// to collapse: the ratio degenerates to zero.
    pub fn set_explicit_max_height(&mut self, height: Option<f32>) {
        self.explicit_max = height;
        self.refresh_range();
    }

    fn refresh_range(&mut self) {
        self.max_height = match self.explicit_max {
            Some(h) if h.is_finite() => h.max(SINGLE_LINE_TITLE_HEIGHT),
            _ => Self::full_height(self.has_subtitle),
        };
        self.temp_height = self.clamp_height(self.temp_height);
        self.recompute_ratio();
        self.derive_published();
    }

    /// Feed measured text metrics back in so the offset mapping tracks the
    /// actual title block.
    pub fn set_title_metrics(&mut self, title_height: f32, max_title_offset: f32) {
        if title_height.is_finite() && title_height > 0.0 {
            self.title_height = title_height;
        }
        if max_title_offset.is_finite() && max_title_offset >= 0.0 {
            self.max_title_offset = max_title_offset;
        }
        self.recompute_ratio();
        self.derive_published();
    }

    /// Over-drag feedback is only for non-custom titles on modern hosts.
    pub fn set_over_drag_allowed(&mut self, allowed: bool) {
        self.can_over_drag = allowed;
        if !allowed {
            self.over_drag = 0.0;
            self.derive_published();
        }
    }

    fn clamp_height(&self, h: f32) -> f32 {
        if !h.is_finite() {
            return SINGLE_LINE_TITLE_HEIGHT;
        }
        h.clamp(SINGLE_LINE_TITLE_HEIGHT, self.max_height)
    }

    fn recompute_ratio(&mut self) {
        self.min_title_offset =
            ((SINGLE_LINE_TITLE_HEIGHT - self.title_height) / 2.0).max(0.0);
        let range = self.max_height - SINGLE_LINE_TITLE_HEIGHT;
        if range <= RANGE_EPS {
            // No room to collapse; a zero ratio keeps every offset pinned.
            log::trace!("{}", pagoda_core::error::LayoutError::DegenerateRatio);
            self.move_ratio = 0.0;
            self.title_move_distance = 0.0;
            return;
        }
        self.move_ratio = (self.max_title_offset - self.min_title_offset) / range;
        self.title_move_distance = range * self.move_ratio;
    }

    fn collapse_ratio(&self) -> f32 {
        let range = self.max_height - SINGLE_LINE_TITLE_HEIGHT;
        if range <= RANGE_EPS {
            return 0.0;
        }
        ((self.temp_height - SINGLE_LINE_TITLE_HEIGHT) / range).clamp(0.0, 1.0)
    }

    fn derive_published(&mut self) {
        let mapped = Easing::Sharp.interpolate(self.collapse_ratio());

        let font = MIN_TITLE_FONT_SIZE + (MAX_TITLE_FONT_SIZE - MIN_TITLE_FONT_SIZE) * mapped;
        let title_offset = (self.max_title_offset
            - (self.max_height - self.temp_height) * self.move_ratio)
            .clamp(self.min_title_offset, self.max_title_offset);

        let scale = if self.over_drag > 0.0 {
            let t = (self.over_drag / OVER_DRAG_FULL_SCALE_PX).min(1.0);
            (1.0 + (MAX_OVER_DRAG_SCALE - 1.0) * t).min(MAX_OVER_DRAG_SCALE)
        } else {
            1.0
        };

        self.published = Published {
            height: self.temp_height,
            title_offset_y: title_offset,
            subtitle_offset_y: title_offset + self.title_height + self.subtitle_space,
            font_size: font.clamp(MIN_TITLE_FONT_SIZE, MAX_TITLE_FONT_SIZE),
            subtitle_opacity: mapped.clamp(0.0, 1.0),
            scale,
        };
    }

    /// Begin a direct drag. Snapshots the current height as the drag origin,
    /// cancels in-flight animations, and publishes the mapped values as a
    /// non-animated jump.
    pub fn drag_start(&mut self, offset: f32) {
        self.snap.stop();
        self.spring.stop();
        self.dragging = true;
        self.default_height = self.temp_height;
        self.apply_offset(offset);
    }

    pub fn drag_update(&mut self, offset: f32) {
        if !self.dragging {
            return;
        }
        self.apply_offset(offset);
    }

    fn apply_offset(&mut self, offset: f32) {
        let offset = if offset.is_finite() { offset } else { 0.0 };
        let raw = self.default_height + offset;
        self.temp_height = self.clamp_height(raw);
        let over = raw - self.max_height;
        self.over_drag = if self.can_over_drag && over > 0.0 {
            over
        } else {
            0.0
        };
        self.derive_published();
    }

    /// End a drag: spring any over-drag back to zero and snap the height to
    /// the nearer extreme. Starting the snap disables associated scrolling
    /// until `reset_associated_scroll`.
    pub fn drag_end(&mut self) {
        self.dragging = false;
        if self.over_drag > 0.0 {
            self.spring.start(self.over_drag, 0.0, 0.0);
        }

        let range = self.max_height - SINGLE_LINE_TITLE_HEIGHT;
        if range <= RANGE_EPS {
            return;
        }
        let midpoint = SINGLE_LINE_TITLE_HEIGHT + range / 2.0;
        let target = if self.temp_height < midpoint {
            SINGLE_LINE_TITLE_HEIGHT
        } else {
            self.max_height
        };
        if (self.temp_height - target).abs() > RANGE_EPS {
            self.snap.snap_to(self.temp_height);
            self.snap.set_target(target);
            self.associated_scroll_enabled = false;
        }
    }

    /// Same math as a drag, driven by an associated scrollable's offset.
    /// Ignored while the latch is disabled.
    pub fn update_associated_scroll(&mut self, offset: f32) {
        if !self.associated_scroll_enabled {
            return;
        }
        if !self.scroll_tracking {
            self.scroll_tracking = true;
            self.snap.stop();
            self.spring.stop();
            self.default_height = self.temp_height;
        }
        self.apply_offset(offset);
    }

    /// The associated scrollable stopped; settle exactly like a drag end.
    pub fn finish_associated_scroll(&mut self) {
        if !self.scroll_tracking {
            return;
        }
        self.scroll_tracking = false;
        self.drag_end();
    }

    pub fn reset_associated_scroll(&mut self) {
        self.associated_scroll_enabled = true;
        self.scroll_tracking = false;
    }

    pub fn associated_scroll_enabled(&self) -> bool {
        self.associated_scroll_enabled
    }

    /// Advance snap/spring animations one frame; true while anything moves.
    pub fn update(&mut self) -> bool {
        let mut busy = false;

        if self.snap.is_animating() {
            busy |= self.snap.update();
            self.temp_height = self.clamp_height(*self.snap.get());
        }
        if self.spring.is_animating() {
            busy |= self.spring.update();
            self.over_drag = self.spring.value().max(0.0);
        }

        self.derive_published();
        busy
    }

    pub fn published(&self) -> &Published {
        &self.published
    }

    pub fn temp_height(&self) -> f32 {
        self.temp_height
    }

    pub fn over_drag(&self) -> f32 {
        self.over_drag
    }

    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    pub fn move_ratio(&self) -> f32 {
        self.move_ratio
    }

    pub fn title_move_distance(&self) -> f32 {
        self.title_move_distance
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Collapsed classification; not a stored state.
    pub fn is_mini(&self) -> bool {
        self.temp_height <= SINGLE_LINE_TITLE_HEIGHT + RANGE_EPS
    }

    /// Expanded classification; not a stored state.
    pub fn is_full(&self) -> bool {
        self.temp_height >= self.max_height - RANGE_EPS
    }

    /// Push the frame's paint values onto the title/subtitle nodes.
    pub fn apply_paint(&self, arena: &mut Arena, title: NodeId, subtitle: Option<NodeId>) {
        if let Some(p) = arena.paint_mut(title) {
            p.font_size = self.published.font_size;
            p.scale = self.published.scale;
        }
        if let Some(subtitle) = subtitle
            && let Some(p) = arena.paint_mut(subtitle)
        {
            p.opacity = self.published.subtitle_opacity;
            p.scale = self.published.scale;
        }
    }
}
