//! # Presentation mode resolution
//!
//! Each measure pass re-derives the effective presentation mode from the
//! configured mode and the available width. An explicit STACK/SPLIT always
//! wins; AUTO falls back to STACK when the minimum nav-bar plus minimum
//! content widths no longer fit side by side.
//!
//! A resolved mode *change* starts a one-shot pane interpolation (slide +
//! fade), separate from the title-bar collapse engine.

use pagoda_core::animation::{AnimatedValue, AnimationSpec, Easing};
use pagoda_core::geometry::Length;
use pagoda_core::theme::Theme;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationMode {
    #[default]
    Auto,
    Split,
    Stack,
}

/// Width constraints, each absolute or percent-of-available.
#[derive(Clone, Copy, Debug)]
pub struct WidthConstraints {
    pub min_nav_bar: Length,
    pub max_nav_bar: Length,
    pub min_content: Length,
}

impl WidthConstraints {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            min_nav_bar: Length::Px(theme.min_nav_bar_width),
            max_nav_bar: Length::Px(theme.max_nav_bar_width),
            min_content: Length::Px(theme.min_content_width),
        }
    }
}

/// Split-mode pane widths produced by one resolution pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PaneWidths {
    pub nav_bar: f32,
    pub divider: f32,
    pub content: f32,
}

pub type ModeChangeCallback = Rc<dyn Fn(NavigationMode)>;
pub type VisibilityCallback = Rc<dyn Fn(bool)>;

pub struct ModeController {
    user_mode: NavigationMode,
    resolved: NavigationMode,
    constraints: WidthConstraints,

    nav_bar_width: f32,
    /// Width the host set explicitly; applied with priority on the first
    /// layout after it changes, then the clamped result becomes sticky.
    user_width: Option<f32>,
    user_width_pending: bool,

    nav_bar_hidden: bool,

    transition: Option<ModeTransition>,
    on_mode_change: Option<ModeChangeCallback>,
    on_nav_bar_visibility: Option<VisibilityCallback>,
}

impl ModeController {
    pub fn new(theme: &Theme) -> Self {
        Self {
            user_mode: NavigationMode::Auto,
            resolved: NavigationMode::Auto,
            constraints: WidthConstraints::from_theme(theme),
            nav_bar_width: theme.default_nav_bar_width,
            user_width: None,
            user_width_pending: false,
            nav_bar_hidden: false,
            transition: None,
            on_mode_change: None,
            on_nav_bar_visibility: None,
        }
    }

    pub fn set_user_mode(&mut self, mode: NavigationMode) {
        self.user_mode = mode;
    }

    pub fn user_mode(&self) -> NavigationMode {
        self.user_mode
    }

    pub fn set_constraints(&mut self, constraints: WidthConstraints) {
        self.constraints = constraints;
    }

    pub fn set_nav_bar_width(&mut self, width: f32) {
        self.user_width = Some(width);
        self.user_width_pending = true;
    }

    pub fn nav_bar_width(&self) -> f32 {
        self.nav_bar_width
    }

    pub fn set_nav_bar_hidden(&mut self, hidden: bool) {
        if self.nav_bar_hidden != hidden {
            self.nav_bar_hidden = hidden;
            if let Some(cb) = &self.on_nav_bar_visibility {
                cb(!hidden);
            }
        }
    }

    pub fn nav_bar_hidden(&self) -> bool {
        self.nav_bar_hidden
    }

    pub fn on_mode_change(&mut self, cb: ModeChangeCallback) {
        self.on_mode_change = Some(cb);
    }

    pub fn on_nav_bar_visibility(&mut self, cb: VisibilityCallback) {
        self.on_nav_bar_visibility = Some(cb);
    }

    /// Effective mode from the last resolution pass.
    pub fn mode(&self) -> NavigationMode {
        self.resolved
    }

    /// Re-derive the effective mode for this pass and, in split, the pane
    /// widths. Call once per measure with the current available width.
    pub fn resolve(&mut self, available_width: f32, theme: &Theme) -> NavigationMode {
        let available = if available_width.is_finite() {
            available_width.max(0.0)
        } else {
            0.0
        };

        let min_nav = self.constraints.min_nav_bar.resolve(available);
        let min_content = self.constraints.min_content.resolve(available);

        let next = match self.user_mode {
            NavigationMode::Stack => NavigationMode::Stack,
            NavigationMode::Split => NavigationMode::Split,
            NavigationMode::Auto => {
                if available < min_nav + min_content {
                    NavigationMode::Stack
                } else {
                    NavigationMode::Split
                }
            }
        };

        if next == NavigationMode::Split {
            self.clamp_nav_bar_width(available, theme);
        }

        if self.resolved != next && self.resolved != NavigationMode::Auto {
            log::debug!("navigation mode {:?} -> {:?}", self.resolved, next);
            self.transition = Some(ModeTransition::begin(self.resolved, next));
            if let Some(cb) = &self.on_mode_change {
                cb(next);
            }
        } else if self.resolved == NavigationMode::Auto {
            // First resolution: no animation, just adopt.
            if let Some(cb) = &self.on_mode_change {
                cb(next);
            }
        }
        self.resolved = next;
        next
    }

    /// Pane widths for the current nav-bar width; valid after `resolve`
    /// returned SPLIT.
    pub fn pane_widths(&self, available_width: f32, theme: &Theme) -> PaneWidths {
        let divider = theme.pane_divider_width;
        let nav_bar = self.nav_bar_width.min(available_width.max(0.0));
        PaneWidths {
            nav_bar,
            divider,
            content: (available_width - nav_bar - divider).max(0.0),
        }
    }

    fn clamp_nav_bar_width(&mut self, available: f32, theme: &Theme) {
        let min_nav = self.constraints.min_nav_bar.resolve(available);
        let mut max_nav = self.constraints.max_nav_bar.resolve(available);
        if max_nav < min_nav {
            max_nav = min_nav;
        }
        let min_content = self.constraints.min_content.resolve(available);

        let mut width = if self.user_width_pending {
            self.user_width_pending = false;
            self.user_width.unwrap_or(self.nav_bar_width)
        } else {
            self.nav_bar_width
        };
        width = width.clamp(min_nav, max_nav);

        // Re-clamp so the content pane keeps its minimum, nav-bar minimum
        // still wins when both cannot fit.
        let max_for_content = available - min_content - theme.pane_divider_width;
        if width > max_for_content {
            width = max_for_content.clamp(min_nav, max_nav);
        }
        self.nav_bar_width = width;
    }

    /// Advance the pane interpolation; returns true while it still runs.
    pub fn update_transition(&mut self) -> bool {
        if let Some(tr) = &mut self.transition {
            if tr.update() {
                return true;
            }
            self.transition = None;
        }
        false
    }

    pub fn transition(&self) -> Option<&ModeTransition> {
        self.transition.as_ref()
    }
}

/// One-shot slide+fade between pane arrangements on a mode flip.
pub struct ModeTransition {
    pub from: NavigationMode,
    pub to: NavigationMode,
    progress: AnimatedValue<f32>,
}

const MODE_TRANSITION: Duration = Duration::from_millis(250);
const MODE_SLIDE_PX: f32 = 48.0;

impl ModeTransition {
    fn begin(from: NavigationMode, to: NavigationMode) -> Self {
        let mut progress = AnimatedValue::new(
            0.0,
            AnimationSpec::tween(MODE_TRANSITION, Easing::FastOutSlowIn),
        );
        progress.set_target(1.0);
        Self { from, to, progress }
    }

    pub fn update(&mut self) -> bool {
        self.progress.update()
    }

    pub fn progress(&self) -> f32 {
        *self.progress.get()
    }

    /// Nav-bar pane alpha during the flip.
    pub fn nav_bar_alpha(&self) -> f32 {
        match self.to {
            NavigationMode::Stack => 1.0 - self.progress(),
            _ => self.progress(),
        }
    }

    /// Horizontal shift applied to the incoming arrangement.
    pub fn slide_offset(&self) -> f32 {
        (1.0 - self.progress()) * MODE_SLIDE_PX
    }
}
