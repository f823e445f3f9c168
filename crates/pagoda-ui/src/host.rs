//! # Navigation host
//!
//! Glue between the navigation crate and the bar layout: one frame call
//! advances every animation, re-resolves the presentation mode, measures and
//! lays out the visible panes, and publishes paint values. This is the
//! embedder-facing surface; everything underneath stays independently
//! testable.
//!
//! Per frame, each bar subtree is fully measured before its layout offsets
//! are written, and panes go in a fixed structural order (nav bar, pane
//! divider, content) because later positions depend on earlier widths.

use crate::collapse::CollapseEngine;
use crate::layout::{BarConfig, BarGeometry, layout_bar, measure_bar};
use crate::titlebar::{BackButtonRule, CharMetrics, TextMeasurer, TitleMode};
use crate::{BarHandles, build_destination, build_nav_bar};
use pagoda_core::geometry::{Constraint, Size, Vec2};
use pagoda_core::theme::{DeviceEnv, Theme};
use pagoda_core::tree::{Arena, NodeId, NodeKind};
use pagoda_navigation::{
    DestinationHooks, ModeController, NavPathStack, NavigationMode, Orchestrator,
};
use slotmap::SecondaryMap;

/// One composite bar plus its per-instance layout state.
pub struct BarState {
    pub handles: BarHandles,
    pub config: BarConfig,
    pub engine: Option<CollapseEngine>,
    pub geometry: BarGeometry,
}

impl BarState {
    fn new(handles: BarHandles, config: BarConfig, engine: Option<CollapseEngine>) -> Self {
        Self {
            handles,
            config,
            engine,
            geometry: BarGeometry::default(),
        }
    }
}

/// What one frame produced.
#[derive(Clone, Copy, Debug)]
pub struct FrameStats {
    pub mode: NavigationMode,
    /// Something is still animating; schedule another frame.
    pub animating: bool,
    pub nav_bar: BarGeometry,
    pub top: Option<BarGeometry>,
}

pub struct NavHost {
    pub arena: Arena,
    pub stack: NavPathStack,
    pub modes: ModeController,
    pub orchestrator: Orchestrator,
    theme: Theme,
    env: DeviceEnv,
    root: NodeId,
    pane_divider: NodeId,
    nav_bar: BarState,
    destinations: SecondaryMap<NodeId, BarState>,
    measurer: Box<dyn TextMeasurer>,
}

impl NavHost {
    pub fn new(theme: Theme, env: DeviceEnv) -> Self {
        let mut arena = Arena::new();
        let root = arena.alloc(NodeKind::Navigation);
        let handles = build_nav_bar(&mut arena, "", None);
        arena.attach(root, handles.root);
        let pane_divider = arena.alloc_child(root, NodeKind::Divider);

        let config = BarConfig::default();
        let engine = CollapseEngine::new(&theme, false);
        Self {
            arena,
            stack: NavPathStack::new(),
            modes: ModeController::new(&theme),
            orchestrator: Orchestrator::new(),
            theme,
            env,
            root,
            pane_divider,
            nav_bar: BarState::new(handles, config, Some(engine)),
            destinations: SecondaryMap::new(),
            measurer: Box::new(CharMetrics),
        }
    }

    pub fn with_measurer(mut self, measurer: Box<dyn TextMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    pub fn set_device_env(&mut self, env: DeviceEnv) {
        self.env = env;
        self.arena.mark_dirty(self.root);
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn nav_bar(&self) -> &BarState {
        &self.nav_bar
    }

    pub fn nav_bar_mut(&mut self) -> &mut BarState {
        &mut self.nav_bar
    }

    pub fn destination(&self, node: NodeId) -> Option<&BarState> {
        self.destinations.get(node)
    }

    pub fn destination_mut(&mut self, node: NodeId) -> Option<&mut BarState> {
        self.destinations.get_mut(node)
    }

    /// Replace the nav-bar title texts, creating/dropping the subtitle node
    /// as needed.
    pub fn set_nav_title(&mut self, title: &str, subtitle: Option<&str>) {
        set_bar_title(&mut self.arena, &mut self.nav_bar, title, subtitle);
    }

    /// Build a destination subtree and push it. Returns the destination node
    /// the stack now tracks.
    pub fn push(&mut self, name: &str, title: &str, subtitle: Option<&str>) -> NodeId {
        let handles = build_destination(&mut self.arena, title, subtitle);
        self.arena.attach(self.root, handles.root);

        let config = BarConfig {
            title: crate::titlebar::TitleBarAttrs {
                mode: TitleMode::Free,
                back_button: BackButtonRule::Shown,
                ..Default::default()
            },
            ..Default::default()
        };
        let engine = CollapseEngine::new(&self.theme, subtitle.is_some());
        self.destinations
            .insert(handles.root, BarState::new(handles, config, Some(engine)));

        self.stack.push(name, handles.root);
        self.orchestrator.on_stack_changed(&self.arena, &mut self.stack);
        handles.root
    }

    pub fn pop(&mut self) -> bool {
        if !self.stack.can_go_back() {
            return false;
        }
        self.stack.pop();
        self.orchestrator.on_stack_changed(&self.arena, &mut self.stack);
        true
    }

    /// Swap the top destination; the next frame crossfades.
    pub fn replace(&mut self, name: &str, title: &str, subtitle: Option<&str>) -> NodeId {
        let handles = build_destination(&mut self.arena, title, subtitle);
        self.arena.attach(self.root, handles.root);
        let engine = CollapseEngine::new(&self.theme, subtitle.is_some());
        let config = BarConfig {
            title: crate::titlebar::TitleBarAttrs {
                mode: TitleMode::Free,
                back_button: BackButtonRule::Shown,
                ..Default::default()
            },
            ..Default::default()
        };
        self.destinations
            .insert(handles.root, BarState::new(handles, config, Some(engine)));

        self.stack.replace(name, handles.root);
        self.orchestrator.on_stack_changed(&self.arena, &mut self.stack);
        handles.root
    }

    /// Empty the stack; the nav bar becomes the visible pane again.
    pub fn clear(&mut self) {
        self.stack.clear();
        self.orchestrator.on_stack_changed(&self.arena, &mut self.stack);
    }

    pub fn register_hooks(&mut self, node: NodeId, hooks: DestinationHooks) {
        self.orchestrator.register(node, hooks);
    }

    pub fn handle_back(&mut self) -> bool {
        self.orchestrator.handle_back(&self.arena, &mut self.stack)
    }

    /// Tear down a destination that left the stack for good. Stops its
    /// animations (the engine drops with the state) and frees the subtree.
    pub fn remove_destination(&mut self, node: NodeId) {
        if self.stack.top().is_some_and(|e| e.node == node) {
            log::warn!("refusing to remove the active destination");
            return;
        }
        self.destinations.remove(node);
        self.orchestrator.unregister(node);
        self.arena.remove(node);
    }

    /// Run one frame: advance animations, resolve the mode, measure, then
    /// lay out.
    pub fn frame(&mut self, width: f32, height: f32) -> FrameStats {
        let mut animating = false;
        if let Some(engine) = &mut self.nav_bar.engine {
            animating |= engine.update();
        }
        for (_, state) in self.destinations.iter_mut() {
            if let Some(engine) = &mut state.engine {
                animating |= engine.update();
            }
        }
        animating |= self.orchestrator.update();
        animating |= self.modes.update_transition();

        let (width, height) = match Constraint::checked(width, height) {
            Ok(c) => (c.max.width, c.max.height),
            Err(e) => {
                log::warn!("{e}; clamping frame constraint");
                let c = Constraint::new(width, height);
                (c.max.width, c.max.height)
            }
        };

        let mode = self.modes.resolve(width, &self.theme);
        self.arena.set_size(self.root, Size::new(width, height));

        let top = self.stack.top().map(|e| e.node);
        let (nav_geometry, top_geometry) = match mode {
            NavigationMode::Split => self.frame_split(width, height, top),
            _ => self.frame_stack(width, height, top),
        };
        self.nav_bar.geometry = nav_geometry;

        self.publish_paint(top);
        self.arena.clear_dirty(self.root);

        FrameStats {
            mode,
            animating,
            nav_bar: nav_geometry,
            top: top_geometry,
        }
    }

    fn frame_split(
        &mut self,
        width: f32,
        height: f32,
        top: Option<NodeId>,
    ) -> (BarGeometry, Option<BarGeometry>) {
        let widths = self.modes.pane_widths(width, &self.theme);
        let nav_hidden = self.modes.nav_bar_hidden();
        self.arena.set_hidden(self.nav_bar.handles.root, nav_hidden);

        let nav_geometry = if nav_hidden {
            self.nav_bar.geometry
        } else {
            let c = Constraint::new(widths.nav_bar, height);
            let g = measure_bar(
                &mut self.arena,
                self.nav_bar.handles.root,
                c,
                &self.nav_bar.config,
                &self.theme,
                &self.env,
                self.nav_bar.engine.as_ref(),
                self.measurer.as_ref(),
            );
            layout_bar(
                &mut self.arena,
                self.nav_bar.handles.root,
                &self.nav_bar.config,
                &self.theme,
                self.nav_bar.engine.as_ref(),
            );
            self.arena
                .set_offset(self.nav_bar.handles.root, Vec2::default());
            g
        };

        let divider_x = if nav_hidden { 0.0 } else { widths.nav_bar };
        self.arena.set_size(
            self.pane_divider,
            Size::new(if nav_hidden { 0.0 } else { widths.divider }, height),
        );
        self.arena
            .set_offset(self.pane_divider, Vec2::new(divider_x, 0.0));

        let content_x = divider_x + if nav_hidden { 0.0 } else { widths.divider };
        let content_w = (width - content_x).max(0.0);
        let top_geometry = top.map(|node| {
            let g = self.measure_destination(node, Constraint::new(content_w, height));
            self.arena.set_offset(node, Vec2::new(content_x, 0.0));
            g
        });

        (nav_geometry, top_geometry)
    }

    fn frame_stack(
        &mut self,
        width: f32,
        height: f32,
        top: Option<NodeId>,
    ) -> (BarGeometry, Option<BarGeometry>) {
        // A pushed destination covers the nav bar entirely.
        let nav_covered = top.is_some() || self.modes.nav_bar_hidden();
        self.arena.set_hidden(self.nav_bar.handles.root, nav_covered);
        self.arena.set_size(self.pane_divider, Size::default());

        let nav_geometry = if nav_covered {
            self.nav_bar.geometry
        } else {
            let c = Constraint::new(width, height);
            let g = measure_bar(
                &mut self.arena,
                self.nav_bar.handles.root,
                c,
                &self.nav_bar.config,
                &self.theme,
                &self.env,
                self.nav_bar.engine.as_ref(),
                self.measurer.as_ref(),
            );
            layout_bar(
                &mut self.arena,
                self.nav_bar.handles.root,
                &self.nav_bar.config,
                &self.theme,
                self.nav_bar.engine.as_ref(),
            );
            self.arena
                .set_offset(self.nav_bar.handles.root, Vec2::default());
            g
        };

        let top_geometry = top.map(|node| {
            let g = self.measure_destination(node, Constraint::new(width, height));
            self.arena.set_offset(node, Vec2::default());
            g
        });

        (nav_geometry, top_geometry)
    }

    fn measure_destination(&mut self, node: NodeId, constraint: Constraint) -> BarGeometry {
        let Some(state) = self.destinations.get_mut(node) else {
            log::warn!(
                "{}; top of stack skipped this frame",
                pagoda_core::error::LayoutError::MissingNode("destination")
            );
            return BarGeometry::default();
        };
        let g = measure_bar(
            &mut self.arena,
            state.handles.root,
            constraint,
            &state.config,
            &self.theme,
            &self.env,
            state.engine.as_ref(),
            self.measurer.as_ref(),
        );
        layout_bar(
            &mut self.arena,
            state.handles.root,
            &state.config,
            &self.theme,
            state.engine.as_ref(),
        );
        state.geometry = g;

        // Feed measured text metrics back so the collapse mapping tracks the
        // real title block next frame.
        let title_h = self.arena.geometry(state.handles.title).size.height;
        if let Some(engine) = &mut state.engine {
            engine.set_title_metrics(title_h, self.theme.full_title_offset);
        }
        g
    }

    fn publish_paint(&mut self, top: Option<NodeId>) {
        if let Some(engine) = &self.nav_bar.engine {
            engine.apply_paint(
                &mut self.arena,
                self.nav_bar.handles.title,
                self.nav_bar.handles.subtitle,
            );
        }
        if let Some(top) = top
            && let Some(state) = self.destinations.get(top)
            && let Some(engine) = &state.engine
        {
            engine.apply_paint(&mut self.arena, state.handles.title, state.handles.subtitle);
        }

        // Rest pose for the visible panes, then overlay whatever is still
        // animating so the paint layer sees the in-flight values.
        if let Some(top) = top
            && let Some(p) = self.arena.paint_mut(top)
        {
            p.translate_x = 0.0;
            p.opacity = 1.0;
        }
        if let Some(p) = self.arena.paint_mut(self.nav_bar.handles.root) {
            p.translate_x = 0.0;
            p.opacity = 1.0;
        }
        if let Some(mt) = self.modes.transition()
            && let Some(p) = self.arena.paint_mut(self.nav_bar.handles.root)
        {
            p.opacity = mt.nav_bar_alpha();
            p.translate_x = mt.slide_offset();
        }
        if let Some(tr) = self.orchestrator.active() {
            let values = [
                (tr.enter, tr.enter_offset_x(), tr.enter_alpha()),
                (tr.exit, tr.exit_offset_x(), tr.exit_alpha()),
            ];
            for (node, dx, alpha) in values {
                if let Some(node) = node
                    && let Some(p) = self.arena.paint_mut(node)
                {
                    p.translate_x = dx;
                    p.opacity = alpha;
                }
            }
        }
    }
}

fn set_bar_title(arena: &mut Arena, bar: &mut BarState, title: &str, subtitle: Option<&str>) {
    if let Some(node) = arena.get_mut(bar.handles.title) {
        node.kind = NodeKind::Title {
            text: title.to_owned(),
        };
    }
    match (bar.handles.subtitle, subtitle) {
        (Some(node), Some(text)) => {
            if let Some(n) = arena.get_mut(node) {
                n.kind = NodeKind::Subtitle {
                    text: text.to_owned(),
                };
            }
        }
        (Some(node), None) => {
            arena.remove(node);
            bar.handles.subtitle = None;
        }
        (None, Some(text)) => {
            let node = arena.alloc_child(
                bar.handles.title_bar,
                NodeKind::Subtitle {
                    text: text.to_owned(),
                },
            );
            bar.handles.subtitle = Some(node);
        }
        (None, None) => {}
    }
    if let Some(engine) = &mut bar.engine {
        engine.set_has_subtitle(subtitle.is_some());
    }
    arena.mark_dirty(bar.handles.title_bar);
}
