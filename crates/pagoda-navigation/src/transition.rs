//! # Transition orchestration
//!
//! Watches the back stack for top changes and turns them into directional
//! enter/exit animations plus destination lifecycle callbacks.
//!
//! Direction is decided by node identity, not by name: a new top that equals
//! the previously recorded second-from-top entry is a pop; a top that did not
//! exist before is a push; a pending one-shot replace marker on the stack
//! short-circuits both and crossfades.
//!
//! A missing node at any step aborts that step with a warning; the frame's
//! layout still completes with best-effort sizes.

use crate::stack::NavPathStack;
use pagoda_core::animation::{AnimatedValue, AnimationSpec};
use pagoda_core::tree::{Arena, NodeId};
use slotmap::SecondaryMap;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransitionKind {
    #[default]
    None,
    Push,
    Pop,
    Replace,
}

/// Per-destination lifecycle callbacks, registered by the embedder.
#[derive(Clone, Default)]
pub struct DestinationHooks {
    pub on_show: Option<Rc<dyn Fn()>>,
    pub on_hidden: Option<Rc<dyn Fn()>>,
    /// Returning true consumes the back press; the default pop is suppressed.
    pub on_back_pressed: Option<Rc<dyn Fn() -> bool>>,
}

pub struct Orchestrator {
    hooks: SecondaryMap<NodeId, DestinationHooks>,
    visible: SecondaryMap<NodeId, bool>,
    prev_top: Option<NodeId>,
    prev_second: Option<NodeId>,
    active: Option<PageTransition>,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            hooks: SecondaryMap::new(),
            visible: SecondaryMap::new(),
            prev_top: None,
            prev_second: None,
            active: None,
        }
    }

    pub fn register(&mut self, node: NodeId, hooks: DestinationHooks) {
        self.hooks.insert(node, hooks);
        if let Some(entry) = self.visible.entry(node) {
            entry.or_insert(false);
        }
    }

    /// Drop all bookkeeping for a destination leaving the tree.
    pub fn unregister(&mut self, node: NodeId) {
        self.hooks.remove(node);
        self.visible.remove(node);
        if self.prev_top == Some(node) {
            self.prev_top = None;
        }
        if self.prev_second == Some(node) {
            self.prev_second = None;
        }
        let involves_node = self
            .active
            .as_ref()
            .is_some_and(|a| a.enter == Some(node) || a.exit == Some(node));
        if involves_node {
            self.active = None;
        }
    }

    pub fn is_visible(&self, node: NodeId) -> bool {
        self.visible.get(node).copied().unwrap_or(false)
    }

    /// Flip a destination's visibility, firing its callback exactly once per
    /// actual change.
    fn set_visible(&mut self, node: NodeId, visible: bool) {
        let slot = self.visible.entry(node).map(|e| e.or_insert(false));
        let Some(slot) = slot else { return };
        if *slot == visible {
            return;
        }
        *slot = visible;
        let hooks = self.hooks.get(node).cloned().unwrap_or_default();
        let cb = if visible { hooks.on_show } else { hooks.on_hidden };
        if let Some(cb) = cb {
            cb();
        }
    }

    /// React to a stack mutation: fire lifecycle callbacks and start the
    /// matching enter/exit animation. Returns the detected kind.
    pub fn on_stack_changed(&mut self, arena: &Arena, stack: &mut NavPathStack) -> TransitionKind {
        let new_top = stack.top().map(|e| e.node);
        let replace = stack.consume_replace();

        let kind = if new_top == self.prev_top {
            TransitionKind::None
        } else if replace {
            TransitionKind::Replace
        } else if new_top.is_none() || new_top == self.prev_second {
            // Emptied the stack, or the old second-from-top resurfaced.
            TransitionKind::Pop
        } else {
            TransitionKind::Push
        };

        if kind != TransitionKind::None {
            let exit = self.prev_top;
            let enter = new_top;

            // Lifecycle first, animation second; both visibility flips fire
            // exactly once even if the animation is skipped.
            if let Some(exit) = exit {
                self.set_visible(exit, false);
            }
            if let Some(enter) = enter {
                self.set_visible(enter, true);
            }

            let enter_ok = enter.is_none_or(|n| arena.contains(n));
            let exit_ok = exit.is_none_or(|n| arena.contains(n));
            if enter_ok && exit_ok && (enter.is_some() || exit.is_some()) {
                self.active = Some(PageTransition::begin(kind, enter, exit));
            } else {
                log::warn!("page transition skipped: destination node missing from arena");
                self.active = None;
            }
        }

        self.prev_top = new_top;
        self.prev_second = stack.pre_top().map(|e| e.node);
        kind
    }

    /// Route a system back press. Returns true when the press was consumed,
    /// either by the top destination's handler or by popping the stack.
    pub fn handle_back(&mut self, arena: &Arena, stack: &mut NavPathStack) -> bool {
        if let Some(top) = stack.top()
            && let Some(hooks) = self.hooks.get(top.node)
            && let Some(pred) = &hooks.on_back_pressed
            && pred()
        {
            // Handler consumed the press; the pop is suppressed.
            return true;
        }
        if !stack.can_go_back() {
            return false;
        }
        stack.pop();
        self.on_stack_changed(arena, stack);
        true
    }

    /// Advance the in-flight page transition; true while still animating.
    pub fn update(&mut self) -> bool {
        if let Some(active) = &mut self.active {
            if active.update() {
                return true;
            }
            self.active = None;
        }
        false
    }

    pub fn active(&self) -> Option<&PageTransition> {
        self.active.as_ref()
    }
}

/// Values for one in-flight enter/exit animation, sampled per frame by the
/// paint layer. Push/pop slide along the trailing edge; replace crossfades.
pub struct PageTransition {
    pub kind: TransitionKind,
    pub enter: Option<NodeId>,
    pub exit: Option<NodeId>,
    progress: AnimatedValue<f32>,
}

const PAGE_SLIDE_PX: f32 = 60.0;

impl PageTransition {
    fn begin(kind: TransitionKind, enter: Option<NodeId>, exit: Option<NodeId>) -> Self {
        let mut progress = AnimatedValue::new(0.0, AnimationSpec::fast());
        progress.set_target(1.0);
        Self {
            kind,
            enter,
            exit,
            progress,
        }
    }

    pub fn update(&mut self) -> bool {
        self.progress.update()
    }

    pub fn progress(&self) -> f32 {
        *self.progress.get()
    }

    /// Horizontal offset of the entering destination.
    pub fn enter_offset_x(&self) -> f32 {
        let t = self.progress();
        match self.kind {
            TransitionKind::Push => (1.0 - t) * PAGE_SLIDE_PX,
            TransitionKind::Pop => (1.0 - t) * -PAGE_SLIDE_PX,
            _ => 0.0,
        }
    }

    /// Horizontal offset of the exiting destination.
    pub fn exit_offset_x(&self) -> f32 {
        let t = self.progress();
        match self.kind {
            TransitionKind::Push => t * -PAGE_SLIDE_PX,
            TransitionKind::Pop => t * PAGE_SLIDE_PX,
            _ => 0.0,
        }
    }

    pub fn enter_alpha(&self) -> f32 {
        match self.kind {
            TransitionKind::Replace => self.progress(),
            _ => 0.75 + 0.25 * self.progress(),
        }
    }

    pub fn exit_alpha(&self) -> f32 {
        match self.kind {
            TransitionKind::Replace => 1.0 - self.progress(),
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagoda_core::animation::{TestClock, set_clock};
    use pagoda_core::tree::NodeKind;
    use std::cell::RefCell;
    use std::time::{Duration, Instant};

    fn setup() -> (Arena, NavPathStack, Orchestrator) {
        (Arena::new(), NavPathStack::new(), Orchestrator::new())
    }

    fn dest(arena: &mut Arena) -> NodeId {
        arena.alloc(NodeKind::Destination)
    }

    #[test]
    fn push_then_pop_direction() {
        let (mut arena, mut stack, mut orch) = setup();
        let a = dest(&mut arena);
        let b = dest(&mut arena);

        stack.push("a", a);
        assert_eq!(orch.on_stack_changed(&arena, &mut stack), TransitionKind::Push);
        stack.push("b", b);
        assert_eq!(orch.on_stack_changed(&arena, &mut stack), TransitionKind::Push);
        stack.pop();
        assert_eq!(orch.on_stack_changed(&arena, &mut stack), TransitionKind::Pop);
        // No change: nothing to orchestrate.
        assert_eq!(orch.on_stack_changed(&arena, &mut stack), TransitionKind::None);
    }

    #[test]
    fn replace_crossfades() {
        let (mut arena, mut stack, mut orch) = setup();
        let a = dest(&mut arena);
        stack.push("a", a);
        orch.on_stack_changed(&arena, &mut stack);

        let b = dest(&mut arena);
        stack.replace("b", b);
        assert_eq!(
            orch.on_stack_changed(&arena, &mut stack),
            TransitionKind::Replace
        );
        let tr = orch.active().unwrap();
        assert_eq!(tr.enter_offset_x(), 0.0);
        assert_eq!(tr.exit_offset_x(), 0.0);
        assert!(tr.enter_alpha() < 1.0);
    }

    #[test]
    fn lifecycle_fires_exactly_once_per_flip() {
        let (mut arena, mut stack, mut orch) = setup();
        let a = dest(&mut arena);
        let b = dest(&mut arena);

        let shows = Rc::new(RefCell::new(0));
        let hides = Rc::new(RefCell::new(0));
        let (s2, h2) = (shows.clone(), hides.clone());
        orch.register(
            a,
            DestinationHooks {
                on_show: Some(Rc::new(move || *s2.borrow_mut() += 1)),
                on_hidden: Some(Rc::new(move || *h2.borrow_mut() += 1)),
                on_back_pressed: None,
            },
        );

        stack.push("a", a);
        orch.on_stack_changed(&arena, &mut stack);
        assert_eq!((*shows.borrow(), *hides.borrow()), (1, 0));

        // Re-running orchestration without a stack change must not re-fire.
        orch.on_stack_changed(&arena, &mut stack);
        assert_eq!((*shows.borrow(), *hides.borrow()), (1, 0));

        stack.push("b", b);
        orch.on_stack_changed(&arena, &mut stack);
        assert_eq!((*shows.borrow(), *hides.borrow()), (1, 1));
        assert!(!orch.is_visible(a));
        assert!(orch.is_visible(b));

        stack.pop();
        orch.on_stack_changed(&arena, &mut stack);
        assert_eq!((*shows.borrow(), *hides.borrow()), (2, 1));
        assert!(orch.is_visible(a));
    }

    #[test]
    fn back_press_suppression() {
        let (mut arena, mut stack, mut orch) = setup();
        let a = dest(&mut arena);
        let b = dest(&mut arena);
        stack.push("a", a);
        stack.push("b", b);
        orch.on_stack_changed(&arena, &mut stack);

        orch.register(
            b,
            DestinationHooks {
                on_back_pressed: Some(Rc::new(|| true)),
                ..Default::default()
            },
        );
        assert!(orch.handle_back(&arena, &mut stack));
        assert_eq!(stack.len(), 2); // pop suppressed

        orch.register(
            b,
            DestinationHooks {
                on_back_pressed: Some(Rc::new(|| false)),
                ..Default::default()
            },
        );
        assert!(orch.handle_back(&arena, &mut stack));
        assert_eq!(stack.len(), 1);

        // Single remaining entry: no back target.
        assert!(!orch.handle_back(&arena, &mut stack));
    }

    #[test]
    fn missing_node_aborts_animation_not_lifecycle() {
        let (mut arena, mut stack, mut orch) = setup();
        let a = dest(&mut arena);
        stack.push("a", a);
        orch.on_stack_changed(&arena, &mut stack);

        let ghost = dest(&mut arena);
        arena.remove(ghost);
        stack.push("ghost", ghost);
        assert_eq!(orch.on_stack_changed(&arena, &mut stack), TransitionKind::Push);
        assert!(orch.active().is_none());
    }

    #[test]
    fn transition_runs_to_completion() {
        let t0 = Instant::now();
        set_clock(Box::new(TestClock { t: t0 }));

        let (mut arena, mut stack, mut orch) = setup();
        let a = dest(&mut arena);
        stack.push("a", a);
        orch.on_stack_changed(&arena, &mut stack);
        let start_offset = orch.active().unwrap().enter_offset_x();
        assert!(start_offset > 0.0);

        set_clock(Box::new(TestClock {
            t: t0 + Duration::from_millis(500),
        }));
        assert!(!orch.update());
        assert!(orch.active().is_none());
    }
}
