//! # Pagoda navigation
//!
//! Stack-based page navigation: an ordered back stack of named destinations,
//! presentation-mode resolution (single-pane stack vs dual-pane split), and
//! the orchestration that turns stack mutations into enter/exit animations
//! and lifecycle callbacks.
//!
//! ```rust
//! use pagoda_core::tree::{Arena, NodeKind};
//! use pagoda_core::theme::Theme;
//! use pagoda_navigation::{NavPathStack, ModeController, Orchestrator};
//!
//! let mut arena = Arena::new();
//! let mut stack = NavPathStack::new();
//! let mut orch = Orchestrator::new();
//!
//! let detail = arena.alloc(NodeKind::Destination);
//! stack.push("detail", detail);
//! orch.on_stack_changed(&arena, &mut stack);
//!
//! let theme = Theme::default();
//! let mut modes = ModeController::new(&theme);
//! modes.resolve(900.0, &theme);
//! ```
//!
//! Layout itself lives in `pagoda-ui`; this crate owns *what* is shown and
//! *how it arrives*, never where pixels go.

pub mod mode;
pub mod stack;
pub mod transition;

pub use mode::{
    ModeController, ModeTransition, NavigationMode, PaneWidths, WidthConstraints,
};
pub use stack::{NavPathEntry, NavPathStack, RouteInfo};
pub use transition::{DestinationHooks, Orchestrator, PageTransition, TransitionKind};
