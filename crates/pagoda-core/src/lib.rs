//! # Pagoda core
//!
//! The retained pieces every other Pagoda crate builds on:
//!
//! - [`tree`] — slotmap node arena with typed [`tree::NodeId`] handles, the
//!   per-node geometry cache, and frame-published paint state.
//! - [`animation`] — installable clock, easing curves, tweens, and the spring
//!   integrator. Everything advances via `update()` from the frame loop, so
//!   tests drive time with [`animation::TestClock`].
//! - [`theme`] — resolved metric/config values passed explicitly into layout
//!   calls; there is no ambient theme lookup.
//! - [`geometry`] — plain value types plus [`geometry::Length`] for
//!   absolute-or-percent constraints.
//! - [`error`] — the non-fatal failure taxonomy.

pub mod animation;
pub mod error;
pub mod geometry;
pub mod theme;
pub mod tree;

mod tests;

pub use animation::{AnimatedValue, AnimationSpec, Easing, SpringMotion, TestClock, set_clock};
pub use error::LayoutError;
pub use geometry::{Constraint, Length, Rect, Size, Vec2};
pub use theme::{Compatibility, DeviceEnv, DeviceType, Orientation, Theme};
pub use tree::{
    Arena, BarItem, Geometry, IconId, ItemStatus, Node, NodeFlags, NodeId, NodeKind, PaintState,
};
