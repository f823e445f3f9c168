//! # Animation clock, easing, tweens, and springs
//!
//! All animated state in Pagoda is advanced by calling `update()` from the
//! frame loop; nothing blocks. Time comes from an installable [`Clock`] so
//! tests can drive frames deterministically with [`TestClock`]:
//!
//! ```rust
//! use pagoda_core::animation::*;
//! use std::time::{Duration, Instant};
//!
//! let t0 = Instant::now();
//! set_clock(Box::new(TestClock { t: t0 }));
//!
//! let mut a = AnimatedValue::new(0.0f32, AnimationSpec::tween(Duration::from_millis(100), Easing::Linear));
//! a.set_target(10.0);
//! set_clock(Box::new(TestClock { t: t0 + Duration::from_millis(50) }));
//! a.update();
//! assert!((*a.get() - 5.0).abs() < 0.01);
//! ```

use parking_lot::RwLock;
use std::time::{Duration, Instant};

pub(crate) fn now() -> Instant {
    let guard = CLOCK.read();
    match guard.as_ref() {
        Some(c) => c.now(),
        None => Instant::now(),
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Standard deceleration curve, cubic-bezier(0.4, 0.0, 0.2, 1.0).
    FastOutSlowIn,
    /// Steep middle section, cubic-bezier(0.33, 0.0, 0.67, 1.0). Used for the
    /// title font-size/opacity mapping so most of the change happens around
    /// the midpoint of a collapse.
    Sharp,
}

impl Easing {
    pub fn interpolate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::FastOutSlowIn => cubic_bezier(0.4, 0.0, 0.2, 1.0, t),
            Easing::Sharp => cubic_bezier(0.33, 0.0, 0.67, 1.0, t),
        }
    }
}

/// Solve y for x on a cubic bezier with endpoints (0,0) and (1,1).
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, x: f32) -> f32 {
    fn sample(a: f32, b: f32, t: f32) -> f32 {
        // Coefficients of the 1D cubic through 0, a, b, 1.
        let c3 = 1.0 + 3.0 * (a - b);
        let c2 = 3.0 * (b - 2.0 * a);
        let c1 = 3.0 * a;
        ((c3 * t + c2) * t + c1) * t
    }
    // Newton iterations on the x polynomial, bisection fallback.
    let mut t = x;
    for _ in 0..8 {
        let err = sample(x1, x2, t) - x;
        if err.abs() < 1e-5 {
            return sample(y1, y2, t);
        }
        let d = {
            let c3 = 1.0 + 3.0 * (x1 - x2);
            let c2 = 3.0 * (x2 - 2.0 * x1);
            let c1 = 3.0 * x1;
            (3.0 * c3 * t + 2.0 * c2) * t + c1
        };
        if d.abs() < 1e-6 {
            break;
        }
        t -= err / d;
        t = t.clamp(0.0, 1.0);
    }
    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    for _ in 0..24 {
        t = 0.5 * (lo + hi);
        if sample(x1, x2, t) < x {
            lo = t;
        } else {
            hi = t;
        }
    }
    sample(y1, y2, t)
}

#[derive(Clone, Copy, Debug)]
pub struct AnimationSpec {
    pub duration: Duration,
    pub easing: Easing,
    pub delay: Duration,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(300),
            easing: Easing::EaseInOut,
            delay: Duration::ZERO,
        }
    }
}

impl AnimationSpec {
    pub fn tween(duration: Duration, easing: Easing) -> Self {
        Self {
            duration,
            easing,
            delay: Duration::ZERO,
        }
    }

    /// The title-bar snap after a drag ends: 200ms deceleration.
    pub fn title_snap() -> Self {
        Self::tween(Duration::from_millis(200), Easing::FastOutSlowIn)
    }

    pub fn fast() -> Self {
        Self::tween(Duration::from_millis(150), Easing::EaseOut)
    }
}

pub trait Interpolate {
    fn interpolate(&self, other: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

// Animation clock
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

pub struct SystemClock;
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

static CLOCK: RwLock<Option<Box<dyn Clock>>> = RwLock::new(None);

/// Install the animation clock. Platform installs SystemClock; tests install
/// TestClock repeatedly to advance time.
pub fn set_clock(clock: Box<dyn Clock>) {
    *CLOCK.write() = Some(clock);
}

/// A test clock you can drive deterministically.
#[derive(Clone)]
pub struct TestClock {
    pub t: Instant,
}
impl Clock for TestClock {
    fn now(&self) -> Instant {
        self.t
    }
}

/// Animated value that transitions smoothly toward a target.
pub struct AnimatedValue<T: Interpolate + Clone> {
    current: T,
    target: T,
    start: T,
    spec: AnimationSpec,
    start_time: Option<Instant>,
}

impl<T: Interpolate + Clone> AnimatedValue<T> {
    pub fn new(initial: T, spec: AnimationSpec) -> Self {
        Self {
            current: initial.clone(),
            target: initial.clone(),
            start: initial,
            spec,
            start_time: None,
        }
    }

    pub fn set_target(&mut self, target: T) {
        if self.start_time.is_none() {
            self.start = self.current.clone();
        }
        self.target = target;
        self.start_time = Some(now());
    }

    /// Jump to a value immediately, cancelling any in-flight transition.
    pub fn snap_to(&mut self, value: T) {
        self.current = value.clone();
        self.target = value.clone();
        self.start = value;
        self.start_time = None;
    }

    /// Cancel without moving; the value stays wherever the last update left it.
    pub fn stop(&mut self) {
        self.target = self.current.clone();
        self.start_time = None;
    }

    pub fn update(&mut self) -> bool {
        if let Some(start) = self.start_time {
            let elapsed = now().saturating_duration_since(start);

            if elapsed < self.spec.delay {
                return true;
            }

            let animation_time = elapsed - self.spec.delay;

            if animation_time >= self.spec.duration {
                self.current = self.target.clone();
                self.start_time = None;
                return false;
            }

            let t = animation_time.as_secs_f32() / self.spec.duration.as_secs_f32();
            let eased_t = self.spec.easing.interpolate(t);
            self.current = self.start.interpolate(&self.target, eased_t);

            true
        } else {
            false
        }
    }

    pub fn get(&self) -> &T {
        &self.current
    }

    pub fn is_animating(&self) -> bool {
        self.start_time.is_some()
    }
}

/// Damped spring integrator for a single f32, driven by the installed clock.
///
/// Integration uses fixed sub-steps so large frame gaps stay stable.
pub struct SpringMotion {
    position: f32,
    velocity: f32,
    target: f32,
    mass: f32,
    stiffness: f32,
    damping: f32,
    last: Option<Instant>,
}

const SPRING_SUBSTEP: f32 = 1.0 / 240.0;
const SPRING_REST_DELTA: f32 = 0.05;
const SPRING_REST_SPEED: f32 = 0.5;

impl SpringMotion {
    pub fn new(mass: f32, stiffness: f32, damping: f32) -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
            target: 0.0,
            mass: mass.max(1e-3),
            stiffness,
            damping,
            last: None,
        }
    }

    pub fn start(&mut self, from: f32, target: f32, velocity: f32) {
        self.position = from;
        self.target = target;
        self.velocity = velocity;
        self.last = Some(now());
    }

    pub fn stop(&mut self) {
        self.last = None;
        self.velocity = 0.0;
    }

    pub fn value(&self) -> f32 {
        self.position
    }

    pub fn is_animating(&self) -> bool {
        self.last.is_some()
    }

    /// Advance to the current clock time; returns true while still moving.
    pub fn update(&mut self) -> bool {
        let Some(last) = self.last else {
            return false;
        };
        let t = now();
        let mut dt = t.saturating_duration_since(last).as_secs_f32().min(0.25);
        self.last = Some(t);

        while dt > 0.0 {
            let step = dt.min(SPRING_SUBSTEP);
            let displacement = self.position - self.target;
            let accel =
                (-self.stiffness * displacement - self.damping * self.velocity) / self.mass;
            self.velocity += accel * step;
            self.position += self.velocity * step;
            dt -= step;
        }

        if (self.position - self.target).abs() < SPRING_REST_DELTA
            && self.velocity.abs() < SPRING_REST_SPEED
        {
            self.position = self.target;
            self.velocity = 0.0;
            self.last = None;
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bezier_endpoints() {
        for e in [Easing::FastOutSlowIn, Easing::Sharp] {
            assert!(e.interpolate(0.0).abs() < 1e-3);
            assert!((e.interpolate(1.0) - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn fast_out_slow_in_decelerates() {
        let e = Easing::FastOutSlowIn;
        // Front-loaded: more than half the motion happens in the first half.
        assert!(e.interpolate(0.5) > 0.5);
        let mut prev = 0.0;
        for i in 1..=10 {
            let v = e.interpolate(i as f32 / 10.0);
            assert!(v >= prev - 1e-4);
            prev = v;
        }
    }

    #[test]
    fn spring_settles_on_target() {
        let t0 = Instant::now();
        set_clock(Box::new(TestClock { t: t0 }));
        let mut s = SpringMotion::new(1.0, 228.0, 30.0);
        s.start(40.0, 0.0, 0.0);

        let mut t = t0;
        let mut frames = 0;
        loop {
            t += Duration::from_millis(16);
            set_clock(Box::new(TestClock { t }));
            frames += 1;
            if !s.update() || frames > 500 {
                break;
            }
        }
        assert!(frames < 500, "spring never settled");
        assert_eq!(s.value(), 0.0);
    }
}
