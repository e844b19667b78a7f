#![forbid(unsafe_code)]

//! Damped harmonic oscillator (spring) animation.
//!
//! Drives item motion between grid slots. Based on the classical damped
//! spring equation:
//!
//!   F = -stiffness × (position - target) - damping × velocity
//!
//! # Parameters
//!
//! - **stiffness** (k): Restoring force strength. Higher = faster response.
//! - **damping** (c): Velocity drag. Higher = less oscillation.
//!   - Underdamped (c < 2√k): oscillates past target before settling
//!   - Critically damped (c ≈ 2√k): fastest convergence without overshoot
//! - **rest_threshold**: Position delta below which the spring is considered
//!   at rest. Default: 0.01 (pixels).
//!
//! # Integration
//!
//! Semi-implicit Euler, subdivided into steps of at most 4ms.
//!
//! # Invariants
//!
//! 1. A spring at rest will not resume unless `set_target()` moves it.
//! 2. Stiffness is always at least 0.1 and damping at least 0.0.
//! 3. `snap_to()` moves position and target together and leaves the spring
//!    at rest.

use std::time::Duration;

use crate::geometry::Point;

/// Maximum dt per integration step (4ms).
const MAX_STEP_SECS: f64 = 0.004;

/// Default rest threshold, in pixels.
const DEFAULT_REST_THRESHOLD: f64 = 0.01;

/// Default velocity threshold, in pixels per second.
const DEFAULT_VELOCITY_THRESHOLD: f64 = 0.1;

/// Minimum stiffness to prevent degenerate springs.
const MIN_STIFFNESS: f64 = 0.1;

/// A damped harmonic oscillator producing physically-based motion.
///
/// ```
/// use std::time::Duration;
/// use regrid_core::animation::Spring;
///
/// let mut spring = Spring::new(0.0, 100.0);
/// for _ in 0..120 {
///     spring.advance(Duration::from_millis(16));
/// }
/// assert!((spring.position() - 100.0).abs() < 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    stiffness: f64,
    damping: f64,
    rest_threshold: f64,
    velocity_threshold: f64,
    at_rest: bool,
}

impl Spring {
    /// Create a spring starting at `initial` and targeting `target`.
    ///
    /// Default parameters: stiffness = 170.0, damping = 26.0.
    #[must_use]
    pub fn new(initial: f64, target: f64) -> Self {
        Self {
            position: initial,
            velocity: 0.0,
            target,
            stiffness: 170.0,
            damping: 26.0,
            rest_threshold: DEFAULT_REST_THRESHOLD,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            at_rest: (initial - target).abs() < DEFAULT_REST_THRESHOLD,
        }
    }

    /// A spring resting at `value`.
    #[must_use]
    pub fn at(value: f64) -> Self {
        Self::new(value, value)
    }

    /// Set stiffness (builder pattern). Clamped to minimum 0.1.
    #[must_use]
    pub fn with_stiffness(mut self, k: f64) -> Self {
        self.stiffness = k.max(MIN_STIFFNESS);
        self
    }

    /// Set damping (builder pattern). Clamped to minimum 0.0.
    #[must_use]
    pub fn with_damping(mut self, c: f64) -> Self {
        self.damping = c.max(0.0);
        self
    }

    /// Set rest threshold (builder pattern).
    #[must_use]
    pub fn with_rest_threshold(mut self, threshold: f64) -> Self {
        self.rest_threshold = threshold.abs();
        self
    }

    /// Current position.
    #[inline]
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Current velocity.
    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Current target.
    #[inline]
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Stiffness parameter.
    #[inline]
    #[must_use]
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Damping parameter.
    #[inline]
    #[must_use]
    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Change the target. Wakes the spring if it was at rest.
    pub fn set_target(&mut self, target: f64) {
        if (self.target - target).abs() > self.rest_threshold
            || (self.position - target).abs() > self.rest_threshold
        {
            self.target = target;
            self.at_rest = false;
        }
    }

    /// Jump to `value` without animating.
    pub fn snap_to(&mut self, value: f64) {
        self.position = value;
        self.target = value;
        self.velocity = 0.0;
        self.at_rest = true;
    }

    /// Whether the spring has settled at the target.
    #[inline]
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    fn step(&mut self, dt: f64) {
        let displacement = self.position - self.target;
        let spring_force = -self.stiffness * displacement;
        let damping_force = -self.damping * self.velocity;
        let acceleration = spring_force + damping_force;

        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Advance the spring by `dt`, subdividing if necessary for stability.
    pub fn advance(&mut self, dt: Duration) {
        if self.at_rest {
            return;
        }

        let total_secs = dt.as_secs_f64();
        if total_secs <= 0.0 {
            return;
        }

        let mut remaining = total_secs;
        while remaining > 0.0 {
            let step_dt = remaining.min(MAX_STEP_SECS);
            self.step(step_dt);
            remaining -= step_dt;
        }

        let pos_delta = (self.position - self.target).abs();
        if pos_delta < self.rest_threshold && self.velocity.abs() < self.velocity_threshold {
            self.position = self.target;
            self.velocity = 0.0;
            self.at_rest = true;
        }
    }
}

/// Two independent springs moving a point.
#[derive(Debug, Clone)]
pub struct SpringPoint {
    x: Spring,
    y: Spring,
}

impl SpringPoint {
    /// A point spring resting at `at`, using the parameters of `template`.
    #[must_use]
    pub fn new(at: Point, template: &Spring) -> Self {
        let make = |v: f64| {
            Spring::at(v)
                .with_stiffness(template.stiffness)
                .with_damping(template.damping)
                .with_rest_threshold(template.rest_threshold)
        };
        Self {
            x: make(at.x),
            y: make(at.y),
        }
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x.position(), self.y.position())
    }

    /// Current target.
    #[must_use]
    pub fn target(&self) -> Point {
        Point::new(self.x.target(), self.y.target())
    }

    /// Animate towards `target`.
    pub fn set_target(&mut self, target: Point) {
        self.x.set_target(target.x);
        self.y.set_target(target.y);
    }

    /// Jump to `at` without animating.
    pub fn snap_to(&mut self, at: Point) {
        self.x.snap_to(at.x);
        self.y.snap_to(at.y);
    }

    /// Advance both axes.
    pub fn advance(&mut self, dt: Duration) {
        self.x.advance(dt);
        self.y.advance(dt);
    }

    /// Whether both axes have settled.
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.x.is_at_rest() && self.y.is_at_rest()
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// Common spring configurations for UI motion.
pub mod presets {
    use super::Spring;

    /// Gentle spring: low stiffness, high damping. Smooth and slow.
    #[must_use]
    pub fn gentle() -> Spring {
        Spring::at(0.0).with_stiffness(120.0).with_damping(20.0)
    }

    /// Stiff spring: high stiffness, near-critical damping. Snappy response.
    #[must_use]
    pub fn stiff() -> Spring {
        Spring::at(0.0).with_stiffness(400.0).with_damping(38.0)
    }

    /// Critically damped spring: fastest convergence without overshoot.
    #[must_use]
    pub fn critical() -> Spring {
        let k: f64 = 170.0;
        let c = 2.0 * k.sqrt();
        Spring::at(0.0).with_stiffness(k).with_damping(c)
    }
}
