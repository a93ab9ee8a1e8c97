#![forbid(unsafe_code)]

//! Damped harmonic oscillator (spring) used to settle a pager onto a page.
//!
//! The classical damped spring equation with an explicit mass term:
//!
//!   m·a = -stiffness × (position - target) - damping × velocity
//!
//! # Parameters
//!
//! - **stiffness** (k): restoring force strength. Higher = faster response.
//! - **damping** (c): velocity drag. Critical damping is `2·√(k·m)`.
//!   - Underdamped (c < 2√(km)): oscillates past target before settling
//!   - Critically damped: fastest convergence without overshoot
//!   - Overdamped: slow convergence, no overshoot
//! - **mass** (m): inertia. Lower mass reacts faster to the same force.
//! - **rest thresholds**: displacement (pixels) and speed (pixels/second)
//!   below which the spring snaps to the target and stops.
//!
//! # Integration
//!
//! Semi-implicit Euler. `advance()` subdivides large `dt` into 4 ms steps so
//! a dropped frame cannot blow the integration up.
//!
//! # Invariants
//!
//! 1. A spring at rest reports `position() == target()` exactly.
//! 2. A spring at rest does not move until `set_target()` is called.
//! 3. Stiffness and mass are always positive; damping is never negative.
//! 4. With `overshoot_clamping`, the position never crosses the target.

use std::time::Duration;

/// Maximum dt per integration step (4ms).
const MAX_STEP_SECS: f64 = 0.004;

/// Minimum stiffness to prevent degenerate springs.
const MIN_STIFFNESS: f64 = 0.1;

/// Minimum mass to keep the acceleration term finite.
const MIN_MASS: f64 = 0.001;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Physical tuning for a [`Spring`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpringConfig {
    /// Velocity drag coefficient.
    pub damping: f64,
    /// Inertia of the animated value.
    pub mass: f64,
    /// Restoring force strength.
    pub stiffness: f64,
    /// Stop at the target instead of oscillating through it.
    pub overshoot_clamping: bool,
    /// Distance from the target (pixels) considered at rest.
    pub rest_displacement_threshold: f64,
    /// Speed (pixels/second) considered at rest.
    pub rest_speed_threshold: f64,
}

impl SpringConfig {
    /// Default pager settle: damping 20, mass 0.2, stiffness 100.
    ///
    /// Overdamped, so a settle never visibly bounces past the page edge.
    #[must_use]
    pub const fn pager_default() -> Self {
        Self {
            damping: 20.0,
            mass: 0.2,
            stiffness: 100.0,
            overshoot_clamping: false,
            rest_displacement_threshold: 0.2,
            rest_speed_threshold: 0.2,
        }
    }

    /// Gentle spring: low stiffness, high damping. Smooth and slow.
    #[must_use]
    pub const fn gentle() -> Self {
        Self {
            damping: 20.0,
            mass: 1.0,
            stiffness: 120.0,
            ..Self::pager_default()
        }
    }

    /// Stiff spring: high stiffness, near-critical damping. Snappy response.
    #[must_use]
    pub const fn stiff() -> Self {
        Self {
            damping: 38.0,
            mass: 1.0,
            stiffness: 400.0,
            ..Self::pager_default()
        }
    }

    /// Critically damped spring for the given stiffness and unit mass.
    #[must_use]
    pub fn critical(stiffness: f64) -> Self {
        let stiffness = stiffness.max(MIN_STIFFNESS);
        Self {
            damping: 2.0 * stiffness.sqrt(),
            mass: 1.0,
            stiffness,
            ..Self::pager_default()
        }
    }

    /// Damping coefficient at which this spring is critically damped.
    #[must_use]
    pub fn critical_damping(&self) -> f64 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    /// Apply caller overrides on top of this configuration.
    #[must_use]
    pub fn merged(self, overrides: &SpringOverrides) -> Self {
        Self {
            damping: overrides.damping.unwrap_or(self.damping),
            mass: overrides.mass.unwrap_or(self.mass),
            stiffness: overrides.stiffness.unwrap_or(self.stiffness),
            overshoot_clamping: overrides
                .overshoot_clamping
                .unwrap_or(self.overshoot_clamping),
            rest_displacement_threshold: overrides
                .rest_displacement_threshold
                .unwrap_or(self.rest_displacement_threshold),
            rest_speed_threshold: overrides
                .rest_speed_threshold
                .unwrap_or(self.rest_speed_threshold),
        }
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::pager_default()
    }
}

/// Partial [`SpringConfig`]: every `Some` field replaces the default.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpringOverrides {
    pub damping: Option<f64>,
    pub mass: Option<f64>,
    pub stiffness: Option<f64>,
    pub overshoot_clamping: Option<bool>,
    pub rest_displacement_threshold: Option<f64>,
    pub rest_speed_threshold: Option<f64>,
}

impl SpringOverrides {
    /// No overrides.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            damping: None,
            mass: None,
            stiffness: None,
            overshoot_clamping: None,
            rest_displacement_threshold: None,
            rest_speed_threshold: None,
        }
    }

    /// Override damping (builder pattern).
    #[must_use]
    pub fn damping(mut self, damping: f64) -> Self {
        self.damping = Some(damping);
        self
    }

    /// Override mass (builder pattern).
    #[must_use]
    pub fn mass(mut self, mass: f64) -> Self {
        self.mass = Some(mass);
        self
    }

    /// Override stiffness (builder pattern).
    #[must_use]
    pub fn stiffness(mut self, stiffness: f64) -> Self {
        self.stiffness = Some(stiffness);
        self
    }

    /// Override overshoot clamping (builder pattern).
    #[must_use]
    pub fn overshoot_clamping(mut self, clamp: bool) -> Self {
        self.overshoot_clamping = Some(clamp);
        self
    }
}

// ---------------------------------------------------------------------------
// Spring
// ---------------------------------------------------------------------------

/// A damped harmonic oscillator producing physically-based motion.
///
/// ```
/// use std::time::Duration;
/// use infipage_core::animation::spring::{Spring, SpringConfig};
///
/// let mut spring = Spring::new(0.0, -300.0).with_config(SpringConfig::pager_default());
/// for _ in 0..600 {
///     spring.advance(Duration::from_millis(16));
/// }
/// assert!(spring.is_at_rest());
/// assert_eq!(spring.position(), -300.0);
/// ```
#[derive(Debug, Clone)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    stiffness: f64,
    damping: f64,
    mass: f64,
    overshoot_clamping: bool,
    rest_threshold: f64,
    velocity_threshold: f64,
    at_rest: bool,
}

impl Spring {
    /// Create a spring starting at `initial` and targeting `target`, tuned
    /// with [`SpringConfig::pager_default`].
    #[must_use]
    pub fn new(initial: f64, target: f64) -> Self {
        let config = SpringConfig::pager_default();
        Self {
            position: initial,
            velocity: 0.0,
            target,
            stiffness: config.stiffness,
            damping: config.damping,
            mass: config.mass,
            overshoot_clamping: config.overshoot_clamping,
            rest_threshold: config.rest_displacement_threshold,
            velocity_threshold: config.rest_speed_threshold,
            at_rest: false,
        }
    }

    /// Apply a full physical configuration (builder pattern).
    #[must_use]
    pub fn with_config(mut self, config: SpringConfig) -> Self {
        self.stiffness = config.stiffness.max(MIN_STIFFNESS);
        self.damping = config.damping.max(0.0);
        self.mass = config.mass.max(MIN_MASS);
        self.overshoot_clamping = config.overshoot_clamping;
        self.rest_threshold = config.rest_displacement_threshold.abs();
        self.velocity_threshold = config.rest_speed_threshold.abs();
        self
    }

    /// Start with an initial velocity in units/second (builder pattern).
    #[must_use]
    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = velocity;
        self
    }

    /// Current position (unclamped).
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

    /// Mass parameter.
    #[inline]
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Change the target. Wakes the spring unless the new target is within
    /// the rest threshold of the old one.
    pub fn set_target(&mut self, target: f64) {
        if (self.target - target).abs() > self.rest_threshold {
            self.target = target;
            self.at_rest = false;
        } else if self.at_rest {
            self.target = target;
            self.position = target;
        } else {
            self.target = target;
        }
    }

    /// Multiply position, target and velocity by `ratio`.
    ///
    /// Used when the page size changes mid-settle so the spring keeps
    /// heading to the same logical page.
    pub fn rescale(&mut self, ratio: f64) {
        if !ratio.is_finite() {
            return;
        }
        self.position *= ratio;
        self.target *= ratio;
        self.velocity *= ratio;
    }

    /// Whether the spring has settled at the target.
    #[inline]
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    /// Damping coefficient at which this spring is critically damped.
    #[must_use]
    pub fn critical_damping(&self) -> f64 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    fn step(&mut self, dt: f64) {
        let displacement = self.position - self.target;
        let spring_force = -self.stiffness * displacement;
        let damping_force = -self.damping * self.velocity;
        let acceleration = (spring_force + damping_force) / self.mass;

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
            let before = self.position - self.target;
            self.step(step_dt);
            remaining -= step_dt;

            let after = self.position - self.target;
            if self.overshoot_clamping && before != 0.0 && before.signum() != after.signum() {
                self.settle();
                return;
            }
        }

        let pos_delta = (self.position - self.target).abs();
        let vel_abs = self.velocity.abs();
        if pos_delta < self.rest_threshold && vel_abs < self.velocity_threshold {
            self.settle();
        }
    }

    fn settle(&mut self) {
        self.position = self.target;
        self.velocity = 0.0;
        self.at_rest = true;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MS_16: Duration = Duration::from_millis(16);

    fn simulate(spring: &mut Spring, frames: usize) {
        for _ in 0..frames {
            spring.advance(MS_16);
        }
    }

    #[test]
    fn pager_default_reaches_target_exactly() {
        let mut spring = Spring::new(-50.0, -300.0);
        simulate(&mut spring, 600);

        assert!(spring.is_at_rest());
        assert_eq!(spring.position(), -300.0);
        assert_eq!(spring.velocity(), 0.0);
    }

    #[test]
    fn pager_default_is_overdamped() {
        let config = SpringConfig::pager_default();
        assert!(config.damping > config.critical_damping());

        let mut spring = Spring::new(0.0, 100.0).with_config(config);
        for _ in 0..600 {
            spring.advance(MS_16);
            assert!(spring.position() <= 100.0 + 1e-9, "overshot: {}", spring.position());
        }
    }

    #[test]
    fn merge_only_replaces_overridden_fields() {
        let merged =
            SpringConfig::pager_default().merged(&SpringOverrides::none().stiffness(250.0));
        assert_eq!(merged.stiffness, 250.0);
        assert_eq!(merged.damping, 20.0);
        assert_eq!(merged.mass, 0.2);
        assert!(!merged.overshoot_clamping);
    }

    #[test]
    fn overshoot_clamping_stops_at_target() {
        let config = SpringConfig {
            damping: 2.0,
            mass: 1.0,
            stiffness: 300.0,
            overshoot_clamping: true,
            ..SpringConfig::pager_default()
        };
        let mut spring = Spring::new(0.0, 1.0).with_config(config);
        for _ in 0..200 {
            spring.advance(MS_16);
            assert!(spring.position() <= 1.0);
        }
        assert!(spring.is_at_rest());
        assert_eq!(spring.position(), 1.0);
    }

    #[test]
    fn underdamped_spring_overshoots() {
        let config = SpringConfig {
            damping: 4.0,
            mass: 1.0,
            stiffness: 300.0,
            ..SpringConfig::pager_default()
        };
        let mut spring = Spring::new(0.0, 1.0).with_config(config);

        let mut max_pos = 0.0_f64;
        for _ in 0..200 {
            spring.advance(MS_16);
            max_pos = max_pos.max(spring.position());
        }
        assert!(max_pos > 1.0, "max was {max_pos}");
    }

    #[test]
    fn set_target_wakes_spring() {
        let mut spring = Spring::new(0.0, 100.0);
        simulate(&mut spring, 600);
        assert!(spring.is_at_rest());

        spring.set_target(400.0);
        assert!(!spring.is_at_rest());
    }

    #[test]
    fn set_target_within_threshold_snaps_at_rest() {
        let mut spring = Spring::new(0.0, 100.0);
        simulate(&mut spring, 600);

        spring.set_target(100.1);
        assert!(spring.is_at_rest());
        assert_eq!(spring.position(), 100.1);
    }

    #[test]
    fn rescale_keeps_relative_progress() {
        let mut spring = Spring::new(0.0, -300.0);
        simulate(&mut spring, 5);
        let progress = spring.position() / spring.target();

        spring.rescale(2.0);
        assert_eq!(spring.target(), -600.0);
        assert!((spring.position() / spring.target() - progress).abs() < 1e-12);
    }

    #[test]
    fn large_dt_subdivided() {
        let mut spring = Spring::new(0.0, 1.0).with_config(SpringConfig::stiff());
        spring.advance(Duration::from_secs(5));
        assert!((spring.position() - 1.0).abs() < 0.01);
    }

    #[test]
    fn zero_dt_noop() {
        let mut spring = Spring::new(0.0, 1.0);
        spring.advance(Duration::ZERO);
        assert_eq!(spring.position(), 0.0);
    }

    #[test]
    fn degenerate_config_is_clamped() {
        let config = SpringConfig {
            damping: -5.0,
            mass: 0.0,
            stiffness: -100.0,
            ..SpringConfig::pager_default()
        };
        let spring = Spring::new(0.0, 1.0).with_config(config);
        assert!(spring.stiffness() >= MIN_STIFFNESS);
        assert!(spring.mass() >= MIN_MASS);
        assert!(spring.damping() >= 0.0);
    }

    #[test]
    fn critical_preset_is_critically_damped() {
        let config = SpringConfig::critical(100.0);
        assert!((config.damping - config.critical_damping()).abs() < 1e-12);
    }

    #[test]
    fn deterministic_across_runs() {
        let run = || {
            let mut spring = Spring::new(0.0, 300.0).with_velocity(1200.0);
            let mut positions = Vec::new();
            for _ in 0..50 {
                spring.advance(MS_16);
                positions.push(spring.position());
            }
            positions
        };
        assert_eq!(run(), run());
    }
}
