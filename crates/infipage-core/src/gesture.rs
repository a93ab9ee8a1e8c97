#![forbid(unsafe_code)]

//! Touch protocol types and the per-gesture state of one pager.
//!
//! The capture primitive delivers five callbacks per gesture:
//!
//! ```text
//! begin(x, y) ─▶ touches_move(touches, control)* ─▶ update(translation, velocity)*
//!            ─▶ end(velocity, translation) ─▶ finalize()
//! ```
//!
//! [`GestureTracker`] remembers what a gesture needs between callbacks (where
//! it started, whether it failed, which arbitration generation it belongs to).
//! The numeric policies (orthogonal rejection, boundary resistance and the
//! fling decision) are free functions so they can be tested in isolation.
//!
//! # Phases
//!
//! ```text
//! Idle ──begin──▶ Tracking ──end──▶ Settling ──spring at rest──▶ Idle
//!                     └──────end (nothing to animate)──────────▶ Idle
//! ```

use std::time::Duration;

use web_time::Instant;

use crate::config::PageBounds;
use crate::geometry::Orientation;
use crate::projector::nearest_page;

/// Cross-axis travel (pixels) below which a swipe is never treated as
/// orthogonal.
pub const ORTHOGONAL_DEAD_ZONE: f64 = 10.0;

/// One touch as reported by the capture primitive, in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TouchPoint {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    #[must_use]
    pub const fn new(id: u64, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }
}

/// Handle the capture primitive passes to `touches_move` so a pager can give
/// up the gesture to a competing recognizer.
pub trait TouchControl {
    fn fail(&mut self);
}

/// Minimal [`TouchControl`] that only records whether `fail` was called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailFlag {
    failed: bool,
}

impl FailFlag {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.failed
    }
}

impl TouchControl for FailFlag {
    fn fail(&mut self) {
        self.failed = true;
    }
}

/// Continuous update: cumulative translation since begin plus instantaneous
/// velocity, both per axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GestureUpdate {
    pub translation_x: f64,
    pub translation_y: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
}

/// Release: final velocity and cumulative translation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GestureEnd {
    pub velocity_x: f64,
    pub velocity_y: f64,
    pub translation_x: f64,
    pub translation_y: f64,
}

/// Where a pager is in its gesture lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GesturePhase {
    #[default]
    Idle,
    Tracking,
    Settling,
}

/// State carried from `begin` to `finalize`.
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    phase: GesturePhase,
    start_translation: f64,
    initial_x: f64,
    initial_y: f64,
    failed: bool,
    armed: bool,
    generation: u64,
    started_at: Option<Instant>,
}

impl GestureTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking from `translation` at touch `(x, y)`.
    pub fn begin(&mut self, translation: f64, x: f64, y: f64, generation: u64) {
        self.phase = GesturePhase::Tracking;
        self.start_translation = translation;
        self.initial_x = x;
        self.initial_y = y;
        self.failed = false;
        self.armed = false;
        self.generation = generation;
        self.started_at = Some(Instant::now());
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    #[inline]
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.phase == GesturePhase::Tracking
    }

    /// Tracking and not failed: updates may move the pager.
    #[inline]
    #[must_use]
    pub fn accepts_updates(&self) -> bool {
        self.is_tracking() && !self.failed
    }

    #[must_use]
    pub fn start_translation(&self) -> f64 {
        self.start_translation
    }

    /// Move the drag origin, as a layout change or first layout does.
    pub fn set_start_translation(&mut self, translation: f64) {
        self.start_translation = translation;
    }

    /// Arbitration generation the gesture last joined.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Follow the registry into a new generation.
    pub fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    /// The pager holds an active touch for this gesture.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed && !self.failed
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Mark the gesture as handed off; later updates are ignored.
    pub fn fail(&mut self) {
        self.failed = true;
        self.armed = false;
    }

    /// Primary-axis displacement of `touch` from the initial touch.
    #[must_use]
    pub fn displacement(&self, orientation: Orientation, touch: &TouchPoint) -> f64 {
        orientation.primary(touch.x - self.initial_x, touch.y - self.initial_y)
    }

    /// Leave tracking. `settling` selects the next phase.
    ///
    /// Returns how long the gesture was tracked.
    pub fn release(&mut self, settling: bool) -> Duration {
        self.phase = if settling {
            GesturePhase::Settling
        } else {
            GesturePhase::Idle
        };
        self.started_at
            .take()
            .map_or(Duration::ZERO, |started| started.elapsed())
    }

    /// The settle spring came to rest.
    pub fn settle(&mut self) {
        if self.phase == GesturePhase::Settling {
            self.phase = GesturePhase::Idle;
        }
    }

    /// Drop back to idle without releasing, keeping no gesture state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Cross-axis motion dominates a swipe that has left the dead zone.
#[must_use]
pub fn is_orthogonal(orientation: Orientation, translation_x: f64, translation_y: f64) -> bool {
    let cross = orientation.cross(translation_x, translation_y).abs();
    let primary = orientation.primary(translation_x, translation_y).abs();
    cross > ORTHOGONAL_DEAD_ZONE && cross > primary
}

/// The drag pushes further past a bound the pager already sits on.
///
/// Positive displacement moves toward lower indices.
#[must_use]
pub fn swiping_past_end(current: i64, bounds: PageBounds, displacement: f64) -> bool {
    (bounds.is_at_min(current) && displacement > 0.0)
        || (bounds.is_at_max(current) && displacement < 0.0)
}

/// Translation after boundary resistance.
///
/// Inside the bounds the raw translation passes through. Past a bound the
/// overshoot beyond that bound's rest translation is scaled by `bounce_pct`:
/// `0` pins the pager to the bound, `1` leaves the motion untouched.
#[must_use]
pub fn resist(raw: f64, page_size: f64, bounds: PageBounds, bounce_pct: f64) -> f64 {
    if page_size <= 0.0 {
        return raw;
    }
    let page = -raw / page_size;
    if bounds.contains_page(page) {
        return raw;
    }
    let bound = match (bounds.min, bounds.max) {
        (Some(min), _) if page < min as f64 => min,
        (_, Some(max)) => max,
        _ => return raw,
    };
    let rest = -(bound as f64) * page_size;
    let overshoot = raw - rest;
    raw - overshoot * (1.0 - bounce_pct)
}

/// Inputs to the release decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Release {
    pub translation: f64,
    /// Primary-axis release velocity, pixels/second.
    pub velocity: f64,
    pub page_size: f64,
    pub fling_velocity: f64,
    /// Locked or orthogonal releases never fling.
    pub may_fling: bool,
}

impl Release {
    /// A fast enough, eligible release.
    #[must_use]
    pub fn is_fling(&self) -> bool {
        self.may_fling && self.velocity.abs() > self.fling_velocity
    }

    /// Page to settle on, clamped to `bounds`.
    ///
    /// A fling shifts the translation half a page in the direction of travel
    /// before rounding, so any fling past the threshold advances one page.
    #[must_use]
    pub fn target(&self, bounds: PageBounds) -> i64 {
        let offset = if self.is_fling() {
            self.velocity.signum() * self.page_size / 2.0
        } else {
            0.0
        };
        bounds.clamp(nearest_page(-(self.translation + offset) / self.page_size))
    }
}
