#![forbid(unsafe_code)]

//! Translation store and page projection.
//!
//! [`Translation`] is the single source of truth for a pager's visual
//! offset, in pixels. It is either set directly (drag tracking, jumps) or
//! driven by a [`Spring`] toward a page's rest position.
//!
//! [`PageProjector`] turns that offset into a continuous page position,
//! `-translation / page_size`, and derives each slot's focus from it.
//!
//! # Invariants
//!
//! 1. The projection is never NaN or infinite; with no usable page size it
//!    holds its previous value.
//! 2. Before the first usable layout, focus falls back to the slot's offset
//!    from the committed page, so nothing jumps once layout resolves.
//!
//! [`SharedPagePosition`] mirrors the projection into an atomic cell that
//! other threads can read without touching the pager.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::animation::spring::{Spring, SpringConfig};

/// Pixel offset of a pager, optionally animated by a spring.
#[derive(Debug, Clone, Default)]
pub struct Translation {
    value: f64,
    spring: Option<Spring>,
}

impl Translation {
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            value,
            spring: None,
        }
    }

    /// Current offset in pixels.
    #[inline]
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Set the offset directly, cancelling any running spring.
    pub fn set(&mut self, value: f64) {
        self.spring = None;
        self.value = value;
    }

    /// Spring toward `target`.
    ///
    /// A spring already in flight is retargeted and keeps its velocity.
    pub fn animate_to(&mut self, target: f64, config: SpringConfig) {
        match self.spring.as_mut() {
            Some(spring) => spring.set_target(target),
            None => {
                self.spring = Some(Spring::new(self.value, target).with_config(config));
            }
        }
    }

    /// Like [`animate_to`](Self::animate_to), but a newly created spring
    /// starts with `velocity` (pixels/second), as on gesture release.
    pub fn release_to(&mut self, target: f64, velocity: f64, config: SpringConfig) {
        match self.spring.as_mut() {
            Some(spring) => spring.set_target(target),
            None => {
                let velocity = if velocity.is_finite() { velocity } else { 0.0 };
                self.spring = Some(
                    Spring::new(self.value, target)
                        .with_config(config)
                        .with_velocity(velocity),
                );
            }
        }
    }

    /// Stop the spring where it is, keeping the current animated value.
    pub fn interrupt(&mut self) {
        self.spring = None;
    }

    /// Whether a spring is driving the offset.
    #[inline]
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.spring.is_some()
    }

    /// Target of the running spring, if any.
    #[must_use]
    pub fn spring_target(&self) -> Option<f64> {
        self.spring.as_ref().map(Spring::target)
    }

    /// Advance the spring by `dt`. Returns `true` if the spring came to rest
    /// during this call.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let Some(spring) = self.spring.as_mut() else {
            return false;
        };
        spring.advance(dt);
        self.value = spring.position();
        if spring.is_at_rest() {
            self.spring = None;
            return true;
        }
        false
    }

    /// Scale the offset (and any running spring) by `ratio`.
    pub fn rescale(&mut self, ratio: f64) {
        if !ratio.is_finite() {
            return;
        }
        self.value *= ratio;
        if let Some(spring) = self.spring.as_mut() {
            spring.rescale(ratio);
        }
    }
}

/// Rest offset of `index` for a given page size.
#[inline]
#[must_use]
pub fn rest_translation(index: i64, page_size: f64) -> f64 {
    -(index as f64) * page_size
}

/// Round a fractional page to an integer page, halves rounding up.
///
/// Halves rounding the same way on both sides of zero keeps commit edges
/// symmetric for drags in either direction.
#[inline]
#[must_use]
pub fn nearest_page(page: f64) -> i64 {
    (page + 0.5).floor() as i64
}

/// Continuous page position derived from a translation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PageProjector {
    projection: Option<f64>,
}

impl PageProjector {
    #[must_use]
    pub fn new() -> Self {
        Self { projection: None }
    }

    /// Recompute from `translation`; holds the previous value when
    /// `page_size` is not usable.
    pub fn update(&mut self, translation: f64, page_size: f64) -> Option<f64> {
        if page_size > 0.0 {
            let page = -translation / page_size;
            if page.is_finite() {
                self.projection = Some(page);
            }
        }
        self.projection
    }

    /// Last known page position, `None` before the first usable layout.
    #[inline]
    #[must_use]
    pub fn projection(&self) -> Option<f64> {
        self.projection
    }

    /// Page position, falling back to the committed page before layout.
    #[inline]
    #[must_use]
    pub fn page_or(&self, committed: i64) -> f64 {
        self.projection.unwrap_or(committed as f64)
    }

    /// Signed distance in pages from slot `index` to the current position.
    #[inline]
    #[must_use]
    pub fn focus(&self, index: i64, committed: i64) -> f64 {
        match self.projection {
            Some(page) => index as f64 - page,
            None => index.saturating_sub(committed) as f64,
        }
    }
}

/// Lock-free cell holding the latest continuous page position.
///
/// Clones share the same cell.
#[derive(Debug, Clone)]
pub struct SharedPagePosition {
    bits: Arc<AtomicU64>,
}

impl SharedPagePosition {
    #[must_use]
    pub fn new(page: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(page.to_bits())),
        }
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, page: f64) {
        self.bits.store(page.to_bits(), Ordering::Release);
    }
}

impl Default for SharedPagePosition {
    fn default() -> Self {
        Self::new(0.0)
    }
}
