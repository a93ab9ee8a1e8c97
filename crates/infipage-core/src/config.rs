#![forbid(unsafe_code)]

//! Plain-data pager configuration.
//!
//! [`PagerConfig`] carries everything about a pager that can be expressed as
//! data: axis, index bounds, buffer size, bounce, fling threshold, spring
//! overrides and the interpolation preset. Callbacks, page content and custom
//! interpolators are attached through [`crate::pager::PagerBuilder`].
//!
//! With the `serde` feature the struct (de)serializes with every field
//! optional, falling back to [`PagerConfig::default`].

use crate::animation::spring::{SpringConfig, SpringOverrides};
use crate::error::{PagerError, Result};
use crate::geometry::Orientation;
use crate::interpolator::Preset;

/// Default number of pages rendered on each side of the current page.
pub const DEFAULT_PAGE_BUFFER: usize = 1;

/// Default release speed (pixels/second) above which a gesture is a fling.
pub const DEFAULT_FLING_VELOCITY: f64 = 500.0;

/// Configuration for one pager instance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PagerConfig {
    pub orientation: Orientation,
    /// Page shown on mount; clamped into the bounds.
    pub initial_index: i64,
    /// Inclusive lower bound; `None` is unbounded.
    pub min_index: Option<i64>,
    /// Inclusive upper bound; `None` is unbounded.
    pub max_index: Option<i64>,
    /// Pages rendered on each side of the current page.
    pub page_buffer: usize,
    /// Fraction of drag motion kept past the bounds (0 = hard stop, 1 = free).
    pub bounce_pct: f64,
    /// Release speed above which the gesture flings to the next page.
    pub fling_velocity: f64,
    /// Partial spring tuning merged over [`SpringConfig::pager_default`].
    pub animation: SpringOverrides,
    /// Start with user gestures disabled.
    pub gestures_disabled: bool,
    /// Built-in interpolation policy, unless a custom one is supplied.
    pub preset: Preset,
    /// Label attached to this pager's log records.
    pub debug_tag: Option<String>,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            initial_index: 0,
            min_index: None,
            max_index: None,
            page_buffer: DEFAULT_PAGE_BUFFER,
            bounce_pct: 0.0,
            fling_velocity: DEFAULT_FLING_VELOCITY,
            animation: SpringOverrides::none(),
            gestures_disabled: false,
            preset: Preset::Slide,
            debug_tag: None,
        }
    }
}

impl PagerConfig {
    #[must_use]
    pub fn horizontal() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn vertical() -> Self {
        Self {
            orientation: Orientation::Vertical,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub fn initial_index(mut self, index: i64) -> Self {
        self.initial_index = index;
        self
    }

    #[must_use]
    pub fn min_index(mut self, min: i64) -> Self {
        self.min_index = Some(min);
        self
    }

    #[must_use]
    pub fn max_index(mut self, max: i64) -> Self {
        self.max_index = Some(max);
        self
    }

    /// Set both bounds (builder pattern).
    #[must_use]
    pub fn bounds(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min_index = min;
        self.max_index = max;
        self
    }

    #[must_use]
    pub fn page_buffer(mut self, buffer: usize) -> Self {
        self.page_buffer = buffer;
        self
    }

    #[must_use]
    pub fn bounce_pct(mut self, pct: f64) -> Self {
        self.bounce_pct = pct;
        self
    }

    #[must_use]
    pub fn fling_velocity(mut self, velocity: f64) -> Self {
        self.fling_velocity = velocity;
        self
    }

    #[must_use]
    pub fn animation(mut self, overrides: SpringOverrides) -> Self {
        self.animation = overrides;
        self
    }

    #[must_use]
    pub fn gestures_disabled(mut self, disabled: bool) -> Self {
        self.gestures_disabled = disabled;
        self
    }

    #[must_use]
    pub fn preset(mut self, preset: Preset) -> Self {
        self.preset = preset;
        self
    }

    #[must_use]
    pub fn debug_tag(mut self, tag: impl Into<String>) -> Self {
        self.debug_tag = Some(tag.into());
        self
    }

    /// Index bounds as a value type.
    #[must_use]
    pub fn page_bounds(&self) -> PageBounds {
        PageBounds {
            min: self.min_index,
            max: self.max_index,
        }
    }

    /// Spring tuning with caller overrides applied.
    #[must_use]
    pub fn spring_config(&self) -> SpringConfig {
        SpringConfig::pager_default().merged(&self.animation)
    }

    /// Reject configurations the state machine cannot run.
    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min_index, self.max_index)
            && min > max
        {
            return Err(PagerError::InvalidBounds { min, max });
        }
        if !self.bounce_pct.is_finite() || !(0.0..=1.0).contains(&self.bounce_pct) {
            return Err(PagerError::invalid(format!(
                "bounce_pct must be within [0, 1], got {}",
                self.bounce_pct
            )));
        }
        if !self.fling_velocity.is_finite() || self.fling_velocity < 0.0 {
            return Err(PagerError::invalid(format!(
                "fling_velocity must be a non-negative number, got {}",
                self.fling_velocity
            )));
        }
        Ok(())
    }
}

/// Inclusive page index bounds; `None` on either side means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageBounds {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl PageBounds {
    pub const UNBOUNDED: Self = Self {
        min: None,
        max: None,
    };

    #[must_use]
    pub fn contains(&self, index: i64) -> bool {
        self.min.is_none_or(|min| index >= min) && self.max.is_none_or(|max| index <= max)
    }

    /// Whether a fractional page lies within the bounds.
    #[must_use]
    pub fn contains_page(&self, page: f64) -> bool {
        self.min.is_none_or(|min| page >= min as f64)
            && self.max.is_none_or(|max| page <= max as f64)
    }

    #[must_use]
    pub fn clamp(&self, index: i64) -> i64 {
        let index = self.min.map_or(index, |min| index.max(min));
        self.max.map_or(index, |max| index.min(max))
    }

    /// `index` sits on (or below) the lower bound.
    #[must_use]
    pub fn is_at_min(&self, index: i64) -> bool {
        self.min.is_some_and(|min| index <= min)
    }

    /// `index` sits on (or above) the upper bound.
    #[must_use]
    pub fn is_at_max(&self, index: i64) -> bool {
        self.max.is_some_and(|max| index >= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = PagerConfig::default();
        assert_eq!(config.orientation, Orientation::Horizontal);
        assert_eq!(config.page_buffer, 1);
        assert_eq!(config.bounce_pct, 0.0);
        assert_eq!(config.fling_velocity, 500.0);
        assert_eq!(config.page_bounds(), PageBounds::UNBOUNDED);
        assert_eq!(config.spring_config(), SpringConfig::pager_default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let config = PagerConfig::default().min_index(3).max_index(1);
        assert_eq!(
            config.validate(),
            Err(PagerError::InvalidBounds { min: 3, max: 1 })
        );
    }

    #[test]
    fn validate_rejects_bounce_out_of_range() {
        assert!(PagerConfig::default().bounce_pct(1.5).validate().is_err());
        assert!(PagerConfig::default().bounce_pct(-0.1).validate().is_err());
        assert!(PagerConfig::default().bounce_pct(f64::NAN).validate().is_err());
    }

    #[test]
    fn validate_rejects_negative_fling_velocity() {
        assert!(PagerConfig::default().fling_velocity(-1.0).validate().is_err());
        assert!(PagerConfig::default().fling_velocity(0.0).validate().is_ok());
    }

    #[test]
    fn spring_overrides_are_merged() {
        let config = PagerConfig::default().animation(SpringOverrides::none().damping(5.0));
        let spring = config.spring_config();
        assert_eq!(spring.damping, 5.0);
        assert_eq!(spring.stiffness, SpringConfig::pager_default().stiffness);
    }

    #[test]
    fn bounds_clamp_and_edges() {
        let bounds = PageBounds {
            min: Some(0),
            max: Some(4),
        };
        assert_eq!(bounds.clamp(-3), 0);
        assert_eq!(bounds.clamp(9), 4);
        assert_eq!(bounds.clamp(2), 2);
        assert!(bounds.is_at_min(0));
        assert!(!bounds.is_at_min(1));
        assert!(bounds.is_at_max(4));
        assert!(bounds.contains_page(4.0));
        assert!(!bounds.contains_page(4.01));
        assert!(!bounds.contains_page(-0.01));
    }

    #[test]
    fn unbounded_never_clamps() {
        let bounds = PageBounds::UNBOUNDED;
        assert_eq!(bounds.clamp(i64::MIN), i64::MIN);
        assert!(!bounds.is_at_min(i64::MIN));
        assert!(!bounds.is_at_max(i64::MAX));
        assert!(bounds.contains_page(-1e12));
    }
}
