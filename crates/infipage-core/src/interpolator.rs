#![forbid(unsafe_code)]

//! Page interpolation policies: focus value → visual transform.
//!
//! An interpolator is a pure function of
//! `(focus, viewport width, viewport height, orientation, buffer)`. The pager
//! calls it once per rendered slot per frame; it must not touch shared state.
//!
//! # Available Presets
//!
//! | Preset | Description |
//! |--------|-------------|
//! | [`Preset::Slide`] | Axis-aligned slide, one page per page-size |
//! | [`Preset::Cube`] | Pages rotate about their shared edge in perspective |
//! | [`Preset::Stack`] | Upcoming pages wait underneath, scaled down by depth |
//! | [`Preset::TurnIn`] | Slide with a perspective turn and shrink toward the edges |
//!
//! Custom policies implement [`PageInterpolator`]; any
//! `Fn(&InterpolatorInput) -> PageTransform + Send + Sync` already does.

use std::fmt;
use std::sync::Arc;

use crate::geometry::Orientation;

/// Everything an interpolator may read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolatorInput {
    /// Signed distance in pages from the slot to the current page position.
    pub focus: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub orientation: Orientation,
    /// The pager's page buffer.
    pub page_buffer: usize,
}

impl InterpolatorInput {
    /// Viewport extent along the paging axis.
    #[inline]
    pub fn page_size(&self) -> f64 {
        self.orientation
            .primary(self.viewport_width, self.viewport_height)
    }
}

/// Visual transform for one page slot.
///
/// Translation is in pixels, rotation in degrees. `perspective` of `0.0`
/// means a flat (orthographic) transform. `anchor_x`/`anchor_y` place the
/// rotation/scale origin as fractions of the page size (0.5 = center).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
    pub rotate_x_deg: f64,
    pub rotate_y_deg: f64,
    pub perspective: f64,
    pub anchor_x: f64,
    pub anchor_y: f64,
    pub opacity: f64,
    pub z_index: f64,
}

impl PageTransform {
    pub const IDENTITY: Self = Self {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
        rotate_x_deg: 0.0,
        rotate_y_deg: 0.0,
        perspective: 0.0,
        anchor_x: 0.5,
        anchor_y: 0.5,
        opacity: 1.0,
        z_index: 0.0,
    };

    /// Identity transform translated `offset` pixels along the paging axis.
    #[must_use]
    pub fn along(orientation: Orientation, offset: f64) -> Self {
        match orientation {
            Orientation::Horizontal => Self {
                translate_x: offset,
                ..Self::IDENTITY
            },
            Orientation::Vertical => Self {
                translate_y: offset,
                ..Self::IDENTITY
            },
        }
    }
}

impl Default for PageTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Strategy mapping a slot's focus to its transform.
pub trait PageInterpolator: Send + Sync {
    fn interpolate(&self, input: &InterpolatorInput) -> PageTransform;
}

impl<F> PageInterpolator for F
where
    F: Fn(&InterpolatorInput) -> PageTransform + Send + Sync,
{
    fn interpolate(&self, input: &InterpolatorInput) -> PageTransform {
        self(input)
    }
}

/// Built-in interpolation policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Preset {
    #[default]
    Slide,
    Cube,
    Stack,
    TurnIn,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Slide, Preset::Cube, Preset::Stack, Preset::TurnIn];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Slide => "slide",
            Self::Cube => "cube",
            Self::Stack => "stack",
            Self::TurnIn => "turn_in",
        }
    }
}

impl PageInterpolator for Preset {
    fn interpolate(&self, input: &InterpolatorInput) -> PageTransform {
        match self {
            Self::Slide => slide(input),
            Self::Cube => cube(input),
            Self::Stack => stack(input),
            Self::TurnIn => turn_in(input),
        }
    }
}

/// The interpolator a pager actually runs: a preset or an injected policy.
#[derive(Clone)]
pub enum Interpolator {
    Preset(Preset),
    Custom(Arc<dyn PageInterpolator>),
}

impl Interpolator {
    #[must_use]
    pub fn custom(interpolator: impl PageInterpolator + 'static) -> Self {
        Self::Custom(Arc::new(interpolator))
    }
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::Preset(Preset::Slide)
    }
}

impl fmt::Debug for Interpolator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preset(preset) => f.debug_tuple("Preset").field(preset).finish(),
            Self::Custom(_) => f.debug_tuple("Custom").finish_non_exhaustive(),
        }
    }
}

impl PageInterpolator for Interpolator {
    fn interpolate(&self, input: &InterpolatorInput) -> PageTransform {
        match self {
            Self::Preset(preset) => preset.interpolate(input),
            Self::Custom(custom) => custom.interpolate(input),
        }
    }
}

// ---------------------------------------------------------------------------
// Piecewise-linear interpolation
// ---------------------------------------------------------------------------

/// Behavior outside the first/last input stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extrapolate {
    /// Continue the slope of the nearest segment.
    Extend,
    /// Hold the nearest output value.
    Clamp,
}

/// Map `value` through the piecewise-linear curve `input → output`.
///
/// `input` must be strictly increasing. With fewer than two stops the first
/// output (or `value` itself when empty) is returned.
#[must_use]
pub fn interpolate<const N: usize>(
    value: f64,
    input: [f64; N],
    output: [f64; N],
    extrapolate: Extrapolate,
) -> f64 {
    interpolate_stops(value, &input, &output, extrapolate)
}

fn interpolate_stops(value: f64, input: &[f64], output: &[f64], extrapolate: Extrapolate) -> f64 {
    let n = input.len().min(output.len());
    match n {
        0 => return value,
        1 => return output[0],
        _ => {}
    }

    if extrapolate == Extrapolate::Clamp {
        if value <= input[0] {
            return output[0];
        }
        if value >= input[n - 1] {
            return output[n - 1];
        }
    }

    let mut segment = n - 2;
    for i in 0..n - 1 {
        if value <= input[i + 1] {
            segment = i;
            break;
        }
    }

    let (x0, x1) = (input[segment], input[segment + 1]);
    let (y0, y1) = (output[segment], output[segment + 1]);
    let span = x1 - x0;
    if span == 0.0 {
        return y1;
    }
    y0 + (value - x0) / span * (y1 - y0)
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// Perspective distance as a multiple of the page size.
const PERSPECTIVE_PAGES: f64 = 4.0;

/// Scale lost per page of depth in the stack preset.
const STACK_SCALE_STEP: f64 = 0.1;

/// Maximum turn angle of the turn-in preset, in degrees.
const TURN_IN_DEGREES: f64 = 45.0;

/// Scale of a turn-in page one full page away.
const TURN_IN_MIN_SCALE: f64 = 0.8;

fn slide(input: &InterpolatorInput) -> PageTransform {
    PageTransform::along(input.orientation, input.focus * input.page_size())
}

fn cube(input: &InterpolatorInput) -> PageTransform {
    let size = input.page_size();
    let focus = input.focus;
    let angle = interpolate(focus, [-1.0, 0.0, 1.0], [-90.0, 0.0, 90.0], Extrapolate::Clamp);
    // Rotate about the edge shared with the current page.
    let edge = if focus > 0.0 { 0.0 } else { 1.0 };
    let visible = if focus.abs() < 1.0 { 1.0 } else { 0.0 };

    let mut transform = PageTransform::along(input.orientation, focus * size);
    transform.perspective = size * PERSPECTIVE_PAGES;
    transform.opacity = visible;
    match input.orientation {
        Orientation::Horizontal => {
            transform.rotate_y_deg = angle;
            transform.anchor_x = edge;
        }
        Orientation::Vertical => {
            transform.rotate_x_deg = -angle;
            transform.anchor_y = edge;
        }
    }
    transform
}

fn stack(input: &InterpolatorInput) -> PageTransform {
    let size = input.page_size();
    let focus = input.focus;
    let depth = input.page_buffer.max(1) as f64;

    if focus <= 0.0 {
        // Pages already passed slide off the top of the stack.
        let mut transform = PageTransform::along(input.orientation, focus * size);
        transform.z_index = -focus;
        return transform;
    }

    let scale = interpolate(
        focus,
        [0.0, depth],
        [1.0, 1.0 - STACK_SCALE_STEP * depth],
        Extrapolate::Clamp,
    );
    let opacity = interpolate(focus, [depth - 1.0, depth], [1.0, 0.0], Extrapolate::Clamp);
    PageTransform {
        scale,
        opacity,
        z_index: -focus,
        ..PageTransform::IDENTITY
    }
}

fn turn_in(input: &InterpolatorInput) -> PageTransform {
    let size = input.page_size();
    let focus = input.focus;
    let angle = interpolate(
        focus,
        [-1.0, 0.0, 1.0],
        [TURN_IN_DEGREES, 0.0, -TURN_IN_DEGREES],
        Extrapolate::Clamp,
    );
    let scale = interpolate(
        focus,
        [-1.0, 0.0, 1.0],
        [TURN_IN_MIN_SCALE, 1.0, TURN_IN_MIN_SCALE],
        Extrapolate::Clamp,
    );

    let mut transform = PageTransform::along(input.orientation, focus * size);
    transform.scale = scale;
    transform.perspective = size * PERSPECTIVE_PAGES;
    match input.orientation {
        Orientation::Horizontal => transform.rotate_y_deg = angle,
        Orientation::Vertical => transform.rotate_x_deg = -angle,
    }
    transform
}
