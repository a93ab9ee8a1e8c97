#![forbid(unsafe_code)]

//! Core: the gesture-to-page state machine behind an infinite, nestable pager.
//!
//! # Role in infipage
//! `infipage-core` turns a live touch stream into a settled integer page. It
//! owns translation tracking, boundary resistance, the fling decision, the
//! settle spring, page commits and the arbitration protocol that lets pagers
//! nest inside one another. Rendering, layout and touch capture belong to the
//! host; the core only consumes their callbacks and hands back per-slot
//! props.
//!
//! # Primary responsibilities
//! - **Pager**: the per-instance state machine ([`Pager`], [`PagerBuilder`]).
//! - **Arbitration**: one shared registry per pager tree decides which pager
//!   moves ([`ArbitrationRegistry`], [`PagerContext`]).
//! - **Projection**: translation to continuous page position and per-slot
//!   focus ([`PageProjector`]).
//! - **Window**: committed page and render window ([`PageCommit`],
//!   [`PageWindow`]).
//! - **Interpolation**: focus to transform presets ([`Preset`]) and the
//!   [`PageInterpolator`] extension point.
//!
//! # How it fits in the system
//! The host routes touches to every pager under the finger, calls
//! [`Pager::frame`] once per display frame, renders [`Pager::visible_pages`],
//! and drains [`PageChangeFeed`] off the frame path. `infipage-harness`
//! does exactly that against scripted scenarios.

pub mod animation;
pub mod arbitration;
pub mod config;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod interpolator;
pub mod notify;
pub mod pager;
pub mod projector;
pub mod window;

pub use animation::{Spring, SpringConfig, SpringOverrides};
pub use arbitration::{ArbitrationRegistry, PagerContext, PagerId};
pub use config::{DEFAULT_FLING_VELOCITY, DEFAULT_PAGE_BUFFER, PageBounds, PagerConfig};
pub use error::{PagerError, Result};
pub use geometry::{Orientation, Viewport};
pub use gesture::{
    FailFlag, GestureEnd, GesturePhase, GestureUpdate, ORTHOGONAL_DEAD_ZONE, TouchControl,
    TouchPoint,
};
pub use interpolator::{
    Extrapolate, Interpolator, InterpolatorInput, PageInterpolator, PageTransform, Preset,
    interpolate,
};
pub use notify::{PageChange, PageChangeFeed, page_change_channel};
pub use pager::{
    PageComponent, PageProps, Pager, PagerBuilder, Recognizer, RenderedPage, SetPageOptions,
};
pub use projector::{PageProjector, SharedPagePosition, Translation};
pub use window::{PageCommit, PageWindow, WindowSlot};
