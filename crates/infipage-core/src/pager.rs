#![forbid(unsafe_code)]

//! One paging surface: the gesture-to-page state machine.
//!
//! A [`Pager`] owns its translation, committed page and render window. The
//! host feeds it three kinds of input:
//!
//! - **touch callbacks** (`on_begin`, `on_touches_move`, `on_update`,
//!   `on_end`, `on_finalize`) from the capture primitive;
//! - **layout** through [`Pager::set_viewport`];
//! - **time** through [`Pager::frame`], which advances the settle spring.
//!
//! Everything visible is pulled: [`Pager::visible_pages`] yields focus and
//! transform per slot, [`Pager::render`] additionally runs the page content.
//! Page changes are queued and delivered by [`PageChangeFeed::flush`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use infipage_core::{GestureEnd, GestureUpdate, Pager, PagerConfig, PagerContext, Viewport};
//!
//! let ctx = PagerContext::root();
//! let mut pager = Pager::builder(PagerConfig::horizontal())
//!     .render_page(|props| props.index)
//!     .build(&ctx)
//!     .unwrap();
//! pager.set_viewport(Viewport::new(300.0, 600.0));
//!
//! pager.on_begin(200.0, 100.0);
//! pager.on_update(GestureUpdate { translation_x: -50.0, ..Default::default() });
//! pager.on_end(GestureEnd { velocity_x: -600.0, translation_x: -50.0, ..Default::default() });
//! pager.on_finalize();
//!
//! while pager.frame(Duration::from_millis(16)) {}
//! assert_eq!(pager.current_page(), 1);
//! assert_eq!(pager.translation(), -300.0);
//! ```
//!
//! # Nesting
//!
//! Pagers built from the same [`PagerContext`] tree share one arbitration
//! registry. The capture primitive delivers every touch to every pager under
//! it; the registry decides which of them may move (see
//! [`crate::arbitration`]).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::animation::spring::SpringConfig;
use crate::arbitration::{ArbitrationRegistry, PagerContext, PagerId};
use crate::config::{PageBounds, PagerConfig};
use crate::error::{PagerError, Result};
use crate::geometry::{Orientation, Viewport};
use crate::gesture::{
    self, GestureEnd, GesturePhase, GestureTracker, GestureUpdate, Release, TouchControl,
    TouchPoint,
};
use crate::interpolator::{Interpolator, InterpolatorInput, PageInterpolator, PageTransform};
use crate::notify::{
    PageChange, PageChangeCallback, PageChangeFeed, PageChangeSender, page_change_channel,
};
use crate::projector::{
    PageProjector, SharedPagePosition, Translation, nearest_page, rest_translation,
};
use crate::window::{PageCommit, PageWindow};

/// Everything a page needs to draw itself for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageProps {
    pub index: i64,
    /// Signed distance in pages from this slot to the current position.
    pub focus: f64,
    /// This slot is the committed page.
    pub is_active: bool,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Continuous page position of the pager.
    pub page_scalar: f64,
    /// Output of the pager's interpolator for this slot.
    pub transform: PageTransform,
}

/// A page's content, rendered per visible slot.
pub trait PageComponent<V>: Send {
    fn render(&self, props: &PageProps) -> V;
}

/// Function form of page content.
pub type RenderPageFn<V> = Box<dyn Fn(&PageProps) -> V + Send>;

enum PageContent<V> {
    Component(Box<dyn PageComponent<V>>),
    Render(RenderPageFn<V>),
}

impl<V> PageContent<V> {
    fn render(&self, props: &PageProps) -> V {
        match self {
            Self::Component(component) => component.render(props),
            Self::Render(render) => render(props),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Component(_) => "component",
            Self::Render(_) => "render_fn",
        }
    }
}

/// One rendered slot: its props and the content's output.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage<V> {
    pub props: PageProps,
    pub view: V,
}

/// A gesture recognizer allowed to run together with this pager.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Recognizer {
    /// The pager's own pan recognizer.
    Pager(PagerId),
    /// A host recognizer composed in with
    /// [`PagerBuilder::simultaneous_with`].
    External(String),
}

/// Options for programmatic page changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SetPageOptions {
    /// Spring to the page instead of jumping.
    pub animated: bool,
}

impl SetPageOptions {
    pub const JUMP: Self = Self { animated: false };
    pub const ANIMATED: Self = Self { animated: true };
}

/// Builder for [`Pager`]: configuration plus everything that is not plain
/// data.
pub struct PagerBuilder<V> {
    config: PagerConfig,
    render_page: Option<RenderPageFn<V>>,
    page_component: Option<Box<dyn PageComponent<V>>>,
    on_page_change: Option<PageChangeCallback>,
    interpolator: Option<Interpolator>,
    simultaneous: Vec<String>,
    page_position: Option<SharedPagePosition>,
}

impl<V> fmt::Debug for PagerBuilder<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagerBuilder")
            .field("config", &self.config)
            .field("render_page", &self.render_page.is_some())
            .field("page_component", &self.page_component.is_some())
            .field("interpolator", &self.interpolator)
            .field("simultaneous", &self.simultaneous)
            .finish_non_exhaustive()
    }
}

impl<V> PagerBuilder<V> {
    #[must_use]
    pub fn new(config: PagerConfig) -> Self {
        Self {
            config,
            render_page: None,
            page_component: None,
            on_page_change: None,
            interpolator: None,
            simultaneous: Vec::new(),
            page_position: None,
        }
    }

    /// Render pages with a function.
    #[must_use]
    pub fn render_page(mut self, render: impl Fn(&PageProps) -> V + Send + 'static) -> Self {
        self.render_page = Some(Box::new(render));
        self
    }

    /// Render pages with a component. Takes precedence over
    /// [`render_page`](Self::render_page).
    #[must_use]
    pub fn page_component(mut self, component: impl PageComponent<V> + 'static) -> Self {
        self.page_component = Some(Box::new(component));
        self
    }

    /// Callback run by [`PageChangeFeed::flush`] for every committed change.
    #[must_use]
    pub fn on_page_change(mut self, callback: impl FnMut(PageChange) + Send + 'static) -> Self {
        self.on_page_change = Some(Box::new(callback));
        self
    }

    /// Replace the configured preset with a custom interpolator.
    #[must_use]
    pub fn interpolator(mut self, interpolator: impl PageInterpolator + 'static) -> Self {
        self.interpolator = Some(Interpolator::custom(interpolator));
        self
    }

    /// Allow a host recognizer to run together with this pager.
    #[must_use]
    pub fn simultaneous_with(mut self, recognizer: impl Into<String>) -> Self {
        self.simultaneous.push(recognizer.into());
        self
    }

    /// Mirror the page position into a caller-owned cell.
    #[must_use]
    pub fn page_position(mut self, cell: SharedPagePosition) -> Self {
        self.page_position = Some(cell);
        self
    }

    /// Validate and mount the pager in `ctx`'s tree.
    pub fn build(self, ctx: &PagerContext) -> Result<Pager<V>> {
        self.config.validate()?;

        let content = match (self.page_component, self.render_page) {
            (Some(component), Some(_)) => {
                tracing::warn!(
                    tag = self.config.debug_tag.as_deref().unwrap_or(""),
                    "both page_component and render_page supplied; using page_component"
                );
                PageContent::Component(component)
            }
            (Some(component), None) => PageContent::Component(component),
            (None, Some(render)) => PageContent::Render(render),
            (None, None) => return Err(PagerError::MissingPageContent),
        };

        let bounds = self.config.page_bounds();
        let current = bounds.clamp(self.config.initial_index);
        let (changes, mut feed) = page_change_channel();
        if let Some(callback) = self.on_page_change {
            feed.set_callback(callback);
        }
        let position = self.page_position.unwrap_or_default();
        position.set(current as f64);

        let id = ctx.registry().mount(self.config.orientation, ctx.depth());
        tracing::debug!(
            pager = %id,
            tag = self.config.debug_tag.as_deref().unwrap_or(""),
            page = current,
            content = content.kind(),
            "pager mounted"
        );

        Ok(Pager {
            id,
            ctx: ctx.clone(),
            spring: self.config.spring_config(),
            bounds,
            viewport: Viewport::ZERO,
            translation: Translation::new(0.0),
            projector: PageProjector::new(),
            commit: PageCommit::new(current, bounds),
            window: PageWindow::new(current, self.config.page_buffer, bounds),
            gesture: GestureTracker::new(),
            gestures_disabled: self.config.gestures_disabled,
            interpolator: self
                .interpolator
                .unwrap_or(Interpolator::Preset(self.config.preset)),
            content,
            changes,
            feed: Some(feed),
            position,
            simultaneous: self.simultaneous,
            config: self.config,
        })
    }
}

/// An infinitely scrollable, nestable pager.
pub struct Pager<V = ()> {
    id: PagerId,
    ctx: PagerContext,
    config: PagerConfig,
    spring: SpringConfig,
    bounds: PageBounds,
    viewport: Viewport,
    translation: Translation,
    projector: PageProjector,
    commit: PageCommit,
    window: PageWindow,
    gesture: GestureTracker,
    gestures_disabled: bool,
    interpolator: Interpolator,
    content: PageContent<V>,
    changes: PageChangeSender,
    feed: Option<PageChangeFeed>,
    position: SharedPagePosition,
    simultaneous: Vec<String>,
}

impl<V> fmt::Debug for Pager<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pager")
            .field("id", &self.id)
            .field("tag", &self.config.debug_tag)
            .field("page", &self.commit.current())
            .field("translation", &self.translation.value())
            .field("viewport", &self.viewport)
            .field("phase", &self.phase())
            .field("content", &self.content.kind())
            .finish_non_exhaustive()
    }
}

impl<V> Pager<V> {
    #[must_use]
    pub fn builder(config: PagerConfig) -> PagerBuilder<V> {
        PagerBuilder::new(config)
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn id(&self) -> PagerId {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    #[must_use]
    pub fn context(&self) -> &PagerContext {
        &self.ctx
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.config.orientation
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        self.ctx.depth()
    }

    /// Committed page.
    #[must_use]
    pub fn current_page(&self) -> i64 {
        self.commit.current()
    }

    /// Current offset in pixels.
    #[must_use]
    pub fn translation(&self) -> f64 {
        self.translation.value()
    }

    /// Continuous page position; the committed page before first layout.
    #[must_use]
    pub fn page_position(&self) -> f64 {
        self.projector.page_or(self.commit.current())
    }

    /// Cell mirroring [`page_position`](Self::page_position).
    #[must_use]
    pub fn page_position_handle(&self) -> SharedPagePosition {
        self.position.clone()
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Viewport extent along the paging axis.
    #[must_use]
    pub fn page_size(&self) -> f64 {
        self.viewport.page_size(self.config.orientation)
    }

    #[must_use]
    pub fn window(&self) -> PageWindow {
        self.window
    }

    #[must_use]
    pub fn phase(&self) -> GesturePhase {
        if self.gesture.is_tracking() {
            GesturePhase::Tracking
        } else if self.translation.is_animating() {
            GesturePhase::Settling
        } else {
            GesturePhase::Idle
        }
    }

    /// No gesture and no running spring.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.phase() == GesturePhase::Idle
    }

    /// A deeper pager on the same axis owns the touch.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.registry().is_locked(self.id)
    }

    #[must_use]
    pub fn gestures_disabled(&self) -> bool {
        self.gestures_disabled
    }

    /// Own recognizer first, then host recognizers in registration order.
    #[must_use]
    pub fn recognizers(&self) -> Vec<Recognizer> {
        std::iter::once(Recognizer::Pager(self.id))
            .chain(self.simultaneous.iter().cloned().map(Recognizer::External))
            .collect()
    }

    /// Take the notification feed to drain it elsewhere.
    pub fn take_page_change_feed(&mut self) -> Option<PageChangeFeed> {
        self.feed.take()
    }

    /// Flush queued page changes through the feed still held by the pager.
    pub fn flush_page_changes(&mut self) -> usize {
        self.feed.as_mut().map_or(0, PageChangeFeed::flush)
    }

    fn registry(&self) -> &Arc<ArbitrationRegistry> {
        self.ctx.registry()
    }

    fn tag(&self) -> &str {
        self.config.debug_tag.as_deref().unwrap_or("")
    }

    // ---------------------------------------------------------------------
    // Touch protocol
    // ---------------------------------------------------------------------

    /// A touch went down at `(x, y)`.
    pub fn on_begin(&mut self, x: f64, y: f64) {
        self.check_topology();
        self.translation.interrupt();
        let generation = self.registry().rearm_generation();
        self.gesture.begin(self.translation.value(), x, y, generation);

        let current = self.commit.current();
        let pinned = self.bounds.is_at_min(current) || self.bounds.is_at_max(current);
        let register = !self.gestures_disabled && (!pinned || self.config.bounce_pct > 0.0);
        if register {
            self.registry().register_touch(self.id);
            self.gesture.arm();
        }
        tracing::debug!(
            pager = %self.id,
            tag = self.tag(),
            page = current,
            registered = register,
            "gesture began"
        );
    }

    /// Touches moved; may hand the gesture to a competing recognizer through
    /// `control`.
    pub fn on_touches_move(&mut self, touches: &[TouchPoint], control: &mut impl TouchControl) {
        if !self.gesture.accepts_updates() {
            return;
        }
        self.check_topology();
        self.rejoin();
        let Some(touch) = touches.first() else {
            return;
        };

        let displacement = self.gesture.displacement(self.config.orientation, touch);
        let past_end =
            gesture::swiping_past_end(self.commit.current(), self.bounds, displacement);
        let reason = if self.gestures_disabled {
            Some("gestures disabled")
        } else if self.config.bounce_pct <= 0.0 && past_end {
            Some("swiping past end")
        } else if self.is_locked() {
            Some("locked by nested pager")
        } else {
            None
        };

        match reason {
            Some(reason) => {
                control.fail();
                self.gesture.fail();
                self.registry().deregister_touch(self.id);
                tracing::debug!(pager = %self.id, tag = self.tag(), reason, "gesture failed");
            }
            None => {
                self.registry().register_touch(self.id);
                self.gesture.arm();
            }
        }
    }

    /// Continuous drag update.
    pub fn on_update(&mut self, update: GestureUpdate) {
        if !self.gesture.accepts_updates() || self.gestures_disabled {
            return;
        }
        self.check_topology();
        self.rejoin();
        if self.is_locked() {
            tracing::trace!(pager = %self.id, "update skipped: locked");
            return;
        }
        let orientation = self.config.orientation;
        if gesture::is_orthogonal(orientation, update.translation_x, update.translation_y) {
            tracing::trace!(pager = %self.id, "update skipped: orthogonal");
            return;
        }
        let size = self.page_size();
        if size <= 0.0 {
            return;
        }

        let raw = self.gesture.start_translation()
            + orientation.primary(update.translation_x, update.translation_y);
        let resisted = gesture::resist(raw, size, self.bounds, self.config.bounce_pct);
        self.translation.set(resisted);
        self.sync();
    }

    /// Touch released.
    pub fn on_end(&mut self, end: GestureEnd) {
        if !self.gesture.is_tracking() {
            return;
        }
        self.rejoin();
        let orientation = self.config.orientation;
        let velocity = orientation.primary(end.velocity_x, end.velocity_y);
        let may_fling = !self.gesture.is_failed()
            && !self.gestures_disabled
            && !self.is_locked()
            && !gesture::is_orthogonal(orientation, end.translation_x, end.translation_y);
        self.release(velocity, may_fling);
    }

    /// The gesture is over, whatever its outcome.
    pub fn on_finalize(&mut self) {
        self.registry().deregister_touch(self.id);
        if self.gesture.is_tracking() {
            self.release(0.0, false);
        }
        tracing::debug!(pager = %self.id, tag = self.tag(), "gesture finalized");
    }

    fn release(&mut self, velocity: f64, may_fling: bool) {
        let size = self.page_size();
        if size <= 0.0 {
            self.gesture.release(false);
            return;
        }

        let release = Release {
            translation: self.translation.value(),
            velocity,
            page_size: size,
            fling_velocity: self.config.fling_velocity,
            may_fling,
        };
        let target = release.target(self.bounds);
        let rest = rest_translation(target, size);
        let settling = self.translation.value() != rest || self.translation.is_animating();
        if settling {
            let seed = if may_fling { velocity } else { 0.0 };
            self.translation.release_to(rest, seed, self.spring);
        }
        let held = self.gesture.release(settling);
        tracing::debug!(
            pager = %self.id,
            tag = self.tag(),
            page = target,
            velocity,
            fling = release.is_fling(),
            held_ms = held.as_millis() as u64,
            "gesture released"
        );
    }

    /// Follow the registry into its current generation. A live touch that
    /// a re-arm cleared registers again and keeps its gesture.
    fn rejoin(&mut self) {
        let generation = self.registry().rearm_generation();
        if !self.gesture.is_tracking() || self.gesture.generation() == generation {
            return;
        }
        self.gesture.set_generation(generation);
        if self.gesture.is_armed() && !self.gestures_disabled {
            self.registry().register_touch(self.id);
            tracing::debug!(
                pager = %self.id,
                tag = self.tag(),
                generation,
                "touch re-registered after re-arm"
            );
        }
    }

    /// Root only: re-arm when pagers mount or unmount mid-gesture.
    fn check_topology(&mut self) {
        if self.ctx.is_root() && self.registry().topology_churned() {
            self.rearm();
        }
    }

    /// Clear every active touch in this pager's tree.
    ///
    /// Locks held by pagers that no longer receive touches are dropped.
    /// Pagers still tracking register again on their next callback and keep
    /// their drag; this pager does so immediately.
    ///
    /// Returns the new arbitration generation.
    pub fn rearm(&mut self) -> u64 {
        let generation = self.registry().rearm();
        tracing::info!(
            pager = %self.id,
            tag = self.tag(),
            generation,
            "gesture arbitration re-armed"
        );
        self.rejoin();
        generation
    }

    /// Enable or disable user gestures. Disabling fails a gesture in flight.
    pub fn set_gestures_disabled(&mut self, disabled: bool) {
        self.gestures_disabled = disabled;
        if disabled && self.gesture.accepts_updates() {
            self.gesture.fail();
            self.registry().deregister_touch(self.id);
        }
    }

    // ---------------------------------------------------------------------
    // Layout and time
    // ---------------------------------------------------------------------

    /// Store the measured viewport.
    ///
    /// At rest the translation is re-anchored to the committed page. A drag
    /// or spring in flight is rescaled so it keeps its logical position.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        let old = self.page_size();
        self.viewport = viewport;
        if !viewport.has_page_size(self.config.orientation) {
            return;
        }
        let size = self.page_size();
        if size == old {
            return;
        }

        let moving = self.gesture.is_tracking() || self.translation.is_animating();
        if old > 0.0 && moving {
            let ratio = size / old;
            self.translation.rescale(ratio);
            self.gesture
                .set_start_translation(self.gesture.start_translation() * ratio);
        } else {
            let rest = rest_translation(self.commit.current(), size);
            self.translation.set(rest);
            if self.gesture.is_tracking() {
                self.gesture.set_start_translation(rest);
            }
        }
        tracing::debug!(
            pager = %self.id,
            tag = self.tag(),
            width = viewport.width,
            height = viewport.height,
            "viewport changed"
        );
        self.sync();
    }

    /// Advance animation by `dt`. Returns `true` while another frame is
    /// needed.
    pub fn frame(&mut self, dt: Duration) -> bool {
        self.check_topology();

        if self.translation.is_animating() {
            let _span = tracing::debug_span!("pager.frame", pager = %self.id, tag = self.tag())
                .entered();
            let rested = self.translation.advance(dt);
            self.sync();
            if rested {
                let size = self.page_size();
                if size > 0.0 {
                    let rest = rest_translation(self.commit.current(), size);
                    self.translation.set(rest);
                    self.sync();
                }
                self.gesture.settle();
                tracing::debug!(page = self.commit.current(), "settled");
            }
        }
        !self.is_idle()
    }

    fn sync(&mut self) {
        let Some(page) = self
            .projector
            .update(self.translation.value(), self.page_size())
        else {
            return;
        };
        self.position.set(page);
        if let Some(change) = self.commit.observe(page) {
            self.publish(change);
        }
    }

    fn publish(&mut self, change: PageChange) {
        self.window = PageWindow::new(change.page, self.config.page_buffer, self.bounds);
        tracing::debug!(
            pager = %self.id,
            tag = self.tag(),
            page = change.page,
            previous = change.previous,
            "page committed"
        );
        self.changes.send(change);
    }

    // ---------------------------------------------------------------------
    // Imperative control
    // ---------------------------------------------------------------------

    /// Go to `index`. Out-of-range indices are ignored.
    ///
    /// A jump lands exactly on the page's rest translation. An animated
    /// change springs there, retargeting a spring already in flight.
    /// Either cancels a drag in progress.
    pub fn set_page(&mut self, index: i64, options: SetPageOptions) {
        if !self.bounds.contains(index) {
            tracing::debug!(
                pager = %self.id,
                tag = self.tag(),
                page = index,
                "set_page out of range"
            );
            return;
        }
        if index == self.commit.current() && self.is_idle() {
            return;
        }
        if self.gesture.is_tracking() {
            self.registry().deregister_touch(self.id);
            self.gesture.reset();
        }

        let size = self.page_size();
        if size <= 0.0 {
            self.jump(index);
            return;
        }
        let rest = rest_translation(index, size);
        if options.animated {
            self.translation.animate_to(rest, self.spring);
        } else {
            self.translation.set(rest);
            self.jump(index);
            self.sync();
        }
        tracing::debug!(
            pager = %self.id,
            tag = self.tag(),
            page = index,
            animated = options.animated,
            "set_page"
        );
    }

    /// Go one page forward from the page being settled on.
    pub fn increment_page(&mut self, options: SetPageOptions) {
        if let Some(next) = self.target_page().checked_add(1) {
            self.set_page(next, options);
        }
    }

    /// Go one page back from the page being settled on.
    pub fn decrement_page(&mut self, options: SetPageOptions) {
        if let Some(previous) = self.target_page().checked_sub(1) {
            self.set_page(previous, options);
        }
    }

    /// Page the pager is heading to: the spring's target, else the
    /// committed page.
    #[must_use]
    pub fn target_page(&self) -> i64 {
        let size = self.page_size();
        match self.translation.spring_target() {
            Some(target) if size > 0.0 => self.bounds.clamp(nearest_page(-target / size)),
            _ => self.commit.current(),
        }
    }

    fn jump(&mut self, index: i64) {
        if let Some(change) = self.commit.force(index) {
            self.publish(change);
        }
        if self.projector.projection().is_none() {
            self.position.set(index as f64);
        }
    }

    // ---------------------------------------------------------------------
    // Rendering
    // ---------------------------------------------------------------------

    /// In-bounds slots of the window around the committed page, ascending.
    pub fn visible_pages(&self) -> impl Iterator<Item = PageProps> + '_ {
        let current = self.commit.current();
        let page_scalar = self.page_position();
        self.window
            .slots()
            .filter(|slot| slot.in_bounds)
            .map(move |slot| self.page_props(slot.index, current, page_scalar))
    }

    /// Props for `index`, whether or not it is in the window.
    #[must_use]
    pub fn props_for(&self, index: i64) -> PageProps {
        self.page_props(index, self.commit.current(), self.page_position())
    }

    /// Run the page content for every visible slot.
    pub fn render(&self) -> impl Iterator<Item = RenderedPage<V>> + '_ {
        self.visible_pages().map(|props| RenderedPage {
            view: self.content.render(&props),
            props,
        })
    }

    fn page_props(&self, index: i64, current: i64, page_scalar: f64) -> PageProps {
        let focus = self.projector.focus(index, current);
        let transform = self.interpolator.interpolate(&InterpolatorInput {
            focus,
            viewport_width: self.viewport.width,
            viewport_height: self.viewport.height,
            orientation: self.config.orientation,
            page_buffer: self.config.page_buffer,
        });
        PageProps {
            index,
            focus,
            is_active: index == current,
            viewport_width: self.viewport.width,
            viewport_height: self.viewport.height,
            page_scalar,
            transform,
        }
    }
}

impl<V> Drop for Pager<V> {
    fn drop(&mut self) {
        self.ctx.registry().unmount(self.id);
        tracing::debug!(pager = %self.id, "pager unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::FailFlag;

    const FRAME: Duration = Duration::from_millis(16);

    fn pager(config: PagerConfig) -> Pager<i64> {
        let mut pager = Pager::builder(config)
            .render_page(|props| props.index)
            .build(&PagerContext::root())
            .unwrap();
        pager.set_viewport(Viewport::new(300.0, 500.0));
        pager
    }

    fn drag(pager: &mut Pager<i64>, dx: f64) {
        pager.on_begin(150.0, 100.0);
        pager.on_touches_move(&[TouchPoint::new(0, 150.0 + dx, 100.0)], &mut FailFlag::default());
        pager.on_update(GestureUpdate {
            translation_x: dx,
            ..Default::default()
        });
    }

    fn settle(pager: &mut Pager<i64>) {
        for _ in 0..1000 {
            if !pager.frame(FRAME) {
                return;
            }
        }
        panic!("pager did not settle");
    }

    struct Labelled;

    impl PageComponent<i64> for Labelled {
        fn render(&self, props: &PageProps) -> i64 {
            props.index * 100
        }
    }

    #[test]
    fn build_requires_page_content() {
        let result = Pager::<()>::builder(PagerConfig::default()).build(&PagerContext::root());
        assert_eq!(result.err(), Some(PagerError::MissingPageContent));
    }

    #[test]
    fn build_rejects_invalid_config() {
        let result = Pager::builder(PagerConfig::default().bounds(Some(2), Some(1)))
            .render_page(|_| ())
            .build(&PagerContext::root());
        assert_eq!(
            result.err(),
            Some(PagerError::InvalidBounds { min: 2, max: 1 })
        );
    }

    #[test]
    fn component_wins_over_render_fn() {
        let pager = Pager::builder(PagerConfig::default())
            .render_page(|props| props.index)
            .page_component(Labelled)
            .build(&PagerContext::root())
            .unwrap();
        let views: Vec<i64> = pager.render().map(|page| page.view).collect();
        assert_eq!(views, vec![-100, 0, 100]);
    }

    #[test]
    fn initial_index_is_clamped_and_anchored() {
        let pager = pager(PagerConfig::default().bounds(Some(0), Some(3)).initial_index(7));
        assert_eq!(pager.current_page(), 3);
        assert_eq!(pager.translation(), -900.0);
        assert_eq!(pager.page_position(), 3.0);
    }

    #[test]
    fn drag_tracks_one_to_one_inside_bounds() {
        let mut pager = pager(PagerConfig::default());
        drag(&mut pager, -120.0);
        assert_eq!(pager.translation(), -120.0);
        assert_eq!(pager.phase(), GesturePhase::Tracking);
        assert!((pager.page_position() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn slow_release_returns_to_page() {
        let mut pager = pager(PagerConfig::default());
        drag(&mut pager, -100.0);
        pager.on_end(GestureEnd {
            translation_x: -100.0,
            ..Default::default()
        });
        pager.on_finalize();
        settle(&mut pager);
        assert_eq!(pager.current_page(), 0);
        assert_eq!(pager.translation(), 0.0);
    }

    #[test]
    fn vertical_pager_ignores_horizontal_motion() {
        let mut pager = pager(PagerConfig::vertical());
        pager.on_begin(0.0, 0.0);
        pager.on_update(GestureUpdate {
            translation_x: -80.0,
            translation_y: -5.0,
            ..Default::default()
        });
        assert_eq!(pager.translation(), 0.0);
    }

    #[test]
    fn disabled_gestures_fail_on_move() {
        let mut pager = pager(PagerConfig::default().gestures_disabled(true));
        let mut control = FailFlag::default();
        pager.on_begin(0.0, 0.0);
        pager.on_touches_move(&[TouchPoint::new(0, -40.0, 0.0)], &mut control);
        assert!(control.is_failed());
        pager.on_update(GestureUpdate {
            translation_x: -40.0,
            ..Default::default()
        });
        assert_eq!(pager.translation(), 0.0);
        assert!(!pager.context().registry().is_active(pager.id()));
    }

    #[test]
    fn set_page_before_layout_commits_directly() {
        let mut pager = Pager::builder(PagerConfig::default())
            .render_page(|props| props.index)
            .build(&PagerContext::root())
            .unwrap();
        pager.set_page(4, SetPageOptions::ANIMATED);
        assert_eq!(pager.current_page(), 4);
        assert!(pager.is_idle());

        pager.set_viewport(Viewport::new(200.0, 100.0));
        assert_eq!(pager.translation(), -800.0);
    }

    #[test]
    fn animated_set_page_springs_and_commits() {
        let mut pager = pager(PagerConfig::default());
        pager.set_page(2, SetPageOptions::ANIMATED);
        assert_eq!(pager.phase(), GesturePhase::Settling);
        assert_eq!(pager.target_page(), 2);
        settle(&mut pager);
        assert_eq!(pager.current_page(), 2);
        assert_eq!(pager.translation(), -600.0);
    }

    #[test]
    fn increment_while_animating_stacks_on_target() {
        let mut pager = pager(PagerConfig::default());
        pager.increment_page(SetPageOptions::ANIMATED);
        pager.frame(FRAME);
        pager.increment_page(SetPageOptions::ANIMATED);
        assert_eq!(pager.target_page(), 2);
        settle(&mut pager);
        assert_eq!(pager.current_page(), 2);
    }

    #[test]
    fn viewport_change_at_rest_reanchors() {
        let mut pager = pager(PagerConfig::default().initial_index(2));
        pager.set_viewport(Viewport::new(400.0, 500.0));
        assert_eq!(pager.translation(), -800.0);
        assert_eq!(pager.current_page(), 2);
    }

    #[test]
    fn viewport_change_mid_drag_rescales() {
        let mut pager = pager(PagerConfig::default());
        drag(&mut pager, -150.0);
        pager.set_viewport(Viewport::new(600.0, 500.0));
        assert_eq!(pager.translation(), -300.0);
        assert!((pager.page_position() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_viewport_is_stored_without_motion() {
        let mut pager = pager(PagerConfig::default().initial_index(1));
        pager.set_viewport(Viewport::ZERO);
        assert_eq!(pager.viewport(), Viewport::ZERO);
        assert_eq!(pager.translation(), -300.0);
        assert_eq!(pager.page_position(), 1.0);
        drag(&mut pager, -90.0);
        assert_eq!(pager.translation(), -300.0);
    }

    #[test]
    fn recognizers_list_own_then_external() {
        let pager = Pager::builder(PagerConfig::default())
            .render_page(|_| ())
            .simultaneous_with("scroll")
            .build(&PagerContext::root())
            .unwrap();
        assert_eq!(
            pager.recognizers(),
            vec![
                Recognizer::Pager(pager.id()),
                Recognizer::External("scroll".to_owned())
            ]
        );
    }

    #[test]
    fn drop_unmounts() {
        let ctx = PagerContext::root();
        let pager = Pager::builder(PagerConfig::default())
            .render_page(|_| ())
            .build(&ctx)
            .unwrap();
        let id = pager.id();
        assert!(ctx.registry().is_mounted(id));
        drop(pager);
        assert!(!ctx.registry().is_mounted(id));
        assert_eq!(ctx.registry().mounted_count(), 0);
    }

    #[test]
    fn visible_pages_skip_out_of_bounds_slots() {
        let pager = pager(PagerConfig::default().min_index(0).page_buffer(2));
        let indices: Vec<i64> = pager.visible_pages().map(|props| props.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        let active: Vec<bool> = pager.visible_pages().map(|props| props.is_active).collect();
        assert_eq!(active, vec![true, false, false]);
    }

    #[test]
    fn slide_transform_follows_focus() {
        let mut pager = pager(PagerConfig::default());
        drag(&mut pager, -60.0);
        let next = pager.props_for(1);
        assert!((next.focus - 0.8).abs() < 1e-12);
        assert!((next.transform.translate_x - 240.0).abs() < 1e-9);
    }

    #[test]
    fn props_for_extreme_index_before_layout() {
        let pager = Pager::builder(PagerConfig::default().initial_index(1))
            .render_page(|props| props.index)
            .build(&PagerContext::root())
            .unwrap();
        let props = pager.props_for(i64::MIN);
        assert_eq!(props.focus, i64::MIN as f64);
        assert!(!props.is_active);
    }

    #[test]
    fn shared_position_mirrors_projection() {
        let cell = SharedPagePosition::new(f64::NAN);
        let mut pager = Pager::builder(PagerConfig::default())
            .render_page(|_| ())
            .page_position(cell.clone())
            .build(&PagerContext::root())
            .unwrap();
        assert_eq!(cell.get(), 0.0);
        pager.set_viewport(Viewport::new(300.0, 300.0));
        pager.on_begin(0.0, 0.0);
        pager.on_update(GestureUpdate {
            translation_x: -75.0,
            ..Default::default()
        });
        assert_eq!(cell.get(), 0.25);
    }
}
