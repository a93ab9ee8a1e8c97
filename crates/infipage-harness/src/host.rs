//! A headless host: mounts a pager tree, lays it out, routes touches and
//! drives frames on a simulated clock.

use std::time::Duration;

use infipage_core::{
    FailFlag, GestureEnd, GestureUpdate, PageChangeFeed, Pager, PagerContext, SetPageOptions,
    TouchPoint, Viewport,
};

use crate::error::{HarnessError, Result};
use crate::scenario::{PagerSpec, Swipe, TreeChange};
use crate::touch::VelocityTracker1D;
use crate::trace::{PagerSnapshot, Trace, TraceEvent, VisibleSlot};

/// Pages render to a short label such as `feed#3`.
pub type PageLabel = String;

struct HostedPager {
    name: String,
    parent: Option<String>,
    pager: Pager<PageLabel>,
    feed: PageChangeFeed,
}

pub struct Host {
    viewport: Viewport,
    pagers: Vec<HostedPager>,
    clock_ms: f64,
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("viewport", &self.viewport)
            .field("pagers", &self.names())
            .field("clock_ms", &self.clock_ms)
            .finish()
    }
}

impl Host {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            pagers: Vec::new(),
            clock_ms: 0.0,
        }
    }

    #[must_use]
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    /// Mounted pager names in mount order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.pagers.iter().map(|hosted| hosted.name.clone()).collect()
    }

    pub fn pager(&self, name: &str) -> Result<&Pager<PageLabel>> {
        self.slot(name).map(|slot| &self.pagers[slot].pager)
    }

    pub fn pager_mut(&mut self, name: &str) -> Result<&mut Pager<PageLabel>> {
        let slot = self.slot(name)?;
        Ok(&mut self.pagers[slot].pager)
    }

    fn slot(&self, name: &str) -> Result<usize> {
        self.pagers
            .iter()
            .position(|hosted| hosted.name == name)
            .ok_or_else(|| HarnessError::unknown_pager(name))
    }

    // ---------------------------------------------------------------------
    // Tree
    // ---------------------------------------------------------------------

    pub fn mount(&mut self, spec: &PagerSpec, trace: &mut Trace) -> Result<()> {
        if self.slot(&spec.name).is_ok() {
            return Err(HarnessError::invalid(format!(
                "pager `{}` is already mounted",
                spec.name
            )));
        }
        let ctx = match &spec.parent {
            Some(parent) => self.pager(parent)?.context().child(),
            None => PagerContext::root(),
        };

        let label = spec.name.clone();
        let mut config = spec.config.clone();
        if config.debug_tag.is_none() {
            config.debug_tag = Some(spec.name.clone());
        }
        let mut pager = Pager::builder(config)
            .render_page(move |props| format!("{label}#{}", props.index))
            .build(&ctx)?;
        let feed = pager
            .take_page_change_feed()
            .ok_or_else(|| HarnessError::invalid("page change feed already taken"))?;
        pager.set_viewport(spec.viewport.unwrap_or(self.viewport));

        trace.record(TraceEvent::Mounted {
            pager: spec.name.clone(),
            id: pager.id().to_string(),
            depth: pager.depth(),
        })?;
        self.pagers.push(HostedPager {
            name: spec.name.clone(),
            parent: spec.parent.clone(),
            pager,
            feed,
        });
        Ok(())
    }

    /// Unmount `name` and everything nested inside it, innermost first.
    pub fn unmount(&mut self, name: &str, trace: &mut Trace) -> Result<()> {
        self.slot(name)?;
        let mut doomed = vec![name.to_string()];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let parent = doomed[cursor].clone();
            doomed.extend(
                self.pagers
                    .iter()
                    .filter(|hosted| hosted.parent.as_deref() == Some(parent.as_str()))
                    .map(|hosted| hosted.name.clone()),
            );
            cursor += 1;
        }
        for name in doomed.iter().rev() {
            let slot = self.slot(name)?;
            drop(self.pagers.remove(slot));
            trace.record(TraceEvent::Unmounted {
                pager: name.clone(),
            })?;
        }
        Ok(())
    }

    /// Root-to-leaf slots of the pagers under a touch that lands on
    /// `through`, or on the deepest mounted pager.
    fn chain(&self, through: Option<&str>) -> Result<Vec<usize>> {
        let leaf = match through {
            Some(name) => self.slot(name)?,
            None => self
                .pagers
                .iter()
                .enumerate()
                .max_by_key(|(slot, hosted)| (hosted.pager.depth(), std::cmp::Reverse(*slot)))
                .map(|(slot, _)| slot)
                .ok_or_else(|| HarnessError::invalid("swipe with no mounted pagers"))?,
        };
        let mut chain = vec![leaf];
        let mut cursor = leaf;
        while let Some(parent) = self.pagers[cursor].parent.as_deref() {
            cursor = self.slot(parent)?;
            chain.push(cursor);
        }
        chain.reverse();
        Ok(chain)
    }

    // ---------------------------------------------------------------------
    // Layout and control
    // ---------------------------------------------------------------------

    pub fn layout(&mut self, name: Option<&str>, viewport: Viewport) -> Result<()> {
        match name {
            Some(name) => self.pager_mut(name)?.set_viewport(viewport),
            None => {
                self.viewport = viewport;
                for hosted in &mut self.pagers {
                    hosted.pager.set_viewport(viewport);
                }
            }
        }
        Ok(())
    }

    pub fn set_page(&mut self, name: &str, index: i64, animated: bool) -> Result<()> {
        self.pager_mut(name)?.set_page(index, SetPageOptions { animated });
        Ok(())
    }

    pub fn increment(&mut self, name: &str, animated: bool) -> Result<()> {
        self.pager_mut(name)?.increment_page(SetPageOptions { animated });
        Ok(())
    }

    pub fn decrement(&mut self, name: &str, animated: bool) -> Result<()> {
        self.pager_mut(name)?.decrement_page(SetPageOptions { animated });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Clock
    // ---------------------------------------------------------------------

    /// Advance every pager by one frame of `dt_ms`. Returns `true` while any
    /// pager still needs frames.
    pub fn frame(&mut self, dt_ms: f64, trace: &mut Trace) -> Result<bool> {
        self.clock_ms += dt_ms;
        let dt = Duration::from_secs_f64(dt_ms.max(0.0) / 1000.0);
        let mut busy = false;
        for hosted in &mut self.pagers {
            busy |= hosted.pager.frame(dt);
        }
        self.drain_changes(trace)?;
        Ok(busy)
    }

    /// Frame until every pager is idle; returns the frames spent.
    pub fn settle(&mut self, dt_ms: f64, max_frames: u32, trace: &mut Trace) -> Result<u32> {
        let mut frames = 0;
        while frames < max_frames && !self.is_idle() {
            self.frame(dt_ms, trace)?;
            frames += 1;
        }
        Ok(frames)
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pagers.iter().all(|hosted| hosted.pager.is_idle())
    }

    /// Move queued page changes into the trace.
    pub fn drain_changes(&mut self, trace: &mut Trace) -> Result<()> {
        for hosted in &self.pagers {
            for change in hosted.feed.try_iter() {
                trace.record(TraceEvent::PageChange {
                    pager: hosted.name.clone(),
                    page: change.page,
                    previous: change.previous,
                    t_ms: self.clock_ms,
                })?;
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Touch routing
    // ---------------------------------------------------------------------

    /// Deliver a swipe to every pager under the touch, innermost first, as a
    /// platform with simultaneous recognition would.
    ///
    /// Tree changes listed in `swipe.during` happen while the finger is
    /// down; pagers unmounted that way simply stop receiving the gesture.
    pub fn swipe(&mut self, swipe: &Swipe, frame_ms: f64, trace: &mut Trace) -> Result<()> {
        // Innermost first.
        let chain: Vec<String> = self
            .chain(swipe.through.as_deref())?
            .into_iter()
            .rev()
            .map(|slot| self.pagers[slot].name.clone())
            .collect();
        let [x0, y0] = swipe.from;
        let started = self.clock_ms;
        let mut tracker_x = VelocityTracker1D::new();
        let mut tracker_y = VelocityTracker1D::new();
        tracker_x.add_data_point(0.0, x0);
        tracker_y.add_data_point(0.0, y0);

        let mut changes = swipe.during.clone();
        changes.sort_by_key(|change| change.at_ms);
        let mut changes = changes.into_iter().peekable();

        for name in &chain {
            self.pager_mut(name)?.on_begin(x0, y0);
        }
        let mut failed = vec![false; chain.len()];
        let (mut dx, mut dy) = (0.0, 0.0);
        for sample in swipe.move_events() {
            while let Some(change) =
                changes.next_if(|change| change.at_ms as f64 <= sample.at_ms)
            {
                self.apply_change(&change, trace)?;
            }
            self.advance_to(started + sample.at_ms, frame_ms, trace)?;
            tracker_x.add_data_point(sample.at_ms, sample.x);
            tracker_y.add_data_point(sample.at_ms, sample.y);
            (dx, dy) = (sample.x - x0, sample.y - y0);
            let touches = [TouchPoint::new(0, sample.x, sample.y)];
            let update = GestureUpdate {
                translation_x: dx,
                translation_y: dy,
                velocity_x: tracker_x.calculate_velocity(),
                velocity_y: tracker_y.calculate_velocity(),
            };

            for (position, name) in chain.iter().enumerate() {
                let Ok(slot) = self.slot(name) else {
                    continue;
                };
                let mut control = FailFlag::default();
                self.pagers[slot].pager.on_touches_move(&touches, &mut control);
                if control.is_failed() && !failed[position] {
                    failed[position] = true;
                    trace.record(TraceEvent::GestureFailed {
                        pager: name.clone(),
                        t_ms: self.clock_ms,
                    })?;
                }
            }
            for (position, name) in chain.iter().enumerate() {
                if failed[position] {
                    continue;
                }
                if let Ok(slot) = self.slot(name) {
                    self.pagers[slot].pager.on_update(update);
                }
            }
            self.drain_changes(trace)?;
        }
        for change in changes {
            self.apply_change(&change, trace)?;
        }

        let end = GestureEnd {
            velocity_x: tracker_x.calculate_velocity(),
            velocity_y: tracker_y.calculate_velocity(),
            translation_x: dx,
            translation_y: dy,
        };
        trace.record(TraceEvent::Release {
            velocity_x: end.velocity_x,
            velocity_y: end.velocity_y,
            t_ms: self.clock_ms,
        })?;
        let live: Vec<usize> = chain
            .iter()
            .filter_map(|name| self.slot(name).ok())
            .collect();
        for &slot in &live {
            self.pagers[slot].pager.on_end(end);
        }
        for &slot in &live {
            self.pagers[slot].pager.on_finalize();
        }
        self.drain_changes(trace)
    }

    fn apply_change(&mut self, change: &TreeChange, trace: &mut Trace) -> Result<()> {
        if let Some(spec) = &change.mount {
            self.mount(spec, trace)?;
        }
        if let Some(name) = &change.unmount {
            self.unmount(name, trace)?;
        }
        Ok(())
    }

    /// Run whole frames until the clock reaches `deadline_ms`.
    fn advance_to(&mut self, deadline_ms: f64, frame_ms: f64, trace: &mut Trace) -> Result<()> {
        while frame_ms > 0.0 && self.clock_ms + frame_ms <= deadline_ms {
            self.frame(frame_ms, trace)?;
        }
        let remainder = deadline_ms - self.clock_ms;
        if remainder > 0.0 {
            self.frame(remainder, trace)?;
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Observation
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn snapshot(&self) -> Vec<PagerSnapshot> {
        self.pagers
            .iter()
            .map(|hosted| {
                let pager = &hosted.pager;
                PagerSnapshot {
                    name: hosted.name.clone(),
                    page: pager.current_page(),
                    target: pager.target_page(),
                    translation: pager.translation(),
                    position: pager.page_position(),
                    phase: pager.phase(),
                    locked: pager.is_locked(),
                    visible: pager
                        .render()
                        .map(|page| VisibleSlot {
                            label: page.view,
                            focus: page.props.focus,
                            active: page.props.is_active,
                        })
                        .collect(),
                }
            })
            .collect()
    }
}
