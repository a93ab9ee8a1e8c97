#![forbid(unsafe_code)]

//! Committed page index and the window of slots rendered around it.
//!
//! [`PageCommit`] watches the rounded page projection and commits a new
//! integer page only when that rounded value changes (edge-triggered). A
//! projection hovering around a half page therefore produces one commit per
//! crossing, never one per frame.
//!
//! [`PageWindow`] is the finite range `current - buffer ..= current + buffer`.
//! Slots are identified by their logical index, so a page keeps its slot
//! while the window slides.

use crate::config::PageBounds;
use crate::notify::PageChange;
use crate::projector::nearest_page;

/// Committed page plus the edge detector that drives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCommit {
    current: i64,
    last_rounded: Option<i64>,
    bounds: PageBounds,
}

impl PageCommit {
    /// Start at `initial`, clamped into `bounds`.
    #[must_use]
    pub fn new(initial: i64, bounds: PageBounds) -> Self {
        Self {
            current: bounds.clamp(initial),
            last_rounded: None,
            bounds,
        }
    }

    #[inline]
    #[must_use]
    pub fn current(&self) -> i64 {
        self.current
    }

    #[inline]
    #[must_use]
    pub fn bounds(&self) -> PageBounds {
        self.bounds
    }

    /// Feed the latest page projection.
    ///
    /// Returns a change only when the rounded projection differs from the
    /// last observed one and its clamped value differs from the current page.
    pub fn observe(&mut self, projection: f64) -> Option<PageChange> {
        if !projection.is_finite() {
            return None;
        }
        let rounded = nearest_page(projection);
        if self.last_rounded == Some(rounded) {
            return None;
        }
        self.last_rounded = Some(rounded);
        self.commit(self.bounds.clamp(rounded))
    }

    /// Commit `index` directly, as a programmatic jump does.
    ///
    /// The edge detector is re-seeded so the next matching projection does
    /// not fire again.
    pub fn force(&mut self, index: i64) -> Option<PageChange> {
        let index = self.bounds.clamp(index);
        self.last_rounded = Some(index);
        self.commit(index)
    }

    fn commit(&mut self, page: i64) -> Option<PageChange> {
        if page == self.current {
            return None;
        }
        let change = PageChange {
            page,
            previous: self.current,
        };
        self.current = page;
        Some(change)
    }
}

/// One slot of the render window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowSlot {
    pub index: i64,
    /// Slot lies inside the pager's bounds and should render content.
    pub in_bounds: bool,
}

/// Indices rendered around the committed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    center: i64,
    buffer: usize,
    bounds: PageBounds,
}

impl PageWindow {
    #[must_use]
    pub fn new(center: i64, buffer: usize, bounds: PageBounds) -> Self {
        Self {
            center,
            buffer,
            bounds,
        }
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> i64 {
        self.center
    }

    /// Number of slots: `2 * buffer + 1`, fewer where the window meets the
    /// ends of the `i64` range.
    #[must_use]
    pub fn len(&self) -> usize {
        let span = self.last().abs_diff(self.first());
        usize::try_from(span).map_or(usize::MAX, |span| span.saturating_add(1))
    }

    /// Always `false`; a window holds at least its center slot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Lowest index in the window.
    #[must_use]
    pub fn first(&self) -> i64 {
        self.center.saturating_sub(self.buffer_i64())
    }

    /// Highest index in the window.
    #[must_use]
    pub fn last(&self) -> i64 {
        self.center.saturating_add(self.buffer_i64())
    }

    #[must_use]
    pub fn contains(&self, index: i64) -> bool {
        (self.first()..=self.last()).contains(&index)
    }

    /// Slots in ascending index order.
    pub fn slots(&self) -> impl Iterator<Item = WindowSlot> + use<> {
        let bounds = self.bounds;
        (self.first()..=self.last()).map(move |index| WindowSlot {
            index,
            in_bounds: bounds.contains(index),
        })
    }

    /// Indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = i64> + use<> {
        self.first()..=self.last()
    }

    fn buffer_i64(&self) -> i64 {
        i64::try_from(self.buffer).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_TO_FOUR: PageBounds = PageBounds {
        min: Some(0),
        max: Some(4),
    };

    #[test]
    fn commit_is_edge_triggered() {
        let mut commit = PageCommit::new(0, PageBounds::UNBOUNDED);
        let fired: Vec<PageChange> = [0.5, 0.6, 0.4, 0.5, 0.6]
            .into_iter()
            .filter_map(|p| commit.observe(p))
            .collect();
        assert_eq!(
            fired,
            vec![
                PageChange { page: 1, previous: 0 },
                PageChange { page: 0, previous: 1 },
                PageChange { page: 1, previous: 0 },
            ]
        );
    }

    #[test]
    fn repeated_projection_fires_once() {
        let mut commit = PageCommit::new(0, PageBounds::UNBOUNDED);
        assert!(commit.observe(2.2).is_some());
        for _ in 0..10 {
            assert!(commit.observe(2.1).is_none());
        }
        assert_eq!(commit.current(), 2);
    }

    #[test]
    fn commit_is_clamped_to_bounds() {
        let mut commit = PageCommit::new(0, ZERO_TO_FOUR);
        assert_eq!(commit.observe(-0.7), None);
        assert_eq!(commit.current(), 0);
        assert_eq!(
            commit.observe(6.0),
            Some(PageChange { page: 4, previous: 0 })
        );
        assert_eq!(commit.observe(5.0), None);
        assert_eq!(commit.current(), 4);
    }

    #[test]
    fn initial_page_is_clamped() {
        assert_eq!(PageCommit::new(9, ZERO_TO_FOUR).current(), 4);
        assert_eq!(PageCommit::new(-9, ZERO_TO_FOUR).current(), 0);
    }

    #[test]
    fn force_reseeds_edge_detector() {
        let mut commit = PageCommit::new(0, PageBounds::UNBOUNDED);
        assert_eq!(
            commit.force(3),
            Some(PageChange { page: 3, previous: 0 })
        );
        assert_eq!(commit.observe(3.0), None);
        assert_eq!(commit.force(3), None);
    }

    #[test]
    fn non_finite_projection_is_ignored() {
        let mut commit = PageCommit::new(1, PageBounds::UNBOUNDED);
        assert_eq!(commit.observe(f64::NAN), None);
        assert_eq!(commit.observe(f64::INFINITY), None);
        assert_eq!(commit.current(), 1);
    }

    #[test]
    fn window_spans_buffer_on_each_side() {
        let window = PageWindow::new(5, 2, PageBounds::UNBOUNDED);
        assert_eq!(window.len(), 5);
        assert_eq!(window.indices().collect::<Vec<_>>(), vec![3, 4, 5, 6, 7]);
        assert!(window.contains(7));
        assert!(!window.contains(8));
    }

    #[test]
    fn out_of_bounds_slots_are_flagged() {
        let window = PageWindow::new(0, 1, ZERO_TO_FOUR);
        let slots: Vec<WindowSlot> = window.slots().collect();
        assert_eq!(
            slots,
            vec![
                WindowSlot { index: -1, in_bounds: false },
                WindowSlot { index: 0, in_bounds: true },
                WindowSlot { index: 1, in_bounds: true },
            ]
        );
    }

    #[test]
    fn zero_buffer_renders_single_slot() {
        let window = PageWindow::new(-3, 0, PageBounds::UNBOUNDED);
        assert_eq!(window.indices().collect::<Vec<_>>(), vec![-3]);
    }

    #[test]
    fn window_saturates_at_extreme_indices() {
        let window = PageWindow::new(i64::MAX, 1, PageBounds::UNBOUNDED);
        assert_eq!(window.last(), i64::MAX);
        assert_eq!(window.indices().count(), 2);
        assert_eq!(window.len(), 2);

        let window = PageWindow::new(i64::MIN + 1, 3, PageBounds::UNBOUNDED);
        assert_eq!(window.first(), i64::MIN);
        assert_eq!(window.len(), window.slots().count());
        assert_eq!(window.len(), 5);
    }
}
