#![forbid(unsafe_code)]

//! Geometric primitives: paging axis and viewport size.

/// Axis along which a pager moves between pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Component of `(x, y)` along the paging axis.
    #[inline]
    pub const fn primary(self, x: f64, y: f64) -> f64 {
        match self {
            Self::Horizontal => x,
            Self::Vertical => y,
        }
    }

    /// Component of `(x, y)` across the paging axis.
    #[inline]
    pub const fn cross(self, x: f64, y: f64) -> f64 {
        match self {
            Self::Horizontal => y,
            Self::Vertical => x,
        }
    }

    /// Short label used in identifiers and logs (`h` / `v`).
    #[inline]
    pub const fn label(self) -> char {
        match self {
            Self::Horizontal => 'h',
            Self::Vertical => 'v',
        }
    }

    #[inline]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Vertical)
    }
}

/// Size of a pager's viewport in device-independent pixels.
///
/// `Viewport::ZERO` is the valid-but-uninitialized state before the first
/// layout pass. Values are stored as delivered by the layout provider; no
/// validation is performed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// The uninitialized viewport.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Extent along the paging axis (the page size).
    #[inline]
    pub const fn page_size(&self, orientation: Orientation) -> f64 {
        orientation.primary(self.width, self.height)
    }

    /// Extent across the paging axis.
    #[inline]
    pub const fn cross_size(&self, orientation: Orientation) -> f64 {
        orientation.cross(self.width, self.height)
    }

    /// Whether the paging axis has a usable (strictly positive) size.
    #[inline]
    pub fn has_page_size(&self, orientation: Orientation) -> bool {
        self.page_size(orientation) > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_follows_orientation() {
        let viewport = Viewport::new(300.0, 600.0);
        assert_eq!(viewport.page_size(Orientation::Horizontal), 300.0);
        assert_eq!(viewport.page_size(Orientation::Vertical), 600.0);
        assert_eq!(viewport.cross_size(Orientation::Horizontal), 600.0);
    }

    #[test]
    fn zero_viewport_has_no_page_size() {
        assert!(!Viewport::ZERO.has_page_size(Orientation::Horizontal));
        assert!(!Viewport::new(0.0, 500.0).has_page_size(Orientation::Horizontal));
        assert!(Viewport::new(0.0, 500.0).has_page_size(Orientation::Vertical));
    }

    #[test]
    fn nan_page_size_is_unusable() {
        assert!(!Viewport::new(f64::NAN, 1.0).has_page_size(Orientation::Horizontal));
    }
}
