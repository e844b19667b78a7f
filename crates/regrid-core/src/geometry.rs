#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! All coordinates are `f64` CSS-style pixels. [`Bounds`] rectangles live in a
//! single fixed "page" coordinate space so that rectangles measured for
//! different grids can be compared directly.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A point (or displacement) in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate by `(dx, dy)`.
    #[inline]
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Euclidean length when the point is read as a displacement.
    #[inline]
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl Add for Point {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// A measured rectangle in page coordinates.
///
/// Carries all six edge/size fields, matching what a layout engine reports
/// for an element's bounding box. Construct through [`Bounds::new`] or
/// [`Bounds::from_edges`] to keep the fields consistent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Unmeasured bounds: everything zero.
    pub const EMPTY: Self = Self {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Create bounds from an origin and a size.
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
            width,
            height,
        }
    }

    /// Create bounds from the four edges.
    #[must_use]
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Top-left corner.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Check if the rectangle has zero area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point lies strictly inside the rectangle.
    ///
    /// Points on any edge are outside, so two grids that share an edge never
    /// both claim a point on it.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x > self.left && point.x < self.right && point.y > self.top && point.y < self.bottom
    }

    /// Convert a point relative to this rectangle's origin into page space.
    #[inline]
    #[must_use]
    pub fn to_page(&self, relative: Point) -> Point {
        relative + self.origin()
    }

    /// Convert a page-space point into this rectangle's frame.
    #[inline]
    #[must_use]
    pub fn to_local(&self, page: Point) -> Point {
        page - self.origin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_derives_edges() {
        let b = Bounds::new(10.0, 20.0, 300.0, 400.0);
        assert_eq!(b.right, 310.0);
        assert_eq!(b.bottom, 420.0);
        assert_eq!(Bounds::from_edges(10.0, 20.0, 310.0, 420.0), b);
    }

    #[test]
    fn contains_is_strict_on_every_edge() {
        let b = Bounds::new(0.0, 0.0, 100.0, 50.0);
        assert!(b.contains(Point::new(50.0, 25.0)));
        assert!(!b.contains(Point::new(0.0, 25.0)));
        assert!(!b.contains(Point::new(100.0, 25.0)));
        assert!(!b.contains(Point::new(50.0, 0.0)));
        assert!(!b.contains(Point::new(50.0, 50.0)));
    }

    #[test]
    fn empty_bounds_contain_nothing() {
        assert!(Bounds::EMPTY.is_empty());
        assert!(!Bounds::EMPTY.contains(Point::ZERO));
    }

    #[test]
    fn page_and_local_are_inverse() {
        let b = Bounds::new(40.0, 60.0, 200.0, 200.0);
        let local = Point::new(12.5, 7.0);
        let page = b.to_page(local);
        assert_eq!(page, Point::new(52.5, 67.0));
        assert_eq!(b.to_local(page), local);
    }

    #[test]
    fn point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::from((3.0, 5.0));
        assert_eq!(a + b, Point::new(4.0, 7.0));
        assert_eq!(b - a, Point::new(2.0, 3.0));
        assert_eq!(a.offset(-1.0, 1.0), Point::new(0.0, 3.0));
        assert_eq!(Point::new(3.0, 4.0).length(), 5.0);
    }

    #[test]
    fn bounds_serialize_all_fields() {
        let json = serde_json::to_value(Bounds::new(1.0, 2.0, 3.0, 4.0)).expect("serialize");
        assert_eq!(json["right"], 4.0);
        assert_eq!(json["bottom"], 6.0);
    }
}
