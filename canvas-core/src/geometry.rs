//! 2D primitives shared by the scene, gestures, and export.

use serde::{Deserialize, Serialize};

/// A point in screen or document space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Bounds {
    /// Create bounds from origin and size.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bounds spanning two arbitrary corner points.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Horizontal midline.
    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Vertical midline.
    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.center_x(), self.center_y())
    }

    /// Smallest bounds containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(x, y, right - x, bottom - y)
    }

    /// Smallest bounds containing every item, or `None` for an empty iterator.
    pub fn union_all(mut iter: impl Iterator<Item = Self>) -> Option<Self> {
        let first = iter.next()?;
        Some(iter.fold(first, |acc, b| acc.union(&b)))
    }

    /// Half-open overlap test: touching edges do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Whether the point lies inside (edges inclusive).
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// The same bounds moved by `(dx, dy)`.
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Rotate the vector `(dx, dy)` by `degrees` (clockwise in y-down space).
#[must_use]
pub fn rotate_vector(dx: f64, dy: f64, degrees: f64) -> (f64, f64) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    (dx * cos - dy * sin, dx * sin + dy * cos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union() {
        let a = Bounds::new(0.0, 0.0, 50.0, 50.0);
        let b = Bounds::new(100.0, 100.0, 50.0, 50.0);
        assert_eq!(a.union(&b), Bounds::new(0.0, 0.0, 150.0, 150.0));
    }

    #[test]
    fn test_intersects_is_half_open() {
        let a = Bounds::new(0.0, 0.0, 50.0, 50.0);
        assert!(a.intersects(&Bounds::new(49.0, 49.0, 10.0, 10.0)));
        assert!(!a.intersects(&Bounds::new(50.0, 0.0, 10.0, 10.0)));
        assert!(!a.intersects(&Bounds::new(0.0, 50.0, 10.0, 10.0)));
    }

    #[test]
    fn test_from_corners_normalizes() {
        let b = Bounds::from_corners(Point::new(70.0, 10.0), Point::new(0.0, 80.0));
        assert_eq!(b, Bounds::new(0.0, 10.0, 70.0, 70.0));
    }

    #[test]
    fn test_rotate_vector_quarter_turn() {
        let (x, y) = rotate_vector(1.0, 0.0, 90.0);
        assert!(x.abs() < 1e-12);
        assert!((y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_union_all_empty() {
        assert!(Bounds::union_all(std::iter::empty()).is_none());
    }
}
