//! Shape path library.
//!
//! Every path lives in a 0–100 unit square and is scaled to the layer's
//! width and height at render time. Because that scale is usually
//! non-uniform, stroke widths are multiplied by [`stroke_compensation`] so
//! the stroke reads at the same thickness as on an unscaled shape.

use std::borrow::Cow;
use std::f64::consts::PI;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

/// Side length of the unit space paths are authored in.
pub const UNIT_SIZE: f64 = 100.0;

/// Outer radius of polygons and stars in unit space.
pub const OUTER_RADIUS: f64 = 50.0;

/// Fewest vertices a polygon or star may have.
pub const MIN_POINTS: u32 = 3;

const TRIANGLE: &str = "M50,0 L100,100 L0,100 Z";
const ARROW: &str = "M0,35 L60,35 L60,10 L100,50 L60,90 L60,65 L0,65 Z";
const HEART: &str = "M50,90 C50,90 0,60 0,30 C0,10 15,0 30,0 C40,0 47,5 50,15 C53,5 60,0 70,0 C85,0 100,10 100,30 C100,60 50,90 50,90 Z";
const DIAMOND: &str = "M50,0 L100,50 L50,100 L0,50 Z";
const PARALLELOGRAM: &str = "M25,0 L100,0 L75,100 L0,100 Z";
const TRAPEZOID: &str = "M20,0 L80,0 L100,100 L0,100 Z";

/// The geometric kind of a shape layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Axis-aligned rectangle, optionally with rounded corners.
    Rectangle,
    /// Rectangle created with equal sides.
    Square,
    /// Ellipse inscribed in the layer bounds.
    Ellipse,
    /// Ellipse created with equal sides.
    Circle,
    /// Isosceles triangle.
    Triangle,
    /// Right-pointing block arrow.
    Arrow,
    /// Heart.
    Heart,
    /// Rhombus touching the edge midpoints.
    Diamond,
    /// Right-leaning parallelogram.
    Parallelogram,
    /// Trapezoid with the short side on top.
    Trapezoid,
    /// Regular polygon with a configurable vertex count.
    Polygon,
    /// Star with configurable point count and inner radius.
    Star,
}

impl ShapeKind {
    /// Whether this kind renders as a rectangle primitive.
    #[must_use]
    pub fn is_rectangular(self) -> bool {
        matches!(self, Self::Rectangle | Self::Square)
    }

    /// Whether this kind renders as an ellipse primitive.
    #[must_use]
    pub fn is_elliptical(self) -> bool {
        matches!(self, Self::Ellipse | Self::Circle)
    }

    /// Fixed path for the predefined kinds.
    #[must_use]
    pub fn fixed_path(self) -> Option<&'static str> {
        match self {
            Self::Triangle => Some(TRIANGLE),
            Self::Arrow => Some(ARROW),
            Self::Heart => Some(HEART),
            Self::Diamond => Some(DIAMOND),
            Self::Parallelogram => Some(PARALLELOGRAM),
            Self::Trapezoid => Some(TRAPEZOID),
            _ => None,
        }
    }
}

/// Path for a regular polygon with `points` vertices, starting at the top.
#[must_use]
pub fn polygon_path(points: u32) -> String {
    let n = points.max(MIN_POINTS);
    let step = 2.0 * PI / f64::from(n);
    let vertices = (0..n).map(|i| {
        let angle = f64::from(i) * step - PI / 2.0;
        vertex(OUTER_RADIUS, angle)
    });
    closed_path(vertices)
}

/// Path for a star with `points` tips and the given inner-to-outer ratio.
#[must_use]
pub fn star_path(points: u32, inner_radius_ratio: f64) -> String {
    let n = points.max(MIN_POINTS);
    let inner = OUTER_RADIUS * inner_radius_ratio;
    let step = PI / f64::from(n);
    let vertices = (0..n * 2).map(|i| {
        let radius = if i % 2 == 0 { OUTER_RADIUS } else { inner };
        let angle = f64::from(i) * step - PI / 2.0;
        vertex(radius, angle)
    });
    closed_path(vertices)
}

/// Path for any non-primitive shape kind.
///
/// Returns `None` for rectangles and ellipses, which render as primitives.
#[must_use]
pub fn shape_path(
    kind: ShapeKind,
    points: Option<u32>,
    inner_radius_ratio: Option<f64>,
) -> Option<Cow<'static, str>> {
    match kind {
        ShapeKind::Polygon => Some(Cow::Owned(polygon_path(points.unwrap_or(6)))),
        ShapeKind::Star => Some(Cow::Owned(star_path(
            points.unwrap_or(5),
            inner_radius_ratio.unwrap_or(0.5),
        ))),
        other => other.fixed_path().map(Cow::Borrowed),
    }
}

/// Factor applied to stroke width when a unit-space path is scaled to `width × height`.
#[must_use]
pub fn stroke_compensation(width: f64, height: f64) -> f64 {
    UNIT_SIZE / width.max(height)
}

fn vertex(radius: f64, angle: f64) -> (f64, f64) {
    let center = UNIT_SIZE / 2.0;
    (center + radius * angle.cos(), center + radius * angle.sin())
}

fn closed_path(vertices: impl Iterator<Item = (f64, f64)>) -> String {
    let mut path = String::with_capacity(256);
    for (i, (x, y)) in vertices.enumerate() {
        let cmd = if i == 0 { "M" } else { " L" };
        let _ = write!(path, "{cmd}{x},{y}");
    }
    path.push_str(" Z");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(path: &str) -> Vec<(f64, f64)> {
        path.split_whitespace()
            .filter(|tok| *tok != "Z")
            .map(|tok| {
                let (x, y) = tok[1..].split_once(',').expect("pair");
                (x.parse().expect("x"), y.parse().expect("y"))
            })
            .collect()
    }

    #[test]
    fn test_polygon_starts_at_top() {
        let pts = coords(&polygon_path(4));
        assert_eq!(pts.len(), 4);
        assert!((pts[0].0 - 50.0).abs() < 1e-9);
        assert!(pts[0].1.abs() < 1e-9);
        // second vertex of a square is at the right
        assert!((pts[1].0 - 100.0).abs() < 1e-9);
        assert!((pts[1].1 - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_polygon_clamps_to_three_points() {
        assert_eq!(coords(&polygon_path(1)).len(), 3);
    }

    #[test]
    fn test_star_alternates_radii() {
        let pts = coords(&star_path(5, 0.4));
        assert_eq!(pts.len(), 10);
        for (i, (x, y)) in pts.iter().enumerate() {
            let r = ((x - 50.0).powi(2) + (y - 50.0).powi(2)).sqrt();
            let expected = if i % 2 == 0 { 50.0 } else { 20.0 };
            assert!((r - expected).abs() < 1e-9, "vertex {i} radius {r}");
        }
    }

    #[test]
    fn test_path_is_closed() {
        assert!(polygon_path(6).ends_with(" Z"));
        assert!(star_path(5, 0.5).starts_with('M'));
    }

    #[test]
    fn test_shape_path_primitives_have_none() {
        assert!(shape_path(ShapeKind::Rectangle, None, None).is_none());
        assert!(shape_path(ShapeKind::Circle, None, None).is_none());
        assert_eq!(
            shape_path(ShapeKind::Diamond, None, None).as_deref(),
            Some(DIAMOND)
        );
    }

    #[test]
    fn test_stroke_compensation() {
        assert!((stroke_compensation(200.0, 50.0) - 0.5).abs() < f64::EPSILON);
        assert!((stroke_compensation(100.0, 100.0) - 1.0).abs() < f64::EPSILON);
    }
}
