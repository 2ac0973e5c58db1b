//! Snap-to-guide alignment.
//!
//! Targets are kept in ordered lists, never sets: canvas lines first, then
//! each sibling's start, center, and end in document order. The first
//! target within the threshold wins for an axis.

use serde::{Deserialize, Serialize};

use crate::geometry::Bounds;
use crate::layer::{Layer, LayerId};
use crate::scene::CanvasProperties;

/// Orientation of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// A vertical line at some x.
    Vertical,
    /// A horizontal line at some y.
    Horizontal,
}

/// A guide line to draw while a snap is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    /// Orientation.
    pub axis: Axis,
    /// Document coordinate of the line.
    pub position: f64,
}

/// Ordered snap candidates for both axes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapTargets {
    /// Candidate x positions.
    pub vertical: Vec<f64>,
    /// Candidate y positions.
    pub horizontal: Vec<f64>,
}

impl SnapTargets {
    /// Canvas edges and midlines, then every top-level layer not in `exclude`.
    #[must_use]
    pub fn collect(canvas: &CanvasProperties, layers: &[Layer], exclude: &[LayerId]) -> Self {
        let mut vertical = vec![0.0, canvas.width / 2.0, canvas.width];
        let mut horizontal = vec![0.0, canvas.height / 2.0, canvas.height];
        for layer in layers.iter().filter(|l| !exclude.contains(&l.id)) {
            let b = layer.bounds();
            vertical.extend([b.x, b.center_x(), b.right()]);
            horizontal.extend([b.y, b.center_y(), b.bottom()]);
        }
        Self {
            vertical,
            horizontal,
        }
    }
}

/// Result of snapping a moving box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snap {
    /// Correction to add to the x delta.
    pub dx: f64,
    /// Correction to add to the y delta.
    pub dy: f64,
    /// Guides for the axes that snapped.
    pub guides: Vec<Guide>,
}

/// Snap a span `[start, start + size]` on one axis.
///
/// Tests the span's start, end, and center against each target in order and
/// returns `(correction, target)` for the first hit.
#[must_use]
pub fn snap_axis(start: f64, size: f64, targets: &[f64], threshold: f64) -> Option<(f64, f64)> {
    let edges = [start, start + size, start + size / 2.0];
    targets.iter().find_map(|&target| {
        edges
            .iter()
            .find(|&&edge| (edge - target).abs() <= threshold)
            .map(|&edge| (target - edge, target))
    })
}

/// Snap a single coordinate, returning the target it lands on.
#[must_use]
pub fn snap_value(value: f64, targets: &[f64], threshold: f64) -> Option<f64> {
    targets
        .iter()
        .copied()
        .find(|target| (value - target).abs() <= threshold)
}

/// Snap a moving box on both axes independently.
#[must_use]
pub fn snap_bounds(bounds: &Bounds, targets: &SnapTargets, threshold: f64) -> Snap {
    let mut snap = Snap::default();
    if let Some((dx, x)) = snap_axis(bounds.x, bounds.width, &targets.vertical, threshold) {
        snap.dx = dx;
        snap.guides.push(Guide {
            axis: Axis::Vertical,
            position: x,
        });
    }
    if let Some((dy, y)) = snap_axis(bounds.y, bounds.height, &targets.horizontal, threshold) {
        snap.dy = dy;
        snap.guides.push(Guide {
            axis: Axis::Horizontal,
            position: y,
        });
    }
    snap
}
