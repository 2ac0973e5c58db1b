//! View transform: zoom and pan. Never part of document history.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Display transform from document space to screen space.
///
/// `screen = document * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Scale factor (1.0 = 100%).
    pub zoom: f64,
    /// Horizontal pan offset in screen pixels.
    pub pan_x: f64,
    /// Vertical pan offset in screen pixels.
    pub pan_y: f64,
    /// Whether a pan gesture is in progress.
    #[serde(skip)]
    pub panning: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            panning: false,
        }
    }
}

impl Viewport {
    /// Convert a screen point to document coordinates.
    #[must_use]
    pub fn screen_to_document(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan_x) / self.zoom,
            (screen.y - self.pan_y) / self.zoom,
        )
    }

    /// Convert a document point to screen coordinates.
    #[must_use]
    pub fn document_to_screen(&self, doc: Point) -> Point {
        Point::new(doc.x * self.zoom + self.pan_x, doc.y * self.zoom + self.pan_y)
    }

    /// Shift the view by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Multiply zoom by `factor`, keeping the document point under `anchor` fixed.
    pub fn zoom_at(&mut self, factor: f64, anchor: Point, min_zoom: f64, max_zoom: f64) {
        let before = self.screen_to_document(anchor);
        self.zoom = (self.zoom * factor).clamp(min_zoom, max_zoom);
        self.pan_x = anchor.x - before.x * self.zoom;
        self.pan_y = anchor.y - before.y * self.zoom;
    }
}
