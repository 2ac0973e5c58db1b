//! Linear undo/redo over document snapshots.
//!
//! `present` is always the last committed document state. Committing pushes
//! the old present onto `past` and clears `future`; undo and redo move the
//! present between the two lists. Layers are shared through an [`Arc`], so
//! a snapshot costs one reference count and unchanged layer lists are never
//! copied.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::layer::{Layer, LayerId};
use crate::scene::CanvasProperties;

/// Undo-relevant document state. View state (zoom, pan) is not part of it.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSnapshot {
    /// Layers, back to front.
    pub layers: Arc<Vec<Layer>>,
    /// Selected top-level layer ids.
    pub selection: Vec<LayerId>,
    /// Canvas size, background, and name.
    pub canvas: CanvasProperties,
    /// Fonts offered to text layers.
    pub custom_fonts: Vec<String>,
    /// User swatches.
    pub saved_colors: Vec<String>,
    /// Brand swatches.
    pub brand_colors: Vec<String>,
}

impl SceneSnapshot {
    /// Structural equality with a pointer fast path for shared layer lists.
    #[must_use]
    pub fn same_state(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.layers, &other.layers) || self.layers == other.layers)
            && self.selection == other.selection
            && self.canvas == other.canvas
            && self.custom_fonts == other.custom_fonts
            && self.saved_colors == other.saved_colors
            && self.brand_colors == other.brand_colors
    }
}

/// Snapshot history with a bounded past.
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<SceneSnapshot>,
    present: SceneSnapshot,
    future: Vec<SceneSnapshot>,
    limit: usize,
}

impl History {
    /// Start a history whose present is `initial`.
    #[must_use]
    pub fn new(initial: SceneSnapshot, limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial,
            future: Vec::new(),
            limit,
        }
    }

    /// Commit `snapshot` as the new present.
    ///
    /// Returns `false` without changing anything when `snapshot` equals the
    /// current present.
    pub fn record(&mut self, snapshot: SceneSnapshot) -> bool {
        if snapshot.same_state(&self.present) {
            return false;
        }
        let previous = std::mem::replace(&mut self.present, snapshot);
        self.past.push_back(previous);
        if self.past.len() > self.limit {
            self.past.pop_front();
        }
        self.future.clear();
        true
    }

    /// Step back. Returns the state to restore, or `None` if there is no past.
    pub fn undo(&mut self) -> Option<&SceneSnapshot> {
        let previous = self.past.pop_back()?;
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push(current);
        Some(&self.present)
    }

    /// Step forward. Returns the state to restore, or `None` if there is no future.
    pub fn redo(&mut self) -> Option<&SceneSnapshot> {
        let next = self.future.pop()?;
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        Some(&self.present)
    }

    /// Drop all past and future states and make `snapshot` the present.
    pub fn reset(&mut self, snapshot: SceneSnapshot) {
        self.past.clear();
        self.future.clear();
        self.present = snapshot;
    }

    /// The last committed state.
    #[must_use]
    pub fn present(&self) -> &SceneSnapshot {
        &self.present
    }

    /// Whether [`History::undo`] would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether [`History::redo`] would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of undoable steps.
    #[must_use]
    pub fn past_len(&self) -> usize {
        self.past.len()
    }
}
