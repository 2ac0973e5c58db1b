//! Canonical persisted representation of a design.
//!
//! A [`DesignDocument`] is exactly the undo-relevant document state: no
//! selection, clipboard, zoom, or pan.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::layer::Layer;
use crate::scene::{layer_depth, CanvasProperties};
use crate::{CanvasError, CanvasResult};

/// A design as stored by a design store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignDocument {
    /// Canvas size, background, and name.
    pub canvas: CanvasProperties,
    /// Layers, back to front.
    pub layers: Vec<Layer>,
    /// Fonts offered to text layers.
    #[serde(default)]
    pub custom_fonts: Vec<String>,
    /// User swatches.
    #[serde(default)]
    pub saved_colors: Vec<String>,
    /// Brand swatches.
    #[serde(default)]
    pub brand_colors: Vec<String>,
    /// Last save time in milliseconds since the Unix epoch.
    #[serde(default)]
    pub updated_at: u64,
}

impl Default for DesignDocument {
    fn default() -> Self {
        Self {
            canvas: CanvasProperties::default(),
            layers: Vec::new(),
            custom_fonts: Vec::new(),
            saved_colors: Vec::new(),
            brand_colors: Vec::new(),
            updated_at: 0,
        }
    }
}

impl DesignDocument {
    /// Parse a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a layer's `type` does not
    /// match its properties.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check structural invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidDocument`] for a non-positive canvas,
    /// duplicate layer ids anywhere in the tree, groups nested deeper than
    /// `max_group_depth`, or a layer with non-finite geometry or a side
    /// shorter than `min_layer_size`.
    pub fn validate(&self, config: &EditorConfig) -> CanvasResult<()> {
        let canvas = &self.canvas;
        if !(canvas.width > 0.0 && canvas.height > 0.0) {
            return Err(CanvasError::InvalidDocument(format!(
                "canvas size {}x{} is not positive",
                canvas.width, canvas.height
            )));
        }
        let mut seen = HashSet::new();
        for layer in &self.layers {
            if layer_depth(layer) > config.max_group_depth {
                return Err(CanvasError::InvalidDocument(format!(
                    "layer {} nests groups deeper than {}",
                    layer.id, config.max_group_depth
                )));
            }
            check_geometry(layer, config.min_layer_size)?;
            for id in layer.all_ids() {
                if !seen.insert(id) {
                    return Err(CanvasError::InvalidDocument(format!("duplicate layer id {id}")));
                }
            }
        }
        Ok(())
    }

    /// Number of layers at every depth.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.iter().map(|l| l.all_ids().len()).sum()
    }
}

fn check_geometry(layer: &Layer, min_size: f64) -> CanvasResult<()> {
    let finite = [layer.x, layer.y, layer.rotation, layer.opacity]
        .iter()
        .all(|v| v.is_finite());
    if !finite {
        return Err(CanvasError::InvalidDocument(format!(
            "layer {} has non-finite geometry",
            layer.id
        )));
    }
    // NaN fails both comparisons
    if !(layer.width >= min_size && layer.height >= min_size)
        || !layer.width.is_finite()
        || !layer.height.is_finite()
    {
        return Err(CanvasError::InvalidDocument(format!(
            "layer {} size {}x{} is not at least {min_size}",
            layer.id, layer.width, layer.height
        )));
    }
    for child in layer.children().unwrap_or_default() {
        check_geometry(child, min_size)?;
    }
    Ok(())
}

/// Current Unix timestamp in milliseconds.
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn current_timestamp_ms() -> u64 {
    // SystemTime is unavailable in the browser
    js_sys::Date::now() as u64
}

/// Current Unix timestamp in milliseconds.
#[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
#[must_use]
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        // Timestamp will not exceed u64 max for millennia
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}
