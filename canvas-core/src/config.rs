//! Editor configuration.
//!
//! Every field has a default, so a partial JSON object is a valid config.

use serde::{Deserialize, Serialize};

use crate::CanvasResult;

/// Font families available to text layers before any are uploaded.
pub const BUILTIN_FONTS: &[&str] = &[
    "Inter",
    "Roboto",
    "Open Sans",
    "Lato",
    "Montserrat",
    "Poppins",
    "Playfair Display",
    "Merriweather",
    "Oswald",
    "Raleway",
    "Source Code Pro",
    "Georgia",
    "Arial",
];

/// Tunables for the editing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Snap distance in screen pixels; divided by zoom so it stays visually constant.
    pub snap_threshold_px: f64,
    /// Offset applied to every top-level layer on paste.
    pub paste_offset: f64,
    /// Smallest width/height a layer can be resized to.
    pub min_layer_size: f64,
    /// A marquee must exceed this in width or height to select anything.
    pub marquee_threshold: f64,
    /// Fraction of the canvas an added image may occupy at most.
    pub image_fit_ratio: f64,
    /// Maximum number of undo steps retained.
    pub history_limit: usize,
    /// Lower zoom bound.
    pub min_zoom: f64,
    /// Upper zoom bound.
    pub max_zoom: f64,
    /// Nesting bound for recursive group traversal.
    pub max_group_depth: usize,
    /// Width of a new document.
    pub canvas_width: f64,
    /// Height of a new document.
    pub canvas_height: f64,
    /// Background color of a new document.
    pub canvas_background: String,
    /// Name of a new document.
    pub canvas_name: String,
    /// Fonts seeded into a new document.
    pub fonts: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_threshold_px: 5.0,
            paste_offset: 20.0,
            min_layer_size: 10.0,
            marquee_threshold: 5.0,
            image_fit_ratio: 0.8,
            history_limit: 100,
            min_zoom: 0.1,
            max_zoom: 10.0,
            max_group_depth: 32,
            canvas_width: 1080.0,
            canvas_height: 1080.0,
            canvas_background: "#ffffff".to_string(),
            canvas_name: "Untitled design".to_string(),
            fonts: BUILTIN_FONTS.iter().map(|f| (*f).to_string()).collect(),
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
