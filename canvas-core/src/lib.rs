//! # Canvas Core
//!
//! Core design-canvas logic: layers, the scene store, undo history, and
//! pointer gestures. Compiles to WASM for the browser editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              canvas-core.wasm               │
//! ├─────────────────────────────────────────────┤
//! │  Scene Store     │  Interaction             │
//! │  - Layers        │  - Drag / resize         │
//! │  - Selection     │  - Rotate / marquee      │
//! │  - Clipboard     │  - Snap guides, pan      │
//! ├─────────────────────────────────────────────┤
//! │  History         │  Geometry & Shapes       │
//! │  - Snapshots     │  - Bounds, rotation      │
//! │  - Undo / redo   │  - Polygon / star paths  │
//! ├─────────────────────────────────────────────┤
//! │  Design Store (memory / files)              │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod history;
pub mod interaction;
pub mod layer;
pub mod scene;
pub mod shapes;
pub mod snap;
pub mod store;
pub mod viewport;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::{EditorConfig, BUILTIN_FONTS};
pub use document::DesignDocument;
pub use error::{CanvasError, CanvasResult};
pub use geometry::{Bounds, Point};
pub use history::{History, SceneSnapshot};
pub use interaction::{Corner, Gesture, Interaction, Modifiers, PointerTarget};
pub use layer::{
    FontStyle, GroupProperties, ImageFilters, ImageProperties, Layer, LayerId, LayerKind,
    LayerPatch, LayerTemplate, ShapeProperties, TextAlign, TextDecoration, TextProperties,
    TextTransform,
};
pub use scene::{CanvasProperties, RenderView, Scene};
pub use shapes::ShapeKind;
pub use snap::{Axis, Guide};
pub use store::{DesignStore, FileDesignStore, MemoryDesignStore, StoreError};
pub use viewport::Viewport;

/// Canvas core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
