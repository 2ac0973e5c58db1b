//! # Canvas Renderer
//!
//! Turns a design into output: a standalone SVG document, and with the
//! `export` feature PNG, JPEG, and PDF rasterized from that SVG.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌─────────────────────┐
//! │ RenderView   │ -> │ SVG          │ -> │ resvg / tiny-skia   │
//! │ (canvas +    │    │ serializer   │    │ PNG · JPEG · PDF    │
//! │  layer tree) │    │              │    │ (feature "export")  │
//! └──────────────┘    └──────────────┘    └─────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod image;
pub mod svg;

pub use error::{RenderError, RenderResult};
pub use export::{ExportConfig, ExportFormat, SceneExporter};
pub use image::ImageFormat;
pub use svg::{render_document, render_layers, SvgOptions};

/// Renderer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
