//! # Canvas Studio
//!
//! Everything around the editing engine that talks to the outside world:
//! project sessions over a design store, image-generation workflows, and the
//! `canvas-export` command-line tool.
//!
//! ## Usage
//!
//! ```bash
//! canvas-export --data-dir ./designs launch-poster -o poster.svg
//! CANVAS_DATA_DIR=./designs canvas-export --list
//! ```
//!
//! ## Architecture
//!
//! - `Studio` - Open design plus store, generator, and exporter
//! - `ImageGenerator` - Async image generation service boundary
//! - `Workflow` - Photoshoot, brand palette, and element prompts
//! - `Notice` - Transient user-facing messages
//! - `CliArgs` - Command-line arguments parsed with clap

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod generate;
pub mod session;

pub use error::{GenerationError, Notice, NoticeLevel, StudioError, StudioResult};
pub use generate::{GenerationRequest, ImageGenerator, Workflow};
pub use session::Studio;

use std::path::PathBuf;

use canvas_renderer::ExportFormat;
use clap::Parser;

/// Command-line arguments for canvas-export.
#[derive(Debug, Clone, Parser)]
#[command(name = "canvas-export")]
#[command(about = "Export stored canvas designs to SVG, PNG, JPEG, or PDF")]
#[command(version)]
pub struct CliArgs {
    /// Directory holding stored designs
    #[arg(long, env = "CANVAS_DATA_DIR", default_value = "designs")]
    pub data_dir: PathBuf,

    /// Design id to export
    #[arg(required_unless_present = "list")]
    pub design: Option<String>,

    /// Output file; the format is taken from its extension unless --format is given
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (svg, png, jpg, pdf)
    #[arg(long, env = "CANVAS_EXPORT_FORMAT")]
    pub format: Option<String>,

    /// Raster scale factor
    #[arg(long, env = "CANVAS_EXPORT_SCALE", default_value = "1.0")]
    pub scale: f32,

    /// List stored designs and exit
    #[arg(long)]
    pub list: bool,
}

impl CliArgs {
    /// Resolve the export format from `--format`, then the output
    /// extension, defaulting to SVG.
    ///
    /// # Errors
    ///
    /// Returns an error naming the value if it is not a known format.
    pub fn export_format(&self) -> Result<ExportFormat, String> {
        if let Some(name) = &self.format {
            return ExportFormat::from_extension(name)
                .ok_or_else(|| format!("unknown export format '{name}'"));
        }
        let from_output = self
            .output
            .as_ref()
            .and_then(|p| p.extension())
            .and_then(|ext| ext.to_str());
        match from_output {
            Some(ext) => ExportFormat::from_extension(ext)
                .ok_or_else(|| format!("unknown export format '{ext}'")),
            None => Ok(ExportFormat::Svg),
        }
    }

    /// Output path, defaulting to `<design>.<ext>` in the working directory.
    #[must_use]
    pub fn output_path(&self, format: ExportFormat) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let stem = self.design.as_deref().unwrap_or("design");
            PathBuf::from(format!("{stem}.{}", format.extension()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_output_extension() {
        let args = CliArgs::parse_from(["canvas-export", "poster", "-o", "out/poster.PNG"]);
        assert_eq!(args.export_format(), Ok(ExportFormat::Png));
        assert_eq!(args.output_path(ExportFormat::Png), PathBuf::from("out/poster.PNG"));
    }

    #[test]
    fn test_explicit_format_wins() {
        let args =
            CliArgs::parse_from(["canvas-export", "poster", "-o", "a.png", "--format", "pdf"]);
        assert_eq!(args.export_format(), Ok(ExportFormat::Pdf));
    }

    #[test]
    fn test_defaults_to_svg_named_after_design() {
        let args = CliArgs::parse_from(["canvas-export", "poster"]);
        assert_eq!(args.export_format(), Ok(ExportFormat::Svg));
        assert_eq!(args.output_path(ExportFormat::Svg), PathBuf::from("poster.svg"));
        assert!((args.scale - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let args = CliArgs::parse_from(["canvas-export", "poster", "-o", "a.bmp"]);
        assert!(args.export_format().is_err());
    }

    #[test]
    fn test_list_needs_no_design() {
        let args = CliArgs::try_parse_from(["canvas-export", "--list"]).expect("parse");
        assert!(args.list);
        assert!(CliArgs::try_parse_from(["canvas-export"]).is_err());
    }
}
