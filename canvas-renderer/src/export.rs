//! Scene export to image/document formats.
//!
//! Every format goes through the SVG serializer first. Raster formats
//! rasterize that SVG with resvg/tiny-skia and are only available with the
//! `export` feature; without it they return [`RenderError::Unsupported`].

use canvas_core::{RenderView, Scene};
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};
use crate::svg::{render_document, SvgOptions};

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PNG image.
    Png,
    /// JPEG image, composited onto the canvas background.
    Jpeg,
    /// SVG vector graphics (returns the SVG XML string as UTF-8 bytes).
    Svg,
    /// PDF document with embedded raster image.
    Pdf,
}

impl ExportFormat {
    /// Parse a format from a file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "svg" => Some(Self::Svg),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Conventional file extension.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
        }
    }
}

/// Configuration for scene export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Scale factor for raster output (e.g. 2.0 for retina).
    pub scale: f32,
    /// DPI for print export (default: 96.0).
    pub dpi: f32,
    /// JPEG quality 1-100 (default: 90).
    pub jpeg_quality: u8,
    /// SVG serializer options.
    pub svg: SvgOptions,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            dpi: 96.0,
            jpeg_quality: 90,
            svg: SvgOptions::default(),
        }
    }
}

/// Exports a [`Scene`] to various image and document formats.
pub struct SceneExporter {
    config: ExportConfig,
}

impl SceneExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// The exporter's configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export the current state of a scene.
    ///
    /// Selection and other editor chrome are never part of the output.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene cannot be rendered or encoded.
    pub fn export(&self, scene: &Scene, format: ExportFormat) -> RenderResult<Vec<u8>> {
        self.export_view(&scene.render_view(), format)
    }

    /// Export a captured render view.
    ///
    /// # Errors
    ///
    /// Returns an error if the view cannot be rendered or encoded, or if a
    /// raster format is requested without the `export` feature.
    pub fn export_view(&self, view: &RenderView, format: ExportFormat) -> RenderResult<Vec<u8>> {
        tracing::debug!(
            "Exporting {} layers as {}",
            view.layers.len(),
            format.extension()
        );
        match format {
            ExportFormat::Svg => Ok(self.render_to_svg(view).into_bytes()),
            #[cfg(feature = "export")]
            ExportFormat::Png => self.render_to_png(view),
            #[cfg(feature = "export")]
            ExportFormat::Jpeg => self.render_to_jpeg(view),
            #[cfg(feature = "export")]
            ExportFormat::Pdf => self.render_to_pdf(view),
            #[cfg(not(feature = "export"))]
            other => Err(RenderError::Unsupported(format!(
                "{} export requires the `export` feature",
                other.extension()
            ))),
        }
    }

    /// Render the view to a standalone SVG string.
    #[must_use]
    pub fn render_to_svg(&self, view: &RenderView) -> String {
        render_document(view, &self.config.svg)
    }

    /// Export the view to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    #[cfg(feature = "export")]
    pub fn render_to_png(&self, view: &RenderView) -> RenderResult<Vec<u8>> {
        let pixmap = self.rasterize(view)?;
        pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }

    /// Export the view to JPEG bytes.
    ///
    /// Transparent pixels are composited onto the canvas background.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    #[cfg(feature = "export")]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render_to_jpeg(&self, view: &RenderView) -> RenderResult<Vec<u8>> {
        use image::ImageEncoder;

        let pixmap = self.rasterize(view)?;
        let (width, height) = (pixmap.width(), pixmap.height());
        let bg = parse_hex_color(&view.canvas.background).unwrap_or([255, 255, 255]);

        // tiny-skia stores premultiplied alpha
        let mut rgb_data = Vec::with_capacity((width * height * 3) as usize);
        for pixel in pixmap.data().chunks_exact(4) {
            let inv = 1.0 - f32::from(pixel[3]) / 255.0;
            for channel in 0..3 {
                let value = f32::from(bg[channel]).mul_add(inv, f32::from(pixel[channel]));
                rgb_data.push(value.round().min(255.0) as u8);
            }
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality);
        encoder
            .write_image(&rgb_data, width, height, image::ExtendedColorType::Rgb8)
            .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }

    /// Export the view to PDF bytes.
    ///
    /// Renders the view as a raster image and embeds it in a page sized to
    /// the canvas at the configured DPI.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or PDF generation fails.
    #[cfg(feature = "export")]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn render_to_pdf(&self, view: &RenderView) -> RenderResult<Vec<u8>> {
        let png_data = self.render_to_png(view)?;
        let dpi = self.config.dpi;

        // Convert canvas units (CSS pixels) to mm: px / dpi * 25.4
        let page_width_mm = view.canvas.width as f32 / dpi * 25.4;
        let page_height_mm = view.canvas.height as f32 / dpi * 25.4;

        let (doc, page1, layer1) = printpdf::PdfDocument::new(
            &view.canvas.name,
            printpdf::Mm(page_width_mm),
            printpdf::Mm(page_height_mm),
            "Design",
        );
        let current_layer = doc.get_page(page1).get_layer(layer1);

        let dynamic_image = printpdf::image_crate::load_from_memory(&png_data)
            .map_err(|e| RenderError::Export(format!("Failed to decode PNG for PDF: {e}")))?;
        let pdf_image = printpdf::Image::from_dynamic_image(&dynamic_image);

        // The image is placed at `dpi`, so a scaled raster shrinks back to page size.
        let transform = printpdf::ImageTransform {
            translate_x: Some(printpdf::Mm(0.0)),
            translate_y: Some(printpdf::Mm(0.0)),
            scale_x: Some(1.0 / self.config.scale),
            scale_y: Some(1.0 / self.config.scale),
            dpi: Some(dpi),
            ..Default::default()
        };
        pdf_image.add_to_layer(current_layer, transform);

        doc.save_to_bytes()
            .map_err(|e| RenderError::Export(format!("PDF save failed: {e}")))
    }

    /// Rasterize the view's SVG to a tiny-skia Pixmap at the configured scale.
    #[cfg(feature = "export")]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize(&self, view: &RenderView) -> RenderResult<tiny_skia::Pixmap> {
        let svg = self.render_to_svg(view);

        let mut opt = usvg::Options::default();
        opt.fontdb_mut().load_system_fonts();
        let tree = usvg::Tree::from_str(&svg, &opt)
            .map_err(|e| RenderError::Export(format!("SVG parsing failed: {e}")))?;

        let scale = self.config.scale.max(f32::EPSILON);
        let px_w = (tree.size().width() * scale).ceil() as u32;
        let px_h = (tree.size().height() * scale).ceil() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(px_w.max(1), px_h.max(1))
            .ok_or_else(|| RenderError::Export("Failed to create pixmap".to_string()))?;

        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        Ok(pixmap)
    }
}

/// Parse `#rgb` or `#rrggbb` into RGB bytes.
#[must_use]
pub fn parse_hex_color(color: &str) -> Option<[u8; 3]> {
    let hex = color.trim().strip_prefix('#')?;
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}
