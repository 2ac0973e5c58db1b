//! Image utilities.
//!
//! Format sniffing, dimension discovery, data URI encoding, and palette
//! sampling. Layers reference images by source string; these helpers
//! turn bytes into sources and sources into embeddable form.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use image::GenericImageView;

use crate::error::{RenderError, RenderResult};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// GIF.
    Gif,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        // GIF: "GIF8"
        if data.starts_with(b"GIF8") {
            return Self::Gif;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }

    /// MIME type for data URIs.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// Natural pixel size of encoded image bytes.
///
/// # Errors
///
/// Returns an error if the image cannot be decoded.
pub fn image_dimensions(data: &[u8]) -> RenderResult<(u32, u32)> {
    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;
    Ok(img.dimensions())
}

/// Encode bytes as a base64 data URI, sniffing the MIME type.
#[must_use]
pub fn to_data_uri(data: &[u8]) -> String {
    let mime = ImageFormat::from_magic_bytes(data).mime_type();
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    format!("data:{mime};base64,{encoded}")
}

/// Resolve a layer's image source to something a standalone SVG can carry.
///
/// Data URIs pass through. Readable local files (plain paths or `file://`
/// URLs) are inlined as data URIs. Anything else, such as a remote URL, is
/// returned unchanged and stays a reference.
#[must_use]
pub fn embeddable_src(src: &str) -> String {
    if src.starts_with("data:") {
        return src.to_string();
    }
    let path = Path::new(src.strip_prefix("file://").unwrap_or(src));
    if src.contains("://") && !src.starts_with("file://") {
        return src.to_string();
    }
    match std::fs::read(path) {
        Ok(bytes) => to_data_uri(&bytes),
        Err(e) => {
            tracing::debug!("Referencing image {src} instead of embedding: {e}");
            src.to_string()
        }
    }
}

/// The `count` most common colors in an image as `#rrggbb`, most common first.
///
/// Colors are bucketed at 4 bits per channel on a downsampled copy; each
/// result is the mean of its bucket. Mostly transparent pixels are ignored.
///
/// # Errors
///
/// Returns an error if the image cannot be decoded.
pub fn dominant_colors(data: &[u8], count: usize) -> RenderResult<Vec<String>> {
    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;
    let sample = image::imageops::thumbnail(&img.to_rgba8(), 64, 64);

    let mut buckets: HashMap<[u8; 3], (u64, [u64; 3])> = HashMap::new();
    for pixel in sample.pixels() {
        let [r, g, b, a] = pixel.0;
        if a < 128 {
            continue;
        }
        let entry = buckets.entry([r >> 4, g >> 4, b >> 4]).or_default();
        entry.0 += 1;
        entry.1[0] += u64::from(r);
        entry.1[1] += u64::from(g);
        entry.1[2] += u64::from(b);
    }

    let mut ranked: Vec<([u8; 3], (u64, [u64; 3]))> = buckets.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.0.cmp(&b.0)));

    Ok(ranked
        .into_iter()
        .take(count)
        .map(|(_, (n, sum))| {
            #[allow(clippy::cast_possible_truncation)]
            let mean = |channel: u64| (channel / n) as u8;
            format!("#{:02x}{:02x}{:02x}", mean(sum[0]), mean(sum[1]), mean(sum[2]))
        })
        .collect())
}

/// Downscale encoded image bytes to fit `max_size` and re-encode as PNG.
///
/// # Errors
///
/// Returns an error if the image cannot be decoded or encoded.
pub fn thumbnail_png(data: &[u8], max_size: u32) -> RenderResult<Vec<u8>> {
    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;
    let thumbnail = img.thumbnail(max_size, max_size);
    let mut buf = Cursor::new(Vec::new());
    thumbnail
        .write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}
