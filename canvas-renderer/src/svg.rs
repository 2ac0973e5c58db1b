//! SVG serialization of the layer tree.
//!
//! The output follows the on-screen transform conventions exactly: each
//! visible layer is wrapped in `translate(x, y) rotate(r, w/2, h/2)` so its
//! content is authored in local coordinates with the origin at the top-left
//! corner of its box.

use std::fmt::Write;

use canvas_core::shapes::{shape_path, stroke_compensation};
use canvas_core::{
    ImageProperties, Layer, LayerKind, RenderView, ShapeProperties, TextAlign, TextDecoration,
    TextProperties,
};
use serde::{Deserialize, Serialize};

use crate::image::embeddable_src;

/// Families the renderer assumes are installed and never imports.
const SYSTEM_FAMILIES: &[&str] = &[
    "serif",
    "sans-serif",
    "monospace",
    "cursive",
    "fantasy",
    "system-ui",
    "arial",
    "georgia",
    "helvetica",
    "times new roman",
    "verdana",
    "courier new",
];

/// Options for SVG output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgOptions {
    /// Stylesheet URL for a font; `{family}` is replaced by the family name
    /// with spaces as `+`.
    pub font_import_url: String,
    /// Inline data URIs for local image files.
    pub embed_images: bool,
    /// Groups nested deeper than this are skipped.
    pub max_group_depth: usize,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            font_import_url: "https://fonts.googleapis.com/css2?family={family}&display=swap"
                .to_string(),
            embed_images: true,
            max_group_depth: 32,
        }
    }
}

impl SvgOptions {
    fn import_url(&self, family: &str) -> String {
        self.font_import_url
            .replace("{family}", &family.replace(' ', "+"))
    }
}

/// Render a complete standalone SVG document for `view`.
#[must_use]
pub fn render_document(view: &RenderView, opts: &SvgOptions) -> String {
    let canvas = &view.canvas;
    let (w, h) = (canvas.width, canvas.height);
    let mut svg = String::with_capacity(4096);

    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );

    let families = font_families(&view.layers);
    if !families.is_empty() {
        svg.push_str("<defs><style>");
        for family in &families {
            let _ = write!(
                svg,
                "@import url('{}');",
                escape_xml(&opts.import_url(family))
            );
        }
        svg.push_str("</style></defs>");
    }

    let _ = write!(
        svg,
        r#"<rect width="{w}" height="{h}" fill="{}"/>"#,
        escape_xml(&canvas.background)
    );

    svg.push_str(&render_layers(&view.layers, opts));
    svg.push_str("</svg>");
    svg
}

/// Render a list of layers, back to front, as SVG fragments.
#[must_use]
pub fn render_layers(layers: &[Layer], opts: &SvgOptions) -> String {
    let mut out = String::new();
    for layer in layers {
        render_layer(&mut out, layer, 0, opts);
    }
    out
}

/// Distinct font families of visible text layers, in first-use order,
/// excluding generic and system families.
#[must_use]
pub fn font_families(layers: &[Layer]) -> Vec<String> {
    let mut families = Vec::new();
    collect_families(layers, &mut families);
    families
}

fn collect_families(layers: &[Layer], families: &mut Vec<String>) {
    for layer in layers.iter().filter(|l| l.visible) {
        match &layer.kind {
            LayerKind::Text(text) => {
                let family = text.font_family.trim();
                let system = SYSTEM_FAMILIES
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(family));
                if !family.is_empty() && !system && !families.iter().any(|f| f == family) {
                    families.push(family.to_string());
                }
            }
            LayerKind::Group(group) => collect_families(&group.children, families),
            LayerKind::Image(_) | LayerKind::Shape(_) => {}
        }
    }
}

fn render_layer(out: &mut String, layer: &Layer, depth: usize, opts: &SvgOptions) {
    if !layer.visible {
        return;
    }

    let (w, h) = (layer.width, layer.height);
    let body = match &layer.kind {
        LayerKind::Text(text) => render_text(text, w),
        LayerKind::Image(image) => render_image(image, w, h, opts),
        LayerKind::Shape(shape) => render_shape(shape, w, h),
        LayerKind::Group(group) => {
            if depth >= opts.max_group_depth {
                tracing::warn!(
                    "Skipping group {} nested beyond depth {}",
                    layer.id,
                    opts.max_group_depth
                );
                return;
            }
            let mut children = String::new();
            for child in &group.children {
                render_layer(&mut children, child, depth + 1, opts);
            }
            if children.is_empty() {
                String::new()
            } else {
                format!("<g>{children}</g>")
            }
        }
    };

    if body.is_empty() {
        return;
    }

    let _ = write!(
        out,
        r#"<g transform="translate({}, {}) rotate({}, {}, {})" opacity="{}">{body}</g>"#,
        layer.x,
        layer.y,
        layer.rotation,
        w / 2.0,
        h / 2.0,
        layer.opacity
    );
}

fn render_text(text: &TextProperties, width: f64) -> String {
    let (anchor, anchor_x) = match text.text_align {
        TextAlign::Left => ("start", 0.0),
        TextAlign::Center => ("middle", width / 2.0),
        TextAlign::Right => ("end", width),
    };
    let decoration = match text.text_decoration {
        TextDecoration::None => "none",
        TextDecoration::Underline => "underline",
        TextDecoration::LineThrough => "line-through",
    };
    let style = match text.font_style {
        canvas_core::FontStyle::Normal => "normal",
        canvas_core::FontStyle::Italic => "italic",
    };

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<text font-family="{}" font-size="{}" font-weight="{}" font-style="{style}" fill="{}" text-anchor="{anchor}" letter-spacing="{}" text-decoration="{decoration}">"#,
        escape_xml(&text.font_family),
        text.font_size,
        escape_xml(&text.font_weight),
        escape_xml(&text.color),
        text.letter_spacing,
    );

    let content = text.text_transform.apply(&text.content);
    let step = text.line_height * text.font_size;
    for (i, line) in content.split('\n').enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let y = text.font_size + i as f64 * step;
        let _ = write!(
            svg,
            r#"<tspan x="{anchor_x}" y="{y}">{}</tspan>"#,
            escape_text(line)
        );
    }
    svg.push_str("</text>");
    svg
}

fn render_image(image: &ImageProperties, w: f64, h: f64, opts: &SvgOptions) -> String {
    let href = if opts.embed_images {
        embeddable_src(&image.src)
    } else {
        image.src.clone()
    };

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<image width="{w}" height="{h}" href="{}" preserveAspectRatio="none""#,
        escape_xml(&href)
    );

    let flip = match (image.flip_horizontal, image.flip_vertical) {
        (true, true) => Some(format!("translate({w}, {h}) scale(-1, -1)")),
        (true, false) => Some(format!("translate({w}, 0) scale(-1, 1)")),
        (false, true) => Some(format!("translate(0, {h}) scale(1, -1)")),
        (false, false) => None,
    };
    if let Some(transform) = flip {
        let _ = write!(svg, r#" transform="{transform}""#);
    }
    if let Some(filter) = image.filters.css() {
        let _ = write!(svg, r#" style="filter: {filter}""#);
    }
    svg.push_str("/>");
    svg
}

fn render_shape(shape: &ShapeProperties, w: f64, h: f64) -> String {
    let fill = escape_xml(&shape.fill);
    let stroke = escape_xml(&shape.stroke);
    let sw = shape.stroke_width;

    if shape.shape.is_rectangular() {
        let radii = shape
            .corner_radius
            .unwrap_or([0.0; 4])
            .map(|r| r.clamp(0.0, w.min(h) / 2.0));
        #[allow(clippy::float_cmp)]
        let uniform = radii.iter().all(|r| *r == radii[0]);
        return if uniform {
            format!(
                r#"<rect width="{w}" height="{h}" rx="{}" fill="{fill}" stroke="{stroke}" stroke-width="{sw}"/>"#,
                radii[0]
            )
        } else {
            format!(
                r#"<path d="{}" fill="{fill}" stroke="{stroke}" stroke-width="{sw}"/>"#,
                rounded_rect_path(w, h, radii)
            )
        };
    }

    if shape.shape.is_elliptical() {
        let (rx, ry) = (w / 2.0, h / 2.0);
        return format!(
            r#"<ellipse cx="{rx}" cy="{ry}" rx="{rx}" ry="{ry}" fill="{fill}" stroke="{stroke}" stroke-width="{sw}"/>"#
        );
    }

    let Some(path) = shape_path(shape.shape, shape.points, shape.inner_radius_ratio) else {
        return String::new();
    };
    format!(
        r#"<g transform="scale({}, {})"><path d="{path}" fill="{fill}" stroke="{stroke}" stroke-width="{}"/></g>"#,
        w / 100.0,
        h / 100.0,
        sw * stroke_compensation(w, h)
    )
}

/// Rectangle path with per-corner radii `[top-left, top-right, bottom-right, bottom-left]`.
fn rounded_rect_path(w: f64, h: f64, [tl, tr, br, bl]: [f64; 4]) -> String {
    let mut d = String::with_capacity(160);
    let _ = write!(d, "M{tl},0 H{} A{tr},{tr} 0 0 1 {w},{tr}", w - tr);
    let _ = write!(d, " V{} A{br},{br} 0 0 1 {},{h}", h - br, w - br);
    let _ = write!(d, " H{bl} A{bl},{bl} 0 0 1 0,{}", h - bl);
    let _ = write!(d, " V{tl} A{tl},{tl} 0 0 1 {tl},0 Z");
    d
}

/// Escape a string for use in an XML attribute.
#[must_use]
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Escape text content: `&`, `<`, and `>` only.
#[must_use]
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
