//! Layers - the building blocks of a design.
//!
//! A [`Layer`] carries geometry, flags, and exactly one payload. The payload
//! is a [`LayerKind`] variant, so a text layer can never hold image
//! properties: the `type` tag and its `properties` are one value.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Bounds;
use crate::shapes::ShapeKind;

/// Unique identifier for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(Uuid);

impl LayerId {
    /// Create a new unique layer ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a layer ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Horizontal alignment of text within its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Font slant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Upright.
    #[default]
    Normal,
    /// Italic.
    Italic,
}

/// Line decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    /// No decoration.
    #[default]
    None,
    /// Underline.
    Underline,
    /// Strike-through.
    LineThrough,
}

/// Case transform applied to text content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    /// Content as typed.
    #[default]
    None,
    /// All upper case.
    Uppercase,
    /// All lower case.
    Lowercase,
    /// First letter of each word upper case.
    Capitalize,
}

impl TextTransform {
    /// Apply the transform to `content`.
    #[must_use]
    pub fn apply(self, content: &str) -> String {
        match self {
            Self::None => content.to_string(),
            Self::Uppercase => content.to_uppercase(),
            Self::Lowercase => content.to_lowercase(),
            Self::Capitalize => {
                let mut out = String::with_capacity(content.len());
                let mut at_word_start = true;
                for ch in content.chars() {
                    if at_word_start && ch.is_alphabetic() {
                        out.extend(ch.to_uppercase());
                    } else {
                        out.push(ch);
                    }
                    at_word_start = ch.is_whitespace();
                }
                out
            }
        }
    }
}

/// Text payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProperties {
    /// Text content; literal newlines separate lines.
    pub content: String,
    /// Font family name.
    pub font_family: String,
    /// Font size in document units.
    pub font_size: f64,
    /// CSS font weight (`"normal"`, `"bold"`, `"700"`...).
    pub font_weight: String,
    /// Font slant.
    pub font_style: FontStyle,
    /// Line decoration.
    pub text_decoration: TextDecoration,
    /// Fill color.
    pub color: String,
    /// Horizontal alignment.
    pub text_align: TextAlign,
    /// Extra spacing between letters in document units.
    pub letter_spacing: f64,
    /// Line height as a multiple of the font size.
    pub line_height: f64,
    /// Case transform.
    pub text_transform: TextTransform,
}

impl Default for TextProperties {
    fn default() -> Self {
        Self {
            content: "Add your text".to_string(),
            font_family: "Inter".to_string(),
            font_size: 32.0,
            font_weight: "normal".to_string(),
            font_style: FontStyle::Normal,
            text_decoration: TextDecoration::None,
            color: "#000000".to_string(),
            text_align: TextAlign::Left,
            letter_spacing: 0.0,
            line_height: 1.2,
            text_transform: TextTransform::None,
        }
    }
}

/// Image filter set. Each field has a valid range and an identity value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageFilters {
    /// Percent, 0–100, identity 0.
    pub grayscale: f64,
    /// Percent, 0–100, identity 0.
    pub sepia: f64,
    /// Percent, 0–100, identity 0.
    pub invert: f64,
    /// Percent, 0–200, identity 100.
    pub brightness: f64,
    /// Percent, 0–200, identity 100.
    pub contrast: f64,
    /// Percent, 0–200, identity 100.
    pub saturate: f64,
    /// Pixels, 0–20, identity 0.
    pub blur: f64,
    /// Degrees, 0–360, identity 0.
    pub hue_rotate: f64,
}

impl Default for ImageFilters {
    fn default() -> Self {
        Self {
            grayscale: 0.0,
            sepia: 0.0,
            invert: 0.0,
            brightness: 100.0,
            contrast: 100.0,
            saturate: 100.0,
            blur: 0.0,
            hue_rotate: 0.0,
        }
    }
}

impl ImageFilters {
    /// Every value clamped into its range.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            grayscale: self.grayscale.clamp(0.0, 100.0),
            sepia: self.sepia.clamp(0.0, 100.0),
            invert: self.invert.clamp(0.0, 100.0),
            brightness: self.brightness.clamp(0.0, 200.0),
            contrast: self.contrast.clamp(0.0, 200.0),
            saturate: self.saturate.clamp(0.0, 200.0),
            blur: self.blur.clamp(0.0, 20.0),
            hue_rotate: self.hue_rotate.clamp(0.0, 360.0),
        }
    }

    /// Whether every filter is at its identity value.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.clamped() == Self::default()
    }

    /// CSS `filter` value listing the non-identity filters, or `None`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn css(&self) -> Option<String> {
        let f = self.clamped();
        let identity = Self::default();
        let mut parts = Vec::new();
        if f.grayscale != identity.grayscale {
            parts.push(format!("grayscale({}%)", f.grayscale));
        }
        if f.sepia != identity.sepia {
            parts.push(format!("sepia({}%)", f.sepia));
        }
        if f.invert != identity.invert {
            parts.push(format!("invert({}%)", f.invert));
        }
        if f.brightness != identity.brightness {
            parts.push(format!("brightness({}%)", f.brightness));
        }
        if f.contrast != identity.contrast {
            parts.push(format!("contrast({}%)", f.contrast));
        }
        if f.saturate != identity.saturate {
            parts.push(format!("saturate({}%)", f.saturate));
        }
        if f.blur != identity.blur {
            parts.push(format!("blur({}px)", f.blur));
        }
        if f.hue_rotate != identity.hue_rotate {
            parts.push(format!("hue-rotate({}deg)", f.hue_rotate));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Image payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageProperties {
    /// Source URI or data URI.
    pub src: String,
    /// Mirror across the vertical axis.
    #[serde(default)]
    pub flip_horizontal: bool,
    /// Mirror across the horizontal axis.
    #[serde(default)]
    pub flip_vertical: bool,
    /// Color and blur filters.
    #[serde(default)]
    pub filters: ImageFilters,
}

impl ImageProperties {
    /// Image payload with no flips and identity filters.
    #[must_use]
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            flip_horizontal: false,
            flip_vertical: false,
            filters: ImageFilters::default(),
        }
    }
}

/// Shape payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeProperties {
    /// Geometric kind.
    pub shape: ShapeKind,
    /// Fill color.
    pub fill: String,
    /// Stroke color.
    pub stroke: String,
    /// Stroke width in document units.
    pub stroke_width: f64,
    /// Corner radii `[top-left, top-right, bottom-right, bottom-left]`; rectangles only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<[f64; 4]>,
    /// Vertex or tip count; polygons and stars only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    /// Inner-to-outer radius ratio; stars only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_radius_ratio: Option<f64>,
}

impl ShapeProperties {
    /// Default styling for a new shape of `kind`.
    #[must_use]
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            shape: kind,
            fill: "#3b82f6".to_string(),
            stroke: "#1e3a8a".to_string(),
            stroke_width: 0.0,
            corner_radius: None,
            points: match kind {
                ShapeKind::Polygon => Some(6),
                ShapeKind::Star => Some(5),
                _ => None,
            },
            inner_radius_ratio: (kind == ShapeKind::Star).then_some(0.5),
        }
    }
}

/// Group payload: children in group-local coordinates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupProperties {
    /// Children, back to front.
    pub children: Vec<Layer>,
}

/// The payload of a layer, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "properties", rename_all = "lowercase")]
pub enum LayerKind {
    /// Text block.
    Text(TextProperties),
    /// Raster image.
    Image(ImageProperties),
    /// Primitive or path shape.
    Shape(ShapeProperties),
    /// Container of child layers.
    Group(GroupProperties),
}

impl LayerKind {
    /// The serialized `type` tag.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Shape(_) => "shape",
            Self::Group(_) => "group",
        }
    }

    /// Whether `other` is the same variant.
    #[must_use]
    pub fn same_variant(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// What `add_layer` should create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "shape", rename_all = "lowercase")]
pub enum LayerTemplate {
    /// Default text box.
    Text,
    /// Default shape of the given kind.
    Shape(ShapeKind),
}

/// A visual element of the design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Unique identifier.
    pub id: LayerId,
    /// Display name in the layer panel.
    #[serde(default)]
    pub name: String,
    /// Left edge in parent space.
    pub x: f64,
    /// Top edge in parent space.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Degrees about the layer center.
    #[serde(default)]
    pub rotation: f64,
    /// 0 (transparent) to 1 (opaque).
    #[serde(default = "Layer::default_opacity")]
    pub opacity: f64,
    /// Hidden layers contribute nothing to rendering.
    #[serde(default = "Layer::default_visible")]
    pub visible: bool,
    /// Locked layers cannot be moved, resized, rotated, deleted, or reordered.
    #[serde(default)]
    pub locked: bool,
    /// Payload.
    #[serde(flatten)]
    pub kind: LayerKind,
}

impl Layer {
    /// Create a 100×100 layer at the origin.
    #[must_use]
    pub fn new(kind: LayerKind) -> Self {
        let name = match &kind {
            LayerKind::Text(_) => "Text",
            LayerKind::Image(_) => "Image",
            LayerKind::Shape(_) => "Shape",
            LayerKind::Group(_) => "Group",
        };
        Self {
            id: LayerId::new(),
            name: name.to_string(),
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            rotation: 0.0,
            opacity: 1.0,
            visible: true,
            locked: false,
            kind,
        }
    }

    /// Set the bounds.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.x = bounds.x;
        self.y = bounds.y;
        self.width = bounds.width;
        self.height = bounds.height;
        self
    }

    /// Set the rotation in degrees.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    const fn default_opacity() -> f64 {
        1.0
    }

    const fn default_visible() -> bool {
        true
    }

    /// Axis-aligned bounds, ignoring rotation.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }

    /// Children if this is a group.
    #[must_use]
    pub fn children(&self) -> Option<&[Layer]> {
        match &self.kind {
            LayerKind::Group(group) => Some(&group.children),
            _ => None,
        }
    }

    /// This layer's id followed by every descendant id, depth first.
    #[must_use]
    pub fn all_ids(&self) -> Vec<LayerId> {
        let mut ids = vec![self.id];
        if let Some(children) = self.children() {
            for child in children {
                ids.extend(child.all_ids());
            }
        }
        ids
    }

    /// Deep copy with a fresh id on this layer and every descendant.
    #[must_use]
    pub fn clone_with_fresh_ids(&self) -> Self {
        let mut copy = self.clone();
        copy.assign_fresh_ids();
        copy
    }

    fn assign_fresh_ids(&mut self) {
        self.id = LayerId::new();
        if let LayerKind::Group(group) = &mut self.kind {
            for child in &mut group.children {
                child.assign_fresh_ids();
            }
        }
    }
}

/// An explicit partial update. Unset fields are left unchanged.
///
/// A patch never changes a layer's id, and a `kind` of a different variant
/// than the target layer's is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerPatch {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New x.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// New y.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// New width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// New height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// New rotation in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// New opacity, clamped to `[0, 1]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// New visibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    /// New lock flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    /// Replacement payload of the same variant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<LayerKind>,
}

impl LayerPatch {
    /// Patch that moves a layer to `(x, y)`.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch that sets all four bounds.
    #[must_use]
    pub fn bounds(bounds: Bounds) -> Self {
        Self {
            x: Some(bounds.x),
            y: Some(bounds.y),
            width: Some(bounds.width),
            height: Some(bounds.height),
            ..Self::default()
        }
    }

    /// Patch that sets the rotation.
    #[must_use]
    pub fn rotation(degrees: f64) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::default()
        }
    }

    /// Build a new layer from `layer` with this patch applied.
    #[must_use]
    pub fn apply(&self, layer: &Layer) -> Layer {
        let mut out = layer.clone();
        if let Some(name) = &self.name {
            out.name.clone_from(name);
        }
        if let Some(x) = self.x {
            out.x = x;
        }
        if let Some(y) = self.y {
            out.y = y;
        }
        if let Some(w) = self.width {
            out.width = w;
        }
        if let Some(h) = self.height {
            out.height = h;
        }
        if let Some(r) = self.rotation {
            out.rotation = r;
        }
        if let Some(o) = self.opacity {
            out.opacity = o.clamp(0.0, 1.0);
        }
        if let Some(v) = self.visible {
            out.visible = v;
        }
        if let Some(l) = self.locked {
            out.locked = l;
        }
        if let Some(kind) = &self.kind {
            if kind.same_variant(&layer.kind) {
                out.kind = kind.clone();
            } else {
                tracing::debug!(
                    "Ignoring {} payload patch on {} layer {}",
                    kind.type_name(),
                    layer.kind.type_name(),
                    layer.id
                );
            }
        }
        out
    }
}
