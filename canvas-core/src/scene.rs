//! The scene: sole owner of the editable document.
//!
//! Every mutation goes through a named operation. Operations that complete a
//! logical edit commit a history snapshot; `update_layer` and friends do not,
//! so a gesture can stream many updates and commit once on release.
//!
//! Operations addressed by an id that no longer resolves, or whose
//! preconditions are not met (locked layers, too few layers to group, empty
//! clipboard), do nothing. Those are normal races in an interactive editor.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::document::{current_timestamp_ms, DesignDocument};
use crate::geometry::{rotate_vector, Bounds, Point};
use crate::history::{History, SceneSnapshot};
use crate::layer::{
    GroupProperties, ImageProperties, Layer, LayerId, LayerKind, LayerPatch, LayerTemplate,
    ShapeProperties, TextProperties,
};
use crate::viewport::Viewport;
use crate::CanvasResult;

/// Default text box size.
const TEXT_SIZE: (f64, f64) = (200.0, 50.0);

/// Default shape size.
const SHAPE_SIZE: (f64, f64) = (100.0, 100.0);

/// Canvas size, background, and name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasProperties {
    /// Width in document units.
    pub width: f64,
    /// Height in document units.
    pub height: f64,
    /// Background fill color.
    pub background: String,
    /// Document name.
    pub name: String,
}

impl Default for CanvasProperties {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl CanvasProperties {
    /// Canvas properties for a new document.
    #[must_use]
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            width: config.canvas_width,
            height: config.canvas_height,
            background: config.canvas_background.clone(),
            name: config.canvas_name.clone(),
        }
    }

    /// The canvas as bounds at the origin.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(0.0, 0.0, self.width, self.height)
    }
}

/// A consistent copy of what should be exported, with no selection state.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderView {
    /// Canvas properties.
    pub canvas: CanvasProperties,
    /// Layers, back to front.
    pub layers: Arc<Vec<Layer>>,
}

/// The editable design document plus its history and view state.
#[derive(Debug, Clone)]
pub struct Scene {
    layers: Arc<Vec<Layer>>,
    selection: Vec<LayerId>,
    canvas_selected: bool,
    canvas: CanvasProperties,
    custom_fonts: Vec<String>,
    saved_colors: Vec<String>,
    brand_colors: Vec<String>,
    clipboard: Vec<Layer>,
    history: History,
    config: EditorConfig,
    /// Zoom and pan; preserved across undo and redo.
    pub viewport: Viewport,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Scene {
    /// Create an empty document from `config`.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        let layers = Arc::new(Vec::new());
        let canvas = CanvasProperties::from_config(&config);
        let custom_fonts = config.fonts.clone();
        let initial = SceneSnapshot {
            layers: Arc::clone(&layers),
            selection: Vec::new(),
            canvas: canvas.clone(),
            custom_fonts: custom_fonts.clone(),
            saved_colors: Vec::new(),
            brand_colors: Vec::new(),
        };
        Self {
            layers,
            selection: Vec::new(),
            canvas_selected: false,
            canvas,
            custom_fonts,
            saved_colors: Vec::new(),
            brand_colors: Vec::new(),
            clipboard: Vec::new(),
            history: History::new(initial, config.history_limit),
            config,
            viewport: Viewport::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Top-level layers, back to front.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of top-level layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the document has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// A top-level layer by id.
    #[must_use]
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// A layer by id at any depth.
    #[must_use]
    pub fn find_layer(&self, id: LayerId) -> Option<&Layer> {
        fn find(layers: &[Layer], id: LayerId) -> Option<&Layer> {
            layers.iter().find_map(|l| {
                if l.id == id {
                    Some(l)
                } else {
                    l.children().and_then(|c| find(c, id))
                }
            })
        }
        find(&self.layers, id)
    }

    /// Z-index of a top-level layer.
    #[must_use]
    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// Selected layer ids in selection order.
    #[must_use]
    pub fn selected_ids(&self) -> &[LayerId] {
        &self.selection
    }

    /// Selected layers in z-order.
    pub fn selected_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| self.selection.contains(&l.id))
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn is_selected(&self, id: LayerId) -> bool {
        self.selection.contains(&id)
    }

    /// Whether the canvas itself (rather than any layer) is selected.
    #[must_use]
    pub fn is_canvas_selected(&self) -> bool {
        self.canvas_selected
    }

    /// Canvas properties.
    #[must_use]
    pub fn canvas(&self) -> &CanvasProperties {
        &self.canvas
    }

    /// Fonts offered to text layers, most recent first.
    #[must_use]
    pub fn custom_fonts(&self) -> &[String] {
        &self.custom_fonts
    }

    /// User swatches.
    #[must_use]
    pub fn saved_colors(&self) -> &[String] {
        &self.saved_colors
    }

    /// Brand swatches.
    #[must_use]
    pub fn brand_colors(&self) -> &[String] {
        &self.brand_colors
    }

    /// Layers most recently copied or cut.
    #[must_use]
    pub fn clipboard(&self) -> &[Layer] {
        &self.clipboard
    }

    /// Editor configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Undo history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Topmost visible top-level layer under a document point, rotation-aware.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<LayerId> {
        self.layers
            .iter()
            .rev()
            .filter(|l| l.visible)
            .find(|l| {
                let bounds = l.bounds();
                let center = bounds.center();
                let (lx, ly) = rotate_vector(point.x - center.x, point.y - center.y, -l.rotation);
                bounds.contains(Point::new(center.x + lx, center.y + ly))
            })
            .map(|l| l.id)
    }

    /// Layers and canvas for export, independent of selection.
    #[must_use]
    pub fn render_view(&self) -> RenderView {
        RenderView {
            canvas: self.canvas.clone(),
            layers: Arc::clone(&self.layers),
        }
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Capture the undo-relevant state.
    #[must_use]
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            layers: Arc::clone(&self.layers),
            selection: self.selection.clone(),
            canvas: self.canvas.clone(),
            custom_fonts: self.custom_fonts.clone(),
            saved_colors: self.saved_colors.clone(),
            brand_colors: self.brand_colors.clone(),
        }
    }

    /// Commit the current state as one undo step.
    ///
    /// Returns `false` if nothing changed since the last commit.
    pub fn take_snapshot(&mut self) -> bool {
        let recorded = self.history.record(self.snapshot());
        if recorded {
            tracing::debug!("History snapshot ({} undo steps)", self.history.past_len());
        }
        recorded
    }

    /// Restore the previous committed state. View state is kept.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    /// Re-apply the next undone state. View state is kept.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    /// Whether there is anything to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether there is anything to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn restore(&mut self, snapshot: SceneSnapshot) {
        self.layers = snapshot.layers;
        self.selection = snapshot.selection;
        self.canvas = snapshot.canvas;
        self.custom_fonts = snapshot.custom_fonts;
        self.saved_colors = snapshot.saved_colors;
        self.brand_colors = snapshot.brand_colors;
        self.canvas_selected = false;
    }

    fn layers_mut(&mut self) -> &mut Vec<Layer> {
        Arc::make_mut(&mut self.layers)
    }

    // -----------------------------------------------------------------------
    // Adding layers
    // -----------------------------------------------------------------------

    /// Add a default layer centered on the canvas and select it.
    pub fn add_layer(&mut self, template: LayerTemplate) -> LayerId {
        let (kind, (w, h)) = match template {
            LayerTemplate::Text => (LayerKind::Text(TextProperties::default()), TEXT_SIZE),
            LayerTemplate::Shape(shape) => {
                (LayerKind::Shape(ShapeProperties::new(shape)), SHAPE_SIZE)
            }
        };
        let mut layer = Layer::new(kind).with_bounds(self.centered(w, h));
        if let LayerTemplate::Shape(shape) = template {
            layer.name = format!("{shape:?}");
        }
        self.push_layer(layer)
    }

    /// Add an image scaled down to fit the canvas, centered, and select it.
    ///
    /// Returns `None` when the natural size is not a positive finite size.
    pub fn add_image_layer(
        &mut self,
        src: impl Into<String>,
        natural_width: f64,
        natural_height: f64,
    ) -> Option<LayerId> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(natural_width) || !valid(natural_height) {
            tracing::debug!("Rejecting image with size {natural_width}x{natural_height}");
            return None;
        }
        let ratio = self.config.image_fit_ratio;
        let max_w = self.canvas.width * ratio;
        let max_h = self.canvas.height * ratio;
        let scale = (max_w / natural_width).min(max_h / natural_height).min(1.0);
        let min = self.config.min_layer_size;
        let w = (natural_width * scale).max(min);
        let h = (natural_height * scale).max(min);
        let layer =
            Layer::new(LayerKind::Image(ImageProperties::new(src))).with_bounds(self.centered(w, h));
        Some(self.push_layer(layer))
    }

    fn centered(&self, w: f64, h: f64) -> Bounds {
        Bounds::new(
            (self.canvas.width - w) / 2.0,
            (self.canvas.height - h) / 2.0,
            w,
            h,
        )
    }

    fn push_layer(&mut self, layer: Layer) -> LayerId {
        let id = layer.id;
        tracing::debug!("Adding {} layer {id}", layer.kind.type_name());
        self.layers_mut().push(layer);
        self.selection = vec![id];
        self.canvas_selected = false;
        self.take_snapshot();
        id
    }

    // -----------------------------------------------------------------------
    // Updating layers (no history)
    // -----------------------------------------------------------------------

    /// Apply `patch` to the layer `id` at any depth. Does not commit.
    pub fn update_layer(&mut self, id: LayerId, patch: &LayerPatch) {
        self.update_layers(&[id], patch);
    }

    /// Apply `patch` to every layer whose id is in `ids`. Does not commit.
    pub fn update_layers(&mut self, ids: &[LayerId], patch: &LayerPatch) {
        self.map_layers(ids, |layer| patch.apply(layer));
    }

    /// Replace every layer whose id is in `ids` with `f(layer)`. Does not commit.
    ///
    /// The replacement keeps the original id whatever `f` returns. Non-finite
    /// geometry falls back to the previous value and sizes are clamped to
    /// `min_layer_size`.
    pub fn map_layers<F>(&mut self, ids: &[LayerId], f: F)
    where
        F: Fn(&Layer) -> Layer,
    {
        if !ids.iter().any(|id| self.find_layer(*id).is_some()) {
            return;
        }
        let targets: HashSet<LayerId> = ids.iter().copied().collect();
        let min_size = self.config.min_layer_size;
        map_matching(self.layers_mut(), &targets, min_size, &f);
    }

    // -----------------------------------------------------------------------
    // Removing and reordering
    // -----------------------------------------------------------------------

    /// Delete one unlocked top-level layer.
    pub fn delete_layer(&mut self, id: LayerId) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        if self.layers[index].locked {
            return;
        }
        self.layers_mut().remove(index);
        self.selection.retain(|s| *s != id);
        self.take_snapshot();
    }

    /// Delete every selected unlocked layer.
    ///
    /// Locked selected layers stay in the document and stay selected.
    /// Returns the number of layers removed.
    pub fn delete_selected_layers(&mut self) -> usize {
        let doomed: HashSet<LayerId> = self
            .selected_layers()
            .filter(|l| !l.locked)
            .map(|l| l.id)
            .collect();
        if doomed.is_empty() {
            return 0;
        }
        self.layers_mut().retain(|l| !doomed.contains(&l.id));
        self.selection.retain(|id| !doomed.contains(id));
        tracing::debug!("Deleted {} layers", doomed.len());
        self.take_snapshot();
        doomed.len()
    }

    /// Move the layer at `from` to `to` in z-order.
    ///
    /// No-op for out-of-range indices, equal indices, or a locked layer.
    pub fn reorder_layer(&mut self, from: usize, to: usize) {
        let len = self.layers.len();
        if from >= len || to >= len || from == to || self.layers[from].locked {
            return;
        }
        let layers = self.layers_mut();
        let layer = layers.remove(from);
        layers.insert(to, layer);
        self.take_snapshot();
    }

    /// Move a layer one step toward the front.
    pub fn bring_forward(&mut self, id: LayerId) {
        if let Some(i) = self.index_of(id) {
            if i + 1 < self.layers.len() {
                self.reorder_layer(i, i + 1);
            }
        }
    }

    /// Move a layer one step toward the back.
    pub fn send_backward(&mut self, id: LayerId) {
        if let Some(i) = self.index_of(id) {
            if i > 0 {
                self.reorder_layer(i, i - 1);
            }
        }
    }

    /// Move a layer to the front.
    pub fn bring_to_front(&mut self, id: LayerId) {
        if let Some(i) = self.index_of(id) {
            self.reorder_layer(i, self.layers.len() - 1);
        }
    }

    /// Move a layer to the back.
    pub fn send_to_back(&mut self, id: LayerId) {
        if let Some(i) = self.index_of(id) {
            self.reorder_layer(i, 0);
        }
    }

    // -----------------------------------------------------------------------
    // Grouping
    // -----------------------------------------------------------------------

    /// Group the selected unlocked layers.
    ///
    /// The group is sized to the members' bounding box and takes the z-slot
    /// of the topmost member. Members keep their relative order and are
    /// re-expressed relative to the group origin. Requires at least two
    /// unlocked selected layers.
    pub fn group_selected_layers(&mut self) -> Option<LayerId> {
        let indices: Vec<usize> = self
            .layers
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.locked && self.selection.contains(&l.id))
            .map(|(i, _)| i)
            .collect();
        if indices.len() < 2 {
            return None;
        }
        let depth = indices
            .iter()
            .map(|&i| layer_depth(&self.layers[i]))
            .max()
            .unwrap_or(0);
        if depth + 1 > self.config.max_group_depth {
            tracing::debug!("Refusing to nest groups deeper than {}", self.config.max_group_depth);
            return None;
        }

        let bounds = Bounds::union_all(indices.iter().map(|&i| self.layers[i].bounds()))?;
        let children: Vec<Layer> = indices
            .iter()
            .map(|&i| {
                let mut child = self.layers[i].clone();
                child.x -= bounds.x;
                child.y -= bounds.y;
                child
            })
            .collect();
        let group = Layer::new(LayerKind::Group(GroupProperties { children })).with_bounds(bounds);
        let group_id = group.id;

        let top = indices[indices.len() - 1];
        let slot = top + 1 - indices.len();
        let members: HashSet<usize> = indices.iter().copied().collect();
        let layers = self.layers_mut();
        let mut index = 0;
        layers.retain(|_| {
            let keep = !members.contains(&index);
            index += 1;
            keep
        });
        layers.insert(slot, group);

        tracing::debug!("Grouped {} layers into {group_id}", indices.len());
        self.selection = vec![group_id];
        self.canvas_selected = false;
        self.take_snapshot();
        Some(group_id)
    }

    /// Dissolve an unlocked top-level group back into document space.
    ///
    /// Children are spliced in at the group's slot in order and become the
    /// selection.
    pub fn ungroup_layer(&mut self, id: LayerId) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let group = &self.layers[index];
        if group.locked {
            return;
        }
        let Some(children) = group.children() else {
            return;
        };
        let (gx, gy) = (group.x, group.y);
        let children: Vec<Layer> = children
            .iter()
            .map(|c| {
                let mut child = c.clone();
                child.x += gx;
                child.y += gy;
                child
            })
            .collect();
        let child_ids: Vec<LayerId> = children.iter().map(|c| c.id).collect();

        self.layers_mut().splice(index..=index, children);
        tracing::debug!("Ungrouped {id} into {} layers", child_ids.len());
        self.selection = child_ids;
        self.canvas_selected = false;
        self.take_snapshot();
    }

    // -----------------------------------------------------------------------
    // Clipboard
    // -----------------------------------------------------------------------

    /// Copy the selected layers, deeply, to the clipboard.
    ///
    /// The clipboard is not part of history. Returns the number copied; with
    /// nothing selected the clipboard is left as it was.
    pub fn copy_selected_layers(&mut self) -> usize {
        let copied: Vec<Layer> = self.selected_layers().cloned().collect();
        if copied.is_empty() {
            return 0;
        }
        let count = copied.len();
        self.clipboard = copied;
        count
    }

    /// Copy the selection, then delete its unlocked layers.
    pub fn cut_selected_layers(&mut self) -> usize {
        let copied = self.copy_selected_layers();
        if copied > 0 {
            self.delete_selected_layers();
        }
        copied
    }

    /// Paste clones of the clipboard with fresh ids, offset from their
    /// clipboard position, and select them.
    pub fn paste_layers(&mut self) -> Vec<LayerId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        let offset = self.config.paste_offset;
        let pasted: Vec<Layer> = self
            .clipboard
            .iter()
            .map(|l| {
                let mut copy = l.clone_with_fresh_ids();
                copy.x += offset;
                copy.y += offset;
                copy
            })
            .collect();
        let ids: Vec<LayerId> = pasted.iter().map(|l| l.id).collect();
        self.layers_mut().extend(pasted);
        tracing::debug!("Pasted {} layers", ids.len());
        self.selection.clone_from(&ids);
        self.canvas_selected = false;
        self.take_snapshot();
        ids
    }

    // -----------------------------------------------------------------------
    // Canvas properties
    // -----------------------------------------------------------------------

    /// Resize the canvas. Non-positive sizes are ignored.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        if !(width > 0.0 && height > 0.0) {
            return;
        }
        self.canvas.width = width;
        self.canvas.height = height;
        self.take_snapshot();
    }

    /// Change the canvas background color.
    pub fn set_canvas_background(&mut self, color: impl Into<String>) {
        self.canvas.background = color.into();
        self.take_snapshot();
    }

    /// Rename the document without committing; see [`Scene::commit_canvas_name`].
    pub fn set_canvas_name(&mut self, name: impl Into<String>) {
        self.canvas.name = name.into();
    }

    /// Commit a pending rename as one undo step.
    pub fn commit_canvas_name(&mut self) -> bool {
        self.take_snapshot()
    }

    // -----------------------------------------------------------------------
    // Flags
    // -----------------------------------------------------------------------

    /// Flip the visibility of a top-level layer.
    pub fn toggle_layer_visibility(&mut self, id: LayerId) {
        self.toggle_flag(id, |l| l.visible = !l.visible);
    }

    /// Flip the lock of a top-level layer.
    pub fn toggle_layer_lock(&mut self, id: LayerId) {
        self.toggle_flag(id, |l| l.locked = !l.locked);
    }

    fn toggle_flag(&mut self, id: LayerId, flip: impl Fn(&mut Layer)) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        flip(&mut self.layers_mut()[index]);
        self.take_snapshot();
    }

    // -----------------------------------------------------------------------
    // Selection (never committed)
    // -----------------------------------------------------------------------

    /// Replace the selection. Ids that are not top-level layers are dropped.
    pub fn set_selected_layers(&mut self, ids: &[LayerId]) {
        let mut selection = Vec::with_capacity(ids.len());
        for id in ids {
            if self.layer(*id).is_some() && !selection.contains(id) {
                selection.push(*id);
            }
        }
        self.selection = selection;
        self.canvas_selected = false;
    }

    /// Add `id` to, or remove it from, the selection.
    pub fn toggle_selection(&mut self, id: LayerId) {
        if self.layer(id).is_none() {
            return;
        }
        if let Some(pos) = self.selection.iter().position(|s| *s == id) {
            self.selection.remove(pos);
        } else {
            self.selection.push(id);
        }
        self.canvas_selected = false;
    }

    /// Select the canvas, deselecting every layer.
    pub fn select_canvas(&mut self) {
        self.selection.clear();
        self.canvas_selected = true;
    }

    /// Select nothing.
    pub fn deselect_all(&mut self) {
        self.selection.clear();
        self.canvas_selected = false;
    }

    // -----------------------------------------------------------------------
    // Fonts and palettes
    // -----------------------------------------------------------------------

    /// Offer a font family first in the font list.
    pub fn add_custom_font(&mut self, family: &str) {
        self.add_custom_fonts(std::iter::once(family));
    }

    /// Offer several font families, in order, ahead of the existing list.
    pub fn add_custom_fonts<'a>(&mut self, families: impl IntoIterator<Item = &'a str>) {
        let mut added: Vec<String> = Vec::new();
        for family in families {
            let family = family.trim();
            if !family.is_empty() && !added.iter().any(|f| f == family) {
                added.push(family.to_string());
            }
        }
        if added.is_empty() {
            return;
        }
        self.custom_fonts.retain(|f| !added.contains(f));
        added.append(&mut self.custom_fonts);
        self.custom_fonts = added;
        self.take_snapshot();
    }

    /// Save a swatch unless an equal one (ignoring case) exists.
    pub fn save_color(&mut self, color: &str) {
        let color = color.trim();
        if color.is_empty() || self.saved_colors.iter().any(|c| c.eq_ignore_ascii_case(color)) {
            return;
        }
        self.saved_colors.push(color.to_string());
        self.take_snapshot();
    }

    /// Remove a saved swatch, ignoring case.
    pub fn remove_saved_color(&mut self, color: &str) {
        let before = self.saved_colors.len();
        self.saved_colors.retain(|c| !c.eq_ignore_ascii_case(color));
        if self.saved_colors.len() != before {
            self.take_snapshot();
        }
    }

    /// Replace the brand palette.
    pub fn set_brand_colors(&mut self, colors: Vec<String>) {
        self.brand_colors = colors;
        self.take_snapshot();
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    /// The persistent form of the current document.
    #[must_use]
    pub fn to_document(&self) -> DesignDocument {
        DesignDocument {
            canvas: self.canvas.clone(),
            layers: self.layers.as_ref().clone(),
            custom_fonts: self.custom_fonts.clone(),
            saved_colors: self.saved_colors.clone(),
            brand_colors: self.brand_colors.clone(),
            updated_at: current_timestamp_ms(),
        }
    }

    /// Replace the document with `document` and start a fresh history.
    ///
    /// The clipboard and view state are kept. Configured fonts missing from
    /// the document are appended after its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the document fails validation.
    pub fn load_document(&mut self, document: DesignDocument) -> CanvasResult<()> {
        document.validate(&self.config)?;
        self.layers = Arc::new(document.layers);
        self.canvas = document.canvas;
        self.custom_fonts = merged_fonts(document.custom_fonts, &self.config.fonts);
        self.saved_colors = document.saved_colors;
        self.brand_colors = document.brand_colors;
        self.selection.clear();
        self.canvas_selected = false;
        self.history.reset(self.snapshot());
        tracing::debug!("Loaded document '{}' with {} layers", self.canvas.name, self.layers.len());
        Ok(())
    }
}

fn map_matching<F>(layers: &mut [Layer], targets: &HashSet<LayerId>, min_size: f64, f: &F)
where
    F: Fn(&Layer) -> Layer,
{
    for layer in layers.iter_mut() {
        if targets.contains(&layer.id) {
            let mut next = f(layer);
            next.id = layer.id;
            keep_finite(&mut next.x, layer.x);
            keep_finite(&mut next.y, layer.y);
            keep_finite(&mut next.width, layer.width);
            keep_finite(&mut next.height, layer.height);
            keep_finite(&mut next.rotation, layer.rotation);
            keep_finite(&mut next.opacity, layer.opacity);
            next.width = next.width.max(min_size);
            next.height = next.height.max(min_size);
            *layer = next;
        }
        if let LayerKind::Group(group) = &mut layer.kind {
            map_matching(&mut group.children, targets, min_size, f);
        }
    }
}

fn merged_fonts(mut fonts: Vec<String>, configured: &[String]) -> Vec<String> {
    for font in configured {
        if !fonts.contains(font) {
            fonts.push(font.clone());
        }
    }
    fonts
}

fn keep_finite(value: &mut f64, previous: f64) {
    if !value.is_finite() {
        *value = previous;
    }
}

/// Group nesting depth: 0 for a leaf.
pub(crate) fn layer_depth(layer: &Layer) -> usize {
    layer
        .children()
        .map_or(0, |c| 1 + c.iter().map(layer_depth).max().unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeKind;

    fn rect(scene: &mut Scene, x: f64, y: f64, w: f64, h: f64) -> LayerId {
        let id = scene.add_layer(LayerTemplate::Shape(ShapeKind::Rectangle));
        scene.update_layer(id, &LayerPatch::bounds(Bounds::new(x, y, w, h)));
        scene.take_snapshot();
        id
    }

    fn ids(scene: &Scene) -> Vec<LayerId> {
        scene.layers().iter().map(|l| l.id).collect()
    }

    #[test]
    fn test_add_layer_defaults() {
        let mut scene = Scene::default();
        let text = scene.add_layer(LayerTemplate::Text);
        let layer = scene.layer(text).expect("text layer");
        assert_eq!(layer.bounds(), Bounds::new(440.0, 515.0, 200.0, 50.0));
        assert_eq!(scene.selected_ids(), &[text]);

        scene.select_canvas();
        let shape = scene.add_layer(LayerTemplate::Shape(ShapeKind::Star));
        let layer = scene.layer(shape).expect("shape layer");
        assert_eq!(layer.bounds(), Bounds::new(490.0, 490.0, 100.0, 100.0));
        assert_eq!(scene.selected_ids(), &[shape]);
        assert!(!scene.is_canvas_selected());
    }

    #[test]
    fn test_add_image_layer_scales_down_only() {
        let mut scene = Scene::default();
        let big = scene.add_image_layer("big.png", 2000.0, 1000.0).expect("big");
        let layer = scene.layer(big).expect("layer");
        // 80% of 1080 = 864 wide, aspect 2:1
        assert!((layer.width - 864.0).abs() < 1e-9);
        assert!((layer.height - 432.0).abs() < 1e-9);
        assert!((layer.x - 108.0).abs() < 1e-9);
        assert!((layer.y - 324.0).abs() < 1e-9);

        let small = scene.add_image_layer("small.png", 200.0, 100.0).expect("small");
        let layer = scene.layer(small).expect("layer");
        assert!((layer.width - 200.0).abs() < f64::EPSILON);
        assert!((layer.height - 100.0).abs() < f64::EPSILON);

        assert!(scene.add_image_layer("bad.png", 0.0, 10.0).is_none());
    }

    #[test]
    fn test_update_does_not_commit() {
        let mut scene = Scene::default();
        let id = scene.add_layer(LayerTemplate::Text);
        let steps = scene.history().past_len();
        scene.update_layer(id, &LayerPatch::position(1.0, 2.0));
        assert_eq!(scene.history().past_len(), steps);
        scene.update_layer(LayerId::new(), &LayerPatch::position(9.0, 9.0));
        let layer = scene.layer(id).expect("layer");
        assert!((layer.x - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_map_layers_keeps_id() {
        let mut scene = Scene::default();
        let id = scene.add_layer(LayerTemplate::Text);
        scene.map_layers(&[id], |l| {
            let mut fresh = l.clone_with_fresh_ids();
            fresh.opacity = 0.5;
            fresh
        });
        let layer = scene.layer(id).expect("still addressable");
        assert!((layer.opacity - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_clamps_degenerate_geometry() {
        let mut scene = Scene::default();
        let id = rect(&mut scene, 40.0, 50.0, 100.0, 80.0);

        scene.update_layer(id, &LayerPatch::bounds(Bounds::new(40.0, 50.0, 0.0, -5.0)));
        let layer = scene.layer(id).expect("layer");
        assert!((layer.width - 10.0).abs() < f64::EPSILON);
        assert!((layer.height - 10.0).abs() < f64::EPSILON);

        scene.update_layer(id, &LayerPatch::bounds(Bounds::new(f64::NAN, 60.0, f64::NAN, 30.0)));
        let layer = scene.layer(id).expect("layer");
        assert!((layer.x - 40.0).abs() < f64::EPSILON);
        assert!((layer.y - 60.0).abs() < f64::EPSILON);
        assert!((layer.width - 10.0).abs() < f64::EPSILON);
        assert!((layer.height - 30.0).abs() < f64::EPSILON);

        // the clamped layer still passes document validation
        scene
            .to_document()
            .validate(scene.config())
            .expect("valid document");
    }

    #[test]
    fn test_delete_layer_skips_locked() {
        let mut scene = Scene::default();
        let a = rect(&mut scene, 0.0, 0.0, 50.0, 50.0);
        let b = rect(&mut scene, 60.0, 0.0, 50.0, 50.0);
        scene.update_layer(b, &LayerPatch { locked: Some(true), ..LayerPatch::default() });
        scene.take_snapshot();

        scene.delete_layer(b);
        assert_eq!(ids(&scene), vec![a, b]);

        scene.delete_layer(a);
        assert_eq!(ids(&scene), vec![b]);
        assert!(!scene.is_selected(a));
        scene.undo();
        assert_eq!(ids(&scene), vec![a, b]);

        // unknown ids are ignored
        scene.delete_layer(LayerId::new());
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_delete_selected_respects_lock() {
        let mut scene = Scene::default();
        let a = rect(&mut scene, 0.0, 0.0, 50.0, 50.0);
        let b = rect(&mut scene, 60.0, 0.0, 50.0, 50.0);
        let c = rect(&mut scene, 120.0, 0.0, 50.0, 50.0);
        scene.toggle_layer_lock(b);
        scene.set_selected_layers(&[a, b, c]);

        assert_eq!(scene.delete_selected_layers(), 2);
        assert_eq!(ids(&scene), vec![b]);
        assert_eq!(scene.selected_ids(), &[b]);
    }

    #[test]
    fn test_reorder_preserves_ids() {
        let mut scene = Scene::default();
        let a = rect(&mut scene, 0.0, 0.0, 10.0, 10.0);
        let b = rect(&mut scene, 0.0, 0.0, 10.0, 10.0);
        let c = rect(&mut scene, 0.0, 0.0, 10.0, 10.0);

        scene.reorder_layer(0, 2);
        assert_eq!(ids(&scene), vec![b, c, a]);
        scene.send_to_back(a);
        assert_eq!(ids(&scene), vec![a, b, c]);
        scene.bring_forward(a);
        assert_eq!(ids(&scene), vec![b, a, c]);
        scene.send_backward(a);
        assert_eq!(ids(&scene), vec![a, b, c]);
        scene.bring_to_front(a);
        assert_eq!(ids(&scene), vec![b, c, a]);

        let mut sorted_before = vec![a, b, c];
        let mut sorted_after = ids(&scene);
        sorted_before.sort();
        sorted_after.sort();
        assert_eq!(sorted_before, sorted_after);
    }

    #[test]
    fn test_reorder_noops() {
        let mut scene = Scene::default();
        let a = rect(&mut scene, 0.0, 0.0, 10.0, 10.0);
        let b = rect(&mut scene, 0.0, 0.0, 10.0, 10.0);
        let steps = scene.history().past_len();

        scene.bring_to_front(b);
        scene.send_to_back(a);
        scene.reorder_layer(0, 5);
        scene.toggle_layer_lock(a);
        let steps_after_lock = scene.history().past_len();
        scene.bring_forward(a);
        assert_eq!(ids(&scene), vec![a, b]);
        assert_eq!(steps_after_lock, steps + 1);
        assert_eq!(scene.history().past_len(), steps_after_lock);
    }

    #[test]
    fn test_group_bounding_box() {
        let mut scene = Scene::default();
        let a = rect(&mut scene, 0.0, 0.0, 50.0, 50.0);
        let b = rect(&mut scene, 100.0, 100.0, 50.0, 50.0);
        scene.set_selected_layers(&[a, b]);

        let group_id = scene.group_selected_layers().expect("grouped");
        let group = scene.layer(group_id).expect("group");
        assert_eq!(group.bounds(), Bounds::new(0.0, 0.0, 150.0, 150.0));
        let children = group.children().expect("children");
        assert_eq!(children[0].id, a);
        assert_eq!((children[0].x, children[0].y), (0.0, 0.0));
        assert_eq!(children[1].id, b);
        assert_eq!((children[1].x, children[1].y), (100.0, 100.0));
        assert_eq!(scene.selected_ids(), &[group_id]);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_group_takes_topmost_slot() {
        let mut scene = Scene::default();
        let a = rect(&mut scene, 0.0, 0.0, 10.0, 10.0);
        let b = rect(&mut scene, 0.0, 0.0, 10.0, 10.0);
        let c = rect(&mut scene, 0.0, 0.0, 10.0, 10.0);
        let d = rect(&mut scene, 0.0, 0.0, 10.0, 10.0);
        scene.set_selected_layers(&[c, a]);

        let g = scene.group_selected_layers().expect("grouped");
        assert_eq!(ids(&scene), vec![b, g, d]);
    }

    #[test]
    fn test_group_requires_two_unlocked() {
        let mut scene = Scene::default();
        let a = rect(&mut scene, 0.0, 0.0, 10.0, 10.0);
        let b = rect(&mut scene, 20.0, 0.0, 10.0, 10.0);
        scene.toggle_layer_lock(b);
        scene.set_selected_layers(&[a, b]);
        assert!(scene.group_selected_layers().is_none());
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_group_then_ungroup_restores_geometry() {
        let mut scene = Scene::default();
        let a = rect(&mut scene, 10.0, 20.0, 50.0, 40.0);
        let b = rect(&mut scene, 100.0, 130.0, 30.0, 70.0);
        scene.update_layer(b, &LayerPatch::rotation(30.0));
        let originals: Vec<Layer> = scene.layers().to_vec();
        scene.set_selected_layers(&[a, b]);

        let g = scene.group_selected_layers().expect("grouped");
        scene.ungroup_layer(g);

        assert_eq!(scene.layers(), originals.as_slice());
        assert_eq!(scene.selected_ids(), &[a, b]);
    }

    #[test]
    fn test_ungroup_locked_is_noop() {
        let mut scene = Scene::default();
        let a = rect(&mut scene, 0.0, 0.0, 10.0, 10.0);
        let b = rect(&mut scene, 20.0, 0.0, 10.0, 10.0);
        scene.set_selected_layers(&[a, b]);
        let g = scene.group_selected_layers().expect("grouped");
        scene.toggle_layer_lock(g);
        scene.ungroup_layer(g);
        assert_eq!(ids(&scene), vec![g]);
        scene.ungroup_layer(a);
        assert_eq!(ids(&scene), vec![g]);
    }

    #[test]
    fn test_paste_fresh_ids_and_offset() {
        let mut scene = Scene::default();
        let a = rect(&mut scene, 0.0, 0.0, 10.0, 10.0);
        let b = rect(&mut scene, 30.0, 0.0, 10.0, 10.0);
        scene.set_selected_layers(&[a, b]);
        let g = scene.group_selected_layers().expect("grouped");
        let c = rect(&mut scene, 200.0, 200.0, 10.0, 10.0);
        scene.set_selected_layers(&[g, c]);

        let existing: Vec<LayerId> = scene.layers().iter().flat_map(Layer::all_ids).collect();
        assert_eq!(scene.copy_selected_layers(), 2);
        let pasted = scene.paste_layers();

        assert_eq!(pasted.len(), 2);
        assert_eq!(scene.selected_ids(), pasted.as_slice());
        for (source, id) in scene.clipboard().to_vec().iter().zip(&pasted) {
            let layer = scene.layer(*id).expect("pasted layer");
            assert!((layer.x - (source.x + 20.0)).abs() < f64::EPSILON);
            assert!((layer.y - (source.y + 20.0)).abs() < f64::EPSILON);
            assert!(layer.all_ids().iter().all(|i| !existing.contains(i)));
            assert_eq!(layer.all_ids().len(), source.all_ids().len());
        }
    }

    #[test]
    fn test_paste_empty_clipboard_is_noop() {
        let mut scene = Scene::default();
        let steps = scene.history().past_len();
        assert!(scene.paste_layers().is_empty());
        assert_eq!(scene.history().past_len(), steps);
    }

    #[test]
    fn test_cut_respects_lock() {
        let mut scene = Scene::default();
        let a = rect(&mut scene, 0.0, 0.0, 10.0, 10.0);
        let b = rect(&mut scene, 20.0, 0.0, 10.0, 10.0);
        scene.toggle_layer_lock(a);
        scene.set_selected_layers(&[a, b]);
        assert_eq!(scene.cut_selected_layers(), 2);
        assert_eq!(ids(&scene), vec![a]);
        assert_eq!(scene.clipboard().len(), 2);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut scene = Scene::default();
        let a = rect(&mut scene, 0.0, 0.0, 50.0, 50.0);
        scene.set_canvas_background("#ff0000");
        scene.set_canvas_size(800.0, 600.0);
        scene.toggle_layer_visibility(a);
        scene.copy_selected_layers();
        scene.set_selected_layers(&[a]);
        scene.copy_selected_layers();
        scene.paste_layers();
        let final_state = scene.snapshot();

        let steps = scene.history().past_len();
        for _ in 0..steps {
            assert!(scene.undo());
        }
        assert!(scene.is_empty());
        assert!(!scene.undo());
        for _ in 0..steps {
            assert!(scene.redo());
        }
        assert!(scene.snapshot().same_state(&final_state));
    }

    #[test]
    fn test_undo_keeps_viewport() {
        let mut scene = Scene::default();
        scene.add_layer(LayerTemplate::Text);
        scene.viewport.zoom = 3.0;
        scene.viewport.pan_x = 40.0;
        scene.undo();
        assert!((scene.viewport.zoom - 3.0).abs() < f64::EPSILON);
        assert!((scene.viewport.pan_x - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_commit_clears_redo() {
        let mut scene = Scene::default();
        scene.add_layer(LayerTemplate::Text);
        scene.undo();
        assert!(scene.can_redo());
        scene.add_layer(LayerTemplate::Text);
        assert!(!scene.can_redo());
    }

    #[test]
    fn test_selection_ops_do_not_commit() {
        let mut scene = Scene::default();
        let a = rect(&mut scene, 0.0, 0.0, 10.0, 10.0);
        let steps = scene.history().past_len();
        scene.select_canvas();
        assert!(scene.is_canvas_selected());
        scene.toggle_selection(a);
        assert!(!scene.is_canvas_selected());
        scene.set_selected_layers(&[a, LayerId::new(), a]);
        assert_eq!(scene.selected_ids(), &[a]);
        scene.deselect_all();
        assert_eq!(scene.history().past_len(), steps);
    }

    #[test]
    fn test_canvas_name_commits_on_request() {
        let mut scene = Scene::default();
        let steps = scene.history().past_len();
        scene.set_canvas_name("Poster");
        assert_eq!(scene.history().past_len(), steps);
        assert!(scene.commit_canvas_name());
        assert_eq!(scene.history().past_len(), steps + 1);
    }

    #[test]
    fn test_fonts_prepend_and_dedupe() {
        let mut scene = Scene::default();
        scene.add_custom_font("Bungee");
        scene.add_custom_font("Roboto");
        assert_eq!(scene.custom_fonts()[0], "Roboto");
        assert_eq!(scene.custom_fonts()[1], "Bungee");
        assert_eq!(
            scene.custom_fonts().iter().filter(|f| *f == "Roboto").count(),
            1
        );
    }

    #[test]
    fn test_saved_colors_case_insensitive() {
        let mut scene = Scene::default();
        scene.save_color("#FFAA00");
        scene.save_color("#ffaa00");
        assert_eq!(scene.saved_colors(), &["#FFAA00".to_string()]);
        scene.remove_saved_color("#ffAA00");
        assert!(scene.saved_colors().is_empty());
    }

    #[test]
    fn test_hit_test_topmost_and_rotated() {
        let mut scene = Scene::default();
        let a = rect(&mut scene, 0.0, 0.0, 100.0, 100.0);
        let b = rect(&mut scene, 50.0, 50.0, 100.0, 100.0);
        assert_eq!(scene.hit_test(Point::new(75.0, 75.0)), Some(b));
        assert_eq!(scene.hit_test(Point::new(10.0, 10.0)), Some(a));

        let thin = rect(&mut scene, 400.0, 0.0, 100.0, 10.0);
        scene.update_layer(thin, &LayerPatch::rotation(90.0));
        // rotated about (450, 5): now spans y -45..55 at x 445..455
        assert_eq!(scene.hit_test(Point::new(450.0, 40.0)), Some(thin));
        assert_eq!(scene.hit_test(Point::new(490.0, 5.0)), None);
    }

    #[test]
    fn test_document_round_trip() {
        let mut scene = Scene::default();
        rect(&mut scene, 0.0, 0.0, 10.0, 10.0);
        scene.set_canvas_name("Flyer");
        let doc = scene.to_document();

        let mut other = Scene::default();
        other.load_document(doc).expect("load");
        assert_eq!(other.layers(), scene.layers());
        assert_eq!(other.canvas().name, "Flyer");
        assert!(!other.can_undo());
    }

    #[test]
    fn test_load_keeps_configured_fonts() {
        let mut scene = Scene::default();
        let doc = DesignDocument {
            custom_fonts: vec!["Lobster".to_string(), "Inter".to_string()],
            ..DesignDocument::default()
        };
        scene.load_document(doc).expect("load");
        let fonts = scene.custom_fonts();
        assert_eq!(fonts[0], "Lobster");
        assert_eq!(fonts[1], "Inter");
        assert!(crate::config::BUILTIN_FONTS
            .iter()
            .all(|f| fonts.iter().filter(|g| g.as_str() == *f).count() == 1));

        scene.load_document(DesignDocument::default()).expect("load");
        assert_eq!(scene.custom_fonts(), scene.config().fonts.as_slice());
    }
}
