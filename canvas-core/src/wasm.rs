//! WebAssembly bindings for canvas-core.
//!
//! This module provides JavaScript-callable functions when compiled to WASM.
//! Structured values cross the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::{
    DesignDocument, EditorConfig, Interaction, LayerId, LayerPatch, LayerTemplate, Modifiers,
    Point, PointerTarget, Scene, ShapeKind,
};

/// Initialize the canvas WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Editor instance for WASM: one scene plus its gesture controller.
#[wasm_bindgen]
pub struct WasmEditor {
    scene: Scene,
    interaction: Interaction,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor with the default configuration.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            scene: Scene::default(),
            interaction: Interaction::new(),
        }
    }

    /// Create an editor from a JSON [`EditorConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error string if the config cannot be parsed.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(json: &str) -> Result<WasmEditor, String> {
        let config = EditorConfig::from_json(json).map_err(|e| e.to_string())?;
        Ok(Self {
            scene: Scene::new(config),
            interaction: Interaction::new(),
        })
    }

    /// Get the current document as JSON.
    #[wasm_bindgen(js_name = getDocumentJson)]
    #[must_use]
    pub fn get_document_json(&self) -> String {
        self.scene.to_document().to_json().unwrap_or_default()
    }

    /// Replace the document from JSON, resetting history.
    ///
    /// # Errors
    ///
    /// Returns an error string if parsing or validation fails.
    #[wasm_bindgen(js_name = loadDocumentJson)]
    pub fn load_document_json(&mut self, json: &str) -> Result<(), String> {
        let document = DesignDocument::from_json(json).map_err(|e| e.to_string())?;
        self.scene.load_document(document).map_err(|e| e.to_string())
    }

    /// Add a default text layer. Returns its id.
    #[wasm_bindgen(js_name = addText)]
    pub fn add_text(&mut self) -> String {
        self.scene.add_layer(LayerTemplate::Text).to_string()
    }

    /// Add a default shape such as `"star"`. Returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown shape kind.
    #[wasm_bindgen(js_name = addShape)]
    pub fn add_shape(&mut self, kind: &str) -> Result<String, String> {
        let kind: ShapeKind =
            serde_json::from_value(serde_json::Value::String(kind.to_string()))
                .map_err(|e| e.to_string())?;
        Ok(self.scene.add_layer(LayerTemplate::Shape(kind)).to_string())
    }

    /// Add an image of known natural size. Returns its id, or `undefined` for an empty size.
    #[wasm_bindgen(js_name = addImage)]
    pub fn add_image(&mut self, src: &str, width: f64, height: f64) -> Option<String> {
        self.scene
            .add_image_layer(src, width, height)
            .map(|id| id.to_string())
    }

    /// Apply a JSON [`LayerPatch`] to a layer without committing.
    ///
    /// # Errors
    ///
    /// Returns an error string if the id or patch cannot be parsed.
    #[wasm_bindgen(js_name = updateLayer)]
    pub fn update_layer(&mut self, id: &str, patch_json: &str) -> Result<(), String> {
        let id = LayerId::parse(id).map_err(|e| e.to_string())?;
        let patch: LayerPatch = serde_json::from_str(patch_json).map_err(|e| e.to_string())?;
        self.scene.update_layer(id, &patch);
        Ok(())
    }

    /// Commit pending changes as one undo step.
    #[wasm_bindgen(js_name = commit)]
    pub fn commit(&mut self) -> bool {
        self.scene.take_snapshot()
    }

    /// Delete one layer unless it is locked.
    ///
    /// # Errors
    ///
    /// Returns an error string if the id cannot be parsed.
    #[wasm_bindgen(js_name = deleteLayer)]
    pub fn delete_layer(&mut self, id: &str) -> Result<(), String> {
        let id = LayerId::parse(id).map_err(|e| e.to_string())?;
        self.scene.delete_layer(id);
        Ok(())
    }

    /// Delete the selected unlocked layers.
    #[wasm_bindgen(js_name = deleteSelected)]
    pub fn delete_selected(&mut self) -> usize {
        self.scene.delete_selected_layers()
    }

    /// Group the selection. Returns the group id.
    #[wasm_bindgen(js_name = groupSelected)]
    pub fn group_selected(&mut self) -> Option<String> {
        self.scene.group_selected_layers().map(|id| id.to_string())
    }

    /// Ungroup a group layer.
    ///
    /// # Errors
    ///
    /// Returns an error string if the id cannot be parsed.
    #[wasm_bindgen(js_name = ungroup)]
    pub fn ungroup(&mut self, id: &str) -> Result<(), String> {
        let id = LayerId::parse(id).map_err(|e| e.to_string())?;
        self.scene.ungroup_layer(id);
        Ok(())
    }

    /// Copy the selection.
    #[wasm_bindgen(js_name = copy)]
    pub fn copy(&mut self) -> usize {
        self.scene.copy_selected_layers()
    }

    /// Cut the selection.
    #[wasm_bindgen(js_name = cut)]
    pub fn cut(&mut self) -> usize {
        self.scene.cut_selected_layers()
    }

    /// Paste the clipboard. Returns the number of layers pasted.
    #[wasm_bindgen(js_name = paste)]
    pub fn paste(&mut self) -> usize {
        self.scene.paste_layers().len()
    }

    /// Undo one step.
    #[wasm_bindgen(js_name = undo)]
    pub fn undo(&mut self) -> bool {
        self.scene.undo()
    }

    /// Redo one step.
    #[wasm_bindgen(js_name = redo)]
    pub fn redo(&mut self) -> bool {
        self.scene.redo()
    }

    /// Whether undo is available.
    #[wasm_bindgen(js_name = canUndo)]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.scene.can_undo()
    }

    /// Whether redo is available.
    #[wasm_bindgen(js_name = canRedo)]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.scene.can_redo()
    }

    /// Selected layer ids as a JSON array.
    #[wasm_bindgen(js_name = getSelectionJson)]
    #[must_use]
    pub fn get_selection_json(&self) -> String {
        serde_json::to_string(self.scene.selected_ids()).unwrap_or_default()
    }

    /// Pointer pressed at a screen point.
    ///
    /// `target_json` is a [`PointerTarget`]; pass an empty string to hit-test.
    ///
    /// # Errors
    ///
    /// Returns an error string if the target or modifiers cannot be parsed.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(
        &mut self,
        target_json: &str,
        x: f64,
        y: f64,
        modifiers_json: &str,
    ) -> Result<(), String> {
        let screen = Point::new(x, y);
        let target = if target_json.is_empty() {
            Interaction::target_at(&self.scene, screen)
        } else {
            serde_json::from_str::<PointerTarget>(target_json).map_err(|e| e.to_string())?
        };
        let modifiers = parse_modifiers(modifiers_json)?;
        self.interaction
            .pointer_down(&mut self.scene, target, screen, modifiers);
        Ok(())
    }

    /// Pointer moved to a screen point.
    ///
    /// # Errors
    ///
    /// Returns an error string if the modifiers cannot be parsed.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64, modifiers_json: &str) -> Result<(), String> {
        let modifiers = parse_modifiers(modifiers_json)?;
        self.interaction
            .pointer_move(&mut self.scene, Point::new(x, y), modifiers);
        Ok(())
    }

    /// Pointer released.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) {
        self.interaction.pointer_up(&mut self.scene);
    }

    /// Wheel scrolled over a screen point.
    ///
    /// # Errors
    ///
    /// Returns an error string if the modifiers cannot be parsed.
    #[wasm_bindgen(js_name = wheel)]
    pub fn wheel(
        &mut self,
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
        modifiers_json: &str,
    ) -> Result<(), String> {
        let modifiers = parse_modifiers(modifiers_json)?;
        self.interaction
            .wheel(&mut self.scene, Point::new(x, y), dx, dy, modifiers);
        Ok(())
    }

    /// Space key pressed or released.
    #[wasm_bindgen(js_name = setSpacePan)]
    pub fn set_space_pan(&mut self, held: bool) {
        self.interaction.set_space_pan(held);
    }

    /// Active snap guides as JSON.
    #[wasm_bindgen(js_name = getGuidesJson)]
    #[must_use]
    pub fn get_guides_json(&self) -> String {
        serde_json::to_string(self.interaction.guides()).unwrap_or_default()
    }

    /// Current viewport as JSON.
    #[wasm_bindgen(js_name = getViewportJson)]
    #[must_use]
    pub fn get_viewport_json(&self) -> String {
        serde_json::to_string(&self.scene.viewport).unwrap_or_default()
    }
}

impl Default for WasmEditor {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_modifiers(json: &str) -> Result<Modifiers, String> {
    if json.is_empty() {
        return Ok(Modifiers::default());
    }
    serde_json::from_str(json).map_err(|e| e.to_string())
}
