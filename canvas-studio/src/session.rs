//! Project sessions.
//!
//! A [`Studio`] owns the open design and wires it to a design store, an
//! image generator, and the exporter. Every fallible operation both returns
//! its error and queues a [`Notice`] for the presentation layer.

use std::sync::Arc;

use canvas_core::{DesignStore, EditorConfig, LayerId, Scene};
use canvas_renderer::{ExportConfig, ExportFormat, RenderError, SceneExporter};

use crate::error::{Notice, StudioError, StudioResult};
use crate::generate::{
    apply_brand_palette, generate_into_scene, place_generated_image, GenerationRequest,
    ImageGenerator, Workflow,
};

/// Longest side of the preview stored alongside a design.
pub const PREVIEW_SIZE: u32 = 320;

/// An editing session over one design at a time.
pub struct Studio {
    scene: Scene,
    project_id: Option<String>,
    store: Arc<dyn DesignStore>,
    generator: Arc<dyn ImageGenerator>,
    exporter: SceneExporter,
    notices: Vec<Notice>,
}

impl Studio {
    /// Start a session with an empty design and default configuration.
    #[must_use]
    pub fn new(store: Arc<dyn DesignStore>, generator: Arc<dyn ImageGenerator>) -> Self {
        Self::with_config(store, generator, EditorConfig::default(), ExportConfig::default())
    }

    /// Start a session with explicit editor and export configuration.
    #[must_use]
    pub fn with_config(
        store: Arc<dyn DesignStore>,
        generator: Arc<dyn ImageGenerator>,
        config: EditorConfig,
        export: ExportConfig,
    ) -> Self {
        Self {
            scene: Scene::new(config),
            project_id: None,
            store,
            generator,
            exporter: SceneExporter::new(export),
            notices: Vec::new(),
        }
    }

    /// The open design.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The open design, for editing.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Id the design was last opened from or saved as.
    #[must_use]
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// Drain queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Replace the open design with a new empty one.
    pub fn new_design(&mut self) {
        self.scene = Scene::new(self.scene.config().clone());
        self.project_id = None;
    }

    /// Load the design stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the design is missing, unreadable, or invalid.
    /// The open design is unchanged on error.
    pub fn open(&mut self, id: &str) -> StudioResult<()> {
        let result = self.try_open(id);
        self.report(result, || Notice::info(format!("Opened \"{id}\"")))
    }

    fn try_open(&mut self, id: &str) -> StudioResult<()> {
        let document = self
            .store
            .get(id)?
            .ok_or_else(|| StudioError::NotFound(id.to_string()))?;
        let count = document.layer_count();
        self.scene.load_document(document)?;
        self.project_id = Some(id.to_string());
        tracing::info!("Opened design {id} with {count} layers");
        Ok(())
    }

    /// Save the open design under `id`, with a preview when raster export
    /// is available.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the design.
    pub fn save(&mut self, id: &str) -> StudioResult<()> {
        let result = self.try_save(id);
        self.report(result, || Notice::info("Design saved"))
    }

    fn try_save(&mut self, id: &str) -> StudioResult<()> {
        // a rename is recorded as an undo step only when the design is saved
        self.scene.commit_canvas_name();
        let document = self.scene.to_document();
        let preview = self.preview();
        self.store.put(id, &document, preview.as_deref())?;
        self.project_id = Some(id.to_string());
        tracing::info!(
            "Saved design {id} ({} layers, preview: {})",
            document.layer_count(),
            preview.is_some()
        );
        Ok(())
    }

    fn preview(&self) -> Option<Vec<u8>> {
        let png = match self.exporter.export(&self.scene, ExportFormat::Png) {
            Ok(png) => png,
            Err(RenderError::Unsupported(_)) => return None,
            Err(e) => {
                tracing::warn!("Skipping preview: {e}");
                return None;
            }
        };
        canvas_renderer::image::thumbnail_png(&png, PREVIEW_SIZE)
            .map_err(|e| tracing::warn!("Skipping preview: {e}"))
            .ok()
    }

    /// Delete the design stored under `id`.
    ///
    /// Deleting the open design detaches the session from it but keeps the
    /// contents on screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot remove the design.
    pub fn delete(&mut self, id: &str) -> StudioResult<()> {
        let result = self.store.delete(id).map_err(StudioError::from);
        if result.is_ok() {
            tracing::info!("Deleted design {id}");
            if self.project_id.as_deref() == Some(id) {
                self.project_id = None;
            }
        }
        self.report(result, || Notice::info("Design deleted"))
    }

    /// Ids of every stored design.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be listed.
    pub fn list(&mut self) -> StudioResult<Vec<String>> {
        self.store.list().map_err(|e| {
            let err = StudioError::from(e);
            tracing::warn!("{err}");
            self.notices.push(Notice::from(&err));
            err
        })
    }

    /// Export the open design.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn export(&mut self, format: ExportFormat) -> StudioResult<Vec<u8>> {
        let result = self
            .exporter
            .export(&self.scene, format)
            .map_err(StudioError::from);
        self.report(result, || {
            Notice::info(format!("Exported {}", format.extension().to_uppercase()))
        })
    }

    /// Run an image workflow and place the result on the canvas.
    ///
    /// A brand palette workflow also replaces the brand colors with the
    /// generated palette.
    ///
    /// # Errors
    ///
    /// Returns an error if generation fails or the result is unusable; the
    /// design is unchanged in that case.
    pub async fn run_workflow(
        &mut self,
        workflow: &Workflow,
        reference: Option<Vec<u8>>,
    ) -> StudioResult<LayerId> {
        let request = workflow.request(reference);
        tracing::info!("Generating image: {}", request.prompt);
        let result = self.generator.generate(&request).await;
        let result = result
            .and_then(|bytes| {
                if matches!(workflow, Workflow::BrandPalette { .. }) {
                    apply_brand_palette(&mut self.scene, &bytes)?;
                }
                place_generated_image(&mut self.scene, &bytes)
            })
            .map_err(StudioError::from);
        self.report(result, || Notice::info("Image added to canvas"))
    }

    /// Run several requests at once, placing images as they complete.
    ///
    /// Failures are reported as notices; the ids of placed layers are
    /// returned in completion order.
    pub async fn generate_batch(&mut self, requests: Vec<GenerationRequest>) -> Vec<LayerId> {
        let generator = Arc::clone(&self.generator);
        let outcomes = generate_into_scene(generator, requests, &mut self.scene).await;
        let mut placed = Vec::with_capacity(outcomes.len());
        for (_, outcome) in outcomes {
            match outcome {
                Ok(id) => placed.push(id),
                Err(e) => self.notices.push(Notice::from(&StudioError::from(e))),
            }
        }
        if !placed.is_empty() {
            self.notices
                .push(Notice::info(format!("{} images added to canvas", placed.len())));
        }
        placed
    }

    fn report<T>(
        &mut self,
        result: StudioResult<T>,
        success: impl FnOnce() -> Notice,
    ) -> StudioResult<T> {
        match &result {
            Ok(_) => self.notices.push(success()),
            Err(e) => {
                tracing::warn!("{e}");
                self.notices.push(Notice::from(e));
            }
        }
        result
    }
}
