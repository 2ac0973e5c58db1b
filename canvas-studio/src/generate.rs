//! Image generation workflows.
//!
//! The generation service itself is opaque: an [`ImageGenerator`] turns a
//! prompt (and optionally a reference image) into encoded image bytes.
//! Results only ever enter a design through [`Scene::add_image_layer`], so a
//! failed request leaves the scene untouched.

use std::sync::Arc;

use async_trait::async_trait;
use canvas_core::{LayerId, Scene};
use canvas_renderer::image::{dominant_colors, image_dimensions, to_data_uri};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::GenerationError;

/// Number of swatches a brand palette workflow extracts.
pub const BRAND_PALETTE_SIZE: usize = 5;

/// A single generation request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Text prompt.
    pub prompt: String,
    /// Encoded reference image, e.g. a product photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<Vec<u8>>,
}

impl GenerationRequest {
    /// Request with a prompt only.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            reference_image: None,
        }
    }

    /// Attach a reference image.
    #[must_use]
    pub fn with_reference(mut self, image: Vec<u8>) -> Self {
        self.reference_image = Some(image);
        self
    }
}

/// A service that produces encoded image bytes from a prompt.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate one image.
    ///
    /// # Errors
    ///
    /// Returns an error if the service fails or refuses the request.
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>, GenerationError>;
}

/// The generation workflows offered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "workflow", rename_all = "kebab-case")]
pub enum Workflow {
    /// Product photo restaged in a new setting.
    Photoshoot {
        /// What the product is.
        product: String,
        /// Where to stage it.
        setting: String,
    },
    /// Mood board used to derive brand colors.
    BrandPalette {
        /// Brand name.
        brand: String,
        /// Personality or mood keywords.
        mood: String,
    },
    /// Standalone design element such as an icon or illustration.
    Element {
        /// What to draw.
        description: String,
        /// Visual style.
        style: String,
    },
}

impl Workflow {
    /// The prompt sent to the generator.
    #[must_use]
    pub fn prompt(&self) -> String {
        match self {
            Self::Photoshoot { product, setting } => format!(
                "Professional product photograph of {product}, staged in {setting}. \
                 Soft studio lighting, sharp focus, true-to-life colors, high resolution."
            ),
            Self::BrandPalette { brand, mood } => format!(
                "Brand mood board for {brand}: {mood}. A cohesive set of flat color \
                 swatches and textures, no text, no logos."
            ),
            Self::Element { description, style } => format!(
                "{description}, as an isolated design element in a {style} style, \
                 centered on a plain background."
            ),
        }
    }

    /// Build the request, attaching `reference` for workflows that use one.
    #[must_use]
    pub fn request(&self, reference: Option<Vec<u8>>) -> GenerationRequest {
        let request = GenerationRequest::new(self.prompt());
        match (self, reference) {
            (Self::Photoshoot { .. }, Some(image)) => request.with_reference(image),
            _ => request,
        }
    }
}

/// Add generated image bytes to `scene` as an image layer.
///
/// # Errors
///
/// Returns [`GenerationError::InvalidImage`] if the bytes cannot be decoded
/// or have no usable size; the scene is unchanged in that case.
pub fn place_generated_image(scene: &mut Scene, bytes: &[u8]) -> Result<LayerId, GenerationError> {
    let (width, height) =
        image_dimensions(bytes).map_err(|e| GenerationError::InvalidImage(e.to_string()))?;
    scene
        .add_image_layer(to_data_uri(bytes), f64::from(width), f64::from(height))
        .ok_or_else(|| GenerationError::InvalidImage(format!("unusable size {width}x{height}")))
}

/// Replace the brand colors with the palette of a generated mood board.
///
/// # Errors
///
/// Returns [`GenerationError::InvalidImage`] if the bytes cannot be decoded.
pub fn apply_brand_palette(scene: &mut Scene, bytes: &[u8]) -> Result<Vec<String>, GenerationError> {
    let colors = dominant_colors(bytes, BRAND_PALETTE_SIZE)
        .map_err(|e| GenerationError::InvalidImage(e.to_string()))?;
    scene.set_brand_colors(colors.clone());
    Ok(colors)
}

/// Run `requests` concurrently and place each image as soon as it completes.
///
/// Layers are added in completion order, not request order. Returns one
/// `(request index, outcome)` pair per request, also in completion order.
/// A task that ends without reporting, for example because the generator
/// panicked, yields [`GenerationError::Cancelled`] after all others.
pub async fn generate_into_scene(
    generator: Arc<dyn ImageGenerator>,
    requests: Vec<GenerationRequest>,
    scene: &mut Scene,
) -> Vec<(usize, Result<LayerId, GenerationError>)> {
    let total = requests.len();
    let (tx, mut rx) = mpsc::unbounded_channel();

    for (index, request) in requests.into_iter().enumerate() {
        let generator = Arc::clone(&generator);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = generator.generate(&request).await;
            // the receiver outlives every sender
            let _ = tx.send((index, result));
        });
    }
    drop(tx);

    let mut outcomes = Vec::with_capacity(total);
    let mut reported = vec![false; total];
    while let Some((index, result)) = rx.recv().await {
        reported[index] = true;
        let outcome = result.and_then(|bytes| place_generated_image(scene, &bytes));
        match &outcome {
            Ok(id) => tracing::info!("Placed generated image {index} as layer {id}"),
            Err(e) => tracing::warn!("Generation request {index} failed: {e}"),
        }
        outcomes.push((index, outcome));
    }

    // every sender is gone, so unreported tasks ended without a result
    for (index, _) in reported.iter().enumerate().filter(|(_, done)| !**done) {
        tracing::warn!("Generation request {index} ended without a result");
        outcomes.push((
            index,
            Err(GenerationError::Cancelled(
                "generation task ended without a result".to_string(),
            )),
        ));
    }
    outcomes
}
