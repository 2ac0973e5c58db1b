//! Studio error types and user-facing notices.

use canvas_core::{CanvasError, StoreError};
use canvas_renderer::RenderError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from an image generation service.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// The service failed or refused the request.
    #[error("Generation service error: {0}")]
    Service(String),

    /// The service returned bytes that are not a usable image.
    #[error("Generated image is invalid: {0}")]
    InvalidImage(String),

    /// The request was dropped before it completed.
    #[error("Generation cancelled: {0}")]
    Cancelled(String),
}

/// Errors from studio operations.
#[derive(Debug, Error)]
pub enum StudioError {
    /// Persistence failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A loaded document was rejected.
    #[error("Document error: {0}")]
    Document(#[from] CanvasError),

    /// Image generation failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Export failed.
    #[error("Export error: {0}")]
    Render(#[from] RenderError),

    /// No design is stored under the id.
    #[error("Design not found: {0}")]
    NotFound(String),
}

/// Result type for studio operations.
pub type StudioResult<T> = Result<T, StudioError>;

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Confirmation of a completed action.
    Info,
    /// A failed action.
    Error,
}

/// A transient message for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Human-readable text.
    pub message: String,
}

impl Notice {
    /// An informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// An error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl From<&StudioError> for Notice {
    fn from(err: &StudioError) -> Self {
        let message = match err {
            StudioError::Store(_) => "Could not save or load the design".to_string(),
            StudioError::Document(_) => "The design file is damaged or unsupported".to_string(),
            StudioError::Generation(GenerationError::InvalidImage(_)) => {
                "The generated image could not be used".to_string()
            }
            StudioError::Generation(_) => "Image generation failed, please try again".to_string(),
            StudioError::Render(e) => format!("Export failed: {e}"),
            StudioError::NotFound(id) => format!("No design named \"{id}\""),
        };
        Self::error(message)
    }
}
