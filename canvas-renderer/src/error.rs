//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during serialization and export.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Resource loading or decoding failed.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Rasterizing or encoding an export failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// The format needs a feature this build was compiled without.
    #[error("Unsupported export format: {0}")]
    Unsupported(String),
}
