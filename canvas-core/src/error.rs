//! Error types for canvas operations.
//!
//! Expected editing conditions (unknown ids, locked layers, unmet
//! preconditions) are not errors: scene operations simply do nothing. The
//! variants here cover the boundaries where data enters or leaves the core.

use thiserror::Error;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in canvas operations.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// A document failed validation when loaded.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Scene or configuration serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
