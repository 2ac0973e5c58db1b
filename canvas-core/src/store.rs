//! Design storage behind an opaque key/value contract.
//!
//! [`DesignStore`] is what a host implements to persist designs. Two
//! implementations ship here: [`MemoryDesignStore`] for tests and embedded
//! use, and [`FileDesignStore`], which keeps one JSON file (plus an optional
//! preview image) per design in a data directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::document::DesignDocument;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The design id is empty or not usable as a file name as written.
    #[error("Invalid design id: {0:?}")]
    InvalidId(String),
}

/// Key/value persistence for designs.
pub trait DesignStore: Send + Sync {
    /// Fetch a design, or `None` if there is none under `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored design cannot be read or parsed.
    fn get(&self, id: &str) -> Result<Option<DesignDocument>, StoreError>;

    /// Store a design, replacing any previous one under `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the design cannot be written.
    fn put(&self, id: &str, document: &DesignDocument, preview: Option<&[u8]>)
        -> Result<(), StoreError>;

    /// Remove a design. Removing a missing design is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the design exists but cannot be removed.
    fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// The preview image stored with a design, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the preview exists but cannot be read.
    fn preview(&self, id: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Ids of every stored design.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be listed.
    fn list(&self) -> Result<Vec<String>, StoreError>;
}

#[derive(Debug, Clone)]
struct StoredDesign {
    document: DesignDocument,
    preview: Option<Vec<u8>>,
}

/// Thread-safe in-memory design store.
///
/// # Example
///
/// ```
/// use canvas_core::store::{DesignStore, MemoryDesignStore};
/// use canvas_core::DesignDocument;
///
/// let store = MemoryDesignStore::new();
/// store.put("poster", &DesignDocument::default(), None).unwrap();
/// assert!(store.get("poster").unwrap().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDesignStore {
    designs: Arc<RwLock<HashMap<String, StoredDesign>>>,
}

impl MemoryDesignStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DesignStore for MemoryDesignStore {
    fn get(&self, id: &str) -> Result<Option<DesignDocument>, StoreError> {
        let designs = self
            .designs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(designs.get(id).map(|d| d.document.clone()))
    }

    fn put(
        &self,
        id: &str,
        document: &DesignDocument,
        preview: Option<&[u8]>,
    ) -> Result<(), StoreError> {
        let mut designs = self
            .designs
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // A put without a preview keeps the previous one, like the file store.
        let preview = preview
            .map(<[u8]>::to_vec)
            .or_else(|| designs.get(id).and_then(|d| d.preview.clone()));
        designs.insert(
            id.to_string(),
            StoredDesign {
                document: document.clone(),
                preview,
            },
        );
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut designs = self
            .designs
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        designs.remove(id);
        Ok(())
    }

    fn preview(&self, id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let designs = self
            .designs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(designs.get(id).and_then(|d| d.preview.clone()))
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        let designs = self
            .designs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut ids: Vec<String> = designs.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

/// Design store backed by a directory of JSON files.
///
/// Each design is saved as `<id>.json`, with its preview as `<id>.png`. Ids
/// are sanitized before use as file names.
#[derive(Debug, Clone)]
pub struct FileDesignStore {
    data_dir: PathBuf,
}

impl FileDesignStore {
    /// Open a store in `data_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    /// The directory designs are stored in.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path(&self, id: &str, extension: &str) -> Result<PathBuf, StoreError> {
        // ids map to files one to one; "a/b" and "a_b" must not share a file
        let name = sanitize_filename(id);
        if name.is_empty() || name != id {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.data_dir.join(format!("{name}.{extension}")))
    }
}

impl DesignStore for FileDesignStore {
    fn get(&self, id: &str) -> Result<Option<DesignDocument>, StoreError> {
        let path = self.path(id, "json")?;
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let document = serde_json::from_str(&contents)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Some(document))
    }

    fn put(
        &self,
        id: &str,
        document: &DesignDocument,
        preview: Option<&[u8]>,
    ) -> Result<(), StoreError> {
        let path = self.path(id, "json")?;
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        std::fs::write(&path, json)?;
        if let Some(bytes) = preview {
            std::fs::write(self.path(id, "png")?, bytes)?;
        }
        tracing::debug!("Saved design {id} to {}", path.display());
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        for extension in ["json", "png"] {
            let path = self.path(id, extension)?;
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!("Failed to delete {}: {e}", path.display());
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    fn preview(&self, id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match std::fs::read(self.path(id, "png")?) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Sanitize a design id for use as a filename.
///
/// Replaces any character that is not alphanumeric, `-`, or `_` with `_`.
fn sanitize_filename(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
