//! Error types for item storage.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::{FigureError, ItemId};

/// Errors raised by item repositories.
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No stored item with this id
    #[error("Item not found: {id}")]
    NotFound {
        /// The missing item id
        id: ItemId,
    },

    /// Stored document written by an incompatible format version
    #[error("Version mismatch in {path:?}: expected {expected}, found {found}")]
    VersionMismatch {
        /// Document path
        path: PathBuf,
        /// Supported version
        expected: String,
        /// Version found in the document
        found: String,
    },

    /// Stored figures are inconsistent with the label set or item shape
    #[error("Invalid figures in item {id}: {source}")]
    Figure {
        /// The offending item
        id: ItemId,
        /// What was wrong with its figures
        source: FigureError,
    },
}
