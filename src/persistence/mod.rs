//! Item storage.
//!
//! The controller loads and saves whole items through [`ItemRepository`].
//! Two implementations are provided: an in-memory map for hosts that keep
//! their own storage, and a directory of per-item JSON documents.

mod document;
mod error;
mod json_dir;
mod memory;

pub use document::ItemDocument;
pub use error::StorageError;
pub use json_dir::JsonDirectoryRepository;
pub use memory::MemoryRepository;

use crate::model::{AnnotatedItem, ItemId};

/// Load/save boundary for annotated items.
pub trait ItemRepository {
    /// Load an item with all figure lists populated and masks decoded.
    fn load_item(&mut self, id: &ItemId) -> Result<AnnotatedItem, StorageError>;

    /// Persist an item, replacing any stored copy.
    fn save_item(&mut self, item: &AnnotatedItem) -> Result<(), StorageError>;
}
