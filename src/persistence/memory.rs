//! In-memory item repository.

use std::collections::HashMap;

use super::{ItemRepository, StorageError};
use crate::model::{AnnotatedItem, ItemId};

#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    items: HashMap<ItemId, AnnotatedItem>,
    save_count: usize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository without counting it as a save.
    pub fn insert(&mut self, item: AnnotatedItem) {
        self.items.insert(item.id.clone(), item);
    }

    pub fn get(&self, id: &ItemId) -> Option<&AnnotatedItem> {
        self.items.get(id)
    }

    /// Number of `save_item` calls so far.
    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl ItemRepository for MemoryRepository {
    fn load_item(&mut self, id: &ItemId) -> Result<AnnotatedItem, StorageError> {
        self.items
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound { id: id.clone() })
    }

    fn save_item(&mut self, item: &AnnotatedItem) -> Result<(), StorageError> {
        self.items.insert(item.id.clone(), item.clone());
        self.save_count += 1;
        log::debug!("Saved item '{}' in memory", item.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_item_is_not_found() {
        let mut repo = MemoryRepository::new();
        let err = repo.load_item(&ItemId::from("nope")).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_save_replaces_and_counts() {
        let mut repo = MemoryRepository::new();
        repo.insert(AnnotatedItem::new("a", 4, 4));
        let mut item = repo.load_item(&ItemId::from("a")).expect("seeded");
        item.trash = true;
        repo.save_item(&item).expect("memory save");
        assert_eq!(repo.save_count(), 1);
        assert!(repo.get(&ItemId::from("a")).is_some_and(|i| i.trash));
    }
}
