//! Directory of per-item JSON documents.

use std::fs;
use std::path::{Path, PathBuf};

use super::{ItemDocument, ItemRepository, StorageError};
use crate::model::{AnnotatedItem, ItemId, LabelSet};

/// Stores each item as `<root>/<id>.json`.
///
/// Loaded masks are validated against the label set, so the repository
/// needs the same labels the controller edits with.
#[derive(Debug, Clone)]
pub struct JsonDirectoryRepository {
    root: PathBuf,
    labels: LabelSet,
}

impl JsonDirectoryRepository {
    pub fn new(root: impl Into<PathBuf>, labels: LabelSet) -> Self {
        Self {
            root: root.into(),
            labels,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document for `id`. Characters outside `[A-Za-z0-9._-]`
    /// are replaced so ids cannot escape the directory.
    pub fn path_for(&self, id: &ItemId) -> PathBuf {
        let name: String = id
            .as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let name = name.trim_start_matches('.');
        self.root.join(format!("{name}.json"))
    }

    pub fn exists(&self, id: &ItemId) -> bool {
        self.path_for(id).is_file()
    }
}

impl ItemRepository for JsonDirectoryRepository {
    fn load_item(&mut self, id: &ItemId) -> Result<AnnotatedItem, StorageError> {
        let path = self.path_for(id);
        if !path.is_file() {
            return Err(StorageError::NotFound { id: id.clone() });
        }
        let contents = fs::read_to_string(&path)?;
        let doc: ItemDocument = serde_json::from_str(&contents)?;
        if !ItemDocument::is_version_compatible(&doc.version) {
            return Err(StorageError::VersionMismatch {
                path,
                expected: ItemDocument::CURRENT_VERSION.to_string(),
                found: doc.version,
            });
        }
        let item = doc.into_item(&self.labels)?;
        log::info!(
            "Loaded item '{}' from {:?} ({} figures)",
            item.id,
            path,
            item.figure_count()
        );
        Ok(item)
    }

    fn save_item(&mut self, item: &AnnotatedItem) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(&item.id);
        let json = serde_json::to_string_pretty(&ItemDocument::from_item(item))?;

        // Write beside the target and rename so a crash never leaves half a file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        log::info!("Saved item '{}' to {:?}", item.id, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::model::{BoundingBox, ReviewMarker, SegmentationMask, default_labels};

    fn temp_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("figedit-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_save_then_load() {
        let root = temp_root("roundtrip");
        let mut repo = JsonDirectoryRepository::new(&root, default_labels());

        let mut item = AnnotatedItem::new("frame_1", 4, 4);
        item.bboxes.push(BoundingBox::from_coords("car", 1.0, 1.0, 3.0, 3.0));
        item.review_markers
            .push(ReviewMarker::new("review", Point::new(2.0, 2.0)));
        let mut mask = SegmentationMask::empty("road", 4, 4);
        mask.fill_polygon(
            &[
                Point::new(0.0, 0.0),
                Point::new(4.0, 0.0),
                Point::new(4.0, 2.0),
                Point::new(0.0, 2.0),
            ],
            Default::default(),
        );
        mask.encode();
        item.set_masks(vec![mask], &default_labels()).expect("one mask");
        item.requires_review = true;

        repo.save_item(&item).expect("save");
        assert!(repo.exists(&item.id));
        let loaded = repo.load_item(&item.id).expect("load");
        assert_eq!(loaded, item);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let root = temp_root("missing");
        let mut repo = JsonDirectoryRepository::new(&root, default_labels());
        let err = repo.load_item(&ItemId::from("absent")).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_incompatible_version_rejected() {
        let root = temp_root("version");
        fs::create_dir_all(&root).expect("temp dir");
        let repo_path = root.join("old.json");
        fs::write(
            &repo_path,
            r#"{"version": "0.9.0", "id": "old", "width": 1, "height": 1}"#,
        )
        .expect("write");
        let mut repo = JsonDirectoryRepository::new(&root, default_labels());
        let err = repo.load_item(&ItemId::from("old")).unwrap_err();
        assert!(matches!(err, StorageError::VersionMismatch { .. }));
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_ids_cannot_escape_root() {
        let repo = JsonDirectoryRepository::new("/data", LabelSet::default());
        assert_eq!(
            repo.path_for(&ItemId::from("../etc/passwd")),
            PathBuf::from("/data/_etc_passwd.json")
        );
    }
}
