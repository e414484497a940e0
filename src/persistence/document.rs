//! On-disk document for one item.
//!
//! # Versioning
//!
//! Documents carry a `MAJOR.MINOR.PATCH` version. While the major version is
//! 0 only an exact minor match is accepted; from 1.0.0 on any document with
//! the same major version is.

use serde::{Deserialize, Serialize};

use super::StorageError;
use crate::codec;
use crate::model::{
    AnnotatedItem, BoundingBox, FigureError, ItemId, KeypointGroup, LabelSet, ReviewMarker,
    SegmentationMask,
};

/// Serialized form of an [`AnnotatedItem`]. Masks are stored as RLE only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDocument {
    /// Format version for compatibility checking.
    pub version: String,
    pub id: ItemId,
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub bboxes: Vec<BoundingBox>,
    #[serde(default)]
    pub keypoint_groups: Vec<KeypointGroup>,
    #[serde(default)]
    pub masks: Vec<SegmentationMask>,
    #[serde(default)]
    pub review_markers: Vec<ReviewMarker>,
    #[serde(default)]
    pub trash: bool,
    #[serde(default)]
    pub requires_review: bool,
}

impl ItemDocument {
    /// Current version of the item document format.
    pub const CURRENT_VERSION: &'static str = "0.1.0";

    /// Major version number for compatibility checking.
    pub const VERSION_MAJOR: u32 = 0;

    /// Minor version number.
    pub const VERSION_MINOR: u32 = 1;

    /// Parse a version string into (major, minor, patch) components.
    pub fn parse_version(version: &str) -> Option<(u32, u32, u32)> {
        let mut parts = version.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some((major, minor, patch))
    }

    /// Check if a document version can be read by this build.
    pub fn is_version_compatible(version: &str) -> bool {
        let Some((major, minor, _)) = Self::parse_version(version) else {
            return false;
        };
        if Self::VERSION_MAJOR == 0 {
            major == 0 && minor == Self::VERSION_MINOR
        } else {
            major == Self::VERSION_MAJOR
        }
    }

    pub fn from_item(item: &AnnotatedItem) -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
            id: item.id.clone(),
            width: item.width,
            height: item.height,
            bboxes: item.bboxes.clone(),
            keypoint_groups: item.keypoint_groups.clone(),
            masks: item.masks.iter().cloned().collect(),
            review_markers: item.review_markers.clone(),
            trash: item.trash,
            requires_review: item.requires_review,
        }
    }

    /// Build the item, decoding masks and validating them against `labels`.
    pub fn into_item(self, labels: &LabelSet) -> Result<AnnotatedItem, StorageError> {
        let id = self.id.clone();
        self.build_item(labels)
            .map_err(|source| StorageError::Figure { id, source })
    }

    fn build_item(self, labels: &LabelSet) -> Result<AnnotatedItem, FigureError> {
        // Masks are allocated at item size, so the item must fit a mask grid
        codec::cell_count(self.width, self.height)?;
        let mut item = AnnotatedItem::new(self.id, self.width, self.height);
        item.bboxes = self.bboxes;
        item.keypoint_groups = self.keypoint_groups;
        item.review_markers = self.review_markers;
        item.trash = self.trash;
        item.requires_review = self.requires_review;

        let mut masks = self.masks;
        for mask in &mut masks {
            mask.decode()?;
        }
        item.set_masks(masks, labels)?;
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::RleError;
    use crate::model::{FigureType, LabelClass};

    fn labels() -> LabelSet {
        LabelSet::new(vec![LabelClass::new("road", FigureType::Mask, [0, 0, 0])])
    }

    #[test]
    fn test_version_compatibility() {
        assert!(ItemDocument::is_version_compatible("0.1.0"));
        assert!(ItemDocument::is_version_compatible("0.1.7"));
        assert!(!ItemDocument::is_version_compatible("0.2.0"));
        assert!(!ItemDocument::is_version_compatible("1.1"));
        assert!(!ItemDocument::is_version_compatible("0.1.0.0"));
    }

    #[test]
    fn test_minimal_document_parses() {
        let json = r#"{"version": "0.1.0", "id": "frame_3", "width": 4, "height": 4,
            "masks": [{"label": "road", "rle": "0:8,1:8", "height": 4, "width": 4}]}"#;
        let doc: ItemDocument = serde_json::from_str(json).expect("valid document");
        let item = doc.into_item(&labels()).expect("consistent");
        assert_eq!(item.id.as_str(), "frame_3");
        assert_eq!(item.masks.get("road").map(SegmentationMask::foreground), Some(8));
        assert!(!item.trash);
    }

    #[test]
    fn test_excess_masks_are_fatal() {
        let mut item = AnnotatedItem::new("frame_0", 2, 2);
        item.set_masks(vec![SegmentationMask::empty("road", 2, 2)], &labels())
            .expect("one mask class");
        let mut doc = ItemDocument::from_item(&item);
        doc.masks.push(SegmentationMask::empty("lane", 2, 2));

        let err = doc.into_item(&labels()).unwrap_err();
        assert!(matches!(
            err,
            StorageError::Figure {
                source: FigureError::TooManyMasks { found: 2, max: 1 },
                ..
            }
        ));
    }

    #[test]
    fn test_corrupt_rle_is_reported() {
        let mut doc = ItemDocument::from_item(&AnnotatedItem::new("frame_0", 2, 2));
        let mut mask = SegmentationMask::empty("road", 2, 2);
        mask.rle = "0:3".to_string();
        doc.masks.push(mask);
        let err = doc.into_item(&labels()).unwrap_err();
        assert!(matches!(err, StorageError::Figure { source: FigureError::Rle(_), .. }));
    }

    #[test]
    fn test_oversized_item_is_rejected() {
        let json = format!(
            r#"{{"version": "0.1.0", "id": "frame_9", "width": {}, "height": 4,
            "masks": [{{"label": "road", "rle": "0:1", "height": 4, "width": {}}}]}}"#,
            usize::MAX / 2,
            usize::MAX / 2
        );
        let doc: ItemDocument = serde_json::from_str(&json).expect("valid document");
        let err = doc.into_item(&labels()).unwrap_err();
        assert!(matches!(
            err,
            StorageError::Figure {
                source: FigureError::Rle(RleError::ShapeTooLarge { height: 4, .. }),
                ..
            }
        ));
    }
}
