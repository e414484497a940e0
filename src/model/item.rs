//! Annotated item: the figure lists of one image or video frame.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::FigureError;
use super::{
    BoundingBox, Figure, KeypointGroup, LabelSet, ReviewMarker, SegmentationMask,
};

/// Identifier of an image or frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Masks of one item keyed by label. Holds at most one mask per label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaskSet {
    masks: BTreeMap<String, SegmentationMask>,
}

impl MaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set, rejecting more masks than configured mask classes and
    /// any duplicate label.
    pub fn from_masks(
        masks: Vec<SegmentationMask>,
        max_classes: usize,
    ) -> Result<Self, FigureError> {
        if masks.len() > max_classes {
            return Err(FigureError::TooManyMasks {
                found: masks.len(),
                max: max_classes,
            });
        }
        let mut set = Self::new();
        for mask in masks {
            set.insert(mask)?;
        }
        Ok(set)
    }

    /// Insert a mask; fails if its label already has one.
    pub fn insert(&mut self, mask: SegmentationMask) -> Result<(), FigureError> {
        if self.masks.contains_key(&mask.label) {
            return Err(FigureError::DuplicateMask { label: mask.label });
        }
        self.masks.insert(mask.label.clone(), mask);
        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<&SegmentationMask> {
        self.masks.get(label)
    }

    pub fn remove(&mut self, label: &str) -> Option<SegmentationMask> {
        self.masks.remove(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SegmentationMask> {
        self.masks.values()
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }
}

/// All figures of one item plus its review flags.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedItem {
    pub id: ItemId,
    pub width: usize,
    pub height: usize,
    pub bboxes: Vec<BoundingBox>,
    pub keypoint_groups: Vec<KeypointGroup>,
    pub masks: MaskSet,
    pub review_markers: Vec<ReviewMarker>,
    pub trash: bool,
    pub requires_review: bool,
}

impl AnnotatedItem {
    /// Create an item with no figures.
    pub fn new(id: impl Into<ItemId>, width: usize, height: usize) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            bboxes: Vec::new(),
            keypoint_groups: Vec::new(),
            masks: MaskSet::new(),
            review_markers: Vec::new(),
            trash: false,
            requires_review: false,
        }
    }

    /// Replace the masks, enforcing the label-class limit and item shape.
    pub fn set_masks(
        &mut self,
        masks: Vec<SegmentationMask>,
        labels: &LabelSet,
    ) -> Result<(), FigureError> {
        for mask in &masks {
            self.check_mask_shape(mask)?;
        }
        self.masks = MaskSet::from_masks(masks, labels.mask_class_count())?;
        Ok(())
    }

    fn check_mask_shape(&self, mask: &SegmentationMask) -> Result<(), FigureError> {
        if (mask.width, mask.height) != (self.width, self.height) {
            return Err(FigureError::MaskShape {
                label: mask.label.clone(),
                width: mask.width,
                height: mask.height,
                item_width: self.width,
                item_height: self.height,
            });
        }
        Ok(())
    }

    /// Flatten into one figure list: boxes, keypoint groups, masks, markers.
    pub fn figures(&self) -> Vec<Figure> {
        self.bboxes
            .iter()
            .cloned()
            .map(Figure::from)
            .chain(self.keypoint_groups.iter().cloned().map(Figure::from))
            .chain(self.masks.iter().cloned().map(Figure::from))
            .chain(self.review_markers.iter().cloned().map(Figure::from))
            .collect()
    }

    /// Replace all figure lists from a flat list. Flags are kept.
    pub fn set_figures(&mut self, figures: Vec<Figure>) -> Result<(), FigureError> {
        self.bboxes.clear();
        self.keypoint_groups.clear();
        self.review_markers.clear();
        let mut masks = MaskSet::new();
        for figure in figures {
            match figure {
                Figure::BoundingBox(b) => self.bboxes.push(b),
                Figure::KeypointGroup(k) => self.keypoint_groups.push(k),
                Figure::Mask(m) => {
                    self.check_mask_shape(&m)?;
                    masks.insert(m)?;
                }
                Figure::ReviewMarker(r) => self.review_markers.push(r),
            }
        }
        self.masks = masks;
        Ok(())
    }

    pub fn figure_count(&self) -> usize {
        self.bboxes.len() + self.keypoint_groups.len() + self.masks.len() + self.review_markers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::model::{FigureType, LabelClass};

    fn labels_with_masks(n: usize) -> LabelSet {
        LabelSet::new(
            (0..n)
                .map(|i| LabelClass::new(&format!("mask{i}"), FigureType::Mask, [0, 0, 0]))
                .collect(),
        )
    }

    #[test]
    fn test_too_many_masks_is_fatal() {
        let mut item = AnnotatedItem::new("frame_0", 2, 2);
        let masks = vec![
            SegmentationMask::empty("a", 2, 2),
            SegmentationMask::empty("b", 2, 2),
        ];
        let err = item.set_masks(masks, &labels_with_masks(1)).unwrap_err();
        assert!(matches!(err, FigureError::TooManyMasks { found: 2, max: 1 }));
    }

    #[test]
    fn test_duplicate_mask_label_rejected() {
        let mut set = MaskSet::new();
        set.insert(SegmentationMask::empty("road", 2, 2)).expect("first insert");
        let err = set.insert(SegmentationMask::empty("road", 2, 2)).unwrap_err();
        assert!(matches!(err, FigureError::DuplicateMask { ref label } if label == "road"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_mask_shape_checked() {
        let mut item = AnnotatedItem::new("frame_0", 4, 4);
        let err = item
            .set_masks(vec![SegmentationMask::empty("mask0", 2, 2)], &labels_with_masks(1))
            .unwrap_err();
        assert!(matches!(err, FigureError::MaskShape { .. }));
    }

    #[test]
    fn test_figures_round_trip_through_lists() {
        let mut item = AnnotatedItem::new("frame_0", 4, 4);
        item.requires_review = true;
        let figures = vec![
            Figure::from(ReviewMarker::new("review", Point::new(1.0, 1.0))),
            Figure::from(BoundingBox::from_coords("car", 0.0, 0.0, 2.0, 2.0)),
            Figure::from(SegmentationMask::empty("road", 4, 4)),
        ];
        item.set_figures(figures).expect("consistent");
        assert_eq!(item.figure_count(), 3);
        assert!(item.requires_review);

        let flat = item.figures();
        assert_eq!(flat[0].figure_type(), FigureType::BoundingBox);
        assert_eq!(flat[2].figure_type(), FigureType::ReviewMarker);
    }
}
