//! The figure sum type and its flat field-map form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::bbox::{BBOX_CORNERS, BoundingBox};
use super::error::FigureError;
use super::keypoints::KeypointGroup;
use super::marker::ReviewMarker;
use super::mask::SegmentationMask;
use crate::constants::POINT_FIGURE_SURFACE;
use crate::geometry::Point;

/// Flat field map a figure serializes to.
pub type FieldMap = serde_json::Map<String, Value>;

/// Kind of figure a label creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FigureType {
    #[serde(rename = "BBOX")]
    BoundingBox,
    #[serde(rename = "KGROUP")]
    KeypointGroup,
    #[serde(rename = "MASK")]
    Mask,
    #[serde(rename = "REVIEW_MARKER")]
    ReviewMarker,
}

impl FigureType {
    /// Get the display name for this figure type.
    pub fn name(&self) -> &'static str {
        match self {
            FigureType::BoundingBox => "Bounding Box",
            FigureType::KeypointGroup => "Keypoints",
            FigureType::Mask => "Mask",
            FigureType::ReviewMarker => "Review Marker",
        }
    }
}

/// Image-space hit radii for handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRadii {
    /// Box corners and keypoints
    pub handle: f32,
    /// Review markers
    pub marker: f32,
}

/// One serialized figure: its type tag plus field map.
///
/// Used for history snapshots and the clipboard. Equality is structural over
/// the fields, so transient editor state never makes two snapshots differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureRecord {
    pub figure_type: FigureType,
    pub fields: FieldMap,
}

/// A geometric annotation figure.
#[derive(Debug, Clone, PartialEq)]
pub enum Figure {
    BoundingBox(BoundingBox),
    KeypointGroup(KeypointGroup),
    Mask(SegmentationMask),
    ReviewMarker(ReviewMarker),
}

impl Figure {
    pub fn label(&self) -> &str {
        match self {
            Figure::BoundingBox(b) => &b.label,
            Figure::KeypointGroup(k) => &k.label,
            Figure::Mask(m) => &m.label,
            Figure::ReviewMarker(r) => &r.label,
        }
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        match self {
            Figure::BoundingBox(b) => b.label = label,
            Figure::KeypointGroup(k) => k.label = label,
            Figure::Mask(m) => m.label = label,
            Figure::ReviewMarker(r) => r.label = label,
        }
    }

    pub fn figure_type(&self) -> FigureType {
        match self {
            Figure::BoundingBox(_) => FigureType::BoundingBox,
            Figure::KeypointGroup(_) => FigureType::KeypointGroup,
            Figure::Mask(_) => FigureType::Mask,
            Figure::ReviewMarker(_) => FigureType::ReviewMarker,
        }
    }

    /// Ordering value: box area, constant for everything else.
    pub fn surface(&self) -> f32 {
        match self {
            Figure::BoundingBox(b) => b.surface(),
            _ => POINT_FIGURE_SURFACE,
        }
    }

    /// Draggable handle positions. Masks have none.
    pub fn points(&self) -> Vec<Point> {
        match self {
            Figure::BoundingBox(b) => b.corners().to_vec(),
            Figure::KeypointGroup(k) => k.points(),
            Figure::Mask(_) => Vec::new(),
            Figure::ReviewMarker(r) => vec![r.position()],
        }
    }

    pub fn point_count(&self) -> usize {
        match self {
            Figure::BoundingBox(_) => BBOX_CORNERS,
            Figure::KeypointGroup(k) => k.len(),
            Figure::Mask(_) => 0,
            Figure::ReviewMarker(_) => 1,
        }
    }

    /// Index of the handle under the cursor, if any.
    pub fn handle_at(&self, cursor: &Point, radii: &HitRadii) -> Option<usize> {
        match self {
            Figure::BoundingBox(b) => b.handle_at(cursor, radii.handle),
            Figure::KeypointGroup(k) => k.handle_at(cursor, radii.handle),
            Figure::Mask(_) => None,
            Figure::ReviewMarker(r) => r.handle_at(cursor, radii.marker),
        }
    }

    /// Whether the figure body contains the cursor. Only boxes have a body.
    pub fn contains(&self, cursor: &Point) -> bool {
        match self {
            Figure::BoundingBox(b) => b.contains(cursor),
            _ => false,
        }
    }

    /// Move handle `index` to `to`.
    ///
    /// Returns the handle index that now sits under the dragged position,
    /// or `None` if the index does not exist.
    pub fn move_point(&mut self, index: usize, to: Point) -> Option<usize> {
        match self {
            Figure::BoundingBox(b) => b.move_corner(index, to),
            Figure::KeypointGroup(k) => k.move_point(index, to).then_some(index),
            Figure::Mask(_) => None,
            Figure::ReviewMarker(r) => {
                if index != 0 {
                    return None;
                }
                r.move_to(to);
                Some(0)
            }
        }
    }

    /// Delete handle `index`, or the whole figure's points when `None`.
    ///
    /// Boxes and markers cannot lose a single point, so any deletion empties
    /// them. Returns the remaining point count; zero means the caller should
    /// drop the figure.
    pub fn delete_point(&mut self, index: Option<usize>) -> usize {
        match self {
            Figure::BoundingBox(_) | Figure::ReviewMarker(_) => 0,
            Figure::KeypointGroup(k) => k.delete_point(index),
            Figure::Mask(_) => 0,
        }
    }

    pub fn as_mask(&self) -> Option<&SegmentationMask> {
        match self {
            Figure::Mask(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mask_mut(&mut self) -> Option<&mut SegmentationMask> {
        match self {
            Figure::Mask(m) => Some(m),
            _ => None,
        }
    }

    /// Serialize to a flat field map.
    pub fn to_record(&self) -> Result<FigureRecord, FigureError> {
        let value = match self {
            Figure::BoundingBox(b) => serde_json::to_value(b)?,
            Figure::KeypointGroup(k) => serde_json::to_value(k)?,
            Figure::Mask(m) => serde_json::to_value(m)?,
            Figure::ReviewMarker(r) => serde_json::to_value(r)?,
        };
        let Value::Object(fields) = value else {
            return Err(FigureError::Fields(serde::ser::Error::custom(
                "figure did not serialize to a map",
            )));
        };
        Ok(FigureRecord {
            figure_type: self.figure_type(),
            fields,
        })
    }

    /// Re-instantiate a figure from its field map. Masks are decoded.
    pub fn from_record(record: &FigureRecord) -> Result<Self, FigureError> {
        let value = Value::Object(record.fields.clone());
        let figure = match record.figure_type {
            FigureType::BoundingBox => Figure::BoundingBox(serde_json::from_value(value)?),
            FigureType::KeypointGroup => Figure::KeypointGroup(serde_json::from_value(value)?),
            FigureType::Mask => {
                let mut mask: SegmentationMask = serde_json::from_value(value)?;
                mask.decode()?;
                Figure::Mask(mask)
            }
            FigureType::ReviewMarker => Figure::ReviewMarker(serde_json::from_value(value)?),
        };
        Ok(figure)
    }
}

impl From<BoundingBox> for Figure {
    fn from(b: BoundingBox) -> Self {
        Figure::BoundingBox(b)
    }
}

impl From<KeypointGroup> for Figure {
    fn from(k: KeypointGroup) -> Self {
        Figure::KeypointGroup(k)
    }
}

impl From<SegmentationMask> for Figure {
    fn from(m: SegmentationMask) -> Self {
        Figure::Mask(m)
    }
}

impl From<ReviewMarker> for Figure {
    fn from(r: ReviewMarker) -> Self {
        Figure::ReviewMarker(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::keypoints::Keypoint;

    const RADII: HitRadii = HitRadii {
        handle: 3.0,
        marker: 10.0,
    };

    #[test]
    fn test_bbox_field_map() {
        let figure: Figure =
            BoundingBox::new("car", Point::new(15.0, 15.0), Point::new(5.0, 5.0)).into();
        let record = figure.to_record().expect("serializable");
        assert_eq!(record.figure_type, FigureType::BoundingBox);
        let mut keys: Vec<&str> = record.fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["label", "x1", "x2", "y1", "y2"]);
        assert_eq!(record.fields["x1"], 5.0);
        assert_eq!(Figure::from_record(&record).expect("valid"), figure);
    }

    #[test]
    fn test_keypoint_field_map_names() {
        let figure: Figure = KeypointGroup::new(
            "person",
            vec![Keypoint::new(1.0, 2.0, "head"), Keypoint::new(3.0, 4.0, "foot")],
        )
        .into();
        let record = figure.to_record().expect("serializable");
        assert!(record.fields.contains_key("keypoints_data"));
        assert_eq!(record.fields["keypoints_data"][1]["label"], "foot");
    }

    #[test]
    fn test_mask_record_carries_rle_and_decodes() {
        let mask = SegmentationMask::from_rle("road", "0:4,1:2", 3, 2).expect("valid");
        let record = Figure::from(mask.clone()).to_record().expect("serializable");
        let mut keys: Vec<&str> = record.fields.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["height", "label", "rle", "width"]);

        let restored = Figure::from_record(&record).expect("valid");
        assert_eq!(restored.as_mask().map(SegmentationMask::foreground), Some(2));
        assert_eq!(restored, Figure::Mask(mask));
    }

    #[test]
    fn test_mask_record_with_bad_rle_fails() {
        let mut fields = FieldMap::new();
        fields.insert("label".into(), "road".into());
        fields.insert("rle".into(), "0:3".into());
        fields.insert("height".into(), 2.into());
        fields.insert("width".into(), 2.into());
        let record = FigureRecord {
            figure_type: FigureType::Mask,
            fields,
        };
        assert!(matches!(Figure::from_record(&record), Err(FigureError::Rle(_))));
    }

    #[test]
    fn test_record_with_missing_field_fails() {
        let mut fields = FieldMap::new();
        fields.insert("x".into(), 1.0.into());
        let record = FigureRecord {
            figure_type: FigureType::ReviewMarker,
            fields,
        };
        assert!(matches!(Figure::from_record(&record), Err(FigureError::Fields(_))));
    }

    #[test]
    fn test_marker_uses_wide_radius() {
        let marker: Figure = ReviewMarker::new("check", Point::new(0.0, 0.0)).into();
        let bbox: Figure = BoundingBox::from_coords("car", 0.0, 0.0, 50.0, 50.0).into();
        let cursor = Point::new(8.0, 8.0);
        assert_eq!(marker.handle_at(&cursor, &RADII), Some(0));
        assert_eq!(bbox.handle_at(&cursor, &RADII), None);
    }

    #[test]
    fn test_only_boxes_contain() {
        let cursor = Point::new(0.0, 0.0);
        let marker: Figure = ReviewMarker::new("check", cursor).into();
        let group: Figure = KeypointGroup::new("person", vec![Keypoint::new(0.0, 0.0, "a")]).into();
        assert!(!marker.contains(&cursor));
        assert!(!group.contains(&cursor));
        assert_eq!(group.surface(), 1.0);
    }

    #[test]
    fn test_delete_point_counts() {
        let mut bbox: Figure = BoundingBox::from_coords("car", 0.0, 0.0, 5.0, 5.0).into();
        assert_eq!(bbox.delete_point(Some(2)), 0);
        let mut marker: Figure = ReviewMarker::new("check", Point::new(1.0, 1.0)).into();
        assert_eq!(marker.delete_point(None), 0);
    }
}
