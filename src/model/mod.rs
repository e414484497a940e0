//! Figure data model.
//!
//! Pure entities only: nothing here knows about storage or rendering.

mod bbox;
mod error;
mod figure;
mod item;
mod keypoints;
mod label;
mod marker;
mod mask;

pub use bbox::{BBOX_CORNERS, BoundingBox};
pub use error::FigureError;
pub use figure::{FieldMap, Figure, FigureRecord, FigureType, HitRadii};
pub use item::{AnnotatedItem, ItemId, MaskSet};
pub use keypoints::{Keypoint, KeypointGroup};
pub use label::{KeypointTemplate, LabelClass, LabelSet, default_keypoint_template, default_labels};
pub use marker::ReviewMarker;
pub use mask::{MaskMode, SegmentationMask};

/// Full serialized copy of an item's figure list, as stored in history.
pub type Snapshot = Vec<FigureRecord>;

/// Serialize a figure list into a snapshot.
pub fn snapshot_of(figures: &[Figure]) -> Result<Snapshot, FigureError> {
    figures.iter().map(Figure::to_record).collect()
}

/// Rebuild a figure list from a snapshot.
pub fn figures_from_snapshot(snapshot: &[FigureRecord]) -> Result<Vec<Figure>, FigureError> {
    snapshot.iter().map(Figure::from_record).collect()
}
