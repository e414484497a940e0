//! Label classes available to the annotator.

use serde::{Deserialize, Serialize};

use super::FigureType;

/// One keypoint slot of a skeleton template, normalized to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypointTemplate {
    pub name: String,
    pub x: f32,
    pub y: f32,
}

impl KeypointTemplate {
    pub fn new(name: &str, x: f32, y: f32) -> Self {
        Self {
            name: name.to_string(),
            x,
            y,
        }
    }
}

/// Template used when a keypoint label does not define one.
pub fn default_keypoint_template() -> Vec<KeypointTemplate> {
    vec![
        KeypointTemplate::new("start", 0.0, 0.0),
        KeypointTemplate::new("end", 1.0, 1.0),
    ]
}

/// A label with the figure type it creates and its display color.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelClass {
    /// Unique name
    pub name: String,
    /// Figure type created under this label
    pub figure_type: FigureType,
    /// RGB color for the renderer
    pub color: [u8; 3],
    /// Skeleton template, only used by keypoint labels
    pub keypoints: Vec<KeypointTemplate>,
}

impl LabelClass {
    pub fn new(name: &str, figure_type: FigureType, color: [u8; 3]) -> Self {
        let keypoints = match figure_type {
            FigureType::KeypointGroup => default_keypoint_template(),
            _ => Vec::new(),
        };
        Self {
            name: name.to_string(),
            figure_type,
            color,
            keypoints,
        }
    }

    pub fn with_keypoints(mut self, keypoints: Vec<KeypointTemplate>) -> Self {
        self.keypoints = keypoints;
        self
    }
}

/// Ordered set of label classes. Order drives hotkeys and the radial picker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelSet {
    classes: Vec<LabelClass>,
}

impl LabelSet {
    /// Build a set, dropping later classes whose name is already taken.
    pub fn new(classes: Vec<LabelClass>) -> Self {
        let mut set = Self::default();
        for class in classes {
            if set.get(&class.name).is_some() {
                log::warn!("Duplicate label class '{}' ignored", class.name);
                continue;
            }
            set.classes.push(class);
        }
        set
    }

    pub fn get(&self, name: &str) -> Option<&LabelClass> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.classes.iter().position(|c| c.name == name)
    }

    pub fn by_index(&self, index: usize) -> Option<&LabelClass> {
        self.classes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelClass> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Number of classes that produce segmentation masks.
    pub fn mask_class_count(&self) -> usize {
        self.classes
            .iter()
            .filter(|c| c.figure_type == FigureType::Mask)
            .count()
    }
}

/// Default label classes for new configurations.
pub fn default_labels() -> LabelSet {
    LabelSet::new(vec![
        LabelClass::new("car", FigureType::BoundingBox, [230, 80, 80]),
        LabelClass::new("person", FigureType::KeypointGroup, [80, 180, 230]),
        LabelClass::new("road", FigureType::Mask, [120, 200, 120]),
        LabelClass::new("review", FigureType::ReviewMarker, [240, 200, 60]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_names_dropped() {
        let set = LabelSet::new(vec![
            LabelClass::new("car", FigureType::BoundingBox, [0, 0, 0]),
            LabelClass::new("car", FigureType::Mask, [0, 0, 0]),
        ]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("car").map(|c| c.figure_type), Some(FigureType::BoundingBox));
    }

    #[test]
    fn test_default_labels() {
        let set = default_labels();
        assert_eq!(set.len(), 4);
        assert_eq!(set.mask_class_count(), 1);
        assert_eq!(set.index_of("road"), Some(2));
        assert_eq!(set.get("person").map(|c| c.keypoints.len()), Some(2));
    }
}
