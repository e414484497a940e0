//! Keypoint skeleton figure.

use serde::{Deserialize, Serialize};

use super::label::KeypointTemplate;
use crate::geometry::{Point, is_close};

/// A single named keypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub label: String,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, label: impl Into<String>) -> Self {
        Self {
            x,
            y,
            label: label.into(),
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// An ordered group of named keypoints.
///
/// A group never keeps a lone keypoint: deleting down to one point clears it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypointGroup {
    pub label: String,
    pub keypoints_data: Vec<Keypoint>,
}

impl KeypointGroup {
    pub fn new(label: impl Into<String>, keypoints: Vec<Keypoint>) -> Self {
        Self {
            label: label.into(),
            keypoints_data: keypoints,
        }
    }

    /// Lay out a template inside the rectangle spanned by `a` and `b`.
    ///
    /// Template positions are normalized to `[0, 1]` and measured from the
    /// gesture start `a`, so the skeleton mirrors with the drag direction.
    pub fn from_template(
        label: impl Into<String>,
        template: &[KeypointTemplate],
        a: Point,
        b: Point,
    ) -> Self {
        let keypoints = template
            .iter()
            .map(|t| Keypoint::new(a.x + t.x * (b.x - a.x), a.y + t.y * (b.y - a.y), &t.name))
            .collect();
        Self::new(label, keypoints)
    }

    pub fn len(&self) -> usize {
        self.keypoints_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints_data.is_empty()
    }

    pub fn points(&self) -> Vec<Point> {
        self.keypoints_data.iter().map(Keypoint::position).collect()
    }

    /// First keypoint within `radius` of the cursor.
    pub fn handle_at(&self, cursor: &Point, radius: f32) -> Option<usize> {
        self.keypoints_data
            .iter()
            .position(|k| is_close(&k.position(), cursor, radius))
    }

    /// Move keypoint `index`. Returns false for an out-of-range index.
    pub fn move_point(&mut self, index: usize, to: Point) -> bool {
        match self.keypoints_data.get_mut(index) {
            Some(k) => {
                k.x = to.x;
                k.y = to.y;
                true
            }
            None => false,
        }
    }

    /// Delete keypoint `index`, or every keypoint when `index` is `None`.
    ///
    /// Returns the remaining keypoint count.
    pub fn delete_point(&mut self, index: Option<usize>) -> usize {
        match index {
            Some(i) if i < self.keypoints_data.len() => {
                self.keypoints_data.remove(i);
                if self.keypoints_data.len() == 1 {
                    self.keypoints_data.clear();
                }
            }
            Some(_) => {}
            None => self.keypoints_data.clear(),
        }
        self.keypoints_data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> KeypointGroup {
        KeypointGroup::new(
            "person",
            vec![Keypoint::new(0.0, 0.0, "head"), Keypoint::new(10.0, 10.0, "foot")],
        )
    }

    #[test]
    fn test_delete_from_pair_clears_group() {
        let mut group = pair();
        assert_eq!(group.delete_point(Some(0)), 0);
        assert!(group.is_empty());
    }

    #[test]
    fn test_delete_from_triple_keeps_two() {
        let mut group = pair();
        group.keypoints_data.push(Keypoint::new(5.0, 5.0, "hip"));
        assert_eq!(group.delete_point(Some(1)), 2);
        assert_eq!(group.keypoints_data[1].label, "hip");
    }

    #[test]
    fn test_delete_out_of_range_is_noop() {
        let mut group = pair();
        assert_eq!(group.delete_point(Some(7)), 2);
    }

    #[test]
    fn test_delete_all() {
        let mut group = pair();
        assert_eq!(group.delete_point(None), 0);
    }

    #[test]
    fn test_template_layout() {
        let template = vec![
            KeypointTemplate::new("a", 0.0, 0.0),
            KeypointTemplate::new("mid", 0.5, 0.5),
            KeypointTemplate::new("b", 1.0, 1.0),
        ];
        let group =
            KeypointGroup::from_template("person", &template, Point::new(10.0, 10.0), Point::new(30.0, 50.0));
        assert_eq!(
            group.points(),
            vec![Point::new(10.0, 10.0), Point::new(20.0, 30.0), Point::new(30.0, 50.0)]
        );
        assert_eq!(group.keypoints_data[1].label, "mid");
    }

    #[test]
    fn test_move_and_handle() {
        let mut group = pair();
        assert!(group.move_point(1, Point::new(20.0, 20.0)));
        assert!(!group.move_point(5, Point::new(0.0, 0.0)));
        assert_eq!(group.handle_at(&Point::new(21.0, 19.0), 2.0), Some(1));
    }
}
