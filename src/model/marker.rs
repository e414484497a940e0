//! Review marker: a labelled one-click point.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, is_close};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewMarker {
    pub x: f32,
    pub y: f32,
    pub label: String,
}

impl ReviewMarker {
    pub fn new(label: impl Into<String>, at: Point) -> Self {
        Self {
            x: at.x,
            y: at.y,
            label: label.into(),
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The marker's single handle, tested with the wide marker radius.
    pub fn handle_at(&self, cursor: &Point, radius: f32) -> Option<usize> {
        is_close(&self.position(), cursor, radius).then_some(0)
    }

    pub fn move_to(&mut self, to: Point) {
        self.x = to.x;
        self.y = to.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_hit() {
        let marker = ReviewMarker::new("check", Point::new(50.0, 50.0));
        assert_eq!(marker.handle_at(&Point::new(60.0, 40.0), 12.0), Some(0));
        assert_eq!(marker.handle_at(&Point::new(63.0, 50.0), 12.0), None);
    }
}
