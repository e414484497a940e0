//! Axis-aligned bounding box figure.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, is_close, rect_contains};

/// Number of draggable corners on a box.
pub const BBOX_CORNERS: usize = 4;

/// An axis-aligned box stored with normalized corners (`x1 <= x2`, `y1 <= y2`).
///
/// Corner handles are indexed `[(x1,y1), (x2,y1), (x2,y2), (x1,y2)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BoxFields")]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub label: String,
}

/// Wire form; normalized on the way in.
#[derive(Deserialize)]
struct BoxFields {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    label: String,
}

impl From<BoxFields> for BoundingBox {
    fn from(f: BoxFields) -> Self {
        Self::from_coords(f.label, f.x1, f.y1, f.x2, f.y2)
    }
}

impl BoundingBox {
    /// Create a box from two opposite corners given in any order.
    pub fn new(label: impl Into<String>, a: Point, b: Point) -> Self {
        Self::from_coords(label, a.x, a.y, b.x, b.y)
    }

    /// Create a box from raw coordinates, normalizing them.
    pub fn from_coords(label: impl Into<String>, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        let mut bbox = Self {
            x1,
            y1,
            x2,
            y2,
            label: label.into(),
        };
        bbox.normalize();
        bbox
    }

    /// Swap coordinates so that `x1 <= x2` and `y1 <= y2`.
    /// Returns which axes were swapped.
    fn normalize(&mut self) -> (bool, bool) {
        let swap_x = self.x1 > self.x2;
        let swap_y = self.y1 > self.y2;
        if swap_x {
            std::mem::swap(&mut self.x1, &mut self.x2);
        }
        if swap_y {
            std::mem::swap(&mut self.y1, &mut self.y2);
        }
        (swap_x, swap_y)
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Area of the box, used for ordering.
    pub fn surface(&self) -> f32 {
        self.width().abs() * self.height().abs()
    }

    /// The four corner handles in fixed order.
    pub fn corners(&self) -> [Point; BBOX_CORNERS] {
        [
            Point::new(self.x1, self.y1),
            Point::new(self.x2, self.y1),
            Point::new(self.x2, self.y2),
            Point::new(self.x1, self.y2),
        ]
    }

    pub fn contains(&self, cursor: &Point) -> bool {
        rect_contains(self.x1, self.y1, self.x2, self.y2, cursor)
    }

    /// First corner handle within `radius` of the cursor.
    pub fn handle_at(&self, cursor: &Point, radius: f32) -> Option<usize> {
        self.corners()
            .iter()
            .position(|corner| is_close(corner, cursor, radius))
    }

    /// Drag corner `index` to `to`, renormalizing the box.
    ///
    /// Returns the index of the corner now at the dragged position, which
    /// changes when the drag crosses the opposite edge. Out-of-range indices
    /// leave the box untouched and return `None`.
    pub fn move_corner(&mut self, index: usize, to: Point) -> Option<usize> {
        let (left, top) = match index {
            0 => (true, true),
            1 => (false, true),
            2 => (false, false),
            3 => (true, false),
            _ => return None,
        };
        if left {
            self.x1 = to.x;
        } else {
            self.x2 = to.x;
        }
        if top {
            self.y1 = to.y;
        } else {
            self.y2 = to.y;
        }

        let (swap_x, swap_y) = self.normalize();
        let left = left != swap_x;
        let top = top != swap_y;
        Some(match (left, top) {
            (true, true) => 0,
            (false, true) => 1,
            (false, false) => 2,
            (true, false) => 3,
        })
    }
}
