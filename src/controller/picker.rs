//! Radial label picker.
//!
//! Opened at the cursor, it splits the full circle into one equal sector
//! per label class in label-set order. Moving the pointer highlights the
//! sector under it; clicking picks it.

use crate::geometry::{Point, sector_index};
use crate::model::LabelSet;

#[derive(Debug, Clone, PartialEq)]
pub struct RadialPicker {
    center: Point,
    labels: Vec<String>,
    highlighted: Option<usize>,
}

impl RadialPicker {
    pub fn open(center: Point, labels: &LabelSet) -> Self {
        Self {
            center,
            labels: labels.iter().map(|c| c.name.clone()).collect(),
            highlighted: None,
        }
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Update the highlighted sector. Returns whether it changed.
    pub fn hover(&mut self, cursor: &Point) -> bool {
        let next = sector_index(self.labels.len(), &self.center, cursor);
        let changed = next != self.highlighted;
        self.highlighted = next;
        changed
    }

    /// Label in the sector under the cursor.
    pub fn pick(&self, cursor: &Point) -> Option<&str> {
        sector_index(self.labels.len(), &self.center, cursor)
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }
}
