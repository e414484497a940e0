//! Geometry helpers shared by figures and the controller.
//!
//! - Proximity and containment tests used for hit-testing
//! - Screen/image coordinate transforms ([`viewport`])
//! - Even-odd polygon rasterization for masks ([`raster`])
//! - Radial sector selection for the label picker

pub mod raster;
pub mod viewport;

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

pub use viewport::Viewport;

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Per-axis absolute difference to another point.
    pub fn delta(&self, other: &Point) -> (f32, f32) {
        ((self.x - other.x).abs(), (self.y - other.y).abs())
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Check whether `p` lies within `distance` of `cursor`.
///
/// Uses a Chebyshev box: both axis differences must be at most `distance`.
pub fn is_close(p: &Point, cursor: &Point, distance: f32) -> bool {
    let (dx, dy) = p.delta(cursor);
    dx <= distance && dy <= distance
}

/// Inclusive rectangle containment for normalized corners.
pub fn rect_contains(x1: f32, y1: f32, x2: f32, y2: f32, cursor: &Point) -> bool {
    cursor.x >= x1 && cursor.x <= x2 && cursor.y >= y1 && cursor.y <= y2
}

/// Angle of the ray from `center` to `cursor`, measured from the positive
/// x-axis and normalized to `[0, 2π)`.
pub fn normalized_angle(center: &Point, cursor: &Point) -> f32 {
    let angle = (cursor.y - center.y).atan2(cursor.x - center.x);
    let angle = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative angles
    if angle >= TAU { 0.0 } else { angle }
}

/// Index of the equal angular sector containing the ray to `cursor`.
///
/// Returns `None` when there are no sectors.
pub fn sector_index(sectors: usize, center: &Point, cursor: &Point) -> Option<usize> {
    if sectors == 0 {
        return None;
    }
    let angle = normalized_angle(center, cursor);
    let index = (sectors as f32 * angle / TAU).floor() as usize;
    Some(index.min(sectors - 1))
}
