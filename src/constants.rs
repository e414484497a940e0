//! Global constants for the figure editor.
//!
//! Distances are in screen pixels unless stated otherwise. The controller
//! divides them by the current viewport scale before comparing against
//! image-space coordinates.

/// Hit-testing thresholds.
pub mod hit {
    /// Proximity threshold for grabbing a box corner or keypoint handle.
    pub const HANDLE_RADIUS: f32 = 6.0;
    /// Proximity threshold for a review marker, a one-click target.
    pub const MARKER_RADIUS: f32 = 12.0;
    /// Distance from the first polygon vertex that closes a mask polygon.
    pub const POLYGON_LOCK_DISTANCE: f32 = 4.0;
}

/// Minimum movement between the two points of a creation gesture.
pub mod gesture {
    /// Bounding boxes need more than this on both axes.
    pub const BBOX_MIN_MOVEMENT: f32 = 3.0;
    /// Keypoint groups need more than this on both axes.
    pub const KEYPOINT_MIN_MOVEMENT: f32 = 5.0;
    /// Minimum vertex count before a mask polygon can be filled.
    pub const MIN_POLYGON_VERTICES: usize = 3;
}

/// Viewport limits.
pub mod viewport {
    /// Smallest allowed scale.
    pub const MIN_SCALE: f32 = 0.05;
    /// Largest allowed scale.
    pub const MAX_SCALE: f32 = 50.0;
    /// Zoom factor applied per zoom step.
    pub const ZOOM_FACTOR: f32 = 1.2;
    /// The pan offset never exceeds this fraction of the image extent.
    pub const MAX_OFFSET_FRACTION: f32 = 0.9;
}

/// Default number of snapshots kept by the undo history.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Surface reported by keypoint groups, markers and masks.
pub const POINT_FIGURE_SURFACE: f32 = 1.0;

/// Largest mask grid accepted, in cells (16384 x 16384).
pub const MAX_MASK_CELLS: usize = 1 << 28;
