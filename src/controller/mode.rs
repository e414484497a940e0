//! Pointer-driven editing modes.

use crate::geometry::Point;
use crate::model::Figure;

/// The current editing mode.
#[derive(Debug, Clone, Default)]
pub enum EditMode {
    /// Waiting for input; hover updates the selection.
    #[default]
    Idle,
    /// Two-point creation gesture in progress.
    Creating { start: Point, current: Point },
    /// Dragging a handle of an existing figure.
    Moving {
        figure: usize,
        point: usize,
        /// The figure before the drag, restored on cancel
        original: Box<Figure>,
        moved: bool,
    },
    /// Collecting vertices of a mask polygon.
    DrawingPolygon { vertices: Vec<Point>, cursor: Point },
}

impl EditMode {
    pub fn is_idle(&self) -> bool {
        matches!(self, EditMode::Idle)
    }

    /// Whether an uncommitted gesture is in progress.
    pub fn is_gesture(&self) -> bool {
        !self.is_idle()
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditMode::Idle => "Idle",
            EditMode::Creating { .. } => "Creating",
            EditMode::Moving { .. } => "Moving",
            EditMode::DrawingPolygon { .. } => "DrawingPolygon",
        }
    }
}

/// Selected figure and, optionally, its active handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Index into the controller's figure list
    pub figure: usize,
    pub point: Option<usize>,
}
