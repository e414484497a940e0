//! Input events consumed by the controller.

use serde::{Deserialize, Serialize};

/// Discrete key commands, already resolved from raw keys by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyCommand {
    Undo,
    Redo,
    /// Delete the point or figure under the cursor
    Delete,
    /// Abort the gesture in progress
    Cancel,
    /// Finish the gesture in progress (closes mask polygons)
    Commit,
    Copy,
    Paste,
    /// Switch mask fills between addition and subtraction
    ToggleMaskMode,
    /// Open the radial label picker at the cursor
    OpenLabelPicker,
    /// Activate the label at this index
    SelectLabel(usize),
    NextLabel,
    PreviousLabel,
    ToggleTrash,
    ToggleRequiresReview,
}

/// One input event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    /// Zoom by `steps` factor steps around a screen position
    Zoom { x: f32, y: f32, steps: i32 },
    /// Pan by a screen-space delta
    Pan { dx: f32, dy: f32 },
    Key(KeyCommand),
}

/// What an event changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    /// Visible state changed and the host should redraw
    pub redraw: bool,
    /// A change was committed to the figure list
    pub committed: bool,
}

impl EventOutcome {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn redraw() -> Self {
        Self {
            redraw: true,
            committed: false,
        }
    }

    pub fn committed() -> Self {
        Self {
            redraw: true,
            committed: true,
        }
    }

    pub fn from_commit(committed: bool) -> Self {
        if committed { Self::committed() } else { Self::redraw() }
    }
}
