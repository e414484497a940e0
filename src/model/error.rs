//! Error types for figure construction and item consistency.

use thiserror::Error;

use crate::codec::RleError;

/// Errors raised while building figures or items.
#[derive(Error, Debug)]
pub enum FigureError {
    /// A field map could not be turned into (or out of) a figure
    #[error("Invalid figure fields: {0}")]
    Fields(#[from] serde_json::Error),

    /// A mask's run-length string failed to decode
    #[error("Mask decode failed: {0}")]
    Rle(#[from] RleError),

    /// A second mask for a label that already has one
    #[error("Item already has a mask for label '{label}'")]
    DuplicateMask {
        /// The label with the existing mask
        label: String,
    },

    /// More masks than there are mask label classes; the data is corrupt
    #[error("Item has {found} masks but only {max} mask label classes are configured")]
    TooManyMasks {
        /// Number of masks found
        found: usize,
        /// Number of configured mask classes
        max: usize,
    },

    /// Mask dimensions disagree with the item
    #[error("Mask '{label}' is {width}x{height}, item is {item_width}x{item_height}")]
    MaskShape {
        label: String,
        width: usize,
        height: usize,
        item_width: usize,
        item_height: usize,
    },
}
