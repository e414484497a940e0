//! Per-label segmentation mask.
//!
//! A mask keeps two representations: the dense `height x width` grid that
//! editing operates on, and the run-length string that is persisted and
//! compared in history snapshots. They are not kept in sync automatically:
//! call [`SegmentationMask::encode`] after mutating the grid and
//! [`SegmentationMask::decode`] after loading.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::codec::{self, RleError};
use crate::geometry::{Point, raster};

/// Which value a polygon fill writes into the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaskMode {
    /// Fill with 1
    #[default]
    Addition,
    /// Fill with 0
    Subtraction,
}

impl MaskMode {
    pub fn value(self) -> u8 {
        match self {
            MaskMode::Addition => 1,
            MaskMode::Subtraction => 0,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            MaskMode::Addition => MaskMode::Subtraction,
            MaskMode::Subtraction => MaskMode::Addition,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationMask {
    pub label: String,
    pub rle: String,
    pub height: usize,
    pub width: usize,
    #[serde(skip, default = "empty_grid")]
    grid: Array2<u8>,
}

fn empty_grid() -> Array2<u8> {
    Array2::zeros((0, 0))
}

impl SegmentationMask {
    /// Create an all-zero mask with both representations in sync.
    pub fn empty(label: impl Into<String>, width: usize, height: usize) -> Self {
        let grid = Array2::zeros((height, width));
        Self {
            label: label.into(),
            rle: codec::encode(&grid),
            height,
            width,
            grid,
        }
    }

    /// Create a mask from a run-length string, decoding it immediately.
    pub fn from_rle(
        label: impl Into<String>,
        rle: impl Into<String>,
        width: usize,
        height: usize,
    ) -> Result<Self, RleError> {
        let mut mask = Self {
            label: label.into(),
            rle: rle.into(),
            height,
            width,
            grid: empty_grid(),
        };
        mask.decode()?;
        Ok(mask)
    }

    /// Dense grid view. Only valid after `decode` or a constructor.
    pub fn grid(&self) -> &Array2<u8> {
        &self.grid
    }

    /// Refresh the run-length string from the grid.
    pub fn encode(&mut self) {
        self.rle = codec::encode(&self.grid);
    }

    /// Rebuild the grid from the run-length string.
    pub fn decode(&mut self) -> Result<(), RleError> {
        self.grid = codec::decode(&self.rle, self.width, self.height)?;
        Ok(())
    }

    /// Whether the grid has the declared shape.
    pub fn is_decoded(&self) -> bool {
        self.grid.dim() == (self.height, self.width)
    }

    /// Even-odd fill of a polygon into the grid. Does not re-encode.
    ///
    /// Returns the number of cells written.
    pub fn fill_polygon(&mut self, vertices: &[Point], mode: MaskMode) -> usize {
        if !self.is_decoded() {
            log::warn!("Mask '{}' filled before decode, resetting grid", self.label);
            self.grid = Array2::zeros((self.height, self.width));
        }
        raster::fill_polygon(&mut self.grid, vertices, mode.value())
    }

    /// Number of foreground cells.
    pub fn foreground(&self) -> usize {
        self.grid.iter().filter(|&&v| v != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_canvas(w: f32, h: f32) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(w, 0.0),
            Point::new(w, h),
            Point::new(0.0, h),
        ]
    }

    #[test]
    fn test_empty_mask_encodes_single_run() {
        let mask = SegmentationMask::empty("road", 4, 4);
        assert_eq!(mask.rle, "0:16");
    }

    #[test]
    fn test_fill_then_encode_then_decode() {
        let mut mask = SegmentationMask::empty("road", 4, 4);
        mask.fill_polygon(&full_canvas(4.0, 4.0), MaskMode::Addition);
        // Grid changed, string untouched until re-encoded
        assert_eq!(mask.rle, "0:16");
        mask.encode();
        assert_eq!(mask.rle, "1:16");

        let restored = SegmentationMask::from_rle("road", mask.rle.clone(), 4, 4).expect("valid");
        assert!(restored.grid().iter().all(|&v| v == 1));
        assert_eq!(restored.foreground(), 16);
    }

    #[test]
    fn test_subtraction_mode() {
        let mut mask = SegmentationMask::from_rle("road", "1:16", 4, 4).expect("valid");
        mask.fill_polygon(&full_canvas(2.0, 4.0), MaskMode::Subtraction);
        mask.encode();
        assert_eq!(mask.rle, "0:2,1:2,0:2,1:2,0:2,1:2,0:2,1:2");
    }

    #[test]
    fn test_deserialized_mask_needs_decode() {
        let json = r#"{"label": "road", "rle": "0:3,1:3", "height": 2, "width": 3}"#;
        let mut mask: SegmentationMask = serde_json::from_str(json).expect("valid json");
        assert!(!mask.is_decoded());
        mask.decode().expect("valid rle");
        assert!(mask.is_decoded());
        assert_eq!(mask.foreground(), 3);
    }

    #[test]
    fn test_decode_error_surfaces() {
        let err = SegmentationMask::from_rle("road", "1:5", 4, 4).unwrap_err();
        assert_eq!(err, RleError::LengthMismatch { expected: 16, found: 5 });
    }

    #[test]
    fn test_mode_toggle() {
        assert_eq!(MaskMode::Addition.toggled(), MaskMode::Subtraction);
        assert_eq!(MaskMode::Subtraction.value(), 0);
    }
}
