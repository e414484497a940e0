//! Run-length codec for binary masks.
//!
//! Wire format: `"v1:c1,v2:c2,...,vn:cn"` where each value is `0` or `1`,
//! each count is a positive integer and the counts sum to `width * height`.
//! The grid is flattened row-major before encoding.

use ndarray::Array2;
use thiserror::Error;

use crate::constants::MAX_MASK_CELLS;

/// Errors produced while decoding a run-length string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RleError {
    /// A token is not of the form `value:count`
    #[error("malformed token '{token}' at position {index}")]
    MalformedToken {
        /// Zero-based token index
        index: usize,
        /// The offending token
        token: String,
    },

    /// A value other than 0 or 1
    #[error("invalid mask value '{value}' at token {index}")]
    InvalidValue { index: usize, value: String },

    /// A run with a count of zero
    #[error("zero-length run at token {index}")]
    ZeroCount { index: usize },

    /// Counts do not add up to the target shape
    #[error("run lengths sum to {found}, expected {expected}")]
    LengthMismatch { expected: usize, found: usize },

    /// The target shape overflows or exceeds the largest supported grid
    #[error("mask shape {width}x{height} is too large")]
    ShapeTooLarge { width: usize, height: usize },
}

/// Number of cells in a `width x height` grid, if that shape is supported.
pub fn cell_count(width: usize, height: usize) -> Result<usize, RleError> {
    width
        .checked_mul(height)
        .filter(|&cells| cells <= MAX_MASK_CELLS)
        .ok_or(RleError::ShapeTooLarge { width, height })
}

/// Encode a binary grid as a run-length string.
///
/// Any non-zero cell is written as `1`.
pub fn encode(grid: &Array2<u8>) -> String {
    let mut tokens: Vec<String> = Vec::new();
    let mut current: Option<(u8, usize)> = None;

    for &cell in grid.iter() {
        let value = u8::from(cell != 0);
        current = match current {
            Some((v, count)) if v == value => Some((v, count + 1)),
            Some((v, count)) => {
                tokens.push(format!("{v}:{count}"));
                Some((value, 1))
            }
            None => Some((value, 1)),
        };
    }
    if let Some((v, count)) = current {
        tokens.push(format!("{v}:{count}"));
    }

    tokens.join(",")
}

/// Decode a run-length string into a `height x width` grid.
pub fn decode(rle: &str, width: usize, height: usize) -> Result<Array2<u8>, RleError> {
    let expected = cell_count(width, height)?;
    if rle.is_empty() {
        return if expected == 0 {
            Ok(Array2::zeros((height, width)))
        } else {
            Err(RleError::LengthMismatch { expected, found: 0 })
        };
    }

    let mut runs: Vec<(u8, usize)> = Vec::new();
    let mut total: usize = 0;
    for (index, token) in rle.split(',').enumerate() {
        let (value, count) = parse_token(index, token)?;
        total = total.saturating_add(count);
        if total > expected {
            return Err(RleError::LengthMismatch {
                expected,
                found: total,
            });
        }
        runs.push((value, count));
    }
    if total != expected {
        return Err(RleError::LengthMismatch {
            expected,
            found: total,
        });
    }

    let mut flat = Vec::with_capacity(expected);
    for (value, count) in runs {
        flat.extend(std::iter::repeat_n(value, count));
    }
    Array2::from_shape_vec((height, width), flat).map_err(|_| RleError::LengthMismatch {
        expected,
        found: total,
    })
}

fn parse_token(index: usize, token: &str) -> Result<(u8, usize), RleError> {
    let malformed = || RleError::MalformedToken {
        index,
        token: token.to_string(),
    };
    let (value, count) = token.split_once(':').ok_or_else(malformed)?;

    let value = match value {
        "0" => 0,
        "1" => 1,
        other => {
            return Err(RleError::InvalidValue {
                index,
                value: other.to_string(),
            });
        }
    };
    if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let count: usize = count.parse().map_err(|_| malformed())?;
    if count == 0 {
        return Err(RleError::ZeroCount { index });
    }
    Ok((value, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_all_zero_grid() {
        let grid = Array2::<u8>::zeros((4, 4));
        assert_eq!(encode(&grid), "0:16");
    }

    #[test]
    fn test_all_ones_decode() {
        let grid = decode("1:16", 4, 4).expect("valid rle");
        assert_eq!(grid.dim(), (4, 4));
        assert!(grid.iter().all(|&v| v == 1));
    }

    #[test]
    fn test_runs_follow_row_major_order() {
        let grid = array![[0u8, 0, 1], [1, 1, 0]];
        assert_eq!(encode(&grid), "0:2,1:3,0:1");
    }

    #[test]
    fn test_round_trip_various_shapes() {
        let shapes = [(1, 1), (1, 7), (5, 1), (3, 4), (8, 9)];
        for (h, w) in shapes {
            // Deterministic pseudo-random pattern
            let grid = Array2::from_shape_fn((h, w), |(r, c)| ((r * 7 + c * 3 + r * c) % 5 < 2) as u8);
            let encoded = encode(&grid);
            assert_eq!(decode(&encoded, w, h).expect("round trip"), grid, "shape {h}x{w}");
        }
    }

    #[test]
    fn test_non_square_reshape() {
        let grid = decode("1:2,0:4", 3, 2).expect("valid rle");
        assert_eq!(grid, array![[1u8, 1, 0], [0, 0, 0]]);
    }

    #[test]
    fn test_decode_rejects_short_sum() {
        assert_eq!(
            decode("0:15", 4, 4),
            Err(RleError::LengthMismatch {
                expected: 16,
                found: 15
            })
        );
    }

    #[test]
    fn test_decode_rejects_long_sum() {
        assert!(matches!(
            decode("0:10,1:10", 4, 4),
            Err(RleError::LengthMismatch { expected: 16, .. })
        ));
    }

    #[test]
    fn test_decode_rejects_malformed_tokens() {
        assert!(matches!(decode("0-16", 4, 4), Err(RleError::MalformedToken { index: 0, .. })));
        assert!(matches!(decode("0:8,1:", 4, 4), Err(RleError::MalformedToken { index: 1, .. })));
        assert!(matches!(decode("0:+16", 4, 4), Err(RleError::MalformedToken { .. })));
        assert!(matches!(decode("2:16", 4, 4), Err(RleError::InvalidValue { .. })));
        assert!(matches!(decode("0:0,0:16", 4, 4), Err(RleError::ZeroCount { index: 0 })));
    }

    #[test]
    fn test_empty_grid() {
        let grid = Array2::<u8>::zeros((0, 0));
        assert_eq!(encode(&grid), "");
        assert_eq!(decode("", 0, 0).expect("empty"), grid);
        assert!(decode("", 2, 2).is_err());
    }

    #[test]
    fn test_decode_rejects_oversized_shape() {
        assert_eq!(
            decode("0:1", usize::MAX / 2, 4),
            Err(RleError::ShapeTooLarge {
                width: usize::MAX / 2,
                height: 4
            })
        );
        assert!(matches!(
            decode("0:1", MAX_MASK_CELLS, 2),
            Err(RleError::ShapeTooLarge { .. })
        ));
        assert_eq!(cell_count(16384, 16384), Ok(MAX_MASK_CELLS));
    }
}
