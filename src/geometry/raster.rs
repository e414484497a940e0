//! Polygon rasterization into dense binary grids.

use ndarray::Array2;

use super::Point;

/// Fill a polygon into `grid` using the even-odd rule.
///
/// A cell `(row, col)` is filled when its center `(col + 0.5, row + 0.5)`
/// lies inside the polygon. The polygon is implicitly closed. Cells outside
/// the grid are ignored. Returns the number of cells written.
pub fn fill_polygon(grid: &mut Array2<u8>, vertices: &[Point], value: u8) -> usize {
    if vertices.len() < 3 {
        return 0;
    }

    let (height, width) = grid.dim();
    let mut written = 0;
    let mut crossings: Vec<f32> = Vec::with_capacity(vertices.len());

    for row in 0..height {
        let y = row as f32 + 0.5;
        crossings.clear();

        let mut j = vertices.len() - 1;
        for i in 0..vertices.len() {
            let (a, b) = (&vertices[i], &vertices[j]);
            if (a.y > y) != (b.y > y) {
                crossings.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
            }
            j = i;
        }
        crossings.sort_by(f32::total_cmp);

        for span in crossings.chunks_exact(2) {
            let start = (span[0] - 0.5).ceil().max(0.0) as usize;
            let end = ((span[1] - 0.5).ceil().max(0.0) as usize).min(width);
            for col in start..end {
                grid[[row, col]] = value;
                written += 1;
            }
        }
    }

    written
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<Point> {
        vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    #[test]
    fn test_full_canvas_fill() {
        let mut grid = Array2::<u8>::zeros((4, 4));
        let written = fill_polygon(&mut grid, &square(0.0, 0.0, 4.0, 4.0), 1);
        assert_eq!(written, 16);
        assert!(grid.iter().all(|&v| v == 1));
    }

    #[test]
    fn test_partial_square() {
        let mut grid = Array2::<u8>::zeros((6, 6));
        fill_polygon(&mut grid, &square(1.0, 2.0, 3.0, 4.0), 1);
        assert_eq!(grid.iter().filter(|&&v| v == 1).count(), 4);
        assert_eq!(grid[[2, 1]], 1);
        assert_eq!(grid[[3, 2]], 1);
        assert_eq!(grid[[1, 1]], 0);
        assert_eq!(grid[[2, 3]], 0);
    }

    #[test]
    fn test_subtraction_writes_zero() {
        let mut grid = Array2::<u8>::ones((4, 4));
        fill_polygon(&mut grid, &square(0.0, 0.0, 2.0, 4.0), 0);
        assert_eq!(grid.iter().filter(|&&v| v == 0).count(), 8);
        assert_eq!(grid[[0, 3]], 1);
    }

    #[test]
    fn test_polygon_outside_grid_is_clipped() {
        let mut grid = Array2::<u8>::zeros((3, 3));
        let written = fill_polygon(&mut grid, &square(-10.0, -10.0, 20.0, 20.0), 1);
        assert_eq!(written, 9);
    }

    #[test]
    fn test_even_odd_self_overlap() {
        // Self-crossing bow-tie: left and right lobes fill, top and bottom stay empty
        let mut grid = Array2::<u8>::zeros((4, 4));
        let bowtie = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(4.0, 0.0),
            Point::new(0.0, 4.0),
        ];
        fill_polygon(&mut grid, &bowtie, 1);
        assert_eq!(grid[[0, 0]], 0);
        assert_eq!(grid[[1, 0]], 1);
        assert_eq!(grid[[0, 1]], 0);
    }

    #[test]
    fn test_degenerate_polygon_writes_nothing() {
        let mut grid = Array2::<u8>::zeros((3, 3));
        assert_eq!(fill_polygon(&mut grid, &[Point::new(0.0, 0.0), Point::new(2.0, 2.0)], 1), 0);
    }
}
