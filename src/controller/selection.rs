//! Hit-testing across a figure list.

use super::mode::Selection;
use crate::geometry::Point;
use crate::model::{Figure, HitRadii};

/// Figure indices ordered by surface, largest first.
///
/// Ties keep list order. Rendering uses the same order so that smaller
/// figures are drawn on top of larger ones.
pub fn by_surface_desc(figures: &[Figure]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..figures.len()).collect();
    order.sort_by(|&a, &b| figures[b].surface().total_cmp(&figures[a].surface()));
    order
}

/// Pick the figure under the cursor.
///
/// Figures are visited largest first. A handle hit wins immediately.
/// Otherwise the last figure whose body contains the cursor is selected,
/// which is the smallest one. Returns `None` when nothing is hit.
pub fn pick(figures: &[Figure], cursor: &Point, radii: &HitRadii) -> Option<Selection> {
    let mut contained = None;
    for index in by_surface_desc(figures) {
        let figure = &figures[index];
        if let Some(point) = figure.handle_at(cursor, radii) {
            return Some(Selection {
                figure: index,
                point: Some(point),
            });
        }
        if figure.contains(cursor) {
            contained = Some(Selection {
                figure: index,
                point: None,
            });
        }
    }
    contained
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, Keypoint, KeypointGroup, ReviewMarker};

    const RADII: HitRadii = HitRadii {
        handle: 3.0,
        marker: 10.0,
    };

    fn bbox(x1: f32, y1: f32, x2: f32, y2: f32) -> Figure {
        BoundingBox::from_coords("car", x1, y1, x2, y2).into()
    }

    #[test]
    fn test_smallest_containing_box_wins() {
        let figures = vec![bbox(20.0, 20.0, 30.0, 30.0), bbox(0.0, 0.0, 100.0, 100.0)];
        let sel = pick(&figures, &Point::new(25.0, 25.0), &RADII);
        assert_eq!(sel, Some(Selection { figure: 0, point: None }));
    }

    #[test]
    fn test_handle_on_large_box_beats_inner_body() {
        let figures = vec![bbox(0.0, 0.0, 100.0, 100.0), bbox(-5.0, -5.0, 20.0, 20.0)];
        // (0, 0) is a corner of the large box and inside the small one
        let sel = pick(&figures, &Point::new(1.0, 1.0), &RADII);
        assert_eq!(sel, Some(Selection { figure: 0, point: Some(0) }));
    }

    #[test]
    fn test_handle_of_point_figure_inside_box() {
        let group: Figure =
            KeypointGroup::new("person", vec![Keypoint::new(50.0, 50.0, "head")]).into();
        let figures = vec![bbox(0.0, 0.0, 100.0, 100.0), group];
        let sel = pick(&figures, &Point::new(51.0, 49.0), &RADII);
        assert_eq!(sel, Some(Selection { figure: 1, point: Some(0) }));
    }

    #[test]
    fn test_marker_radius_is_wider() {
        let figures = vec![Figure::from(ReviewMarker::new("review", Point::new(10.0, 10.0)))];
        let sel = pick(&figures, &Point::new(18.0, 18.0), &RADII);
        assert_eq!(sel, Some(Selection { figure: 0, point: Some(0) }));
    }

    #[test]
    fn test_miss_returns_none() {
        let figures = vec![bbox(0.0, 0.0, 10.0, 10.0)];
        assert_eq!(pick(&figures, &Point::new(50.0, 50.0), &RADII), None);
        assert_eq!(pick(&[], &Point::new(0.0, 0.0), &RADII), None);
    }

    #[test]
    fn test_equal_surfaces_keep_list_order() {
        let figures = vec![bbox(0.0, 0.0, 40.0, 40.0), bbox(20.0, 20.0, 60.0, 60.0)];
        assert_eq!(by_surface_desc(&figures), vec![0, 1]);
        // Both contain the cursor, no handle is near; the later one wins
        let sel = pick(&figures, &Point::new(30.0, 30.0), &RADII);
        assert_eq!(sel, Some(Selection { figure: 1, point: None }));
    }
}
