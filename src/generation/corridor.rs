//! Dog-leg corridors between two cells.

use crate::geometry::Point;
use crate::rng::LevelRng;
use crate::surface::Surface;

/// Column of the vertical leg and row of the horizontal leg.
fn leg_lines(from: Point, to: Point, horizontal_first: bool) -> (i32, i32) {
    if horizontal_first {
        (to.x, from.y)
    } else {
        (from.x, to.y)
    }
}

/// Cells of an L-shaped path from `from` to `to`.
///
/// With `horizontal_first` the horizontal leg runs along `from.y` and the
/// vertical leg along `to.x`; otherwise the vertical leg runs along `from.x`
/// and the horizontal leg along `to.y`. The corner cell appears in both legs.
pub fn dog_leg(from: Point, to: Point, horizontal_first: bool) -> Vec<Point> {
    let (vertical_x, horizontal_y) = leg_lines(from, to, horizontal_first);

    let horizontal = (from.x.min(to.x)..=from.x.max(to.x)).map(|x| Point::new(x, horizontal_y));
    let vertical = (from.y.min(to.y)..=from.y.max(to.y)).map(|y| Point::new(vertical_x, y));

    if horizontal_first {
        horizontal.chain(vertical).collect()
    } else {
        vertical.chain(horizontal).collect()
    }
}

/// Carve a dog-leg corridor with a random leg order.
///
/// Each leg is clipped to the surface bounds before it is walked, so endpoints
/// far off the surface cost nothing.
pub fn route<R: LevelRng + ?Sized>(surface: &mut dyn Surface, rng: &mut R, from: Point, to: Point) {
    let horizontal_first = rng.chance(0.5);
    let (vertical_x, horizontal_y) = leg_lines(from, to, horizontal_first);
    let bounds = surface.bounds();
    let (last_x, last_y) = (bounds.max_x().saturating_sub(1), bounds.max_y().saturating_sub(1));

    if (bounds.y..bounds.max_y()).contains(&horizontal_y) {
        for x in from.x.min(to.x).max(bounds.x)..=from.x.max(to.x).min(last_x) {
            mark(surface, Point::new(x, horizontal_y));
        }
    }
    if (bounds.x..bounds.max_x()).contains(&vertical_x) {
        for y in from.y.min(to.y).max(bounds.y)..=from.y.max(to.y).min(last_y) {
            mark(surface, Point::new(vertical_x, y));
        }
    }
}

fn mark(surface: &mut dyn Surface, cell: Point) {
    if surface.contains(cell) {
        surface.set_ground(cell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded_rng;
    use crate::surface::{Cell, LevelMap};

    #[test]
    fn test_horizontal_first_turns_at_destination_column() {
        let path = dog_leg(Point::new(1, 1), Point::new(4, 3), true);
        assert!(path.contains(&Point::new(1, 1)));
        assert!(path.contains(&Point::new(4, 1)));
        assert!(path.contains(&Point::new(4, 3)));
        assert!(!path.contains(&Point::new(1, 3)));
    }

    #[test]
    fn test_vertical_first_turns_at_destination_row() {
        let path = dog_leg(Point::new(1, 1), Point::new(4, 3), false);
        assert!(path.contains(&Point::new(1, 3)));
        assert!(!path.contains(&Point::new(4, 1)));
    }

    #[test]
    fn test_path_is_connected_l_shape() {
        let from = Point::new(7, 2);
        let to = Point::new(2, 9);
        for horizontal_first in [true, false] {
            let path = dog_leg(from, to, horizontal_first);
            assert!(path.contains(&from) && path.contains(&to));
            // 6 horizontal + 8 vertical cells, sharing the corner
            let mut unique = path.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), 6 + 8 - 1);
        }
    }

    #[test]
    fn test_route_skips_cells_off_the_surface() {
        let mut map = LevelMap::new(5, 5);
        let mut rng = seeded_rng(9);
        route(&mut map, &mut rng, Point::new(2, 2), Point::new(8, -3));
        assert!(map.count(Cell::Ground) > 0);
        assert!(map.ground_cells().iter().all(|p| map.contains(*p)));
    }

    #[test]
    fn test_route_matches_clipped_dog_leg() {
        for seed in 0..8 {
            let (from, to) = (Point::new(-4, 3), Point::new(6, 12));
            let mut map = LevelMap::new(10, 10);
            let horizontal_first = seeded_rng(seed).chance(0.5);
            route(&mut map, &mut seeded_rng(seed), from, to);

            let mut expected: Vec<Point> =
                dog_leg(from, to, horizontal_first).into_iter().filter(|p| map.contains(*p)).collect();
            expected.sort_by_key(|p| (p.y, p.x));
            expected.dedup();
            assert_eq!(map.ground_cells(), expected);
        }
    }

    #[test]
    fn test_far_endpoints_are_clipped() {
        let mut map = LevelMap::new(8, 8);
        route(&mut map, &mut seeded_rng(3), Point::new(i32::MIN, 4), Point::new(i32::MAX, 4));
        assert_eq!(map.count(Cell::Ground), 8);
    }

    #[test]
    fn test_same_point_marks_one_cell() {
        let mut map = LevelMap::new(3, 3);
        route(&mut map, &mut seeded_rng(1), Point::new(1, 1), Point::new(1, 1));
        assert_eq!(map.ground_cells(), vec![Point::new(1, 1)]);
    }
}
