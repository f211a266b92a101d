//! Movement and attack range fields.
//!
//! - Move range: iterative 4-directional flood fill.
//! - Attack range: midpoint circles per radius, clamped to the map, gaps
//!   filled along the primary axis, then filtered by Bresenham line of
//!   sight.
//! - Border detection for outlining highlighted fields.
//!
//! All functions are pure and return freshly built field lists.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::grid::{neighbors, Field, Walkable};

/// Field list with first-seen order and set semantics.
#[derive(Debug, Default)]
struct OrderedFields {
    seen: HashSet<Field>,
    order: Vec<Field>,
}

impl OrderedFields {
    fn insert(&mut self, field: Field) -> bool {
        let fresh = self.seen.insert(field);
        if fresh {
            self.order.push(field);
        }
        fresh
    }

    fn into_vec(self) -> Vec<Field> {
        self.order
    }
}

// ============================================================================
// Move range
// ============================================================================

/// Fields reachable from `origin` within `move_range` 4-directional steps.
///
/// Runs exactly `move_range` expansion rounds. A neighbour joins the set
/// when it is walkable or when it is `origin` itself, so the acting unit's
/// own occupied field never blocks expansion. The result contains `origin`
/// and is empty when `origin` is off the map.
pub fn compute_move_range<M: Walkable + ?Sized>(
    map: &M,
    origin: Field,
    move_range: u32,
) -> Vec<Field> {
    if !map.in_bounds(origin.x, origin.y) {
        return Vec::new();
    }

    let mut fields = OrderedFields::default();
    fields.insert(origin);
    let mut frontier = vec![origin];

    for _ in 0..move_range {
        // Older fields were fully expanded in earlier rounds.
        let mut next_frontier = Vec::new();
        for field in &frontier {
            for next in neighbors(map, *field) {
                if (map.is_walkable_field(next) || next == origin) && fields.insert(next) {
                    next_frontier.push(next);
                }
            }
        }
        if next_frontier.is_empty() {
            break;
        }
        frontier = next_frontier;
    }

    let fields = fields.into_vec();
    tracing::debug!(?origin, move_range, fields = fields.len(), "Move range computed");
    fields
}

// ============================================================================
// Attack range
// ============================================================================

/// Integer points of a midpoint circle of `radius` around `center`.
///
/// Each step of the first octant emits the four axis-symmetric points of
/// `(x, y)` and of its diagonal mirror `(y, x)`, eight in all. The first
/// octant alone only covers a quarter of each quadrant's arc, so the mirror
/// is needed to close the ring. Points may repeat.
#[must_use]
pub fn midpoint_circle(center: (i64, i64), radius: i64) -> Vec<(i64, i64)> {
    let (cx, cy) = center;
    let mut points = Vec::new();
    if radius <= 0 {
        return points;
    }

    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;

    while x >= y {
        points.extend_from_slice(&[
            (cx + x, cy + y),
            (cx - x, cy + y),
            (cx + x, cy - y),
            (cx - x, cy - y),
            (cx + y, cy + x),
            (cx - y, cy + x),
            (cx + y, cy - x),
            (cx - y, cy - x),
        ]);

        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }

    points
}

/// Points on a Bresenham line from `from` to `to`, both inclusive.
#[must_use]
pub fn bresenham_line(from: (i64, i64), to: (i64, i64)) -> Vec<(i64, i64)> {
    let (x1, y1) = to;
    let dx = (x1 - from.0).abs();
    let dy = (y1 - from.1).abs();
    let sx = if from.0 < x1 { 1 } else { -1 };
    let sy = if from.1 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    let (mut x, mut y) = from;
    let mut points = Vec::with_capacity((dx.max(dy) + 1) as usize);

    loop {
        points.push((x, y));
        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }

    points
}

#[inline]
fn signed(field: Field) -> (i64, i64) {
    (field.x as i64, field.y as i64)
}

/// Snap a signed point to the nearest field on the map.
fn clamp_to_map<M: Walkable + ?Sized>(map: &M, (x, y): (i64, i64)) -> Field {
    let max_x = (map.width() as i64 - 1).max(0);
    let max_y = (map.height() as i64 - 1).max(0);
    Field::new(x.clamp(0, max_x) as u32, y.clamp(0, max_y) as u32)
}

/// The neighbour one step closer to `origin` along the dominant axis.
fn inward_neighbor(origin: Field, field: Field) -> Option<Field> {
    let dx = field.x as i64 - origin.x as i64;
    let dy = field.y as i64 - origin.y as i64;
    if dx == 0 && dy == 0 {
        return None;
    }
    if dx.abs() >= dy.abs() {
        field.offset(-dx.signum() as i32, 0)
    } else {
        field.offset(0, -dy.signum() as i32)
    }
}

/// Raw attack candidates: circle rings for every radius, clamped, with gaps
/// filled.
fn attack_candidates<M: Walkable + ?Sized>(map: &M, origin: Field, attack_range: u32) -> Vec<Field> {
    let mut ring = OrderedFields::default();
    for radius in 1..=attack_range as i64 {
        for point in midpoint_circle(signed(origin), radius) {
            ring.insert(clamp_to_map(map, point));
        }
    }

    let ring = ring.into_vec();
    let mut candidates = OrderedFields::default();
    for field in &ring {
        candidates.insert(*field);
        if let Some(inner) = inward_neighbor(origin, *field) {
            candidates.insert(inner);
        }
    }
    candidates.into_vec()
}

/// Fields visible along the line from `origin` to `target`.
///
/// Walks the Bresenham line tile by tile, excluding `origin`. A tile is
/// visible while every tile before it is walkable, so the first blocking
/// tile is included and the line ends there. Tagged tiles are walkable.
pub fn line_of_sight<M: Walkable + ?Sized>(map: &M, origin: Field, target: Field) -> Vec<Field> {
    let mut visible = Vec::new();
    for (x, y) in bresenham_line(signed(origin), signed(target)).into_iter().skip(1) {
        if x < 0 || y < 0 {
            break;
        }
        let field = Field::new(x as u32, y as u32);
        if !map.in_bounds(field.x, field.y) {
            break;
        }
        visible.push(field);
        if !map.is_walkable_field(field) {
            break;
        }
    }
    visible
}

/// True when `target` is visible from `origin`: nothing blocks the tiles
/// before it.
pub fn has_line_of_sight<M: Walkable + ?Sized>(map: &M, origin: Field, target: Field) -> bool {
    origin == target || line_of_sight(map, origin, target).last() == Some(&target)
}

/// Fields a ranged unit at `origin` can target.
///
/// Returns `None` for `attack_range <= 1`: melee units get no ranged
/// overlay. The origin field is never part of the result.
pub fn compute_attack_range<M: Walkable + ?Sized>(
    map: &M,
    origin: Field,
    attack_range: u32,
) -> Option<Vec<Field>> {
    if attack_range <= 1 {
        return None;
    }
    if !map.in_bounds(origin.x, origin.y) {
        return Some(Vec::new());
    }

    let mut visible = OrderedFields::default();
    for candidate in attack_candidates(map, origin, attack_range) {
        for field in line_of_sight(map, origin, candidate) {
            visible.insert(field);
        }
    }

    let fields = visible.into_vec();
    tracing::debug!(
        ?origin,
        attack_range,
        fields = fields.len(),
        "Attack range computed"
    );
    Some(fields)
}

// ============================================================================
// Borders and highlighting
// ============================================================================

/// Sides of a highlighted field that face outside the highlighted set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Borders {
    /// No field to the east.
    pub right: bool,
    /// No field to the west.
    pub left: bool,
    /// No field to the south.
    pub bottom: bool,
    /// No field to the north.
    pub top: bool,
}

impl Borders {
    /// True if any side needs an outline.
    #[must_use]
    pub const fn any(self) -> bool {
        self.right || self.left || self.bottom || self.top
    }
}

/// Which sides of `field` have no neighbour in `set`.
#[must_use]
pub fn border_sides(field: Field, set: &HashSet<Field>) -> Borders {
    let missing = |dx: i32, dy: i32| field.offset(dx, dy).map_or(true, |n| !set.contains(&n));
    Borders {
        right: missing(1, 0),
        left: missing(-1, 0),
        bottom: missing(0, 1),
        top: missing(0, -1),
    }
}

/// True if `field` lies on the edge of `set`.
#[must_use]
pub fn is_border_tile(field: Field, set: &HashSet<Field>) -> bool {
    border_sides(field, set).any()
}

/// A field prepared for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HighlightTile {
    /// Highlighted field.
    pub field: Field,
    /// Sides to outline.
    pub borders: Borders,
}

/// Pair every field with its borders, dropping string-tagged tiles.
///
/// Borders are computed against the full list, tagged tiles included, so
/// suppressing a tile does not open a seam in the outline.
pub fn highlight_tiles<M: Walkable + ?Sized>(map: &M, fields: &[Field]) -> Vec<HighlightTile> {
    let set: HashSet<Field> = fields.iter().copied().collect();
    fields
        .iter()
        .filter(|f| !map.is_tagged(f.x, f.y))
        .map(|&field| HighlightTile {
            field,
            borders: border_sides(field, &set),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Grid, Tile};

    fn set_of(fields: &[Field]) -> HashSet<Field> {
        fields.iter().copied().collect()
    }

    #[test]
    fn test_move_range_single_step() {
        let grid = Grid::new(10, 10);
        let fields = compute_move_range(&grid, Field::new(5, 5), 1);
        assert_eq!(
            set_of(&fields),
            set_of(&[
                Field::new(5, 5),
                Field::new(4, 5),
                Field::new(6, 5),
                Field::new(5, 4),
                Field::new(5, 6),
            ])
        );
        assert_eq!(fields.len(), 5);
    }

    #[test]
    fn test_move_range_zero_is_origin_only() {
        let grid = Grid::new(4, 4);
        assert_eq!(compute_move_range(&grid, Field::new(1, 1), 0), vec![Field::new(1, 1)]);
    }

    #[test]
    fn test_move_range_diamond_size() {
        let grid = Grid::new(12, 12);
        let fields = compute_move_range(&grid, Field::new(6, 6), 3);
        // 2r(r+1) + 1
        assert_eq!(fields.len(), 25);
        assert!(fields.iter().all(|f| f.manhattan(Field::new(6, 6)) <= 3));
    }

    #[test]
    fn test_move_range_clipped_by_edges_and_walls() {
        let mut grid = Grid::new(5, 5);
        grid.set(1, 0, Tile::Code(1));
        let fields = compute_move_range(&grid, Field::new(0, 0), 2);
        assert_eq!(
            set_of(&fields),
            set_of(&[Field::new(0, 0), Field::new(0, 1), Field::new(0, 2), Field::new(1, 1)])
        );
    }

    #[test]
    fn test_move_range_origin_on_blocked_tile() {
        let mut grid = Grid::new(5, 5);
        grid.set(2, 2, Tile::Code(9));
        let fields = compute_move_range(&grid, Field::new(2, 2), 1);
        assert_eq!(fields.len(), 5);
        assert!(fields.contains(&Field::new(2, 2)));
    }

    #[test]
    fn test_midpoint_circle_radius_one_is_cardinal() {
        let points: HashSet<_> = midpoint_circle((0, 0), 1).into_iter().collect();
        let expected: HashSet<_> = [(1, 0), (-1, 0), (0, 1), (0, -1)].into_iter().collect();
        assert_eq!(points, expected);
    }

    #[test]
    fn test_midpoint_circle_radius_two() {
        let points: HashSet<_> = midpoint_circle((0, 0), 2).into_iter().collect();
        assert_eq!(points.len(), 12);
        assert!(points.contains(&(2, 1)));
        assert!(points.contains(&(-1, -2)));
        assert!(!points.contains(&(2, 2)));
    }

    #[test]
    fn test_bresenham_line_endpoints() {
        let line = bresenham_line((0, 0), (4, 2));
        assert_eq!(line.first(), Some(&(0, 0)));
        assert_eq!(line.last(), Some(&(4, 2)));
        assert_eq!(line.len(), 5);

        assert_eq!(bresenham_line((3, 3), (3, 3)), vec![(3, 3)]);
        assert_eq!(bresenham_line((2, 0), (0, 0)), vec![(2, 0), (1, 0), (0, 0)]);
    }

    #[test]
    fn test_attack_range_melee_is_none() {
        let grid = Grid::new(5, 5);
        assert!(compute_attack_range(&grid, Field::new(2, 2), 1).is_none());
        assert!(compute_attack_range(&grid, Field::new(2, 2), 0).is_none());
    }

    #[test]
    fn test_attack_range_open_grid() {
        let grid = Grid::new(10, 10);
        let origin = Field::new(5, 5);
        let fields = compute_attack_range(&grid, origin, 2).unwrap();
        let set = set_of(&fields);

        assert!(!set.contains(&origin));
        for field in [
            Field::new(7, 5),
            Field::new(5, 3),
            Field::new(6, 6),
            Field::new(4, 4),
            Field::new(7, 6),
        ] {
            assert!(set.contains(&field), "missing ({}, {})", field.x, field.y);
        }
        assert!(!set.contains(&Field::new(7, 7)));
        assert_eq!(fields.len(), set.len());
    }

    #[test]
    fn test_attack_range_occlusion() {
        let mut grid = Grid::new(10, 10);
        let origin = Field::new(5, 5);
        grid.set(6, 5, Tile::Code(1));

        let set = set_of(&compute_attack_range(&grid, origin, 3).unwrap());

        // The blocker is seen, the fields behind it are not.
        assert!(set.contains(&Field::new(6, 5)));
        assert!(!set.contains(&Field::new(7, 5)));
        assert!(!set.contains(&Field::new(8, 5)));
        // Same distance in open directions.
        assert!(set.contains(&Field::new(2, 5)));
        assert!(set.contains(&Field::new(5, 8)));
        assert!(set.contains(&Field::new(5, 2)));
    }

    #[test]
    fn test_attack_range_clamps_at_corner() {
        let grid = Grid::new(6, 6);
        let fields = compute_attack_range(&grid, Field::new(0, 0), 3).unwrap();
        assert!(fields.iter().all(|f| f.x < 6 && f.y < 6));
        assert!(fields.contains(&Field::new(3, 0)));
        assert!(fields.contains(&Field::new(0, 3)));
    }

    #[test]
    fn test_line_of_sight_sees_through_tags() {
        let mut grid = Grid::new(5, 1);
        grid.set(1, 0, Tile::Tag("window".into()));
        grid.set(3, 0, Tile::Code(4));
        let seen = line_of_sight(&grid, Field::new(0, 0), Field::new(4, 0));
        assert_eq!(seen, vec![Field::new(1, 0), Field::new(2, 0), Field::new(3, 0)]);
        assert!(has_line_of_sight(&grid, Field::new(0, 0), Field::new(2, 0)));
        assert!(has_line_of_sight(&grid, Field::new(0, 0), Field::new(3, 0)));
        assert!(!has_line_of_sight(&grid, Field::new(0, 0), Field::new(4, 0)));
    }

    #[test]
    fn test_border_sides() {
        let set = set_of(&[Field::new(1, 1), Field::new(2, 1), Field::new(1, 2)]);
        let borders = border_sides(Field::new(1, 1), &set);
        assert_eq!(
            borders,
            Borders {
                right: false,
                left: true,
                bottom: false,
                top: true,
            }
        );
        assert!(is_border_tile(Field::new(1, 1), &set));
    }

    #[test]
    fn test_border_at_map_origin() {
        let set = set_of(&[Field::new(0, 0)]);
        let borders = border_sides(Field::new(0, 0), &set);
        assert!(borders.left && borders.top && borders.right && borders.bottom);
    }

    #[test]
    fn test_interior_field_is_not_border() {
        let grid = Grid::new(10, 10);
        let fields = compute_move_range(&grid, Field::new(5, 5), 2);
        let set = set_of(&fields);
        assert!(!is_border_tile(Field::new(5, 5), &set));
        assert!(is_border_tile(Field::new(7, 5), &set));
    }

    #[test]
    fn test_highlight_suppresses_tags() {
        let mut grid = Grid::new(3, 1);
        grid.set(1, 0, Tile::Tag("rune".into()));
        let fields = vec![Field::new(0, 0), Field::new(1, 0), Field::new(2, 0)];
        let tiles = highlight_tiles(&grid, &fields);

        assert_eq!(tiles.len(), 2);
        assert!(!tiles[0].borders.right);
        assert!(!tiles[1].borders.left);
    }
}
