//! Test fixtures and helpers.
//!
//! Grid builders, unit definitions and a reference BFS for consistent
//! testing.

use std::collections::{HashMap, VecDeque};

use fixed::types::I32F32;
use tactics_core::config::{EngineConfig, GridConfig};
use tactics_core::data::{MapData, TileSpec, UnitData};
use tactics_core::game::GameState;
use tactics_core::grid::{neighbors, Field, Grid, Tile, Walkable};
use tactics_core::units::{Side, UnitStats};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Grid with every field walkable.
#[must_use]
pub fn open_grid(width: u32, height: u32) -> Grid {
    Grid::new(width, height)
}

/// Build a grid from ASCII rows.
///
/// `.` is walkable ground (code 0), `#` a wall (code 9) and any other
/// character a walkable tile tagged with that character.
#[must_use]
pub fn grid_from_ascii(rows: &[&str]) -> Grid {
    let tiles = rows
        .iter()
        .map(|row| {
            row.chars()
                .map(|c| match c {
                    '.' => Tile::Code(0),
                    '#' => Tile::Code(9),
                    other => Tile::Tag(other.to_string()),
                })
                .collect()
        })
        .collect();
    Grid::from_rows(tiles, GridConfig::default())
}

/// Unit attributes in the order they are usually quoted.
#[must_use]
pub fn stats(attack: u32, defense: u32, attack_range: u32, move_range: u32) -> UnitStats {
    UnitStats {
        attack,
        defense,
        attack_range,
        move_range,
        ..UnitStats::default()
    }
}

/// A unit definition without sprites.
#[must_use]
pub fn unit_data(name: &str, side: Side, field: Field, count: u32, stats: UnitStats) -> UnitData {
    UnitData {
        name: name.to_string(),
        side,
        position: field,
        stats,
        count,
        skin: format!("skin/{name}"),
        gear: Vec::new(),
    }
}

/// Two small armies facing each other across a wall with one gap.
///
/// ```text
/// .....#....
/// .P...#..E.
/// .A...#....
/// .....b..E.
/// .....#....
/// ```
#[must_use]
pub fn skirmish_map() -> MapData {
    let grid_rows = [
        ".....#....",
        ".....#....",
        ".....#....",
        ".....b....",
        ".....#....",
    ];
    let tiles = grid_rows
        .iter()
        .map(|row| {
            row.chars()
                .map(|c| match c {
                    '#' => TileSpec::Code(9),
                    'b' => TileSpec::Tag("bridge".into()),
                    _ => TileSpec::Code(0),
                })
                .collect()
        })
        .collect();

    MapData {
        name: "skirmish".to_string(),
        tiles,
        units: vec![
            unit_data("pikes", Side::Player, Field::new(1, 1), 20, stats(5, 6, 1, 3)),
            unit_data("archers", Side::Player, Field::new(1, 2), 12, stats(4, 2, 4, 2)),
            unit_data("raiders", Side::Enemy, Field::new(8, 1), 15, stats(6, 3, 1, 4)),
            unit_data("slingers", Side::Enemy, Field::new(8, 3), 10, stats(3, 2, 3, 2)),
        ],
    }
}

/// A game on [`skirmish_map`].
///
/// # Panics
///
/// Panics if the fixture map fails to build.
#[must_use]
pub fn skirmish_game() -> GameState {
    GameState::from_map(&skirmish_map(), EngineConfig::default())
        .expect("skirmish fixture must build")
}

/// Step counts of every field reachable from `start`, by breadth-first
/// search through walkable 4-neighbours. `start` itself is not checked.
#[must_use]
pub fn bfs_distances<M: Walkable + ?Sized>(map: &M, start: Field) -> HashMap<Field, u32> {
    let mut distances = HashMap::new();
    if !map.in_bounds(start.x, start.y) {
        return distances;
    }

    let mut queue = VecDeque::new();
    distances.insert(start, 0);
    queue.push_back(start);

    while let Some(field) = queue.pop_front() {
        let next_distance = distances[&field] + 1;
        for next in neighbors(map, field) {
            if map.is_walkable_field(next) && !distances.contains_key(&next) {
                distances.insert(next, next_distance);
                queue.push_back(next);
            }
        }
    }

    distances
}

/// Shortest step count from `start` to `goal`, if any.
#[must_use]
pub fn bfs_distance<M: Walkable + ?Sized>(map: &M, start: Field, goal: Field) -> Option<u32> {
    bfs_distances(map, start).get(&goal).copied()
}
