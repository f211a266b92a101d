//! Proptest strategies.
//!
//! These strategies generate random but reproducible grids, fields and
//! combat numbers for property-based testing.

use proptest::prelude::*;
use tactics_core::combat::Combatant;
use tactics_core::config::GridConfig;
use tactics_core::grid::{Field, Grid, Tile, Walkable};

/// Largest grid edge generated by default.
pub const MAX_EDGE: u32 = 12;

/// Generate a grid of 1..=`max_edge` per side where roughly one field in
/// four is a wall and a few walkable fields carry a tag.
pub fn arb_grid(max_edge: u32) -> impl Strategy<Value = Grid> {
    (1..=max_edge, 1..=max_edge).prop_flat_map(|(width, height)| {
        let cells = (width * height) as usize;
        proptest::collection::vec(0u8..16, cells).prop_map(move |codes| {
            let rows = codes
                .chunks(width as usize)
                .map(|row| {
                    row.iter()
                        .map(|&code| match code {
                            0..=3 => Tile::Code(7),
                            4 => Tile::Tag("bridge".into()),
                            _ => Tile::Code(0),
                        })
                        .collect()
                })
                .collect();
            Grid::from_rows(rows, GridConfig::default())
        })
    })
}

/// Generate a field inside a `width` x `height` map.
pub fn arb_field_in(width: u32, height: u32) -> impl Strategy<Value = Field> {
    (0..width.max(1), 0..height.max(1)).prop_map(|(x, y)| Field::new(x, y))
}

/// Generate a grid together with two fields inside it.
pub fn arb_grid_with_fields(max_edge: u32) -> impl Strategy<Value = (Grid, Field, Field)> {
    arb_grid(max_edge).prop_flat_map(|grid| {
        let (width, height) = (grid.width(), grid.height());
        (
            Just(grid),
            arb_field_in(width, height),
            arb_field_in(width, height),
        )
    })
}

/// Generate a grid with one field inside it.
pub fn arb_grid_with_field(max_edge: u32) -> impl Strategy<Value = (Grid, Field)> {
    arb_grid(max_edge).prop_flat_map(|grid| {
        let (width, height) = (grid.width(), grid.height());
        (Just(grid), arb_field_in(width, height))
    })
}

/// Generate a move range (0-6).
pub fn arb_move_range() -> impl Strategy<Value = u32> {
    0u32..=6
}

/// Generate an attack range (0-6). Values up to 1 are melee.
pub fn arb_attack_range() -> impl Strategy<Value = u32> {
    0u32..=6
}

/// Generate combat numbers: mostly realistic head counts and stats, with
/// some drawn from the whole `u32` range.
pub fn arb_combatant() -> impl Strategy<Value = Combatant> {
    prop_oneof![
        4 => (0u32..500, 0u32..40, 0u32..40),
        1 => (any::<u32>(), any::<u32>(), any::<u32>()),
    ]
    .prop_map(|(count, attack, defense)| Combatant::new(count, attack, defense))
}
