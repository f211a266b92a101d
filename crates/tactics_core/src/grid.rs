//! Static walkability grid and coordinate conventions.
//!
//! Coordinates are `(col, row)` pairs, 0-indexed, with rows as the outer
//! index. Every walkability query goes through the [`Walkable`] trait so
//! that the pathfinder and the range calculator share one predicate.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::GridConfig;

/// A single grid coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Field {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl Field {
    /// Create a field.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Unique linear key `x + y * width`.
    #[inline]
    #[must_use]
    pub fn linear_key(self, width: u32) -> usize {
        (self.x as usize) + (self.y as usize) * (width as usize)
    }

    /// Manhattan distance to `other`.
    #[must_use]
    pub fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// True when `other` is one cardinal step away.
    #[must_use]
    pub fn is_adjacent(self, other: Self) -> bool {
        self.manhattan(other) == 1
    }

    /// Offset by a signed step. Returns `None` below zero.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Self { x, y })
    }
}

impl From<(u32, u32)> for Field {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// Cardinal directions in neighbour order: north, south, east, west.
pub const DIRECTIONS: [(i32, i32); 4] = [(0, -1), (0, 1), (1, 0), (-1, 0)];

/// A tile code.
///
/// Codes at or below the grid's `max_walkable_tile` are walkable. Tags are
/// walkable but special: they are never highlighted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Numeric tile code.
    Code(u32),
    /// Walkable tagged tile.
    Tag(String),
}

impl Default for Tile {
    fn default() -> Self {
        Self::Code(0)
    }
}

impl Tile {
    /// Returns true if a unit may stand on or see across this tile.
    #[must_use]
    pub fn is_walkable(&self, max_walkable_tile: u32) -> bool {
        match self {
            Self::Code(code) => *code <= max_walkable_tile,
            Self::Tag(_) => true,
        }
    }

    /// Returns true for string-tagged tiles.
    #[must_use]
    pub const fn is_tag(&self) -> bool {
        matches!(self, Self::Tag(_))
    }
}

/// Read-only view of a map for search algorithms.
pub trait Walkable {
    /// Map width in fields.
    fn width(&self) -> u32;

    /// Map height in fields.
    fn height(&self) -> u32;

    /// True iff `(x, y)` is in bounds and passable. Never panics.
    fn is_walkable(&self, x: u32, y: u32) -> bool;

    /// True iff `(x, y)` is in bounds and holds a string tag.
    fn is_tagged(&self, x: u32, y: u32) -> bool;

    /// Check if coordinates are within map bounds.
    fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height()
    }

    /// [`Walkable::is_walkable`] for a field.
    fn is_walkable_field(&self, field: Field) -> bool {
        self.is_walkable(field.x, field.y)
    }
}

/// In-bounds cardinal neighbours of `field` in N, S, E, W order.
///
/// Walkability is not checked.
pub fn neighbors<M: Walkable + ?Sized>(map: &M, field: Field) -> impl Iterator<Item = Field> + '_ {
    DIRECTIONS.iter().filter_map(move |&(dx, dy)| {
        field
            .offset(dx, dy)
            .filter(|next| map.in_bounds(next.x, next.y))
    })
}

/// Static tile grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    /// Grid width in fields.
    width: u32,
    /// Grid height in fields.
    height: u32,
    /// Row-major cells. `None` marks holes left by short rows.
    cells: Vec<Option<Tile>>,
    /// Walkability rules.
    config: GridConfig,
}

impl Grid {
    /// Create a grid with every tile set to code 0.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0, "Grid width must be positive");
        assert!(height > 0, "Grid height must be positive");

        let cell_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![Some(Tile::Code(0)); cell_count],
            config: GridConfig::default(),
        }
    }

    /// Build a grid from rows of tiles.
    ///
    /// Non-rectangular input is accepted: the grid takes the longest row's
    /// width and the missing cells are never walkable. A warning is logged.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<Tile>>, config: GridConfig) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;

        let short_rows = rows.iter().filter(|r| r.len() as u32 != width).count();
        if short_rows > 0 {
            tracing::warn!(
                width,
                height,
                short_rows,
                "Map is not rectangular; missing cells are treated as blocked"
            );
        }
        if width == 0 || height == 0 {
            tracing::warn!("Map has no tiles");
        }

        let mut cells = Vec::with_capacity((width as usize) * (height as usize));
        for row in rows {
            let missing = width as usize - row.len();
            cells.extend(row.into_iter().map(Some));
            cells.extend(std::iter::repeat(None).take(missing));
        }

        Self {
            width,
            height,
            cells,
            config,
        }
    }

    /// Replace the walkability rules.
    #[must_use]
    pub fn with_config(mut self, config: GridConfig) -> Self {
        self.config = config;
        self
    }

    /// Walkability rules.
    #[must_use]
    pub const fn config(&self) -> GridConfig {
        self.config
    }

    /// True when every row had the same length.
    #[must_use]
    pub fn is_rectangular(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(Field::new(x, y).linear_key(self.width))
        } else {
            None
        }
    }

    /// Tile at coordinates. `None` if out of bounds or a hole.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<&Tile> {
        self.index(x, y).and_then(|i| self.cells[i].as_ref())
    }

    /// Set tile at coordinates. Returns `false` if out of bounds.
    pub fn set(&mut self, x: u32, y: u32, tile: Tile) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = Some(tile);
                true
            }
            None => false,
        }
    }

    /// All fields in row-major order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Field::new(x, y)))
    }

    /// Number of walkable fields.
    #[must_use]
    pub fn walkable_count(&self) -> usize {
        self.fields().filter(|f| self.is_walkable_field(*f)).count()
    }
}

impl Walkable for Grid {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_walkable(&self, x: u32, y: u32) -> bool {
        self.get(x, y)
            .is_some_and(|tile| tile.is_walkable(self.config.max_walkable_tile))
    }

    fn is_tagged(&self, x: u32, y: u32) -> bool {
        self.get(x, y).is_some_and(Tile::is_tag)
    }
}

/// A grid overlaid with fields that block movement, such as other units.
#[derive(Debug, Clone)]
pub struct OccupancyView<'a> {
    grid: &'a Grid,
    occupied: HashSet<Field>,
}

impl<'a> OccupancyView<'a> {
    /// Wrap `grid`, blocking every field in `occupied`.
    #[must_use]
    pub fn new(grid: &'a Grid, occupied: impl IntoIterator<Item = Field>) -> Self {
        Self {
            grid,
            occupied: occupied.into_iter().collect(),
        }
    }

    /// Underlying grid.
    #[must_use]
    pub const fn grid(&self) -> &'a Grid {
        self.grid
    }

    /// True when a blocker stands on `field`.
    #[must_use]
    pub fn is_occupied(&self, field: Field) -> bool {
        self.occupied.contains(&field)
    }
}

impl Walkable for OccupancyView<'_> {
    fn width(&self) -> u32 {
        self.grid.width
    }

    fn height(&self) -> u32 {
        self.grid.height
    }

    fn is_walkable(&self, x: u32, y: u32) -> bool {
        self.grid.is_walkable(x, y) && !self.occupied.contains(&Field::new(x, y))
    }

    fn is_tagged(&self, x: u32, y: u32) -> bool {
        self.grid.is_tagged(x, y)
    }
}
