//! Map description assets.

use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, GridConfig};
use crate::error::{Result, TacticsError};
use crate::game::GameState;
use crate::grid::{Grid, Tile};

use super::UnitData;

/// A tile as written in a map file: an integer code or a string tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TileSpec {
    /// Numeric tile code.
    Code(u32),
    /// Walkable tagged tile.
    Tag(String),
}

impl From<TileSpec> for Tile {
    fn from(spec: TileSpec) -> Self {
        match spec {
            TileSpec::Code(code) => Tile::Code(code),
            TileSpec::Tag(tag) => Tile::Tag(tag),
        }
    }
}

/// A playable map: tiles plus starting units.
///
/// # Example RON
///
/// ```ron
/// MapData(
///     name: "river_crossing",
///     tiles: [
///         [0, 0, 3, 0],
///         [0, "bridge", "bridge", 0],
///         [0, 0, 3, 0],
///     ],
///     units: [
///         (name: "Militia", side: Player, position: (x: 0, y: 1), count: 20),
///         (name: "Raiders", side: Enemy, position: (x: 3, y: 1), count: 15),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapData {
    /// Map identifier.
    pub name: String,

    /// Rows of tiles, top row first.
    pub tiles: Vec<Vec<TileSpec>>,

    /// Units placed at game start.
    #[serde(default)]
    pub units: Vec<UnitData>,
}

impl MapData {
    /// Parse a map from RON text. `label` names the source in errors.
    ///
    /// # Errors
    ///
    /// Returns [`TacticsError::DataParseError`] if the text is not a valid map.
    pub fn from_ron(source: &str, label: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| TacticsError::DataParseError {
            path: label.to_string(),
            message: e.to_string(),
        })
    }

    /// True when every row has the same, non-zero length.
    #[must_use]
    pub fn is_rectangular(&self) -> bool {
        match self.tiles.first() {
            Some(first) if !first.is_empty() => self.tiles.iter().all(|r| r.len() == first.len()),
            _ => false,
        }
    }

    /// Build the grid. Malformed rows are tolerated, see [`Grid::from_rows`].
    #[must_use]
    pub fn grid(&self, config: GridConfig) -> Grid {
        let rows = self
            .tiles
            .iter()
            .map(|row| row.iter().cloned().map(Tile::from).collect())
            .collect();
        Grid::from_rows(rows, config)
    }

    /// Start a game on this map. See [`GameState::from_map`].
    ///
    /// # Errors
    ///
    /// Fails when the config is invalid or a unit cannot be placed.
    pub fn into_game(self, config: EngineConfig) -> Result<GameState> {
        GameState::from_map(&self, config)
    }
}
