//! # Tactics Core
//!
//! Deterministic engine for turn-based grid tactics.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO (data assets are parsed from strings handed in by the host)
//! - No randomness
//! - No floating-point math (grid logic is integer, animation is fixed-point)
//!
//! Rendering and resource loading stay with the host, which talks to the
//! engine through the [`render`] seams.
//!
//! ## Crate Structure
//!
//! - [`grid`] - Tile grid, coordinates and the shared walkability predicate
//! - [`pathfinding`] - A* search
//! - [`range`] - Move and attack ranges, line of sight, border detection
//! - [`combat`] - Casualty formula
//! - [`pose`] - Unit pose state machine
//! - [`animation`] - Pixel-space path following
//! - [`game`] - The game context tying it all together
//! - [`data`] / [`config`] - RON assets and engine configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod animation;
pub mod combat;
pub mod config;
pub mod data;
pub mod error;
pub mod game;
pub mod grid;
pub mod math;
pub mod pathfinding;
pub mod pose;
pub mod range;
pub mod render;
pub mod units;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::animation::{interpolate_path, Animation, AnimationRegistry};
    pub use crate::combat::{fight, Combatant, FightOutcome};
    pub use crate::config::{AnimationConfig, EngineConfig, GridConfig};
    pub use crate::data::{MapData, TileSpec, UnitData};
    pub use crate::error::{Result, TacticsError};
    pub use crate::game::GameState;
    pub use crate::grid::{Field, Grid, OccupancyView, Tile, Walkable};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::pathfinding::{find_path, path_length};
    pub use crate::pose::{Pose, PoseMachine};
    pub use crate::range::{
        border_sides, compute_attack_range, compute_move_range, highlight_tiles, Borders,
        HighlightTile,
    };
    pub use crate::render::{HighlightKind, ReadyGate, Renderer, UnitRenderData};
    pub use crate::units::{Side, Unit, UnitId, UnitStats, Units};
}
