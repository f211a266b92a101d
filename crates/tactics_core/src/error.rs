//! Error types for the tactics engine.
//!
//! Search and range algorithms never fail; they express "nothing found"
//! through empty results. These errors cover commands issued against a
//! [`GameState`](crate::game::GameState) and data loading.

use thiserror::Error;

use crate::grid::Field;
use crate::units::{Side, UnitId};

/// Result type alias using [`TacticsError`].
pub type Result<T> = std::result::Result<T, TacticsError>;

/// Top-level error type for the tactics engine.
#[derive(Debug, Error)]
pub enum TacticsError {
    /// Invalid unit identifier.
    #[error("Unknown unit ID: {0}")]
    UnknownUnit(UnitId),

    /// Unit has been defeated and can no longer act or be targeted.
    #[error("Unit {0} has been defeated")]
    UnitDefeated(UnitId),

    /// Unit belongs to the side that is not currently acting.
    #[error("Unit {unit} belongs to {side:?}, but it is {active:?}'s turn")]
    NotYourTurn {
        /// Unit that tried to act.
        unit: UnitId,
        /// Side of the unit.
        side: Side,
        /// Side whose turn it is.
        active: Side,
    },

    /// Unit already used this action during the current turn.
    #[error("Unit {unit} has already {action} this turn")]
    AlreadyActed {
        /// Unit that tried to act.
        unit: UnitId,
        /// Past-tense action name ("moved", "attacked").
        action: &'static str,
    },

    /// Unit is still following a walk animation.
    #[error("Unit {0} is still moving")]
    UnitBusy(UnitId),

    /// Destination lies outside the unit's move range.
    #[error("Field ({}, {}) is outside the move range of unit {unit}", .field.x, .field.y)]
    OutOfMoveRange {
        /// Moving unit.
        unit: UnitId,
        /// Requested destination.
        field: Field,
    },

    /// Destination is inside the move range but no path reaches it.
    #[error("No path for unit {unit} to ({}, {})", .field.x, .field.y)]
    Unreachable {
        /// Moving unit.
        unit: UnitId,
        /// Requested destination.
        field: Field,
    },

    /// Defender lies outside the attacker's attack range.
    #[error("Unit {defender} is out of range of unit {attacker}")]
    OutOfAttackRange {
        /// Attacking unit.
        attacker: UnitId,
        /// Targeted unit.
        defender: UnitId,
    },

    /// Attacker and defender fight for the same side.
    #[error("Unit {attacker} cannot attack friendly unit {defender}")]
    FriendlyTarget {
        /// Attacking unit.
        attacker: UnitId,
        /// Targeted unit.
        defender: UnitId,
    },

    /// A field is already taken by another unit.
    #[error("Field ({}, {}) is occupied by unit {occupant}", .field.x, .field.y)]
    FieldOccupied {
        /// Contested field.
        field: Field,
        /// Unit standing there.
        occupant: UnitId,
    },

    /// A field lies outside the map.
    #[error("Field ({}, {}) is outside the {width}x{height} map", .field.x, .field.y)]
    OutOfBounds {
        /// Offending field.
        field: Field,
        /// Map width.
        width: u32,
        /// Map height.
        height: u32,
    },

    /// External resources have not signalled readiness.
    #[error("Resources are not ready")]
    ResourcesNotReady,

    /// Configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path (or label) of the data that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
