//! Units and the unit registry.
//!
//! Units are plain data records; behaviour lives in free functions and in
//! [`GameState`](crate::game::GameState). A unit whose head count reaches
//! zero is marked [`UnitStatus::Defeated`] and stays in the registry so
//! that ids remain stable for the rest of the session.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::combat::{Combatant, DAMAGE_PER_KILL};
use crate::data::UnitData;
use crate::grid::Field;
use crate::pose::PoseMachine;

/// Unique identifier for units.
pub type UnitId = u32;

/// The two opposing sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Side {
    /// Human-controlled side. Moves first.
    #[default]
    Player,
    /// Opposing side.
    Enemy,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

/// Unit attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitStats {
    /// Attack stat.
    pub attack: u32,
    /// Defense stat.
    pub defense: u32,
    /// Attack reach in fields. 1 is melee.
    pub attack_range: u32,
    /// Movement budget in 4-directional steps.
    pub move_range: u32,
    /// Health contributed by each member.
    #[serde(default = "default_health_per_member")]
    pub health_per_member: u32,
}

/// One kill takes `DAMAGE_PER_KILL` damage, so that is a member's health.
const fn default_health_per_member() -> u32 {
    DAMAGE_PER_KILL as u32
}

impl Default for UnitStats {
    fn default() -> Self {
        Self {
            attack: 1,
            defense: 1,
            attack_range: 1,
            move_range: 1,
            health_per_member: default_health_per_member(),
        }
    }
}

/// Whether a unit can still act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitStatus {
    /// On the board.
    #[default]
    Active,
    /// Head count reached zero.
    Defeated,
}

/// What a unit has done during the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TurnFlags {
    /// Unit moved this turn.
    pub moved: bool,
    /// Unit attacked this turn.
    pub attacked: bool,
}

/// A positioned grid entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: UnitId,
    /// Display name.
    pub name: String,
    /// Owning side.
    pub side: Side,
    /// Occupied field.
    pub position: Field,
    /// Attributes.
    pub stats: UnitStats,
    /// Head count.
    pub count: u32,
    /// Lifecycle state.
    pub status: UnitStatus,
    /// The last attack against this unit left wounded survivors.
    pub wounded: bool,
    /// Actions taken this turn.
    pub turn: TurnFlags,
    /// Pose and sprite state.
    pub pose: PoseMachine,
}

impl Unit {
    /// Total health, derived from head count.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.count.saturating_mul(self.stats.health_per_member)
    }

    /// Returns true while the unit can act and be targeted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == UnitStatus::Active
    }

    /// Returns true for units that attack beyond adjacent fields.
    #[must_use]
    pub const fn is_ranged(&self) -> bool {
        self.stats.attack_range > 1
    }

    /// Combat numbers for [`fight`](crate::combat::fight).
    #[must_use]
    pub const fn combatant(&self) -> Combatant {
        Combatant::new(self.count, self.stats.attack, self.stats.defense)
    }
}

/// Storage for all units of a game.
///
/// Uses a `HashMap` for lookup by id, with deterministic iteration via
/// sorted ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Units {
    units: HashMap<UnitId, Unit>,
    next_id: UnitId,
}

impl Units {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            units: HashMap::new(),
            next_id: 1,
        }
    }

    /// Create a unit from its definition and return its id.
    pub fn spawn(&mut self, data: UnitData) -> UnitId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;

        let status = if data.count == 0 {
            UnitStatus::Defeated
        } else {
            UnitStatus::Active
        };
        let unit = Unit {
            id,
            pose: PoseMachine::new(data.skin, data.gear),
            name: data.name,
            side: data.side,
            position: data.position,
            stats: data.stats,
            count: data.count,
            status,
            wounded: false,
            turn: TurnFlags::default(),
        };
        self.units.insert(id, unit);
        id
    }

    /// Get a unit by id.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Get a mutable unit by id.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Check if an id is registered.
    #[must_use]
    pub fn contains(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    /// Number of units, defeated ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// All ids in ascending order.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<UnitId> {
        let mut ids: Vec<UnitId> = self.units.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// All units in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.sorted_ids()
            .into_iter()
            .filter_map(move |id| self.units.get(&id))
    }

    /// Mutable access to every unit, in no particular order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Unit> {
        self.units.values_mut()
    }

    /// Active unit standing on `field`.
    #[must_use]
    pub fn active_at(&self, field: Field) -> Option<&Unit> {
        self.iter().find(|u| u.is_active() && u.position == field)
    }

    /// Fields held by active units other than `except`.
    #[must_use]
    pub fn occupied_fields(&self, except: UnitId) -> Vec<Field> {
        self.iter()
            .filter(|u| u.is_active() && u.id != except)
            .map(|u| u.position)
            .collect()
    }

    /// Active units of `side`, in id order.
    pub fn active_on(&self, side: Side) -> impl Iterator<Item = &Unit> {
        self.iter().filter(move |u| u.is_active() && u.side == side)
    }
}
