//! Deterministic casualty resolution.
//!
//! ```text
//! base_damage     = attacker.count * attacker.attack
//! modifier        = 0.05 * (attacker.attack - defender.defense)
//! modified_damage = base_damage * (1 + modifier)
//! raw_kills       = modified_damage / 10
//! fractional      = raw_kills - floor(raw_kills)
//! wounded         = 0 < fractional < 0.5
//! kills           = wounded ? floor(raw_kills) : round(raw_kills)
//! ```
//!
//! The formula is evaluated in exact integer arithmetic. `raw_kills` is
//! carried in thousandths, which represents every reachable value exactly,
//! so the floor/round boundary never drifts the way a binary float would.

use serde::{Deserialize, Serialize};

use crate::units::{Unit, UnitStatus};

/// Modifier percent per point of attack over defense (0.05).
pub const MODIFIER_PERCENT_PER_POINT: i64 = 5;

/// Modified damage needed for one kill.
pub const DAMAGE_PER_KILL: i64 = 10;

/// `raw_kills` fixed-point scale: 100 (percent) * `DAMAGE_PER_KILL`.
const KILL_SCALE: i64 = 100 * DAMAGE_PER_KILL;

/// The numbers a unit brings to a fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Combatant {
    /// Head count.
    pub count: u32,
    /// Attack stat.
    pub attack: u32,
    /// Defense stat.
    pub defense: u32,
}

impl Combatant {
    /// Create combat numbers.
    #[must_use]
    pub const fn new(count: u32, attack: u32, defense: u32) -> Self {
        Self {
            count,
            attack,
            defense,
        }
    }
}

/// Result of one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FightOutcome {
    /// Defenders killed.
    pub kills: u32,
    /// Damage was left over that did not amount to half a kill.
    pub wounded: bool,
}

impl FightOutcome {
    /// Head count left after applying the kills to `count`.
    #[must_use]
    pub const fn remaining(self, count: u32) -> u32 {
        count.saturating_sub(self.kills)
    }

    /// Subtract the kills from `defender` and record the wound flag. A
    /// defender left with nobody is marked defeated. Returns true in that case.
    pub fn apply(self, defender: &mut Unit) -> bool {
        defender.count = self.remaining(defender.count);
        defender.wounded = self.wounded && defender.count > 0;
        if defender.count == 0 {
            defender.status = UnitStatus::Defeated;
            return true;
        }
        false
    }
}

/// `raw_kills` in thousandths.
///
/// Carried in `i128`: the product of three `u32`-sized factors does not fit
/// in `i64`.
#[must_use]
pub fn raw_kills_scaled(attacker: &Combatant, defender: &Combatant) -> i128 {
    let base_damage = i128::from(attacker.count) * i128::from(attacker.attack);
    let modifier_percent = i128::from(MODIFIER_PERCENT_PER_POINT)
        * (i128::from(attacker.attack) - i128::from(defender.defense));
    base_damage * (100 + modifier_percent)
}

/// Resolve an attack.
///
/// Pure: identical inputs always give identical outcomes. When the
/// modifier drives damage to zero or below, nobody dies and nobody is
/// wounded.
#[must_use]
pub fn fight(attacker: &Combatant, defender: &Combatant) -> FightOutcome {
    let raw = raw_kills_scaled(attacker, defender);
    if raw <= 0 {
        return FightOutcome::default();
    }

    let scale = i128::from(KILL_SCALE);
    let whole = raw / scale;
    let fractional = raw % scale;
    let half = scale / 2;

    let wounded = fractional > 0 && fractional < half;
    let kills = if fractional >= half { whole + 1 } else { whole };

    FightOutcome {
        kills: u32::try_from(kills).unwrap_or(u32::MAX),
        wounded,
    }
}
