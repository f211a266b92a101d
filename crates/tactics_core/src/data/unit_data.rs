//! Unit definitions placed on a map.

use serde::{Deserialize, Serialize};

use crate::grid::Field;
use crate::units::{Side, UnitStats};

/// Data-driven unit definition.
///
/// # Example RON
///
/// ```ron
/// UnitData(
///     name: "Archers",
///     side: Player,
///     position: (x: 2, y: 3),
///     stats: UnitStats(
///         attack: 6,
///         defense: 3,
///         attack_range: 3,
///         move_range: 2,
///     ),
///     count: 12,
///     skin: "skin/archer",
///     gear: [("bow", "gear/longbow")],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitData {
    /// Display name.
    pub name: String,

    /// Owning side.
    #[serde(default)]
    pub side: Side,

    /// Starting field.
    pub position: Field,

    /// Attributes.
    #[serde(default)]
    pub stats: UnitStats,

    /// Starting head count.
    pub count: u32,

    /// Image key of the skin sprite.
    #[serde(default)]
    pub skin: String,

    /// `(slot, image key)` pairs for gear sprites.
    #[serde(default)]
    pub gear: Vec<(String, String)>,
}
