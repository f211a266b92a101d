//! The game context.
//!
//! [`GameState`] owns everything a running game needs: configuration, the
//! grid, the unit registry, animations and turn state. Hosts drive it with
//! commands ([`GameState::move_unit`], [`GameState::attack`],
//! [`GameState::end_turn`]) and a frame-driven [`GameState::update`].
//!
//! Movement queries see other living units as obstacles. Line of sight
//! for attacks only considers the terrain.
//!
//! # Determinism
//!
//! All state is integer or fixed-point and there is no randomness, so the
//! same commands and update deltas always give the same
//! [`GameState::state_hash`].

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::animation::{field_to_pixel, interpolate_path, AnimationRegistry};
use crate::combat::{fight, FightOutcome};
use crate::config::EngineConfig;
use crate::data::{MapData, UnitData};
use crate::error::{Result, TacticsError};
use crate::grid::{Field, Grid, OccupancyView, Walkable};
use crate::pathfinding::find_path;
use crate::pose::Pose;
use crate::range::{compute_attack_range, compute_move_range, highlight_tiles};
use crate::render::{HighlightKind, ReadyGate, Renderer, UnitRenderData};
use crate::units::{Side, TurnFlags, Unit, UnitId, Units};

/// Name of the walk animation belonging to a unit.
#[must_use]
pub fn walk_animation(id: UnitId) -> String {
    format!("unit-{id}")
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Move,
    Attack,
}

impl Action {
    const fn past_tense(self) -> &'static str {
        match self {
            Self::Move => "moved",
            Self::Attack => "attacked",
        }
    }

    const fn done(self, flags: TurnFlags) -> bool {
        match self {
            Self::Move => flags.moved,
            Self::Attack => flags.attacked,
        }
    }
}

/// A running game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    config: EngineConfig,
    map_name: String,
    grid: Grid,
    units: Units,
    animations: AnimationRegistry,
    /// Destination of every unit that is still walking.
    walks: BTreeMap<UnitId, Field>,
    active_side: Side,
    /// Completed half-turns.
    turn: u32,
    started: bool,
}

impl GameState {
    /// Create an empty game on `grid`. The grid takes the walkability
    /// rules of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TacticsError::InvalidConfig`] if `config` does not validate.
    pub fn new(grid: Grid, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            grid: grid.with_config(config.grid),
            animations: AnimationRegistry::new(config.animation.step_ms),
            config,
            map_name: String::new(),
            units: Units::new(),
            walks: BTreeMap::new(),
            active_side: Side::Player,
            turn: 0,
            started: false,
        })
    }

    /// Build a game from a map asset, spawning its units in order.
    ///
    /// # Errors
    ///
    /// Fails on an invalid config or when a unit cannot be placed, see
    /// [`GameState::spawn_unit`].
    pub fn from_map(map: &MapData, config: EngineConfig) -> Result<Self> {
        let mut state = Self::new(map.grid(config.grid), config)?;
        state.map_name.clone_from(&map.name);
        for unit in &map.units {
            state.spawn_unit(unit.clone())?;
        }
        tracing::debug!(
            map = %map.name,
            width = state.grid.width(),
            height = state.grid.height(),
            units = state.units.len(),
            "Game created"
        );
        Ok(state)
    }

    /// Place a new unit.
    ///
    /// # Errors
    ///
    /// Returns [`TacticsError::OutOfBounds`] outside the map,
    /// [`TacticsError::FieldOccupied`] on a field held by a living unit and
    /// [`TacticsError::InvalidState`] on terrain that is not walkable.
    pub fn spawn_unit(&mut self, data: UnitData) -> Result<UnitId> {
        let field = data.position;
        if !self.grid.in_bounds(field.x, field.y) {
            return Err(TacticsError::OutOfBounds {
                field,
                width: self.grid.width(),
                height: self.grid.height(),
            });
        }
        if !self.grid.is_walkable_field(field) {
            return Err(TacticsError::InvalidState(format!(
                "unit '{}' placed on blocked field ({}, {})",
                data.name, field.x, field.y
            )));
        }
        if data.count > 0 {
            if let Some(occupant) = self.units.active_at(field) {
                return Err(TacticsError::FieldOccupied {
                    field,
                    occupant: occupant.id,
                });
            }
        }
        Ok(self.units.spawn(data))
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Name of the map this game was built from.
    #[must_use]
    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    /// Terrain.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Unit registry.
    #[must_use]
    pub const fn units(&self) -> &Units {
        &self.units
    }

    /// Animation registry.
    #[must_use]
    pub const fn animations(&self) -> &AnimationRegistry {
        &self.animations
    }

    /// Side whose turn it is.
    #[must_use]
    pub const fn active_side(&self) -> Side {
        self.active_side
    }

    /// Completed half-turns.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// True once [`GameState::start`] succeeded.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// True while `id` is following a walk animation.
    #[must_use]
    pub fn is_walking(&self, id: UnitId) -> bool {
        self.walks.contains_key(&id)
    }

    /// Look up a unit.
    ///
    /// # Errors
    ///
    /// Returns [`TacticsError::UnknownUnit`] for ids never spawned.
    pub fn unit(&self, id: UnitId) -> Result<&Unit> {
        self.units.get(id).ok_or(TacticsError::UnknownUnit(id))
    }

    /// Look up a unit that is still on the board.
    fn living(&self, id: UnitId) -> Result<&Unit> {
        let unit = self.unit(id)?;
        if !unit.is_active() {
            return Err(TacticsError::UnitDefeated(id));
        }
        Ok(unit)
    }

    /// Look up a unit allowed to perform `action` right now.
    fn actor(&self, id: UnitId, action: Action) -> Result<&Unit> {
        let unit = self.living(id)?;
        if unit.side != self.active_side {
            return Err(TacticsError::NotYourTurn {
                unit: id,
                side: unit.side,
                active: self.active_side,
            });
        }
        if self.is_walking(id) {
            return Err(TacticsError::UnitBusy(id));
        }
        if action.done(unit.turn) {
            return Err(TacticsError::AlreadyActed {
                unit: id,
                action: action.past_tense(),
            });
        }
        Ok(unit)
    }

    /// The grid as seen by a moving unit: every other living unit and
    /// every pending walk destination blocks.
    fn movement_view(&self, id: UnitId) -> OccupancyView<'_> {
        let reserved = self
            .walks
            .iter()
            .filter(move |(walker, _)| **walker != id)
            .map(|(_, field)| *field);
        OccupancyView::new(
            &self.grid,
            self.units.occupied_fields(id).into_iter().chain(reserved),
        )
    }

    /// Fields `id` could move to, its own field included.
    ///
    /// # Errors
    ///
    /// Fails for unknown or defeated units.
    pub fn move_range(&self, id: UnitId) -> Result<Vec<Field>> {
        let unit = self.living(id)?;
        Ok(compute_move_range(
            &self.movement_view(id),
            unit.position,
            unit.stats.move_range,
        ))
    }

    /// Fields `id` could shoot at, or `None` for melee units.
    ///
    /// # Errors
    ///
    /// Fails for unknown or defeated units.
    pub fn attack_range(&self, id: UnitId) -> Result<Option<Vec<Field>>> {
        let unit = self.living(id)?;
        Ok(compute_attack_range(
            &self.grid,
            unit.position,
            unit.stats.attack_range,
        ))
    }

    /// Shortest path for `id` to `goal` around terrain and other units.
    /// Empty when there is none.
    ///
    /// # Errors
    ///
    /// Fails for unknown or defeated units.
    pub fn path_for(&self, id: UnitId, goal: Field) -> Result<Vec<Field>> {
        let unit = self.living(id)?;
        Ok(find_path(&self.movement_view(id), unit.position, goal))
    }

    /// True when `attacker` can hit something standing on `target`.
    fn can_strike(&self, attacker: &Unit, target: Field) -> bool {
        match compute_attack_range(&self.grid, attacker.position, attacker.stats.attack_range) {
            Some(fields) => fields.contains(&target),
            None => attacker.position.is_adjacent(target),
        }
    }

    /// Living enemies `id` can attack from where it stands, in id order.
    ///
    /// # Errors
    ///
    /// Fails for unknown or defeated units.
    pub fn targets(&self, id: UnitId) -> Result<Vec<UnitId>> {
        let unit = self.living(id)?;
        Ok(self
            .units
            .active_on(unit.side.opponent())
            .filter(|enemy| self.can_strike(unit, enemy.position))
            .map(|enemy| enemy.id)
            .collect())
    }

    /// Start walking `id` to `goal`. Returns the path taken.
    ///
    /// The unit keeps its field until the walk animation finishes in
    /// [`GameState::update`]. Moving to its own field changes nothing.
    ///
    /// # Errors
    ///
    /// Fails when the unit may not act, the goal is held by another unit,
    /// lies outside the move range, or cannot be reached.
    pub fn move_unit(&mut self, id: UnitId, goal: Field) -> Result<Vec<Field>> {
        let unit = self.actor(id, Action::Move)?;
        let start = unit.position;
        if goal == start {
            return Ok(vec![start]);
        }
        if let Some(occupant) = self.units.active_at(goal) {
            return Err(TacticsError::FieldOccupied {
                field: goal,
                occupant: occupant.id,
            });
        }

        let view = self.movement_view(id);
        if !compute_move_range(&view, start, unit.stats.move_range).contains(&goal) {
            return Err(TacticsError::OutOfMoveRange { unit: id, field: goal });
        }
        let path = find_path(&view, start, goal);
        if path.len() < 2 {
            return Err(TacticsError::Unreachable { unit: id, field: goal });
        }

        let points = interpolate_path(&path, &self.config.animation);
        self.animations.start(&walk_animation(id), points);
        self.walks.insert(id, goal);
        if let Some(unit) = self.units.get_mut(id) {
            unit.pose.walk();
            unit.turn.moved = true;
        }

        tracing::debug!(unit = id, ?start, ?goal, steps = path.len() - 1, "Unit moving");
        Ok(path)
    }

    /// Resolve an attack of `attacker` on `defender`.
    ///
    /// Melee units must stand next to the defender. Ranged units need the
    /// defender's field inside their attack range. A defender left with
    /// nobody is defeated and leaves the board.
    ///
    /// # Errors
    ///
    /// Fails when the attacker may not act, the defender is unknown,
    /// defeated, friendly or out of range.
    pub fn attack(&mut self, attacker: UnitId, defender: UnitId) -> Result<FightOutcome> {
        let striker = self.actor(attacker, Action::Attack)?;
        let target = self.living(defender)?;
        if striker.side == target.side {
            return Err(TacticsError::FriendlyTarget { attacker, defender });
        }
        if !self.can_strike(striker, target.position) {
            return Err(TacticsError::OutOfAttackRange { attacker, defender });
        }

        let outcome = fight(&striker.combatant(), &target.combatant());

        if let Some(unit) = self.units.get_mut(attacker) {
            unit.pose.attack();
            unit.turn.attacked = true;
        }
        let mut defeated = false;
        if let Some(unit) = self.units.get_mut(defender) {
            defeated = outcome.apply(unit);
            if defeated {
                unit.pose.stop();
            }
        }

        tracing::debug!(
            attacker,
            defender,
            kills = outcome.kills,
            wounded = outcome.wounded,
            "Attack resolved"
        );
        if defeated {
            tracing::info!(unit = defender, by = attacker, "Unit defeated");
        }
        Ok(outcome)
    }

    /// Advance animations by `delta_ms` and step the sprite frames of
    /// every unit that is not idle. Returns the units whose walk finished;
    /// they now stand on their destination and are idle again.
    pub fn update(&mut self, delta_ms: u32) -> Vec<UnitId> {
        self.animations.update(delta_ms);

        let arrived: Vec<UnitId> = self
            .walks
            .keys()
            .copied()
            .filter(|id| !self.animations.is_active(&walk_animation(*id)))
            .collect();

        for id in &arrived {
            let Some(goal) = self.walks.remove(id) else {
                continue;
            };
            if let Some(unit) = self.units.get_mut(*id) {
                unit.position = goal;
                unit.pose.stop();
                tracing::debug!(unit = *id, ?goal, "Unit arrived");
            }
        }

        for unit in self.units.iter_mut() {
            if unit.is_active() && unit.pose.pose() != Pose::Idle {
                unit.pose.advance_frame();
            }
        }

        arrived
    }

    /// Hand the turn to the other side. Clears every unit's turn flags and
    /// returns all units to idle.
    ///
    /// # Errors
    ///
    /// Returns [`TacticsError::UnitBusy`] while a walk is still running.
    pub fn end_turn(&mut self) -> Result<Side> {
        if let Some(&id) = self.walks.keys().next() {
            return Err(TacticsError::UnitBusy(id));
        }

        self.active_side = self.active_side.opponent();
        self.turn += 1;
        for unit in self.units.iter_mut() {
            unit.turn = TurnFlags::default();
            unit.pose.stop();
        }

        tracing::info!(turn = self.turn, side = ?self.active_side, "Turn started");
        Ok(self.active_side)
    }

    /// The side still standing once the other has no living units.
    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        let player = self.units.active_on(Side::Player).next().is_some();
        let enemy = self.units.active_on(Side::Enemy).next().is_some();
        match (player, enemy) {
            (true, false) => Some(Side::Player),
            (false, true) => Some(Side::Enemy),
            _ => None,
        }
    }

    /// Begin play once external resources have loaded.
    ///
    /// # Errors
    ///
    /// Returns [`TacticsError::ResourcesNotReady`] while the gate is closed.
    pub fn start(&mut self, gate: &ReadyGate) -> Result<()> {
        if !gate.is_ready() {
            return Err(TacticsError::ResourcesNotReady);
        }
        self.started = true;
        tracing::info!(map = %self.map_name, units = self.units.len(), "Game started");
        Ok(())
    }

    /// Draw data for one unit.
    ///
    /// # Errors
    ///
    /// Returns [`TacticsError::UnknownUnit`] for ids never spawned.
    pub fn unit_render_data(&self, id: UnitId) -> Result<UnitRenderData> {
        Ok(self.render_data(self.unit(id)?))
    }

    fn render_data(&self, unit: &Unit) -> UnitRenderData {
        let animation = self.animations.get(&walk_animation(unit.id));
        let pixel = match animation {
            Some(walk) if self.is_walking(unit.id) => walk.pos,
            _ => field_to_pixel(unit.position, self.config.animation.tile_size),
        };
        UnitRenderData {
            id: unit.id,
            side: unit.side,
            field: unit.position,
            pixel,
            angle: animation.map_or(0, |walk| walk.angle),
            pose: unit.pose.pose(),
            skin: unit.pose.skin().clone(),
            gear: unit.pose.gear().to_vec(),
            count: unit.count,
            wounded: unit.wounded,
        }
    }

    /// Push every living unit to `renderer`, in id order.
    pub fn render<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        for unit in self.units.iter().filter(|u| u.is_active()) {
            renderer.draw_unit(&self.render_data(unit));
        }
    }

    /// Push the move range and, for ranged units, the attack range of `id`.
    ///
    /// # Errors
    ///
    /// Fails for unknown or defeated units.
    pub fn render_selection<R: Renderer + ?Sized>(&self, id: UnitId, renderer: &mut R) -> Result<()> {
        let moves = self.move_range(id)?;
        renderer.draw_highlight(HighlightKind::Move, &highlight_tiles(&self.grid, &moves));
        if let Some(targets) = self.attack_range(id)? {
            renderer.draw_highlight(HighlightKind::Attack, &highlight_tiles(&self.grid, &targets));
        }
        Ok(())
    }

    /// Push a planned path.
    pub fn render_path<R: Renderer + ?Sized>(&self, path: &[Field], renderer: &mut R) {
        renderer.draw_highlight(HighlightKind::Path, &highlight_tiles(&self.grid, path));
    }

    /// Compute a hash of the game state for desync detection.
    ///
    /// Units are hashed in id order so the result does not depend on
    /// hash map iteration.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.turn.hash(&mut hasher);
        self.active_side.hash(&mut hasher);

        let ids = self.units.sorted_ids();
        ids.len().hash(&mut hasher);
        for unit in self.units.iter() {
            unit.hash(&mut hasher);
        }

        self.walks.hash(&mut hasher);
        self.animations.hash(&mut hasher);
        self.grid.hash(&mut hasher);

        hasher.finish()
    }

    /// Serialize the game to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| TacticsError::InvalidState(format!("Failed to serialize game: {e}")))
    }

    /// Deserialize a game from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| TacticsError::InvalidState(format!("Failed to deserialize game: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Tile;
    use crate::range::HighlightTile;
    use crate::units::{UnitStats, UnitStatus};

    fn unit(name: &str, side: Side, x: u32, y: u32, count: u32, stats: UnitStats) -> UnitData {
        UnitData {
            name: name.to_string(),
            side,
            position: Field::new(x, y),
            stats,
            count,
            skin: format!("skin/{name}"),
            gear: vec![("helmet".to_string(), "gear/helmet".to_string())],
        }
    }

    fn melee() -> UnitStats {
        UnitStats {
            attack: 5,
            defense: 5,
            attack_range: 1,
            move_range: 2,
            health_per_member: 10,
        }
    }

    fn archer() -> UnitStats {
        UnitStats {
            attack: 4,
            defense: 2,
            attack_range: 3,
            move_range: 1,
            health_per_member: 10,
        }
    }

    /// 5x5 open field: player swordsmen (1) at (0,2), player archers (2) at
    /// (0,0), enemy spears (3) at (3,2).
    fn skirmish() -> GameState {
        let mut state = GameState::new(Grid::new(5, 5), EngineConfig::default()).unwrap();
        state
            .spawn_unit(unit("swords", Side::Player, 0, 2, 10, melee()))
            .unwrap();
        state
            .spawn_unit(unit("archers", Side::Player, 0, 0, 8, archer()))
            .unwrap();
        state
            .spawn_unit(unit("spears", Side::Enemy, 3, 2, 10, melee()))
            .unwrap();
        state
    }

    #[derive(Default)]
    struct Recorder {
        highlights: Vec<(HighlightKind, Vec<HighlightTile>)>,
        units: Vec<UnitRenderData>,
    }

    impl Renderer for Recorder {
        fn draw_highlight(&mut self, kind: HighlightKind, tiles: &[HighlightTile]) {
            self.highlights.push((kind, tiles.to_vec()));
        }

        fn draw_unit(&mut self, unit: &UnitRenderData) {
            self.units.push(unit.clone());
        }
    }

    #[test]
    fn test_from_map_rejects_overlap() {
        let map = MapData {
            name: "crowded".to_string(),
            tiles: vec![vec![crate::data::TileSpec::Code(0); 3]; 3],
            units: vec![
                unit("a", Side::Player, 1, 1, 5, melee()),
                unit("b", Side::Enemy, 1, 1, 5, melee()),
            ],
        };
        let err = GameState::from_map(&map, EngineConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            TacticsError::FieldOccupied { occupant: 1, .. }
        ));
    }

    #[test]
    fn test_spawn_validates_field() {
        let mut grid = Grid::new(3, 3);
        grid.set(2, 2, Tile::Code(5));
        let mut state = GameState::new(grid, EngineConfig::default()).unwrap();

        assert!(matches!(
            state.spawn_unit(unit("far", Side::Player, 3, 0, 1, melee())),
            Err(TacticsError::OutOfBounds { .. })
        ));
        assert!(matches!(
            state.spawn_unit(unit("wall", Side::Player, 2, 2, 1, melee())),
            Err(TacticsError::InvalidState(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.animation.step_ms = 0;
        assert!(matches!(
            GameState::new(Grid::new(2, 2), config),
            Err(TacticsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_units_block_movement() {
        let state = skirmish();
        let range = state.move_range(1).unwrap();

        assert!(range.contains(&Field::new(0, 2)));
        assert!(range.contains(&Field::new(2, 2)));
        assert!(range.contains(&Field::new(0, 1)));
        // Archers stand here.
        assert!(!range.contains(&Field::new(0, 0)));

        let path = state.path_for(1, Field::new(4, 2)).unwrap();
        assert!(!path.contains(&Field::new(3, 2)));
        assert_eq!(path.first(), Some(&Field::new(0, 2)));
        assert_eq!(path.last(), Some(&Field::new(4, 2)));
    }

    #[test]
    fn test_move_then_update_commits_position() {
        let mut state = skirmish();
        let path = state.move_unit(1, Field::new(2, 2)).unwrap();
        assert_eq!(
            path,
            vec![Field::new(0, 2), Field::new(1, 2), Field::new(2, 2)]
        );

        let swords = state.unit(1).unwrap();
        assert_eq!(swords.position, Field::new(0, 2));
        assert_eq!(swords.pose.pose(), Pose::Walking);
        assert!(state.is_walking(1));

        // Two steps of four points at 40ms each.
        assert!(state.update(280).is_empty());
        assert_eq!(state.update(40), vec![1]);

        let swords = state.unit(1).unwrap();
        assert_eq!(swords.position, Field::new(2, 2));
        assert_eq!(swords.pose.pose(), Pose::Idle);
        assert!(!state.is_walking(1));
    }

    #[test]
    fn test_move_rejections() {
        let mut state = skirmish();

        assert!(matches!(
            state.move_unit(1, Field::new(4, 4)),
            Err(TacticsError::OutOfMoveRange { unit: 1, .. })
        ));
        assert!(matches!(
            state.move_unit(1, Field::new(0, 0)),
            Err(TacticsError::FieldOccupied { occupant: 2, .. })
        ));
        assert!(matches!(
            state.move_unit(3, Field::new(3, 3)),
            Err(TacticsError::NotYourTurn { unit: 3, .. })
        ));
        assert!(matches!(
            state.move_unit(99, Field::new(1, 1)),
            Err(TacticsError::UnknownUnit(99))
        ));

        state.move_unit(1, Field::new(1, 2)).unwrap();
        assert!(matches!(
            state.move_unit(1, Field::new(1, 3)),
            Err(TacticsError::UnitBusy(1))
        ));
        state.update(1_000);
        assert!(matches!(
            state.move_unit(1, Field::new(1, 3)),
            Err(TacticsError::AlreadyActed {
                unit: 1,
                action: "moved"
            })
        ));
    }

    #[test]
    fn test_walk_destination_is_reserved() {
        let mut state = skirmish();
        assert!(state.move_range(1).unwrap().contains(&Field::new(0, 1)));
        state.move_unit(2, Field::new(0, 1)).unwrap();
        assert!(!state.move_range(1).unwrap().contains(&Field::new(0, 1)));
    }

    #[test]
    fn test_melee_attack_requires_adjacency() {
        let mut state = skirmish();
        assert!(matches!(
            state.attack(1, 3),
            Err(TacticsError::OutOfAttackRange {
                attacker: 1,
                defender: 3
            })
        ));

        state.move_unit(1, Field::new(2, 2)).unwrap();
        state.update(1_000);
        assert_eq!(state.targets(1).unwrap(), vec![3]);

        let outcome = state.attack(1, 3).unwrap();
        assert_eq!(
            outcome,
            FightOutcome {
                kills: 5,
                wounded: false
            }
        );
        let spears = state.unit(3).unwrap();
        assert_eq!(spears.count, 5);
        assert_eq!(spears.health(), 50);
        assert_eq!(state.unit(1).unwrap().pose.pose(), Pose::Attacking);

        assert!(matches!(
            state.attack(1, 3),
            Err(TacticsError::AlreadyActed {
                action: "attacked",
                ..
            })
        ));
    }

    #[test]
    fn test_ranged_attack_uses_line_of_sight() {
        let mut grid = Grid::new(5, 5);
        grid.set(1, 3, Tile::Code(2));
        let mut state = GameState::new(grid, EngineConfig::default()).unwrap();
        let archers = state
            .spawn_unit(unit("archers", Side::Player, 0, 2, 8, archer()))
            .unwrap();
        let spears = state
            .spawn_unit(unit("spears", Side::Enemy, 3, 2, 10, melee()))
            .unwrap();
        let hidden = state
            .spawn_unit(unit("hidden", Side::Enemy, 2, 4, 10, melee()))
            .unwrap();

        let reach = state.attack_range(archers).unwrap().unwrap();
        assert!(reach.contains(&Field::new(3, 2)));
        assert!(!reach.contains(&Field::new(0, 2)));
        assert!(state.attack_range(spears).unwrap().is_none());
        assert_eq!(state.targets(archers).unwrap(), vec![spears]);
        assert!(matches!(
            state.attack(archers, hidden),
            Err(TacticsError::OutOfAttackRange { .. })
        ));

        // 8 * 4 * (1 + 0.05 * (4 - 5)) / 10 = 3.04 -> 3 kills, wounded.
        let outcome = state.attack(archers, spears).unwrap();
        assert_eq!(
            outcome,
            FightOutcome {
                kills: 3,
                wounded: true
            }
        );
        assert!(state.unit(spears).unwrap().wounded);
    }

    #[test]
    fn test_friendly_fire_rejected() {
        let mut state = skirmish();
        assert!(matches!(
            state.attack(2, 1),
            Err(TacticsError::FriendlyTarget {
                attacker: 2,
                defender: 1
            })
        ));
    }

    #[test]
    fn test_defeated_unit_leaves_board() {
        let mut state = GameState::new(Grid::new(3, 1), EngineConfig::default()).unwrap();
        let heavy = UnitStats {
            attack: 10,
            ..melee()
        };
        let horde = state
            .spawn_unit(unit("horde", Side::Player, 0, 0, 100, heavy))
            .unwrap();
        let scouts = state
            .spawn_unit(unit("scouts", Side::Enemy, 1, 0, 3, melee()))
            .unwrap();

        let outcome = state.attack(horde, scouts).unwrap();
        assert!(outcome.kills >= 3);

        let fallen = state.unit(scouts).unwrap();
        assert_eq!(fallen.status, UnitStatus::Defeated);
        assert_eq!(fallen.count, 0);
        assert_eq!(state.units().len(), 2);
        assert_eq!(state.winner(), Some(Side::Player));

        assert!(state.move_range(horde).unwrap().contains(&Field::new(2, 0)));
        assert!(matches!(
            state.move_range(scouts),
            Err(TacticsError::UnitDefeated(_))
        ));
    }

    #[test]
    fn test_end_turn_switches_side_and_resets() {
        let mut state = skirmish();
        state.move_unit(1, Field::new(1, 2)).unwrap();
        assert!(matches!(state.end_turn(), Err(TacticsError::UnitBusy(1))));

        state.update(1_000);
        assert_eq!(state.end_turn().unwrap(), Side::Enemy);
        assert_eq!(state.turn(), 1);
        assert_eq!(state.unit(1).unwrap().turn, TurnFlags::default());

        state.move_unit(3, Field::new(2, 2)).unwrap();
        assert!(matches!(
            state.move_unit(1, Field::new(1, 3)),
            Err(TacticsError::NotYourTurn { .. })
        ));
    }

    #[test]
    fn test_render_pushes_units_and_highlights() {
        let mut state = skirmish();
        state.move_unit(1, Field::new(2, 2)).unwrap();
        state.update(40);

        let mut recorder = Recorder::default();
        state.render(&mut recorder);
        assert_eq!(recorder.units.len(), 3);

        let swords = &recorder.units[0];
        assert_eq!(swords.field, Field::new(0, 2));
        assert_eq!(swords.pixel, crate::math::Vec2Fixed::from_ints(8, 64));
        assert_eq!(swords.pose, Pose::Walking);
        assert_eq!(swords.gear.len(), 1);
        assert_eq!(swords.gear[0].sprite.frame, swords.skin.frame);

        state.render_selection(2, &mut recorder).unwrap();
        let kinds: Vec<_> = recorder.highlights.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![HighlightKind::Move, HighlightKind::Attack]);

        let path = state.path_for(3, Field::new(4, 4)).unwrap();
        state.render_path(&path, &mut recorder);
        assert_eq!(recorder.highlights.last().unwrap().1.len(), path.len());
    }

    #[test]
    fn test_start_waits_for_resources() {
        let mut state = skirmish();
        let mut gate = ReadyGate::new();
        assert!(matches!(
            state.start(&gate),
            Err(TacticsError::ResourcesNotReady)
        ));

        gate.mark_ready();
        state.start(&gate).unwrap();
        assert!(state.is_started());
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut state = skirmish();
        state.move_unit(1, Field::new(2, 2)).unwrap();
        state.update(120);

        let bytes = state.serialize().unwrap();
        let mut restored = GameState::deserialize(&bytes).unwrap();
        assert_eq!(state.state_hash(), restored.state_hash());
        assert_eq!(restored, state);

        state.update(1_000);
        restored.update(1_000);
        assert_eq!(state.state_hash(), restored.state_hash());
    }

    #[test]
    fn test_determinism() {
        let run = || {
            let mut state = skirmish();
            state.move_unit(1, Field::new(2, 2)).unwrap();
            for _ in 0..10 {
                state.update(33);
            }
            state.attack(1, 3).unwrap();
            state.end_turn().unwrap();
            state.state_hash()
        };
        assert_eq!(run(), run());
    }
}
