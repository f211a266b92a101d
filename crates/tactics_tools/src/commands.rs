//! Subcommand implementations.
//!
//! Every command returns its output as a `String` so the binary only has
//! to print it.

use std::path::Path;

use serde::Serialize;
use tactics_core::combat::{fight, FightOutcome};
use tactics_core::config::EngineConfig;
use tactics_core::data::MapData;
use tactics_core::game::GameState;
use tactics_core::grid::{Field, OccupancyView};
use tactics_core::pathfinding::{find_path, path_length};
use tactics_core::units::UnitId;

use crate::ascii::{AsciiConfig, AsciiRenderer};
use crate::error::{Result, ToolError};

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse an `x,y` field argument.
///
/// # Errors
///
/// Returns [`ToolError::InvalidField`] unless the text is two unsigned
/// integers separated by a comma.
pub fn parse_field(text: &str) -> Result<Field> {
    let invalid = || ToolError::InvalidField(text.to_string());
    let (x, y) = text.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse().map_err(|_| invalid())?;
    let y = y.trim().parse().map_err(|_| invalid())?;
    Ok(Field::new(x, y))
}

/// Load an engine config file, or the defaults.
///
/// # Errors
///
/// Fails if the file cannot be read or does not validate.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => Ok(EngineConfig::from_ron(&read(path)?)?),
        None => Ok(EngineConfig::default()),
    }
}

/// Load a map file and start a game on it.
///
/// # Errors
///
/// Fails if the file cannot be read or the map cannot be built.
pub fn load_game(path: &Path, config: EngineConfig) -> Result<GameState> {
    let map = MapData::from_ron(&read(path)?, &path.display().to_string())?;
    Ok(GameState::from_map(&map, config)?)
}

fn format_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| format!("({}, {})", f.x, f.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Shortest path between two fields. Living units block, except one
/// standing on `from`.
///
/// # Errors
///
/// Fails only when JSON encoding fails.
pub fn path(game: &GameState, from: Field, to: Field, json: bool) -> Result<String> {
    let mover = game.units().active_at(from).map_or(0, |u| u.id);
    let view = OccupancyView::new(game.grid(), game.units().occupied_fields(mover));
    let fields = find_path(&view, from, to);

    if json {
        return to_json(&fields);
    }
    if fields.is_empty() {
        return Ok("no path".to_string());
    }
    Ok(format!(
        "{} steps: {}",
        path_length(&fields),
        format_fields(&fields)
    ))
}

/// Move range of a unit, or its attack range with `attack`.
///
/// # Errors
///
/// Fails for unknown or defeated units.
pub fn range(game: &GameState, unit: UnitId, attack: bool, json: bool) -> Result<String> {
    let fields = if attack {
        game.attack_range(unit)?
    } else {
        Some(game.move_range(unit)?)
    };

    if json {
        return to_json(&fields);
    }
    Ok(match fields {
        None => "melee: attacks adjacent fields only".to_string(),
        Some(fields) => format!("{} fields: {}", fields.len(), format_fields(&fields)),
    })
}

#[derive(Debug, Serialize)]
struct FightReport {
    attacker: UnitId,
    defender: UnitId,
    #[serde(flatten)]
    outcome: FightOutcome,
    remaining: u32,
}

/// Resolve a fight between two units without checking range or turn.
///
/// # Errors
///
/// Fails for unknown units.
pub fn fight_units(
    game: &GameState,
    attacker: UnitId,
    defender: UnitId,
    json: bool,
) -> Result<String> {
    let striker = game.unit(attacker)?;
    let target = game.unit(defender)?;
    let outcome = fight(&striker.combatant(), &target.combatant());
    let report = FightReport {
        attacker,
        defender,
        outcome,
        remaining: outcome.remaining(target.count),
    };

    if json {
        return to_json(&report);
    }
    Ok(format!(
        "{} ({}) attacks {} ({}): {} killed{}, {} left",
        striker.name,
        striker.count,
        target.name,
        target.count,
        outcome.kills,
        if outcome.wounded { ", survivors wounded" } else { "" },
        report.remaining
    ))
}

/// Render the board, with the ranges of `selected` if given.
///
/// # Errors
///
/// Fails when `selected` is unknown or defeated.
pub fn show(game: &GameState, selected: Option<UnitId>, config: AsciiConfig) -> Result<String> {
    let mut renderer = AsciiRenderer::new(game.grid(), config);
    if let Some(id) = selected {
        game.render_selection(id, &mut renderer)?;
    }
    game.render(&mut renderer);
    Ok(renderer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_test_utils::fixtures::skirmish_game;

    #[test]
    fn test_parse_field() {
        assert_eq!(parse_field("3,4").unwrap(), Field::new(3, 4));
        assert_eq!(parse_field(" 0 , 12").unwrap(), Field::new(0, 12));
        assert!(matches!(parse_field("3"), Err(ToolError::InvalidField(_))));
        assert!(matches!(parse_field("-1,2"), Err(ToolError::InvalidField(_))));
    }

    #[test]
    fn test_path_through_gap() {
        let game = skirmish_game();
        let text = path(&game, Field::new(1, 1), Field::new(6, 3), false).unwrap();
        assert!(text.starts_with("7 steps"), "{text}");
        assert!(text.contains("(5, 3)"));

        let json = path(&game, Field::new(0, 0), Field::new(0, 0), true).unwrap();
        let fields: Vec<Field> = serde_json::from_str(&json).unwrap();
        assert_eq!(fields, vec![Field::new(0, 0)]);
    }

    #[test]
    fn test_range_output() {
        let game = skirmish_game();
        assert_eq!(
            range(&game, 1, true, false).unwrap(),
            "melee: attacks adjacent fields only"
        );
        let json = range(&game, 1, false, true).unwrap();
        let fields: Option<Vec<Field>> = serde_json::from_str(&json).unwrap();
        assert!(fields.unwrap().contains(&Field::new(1, 1)));
        assert!(matches!(
            range(&game, 42, false, false),
            Err(ToolError::Tactics(_))
        ));
    }

    #[test]
    fn test_fight_output() {
        let game = skirmish_game();
        // 20 * 5 * (1 + 0.05 * (5 - 3)) / 10 = 11 kills.
        let text = fight_units(&game, 1, 3, false).unwrap();
        assert_eq!(text, "pikes (20) attacks raiders (15): 11 killed, 4 left");

        let json: serde_json::Value =
            serde_json::from_str(&fight_units(&game, 1, 3, true).unwrap()).unwrap();
        assert_eq!(json["kills"], 11);
        assert_eq!(json["remaining"], 4);
    }

    #[test]
    fn test_show_marks_units_and_ranges() {
        let game = skirmish_game();
        let board = show(
            &game,
            Some(2),
            AsciiConfig {
                show_coords: false,
                show_legend: true,
                use_color: false,
            },
        )
        .unwrap();
        let rows: Vec<&str> = board.lines().collect();
        assert_eq!(rows[1].chars().nth(1), Some('a'));
        assert_eq!(rows[1].chars().nth(8), Some('C'));
        assert_eq!(rows[2].chars().nth(1), Some('b'));
        assert!(board.contains('x'));
        assert!(board.contains("b #2 Player at (1, 2) x12 Idle"));
    }

    #[test]
    fn test_load_game_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("duel.ron");
        std::fs::write(
            &path,
            r#"(name: "duel", tiles: [[0, 0, 0]], units: [
                (name: "a", position: (x: 0, y: 0), count: 1),
                (name: "b", side: Enemy, position: (x: 2, y: 0), count: 1),
            ])"#,
        )
        .unwrap();

        let game = load_game(&path, load_config(None).unwrap()).unwrap();
        assert_eq!(game.map_name(), "duel");
        assert!(matches!(
            load_game(&dir.path().join("missing.ron"), EngineConfig::default()),
            Err(ToolError::Io { .. })
        ));
    }
}
