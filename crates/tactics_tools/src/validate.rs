//! Data validation utilities.
//!
//! Maps are checked by parsing them and building a full game from them,
//! so unit placement errors surface here rather than at game start. Files
//! named `engine.ron` or `*.config.ron` are checked as engine configs.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tactics_core::config::EngineConfig;
use tactics_core::data::MapData;
use tactics_core::game::GameState;
use tactics_core::grid::Walkable;
use tactics_core::units::Side;

use crate::error::{Result, ToolError};

/// Outcome of validating one data file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// File checked.
    pub path: PathBuf,
    /// Map name, empty for configs.
    pub name: String,
    /// Map width in fields.
    pub width: u32,
    /// Map height in fields.
    pub height: u32,
    /// Walkable fields.
    pub walkable: usize,
    /// Units defined by the map.
    pub units: usize,
    /// Problems that do not stop the file from loading.
    pub warnings: Vec<String>,
    /// Why the file cannot be used, if it cannot.
    pub error: Option<String>,
}

impl FileReport {
    /// True when the file loaded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// True for files that hold an [`EngineConfig`] rather than a map.
#[must_use]
pub fn is_config_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name == "engine.ron" || name.ends_with(".config.ron"))
}

/// Validate map RON text. `label` names the source in messages.
#[must_use]
pub fn validate_map_source(source: &str, label: &Path, config: EngineConfig) -> FileReport {
    let mut report = FileReport {
        path: label.to_path_buf(),
        ..FileReport::default()
    };

    let map = match MapData::from_ron(source, &label.display().to_string()) {
        Ok(map) => map,
        Err(e) => {
            report.error = Some(e.to_string());
            return report;
        }
    };

    report.name.clone_from(&map.name);
    report.units = map.units.len();
    if !map.is_rectangular() {
        report
            .warnings
            .push("rows differ in length; missing cells are blocked".to_string());
    }
    for unit in map.units.iter().filter(|u| u.count == 0) {
        report
            .warnings
            .push(format!("unit '{}' starts with nobody and is defeated", unit.name));
    }
    for side in [Side::Player, Side::Enemy] {
        if !map.units.iter().any(|u| u.side == side && u.count > 0) {
            report.warnings.push(format!("no living {side:?} units"));
        }
    }

    match GameState::from_map(&map, config) {
        Ok(game) => {
            report.width = game.grid().width();
            report.height = game.grid().height();
            report.walkable = game.grid().walkable_count();
        }
        Err(e) => report.error = Some(e.to_string()),
    }
    report
}

/// Validate engine config RON text.
#[must_use]
pub fn validate_config_source(source: &str, label: &Path) -> FileReport {
    FileReport {
        path: label.to_path_buf(),
        error: EngineConfig::from_ron(source).err().map(|e| e.to_string()),
        ..FileReport::default()
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Validate one RON file.
///
/// # Errors
///
/// Returns an error only if the file cannot be read; content problems are
/// recorded in the report.
pub fn validate_file(path: &Path, config: EngineConfig) -> Result<FileReport> {
    let source = read(path)?;
    let report = if is_config_file(path) {
        validate_config_source(&source, path)
    } else {
        validate_map_source(&source, path, config)
    };

    match &report.error {
        Some(error) => tracing::error!(path = %path.display(), %error, "Invalid data file"),
        None => {
            for warning in &report.warnings {
                tracing::warn!(path = %path.display(), %warning, "Data file warning");
            }
            tracing::debug!(path = %path.display(), "Data file ok");
        }
    }
    Ok(report)
}

fn collect_ron_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|source| ToolError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let path = entry
            .map_err(|source| ToolError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        if path.is_dir() {
            collect_ron_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "ron") {
            files.push(path);
        }
    }
    Ok(())
}

/// Validate a RON file, or every RON file below a directory, in path order.
///
/// # Errors
///
/// Returns an error if a file or directory cannot be read.
pub fn validate_data_directory(path: &Path, config: EngineConfig) -> Result<Vec<FileReport>> {
    if path.is_file() {
        return Ok(vec![validate_file(path, config)?]);
    }

    let mut files = Vec::new();
    collect_ron_files(path, &mut files)?;
    files.sort();
    if files.is_empty() {
        tracing::warn!(path = %path.display(), "No RON files found");
    }

    files
        .iter()
        .map(|file| validate_file(file, config))
        .collect()
}

/// Turn failed reports into an error.
///
/// # Errors
///
/// Returns [`ToolError::ValidationFailed`] if any report carries an error.
pub fn check_reports(reports: &[FileReport]) -> Result<()> {
    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        return Err(ToolError::ValidationFailed {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"MapData(
        name: "ford",
        tiles: [
            [0, 0, 0],
            [0, 4, 0],
            [0, "ford", 0],
        ],
        units: [
            (name: "Militia", side: Player, position: (x: 0, y: 0), count: 12),
            (name: "Raiders", side: Enemy, position: (x: 2, y: 2), count: 9),
        ],
    )"#;

    #[test]
    fn test_valid_map() {
        let report = validate_map_source(VALID, Path::new("ford.ron"), EngineConfig::default());
        assert!(report.is_ok(), "{report:?}");
        assert_eq!(report.name, "ford");
        assert_eq!((report.width, report.height), (3, 3));
        assert_eq!(report.walkable, 8);
        assert_eq!(report.units, 2);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_unit_on_wall_is_an_error() {
        let source = VALID.replace("position: (x: 2, y: 2)", "position: (x: 1, y: 1)");
        let report = validate_map_source(&source, Path::new("ford.ron"), EngineConfig::default());
        assert!(report.error.unwrap().contains("blocked field"));
    }

    #[test]
    fn test_warnings() {
        let source = r#"(name: "lonely", tiles: [[0, 0], [0]], units: [
            (name: "Ghosts", side: Enemy, position: (x: 1, y: 0), count: 0),
        ])"#;
        let report = validate_map_source(source, Path::new("lonely.ron"), EngineConfig::default());
        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 4);
    }

    #[test]
    fn test_config_files() {
        assert!(is_config_file(Path::new("assets/engine.ron")));
        assert!(is_config_file(Path::new("fast.config.ron")));
        assert!(!is_config_file(Path::new("maps/ford.ron")));

        let bad = validate_config_source("(animation: (step_ms: 0))", Path::new("engine.ron"));
        assert!(bad.error.unwrap().contains("step_ms"));
    }

    #[test]
    fn test_directory_validation() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("campaign");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(dir.path().join("ford.ron"), VALID).unwrap();
        std::fs::write(nested.join("broken.ron"), "MapData(").unwrap();
        std::fs::write(dir.path().join("engine.ron"), "(grid: (max_walkable_tile: 1))").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let reports = validate_data_directory(dir.path(), EngineConfig::default()).unwrap();
        assert_eq!(reports.len(), 3);
        assert_eq!(reports.iter().filter(|r| r.is_ok()).count(), 2);
        assert!(matches!(
            check_reports(&reports),
            Err(ToolError::ValidationFailed {
                failed: 1,
                total: 3
            })
        ));
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            validate_data_directory(&missing, EngineConfig::default()),
            Err(ToolError::Io { .. })
        ));
    }
}
