//! Typed engine configuration.
//!
//! Every recognized option is a named field with a default. Configs are
//! validated when constructed through [`EngineConfig::from_ron`] or
//! [`EngineConfig::validate`]; code that builds them by hand should call
//! `validate` before handing them to a [`GameState`](crate::game::GameState).
//!
//! # Example RON
//!
//! ```ron
//! EngineConfig(
//!     grid: GridConfig(max_walkable_tile: 0),
//!     animation: AnimationConfig(tile_size: 32, steps_per_tile: 4, step_ms: 40),
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, TacticsError};

/// Walkability rules for a [`Grid`](crate::grid::Grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Highest tile code that is still walkable. Codes above it block.
    pub max_walkable_tile: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            max_walkable_tile: 0,
        }
    }
}

/// Pixel-space animation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Edge length of one tile in pixels.
    pub tile_size: u32,
    /// Interpolated points per grid step.
    pub steps_per_tile: u32,
    /// Milliseconds spent on each interpolated point.
    pub step_ms: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            tile_size: 32,
            steps_per_tile: 4,
            step_ms: 40,
        }
    }
}

impl AnimationConfig {
    /// Check that every field is usable.
    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(TacticsError::InvalidConfig(
                "animation.tile_size must be positive".into(),
            ));
        }
        if self.steps_per_tile == 0 {
            return Err(TacticsError::InvalidConfig(
                "animation.steps_per_tile must be positive".into(),
            ));
        }
        if self.step_ms == 0 {
            return Err(TacticsError::InvalidConfig(
                "animation.step_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Grid walkability rules.
    pub grid: GridConfig,
    /// Animation timing and pixel layout.
    pub animation: AnimationConfig,
}

impl EngineConfig {
    /// Parse and validate a configuration from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`TacticsError::DataParseError`] on malformed RON and
    /// [`TacticsError::InvalidConfig`] when a value is out of range.
    pub fn from_ron(source: &str) -> Result<Self> {
        let config: Self = ron::from_str(source).map_err(|e| TacticsError::DataParseError {
            path: "<engine config>".into(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.animation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.grid.max_walkable_tile, 0);
        assert_eq!(config.animation.tile_size, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = EngineConfig::from_ron("(grid: (max_walkable_tile: 2))").unwrap();
        assert_eq!(config.grid.max_walkable_tile, 2);
        assert_eq!(config.animation, AnimationConfig::default());
    }

    #[test]
    fn test_rejects_zero_step_duration() {
        let result = EngineConfig::from_ron("(animation: (step_ms: 0))");
        assert!(matches!(result, Err(TacticsError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_malformed_ron() {
        let result = EngineConfig::from_ron("(grid: [1, 2");
        assert!(matches!(result, Err(TacticsError::DataParseError { .. })));
    }
}
