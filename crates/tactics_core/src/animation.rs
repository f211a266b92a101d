//! Sprites following precomputed paths.
//!
//! A field path is expanded into pixel-space points once, when movement
//! starts. Each animation then steps one point at a time, driven by the
//! frame loop through [`AnimationRegistry::update`], and resets to inactive
//! when its path runs out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::AnimationConfig;
use crate::grid::Field;
use crate::math::{Fixed, Vec2Fixed};

/// Top-left pixel of a field.
#[must_use]
pub fn field_to_pixel(field: Field, tile_size: u32) -> Vec2Fixed {
    Vec2Fixed::new(
        Fixed::from_num(field.x) * Fixed::from_num(tile_size),
        Fixed::from_num(field.y) * Fixed::from_num(tile_size),
    )
}

/// Expand a field path into pixel points, `steps_per_tile` per step.
///
/// The first point is the start field itself. Consecutive fields are
/// expected to be adjacent but the interpolation does not rely on it.
#[must_use]
pub fn interpolate_path(path: &[Field], config: &AnimationConfig) -> Vec<Vec2Fixed> {
    let Some(first) = path.first() else {
        return Vec::new();
    };

    let steps = config.steps_per_tile.max(1);
    let mut points = Vec::with_capacity(1 + (path.len() - 1) * steps as usize);
    points.push(field_to_pixel(*first, config.tile_size));

    for pair in path.windows(2) {
        let from = field_to_pixel(pair[0], config.tile_size);
        let to = field_to_pixel(pair[1], config.tile_size);
        for step in 1..=steps {
            points.push(from.lerp(to, step, steps));
        }
    }

    points
}

/// Facing in degrees for a move from `from` to `to`.
///
/// 0 is east, 90 south, 180 west, 270 north. Diagonal moves face along
/// the dominant axis; no movement returns `None`.
#[must_use]
pub fn facing(from: Vec2Fixed, to: Vec2Fixed) -> Option<u16> {
    let delta = to - from;
    if delta == Vec2Fixed::ZERO {
        return None;
    }
    let angle = if delta.x.abs() >= delta.y.abs() {
        if delta.x > Fixed::ZERO {
            0
        } else {
            180
        }
    } else if delta.y > Fixed::ZERO {
        90
    } else {
        270
    };
    Some(angle)
}

/// A named sprite following a path of pixel points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Animation {
    /// Registry key.
    pub name: String,
    /// True while following a path.
    pub active: bool,
    /// Current pixel position.
    pub pos: Vec2Fixed,
    /// Points to follow.
    pub path: Vec<Vec2Fixed>,
    /// Index of `pos` in `path`.
    pub path_index: usize,
    /// Facing in degrees, see [`facing`].
    pub angle: u16,
}

impl Animation {
    /// Inactive animation at the origin.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: false,
            pos: Vec2Fixed::ZERO,
            path: Vec::new(),
            path_index: 0,
            angle: 0,
        }
    }

    /// Begin following `path`. Returns false (and stays inactive at the
    /// path's only point, if any) when there is nowhere to go.
    pub fn start(&mut self, path: Vec<Vec2Fixed>) -> bool {
        if let Some(first) = path.first() {
            self.pos = *first;
        }
        if path.len() < 2 {
            self.reset();
            return false;
        }
        self.path = path;
        self.path_index = 0;
        self.active = true;
        true
    }

    /// Step to the next point. Returns true when this step reached the end
    /// of the path, after which the animation is inactive.
    pub fn advance(&mut self) -> bool {
        if !self.active {
            return false;
        }

        let next = self.path_index + 1;
        let Some(&point) = self.path.get(next) else {
            self.reset();
            return true;
        };

        if let Some(angle) = facing(self.pos, point) {
            self.angle = angle;
        }
        self.pos = point;
        self.path_index = next;

        if next + 1 >= self.path.len() {
            self.reset();
            return true;
        }
        false
    }

    /// Stop and drop the path. Position and facing are kept.
    pub fn reset(&mut self) {
        self.active = false;
        self.path.clear();
        self.path_index = 0;
    }
}

/// All animations of a game, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationRegistry {
    animations: BTreeMap<String, Animation>,
    /// Time not yet spent on a step.
    elapsed_ms: u32,
    step_ms: u32,
}

impl AnimationRegistry {
    /// Empty registry advancing one point every `step_ms`.
    #[must_use]
    pub fn new(step_ms: u32) -> Self {
        Self {
            animations: BTreeMap::new(),
            elapsed_ms: 0,
            step_ms: step_ms.max(1),
        }
    }

    /// Animation by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    /// Mutable animation by name, created inactive if missing.
    pub fn entry(&mut self, name: &str) -> &mut Animation {
        self.animations
            .entry(name.to_string())
            .or_insert_with(|| Animation::new(name))
    }

    /// Start `name` on `path`. See [`Animation::start`].
    pub fn start(&mut self, name: &str, path: Vec<Vec2Fixed>) -> bool {
        self.entry(name).start(path)
    }

    /// True while `name` is following a path.
    #[must_use]
    pub fn is_active(&self, name: &str) -> bool {
        self.animations.get(name).is_some_and(|a| a.active)
    }

    /// True while any animation is running.
    #[must_use]
    pub fn any_active(&self) -> bool {
        self.animations.values().any(|a| a.active)
    }

    /// All animations in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Animation> {
        self.animations.values()
    }

    /// Advance every active animation by the steps that fit in `delta_ms`
    /// plus leftover time. Returns the names that finished, in order.
    pub fn update(&mut self, delta_ms: u32) -> Vec<String> {
        let mut finished = Vec::new();
        if !self.any_active() {
            self.elapsed_ms = 0;
            return finished;
        }

        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
        while self.elapsed_ms >= self.step_ms {
            self.elapsed_ms -= self.step_ms;
            for animation in self.animations.values_mut() {
                if animation.advance() {
                    finished.push(animation.name.clone());
                }
            }
            if !self.any_active() {
                self.elapsed_ms = 0;
                break;
            }
        }

        finished
    }
}

impl Default for AnimationRegistry {
    fn default() -> Self {
        Self::new(AnimationConfig::default().step_ms)
    }
}
