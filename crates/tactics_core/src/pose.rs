//! Unit pose state machine.
//!
//! A unit is drawn as a skin sprite plus any number of gear sprites
//! (helmet, weapon, ...). Every pose maps to a fixed offset and frame
//! window, and a transition applies it to the skin and all gear slots
//! together. Gear always mirrors the skin's frame.

use serde::{Deserialize, Serialize};

/// Contiguous range of sprite-sheet frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FrameWindow {
    /// First frame index.
    pub start: u32,
    /// Number of frames. Always at least 1.
    pub len: u32,
}

impl FrameWindow {
    /// Create a window.
    #[must_use]
    pub const fn new(start: u32, len: u32) -> Self {
        Self { start, len }
    }

    /// Frame indices in order.
    pub fn frames(self) -> impl Iterator<Item = u32> {
        self.start..self.start + self.len
    }
}

/// Unit pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Pose {
    /// Standing still.
    #[default]
    Idle,
    /// Following a path.
    Walking,
    /// Striking a target.
    Attacking,
}

/// Drawing parameters for a pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoseConfig {
    /// Pixel offset applied to every sprite of the unit.
    pub offset: (i32, i32),
    /// Frames the pose cycles through.
    pub frames: FrameWindow,
}

impl Pose {
    /// Fixed configuration for this pose.
    #[must_use]
    pub const fn config(self) -> PoseConfig {
        match self {
            Self::Idle => PoseConfig {
                offset: (0, 0),
                frames: FrameWindow::new(0, 1),
            },
            Self::Walking => PoseConfig {
                offset: (0, -2),
                frames: FrameWindow::new(1, 8),
            },
            Self::Attacking => PoseConfig {
                offset: (4, 0),
                frames: FrameWindow::new(9, 6),
            },
        }
    }
}

/// Draw state of one sprite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteState {
    /// Image key resolved by the external resource collaborator.
    pub key: String,
    /// Pixel offset from the unit position.
    pub offset: (i32, i32),
    /// Active frame window.
    pub frames: FrameWindow,
    /// Current frame, inside `frames`.
    pub frame: u32,
}

impl SpriteState {
    /// Sprite in the idle pose.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        let config = Pose::Idle.config();
        Self {
            key: key.into(),
            offset: config.offset,
            frames: config.frames,
            frame: config.frames.start,
        }
    }

    fn apply(&mut self, config: PoseConfig) {
        self.offset = config.offset;
        self.frames = config.frames;
        self.frame = config.frames.start;
    }
}

/// A sprite worn in a named gear slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GearSprite {
    /// Slot name, e.g. `"helmet"`.
    pub slot: String,
    /// Sprite drawn for the slot.
    pub sprite: SpriteState,
}

/// Pose plus every sprite it drives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoseMachine {
    pose: Pose,
    skin: SpriteState,
    gear: Vec<GearSprite>,
}

impl PoseMachine {
    /// Idle machine for a skin and its gear.
    #[must_use]
    pub fn new(skin_key: impl Into<String>, gear: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            pose: Pose::Idle,
            skin: SpriteState::new(skin_key),
            gear: gear
                .into_iter()
                .map(|(slot, key)| GearSprite {
                    slot,
                    sprite: SpriteState::new(key),
                })
                .collect(),
        }
    }

    /// Current pose.
    #[must_use]
    pub const fn pose(&self) -> Pose {
        self.pose
    }

    /// Skin sprite.
    #[must_use]
    pub const fn skin(&self) -> &SpriteState {
        &self.skin
    }

    /// Gear sprites in slot order.
    #[must_use]
    pub fn gear(&self) -> &[GearSprite] {
        &self.gear
    }

    /// Enter the walking pose.
    pub fn walk(&mut self) {
        self.transition(Pose::Walking);
    }

    /// Enter the attacking pose.
    pub fn attack(&mut self) {
        self.transition(Pose::Attacking);
    }

    /// Return to idle.
    pub fn stop(&mut self) {
        self.transition(Pose::Idle);
    }

    /// Apply `pose` to the skin and every gear slot. Re-entering the current
    /// pose changes nothing.
    pub fn transition(&mut self, pose: Pose) {
        if self.pose == pose {
            return;
        }
        let config = pose.config();
        self.pose = pose;
        self.skin.apply(config);
        for gear in &mut self.gear {
            gear.sprite.apply(config);
        }
    }

    /// Step the skin to its next frame, wrapping inside the window, and copy
    /// the frame to all gear.
    pub fn advance_frame(&mut self) {
        let window = self.skin.frames;
        let next = self.skin.frame + 1;
        self.skin.frame = if next >= window.start + window.len {
            window.start
        } else {
            next
        };
        for gear in &mut self.gear {
            gear.sprite.frame = self.skin.frame;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> PoseMachine {
        PoseMachine::new(
            "skin/archer",
            [
                ("helmet".to_string(), "gear/helmet".to_string()),
                ("bow".to_string(), "gear/bow".to_string()),
            ],
        )
    }

    fn assert_gear_mirrors_skin(machine: &PoseMachine) {
        for gear in machine.gear() {
            assert_eq!(gear.sprite.offset, machine.skin().offset);
            assert_eq!(gear.sprite.frames, machine.skin().frames);
            assert_eq!(gear.sprite.frame, machine.skin().frame);
        }
    }

    #[test]
    fn test_starts_idle() {
        let machine = machine();
        assert_eq!(machine.pose(), Pose::Idle);
        assert_eq!(machine.skin().frames, Pose::Idle.config().frames);
        assert_gear_mirrors_skin(&machine);
    }

    #[test]
    fn test_transitions_apply_to_all_slots() {
        let mut machine = machine();

        machine.walk();
        assert_eq!(machine.pose(), Pose::Walking);
        assert_eq!(machine.skin().offset, Pose::Walking.config().offset);
        assert_gear_mirrors_skin(&machine);

        machine.attack();
        assert_eq!(machine.skin().frames, Pose::Attacking.config().frames);
        assert_gear_mirrors_skin(&machine);

        machine.stop();
        assert_eq!(machine.pose(), Pose::Idle);
        assert_gear_mirrors_skin(&machine);
    }

    #[test]
    fn test_reentering_pose_is_idempotent() {
        let mut machine = machine();
        machine.walk();
        machine.advance_frame();
        machine.advance_frame();
        let before = machine.clone();

        machine.walk();
        assert_eq!(machine, before);
    }

    #[test]
    fn test_frames_wrap_inside_window() {
        let mut machine = machine();
        machine.attack();
        let window = Pose::Attacking.config().frames;

        for _ in 0..window.len {
            machine.advance_frame();
            assert!(window.frames().any(|f| f == machine.skin().frame));
            assert_gear_mirrors_skin(&machine);
        }
        assert_eq!(machine.skin().frame, window.start);
    }
}
