//! Seams to the host's rendering and resource layers.
//!
//! The engine never draws. It hands the host declarative data: highlighted
//! field lists with their border sides, and one [`UnitRenderData`] per unit.
//! Resource loading happens outside as well; the host reports readiness
//! through a [`ReadyGate`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::Field;
use crate::math::Vec2Fixed;
use crate::pose::{GearSprite, Pose, SpriteState};
use crate::range::HighlightTile;
use crate::units::{Side, UnitId};

/// What a highlighted field list means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighlightKind {
    /// Fields the selected unit may move to.
    Move,
    /// Fields the selected unit may attack.
    Attack,
    /// A planned path.
    Path,
}

/// Everything needed to draw one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRenderData {
    /// Unit id.
    pub id: UnitId,
    /// Owning side.
    pub side: Side,
    /// Logical field. During a walk this is still the starting field.
    pub field: Field,
    /// Pixel position, following the walk animation if one is running.
    pub pixel: Vec2Fixed,
    /// Facing in degrees.
    pub angle: u16,
    /// Current pose.
    pub pose: Pose,
    /// Skin sprite.
    pub skin: SpriteState,
    /// Gear sprites.
    pub gear: Vec<GearSprite>,
    /// Head count, for the unit label.
    pub count: u32,
    /// Survivors of the last attack are wounded.
    pub wounded: bool,
}

/// Host-side drawing surface.
pub trait Renderer {
    /// Draw a set of highlighted fields.
    fn draw_highlight(&mut self, kind: HighlightKind, tiles: &[HighlightTile]);

    /// Draw one unit.
    fn draw_unit(&mut self, unit: &UnitRenderData);
}

type ReadyCallback = Box<dyn FnOnce()>;

/// Readiness signal for externally loaded resources.
///
/// Callbacks registered with [`ReadyGate::on_ready`] run exactly once: on the
/// transition to ready, or immediately when the gate is already open.
#[derive(Default)]
pub struct ReadyGate {
    ready: bool,
    pending: Vec<ReadyCallback>,
}

impl ReadyGate {
    /// A closed gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True once resources have loaded.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Open the gate and run pending callbacks in registration order.
    /// Opening an open gate does nothing.
    pub fn mark_ready(&mut self) {
        if self.ready {
            return;
        }
        self.ready = true;
        tracing::debug!(callbacks = self.pending.len(), "Resources ready");
        for callback in self.pending.drain(..) {
            callback();
        }
    }

    /// Run `callback` once the gate is open.
    pub fn on_ready(&mut self, callback: impl FnOnce() + 'static) {
        if self.ready {
            callback();
        } else {
            self.pending.push(Box::new(callback));
        }
    }
}

impl fmt::Debug for ReadyGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadyGate")
            .field("ready", &self.ready)
            .field("pending", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_callbacks_run_on_transition() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut gate = ReadyGate::new();

        let log = Rc::clone(&calls);
        gate.on_ready(move || log.borrow_mut().push("first"));
        let log = Rc::clone(&calls);
        gate.on_ready(move || log.borrow_mut().push("second"));
        assert!(!gate.is_ready());
        assert!(calls.borrow().is_empty());

        gate.mark_ready();
        assert!(gate.is_ready());
        assert_eq!(*calls.borrow(), vec!["first", "second"]);

        gate.mark_ready();
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn test_late_callback_runs_immediately() {
        let calls = Rc::new(RefCell::new(0));
        let mut gate = ReadyGate::new();
        gate.mark_ready();

        let counter = Rc::clone(&calls);
        gate.on_ready(move || *counter.borrow_mut() += 1);
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_debug_reports_pending() {
        let mut gate = ReadyGate::new();
        gate.on_ready(|| {});
        assert_eq!(format!("{gate:?}"), "ReadyGate { ready: false, pending: 1 }");
    }
}
