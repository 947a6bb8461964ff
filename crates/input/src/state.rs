use std::collections::BTreeSet;

use glam::Vec2;
use tracing::debug;

use crate::action::{Action, MoveIntent};

/// Held actions and pointer motion accumulated between simulation ticks.
///
/// Input starts disabled; the desktop app enables it while the cursor is
/// locked to the window.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    enabled: bool,
    held: BTreeSet<Action>,
    motion: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        if !self.enabled {
            debug!("input enabled");
        }
        self.enabled = true;
    }

    /// Stop tracking and forget everything held or accumulated.
    pub fn disable(&mut self) {
        if self.enabled {
            debug!("input disabled");
        }
        self.enabled = false;
        self.held.clear();
        self.motion = Vec2::ZERO;
    }

    /// Mark an action held. Returns `true` on the transition from released,
    /// so edge-triggered actions fire once per press.
    pub fn press(&mut self, action: Action) -> bool {
        self.enabled && self.held.insert(action)
    }

    pub fn release(&mut self, action: Action) {
        self.held.remove(&action);
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// Accumulate raw pointer motion in pixels.
    pub fn mouse_motion(&mut self, dx: f32, dy: f32) {
        if self.enabled {
            self.motion += Vec2::new(dx, dy);
        }
    }

    /// Take the motion accumulated since the last read.
    pub fn read_mouse(&mut self) -> Vec2 {
        std::mem::take(&mut self.motion)
    }

    pub fn move_intent(&self) -> MoveIntent {
        let axis = |pos: Action, neg: Action| {
            (self.is_held(pos) as i8 - self.is_held(neg) as i8) as f32
        };
        MoveIntent {
            forward: axis(Action::MoveForward, Action::MoveBackward),
            right: axis(Action::StrafeRight, Action::StrafeLeft),
            up: axis(Action::Ascend, Action::Descend),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_input_ignores_events() {
        let mut input = InputState::new();
        assert!(!input.press(Action::MoveForward));
        input.mouse_motion(4.0, 2.0);
        assert!(!input.is_held(Action::MoveForward));
        assert_eq!(input.read_mouse(), Vec2::ZERO);
    }

    #[test]
    fn press_reports_edges() {
        let mut input = InputState::new();
        input.enable();
        assert!(input.press(Action::ToggleFullscreen));
        assert!(!input.press(Action::ToggleFullscreen));
        input.release(Action::ToggleFullscreen);
        assert!(input.press(Action::ToggleFullscreen));
    }

    #[test]
    fn read_mouse_resets() {
        let mut input = InputState::new();
        input.enable();
        input.mouse_motion(3.0, -1.0);
        input.mouse_motion(2.0, 4.0);
        assert_eq!(input.read_mouse(), Vec2::new(5.0, 3.0));
        assert_eq!(input.read_mouse(), Vec2::ZERO);
    }

    #[test]
    fn opposing_actions_cancel() {
        let mut input = InputState::new();
        input.enable();
        input.press(Action::MoveForward);
        input.press(Action::MoveBackward);
        input.press(Action::StrafeLeft);
        input.press(Action::Ascend);
        let intent = input.move_intent();
        assert_eq!(intent.forward, 0.0);
        assert_eq!(intent.right, -1.0);
        assert_eq!(intent.up, 1.0);
    }

    #[test]
    fn disable_clears_state() {
        let mut input = InputState::new();
        input.enable();
        input.press(Action::MoveForward);
        input.mouse_motion(1.0, 1.0);
        input.disable();
        assert!(input.move_intent().is_idle());
        assert_eq!(input.read_mouse(), Vec2::ZERO);
    }
}
