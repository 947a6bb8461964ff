use glam::Vec3;

/// A high-level action a desktop binding can produce.
///
/// The loop and the app stage consume actions, never raw key events, so any
/// window backend only has to map its key codes once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    MoveForward,
    MoveBackward,
    StrafeLeft,
    StrafeRight,
    Ascend,
    Descend,
    /// Switch between windowed and borderless fullscreen.
    ToggleFullscreen,
    /// Widen the vertical field of view by one step.
    WidenFov,
    /// Narrow the vertical field of view by one step.
    NarrowFov,
    /// Release the cursor lock.
    ReleaseCursor,
}

impl Action {
    /// Whether the action drives the focus point while held.
    pub fn is_movement(self) -> bool {
        matches!(
            self,
            Action::MoveForward
                | Action::MoveBackward
                | Action::StrafeLeft
                | Action::StrafeRight
                | Action::Ascend
                | Action::Descend
        )
    }
}

/// Signed movement axes, each in `{-1, 0, 1}`.
///
/// Opposing actions held together cancel out.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveIntent {
    pub forward: f32,
    pub right: f32,
    pub up: f32,
}

impl MoveIntent {
    pub fn is_idle(&self) -> bool {
        self.forward == 0.0 && self.right == 0.0 && self.up == 0.0
    }

    /// Combine the intent with a ground-plane basis. `forward` and `right`
    /// are expected to lie in the XZ plane; `up` always maps to world Y.
    /// The result is not normalised.
    pub fn direction(&self, forward: Vec3, right: Vec3) -> Vec3 {
        Vec3::new(
            forward.x * self.forward + right.x * self.right,
            self.up,
            forward.z * self.forward + right.z * self.right,
        )
    }
}
