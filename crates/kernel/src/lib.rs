//! Kernel: the dual-rate simulation loop. Simulation state advances on a
//! fixed tick; frames sample it at their own cadence and extrapolate.
//!
//! # Invariants
//! - Simulation state only mutates inside a tick.
//! - Frames never mutate simulation state; they extrapolate a copy.
//! - Time comes from the caller, so the loop is deterministic under test.
//! - Yaw stays wrapped in `[0, 2π)` and pitch clamped off the poles.

pub mod sim;
pub mod time;

pub use sim::{
    FrameState, FrameTarget, LightOrbit, LoopConfig, LoopError, OrbitRig, SimulationLoop,
    StepReport,
};
pub use time::{Cadence, TimeSource};
