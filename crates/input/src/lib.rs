//! Input state: held actions and accumulated pointer motion, decoupled from
//! any windowing library.
//!
//! # Invariants
//! - The simulation consumes actions, never raw key codes.
//! - Disabled input reports nothing held and no motion.
//! - Pointer motion is read at most once: reading resets the accumulator.

pub mod action;
pub mod state;

pub use action::{Action, MoveIntent};
pub use state::InputState;
