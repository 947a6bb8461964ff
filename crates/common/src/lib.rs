//! Shared math for orbitview: vectors, quaternions, matrices, angle ranges,
//! the colour palette and rolling statistics.
//!
//! # Invariants
//! - Matrices are column-major and act on column vectors (`proj · view · world · p`).
//! - Normalisation never yields NaN: degenerate input is an error.
//! - Wrapped yaw stays in `[0, 2π)`; clamped pitch stays in `[ε, π − ε]`.

pub mod angle;
pub mod color;
pub mod math;
pub mod stats;

pub use angle::{AngleRange, PITCH_EPSILON, TWO_PI, clamp_angle, wrap_angle};
pub use color::{ColorCycle, Rgb};
pub use math::{
    MathError, add, cross, dot, matrix_multiply4, normalize, quaternion, quaternion_from_euler,
    quaternion_to_matrix3, scale, sub,
};
pub use stats::RollingAverage;
