//! Bind group slots and uniform sizes shared by every backend and the shader.

/// Camera matrices and vectors.
pub const CAMERA_GROUP: u32 = 0;
pub const VIEW_BINDING: u32 = 0;
pub const PROJECTION_BINDING: u32 = 1;
pub const VIEW_PROJECTION_BINDING: u32 = 2;
pub const CAMERA_VECTORS_BINDING: u32 = 3;

/// Point light and ambient colour.
pub const LIGHTING_GROUP: u32 = 1;
pub const LIGHT_BINDING: u32 = 0;
pub const AMBIENT_BINDING: u32 = 1;

/// Per-model transform.
pub const MODEL_GROUP: u32 = 2;
pub const MODEL_BINDING: u32 = 0;

pub const MATRIX_SIZE: u64 = 64;
pub const CAMERA_VECTORS_SIZE: u64 = 32;
pub const LIGHT_SIZE: u64 = 48;
pub const AMBIENT_SIZE: u64 = 16;
pub const TRANSFORM_SIZE: u64 = 128;
/// Bytes of the transform uniform written when no normal matrix is needed.
pub const TRANSFORM_MODEL_SIZE: u64 = 80;

/// Vertex attribute locations.
pub const POSITION_LOCATION: u32 = 0;
pub const NORMAL_LOCATION: u32 = 1;
pub const COLOR_LOCATION: u32 = 2;
