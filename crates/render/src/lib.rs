//! Rendering core: camera, transforms, lights and shapes, written against a
//! small buffer contract instead of a concrete graphics API.
//!
//! # Invariants
//! - One depth convention: visible view depth maps to clip depth `[0, 1]`.
//! - `view_projection = projection · view`, column vectors throughout.
//! - Failed camera updates leave the camera unchanged.
//! - GPU buffers are created in a bind step, separate from construction.
//! - Renderers read the scene; only the frame step mutates it.

pub mod camera;
pub mod device;
pub mod layout;
pub mod light;
mod renderer;
pub mod scene;
pub mod shapes;
pub mod transform;

pub use camera::{Camera, CameraBuffers, CameraError, CameraVectors, ProjectionMode};
pub use device::{
    BufferHandle, BufferUsage, DrawCommand, DrawPass, RecordedBuffer, RecordingDevice,
    RecordingPass, RenderDevice,
};
pub use light::{Ambient, Light, LightUniform};
pub use renderer::{DebugTextRenderer, Renderer};
pub use scene::{Model, Scene, SceneBindings, SceneError};
pub use shapes::{Circle, Drawable, Mesh, Rectangle, ShapeError, Triangle, Vertex};
pub use transform::{Transform, TransformUniform};
