//! wgpu backend for the orbitview renderer.
//!
//! Implements the core's buffer contract on a `wgpu::Device` and draws a
//! bound scene with one lit, depth-tested pipeline.
//!
//! # Invariants
//! - Bind group slots match `orbitview_render::layout` and the WGSL shader.
//! - Uploads go through `Queue::write_buffer` and are never read back.
//! - The depth buffer always matches the surface size.

mod device;
mod gpu;
mod shaders;

pub use device::{WgpuDevice, WgpuPass};
pub use gpu::{WgpuRenderer, WgpuRendererError};
