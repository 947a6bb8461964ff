use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use tracing::trace;

use crate::device::{BufferHandle, RenderDevice};

/// Point light uniform, each vec3 padded to 16 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    _pad0: f32,
    pub color: [f32; 3],
    _pad1: f32,
    /// Constant, linear and quadratic terms.
    pub attenuation: [f32; 3],
    _pad2: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    position: Vec3,
    color: Vec3,
    attenuation: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Vec3::ONE,
            attenuation: Vec3::new(1.0, 0.14, 0.07),
        }
    }
}

impl Light {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    /// Colour components are not clamped; values above 1 brighten.
    pub fn color(&mut self, r: f32, g: f32, b: f32) -> &mut Self {
        self.color = Vec3::new(r, g, b);
        self
    }

    pub fn world_position(&self) -> Vec3 {
        self.position
    }

    pub fn rgb(&self) -> Vec3 {
        self.color
    }

    pub fn attenuation(&self) -> Vec3 {
        self.attenuation
    }

    pub fn uniform(&self) -> LightUniform {
        LightUniform {
            position: self.position.to_array(),
            _pad0: 0.0,
            color: self.color.to_array(),
            _pad1: 0.0,
            attenuation: self.attenuation.to_array(),
            _pad2: 0.0,
        }
    }

    pub fn write_buffer(&self, device: &mut dyn RenderDevice, buffer: BufferHandle) {
        device.write_buffer(buffer, 0, bytemuck::bytes_of(&self.uniform()));
        trace!(position = ?self.position, "light written");
    }
}

/// Scene-wide ambient colour. Also used as the clear colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ambient {
    color: Vec3,
}

impl Default for Ambient {
    fn default() -> Self {
        Self {
            color: Vec3::splat(0.5),
        }
    }
}

impl Ambient {
    pub fn set(&mut self, r: f32, g: f32, b: f32) -> &mut Self {
        self.color = Vec3::new(r, g, b);
        self
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn write_buffer(&self, device: &mut dyn RenderDevice, buffer: BufferHandle) {
        device.write_buffer(buffer, 0, bytemuck::bytes_of(&self.color.extend(1.0).to_array()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{BufferUsage, RecordingDevice};
    use crate::layout::{AMBIENT_SIZE, LIGHT_SIZE};

    #[test]
    fn uniform_layout_is_padded() {
        assert_eq!(std::mem::size_of::<LightUniform>() as u64, LIGHT_SIZE);
    }

    #[test]
    fn write_packs_position_color_attenuation() {
        let mut device = RecordingDevice::new();
        let buffer = device.create_buffer("light", LIGHT_SIZE, BufferUsage::Uniform);
        let mut light = Light::new();
        light.position(-1.0, 1.0, 2.0).color(0.9, 0.9, 0.8);
        light.write_buffer(&mut device, buffer);
        assert_eq!(
            device.floats(buffer),
            vec![-1.0, 1.0, 2.0, 0.0, 0.9, 0.9, 0.8, 0.0, 1.0, 0.14, 0.07, 0.0]
        );
    }

    #[test]
    fn color_is_not_clamped() {
        let mut light = Light::new();
        light.color(2.5, -1.0, 0.0);
        assert_eq!(light.rgb(), Vec3::new(2.5, -1.0, 0.0));
    }

    #[test]
    fn ambient_writes_rgb_and_padding() {
        let mut device = RecordingDevice::new();
        let buffer = device.create_buffer("ambient", AMBIENT_SIZE, BufferUsage::Uniform);
        let mut ambient = Ambient::default();
        assert_eq!(ambient.color(), Vec3::splat(0.5));
        ambient.set(0.1, 0.2, 0.3).write_buffer(&mut device, buffer);
        assert_eq!(device.floats(buffer), vec![0.1, 0.2, 0.3, 1.0]);
    }
}
