use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Quat, Vec3};
use orbitview_common::{quaternion_from_euler, quaternion_to_matrix3};
use tracing::{trace, warn};

use crate::device::{BufferHandle, RenderDevice};
use crate::layout::TRANSFORM_MODEL_SIZE;

/// Transform uniform: world matrix, a flag word and the normal matrix with
/// each column padded to 16 bytes.
///
/// `flags[0]` is 1 when `normal` holds a valid matrix. With uniform scale 1
/// the rotation itself is orthonormal and the shader uses the world matrix.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
    pub flags: [u32; 4],
    pub normal: [[f32; 4]; 3],
}

/// Translation, rotation and uniform scale of one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    translation: Vec3,
    rotation: Quat,
    scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.translation = Vec3::new(x, y, z);
        self
    }

    /// Replace the rotation with Euler angles in radians, composed
    /// pitch, then yaw, then roll. Non-finite angles are ignored.
    pub fn rotate(&mut self, pitch: f32, yaw: f32, roll: f32) -> &mut Self {
        if [pitch, yaw, roll].iter().all(|a| a.is_finite()) {
            self.rotation = quaternion_from_euler(pitch, yaw, roll).normalize();
        } else {
            warn!(pitch, yaw, roll, "ignoring non-finite rotation");
        }
        self
    }

    /// Set the uniform scale. Zero and non-finite factors are ignored.
    pub fn scale(&mut self, factor: f32) -> &mut Self {
        if factor.is_finite() && factor != 0.0 {
            self.scale = factor;
        } else {
            warn!(factor, "ignoring degenerate scale");
        }
        self
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale
    }

    fn linear(&self) -> Mat3 {
        quaternion_to_matrix3(self.rotation) * self.scale
    }

    /// `translation · rotation · scale`.
    pub fn world_matrix(&self) -> Mat4 {
        let m = self.linear();
        Mat4::from_cols(
            m.x_axis.extend(0.0),
            m.y_axis.extend(0.0),
            m.z_axis.extend(0.0),
            self.translation.extend(1.0),
        )
    }

    /// Inverse-transpose of the linear part, only needed when scaled.
    pub fn normal_matrix(&self) -> Option<Mat3> {
        (self.scale != 1.0).then(|| self.linear().inverse().transpose())
    }

    pub fn uniform(&self) -> TransformUniform {
        let normal = self.normal_matrix();
        let pad = |m: Mat3| {
            [
                m.x_axis.extend(0.0).to_array(),
                m.y_axis.extend(0.0).to_array(),
                m.z_axis.extend(0.0).to_array(),
            ]
        };
        TransformUniform {
            model: self.world_matrix().to_cols_array_2d(),
            flags: [normal.is_some() as u32, 0, 0, 0],
            normal: normal.map(pad).unwrap_or([[0.0; 4]; 3]),
        }
    }

    /// Upload the world matrix and flag, plus the normal matrix when scaled.
    pub fn write_buffer(&self, device: &mut dyn RenderDevice, buffer: BufferHandle) {
        let uniform = self.uniform();
        let bytes = bytemuck::bytes_of(&uniform);
        if uniform.flags[0] == 0 {
            device.write_buffer(buffer, 0, &bytes[..TRANSFORM_MODEL_SIZE as usize]);
        } else {
            device.write_buffer(buffer, 0, bytes);
        }
        trace!(translation = ?self.translation, scale = self.scale, "transform written");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{BufferUsage, RecordingDevice};
    use crate::layout::TRANSFORM_SIZE;
    use glam::Vec4;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn uniform_is_128_bytes() {
        assert_eq!(std::mem::size_of::<TransformUniform>() as u64, TRANSFORM_SIZE);
    }

    #[test]
    fn translation_only_world_matrix() {
        let mut t = Transform::new();
        t.translate(1.0, 2.0, 3.0);
        let m = t.world_matrix();
        assert_eq!(m.w_axis, Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(Mat3::from_mat4(m), Mat3::IDENTITY);
        assert!(t.normal_matrix().is_none());
    }

    #[test]
    fn setters_chain_and_overwrite() {
        let mut t = Transform::new();
        t.translate(5.0, 5.0, 5.0)
            .rotate(0.3, 0.0, 0.0)
            .scale(2.0)
            .translate(0.0, 1.0, 0.0)
            .rotate(0.0, 0.0, 0.0);
        assert_eq!(t.translation(), Vec3::Y);
        assert_eq!(t.rotation(), Quat::IDENTITY);
        assert_eq!(t.scale_factor(), 2.0);
    }

    #[test]
    fn degenerate_scale_is_ignored() {
        let mut t = Transform::new();
        t.scale(0.0).scale(f32::NAN);
        assert_eq!(t.scale_factor(), 1.0);
    }

    #[test]
    fn non_finite_rotation_is_ignored() {
        let mut t = Transform::new();
        t.rotate(0.0, FRAC_PI_2, 0.0);
        let before = t.rotation();
        t.rotate(f32::NAN, 0.0, 0.0).rotate(0.0, f32::INFINITY, 0.0);
        assert_eq!(t.rotation(), before);
        assert!(t.world_matrix().is_finite());
    }

    #[test]
    fn rotation_then_translation() {
        let mut t = Transform::new();
        t.translate(0.0, 0.0, 6.0).rotate(0.0, FRAC_PI_2, 0.0);
        let p = t.world_matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn normal_matrix_undoes_scale() {
        let mut t = Transform::new();
        t.rotate(0.4, 0.2, 0.1).scale(2.0);
        let n = t.normal_matrix().unwrap();
        let expected = Mat3::from_quat(t.rotation()) * 0.5;
        assert!(n.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn unscaled_write_skips_normal_matrix() {
        let mut device = RecordingDevice::new();
        let buffer = device.create_buffer("model", TRANSFORM_SIZE, BufferUsage::Uniform);

        let mut t = Transform::new();
        t.scale(3.0).write_buffer(&mut device, buffer);
        assert_eq!(device.uints(buffer)[16], 1);
        assert!((device.floats(buffer)[20] - 1.0 / 3.0).abs() < 1e-6);

        // Back to scale 1: the flag is cleared, the stale normal stays but is unused.
        t.scale(1.0).write_buffer(&mut device, buffer);
        assert_eq!(device.uints(buffer)[16], 0);
        assert_eq!(device.floats(buffer)[0], 1.0);
    }
}
