use glam::{Mat3, Mat4, Quat, Vec3};

/// Errors from vector operations that have no meaningful result.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum MathError {
    #[error("cannot normalize a zero-length or non-finite vector")]
    ZeroLength,
}

/// Scale `v` to unit length.
///
/// Zero-length and non-finite vectors are rejected instead of producing NaN.
pub fn normalize(v: Vec3) -> Result<Vec3, MathError> {
    let len = v.length();
    if !len.is_finite() || len <= f32::EPSILON {
        return Err(MathError::ZeroLength);
    }
    Ok(v / len)
}

/// Right-handed cross product `a × b`.
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(
        a.y * b.z - a.z * b.y,
        a.z * b.x - a.x * b.z,
        a.x * b.y - a.y * b.x,
    )
}

pub fn dot(a: Vec3, b: Vec3) -> f32 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    a + b
}

pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    a - b
}

pub fn scale(v: Vec3, factor: f32) -> Vec3 {
    v * factor
}

/// Product of two column-major 4×4 matrices.
///
/// Points are column vectors, so `matrix_multiply4(proj, view)` applies
/// `view` first. Every composed matrix in the workspace uses this order.
pub fn matrix_multiply4(lhs: Mat4, rhs: Mat4) -> Mat4 {
    lhs * rhs
}

/// Build a unit quaternion from Euler angles in radians.
///
/// The rotations compose as pitch (X) ∘ yaw (Y) ∘ roll (Z), that is
/// `q = q_pitch · q_yaw · q_roll`, written out with half-angle products.
pub fn quaternion_from_euler(pitch: f32, yaw: f32, roll: f32) -> Quat {
    let (sx, cx) = (pitch * 0.5).sin_cos();
    let (sy, cy) = (yaw * 0.5).sin_cos();
    let (sz, cz) = (roll * 0.5).sin_cos();

    let w = cx * cy * cz - sx * sy * sz;
    let x = sx * cy * cz + cx * sy * sz;
    let y = cx * sy * cz - sx * cy * sz;
    let z = cx * cy * sz + sx * sy * cz;
    quaternion(w, x, y, z)
}

/// Quaternion from scalar-first components `(w, x, y, z)`.
pub fn quaternion(w: f32, x: f32, y: f32, z: f32) -> Quat {
    Quat::from_xyzw(x, y, z, w)
}

/// Rotation matrix of a unit quaternion. No renormalization happens here.
pub fn quaternion_to_matrix3(q: Quat) -> Mat3 {
    let (w, x, y, z) = (q.w, q.x, q.y, q.z);
    let (xx, yy, zz) = (x * x, y * y, z * z);
    let (xy, xz, yz) = (x * y, x * z, y * z);
    let (wx, wy, wz) = (w * x, w * y, w * z);

    Mat3::from_cols(
        Vec3::new(1.0 - 2.0 * (yy + zz), 2.0 * (xy + wz), 2.0 * (xz - wy)),
        Vec3::new(2.0 * (xy - wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz + wx)),
        Vec3::new(2.0 * (xz + wy), 2.0 * (yz - wx), 1.0 - 2.0 * (xx + yy)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx_vec(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn normalize_is_idempotent_on_unit_vectors() {
        let samples = [
            Vec3::X,
            Vec3::NEG_Y,
            Vec3::new(1.0, 2.0, -3.0).normalize(),
            Vec3::new(-0.3, 0.4, 0.0).normalize(),
        ];
        for d in samples {
            assert!(approx_vec(normalize(d).unwrap(), d));
        }
    }

    #[test]
    fn normalize_rejects_zero() {
        assert_eq!(normalize(Vec3::ZERO), Err(MathError::ZeroLength));
        assert_eq!(normalize(Vec3::splat(f32::NAN)), Err(MathError::ZeroLength));
    }

    #[test]
    fn cross_is_right_handed() {
        assert_eq!(cross(Vec3::X, Vec3::Y), Vec3::Z);
        assert_eq!(cross(Vec3::Y, Vec3::Z), Vec3::X);
        assert_eq!(cross(Vec3::Z, Vec3::X), Vec3::Y);
        let a = Vec3::new(1.0, -2.0, 0.5);
        let b = Vec3::new(0.3, 4.0, -1.0);
        assert!(approx_vec(cross(a, b), a.cross(b)));
    }

    #[test]
    fn dot_and_arithmetic() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, -5.0, 6.0);
        assert_eq!(dot(a, b), 12.0);
        assert_eq!(add(a, b), Vec3::new(5.0, -3.0, 9.0));
        assert_eq!(sub(a, b), Vec3::new(-3.0, 7.0, -3.0));
        assert_eq!(scale(a, 2.0), Vec3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn identity_is_neutral_for_multiply() {
        let m = Mat4::from_cols_array(&[
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0,
        ]);
        assert_eq!(matrix_multiply4(Mat4::IDENTITY, m), m);
        assert_eq!(matrix_multiply4(m, Mat4::IDENTITY), m);
    }

    #[test]
    fn multiply_applies_rhs_first() {
        let translate = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let scale = Mat4::from_scale(Vec3::splat(2.0));
        let p = matrix_multiply4(translate, scale).transform_point3(Vec3::ONE);
        assert_eq!(p, Vec3::new(3.0, 2.0, 2.0));
    }

    #[test]
    fn identity_quaternion_gives_identity_matrix() {
        let q = quaternion(1.0, 0.0, 0.0, 0.0);
        assert_eq!(quaternion_to_matrix3(q), Mat3::IDENTITY);
        assert_eq!(quaternion_from_euler(0.0, 0.0, 0.0), Quat::IDENTITY);
    }

    #[test]
    fn euler_composition_order_is_pitch_yaw_roll() {
        let (pitch, yaw, roll) = (0.4, -1.1, 0.25);
        let expected =
            Quat::from_rotation_x(pitch) * Quat::from_rotation_y(yaw) * Quat::from_rotation_z(roll);
        let q = quaternion_from_euler(pitch, yaw, roll);
        assert!((q.length() - 1.0).abs() < 1e-6);
        assert!(q.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn quaternion_matrix_matches_rotation() {
        let q = quaternion_from_euler(0.3, 0.7, -0.2);
        let m = quaternion_to_matrix3(q);
        assert!(m.abs_diff_eq(Mat3::from_quat(q), 1e-6));

        // A quarter turn about Y takes +X to -Z.
        let yaw = quaternion_to_matrix3(quaternion_from_euler(0.0, FRAC_PI_2, 0.0));
        assert!(approx_vec(yaw * Vec3::X, Vec3::NEG_Z));
    }
}
