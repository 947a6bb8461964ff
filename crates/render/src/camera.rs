use std::f32::consts::PI;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use orbitview_common::{cross, dot, matrix_multiply4, normalize};
use tracing::trace;

use crate::device::{BufferHandle, BufferUsage, RenderDevice};
use crate::layout::{CAMERA_VECTORS_SIZE, MATRIX_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CameraError {
    #[error("view direction has zero length")]
    ZeroDirection,
    #[error("up vector has zero length")]
    ZeroUp,
    #[error("up vector is parallel to the view direction")]
    ParallelUp,
    #[error("orbit distance must be positive and finite (got {0})")]
    InvalidDistance(f32),
    #[error("clip planes must satisfy 0 < near < far (got near={near}, far={far})")]
    InvalidClipRange { near: f32, far: f32 },
    #[error("aspect ratio must be positive (got {0})")]
    InvalidAspect(f32),
    #[error("vertical field of view must lie in (0, π) radians (got {0})")]
    InvalidFov(f32),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
}

/// Raw camera vectors for the shader, each padded to 16 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraVectors {
    pub position: [f32; 3],
    _pad0: f32,
    pub direction: [f32; 3],
    _pad1: f32,
}

/// Uniform buffers backing the camera bind group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraBuffers {
    pub view: BufferHandle,
    pub projection: BufferHandle,
    pub view_projection: BufferHandle,
    pub vectors: BufferHandle,
}

impl CameraBuffers {
    pub fn create(device: &mut dyn RenderDevice) -> Self {
        Self {
            view: device.create_buffer("camera_view", MATRIX_SIZE, BufferUsage::Uniform),
            projection: device.create_buffer(
                "camera_projection",
                MATRIX_SIZE,
                BufferUsage::Uniform,
            ),
            view_projection: device.create_buffer(
                "camera_view_projection",
                MATRIX_SIZE,
                BufferUsage::Uniform,
            ),
            vectors: device.create_buffer(
                "camera_vectors",
                CAMERA_VECTORS_SIZE,
                BufferUsage::Uniform,
            ),
        }
    }
}

/// A look-direction camera with perspective or orthographic projection.
///
/// Camera space has `right` along +x, the orthogonalised up along +y and the
/// look direction along +z; visible depth `[near, far]` maps to clip depth
/// `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    direction: Vec3,
    up: Vec3,
    right: Vec3,
    near: f32,
    far: f32,
    aspect: f32,
    fov_y: f32,
    perspective: f32,
    mode: ProjectionMode,
    ortho_width: f32,
}

impl Default for Camera {
    fn default() -> Self {
        let fov_y = 45f32.to_radians();
        Self {
            position: Vec3::new(0.0, 0.0, 1.0),
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            near: 1.0,
            far: 100.0,
            aspect: 1.0,
            fov_y,
            perspective: (fov_y * 0.5).tan(),
            mode: ProjectionMode::Perspective,
            ortho_width: 20.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the camera at `position` looking along `direction`.
    ///
    /// Neither vector needs to be normalised. On error the camera is unchanged.
    pub fn update_view_direction(
        &mut self,
        position: Vec3,
        direction: Vec3,
        up: Option<Vec3>,
    ) -> Result<(), CameraError> {
        let direction = normalize(direction).map_err(|_| CameraError::ZeroDirection)?;
        let up = match up {
            Some(up) => normalize(up).map_err(|_| CameraError::ZeroUp)?,
            None => self.up,
        };
        let right = normalize(cross(direction, up)).map_err(|_| CameraError::ParallelUp)?;

        self.position = position;
        self.direction = direction;
        self.up = up;
        self.right = right;
        Ok(())
    }

    /// Place the camera at `position` looking at `focus`, so the view
    /// direction is `focus - position`.
    pub fn update_view_focus(
        &mut self,
        position: Vec3,
        focus: Vec3,
        up: Option<Vec3>,
    ) -> Result<(), CameraError> {
        self.update_view_direction(position, focus - position, up)
    }

    /// Orbit `focus` at `distance`. `pitch` is the polar angle from +y and
    /// `yaw` the azimuth from +x towards +z.
    pub fn update_view_orbital(
        &mut self,
        focus: Vec3,
        distance: f32,
        pitch: f32,
        yaw: f32,
    ) -> Result<(), CameraError> {
        if !(distance.is_finite() && distance > 0.0) {
            return Err(CameraError::InvalidDistance(distance));
        }
        let (sin_p, cos_p) = pitch.sin_cos();
        let (sin_y, cos_y) = yaw.sin_cos();
        let offset = Vec3::new(
            distance * sin_p * cos_y,
            distance * cos_p,
            distance * sin_p * sin_y,
        );
        self.update_view_direction(focus + offset, -offset, None)
    }

    pub fn update_projection(
        &mut self,
        near: f32,
        far: f32,
        aspect: f32,
        fov_y: f32,
    ) -> Result<(), CameraError> {
        if !(near > 0.0 && far > near && far.is_finite()) {
            return Err(CameraError::InvalidClipRange { near, far });
        }
        if !(aspect.is_finite() && aspect > 0.0) {
            return Err(CameraError::InvalidAspect(aspect));
        }
        validate_fov(fov_y)?;
        self.near = near;
        self.far = far;
        self.aspect = aspect;
        self.set_fov(fov_y);
        Ok(())
    }

    /// Change the vertical field of view only.
    pub fn update_fov(&mut self, fov_y: f32) -> Result<(), CameraError> {
        validate_fov(fov_y)?;
        self.set_fov(fov_y);
        Ok(())
    }

    fn set_fov(&mut self, fov_y: f32) {
        self.fov_y = fov_y;
        self.perspective = (fov_y * 0.5).tan();
    }

    pub fn set_projection_mode(&mut self, mode: ProjectionMode) -> &mut Self {
        self.mode = mode;
        self
    }

    pub fn view_matrix(&self) -> Mat4 {
        let r = self.right;
        let u = cross(r, self.direction);
        let d = self.direction;
        let e = self.position;
        Mat4::from_cols(
            Vec4::new(r.x, u.x, d.x, 0.0),
            Vec4::new(r.y, u.y, d.y, 0.0),
            Vec4::new(r.z, u.z, d.z, 0.0),
            Vec4::new(-dot(r, e), -dot(u, e), -dot(d, e), 1.0),
        )
    }

    /// Symmetric frustum with `w = z`.
    pub fn perspective_projection_matrix(&self) -> Mat4 {
        let depth = self.far / (self.far - self.near);
        Mat4::from_cols(
            Vec4::new(1.0 / (self.aspect * self.perspective), 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0 / self.perspective, 0.0, 0.0),
            Vec4::new(0.0, 0.0, depth, 1.0),
            Vec4::new(0.0, 0.0, -self.near * depth, 0.0),
        )
    }

    /// Fixed world-space width; height follows the aspect ratio.
    pub fn orthographic_projection_matrix(&self) -> Mat4 {
        let height = self.ortho_width / self.aspect;
        let depth = 1.0 / (self.far - self.near);
        Mat4::from_cols(
            Vec4::new(2.0 / self.ortho_width, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 / height, 0.0, 0.0),
            Vec4::new(0.0, 0.0, depth, 0.0),
            Vec4::new(0.0, 0.0, -self.near * depth, 1.0),
        )
    }

    pub fn projection_matrix(&self) -> Mat4 {
        match self.mode {
            ProjectionMode::Perspective => self.perspective_projection_matrix(),
            ProjectionMode::Orthographic => self.orthographic_projection_matrix(),
        }
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        matrix_multiply4(self.projection_matrix(), self.view_matrix())
    }

    /// Look direction flattened onto the ground plane, or zero when looking
    /// straight up or down.
    pub fn forward(&self) -> Vec3 {
        let flat = Vec3::new(self.direction.x, 0.0, self.direction.z);
        normalize(flat).unwrap_or(Vec3::ZERO)
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    pub fn projection_mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn vectors(&self) -> CameraVectors {
        CameraVectors {
            position: self.position.to_array(),
            _pad0: 0.0,
            direction: self.direction.to_array(),
            _pad1: 0.0,
        }
    }

    /// Upload every camera uniform. Runs unconditionally each call.
    pub fn write_buffer(&self, device: &mut dyn RenderDevice, buffers: &CameraBuffers) {
        let view = self.view_matrix();
        let projection = self.projection_matrix();
        let view_projection = matrix_multiply4(projection, view);

        device.write_buffer(buffers.view, 0, bytemuck::bytes_of(&view.to_cols_array()));
        device.write_buffer(
            buffers.projection,
            0,
            bytemuck::bytes_of(&projection.to_cols_array()),
        );
        device.write_buffer(
            buffers.view_projection,
            0,
            bytemuck::bytes_of(&view_projection.to_cols_array()),
        );
        device.write_buffer(buffers.vectors, 0, bytemuck::bytes_of(&self.vectors()));
        trace!(position = ?self.position, direction = ?self.direction, "camera written");
    }
}

fn validate_fov(fov_y: f32) -> Result<(), CameraError> {
    if fov_y > 0.0 && fov_y < PI {
        Ok(())
    } else {
        Err(CameraError::InvalidFov(fov_y))
    }
}
