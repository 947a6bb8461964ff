use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;
use orbitview_kernel::FrameState;
use tracing::{info, warn};

use crate::camera::{Camera, CameraBuffers, CameraError};
use crate::device::{BufferHandle, BufferUsage, DrawPass, RenderDevice};
use crate::layout::{AMBIENT_SIZE, LIGHT_SIZE, TRANSFORM_SIZE};
use crate::light::{Ambient, Light};
use crate::shapes::{Circle, Drawable, Rectangle, ShapeError, Triangle};
use crate::transform::Transform;

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Camera(#[from] CameraError),
}

/// A drawable placed in the world.
#[derive(Debug)]
pub struct Model {
    pub transform: Transform,
    pub drawable: Box<dyn Drawable>,
}

impl Model {
    pub fn new(drawable: impl Drawable + 'static) -> Self {
        Self {
            transform: Transform::default(),
            drawable: Box::new(drawable),
        }
    }
}

/// Buffers created for a scene by [`Scene::bind`]. Model buffers follow the
/// order of [`Scene::models`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneBindings {
    pub camera: CameraBuffers,
    pub light: BufferHandle,
    pub ambient: BufferHandle,
    pub models: Vec<BufferHandle>,
}

/// Camera, lighting and models for one view.
#[derive(Debug, Default)]
pub struct Scene {
    pub ambient: Ambient,
    pub camera: Camera,
    pub light: Light,
    models: Vec<Model>,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            ..Self::default()
        }
    }

    pub fn add_model(&mut self, model: Model) -> &mut Self {
        self.models.push(model);
        self
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn models_mut(&mut self) -> &mut [Model] {
        &mut self.models
    }

    /// Create every uniform buffer and upload model geometry.
    ///
    /// Models added afterwards have no buffers and are neither written nor drawn.
    pub fn bind(&mut self, device: &mut dyn RenderDevice) -> SceneBindings {
        let camera = CameraBuffers::create(device);
        let light = device.create_buffer("light", LIGHT_SIZE, BufferUsage::Uniform);
        let ambient = device.create_buffer("ambient", AMBIENT_SIZE, BufferUsage::Uniform);
        let models = self
            .models
            .iter_mut()
            .enumerate()
            .map(|(i, model)| {
                model.drawable.upload(device);
                device.create_buffer(
                    &format!("model_{i}_{}", model.drawable.name()),
                    TRANSFORM_SIZE,
                    BufferUsage::Uniform,
                )
            })
            .collect();
        info!(models = self.models.len(), "scene bound");
        SceneBindings {
            camera,
            light,
            ambient,
            models,
        }
    }

    /// Upload ambient, camera, light and model uniforms, in that order.
    pub fn write_buffers(&self, device: &mut dyn RenderDevice, bindings: &SceneBindings) {
        self.check_bindings(bindings);
        self.ambient.write_buffer(device, bindings.ambient);
        self.camera.write_buffer(device, &bindings.camera);
        self.light.write_buffer(device, bindings.light);
        for (model, &buffer) in self.models.iter().zip(&bindings.models) {
            model.transform.write_buffer(device, buffer);
        }
    }

    pub fn draw(&self, pass: &mut dyn DrawPass, bindings: &SceneBindings) {
        for (model, &buffer) in self.models.iter().zip(&bindings.models) {
            pass.set_model(buffer);
            model.drawable.draw(pass);
        }
    }

    fn check_bindings(&self, bindings: &SceneBindings) {
        if bindings.models.len() != self.models.len() {
            warn!(
                models = self.models.len(),
                bound = bindings.models.len(),
                "scene models and bindings differ; unbound models are skipped"
            );
        }
    }

    /// Position the orbital camera and the light from a loop frame.
    pub fn apply_frame(&mut self, frame: &FrameState) -> Result<(), CameraError> {
        self.camera
            .update_view_orbital(frame.focus, frame.distance, frame.pitch, frame.yaw)?;
        let p = frame.light_position;
        self.light.position(p.x, p.y, p.z);
        Ok(())
    }

    /// Forward and right of the camera on the ground plane.
    pub fn ground_basis(&self) -> (Vec3, Vec3) {
        (self.camera.forward(), self.camera.right())
    }

    /// The stock scene: a floor panel, a disc and three triangles in front of
    /// the origin, lit by a warm point light.
    pub fn demo(aspect: f32) -> Result<Self, SceneError> {
        let mut camera = Camera::new();
        camera.update_projection(1.0, 100.0, aspect, 45f32.to_radians())?;
        let mut scene = Scene::new(camera);
        scene.ambient.set(0.5, 0.5, 0.5);
        scene.light.position(-1.0, 1.0, 2.0).color(0.9, 0.9, 0.8);

        let mut floor = Model::new(Rectangle::square(6.0).build()?);
        floor
            .transform
            .translate(0.0, -1.5, 6.0)
            .rotate(FRAC_PI_2, 0.0, 0.0)
            .scale(2.0);

        let mut disc = Model::new(
            Circle {
                radius: 3.0,
                points: 16,
                colors: "01".into(),
            }
            .build()?,
        );
        disc.transform
            .translate(-6.0, 2.0, 12.0)
            .rotate(0.0, -PI * 0.25, 0.0);

        let mut slanted = Model::new(
            Triangle {
                width: 3.0,
                height: 3.0,
                shift_top: -0.75,
                colors: "cmy".into(),
            }
            .build()?,
        );
        slanted
            .transform
            .translate(-1.0, 0.0, 9.0)
            .rotate(0.0, -PI * 0.125, 0.0);

        let mut flipped = Model::new(Triangle::default().build()?);
        flipped.transform.translate(0.0, 0.0, 6.0).rotate(0.0, 0.0, PI);

        let mut small = Model::new(
            Triangle {
                width: 0.5,
                height: 0.5,
                shift_top: 1.25,
                colors: "100".into(),
            }
            .build()?,
        );
        small
            .transform
            .translate(1.0, 0.0, 3.0)
            .rotate(0.0, PI * 0.125, 0.0);

        scene
            .add_model(floor)
            .add_model(disc)
            .add_model(slanted)
            .add_model(flipped)
            .add_model(small);
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DrawCommand, RecordingDevice, RecordingPass};

    fn frame() -> FrameState {
        FrameState {
            focus: Vec3::ZERO,
            distance: 5.0,
            pitch: FRAC_PI_2,
            yaw: 0.0,
            light_position: Vec3::new(2.0, 1.0, 3.0),
            since_tick: 0.0,
        }
    }

    #[test]
    fn demo_scene_has_five_models() {
        let scene = Scene::demo(4.0 / 3.0).unwrap();
        assert_eq!(scene.models().len(), 5);
        assert_eq!(scene.ambient.color(), Vec3::splat(0.5));
        assert_eq!(scene.models()[0].transform.scale_factor(), 2.0);
    }

    #[test]
    fn bind_creates_uniforms_and_geometry() {
        let mut scene = Scene::demo(1.0).unwrap();
        let mut device = RecordingDevice::new();
        let bindings = scene.bind(&mut device);
        assert_eq!(bindings.models.len(), 5);
        // 4 camera + light + ambient + 5 transforms + 5 vertex + 2 index buffers.
        assert_eq!(device.buffers().len(), 4 + 2 + 5 + 5 + 2);
    }

    #[test]
    fn write_order_is_ambient_camera_light_models() {
        let mut scene = Scene::demo(1.0).unwrap();
        let mut device = RecordingDevice::new();
        let bindings = scene.bind(&mut device);
        let before = device.write_count();
        scene.write_buffers(&mut device, &bindings);

        let camera = &bindings.camera;
        let mut expected = vec![
            bindings.ambient,
            camera.view,
            camera.projection,
            camera.view_projection,
            camera.vectors,
            bindings.light,
        ];
        expected.extend(&bindings.models);
        assert_eq!(&device.write_log()[before..], expected.as_slice());

        // Scaled floor carries the normal matrix; the rest skip it.
        assert_eq!(device.uints(bindings.models[0])[16], 1);
        assert_eq!(device.uints(bindings.models[1])[16], 0);
        assert_eq!(device.floats(bindings.ambient), vec![0.5, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn apply_frame_moves_camera_and_light() {
        let mut scene = Scene::default();
        scene.apply_frame(&frame()).unwrap();
        assert!((scene.camera.position() - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
        assert_eq!(scene.light.world_position(), Vec3::new(2.0, 1.0, 3.0));

        let (forward, right) = scene.ground_basis();
        assert!((forward - Vec3::NEG_X).length() < 1e-5);
        assert!(right.y.abs() < 1e-6);
    }

    #[test]
    fn bad_frame_leaves_camera_alone() {
        let mut scene = Scene::default();
        let before = scene.camera.clone();
        let bad = FrameState {
            distance: 0.0,
            ..frame()
        };
        assert!(scene.apply_frame(&bad).is_err());
        assert_eq!(scene.camera, before);
    }

    #[test]
    fn draw_binds_each_model_before_drawing() {
        let mut scene = Scene::demo(1.0).unwrap();
        let mut device = RecordingDevice::new();
        let bindings = scene.bind(&mut device);
        let mut pass = RecordingPass::new();
        scene.draw(&mut pass, &bindings);
        assert_eq!(pass.draw_calls(), 5);
        assert_eq!(pass.commands[0], DrawCommand::SetModel(bindings.models[0]));
    }

    #[test]
    fn unbound_models_are_skipped() {
        let mut scene = Scene::demo(1.0).unwrap();
        let mut device = RecordingDevice::new();
        let bindings = scene.bind(&mut device);
        scene.add_model(Model::new(Triangle::default().build().unwrap()));
        let mut pass = RecordingPass::new();
        scene.draw(&mut pass, &bindings);
        assert_eq!(pass.draw_calls(), 5);
    }
}
