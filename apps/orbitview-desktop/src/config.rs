use std::path::Path;

use anyhow::{Context, Result};
use orbitview_kernel::LoopConfig;
use orbitview_render::{CameraError, ProjectionMode, Scene};
use serde::{Deserialize, Serialize};

/// Everything the desktop app reads from its YAML file. Missing sections
/// and fields fall back to the stock demo values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub simulation: LoopConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Start in borderless fullscreen.
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "orbitview".into(),
            width: 640,
            height: 480,
            fullscreen: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub near: f32,
    pub far: f32,
    pub fov_degrees: f32,
    pub orthographic: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            near: 1.0,
            far: 100.0,
            fov_degrees: 45.0,
            orthographic: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient: [f32; 3],
    pub color: [f32; 3],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient: [0.5; 3],
            color: [0.9, 0.9, 0.8],
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.simulation.validate()?;
        Ok(config)
    }

    pub fn aspect(&self) -> f32 {
        self.window.width.max(1) as f32 / self.window.height.max(1) as f32
    }

    /// Push the camera and lighting sections into a scene.
    pub fn apply(&self, scene: &mut Scene, aspect: f32) -> Result<(), CameraError> {
        let camera = &self.camera;
        scene.camera.update_projection(
            camera.near,
            camera.far,
            aspect,
            camera.fov_degrees.to_radians(),
        )?;
        scene.camera.set_projection_mode(if camera.orthographic {
            ProjectionMode::Orthographic
        } else {
            ProjectionMode::Perspective
        });

        let [r, g, b] = self.lighting.ambient;
        scene.ambient.set(r, g, b);
        let [r, g, b] = self.lighting.color;
        scene.light.color(r, g, b);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitview_kernel::LoopError;

    #[test]
    fn empty_document_is_the_demo() {
        let config = AppConfig::parse("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.window.width, 640);
        assert!((config.aspect() - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let yaml = "
window:
  title: bench
simulation:
  sim_rate: 120
  light:
    radius: 4
camera:
  fov_degrees: 60
";
        let config = AppConfig::parse(yaml).unwrap();
        assert_eq!(config.window.title, "bench");
        assert_eq!(config.window.height, 480);
        assert_eq!(config.simulation.sim_rate, 120.0);
        assert_eq!(config.simulation.frame_rate, 100.0);
        assert_eq!(config.simulation.light.radius, 4.0);
        assert_eq!(config.simulation.light.angular_velocity, 2.0);
        assert_eq!(config.camera.fov_degrees, 60.0);
        assert_eq!(config.camera.near, 1.0);
    }

    #[test]
    fn invalid_rates_are_rejected() {
        let err = AppConfig::parse("simulation:\n  frame_rate: 0\n").unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoopError>(),
            Some(&LoopError::InvalidRate {
                name: "frame_rate",
                value: 0.0
            })
        );
        assert!(AppConfig::parse("window: [1, 2]").is_err());
    }

    #[test]
    fn apply_sets_camera_and_lighting() {
        let mut config = AppConfig::default();
        config.camera.fov_degrees = 90.0;
        config.camera.orthographic = true;
        config.lighting.ambient = [0.2, 0.3, 0.4];
        config.lighting.color = [1.0, 0.0, 0.0];

        let mut scene = Scene::demo(1.0).unwrap();
        config.apply(&mut scene, 2.0).unwrap();
        assert!((scene.camera.fov_y() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(scene.camera.aspect(), 2.0);
        assert_eq!(scene.camera.projection_mode(), ProjectionMode::Orthographic);
        assert_eq!(scene.ambient.color().to_array(), [0.2, 0.3, 0.4]);
        assert_eq!(scene.light.rgb().to_array(), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn bad_clip_range_leaves_the_scene_alone() {
        let mut config = AppConfig::default();
        config.camera.near = 10.0;
        config.camera.far = 5.0;
        let mut scene = Scene::demo(1.0).unwrap();
        assert!(config.apply(&mut scene, 1.0).is_err());
        assert_eq!(scene.camera.near(), 1.0);
        assert_eq!(scene.ambient.color().to_array(), [0.5; 3]);
    }
}
