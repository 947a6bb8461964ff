use glam::Vec3;

use crate::scene::Scene;

/// Renderer-agnostic interface. Renderers read a scene and produce output;
/// they never mutate it.
pub trait Renderer {
    type Output;

    fn render(&self, scene: &Scene) -> Self::Output;
}

/// Produces a human-readable dump of a scene. Used by the CLI and in tests
/// where no GPU is available.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn v3(v: Vec3) -> String {
    format!("({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene) -> String {
        let mut out = String::new();
        let cam = &scene.camera;
        out.push_str(&format!(
            "=== Scene (models={}) ===\n",
            scene.models().len()
        ));
        out.push_str(&format!(
            "Camera: pos={} dir={} fov={:.0} near={} far={} mode={:?}\n",
            v3(cam.position()),
            v3(cam.direction()),
            cam.fov_y().to_degrees(),
            cam.near(),
            cam.far(),
            cam.projection_mode()
        ));
        out.push_str(&format!(
            "Light: pos={} color={}\n",
            v3(scene.light.world_position()),
            v3(scene.light.rgb())
        ));
        out.push_str(&format!("Ambient: {}\n", v3(scene.ambient.color())));

        for (i, model) in scene.models().iter().enumerate() {
            let t = &model.transform;
            let indices = model
                .drawable
                .index_count()
                .map_or_else(|| "-".to_owned(), |n| n.to_string());
            out.push_str(&format!(
                "  [{i}] {} pos={} scale={:.2} vertices={} indices={}\n",
                model.drawable.name(),
                v3(t.translation()),
                t.scale_factor(),
                model.drawable.vertex_count(),
                indices
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scene() {
        let output = DebugTextRenderer::new().render(&Scene::default());
        assert!(output.contains("models=0"));
        assert!(output.contains("fov=45"));
        assert!(output.contains("Ambient: (0.50, 0.50, 0.50)"));
    }

    #[test]
    fn demo_scene_lists_models() {
        let scene = Scene::demo(1.0).unwrap();
        let output = DebugTextRenderer::new().render(&scene);
        assert!(output.contains("models=5"));
        assert!(output.contains("[0] rectangle pos=(0.00, -1.50, 6.00) scale=2.00"));
        assert!(output.contains("[1] circle"));
        assert!(output.contains("indices=-"));
    }
}
