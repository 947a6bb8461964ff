use std::f32::consts::FRAC_PI_2;

use clap::{Parser, Subcommand};
use glam::Vec3;
use orbitview_common::PITCH_EPSILON;
use orbitview_input::{Action, InputState};
use orbitview_kernel::{FrameState, FrameTarget, LoopConfig, SimulationLoop};
use orbitview_render::layout::{TRANSFORM_MODEL_SIZE, TRANSFORM_SIZE};
use orbitview_render::{
    DebugTextRenderer, RecordingDevice, RecordingPass, Renderer, Scene, SceneBindings,
};
use tracing_subscriber::EnvFilter;

/// Aspect ratio of the stock 640×480 window.
const DEFAULT_ASPECT: f32 = 4.0 / 3.0;

#[derive(Parser)]
#[command(name = "orbitview-cli", about = "Headless orbitview runner")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and loop defaults
    Info,
    /// Bind the demo scene to a recording device and dump one frame
    Frame {
        /// Orbit distance from the origin
        #[arg(short, long, default_value = "5")]
        distance: f32,
    },
    /// Drive the simulation loop with a synthetic clock
    Simulate {
        /// Simulated wall time in milliseconds
        #[arg(long, default_value = "1000")]
        duration_ms: u32,
        /// Callback rate of the synthetic display
        #[arg(long, default_value = "60")]
        refresh_hz: f64,
        /// Hold the move-forward action for the whole run
        #[arg(long)]
        forward: bool,
        /// Horizontal pointer motion per callback, in pixels
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        orbit_x: f32,
    },
}

/// A demo scene bound to a recording device, presented into by the loop.
struct HeadlessStage {
    device: RecordingDevice,
    scene: Scene,
    bindings: SceneBindings,
    frames: u64,
}

impl HeadlessStage {
    fn new() -> anyhow::Result<Self> {
        let mut device = RecordingDevice::new();
        let mut scene = Scene::demo(DEFAULT_ASPECT)?;
        let bindings = scene.bind(&mut device);
        Ok(Self {
            device,
            scene,
            bindings,
            frames: 0,
        })
    }
}

impl FrameTarget for HeadlessStage {
    fn ground_basis(&self) -> (Vec3, Vec3) {
        self.scene.ground_basis()
    }

    fn present(&mut self, frame: &FrameState) {
        if let Err(e) = self.scene.apply_frame(frame) {
            tracing::error!("frame skipped: {e}");
            return;
        }
        self.scene.write_buffers(&mut self.device, &self.bindings);
        self.frames += 1;
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let config = LoopConfig::default();
            println!("orbitview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "loop: sim_rate={}Hz frame_rate={}Hz distance={}",
                config.sim_rate, config.frame_rate, config.distance
            );
            println!("camera: pitch_epsilon={PITCH_EPSILON}");
            println!("transform uniform: {TRANSFORM_SIZE} bytes ({TRANSFORM_MODEL_SIZE} unscaled)");
        }
        Commands::Frame { distance } => {
            let mut stage = HeadlessStage::new()?;
            stage
                .scene
                .camera
                .update_view_orbital(Vec3::ZERO, distance, FRAC_PI_2, -FRAC_PI_2)?;
            stage.scene.write_buffers(&mut stage.device, &stage.bindings);

            let mut pass = RecordingPass::new();
            stage.scene.draw(&mut pass, &stage.bindings);

            print!("{}", DebugTextRenderer::new().render(&stage.scene));
            println!(
                "buffers={} writes={} draws={}",
                stage.device.buffers().len(),
                stage.device.write_count(),
                pass.draw_calls()
            );
        }
        Commands::Simulate {
            duration_ms,
            refresh_hz,
            forward,
            orbit_x,
        } => {
            if !(refresh_hz.is_finite() && refresh_hz > 0.0) {
                anyhow::bail!("refresh rate must be positive (got {refresh_hz})");
            }
            let mut stage = HeadlessStage::new()?;
            let mut sim = SimulationLoop::new(LoopConfig::default())?;
            let mut input = InputState::new();
            input.enable();
            if forward {
                input.press(Action::MoveForward);
            }

            let step = 1000.0 / refresh_hz;
            let end = f64::from(duration_ms);
            let mut now = 0.0;
            let mut callbacks = 0u64;
            sim.start(now);
            while now + step <= end {
                now += step;
                if orbit_x != 0.0 {
                    input.mouse_motion(orbit_x, 0.0);
                }
                sim.advance(now, &mut input, &mut stage)?;
                callbacks += 1;
            }

            let rig = sim.rig();
            println!(
                "callbacks={callbacks} ticks={} frames={} avg_tick_ms={:.2}",
                sim.tick_count(),
                stage.frames,
                sim.engine_delta_average()
            );
            println!(
                "focus=({:.3}, {:.3}, {:.3}) pitch={:.3} yaw={:.3}",
                rig.focus.x, rig.focus.y, rig.focus.z, rig.pitch, rig.yaw
            );
            print!("{}", DebugTextRenderer::new().render(&stage.scene));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_stage_records_frames() {
        let mut stage = HeadlessStage::new().unwrap();
        let mut sim = SimulationLoop::new(LoopConfig::default()).unwrap();
        let mut input = InputState::new();
        sim.start(0.0);
        for now in [10.0, 20.0, 30.0] {
            sim.advance(now, &mut input, &mut stage).unwrap();
        }
        assert_eq!(stage.frames, 3);
        assert_eq!(sim.tick_count(), 1);
        assert!(stage.device.write_count() > 0);
    }

    #[test]
    fn frame_camera_sits_behind_the_origin() {
        let mut stage = HeadlessStage::new().unwrap();
        stage
            .scene
            .camera
            .update_view_orbital(Vec3::ZERO, 5.0, FRAC_PI_2, -FRAC_PI_2)
            .unwrap();
        let position = stage.scene.camera.position();
        assert!((position - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-5);
        assert!((stage.scene.camera.direction() - Vec3::Z).length() < 1e-5);
    }
}
