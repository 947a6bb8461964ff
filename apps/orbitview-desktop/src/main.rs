mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use glam::Vec3;
use orbitview_input::{Action, InputState};
use orbitview_kernel::{FrameState, FrameTarget, SimulationLoop};
use orbitview_render::{Scene, SceneBindings};
use orbitview_render_wgpu::{WgpuDevice, WgpuRenderer};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Fullscreen, Window, WindowId};

use crate::config::AppConfig;

/// Field-of-view change per `[` or `]` press, in degrees.
const FOV_STEP_DEGREES: f32 = 5.0;

#[derive(Parser)]
#[command(name = "orbitview-desktop", about = "Orbit a small lit scene")]
struct Cli {
    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Simulation ticks per second (overrides the config)
    #[arg(long)]
    sim_rate: Option<f64>,

    /// Target frames per second (overrides the config)
    #[arg(long)]
    frame_rate: Option<f64>,
}

fn action_for(key: KeyCode) -> Option<Action> {
    let action = match key {
        KeyCode::KeyW => Action::MoveForward,
        KeyCode::KeyS => Action::MoveBackward,
        KeyCode::KeyA => Action::StrafeLeft,
        KeyCode::KeyD => Action::StrafeRight,
        KeyCode::Space => Action::Ascend,
        KeyCode::ControlLeft | KeyCode::ControlRight => Action::Descend,
        KeyCode::Enter => Action::ToggleFullscreen,
        KeyCode::BracketLeft => Action::NarrowFov,
        KeyCode::BracketRight => Action::WidenFov,
        KeyCode::Escape => Action::ReleaseCursor,
        _ => return None,
    };
    Some(action)
}

/// Window, surface and GPU scene. The simulation loop presents into it.
struct Stage {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    gpu: WgpuDevice,
    renderer: WgpuRenderer,
    scene: Scene,
    bindings: SceneBindings,
}

impl Stage {
    fn new(window: Arc<Window>, config: &AppConfig) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no adapter can present to this window"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("orbitview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create device")?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let aspect = surface_config.width as f32 / surface_config.height as f32;
        let mut scene = Scene::demo(aspect)?;
        config.apply(&mut scene, aspect)?;

        let mut gpu = WgpuDevice::new(device, queue);
        let bindings = scene.bind(&mut gpu);
        let renderer = WgpuRenderer::new(
            &gpu,
            &bindings,
            format,
            surface_config.width,
            surface_config.height,
        )?;

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            width = surface_config.width,
            height = surface_config.height,
            "GPU initialized"
        );

        Ok(Self {
            window,
            surface,
            surface_config,
            gpu,
            renderer,
            scene,
            bindings,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.surface_config.width = size.width.max(1);
        self.surface_config.height = size.height.max(1);
        self.surface
            .configure(self.gpu.device(), &self.surface_config);

        let camera = &mut self.scene.camera;
        let aspect = self.surface_config.width as f32 / self.surface_config.height as f32;
        let (near, far, fov_y) = (camera.near(), camera.far(), camera.fov_y());
        if let Err(e) = camera.update_projection(near, far, aspect, fov_y) {
            tracing::warn!("keeping previous projection: {e}");
        }
        self.renderer.resize(
            &self.gpu,
            self.surface_config.width,
            self.surface_config.height,
        );
    }

    fn step_fov(&mut self, degrees: f32) {
        let fov_y = self.scene.camera.fov_y() + degrees.to_radians();
        match self.scene.camera.update_fov(fov_y) {
            Ok(()) => tracing::info!(fov = fov_y.to_degrees(), "field of view changed"),
            Err(e) => tracing::warn!("field of view unchanged: {e}"),
        }
    }

    fn toggle_fullscreen(&self) {
        let next = match self.window.fullscreen() {
            Some(_) => None,
            None => Some(Fullscreen::Borderless(None)),
        };
        self.window.set_fullscreen(next);
    }

    fn lock_cursor(&self, locked: bool) {
        let grab = if locked {
            self.window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            self.window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(e) = grab {
            tracing::warn!("cursor grab unavailable: {e}");
        }
        self.window.set_cursor_visible(!locked);
    }
}

impl FrameTarget for Stage {
    fn ground_basis(&self) -> (Vec3, Vec3) {
        self.scene.ground_basis()
    }

    fn present(&mut self, frame: &FrameState) {
        if let Err(e) = self.scene.apply_frame(frame) {
            tracing::error!("frame skipped: {e}");
            return;
        }
        self.scene.write_buffers(&mut self.gpu, &self.bindings);

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface
                    .configure(self.gpu.device(), &self.surface_config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer
            .render(&self.gpu, &view, &self.scene, &self.bindings);
        output.present();
    }
}

struct App {
    config: AppConfig,
    stage: Option<Stage>,
    sim: SimulationLoop,
    input: InputState,
    epoch: Instant,
}

impl App {
    fn new(config: AppConfig) -> Result<Self> {
        let sim = SimulationLoop::new(config.simulation)?;
        Ok(Self {
            config,
            stage: None,
            sim,
            input: InputState::new(),
            epoch: Instant::now(),
        })
    }

    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    fn warn_if_faster_than_monitor(&self, window: &Window) {
        let Some(millihertz) = window
            .current_monitor()
            .and_then(|m| m.refresh_rate_millihertz())
        else {
            return;
        };
        let refresh = f64::from(millihertz) / 1000.0;
        let frame_rate = self.config.simulation.frame_rate;
        if frame_rate > refresh {
            tracing::warn!(
                frame_rate,
                refresh,
                "frame rate exceeds the monitor refresh rate"
            );
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        let Some(action) = action_for(key) else {
            return;
        };
        if !pressed {
            self.input.release(action);
            return;
        }
        if !self.input.press(action) || action.is_movement() {
            return;
        }
        let Some(stage) = &mut self.stage else {
            return;
        };
        match action {
            Action::ToggleFullscreen => stage.toggle_fullscreen(),
            Action::WidenFov => stage.step_fov(FOV_STEP_DEGREES),
            Action::NarrowFov => stage.step_fov(-FOV_STEP_DEGREES),
            Action::ReleaseCursor => {
                self.input.disable();
                stage.lock_cursor(false);
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.stage.is_some() {
            return;
        }

        let window_config = &self.config.window;
        let mut attrs = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));
        if window_config.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        self.warn_if_faster_than_monitor(&window);

        match Stage::new(window.clone(), &self.config) {
            Ok(stage) => {
                self.stage = Some(stage);
                let now = self.now_ms();
                self.sim.start(now);
                window.request_redraw();
            }
            Err(e) => {
                tracing::error!("failed to initialize renderer: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(stage) = &mut self.stage {
                    stage.resize(size);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.handle_key(key, state == ElementState::Pressed);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => {
                if !self.input.is_enabled() {
                    self.input.enable();
                    if let Some(stage) = &self.stage {
                        stage.lock_cursor(true);
                    }
                }
            }
            WindowEvent::Focused(false) => {
                self.input.disable();
                if let Some(stage) = &self.stage {
                    stage.lock_cursor(false);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = self.now_ms();
                let Some(stage) = &mut self.stage else {
                    return;
                };
                if let Err(e) = self.sim.advance(now, &mut self.input, stage) {
                    tracing::error!("simulation step failed: {e}");
                }
                stage.window.request_redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.mouse_motion(delta.0 as f32, delta.1 as f32);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(rate) = cli.sim_rate {
        config.simulation.sim_rate = rate;
    }
    if let Some(rate) = cli.frame_rate {
        config.simulation.frame_rate = rate;
    }

    tracing::info!(
        sim_rate = config.simulation.sim_rate,
        frame_rate = config.simulation.frame_rate,
        "orbitview-desktop starting"
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
