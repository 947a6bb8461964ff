use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;
use orbitview_common::{RollingAverage, clamp_angle, normalize, wrap_angle};
use orbitview_input::{InputState, MoveIntent};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::time::TimeSource;

/// Ticks per engine-delta statistics report.
const STATS_WINDOW: usize = 50;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoopError {
    #[error("{name} must be a positive, finite rate in Hz (got {value})")]
    InvalidRate { name: &'static str, value: f64 },
    #[error("orbit distance must be positive and finite (got {0})")]
    InvalidDistance(f32),
    #[error("{name} must be non-negative and finite (got {value})")]
    InvalidVelocity { name: &'static str, value: f32 },
    #[error("simulation loop advanced before start")]
    NotStarted,
}

/// A light that circles a fixed origin in the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightOrbit {
    pub origin: Vec3,
    pub radius: f32,
    /// Radians per second.
    pub angular_velocity: f32,
}

impl Default for LightOrbit {
    fn default() -> Self {
        Self {
            origin: Vec3::new(0.0, 1.0, 3.0),
            radius: 2.0,
            angular_velocity: 2.0,
        }
    }
}

impl LightOrbit {
    pub fn position(&self, angle: f32) -> Vec3 {
        let (sin, cos) = angle.sin_cos();
        self.origin + Vec3::new(self.radius * cos, 0.0, self.radius * sin)
    }
}

/// Loop rates and tuning. Deserialised from the `simulation` section of the
/// desktop config; every field has a default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Simulation ticks per second.
    pub sim_rate: f64,
    /// Target frames per second.
    pub frame_rate: f64,
    /// Focus speed in world units per second.
    pub move_velocity: f32,
    /// Radians per second per pixel of pointer motion.
    pub orbit_velocity: f32,
    pub distance: f32,
    pub initial_pitch: f32,
    pub initial_yaw: f32,
    pub light: LightOrbit,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            sim_rate: 50.0,
            frame_rate: 100.0,
            move_velocity: 3.0,
            orbit_velocity: PI * 0.1,
            distance: 5.0,
            initial_pitch: FRAC_PI_2 * 0.9,
            initial_yaw: -FRAC_PI_2 * 0.9,
            light: LightOrbit::default(),
        }
    }
}

impl LoopConfig {
    pub fn validate(&self) -> Result<(), LoopError> {
        for (name, value) in [("sim_rate", self.sim_rate), ("frame_rate", self.frame_rate)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(LoopError::InvalidRate { name, value });
            }
        }
        if !(self.distance.is_finite() && self.distance > 0.0) {
            return Err(LoopError::InvalidDistance(self.distance));
        }
        for (name, value) in [
            ("move_velocity", self.move_velocity),
            ("orbit_velocity", self.orbit_velocity),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(LoopError::InvalidVelocity { name, value });
            }
        }
        Ok(())
    }

    /// Tick length in milliseconds.
    pub fn tick_duration(&self) -> f64 {
        1000.0 / self.sim_rate
    }

    /// Frame length in milliseconds.
    pub fn frame_duration(&self) -> f64 {
        1000.0 / self.frame_rate
    }
}

/// Orbit-camera state integrated by the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitRig {
    pub focus: Vec3,
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    /// Focus velocity, world units per second.
    pub velocity: Vec3,
    pub pitch_velocity: f32,
    pub yaw_velocity: f32,
}

impl OrbitRig {
    pub fn new(focus: Vec3, distance: f32, pitch: f32, yaw: f32) -> Self {
        Self {
            focus,
            distance,
            pitch: clamp_angle(pitch, 0.0),
            yaw: wrap_angle(yaw, 0.0),
            velocity: Vec3::ZERO,
            pitch_velocity: 0.0,
            yaw_velocity: 0.0,
        }
    }

    /// Apply the current velocities over `seconds`.
    pub fn integrate(&mut self, seconds: f32) {
        *self = self.extrapolate(seconds);
    }

    /// The rig as it would be after `seconds`, leaving `self` untouched.
    pub fn extrapolate(&self, seconds: f32) -> Self {
        Self {
            focus: self.focus + self.velocity * seconds,
            yaw: wrap_angle(self.yaw, self.yaw_velocity * seconds),
            pitch: clamp_angle(self.pitch, self.pitch_velocity * seconds),
            ..*self
        }
    }
}

/// Everything a frame needs to position the camera and light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub focus: Vec3,
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub light_position: Vec3,
    /// Seconds extrapolated past the last simulation tick.
    pub since_tick: f32,
}

/// The consumer of loop output, usually a scene bound to a device.
pub trait FrameTarget {
    /// Forward and right vectors of the current view, flattened onto the
    /// ground plane. Movement input is expressed in this basis.
    fn ground_basis(&self) -> (Vec3, Vec3);

    /// Apply a frame and draw it.
    fn present(&mut self, frame: &FrameState);
}

/// What one `advance` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Whole ticks that elapsed. Integration runs once regardless.
    pub ticks: u64,
    pub framed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Idle,
    Running,
}

/// Fixed-timestep simulation with variable-rate, extrapolated frames.
///
/// There is no catch-up loop: a stall longer than several ticks counts the
/// ticks but integrates once over the real elapsed engine time.
#[derive(Debug, Clone)]
pub struct SimulationLoop {
    config: LoopConfig,
    state: LoopState,
    time: TimeSource,
    rig: OrbitRig,
    light_angle: f32,
    last_sim_time: f64,
    last_frame_time: f64,
    tick_count: u64,
    next_stats_at: u64,
    engine_delta: RollingAverage,
}

impl SimulationLoop {
    pub fn new(config: LoopConfig) -> Result<Self, LoopError> {
        config.validate()?;
        Ok(Self {
            rig: OrbitRig::new(
                Vec3::ZERO,
                config.distance,
                config.initial_pitch,
                config.initial_yaw,
            ),
            config,
            state: LoopState::Idle,
            time: TimeSource::new(),
            light_angle: 0.0,
            last_sim_time: 0.0,
            last_frame_time: 0.0,
            tick_count: 0,
            next_stats_at: STATS_WINDOW as u64,
            engine_delta: RollingAverage::new(STATS_WINDOW),
        })
    }

    /// Begin timing at `t0` milliseconds.
    pub fn start(&mut self, t0: f64) {
        self.time.engine_update(t0);
        self.last_sim_time = t0;
        self.last_frame_time = t0;
        self.state = LoopState::Running;
        info!(
            sim_rate = self.config.sim_rate,
            frame_rate = self.config.frame_rate,
            "simulation loop started"
        );
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Run whatever tick and frame are due at `now` milliseconds.
    pub fn advance<T>(
        &mut self,
        now: f64,
        input: &mut InputState,
        target: &mut T,
    ) -> Result<StepReport, LoopError>
    where
        T: FrameTarget + ?Sized,
    {
        if self.state != LoopState::Running {
            return Err(LoopError::NotStarted);
        }
        let mut report = StepReport::default();

        let tick = self.config.tick_duration();
        let sim_elapsed = now - self.last_sim_time;
        if sim_elapsed >= tick {
            let ticks = (sim_elapsed / tick).floor();
            self.last_sim_time += ticks * tick;
            report.ticks = ticks as u64;
            self.tick(now, input, target);
            self.tick_count += report.ticks;
            self.report_stats();
        }

        let frame = self.config.frame_duration();
        let frame_elapsed = now - self.last_frame_time;
        if frame_elapsed >= frame {
            self.last_frame_time = now - frame_elapsed % frame;
            self.time.frame_update(now);
            let since_tick = self.time.since_engine(now) as f32;
            target.present(&self.frame_state(since_tick));
            report.framed = true;
        }

        Ok(report)
    }

    fn tick<T>(&mut self, now: f64, input: &mut InputState, target: &T)
    where
        T: FrameTarget + ?Sized,
    {
        self.time.engine_update(now);
        self.engine_delta.push(self.time.engine().delta());
        let seconds = self.time.engine().scale() as f32;

        // Velocities from the previous tick apply before new input is read.
        self.rig.integrate(seconds);
        self.light_angle = wrap_angle(
            self.light_angle,
            self.config.light.angular_velocity * seconds,
        );

        let motion = input.read_mouse();
        self.rig.yaw_velocity = -motion.x * self.config.orbit_velocity;
        self.rig.pitch_velocity = motion.y * self.config.orbit_velocity;

        let (forward, right) = target.ground_basis();
        self.rig.velocity = self.velocity_for(input.move_intent(), forward, right);
    }

    fn velocity_for(&self, intent: MoveIntent, forward: Vec3, right: Vec3) -> Vec3 {
        if intent.is_idle() {
            return Vec3::ZERO;
        }
        // A vertical view flattens to a zero basis; pressing only forward
        // then has no direction to move in.
        match normalize(intent.direction(forward, right)) {
            Ok(dir) => dir * self.config.move_velocity,
            Err(_) => Vec3::ZERO,
        }
    }

    fn report_stats(&mut self) {
        if self.tick_count >= self.next_stats_at {
            debug!(
                ticks = self.tick_count,
                engine_delta_ms = self.engine_delta.average(),
                "engine delta average"
            );
            while self.next_stats_at <= self.tick_count {
                self.next_stats_at += STATS_WINDOW as u64;
            }
        }
    }

    /// Simulation state extrapolated `since_tick` seconds past the last tick.
    pub fn frame_state(&self, since_tick: f32) -> FrameState {
        let rig = self.rig.extrapolate(since_tick);
        let light_angle = wrap_angle(
            self.light_angle,
            self.config.light.angular_velocity * since_tick,
        );
        FrameState {
            focus: rig.focus,
            distance: rig.distance,
            pitch: rig.pitch,
            yaw: rig.yaw,
            light_position: self.config.light.position(light_angle),
            since_tick,
        }
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn rig(&self) -> &OrbitRig {
        &self.rig
    }

    pub fn light_angle(&self) -> f32 {
        self.light_angle
    }

    pub fn time(&self) -> &TimeSource {
        &self.time
    }

    /// Total whole ticks elapsed since start.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn last_sim_time(&self) -> f64 {
        self.last_sim_time
    }

    pub fn last_frame_time(&self) -> f64 {
        self.last_frame_time
    }

    /// Rolling mean of the engine delta in milliseconds.
    pub fn engine_delta_average(&self) -> f64 {
        self.engine_delta.average()
    }
}
