//! Lane Rush - a three-lane arcade driving game
//!
//! Core modules:
//! - `sim`: Simulation step (spawning, movement, collision, run lifecycle)
//! - `tuning`: Data-driven game balance
//! - `input`: Held-key tracking
//! - `clock`: Frame delta clamping
//! - `hud`: HUD text and panel visibility
//! - `audio`: Procedural engine/music parameters and Web Audio playback
//! - `renderer`: Scene tessellation and WebGPU pipeline

pub mod audio;
pub mod clock;
pub mod hud;
pub mod input;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Upper bound on a single frame's delta (seconds). Keeps a backgrounded
    /// tab from teleporting everything on return.
    pub const MAX_FRAME_DT: f32 = 0.033;
    /// Step used by the headless demo run
    pub const DEMO_DT: f32 = 1.0 / 60.0;

    /// Number of lanes the road is split into
    pub const LANE_COUNT: u32 = 3;

    /// Player car footprint
    pub const CAR_WIDTH: f32 = 40.0;
    pub const CAR_HEIGHT: f32 = 70.0;
    /// Distance from the bottom of the canvas to the car's top edge
    pub const CAR_BOTTOM_OFFSET: f32 = 120.0;

    /// Tire footprint; lane x positions are centered for this width
    pub const TIRE_SIZE: f32 = 36.0;
    pub const TIRE_SPAWN_Y: f32 = -60.0;
    pub const TIRE_EXIT_MARGIN: f32 = 80.0;

    pub const PEDESTRIAN_WIDTH: f32 = 26.0;
    pub const PEDESTRIAN_HEIGHT: f32 = 36.0;
    /// Pedestrians start this far left of the road
    pub const PEDESTRIAN_START_OFFSET: f32 = 60.0;
    /// Pedestrians are purged once they have walked road width + this margin
    pub const PEDESTRIAN_EXIT_MARGIN: f32 = 120.0;
    /// Vertical band pedestrians cross in (top inset, bottom inset)
    pub const PEDESTRIAN_TOP_INSET: f32 = 120.0;
    pub const PEDESTRIAN_BOTTOM_INSET: f32 = 200.0;

    pub const TRAFFIC_WIDTH: f32 = 40.0;
    pub const TRAFFIC_HEIGHT: f32 = 70.0;
    pub const TRAFFIC_SPAWN_Y: f32 = -80.0;
    pub const TRAFFIC_EXIT_MARGIN: f32 = 120.0;

    /// Floor for the target speed used in the engine pitch ratio
    pub const ENGINE_RATIO_FLOOR: f32 = 160.0;
}

/// Move `current` toward `target` with exponential smoothing at `rate` per second.
///
/// Equivalent to `current += (target - current) * rate * dt` for small `dt`,
/// but never overshoots and does not depend on frame rate.
#[inline]
pub fn approach(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let t = 1.0 - (-rate * dt).exp();
    current + (target - current) * t
}

/// Damping factor for `dt` seconds, given a per-frame factor tuned at `reference_hz`
#[inline]
pub fn frame_damping(per_frame: f32, reference_hz: f32, dt: f32) -> f32 {
    per_frame.powf(dt * reference_hz)
}
