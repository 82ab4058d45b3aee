//! Data-driven game balance
//!
//! Every gameplay number lives here so a build can be rebalanced from JSON
//! without touching the simulation. Missing fields fall back to defaults.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{CAR_WIDTH, PEDESTRIAN_BOTTOM_INSET, PEDESTRIAN_TOP_INSET};

/// Why a tuning override was refused
#[derive(Debug)]
pub enum TuningError {
    /// Not valid JSON for `Tuning`
    Parse(serde_json::Error),
    /// Parsed, but the numbers can't drive a game
    Invalid(&'static str),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Parse(e) => write!(f, "bad tuning JSON: {}", e),
            TuningError::Invalid(why) => write!(f, "invalid tuning: {}", why),
        }
    }
}

impl std::error::Error for TuningError {}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        TuningError::Parse(e)
    }
}

/// Gameplay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Play area ===
    /// Logical canvas size in pixels
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Road band as a fraction of canvas width
    pub road_left_frac: f32,
    pub road_width_frac: f32,

    // === Forward speed ===
    /// Scroll speed at time 0 (px/s)
    pub base_speed: f32,
    /// Baseline speed gained per second survived
    pub speed_gain_per_sec: f32,
    pub accelerate_boost: f32,
    pub brake_penalty: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Exponential smoothing rate toward target speed (1/s)
    pub speed_response: f32,

    // === Steering ===
    /// Lateral acceleration (px/s²)
    pub lateral_accel: f32,
    /// Steering authority while braking
    pub brake_steer_factor: f32,
    /// Velocity kept per frame at `damping_reference_hz`
    pub lateral_damping: f32,
    pub damping_reference_hz: f32,

    // === Difficulty ===
    /// Seconds for difficulty to gain +1.0
    pub difficulty_ramp_secs: f32,
    pub spawn_interval_start: f32,
    pub spawn_interval_floor: f32,
    /// Seconds for the spawn interval to shrink by 1.0
    pub spawn_interval_ramp_secs: f32,

    // === Spawn mix ===
    /// Kind roll in `[0, 1)`: below this spawns a tire
    pub tire_below: f32,
    /// Below this (and not a tire) spawns a pedestrian; the rest is traffic
    pub pedestrian_below: f32,
    pub pedestrian_speed_min: f32,
    pub pedestrian_speed_max: f32,
    pub traffic_speed_min: f32,
    pub traffic_speed_max: f32,
    /// Share of its own speed that same-direction traffic adds to the scroll
    /// (oncoming traffic adds all of it)
    pub same_direction_factor: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            canvas_width: 480.0,
            canvas_height: 720.0,
            road_left_frac: 0.25,
            road_width_frac: 0.5,

            base_speed: 240.0,
            speed_gain_per_sec: 6.0,
            accelerate_boost: 120.0,
            brake_penalty: 120.0,
            min_speed: 120.0,
            max_speed: 520.0,
            speed_response: 3.0,

            lateral_accel: 520.0,
            brake_steer_factor: 0.7,
            lateral_damping: 0.88,
            damping_reference_hz: 60.0,

            difficulty_ramp_secs: 20.0,
            spawn_interval_start: 1.4,
            spawn_interval_floor: 0.55,
            spawn_interval_ramp_secs: 50.0,

            tire_below: 0.4,
            pedestrian_below: 0.7,
            pedestrian_speed_min: 30.0,
            pedestrian_speed_max: 60.0,
            traffic_speed_min: 100.0,
            traffic_speed_max: 200.0,
            same_direction_factor: 0.7,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override and check it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject combinations the simulation can't run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let invalid = |why| Err(TuningError::Invalid(why));

        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            return invalid("canvas must have a positive size");
        }
        if self.road_left_frac < 0.0 || self.road_left_frac + self.road_width_frac > 1.0 {
            return invalid("road must lie inside the canvas");
        }
        if !(self.canvas_width * self.road_width_frac >= CAR_WIDTH) {
            return invalid("road is narrower than the car");
        }
        if !(self.canvas_height - PEDESTRIAN_BOTTOM_INSET > PEDESTRIAN_TOP_INSET) {
            return invalid("canvas too short for pedestrian crossings");
        }
        if !(self.min_speed <= self.max_speed) {
            return invalid("min_speed is above max_speed");
        }
        if !(self.difficulty_ramp_secs > 0.0) {
            return invalid("difficulty_ramp_secs must be positive");
        }
        if !(self.spawn_interval_ramp_secs > 0.0) {
            return invalid("spawn_interval_ramp_secs must be positive");
        }
        if !(self.spawn_interval_floor > 0.0) {
            return invalid("spawn_interval_floor must be positive");
        }
        if !(0.0 <= self.tire_below
            && self.tire_below <= self.pedestrian_below
            && self.pedestrian_below <= 1.0)
        {
            return invalid("spawn thresholds must rise within [0, 1]");
        }
        if !(self.pedestrian_speed_min < self.pedestrian_speed_max) {
            return invalid("pedestrian speed range is empty");
        }
        if !(self.traffic_speed_min < self.traffic_speed_max) {
            return invalid("traffic speed range is empty");
        }
        Ok(())
    }

    /// Difficulty multiplier after `time` seconds. Never decreases.
    pub fn difficulty_at(&self, time: f32) -> f32 {
        1.0 + time.max(0.0) / self.difficulty_ramp_secs
    }

    /// Seconds between spawns after `time` seconds. Never increases, floored.
    pub fn spawn_interval_at(&self, time: f32) -> f32 {
        (self.spawn_interval_start - time.max(0.0) / self.spawn_interval_ramp_secs)
            .max(self.spawn_interval_floor)
    }

    /// Cruise speed with no pedal input
    pub fn baseline_speed_at(&self, time: f32) -> f32 {
        self.base_speed + time.max(0.0) * self.speed_gain_per_sec
    }

    /// Speed the car eases toward given the pedal state
    pub fn target_speed(&self, time: f32, accelerate: bool, brake: bool) -> f32 {
        let mut target = self.baseline_speed_at(time);
        if accelerate {
            target += self.accelerate_boost;
        }
        if brake {
            target -= self.brake_penalty;
        }
        target.clamp(self.min_speed, self.max_speed)
    }
}
