//! Simulation module
//!
//! All gameplay logic lives here. This module must stay platform-free:
//! - Clamped frame delta in, state out
//! - Seeded RNG only (same seed + same inputs = same run)
//! - No rendering, audio or DOM dependencies

pub mod autopilot;
pub mod rect;
pub mod spawn;
pub mod state;
pub mod tick;

pub use rect::Rect;
pub use state::{
    Car, EntityKind, GameEvent, GamePhase, GameState, Pedestrian, Road, Tire, TrafficCar,
    TrafficDirection,
};
pub use tick::{TickInput, start_run, tick};
