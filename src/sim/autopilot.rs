//! Demo driver
//!
//! Produces a `TickInput` from the current state the same way a player would:
//! look up the road, pick the lane with the most room, steer toward it, and
//! brake when boxed in. Drives the native headless run.

use super::rect::Rect;
use super::state::GameState;
use super::tick::TickInput;
use crate::consts::*;

/// How far above the car the driver looks for threats (px)
const LOOKAHEAD: f32 = 360.0;
/// Lateral distance from the lane center treated as "there"
const LANE_DEADBAND: f32 = 4.0;
/// Clearance below which the driver brakes if it can't change lanes
const BRAKE_CLEARANCE: f32 = 140.0;

/// Free distance ahead of the car in `lane`, up to `LOOKAHEAD`
fn lane_clearance(state: &GameState, lane: u32) -> f32 {
    let road = &state.road;
    let car = state.car.rect();
    let band = Rect::new(
        road.x + road.lane_width() * lane as f32,
        car.top() - LOOKAHEAD,
        road.lane_width(),
        LOOKAHEAD + car.size.y,
    );

    let obstacles = state
        .tires
        .iter()
        .map(|t| t.rect())
        .chain(state.traffic.iter().map(|t| t.rect()))
        .chain(state.pedestrians.iter().map(|p| p.rect()));

    obstacles
        .filter(|r| r.overlaps(&band))
        .map(|r| (car.top() - r.bottom()).max(0.0))
        .fold(LOOKAHEAD, f32::min)
}

/// Choose controls for the next frame
pub fn drive(state: &GameState) -> TickInput {
    let road = &state.road;
    let car = state.car.rect();
    let current = road.lane_at(car.center().x);

    // Most room wins; ties go to the lane we're already in, then the nearest
    let (lane, clearance) = (0..LANE_COUNT)
        .map(|lane| (lane, lane_clearance(state, lane)))
        .max_by(|(la, ca), (lb, cb)| {
            ca.partial_cmp(cb)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| (*la == current).cmp(&(*lb == current)))
                .then_with(|| lb.abs_diff(current).cmp(&la.abs_diff(current)))
        })
        .unwrap_or((current, LOOKAHEAD));

    let target_x = road.x + road.lane_width() * (lane as f32 + 0.5) - car.size.x / 2.0;
    let offset = target_x - car.left();

    let boxed_in = clearance < BRAKE_CLEARANCE;
    TickInput {
        left: offset < -LANE_DEADBAND,
        right: offset > LANE_DEADBAND,
        accelerate: !boxed_in && clearance >= LOOKAHEAD,
        brake: boxed_in,
    }
}
