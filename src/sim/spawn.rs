//! Entity spawner
//!
//! A countdown that shortens as the run goes on. Every time it fires, one
//! tire, pedestrian or traffic car enters the road.

use glam::Vec2;
use rand::Rng;

use super::state::{EntityKind, GameEvent, GameState, Pedestrian, Tire, TrafficCar, TrafficDirection};
use crate::Tuning;
use crate::consts::*;

/// Map a uniform roll in `[0, 1)` onto an entity kind
pub fn kind_for_roll(roll: f32, tuning: &Tuning) -> EntityKind {
    if roll < tuning.tire_below {
        EntityKind::Tire
    } else if roll < tuning.pedestrian_below {
        EntityKind::Pedestrian
    } else {
        EntityKind::Traffic
    }
}

/// Advance the spawn countdown by `dt`. Spawns at most one entity.
///
/// The interval is recomputed from the run time first, so it tightens
/// smoothly rather than only after a spawn.
pub fn update_spawner(state: &mut GameState, dt: f32) -> Option<EntityKind> {
    state.spawn_timer += dt;
    state.spawn_interval = state.tuning.spawn_interval_at(state.time);

    if state.spawn_timer >= state.spawn_interval {
        state.spawn_timer = 0.0;
        Some(spawn_entity(state))
    } else {
        None
    }
}

/// Spawn one random entity at the top of the road (or its left shoulder)
pub fn spawn_entity(state: &mut GameState) -> EntityKind {
    let lane = state.rng.random_range(0..LANE_COUNT);
    let lane_x = state.road.lane_spawn_x(lane);
    let roll = state.rng.random::<f32>();
    let kind = kind_for_roll(roll, &state.tuning);
    let id = state.next_entity_id();

    match kind {
        EntityKind::Tire => {
            state.tires.push(Tire {
                id,
                pos: Vec2::new(lane_x, TIRE_SPAWN_Y),
            });
        }
        EntityKind::Pedestrian => {
            let y = state
                .rng
                .random_range(PEDESTRIAN_TOP_INSET..state.tuning.canvas_height - PEDESTRIAN_BOTTOM_INSET);
            let speed = state
                .rng
                .random_range(state.tuning.pedestrian_speed_min..state.tuning.pedestrian_speed_max)
                * state.difficulty;
            state.pedestrians.push(Pedestrian {
                id,
                origin: Vec2::new(state.road.x - PEDESTRIAN_START_OFFSET, y),
                progress: 0.0,
                speed,
            });
        }
        EntityKind::Traffic => {
            let speed = state
                .rng
                .random_range(state.tuning.traffic_speed_min..state.tuning.traffic_speed_max)
                * state.difficulty;
            let direction = if state.rng.random::<f32>() > 0.5 {
                TrafficDirection::Oncoming
            } else {
                TrafficDirection::Same
            };
            state.traffic.push(TrafficCar {
                id,
                pos: Vec2::new(lane_x, TRAFFIC_SPAWN_Y),
                speed,
                direction,
            });
        }
    }

    log::debug!(
        "spawned {:?} #{} at t={:.2} ({} on road)",
        kind,
        id,
        state.time,
        state.entity_count()
    );
    state.push_event(GameEvent::Spawned { id, kind });
    kind
}
