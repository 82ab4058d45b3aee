//! Per-frame simulation step
//!
//! Advances a running game by one (clamped) frame delta: speed and steering,
//! spawning, scrolling, purging, then collision. Also owns the run lifecycle
//! transitions.

use super::spawn::update_spawner;
use super::state::{EntityKind, GameEvent, GamePhase, GameState};
use crate::consts::*;
use crate::{approach, frame_damping};

/// Controls held during a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub accelerate: bool,
    pub brake: bool,
}

impl TickInput {
    /// -1 (left), 0, or +1 (right)
    pub fn steer(&self) -> f32 {
        (self.right as i8 - self.left as i8) as f32
    }
}

/// Begin a new run from the menu or after a crash.
///
/// Returns false (and changes nothing) if a run is already in progress.
pub fn start_run(state: &mut GameState, seed: u64) -> bool {
    if state.phase == GamePhase::Running {
        return false;
    }

    let from = state.phase;
    state.reset(seed);
    state.phase = GamePhase::Running;
    state.push_event(GameEvent::RunStarted { seed });
    log::info!("Run started from {:?} with seed {}", from, seed);
    true
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.phase != GamePhase::Running {
        return;
    }

    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    };

    state.time += dt;
    state.difficulty = state.tuning.difficulty_at(state.time);

    update_speed(state, input, dt);
    steer_car(state, input, dt);
    update_spawner(state, dt);
    scroll_entities(state, dt);
    purge_offscreen(state);

    if let Some(kind) = first_collision(state) {
        crash(state, kind);
    }
}

/// Ease forward speed toward the pedal-adjusted target
fn update_speed(state: &mut GameState, input: &TickInput, dt: f32) {
    let tuning = &state.tuning;
    let target = tuning.target_speed(state.time, input.accelerate, input.brake);
    state.target_speed = target;
    state.speed = approach(state.speed, target, tuning.speed_response, dt);
}

/// Lateral acceleration, damping, integration and road clamp
fn steer_car(state: &mut GameState, input: &TickInput, dt: f32) {
    let tuning = &state.tuning;
    let accel = if input.brake {
        tuning.lateral_accel * tuning.brake_steer_factor
    } else {
        tuning.lateral_accel
    };
    let damping = frame_damping(tuning.lateral_damping, tuning.damping_reference_hz, dt);

    let car = &mut state.car;
    car.speed_x += input.steer() * accel * dt;
    car.speed_x *= damping;
    car.pos.x += car.speed_x * dt;
    car.clamp_to(&state.road);
}

fn scroll_entities(state: &mut GameState, dt: f32) {
    let scroll = state.speed * dt;

    for tire in &mut state.tires {
        tire.pos.y += scroll;
    }

    for car in &mut state.traffic {
        car.pos.y += scroll + car.speed * dt * car.closing_factor(&state.tuning);
    }

    for p in &mut state.pedestrians {
        p.progress += p.speed * dt;
    }
}

/// Drop everything that has left the screen
fn purge_offscreen(state: &mut GameState) {
    let height = state.tuning.canvas_height;
    let crossing = state.road.width + PEDESTRIAN_EXIT_MARGIN;

    state.tires.retain(|t| t.pos.y < height + TIRE_EXIT_MARGIN);
    state.traffic.retain(|t| t.pos.y < height + TRAFFIC_EXIT_MARGIN);
    state.pedestrians.retain(|p| p.progress < crossing);
}

/// First entity overlapping the car, checked tires, traffic, then pedestrians
fn first_collision(state: &GameState) -> Option<EntityKind> {
    let car = state.car.rect();

    if state.tires.iter().any(|t| car.overlaps(&t.rect())) {
        return Some(EntityKind::Tire);
    }
    if state.traffic.iter().any(|t| car.overlaps(&t.rect())) {
        return Some(EntityKind::Traffic);
    }
    if state.pedestrians.iter().any(|p| car.overlaps(&p.rect())) {
        return Some(EntityKind::Pedestrian);
    }
    None
}

fn crash(state: &mut GameState, kind: EntityKind) {
    state.phase = GamePhase::GameOver;
    state.final_time = Some(state.time);
    state.push_event(GameEvent::Crashed {
        time: state.time,
        kind,
    });
    log::info!("Crashed into {:?} after {:.1}s", kind, state.time);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use crate::sim::state::{Pedestrian, Tire, TrafficCar, TrafficDirection};
    use glam::Vec2;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn running(seed: u64) -> GameState {
        let mut state = GameState::new(seed, Tuning::default());
        assert!(start_run(&mut state, seed));
        state.drain_events();
        state
    }

    #[test]
    fn test_menu_tick_does_nothing() {
        let mut state = GameState::new(1, Tuning::default());
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::Menu);
        assert_eq!(state.time, 0.0);
    }

    #[test]
    fn test_start_run_from_menu() {
        let mut state = GameState::new(1, Tuning::default());
        assert!(start_run(&mut state, 99));
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.seed, 99);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::RunStarted { seed: 99 }]
        );
    }

    #[test]
    fn test_start_run_while_running_is_rejected() {
        let mut state = running(1);
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), DT);
        }
        let time = state.time;
        assert!(!start_run(&mut state, 2));
        assert_eq!(state.time, time);
    }

    #[test]
    fn test_time_zero_scenario() {
        let state = running(5);
        assert_eq!(state.time, 0.0);
        assert_eq!(state.speed, 240.0);
        assert_eq!(state.difficulty, 1.0);
        assert_eq!(state.entity_count(), 0);
    }

    #[test]
    fn test_restart_after_crash_resets_everything() {
        let mut state = running(5);
        for _ in 0..200 {
            tick(&mut state, &TickInput::default(), DT);
        }
        let car_y = state.car.pos.y;
        state.tires.push(Tire {
            id: 999,
            pos: Vec2::new(state.car.pos.x, car_y),
        });
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::GameOver);

        assert!(start_run(&mut state, 6));
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.time, 0.0);
        assert_eq!(state.speed, 240.0);
        assert_eq!(state.difficulty, 1.0);
        assert_eq!(state.spawn_timer, 0.0);
        assert_eq!(state.spawn_interval, 1.4);
        assert!(state.tires.is_empty());
        assert!(state.pedestrians.is_empty());
        assert!(state.traffic.is_empty());
        assert_eq!(state.final_time, None);
        assert_eq!(state.car.speed_x, 0.0);
        assert_eq!(state.car.pos.x, 220.0);
    }

    #[test]
    fn test_car_containing_tire_ends_run_and_freezes() {
        let mut state = running(11);
        // Tire entirely inside the car rect after this frame's scroll
        let car = state.car.rect();
        state.tires.push(Tire {
            id: 500,
            pos: Vec2::new(car.left() + 2.0, car.top() + 10.0),
        });
        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(!state.is_running());
        let final_time = state.final_time.expect("final time recorded");
        assert!((final_time - DT).abs() < 1e-6);
        assert!(state.drain_events().iter().any(|e| matches!(
            e,
            GameEvent::Crashed { kind: EntityKind::Tire, .. }
        )));

        // Frozen: further ticks change nothing
        let snapshot = (state.time, state.speed, state.car.pos, state.tires.clone());
        for _ in 0..10 {
            tick(&mut state, &TickInput { right: true, ..Default::default() }, DT);
        }
        assert_eq!(snapshot, (state.time, state.speed, state.car.pos, state.tires.clone()));
    }

    #[test]
    fn test_traffic_collision() {
        let mut state = running(12);
        let car = state.car.rect();
        state.traffic.push(TrafficCar {
            id: 1,
            pos: Vec2::new(car.left(), car.top() - TRAFFIC_HEIGHT + 5.0),
            speed: 150.0,
            direction: TrafficDirection::Same,
        });
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_pedestrian_collision_uses_walked_position() {
        let mut state = running(13);
        let car = state.car.rect();
        // Origin far to the left, but progress carries it onto the car
        state.pedestrians.push(Pedestrian {
            id: 1,
            origin: Vec2::new(car.left() - 100.0, car.top() + 5.0),
            progress: 95.0,
            speed: 40.0,
        });
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.drain_events().iter().any(|e| matches!(
            e,
            GameEvent::Crashed { kind: EntityKind::Pedestrian, .. }
        )));
    }

    #[test]
    fn test_near_miss_keeps_running() {
        let mut state = running(14);
        let car = state.car.rect();
        // One lane over
        state.tires.push(Tire {
            id: 1,
            pos: Vec2::new(car.right() + 30.0, car.top()),
        });
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_offscreen_entities_are_purged() {
        let mut state = running(15);
        let h = state.tuning.canvas_height;
        let far_left = Vec2::new(0.0, 0.0);
        state.tires.push(Tire {
            id: 1,
            pos: Vec2::new(far_left.x, h + TIRE_EXIT_MARGIN - 0.1),
        });
        state.traffic.push(TrafficCar {
            id: 2,
            pos: Vec2::new(far_left.x, h + TRAFFIC_EXIT_MARGIN - 0.1),
            speed: 100.0,
            direction: TrafficDirection::Oncoming,
        });
        state.pedestrians.push(Pedestrian {
            id: 3,
            origin: Vec2::new(0.0, 100.0),
            progress: state.road.width + PEDESTRIAN_EXIT_MARGIN - 0.1,
            speed: 60.0,
        });
        tick(&mut state, &TickInput::default(), DT);
        assert!(state.tires.iter().all(|t| t.id != 1));
        assert!(state.traffic.iter().all(|t| t.id != 2));
        assert!(state.pedestrians.iter().all(|p| p.id != 3));
    }

    #[test]
    fn test_oncoming_traffic_closes_faster() {
        let mut state = running(16);
        let mk = |id, direction| TrafficCar {
            id,
            pos: Vec2::new(0.0, 0.0),
            speed: 100.0,
            direction,
        };
        state.traffic.push(mk(1, TrafficDirection::Same));
        state.traffic.push(mk(2, TrafficDirection::Oncoming));
        tick(&mut state, &TickInput::default(), DT);
        let same = state.traffic.iter().find(|t| t.id == 1).unwrap().pos.y;
        let oncoming = state.traffic.iter().find(|t| t.id == 2).unwrap().pos.y;
        assert!(oncoming > same);
        // Scroll alone is about 240/60 = 4 px; same-direction adds 70/60
        assert!((same - (state.speed * DT + 100.0 * DT * 0.7)).abs() < 1e-4);
        assert!((oncoming - (state.speed * DT + 100.0 * DT)).abs() < 1e-4);
    }

    #[test]
    fn test_pedals_move_speed_toward_target() {
        let mut accel = running(17);
        let mut brake = running(17);
        for _ in 0..60 {
            tick(&mut accel, &TickInput { accelerate: true, ..Default::default() }, DT);
            tick(&mut brake, &TickInput { brake: true, ..Default::default() }, DT);
        }
        assert!(accel.speed > 300.0 && accel.speed < accel.target_speed);
        assert!(brake.speed < 200.0 && brake.speed > brake.target_speed);
        assert!(accel.engine_ratio() < 1.0);
    }

    #[test]
    fn test_holding_right_pins_car_to_edge() {
        let mut state = running(18);
        let start = state.car.pos.x;
        for _ in 0..120 {
            tick(&mut state, &TickInput { right: true, ..Default::default() }, DT);
        }
        assert!(state.car.pos.x > start);
        assert!(state.car.pos.x <= state.car.max_x(&state.road));
        assert!(state.car.speed_x > 0.0);
    }

    #[test]
    fn test_large_delta_is_clamped() {
        let mut state = running(19);
        tick(&mut state, &TickInput::default(), 5.0);
        assert!((state.time - MAX_FRAME_DT).abs() < 1e-6);
        tick(&mut state, &TickInput::default(), -1.0);
        assert!((state.time - MAX_FRAME_DT).abs() < 1e-6);
        tick(&mut state, &TickInput::default(), f32::NAN);
        assert!((state.time - MAX_FRAME_DT).abs() < 1e-6);
    }

    #[test]
    fn test_tightest_valid_tuning_drives() {
        // Road exactly one car wide, no speed range to pick from
        let tuning = Tuning {
            canvas_width: 400.0,
            road_left_frac: 0.45,
            road_width_frac: 0.1,
            min_speed: 300.0,
            max_speed: 300.0,
            ..Tuning::default()
        };
        tuning.validate().unwrap();

        let mut state = GameState::new(5, tuning);
        assert!(start_run(&mut state, 5));
        let inputs = [
            TickInput { left: true, accelerate: true, ..Default::default() },
            TickInput { right: true, brake: true, ..Default::default() },
        ];
        for i in 0..600 {
            tick(&mut state, &inputs[(i / 30) % 2], DT);
        }
        assert!((state.car.pos.x - state.road.x).abs() < 1e-3);
        assert_eq!(state.target_speed, 300.0);
    }

    #[test]
    fn test_determinism() {
        let mut a = running(4242);
        let mut b = running(4242);
        let inputs = [
            TickInput { left: true, ..Default::default() },
            TickInput { accelerate: true, ..Default::default() },
            TickInput { right: true, brake: true, ..Default::default() },
            TickInput::default(),
        ];
        for i in 0..900 {
            let input = inputs[(i / 50) % inputs.len()];
            tick(&mut a, &input, DT);
            tick(&mut b, &input, DT);
        }
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.time, b.time);
        assert_eq!(a.car, b.car);
        assert_eq!(a.tires, b.tires);
        assert_eq!(a.pedestrians, b.pedestrians);
        assert_eq!(a.traffic, b.traffic);
    }

    fn input_strategy() -> impl Strategy<Value = TickInput> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(left, right, accelerate, brake)| TickInput {
                left,
                right,
                accelerate,
                brake,
            },
        )
    }

    proptest! {
        #[test]
        fn prop_car_stays_on_road_and_entities_are_bounded(
            seed in any::<u64>(),
            frames in prop::collection::vec((input_strategy(), 0.0f32..0.05), 1..400),
        ) {
            let mut state = running(seed);
            let h = state.tuning.canvas_height;
            let crossing = state.road.width + PEDESTRIAN_EXIT_MARGIN;
            for (input, dt) in frames {
                tick(&mut state, &input, dt);
                let x = state.car.pos.x;
                prop_assert!(x >= state.road.x);
                prop_assert!(x <= state.road.right() - state.car.size.x);
                prop_assert!(state.tires.iter().all(|t| t.pos.y < h + TIRE_EXIT_MARGIN));
                prop_assert!(state.traffic.iter().all(|t| t.pos.y < h + TRAFFIC_EXIT_MARGIN));
                prop_assert!(state.pedestrians.iter().all(|p| p.progress < crossing));
                if !state.is_running() {
                    break;
                }
            }
        }
    }
}
