//! Game state and core simulation types
//!
//! `GameState` is the whole simulation context: the frame driver owns one and
//! hands it to `tick` every frame. Nothing in here touches the platform.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::rect::Rect;
use crate::Tuning;
use crate::consts::*;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Title menu, nothing simulated yet
    Menu,
    /// Active driving
    Running,
    /// Crashed; state frozen until restart
    GameOver,
}

/// What kind of thing was spawned or hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Tire,
    Pedestrian,
    Traffic,
}

/// Travel direction of a traffic vehicle relative to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficDirection {
    /// Driving away from the player; closes slowly
    Same,
    /// Driving toward the player; closes fast
    Oncoming,
}

/// Events for the presentation layer (audio, logging, HUD)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// A new run began
    RunStarted { seed: u64 },
    /// An entity entered the road
    Spawned { id: u32, kind: EntityKind },
    /// The car hit something; `time` is the final survival time
    Crashed { time: f32, kind: EntityKind },
}

/// The road band, split into equal lanes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Road {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Road {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            x: tuning.canvas_width * tuning.road_left_frac,
            y: 0.0,
            width: tuning.canvas_width * tuning.road_width_frac,
            height: tuning.canvas_height,
        }
    }

    #[inline]
    pub fn lane_width(&self) -> f32 {
        self.width / LANE_COUNT as f32
    }

    /// Left edge of a tire-sized entity centered in `lane`
    pub fn lane_spawn_x(&self, lane: u32) -> f32 {
        let lane_width = self.lane_width();
        self.x + lane_width * lane as f32 + lane_width / 2.0 - TIRE_SIZE / 2.0
    }

    /// Lane whose band contains `x` (clamped to the road)
    pub fn lane_at(&self, x: f32) -> u32 {
        let lane = ((x - self.x) / self.lane_width()).floor();
        lane.clamp(0.0, (LANE_COUNT - 1) as f32) as u32
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// The player's car
#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    /// Top-left corner; only x changes during a run
    pub pos: Vec2,
    pub size: Vec2,
    /// Lateral velocity (px/s)
    pub speed_x: f32,
}

impl Car {
    /// A car parked in the middle of the canvas, near the bottom
    pub fn centered(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(
                tuning.canvas_width * 0.5 - CAR_WIDTH / 2.0,
                tuning.canvas_height - CAR_BOTTOM_OFFSET,
            ),
            size: Vec2::new(CAR_WIDTH, CAR_HEIGHT),
            speed_x: 0.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    /// Largest x that keeps the car on the road
    #[inline]
    pub fn max_x(&self, road: &Road) -> f32 {
        road.right() - self.size.x
    }

    /// Pin the car inside the road band
    pub fn clamp_to(&mut self, road: &Road) {
        self.pos.x = self.pos.x.clamp(road.x, self.max_x(road));
    }
}

/// A static tire lying in a lane
#[derive(Debug, Clone, PartialEq)]
pub struct Tire {
    pub id: u32,
    pub pos: Vec2,
}

impl Tire {
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, Vec2::splat(TIRE_SIZE))
    }
}

/// Someone crossing the road left to right
#[derive(Debug, Clone, PartialEq)]
pub struct Pedestrian {
    pub id: u32,
    /// Where the crossing started (left of the road)
    pub origin: Vec2,
    /// Distance walked so far
    pub progress: f32,
    /// Walking speed (px/s), already scaled by difficulty
    pub speed: f32,
}

impl Pedestrian {
    pub fn pos(&self) -> Vec2 {
        self.origin + Vec2::new(self.progress, 0.0)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos(), Vec2::new(PEDESTRIAN_WIDTH, PEDESTRIAN_HEIGHT))
    }
}

/// Another car in one of the lanes
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficCar {
    pub id: u32,
    pub pos: Vec2,
    /// Own speed (px/s), already scaled by difficulty
    pub speed: f32,
    pub direction: TrafficDirection,
}

impl TrafficCar {
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, Vec2::new(TRAFFIC_WIDTH, TRAFFIC_HEIGHT))
    }

    /// Share of `speed` added to the road scroll each frame
    pub fn closing_factor(&self, tuning: &Tuning) -> f32 {
        match self.direction {
            TrafficDirection::Same => tuning.same_direction_factor,
            TrafficDirection::Oncoming => 1.0,
        }
    }
}

/// Complete simulation context
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub road: Road,
    pub car: Car,
    pub phase: GamePhase,
    /// Seconds survived this run
    pub time: f32,
    /// Current forward (scroll) speed, px/s
    pub speed: f32,
    /// Speed the car is easing toward this frame
    pub target_speed: f32,
    pub difficulty: f32,
    pub spawn_timer: f32,
    pub spawn_interval: f32,
    pub tires: Vec<Tire>,
    pub pedestrians: Vec<Pedestrian>,
    pub traffic: Vec<TrafficCar>,
    /// Survival time recorded at the moment of the crash
    pub final_time: Option<f32>,
    /// Seed of the current run
    pub seed: u64,
    pub(crate) rng: Pcg32,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// A fresh context sitting at the menu
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let road = Road::from_tuning(&tuning);
        let car = Car::centered(&tuning);
        let mut state = Self {
            road,
            car,
            phase: GamePhase::Menu,
            time: 0.0,
            speed: 0.0,
            target_speed: 0.0,
            difficulty: 1.0,
            spawn_timer: 0.0,
            spawn_interval: 0.0,
            tires: Vec::new(),
            pedestrians: Vec::new(),
            traffic: Vec::new(),
            final_time: None,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            next_id: 1,
            tuning,
        };
        state.reset(seed);
        state
    }

    /// Put every run-scoped value back to its starting point. Leaves `phase` alone.
    pub fn reset(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        self.road = Road::from_tuning(&self.tuning);
        self.car = Car::centered(&self.tuning);
        self.time = 0.0;
        self.speed = self.tuning.base_speed;
        self.target_speed = self.tuning.base_speed;
        self.difficulty = self.tuning.difficulty_at(0.0);
        self.spawn_timer = 0.0;
        self.spawn_interval = self.tuning.spawn_interval_at(0.0);
        self.tires.clear();
        self.pedestrians.clear();
        self.traffic.clear();
        self.final_time = None;
        self.next_id = 1;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Number of live transient entities
    pub fn entity_count(&self) -> usize {
        self.tires.len() + self.pedestrians.len() + self.traffic.len()
    }

    /// Engine pitch ratio fed to the audio layer
    pub fn engine_ratio(&self) -> f32 {
        self.speed / self.target_speed.max(ENGINE_RATIO_FLOOR)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = GameState::new(1, Tuning::default());
        assert_eq!(state.phase, GamePhase::Menu);
        assert_eq!(state.time, 0.0);
        assert_eq!(state.speed, 240.0);
        assert_eq!(state.difficulty, 1.0);
        assert_eq!(state.spawn_interval, 1.4);
        assert_eq!(state.entity_count(), 0);
    }

    #[test]
    fn test_road_geometry() {
        let road = Road::from_tuning(&Tuning::default());
        assert_eq!(road.x, 120.0);
        assert_eq!(road.width, 240.0);
        assert_eq!(road.lane_width(), 80.0);
        // Lane 0 centered tire: 120 + 40 - 18
        assert_eq!(road.lane_spawn_x(0), 142.0);
        assert_eq!(road.lane_spawn_x(2), 302.0);
        assert_eq!(road.lane_at(121.0), 0);
        assert_eq!(road.lane_at(200.0), 1);
        assert_eq!(road.lane_at(10_000.0), 2);
        assert_eq!(road.lane_at(-10.0), 0);
    }

    #[test]
    fn test_car_starts_centered_and_clamps() {
        let tuning = Tuning::default();
        let road = Road::from_tuning(&tuning);
        let mut car = Car::centered(&tuning);
        assert_eq!(car.pos, Vec2::new(220.0, 600.0));

        car.pos.x = -50.0;
        car.clamp_to(&road);
        assert_eq!(car.pos.x, road.x);

        car.pos.x = 9_999.0;
        car.clamp_to(&road);
        assert_eq!(car.pos.x, road.right() - CAR_WIDTH);
    }

    #[test]
    fn test_pedestrian_rect_follows_progress() {
        let p = Pedestrian {
            id: 1,
            origin: Vec2::new(60.0, 300.0),
            progress: 25.0,
            speed: 40.0,
        };
        assert_eq!(p.rect(), Rect::new(85.0, 300.0, PEDESTRIAN_WIDTH, PEDESTRIAN_HEIGHT));
    }

    #[test]
    fn test_engine_ratio_floor() {
        let mut state = GameState::new(1, Tuning::default());
        state.speed = 120.0;
        state.target_speed = 120.0;
        assert!((state.engine_ratio() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_drain_events_empties_queue() {
        let mut state = GameState::new(1, Tuning::default());
        state.push_event(GameEvent::RunStarted { seed: 1 });
        assert_eq!(state.drain_events().len(), 1);
        assert!(state.drain_events().is_empty());
    }
}
