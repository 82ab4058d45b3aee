//! Scene tessellation
//!
//! Turns a `GameState` into one triangle list in canvas pixels, painted
//! back to front. No GPU types in here so it runs under plain `cargo test`.

use glam::Vec2;

use super::shapes::{circle, dashed_vline, fill_rect, quad, ring};
use super::vertex::{Vertex, colors};
use crate::sim::{GameState, Rect};

const TREES_PER_SIDE: u32 = 18;
const TREE_PITCH: f32 = 80.0;
const TREE_SCROLL_SPEED: f32 = 200.0;
/// Trees sit this far outside the road edges
const TREE_OFFSET: f32 = 50.0;
const TREE_RADIUS: f32 = 18.0;

const LINE_WIDTH: f32 = 4.0;
const LINE_DASH: (f32, f32) = (30.0, 24.0);
const LINE_SCROLL_SPEED: f32 = 260.0;
const LINE_PHASE: f32 = 60.0;
/// How far past the canvas the center line extends
const LINE_OVERDRAW: f32 = 50.0;

const TIRE_RADIUS: f32 = 18.0;
const TIRE_RIM_WIDTH: f32 = 4.0;
const CIRCLE_SEGMENTS: u32 = 16;

/// Build the full frame
pub fn build_scene(state: &GameState) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(4096);
    let width = state.tuning.canvas_width;
    let height = state.tuning.canvas_height;
    let road = &state.road;

    out.extend(quad(0.0, 0.0, width, height, colors::BACKGROUND));
    out.extend(quad(0.0, 0.0, road.x, height, colors::SHOULDER));
    out.extend(quad(road.right(), 0.0, road.x, height, colors::SHOULDER));

    let scroll = (state.time * TREE_SCROLL_SPEED) % TREE_PITCH;
    for i in 0..TREES_PER_SIDE {
        let y = (i as f32 * TREE_PITCH + scroll) % height;
        tree(&mut out, Vec2::new(road.x - TREE_OFFSET, y));
        tree(&mut out, Vec2::new(road.right() + TREE_OFFSET, y + 40.0));
    }

    out.extend(quad(road.x, road.y, road.width, road.height, colors::ROAD));

    let line_start = -LINE_OVERDRAW + (state.time * LINE_SCROLL_SPEED) % LINE_PHASE;
    dashed_vline(
        &mut out,
        width / 2.0,
        line_start,
        height + LINE_OVERDRAW,
        LINE_WIDTH,
        LINE_DASH,
        colors::CENTER_LINE,
    );

    for t in &state.tires {
        let center = t.rect().center();
        circle(&mut out, center, TIRE_RADIUS, colors::TIRE, CIRCLE_SEGMENTS);
        ring(
            &mut out,
            center,
            TIRE_RADIUS - TIRE_RIM_WIDTH / 2.0,
            TIRE_RADIUS + TIRE_RIM_WIDTH / 2.0,
            colors::TIRE_RIM,
            CIRCLE_SEGMENTS,
        );
    }

    for p in &state.pedestrians {
        let body = p.rect();
        fill_rect(&mut out, &body, colors::PEDESTRIAN);
        out.extend(quad(
            body.left() + 4.0,
            body.top() + 6.0,
            body.size.x - 8.0,
            8.0,
            colors::VISOR,
        ));
    }

    for t in &state.traffic {
        car(&mut out, &t.rect(), colors::TRAFFIC);
    }

    car(&mut out, &state.car.rect(), colors::PLAYER);

    out
}

fn tree(out: &mut Vec<Vertex>, at: Vec2) {
    circle(out, at, TREE_RADIUS, colors::TREE_CANOPY, CIRCLE_SEGMENTS);
    out.extend(quad(at.x - 4.0, at.y + 10.0, 8.0, 22.0, colors::TREE_TRUNK));
}

/// Body, front and rear windows, roof
fn car(out: &mut Vec<Vertex>, body: &Rect, color: [f32; 4]) {
    let (x, y) = (body.left(), body.top());
    let (w, h) = (body.size.x, body.size.y);
    fill_rect(out, body, color);
    out.extend(quad(x + 6.0, y + 10.0, w - 12.0, 16.0, colors::WINDOW));
    out.extend(quad(x + 6.0, y + h - 26.0, w - 12.0, 16.0, colors::WINDOW));
    out.extend(quad(x + 6.0, y + 30.0, w - 12.0, 12.0, colors::ROOF));
}
