//! Shape generation for 2D primitives
//!
//! Everything is emitted as a plain triangle list in canvas pixel space.

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::Vertex;
use crate::sim::Rect;

/// Two triangles covering an axis-aligned rectangle
pub fn quad(x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) -> [Vertex; 6] {
    let (x1, y1) = (x + w, y + h);
    [
        Vertex::new(x, y, color),
        Vertex::new(x1, y, color),
        Vertex::new(x, y1, color),
        Vertex::new(x, y1, color),
        Vertex::new(x1, y, color),
        Vertex::new(x1, y1, color),
    ]
}

/// Fill a simulation rectangle
pub fn fill_rect(out: &mut Vec<Vertex>, rect: &Rect, color: [f32; 4]) {
    out.extend(quad(rect.pos.x, rect.pos.y, rect.size.x, rect.size.y, color));
}

fn rim_point(center: Vec2, radius: f32, i: u32, segments: u32) -> Vec2 {
    center + Vec2::from_angle(i as f32 / segments as f32 * TAU) * radius
}

/// Filled circle as a triangle fan
pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [f32; 4], segments: u32) {
    out.reserve((segments * 3) as usize);
    for i in 0..segments {
        let a = rim_point(center, radius, i, segments);
        let b = rim_point(center, radius, i + 1, segments);
        out.push(Vertex::new(center.x, center.y, color));
        out.push(Vertex::new(a.x, a.y, color));
        out.push(Vertex::new(b.x, b.y, color));
    }
}

/// Hollow circle band between two radii
pub fn ring(
    out: &mut Vec<Vertex>,
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) {
    out.reserve((segments * 6) as usize);
    for i in 0..segments {
        let inner1 = rim_point(center, inner_radius, i, segments);
        let outer1 = rim_point(center, outer_radius, i, segments);
        let inner2 = rim_point(center, inner_radius, i + 1, segments);
        let outer2 = rim_point(center, outer_radius, i + 1, segments);

        out.push(Vertex::new(inner1.x, inner1.y, color));
        out.push(Vertex::new(outer1.x, outer1.y, color));
        out.push(Vertex::new(inner2.x, inner2.y, color));

        out.push(Vertex::new(inner2.x, inner2.y, color));
        out.push(Vertex::new(outer1.x, outer1.y, color));
        out.push(Vertex::new(outer2.x, outer2.y, color));
    }
}

/// Vertical dashed line of width `thickness` centered on `x`, from `y_start`
/// down to `y_end`
pub fn dashed_vline(
    out: &mut Vec<Vertex>,
    x: f32,
    y_start: f32,
    y_end: f32,
    thickness: f32,
    (dash, gap): (f32, f32),
    color: [f32; 4],
) {
    let pitch = dash + gap;
    if pitch <= 0.0 {
        return;
    }
    let mut y = y_start;
    while y < y_end {
        let len = dash.min(y_end - y);
        out.extend(quad(x - thickness / 2.0, y, thickness, len, color));
        y += pitch;
    }
}
