//! Triangle tessellation for 2D primitives
//!
//! Every function appends a triangle list to `out`.

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::Vertex;
use crate::sim::Color;

/// Segment count for a circle of the given radius
pub fn segments_for(radius: f32) -> u32 {
    ((radius * 1.5) as u32).clamp(8, 48)
}

fn rim(center: Vec2, radius: f32, i: u32, segments: u32) -> Vec2 {
    center + Vec2::from_angle(i as f32 / segments as f32 * TAU) * radius
}

/// Filled circle as a triangle fan
pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: Color, segments: u32) {
    if radius <= 0.0 || segments < 3 {
        return;
    }
    out.reserve((segments * 3) as usize);
    for i in 0..segments {
        out.push(Vertex::new(center, color));
        out.push(Vertex::new(rim(center, radius, i, segments), color));
        out.push(Vertex::new(rim(center, radius, i + 1, segments), color));
    }
}

/// Filled circle whose color fades from `inner` at the center to `outer` at the rim
pub fn radial(out: &mut Vec<Vertex>, center: Vec2, radius: f32, inner: Color, outer: Color, segments: u32) {
    if radius <= 0.0 || segments < 3 {
        return;
    }
    out.reserve((segments * 3) as usize);
    for i in 0..segments {
        out.push(Vertex::new(center, inner));
        out.push(Vertex::new(rim(center, radius, i, segments), outer));
        out.push(Vertex::new(rim(center, radius, i + 1, segments), outer));
    }
}

/// Ring (hollow circle)
pub fn ring(out: &mut Vec<Vertex>, center: Vec2, inner_radius: f32, outer_radius: f32, color: Color, segments: u32) {
    if outer_radius <= 0.0 || segments < 3 {
        return;
    }
    let inner_radius = inner_radius.clamp(0.0, outer_radius);
    out.reserve((segments * 6) as usize);
    for i in 0..segments {
        let inner1 = rim(center, inner_radius, i, segments);
        let outer1 = rim(center, outer_radius, i, segments);
        let inner2 = rim(center, inner_radius, i + 1, segments);
        let outer2 = rim(center, outer_radius, i + 1, segments);

        // Two triangles per segment
        out.push(Vertex::new(inner1, color));
        out.push(Vertex::new(outer1, color));
        out.push(Vertex::new(inner2, color));

        out.push(Vertex::new(inner2, color));
        out.push(Vertex::new(outer1, color));
        out.push(Vertex::new(outer2, color));
    }
}

/// Axis-aligned filled rectangle
pub fn rect(out: &mut Vec<Vertex>, min: Vec2, size: Vec2, color: Color) {
    let max = min + size;
    quad(out, [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)], color);
}

/// Line segment as a quad of the given width
pub fn line(out: &mut Vec<Vertex>, from: Vec2, to: Vec2, width: f32, color: Color) {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO || width <= 0.0 {
        return;
    }
    let half = dir.perp() * (width / 2.0);
    quad(out, [from + half, to + half, to - half, from - half], color);
}

fn quad(out: &mut Vec<Vertex>, corners: [Vec2; 4], color: Color) {
    let [a, b, c, d] = corners;
    out.extend_from_slice(&[
        Vertex::new(a, color),
        Vertex::new(b, color),
        Vertex::new(c, color),
        Vertex::new(c, color),
        Vertex::new(d, color),
        Vertex::new(a, color),
    ]);
}
