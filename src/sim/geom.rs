//! Geometry primitives for the flat playfield
//!
//! Screen-space convention: origin top-left, +y points down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::clamp_span;
use crate::consts::MIN_EXTENT;

/// Axis-aligned rectangle (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Viewport-sized rect at the origin with degenerate extents clamped
    ///
    /// Zero, negative and non-finite extents collapse to `MIN_EXTENT`.
    pub fn sanitized(width: f32, height: f32) -> Self {
        let fix = |v: f32| if v.is_finite() { v.max(MIN_EXTENT) } else { MIN_EXTENT };
        Self::new(0.0, 0.0, fix(width), fix(height))
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Inclusive containment test
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.right() && p.y >= self.min.y && p.y <= self.bottom()
    }

    /// Pull a point back inside the rect; non-finite coordinates snap to the center
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        let c = self.center();
        let x = if p.x.is_finite() { clamp_span(p.x, self.min.x, self.right()) } else { c.x };
        let y = if p.y.is_finite() { clamp_span(p.y, self.min.y, self.bottom()) } else { c.y };
        Vec2::new(x, y)
    }

    /// Wrap a point to the opposite edge when it leaves the rect
    pub fn wrap_point(&self, mut p: Vec2) -> Vec2 {
        if p.x < self.min.x {
            p.x = self.right();
        } else if p.x > self.right() {
            p.x = self.min.x;
        }
        if p.y < self.min.y {
            p.y = self.bottom();
        } else if p.y > self.bottom() {
            p.y = self.min.y;
        }
        p
    }
}

/// A circle (ball, particle, enemy hitbox)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// An axis-aligned boundary line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Plane {
    /// Vertical wall; solid side is x < value
    Left(f32),
    /// Vertical wall; solid side is x > value
    Right(f32),
    /// Ceiling; solid side is y < value
    Top(f32),
    /// Floor; solid side is y > value
    Bottom(f32),
}

/// Circle vs rectangle using the radius-expanded AABB test
///
/// Conservative near the corners, which is accepted.
#[inline]
pub fn circle_rect_overlap(c: &Circle, r: &Rect) -> bool {
    c.center.x + c.radius >= r.min.x
        && c.center.x - c.radius <= r.right()
        && c.center.y + c.radius >= r.min.y
        && c.center.y - c.radius <= r.bottom()
}

/// Circle vs circle (strict: touching circles do not overlap)
#[inline]
pub fn circle_circle_overlap(a: &Circle, b: &Circle) -> bool {
    let reach = a.radius + b.radius;
    a.center.distance_squared(b.center) < reach * reach
}

/// Whether the circle touches or crosses the plane
#[inline]
pub fn circle_crosses_plane(c: &Circle, plane: Plane) -> bool {
    match plane {
        Plane::Left(x) => c.center.x - c.radius <= x,
        Plane::Right(x) => c.center.x + c.radius >= x,
        Plane::Top(y) => c.center.y - c.radius <= y,
        Plane::Bottom(y) => c.center.y + c.radius >= y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_rect_overlap_edges() {
        let rect = Rect::new(100.0, 100.0, 50.0, 20.0);
        // Touching left edge from outside counts
        assert!(circle_rect_overlap(&Circle::new(Vec2::new(92.0, 110.0), 8.0), &rect));
        // One pixel further misses
        assert!(!circle_rect_overlap(&Circle::new(Vec2::new(91.0, 110.0), 8.0), &rect));
        // Corner is conservative: expanded box hits even though true distance > r
        assert!(circle_rect_overlap(&Circle::new(Vec2::new(93.0, 93.0), 8.0), &rect));
    }

    #[test]
    fn test_circle_circle_overlap_strict() {
        let a = Circle::new(Vec2::ZERO, 5.0);
        assert!(circle_circle_overlap(&a, &Circle::new(Vec2::new(9.0, 0.0), 5.0)));
        assert!(!circle_circle_overlap(&a, &Circle::new(Vec2::new(10.0, 0.0), 5.0)));
    }

    #[test]
    fn test_plane_crossing() {
        let c = Circle::new(Vec2::new(10.0, 590.0), 8.0);
        assert!(!circle_crosses_plane(&c, Plane::Left(0.0)));
        assert!(circle_crosses_plane(&c, Plane::Bottom(600.0)));
        assert!(!circle_crosses_plane(&c, Plane::Top(0.0)));
        assert!(circle_crosses_plane(&c, Plane::Left(2.0)));
    }

    #[test]
    fn test_sanitized_clamps_degenerate_sizes() {
        let r = Rect::sanitized(0.0, -40.0);
        assert_eq!(r.size, Vec2::splat(MIN_EXTENT));
        let r = Rect::sanitized(f32::NAN, 300.0);
        assert_eq!(r.width(), MIN_EXTENT);
        assert_eq!(r.height(), 300.0);
    }

    #[test]
    fn test_clamp_and_wrap() {
        let r = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(r.clamp_point(Vec2::new(150.0, -3.0)), Vec2::new(100.0, 0.0));
        assert_eq!(r.clamp_point(Vec2::new(f32::NAN, 10.0)), Vec2::new(50.0, 10.0));
        assert_eq!(r.wrap_point(Vec2::new(-1.0, 20.0)), Vec2::new(100.0, 20.0));
        assert_eq!(r.wrap_point(Vec2::new(40.0, 51.0)), Vec2::new(40.0, 0.0));
    }
}
