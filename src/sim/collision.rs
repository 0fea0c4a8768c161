//! Collision detection and response for the flat playfield
//!
//! Everything here is a circle against an axis-aligned shape: the ball against
//! walls, paddle and bricks, bullets against enemies. Resolution mutates the
//! ball in place and reports what was hit so the tick can score and spawn
//! effects afterwards.

use glam::Vec2;

use super::geom::{Circle, Plane, Rect, circle_circle_overlap, circle_crosses_plane, circle_rect_overlap};
use super::pool::{EntityId, EntityPool};
use super::state::{Ball, Brick, Paddle};

/// Which wall the ball bounced off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Top,
}

/// A single resolved contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionEvent {
    Wall(Side),
    /// Normalized hit position across the paddle (0 = left edge, 1 = right edge)
    Paddle { offset: f32 },
    /// Index into the brick list
    Brick { index: usize },
    Floor,
}

/// Scale velocity down to `max_speed` if it exceeds it
#[inline]
pub fn cap_speed(vel: Vec2, max_speed: f32) -> Vec2 {
    let speed = vel.length();
    if speed > max_speed && speed > 0.0 {
        vel * (max_speed / speed)
    } else {
        vel
    }
}

/// Advance the ball by its velocity and bounce it off the side walls and ceiling
///
/// On a wall hit the offending axis is restored to its pre-move value, so a
/// ball that started inside the field stays inside it. The floor is open.
pub fn move_ball(ball: &mut Ball, field: &Rect, max_speed: f32, events: &mut Vec<CollisionEvent>) {
    let prev = ball.pos;
    let mut next = ball.pos + ball.vel;
    let probe = Circle::new(next, ball.radius);
    let mut bounced = false;

    if circle_crosses_plane(&probe, Plane::Left(field.min.x)) {
        ball.vel.x = -ball.vel.x;
        next.x = prev.x;
        bounced = true;
        events.push(CollisionEvent::Wall(Side::Left));
    } else if circle_crosses_plane(&probe, Plane::Right(field.right())) {
        ball.vel.x = -ball.vel.x;
        next.x = prev.x;
        bounced = true;
        events.push(CollisionEvent::Wall(Side::Right));
    }

    if circle_crosses_plane(&probe, Plane::Top(field.min.y)) {
        ball.vel.y = -ball.vel.y;
        next.y = prev.y;
        bounced = true;
        events.push(CollisionEvent::Wall(Side::Top));
    }

    if bounced {
        ball.vel = cap_speed(ball.vel, max_speed);
    }
    ball.pos = next;
}

/// Whether the ball center has passed the floor line
#[inline]
pub fn ball_crossed_floor(ball: &Ball, field: &Rect) -> bool {
    circle_crosses_plane(&Circle::new(ball.pos, 0.0), Plane::Bottom(field.bottom()))
}

/// Bounce the ball off the paddle, returning the normalized hit offset
///
/// The ball is always sent upward regardless of its incoming direction, with
/// a horizontal kick proportional to how far from center it struck.
pub fn resolve_paddle(ball: &mut Ball, paddle: &Paddle, deflection: f32, max_speed: f32) -> Option<f32> {
    let rect = paddle.rect();
    if !circle_rect_overlap(&ball.circle(), &rect) {
        return None;
    }

    let offset = ((ball.pos.x - rect.min.x) / rect.width()).clamp(0.0, 1.0);
    ball.vel.y = -ball.vel.y.abs();
    ball.vel.x += (offset - 0.5) * deflection;
    ball.vel = cap_speed(ball.vel, max_speed);
    Some(offset)
}

/// Index of the first live brick the ball overlaps, in grid scan order
///
/// Only one brick is reported per tick even when several overlap.
pub fn first_brick_hit(ball: &Ball, bricks: &[Brick]) -> Option<usize> {
    let circle = ball.circle();
    bricks
        .iter()
        .position(|b| !b.destroyed && circle_rect_overlap(&circle, &b.rect))
}

/// Pairs of (bullet, enemy) closer than `hit_radius`
///
/// Each bullet strikes at most the first enemy it reaches in spawn order.
pub fn bullet_enemy_hits(bullets: &EntityPool, enemies: &EntityPool, hit_radius: f32) -> Vec<(EntityId, EntityId)> {
    let mut hits = Vec::new();
    for (bullet_id, bullet) in bullets.iter() {
        let reach = Circle::new(bullet.pos, hit_radius);
        if let Some((enemy_id, _)) = enemies
            .iter()
            .find(|(_, e)| circle_circle_overlap(&reach, &Circle::new(e.pos, 0.0)))
        {
            hits.push((bullet_id, enemy_id));
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::pool::Entity;

    fn field() -> Rect {
        Rect::new(0.0, 0.0, FIELD_WIDTH, FIELD_HEIGHT)
    }

    fn ball_at(x: f32, y: f32, vx: f32, vy: f32) -> Ball {
        Ball {
            pos: Vec2::new(x, y),
            vel: Vec2::new(vx, vy),
            radius: BALL_RADIUS,
        }
    }

    #[test]
    fn test_right_wall_reflects_and_restores() {
        let mut ball = ball_at(787.0, 300.0, 5.0, 2.0);
        let mut events = Vec::new();
        move_ball(&mut ball, &field(), BALL_MAX_SPEED, &mut events);
        assert_eq!(events, vec![CollisionEvent::Wall(Side::Right)]);
        assert_eq!(ball.vel.x, -5.0);
        assert_eq!(ball.pos, Vec2::new(787.0, 302.0));
    }

    #[test]
    fn test_corner_bounce_reflects_both_axes() {
        let mut ball = ball_at(10.0, 10.0, -5.0, -5.0);
        let mut events = Vec::new();
        move_ball(&mut ball, &field(), BALL_MAX_SPEED, &mut events);
        assert_eq!(events.len(), 2);
        assert_eq!(ball.vel, Vec2::new(5.0, 5.0));
        assert_eq!(ball.pos, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_floor_is_open() {
        let mut ball = ball_at(400.0, 598.0, 0.0, 5.0);
        let mut events = Vec::new();
        move_ball(&mut ball, &field(), BALL_MAX_SPEED, &mut events);
        assert!(events.is_empty());
        assert!(ball_crossed_floor(&ball, &field()));
    }

    #[test]
    fn test_paddle_right_edge_deflects_right() {
        let paddle = Paddle::at(Vec2::new(350.0, 550.0));
        // Offset 0.9 across a 100px paddle starting at x=350
        let mut ball = ball_at(440.0, 545.0, 5.0, 5.0);
        let offset = resolve_paddle(&mut ball, &paddle, PADDLE_DEFLECTION, BALL_MAX_SPEED).unwrap();
        assert!((offset - 0.9).abs() < 1e-5);
        assert!(ball.vel.x > 0.0);
        assert!(ball.vel.y < 0.0);
        assert!(ball.vel.length() <= BALL_MAX_SPEED + 1e-4);
    }

    #[test]
    fn test_paddle_forces_upward_even_when_rising() {
        let paddle = Paddle::at(Vec2::new(350.0, 550.0));
        let mut ball = ball_at(400.0, 552.0, 0.0, -3.0);
        resolve_paddle(&mut ball, &paddle, PADDLE_DEFLECTION, BALL_MAX_SPEED).unwrap();
        assert_eq!(ball.vel.y, -3.0);
        assert_eq!(ball.vel.x, 0.0);
    }

    #[test]
    fn test_paddle_miss() {
        let paddle = Paddle::at(Vec2::new(350.0, 550.0));
        let mut ball = ball_at(200.0, 545.0, 5.0, 5.0);
        assert!(resolve_paddle(&mut ball, &paddle, PADDLE_DEFLECTION, BALL_MAX_SPEED).is_none());
        assert_eq!(ball.vel, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_first_brick_wins_and_skips_destroyed() {
        let mut bricks = vec![
            Brick::new(0, Rect::new(100.0, 100.0, 75.0, 25.0), [1.0; 4]),
            Brick::new(1, Rect::new(100.0, 120.0, 75.0, 25.0), [1.0; 4]),
        ];
        let ball = ball_at(130.0, 122.0, 0.0, -5.0);
        assert_eq!(first_brick_hit(&ball, &bricks), Some(0));
        bricks[0].destroyed = true;
        assert_eq!(first_brick_hit(&ball, &bricks), Some(1));
        bricks[1].destroyed = true;
        assert_eq!(first_brick_hit(&ball, &bricks), None);
    }

    #[test]
    fn test_cap_speed() {
        let v = cap_speed(Vec2::new(30.0, 40.0), 10.0);
        assert!((v.length() - 10.0).abs() < 1e-5);
        assert_eq!(cap_speed(Vec2::new(3.0, 4.0), 10.0), Vec2::new(3.0, 4.0));
        assert_eq!(cap_speed(Vec2::ZERO, 10.0), Vec2::ZERO);
    }

    #[test]
    fn test_bullet_hits_first_enemy_in_reach() {
        let mut bullets = EntityPool::new();
        let mut enemies = EntityPool::new();
        let b = bullets.spawn(Entity::bullet(Vec2::new(100.0, 100.0), Vec2::new(0.0, -10.0), 3.0, [1.0; 4]));
        let far = enemies.spawn(Entity::enemy(Vec2::new(300.0, 100.0), Vec2::Y, 1, 12.0, [1.0; 4]));
        let near = enemies.spawn(Entity::enemy(Vec2::new(110.0, 95.0), Vec2::Y, 1, 12.0, [1.0; 4]));
        let hits = bullet_enemy_hits(&bullets, &enemies, HIT_RADIUS);
        assert_eq!(hits, vec![(b, near)]);
        assert!(!hits.iter().any(|(_, e)| *e == far));
    }

    #[test]
    fn test_no_hits_on_empty_pools() {
        let pool = EntityPool::new();
        assert!(bullet_enemy_hits(&pool, &pool, HIT_RADIUS).is_empty());
        let ball = ball_at(10.0, 10.0, 1.0, 1.0);
        assert_eq!(first_brick_hit(&ball, &[]), None);
    }
}
