//! Fixed timestep simulation tick
//!
//! One call advances a running session by exactly one frame. The order of
//! the phases inside a tick is fixed: movement, collision resolution, effect
//! spawning, then the win/loss check, so the terminal check always sees the
//! post-movement positions of the same tick.

use glam::Vec2;
use rand::Rng;

use super::collision::{
    CollisionEvent, ball_crossed_floor, bullet_enemy_hits, first_brick_hit, move_ball,
    resolve_paddle,
};
use super::palette;
use super::pool::{Entity, EntityKind};
use super::state::{GameEvent, GamePhase, GameSession, GameVariant};
use crate::consts::*;

/// Input snapshot for a single tick (taken once, never re-read mid-tick)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Shoot (wave survival only)
    pub fire: bool,
}

/// Advance the session by one tick; no-op unless running
pub fn tick(session: &mut GameSession, input: &TickInput) {
    if session.phase != GamePhase::Running {
        return;
    }
    session.time_ticks += 1;

    match session.config.variant {
        GameVariant::Breakout => tick_breakout(session, input),
        GameVariant::WaveSurvival => tick_waves(session, input),
    }
}

fn tick_breakout(session: &mut GameSession, input: &TickInput) {
    let field = session.field();
    let Some(mut ball) = session.ball else {
        return;
    };

    // --- Movement ---
    session.paddle.steer(input.left, input.right, &field);
    let mut contacts = Vec::new();
    move_ball(&mut ball, &field, BALL_MAX_SPEED, &mut contacts);

    // --- Collisions (skipped once the ball is through the floor) ---
    let lost = ball_crossed_floor(&ball, &field);
    let mut smashed = None;
    if lost {
        contacts.push(CollisionEvent::Floor);
    } else {
        if let Some(offset) = resolve_paddle(&mut ball, &session.paddle, PADDLE_DEFLECTION, BALL_MAX_SPEED) {
            contacts.push(CollisionEvent::Paddle { offset });
        }
        if let Some(index) = first_brick_hit(&ball, &session.bricks) {
            let brick = &mut session.bricks[index];
            brick.destroyed = true;
            ball.vel.y = -ball.vel.y;
            session.score += BRICK_POINTS;
            smashed = Some((brick.id, brick.rect.center(), brick.color));
            contacts.push(CollisionEvent::Brick { index });
        }
    }
    session.ball = Some(ball);

    for contact in contacts {
        match contact {
            CollisionEvent::Wall(side) => session.emit(GameEvent::WallBounce(side)),
            CollisionEvent::Paddle { offset } => session.emit(GameEvent::PaddleHit { offset }),
            CollisionEvent::Brick { .. } | CollisionEvent::Floor => {}
        }
    }

    // --- Effects ---
    if let Some((id, center, color)) = smashed {
        log::debug!("brick {} destroyed, score {}", id, session.score);
        session.emit(GameEvent::BrickDestroyed { id });
        session.spawn_burst(center, color);
    }
    step_fragments(session);

    // --- Win / loss ---
    if lost {
        session.phase = GamePhase::Lost;
        session.emit(GameEvent::Lost { score: session.score });
        log::info!("Round lost with score {}", session.score);
    } else if session.config.win_condition() && session.remaining_bricks() == 0 {
        session.phase = GamePhase::Won;
        session.emit(GameEvent::Won { score: session.score });
        log::info!("Round won with score {}", session.score);
    }
}

fn tick_waves(session: &mut GameSession, input: &TickInput) {
    let field = session.field();

    // --- Movement ---
    session.paddle.steer(input.left, input.right, &field);
    session.fire_cooldown = session.fire_cooldown.saturating_sub(1);
    if input.fire && session.fire_cooldown == 0 {
        let muzzle = Vec2::new(session.paddle.center_x(), session.paddle.pos.y);
        session.bullets.spawn(Entity::bullet(
            muzzle,
            Vec2::new(0.0, -BULLET_SPEED),
            BULLET_RADIUS,
            palette::BULLET,
        ));
        session.fire_cooldown = FIRE_COOLDOWN_TICKS;
    }
    session.bullets.step(1.0, &field, &mut session.rng);
    session.enemies.step(1.0, &field, &mut session.rng);

    // --- Collisions ---
    let mut hits = 0;
    let mut kills = Vec::new();
    for (bullet_id, enemy_id) in bullet_enemy_hits(&session.bullets, &session.enemies, HIT_RADIUS) {
        // Target already killed this tick; the bullet flies on
        let Some(enemy) = session.enemies.get_mut(enemy_id) else {
            continue;
        };
        session.bullets.remove(bullet_id);
        hits += 1;
        if let EntityKind::Enemy { health } = &mut enemy.kind {
            *health = health.saturating_sub(1);
            if *health == 0 {
                kills.push((enemy.pos, enemy.tint));
                session.enemies.remove(enemy_id);
                session.score += ENEMY_POINTS;
            }
        }
    }

    // --- Effects ---
    for _ in 0..hits {
        session.emit(GameEvent::EnemyHit);
    }
    for (pos, tint) in kills {
        session.emit(GameEvent::EnemyDestroyed);
        session.spawn_burst(pos, tint);
    }
    step_fragments(session);
    if session.enemies.len() < MAX_ENEMIES && session.rng.random_bool(ENEMY_SPAWN_CHANCE) {
        spawn_enemy(session);
    }
}

/// Drop a new enemy in at the top edge
fn spawn_enemy(session: &mut GameSession) {
    let field = session.field();
    let margin = ENEMY_RADIUS.min(field.width() / 2.0);
    let x = if field.width() > 2.0 * margin {
        session.rng.random_range(field.min.x + margin..field.right() - margin)
    } else {
        field.center().x
    };
    let speed = session.rng.random_range(ENEMY_MIN_SPEED..ENEMY_MAX_SPEED);
    let armored = session.rng.random_bool(0.2);
    let (health, tint) = if armored {
        (2, palette::ENEMY_ARMORED)
    } else {
        (1, palette::ENEMY)
    };
    session.enemies.spawn(Entity::enemy(
        Vec2::new(x, field.min.y),
        Vec2::new(0.0, speed),
        health,
        ENEMY_RADIUS,
        tint,
    ));
    session.emit(GameEvent::EnemySpawned);
}

fn step_fragments(session: &mut GameSession) {
    let field = session.field();
    session.fragments.step(1.0, &field, &mut session.rng);
}
