//! Property tests for the simulation core

use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use glowfield::consts::*;
use glowfield::sim::collision::{move_ball, resolve_paddle};
use glowfield::sim::{
    Ball, Entity, EntityPool, GameConfig, GamePhase, GameSession, KeyCode, Paddle, Rect, SECRET_SEQUENCE,
    SequenceRecognizer, TickInput, Visualizer, VisualizerConfig, tick,
};

const ALL_KEYS: [KeyCode; 10] = [
    KeyCode::ArrowUp,
    KeyCode::ArrowDown,
    KeyCode::ArrowLeft,
    KeyCode::ArrowRight,
    KeyCode::KeyA,
    KeyCode::KeyB,
    KeyCode::KeyD,
    KeyCode::Space,
    KeyCode::Enter,
    KeyCode::Escape,
];

fn field() -> Rect {
    Rect::new(0.0, 0.0, FIELD_WIDTH, FIELD_HEIGHT)
}

proptest! {
    #[test]
    fn life_never_increases_until_removed(decay in 0.001f32..0.5, steps in 1usize..300, seed: u64) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut pool = EntityPool::new();
        let id = pool.spawn(Entity::trail(Vec2::new(10.0, 10.0), decay, [1.0; 4]));
        let mut last = 1.0f32;
        for _ in 0..steps {
            pool.step(1.0, &field(), &mut rng);
            match pool.get(id) {
                Some(e) => {
                    prop_assert!(e.life < last);
                    prop_assert!(e.life > 0.0);
                    last = e.life;
                }
                None => {
                    prop_assert!(last - decay <= 1e-5);
                    break;
                }
            }
        }
    }

    #[test]
    fn ambient_population_is_conserved(
        count in 0usize..120,
        w in 1.0f32..2000.0,
        h in 1.0f32..2000.0,
        steps in 0usize..400,
        seed: u64,
    ) {
        let config = VisualizerConfig { ambient_count: count, ..Default::default() };
        let mut vis = Visualizer::new(config, w, h, seed);
        for _ in 0..steps {
            vis.step();
        }
        prop_assert_eq!(vis.ambient().len(), count);
        let bounds = vis.bounds();
        prop_assert!(vis.ambient().iter().all(|(_, e)| bounds.contains(e.pos)));
    }

    #[test]
    fn paddle_bounce_respects_speed_cap(
        hit in 0.0f32..1.0,
        vx in -20.0f32..20.0,
        vy in -20.0f32..20.0,
    ) {
        let paddle = Paddle::at(Vec2::new(PADDLE_X, PADDLE_Y));
        let mut ball = Ball {
            pos: Vec2::new(PADDLE_X + hit * PADDLE_WIDTH, PADDLE_Y - 2.0),
            vel: Vec2::new(vx, vy),
            radius: BALL_RADIUS,
        };
        prop_assert!(resolve_paddle(&mut ball, &paddle, PADDLE_DEFLECTION, BALL_MAX_SPEED).is_some());
        prop_assert!(ball.vel.length() <= BALL_MAX_SPEED + 1e-3);
        prop_assert!(ball.vel.y <= 0.0);
    }

    #[test]
    fn ball_stays_inside_walls(
        x in BALL_RADIUS..(FIELD_WIDTH - BALL_RADIUS),
        y in BALL_RADIUS..(FIELD_HEIGHT - BALL_RADIUS),
        angle in 0.0f32..std::f32::consts::TAU,
        speed in 0.0f32..BALL_MAX_SPEED,
    ) {
        let mut ball = Ball {
            pos: Vec2::new(x, y),
            vel: Vec2::from_angle(angle) * speed,
            radius: BALL_RADIUS,
        };
        let mut events = Vec::new();
        move_ball(&mut ball, &field(), BALL_MAX_SPEED, &mut events);
        prop_assert!(ball.pos.x - BALL_RADIUS >= -1e-3);
        prop_assert!(ball.pos.x + BALL_RADIUS <= FIELD_WIDTH + 1e-3);
        prop_assert!(ball.pos.y - BALL_RADIUS >= -1e-3);
        if !events.is_empty() {
            prop_assert!(ball.vel.length() <= BALL_MAX_SPEED + 1e-3);
        }
    }

    #[test]
    fn bricks_fall_monotonically_and_ball_stays_walled(
        seed: u64,
        inputs in prop::collection::vec((any::<bool>(), any::<bool>()), 1..800),
    ) {
        let mut session = GameSession::new(GameConfig { seed, ..GameConfig::default() });
        session.start_round();
        let mut destroyed = vec![false; session.bricks.len()];
        let mut score = 0;
        for (left, right) in inputs {
            tick(&mut session, &TickInput { left, right, fire: false });
            for (i, brick) in session.bricks.iter().enumerate() {
                prop_assert!(brick.destroyed || !destroyed[i]);
                destroyed[i] = brick.destroyed;
            }
            prop_assert!(session.score >= score);
            prop_assert_eq!(session.score, session.destroyed_bricks() as u64 * BRICK_POINTS);
            score = session.score;
            if session.phase.is_terminal() {
                break;
            }
            // Wall containment holds on every tick before the loss
            let ball = session.ball.unwrap();
            prop_assert!(ball.pos.x >= ball.radius - 1e-3);
            prop_assert!(ball.pos.x <= FIELD_WIDTH - ball.radius + 1e-3);
            prop_assert!(ball.pos.y >= ball.radius - 1e-3);
        }
        if session.phase == GamePhase::Won {
            prop_assert_eq!(session.remaining_bricks(), 0);
        }
    }

    #[test]
    fn single_substitution_never_triggers(pos in 0usize..10, key in 0usize..10) {
        let replacement = ALL_KEYS[key];
        prop_assume!(replacement != SECRET_SEQUENCE[pos]);
        let mut typed = SECRET_SEQUENCE;
        typed[pos] = replacement;
        let mut rec = SequenceRecognizer::default();
        prop_assert!(!typed.iter().any(|k| rec.push(*k)));
    }

    #[test]
    fn sequence_after_noise_triggers_once(noise in prop::collection::vec(0usize..10, 0..20)) {
        let mut rec = SequenceRecognizer::default();
        for i in noise {
            rec.push(ALL_KEYS[i]);
        }
        let fired: Vec<bool> = SECRET_SEQUENCE.iter().map(|k| rec.push(*k)).collect();
        prop_assert_eq!(fired.iter().filter(|f| **f).count(), 1);
        prop_assert!(fired[9]);
    }
}
