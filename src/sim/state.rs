//! Game state and core simulation types
//!
//! A `GameSession` owns every entity of the mini-game. Nothing here outlives
//! the session: closing the game drops it, restarting re-runs the initializer.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Side;
use super::geom::{Circle, Rect};
use super::palette;
use super::pool::{Color, Entity, EntityPool};
use crate::clamp_span;
use crate::consts::*;

/// Current phase of the mini-game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Game shown, no entities yet
    Idle,
    /// Timer advancing, input live
    Running,
    /// Every brick destroyed
    Won,
    /// Ball fell through the floor
    Lost,
}

impl GamePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::Lost)
    }
}

/// Which mini-game runs on top of the shared engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameVariant {
    /// Paddle, ball and a brick wall; ends in Won or Lost
    #[default]
    Breakout,
    /// Paddle-ship shooting an endless stream of enemies; no terminal state
    WaveSurvival,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub variant: GameVariant,
    pub field: Rect,
    /// Fragments per burst
    pub burst_size: usize,
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            variant: GameVariant::Breakout,
            field: Rect::new(0.0, 0.0, FIELD_WIDTH, FIELD_HEIGHT),
            burst_size: BURST_SIZE,
            seed: 0,
        }
    }
}

impl GameConfig {
    pub fn with_variant(variant: GameVariant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    /// Whether clearing the brick wall ends the round
    pub fn win_condition(&self) -> bool {
        self.variant == GameVariant::Breakout
    }
}

/// Things that happened during a tick, drained by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    RoundStarted,
    WallBounce(Side),
    PaddleHit { offset: f32 },
    BrickDestroyed { id: u32 },
    EnemySpawned,
    EnemyHit,
    EnemyDestroyed,
    Won { score: u64 },
    Lost { score: u64 },
}

/// The ball
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Default for Ball {
    fn default() -> Self {
        Self {
            pos: Vec2::new(BALL_START_X, BALL_START_Y),
            vel: Vec2::new(BALL_START_VX, BALL_START_VY),
            radius: BALL_RADIUS,
        }
    }
}

impl Ball {
    pub fn circle(&self) -> Circle {
        Circle::new(self.pos, self.radius)
    }

    /// Keep the center inside the field, one radius clear of every edge
    pub fn clamp_into(&mut self, field: &Rect) {
        let r = self.radius;
        self.pos.x = clamp_span(self.pos.x, field.min.x + r, field.right() - r);
        self.pos.y = clamp_span(self.pos.y, field.min.y + r, field.bottom() - r);
    }
}

/// The player's paddle (also the ship in wave survival)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paddle {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Horizontal pixels per tick
    pub speed: f32,
}

impl Paddle {
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            size: Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT),
            speed: PADDLE_SPEED,
        }
    }

    /// Paddle centered horizontally, resting 50px above the floor
    pub fn centered(field: &Rect) -> Self {
        let mut paddle = Self::at(Vec2::ZERO);
        paddle.pos = Vec2::new(
            field.center().x - PADDLE_WIDTH / 2.0,
            field.bottom() - (FIELD_HEIGHT - PADDLE_Y),
        );
        paddle.clamp_into(field);
        paddle
    }

    pub fn rect(&self) -> Rect {
        Rect {
            min: self.pos,
            size: self.size,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.size.x / 2.0
    }

    /// Move left/right by at most `speed`, never leaving the field
    pub fn steer(&mut self, left: bool, right: bool, field: &Rect) {
        if left {
            self.pos.x -= self.speed;
        }
        if right {
            self.pos.x += self.speed;
        }
        self.clamp_into(field);
    }

    pub fn clamp_into(&mut self, field: &Rect) {
        self.pos.x = clamp_span(self.pos.x, field.min.x, field.right() - self.size.x);
        self.pos.y = clamp_span(self.pos.y, field.min.y, field.bottom() - self.size.y);
    }
}

/// A brick in the wall
#[derive(Debug, Clone, PartialEq)]
pub struct Brick {
    pub id: u32,
    pub rect: Rect,
    pub color: Color,
    pub destroyed: bool,
}

impl Brick {
    pub fn new(id: u32, rect: Rect, color: Color) -> Self {
        Self {
            id,
            rect,
            color,
            destroyed: false,
        }
    }
}

/// Build the fixed rows x cols brick wall, one color per row
pub fn brick_grid() -> Vec<Brick> {
    let mut bricks = Vec::with_capacity(BRICK_ROWS * BRICK_COLS);
    for row in 0..BRICK_ROWS {
        for col in 0..BRICK_COLS {
            let x = BRICK_LEFT + col as f32 * (BRICK_WIDTH + BRICK_GAP);
            let y = BRICK_TOP + row as f32 * (BRICK_HEIGHT + BRICK_GAP);
            bricks.push(Brick::new(
                (row * BRICK_COLS + col) as u32,
                Rect::new(x, y, BRICK_WIDTH, BRICK_HEIGHT),
                palette::BRICK_ROWS[row % palette::BRICK_ROWS.len()],
            ));
        }
    }
    bricks
}

/// One open mini-game
#[derive(Debug, Clone)]
pub struct GameSession {
    pub config: GameConfig,
    pub phase: GamePhase,
    pub score: u64,
    pub paddle: Paddle,
    /// Present only in Breakout while a round exists
    pub ball: Option<Ball>,
    pub bricks: Vec<Brick>,
    /// Burst fragments (visual only)
    pub fragments: EntityPool,
    pub bullets: EntityPool,
    pub enemies: EntityPool,
    /// Ticks since the round started
    pub time_ticks: u64,
    /// Ticks until the next shot is allowed
    pub fire_cooldown: u32,
    pub(crate) rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Create an idle session; nothing is spawned until `start_round`
    pub fn new(config: GameConfig) -> Self {
        let field = config.field;
        Self {
            rng: Pcg32::seed_from_u64(config.seed),
            config,
            phase: GamePhase::Idle,
            score: 0,
            paddle: Paddle::centered(&field),
            ball: None,
            bricks: Vec::new(),
            fragments: EntityPool::new(),
            bullets: EntityPool::new(),
            enemies: EntityPool::new(),
            time_ticks: 0,
            fire_cooldown: 0,
            events: Vec::new(),
        }
    }

    /// Idle/Won/Lost -> Running. No-op while already running.
    pub fn start_round(&mut self) -> bool {
        if self.phase == GamePhase::Running {
            return false;
        }
        self.init_round();
        true
    }

    /// Re-run the initializer from any started phase
    pub fn restart_round(&mut self) -> bool {
        if self.phase == GamePhase::Idle {
            return false;
        }
        self.init_round();
        true
    }

    fn init_round(&mut self) {
        let field = self.config.field;
        self.score = 0;
        self.time_ticks = 0;
        self.fire_cooldown = 0;
        self.paddle = Paddle::centered(&field);
        self.fragments.clear();
        self.bullets.clear();
        self.enemies.clear();
        match self.config.variant {
            GameVariant::Breakout => {
                let mut ball = Ball::default();
                ball.clamp_into(&field);
                self.ball = Some(ball);
                self.bricks = brick_grid();
            }
            GameVariant::WaveSurvival => {
                self.ball = None;
                self.bricks.clear();
            }
        }
        self.phase = GamePhase::Running;
        self.events.push(GameEvent::RoundStarted);
        log::info!("{:?} round started", self.config.variant);
    }

    /// Drop every entity and return to Idle
    pub fn teardown(&mut self) {
        self.ball = None;
        self.bricks.clear();
        self.fragments.clear();
        self.bullets.clear();
        self.enemies.clear();
        self.events.clear();
        self.phase = GamePhase::Idle;
    }

    pub fn field(&self) -> Rect {
        self.config.field
    }

    pub fn destroyed_bricks(&self) -> usize {
        self.bricks.iter().filter(|b| b.destroyed).count()
    }

    pub fn remaining_bricks(&self) -> usize {
        self.bricks.len() - self.destroyed_bricks()
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Spray burst fragments from `center`
    pub fn spawn_burst(&mut self, center: Vec2, tint: Color) {
        for _ in 0..self.config.burst_size {
            let vel = Vec2::new(
                self.rng.random_range(-BURST_SPEED..BURST_SPEED),
                self.rng.random_range(-BURST_SPEED..BURST_SPEED),
            );
            self.fragments
                .spawn(Entity::fragment(center, vel, FRAGMENT_DECAY, FRAGMENT_DAMPING, tint));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle_and_empty() {
        let session = GameSession::new(GameConfig::default());
        assert_eq!(session.phase, GamePhase::Idle);
        assert!(session.ball.is_none());
        assert!(session.bricks.is_empty());
    }

    #[test]
    fn test_start_round_lays_out_grid() {
        let mut session = GameSession::new(GameConfig::default());
        assert!(session.start_round());
        assert_eq!(session.phase, GamePhase::Running);
        assert_eq!(session.bricks.len(), 60);
        assert_eq!(session.bricks[0].rect, Rect::new(50.0, 80.0, 75.0, 25.0));
        assert_eq!(session.bricks[59].rect, Rect::new(770.0, 230.0, 75.0, 25.0));
        assert_eq!(session.paddle.pos, Vec2::new(350.0, 550.0));
        assert_eq!(session.ball, Some(Ball::default()));
        // Second start while running is ignored
        assert!(!session.start_round());
        assert_eq!(session.drain_events(), vec![GameEvent::RoundStarted]);
    }

    #[test]
    fn test_restart_requires_a_started_round() {
        let mut session = GameSession::new(GameConfig::default());
        assert!(!session.restart_round());
        session.start_round();
        session.score = 40;
        session.phase = GamePhase::Lost;
        assert!(session.restart_round());
        assert_eq!(session.score, 0);
        assert_eq!(session.phase, GamePhase::Running);
    }

    #[test]
    fn test_wave_survival_has_no_ball_or_bricks() {
        let mut session = GameSession::new(GameConfig::with_variant(GameVariant::WaveSurvival));
        session.start_round();
        assert!(session.ball.is_none());
        assert!(session.bricks.is_empty());
        assert!(!session.config.win_condition());
    }

    #[test]
    fn test_every_brick_is_reachable_above_the_paddle() {
        let mut session = GameSession::new(GameConfig::default());
        session.start_round();
        let field = session.field();
        let paddle_top = session.paddle.pos.y;
        for brick in &session.bricks {
            // Some part of the brick lies where the ball center can travel
            assert!(brick.rect.min.x < field.right() - BALL_RADIUS, "{:?}", brick.rect);
            assert!(brick.rect.right() > field.min.x + BALL_RADIUS, "{:?}", brick.rect);
            assert!(brick.rect.min.y > field.min.y + BALL_RADIUS, "{:?}", brick.rect);
            assert!(brick.rect.bottom() < paddle_top - 2.0 * BALL_RADIUS, "{:?}", brick.rect);
        }
    }

    #[test]
    fn test_burst_spawns_configured_count() {
        let mut session = GameSession::new(GameConfig::default());
        session.spawn_burst(Vec2::new(100.0, 100.0), [1.0; 4]);
        assert_eq!(session.fragments.len(), BURST_SIZE);
    }
}
