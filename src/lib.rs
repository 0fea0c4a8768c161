//! Glowfield - ambient cursor-trail visualizer with a hidden arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entity pools, collisions, game state, frame loop)
//! - `renderer`: Render surface abstraction and WebGPU backend
//! - `host`: Composition root wiring input, loops and surfaces together
//! - `settings`: Data-driven configuration

pub mod host;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use host::{ActivationSource, Activator, Host, HostError, HostEvent};
pub use settings::{QualityPreset, Settings};

/// Simulation configuration constants
///
/// Velocities are in pixels per tick; one tick is one nominal 60 Hz frame.
pub mod consts {
    /// Fixed simulation timestep (seconds)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Smallest extent a bounds rectangle may shrink to
    pub const MIN_EXTENT: f32 = 1.0;

    /// Playfield dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    pub const BALL_START_X: f32 = 400.0;
    pub const BALL_START_Y: f32 = 400.0;
    pub const BALL_START_VX: f32 = 5.0;
    pub const BALL_START_VY: f32 = -5.0;
    /// Speed cap applied after every bounce
    pub const BALL_MAX_SPEED: f32 = 8.0;

    /// Paddle defaults
    pub const PADDLE_X: f32 = 350.0;
    pub const PADDLE_Y: f32 = 550.0;
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 15.0;
    pub const PADDLE_SPEED: f32 = 8.0;
    /// Horizontal velocity added per unit of off-center hit
    pub const PADDLE_DEFLECTION: f32 = 3.0;

    /// Brick grid
    pub const BRICK_ROWS: usize = 6;
    pub const BRICK_COLS: usize = 10;
    pub const BRICK_WIDTH: f32 = 75.0;
    pub const BRICK_HEIGHT: f32 = 25.0;
    pub const BRICK_GAP: f32 = 5.0;
    pub const BRICK_LEFT: f32 = 50.0;
    pub const BRICK_TOP: f32 = 80.0;
    pub const BRICK_POINTS: u64 = 10;

    /// Burst fragments
    pub const BURST_SIZE: usize = 6;
    pub const BURST_SPEED: f32 = 5.0;
    pub const FRAGMENT_DECAY: f32 = 0.02;
    pub const FRAGMENT_DAMPING: f32 = 0.98;

    /// Wave survival
    pub const FIRE_COOLDOWN_TICKS: u32 = 12;
    pub const BULLET_SPEED: f32 = 10.0;
    pub const BULLET_RADIUS: f32 = 3.0;
    /// Outlives a full climb of the field at `BULLET_SPEED`
    pub const BULLET_DECAY: f32 = 0.01;
    pub const ENEMY_SPAWN_CHANCE: f64 = 0.02;
    pub const ENEMY_RADIUS: f32 = 12.0;
    pub const ENEMY_MIN_SPEED: f32 = 1.0;
    pub const ENEMY_MAX_SPEED: f32 = 2.5;
    /// Outlives a full descent at `ENEMY_MIN_SPEED`
    pub const ENEMY_DECAY: f32 = 0.001;
    pub const MAX_ENEMIES: usize = 24;
    /// Fixed bullet/enemy hit distance (not a radius sum)
    pub const HIT_RADIUS: f32 = 20.0;
    pub const ENEMY_POINTS: u64 = 10;

    /// Cursor trail
    pub const TRAIL_DECAY: f32 = 0.02;
    pub const TRAIL_SPAWN_DISTANCE: f32 = 5.0;
    pub const MAX_TRAIL_POINTS: usize = 20;
    pub const TRAIL_LINK_DISTANCE: f32 = 50.0;

    /// Ambient background particles
    pub const AMBIENT_DECAY: f32 = 0.001;
    pub const AMBIENT_DRIFT: f32 = 0.25;
    pub const AMBIENT_COUNT: usize = 50;
    pub const CLICK_BURST_SIZE: usize = 12;
}

/// Clamp `value` into `[lo, hi]`, collapsing to `lo` when the span is inverted.
///
/// `f32::clamp` panics on `lo > hi`, which a shrunken viewport can produce.
#[inline]
pub fn clamp_span(value: f32, lo: f32, hi: f32) -> f32 {
    if hi < lo { lo } else { value.clamp(lo, hi) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_span_inverted() {
        assert_eq!(clamp_span(5.0, 8.0, 2.0), 8.0);
        assert_eq!(clamp_span(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp_span(-1.0, 0.0, 10.0), 0.0);
    }
}
