//! Deterministic simulation module
//!
//! All gameplay and visualizer logic lives here. This module must be pure and
//! deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order within each pool)
//! - No rendering or platform dependencies

pub mod ambient;
pub mod clock;
pub mod collision;
pub mod geom;
pub mod input;
pub mod palette;
pub mod pool;
pub mod state;
pub mod tick;

pub use ambient::{TrailLink, Visualizer, VisualizerConfig};
pub use clock::{FixedStep, FrameHandle, FrameLoop, FrameScheduler, FrameTicket, LoopControl, ManualScheduler};
pub use collision::{CollisionEvent, Side};
pub use geom::{Circle, Plane, Rect};
pub use input::{HeldKeys, KeyCode, SECRET_SEQUENCE, SequenceRecognizer};
pub use pool::{Color, Entity, EntityId, EntityKind, EntityPool, StepReport};
pub use state::{Ball, Brick, GameConfig, GameEvent, GamePhase, GameSession, GameVariant, Paddle};
pub use tick::{TickInput, tick};
