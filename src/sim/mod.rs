//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (collection order, primary ball first)
//! - No rendering or platform dependencies

pub mod boss;
pub mod events;
pub mod geometry;
pub mod levels;
pub mod physics;
pub mod powerups;
pub mod state;
pub mod tick;
pub mod trajectory;

pub use events::{EffectKind, GameEvent, GameOverCause};
pub use geometry::{Aabb, Axis};
pub use levels::{BrickType, LevelDef, level, level_count};
pub use state::{
    AttackKind, Ball, Barrier, Boss, Brick, BrickKind, GamePhase, GameState, Hazard, Paddle,
    PowerUp, PowerUpKind, Projectile,
};
pub use tick::{TickInput, tick};
pub use trajectory::{TRAJECTORY_POINTS, predict};
