//! Brick Breaker 3D - ball-and-paddle brick breaking in a 3D play volume
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, power-ups, boss, game state)
//! - `scene`: Per-entity instance data published to the renderer
//! - `platform`: Input events to tick intents
//! - `settings`: Session configuration

pub mod error;
pub mod platform;
pub mod scene;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use settings::{ControlMode, LevelProgression, Settings};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz, one step per rendered frame)
    pub const SIM_DT_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Play volume dimensions (centered on the origin)
    pub const GAME_WIDTH: f32 = 40.0;
    pub const GAME_HEIGHT: f32 = 50.0;
    pub const GAME_DEPTH: f32 = 40.0;

    /// Brick dimensions
    pub const BRICK_WIDTH: f32 = 4.0;
    pub const BRICK_HEIGHT: f32 = 2.0;
    pub const BRICK_DEPTH: f32 = 2.0;
    pub const BRICK_SPACING_X: f32 = 0.8;
    pub const BRICK_SPACING_Y: f32 = 1.2;
    pub const BRICK_SPACING_Z: f32 = 0.8;

    /// Paddle dimensions
    pub const PADDLE_WIDTH: f32 = 10.0;
    pub const PADDLE_HEIGHT: f32 = 1.0;
    pub const PADDLE_DEPTH: f32 = 10.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.8;
    /// Steering added per unit of normalized paddle impact offset
    pub const PADDLE_STEER: f32 = 0.2;

    /// Paddle hits closer together than this are one contact for the streak
    pub const STREAK_WINDOW_MS: f64 = 1000.0;
    /// Streak length that lights the fire aura
    pub const FIRE_AURA_STREAK: u32 = 2;
    /// Streak milestones are reported every N hits up to the cap
    pub const STREAK_MILESTONE: u32 = 5;
    pub const STREAK_MILESTONE_CAP: u32 = 25;

    /// Explosive-ball blast radius (two brick widths)
    pub const EXPLOSIVE_BALL_RADIUS: f32 = BRICK_WIDTH * 2.0;

    /// Delay before the "next level" info follows a level clear
    pub const NEXT_LEVEL_INFO_DELAY_MS: f64 = 3000.0;
}

/// Y coordinate of the floor plane
#[inline]
pub fn floor_y() -> f32 {
    -consts::GAME_HEIGHT / 2.0
}

/// Half extents of the play volume
#[inline]
pub fn play_half_extents() -> Vec3 {
    Vec3::new(
        consts::GAME_WIDTH / 2.0,
        consts::GAME_HEIGHT / 2.0,
        consts::GAME_DEPTH / 2.0,
    )
}

/// Rotate a vector around the Y axis (in the XZ plane)
#[inline]
pub fn rotate_y(v: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(v.x * cos - v.z * sin, v.y, v.x * sin + v.z * cos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_rotate_y_quarter_turn() {
        let v = rotate_y(Vec3::new(1.0, 2.0, 0.0), FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 2.0).abs() < 1e-6);
        assert!((v.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_play_volume() {
        assert_eq!(floor_y(), -25.0);
        assert_eq!(play_half_extents(), Vec3::new(20.0, 25.0, 20.0));
    }
}
