//! Semantic gameplay events
//!
//! Pushed by the simulation during a tick and drained by the host for audio,
//! particles and UI messages. Nothing in the simulation reads them back.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::levels::BrickType;
use super::state::{AttackKind, PowerUpKind};

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverCause {
    BallLost,
    BossProjectile,
    BossHazard,
}

/// Timed effects that can run out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    PaddleSize,
    ExplosiveBall,
    ExtraBall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    BallPaddleHit { impact_speed: f32 },
    BallWallHit { pos: Vec3, normal: Vec3 },
    BrickHit { id: u32, brick_type: BrickType, hits_remaining: u32 },
    BrickDestroyed { id: u32, brick_type: BrickType, pos: Vec3, points: u64 },
    Explosion { pos: Vec3, radius: f32 },
    PowerUpSpawned { kind: PowerUpKind, pos: Vec3 },
    PowerUpCollected { kind: PowerUpKind },
    EffectExpired { kind: EffectKind },
    BarrierBlinking,
    BarrierExpired,
    HitStreak { count: u32 },
    FireAuraIgnited,
    LevelComplete { level: u32 },
    NextLevelInfo { level: u32, name: String, description: String },
    GameOver { cause: GameOverCause },
    BossHit { health: i32 },
    BossDefeated,
    BossAttack { kind: AttackKind },
}

impl GameEvent {
    /// Events that deserve a screen shake / big sound
    pub fn is_major(&self) -> bool {
        matches!(
            self,
            GameEvent::Explosion { .. }
                | GameEvent::GameOver { .. }
                | GameEvent::BossDefeated
                | GameEvent::LevelComplete { .. }
        )
    }
}
