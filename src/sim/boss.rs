//! Boss attack controller
//!
//! Every `attack_interval_ms` the boss alternates between a hazard strike and
//! a projectile volley, hazard first. Either one touching the paddle ends the
//! run.

use glam::Vec3;
use rand::Rng;

use super::events::{GameEvent, GameOverCause};
use super::state::{AttackKind, GameState, Hazard, Projectile};
use crate::consts::*;
use crate::{play_half_extents, rotate_y};

/// Volley spread around the aim direction (radians, in XZ)
const VOLLEY_SPREAD: [f32; 3] = [-0.3, 0.0, 0.3];
const VOLLEY_JITTER: f32 = 0.025;
const PROJECTILE_SPEED: f32 = 0.3;
const PROJECTILE_RADIUS: f32 = 0.4;

const HAZARD_COUNT: usize = 3;
/// Fraction of the floor hazards can land on
const HAZARD_AREA: f32 = 0.8;
const HAZARD_WARNING_MS: f64 = 1000.0;
/// Per-axis distance from the paddle center that counts as a hit
const HAZARD_HIT_DISTANCE: f32 = 1.5;
const HAZARD_LINGER_MS: f64 = 500.0;

/// Run one tick of the boss fight
///
/// Returns the cause when an attack hit the paddle. Does nothing without an
/// active boss.
pub fn update(state: &mut GameState) -> Option<GameOverCause> {
    let index = state
        .bricks
        .iter()
        .position(|b| b.active && b.kind.is_boss())?;
    let now = state.now_ms;

    if let Some(kind) = next_attack(state, index, now) {
        log::debug!("Boss attack: {:?}", kind);
        match kind {
            AttackKind::Volley => fire_volley(state, index),
            AttackKind::HazardStrike => mark_hazards(state, index, now),
        }
        state.emit(GameEvent::BossAttack { kind });
    }

    let cause = advance_attacks(state, index, now);
    if cause.is_some() {
        if let Some(boss) = state.bricks[index].boss_mut() {
            boss.projectiles.clear();
            boss.hazards.clear();
        }
    }
    cause
}

/// Attack due this tick, if any; flips the alternation
fn next_attack(state: &mut GameState, index: usize, now: f64) -> Option<AttackKind> {
    let boss = state.bricks[index].boss_mut()?;
    if now - boss.last_attack_at <= boss.attack_interval_ms {
        return None;
    }
    let kind = boss.next_attack;
    boss.next_attack = kind.other();
    boss.last_attack_at = now;
    Some(kind)
}

/// Three projectiles aimed at the paddle, fanned out in XZ
fn fire_volley(state: &mut GameState, index: usize) {
    let target = state.paddle.pos;
    let rng = &mut state.rng;
    let brick = &mut state.bricks[index];
    let origin = brick.pos;
    let Some(boss) = brick.boss_mut() else {
        return;
    };

    let aim = (target - origin).normalize_or_zero();
    for angle in VOLLEY_SPREAD {
        let mut dir = rotate_y(aim, angle);
        dir.x += rng.random_range(-VOLLEY_JITTER..VOLLEY_JITTER);
        dir.z += rng.random_range(-VOLLEY_JITTER..VOLLEY_JITTER);
        boss.projectiles.push(Projectile {
            pos: origin,
            vel: dir.normalize_or_zero() * PROJECTILE_SPEED,
            radius: PROJECTILE_RADIUS,
        });
    }
}

/// Telegraph strikes at random spots on the floor
fn mark_hazards(state: &mut GameState, index: usize, now: f64) {
    let rng = &mut state.rng;
    let Some(boss) = state.bricks[index].boss_mut() else {
        return;
    };
    let reach_x = GAME_WIDTH * HAZARD_AREA / 2.0;
    let reach_z = GAME_DEPTH * HAZARD_AREA / 2.0;

    for _ in 0..HAZARD_COUNT {
        boss.hazards.push(Hazard {
            x: rng.random_range(-reach_x..reach_x),
            z: rng.random_range(-reach_z..reach_z),
            resolve_at: now + HAZARD_WARNING_MS,
            struck_at: None,
        });
    }
}

/// Move projectiles, land due hazards, report a paddle hit
fn advance_attacks(state: &mut GameState, index: usize, now: f64) -> Option<GameOverCause> {
    let paddle_box = state.paddle.aabb();
    let paddle_pos = state.paddle.pos;
    let bounds = play_half_extents();
    let boss = state.bricks[index].boss_mut()?;

    let mut cause = None;

    for projectile in &mut boss.projectiles {
        projectile.pos += projectile.vel;
        if projectile.aabb().intersects(&paddle_box) {
            cause = Some(GameOverCause::BossProjectile);
        }
    }
    boss.projectiles
        .retain(|p| p.pos.abs().cmple(bounds + Vec3::splat(p.radius)).all());

    for hazard in &mut boss.hazards {
        if hazard.struck_at.is_none() && now >= hazard.resolve_at {
            hazard.struck_at = Some(now);
            if (hazard.x - paddle_pos.x).abs() < HAZARD_HIT_DISTANCE
                && (hazard.z - paddle_pos.z).abs() < HAZARD_HIT_DISTANCE
            {
                cause = cause.or(Some(GameOverCause::BossHazard));
            }
        }
    }
    boss.hazards
        .retain(|h| h.struck_at.is_none_or(|t| now - t < HAZARD_LINGER_MS));

    cause
}
