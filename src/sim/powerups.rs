//! Power-up drops and timed effects
//!
//! Effects never use host timers: each one stores a deadline on its target
//! and `expire_effects` checks the deadlines against the sim clock every
//! playing tick. Pausing freezes the clock, so effects freeze with it.

use glam::Vec3;
use rand::Rng;

use super::events::{EffectKind, GameEvent};
use super::state::{Ball, Barrier, GameState, PowerUp, PowerUpKind};
use crate::consts::*;
use crate::floor_y;

/// Paddle size effects: (multiplier, duration ms)
const SIZE_UP: (f32, f64) = (1.5, 5000.0);
const DOUBLE_SIZE: (f32, f64) = (2.0, 10000.0);

const EXPLOSIVE_BALL_MS: f64 = 10000.0;
const EXTRA_BALL_MS: f64 = 5000.0;
const EXTRA_BALLS: usize = 2;

/// Drop a falling power-up at `pos`
pub fn spawn(state: &mut GameState, kind: PowerUpKind, pos: Vec3) {
    let id = state.next_entity_id();
    state.powerups.push(PowerUp {
        id,
        kind,
        pos,
        vel: Vec3::new(0.0, -PowerUp::FALL_SPEED, 0.0),
        active: true,
    });
    log::debug!("Spawned {:?} power-up at {:?}", kind, pos);
    state.emit(GameEvent::PowerUpSpawned { kind, pos });
}

/// Roll the level's drop chance for a destroyed brick
pub fn roll_drop(state: &mut GameState, pos: Vec3) {
    let kinds = state.level_def().powerups;
    if kinds.is_empty() || state.rng.random::<f32>() >= state.powerup_chance {
        return;
    }
    let kind = kinds[state.rng.random_range(0..kinds.len())];
    spawn(state, kind, pos);
}

/// Move falling power-ups, collect the ones touching the paddle
pub fn update(state: &mut GameState) {
    let paddle = state.paddle.aabb();
    let floor = floor_y();
    let mut collected = Vec::new();

    for powerup in state.powerups.iter_mut().filter(|p| p.active) {
        powerup.pos += powerup.vel;
        if powerup.aabb().intersects(&paddle) {
            powerup.active = false;
            collected.push(powerup.kind);
        } else if powerup.pos.y < floor {
            powerup.active = false;
        }
    }
    state.powerups.retain(|p| p.active);

    for kind in collected {
        state.emit(GameEvent::PowerUpCollected { kind });
        apply(state, kind);
    }
}

/// Apply a collected power-up
pub fn apply(state: &mut GameState, kind: PowerUpKind) {
    log::debug!("Applying {:?}", kind);
    match kind {
        PowerUpKind::PaddleSizeUp => apply_size(state, SIZE_UP),
        PowerUpKind::PaddleDoubleSize => apply_size(state, DOUBLE_SIZE),
        PowerUpKind::MultiBall => spawn_extra_balls(state),
        PowerUpKind::ExplosiveBall => {
            let until = state.now_ms + EXPLOSIVE_BALL_MS;
            if let Some(ball) = state.primary_ball_mut() {
                ball.explosive = true;
                ball.explosive_until = Some(until);
            }
        }
        PowerUpKind::Barrier => {
            if state.barrier.is_none() {
                state.barrier = Some(Barrier::timed(state.now_ms));
            }
        }
    }
}

/// Size effects do not stack: a second one while active is ignored
fn apply_size(state: &mut GameState, (multiplier, duration): (f32, f64)) {
    let paddle = &mut state.paddle;
    if paddle.size_effect_expiry.is_some() {
        return;
    }
    paddle.size_multiplier = multiplier;
    paddle.size_effect_expiry = Some(state.now_ms + duration);
    paddle.clamp_to_arena();
}

fn spawn_extra_balls(state: &mut GameState) {
    if state.primary_ball().is_none() {
        return;
    }
    let speed = state.ball_speed();
    let origin = state.paddle.pos + Vec3::Y * BALL_RADIUS * 2.0;

    for i in 0..EXTRA_BALLS {
        let angle = (i + 1) as f32 * std::f32::consts::FRAC_PI_3;
        let vel = Vec3::new(
            angle.cos() * 0.2,
            angle.sin().abs() * 0.2,
            state.random_range(-0.05, 0.05),
        )
        .normalize()
            * speed;
        let id = state.next_entity_id();
        let now = state.now_ms;
        state.balls.push(Ball::new_extra(id, origin, vel, now));
    }
}

/// Revert every effect whose deadline has passed
pub fn expire_effects(state: &mut GameState) {
    let now = state.now_ms;

    if state.paddle.size_effect_expiry.is_some_and(|t| now >= t) {
        state.paddle.size_multiplier = 1.0;
        state.paddle.size_effect_expiry = None;
        state.emit(GameEvent::EffectExpired {
            kind: EffectKind::PaddleSize,
        });
    }

    let mut explosive_expired = false;
    if let Some(ball) = state.primary_ball_mut() {
        if ball.explosive_until.is_some_and(|t| now >= t) {
            ball.explosive = false;
            ball.explosive_until = None;
            explosive_expired = true;
        }
    }
    if explosive_expired {
        state.emit(GameEvent::EffectExpired {
            kind: EffectKind::ExplosiveBall,
        });
    }

    let before = state.balls.len();
    state
        .balls
        .retain(|b| !(b.is_extra && now - b.created_at >= EXTRA_BALL_MS));
    for _ in state.balls.len()..before {
        state.emit(GameEvent::EffectExpired {
            kind: EffectKind::ExtraBall,
        });
    }

    update_barrier(state);
}

fn update_barrier(state: &mut GameState) {
    let now = state.now_ms;
    let Some(barrier) = state.barrier.as_mut() else {
        return;
    };
    let Some(expires_at) = barrier.expires_at else {
        return;
    };

    if now >= expires_at {
        state.barrier = None;
        state.emit(GameEvent::BarrierExpired);
    } else if !barrier.blinking && now >= expires_at - Barrier::BLINK_MS {
        barrier.blinking = true;
        state.emit(GameEvent::BarrierBlinking);
    }
}
