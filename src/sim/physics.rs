//! Ball physics and collision response
//!
//! Per tick, every active ball (primary first) is integrated, bounced off the
//! play volume, tested against the paddle and then against the bricks.
//!
//! Engine contract: a ball resolves at most ONE brick collision per tick, the
//! first active brick in collection order that its sphere touches. Chain
//! reactions triggered by that brick still run to completion in the same tick.
//! There is no continuous collision detection, so very fast balls can tunnel.

use std::collections::VecDeque;

use glam::Vec3;
use rand::Rng;

use super::events::GameEvent;
use super::geometry::Axis;
use super::levels::BrickType;
use super::powerups;
use super::state::{Ball, BrickKind, GameState, PowerUpKind};
use crate::consts::*;
use crate::play_half_extents;

/// Boss flash duration after a hit (ms)
const BOSS_FLASH_MS: f64 = 600.0;

/// How a ball step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Running,
    /// Primary ball left through the floor with no barrier
    BallLost,
}

/// Score awarded when a brick is destroyed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Award {
    Full,
    /// Chain-reaction and blast victims
    Half,
}

/// Brick struck by a ball this tick
#[derive(Debug, Clone, Copy)]
pub struct BrickContact {
    pub index: usize,
    /// Face axis the ball crossed
    pub axis: Axis,
}

/// Advance every ball by one tick
///
/// Returns `BallLost` as soon as the primary ball is lost; the remaining balls
/// are not stepped in that case.
pub fn step_balls(state: &mut GameState) -> StepOutcome {
    let now = state.now_ms;
    for brick in state.bricks.iter_mut().filter(|b| b.active) {
        brick.animate(now);
    }

    let speed = state.ball_speed();
    let mut balls = std::mem::take(&mut state.balls);
    let mut outcome = StepOutcome::Running;

    for ball in balls.iter_mut().filter(|b| b.active) {
        ball.pos += ball.vel;

        if resolve_boundaries(state, ball, speed) {
            if ball.is_extra {
                ball.active = false;
                continue;
            }
            outcome = StepOutcome::BallLost;
            break;
        }

        resolve_paddle(state, ball, speed);

        if let Some(contact) = find_brick_contact(state, ball) {
            resolve_brick(state, ball, contact, speed);
        }
    }

    balls.retain(|b| b.active);
    // Anything spawned into `state.balls` during the step goes after
    balls.append(&mut state.balls);
    state.balls = balls;
    outcome
}

/// Bounce off the six planes of the play volume shrunk by the ball radius
///
/// Returns true when the ball crossed the floor with no barrier.
fn resolve_boundaries(state: &mut GameState, ball: &mut Ball, speed: f32) -> bool {
    let half = play_half_extents();
    let r = ball.radius;
    let mut bounced = false;

    for axis in [Axis::X, Axis::Z] {
        let limit = axis.of(half) - r;
        let p = axis.of(ball.pos);
        let sign = if p >= limit {
            1.0
        } else if p <= -limit {
            -1.0
        } else {
            continue;
        };
        *axis.of_mut(&mut ball.pos) = sign * limit;
        let v = axis.of_mut(&mut ball.vel);
        *v = -sign * v.abs();
        state.emit(GameEvent::BallWallHit {
            pos: ball.pos,
            normal: axis.unit() * -sign,
        });
        bounced = true;
    }

    let ceiling = half.y - r;
    if ball.pos.y >= ceiling {
        ball.pos.y = ceiling;
        ball.vel.y = -ball.vel.y.abs();
        state.emit(GameEvent::BallWallHit {
            pos: ball.pos,
            normal: Vec3::NEG_Y,
        });
        bounced = true;
    }

    let floor = -half.y + r;
    if ball.pos.y <= floor {
        if state.barrier.is_none() {
            return true;
        }
        ball.pos.y = floor;
        ball.vel.y = ball.vel.y.abs();
        state.emit(GameEvent::BallWallHit {
            pos: ball.pos,
            normal: Vec3::Y,
        });
        bounced = true;
    }

    if bounced {
        ball.renormalize(speed);
    }
    false
}

/// Paddle bounce with impact-offset steering
fn resolve_paddle(state: &mut GameState, ball: &mut Ball, speed: f32) {
    let paddle = &state.paddle;
    if !paddle.aabb().expanded(ball.radius).contains_point(ball.pos) {
        return;
    }

    let impact_x = (ball.pos.x - paddle.pos.x) / paddle.effective_half_width();
    let impact_z = (ball.pos.z - paddle.pos.z) / paddle.half_depth;
    let top = ball.pos.y > paddle.pos.y && impact_x.abs() < 1.0 && impact_z.abs() < 1.0;

    // Already rebounding off the top
    if top && ball.vel.y > 0.0 {
        return;
    }

    let impact_speed = ball.vel.length();
    if top {
        ball.vel.y = ball.vel.y.abs();
        ball.vel.x += impact_x * PADDLE_STEER;
        ball.vel.z += impact_z * PADDLE_STEER;
    } else if impact_x.abs() > impact_z.abs() {
        ball.vel.x = impact_x.signum() * ball.vel.x.abs();
    } else {
        ball.vel.z = impact_z.signum() * ball.vel.z.abs();
    }
    ball.renormalize(speed);

    state.emit(GameEvent::BallPaddleHit { impact_speed });
    if !ball.is_extra {
        register_streak_hit(state, ball);
    }
}

/// Count a primary-ball paddle hit toward the streak
///
/// Hits less than `STREAK_WINDOW_MS` after the last counted one belong to the
/// same contact and are ignored.
fn register_streak_hit(state: &mut GameState, ball: &mut Ball) {
    let now = state.now_ms;
    if state
        .last_streak_hit_at
        .is_some_and(|t| now - t < STREAK_WINDOW_MS)
    {
        return;
    }
    state.hit_streak += 1;
    state.last_streak_hit_at = Some(now);

    let count = state.hit_streak;
    if count % STREAK_MILESTONE == 0 && count <= STREAK_MILESTONE_CAP {
        state.emit(GameEvent::HitStreak { count });
    }
    if count >= FIRE_AURA_STREAK && !ball.fire_aura {
        ball.fire_aura = true;
        state.emit(GameEvent::FireAuraIgnited);
    }
}

/// First active brick touched by the ball, in collection order
pub fn find_brick_contact(state: &GameState, ball: &Ball) -> Option<BrickContact> {
    state
        .bricks
        .iter()
        .enumerate()
        .filter(|(_, b)| b.active)
        .find(|(_, b)| b.aabb().intersects_sphere(ball.pos, ball.radius))
        .map(|(index, b)| BrickContact {
            index,
            axis: b.aabb().struck_axis(ball.pos, ball.radius),
        })
}

fn resolve_brick(state: &mut GameState, ball: &mut Ball, contact: BrickContact, speed: f32) {
    let v = contact.axis.of_mut(&mut ball.vel);
    *v = -*v;
    ball.renormalize(speed);

    let now = state.now_ms;
    let brick = &mut state.bricks[contact.index];

    if let BrickKind::Boss(boss) = &mut brick.kind {
        boss.health -= 1;
        boss.flash_until = now + BOSS_FLASH_MS;
        let health = boss.health;
        state.emit(GameEvent::BossHit { health });
        if health <= 0 {
            log::info!("Boss defeated");
            state.emit(GameEvent::BossDefeated);
            deactivate_brick(state, contact.index, Award::Full);
        }
        return;
    }

    let pos = brick.pos;
    if ball.explosive {
        deactivate_brick(state, contact.index, Award::Full);
        explode(state, pos, EXPLOSIVE_BALL_RADIUS);
        return;
    }

    brick.hits_remaining = brick.hits_remaining.saturating_sub(1);
    let event = GameEvent::BrickHit {
        id: brick.id,
        brick_type: brick.kind.brick_type(),
        hits_remaining: brick.hits_remaining,
    };
    let destroyed = brick.hits_remaining == 0;
    state.emit(event);
    if destroyed {
        deactivate_brick(state, contact.index, Award::Full);
    }
}

/// Destroy every active non-boss brick centered within `radius` of `center`
pub fn explode(state: &mut GameState, center: Vec3, radius: f32) {
    state.emit(GameEvent::Explosion {
        pos: center,
        radius,
    });
    for index in bricks_within(state, center, radius) {
        deactivate_brick(state, index, Award::Half);
    }
}

fn bricks_within(state: &GameState, center: Vec3, radius: f32) -> Vec<usize> {
    state
        .bricks
        .iter()
        .enumerate()
        .filter(|(_, b)| b.active && !b.kind.is_boss())
        .filter(|(_, b)| b.pos.distance(center) <= radius)
        .map(|(i, _)| i)
        .collect()
}

/// Destroy a brick and run its on-destroy effects
///
/// Idempotent: an inactive brick is left alone (no score, no effects).
/// Explosive bricks queue their neighbours instead of recursing; each brick
/// can only go inactive once, so the chain ends after at most one pass over
/// the bricks. Returns the number of bricks destroyed.
pub fn deactivate_brick(state: &mut GameState, index: usize, award: Award) -> usize {
    let mut queue = VecDeque::from([(index, award)]);
    let mut destroyed = 0;

    while let Some((index, award)) = queue.pop_front() {
        let Some(brick) = state.bricks.get_mut(index) else {
            continue;
        };
        if !brick.active {
            continue;
        }
        brick.active = false;
        brick.hits_remaining = 0;

        let points = match award {
            Award::Full => brick.points,
            Award::Half => brick.points / 2,
        };
        let pos = brick.pos;
        let id = brick.id;
        let brick_type = brick.kind.brick_type();
        let blast = match &mut brick.kind {
            BrickKind::Explosive { radius } => Some(*radius),
            BrickKind::Boss(boss) => {
                boss.projectiles.clear();
                boss.hazards.clear();
                None
            }
            _ => None,
        };

        state.score += points;
        destroyed += 1;
        state.emit(GameEvent::BrickDestroyed {
            id,
            brick_type,
            pos,
            points,
        });

        if let Some(radius) = blast {
            state.emit(GameEvent::Explosion { pos, radius });
            queue.extend(
                bricks_within(state, pos, radius)
                    .into_iter()
                    .map(|i| (i, Award::Half)),
            );
        }

        if brick_type == BrickType::Trigger {
            let kind = if state.rng.random::<bool>() {
                PowerUpKind::MultiBall
            } else {
                PowerUpKind::ExplosiveBall
            };
            powerups::spawn(state, kind, pos);
        }

        powerups::roll_drop(state, pos);
    }

    destroyed
}
