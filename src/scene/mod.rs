//! Render feed
//!
//! Flattens a [`GameState`] into instance data once per frame. The renderer
//! only ever sees this; it never touches simulation state.

mod instance;

pub use instance::{Instance, ShapeKind, colors, flags, rgba};

use glam::Vec3;

use crate::consts::BRICK_HEIGHT;
use crate::{floor_y, play_half_extents};
use crate::sim::levels::brick_stats;
use crate::sim::state::{BrickKind, GameState, PowerUp, PowerUpKind};
use crate::sim::trajectory::{self, TRAJECTORY_POINTS};

/// Everything the renderer draws in one frame
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub instances: Vec<Instance>,
    pub clear_color: [f32; 4],
    /// Aiming guide points (empty when disabled)
    pub trajectory: Vec<Vec3>,
}

impl Scene {
    /// Instance buffer as raw floats (flags and kinds are bit-cast u32s)
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn count(&self, kind: ShapeKind) -> usize {
        self.instances
            .iter()
            .filter(|i| i.kind == kind as u32)
            .count()
    }
}

/// Build the frame's scene from the current state
pub fn build(state: &GameState) -> Scene {
    let now = state.now_ms;
    let mut instances = Vec::with_capacity(state.bricks.len() + state.balls.len() + 8);

    instances.push(Instance::new(
        ShapeKind::Paddle,
        state.paddle.pos,
        state.paddle.aabb().half_extents,
        colors::PADDLE,
    ));

    let mut extra = 0;
    for ball in state.balls.iter().filter(|b| b.active) {
        let mut bits = 0;
        let color = if ball.is_extra {
            bits |= flags::EXTRA;
            extra += 1;
            colors::EXTRA_BALLS[(extra - 1) % colors::EXTRA_BALLS.len()]
        } else if ball.explosive {
            bits |= flags::EXPLOSIVE;
            colors::BALL_EXPLOSIVE
        } else {
            colors::BALL
        };
        if ball.fire_aura {
            bits |= flags::FIRE_AURA;
        }
        instances.push(
            Instance::sphere(ShapeKind::Ball, ball.pos, ball.radius, color).with_flags(bits),
        );
    }

    for brick in state.active_bricks() {
        let stats = brick_stats(brick.kind.brick_type());
        match &brick.kind {
            BrickKind::Boss(boss) => {
                let flashing = boss.is_flashing(now);
                let color = if flashing {
                    colors::BOSS_FLASH
                } else {
                    rgba(stats.color, 1.0)
                };
                let bits = if flashing { flags::FLASHING } else { 0 };
                instances.push(
                    Instance::new(ShapeKind::Boss, brick.pos, brick.half_extents, color)
                        .with_flags(bits),
                );
                for p in &boss.projectiles {
                    instances.push(Instance::sphere(
                        ShapeKind::Projectile,
                        p.pos,
                        p.radius,
                        colors::PROJECTILE,
                    ));
                }
                for h in &boss.hazards {
                    let (color, bits) = match h.struck_at {
                        Some(_) => (colors::HAZARD_STRIKE, flags::STRUCK),
                        None => (colors::HAZARD_WARNING, 0),
                    };
                    let pos = Vec3::new(h.x, floor_y(), h.z);
                    instances.push(
                        Instance::new(ShapeKind::Hazard, pos, Vec3::new(1.5, 0.1, 1.5), color)
                            .with_flags(bits),
                    );
                }
            }
            _ => {
                let damaged = brick.is_damaged();
                let alpha = if damaged { colors::DAMAGED_ALPHA } else { 1.0 };
                let bits = if damaged { flags::DAMAGED } else { 0 };
                instances.push(
                    Instance::new(
                        ShapeKind::Brick,
                        brick.pos,
                        brick.half_extents,
                        rgba(stats.color, alpha),
                    )
                    .with_flags(bits),
                );
            }
        }
    }

    for p in &state.powerups {
        instances.push(Instance::new(
            ShapeKind::PowerUp,
            p.pos,
            PowerUp::HALF_EXTENTS,
            powerup_color(p.kind),
        ));
    }

    if let Some(barrier) = &state.barrier {
        let half = play_half_extents();
        let thickness = BRICK_HEIGHT / 4.0;
        let bits = if barrier.blinking { flags::BLINKING } else { 0 };
        instances.push(
            Instance::new(
                ShapeKind::Barrier,
                Vec3::new(0.0, floor_y() + thickness, 0.0),
                Vec3::new(half.x, thickness, half.z),
                rgba(colors::BARRIER, barrier.opacity(now)),
            )
            .with_flags(bits),
        );
    }

    let trajectory = if state.settings.show_trajectory {
        trajectory::predict(state, TRAJECTORY_POINTS)
    } else {
        Vec::new()
    };

    Scene {
        instances,
        clear_color: rgba(state.level_def().background_color, 1.0),
        trajectory,
    }
}

fn powerup_color(kind: PowerUpKind) -> [f32; 4] {
    let hex = match kind {
        PowerUpKind::PaddleSizeUp => 0x00aaff,
        PowerUpKind::PaddleDoubleSize => 0x0066ff,
        PowerUpKind::MultiBall => 0xff00ff,
        PowerUpKind::ExplosiveBall => 0xff6600,
        PowerUpKind::Barrier => 0x808080,
    };
    rgba(hex, 1.0)
}
