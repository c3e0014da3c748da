//! Per-entity instance data for the renderer

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// What an instance draws
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Paddle = 0,
    Ball = 1,
    Brick = 2,
    Boss = 3,
    PowerUp = 4,
    Barrier = 5,
    Projectile = 6,
    Hazard = 7,
}

/// Instance flag bits
pub mod flags {
    pub const DAMAGED: u32 = 1 << 0;
    pub const EXPLOSIVE: u32 = 1 << 1;
    pub const FIRE_AURA: u32 = 1 << 2;
    pub const FLASHING: u32 = 1 << 3;
    pub const BLINKING: u32 = 1 << 4;
    pub const STRUCK: u32 = 1 << 5;
    pub const EXTRA: u32 = 1 << 6;
}

/// One box or sphere, packed for a GPU instance buffer (48 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Instance {
    pub position: [f32; 3],
    pub kind: u32,
    /// Half size per axis (radius on every axis for spheres)
    pub half_extents: [f32; 3],
    pub flags: u32,
    pub color: [f32; 4],
}

impl Instance {
    pub fn new(kind: ShapeKind, position: Vec3, half_extents: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            kind: kind as u32,
            half_extents: half_extents.to_array(),
            flags: 0,
            color,
        }
    }

    pub fn sphere(kind: ShapeKind, position: Vec3, radius: f32, color: [f32; 4]) -> Self {
        Self::new(kind, position, Vec3::splat(radius), color)
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags |= flags;
        self
    }
}

/// `0xRRGGBB` to linear-ish RGBA floats
pub const fn rgba(hex: u32, alpha: f32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        alpha,
    ]
}

/// Colors for game elements
pub mod colors {
    use super::rgba;

    pub const PADDLE: [f32; 4] = rgba(0x00ffff, 1.0);
    pub const BALL: [f32; 4] = rgba(0xffffff, 1.0);
    pub const BALL_EXPLOSIVE: [f32; 4] = rgba(0xff6600, 1.0);
    pub const EXTRA_BALLS: [[f32; 4]; 2] = [rgba(0xff0000, 1.0), rgba(0x00ff00, 1.0)];
    pub const BOSS_FLASH: [f32; 4] = rgba(0xff0000, 1.0);
    pub const BARRIER: u32 = 0x808080;
    pub const PROJECTILE: [f32; 4] = rgba(0xff0000, 1.0);
    pub const HAZARD_WARNING: [f32; 4] = rgba(0xff0000, 0.8);
    pub const HAZARD_STRIKE: [f32; 4] = rgba(0x00ffff, 0.8);
    /// Opacity of a brick that has taken a hit
    pub const DAMAGED_ALPHA: f32 = 0.7;
}
