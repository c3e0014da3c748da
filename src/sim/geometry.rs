//! Axis-aligned box geometry for bricks, paddle, power-ups and projectiles
//!
//! Every solid in the play volume is an AABB:
//! - center: world position
//! - half_extents: distance from center to each face

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One of the three world axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component of `v` along this axis
    #[inline]
    pub fn of(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    /// Mutable component of `v` along this axis
    #[inline]
    pub fn of_mut(self, v: &mut Vec3) -> &mut f32 {
        match self {
            Axis::X => &mut v.x,
            Axis::Y => &mut v.y,
            Axis::Z => &mut v.z,
        }
    }

    /// Unit vector along this axis
    #[inline]
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl Aabb {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    #[inline]
    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    /// Box grown by `margin` on every axis
    pub fn expanded(&self, margin: f32) -> Self {
        Self::new(self.center, self.half_extents + Vec3::splat(margin))
    }

    /// Inclusive point containment
    pub fn contains_point(&self, p: Vec3) -> bool {
        let d = (p - self.center).abs();
        d.x <= self.half_extents.x && d.y <= self.half_extents.y && d.z <= self.half_extents.z
    }

    /// Point of the box closest to `p`
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        p.clamp(self.min(), self.max())
    }

    /// Sphere-box overlap (touching counts)
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = self.closest_point(center);
        closest.distance_squared(center) <= radius * radius
    }

    /// Box-box overlap (touching counts)
    pub fn intersects(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        let reach = self.half_extents + other.half_extents;
        d.x <= reach.x && d.y <= reach.y && d.z <= reach.z
    }

    /// Overlap depth of a sphere into this box along each axis
    ///
    /// `half_extent + radius - |sphere - center|` per axis; positive on every
    /// axis while the sphere's bounding cube overlaps the box.
    pub fn penetration(&self, center: Vec3, radius: f32) -> Vec3 {
        self.half_extents + Vec3::splat(radius) - (center - self.center).abs()
    }

    /// Axis of least penetration: the face the sphere just crossed
    ///
    /// Ties go to the later axis (X loses to Y, Y loses to Z), matching a
    /// strict less-than comparison chain.
    pub fn struck_axis(&self, center: Vec3, radius: f32) -> Axis {
        let p = self.penetration(center, radius);
        if p.x < p.y && p.x < p.z {
            Axis::X
        } else if p.y < p.x && p.y < p.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }
}
