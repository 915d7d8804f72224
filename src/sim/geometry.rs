//! 2D vector helpers on top of `glam::Vec2`
//!
//! Playfield coordinates: origin top-left, +y pointing down.

use glam::Vec2;

/// Axis-aligned playfield rectangle `[0, width] x [0, height]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Clamp a circle of `radius` so it stays fully inside the playfield
    pub fn clamp_with_radius(&self, pos: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            pos.x.clamp(radius, (self.width - radius).max(radius)),
            pos.y.clamp(radius, (self.height - radius).max(radius)),
        )
    }

    /// True if `pos` is more than `margin` outside the playfield
    pub fn is_outside(&self, pos: Vec2, margin: f32) -> bool {
        pos.x < -margin
            || pos.x > self.width + margin
            || pos.y < -margin
            || pos.y > self.height + margin
    }
}

/// Normalize, falling back to +x for a zero vector
#[inline]
pub fn direction_or_right(v: Vec2) -> Vec2 {
    if v.length_squared() == 0.0 {
        Vec2::X
    } else {
        v.normalize()
    }
}

/// Unit vector at `angle` radians
#[inline]
pub fn from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of a vector in radians (atan2)
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Circle overlap test: `|a - b| < ra + rb`
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance_squared(b) < (ra + rb) * (ra + rb)
}

/// Point-in-radius test (strict)
#[inline]
pub fn within(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) < radius * radius
}

/// Signed smallest difference between two angles, in `[-PI, PI)`
pub fn angle_delta(from: f32, to: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut d = (to - from) % TAU;
    if d >= PI {
        d -= TAU;
    } else if d < -PI {
        d += TAU;
    }
    d
}
