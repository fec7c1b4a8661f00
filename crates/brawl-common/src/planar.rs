//! Horizontal-plane (XZ) helpers.
//!
//! World space is Y-up. Locomotion, collision correction and culling all
//! work on the XZ plane; Y is reserved for gravity and terrain height.

use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

/// Separations below this are treated as coincident.
pub const PLANAR_EPSILON: f32 = 1e-4;

/// Drops the vertical component.
#[must_use]
pub fn flat(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Projects a world vector onto the XZ plane as a `Vec2` (x, z).
#[must_use]
pub fn to_xz(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Horizontal distance between two points.
#[must_use]
pub fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    to_xz(b - a).length()
}

/// Horizontal speed of a velocity vector.
#[must_use]
pub fn flat_speed(v: Vec3) -> f32 {
    to_xz(v).length()
}

/// Unit horizontal direction from `from` to `to`, or `None` when the
/// points coincide on the XZ plane.
#[must_use]
pub fn flat_direction(from: Vec3, to: Vec3) -> Option<Vec3> {
    let d = flat(to - from);
    let len = d.length();
    if len < PLANAR_EPSILON {
        None
    } else {
        Some(d / len)
    }
}

/// Uniformly random unit vector on the XZ plane.
#[must_use]
pub fn random_unit_xz(rng: &mut fastrand::Rng) -> Vec3 {
    let angle = rng.f32() * TAU;
    Vec3::new(angle.cos(), 0.0, angle.sin())
}

/// Horizontal perpendicular (rotated 90 degrees around +Y).
#[must_use]
pub fn perpendicular_xz(v: Vec3) -> Vec3 {
    Vec3::new(-v.z, 0.0, v.x)
}

/// Yaw (rotation around +Y) that faces along `v`; 0 faces +Z.
#[must_use]
pub fn yaw_of(v: Vec3) -> f32 {
    v.x.atan2(v.z)
}

/// Uniform sample in `[min, max)`.
#[must_use]
pub fn random_range(rng: &mut fastrand::Rng, min: f32, max: f32) -> f32 {
    min + rng.f32() * (max - min)
}

/// Exponential per-frame decay normalized to 60 FPS: `factor^(dt * 60)`.
///
/// Applying this every tick gives the same decay over one second whatever
/// the frame rate.
#[must_use]
pub fn frame_decay(factor: f32, dt: f32) -> f32 {
    factor.powf(dt * 60.0)
}
