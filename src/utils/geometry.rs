// src/utils/geometry.rs
//! Conversions between 3D world space and the horizontal (X,Z) working plane.
//!
//! The working plane reuses `Vec2`, with `x` holding world X and `y` holding
//! world Z. World Y never survives the projection.

use glam::{Vec2, Vec3};

/// Projects a world-space point or vector onto the (X,Z) plane.
#[inline]
pub fn to_xz(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Lifts an (X,Z) vector back into world space with the given height.
#[inline]
pub fn from_xz(v: Vec2, y: f32) -> Vec3 {
    Vec3::new(v.x, y, v.y)
}

/// Linear interpolation between two points on the working plane.
#[inline]
pub fn lerp_xz(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a + (b - a) * t
}

/// Pins a time-of-impact that drifted just outside `[0, 1]` through
/// nested range mapping back onto the interval.
///
/// ```
/// use bsp_collision::utils::geometry::clamp_unit;
///
/// assert_eq!(clamp_unit(1.0000001), 1.0);
/// assert_eq!(clamp_unit(-0.0001), 0.0);
/// assert_eq!(clamp_unit(0.25), 0.25);
/// ```
#[inline]
pub fn clamp_unit(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}
