//! Result of a swept movement query.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// First contact of a movement against the level geometry.
///
/// All values are in world space. The normal always lies in the
/// horizontal plane (its Y component is zero).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    point: Vec3,
    normal: Vec3,
    distance: f32,
    t: f32,
}

impl Collision {
    pub fn new(point: Vec3, normal: Vec3, distance: f32, t: f32) -> Self {
        Collision {
            point,
            normal,
            distance,
            t,
        }
    }

    /// Where the mover touches the surface.
    pub fn point(&self) -> Vec3 {
        self.point
    }

    /// Unit normal of the surface that was hit.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Distance travelled before contact.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Fraction of the requested movement completed before contact, in `[0, 1]`.
    pub fn t(&self) -> f32 {
        self.t
    }
}
