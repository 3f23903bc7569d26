// src/bsp/plane.rs
// The half-plane primitive every BSP node splits on.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::bsp::Classification;
use crate::error::BspError;
use crate::utils::geometry::lerp_xz;

/// Wire form of a plane: just its two boundary points.
#[derive(Serialize, Deserialize)]
struct PlaneEndpoints {
    start: Vec2,
    end: Vec2,
}

/// An infinite line through two boundary points on the (X,Z) plane.
///
/// The front side is the one the normal points to. Walking from `start`
/// to `end`, the front is on the right, so a boundary from (0,0) to (0,10)
/// faces +X.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PlaneEndpoints", into = "PlaneEndpoints")]
pub struct Plane2 {
    start: Vec2,
    end: Vec2,
    normal: Vec2,
    dist: f32,
}

impl Plane2 {
    pub fn new(start: Vec2, end: Vec2) -> Result<Self, BspError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(BspError::NonFinitePlane);
        }
        let dir = end - start;
        let len = dir.length();
        if len <= f32::EPSILON {
            return Err(BspError::DegeneratePlane {
                x: start.x,
                z: start.y,
            });
        }
        let normal = Vec2::new(dir.y, -dir.x) / len;
        Ok(Plane2 {
            start,
            end,
            normal,
            dist: normal.dot(start),
        })
    }

    pub fn start(&self) -> Vec2 {
        self.start
    }

    pub fn end(&self) -> Vec2 {
        self.end
    }

    /// Unit normal, pointing into the front half-plane.
    pub fn normal(&self) -> Vec2 {
        self.normal
    }

    /// Positive in front, negative behind, in world units.
    #[inline]
    pub fn signed_distance(&self, point: Vec2) -> f32 {
        self.normal.dot(point) - self.dist
    }

    pub fn classify(&self, point: Vec2, epsilon: f32) -> Classification {
        let d = self.signed_distance(point);
        if d.abs() <= epsilon {
            Classification::On
        } else if d > epsilon {
            Classification::InFront
        } else {
            Classification::Behind
        }
    }

    /// Side a segment is on when it does not cross the plane. A start
    /// point lying on the plane defers to the end point.
    pub fn side_of(&self, seg_start: Vec2, seg_end: Vec2, epsilon: f32) -> Classification {
        match self.classify(seg_start, epsilon) {
            Classification::On => self.classify(seg_end, epsilon),
            side => side,
        }
    }

    /// Point where the segment crosses the plane and its parametric
    /// position along the segment. Only strict crossings count: an
    /// endpoint within `epsilon` of the plane never produces one.
    pub fn intersect(&self, seg_start: Vec2, seg_end: Vec2, epsilon: f32) -> Option<(Vec2, f32)> {
        let start_side = self.side_of(seg_start, seg_end, epsilon);
        let end_side = self.classify(seg_end, epsilon);
        match (start_side, end_side) {
            (Classification::InFront, Classification::Behind)
            | (Classification::Behind, Classification::InFront) => {
                let d0 = self.signed_distance(seg_start);
                let d1 = self.signed_distance(seg_end);
                let t = d0 / (d0 - d1);
                Some((lerp_xz(seg_start, seg_end, t), t))
            }
            _ => None,
        }
    }
}

impl TryFrom<PlaneEndpoints> for Plane2 {
    type Error = BspError;

    fn try_from(value: PlaneEndpoints) -> Result<Self, Self::Error> {
        Plane2::new(value.start, value.end)
    }
}

impl From<Plane2> for PlaneEndpoints {
    fn from(plane: Plane2) -> Self {
        PlaneEndpoints {
            start: plane.start,
            end: plane.end,
        }
    }
}
