//! Collision queries against a level's static geometry.
//!
//! [`EnvironmentCollisions`] is what movement code talks to. It works in
//! world space and hands the horizontal (X,Z) part of every query to the
//! BSP tree; world Y is ignored throughout.

use glam::Vec3;
use log::{debug, trace};
use rayon::prelude::*;

use crate::bsp::BspTree;
use crate::collision::Collision;
use crate::config::CollisionConfig;
use crate::error::BspError;
use crate::utils::geometry::{clamp_unit, from_xz, to_xz};

/// Point and movement queries against one validated BSP tree.
///
/// # Thread Safety
///
/// Immutable once built. Share it by reference or behind an `Arc` and
/// query from as many threads as needed; the tree must be fully built
/// before it is handed over, which the constructors guarantee.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentCollisions {
    tree: BspTree,
    config: CollisionConfig,
}

impl EnvironmentCollisions {
    /// A world with no geometry: never obstructed, never colliding.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(tree: BspTree) -> Result<Self, BspError> {
        Self::with_config(tree, CollisionConfig::default())
    }

    /// Takes ownership of `tree` after checking it against `config`.
    pub fn with_config(tree: BspTree, config: CollisionConfig) -> Result<Self, BspError> {
        config.validate()?;
        let depth = tree.validate(config.max_depth)?;
        debug!(
            "Collision environment ready: {} nodes, depth {}, epsilon {}",
            tree.len(),
            depth,
            config.epsilon
        );
        Ok(EnvironmentCollisions { tree, config })
    }

    pub fn tree(&self) -> &BspTree {
        &self.tree
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// `true` if `point` is inside solid geometry.
    ///
    /// This is the negation of the tree's region test. Y is ignored.
    pub fn is_point_in_obstacle(&self, point: Vec3) -> bool {
        if self.tree.is_empty() {
            return false;
        }
        !self.tree.region_test(to_xz(point), self.config.epsilon)
    }

    /// Sweeps `position` along `move_vector` and returns the first contact,
    /// or `None` if the whole movement is free.
    pub fn check_movement(&self, position: Vec3, move_vector: Vec3) -> Option<Collision> {
        if self.tree.is_empty() {
            return None;
        }
        let start = to_xz(position);
        let end = to_xz(position + move_vector);
        let hit = self
            .tree
            .sweep_test(start, end, 0.0, 1.0, self.config.epsilon)?;

        let t = clamp_unit(hit.t);
        let collision = Collision::new(
            position + move_vector * t,
            from_xz(hit.normal, 0.0),
            move_vector.length() * t,
            t,
        );
        trace!("Movement from {} by {} hit {:?}", position, move_vector, collision);
        Some(collision)
    }

    /// [`is_point_in_obstacle`](Self::is_point_in_obstacle) for many points
    /// at once, in parallel. Results keep the input order.
    pub fn points_in_obstacles(&self, points: &[Vec3]) -> Vec<bool> {
        points
            .par_iter()
            .map(|&point| self.is_point_in_obstacle(point))
            .collect()
    }

    /// [`check_movement`](Self::check_movement) for many `(position,
    /// move_vector)` pairs at once, in parallel. Results keep the input order.
    pub fn check_movements(&self, moves: &[(Vec3, Vec3)]) -> Vec<Option<Collision>> {
        moves
            .par_iter()
            .map(|&(position, move_vector)| self.check_movement(position, move_vector))
            .collect()
    }
}
