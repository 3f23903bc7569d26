// src/collision/level.rs

use std::sync::Arc;

use glam::Vec3;
use log::{info, warn};
use parking_lot::RwLock;

use crate::bsp::BspTree;
use crate::collision::{Collision, EnvironmentCollisions};
use crate::config::CollisionConfig;
use crate::error::BspError;

/// The collision environment of whichever level is currently loaded.
///
/// Loading a level swaps in a new environment; queries already running
/// keep the snapshot they started with. Trees are never modified in place.
#[derive(Debug)]
pub struct LevelCollisions {
    config: CollisionConfig,
    current: RwLock<Arc<EnvironmentCollisions>>,
}

impl Default for LevelCollisions {
    fn default() -> Self {
        Self::new(CollisionConfig::default())
    }
}

impl LevelCollisions {
    /// Starts out with no level loaded (the empty world).
    pub fn new(config: CollisionConfig) -> Self {
        LevelCollisions {
            config,
            current: RwLock::new(Arc::new(EnvironmentCollisions::empty())),
        }
    }

    /// Validates `tree` and makes it the active level. A rejected tree
    /// leaves the previous level in place.
    pub fn load(&self, tree: BspTree) -> Result<(), BspError> {
        let nodes = tree.len();
        let env = match EnvironmentCollisions::with_config(tree, self.config) {
            Ok(env) => env,
            Err(err) => {
                warn!("Rejected level collision tree: {}", err);
                return Err(err);
            }
        };
        *self.current.write() = Arc::new(env);
        info!("Loaded level collision tree ({} nodes)", nodes);
        Ok(())
    }

    /// Parses a compiled tree from JSON and loads it.
    pub fn load_json(&self, json: &str) -> Result<(), BspError> {
        self.load(BspTree::from_json(json)?)
    }

    /// Drops the active level; every query answers "no geometry" afterwards.
    pub fn unload(&self) {
        *self.current.write() = Arc::new(EnvironmentCollisions::empty());
        info!("Unloaded level collision tree");
    }

    /// Snapshot of the active environment.
    pub fn current(&self) -> Arc<EnvironmentCollisions> {
        self.current.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        !self.current.read().tree().is_empty()
    }

    pub fn is_point_in_obstacle(&self, point: Vec3) -> bool {
        self.current().is_point_in_obstacle(point)
    }

    pub fn check_movement(&self, position: Vec3, move_vector: Vec3) -> Option<Collision> {
        self.current().check_movement(position, move_vector)
    }
}
