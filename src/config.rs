// src/config.rs

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bsp::{BSP_DEPTH_LIMIT, EPSILON};
use crate::error::BspError;

/// Tuning for a collision environment.
///
/// The defaults match the engine's fixed constants. Overriding them is
/// meant for tools and for tests that exercise either side of the on-plane
/// tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Distance within which a point counts as lying on a plane.
    pub epsilon: f32,
    /// Deepest tree the environment accepts. Can only tighten
    /// [`BSP_DEPTH_LIMIT`], which every tree is already held to.
    pub max_depth: usize,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        CollisionConfig {
            epsilon: EPSILON,
            max_depth: BSP_DEPTH_LIMIT,
        }
    }
}

impl CollisionConfig {
    pub fn from_json(json: &str) -> Result<Self, BspError> {
        let config: CollisionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, BspError> {
        let reader = BufReader::new(File::open(path)?);
        let config: CollisionConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BspError> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(BspError::InvalidConfig(format!(
                "epsilon must be finite and non-negative, got {}",
                self.epsilon
            )));
        }
        if self.max_depth == 0 || self.max_depth > BSP_DEPTH_LIMIT {
            return Err(BspError::InvalidConfig(format!(
                "max_depth must be between 1 and {}, got {}",
                BSP_DEPTH_LIMIT, self.max_depth
            )));
        }
        Ok(())
    }
}
