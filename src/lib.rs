// src/lib.rs
//! # bsp_collision
//!
//! Read-only 2D BSP collision queries for levels laid out on the horizontal
//! (X,Z) plane: whether a point is inside solid geometry, and where a
//! movement first touches a wall.
//!
//! ```
//! use bsp_collision::bsp::{BspTreeBuilder, Plane2};
//! use bsp_collision::collision::EnvironmentCollisions;
//! use glam::{Vec2, Vec3};
//!
//! let mut builder = BspTreeBuilder::new();
//! let wall = builder.add_node(Plane2::new(Vec2::new(0.0, 0.0), Vec2::new(0.0, 10.0))?);
//! let env = EnvironmentCollisions::new(builder.build(Some(wall))?)?;
//!
//! assert!(env.is_point_in_obstacle(Vec3::new(-1.0, 0.0, 5.0)));
//! let hit = env.check_movement(Vec3::new(1.0, 0.0, 5.0), Vec3::new(-2.0, 0.0, 0.0)).unwrap();
//! assert_eq!(hit.t(), 0.5);
//! # Ok::<(), bsp_collision::BspError>(())
//! ```

pub mod bsp;
pub mod collision;
pub mod config;
pub mod error;
pub mod utils;

pub use collision::{Collision, EnvironmentCollisions, LevelCollisions};
pub use config::CollisionConfig;
pub use error::BspError;
