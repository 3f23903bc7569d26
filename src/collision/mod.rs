// src/collision/mod.rs
pub mod environment;
pub mod level;
pub mod result;
pub use environment::EnvironmentCollisions;
pub use level::LevelCollisions;
pub use result::Collision;
