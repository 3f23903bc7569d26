// src/bsp/mod.rs
pub mod bsp_node;
pub mod bsp_tree;
pub mod plane;
pub use bsp_node::{BspNode, NodeId};
pub use bsp_tree::{BspTree, BspTreeBuilder, SweepHit};
pub use plane::Plane2;

/// Points closer than this to a plane (in world units) classify as `On`.
pub const EPSILON: f32 = 0.01;
/// Deepest tree accepted at handoff. Sweep recursion never goes further.
pub const BSP_DEPTH_LIMIT: usize = 256;

/// Which side of a plane a point lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Classification {
    InFront,
    Behind,
    On,
}
