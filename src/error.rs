// src/error.rs

use thiserror::Error;

use crate::bsp::NodeId;

/// Everything that can go wrong while assembling, loading or validating a
/// collision tree. Queries against a validated tree never fail.
#[derive(Debug, Error)]
pub enum BspError {
    #[error("plane endpoints coincide at ({x}, {z})")]
    DegeneratePlane { x: f32, z: f32 },

    #[error("plane endpoints must be finite")]
    NonFinitePlane,

    #[error("root {root} is out of range for a tree of {len} nodes")]
    InvalidRoot { root: NodeId, len: usize },

    #[error("node {node} does not exist in a tree of {len} nodes")]
    UnknownNode { node: NodeId, len: usize },

    #[error("node {parent} references child {child}, but the tree only has {len} nodes")]
    InvalidChild {
        parent: NodeId,
        child: NodeId,
        len: usize,
    },

    #[error("node {node} is reachable through more than one parent (shared subtree or cycle)")]
    SharedNode { node: NodeId },

    #[error("tree depth exceeds the limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    #[error("invalid collision config: {0}")]
    InvalidConfig(String),

    #[error("malformed tree or config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
