// src/bsp/bsp_node.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bsp::Plane2;

/// Index of a node inside its tree's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in the BSP tree. Each node has:
/// - One splitting `plane`.
/// - Optionally a `front` child and a `behind` child.
///
/// A missing child is a leaf: open space in front of the plane, solid
/// space behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BspNode {
    pub plane: Plane2,
    #[serde(default)]
    pub front: Option<NodeId>,
    #[serde(default)]
    pub behind: Option<NodeId>,
}

impl BspNode {
    /// Create a node with no children: open in front, solid behind.
    pub fn new(plane: Plane2) -> Self {
        BspNode {
            plane,
            front: None,
            behind: None,
        }
    }

    pub fn with_children(plane: Plane2, front: Option<NodeId>, behind: Option<NodeId>) -> Self {
        BspNode {
            plane,
            front,
            behind,
        }
    }

    /// Returns `true` if neither side leads to another node.
    pub fn is_leaf(&self) -> bool {
        self.front.is_none() && self.behind.is_none()
    }

    /// Child ids in traversal order (front first).
    pub fn children(&self) -> impl Iterator<Item = NodeId> {
        self.front.into_iter().chain(self.behind)
    }
}
