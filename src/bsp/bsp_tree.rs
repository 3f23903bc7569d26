// src/bsp/bsp_tree.rs

use std::io::Read;

use glam::Vec2;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::bsp::{BspNode, Classification, NodeId, Plane2, BSP_DEPTH_LIMIT};
use crate::error::BspError;

/// Earliest contact found by a sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Fraction of the full sweep at which contact occurs.
    pub t: f32,
    /// Normal of the plane that stopped the sweep.
    pub normal: Vec2,
    /// Node owning that plane.
    pub node: NodeId,
}

/// Serialized shape of a tree, before validation.
#[derive(Deserialize)]
struct RawTree {
    nodes: Vec<BspNode>,
    #[serde(default)]
    root: Option<NodeId>,
}

/// A read-only BSP tree stored as a flat node arena.
///
/// Every node has at most one parent and the tree is acyclic. Both are
/// checked once, when the tree is assembled, so queries can trust the
/// shape without re-checking it.
///
/// # Thread Safety
///
/// The tree is never mutated after construction and can be shared across
/// threads for parallel queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTree")]
pub struct BspTree {
    nodes: Vec<BspNode>,
    root: Option<NodeId>,
    #[serde(skip)]
    depth: usize,
}

impl TryFrom<RawTree> for BspTree {
    type Error = BspError;

    fn try_from(raw: RawTree) -> Result<Self, Self::Error> {
        BspTree::from_parts(raw.nodes, raw.root)
    }
}

impl BspTree {
    /// A tree with no geometry: nothing is ever obstructed.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assemble a tree from an arena and its root, checking its shape
    /// against [`BSP_DEPTH_LIMIT`].
    pub fn from_parts(nodes: Vec<BspNode>, root: Option<NodeId>) -> Result<Self, BspError> {
        let mut tree = BspTree {
            nodes,
            root,
            depth: 0,
        };
        tree.depth = tree.validate(BSP_DEPTH_LIMIT)?;
        Ok(tree)
    }

    pub fn from_json(json: &str) -> Result<Self, BspError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BspError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_json(&self) -> Result<String, BspError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Walks the tree from the root and returns its depth (a lone root is
    /// depth 1, an empty tree depth 0).
    ///
    /// Fails on out-of-range ids, on any node reachable twice (shared
    /// subtrees and cycles alike) and on trees deeper than `max_depth`.
    /// Nodes not reachable from the root are ignored.
    pub fn validate(&self, max_depth: usize) -> Result<usize, BspError> {
        let len = self.nodes.len();
        let Some(root) = self.root else {
            return Ok(0);
        };
        if root.index() >= len {
            return Err(BspError::InvalidRoot { root, len });
        }

        let mut seen = vec![false; len];
        seen[root.index()] = true;
        let mut stack = vec![(root, 1usize)];
        let mut depth = 0;
        let mut reached = 0;

        while let Some((id, level)) = stack.pop() {
            if level > max_depth {
                return Err(BspError::DepthLimitExceeded { limit: max_depth });
            }
            depth = depth.max(level);
            reached += 1;

            for child in self.nodes[id.index()].children() {
                if child.index() >= len {
                    return Err(BspError::InvalidChild {
                        parent: id,
                        child,
                        len,
                    });
                }
                if seen[child.index()] {
                    return Err(BspError::SharedNode { node: child });
                }
                seen[child.index()] = true;
                stack.push((child, level + 1));
            }
        }

        if reached < len {
            debug!("BSP tree has {} unreachable nodes", len - reached);
        }
        debug!("Validated BSP tree: {} nodes, depth {}", reached, depth);
        Ok(depth)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&BspNode> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> &[BspNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` when there is no root, i.e. the world has no geometry.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Follows the point down the tree until it falls out of a missing
    /// child: `true` for an open leaf in front of a plane, `false` for a
    /// solid leaf behind one. An empty tree is all open.
    pub fn region_test(&self, point: Vec2, epsilon: f32) -> bool {
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id.index()];
            current = match node.plane.classify(point, epsilon) {
                Classification::InFront => match node.front {
                    Some(front) => Some(front),
                    None => return true,
                },
                Classification::Behind | Classification::On => match node.behind {
                    Some(behind) => Some(behind),
                    None => return false,
                },
            };
        }
        true
    }

    /// Sweeps the segment `seg_start -> seg_end` through the tree. The
    /// segment spans times `start_t..end_t` of the caller's movement and
    /// the returned hit is expressed in that range.
    ///
    /// At every plane the segment crosses, the part before the crossing
    /// goes down the front subtree and the first hit found there wins.
    /// There is no comparison between sibling hits: the earliest contact is
    /// only guaranteed when the tree orders its planes near to far.
    pub fn sweep_test(
        &self,
        seg_start: Vec2,
        seg_end: Vec2,
        start_t: f32,
        end_t: f32,
        epsilon: f32,
    ) -> Option<SweepHit> {
        let root = self.root?;
        self.sweep_node(root, seg_start, seg_end, start_t, end_t, epsilon)
    }

    fn sweep_node(
        &self,
        id: NodeId,
        seg_start: Vec2,
        seg_end: Vec2,
        start_t: f32,
        end_t: f32,
        epsilon: f32,
    ) -> Option<SweepHit> {
        let node = &self.nodes[id.index()];
        let plane = &node.plane;

        let Some((split_point, local_t)) = plane.intersect(seg_start, seg_end, epsilon) else {
            return match plane.side_of(seg_start, seg_end, epsilon) {
                Classification::InFront => {
                    let front = node.front?;
                    self.sweep_node(front, seg_start, seg_end, start_t, end_t, epsilon)
                }
                Classification::Behind | Classification::On => match node.behind {
                    Some(behind) => {
                        self.sweep_node(behind, seg_start, seg_end, start_t, end_t, epsilon)
                    }
                    None => Some(Self::hit(id, plane, start_t)),
                },
            };
        };

        let split_t = start_t + (end_t - start_t) * local_t;

        if let Some(front) = node.front {
            let hit = self.sweep_node(front, seg_start, split_point, start_t, split_t, epsilon);
            if hit.is_some() {
                return hit;
            }
        }

        match node.behind {
            Some(behind) => self.sweep_node(behind, split_point, seg_end, split_t, end_t, epsilon),
            None => Some(Self::hit(id, plane, split_t)),
        }
    }

    fn hit(id: NodeId, plane: &Plane2, t: f32) -> SweepHit {
        trace!("Sweep stopped by node {} at t = {}", id, t);
        SweepHit {
            t,
            normal: plane.normal(),
            node: id,
        }
    }
}

/// Assembles a tree node by node. The level compiler decides the planes
/// and the links; the builder only records them and checks the result.
#[derive(Debug, Default)]
pub struct BspTreeBuilder {
    nodes: Vec<BspNode>,
}

impl BspTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with no children and returns its id.
    pub fn add_node(&mut self, plane: Plane2) -> NodeId {
        self.add_split(plane, None, None)
    }

    /// Adds a node whose children already exist (bottom-up construction).
    pub fn add_split(
        &mut self,
        plane: Plane2,
        front: Option<NodeId>,
        behind: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(BspNode::with_children(plane, front, behind));
        id
    }

    pub fn set_front(&mut self, parent: NodeId, child: NodeId) -> Result<(), BspError> {
        self.node_mut(parent)?.front = Some(child);
        Ok(())
    }

    pub fn set_behind(&mut self, parent: NodeId, child: NodeId) -> Result<(), BspError> {
        self.node_mut(parent)?.behind = Some(child);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Finishes the tree. `None` builds the empty world.
    pub fn build(self, root: Option<NodeId>) -> Result<BspTree, BspError> {
        BspTree::from_parts(self.nodes, root)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut BspNode, BspError> {
        let len = self.nodes.len();
        self.nodes
            .get_mut(id.index())
            .ok_or(BspError::UnknownNode { node: id, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsp::EPSILON;
    use assert_approx_eq::assert_approx_eq;

    fn plane(x0: f32, z0: f32, x1: f32, z1: f32) -> Plane2 {
        Plane2::new(Vec2::new(x0, z0), Vec2::new(x1, z1)).unwrap()
    }

    /// Single wall along x = 0 facing +X, solid for x < 0.
    fn single_wall() -> BspTree {
        let mut builder = BspTreeBuilder::new();
        let root = builder.add_node(plane(0.0, 0.0, 0.0, 10.0));
        builder.build(Some(root)).unwrap()
    }

    /// Two walls facing -X at x = 10 (outer) and x = 20 (inner), the inner
    /// one reached through the outer's front side.
    fn ordered_walls() -> BspTree {
        let mut builder = BspTreeBuilder::new();
        let inner = builder.add_node(plane(20.0, 10.0, 20.0, 0.0));
        let outer = builder.add_split(plane(10.0, 10.0, 10.0, 0.0), Some(inner), None);
        builder.build(Some(outer)).unwrap()
    }

    /// Square room 0..10 x 0..10, open inside, solid outside.
    fn square_room() -> BspTree {
        let mut builder = BspTreeBuilder::new();
        // Walls wound so every normal faces the room's interior.
        let top = builder.add_node(plane(0.0, 10.0, 10.0, 10.0));
        let right = builder.add_split(plane(10.0, 10.0, 10.0, 0.0), Some(top), None);
        let bottom = builder.add_split(plane(10.0, 0.0, 0.0, 0.0), Some(right), None);
        let left = builder.add_split(plane(0.0, 0.0, 0.0, 10.0), Some(bottom), None);
        builder.build(Some(left)).unwrap()
    }

    #[test]
    fn test_square_room_normals_face_inwards() {
        let tree = square_room();
        let centre = Vec2::new(5.0, 5.0);
        for node in tree.nodes() {
            assert_eq!(node.plane.classify(centre, EPSILON), Classification::InFront);
        }
    }

    #[test]
    fn test_empty_tree() {
        let tree = BspTree::empty();
        assert!(tree.is_empty());
        assert_eq!(tree.depth(), 0);
        assert!(tree.region_test(Vec2::new(3.0, 3.0), EPSILON));
        assert!(tree
            .sweep_test(Vec2::ZERO, Vec2::new(10.0, 0.0), 0.0, 1.0, EPSILON)
            .is_none());
    }

    #[test]
    fn test_single_node_region_matches_classification() {
        let tree = single_wall();
        let plane = tree.nodes()[0].plane;
        for &(x, z) in &[(1.0, 5.0), (-1.0, 5.0), (0.0, 5.0), (0.005, -3.0), (50.0, 50.0)] {
            let p = Vec2::new(x, z);
            assert_eq!(
                tree.region_test(p, EPSILON),
                plane.classify(p, EPSILON) == Classification::InFront
            );
        }
    }

    #[test]
    fn test_region_square_room() {
        let tree = square_room();
        assert_eq!(tree.depth(), 4);
        assert!(tree.region_test(Vec2::new(5.0, 5.0), EPSILON));
        assert!(tree.region_test(Vec2::new(0.5, 9.5), EPSILON));
        assert!(!tree.region_test(Vec2::new(-1.0, 5.0), EPSILON));
        assert!(!tree.region_test(Vec2::new(5.0, 11.0), EPSILON));
        assert!(!tree.region_test(Vec2::new(12.0, 5.0), EPSILON));
        assert!(!tree.region_test(Vec2::new(5.0, -0.5), EPSILON));
        // Standing exactly on a wall counts as behind it.
        assert!(!tree.region_test(Vec2::new(0.0, 5.0), EPSILON));
    }

    #[test]
    fn test_sweep_single_wall() {
        let tree = single_wall();
        let hit = tree
            .sweep_test(Vec2::new(1.0, 5.0), Vec2::new(-1.0, 5.0), 0.0, 1.0, EPSILON)
            .unwrap();
        assert_approx_eq!(hit.t, 0.5);
        assert_approx_eq!(hit.normal.x, 1.0);
        assert_approx_eq!(hit.normal.y, 0.0);
        assert_eq!(hit.node, NodeId(0));
    }

    #[test]
    fn test_sweep_maps_into_time_range() {
        let tree = single_wall();
        let hit = tree
            .sweep_test(Vec2::new(1.0, 5.0), Vec2::new(-1.0, 5.0), 0.5, 1.0, EPSILON)
            .unwrap();
        assert_approx_eq!(hit.t, 0.75);
    }

    #[test]
    fn test_sweep_open_space_misses() {
        let tree = single_wall();
        assert!(tree
            .sweep_test(Vec2::new(1.0, 0.0), Vec2::new(8.0, 30.0), 0.0, 1.0, EPSILON)
            .is_none());
    }

    #[test]
    fn test_sweep_inside_solid_hits_at_start() {
        let tree = single_wall();
        let hit = tree
            .sweep_test(Vec2::new(-1.0, 5.0), Vec2::new(-4.0, 2.0), 0.25, 1.0, EPSILON)
            .unwrap();
        assert_eq!(hit.t, 0.25);
    }

    #[test]
    fn test_sweep_from_wall_surface_into_solid() {
        let tree = single_wall();
        let hit = tree
            .sweep_test(Vec2::new(0.0, 5.0), Vec2::new(-1.0, 5.0), 0.0, 1.0, EPSILON)
            .unwrap();
        assert_eq!(hit.t, 0.0);
    }

    #[test]
    fn test_sweep_from_wall_surface_away_is_free() {
        let tree = single_wall();
        assert!(tree
            .sweep_test(Vec2::new(0.0, 5.0), Vec2::new(3.0, 5.0), 0.0, 1.0, EPSILON)
            .is_none());
    }

    #[test]
    fn test_sweep_crossing_from_behind_hits_at_split() {
        let tree = single_wall();
        // Leaving the solid side still stops at the crossing, not at the start.
        let hit = tree
            .sweep_test(Vec2::new(-1.0, 5.0), Vec2::new(1.0, 5.0), 0.0, 1.0, EPSILON)
            .unwrap();
        assert_approx_eq!(hit.t, 0.5);
        assert_approx_eq!(hit.normal.x, 1.0);
        assert_eq!(hit.node, NodeId(0));
    }

    #[test]
    fn test_sweep_crossing_routes_leading_part_to_front() {
        let mut builder = BspTreeBuilder::new();
        // Front leaf at x = -2 facing +X, behind leaf at x = 2 facing -X.
        let front = builder.add_node(plane(-2.0, 0.0, -2.0, 10.0));
        let behind = builder.add_node(plane(2.0, 10.0, 2.0, 0.0));
        let root = builder.add_split(plane(0.0, 0.0, 0.0, 10.0), Some(front), Some(behind));
        let tree = builder.build(Some(root)).unwrap();

        // Starts behind the root: the part up to x = 0 still goes to `front`,
        // which it crosses at x = -2.
        let hit = tree
            .sweep_test(Vec2::new(-4.0, 5.0), Vec2::new(4.0, 5.0), 0.0, 1.0, EPSILON)
            .unwrap();
        assert_eq!(hit.node, front);
        assert_approx_eq!(hit.t, 0.25);

        // The leading part misses `front`, so the rest goes to `behind`,
        // crossed at x = 2.
        let hit = tree
            .sweep_test(Vec2::new(-1.0, 5.0), Vec2::new(4.0, 5.0), 0.0, 1.0, EPSILON)
            .unwrap();
        assert_eq!(hit.node, behind);
        assert_approx_eq!(hit.t, 0.6);
        assert_approx_eq!(hit.normal.x, -1.0);
    }

    #[test]
    fn test_sweep_first_hit_is_nearest() {
        let tree = ordered_walls();
        // Crosses x = 10 at t = 1/3 and x = 20 at t = 2/3.
        let hit = tree
            .sweep_test(Vec2::new(0.0, 5.0), Vec2::new(30.0, 5.0), 0.0, 1.0, EPSILON)
            .unwrap();
        assert_eq!(hit.node, NodeId(1));
        assert_approx_eq!(hit.t, 1.0 / 3.0);
        assert_approx_eq!(hit.normal.x, -1.0);
    }

    #[test]
    fn test_sweep_reaches_inner_wall_through_front() {
        let tree = ordered_walls();
        let hit = tree
            .sweep_test(Vec2::new(0.0, 5.0), Vec2::new(5.0, 5.0), 0.0, 1.0, EPSILON);
        assert!(hit.is_none());

        // Entirely in front of the outer wall, so only the inner one can stop it.
        let mut builder = BspTreeBuilder::new();
        let inner = builder.add_node(plane(20.0, 10.0, 20.0, 0.0));
        let outer = builder.add_split(plane(30.0, 10.0, 30.0, 0.0), Some(inner), None);
        let tree = builder.build(Some(outer)).unwrap();
        let hit = tree
            .sweep_test(Vec2::new(10.0, 5.0), Vec2::new(25.0, 5.0), 0.0, 1.0, EPSILON)
            .unwrap();
        assert_eq!(hit.node, inner);
        assert_approx_eq!(hit.t, 10.0 / 15.0);
    }

    #[test]
    fn test_sweep_square_room_hit_point_on_plane() {
        let tree = square_room();
        let start = Vec2::new(5.0, 5.0);
        let end = Vec2::new(14.0, 8.0);
        let hit = tree.sweep_test(start, end, 0.0, 1.0, EPSILON).unwrap();
        let point = start + (end - start) * hit.t;
        let plane = tree.node(hit.node).unwrap().plane;
        assert!(plane.signed_distance(point).abs() <= EPSILON);
        assert_approx_eq!(point.x, 10.0, 1e-4);
        assert_approx_eq!(hit.normal.x, -1.0);
    }

    #[test]
    fn test_sweep_inside_room_is_free() {
        let tree = square_room();
        assert!(tree
            .sweep_test(Vec2::new(1.0, 1.0), Vec2::new(9.0, 9.0), 0.0, 1.0, EPSILON)
            .is_none());
    }

    #[test]
    fn test_invalid_root_rejected() {
        let result = BspTree::from_parts(vec![], Some(NodeId(0)));
        assert!(matches!(result, Err(BspError::InvalidRoot { .. })));
    }

    #[test]
    fn test_invalid_child_rejected() {
        let mut builder = BspTreeBuilder::new();
        let root = builder.add_split(plane(0.0, 0.0, 0.0, 1.0), Some(NodeId(7)), None);
        assert!(matches!(
            builder.build(Some(root)),
            Err(BspError::InvalidChild { child: NodeId(7), .. })
        ));
    }

    #[test]
    fn test_shared_child_rejected() {
        let mut builder = BspTreeBuilder::new();
        let leaf = builder.add_node(plane(0.0, 0.0, 0.0, 1.0));
        let root = builder.add_split(plane(1.0, 0.0, 1.0, 1.0), Some(leaf), Some(leaf));
        assert!(matches!(
            builder.build(Some(root)),
            Err(BspError::SharedNode { node }) if node == leaf
        ));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut builder = BspTreeBuilder::new();
        let a = builder.add_node(plane(0.0, 0.0, 0.0, 1.0));
        let b = builder.add_node(plane(1.0, 0.0, 1.0, 1.0));
        builder.set_front(a, b).unwrap();
        builder.set_behind(b, a).unwrap();
        assert!(matches!(
            builder.build(Some(a)),
            Err(BspError::SharedNode { .. })
        ));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut builder = BspTreeBuilder::new();
        assert!(matches!(
            builder.set_front(NodeId(3), NodeId(0)),
            Err(BspError::UnknownNode { len: 0, .. })
        ));
    }

    #[test]
    fn test_depth_limit() {
        let mut builder = BspTreeBuilder::new();
        let mut child = None;
        for i in 0..10 {
            let x = i as f32;
            child = Some(builder.add_split(plane(x, 0.0, x, 1.0), child, None));
        }
        let root = child;
        let tree = builder.build(root).unwrap();
        assert_eq!(tree.depth(), 10);
        assert!(tree.validate(10).is_ok());
        assert!(matches!(
            tree.validate(9),
            Err(BspError::DepthLimitExceeded { limit: 9 })
        ));
    }

    #[test]
    fn test_hard_depth_limit() {
        let mut builder = BspTreeBuilder::new();
        let mut child = None;
        for i in 0..=BSP_DEPTH_LIMIT {
            let x = i as f32;
            child = Some(builder.add_split(plane(x, 0.0, x, 1.0), child, None));
        }
        assert!(matches!(
            builder.build(child),
            Err(BspError::DepthLimitExceeded { limit: BSP_DEPTH_LIMIT })
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let tree = square_room();
        let json = tree.to_json().unwrap();
        let loaded = BspTree::from_json(&json).unwrap();
        assert_eq!(loaded, tree);
        assert_eq!(loaded.depth(), 4);
    }

    #[test]
    fn test_json_validates_shape() {
        let json = r#"{
            "nodes": [
                { "plane": { "start": [0.0, 0.0], "end": [0.0, 10.0] }, "front": 0 }
            ],
            "root": 0
        }"#;
        assert!(BspTree::from_json(json).is_err());
    }

    #[test]
    fn test_json_without_root_is_empty() {
        let tree = BspTree::from_reader(r#"{ "nodes": [] }"#.as_bytes()).unwrap();
        assert!(tree.is_empty());
    }
}
