use cgmath::{EuclideanSpace, Point3};

use super::error::{length_mismatch, missing_node, node_already_split, OctreeResult};
use super::{BoundingBoxTable, NodeId, NodeKind, OctreeNode};
use crate::constants::octree::{CHILD_COUNT, MAX_DEPTH, SPLIT_THRESHOLD};
use crate::physics::{
    aabb_center, aabb_corners, aabb_overlaps, aabb_scaled, aabb_translated, ray_aabb_intersection,
    Ray, AABB,
};

/// Nearest object struck by a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctreeHit {
    pub distance: f32,
    pub position: Point3<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OctreeStats {
    pub node_count: usize,
    pub leaf_count: usize,
    pub max_depth: u8,
    pub interned_boxes: usize,
    pub split_count: usize,
}

/// Spatial index over object boxes within one region.
///
/// Nodes live in a flat arena addressed by `NodeId`; the root is always
/// `NodeId::ROOT`. Objects can only be added. Removing anything means
/// building a new tree.
#[derive(Debug, Clone)]
pub struct Octree {
    nodes: Vec<OctreeNode>,
    boxes: BoundingBoxTable,
    split_threshold: usize,
    len: usize,
    split_count: usize,
}

impl Octree {
    /// Single-leaf tree covering `region` moved by `position`
    pub fn new(region: AABB, position: Point3<f32>) -> Self {
        Self::with_split_threshold(region, position, SPLIT_THRESHOLD)
    }

    pub fn with_split_threshold(region: AABB, position: Point3<f32>, split_threshold: usize) -> Self {
        // Halving only tiles the parent when boxes are centred on the origin,
        // so any offset in `region` moves into the root translation.
        let offset = aabb_center(&region).to_vec();
        let mut boxes = BoundingBoxTable::new();
        let root_shape = boxes.intern(aabb_translated(&region, -offset));
        let root = OctreeNode::new_leaf(root_shape, position.to_vec() + offset, 0);

        Self {
            nodes: vec![root],
            boxes,
            split_threshold,
            len: 0,
            split_count: 0,
        }
    }

    /// Add objects given as parallel position/box slices.
    ///
    /// Each box goes into every leaf it overlaps. A leaf splits first when the
    /// object fits one of its octants and would bring the leaf's count of such
    /// objects to the split threshold; the object then goes to its children.
    /// Boxes that span the leaf's centre never force a split. Boxes outside
    /// the tree's region are dropped.
    pub fn insert(&mut self, positions: &[Point3<f32>], boxes: &[AABB]) -> OctreeResult<()> {
        if positions.len() != boxes.len() {
            return Err(length_mismatch(positions.len(), boxes.len()));
        }

        for (position, aabb) in positions.iter().zip(boxes) {
            if self.insert_object(NodeId::ROOT, *position, *aabb)? {
                self.len += 1;
            } else {
                log::warn!(
                    "[Octree] Object at {:?} lies outside the tree region and was dropped",
                    position
                );
            }
        }
        Ok(())
    }

    fn insert_object(
        &mut self,
        search_root: NodeId,
        position: Point3<f32>,
        aabb: AABB,
    ) -> OctreeResult<bool> {
        let leaves = self.containing_leaves(search_root, &aabb);

        for &leaf in &leaves {
            let node = self.node_ref(leaf)?;
            let fits_octant = fits_one_octant(&self.region_of(node), &aabb);
            // Only objects a split would separate count towards the threshold
            let full = fits_octant
                && node.separable_count() + 1 >= self.split_threshold
                && node.depth < MAX_DEPTH;

            if full {
                self.split_node(leaf)?;
                // Fresh children start empty, so they skip the threshold check
                for child in self.containing_leaves(leaf, &aabb) {
                    let fits = fits_one_octant(&self.region_of(self.node_ref(child)?), &aabb);
                    self.node_mut(child)?.add_object(position, aabb, fits);
                }
            } else {
                self.node_mut(leaf)?.add_object(position, aabb, fits_octant);
            }
        }

        Ok(!leaves.is_empty())
    }

    /// Turn a leaf into an internal node with eight children.
    ///
    /// Each child uses the parent's shape at half size, centred halfway between
    /// one parent corner and the parent centre. The parent's objects are
    /// re-inserted below it. Splitting a node twice is an invariant violation.
    pub fn split_node(&mut self, id: NodeId) -> OctreeResult<()> {
        let (shape_id, translation, depth) = {
            let node = self.node_ref(id)?;
            if !node.is_leaf() {
                return Err(node_already_split(id));
            }
            (node.region, node.translation, node.depth + 1)
        };

        let shape = *self.boxes.get(shape_id);
        let region = aabb_translated(&shape, translation);
        let center = aabb_center(&region);
        let child_shape = self.boxes.intern(aabb_scaled(&shape, 0.5));

        let first_child = self.nodes.len() as u32;
        let mut children = [NodeId::ROOT; CHILD_COUNT];
        for (i, corner) in aabb_corners(&region).into_iter().enumerate() {
            children[i] = NodeId(first_child + i as u32);
            let octant_center = corner.midpoint(center);
            self.nodes
                .push(OctreeNode::new_leaf(child_shape, octant_center.to_vec(), depth));
        }

        let previous = std::mem::replace(
            &mut self.node_mut(id)?.kind,
            NodeKind::Internal { children },
        );
        self.split_count += 1;

        if let NodeKind::Leaf { positions, boxes, .. } = previous {
            log::debug!(
                "[Octree] Split node {} at depth {}, redistributing {} objects",
                id.index(),
                depth - 1,
                positions.len()
            );
            for (position, aabb) in positions.into_iter().zip(boxes) {
                self.insert_object(id, position, aabb)?;
            }
        }
        Ok(())
    }

    fn containing_leaves(&self, start: NodeId, aabb: &AABB) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        self.collect_leaves(start, aabb, &mut leaves);
        leaves
    }

    fn collect_leaves(&self, id: NodeId, aabb: &AABB, out: &mut Vec<NodeId>) {
        let Some(node) = self.nodes.get(id.index()) else {
            return;
        };
        if !aabb_overlaps(&self.region_of(node), aabb) {
            return;
        }
        match &node.kind {
            NodeKind::Leaf { .. } => out.push(id),
            NodeKind::Internal { children } => {
                for &child in children {
                    self.collect_leaves(child, aabb, out);
                }
            }
        }
    }

    /// Total leaf entries; an object spanning several leaves counts once per leaf
    pub fn count(&self) -> usize {
        self.count_from(NodeId::ROOT)
    }

    fn count_from(&self, id: NodeId) -> usize {
        match self.nodes.get(id.index()).map(|node| &node.kind) {
            Some(NodeKind::Leaf { positions, .. }) => positions.len(),
            Some(NodeKind::Internal { children }) => {
                children.iter().map(|&child| self.count_from(child)).sum()
            }
            None => 0,
        }
    }

    /// Number of objects accepted by `insert`
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Nearest object whose box the ray enters at a non-negative distance.
    ///
    /// Subtrees whose region the ray misses are skipped. On equal distances
    /// the object found first (leaf order, then child order) wins.
    pub fn nearest_intersection(&self, ray: &Ray) -> Option<OctreeHit> {
        self.ray_intersection(NodeId::ROOT, ray)
    }

    fn ray_intersection(&self, id: NodeId, ray: &Ray) -> Option<OctreeHit> {
        let node = self.nodes.get(id.index())?;
        ray_aabb_intersection(ray, &self.region_of(node))?;

        let mut nearest = None;
        match &node.kind {
            NodeKind::Leaf { positions, boxes, .. } => {
                for (position, aabb) in positions.iter().zip(boxes) {
                    if let Some(distance) = ray_aabb_intersection(ray, aabb) {
                        keep_nearest(&mut nearest, OctreeHit { distance, position: *position });
                    }
                }
            }
            NodeKind::Internal { children } => {
                for &child in children {
                    if let Some(hit) = self.ray_intersection(child, ray) {
                        keep_nearest(&mut nearest, hit);
                    }
                }
            }
        }
        nearest
    }

    pub fn node(&self, id: NodeId) -> Option<&OctreeNode> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &OctreeNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// World-space region of a node
    pub fn node_region(&self, id: NodeId) -> Option<AABB> {
        self.node(id).map(|node| self.region_of(node))
    }

    pub fn region(&self) -> AABB {
        self.region_of(&self.nodes[NodeId::ROOT.index()])
    }

    pub fn box_table(&self) -> &BoundingBoxTable {
        &self.boxes
    }

    pub fn split_threshold(&self) -> usize {
        self.split_threshold
    }

    pub fn stats(&self) -> OctreeStats {
        OctreeStats {
            node_count: self.nodes.len(),
            leaf_count: self.nodes.iter().filter(|node| node.is_leaf()).count(),
            max_depth: self.nodes.iter().map(|node| node.depth).max().unwrap_or(0),
            interned_boxes: self.boxes.len(),
            split_count: self.split_count,
        }
    }

    fn region_of(&self, node: &OctreeNode) -> AABB {
        aabb_translated(self.boxes.get(node.region), node.translation)
    }

    fn node_ref(&self, id: NodeId) -> OctreeResult<&OctreeNode> {
        self.nodes.get(id.index()).ok_or_else(|| missing_node(id))
    }

    fn node_mut(&mut self, id: NodeId) -> OctreeResult<&mut OctreeNode> {
        self.nodes.get_mut(id.index()).ok_or_else(|| missing_node(id))
    }
}

/// True when `object` does not cross any of the three planes through the
/// centre of `region`, so a split would put it in exactly one child
fn fits_one_octant(region: &AABB, object: &AABB) -> bool {
    let centre = aabb_center(region);
    let crosses = |min: f32, max: f32, mid: f32| min < mid && max > mid;
    !crosses(object.min.x, object.max.x, centre.x)
        && !crosses(object.min.y, object.max.y, centre.y)
        && !crosses(object.min.z, object.max.z, centre.z)
}

/// Replace `nearest` only on a strictly smaller distance
fn keep_nearest(nearest: &mut Option<OctreeHit>, candidate: OctreeHit) {
    if nearest.map_or(true, |best| candidate.distance < best.distance) {
        *nearest = Some(candidate);
    }
}
