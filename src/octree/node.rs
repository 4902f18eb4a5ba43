use cgmath::{Point3, Vector3};

use super::BoxId;
use crate::constants::octree::CHILD_COUNT;
use crate::physics::AABB;

/// Index of a node inside an octree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a node holds. A node starts as a `Leaf` and becomes `Internal` exactly once.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Objects assigned to this node, as parallel position/box sequences.
    ///
    /// `separable` counts the objects that lie within a single octant of the
    /// node, i.e. those a split would actually separate.
    Leaf {
        positions: Vec<Point3<f32>>,
        boxes: Vec<AABB>,
        separable: usize,
    },
    /// Eight children partitioning this node's region
    Internal { children: [NodeId; CHILD_COUNT] },
}

#[derive(Debug, Clone)]
pub struct OctreeNode {
    /// Shape of this node's region, shared with every same-sized node
    pub region: BoxId,
    /// The region is `region` moved by this vector
    pub translation: Vector3<f32>,
    pub depth: u8,
    pub kind: NodeKind,
}

impl OctreeNode {
    pub fn new_leaf(region: BoxId, translation: Vector3<f32>, depth: u8) -> Self {
        Self {
            region,
            translation,
            depth,
            kind: NodeKind::Leaf {
                positions: Vec::new(),
                boxes: Vec::new(),
                separable: 0,
            },
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Objects stored directly in this node; always zero for internal nodes
    pub fn object_count(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf { positions, .. } => positions.len(),
            NodeKind::Internal { .. } => 0,
        }
    }

    /// Objects stored here that fit inside one octant; zero for internal nodes
    pub fn separable_count(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf { separable, .. } => *separable,
            NodeKind::Internal { .. } => 0,
        }
    }

    pub fn children(&self) -> Option<&[NodeId; CHILD_COUNT]> {
        match &self.kind {
            NodeKind::Leaf { .. } => None,
            NodeKind::Internal { children } => Some(children),
        }
    }

    /// Append an object to leaf storage. Returns false on an internal node.
    pub(crate) fn add_object(
        &mut self,
        position: Point3<f32>,
        aabb: AABB,
        fits_octant: bool,
    ) -> bool {
        match &mut self.kind {
            NodeKind::Leaf {
                positions,
                boxes,
                separable,
            } => {
                positions.push(position);
                boxes.push(aabb);
                *separable += usize::from(fits_octant);
                true
            }
            NodeKind::Internal { .. } => false,
        }
    }
}
