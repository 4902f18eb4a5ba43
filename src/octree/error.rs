//! Octree error helpers
//!
//! Every octree failure is an invariant violation: the caller passed
//! inconsistent arguments or the tree logic itself is broken.

use super::NodeId;
use crate::error::{invariant_violation, EngineError, EngineResult};

/// Type alias for octree operation results
pub type OctreeResult<T> = EngineResult<T>;

/// A split was requested on a node that already has children
pub fn node_already_split(node: NodeId) -> EngineError {
    invariant_violation(format!(
        "split requested on node {} which has already been split",
        node.index()
    ))
}

/// `insert` was handed parallel slices of different lengths
pub fn length_mismatch(positions: usize, boxes: usize) -> EngineError {
    EngineError::LengthMismatch { positions, boxes }
}

/// A node id did not resolve inside the arena
pub fn missing_node(node: NodeId) -> EngineError {
    invariant_violation(format!("node {} does not exist", node.index()))
}
