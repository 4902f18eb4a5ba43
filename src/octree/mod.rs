//! Octree spatial index
//!
//! One octree per active cluster. Node regions are stored once per distinct
//! size in a `BoundingBoxTable` and placed by a per-node translation.

mod bounding_box_table;
pub mod error;
mod node;
mod tree;

pub use bounding_box_table::{BoundingBoxTable, BoxId};
pub use error::OctreeResult;
pub use node::{NodeId, NodeKind, OctreeNode};
pub use tree::{Octree, OctreeHit, OctreeStats};
