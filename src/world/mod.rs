//! Clustered voxel world
//!
//! - **VoxelGrid**: block type per cell for the whole world
//! - **ClusterStore**: octree and render batches for each active cluster
//! - **WorldStore**: the façade that owns both and keeps them in step
//!
//! Editing a cell rebuilds its whole cluster. Rebuild cost is bounded by one
//! cluster's volume, never the world's.

mod block;
mod cluster_store;
mod position;
mod voxel_grid;
mod world_store;

pub use block::{
    BlockCatalog, BlockGeometryProvider, BlockGeometrySource, BlockTypeId, CubeGeometrySource,
};
pub use cluster_store::{ActiveCluster, ClusterStore};
pub use position::{ClusterId, ClusterPos, VoxelPos};
pub use voxel_grid::VoxelGrid;
pub use world_store::{PickResult, WorldStore};
