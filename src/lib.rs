pub mod config;
pub mod constants;
pub mod error;
pub mod octree;
pub mod persistence;
pub mod physics;
pub mod renderer;
pub mod world;

pub use config::WorldConfig;
pub use error::{EngineError, EngineResult};
pub use octree::{Octree, OctreeHit, OctreeStats};
pub use physics::{BlockFace, Ray, AABB};
pub use renderer::{BlockMesh, RenderBatch, RenderBatches, Vertex};
pub use world::{
    BlockCatalog, BlockGeometryProvider, BlockGeometrySource, BlockTypeId, ClusterId,
    CubeGeometrySource, PickResult, VoxelGrid, VoxelPos, WorldStore,
};
