//! Render-side data produced by the world store
//!
//! CPU buffers only. Submission, shading and culling belong to whoever
//! consumes `RenderBatches`.

mod mesh;
mod vertex;

pub use mesh::{BlockMesh, DrawRange, RenderBatch, RenderBatches};
pub use vertex::Vertex;
