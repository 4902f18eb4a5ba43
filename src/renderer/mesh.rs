use cgmath::Vector3;

use crate::physics::{aabb_from_points, BlockFace, AABB};
use crate::renderer::vertex::Vertex;
use crate::world::BlockTypeId;

const CUBE_FACES: [BlockFace; 6] = [
    BlockFace::Right,
    BlockFace::Left,
    BlockFace::Top,
    BlockFace::Bottom,
    BlockFace::Front,
    BlockFace::Back,
];

/// Reference geometry of one block type, centred on the origin
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl BlockMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Axis-aligned cube of edge `size` centred on the origin, 4 vertices per face
    pub fn cube(size: f32) -> Self {
        let half = size * 0.5;
        let mut mesh = Self::new();

        for face in CUBE_FACES {
            let normal = face.normal();
            let u = face_tangent(face);
            let v = normal.cross(u);
            let center = normal * half;
            let corner = |su: f32, sv: f32, uv: [f32; 2]| {
                let p = center + u * (su * half) + v * (sv * half);
                Vertex::new([p.x, p.y, p.z], normal.into(), uv)
            };
            mesh.add_quad([
                corner(-1.0, -1.0, [0.0, 1.0]),
                corner(1.0, -1.0, [1.0, 1.0]),
                corner(1.0, 1.0, [1.0, 0.0]),
                corner(-1.0, 1.0, [0.0, 0.0]),
            ]);
        }
        mesh
    }

    pub fn add_quad(&mut self, vertices: [Vertex; 4]) {
        let start_index = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&vertices);

        // Two counter-clockwise triangles
        self.indices.extend_from_slice(&[
            start_index,
            start_index + 1,
            start_index + 2,
            start_index,
            start_index + 2,
            start_index + 3,
        ]);
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Smallest box around every vertex, `None` for an empty mesh
    pub fn bounds(&self) -> Option<AABB> {
        aabb_from_points(self.vertices.iter().map(Vertex::position_point))
    }
}

/// In-plane axis of a face; together with the normal it fixes the winding
fn face_tangent(face: BlockFace) -> Vector3<f32> {
    match face {
        BlockFace::Right => Vector3::unit_y(),
        BlockFace::Left => Vector3::unit_z(),
        BlockFace::Top => Vector3::unit_z(),
        BlockFace::Bottom => Vector3::unit_x(),
        BlockFace::Front => Vector3::unit_x(),
        BlockFace::Back => Vector3::unit_y(),
    }
}

/// Contiguous slice of an index buffer for a single draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRange {
    pub start_index: u32,
    pub primitive_count: u32,
}

/// Merged geometry of every cell of one block type within a cluster
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBatch {
    pub block_type: BlockTypeId,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl RenderBatch {
    pub fn new(block_type: BlockTypeId) -> Self {
        Self {
            block_type,
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Append a copy of `mesh` moved by `offset`.
    ///
    /// The copy's indices are rebased onto its own vertex run. Returns the
    /// bounds of the copied vertices.
    pub fn append_translated(&mut self, mesh: &BlockMesh, offset: Vector3<f32>) -> Option<AABB> {
        let base = self.vertices.len() as u32;
        self.vertices
            .extend(mesh.vertices.iter().map(|vertex| vertex.translated(offset)));
        self.indices.extend(mesh.indices.iter().map(|index| base + index));

        aabb_from_points(
            self.vertices[base as usize..]
                .iter()
                .map(Vertex::position_point),
        )
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Split the index buffer into ranges of at most `max_primitives` triangles
    pub fn draw_ranges(&self, max_primitives: u32) -> Vec<DrawRange> {
        let max_primitives = max_primitives.max(1);
        let mut remaining = self.triangle_count() as u32;
        let mut start_index = 0;
        let mut ranges = Vec::new();

        while remaining > 0 {
            let primitive_count = remaining.min(max_primitives);
            ranges.push(DrawRange {
                start_index,
                primitive_count,
            });
            start_index += primitive_count * 3;
            remaining -= primitive_count;
        }
        ranges
    }
}

/// Everything a renderer needs for one frame.
///
/// The three sequences are index-aligned: entry `i` of each describes the same batch.
#[derive(Debug, Default)]
pub struct RenderBatches<'a> {
    pub vertex_buffers: Vec<&'a [Vertex]>,
    pub index_buffers: Vec<&'a [u32]>,
    pub source_models: Vec<BlockTypeId>,
}

impl<'a> RenderBatches<'a> {
    pub fn push(&mut self, batch: &'a RenderBatch) {
        self.vertex_buffers.push(&batch.vertices);
        self.index_buffers.push(&batch.indices);
        self.source_models.push(batch.block_type);
    }

    pub fn len(&self) -> usize {
        self.source_models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source_models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a [Vertex], &'a [u32], BlockTypeId)> + '_ {
        self.vertex_buffers
            .iter()
            .zip(&self.index_buffers)
            .zip(&self.source_models)
            .map(|((vertices, indices), model)| (*vertices, *indices, *model))
    }

    pub fn triangle_count(&self) -> usize {
        self.index_buffers.iter().map(|indices| indices.len() / 3).sum()
    }
}

impl<'a> FromIterator<&'a RenderBatch> for RenderBatches<'a> {
    fn from_iter<I: IntoIterator<Item = &'a RenderBatch>>(iter: I) -> Self {
        let mut batches = RenderBatches::default();
        for batch in iter {
            batches.push(batch);
        }
        batches
    }
}
