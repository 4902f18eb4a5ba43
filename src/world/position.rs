use cgmath::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Position of a cluster in cluster coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ClusterPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Grid cell at this cluster's minimum corner
    pub fn origin_cell(&self, dims: [u32; 3]) -> VoxelPos {
        VoxelPos::new(
            self.x * dims[0] as i32,
            self.y * dims[1] as i32,
            self.z * dims[2] as i32,
        )
    }

    /// Create a new cluster position offset by the given amounts
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

/// Stable cluster identifier, `cx * ny * nz + cy * nz + cz`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClusterId(pub u32);

impl ClusterId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a cell in the voxel grid (grid units, not world units)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoxelPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Cluster containing this cell (floor division per axis)
    pub fn cluster_of(&self, dims: [u32; 3]) -> ClusterPos {
        ClusterPos::new(
            self.x.div_euclid(dims[0] as i32),
            self.y.div_euclid(dims[1] as i32),
            self.z.div_euclid(dims[2] as i32),
        )
    }

    /// Offset of this cell inside its cluster
    pub fn local_of(&self, dims: [u32; 3]) -> [u32; 3] {
        [
            self.x.rem_euclid(dims[0] as i32) as u32,
            self.y.rem_euclid(dims[1] as i32) as u32,
            self.z.rem_euclid(dims[2] as i32) as u32,
        ]
    }

    pub fn offset(&self, delta: Vector3<i32>) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.z + delta.z)
    }

    /// World-space minimum corner of this cell
    pub fn to_world_position(&self, cube_size: f32) -> Point3<f32> {
        Point3::new(
            self.x as f32 * cube_size,
            self.y as f32 * cube_size,
            self.z as f32 * cube_size,
        )
    }

    /// Cell containing a world-space point
    pub fn from_world_position(position: Point3<f32>, cube_size: f32) -> Self {
        Self::new(
            (position.x / cube_size).floor() as i32,
            (position.y / cube_size).floor() as i32,
            (position.z / cube_size).floor() as i32,
        )
    }
}

impl std::fmt::Display for VoxelPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
