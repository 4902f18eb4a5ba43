// Cluster World Constants
//
// Defaults for every tunable in the crate. `WorldConfig::default()` reads
// from here; nothing else should hard-code these values.

/// Cluster layout of the voxel grid
pub mod cluster {
    /// Cells per cluster along X
    pub const CLUSTER_DIM_X: u32 = 50;
    /// Cells per cluster along Y
    pub const CLUSTER_DIM_Y: u32 = 50;
    /// Cells per cluster along Z
    pub const CLUSTER_DIM_Z: u32 = 50;

    /// Edge length of one cell in world units
    pub const CUBE_SIZE: f32 = 2.0;

    /// Largest number of cells a voxel grid may hold
    pub const MAX_CELLS: usize = 1 << 28;
}

/// Octree tuning
pub mod octree {
    /// A leaf splits when one more object that fits a single octant would bring
    /// its count of such objects to this value
    pub const SPLIT_THRESHOLD: usize = 500;

    /// Number of children of an internal node
    pub const CHILD_COUNT: usize = 8;

    /// Nodes at this depth never split, however many objects they hold
    pub const MAX_DEPTH: u8 = 16;
}

/// Render submission limits
pub mod render {
    /// Largest triangle count a single draw call may submit
    pub const MAX_PRIMITIVES_PER_DRAW: u32 = 1_048_575;
}

/// World save file
pub mod persistence {
    /// Token written for an empty cell
    pub const EMPTY_CELL: i32 = -1;

    /// Extension used for the temporary file during an atomic save
    pub const TEMP_EXTENSION: &str = "tmp";
}

/// Picking
pub mod picking {
    /// Tolerance when testing whether a face-plane hit lies on the cube face
    pub const FACE_EPSILON: f32 = 1e-4;

    /// Directions with a smaller component are treated as parallel to a plane
    pub const PARALLEL_EPSILON: f32 = 1e-5;
}

/// Block content
pub mod blocks {
    /// Block names given to a freshly created world, in block-type index order
    pub const DEFAULT_BLOCK_NAMES: [&str; 4] = ["GrassCube", "StoneCube", "DirtCube", "WaterCube"];
}
