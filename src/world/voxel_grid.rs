use super::{BlockTypeId, ClusterId, ClusterPos, VoxelPos};
use crate::constants::cluster::MAX_CELLS;
use crate::error::{invalid_config, EngineError, EngineResult};

/// Dense block-type grid for the whole world.
///
/// The grid always spans a whole number of clusters on every axis. Cells are
/// stored cluster-major so that one cluster's cells are contiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    cluster_dims: [u32; 3],
    cluster_counts: [u32; 3],
    cells: Vec<Option<BlockTypeId>>,
}

impl VoxelGrid {
    /// Empty grid at least `size` cells large, rounded up to whole clusters.
    ///
    /// Fails when a rounded axis does not fit an `i32` cell coordinate or the
    /// grid would hold more than `MAX_CELLS` cells.
    pub fn new(size: [u32; 3], cluster_dims: [u32; 3]) -> EngineResult<Self> {
        if cluster_dims.contains(&0) {
            return Err(invalid_config(format!(
                "cluster dimensions must be non-zero, got {:?}",
                cluster_dims
            )));
        }
        let cluster_counts = [
            size[0].div_ceil(cluster_dims[0]),
            size[1].div_ceil(cluster_dims[1]),
            size[2].div_ceil(cluster_dims[2]),
        ];
        let cell_count = cluster_counts
            .iter()
            .zip(&cluster_dims)
            .try_fold(1usize, |cells, (&count, &dim)| {
                let axis = (count as usize).checked_mul(dim as usize)?;
                if axis > i32::MAX as usize {
                    return None;
                }
                cells.checked_mul(axis)
            })
            .filter(|&cells| cells <= MAX_CELLS)
            .ok_or(EngineError::GridTooLarge { size })?;

        Ok(Self {
            cluster_dims,
            cluster_counts,
            cells: vec![None; cell_count],
        })
    }

    /// Grid whose bottom layer (`y == 0`) is all block type 0
    pub fn flat(size: [u32; 3], cluster_dims: [u32; 3]) -> EngineResult<Self> {
        let mut grid = Self::new(size, cluster_dims)?;
        let [sx, _, sz] = grid.size();
        for x in 0..sx as i32 {
            for z in 0..sz as i32 {
                grid.set(VoxelPos::new(x, 0, z), Some(BlockTypeId(0)));
            }
        }
        Ok(grid)
    }

    /// Size in cells, always a multiple of the cluster dimensions
    pub fn size(&self) -> [u32; 3] {
        [
            self.cluster_counts[0] * self.cluster_dims[0],
            self.cluster_counts[1] * self.cluster_dims[1],
            self.cluster_counts[2] * self.cluster_dims[2],
        ]
    }

    pub fn cluster_dimensions(&self) -> [u32; 3] {
        self.cluster_dims
    }

    pub fn cluster_counts(&self) -> [u32; 3] {
        self.cluster_counts
    }

    pub fn cluster_count(&self) -> usize {
        self.cluster_counts.iter().map(|&n| n as usize).product()
    }

    fn cluster_volume(&self) -> usize {
        self.cluster_dims.iter().map(|&n| n as usize).product()
    }

    /// Id of the cluster at `pos`, `None` outside the grid
    pub fn cluster_id(&self, pos: ClusterPos) -> Option<ClusterId> {
        let [nx, ny, nz] = self.cluster_counts.map(|n| n as i32);
        if pos.x < 0 || pos.y < 0 || pos.z < 0 || pos.x >= nx || pos.y >= ny || pos.z >= nz {
            return None;
        }
        Some(ClusterId((pos.x * ny * nz + pos.y * nz + pos.z) as u32))
    }

    pub fn cluster_pos(&self, id: ClusterId) -> Option<ClusterPos> {
        if id.index() >= self.cluster_count() {
            return None;
        }
        let [_, ny, nz] = self.cluster_counts;
        let i = id.0;
        Some(ClusterPos::new(
            (i / (ny * nz)) as i32,
            ((i / nz) % ny) as i32,
            (i % nz) as i32,
        ))
    }

    /// Every cluster id in ascending (x, y, z scan) order
    pub fn cluster_ids(&self) -> impl Iterator<Item = ClusterId> {
        (0..self.cluster_count() as u32).map(ClusterId)
    }

    /// Cluster owning `pos`, `None` outside the grid
    pub fn cluster_containing(&self, pos: VoxelPos) -> Option<ClusterId> {
        self.cluster_id(pos.cluster_of(self.cluster_dims))
    }

    fn cell_index(&self, pos: VoxelPos) -> Option<usize> {
        let cluster = self.cluster_containing(pos)?;
        let [lx, ly, lz] = pos.local_of(self.cluster_dims).map(|n| n as usize);
        let [_, dy, dz] = self.cluster_dims.map(|n| n as usize);
        Some(cluster.index() * self.cluster_volume() + lx * dy * dz + ly * dz + lz)
    }

    pub fn contains(&self, pos: VoxelPos) -> bool {
        self.cell_index(pos).is_some()
    }

    /// Block at `pos`; `None` for empty cells and cells outside the grid
    pub fn get(&self, pos: VoxelPos) -> Option<BlockTypeId> {
        self.cell_index(pos).and_then(|i| self.cells[i])
    }

    /// Store `value` at `pos`. Returns false when `pos` is outside the grid.
    pub fn set(&mut self, pos: VoxelPos, value: Option<BlockTypeId>) -> bool {
        match self.cell_index(pos) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    /// Occupied cells of one cluster, scanning local x, then y, then z
    pub fn cluster_cells(&self, id: ClusterId) -> Vec<(VoxelPos, BlockTypeId)> {
        let Some(origin) = self
            .cluster_pos(id)
            .map(|pos| pos.origin_cell(self.cluster_dims))
        else {
            return Vec::new();
        };

        let volume = self.cluster_volume();
        let start = id.index() * volume;
        let [_, dy, dz] = self.cluster_dims.map(|n| n as usize);

        self.cells[start..start + volume]
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| {
                cell.map(|block| {
                    let local = [i / (dy * dz), (i / dz) % dy, i % dz];
                    let pos = VoxelPos::new(
                        origin.x + local[0] as i32,
                        origin.y + local[1] as i32,
                        origin.z + local[2] as i32,
                    );
                    (pos, block)
                })
            })
            .collect()
    }

    /// Number of non-empty cells
    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Highest block-type index in use, if any cell is occupied
    pub fn max_block_type(&self) -> Option<BlockTypeId> {
        self.cells.iter().flatten().copied().max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMS: [u32; 3] = [4, 4, 4];

    #[test]
    fn test_size_rounds_up_to_whole_clusters() {
        let grid = VoxelGrid::new([5, 4, 9], DIMS).unwrap();
        assert_eq!(grid.size(), [8, 4, 12]);
        assert_eq!(grid.cluster_counts(), [2, 1, 3]);
        assert_eq!(grid.cluster_count(), 6);
        assert_eq!(grid.solid_count(), 0);
    }

    #[test]
    fn test_cluster_ids_follow_scan_order() {
        let grid = VoxelGrid::new([8, 8, 8], DIMS).unwrap();
        let ids: Vec<ClusterPos> = grid
            .cluster_ids()
            .map(|id| grid.cluster_pos(id).unwrap())
            .collect();
        assert_eq!(ids[0], ClusterPos::new(0, 0, 0));
        assert_eq!(ids[1], ClusterPos::new(0, 0, 1));
        assert_eq!(ids[2], ClusterPos::new(0, 1, 0));
        assert_eq!(ids[4], ClusterPos::new(1, 0, 0));
        for id in grid.cluster_ids() {
            assert_eq!(grid.cluster_id(grid.cluster_pos(id).unwrap()), Some(id));
        }
        assert!(grid.cluster_pos(ClusterId(8)).is_none());
    }

    #[test]
    fn test_get_set_and_bounds() {
        let mut grid = VoxelGrid::new([8, 8, 8], DIMS).unwrap();
        let pos = VoxelPos::new(5, 2, 7);
        assert!(grid.set(pos, Some(BlockTypeId(3))));
        assert_eq!(grid.get(pos), Some(BlockTypeId(3)));
        assert_eq!(grid.get(VoxelPos::new(5, 2, 6)), None);

        assert!(!grid.set(VoxelPos::new(8, 0, 0), Some(BlockTypeId(1))));
        assert!(!grid.set(VoxelPos::new(-1, 0, 0), Some(BlockTypeId(1))));
        assert!(!grid.contains(VoxelPos::new(0, 0, 8)));
        assert_eq!(grid.solid_count(), 1);
    }

    #[test]
    fn test_cluster_cells_lists_only_that_cluster() {
        let mut grid = VoxelGrid::new([8, 4, 4], DIMS).unwrap();
        grid.set(VoxelPos::new(1, 0, 0), Some(BlockTypeId(0)));
        grid.set(VoxelPos::new(0, 3, 2), Some(BlockTypeId(1)));
        grid.set(VoxelPos::new(6, 1, 1), Some(BlockTypeId(2)));

        let first = grid.cluster_cells(ClusterId(0));
        assert_eq!(
            first,
            vec![
                (VoxelPos::new(0, 3, 2), BlockTypeId(1)),
                (VoxelPos::new(1, 0, 0), BlockTypeId(0)),
            ]
        );
        let second = grid.cluster_cells(ClusterId(1));
        assert_eq!(second, vec![(VoxelPos::new(6, 1, 1), BlockTypeId(2))]);
        assert!(grid.cluster_cells(ClusterId(9)).is_empty());
    }

    #[test]
    fn test_flat_world_fills_bottom_layer() {
        let grid = VoxelGrid::flat([6, 6, 6], DIMS).unwrap();
        assert_eq!(grid.size(), [8, 8, 8]);
        assert_eq!(grid.solid_count(), 64);
        assert_eq!(grid.get(VoxelPos::new(7, 0, 7)), Some(BlockTypeId(0)));
        assert_eq!(grid.get(VoxelPos::new(7, 1, 7)), None);
        assert_eq!(grid.max_block_type(), Some(BlockTypeId(0)));
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        let err = VoxelGrid::new([4_000_000_000, 1, 1], DIMS).unwrap_err();
        assert!(matches!(err, EngineError::GridTooLarge { .. }));
        let err = VoxelGrid::new([65_536, 65_536, 65_536], DIMS).unwrap_err();
        assert!(matches!(err, EngineError::GridTooLarge { size: [65_536, 65_536, 65_536] }));
        assert!(VoxelGrid::flat([8, 8, 8], [4, 0, 4]).is_err());
    }
}
