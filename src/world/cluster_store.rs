use cgmath::{EuclideanSpace, Point3, Vector3};
use rustc_hash::FxHashMap;

use super::{BlockGeometryProvider, BlockTypeId, ClusterId, VoxelGrid, VoxelPos};
use crate::config::WorldConfig;
use crate::error::{invariant_violation, EngineResult};
use crate::octree::Octree;
use crate::physics::{aabb_from_center_half_extents, create_aabb, AABB};
use crate::renderer::{RenderBatch, RenderBatches};

/// Derived data of one active cluster
#[derive(Debug, Clone)]
pub struct ActiveCluster {
    pub id: ClusterId,
    /// Grid cell at the cluster's minimum corner
    pub origin: VoxelPos,
    pub octree: Octree,
    /// One batch per block type present, in first-encountered scan order
    pub batches: Vec<RenderBatch>,
}

/// Active clusters with their octrees and render batches.
///
/// A cluster is active exactly when it has an entry here. Activation order is
/// remembered and drives both render batch order and pick tie-breaking.
#[derive(Debug, Default)]
pub struct ClusterStore {
    clusters: FxHashMap<ClusterId, ActiveCluster>,
    order: Vec<ClusterId>,
}

impl ClusterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build octree and render batches for `id`.
    ///
    /// Returns `Ok(false)` if the cluster is already active or is not part of `grid`.
    pub fn activate<P>(
        &mut self,
        id: ClusterId,
        grid: &VoxelGrid,
        blocks: &P,
        config: &WorldConfig,
    ) -> EngineResult<bool>
    where
        P: BlockGeometryProvider + ?Sized,
    {
        if self.contains(id) {
            return Ok(false);
        }
        let Some(cluster_pos) = grid.cluster_pos(id) else {
            return Ok(false);
        };

        let dims = grid.cluster_dimensions();
        let cube_size = config.cube_size;
        let half_cube = config.half_cube();
        let origin = cluster_pos.origin_cell(dims);

        let half_extent = Vector3::new(
            dims[0] as f32 * half_cube,
            dims[1] as f32 * half_cube,
            dims[2] as f32 * half_cube,
        );
        let centroid = origin.to_world_position(cube_size) + half_extent;
        let region = aabb_from_center_half_extents(Point3::origin(), half_extent);
        let mut octree =
            Octree::with_split_threshold(region, centroid, config.octree_split_threshold);

        let mut groups: Vec<(BlockTypeId, Vec<VoxelPos>)> = Vec::new();
        let mut group_of: FxHashMap<BlockTypeId, usize> = FxHashMap::default();
        for (pos, block) in grid.cluster_cells(id) {
            let slot = *group_of.entry(block).or_insert_with(|| {
                groups.push((block, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(pos);
        }

        let mut batches = Vec::with_capacity(groups.len());
        let mut positions = Vec::new();
        let mut boxes = Vec::new();
        let to_centre = Vector3::new(half_cube, half_cube, half_cube);

        for (block, cells) in groups {
            let Some(mesh) = blocks.geometry(block) else {
                log::warn!(
                    "[ClusterStore] No geometry for block type {} in cluster {}, skipping {} cells",
                    block,
                    id,
                    cells.len()
                );
                continue;
            };

            let mut batch = RenderBatch::new(block);
            for cell in cells {
                let world = cell.to_world_position(cube_size);
                let bounds = batch
                    .append_translated(mesh, world.to_vec() + to_centre)
                    .unwrap_or_else(|| cell_bounds(world, cube_size));
                positions.push(world);
                boxes.push(bounds);
            }
            batches.push(batch);
        }

        octree.insert(&positions, &boxes)?;

        log::debug!(
            "[ClusterStore] Activated cluster {} at {}: {} cells, {} batches, {} octree nodes",
            id,
            origin,
            positions.len(),
            batches.len(),
            octree.stats().node_count
        );

        self.clusters.insert(
            id,
            ActiveCluster {
                id,
                origin,
                octree,
                batches,
            },
        );
        self.order.push(id);
        Ok(true)
    }

    /// Drop a cluster's derived data. Returns false if it was not active.
    pub fn deactivate(&mut self, id: ClusterId) -> bool {
        if self.clusters.remove(&id).is_none() {
            return false;
        }
        self.order.retain(|&active| active != id);
        log::debug!("[ClusterStore] Deactivated cluster {}", id);
        true
    }

    /// Deactivate then activate `id` so its data reflects the current grid
    pub fn rebuild<P>(
        &mut self,
        id: ClusterId,
        grid: &VoxelGrid,
        blocks: &P,
        config: &WorldConfig,
    ) -> EngineResult<()>
    where
        P: BlockGeometryProvider + ?Sized,
    {
        self.deactivate(id);
        if self.activate(id, grid, blocks, config)? {
            Ok(())
        } else {
            Err(invariant_violation(format!(
                "cluster {} could not be rebuilt",
                id
            )))
        }
    }

    pub fn contains(&self, id: ClusterId) -> bool {
        self.clusters.contains_key(&id)
    }

    pub fn get(&self, id: ClusterId) -> Option<&ActiveCluster> {
        self.clusters.get(&id)
    }

    /// Active cluster ids in activation order
    pub fn active_ids(&self) -> &[ClusterId] {
        &self.order
    }

    /// Active clusters in activation order
    pub fn iter(&self) -> impl Iterator<Item = &ActiveCluster> {
        self.order.iter().filter_map(|id| self.clusters.get(id))
    }

    pub fn octrees(&self) -> impl Iterator<Item = (ClusterId, &Octree)> {
        self.iter().map(|cluster| (cluster.id, &cluster.octree))
    }

    /// Every active cluster's batches concatenated in activation order
    pub fn render_batches(&self) -> RenderBatches<'_> {
        self.iter()
            .flat_map(|cluster| cluster.batches.iter())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.clusters.clear();
        self.order.clear();
    }
}

fn cell_bounds(world: Point3<f32>, cube_size: f32) -> AABB {
    create_aabb(world, world + Vector3::new(cube_size, cube_size, cube_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{BlockCatalog, CubeGeometrySource};

    fn setup() -> (VoxelGrid, BlockCatalog, WorldConfig) {
        let config = WorldConfig {
            cluster_dimensions: [4, 4, 4],
            ..WorldConfig::default()
        };
        let grid = VoxelGrid::new([8, 4, 4], config.cluster_dimensions).unwrap();
        let catalog = BlockCatalog::from_names(
            ["GrassCube", "StoneCube", "DirtCube"],
            &CubeGeometrySource::new(config.cube_size),
        )
        .unwrap();
        (grid, catalog, config)
    }

    #[test]
    fn test_activate_groups_cells_by_block_type() {
        let (mut grid, catalog, config) = setup();
        grid.set(VoxelPos::new(0, 0, 0), Some(BlockTypeId(2)));
        grid.set(VoxelPos::new(1, 0, 0), Some(BlockTypeId(0)));
        grid.set(VoxelPos::new(2, 0, 0), Some(BlockTypeId(2)));

        let mut store = ClusterStore::new();
        assert!(store.activate(ClusterId(0), &grid, &catalog, &config).unwrap());

        let cluster = store.get(ClusterId(0)).unwrap();
        let types: Vec<BlockTypeId> = cluster.batches.iter().map(|b| b.block_type).collect();
        assert_eq!(types, vec![BlockTypeId(2), BlockTypeId(0)]);
        assert_eq!(cluster.batches[0].vertices.len(), 48);
        assert_eq!(cluster.batches[0].indices[36], 24);
        assert_eq!(cluster.octree.count(), 3);
        assert_eq!(cluster.octree.region().min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(cluster.octree.region().max, Point3::new(8.0, 8.0, 8.0));
    }

    #[test]
    fn test_cell_geometry_sits_in_its_cell() {
        let (mut grid, catalog, config) = setup();
        grid.set(VoxelPos::new(5, 1, 2), Some(BlockTypeId(1)));

        let mut store = ClusterStore::new();
        store.activate(ClusterId(1), &grid, &catalog, &config).unwrap();
        let batch = &store.get(ClusterId(1)).unwrap().batches[0];
        let bounds = crate::physics::aabb_from_points(
            batch.vertices.iter().map(|v| v.position_point()),
        )
        .unwrap();
        assert_eq!(bounds.min, Point3::new(10.0, 2.0, 4.0));
        assert_eq!(bounds.max, Point3::new(12.0, 4.0, 6.0));
    }

    #[test]
    fn test_activation_is_idempotent() {
        let (mut grid, catalog, config) = setup();
        grid.set(VoxelPos::new(0, 0, 0), Some(BlockTypeId(0)));
        let mut store = ClusterStore::new();
        assert!(store.activate(ClusterId(0), &grid, &catalog, &config).unwrap());
        assert!(!store.activate(ClusterId(0), &grid, &catalog, &config).unwrap());
        assert_eq!(store.len(), 1);
        assert_eq!(store.render_batches().len(), 1);
    }

    #[test]
    fn test_out_of_grid_cluster_is_ignored() {
        let (grid, catalog, config) = setup();
        let mut store = ClusterStore::new();
        assert!(!store.activate(ClusterId(2), &grid, &catalog, &config).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_deactivate_and_order() {
        let (mut grid, catalog, config) = setup();
        grid.set(VoxelPos::new(0, 0, 0), Some(BlockTypeId(0)));
        grid.set(VoxelPos::new(4, 0, 0), Some(BlockTypeId(1)));

        let mut store = ClusterStore::new();
        store.activate(ClusterId(1), &grid, &catalog, &config).unwrap();
        store.activate(ClusterId(0), &grid, &catalog, &config).unwrap();
        assert_eq!(store.active_ids(), &[ClusterId(1), ClusterId(0)]);
        assert_eq!(
            store.render_batches().source_models,
            vec![BlockTypeId(1), BlockTypeId(0)]
        );

        store.rebuild(ClusterId(1), &grid, &catalog, &config).unwrap();
        assert_eq!(store.active_ids(), &[ClusterId(0), ClusterId(1)]);

        assert!(store.deactivate(ClusterId(0)));
        assert!(!store.deactivate(ClusterId(0)));
        assert!(!store.contains(ClusterId(0)));
        assert_eq!(store.active_ids(), &[ClusterId(1)]);
    }

    #[test]
    fn test_empty_cluster_activates_without_batches() {
        let (grid, catalog, config) = setup();
        let mut store = ClusterStore::new();
        assert!(store.activate(ClusterId(0), &grid, &catalog, &config).unwrap());
        assert!(store.render_batches().is_empty());
        assert!(store.get(ClusterId(0)).unwrap().octree.is_empty());
    }
}
