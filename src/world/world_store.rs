use std::path::Path;

use cgmath::{EuclideanSpace, Point3, Vector3};

use super::{
    BlockCatalog, BlockGeometrySource, BlockTypeId, ClusterId, ClusterPos, ClusterStore, VoxelGrid,
    VoxelPos,
};
use crate::config::WorldConfig;
use crate::constants::picking::FACE_EPSILON;
use crate::error::{invalid_config, EngineError, EngineResult};
use crate::octree::OctreeHit;
use crate::persistence::{load_world, save_world};
use crate::physics::{
    aabb_contains_point, aabb_from_center_half_extents, ray_plane_intersection, BlockFace, Ray,
};
use crate::renderer::RenderBatches;

/// Result of a successful pick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickResult {
    /// Solid cell struck by the ray
    pub hit: VoxelPos,
    /// Cell beside the struck face; equals `hit` when no face could be resolved
    pub neighbor: VoxelPos,
    pub face: Option<BlockFace>,
    /// Distance along the ray to the struck cell's box
    pub distance: f32,
}

/// The voxel world: grid, active clusters and block catalog.
///
/// All mutation goes through here. Coordinates outside the grid are not
/// errors; mutators report `Ok(false)` and queries return `None`.
#[derive(Debug)]
pub struct WorldStore {
    config: WorldConfig,
    grid: VoxelGrid,
    clusters: ClusterStore,
    catalog: BlockCatalog,
}

impl WorldStore {
    /// Empty world of at least `size` cells
    pub fn new(config: WorldConfig, catalog: BlockCatalog, size: [u32; 3]) -> EngineResult<Self> {
        config.validate()?;
        let grid = VoxelGrid::new(size, config.cluster_dimensions)?;
        Self::from_parts(config, catalog, grid)
    }

    /// World whose bottom layer is block type 0
    pub fn flat(config: WorldConfig, catalog: BlockCatalog, size: [u32; 3]) -> EngineResult<Self> {
        config.validate()?;
        let grid = VoxelGrid::flat(size, config.cluster_dimensions)?;
        Self::from_parts(config, catalog, grid)
    }

    pub fn from_parts(
        config: WorldConfig,
        catalog: BlockCatalog,
        grid: VoxelGrid,
    ) -> EngineResult<Self> {
        config.validate()?;
        if grid.cluster_dimensions() != config.cluster_dimensions {
            return Err(invalid_config(format!(
                "grid clusters are {:?} but configuration says {:?}",
                grid.cluster_dimensions(),
                config.cluster_dimensions
            )));
        }
        if let Some(block) = grid.max_block_type().filter(|&b| !catalog.contains(b)) {
            return Err(EngineError::UnknownBlockType {
                name: format!("#{}", block),
            });
        }

        let [sx, sy, sz] = grid.size();
        log::info!(
            "[WorldStore] World {}x{}x{} cells in {} clusters, {} block types, {} solid cells",
            sx,
            sy,
            sz,
            grid.cluster_count(),
            catalog.len(),
            grid.solid_count()
        );

        Ok(Self {
            config,
            grid,
            clusters: ClusterStore::new(),
            catalog,
        })
    }

    /// Read a world file, resolving its block names through `source`.
    ///
    /// Nothing is returned unless the whole file is valid.
    pub fn load<P, G>(path: P, config: WorldConfig, source: &G) -> EngineResult<Self>
    where
        P: AsRef<Path>,
        G: BlockGeometrySource + ?Sized,
    {
        let path = path.as_ref();
        config.validate()?;
        let snapshot = load_world(path, config.cluster_dimensions)?;
        let catalog = BlockCatalog::from_names(snapshot.block_names, source)?;
        log::info!("[WorldStore] Loaded world from {}", path.display());
        Self::from_parts(config, catalog, snapshot.grid)
    }

    /// Write the grid and block names to `path`, replacing it atomically
    pub fn save<P: AsRef<Path>>(&self, path: P) -> EngineResult<()> {
        let path = path.as_ref();
        save_world(path, self.catalog.names(), &self.grid)?;
        log::info!(
            "[WorldStore] Saved {} solid cells to {}",
            self.grid.solid_count(),
            path.display()
        );
        Ok(())
    }

    /// Place `block` in an empty cell and rebuild its cluster.
    ///
    /// Returns `Ok(false)` without touching anything if the cell is occupied,
    /// lies outside the grid, or `block` is not in the catalog.
    pub fn add_voxel(&mut self, pos: VoxelPos, block: BlockTypeId) -> EngineResult<bool> {
        if !self.catalog.contains(block) {
            log::warn!(
                "[WorldStore] Ignoring add of unknown block type {} at {}",
                block,
                pos
            );
            return Ok(false);
        }
        let Some(cluster) = self.grid.cluster_containing(pos) else {
            log::trace!("[WorldStore] Add at {} is outside the world", pos);
            return Ok(false);
        };
        if self.grid.get(pos).is_some() {
            return Ok(false);
        }

        self.grid.set(pos, Some(block));
        log::trace!("[WorldStore] Added block {} at {}", block, pos);
        self.rebuild_cluster(cluster)?;
        Ok(true)
    }

    /// Empty an occupied cell and rebuild its cluster
    pub fn delete_voxel(&mut self, pos: VoxelPos) -> EngineResult<bool> {
        let Some(cluster) = self.grid.cluster_containing(pos) else {
            log::trace!("[WorldStore] Delete at {} is outside the world", pos);
            return Ok(false);
        };
        if self.grid.get(pos).is_none() {
            return Ok(false);
        }

        self.grid.set(pos, None);
        log::trace!("[WorldStore] Deleted block at {}", pos);
        self.rebuild_cluster(cluster)?;
        Ok(true)
    }

    fn rebuild_cluster(&mut self, id: ClusterId) -> EngineResult<()> {
        self.clusters
            .rebuild(id, &self.grid, &self.catalog, &self.config)
    }

    /// Block at `pos`, `None` when empty or outside the grid
    pub fn voxel(&self, pos: VoxelPos) -> Option<BlockTypeId> {
        self.grid.get(pos)
    }

    /// Activate every cluster within `radius` cells of `center`, per axis.
    ///
    /// The radius is rounded up to whole clusters. Returns the number of
    /// clusters newly activated.
    pub fn set_active_region(&mut self, center: VoxelPos, radius: f32) -> EngineResult<usize> {
        let dims = self.grid.cluster_dimensions();
        let counts = self.grid.cluster_counts();
        let center_cluster = center.cluster_of(dims);
        let centre = [center_cluster.x, center_cluster.y, center_cluster.z];

        // Cluster range on each axis, clipped to the grid
        let span = |axis: usize| {
            let reach = (radius / dims[axis] as f32).ceil().max(0.0) as i64;
            let low = i64::from(centre[axis]).saturating_sub(reach).max(0);
            let high = i64::from(centre[axis])
                .saturating_add(reach)
                .min(i64::from(counts[axis]) - 1);
            (low as i32)..=(high as i32)
        };

        let mut activated = 0;
        for cx in span(0) {
            for cy in span(1) {
                for cz in span(2) {
                    let Some(id) = self.grid.cluster_id(ClusterPos::new(cx, cy, cz)) else {
                        continue;
                    };
                    if self
                        .clusters
                        .activate(id, &self.grid, &self.catalog, &self.config)?
                    {
                        activated += 1;
                    }
                }
            }
        }

        log::debug!(
            "[WorldStore] Active region around {} (radius {}): {} newly active, {} total",
            center,
            radius,
            activated,
            self.clusters.len()
        );
        Ok(activated)
    }

    /// Activate every cluster in the grid
    pub fn activate_all(&mut self) -> EngineResult<usize> {
        let mut activated = 0;
        for id in self.grid.cluster_ids() {
            if self
                .clusters
                .activate(id, &self.grid, &self.catalog, &self.config)?
            {
                activated += 1;
            }
        }
        Ok(activated)
    }

    pub fn deactivate_all(&mut self) {
        self.clusters.clear();
    }

    /// Nearest solid cell along `ray` among active clusters, plus the cell beside the struck face
    pub fn pick(&self, ray: &Ray) -> Option<PickResult> {
        if ray.is_degenerate() {
            return None;
        }
        let mut nearest: Option<OctreeHit> = None;
        for (_, octree) in self.clusters.octrees() {
            if let Some(hit) = octree.nearest_intersection(ray) {
                if nearest.map_or(true, |best| hit.distance < best.distance) {
                    nearest = Some(hit);
                }
            }
        }
        let nearest = nearest?;

        let half = self.config.half_cube();
        let centre = nearest.position + Vector3::new(half, half, half);
        let hit = VoxelPos::from_world_position(centre, self.config.cube_size);
        let face = struck_face(&ray.translated(-centre.to_vec()), half);
        let neighbor = face.map_or(hit, |face| hit.offset(face.offset()));

        Some(PickResult {
            hit,
            neighbor,
            face,
            distance: nearest.distance,
        })
    }

    pub fn render_batches(&self) -> RenderBatches<'_> {
        self.clusters.render_batches()
    }

    pub fn block_names(&self) -> &[String] {
        self.catalog.names()
    }

    pub fn catalog(&self) -> &BlockCatalog {
        &self.catalog
    }

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    pub fn clusters(&self) -> &ClusterStore {
        &self.clusters
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }
}

/// Closest face plane of an origin-centred cube whose hit point lies on the face
fn struck_face(ray: &Ray, half: f32) -> Option<BlockFace> {
    let limit = half + FACE_EPSILON * half.max(1.0);
    let face_bounds =
        aabb_from_center_half_extents(Point3::origin(), Vector3::new(limit, limit, limit));
    let mut best: Option<(BlockFace, f32)> = None;

    for face in BlockFace::PICK_ORDER {
        let Some(distance) = ray_plane_intersection(ray, &face.plane(half)) else {
            continue;
        };
        if best.map_or(false, |(_, closest)| distance >= closest) {
            continue;
        }
        if aabb_contains_point(&face_bounds, ray.point_at(distance)) {
            best = Some((face, distance));
        }
    }
    best.map(|(face, _)| face)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::CubeGeometrySource;

    fn small_config() -> WorldConfig {
        WorldConfig {
            cluster_dimensions: [4, 4, 4],
            ..WorldConfig::default()
        }
    }

    fn catalog(config: &WorldConfig) -> BlockCatalog {
        BlockCatalog::from_names(
            ["GrassCube", "StoneCube", "DirtCube"],
            &CubeGeometrySource::new(config.cube_size),
        )
        .unwrap()
    }

    fn empty_world(size: [u32; 3]) -> WorldStore {
        let config = small_config();
        let catalog = catalog(&config);
        WorldStore::new(config, catalog, size).unwrap()
    }

    fn down_onto(pos: VoxelPos, cube_size: f32) -> Ray {
        let x = (pos.x as f32 + 0.5) * cube_size;
        let z = (pos.z as f32 + 0.5) * cube_size;
        Ray::new(Point3::new(x, 40.0, z), Vector3::new(0.0, -1.0, 0.0))
    }

    #[test]
    fn test_add_rebuilds_owning_cluster() {
        let mut world = empty_world([8, 8, 8]);
        let pos = VoxelPos::new(5, 1, 2);
        assert!(world.add_voxel(pos, BlockTypeId(1)).unwrap());
        assert_eq!(world.voxel(pos), Some(BlockTypeId(1)));

        let owner = world.grid().cluster_containing(pos).unwrap();
        assert_eq!(world.clusters().active_ids(), &[owner]);
        assert_eq!(world.clusters().get(owner).unwrap().octree.count(), 1);
    }

    #[test]
    fn test_add_twice_is_a_no_op() {
        let mut world = empty_world([8, 8, 8]);
        let pos = VoxelPos::new(1, 1, 1);
        world.set_active_region(pos, 1.0).unwrap();
        assert!(world.add_voxel(pos, BlockTypeId(0)).unwrap());
        let grid_before = world.grid().clone();
        let batches_before: Vec<_> = world.clusters().iter().map(|c| c.batches.clone()).collect();

        assert!(!world.add_voxel(pos, BlockTypeId(0)).unwrap());
        assert!(!world.add_voxel(pos, BlockTypeId(2)).unwrap());
        assert_eq!(world.grid(), &grid_before);
        let batches_after: Vec<_> = world.clusters().iter().map(|c| c.batches.clone()).collect();
        assert_eq!(batches_after, batches_before);
    }

    #[test]
    fn test_out_of_range_edits_are_ignored() {
        let mut world = empty_world([8, 8, 8]);
        let before = world.grid().clone();
        assert!(!world.add_voxel(VoxelPos::new(8, 0, 0), BlockTypeId(0)).unwrap());
        assert!(!world.add_voxel(VoxelPos::new(-1, 0, 0), BlockTypeId(0)).unwrap());
        assert!(!world.delete_voxel(VoxelPos::new(0, 100, 0)).unwrap());
        assert_eq!(world.grid(), &before);
        assert!(world.clusters().is_empty());
    }

    #[test]
    fn test_unknown_block_type_is_ignored() {
        let mut world = empty_world([4, 4, 4]);
        assert!(!world.add_voxel(VoxelPos::new(0, 0, 0), BlockTypeId(9)).unwrap());
        assert_eq!(world.voxel(VoxelPos::new(0, 0, 0)), None);
    }

    #[test]
    fn test_delete_clears_cell_and_batches() {
        let mut world = empty_world([4, 4, 4]);
        let pos = VoxelPos::new(2, 2, 2);
        world.add_voxel(pos, BlockTypeId(0)).unwrap();
        assert_eq!(world.render_batches().len(), 1);

        assert!(world.delete_voxel(pos).unwrap());
        assert!(!world.delete_voxel(pos).unwrap());
        assert_eq!(world.voxel(pos), None);
        assert!(world.render_batches().is_empty());
    }

    #[test]
    fn test_active_region_rounds_radius_up() {
        let mut world = empty_world([16, 4, 16]);
        // 16 cells / 4 per cluster = 4 x 1 x 4 clusters
        let activated = world.set_active_region(VoxelPos::new(0, 0, 0), 3.0).unwrap();
        // reach of one cluster around (0, 0, 0), clipped to the grid
        assert_eq!(activated, 4);
        assert_eq!(world.set_active_region(VoxelPos::new(0, 0, 0), 3.0).unwrap(), 0);

        let activated = world.set_active_region(VoxelPos::new(8, 0, 8), 5.0).unwrap();
        assert_eq!(activated, 16 - 4);
        assert_eq!(world.clusters().len(), 16);
    }

    #[test]
    fn test_active_region_clips_huge_radius_to_grid() {
        let mut world = empty_world([8, 8, 8]);
        assert_eq!(world.set_active_region(VoxelPos::new(0, 0, 0), 4000.0).unwrap(), 8);
        assert_eq!(world.set_active_region(VoxelPos::new(3, 3, 3), f32::MAX).unwrap(), 0);
        assert_eq!(world.clusters().len(), 8);

        world.deactivate_all();
        let far = VoxelPos::new(i32::MAX, i32::MIN, i32::MAX);
        assert_eq!(world.set_active_region(far, 1.0).unwrap(), 0);
        assert_eq!(world.set_active_region(far, f32::INFINITY).unwrap(), 8);
    }

    #[test]
    fn test_pick_top_face_returns_cell_above() {
        let mut world = empty_world([8, 8, 8]);
        let pos = VoxelPos::new(5, 0, 5);
        world.add_voxel(pos, BlockTypeId(0)).unwrap();

        let pick = world.pick(&down_onto(pos, 2.0)).unwrap();
        assert_eq!(pick.hit, pos);
        assert_eq!(pick.neighbor, VoxelPos::new(5, 1, 5));
        assert_eq!(pick.face, Some(BlockFace::Top));
        assert_eq!(pick.distance, 38.0);
    }

    #[test]
    fn test_pick_side_faces() {
        let mut world = empty_world([8, 8, 8]);
        let pos = VoxelPos::new(3, 3, 3);
        world.add_voxel(pos, BlockTypeId(0)).unwrap();
        let centre = Point3::new(7.0, 7.0, 7.0);

        let cases = [
            (Vector3::new(-1.0, 0.0, 0.0), BlockFace::Right, VoxelPos::new(4, 3, 3)),
            (Vector3::new(1.0, 0.0, 0.0), BlockFace::Left, VoxelPos::new(2, 3, 3)),
            (Vector3::new(0.0, 0.0, 1.0), BlockFace::Back, VoxelPos::new(3, 3, 2)),
            (Vector3::new(0.0, 0.0, -1.0), BlockFace::Front, VoxelPos::new(3, 3, 4)),
            (Vector3::new(0.0, 1.0, 0.0), BlockFace::Bottom, VoxelPos::new(3, 2, 3)),
        ];
        for (direction, face, neighbor) in cases {
            let ray = Ray::new(centre - direction * 5.0, direction);
            let pick = world.pick(&ray).unwrap();
            assert_eq!(pick.hit, pos);
            assert_eq!(pick.face, Some(face));
            assert_eq!(pick.neighbor, neighbor);
        }
    }

    #[test]
    fn test_pick_prefers_nearest_across_clusters() {
        let mut world = empty_world([8, 8, 8]);
        world.add_voxel(VoxelPos::new(1, 6, 1), BlockTypeId(0)).unwrap();
        world.add_voxel(VoxelPos::new(1, 1, 1), BlockTypeId(1)).unwrap();

        let pick = world.pick(&down_onto(VoxelPos::new(1, 0, 1), 2.0)).unwrap();
        assert_eq!(pick.hit, VoxelPos::new(1, 6, 1));

        world.delete_voxel(VoxelPos::new(1, 6, 1)).unwrap();
        let pick = world.pick(&down_onto(VoxelPos::new(1, 0, 1), 2.0)).unwrap();
        assert_eq!(pick.hit, VoxelPos::new(1, 1, 1));
    }

    #[test]
    fn test_pick_with_zero_direction_misses() {
        let mut world = empty_world([8, 8, 8]);
        world.add_voxel(VoxelPos::new(5, 5, 5), BlockTypeId(0)).unwrap();
        let ray = Ray::new(Point3::new(-100.0, -100.0, -100.0), Vector3::new(0.0, 0.0, 0.0));
        assert!(world.pick(&ray).is_none());
    }

    #[test]
    fn test_pick_ignores_inactive_clusters() {
        let config = small_config();
        let catalog = catalog(&config);
        let world = WorldStore::flat(config, catalog, [8, 8, 8]).unwrap();
        assert!(world.pick(&down_onto(VoxelPos::new(1, 0, 1), 2.0)).is_none());
    }

    #[test]
    fn test_grid_needs_catalog_entries() {
        let config = small_config();
        let grid = VoxelGrid::flat([4, 4, 4], config.cluster_dimensions).unwrap();
        let err = WorldStore::from_parts(config, BlockCatalog::new(), grid).unwrap_err();
        assert!(matches!(err, EngineError::UnknownBlockType { .. }));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = WorldConfig {
            cube_size: 0.0,
            ..small_config()
        };
        let catalog = catalog(&small_config());
        let err = WorldStore::new(config, catalog, [4, 4, 4]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig { .. }));
    }
}
