//! World configuration
//!
//! Loaded from TOML; every field is optional and falls back to the values in
//! `constants.rs`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{cluster, octree, render};
use crate::error::{invalid_config, EngineError, EngineResult};

/// Tunables for a `WorldStore`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Cells per cluster on each axis
    pub cluster_dimensions: [u32; 3],
    /// Edge length of one cell in world units
    pub cube_size: f32,
    /// Leaf size at which an octree node splits
    pub octree_split_threshold: usize,
    /// Triangle cap per draw range
    pub max_primitives_per_draw: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            cluster_dimensions: [
                cluster::CLUSTER_DIM_X,
                cluster::CLUSTER_DIM_Y,
                cluster::CLUSTER_DIM_Z,
            ],
            cube_size: cluster::CUBE_SIZE,
            octree_split_threshold: octree::SPLIT_THRESHOLD,
            max_primitives_per_draw: render::MAX_PRIMITIVES_PER_DRAW,
        }
    }
}

impl WorldConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> EngineResult<Self> {
        let config: WorldConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|error| EngineError::ConfigRead {
            path: path.to_path_buf(),
            error,
        })?;
        let config = Self::from_toml_str(&source)?;
        log::info!("[WorldConfig] Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.cluster_dimensions.iter().any(|&d| d == 0) {
            return Err(invalid_config(format!(
                "cluster dimensions must be positive, got {:?}",
                self.cluster_dimensions
            )));
        }
        if !self.cube_size.is_finite() || self.cube_size <= 0.0 {
            return Err(invalid_config(format!(
                "cube size must be a positive finite number, got {}",
                self.cube_size
            )));
        }
        if self.octree_split_threshold < 2 {
            return Err(invalid_config(format!(
                "octree split threshold must be at least 2, got {}",
                self.octree_split_threshold
            )));
        }
        if self.max_primitives_per_draw == 0 {
            return Err(invalid_config("max primitives per draw must be positive"));
        }
        Ok(())
    }

    /// Half the cube edge, the distance from a cell centre to each face
    pub fn half_cube(&self) -> f32 {
        self.cube_size * 0.5
    }
}
