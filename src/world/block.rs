use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EngineError, EngineResult};
use crate::renderer::BlockMesh;

/// Index of a block type in a world's block name list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct BlockTypeId(pub u16);

impl BlockTypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference geometry per block type, as consumed by cluster activation
pub trait BlockGeometryProvider {
    fn geometry(&self, block: BlockTypeId) -> Option<&BlockMesh>;
}

/// Content loader resolving a block name to its reference geometry
pub trait BlockGeometrySource {
    fn load_geometry(&self, name: &str) -> EngineResult<BlockMesh>;
}

/// Supplies the same origin-centred cube for every block name
#[derive(Debug, Clone, Copy)]
pub struct CubeGeometrySource {
    cube_size: f32,
}

impl CubeGeometrySource {
    pub fn new(cube_size: f32) -> Self {
        Self { cube_size }
    }
}

impl BlockGeometrySource for CubeGeometrySource {
    fn load_geometry(&self, name: &str) -> EngineResult<BlockMesh> {
        if name.trim().is_empty() {
            return Err(EngineError::UnknownBlockType {
                name: name.to_string(),
            });
        }
        Ok(BlockMesh::cube(self.cube_size))
    }
}

/// Ordered block names paired with their reference geometry
#[derive(Debug, Clone, Default)]
pub struct BlockCatalog {
    names: Vec<String>,
    meshes: Vec<BlockMesh>,
}

impl BlockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every name through `source`, keeping the given order
    pub fn from_names<I, S, G>(names: I, source: &G) -> EngineResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        G: BlockGeometrySource + ?Sized,
    {
        let mut catalog = Self::new();
        for name in names {
            let name = name.into();
            let mesh = source.load_geometry(&name)?;
            catalog.register(name, mesh);
        }
        Ok(catalog)
    }

    /// Append a block type and return its id
    pub fn register(&mut self, name: impl Into<String>, mesh: BlockMesh) -> BlockTypeId {
        let id = BlockTypeId(self.names.len() as u16);
        self.names.push(name.into());
        self.meshes.push(mesh);
        id
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, block: BlockTypeId) -> Option<&str> {
        self.names.get(block.index()).map(String::as_str)
    }

    pub fn id_of(&self, name: &str) -> Option<BlockTypeId> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| BlockTypeId(i as u16))
    }

    pub fn contains(&self, block: BlockTypeId) -> bool {
        block.index() < self.names.len()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl BlockGeometryProvider for BlockCatalog {
    fn geometry(&self, block: BlockTypeId) -> Option<&BlockMesh> {
        self.meshes.get(block.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_keeps_name_order() {
        let source = CubeGeometrySource::new(2.0);
        let catalog = BlockCatalog::from_names(["GrassCube", "StoneCube"], &source).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.name(BlockTypeId(1)), Some("StoneCube"));
        assert_eq!(catalog.id_of("GrassCube"), Some(BlockTypeId(0)));
        assert!(catalog.contains(BlockTypeId(1)));
        assert!(!catalog.contains(BlockTypeId(2)));
        assert_eq!(catalog.geometry(BlockTypeId(0)).unwrap().vertices.len(), 24);
        assert!(catalog.geometry(BlockTypeId(5)).is_none());
    }

    #[test]
    fn test_blank_name_is_unknown() {
        let source = CubeGeometrySource::new(2.0);
        let err = BlockCatalog::from_names(["GrassCube", " "], &source).unwrap_err();
        assert!(matches!(err, EngineError::UnknownBlockType { .. }));
    }
}
