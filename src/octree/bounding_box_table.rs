use rustc_hash::FxHashMap;

use crate::physics::{aabb_key, AabbKey, AABB};

/// Index of an interned box inside a `BoundingBoxTable`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(u32);

impl BoxId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Deduplicated store of origin-relative boxes.
///
/// Sibling and cousin octree nodes of the same size differ only by translation,
/// so they all point at one entry here. No two ids ever refer to structurally
/// equal boxes.
#[derive(Debug, Default, Clone)]
pub struct BoundingBoxTable {
    boxes: Vec<AABB>,
    lookup: FxHashMap<AabbKey, BoxId>,
}

impl BoundingBoxTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id of an equal box, storing `aabb` first if none exists
    pub fn intern(&mut self, aabb: AABB) -> BoxId {
        let key = aabb_key(&aabb);
        if let Some(&id) = self.lookup.get(&key) {
            return id;
        }
        let id = BoxId(self.boxes.len() as u32);
        self.boxes.push(aabb);
        self.lookup.insert(key, id);
        id
    }

    /// Look up an interned box.
    ///
    /// Ids are only minted by `intern` and entries are never removed, so every
    /// `BoxId` handed out by this table resolves.
    pub fn get(&self, id: BoxId) -> &AABB {
        &self.boxes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoxId, &AABB)> {
        self.boxes
            .iter()
            .enumerate()
            .map(|(i, aabb)| (BoxId(i as u32), aabb))
    }
}
