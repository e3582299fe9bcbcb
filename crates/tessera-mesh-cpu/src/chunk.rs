use std::collections::HashMap;

use tessera_blocks::BlockId;
use tessera_chunk::ChunkCoord;

use crate::mesh_build::MeshBuffers;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum FaceGroup {
    Top,
    Bottom,
    Side,
    Cross,
}

/// Renderer-facing key: one buffer set per block type and face group.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PartKey {
    pub block: BlockId,
    pub group: FaceGroup,
}

pub struct ChunkMesh {
    pub coord: ChunkCoord,
    pub parts: HashMap<PartKey, MeshBuffers>,
}

impl ChunkMesh {
    pub fn new(coord: ChunkCoord) -> Self {
        Self { coord, parts: HashMap::new() }
    }

    #[inline]
    pub fn part_mut(&mut self, block: BlockId, group: FaceGroup) -> &mut MeshBuffers {
        self.parts.entry(PartKey { block, group }).or_default()
    }

    pub fn part(&self, block: BlockId, group: FaceGroup) -> Option<&MeshBuffers> {
        self.parts.get(&PartKey { block, group })
    }

    pub fn quad_count(&self) -> usize {
        self.parts.values().map(MeshBuffers::quad_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.values().all(MeshBuffers::is_empty)
    }

    /// Parts in a stable order, for renderers that upload deterministically.
    pub fn sorted_parts(&self) -> Vec<(&PartKey, &MeshBuffers)> {
        let mut v: Vec<_> = self.parts.iter().collect();
        v.sort_by_key(|(k, _)| **k);
        v
    }
}
