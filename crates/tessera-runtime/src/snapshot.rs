use std::sync::Arc;

use hashbrown::HashMap;
use tessera_chunk::{ChunkCoord, ChunkKey, VoxelChunk};
use tessera_lighting::LightMap;
use tessera_mesh_cpu::{NeighborData, NeighborSource};

/// Immutable copy of a chunk and its light, published after each change.
#[derive(Clone, Debug)]
pub struct ChunkSnapshot {
    pub chunk: VoxelChunk,
    /// `None` until the chunk has been lit.
    pub light: Option<LightMap>,
    /// Increases with every publish across the whole store.
    pub version: u64,
}

/// Mesher neighbor lookups served from published snapshots only.
pub struct SnapshotNeighbors<'a> {
    snapshots: &'a HashMap<ChunkKey, Arc<ChunkSnapshot>>,
}

impl<'a> SnapshotNeighbors<'a> {
    pub fn new(snapshots: &'a HashMap<ChunkKey, Arc<ChunkSnapshot>>) -> Self {
        Self { snapshots }
    }
}

impl NeighborSource for SnapshotNeighbors<'_> {
    fn neighbor(&self, coord: ChunkCoord) -> Option<NeighborData<'_>> {
        let snap = self.snapshots.get(&coord.key())?;
        Some(NeighborData { chunk: &snap.chunk, light: snap.light.as_ref() })
    }
}
