use hashbrown::HashMap;
use tessera_blocks::BlockId;
use tessera_chunk::{BlockAccess, BlockPos, ChunkCoord, ChunkKey, VoxelChunk};
use tessera_liquid::LiquidWorld;

/// Loaded chunks keyed by packed coordinate.
#[derive(Debug, Default)]
pub struct ChunkMap {
    chunks: HashMap<ChunkKey, VoxelChunk>,
}

impl ChunkMap {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, coord: ChunkCoord) -> Option<&VoxelChunk> {
        self.chunks.get(&coord.key())
    }

    #[inline]
    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut VoxelChunk> {
        self.chunks.get_mut(&coord.key())
    }

    #[inline]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord.key())
    }

    pub fn insert(&mut self, chunk: VoxelChunk) -> Option<VoxelChunk> {
        self.chunks.insert(chunk.coord.key(), chunk)
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> Option<VoxelChunk> {
        self.chunks.remove(&coord.key())
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.values().map(|c| c.coord)
    }
}

impl BlockAccess for ChunkMap {
    #[inline]
    fn block_at(&self, wx: i32, wy: i32, wz: i32) -> Option<BlockId> {
        self.get(ChunkCoord::containing(wx, wz))?.block_at(wx, wy, wz)
    }

    #[inline]
    fn metadata_at(&self, wx: i32, wy: i32, wz: i32) -> Option<u8> {
        self.get(ChunkCoord::containing(wx, wz))?.metadata_at(wx, wy, wz)
    }

    #[inline]
    fn is_loaded(&self, wx: i32, wz: i32) -> bool {
        self.contains(ChunkCoord::containing(wx, wz))
    }
}

/// Write-recording view handed to the liquid simulator for one tick.
pub(crate) struct LiquidEdits<'a> {
    map: &'a mut ChunkMap,
    /// (position, old id, new id) for every accepted write.
    pub(crate) edits: Vec<(BlockPos, BlockId, BlockId)>,
}

impl<'a> LiquidEdits<'a> {
    pub(crate) fn new(map: &'a mut ChunkMap) -> Self {
        Self { map, edits: Vec::new() }
    }
}

impl BlockAccess for LiquidEdits<'_> {
    fn block_at(&self, wx: i32, wy: i32, wz: i32) -> Option<BlockId> {
        self.map.block_at(wx, wy, wz)
    }

    fn metadata_at(&self, wx: i32, wy: i32, wz: i32) -> Option<u8> {
        self.map.metadata_at(wx, wy, wz)
    }

    fn is_loaded(&self, wx: i32, wz: i32) -> bool {
        self.map.is_loaded(wx, wz)
    }
}

impl LiquidWorld for LiquidEdits<'_> {
    fn set_liquid_cell(&mut self, wx: i32, wy: i32, wz: i32, id: BlockId, meta: u8) -> bool {
        let pos = BlockPos::new(wx, wy, wz);
        let Some(chunk) = self.map.get_mut(pos.chunk()) else { return false };
        let (lx, lz) = pos.local_xz();
        let old = chunk.get_block(lx as i32, wy, lz as i32);
        if !chunk.set_block(lx as i32, wy, lz as i32, id, meta) {
            return false;
        }
        self.edits.push((pos, old, id));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_cross_chunk_borders() {
        let mut map = ChunkMap::new();
        let mut west = VoxelChunk::new(ChunkCoord::new(-1, 0));
        west.set_block(15, 3, 0, 2, 0);
        map.insert(west);
        map.insert(VoxelChunk::new(ChunkCoord::new(0, 0)));
        assert_eq!(map.block_at(-1, 3, 0), Some(2));
        assert_eq!(map.block_at(0, 3, 0), Some(0));
        assert_eq!(map.block_at(16, 3, 0), None);
        assert!(!map.is_loaded(16, 0));
    }

    #[test]
    fn liquid_edits_are_recorded() {
        let mut map = ChunkMap::new();
        map.insert(VoxelChunk::new(ChunkCoord::new(0, 0)));
        let mut view = LiquidEdits::new(&mut map);
        assert!(view.set_liquid_cell(4, 10, 4, 7, 100));
        assert!(!view.set_liquid_cell(4, 10, 4, 7, 100));
        assert!(!view.set_liquid_cell(40, 10, 4, 7, 100));
        assert_eq!(view.edits, vec![(BlockPos::new(4, 10, 4), 0, 7)]);
        assert_eq!(map.metadata_at(4, 10, 4), Some(100));
    }
}
