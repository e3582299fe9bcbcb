use std::cell::OnceCell;

use tessera_blocks::{AIR, BlockId, MAX_LIGHT};
use tessera_chunk::{CHUNK_HEIGHT, CHUNK_SIZE, ChunkCoord, VoxelChunk};
use tessera_lighting::LightMap;

/// A neighbor chunk's blocks and, once lit, its light.
#[derive(Clone, Copy)]
pub struct NeighborData<'a> {
    pub chunk: &'a VoxelChunk,
    pub light: Option<&'a LightMap>,
}

/// Supplies horizontal neighbor chunks on demand.
pub trait NeighborSource {
    fn neighbor(&self, coord: ChunkCoord) -> Option<NeighborData<'_>>;
}

/// Every neighbor is unloaded.
pub struct NoNeighbors;

impl NeighborSource for NoNeighbors {
    fn neighbor(&self, _coord: ChunkCoord) -> Option<NeighborData<'_>> {
        None
    }
}

/// The target chunk plus its four neighbors, each fetched the first time a voxel
/// past that edge is sampled. Coordinates are chunk-local and may step one voxel
/// outside the chunk horizontally.
pub struct ChunkView<'a, N: NeighborSource> {
    pub chunk: &'a VoxelChunk,
    pub light: Option<&'a LightMap>,
    source: &'a N,
    // -X, +X, -Z, +Z
    slots: [OnceCell<Option<NeighborData<'a>>>; 4],
}

impl<'a, N: NeighborSource> ChunkView<'a, N> {
    pub fn new(chunk: &'a VoxelChunk, light: Option<&'a LightMap>, source: &'a N) -> Self {
        Self { chunk, light, source, slots: Default::default() }
    }

    fn slot(&self, x: i32, z: i32) -> Option<(usize, i32, i32)> {
        let s = CHUNK_SIZE as i32;
        match (x < 0, x >= s, z < 0, z >= s) {
            (true, _, false, false) => Some((0, x + s, z)),
            (_, true, false, false) => Some((1, x - s, z)),
            (false, false, true, _) => Some((2, x, z + s)),
            (false, false, _, true) => Some((3, x, z - s)),
            _ => None,
        }
    }

    fn neighbor(&self, i: usize) -> Option<NeighborData<'a>> {
        let source: &'a N = self.source;
        let coord = self.chunk.coord.cardinal_neighbors()[i];
        *self.slots[i].get_or_init(|| source.neighbor(coord))
    }

    #[inline]
    fn inside(x: i32, z: i32) -> bool {
        let s = CHUNK_SIZE as i32;
        x >= 0 && z >= 0 && x < s && z < s
    }

    /// Block at a local position. Above the world is air, below it is treated as
    /// solid ground (`None` when the owning chunk is not available).
    pub fn block(&self, x: i32, y: i32, z: i32) -> Option<BlockId> {
        if y >= CHUNK_HEIGHT as i32 {
            return Some(AIR);
        }
        if y < 0 {
            return None;
        }
        if Self::inside(x, z) {
            return Some(self.chunk.get_block(x, y, z));
        }
        let (i, lx, lz) = self.slot(x, z)?;
        self.neighbor(i).map(|n| n.chunk.get_block(lx, y, lz))
    }

    pub fn metadata(&self, x: i32, y: i32, z: i32) -> u8 {
        if Self::inside(x, z) {
            return self.chunk.get_metadata(x, y, z);
        }
        self.slot(x, z)
            .and_then(|(i, lx, lz)| self.neighbor(i).map(|n| n.chunk.get_metadata(lx, y, lz)))
            .unwrap_or(0)
    }

    /// Light at a local position; `None` where nothing is known.
    pub fn light(&self, x: i32, y: i32, z: i32) -> Option<u8> {
        if y >= CHUNK_HEIGHT as i32 {
            return Some(MAX_LIGHT);
        }
        if y < 0 {
            return None;
        }
        if Self::inside(x, z) {
            return Some(self.light.map_or(MAX_LIGHT, |l| l.get(x, y, z)));
        }
        let (i, lx, lz) = self.slot(x, z)?;
        self.neighbor(i)?.light.map(|l| l.get(lx, y, lz))
    }
}
