use tessera_blocks::{AIR, BlockId};

use crate::rle::{DecodeReport, RleChunk, rle_decode, rle_encode};
use crate::{CHUNK_HEIGHT, CHUNK_SIZE, CHUNK_VOLUME, ChunkCoord, in_chunk_bounds, voxel_index};

/// Block ids and metadata for one chunk column, plus a per-layer occupancy cache.
///
/// `layer_mask[y]` is true iff layer `y` holds at least one non-air voxel.
/// Local coordinates are signed so callers can probe one step past an edge;
/// reads outside the chunk return 0 and writes there are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelChunk {
    pub coord: ChunkCoord,
    blocks: Vec<BlockId>,
    metadata: Vec<u8>,
    layer_mask: Vec<bool>,
}

impl VoxelChunk {
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            blocks: vec![AIR; CHUNK_VOLUME],
            metadata: vec![0; CHUNK_VOLUME],
            layer_mask: vec![false; CHUNK_HEIGHT],
        }
    }

    /// Builds a chunk from raw generator buffers; short buffers are padded with air.
    pub fn from_raw(coord: ChunkCoord, mut blocks: Vec<BlockId>, mut metadata: Vec<u8>) -> Self {
        blocks.resize(CHUNK_VOLUME, AIR);
        metadata.resize(CHUNK_VOLUME, 0);
        let mut chunk = Self {
            coord,
            blocks,
            metadata,
            layer_mask: vec![false; CHUNK_HEIGHT],
        };
        chunk.rebuild_layer_mask();
        chunk
    }

    fn rebuild_layer_mask(&mut self) {
        for y in 0..CHUNK_HEIGHT {
            self.layer_mask[y] = self.scan_layer(y);
        }
    }

    #[inline]
    fn scan_layer(&self, y: usize) -> bool {
        let start = voxel_index(0, y, 0);
        self.blocks[start..start + CHUNK_SIZE * CHUNK_SIZE].iter().any(|&b| b != AIR)
    }

    #[inline]
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockId {
        if !in_chunk_bounds(x, y, z) {
            return AIR;
        }
        self.blocks[voxel_index(x as usize, y as usize, z as usize)]
    }

    #[inline]
    pub fn get_metadata(&self, x: i32, y: i32, z: i32) -> u8 {
        if !in_chunk_bounds(x, y, z) {
            return 0;
        }
        self.metadata[voxel_index(x as usize, y as usize, z as usize)]
    }

    /// Writes a block and its metadata. Returns false when out of range or unchanged.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, id: BlockId, meta: u8) -> bool {
        if !in_chunk_bounds(x, y, z) {
            return false;
        }
        let (yu, i) = (y as usize, voxel_index(x as usize, y as usize, z as usize));
        if self.blocks[i] == id && self.metadata[i] == meta {
            return false;
        }
        let was_air = self.blocks[i] == AIR;
        self.blocks[i] = id;
        self.metadata[i] = meta;
        if id != AIR {
            self.layer_mask[yu] = true;
        } else if !was_air {
            self.layer_mask[yu] = self.scan_layer(yu);
        }
        true
    }

    pub fn set_metadata(&mut self, x: i32, y: i32, z: i32, meta: u8) -> bool {
        if !in_chunk_bounds(x, y, z) {
            return false;
        }
        let i = voxel_index(x as usize, y as usize, z as usize);
        if self.metadata[i] == meta {
            return false;
        }
        self.metadata[i] = meta;
        true
    }

    /// True when layer `y` has no non-air voxel. Layers outside the chunk are empty.
    #[inline]
    pub fn is_empty_layer(&self, y: i32) -> bool {
        if y < 0 || y as usize >= CHUNK_HEIGHT {
            return true;
        }
        !self.layer_mask[y as usize]
    }

    /// Highest non-empty layer, if any.
    pub fn top_layer(&self) -> Option<usize> {
        self.layer_mask.iter().rposition(|&occupied| occupied)
    }

    #[inline]
    pub fn is_all_air(&self) -> bool {
        !self.layer_mask.iter().any(|&occupied| occupied)
    }

    #[inline]
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    #[inline]
    pub fn metadata(&self) -> &[u8] {
        &self.metadata
    }

    #[inline]
    pub fn in_height(&self, wy: i32) -> bool {
        wy >= 0 && (wy as usize) < CHUNK_HEIGHT
    }

    /// Local (x, z) for world column (wx, wz) if it lies in this chunk.
    #[inline]
    pub fn world_to_local(&self, wx: i32, wz: i32) -> Option<(i32, i32)> {
        let (ox, oz) = self.coord.origin();
        let (lx, lz) = (wx - ox, wz - oz);
        let s = CHUNK_SIZE as i32;
        (lx >= 0 && lx < s && lz >= 0 && lz < s).then_some((lx, lz))
    }

    pub fn serialize(&self) -> RleChunk {
        RleChunk {
            blocks: rle_encode(&self.blocks),
            metadata: rle_encode(&self.metadata),
        }
    }

    /// Decodes a persisted chunk. Corrupt streams are clipped or padded; see [`DecodeReport`].
    pub fn deserialize(coord: ChunkCoord, rle: &RleChunk) -> (Self, DecodeReport) {
        let mut blocks = vec![AIR; CHUNK_VOLUME];
        let mut metadata = vec![0u8; CHUNK_VOLUME];
        let mut report = rle_decode(&rle.blocks, &mut blocks);
        report.merge(rle_decode(&rle.metadata, &mut metadata));
        (Self::from_raw(coord, blocks, metadata), report)
    }
}
