//! Chunk voxel storage, chunk addressing, and the RLE chunk codec.
#![forbid(unsafe_code)]

mod access;
mod coord;
mod rle;
mod voxel;

pub use access::BlockAccess;
pub use coord::{BlockPos, ChunkCoord, ChunkKey};
pub use rle::{DecodeReport, RleChunk, rle_decode, rle_encode};
pub use voxel::VoxelChunk;

/// Chunk width and depth (S).
pub const CHUNK_SIZE: usize = 16;
/// Chunk height (H).
pub const CHUNK_HEIGHT: usize = 128;
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_HEIGHT;

/// Flat index inside a chunk: `y*S*S + x*S + z`.
#[inline]
pub const fn voxel_index(x: usize, y: usize, z: usize) -> usize {
    y * CHUNK_SIZE * CHUNK_SIZE + x * CHUNK_SIZE + z
}

#[inline]
pub fn in_chunk_bounds(x: i32, y: i32, z: i32) -> bool {
    x >= 0 && z >= 0 && y >= 0 && (x as usize) < CHUNK_SIZE && (z as usize) < CHUNK_SIZE && (y as usize) < CHUNK_HEIGHT
}
