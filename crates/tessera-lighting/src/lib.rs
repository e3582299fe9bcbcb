//! Per-chunk voxel light: full recompute with border absorption, and
//! incremental add/remove propagation across chunk seams.
#![forbid(unsafe_code)]

mod engine;
mod incremental;
mod lightmap;

pub use engine::LightingEngine;
pub use lightmap::LightMap;

/// Chunk keys whose light changed during an update.
pub type TouchedChunks = hashbrown::HashSet<tessera_chunk::ChunkKey>;
