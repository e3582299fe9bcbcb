use tessera_blocks::MAX_LIGHT;
use tessera_chunk::{CHUNK_HEIGHT, CHUNK_VOLUME, in_chunk_bounds, voxel_index};

/// Light levels (0..=15) parallel to a `VoxelChunk`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LightMap {
    levels: Vec<u8>,
}

impl Default for LightMap {
    fn default() -> Self {
        Self::new()
    }
}

impl LightMap {
    pub fn new() -> Self {
        Self { levels: vec![0; CHUNK_VOLUME] }
    }

    /// Above the world is open sky, below it is dark. Outside the chunk's columns reads 0.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> u8 {
        if y >= CHUNK_HEIGHT as i32 {
            return MAX_LIGHT;
        }
        if !in_chunk_bounds(x, y, z) {
            return 0;
        }
        self.levels[voxel_index(x as usize, y as usize, z as usize)]
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, z: i32, level: u8) {
        if !in_chunk_bounds(x, y, z) {
            return;
        }
        debug_assert!(level <= MAX_LIGHT, "light level {level} out of range");
        let level = if level > MAX_LIGHT {
            log::warn!(target: "lighting", "clamping light {} at ({},{},{})", level, x, y, z);
            MAX_LIGHT
        } else {
            level
        };
        self.levels[voxel_index(x as usize, y as usize, z as usize)] = level;
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.levels
    }

    pub fn max_level(&self) -> u8 {
        self.levels.iter().copied().max().unwrap_or(0)
    }
}
