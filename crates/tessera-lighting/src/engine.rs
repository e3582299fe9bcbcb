use std::collections::VecDeque;
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use tessera_blocks::{BlockId, BlockRegistry, MAX_LIGHT};
use tessera_chunk::{CHUNK_HEIGHT, CHUNK_SIZE, ChunkCoord, ChunkKey, VoxelChunk, in_chunk_bounds};

use crate::{LightMap, TouchedChunks};

// Face order: 0=+Y,1=-Y,2=+X,3=-X,4=+Z,5=-Z (matches the mesher)
pub(crate) const FACE_DIRS: [(i32, i32, i32); 6] = [(0, 1, 0), (0, -1, 0), (1, 0, 0), (-1, 0, 0), (0, 0, 1), (0, 0, -1)];

/// Owns every loaded chunk's `LightMap` and the scratch queues used to update them.
pub struct LightingEngine {
    pub(crate) reg: Arc<BlockRegistry>,
    pub(crate) maps: HashMap<ChunkKey, LightMap>,
    fully_lit: HashSet<ChunkKey>,
    pub(crate) queue: VecDeque<(i32, i32, i32, u8)>,
    pub(crate) removal: VecDeque<(i32, i32, i32, u8)>,
    pub(crate) cleared: Vec<(i32, i32, i32)>,
}

impl LightingEngine {
    pub fn new(reg: Arc<BlockRegistry>) -> Self {
        Self {
            reg,
            maps: HashMap::new(),
            fully_lit: HashSet::new(),
            queue: VecDeque::with_capacity(4096),
            removal: VecDeque::with_capacity(1024),
            cleared: Vec::new(),
        }
    }

    #[inline]
    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.reg
    }

    /// Sunlight lost entering `id` from above. Plain transparent blocks pass sky unchanged.
    #[inline]
    pub(crate) fn sky_entry_decay(&self, id: BlockId) -> u8 {
        let d = self.reg.light_decay(id);
        if d > 1 { d } else { 0 }
    }

    /// Rebuilds `chunk`'s light from scratch: column sky and emitters, then edge
    /// values absorbed from lit neighbors, then a flood confined to the chunk.
    ///
    /// Returns whether the chunk is now fully lit (all four neighbors have maps).
    pub fn compute_lighting(&mut self, chunk: &VoxelChunk) -> bool {
        let reg = Arc::clone(&self.reg);
        let coord = chunk.coord;
        let (s, h) = (CHUNK_SIZE as i32, CHUNK_HEIGHT as i32);
        let mut map = LightMap::new();
        let mut q = std::mem::take(&mut self.queue);
        q.clear();

        for x in 0..s { for z in 0..s {
            let mut sun = MAX_LIGHT;
            for y in (0..h).rev() {
                let id = chunk.get_block(x, y, z);
                if reg.is_opaque(id) { sun = 0; continue; }
                sun = sun.saturating_sub(self.sky_entry_decay(id));
                let v = sun.max(reg.emission(id));
                if v > 0 { map.set(x, y, z, v); q.push_back((x, y, z, v)); }
            }
        }}

        // (dx, dz, our edge, their edge) per cardinal neighbor
        for (dx, dz) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            let Some(nmap) = self.maps.get(&coord.offset(dx, dz).key()) else { continue };
            let (ours, theirs) = if dx + dz < 0 { (0, s - 1) } else { (s - 1, 0) };
            for y in 0..h { for i in 0..s {
                let (x, z, nx, nz) = if dx != 0 { (ours, i, theirs, i) } else { (i, ours, i, theirs) };
                let nv = nmap.get(nx, y, nz);
                if nv <= 1 { continue; }
                let id = chunk.get_block(x, y, z);
                if reg.is_opaque(id) { continue; }
                let v = nv.saturating_sub(reg.light_decay(id));
                if v > map.get(x, y, z) { map.set(x, y, z, v); q.push_back((x, y, z, v)); }
            }}
        }

        while let Some((x, y, z, level)) = q.pop_front() {
            if level <= 1 || map.get(x, y, z) != level { continue; }
            for (dx, dy, dz) in FACE_DIRS {
                let (nx, ny, nz) = (x + dx, y + dy, z + dz);
                if !in_chunk_bounds(nx, ny, nz) { continue; }
                let id = chunk.get_block(nx, ny, nz);
                if reg.is_opaque(id) { continue; }
                let v = level.saturating_sub(reg.light_decay(id));
                if v > map.get(nx, ny, nz) { map.set(nx, ny, nz, v); q.push_back((nx, ny, nz, v)); }
            }
        }
        self.queue = q;

        let key = coord.key();
        self.maps.insert(key, map);
        let lit = coord.cardinal_neighbors().iter().all(|n| self.maps.contains_key(&n.key()));
        if lit { self.fully_lit.insert(key); } else { self.fully_lit.remove(&key); }
        log::trace!(target: "lighting", "computed ({},{}) fully_lit={}", coord.cx, coord.cz, lit);
        lit
    }

    #[inline]
    pub fn has_map(&self, coord: ChunkCoord) -> bool {
        self.maps.contains_key(&coord.key())
    }

    #[inline]
    pub fn is_fully_lit(&self, coord: ChunkCoord) -> bool {
        self.fully_lit.contains(&coord.key())
    }

    #[inline]
    pub fn light_map(&self, coord: ChunkCoord) -> Option<&LightMap> {
        self.maps.get(&coord.key())
    }

    pub fn map_count(&self) -> usize {
        self.maps.len()
    }

    /// Keeps the map but clears the fully-lit flag so the caller relights it.
    pub fn invalidate(&mut self, coord: ChunkCoord) {
        self.fully_lit.remove(&coord.key());
    }

    /// Drops a chunk's map on eviction. Returns the neighbors that still have maps;
    /// their borders were derived from this chunk and are no longer fully lit.
    pub fn drop_chunk(&mut self, coord: ChunkCoord) -> Vec<ChunkCoord> {
        let key = coord.key();
        self.maps.remove(&key);
        self.fully_lit.remove(&key);
        let mut affected = Vec::new();
        for n in coord.cardinal_neighbors() {
            if self.maps.contains_key(&n.key()) {
                self.fully_lit.remove(&n.key());
                affected.push(n);
            }
        }
        affected
    }

    /// Light at a world voxel: 15 above the world, 0 below it or in unlit chunks.
    pub fn light_at(&self, wx: i32, wy: i32, wz: i32) -> u8 {
        if wy >= CHUNK_HEIGHT as i32 {
            return MAX_LIGHT;
        }
        self.map_light(wx, wy, wz).unwrap_or(0)
    }

    /// Stored light, or `None` when `wy` is outside the world or the chunk has no map.
    #[inline]
    pub(crate) fn map_light(&self, wx: i32, wy: i32, wz: i32) -> Option<u8> {
        if wy < 0 || wy >= CHUNK_HEIGHT as i32 {
            return None;
        }
        let coord = ChunkCoord::containing(wx, wz);
        let map = self.maps.get(&coord.key())?;
        let (ox, oz) = coord.origin();
        Some(map.get(wx - ox, wy, wz - oz))
    }

    #[inline]
    pub(crate) fn set_world(&mut self, wx: i32, wy: i32, wz: i32, level: u8, touched: &mut TouchedChunks) {
        let coord = ChunkCoord::containing(wx, wz);
        let key = coord.key();
        if let Some(map) = self.maps.get_mut(&key) {
            let (ox, oz) = coord.origin();
            map.set(wx - ox, wy, wz - oz, level);
            touched.insert(key);
        }
    }
}
