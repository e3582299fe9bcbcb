use tessera_blocks::{BlockId, MAX_LIGHT};
use tessera_chunk::{BlockAccess, BlockPos, CHUNK_HEIGHT};

use crate::engine::FACE_DIRS;
use crate::{LightingEngine, TouchedChunks};

impl LightingEngine {
    /// Updates light after the block at `pos` changed from `old` to `new`.
    ///
    /// `world` must already hold `new` at `pos`. Returns every chunk whose light
    /// changed (always including `pos`'s chunk when anything was done).
    pub fn on_block_placed(&mut self, world: &impl BlockAccess, pos: BlockPos, old: BlockId, new: BlockId) -> TouchedChunks {
        let mut touched = TouchedChunks::new();
        if !self.reg.light_relevant_change(old, new) {
            return touched;
        }
        let Some(here) = self.map_light(pos.x, pos.y, pos.z) else {
            return touched;
        };
        touched.insert(pos.chunk().key());
        let (a, b) = (self.reg.get(old), self.reg.get(new));
        let (old_opaque, old_em, old_decay) = (a.opaque, a.emission, a.light_decay);
        let (new_opaque, new_em, new_decay) = (b.opaque, b.emission, b.light_decay);

        if new_opaque {
            if here > 0 {
                self.remove_and_refill(world, pos, here, &mut touched);
            }
            self.set_world(pos.x, pos.y, pos.z, 0, &mut touched);
        } else if old_opaque {
            self.relight_open_voxel(world, pos, &mut touched);
            if new_em > 0 {
                self.seed_and_flood(world, pos, new_em, &mut touched);
            }
        } else {
            if (new_em < old_em || new_decay > old_decay) && here > 0 {
                self.remove_and_refill(world, pos, here, &mut touched);
            }
            if new_decay < old_decay {
                self.relight_open_voxel(world, pos, &mut touched);
            }
            if new_em > 0 {
                self.seed_and_flood(world, pos, new_em, &mut touched);
            }
        }
        touched
    }

    /// Raises `pos` to `level` and floods outward. Only strict improvements spread.
    pub fn add_light_source(&mut self, world: &impl BlockAccess, pos: BlockPos, level: u8) -> TouchedChunks {
        let mut touched = TouchedChunks::new();
        self.seed_and_flood(world, pos, level.min(MAX_LIGHT), &mut touched);
        touched
    }

    /// Retracts the light a source at `pos` contributed, then refills from
    /// whatever independent light borders the cleared region.
    pub fn remove_light_source(&mut self, world: &impl BlockAccess, pos: BlockPos) -> TouchedChunks {
        let mut touched = TouchedChunks::new();
        if let Some(level) = self.map_light(pos.x, pos.y, pos.z).filter(|&l| l > 0) {
            self.remove_and_refill(world, pos, level, &mut touched);
        }
        touched
    }

    fn seed_and_flood(&mut self, world: &impl BlockAccess, pos: BlockPos, level: u8, touched: &mut TouchedChunks) {
        let Some(cur) = self.map_light(pos.x, pos.y, pos.z) else { return };
        if level <= cur {
            return;
        }
        self.queue.clear();
        self.set_world(pos.x, pos.y, pos.z, level, touched);
        self.queue.push_back((pos.x, pos.y, pos.z, level));
        self.flood(world, touched);
    }

    /// Two-phase removal. Phase A zeroes every voxel that could have been lit
    /// through `pos` (strictly dimmer, or equal and straight below) and
    /// collects brighter-or-equal voxels as independent sources. Phase B reseeds the
    /// cleared voxels' own sky/emission and floods from all collected sources.
    fn remove_and_refill(&mut self, world: &impl BlockAccess, pos: BlockPos, seed: u8, touched: &mut TouchedChunks) {
        self.queue.clear();
        self.removal.clear();
        self.cleared.clear();
        self.set_world(pos.x, pos.y, pos.z, 0, touched);
        self.removal.push_back((pos.x, pos.y, pos.z, seed));
        self.cleared.push((pos.x, pos.y, pos.z));

        while let Some((x, y, z, level)) = self.removal.pop_front() {
            for (dx, dy, dz) in FACE_DIRS {
                let (nx, ny, nz) = (x + dx, y + dy, z + dz);
                let Some(nl) = self.map_light(nx, ny, nz) else { continue };
                if nl == 0 { continue; }
                // sky passes straight down without loss, so equal light below is dependent
                if nl < level || (dy == -1 && nl == level) {
                    self.set_world(nx, ny, nz, 0, touched);
                    self.removal.push_back((nx, ny, nz, nl));
                    self.cleared.push((nx, ny, nz));
                } else {
                    self.queue.push_back((nx, ny, nz, nl));
                }
            }
        }

        let cleared = std::mem::take(&mut self.cleared);
        for &(x, y, z) in &cleared {
            let v = self.intrinsic_light(world, x, y, z);
            if v > 0 && Some(v) > self.map_light(x, y, z) {
                self.set_world(x, y, z, v, touched);
                self.queue.push_back((x, y, z, v));
            }
        }
        self.cleared = cleared;
        self.flood(world, touched);
    }

    /// Relights a voxel that just became more transparent: its own sky/emission or
    /// the best neighbor minus its decay, then sky walked straight down the column.
    fn relight_open_voxel(&mut self, world: &impl BlockAccess, pos: BlockPos, touched: &mut TouchedChunks) {
        let Some(cur) = self.map_light(pos.x, pos.y, pos.z) else { return };
        let Some(id) = world.block_at(pos.x, pos.y, pos.z) else { return };
        if self.reg.is_opaque(id) {
            return;
        }
        self.queue.clear();
        let decay = self.reg.light_decay(id);
        let sky = self.column_sky(world, pos.x, pos.y, pos.z);
        let mut best = sky.max(self.reg.emission(id));
        for (dx, dy, dz) in FACE_DIRS {
            let nl = if pos.y + dy >= CHUNK_HEIGHT as i32 {
                MAX_LIGHT
            } else {
                self.map_light(pos.x + dx, pos.y + dy, pos.z + dz).unwrap_or(0)
            };
            best = best.max(nl.saturating_sub(decay));
        }
        if best > cur {
            self.set_world(pos.x, pos.y, pos.z, best, touched);
            self.queue.push_back((pos.x, pos.y, pos.z, best));
        }

        if sky > 0 {
            let mut sun = sky;
            for y in (0..pos.y).rev() {
                let Some(below) = world.block_at(pos.x, y, pos.z) else { break };
                if self.reg.is_opaque(below) { break; }
                sun = sun.saturating_sub(self.sky_entry_decay(below));
                if sun == 0 { break; }
                let Some(stored) = self.map_light(pos.x, y, pos.z) else { break };
                // a brighter voxel here can still sit above darker ones, so keep walking
                if sun > stored {
                    self.set_world(pos.x, y, pos.z, sun, touched);
                    self.queue.push_back((pos.x, y, pos.z, sun));
                }
            }
        }
        self.flood(world, touched);
    }

    /// Sky reaching (wx, wy, wz) straight down its column, 0 if anything opaque is above.
    pub(crate) fn column_sky(&self, world: &impl BlockAccess, wx: i32, wy: i32, wz: i32) -> u8 {
        let mut sun = MAX_LIGHT;
        for y in (wy..CHUNK_HEIGHT as i32).rev() {
            let id = world.get_block(wx, y, wz);
            if self.reg.is_opaque(id) {
                return 0;
            }
            sun = sun.saturating_sub(self.sky_entry_decay(id));
        }
        sun
    }

    fn intrinsic_light(&self, world: &impl BlockAccess, wx: i32, wy: i32, wz: i32) -> u8 {
        let Some(id) = world.block_at(wx, wy, wz) else { return 0 };
        if self.reg.is_opaque(id) {
            return 0;
        }
        self.column_sky(world, wx, wy, wz).max(self.reg.emission(id))
    }

    /// Breadth-first spread of everything in `queue` across all chunks with maps.
    fn flood(&mut self, world: &impl BlockAccess, touched: &mut TouchedChunks) {
        while let Some((x, y, z, level)) = self.queue.pop_front() {
            if level <= 1 || self.map_light(x, y, z) != Some(level) { continue; }
            for (dx, dy, dz) in FACE_DIRS {
                let (nx, ny, nz) = (x + dx, y + dy, z + dz);
                let Some(cur) = self.map_light(nx, ny, nz) else { continue };
                let Some(id) = world.block_at(nx, ny, nz) else { continue };
                if self.reg.is_opaque(id) { continue; }
                let v = level.saturating_sub(self.reg.light_decay(id));
                if v > cur {
                    self.set_world(nx, ny, nz, v, touched);
                    self.queue.push_back((nx, ny, nz, v));
                }
            }
        }
    }
}
