use std::sync::Arc;
use std::time::{Duration, Instant};

use hashbrown::{HashMap, HashSet};
use rayon::prelude::*;
use tessera_blocks::{AIR, BlockId, BlockRegistry};
use tessera_chunk::{BlockAccess, BlockPos, CHUNK_HEIGHT, CHUNK_SIZE, CHUNK_VOLUME, ChunkCoord, ChunkKey, VoxelChunk};
use tessera_lighting::LightingEngine;
use tessera_liquid::{LiquidSimulator, LiquidTickReport};
use tessera_mesh_cpu::{ChunkMesh, MeshBuilder};

use crate::batcher::MutationBatcher;
use crate::config::StoreConfig;
use crate::generator::{ChunkGenerator, GenOutcome, GenRequest, GeneratedChunk};
use crate::notifier::{ChangeNotifier, ChangeSet};
use crate::persistence::{ChunkPersistence, PersistedChunk};
use crate::snapshot::{ChunkSnapshot, SnapshotNeighbors};
use crate::world::{ChunkMap, LiquidEdits};

/// What one `update` call did to the loaded set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreUpdate {
    /// The viewer entered a different chunk.
    pub changed: bool,
    pub loaded: Vec<ChunkCoord>,
    pub evicted: Vec<ChunkCoord>,
    pub failed: Vec<ChunkCoord>,
    pub requested: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub liquid: LiquidTickReport,
    /// The tick's batch committed a visible change.
    pub committed: bool,
}

/// Owns every loaded chunk and funnels all reads, writes, lighting, liquid,
/// loading and eviction through one place.
pub struct ChunkStore {
    reg: Arc<BlockRegistry>,
    config: StoreConfig,
    chunks: ChunkMap,
    lighting: LightingEngine,
    liquid: LiquidSimulator,
    batcher: MutationBatcher,
    generator: Box<dyn ChunkGenerator>,
    persistence: Box<dyn ChunkPersistence>,
    pending: HashSet<ChunkCoord>,
    modified: HashSet<ChunkCoord>,
    center: Option<ChunkCoord>,
    snapshots: HashMap<ChunkKey, Arc<ChunkSnapshot>>,
    version: u64,
    mesh_dirty: HashSet<ChunkCoord>,
    notifier: ChangeNotifier,
    mesher: MeshBuilder,
}

impl ChunkStore {
    pub fn new(
        reg: Arc<BlockRegistry>,
        config: StoreConfig,
        generator: Box<dyn ChunkGenerator>,
        persistence: Box<dyn ChunkPersistence>,
    ) -> Self {
        Self {
            lighting: LightingEngine::new(Arc::clone(&reg)),
            liquid: LiquidSimulator::new(Arc::clone(&reg), config.liquid.clone()),
            batcher: MutationBatcher::new(config.lighting_per_commit),
            notifier: ChangeNotifier::new(Duration::from_millis(config.debounce_ms)),
            mesher: MeshBuilder::new(Arc::clone(&reg)),
            reg,
            config,
            chunks: ChunkMap::new(),
            generator,
            persistence,
            pending: HashSet::new(),
            modified: HashSet::new(),
            center: None,
            snapshots: HashMap::new(),
            version: 0,
            mesh_dirty: HashSet::new(),
        }
    }

    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.reg
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn chunks(&self) -> &ChunkMap {
        &self.chunks
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&VoxelChunk> {
        self.chunks.get(coord)
    }

    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains(coord)
    }

    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_pending(&self, coord: ChunkCoord) -> bool {
        self.pending.contains(&coord)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn center(&self) -> Option<ChunkCoord> {
        self.center
    }

    pub fn lighting(&self) -> &LightingEngine {
        &self.lighting
    }

    pub fn liquid(&self) -> &LiquidSimulator {
        &self.liquid
    }

    pub fn persistence(&self) -> &dyn ChunkPersistence {
        self.persistence.as_ref()
    }

    /// Chunks still waiting for a full relight.
    pub fn pending_lighting(&self) -> usize {
        self.batcher.pending_lighting()
    }

    pub fn light_at(&self, wx: i32, wy: i32, wz: i32) -> u8 {
        self.lighting.light_at(wx, wy, wz)
    }

    // ---- streaming ----

    /// Installs finished generator output, then, if the viewer moved to a new
    /// chunk, evicts everything beyond the view radius and requests or restores
    /// everything inside it, nearest rings first.
    pub fn update(&mut self, viewer: [f32; 3]) -> StoreUpdate {
        let mut out = StoreUpdate::default();
        self.drain_generator(&mut out);

        let target = ChunkCoord::containing(viewer[0].floor() as i32, viewer[2].floor() as i32);
        if self.center == Some(target) {
            return out;
        }
        self.center = Some(target);
        out.changed = true;
        let r = self.config.view_radius.max(0);

        let mut gone: Vec<ChunkCoord> = self.chunks.coords().filter(|c| c.chebyshev(target) > r).collect();
        gone.sort();
        for coord in gone {
            self.evict(coord);
            out.evicted.push(coord);
        }
        self.pending.retain(|c| c.chebyshev(target) <= r);

        for ring in 0..=r {
            for dx in -ring..=ring { for dz in -ring..=ring {
                if dx.abs().max(dz.abs()) != ring { continue; }
                let coord = target.offset(dx, dz);
                if self.chunks.contains(coord) || self.pending.contains(&coord) { continue; }
                if let Some(record) = self.persistence.load(coord) {
                    if self.restore(coord, &record) {
                        out.loaded.push(coord);
                        continue;
                    }
                }
                self.pending.insert(coord);
                self.generator.request(GenRequest { coord, seed: self.config.seed, priority: ring as u32 });
                out.requested += 1;
            }}
        }
        log::debug!(
            target: "store",
            "center ({},{}): loaded={} evicted={} requested={}",
            target.cx, target.cz, out.loaded.len(), out.evicted.len(), out.requested
        );
        out
    }

    fn drain_generator(&mut self, out: &mut StoreUpdate) {
        for outcome in self.generator.drain() {
            match outcome {
                GenOutcome::Ready(generated) => {
                    let coord = generated.coord;
                    if !self.pending.remove(&coord) {
                        log::trace!(target: "gen", "discarding unwanted chunk ({},{})", coord.cx, coord.cz);
                        continue;
                    }
                    self.install(Self::chunk_from_generated(generated));
                    out.loaded.push(coord);
                }
                GenOutcome::Failed { coord, reason } => {
                    log::warn!(target: "gen", "generation failed for ({},{}): {}", coord.cx, coord.cz, reason);
                    self.pending.remove(&coord);
                    out.failed.push(coord);
                }
            }
        }
    }

    fn chunk_from_generated(generated: GeneratedChunk) -> VoxelChunk {
        let GeneratedChunk { coord, blocks, metadata, .. } = generated;
        if blocks.len() != CHUNK_VOLUME || metadata.len() != CHUNK_VOLUME {
            log::warn!(
                target: "gen",
                "chunk ({},{}) has {} blocks / {} metadata, expected {}",
                coord.cx, coord.cz, blocks.len(), metadata.len(), CHUNK_VOLUME
            );
        }
        VoxelChunk::from_raw(coord, blocks, metadata)
    }

    fn restore(&mut self, coord: ChunkCoord, record: &PersistedChunk) -> bool {
        let Some((chunk, report)) = record.restore() else {
            log::warn!(target: "store", "persisted record {:?} has a malformed key", record.key);
            return false;
        };
        if !report.is_clean() {
            log::warn!(target: "store", "persisted chunk {} decoded with damage: {:?}", record.key, report);
        }
        if chunk.coord != coord {
            log::warn!(target: "store", "persisted record {} stored under ({},{})", record.key, coord.cx, coord.cz);
            return false;
        }
        self.install(chunk);
        true
    }

    fn install(&mut self, chunk: VoxelChunk) {
        let coord = chunk.coord;
        self.chunks.insert(chunk);
        self.batcher.mark_lighting_dirty(coord);
        self.mesh_dirty.insert(coord);
        for n in coord.cardinal_neighbors() {
            if self.chunks.contains(n) {
                // their border light and border faces can now see this chunk
                self.lighting.invalidate(n);
                self.batcher.mark_lighting_dirty(n);
                self.mesh_dirty.insert(n);
            }
        }
        self.publish(coord);
        log::debug!(target: "store", "loaded ({},{})", coord.cx, coord.cz);
    }

    fn evict(&mut self, coord: ChunkCoord) {
        let Some(chunk) = self.chunks.remove(coord) else { return };
        if self.modified.remove(&coord) {
            self.persistence.save(PersistedChunk::from_chunk(&chunk));
        }
        for n in self.lighting.drop_chunk(coord) {
            self.batcher.mark_lighting_dirty(n);
        }
        for n in coord.cardinal_neighbors() {
            if self.chunks.contains(n) {
                self.mesh_dirty.insert(n);
            }
        }
        self.batcher.forget(coord);
        self.snapshots.remove(&coord.key());
        self.mesh_dirty.remove(&coord);
        self.liquid.forget_where(|p| p.chunk() == coord);
        log::debug!(target: "store", "evicted ({},{})", coord.cx, coord.cz);
    }

    // ---- reads and writes ----

    /// Air outside the world height or in chunks that are not loaded.
    pub fn get_block(&self, wx: i32, wy: i32, wz: i32) -> BlockId {
        self.chunks.block_at(wx, wy, wz).unwrap_or(AIR)
    }

    pub fn get_metadata(&self, wx: i32, wy: i32, wz: i32) -> u8 {
        self.chunks.metadata_at(wx, wy, wz).unwrap_or(0)
    }

    /// Writes one voxel. Returns false for writes outside the world height,
    /// into unloaded chunks, or that change nothing.
    ///
    /// Outside a batch the edit is relit incrementally, snapshotted and
    /// announced right away. Inside one, that work waits for `commit_batch`.
    pub fn set_block(&mut self, wx: i32, wy: i32, wz: i32, id: BlockId, meta: u8) -> bool {
        if wy < 0 || wy >= CHUNK_HEIGHT as i32 {
            return false;
        }
        let pos = BlockPos::new(wx, wy, wz);
        let coord = pos.chunk();
        let Some(chunk) = self.chunks.get_mut(coord) else { return false };
        let (lx, lz) = pos.local_xz();
        let old = chunk.get_block(lx as i32, wy, lz as i32);
        if !chunk.set_block(lx as i32, wy, lz as i32, id, meta) {
            return false;
        }
        self.modified.insert(coord);
        self.wake_liquid_near(pos, old, id);

        let mut affected: Vec<ChunkCoord> = vec![coord];
        affected.extend(self.boundary_neighbors(pos));
        let light_changed = self.reg.light_relevant_change(old, id);

        if self.batcher.is_open() {
            for c in affected {
                self.batcher.mark_modified(c);
            }
            if light_changed {
                self.batcher.mark_lighting_dirty(coord);
            }
            return true;
        }

        let mut set: HashSet<ChunkCoord> = affected.into_iter().collect();
        if light_changed {
            if self.lighting.has_map(coord) {
                let touched = self.lighting.on_block_placed(&self.chunks, pos, old, id);
                set.extend(touched.into_iter().map(ChunkCoord::from));
            } else {
                self.batcher.mark_lighting_dirty(coord);
            }
        }
        let mut changed: Vec<ChunkCoord> = set.into_iter().filter(|c| self.chunks.contains(*c)).collect();
        changed.sort();
        for c in &changed {
            self.mesh_dirty.insert(*c);
            self.publish(*c);
        }
        self.notifier.notify_immediate(changed, Instant::now());
        true
    }

    /// Loaded chunks sharing a face with the voxel at `pos`.
    fn boundary_neighbors(&self, pos: BlockPos) -> Vec<ChunkCoord> {
        let coord = pos.chunk();
        let (lx, lz) = pos.local_xz();
        let last = CHUNK_SIZE - 1;
        let mut out = Vec::new();
        if lx == 0 { out.push(coord.offset(-1, 0)); }
        if lx == last { out.push(coord.offset(1, 0)); }
        if lz == 0 { out.push(coord.offset(0, -1)); }
        if lz == last { out.push(coord.offset(0, 1)); }
        out.retain(|c| self.chunks.contains(*c));
        out
    }

    fn wake_liquid_near(&mut self, pos: BlockPos, old: BlockId, new: BlockId) {
        let near = self.reg.is_liquid(old)
            || self.reg.is_liquid(new)
            || pos.face_neighbors().iter().any(|n| self.chunks.block_at(n.x, n.y, n.z).is_some_and(|b| self.reg.is_liquid(b)));
        if near {
            self.liquid.wake_around(pos);
        }
    }

    // ---- batching ----

    pub fn start_batch(&mut self) {
        self.batcher.start_batch();
    }

    pub fn is_batch_open(&self) -> bool {
        self.batcher.is_open()
    }

    /// Relights up to `lighting_per_commit` dirty chunks (and their loaded
    /// neighbors), snapshots everything the batch touched, and queues a
    /// debounced notification. Returns whether anything changed.
    pub fn commit_batch(&mut self) -> bool {
        let plan = self.batcher.take_commit();
        let mut set: HashSet<ChunkCoord> = plan.modified.into_iter().collect();
        for coord in plan.relight {
            set.extend(self.relight_with_neighbors(coord));
        }
        let mut changed: Vec<ChunkCoord> = set.into_iter().filter(|c| self.chunks.contains(*c)).collect();
        if changed.is_empty() {
            return false;
        }
        changed.sort();
        for c in &changed {
            self.mesh_dirty.insert(*c);
            self.publish(*c);
        }
        log::trace!(target: "lighting", "commit: {} chunks, {} awaiting relight", changed.len(), self.batcher.pending_lighting());
        self.notifier.notify(changed, Instant::now());
        true
    }

    fn relight_with_neighbors(&mut self, coord: ChunkCoord) -> Vec<ChunkCoord> {
        let mut out = Vec::with_capacity(5);
        let Some(chunk) = self.chunks.get(coord) else { return out };
        self.lighting.compute_lighting(chunk);
        out.push(coord);
        for n in coord.cardinal_neighbors() {
            if let Some(nc) = self.chunks.get(n) {
                self.lighting.compute_lighting(nc);
                out.push(n);
            }
        }
        out
    }

    /// Commits until no chunk is waiting for light. Returns the commits made.
    pub fn flush_lighting(&mut self) -> usize {
        let mut commits = 0;
        while self.batcher.pending_lighting() > 0 {
            self.commit_batch();
            commits += 1;
        }
        commits
    }

    /// One simulation step: a liquid tick whose writes form a batch, then a
    /// commit (unless the caller already holds a batch open).
    pub fn tick(&mut self) -> TickReport {
        let own_batch = !self.batcher.is_open();
        if own_batch {
            self.batcher.start_batch();
        }
        let mut view = LiquidEdits::new(&mut self.chunks);
        let liquid = self.liquid.update(&mut view);
        let edits = std::mem::take(&mut view.edits);
        for (pos, old, new) in edits {
            let coord = pos.chunk();
            self.modified.insert(coord);
            self.batcher.mark_modified(coord);
            for n in self.boundary_neighbors(pos) {
                self.batcher.mark_modified(n);
            }
            if self.reg.light_relevant_change(old, new) {
                self.batcher.mark_lighting_dirty(coord);
            }
        }
        let committed = own_batch && self.commit_batch();
        TickReport { liquid, committed }
    }

    // ---- readers ----

    fn publish(&mut self, coord: ChunkCoord) {
        let Some(chunk) = self.chunks.get(coord) else { return };
        self.version += 1;
        let snap = ChunkSnapshot {
            chunk: chunk.clone(),
            light: self.lighting.light_map(coord).cloned(),
            version: self.version,
        };
        self.snapshots.insert(coord.key(), Arc::new(snap));
    }

    /// Last published state of a chunk. Unaffected by writes in an open batch.
    pub fn snapshot(&self, coord: ChunkCoord) -> Option<Arc<ChunkSnapshot>> {
        self.snapshots.get(&coord.key()).cloned()
    }

    pub fn is_mesh_dirty(&self, coord: ChunkCoord) -> bool {
        self.mesh_dirty.contains(&coord)
    }

    pub fn mesh_dirty_count(&self) -> usize {
        self.mesh_dirty.len()
    }

    /// Meshes one chunk from snapshots and clears its dirty flag.
    pub fn build_mesh(&mut self, coord: ChunkCoord) -> Option<ChunkMesh> {
        self.mesh_dirty.remove(&coord);
        let snap = self.snapshots.get(&coord.key())?;
        let neighbors = SnapshotNeighbors::new(&self.snapshots);
        Some(self.mesher.build(&snap.chunk, snap.light.as_ref(), &neighbors))
    }

    /// Meshes every dirty chunk in parallel, sorted by coordinate.
    pub fn build_dirty_meshes(&mut self) -> Vec<ChunkMesh> {
        let mut coords: Vec<ChunkCoord> = self.mesh_dirty.drain().collect();
        coords.sort();
        let snapshots = &self.snapshots;
        let mesher = &self.mesher;
        coords
            .par_iter()
            .filter_map(|c| {
                let snap = snapshots.get(&c.key())?;
                let neighbors = SnapshotNeighbors::new(snapshots);
                Some(mesher.build(&snap.chunk, snap.light.as_ref(), &neighbors))
            })
            .collect()
    }

    pub fn poll_changes(&mut self, now: Instant) -> Option<ChangeSet> {
        self.notifier.poll(now)
    }
}
