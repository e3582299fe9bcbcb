use std::sync::Arc;
use std::time::Instant;

use proptest::prelude::*;
use tessera_blocks::{AIR, BlockId, BlockRegistry};
use tessera_chunk::{CHUNK_SIZE, CHUNK_VOLUME, ChunkCoord, voxel_index};
use tessera_liquid::mass_from_meta;
use tessera_mesh_cpu::FaceGroup;
use tessera_runtime::{
    ChunkStore, GenRequest, GeneratedChunk, MemoryPersistence, StoreConfig, SyncGenerator,
};

const STONE: BlockId = 1;
const WATER: BlockId = 7;
const GROUND: usize = 60;
const HOME: [f32; 3] = [8.0, 70.0, 8.0];

fn flat(req: GenRequest) -> Result<GeneratedChunk, String> {
    let mut blocks = vec![AIR; CHUNK_VOLUME];
    for y in 0..GROUND { for x in 0..CHUNK_SIZE { for z in 0..CHUNK_SIZE {
        blocks[voxel_index(x, y, z)] = STONE;
    }}}
    Ok(GeneratedChunk {
        coord: req.coord,
        blocks,
        metadata: vec![0; CHUNK_VOLUME],
        biome_map: vec![0; CHUNK_SIZE * CHUNK_SIZE],
    })
}

fn store_with(
    radius: i32,
    generator: impl Fn(GenRequest) -> Result<GeneratedChunk, String> + Send + Sync + 'static,
) -> ChunkStore {
    let config = StoreConfig { view_radius: radius, ..StoreConfig::default() };
    ChunkStore::new(
        Arc::new(BlockRegistry::builtin()),
        config,
        Box::new(SyncGenerator::new(generator)),
        Box::new(MemoryPersistence::new()),
    )
}

/// Radius-1 store around the origin chunk, generated and fully lit.
fn loaded() -> ChunkStore {
    let mut s = store_with(1, flat);
    s.update(HOME);
    s.update(HOME);
    s.flush_lighting();
    s
}

#[test]
fn streams_a_ring_around_the_viewer() {
    let mut s = store_with(1, flat);
    let first = s.update(HOME);
    assert!(first.changed);
    assert_eq!(first.requested, 9);
    assert!(first.loaded.is_empty());
    assert_eq!(s.pending_count(), 9);

    let second = s.update(HOME);
    assert!(!second.changed);
    assert_eq!(second.loaded.len(), 9);
    assert_eq!(s.loaded_count(), 9);
    assert_eq!(s.pending_count(), 0);
    assert_eq!(second.loaded[0], ChunkCoord::new(0, 0));
}

#[test]
fn reads_and_writes_are_lenient() {
    let mut s = loaded();
    assert_eq!(s.get_block(8, -1, 8), AIR);
    assert_eq!(s.get_block(8, 59, 8), STONE);
    assert_eq!(s.get_block(1000, 10, 1000), AIR);
    assert_eq!(s.get_metadata(1000, 10, 1000), 0);
    assert!(!s.set_block(8, 128, 8, STONE, 0));
    assert!(!s.set_block(8, -1, 8, STONE, 0));
    assert!(!s.set_block(1000, 70, 1000, STONE, 0));
    assert!(!s.set_block(8, 59, 8, STONE, 0));
}

#[test]
fn boundary_edit_marks_neighbor_for_remesh() {
    let mut s = loaded();
    s.build_dirty_meshes();
    assert_eq!(s.mesh_dirty_count(), 0);
    let before = s.snapshot(ChunkCoord::new(1, 0)).unwrap().version;

    assert!(s.set_block(15, 70, 5, STONE, 0));
    assert!(s.is_mesh_dirty(ChunkCoord::new(0, 0)));
    assert!(s.is_mesh_dirty(ChunkCoord::new(1, 0)));
    assert!(!s.is_mesh_dirty(ChunkCoord::new(-1, 0)));
    assert!(!s.is_mesh_dirty(ChunkCoord::new(0, 1)));
    assert!(s.snapshot(ChunkCoord::new(1, 0)).unwrap().version > before);

    // the column under the new block lost direct sky
    assert_eq!(s.light_at(15, 69, 5), 14);
    let snap = s.snapshot(ChunkCoord::new(0, 0)).unwrap();
    assert_eq!(snap.chunk.get_block(15, 70, 5), STONE);
    assert_eq!(snap.light.as_ref().unwrap().get(15, 69, 5), 14);

    let changes = s.poll_changes(Instant::now()).unwrap();
    assert!(changes.immediate);
    assert!(changes.chunks.contains(&ChunkCoord::new(1, 0)));
}

#[test]
fn batch_defers_snapshots_until_commit() {
    let mut s = loaded();
    let v0 = s.snapshot(ChunkCoord::new(0, 0)).unwrap().version;
    s.start_batch();
    assert!(s.set_block(3, 70, 3, STONE, 0));
    assert!(s.set_block(4, 70, 3, STONE, 0));
    assert_eq!(s.get_block(3, 70, 3), STONE);
    assert_eq!(s.snapshot(ChunkCoord::new(0, 0)).unwrap().chunk.get_block(3, 70, 3), AIR);
    assert_eq!(s.pending_lighting(), 1);

    assert!(s.commit_batch());
    let snap = s.snapshot(ChunkCoord::new(0, 0)).unwrap();
    assert_eq!(snap.chunk.get_block(3, 70, 3), STONE);
    assert!(snap.version > v0);
    assert_eq!(s.pending_lighting(), 0);
    assert!(s.light_at(3, 69, 3) < 15);
    assert!(!s.commit_batch());
}

#[test]
fn lighting_cost_is_spread_over_commits() {
    let mut s = loaded();
    s.start_batch();
    for wx in [-8, 8, 24] {
        assert!(s.set_block(wx, 70, 8, STONE, 0));
    }
    assert!(s.commit_batch());
    assert_eq!(s.pending_lighting(), 2);
    s.start_batch();
    assert!(s.commit_batch());
    assert_eq!(s.pending_lighting(), 1);
    s.flush_lighting();
    assert_eq!(s.pending_lighting(), 0);
    assert_eq!(s.light_at(24, 69, 8), 14);
}

#[test]
fn eviction_persists_only_modified_chunks() {
    let mut s = loaded();
    assert!(s.set_block(2, 70, 2, STONE, 0));

    let away = s.update([10.0 * 16.0 + 8.0, 70.0, 8.0]);
    assert!(away.evicted.contains(&ChunkCoord::new(0, 0)));
    assert!(!s.is_loaded(ChunkCoord::new(0, 0)));
    assert!(s.persistence().contains(ChunkCoord::new(0, 0)));
    assert!(!s.persistence().contains(ChunkCoord::new(1, 1)));

    let back = s.update(HOME);
    assert!(back.loaded.contains(&ChunkCoord::new(0, 0)));
    assert_eq!(s.get_block(2, 70, 2), STONE);
    assert!(s.is_pending(ChunkCoord::new(1, 1)));
}

#[test]
fn failed_generation_is_not_left_pending() {
    let mut s = store_with(1, |req: GenRequest| {
        if req.coord == ChunkCoord::new(1, 0) { Err("boom".into()) } else { flat(req) }
    });
    s.update(HOME);
    let u = s.update(HOME);
    assert_eq!(u.failed, vec![ChunkCoord::new(1, 0)]);
    assert!(!s.is_pending(ChunkCoord::new(1, 0)));
    assert!(!s.is_loaded(ChunkCoord::new(1, 0)));
    assert_eq!(s.loaded_count(), 8);
}

#[test]
fn liquid_tick_spreads_water_and_commits() {
    let mut s = loaded();
    assert!(s.set_block(5, GROUND as i32, 5, WATER, 0));
    assert!(!s.liquid().is_idle());
    let report = s.tick();
    assert!(report.liquid.processed >= 1);
    assert!(report.committed);
    assert_eq!(s.get_block(5, GROUND as i32, 5), WATER);
    assert_eq!(s.get_block(6, GROUND as i32, 5), WATER);

    let mut total = 0u32;
    for x in -16..32 { for z in -16..32 { for y in GROUND as i32 - 1..GROUND as i32 + 3 {
        if s.get_block(x, y, z) == WATER {
            total += mass_from_meta(s.get_metadata(x, y, z)) as u32;
        }
    }}}
    assert_eq!(total, 255);
    let snap = s.snapshot(ChunkCoord::new(0, 0)).unwrap();
    assert_eq!(snap.chunk.get_block(6, GROUND as i32, 5), WATER);
}

#[test]
fn dirty_meshes_build_from_snapshots() {
    let mut s = loaded();
    assert_eq!(s.mesh_dirty_count(), 9);
    let meshes = s.build_dirty_meshes();
    assert_eq!(meshes.len(), 9);
    assert_eq!(s.mesh_dirty_count(), 0);
    let center = meshes.iter().find(|m| m.coord == ChunkCoord::new(0, 0)).unwrap();
    // only the ground's top faces: sides face loaded stone or unloaded space
    assert_eq!(center.quad_count(), CHUNK_SIZE * CHUNK_SIZE);
    assert_eq!(center.part(STONE, FaceGroup::Top).unwrap().quad_count(), CHUNK_SIZE * CHUNK_SIZE);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn writes_read_back(edits in prop::collection::vec((-16i32..32, 0i32..128, -16i32..32, 0u8..13), 1..24)) {
        let mut s = loaded();
        for (x, y, z, id) in edits {
            let before = s.get_block(x, y, z);
            let wrote = s.set_block(x, y, z, id, 0);
            prop_assert_eq!(wrote, before != id);
            prop_assert_eq!(s.get_block(x, y, z), id);
        }
    }
}
