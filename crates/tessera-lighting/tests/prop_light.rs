use std::sync::Arc;

use proptest::prelude::*;
use tessera_blocks::{BlockId, BlockRegistry};
use tessera_chunk::{BlockPos, CHUNK_HEIGHT, CHUNK_SIZE, ChunkCoord, VoxelChunk};
use tessera_lighting::LightingEngine;

fn base_chunk() -> VoxelChunk {
    let mut c = VoxelChunk::new(ChunkCoord::new(0, 0));
    for y in 0..60 { for x in 0..CHUNK_SIZE as i32 { for z in 0..CHUNK_SIZE as i32 {
        c.set_block(x, y, z, 1, 0);
    }}}
    for x in 3..13 { for z in 3..13 {
        c.set_block(x, 68, z, 1, 0);
    }}
    c
}

fn edit() -> impl Strategy<Value = ((i32, i32, i32), BlockId)> {
    // ids: air, stone, leaves, water, torch, glass
    let id = prop_oneof![Just(0u8), Just(1u8), Just(6u8), Just(7u8), Just(9u8), Just(10u8)];
    ((0..CHUNK_SIZE as i32, 56..72i32, 0..CHUNK_SIZE as i32), id)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    // after any edit sequence, incremental light equals a from-scratch recompute
    #[test]
    fn incremental_matches_full(edits in prop::collection::vec(edit(), 1..12)) {
        let reg = Arc::new(BlockRegistry::builtin());
        let mut chunk = base_chunk();
        let mut inc = LightingEngine::new(reg.clone());
        inc.compute_lighting(&chunk);
        for ((x, y, z), id) in edits {
            let old = chunk.get_block(x, y, z);
            chunk.set_block(x, y, z, id, 0);
            inc.on_block_placed(&chunk, BlockPos::new(x, y, z), old, id);
        }
        let mut fresh = LightingEngine::new(reg);
        fresh.compute_lighting(&chunk);
        let (a, b) = (inc.light_map(chunk.coord).unwrap(), fresh.light_map(chunk.coord).unwrap());
        prop_assert!(a.as_slice() == b.as_slice());
    }

    // light stays within 0..=15 and opaque voxels stay dark
    #[test]
    fn light_bounds_and_opaque_dark(edits in prop::collection::vec(edit(), 0..16)) {
        let reg = Arc::new(BlockRegistry::builtin());
        let mut chunk = base_chunk();
        for ((x, y, z), id) in edits {
            chunk.set_block(x, y, z, id, 0);
        }
        let mut e = LightingEngine::new(reg.clone());
        e.compute_lighting(&chunk);
        let map = e.light_map(chunk.coord).unwrap();
        for y in 0..CHUNK_HEIGHT as i32 { for x in 0..CHUNK_SIZE as i32 { for z in 0..CHUNK_SIZE as i32 {
            let l = map.get(x, y, z);
            prop_assert!(l <= 15);
            if reg.is_opaque(chunk.get_block(x, y, z)) {
                prop_assert_eq!(l, 0);
            }
        }}}
    }
}
