use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use tessera_blocks::BlockRegistry;
use tessera_chunk::{BlockPos, CHUNK_SIZE, ChunkCoord, VoxelChunk};
use tessera_liquid::{LiquidConfig, LiquidSimulator, mass_from_meta};

const STONE: u8 = 1;
const WATER: u8 = 7;
const LAVA: u8 = 8;

fn total_mass(c: &VoxelChunk, id: u8) -> u64 {
    let mut sum = 0u64;
    for y in 0..24 { for x in 0..CHUNK_SIZE as i32 { for z in 0..CHUNK_SIZE as i32 {
        if c.get_block(x, y, z) == id {
            sum += mass_from_meta(c.get_metadata(x, y, z)) as u64;
        }
    }}}
    sum
}

fn cell() -> impl Strategy<Value = ((i32, i32, i32), u8, u8)> {
    let id = prop_oneof![3 => Just(WATER), 1 => Just(LAVA), 1 => Just(STONE)];
    ((0..CHUNK_SIZE as i32, 0..20i32, 0..CHUNK_SIZE as i32), id, any::<u8>())
}

fn config() -> impl Strategy<Value = LiquidConfig> {
    (1u8..=64, 1u8..=32, 0u8..=4).prop_map(|(fall, spread, threshold)| LiquidConfig {
        max_fall_speed: fall,
        max_spread_speed: spread,
        stability_threshold: threshold,
        time_budget_ms: 1000,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // a single loaded chunk is closed: nothing flows into unloaded space or below y=0
    #[test]
    fn mass_is_conserved(cells in prop::collection::vec(cell(), 1..60), cfg in config(), ticks in 1usize..20) {
        let mut c = VoxelChunk::new(ChunkCoord::new(0, 0));
        let mut sim = LiquidSimulator::new(Arc::new(BlockRegistry::builtin()), cfg);
        for ((x, y, z), id, meta) in cells {
            c.set_block(x, y, z, id, meta);
            sim.wake(BlockPos::new(x, y, z));
        }
        let (water, lava) = (total_mass(&c, WATER), total_mass(&c, LAVA));
        for _ in 0..ticks {
            let report = sim.update_with_budget(&mut c, Duration::from_secs(5));
            prop_assert_eq!(report.deferred, 0);
            prop_assert_eq!(total_mass(&c, WATER), water);
            prop_assert_eq!(total_mass(&c, LAVA), lava);
        }
    }

    // liquid only moves down or sideways, never above the seeded layers
    #[test]
    fn liquid_never_rises(cells in prop::collection::vec(cell(), 1..40), ticks in 1usize..10) {
        let mut c = VoxelChunk::new(ChunkCoord::new(0, 0));
        let mut sim = LiquidSimulator::new(Arc::new(BlockRegistry::builtin()), LiquidConfig::default());
        for ((x, y, z), id, meta) in cells {
            c.set_block(x, y, z, id, meta);
            sim.wake(BlockPos::new(x, y, z));
        }
        for _ in 0..ticks {
            sim.update_with_budget(&mut c, Duration::from_secs(5));
        }
        for y in 20..40 { for x in 0..CHUNK_SIZE as i32 { for z in 0..CHUNK_SIZE as i32 {
            let id = c.get_block(x, y, z);
            prop_assert!(id != WATER && id != LAVA);
        }}}
    }
}
