use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use tessera_blocks::BlockRegistry;
use tessera_chunk::{CHUNK_SIZE, ChunkCoord, VoxelChunk};
use tessera_lighting::LightingEngine;
use tessera_mesh_cpu::{MeshBuilder, NoNeighbors};

/// Rolling hills: stone core, dirt, grass cap, a pond at sea level.
fn hills(coord: ChunkCoord) -> VoxelChunk {
    let mut c = VoxelChunk::new(coord);
    for x in 0..CHUNK_SIZE as i32 { for z in 0..CHUNK_SIZE as i32 {
        let h = 60 + ((x as f32 * 0.4).sin() * 6.0 + (z as f32 * 0.3).cos() * 5.0) as i32;
        for y in 0..h {
            let id = if y < h - 4 { 1 } else if y < h - 1 { 2 } else { 3 };
            c.set_block(x, y, z, id, 0);
        }
        for y in h..58 {
            c.set_block(x, y, z, 7, 0);
        }
    }}
    c
}

fn bench_light_and_mesh(c: &mut Criterion) {
    let reg = Arc::new(BlockRegistry::builtin());
    let chunk = hills(ChunkCoord::new(0, 0));
    let builder = MeshBuilder::new(reg.clone());

    let mut group = c.benchmark_group("hills_16x128x16");
    group.bench_function("compute_lighting", |b| {
        let mut engine = LightingEngine::new(reg.clone());
        b.iter(|| black_box(engine.compute_lighting(&chunk)))
    });
    let mut engine = LightingEngine::new(reg.clone());
    engine.compute_lighting(&chunk);
    let light = engine.light_map(chunk.coord).cloned();
    group.bench_function("build_mesh", |b| {
        b.iter(|| black_box(builder.build(&chunk, light.as_ref(), &NoNeighbors)))
    });
    group.finish();
}

criterion_group!(benches, bench_light_and_mesh);
criterion_main!(benches);
