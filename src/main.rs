mod worldgen;

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use serde::Deserialize;
use tessera_blocks::{AIR, BlockRegistry};
use tessera_chunk::{CHUNK_HEIGHT, ChunkCoord};
use tessera_runtime::{ChunkStore, MemoryPersistence, StoreConfig, WorkerGenerator};

use crate::worldgen::{Terrain, TerrainParams};

#[derive(Parser, Debug)]
#[command(name = "tessera", about = "Headless voxel world driver: streams terrain around a walking viewer, flows water, builds meshes")]
struct Cli {
    /// TOML file with [store], [store.liquid] and [terrain] tables
    #[arg(long)]
    config: Option<PathBuf>,
    /// TOML block table replacing the built-in one
    #[arg(long)]
    blocks: Option<PathBuf>,
    /// Simulation ticks to run
    #[arg(long, default_value_t = 200)]
    ticks: u32,
    /// View radius in chunks (overrides the config file)
    #[arg(long)]
    radius: Option<i32>,
    /// World seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,
    /// Viewer movement along +X per tick, in blocks
    #[arg(long, default_value_t = 0.25)]
    walk: f32,
    /// Generator threads (0 = all cores)
    #[arg(long, default_value_t = 0)]
    workers: usize,
    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AppConfig {
    store: StoreConfig,
    terrain: TerrainParams,
}

impl AppConfig {
    fn from_path(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = std::fs::read_to_string(path)?;
        let cfg: AppConfig = toml::from_str(&text)?;
        if cfg.store.view_radius < 0 {
            return Err(format!("store.view_radius must be >= 0 (got {})", cfg.store.view_radius).into());
        }
        Ok(cfg)
    }
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log.as_str())).init();
    if let Err(e) = run(cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut cfg = match &cli.config {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::default(),
    };
    if let Some(r) = cli.radius {
        cfg.store.view_radius = r.max(0);
    }
    if let Some(seed) = cli.seed {
        cfg.store.seed = seed;
    }

    let reg = Arc::new(match &cli.blocks {
        Some(path) => BlockRegistry::load_from_path(path)?,
        None => BlockRegistry::builtin(),
    });
    let water = reg.id_by_name("water").ok_or("block table has no 'water'")?;
    let terrain = Terrain::new(&reg, cfg.terrain)?;
    let workers = match cli.workers {
        0 => std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4),
        n => n,
    };
    log::info!(
        "seed={} radius={} workers={} ticks={} sea_level={}",
        cfg.store.seed, cfg.store.view_radius, workers, cli.ticks, terrain.params().sea_level
    );
    let generator = WorkerGenerator::new(workers, move |req| terrain.generate(req))?;
    let mut store = ChunkStore::new(Arc::clone(&reg), cfg.store, Box::new(generator), Box::new(MemoryPersistence::new()));

    let mut viewer = [8.0f32, 100.0, 8.0];
    let spawn = ChunkCoord::new(0, 0);
    let deadline = Instant::now() + Duration::from_secs(30);
    while !store.is_loaded(spawn) {
        if Instant::now() > deadline {
            return Err("spawn chunk never finished generating".into());
        }
        store.update(viewer);
        std::thread::sleep(Duration::from_millis(2));
    }
    let commits = store.flush_lighting();
    log::info!("spawn ready: {} chunks loaded, {} lighting commits", store.loaded_count(), commits);

    // a water source a few blocks above the spawn surface
    let ground = (0..CHUNK_HEIGHT as i32).rev().find(|&y| store.get_block(8, y, 8) != AIR).unwrap_or(0);
    let source_y = (ground + 4).min(CHUNK_HEIGHT as i32 - 1);
    if store.set_block(8, source_y, 8, water, 0) {
        log::info!("water source at (8,{},8)", source_y);
    }

    let started = Instant::now();
    let mut total_quads = 0usize;
    for tick in 0..cli.ticks {
        viewer[0] += cli.walk;
        let upd = store.update(viewer);
        let report = store.tick();
        let meshes = store.build_dirty_meshes();
        let quads: usize = meshes.iter().map(|m| m.quad_count()).sum();
        total_quads += quads;
        if let Some(changes) = store.poll_changes(Instant::now()) {
            log::debug!(target: "driver", "tick {tick}: {} chunks changed (immediate={})", changes.chunks.len(), changes.immediate);
        }
        if upd.changed || tick % 50 == 0 {
            log::info!(
                target: "driver",
                "tick {tick}: loaded={} pending={} +{}/-{} liquid processed={} deferred={} moved={} meshes={} quads={}",
                store.loaded_count(),
                store.pending_count(),
                upd.loaded.len(),
                upd.evicted.len(),
                report.liquid.processed,
                report.liquid.deferred,
                report.liquid.moved_mass,
                meshes.len(),
                quads
            );
        }
    }
    log::info!(
        "{} ticks in {:.1?}: {} chunks loaded, {} awaiting light, {} quads meshed",
        cli.ticks,
        started.elapsed(),
        store.loaded_count(),
        store.pending_lighting(),
        total_quads
    );
    Ok(())
}
