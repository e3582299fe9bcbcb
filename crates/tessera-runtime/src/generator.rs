use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tessera_blocks::BlockId;
use tessera_chunk::ChunkCoord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenRequest {
    pub coord: ChunkCoord,
    pub seed: u64,
    /// Ring distance from the viewer; lower is more urgent.
    pub priority: u32,
}

/// Raw buffers for one chunk in `voxel_index` order.
#[derive(Clone, Debug)]
pub struct GeneratedChunk {
    pub coord: ChunkCoord,
    pub blocks: Vec<BlockId>,
    pub metadata: Vec<u8>,
    /// One byte per column; carried through for callers, unused by the store.
    pub biome_map: Vec<u8>,
}

#[derive(Clone, Debug)]
pub enum GenOutcome {
    Ready(GeneratedChunk),
    Failed { coord: ChunkCoord, reason: String },
}

impl GenOutcome {
    pub fn coord(&self) -> ChunkCoord {
        match self {
            GenOutcome::Ready(c) => c.coord,
            GenOutcome::Failed { coord, .. } => *coord,
        }
    }
}

/// Asynchronous chunk source. Requests may complete in any order, or never.
pub trait ChunkGenerator {
    fn request(&mut self, req: GenRequest);

    /// Outcomes that finished since the last call.
    fn drain(&mut self) -> Vec<GenOutcome>;
}

pub type GenFn = dyn Fn(GenRequest) -> Result<GeneratedChunk, String> + Send + Sync;

fn run(gen_fn: &GenFn, req: GenRequest) -> GenOutcome {
    match gen_fn(req) {
        Ok(chunk) => GenOutcome::Ready(chunk),
        Err(reason) => GenOutcome::Failed { coord: req.coord, reason },
    }
}

/// Runs queued requests on the caller's thread at the next `drain`, most
/// urgent first.
pub struct SyncGenerator {
    gen_fn: Box<GenFn>,
    queue: Vec<GenRequest>,
}

impl SyncGenerator {
    pub fn new(f: impl Fn(GenRequest) -> Result<GeneratedChunk, String> + Send + Sync + 'static) -> Self {
        Self { gen_fn: Box::new(f), queue: Vec::new() }
    }
}

impl ChunkGenerator for SyncGenerator {
    fn request(&mut self, req: GenRequest) {
        self.queue.push(req);
    }

    fn drain(&mut self) -> Vec<GenOutcome> {
        let mut queue = std::mem::take(&mut self.queue);
        queue.sort_by_key(|r| r.priority);
        queue.into_iter().map(|r| run(self.gen_fn.as_ref(), r)).collect()
    }
}

/// Generates on a dedicated rayon pool; results come back over a channel.
pub struct WorkerGenerator {
    pool: ThreadPool,
    gen_fn: Arc<GenFn>,
    tx: Sender<GenOutcome>,
    rx: Receiver<GenOutcome>,
    inflight: Arc<AtomicUsize>,
}

impl WorkerGenerator {
    pub fn new(
        threads: usize,
        f: impl Fn(GenRequest) -> Result<GeneratedChunk, String> + Send + Sync + 'static,
    ) -> Result<Self, Box<dyn Error>> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("tessera-gen-{i}"))
            .build()?;
        let (tx, rx) = unbounded();
        Ok(Self { pool, gen_fn: Arc::new(f), tx, rx, inflight: Arc::new(AtomicUsize::new(0)) })
    }

    /// Requests submitted but not yet drained.
    pub fn in_flight(&self) -> usize {
        self.inflight.load(Ordering::Relaxed)
    }
}

impl ChunkGenerator for WorkerGenerator {
    fn request(&mut self, req: GenRequest) {
        let gen_fn = Arc::clone(&self.gen_fn);
        let tx = self.tx.clone();
        self.inflight.fetch_add(1, Ordering::Relaxed);
        self.pool.spawn(move || {
            let _ = tx.send(run(gen_fn.as_ref(), req));
        });
    }

    fn drain(&mut self) -> Vec<GenOutcome> {
        let out: Vec<GenOutcome> = self.rx.try_iter().collect();
        self.inflight.fetch_sub(out.len(), Ordering::Relaxed);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tessera_chunk::CHUNK_VOLUME;

    fn flat(req: GenRequest) -> Result<GeneratedChunk, String> {
        if req.coord.cx < 0 {
            return Err("west of the map".into());
        }
        Ok(GeneratedChunk {
            coord: req.coord,
            blocks: vec![1; CHUNK_VOLUME],
            metadata: vec![0; CHUNK_VOLUME],
            biome_map: vec![0; 256],
        })
    }

    fn req(cx: i32, priority: u32) -> GenRequest {
        GenRequest { coord: ChunkCoord::new(cx, 0), seed: 1, priority }
    }

    #[test]
    fn sync_drains_by_priority() {
        let mut g = SyncGenerator::new(flat);
        g.request(req(3, 2));
        g.request(req(1, 0));
        g.request(req(-1, 1));
        let out = g.drain();
        let coords: Vec<i32> = out.iter().map(|o| o.coord().cx).collect();
        assert_eq!(coords, vec![1, -1, 3]);
        assert!(matches!(out[1], GenOutcome::Failed { .. }));
        assert!(g.drain().is_empty());
    }

    #[test]
    fn worker_results_arrive() {
        let mut g = WorkerGenerator::new(2, flat).unwrap();
        for cx in 0..4 {
            g.request(req(cx, cx as u32));
        }
        let mut got = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(10);
        while got.len() < 4 && Instant::now() < deadline {
            got.extend(g.drain());
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(got.len(), 4);
        assert_eq!(g.in_flight(), 0);
    }
}
