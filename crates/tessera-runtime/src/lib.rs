//! Chunk streaming and mutation orchestration: loading around a viewer,
//! batched edits, lighting and liquid scheduling, snapshots for readers.
#![forbid(unsafe_code)]

mod batcher;
mod config;
mod generator;
mod notifier;
mod persistence;
mod snapshot;
mod store;
mod world;

pub use batcher::{CommitPlan, MutationBatcher};
pub use config::StoreConfig;
pub use generator::{ChunkGenerator, GenFn, GenOutcome, GenRequest, GeneratedChunk, SyncGenerator, WorkerGenerator};
pub use notifier::{ChangeNotifier, ChangeSet};
pub use persistence::{ChunkPersistence, MemoryPersistence, PersistedChunk};
pub use snapshot::{ChunkSnapshot, SnapshotNeighbors};
pub use store::{ChunkStore, StoreUpdate, TickReport};
pub use world::ChunkMap;
