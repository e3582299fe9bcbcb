use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tessera_chunk::{ChunkCoord, DecodeReport, RleChunk, VoxelChunk};

/// One saved chunk: `key` is `"{cx},{cz}"`, arrays are RLE `count, value` pairs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedChunk {
    pub key: String,
    pub blocks: Vec<u32>,
    pub metadata: Vec<u32>,
}

impl PersistedChunk {
    pub fn from_chunk(chunk: &VoxelChunk) -> Self {
        let RleChunk { blocks, metadata } = chunk.serialize();
        Self { key: chunk.coord.persist_key(), blocks, metadata }
    }

    pub fn coord(&self) -> Option<ChunkCoord> {
        ChunkCoord::parse_persist_key(&self.key)
    }

    /// Decodes the record. `None` only when the key itself is malformed.
    pub fn restore(&self) -> Option<(VoxelChunk, DecodeReport)> {
        let coord = self.coord()?;
        let rle = RleChunk { blocks: self.blocks.clone(), metadata: self.metadata.clone() };
        Some(VoxelChunk::deserialize(coord, &rle))
    }
}

/// Storage for chunks that were modified while loaded.
pub trait ChunkPersistence {
    fn load(&self, coord: ChunkCoord) -> Option<PersistedChunk>;

    fn save(&mut self, record: PersistedChunk);

    fn contains(&self, coord: ChunkCoord) -> bool {
        self.load(coord).is_some()
    }
}

#[derive(Debug, Default)]
pub struct MemoryPersistence {
    records: HashMap<String, PersistedChunk>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ChunkPersistence for MemoryPersistence {
    fn load(&self, coord: ChunkCoord) -> Option<PersistedChunk> {
        self.records.get(&coord.persist_key()).cloned()
    }

    fn save(&mut self, record: PersistedChunk) {
        self.records.insert(record.key.clone(), record);
    }

    fn contains(&self, coord: ChunkCoord) -> bool {
        self.records.contains_key(&coord.persist_key())
    }
}
