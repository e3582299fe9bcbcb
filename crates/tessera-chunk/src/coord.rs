use serde::{Deserialize, Serialize};

use crate::CHUNK_SIZE;

/// Horizontal chunk address. Chunks span the full world height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self { cx: self.cx + dx, cz: self.cz + dz }
    }

    /// The four edge-sharing neighbors in -X, +X, -Z, +Z order.
    #[inline]
    pub fn cardinal_neighbors(self) -> [ChunkCoord; 4] {
        [self.offset(-1, 0), self.offset(1, 0), self.offset(0, -1), self.offset(0, 1)]
    }

    #[inline]
    pub fn chebyshev(self, other: ChunkCoord) -> i32 {
        (self.cx - other.cx).abs().max((self.cz - other.cz).abs())
    }

    #[inline]
    pub fn key(self) -> ChunkKey {
        ChunkKey::from(self)
    }

    /// World coordinate of this chunk's local (0, 0) column.
    #[inline]
    pub fn origin(self) -> (i32, i32) {
        (self.cx * CHUNK_SIZE as i32, self.cz * CHUNK_SIZE as i32)
    }

    /// Key used by persisted chunk records.
    pub fn persist_key(self) -> String {
        format!("{},{}", self.cx, self.cz)
    }

    pub fn parse_persist_key(s: &str) -> Option<Self> {
        let (a, b) = s.split_once(',')?;
        Some(Self::new(a.trim().parse().ok()?, b.trim().parse().ok()?))
    }

    /// Chunk containing world column (wx, wz).
    #[inline]
    pub fn containing(wx: i32, wz: i32) -> Self {
        let s = CHUNK_SIZE as i32;
        Self::new(wx.div_euclid(s), wz.div_euclid(s))
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// `ChunkCoord` packed into one integer for map keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey(pub i64);

impl From<ChunkCoord> for ChunkKey {
    #[inline]
    fn from(c: ChunkCoord) -> Self {
        ChunkKey(((c.cx as i64) << 32) | (c.cz as u32 as i64))
    }
}

impl From<ChunkKey> for ChunkCoord {
    #[inline]
    fn from(k: ChunkKey) -> Self {
        ChunkCoord::new((k.0 >> 32) as i32, k.0 as i32)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    #[inline]
    pub fn chunk(self) -> ChunkCoord {
        ChunkCoord::containing(self.x, self.z)
    }

    /// Local (x, z) within the owning chunk.
    #[inline]
    pub fn local_xz(self) -> (usize, usize) {
        let s = CHUNK_SIZE as i32;
        (self.x.rem_euclid(s) as usize, self.z.rem_euclid(s) as usize)
    }

    /// The six face neighbors, +Y first (matches the mesher's face order).
    #[inline]
    pub fn face_neighbors(self) -> [BlockPos; 6] {
        [
            self.offset(0, 1, 0),
            self.offset(0, -1, 0),
            self.offset(1, 0, 0),
            self.offset(-1, 0, 0),
            self.offset(0, 0, 1),
            self.offset(0, 0, -1),
        ]
    }
}

impl From<(i32, i32, i32)> for BlockPos {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}
