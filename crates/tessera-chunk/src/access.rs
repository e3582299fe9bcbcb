use tessera_blocks::{AIR, BlockId};

/// World-space block lookup across chunk boundaries.
///
/// `None` means the containing chunk is not loaded (or `wy` is outside the
/// world); callers that want the lenient default use [`BlockAccess::get_block`].
pub trait BlockAccess {
    fn block_at(&self, wx: i32, wy: i32, wz: i32) -> Option<BlockId>;

    fn metadata_at(&self, wx: i32, wy: i32, wz: i32) -> Option<u8>;

    #[inline]
    fn get_block(&self, wx: i32, wy: i32, wz: i32) -> BlockId {
        self.block_at(wx, wy, wz).unwrap_or(AIR)
    }

    #[inline]
    fn is_loaded(&self, wx: i32, wz: i32) -> bool {
        self.block_at(wx, 0, wz).is_some()
    }
}

impl BlockAccess for crate::VoxelChunk {
    fn block_at(&self, wx: i32, wy: i32, wz: i32) -> Option<BlockId> {
        let (lx, lz) = self.world_to_local(wx, wz)?;
        self.in_height(wy).then(|| self.get_block(lx, wy, lz))
    }

    fn metadata_at(&self, wx: i32, wy: i32, wz: i32) -> Option<u8> {
        let (lx, lz) = self.world_to_local(wx, wz)?;
        self.in_height(wy).then(|| self.get_metadata(lx, wy, lz))
    }

    fn is_loaded(&self, wx: i32, wz: i32) -> bool {
        self.world_to_local(wx, wz).is_some()
    }
}
