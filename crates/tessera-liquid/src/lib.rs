//! Mass-conserving liquid automaton driven by a FIFO worklist.
#![forbid(unsafe_code)]

mod config;
mod sim;
mod worklist;

pub use config::LiquidConfig;
pub use sim::{LiquidSimulator, LiquidTickReport};
pub use worklist::Worklist;

use tessera_blocks::BlockId;
use tessera_chunk::{BlockAccess, VoxelChunk};

/// Mass of a completely full liquid cell.
pub const MAX_LEVEL: u8 = 255;

/// Liquid mass held in a metadata byte; 0 is shorthand for full.
#[inline]
pub fn mass_from_meta(meta: u8) -> u8 {
    if meta == 0 { MAX_LEVEL } else { meta }
}

#[inline]
pub fn meta_from_mass(mass: u8) -> u8 {
    if mass == MAX_LEVEL { 0 } else { mass }
}

/// Block storage the simulator reads and writes. Reads of unloaded chunks
/// return `None`, and liquid never flows into them.
pub trait LiquidWorld: BlockAccess {
    fn set_liquid_cell(&mut self, wx: i32, wy: i32, wz: i32, id: BlockId, meta: u8) -> bool;
}

impl LiquidWorld for VoxelChunk {
    fn set_liquid_cell(&mut self, wx: i32, wy: i32, wz: i32, id: BlockId, meta: u8) -> bool {
        match self.world_to_local(wx, wz) {
            Some((lx, lz)) => self.set_block(lx, wy, lz, id, meta),
            None => false,
        }
    }
}
