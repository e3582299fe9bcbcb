//! Block type table: opacity, light behaviour, liquids, and render kinds.
#![forbid(unsafe_code)]

pub mod config;
pub mod registry;

pub use config::{BlockDef, BlocksConfig};
pub use registry::{BlockRegistry, BlockType, RenderKind};

/// Raw block id stored per voxel. `0` is always air.
pub type BlockId = u8;

pub const AIR: BlockId = 0;

/// Brightest light level a voxel can hold (open sky).
pub const MAX_LIGHT: u8 = 15;

/// Level seeded at a point-light block such as a torch.
pub const POINT_LIGHT_LEVEL: u8 = 14;
