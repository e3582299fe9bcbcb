//! CPU meshing crate: culled cube faces, liquid surfaces, and cross sprites
//! with smooth lighting and ambient occlusion (engine-only, no GPU state).
#![forbid(unsafe_code)]

mod build;
mod chunk;
mod face;
mod mesh_build;
mod neighbors;
pub mod shading;

pub use build::MeshBuilder;
pub use chunk::{ChunkMesh, FaceGroup, PartKey};
pub use face::Face;
pub use mesh_build::MeshBuffers;
pub use neighbors::{ChunkView, NeighborData, NeighborSource, NoNeighbors};
