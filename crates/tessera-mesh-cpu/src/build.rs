use std::sync::Arc;

use tessera_blocks::{BlockId, BlockRegistry, MAX_LIGHT, RenderKind};
use tessera_chunk::{CHUNK_HEIGHT, CHUNK_SIZE, VoxelChunk};
use tessera_lighting::LightMap;

use crate::chunk::{ChunkMesh, FaceGroup};
use crate::face::Face;
use crate::neighbors::{ChunkView, NeighborSource};
use crate::shading::{ao_factor, ao_score, brightness, smooth_light};

/// Corner loop in (u, v) sign space.
const CORNERS: [(i32, i32); 4] = [(-1, -1), (1, -1), (1, 1), (-1, 1)];

/// Surface height of a full liquid cell with no liquid above it.
const LIQUID_TOP: f32 = 0.9;

const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

#[inline]
fn liquid_fill(meta: u8) -> f32 {
    let mass = if meta == 0 { 255 } else { meta };
    mass as f32 / 255.0
}

#[inline]
fn add3(a: (i32, i32, i32), b: (i32, i32, i32), k: i32) -> (i32, i32, i32) {
    (a.0 + b.0 * k, a.1 + b.1 * k, a.2 + b.2 * k)
}

pub struct MeshBuilder {
    reg: Arc<BlockRegistry>,
    pub smooth_lighting: bool,
    pub ambient_occlusion: bool,
}

impl MeshBuilder {
    pub fn new(reg: Arc<BlockRegistry>) -> Self {
        Self { reg, smooth_lighting: true, ambient_occlusion: true }
    }

    /// Meshes one chunk. `light` may be `None` for a chunk not yet lit, in which
    /// case it renders at full brightness. Neighbors are only fetched when a
    /// voxel on that edge is sampled.
    pub fn build<N: NeighborSource>(&self, chunk: &VoxelChunk, light: Option<&LightMap>, neighbors: &N) -> ChunkMesh {
        let view = ChunkView::new(chunk, light, neighbors);
        let mut mesh = ChunkMesh::new(chunk.coord);
        let (s, h) = (CHUNK_SIZE as i32, CHUNK_HEIGHT as i32);
        for y in 0..h {
            if chunk.is_empty_layer(y) {
                continue;
            }
            for x in 0..s { for z in 0..s {
                let id = chunk.get_block(x, y, z);
                match self.reg.render_kind(id) {
                    RenderKind::None => {}
                    RenderKind::Cube => self.emit_block(&view, &mut mesh, (x, y, z), id, None),
                    RenderKind::Liquid => {
                        let heights = self.liquid_heights(&view, (x, y, z), id);
                        self.emit_block(&view, &mut mesh, (x, y, z), id, Some(heights));
                    }
                    RenderKind::Cross => self.emit_cross(&view, &mut mesh, (x, y, z), id),
                }
            }}
        }
        log::trace!(target: "mesh", "meshed ({},{}): {} quads", chunk.coord.cx, chunk.coord.cz, mesh.quad_count());
        mesh
    }

    /// Solid faces show toward any transparent neighbor; liquid faces additionally
    /// hide toward the same liquid. Unknown neighbors hide the face.
    fn face_visible(&self, id: BlockId, liquid: bool, neighbor: Option<BlockId>) -> bool {
        match neighbor {
            None => false,
            Some(n) if self.reg.is_opaque(n) => false,
            Some(n) => !liquid || n != id,
        }
    }

    fn emit_block<N: NeighborSource>(
        &self,
        view: &ChunkView<'_, N>,
        mesh: &mut ChunkMesh,
        p: (i32, i32, i32),
        id: BlockId,
        liquid_heights: Option<[[f32; 2]; 2]>,
    ) {
        for face in Face::ALL {
            let f = add3(p, face.delta(), 1);
            if !self.face_visible(id, liquid_heights.is_some(), view.block(f.0, f.1, f.2)) {
                continue;
            }
            self.emit_face(view, mesh, p, id, face, liquid_heights);
        }
    }

    fn emit_face<N: NeighborSource>(
        &self,
        view: &ChunkView<'_, N>,
        mesh: &mut ChunkMesh,
        p: (i32, i32, i32),
        id: BlockId,
        face: Face,
        liquid_heights: Option<[[f32; 2]; 2]>,
    ) {
        let d = face.delta();
        let f = add3(p, d, 1);
        let (u, v) = face.tangents();
        let face_light = view.light(f.0, f.1, f.2).unwrap_or(MAX_LIGHT);
        let base = (p.0 + d.0.max(0), p.1 + d.1.max(0), p.2 + d.2.max(0));
        let tint = self.reg.tint(id);
        let (ox, oz) = view.chunk.coord.origin();

        let mut corners = [[0.0f32; 3]; 4];
        let mut colors = [[0.0f32; 3]; 4];
        let mut lum = [0.0f32; 4];
        for (k, &(su, sv)) in CORNERS.iter().enumerate() {
            let c = add3(add3(base, u, (su > 0) as i32), v, (sv > 0) as i32);
            let mut cy = c.1 as f32;
            if let Some(hs) = liquid_heights {
                if c.1 > p.1 {
                    cy = p.1 as f32 + hs[(c.0 - p.0) as usize][(c.2 - p.2) as usize];
                }
            }
            corners[k] = [(c.0 + ox) as f32, cy, (c.2 + oz) as f32];

            let probes = [add3(f, u, su), add3(f, v, sv), add3(add3(f, u, su), v, sv)];
            let mut occluded = [false; 3];
            let mut lights = [None; 3];
            for (i, q) in probes.iter().enumerate() {
                occluded[i] = view.block(q.0, q.1, q.2).is_some_and(|b| self.reg.is_opaque(b));
                if !occluded[i] {
                    lights[i] = view.light(q.0, q.1, q.2);
                }
            }
            let level = if self.smooth_lighting { smooth_light(face_light, lights) } else { face_light as f32 };
            let ao = if self.ambient_occlusion { ao_factor(ao_score(occluded[0], occluded[1], occluded[2])) } else { 1.0 };
            lum[k] = brightness(level) * face.shade() * ao;
            colors[k] = [tint[0] * lum[k], tint[1] * lum[k], tint[2] * lum[k]];
        }
        // split along the dimmer diagonal so AO gradients stay symmetric
        let flip = lum[0] + lum[2] > lum[1] + lum[3];
        mesh.part_mut(id, face.group()).add_quad(corners, face.normal(), QUAD_UVS, colors, flip);
    }

    /// Surface height at each of the cell's four top corners: the highest fill
    /// among the same-liquid columns sharing that corner, with solid columns
    /// counting as full.
    fn liquid_heights<N: NeighborSource>(&self, view: &ChunkView<'_, N>, p: (i32, i32, i32), id: BlockId) -> [[f32; 2]; 2] {
        let mut out = [[0.0f32; 2]; 2];
        for gx in 0..2 { for gz in 0..2 {
            let mut h = 0.0f32;
            for cx in (p.0 + gx - 1)..=(p.0 + gx) { for cz in (p.2 + gz - 1)..=(p.2 + gz) {
                let col = match view.block(cx, p.1, cz) {
                    Some(b) if b == id => {
                        if view.block(cx, p.1 + 1, cz) == Some(id) {
                            1.0
                        } else {
                            liquid_fill(view.metadata(cx, p.1, cz)) * LIQUID_TOP
                        }
                    }
                    Some(b) if self.reg.is_opaque(b) => 1.0,
                    _ => continue,
                };
                h = h.max(col);
            }}
            out[gx as usize][gz as usize] = h;
        }}
        out
    }

    /// Two crossed quads through the cell diagonals, each emitted from both sides.
    fn emit_cross<N: NeighborSource>(&self, view: &ChunkView<'_, N>, mesh: &mut ChunkMesh, p: (i32, i32, i32), id: BlockId) {
        let (ox, oz) = view.chunk.coord.origin();
        let (x, y, z) = ((p.0 + ox) as f32, p.1 as f32, (p.2 + oz) as f32);
        let level = view.light(p.0, p.1, p.2).unwrap_or(MAX_LIGHT);
        let tint = self.reg.tint(id);
        let b = brightness(level as f32);
        let colors = [[tint[0] * b, tint[1] * b, tint[2] * b]; 4];
        let r = std::f32::consts::FRAC_1_SQRT_2;
        let planes = [
            ([[x, y, z], [x + 1.0, y, z + 1.0], [x + 1.0, y + 1.0, z + 1.0], [x, y + 1.0, z]], [r, 0.0, -r]),
            ([[x + 1.0, y, z], [x, y, z + 1.0], [x, y + 1.0, z + 1.0], [x + 1.0, y + 1.0, z]], [r, 0.0, r]),
        ];
        let part = mesh.part_mut(id, FaceGroup::Cross);
        for (corners, n) in planes {
            part.add_quad(corners, n, QUAD_UVS, colors, false);
            part.add_quad(corners, [-n[0], -n[1], -n[2]], QUAD_UVS, colors, false);
        }
    }
}
