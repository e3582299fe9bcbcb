use std::error::Error;

use fastnoise_lite::{FastNoiseLite, NoiseType};
use serde::Deserialize;
use tessera_blocks::{AIR, BlockId, BlockRegistry};
use tessera_chunk::{CHUNK_HEIGHT, CHUNK_SIZE, CHUNK_VOLUME, voxel_index};
use tessera_runtime::{GenRequest, GeneratedChunk};

pub const BIOME_OCEAN: u8 = 0;
pub const BIOME_BEACH: u8 = 1;
pub const BIOME_PLAINS: u8 = 2;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub frequency: f32,
    pub min_height: i32,
    pub max_height: i32,
    pub sea_level: i32,
    pub topsoil: i32,
    /// Fraction of grass columns that grow a plant.
    pub plant_chance: f32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self { frequency: 0.02, min_height: 40, max_height: 90, sea_level: 58, topsoil: 3, plant_chance: 0.08 }
    }
}

#[derive(Clone, Copy, Debug)]
struct Palette {
    stone: BlockId,
    dirt: BlockId,
    grass: BlockId,
    sand: BlockId,
    water: BlockId,
    flower: BlockId,
    tall_grass: BlockId,
}

/// Heightmap terrain with sand shores, water up to sea level and scattered plants.
#[derive(Clone, Debug)]
pub struct Terrain {
    params: TerrainParams,
    ids: Palette,
}

fn lookup(reg: &BlockRegistry, name: &str) -> Result<BlockId, Box<dyn Error>> {
    reg.id_by_name(name).ok_or_else(|| format!("block table has no '{name}'").into())
}

/// Cheap per-column hash in [0, 1).
fn column_hash(wx: i32, wz: i32, seed: i32) -> f32 {
    let mut h = (wx as u32).wrapping_mul(0x8da6_b343) ^ (wz as u32).wrapping_mul(0xd816_3841) ^ (seed as u32).wrapping_mul(0xcb1a_b31f);
    h ^= h >> 13;
    h = h.wrapping_mul(0x5bd1_e995);
    h ^= h >> 15;
    (h & 0xffff) as f32 / 65536.0
}

impl Terrain {
    pub fn new(reg: &BlockRegistry, params: TerrainParams) -> Result<Self, Box<dyn Error>> {
        if params.min_height < 1 || params.max_height >= CHUNK_HEIGHT as i32 || params.min_height > params.max_height {
            return Err(format!("terrain heights {}..{} do not fit the world", params.min_height, params.max_height).into());
        }
        let ids = Palette {
            stone: lookup(reg, "stone")?,
            dirt: lookup(reg, "dirt")?,
            grass: lookup(reg, "grass")?,
            sand: lookup(reg, "sand")?,
            water: lookup(reg, "water")?,
            flower: lookup(reg, "flower")?,
            tall_grass: lookup(reg, "tall_grass")?,
        };
        Ok(Self { params, ids })
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    pub fn generate(&self, req: GenRequest) -> Result<GeneratedChunk, String> {
        let p = &self.params;
        let seed = req.seed as i32;
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(p.frequency));

        let mut blocks = vec![AIR; CHUNK_VOLUME];
        let metadata = vec![0u8; CHUNK_VOLUME];
        let mut biome_map = vec![BIOME_PLAINS; CHUNK_SIZE * CHUNK_SIZE];
        let (ox, oz) = req.coord.origin();

        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let (wx, wz) = (ox + x as i32, oz + z as i32);
                let h = noise.get_noise_2d(wx as f32, wz as f32);
                // map [-1,1] -> [min_height, max_height]
                let height = (((h + 1.0) * 0.5 * (p.max_height - p.min_height) as f32) as i32 + p.min_height)
                    .clamp(1, CHUNK_HEIGHT as i32 - 2);
                let shore = height <= p.sea_level + 1;
                biome_map[x * CHUNK_SIZE + z] = if height <= p.sea_level {
                    BIOME_OCEAN
                } else if shore {
                    BIOME_BEACH
                } else {
                    BIOME_PLAINS
                };

                for y in 0..height {
                    let b = if y == height - 1 {
                        if shore { self.ids.sand } else { self.ids.grass }
                    } else if y + p.topsoil >= height {
                        if shore { self.ids.sand } else { self.ids.dirt }
                    } else {
                        self.ids.stone
                    };
                    blocks[voxel_index(x, y as usize, z)] = b;
                }
                for y in height..=p.sea_level {
                    blocks[voxel_index(x, y as usize, z)] = self.ids.water;
                }
                if !shore && column_hash(wx, wz, seed) < p.plant_chance {
                    let plant = if column_hash(wz, wx, seed) < 0.3 { self.ids.flower } else { self.ids.tall_grass };
                    blocks[voxel_index(x, height as usize, z)] = plant;
                }
            }
        }
        Ok(GeneratedChunk { coord: req.coord, blocks, metadata, biome_map })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_chunk::ChunkCoord;

    fn terrain() -> Terrain {
        Terrain::new(&BlockRegistry::builtin(), TerrainParams::default()).unwrap()
    }

    fn req(cx: i32, cz: i32) -> GenRequest {
        GenRequest { coord: ChunkCoord::new(cx, cz), seed: 1337, priority: 0 }
    }

    #[test]
    fn chunks_are_complete_and_deterministic() {
        let t = terrain();
        let a = t.generate(req(3, -2)).unwrap();
        let b = t.generate(req(3, -2)).unwrap();
        assert_eq!(a.blocks.len(), CHUNK_VOLUME);
        assert_eq!(a.metadata.len(), CHUNK_VOLUME);
        assert_eq!(a.biome_map.len(), CHUNK_SIZE * CHUNK_SIZE);
        assert_eq!(a.blocks, b.blocks);
    }

    #[test]
    fn columns_have_ground_and_no_floating_water() {
        let t = terrain();
        let reg = BlockRegistry::builtin();
        let c = t.generate(req(0, 0)).unwrap();
        let sea = t.params().sea_level as usize;
        for x in 0..CHUNK_SIZE { for z in 0..CHUNK_SIZE {
            assert_ne!(c.blocks[voxel_index(x, 0, z)], AIR);
            for y in sea + 1..CHUNK_HEIGHT {
                assert!(!reg.is_liquid(c.blocks[voxel_index(x, y, z)]));
            }
        }}
    }

    #[test]
    fn rejects_heights_outside_the_world() {
        let params = TerrainParams { max_height: 500, ..TerrainParams::default() };
        assert!(Terrain::new(&BlockRegistry::builtin(), params).is_err());
    }
}
