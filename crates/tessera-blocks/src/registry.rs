use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::config::{BlockDef, BlocksConfig};
use super::{AIR, BlockId, MAX_LIGHT};

/// How the mesher draws a block.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderKind {
    /// Nothing is drawn (air).
    None,
    /// Six culled faces.
    Cube,
    /// Culled faces with a variable-height top surface.
    Liquid,
    /// Two crossed double-sided quads, never culled.
    Cross,
}

#[derive(Clone, Debug)]
pub struct BlockType {
    pub id: BlockId,
    pub name: String,
    /// Opaque blocks stop light completely and always hold light 0.
    pub opaque: bool,
    /// Light levels lost when light enters this block. Ignored for opaque blocks.
    pub light_decay: u8,
    pub emission: u8,
    pub liquid: bool,
    pub render: RenderKind,
    pub tint: [f32; 3],
}

impl BlockType {
    fn unknown() -> Self {
        Self {
            id: 255,
            name: "unknown".into(),
            opaque: true,
            light_decay: 1,
            emission: 0,
            liquid: false,
            render: RenderKind::Cube,
            tint: [1.0, 0.0, 1.0],
        }
    }

    #[inline]
    pub fn is_transparent(&self) -> bool {
        !self.opaque
    }
}

/// Dense id -> type table. Ids without an entry resolve to an opaque "unknown" cube.
#[derive(Clone, Debug)]
pub struct BlockRegistry {
    blocks: Vec<Option<BlockType>>,
    by_name: HashMap<String, BlockId>,
    unknown: BlockType,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl BlockRegistry {
    fn empty() -> Self {
        Self {
            blocks: vec![None; 256],
            by_name: HashMap::new(),
            unknown: BlockType::unknown(),
        }
    }

    /// The default block table used by the engine and its tests.
    pub fn builtin() -> Self {
        use RenderKind::{Cross, Cube, Liquid};
        let mut defs = vec![
            BlockDef::simple("air", 0, false, 1, RenderKind::None, [0.0, 0.0, 0.0]),
            BlockDef::simple("stone", 1, true, 1, Cube, [0.50, 0.50, 0.52]),
            BlockDef::simple("dirt", 2, true, 1, Cube, [0.45, 0.31, 0.20]),
            BlockDef::simple("grass", 3, true, 1, Cube, [0.36, 0.62, 0.25]),
            BlockDef::simple("sand", 4, true, 1, Cube, [0.86, 0.80, 0.56]),
            BlockDef::simple("log", 5, true, 1, Cube, [0.40, 0.29, 0.16]),
            BlockDef::simple("leaves", 6, false, 2, Cube, [0.22, 0.48, 0.18]),
            BlockDef::simple("water", 7, false, 2, Liquid, [0.20, 0.36, 0.80]),
            BlockDef::simple("lava", 8, false, 2, Liquid, [0.95, 0.40, 0.08]),
            BlockDef::simple("torch", 9, false, 1, Cross, [1.00, 0.85, 0.45]),
            BlockDef::simple("glass", 10, false, 1, Cube, [0.85, 0.92, 0.95]),
            BlockDef::simple("flower", 11, false, 1, Cross, [0.90, 0.25, 0.30]),
            BlockDef::simple("tall_grass", 12, false, 1, Cross, [0.40, 0.70, 0.28]),
        ];
        defs[9].emission = Some(super::POINT_LIGHT_LEVEL);
        let mut reg = Self::empty();
        for def in defs {
            reg.insert_def(def);
        }
        reg
    }

    pub fn from_configs(cfg: BlocksConfig) -> Result<Self, Box<dyn Error>> {
        let mut reg = Self::empty();
        for def in cfg.blocks {
            if reg.blocks[def.id as usize].is_some() {
                return Err(format!("duplicate block id {} ({})", def.id, def.name).into());
            }
            if def.id == AIR && def.opaque.unwrap_or(true) {
                return Err("block id 0 must be a non-opaque air block".into());
            }
            if def.light_decay == Some(0) {
                return Err(format!("block {} has light_decay 0; light would never fade", def.name).into());
            }
            if def.emission.unwrap_or(0) > MAX_LIGHT {
                return Err(format!("block {} emits above {}", def.name, MAX_LIGHT).into());
            }
            reg.insert_def(def);
        }
        if reg.blocks[AIR as usize].is_none() {
            return Err("block table has no air entry (id 0)".into());
        }
        Ok(reg)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: BlocksConfig = toml::from_str(toml_str)?;
        Self::from_configs(cfg)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    fn insert_def(&mut self, def: BlockDef) {
        let opaque = def.opaque.unwrap_or(true);
        let render = def.render.unwrap_or(if def.id == AIR {
            RenderKind::None
        } else if def.liquid.unwrap_or(false) {
            RenderKind::Liquid
        } else {
            RenderKind::Cube
        });
        let ty = BlockType {
            id: def.id,
            name: def.name,
            opaque,
            light_decay: def.light_decay.unwrap_or(1).max(1),
            emission: def.emission.unwrap_or(0).min(MAX_LIGHT),
            liquid: def.liquid.unwrap_or(render == RenderKind::Liquid),
            render,
            tint: def.tint.unwrap_or([1.0, 1.0, 1.0]),
        };
        self.by_name.insert(ty.name.clone(), ty.id);
        let slot = ty.id as usize;
        self.blocks[slot] = Some(ty);
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> &BlockType {
        self.blocks[id as usize].as_ref().unwrap_or(&self.unknown)
    }

    #[inline]
    pub fn is_known(&self, id: BlockId) -> bool {
        self.blocks[id as usize].is_some()
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn is_opaque(&self, id: BlockId) -> bool {
        self.get(id).opaque
    }

    #[inline]
    pub fn is_transparent(&self, id: BlockId) -> bool {
        !self.get(id).opaque
    }

    #[inline]
    pub fn is_liquid(&self, id: BlockId) -> bool {
        self.get(id).liquid
    }

    /// Light lost on entering `id`; opaque blocks return `MAX_LIGHT + 1` so nothing survives.
    #[inline]
    pub fn light_decay(&self, id: BlockId) -> u8 {
        let ty = self.get(id);
        if ty.opaque { MAX_LIGHT + 1 } else { ty.light_decay }
    }

    #[inline]
    pub fn emission(&self, id: BlockId) -> u8 {
        self.get(id).emission
    }

    #[inline]
    pub fn render_kind(&self, id: BlockId) -> RenderKind {
        self.get(id).render
    }

    #[inline]
    pub fn tint(&self, id: BlockId) -> [f32; 3] {
        self.get(id).tint
    }

    /// Whether swapping `old` for `new` can change light anywhere.
    pub fn light_relevant_change(&self, old: BlockId, new: BlockId) -> bool {
        let (a, b) = (self.get(old), self.get(new));
        a.opaque != b.opaque || a.emission != b.emission || (!a.opaque && a.light_decay != b.light_decay)
    }
}
