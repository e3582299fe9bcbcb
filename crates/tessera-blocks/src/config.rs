use serde::Deserialize;

use crate::registry::RenderKind;

/// One `[[blocks]]` entry in a block table file.
#[derive(Clone, Debug, Deserialize)]
pub struct BlockDef {
    pub name: String,
    pub id: u8,
    pub opaque: Option<bool>,
    pub light_decay: Option<u8>,
    pub emission: Option<u8>,
    pub liquid: Option<bool>,
    pub render: Option<RenderKind>,
    pub tint: Option<[f32; 3]>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BlocksConfig {
    pub blocks: Vec<BlockDef>,
}

impl BlockDef {
    /// Shorthand used by the built-in table.
    pub(crate) fn simple(name: &str, id: u8, opaque: bool, decay: u8, render: RenderKind, tint: [f32; 3]) -> Self {
        Self {
            name: name.to_string(),
            id,
            opaque: Some(opaque),
            light_decay: Some(decay),
            emission: None,
            liquid: Some(render == RenderKind::Liquid),
            render: Some(render),
            tint: Some(tint),
        }
    }
}
