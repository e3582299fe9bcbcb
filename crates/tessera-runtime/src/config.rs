use std::error::Error;
use std::path::Path;

use serde::Deserialize;
use tessera_liquid::LiquidConfig;

/// Store tuning, loadable from TOML. Omitted fields keep their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Chebyshev radius, in chunks, kept loaded around the viewer.
    pub view_radius: i32,
    /// Chunks fully relit per batch commit.
    pub lighting_per_commit: usize,
    pub seed: u64,
    /// Quiet period before a batched change notification fires.
    pub debounce_ms: u64,
    pub liquid: LiquidConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            view_radius: 4,
            lighting_per_commit: 1,
            seed: 0,
            debounce_ms: 50,
            liquid: LiquidConfig::default(),
        }
    }
}

impl StoreConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: StoreConfig = toml::from_str(src)?;
        if cfg.view_radius < 0 {
            return Err(format!("view_radius must be >= 0 (got {})", cfg.view_radius).into());
        }
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_liquid_table() {
        let cfg = StoreConfig::from_toml_str(
            r#"
            view_radius = 2
            seed = 7

            [liquid]
            max_fall_speed = 8
            "#,
        )
        .unwrap();
        assert_eq!(cfg.view_radius, 2);
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.lighting_per_commit, 1);
        assert_eq!(cfg.liquid.max_fall_speed, 8);
        assert_eq!(cfg.liquid.max_spread_speed, 16);
    }

    #[test]
    fn rejects_negative_radius() {
        assert!(StoreConfig::from_toml_str("view_radius = -1").is_err());
        assert!(StoreConfig::from_toml_str("view_radius = \"far\"").is_err());
    }
}
