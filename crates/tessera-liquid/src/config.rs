use serde::Deserialize;

/// Flow tuning. Every field falls back to its default when omitted from TOML.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LiquidConfig {
    /// Most mass a cell can drop into the cell below per tick.
    pub max_fall_speed: u8,
    /// Most mass a cell can hand to one horizontal neighbor per tick.
    pub max_spread_speed: u8,
    /// Equalization smaller than this leaves the cell asleep.
    pub stability_threshold: u8,
    pub time_budget_ms: u64,
}

impl Default for LiquidConfig {
    fn default() -> Self {
        Self {
            max_fall_speed: 32,
            max_spread_speed: 16,
            stability_threshold: 2,
            time_budget_ms: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: LiquidConfig = toml::from_str("max_fall_speed = 8").unwrap();
        assert_eq!(cfg.max_fall_speed, 8);
        assert_eq!(cfg.max_spread_speed, 16);
        assert_eq!(cfg.time_budget_ms, 4);
    }
}
