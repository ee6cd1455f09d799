//! Tunable constants and the engine configuration.
//!
//! Every number that shapes the economy lives here so handlers never carry
//! their own copies. `EngineConfig` travels inside `GameState`, which keeps
//! `reduce` a function of `(state, action)` only.

use serde::{Deserialize, Serialize};

/// Purchase cost growth per owned unit.
pub const COST_GROWTH: f64 = 1.15;

/// Lifetime currency per prestige point before the square root.
pub const PRESTIGE_DIVISOR: f64 = 1_000_000.0;

/// Applied on top of every other multiplier while the debug flag is set.
/// One value for clicks and production alike.
pub const DEBUG_MULTIPLIER: f64 = 1000.0;

/// Combo ceiling.
pub const COMBO_MAX_MULTIPLIER: f64 = 3.0;

/// Milliseconds allowed between two primary actions for the streak to extend.
pub const COMBO_TIME_WINDOW_MS: u64 = 1_000;

/// Multiplier gained per streak step beyond the first.
pub const COMBO_STEP: f64 = 0.1;

/// Currency per primary action in a fresh state.
pub const BASE_ENTRIES_PER_CLICK: f64 = 1.0;

/// Combo tuning. Stored alongside the live combo state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    pub max_multiplier: f64,
    pub time_window_ms: u64,
    pub step: f64,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            max_multiplier: COMBO_MAX_MULTIPLIER,
            time_window_ms: COMBO_TIME_WINDOW_MS,
            step: COMBO_STEP,
        }
    }
}

/// Economy tuning. Missing JSON fields fall back to the constants above.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub cost_growth: f64,
    pub prestige_divisor: f64,
    pub debug_multiplier: f64,
    pub base_entries_per_click: f64,
    pub combo: ComboConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cost_growth: COST_GROWTH,
            prestige_divisor: PRESTIGE_DIVISOR,
            debug_multiplier: DEBUG_MULTIPLIER,
            base_entries_per_click: BASE_ENTRIES_PER_CLICK,
            combo: ComboConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON. Absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_constants() {
        let cfg = EngineConfig::default();
        assert!((cfg.cost_growth - 1.15).abs() < f64::EPSILON);
        assert!((cfg.debug_multiplier - DEBUG_MULTIPLIER).abs() < f64::EPSILON);
        assert_eq!(cfg.combo.time_window_ms, COMBO_TIME_WINDOW_MS);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = EngineConfig::from_json(r#"{ "debug_multiplier": 10.0, "combo": { "step": 0.5 } }"#)
            .unwrap();
        assert!((cfg.debug_multiplier - 10.0).abs() < f64::EPSILON);
        assert!((cfg.combo.step - 0.5).abs() < f64::EPSILON);
        assert!((cfg.combo.max_multiplier - COMBO_MAX_MULTIPLIER).abs() < f64::EPSILON);
        assert!((cfg.prestige_divisor - PRESTIGE_DIVISOR).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(EngineConfig::from_json("{ not json").is_err());
    }
}
