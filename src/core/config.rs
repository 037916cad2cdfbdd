//! Configuration - all simulation parameters tunable without recompilation

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Market data feed settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Execution protocol settings
    #[serde(default)]
    pub execution: ExecutionConfig,
}

/// Synthetic price feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Milliseconds between random-walk updates
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Each tick perturbs the mid by a uniform delta in ±tick_range
    #[serde(default = "default_tick_range")]
    pub tick_range: f64,

    /// Mid returned for instruments that were never registered
    #[serde(default = "default_fallback_mid")]
    pub fallback_mid: f64,
}

/// Execution engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Probability of a simulated transient failure per attempt
    #[serde(default = "default_glitch_probability")]
    pub glitch_probability: f64,

    /// Probability of a post-fill cancellation
    #[serde(default = "default_cancel_probability")]
    pub cancel_probability: f64,

    /// Candidate price = mid ± half_spread (BUY pays up)
    #[serde(default = "default_half_spread")]
    pub half_spread: f64,

    /// Fill chunk as a fraction of requested quantity, lower bound
    #[serde(default = "default_fill_fraction_min")]
    pub fill_fraction_min: f64,

    /// Fill chunk as a fraction of requested quantity, upper bound
    #[serde(default = "default_fill_fraction_max")]
    pub fill_fraction_max: f64,

    /// Backoff delay for attempt n is min(cap, base × 2^n)
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Upper bound on a single backoff delay
    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,
}

fn default_tick_interval_ms() -> u64 {
    300
}

fn default_tick_range() -> f64 {
    0.5
}

fn default_fallback_mid() -> f64 {
    100.0
}

fn default_glitch_probability() -> f64 {
    0.15
}

fn default_cancel_probability() -> f64 {
    0.10
}

fn default_half_spread() -> f64 {
    0.1
}

fn default_fill_fraction_min() -> f64 {
    0.25
}

fn default_fill_fraction_max() -> f64 {
    0.75
}

fn default_backoff_base_ms() -> u64 {
    100
}

fn default_backoff_cap_ms() -> u64 {
    2000
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            tick_range: default_tick_range(),
            fallback_mid: default_fallback_mid(),
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            glitch_probability: default_glitch_probability(),
            cancel_probability: default_cancel_probability(),
            half_spread: default_half_spread(),
            fill_fraction_min: default_fill_fraction_min(),
            fill_fraction_max: default_fill_fraction_max(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_cap_ms: default_backoff_cap_ms(),
        }
    }
}

impl Config {
    /// Load from a TOML file
    pub fn load(path: &Path) -> crate::core::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::core::Error::Config(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| crate::core::Error::Config(format!("Failed to parse config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.feed.tick_interval_ms, 300);
        assert_eq!(config.feed.fallback_mid, 100.0);
        assert_eq!(config.execution.glitch_probability, 0.15);
        assert_eq!(config.execution.backoff_cap_ms, 2000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [execution]
            glitch_probability = 0.0
            cancel_probability = 1.0
            "#,
        )
        .unwrap();
        assert_eq!(config.execution.glitch_probability, 0.0);
        assert_eq!(config.execution.cancel_probability, 1.0);
        assert_eq!(config.execution.half_spread, 0.1);
        assert_eq!(config.feed.tick_interval_ms, 300);
    }
}
