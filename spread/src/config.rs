use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpreadConfig {
    /// Number of legs in the spread.
    pub leg_count: usize,

    /// How long a built combination must stay quote-stable before it is
    /// reported as validated.
    pub stability_duration_ms: u64,

    /// Width of the efficiency-ratio window over underlying trades.
    pub indicator_window_ms: u64,

    /// Minimum days to expiry when picking the front expiry.
    pub min_expiry_days: i64,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            leg_count: 2,
            stability_duration_ms: 5_000,
            indicator_window_ms: 60_000,
            min_expiry_days: 7,
        }
    }
}

impl SpreadConfig {
    /// Defaults overridden by `SPREAD_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();

        if let Some(v) = lookup("SPREAD_LEG_COUNT") {
            cfg.leg_count = parse("SPREAD_LEG_COUNT", v)?;
        }
        if let Some(v) = lookup("SPREAD_STABILITY_MS") {
            cfg.stability_duration_ms = parse("SPREAD_STABILITY_MS", v)?;
        }
        if let Some(v) = lookup("SPREAD_INDICATOR_WINDOW_MS") {
            cfg.indicator_window_ms = parse("SPREAD_INDICATOR_WINDOW_MS", v)?;
        }
        if let Some(v) = lookup("SPREAD_MIN_EXPIRY_DAYS") {
            cfg.min_expiry_days = parse("SPREAD_MIN_EXPIRY_DAYS", v)?;
        }

        Ok(cfg)
    }

    pub fn stability_duration(&self) -> Duration {
        Duration::from_millis(self.stability_duration_ms)
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}
