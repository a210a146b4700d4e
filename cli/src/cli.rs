use clap::Parser;
use std::path::PathBuf;

use spread::config::SpreadConfig;

#[derive(Debug, Parser)]
#[clap(name = "spread-replay", version)]
pub struct Cli {
    /// Underlying ticks, one JSON object per line: {"ts_ms", "price", "date"}
    #[clap(long, env = "SPREAD_TICKS")]
    pub ticks: PathBuf,

    /// Option chains as a JSON array of {"expiry", "strikes": [...]}
    #[clap(long, env = "SPREAD_CHAINS")]
    pub chains: PathBuf,

    /// Underlying name used in logs and errors
    #[clap(long, default_value = "XYZ")]
    pub underlying: String,

    /// Emit logs as JSON lines
    #[clap(long)]
    pub json_logs: bool,

    /// Resolve options on spawned tasks instead of inside the factory call
    #[clap(long)]
    pub deferred: bool,

    /// Simulated contract lookup latency for --deferred
    #[clap(long, default_value = "5")]
    pub lookup_latency_ms: u64,

    /// Overrides SPREAD_LEG_COUNT
    #[clap(long)]
    pub leg_count: Option<usize>,

    /// Overrides SPREAD_STABILITY_MS
    #[clap(long)]
    pub stability_ms: Option<u64>,

    /// Overrides SPREAD_INDICATOR_WINDOW_MS
    #[clap(long)]
    pub window_ms: Option<u64>,

    /// Overrides SPREAD_MIN_EXPIRY_DAYS
    #[clap(long)]
    pub min_expiry_days: Option<i64>,
}

impl Cli {
    /// Apply command-line overrides on top of the environment config.
    pub fn apply(&self, mut cfg: SpreadConfig) -> SpreadConfig {
        if let Some(v) = self.leg_count {
            cfg.leg_count = v;
        }
        if let Some(v) = self.stability_ms {
            cfg.stability_duration_ms = v;
        }
        if let Some(v) = self.window_ms {
            cfg.indicator_window_ms = v;
        }
        if let Some(v) = self.min_expiry_days {
            cfg.min_expiry_days = v;
        }
        cfg
    }
}
