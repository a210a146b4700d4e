//! Replay inputs.

use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;

use market::types::Quote;
use spread::chain::{ChainMap, ExpiryChain};

/// One underlying observation: either a price or a bid/ask pair.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Tick {
    pub ts_ms: u64,
    pub date: NaiveDate,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub bid: Option<f64>,
    #[serde(default)]
    pub ask: Option<f64>,
}

impl Tick {
    /// Explicit price if given, else the quote mid-point.
    pub fn mid(&self) -> Option<f64> {
        self.price.or_else(|| {
            Quote {
                ts_ms: self.ts_ms,
                bid: self.bid?,
                ask: self.ask?,
            }
            .mid()
        })
    }
}

/// JSON lines; blank lines and `#` comments are skipped.
pub fn parse_ticks(text: &str) -> anyhow::Result<Vec<Tick>> {
    text.lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| serde_json::from_str(line).with_context(|| format!("tick on line {n}")))
        .collect()
}

pub fn parse_chains(text: &str) -> anyhow::Result<ChainMap> {
    let chains: Vec<ExpiryChain> = serde_json::from_str(text).context("option chains")?;
    Ok(chains.into_iter().collect())
}

pub fn load_ticks(path: &Path) -> anyhow::Result<Vec<Tick>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_ticks(&text)
}

pub fn load_chains(path: &Path) -> anyhow::Result<ChainMap> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_chains(&text)
}
