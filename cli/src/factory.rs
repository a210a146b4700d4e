//! Option construction backed by the loaded chain map.

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use tracing::warn;

use spread::chain::ChainMap;
use spread::factory::{OptionCompletion, OptionFactory, OptionLoader};
use spread::option::{Instrument, OptionInstrument};

fn instrument(chains: &ChainMap, symbol: &str, underlying: Arc<Instrument>) -> Option<OptionInstrument> {
    let contract = chains.find_symbol(symbol)?;
    Some(OptionInstrument {
        symbol: symbol.to_owned(),
        underlying,
        strike: contract.strike,
        expiry: contract.expiry,
        kind: contract.kind,
    })
}

/// Resolves symbols synchronously, inside `construct`.
pub struct ChainFactory {
    chains: Arc<ChainMap>,
}

impl ChainFactory {
    pub fn new(chains: Arc<ChainMap>) -> Self {
        Self { chains }
    }
}

impl OptionFactory for ChainFactory {
    fn construct(&self, symbol: &str, underlying: &Arc<Instrument>, on_built: OptionCompletion) {
        match instrument(&self.chains, symbol, Arc::clone(underlying)) {
            Some(option) => on_built.complete(Arc::new(option)),
            None => {
                warn!(target: "replay", %symbol, leg = on_built.leg(), "symbol not in chain");
                on_built.fail(format!("{symbol} not in chain"));
            }
        }
    }
}

/// Resolves symbols after a simulated lookup delay.
pub struct ChainLoader {
    chains: Arc<ChainMap>,
    latency: Duration,
}

impl ChainLoader {
    pub fn new(chains: Arc<ChainMap>, latency: Duration) -> Self {
        Self { chains, latency }
    }
}

#[async_trait]
impl OptionLoader for ChainLoader {
    async fn load(&self, symbol: &str, underlying: Arc<Instrument>) -> anyhow::Result<OptionInstrument> {
        tokio::time::sleep(self.latency).await;
        instrument(&self.chains, symbol, underlying).ok_or_else(|| anyhow!("{symbol} not in chain"))
    }
}
