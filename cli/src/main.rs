pub mod cli;
pub mod factory;
pub mod input;
pub mod policy;
pub mod replay;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{Instrument, info};

use cli::Cli;
use common::logger::{LogFormat, TraceId, child_span, init_logger, root_span};
use factory::{ChainFactory, ChainLoader};
use spread::config::SpreadConfig;
use spread::factory::SpawningOptionFactory;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    init_logger("spread-replay", format);

    let cfg = cli.apply(SpreadConfig::from_env()?);
    let root = root_span("replay", &TraceId::new());

    let (ticks, chains) = root.in_scope(|| {
        child_span("load").in_scope(|| -> anyhow::Result<_> {
            let ticks = input::load_ticks(&cli.ticks)?;
            let chains = Arc::new(input::load_chains(&cli.chains)?);
            info!(ticks = ticks.len(), expiries = chains.len(), "inputs loaded");
            Ok((ticks, chains))
        })
    })?;

    let run = async {
        info!(underlying = %cli.underlying, ?cfg, deferred = cli.deferred, "replay started");
        if cli.deferred {
            let loader = Arc::new(ChainLoader::new(
                Arc::clone(&chains),
                Duration::from_millis(cli.lookup_latency_ms),
            ));
            let factory = SpawningOptionFactory::on_current_runtime(loader)?;
            Ok::<_, anyhow::Error>(replay::replay(&cli.underlying, &cfg, chains, factory, &ticks).await)
        } else {
            let factory = ChainFactory::new(Arc::clone(&chains));
            Ok(replay::replay(&cli.underlying, &cfg, chains, factory, &ticks).await)
        }
    };
    let summary = run.instrument(root).await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
