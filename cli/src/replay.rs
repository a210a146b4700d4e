//! Tick replay: efficiency ratio over the underlying plus spread validation.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use market::indicator::{EfficiencyRatio, IndicatorResult, IndicatorValidity};
use market::types::Trade;
use spread::SpreadValidator;
use spread::chain::ChainMap;
use spread::config::SpreadConfig;
use spread::counters::ValidatorCounters;
use spread::factory::OptionFactory;
use spread::option::Instrument;
use spread::stability::{ElapsedStabilityTracker, ManualClock};

use crate::input::Tick;
use crate::policy::strangle_ladder;

/// Printed to stdout at the end of a replay.
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct ReplaySummary {
    pub ticks: usize,
    pub skipped_ticks: usize,
    pub validations: u64,
    pub validated: u64,
    pub initial_builds: u64,
    pub changed_builds: u64,
    pub transient_failures: u64,
    pub not_found_failures: u64,
    pub stale_completions: u64,
    pub efficiency_ratio: Option<f64>,
    pub last_validated: Vec<String>,
}

pub async fn replay<F: OptionFactory>(
    underlying: &str,
    cfg: &SpreadConfig,
    chains: Arc<ChainMap>,
    factory: F,
    ticks: &[Tick],
) -> ReplaySummary {
    let clock = ManualClock::new(ticks.first().map_or(0, |t| t.ts_ms));
    let counters = ValidatorCounters::default();
    let mut validator = SpreadValidator::new(
        Arc::new(Instrument::new(underlying)),
        chains,
        factory,
        ElapsedStabilityTracker::new(clock.clone()),
    )
    .with_counters(counters.clone());
    validator.set_size(cfg.leg_count);

    let policy = strangle_ladder(cfg.min_expiry_days);
    let mut er = EfficiencyRatio::windowed(cfg.indicator_window_ms);
    let mut summary = ReplaySummary::default();

    for tick in ticks {
        summary.ticks += 1;

        let Some(price) = tick.mid() else {
            warn!(target: "replay", ts_ms = tick.ts_ms, "tick has no usable price");
            summary.skipped_ticks += 1;
            continue;
        };
        let trend = match er.on_item(Trade::new(tick.ts_ms, price)) {
            Ok(r) => r,
            Err(e) => {
                warn!(target: "replay", error = %e, "tick skipped");
                summary.skipped_ticks += 1;
                continue;
            }
        };
        debug!(
            target: "replay",
            ts_ms = tick.ts_ms,
            price,
            ratio = trend.ratio,
            running_sum = trend.running_sum,
            warming = trend.validity() == IndicatorValidity::Warming,
            "efficiency ratio"
        );

        clock.set(tick.ts_ms);
        // let spawned option loads land before this tick is evaluated
        tokio::task::yield_now().await;

        match validator.validate_spread(tick.date, price, cfg.stability_duration(), &policy) {
            Ok(true) => {
                let mut symbols = Vec::with_capacity(validator.leg_count());
                validator.validated_options(|o| {
                    symbols.push(o.map_or_else(String::new, |o| o.symbol.clone()));
                });
                info!(target: "replay", ts_ms = tick.ts_ms, legs = %symbols.join(","), "spread validated");
                summary.last_validated = symbols;
            }
            Ok(false) => {}
            Err(e) if e.is_transient() => debug!(target: "replay", error = %e, "selection retried next tick"),
            Err(e) => debug!(target: "replay", error = %e, "selection failed"),
        }
    }

    // give outstanding loads a last chance so the counters are complete
    tokio::time::sleep(Duration::from_millis(1)).await;
    validator.poll_completions();

    let result = er.result();
    summary.efficiency_ratio = (result.validity() == IndicatorValidity::Valid).then_some(result.ratio);
    summary.validations = ValidatorCounters::get(&counters.validations);
    summary.validated = ValidatorCounters::get(&counters.validated);
    summary.initial_builds = ValidatorCounters::get(&counters.initial_builds);
    summary.changed_builds = ValidatorCounters::get(&counters.changed_builds);
    summary.transient_failures = ValidatorCounters::get(&counters.transient_failures);
    summary.not_found_failures = ValidatorCounters::get(&counters.not_found_failures);
    summary.stale_completions = ValidatorCounters::get(&counters.stale_completions);
    summary
}
