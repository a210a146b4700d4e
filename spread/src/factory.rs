//! Option construction seam.
//!
//! The validator asks an [`OptionFactory`] for one option per leg and hands
//! it an [`OptionCompletion`]. The factory fires the completion exactly once,
//! either during the call or later from another task. Until then the leg's
//! option stays unset.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

use crate::option::{Instrument, OptionHandle, OptionInstrument};

/// Outcome of one construction, tagged with the build it belongs to.
#[derive(Debug)]
pub(crate) struct Completion {
    pub generation: u64,
    pub leg: usize,
    pub outcome: Result<OptionHandle, String>,
}

/// Single-fire continuation for one leg's option.
///
/// Reports exactly once: [`OptionCompletion::complete`] on success,
/// [`OptionCompletion::fail`] on failure. Dropping it unfired reports a
/// failure, so the validator always learns what happened to the leg.
#[must_use = "dropping a completion reports the leg as failed"]
pub struct OptionCompletion {
    leg: usize,
    generation: u64,
    tx: Option<UnboundedSender<Completion>>,
}

impl OptionCompletion {
    pub(crate) fn new(leg: usize, generation: u64, tx: UnboundedSender<Completion>) -> Self {
        Self {
            leg,
            generation,
            tx: Some(tx),
        }
    }

    /// Leg index this completion resolves.
    pub fn leg(&self) -> usize {
        self.leg
    }

    /// Deliver the constructed option.
    pub fn complete(mut self, option: OptionHandle) {
        self.send(Ok(option));
    }

    /// Report that the option could not be built. The validator rebuilds the
    /// spread on its next cycle.
    pub fn fail(mut self, error: impl fmt::Display) {
        self.send(Err(error.to_string()));
    }

    fn send(&mut self, outcome: Result<OptionHandle, String>) {
        let Some(tx) = self.tx.take() else {
            return;
        };
        // The validator may be gone already; nothing is waiting then.
        let _ = tx.send(Completion {
            generation: self.generation,
            leg: self.leg,
            outcome,
        });
    }
}

impl Drop for OptionCompletion {
    fn drop(&mut self) {
        self.send(Err("construction abandoned".to_owned()));
    }
}

impl fmt::Debug for OptionCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionCompletion")
            .field("leg", &self.leg)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Produces (or looks up) the option for a provider symbol.
pub trait OptionFactory {
    fn construct(&self, symbol: &str, underlying: &Arc<Instrument>, on_built: OptionCompletion);
}

impl<F> OptionFactory for F
where
    F: Fn(&str, &Arc<Instrument>, OptionCompletion),
{
    fn construct(&self, symbol: &str, underlying: &Arc<Instrument>, on_built: OptionCompletion) {
        self(symbol, underlying, on_built)
    }
}

/// Asynchronous source of option instruments (contract details request,
/// cache, ...).
#[async_trait]
pub trait OptionLoader: Send + Sync + 'static {
    async fn load(&self, symbol: &str, underlying: Arc<Instrument>) -> anyhow::Result<OptionInstrument>;
}

/// [`OptionFactory`] that runs an [`OptionLoader`] on a tokio runtime.
///
/// A failed load is logged and reported through the completion.
pub struct SpawningOptionFactory<L> {
    loader: Arc<L>,
    runtime: Handle,
}

impl<L: OptionLoader> SpawningOptionFactory<L> {
    pub fn new(loader: Arc<L>, runtime: Handle) -> Self {
        Self { loader, runtime }
    }

    /// Spawn onto the runtime the caller is running in.
    pub fn on_current_runtime(loader: Arc<L>) -> anyhow::Result<Self> {
        Ok(Self::new(loader, Handle::try_current()?))
    }
}

impl<L: OptionLoader> OptionFactory for SpawningOptionFactory<L> {
    fn construct(&self, symbol: &str, underlying: &Arc<Instrument>, on_built: OptionCompletion) {
        let loader = Arc::clone(&self.loader);
        let underlying = Arc::clone(underlying);
        let symbol = symbol.to_owned();

        self.runtime.spawn(async move {
            match loader.load(&symbol, underlying).await {
                Ok(option) => on_built.complete(Arc::new(option)),
                Err(e) => {
                    tracing::error!(
                        target: "spread",
                        %symbol,
                        leg = on_built.leg(),
                        error = %e,
                        "option construction failed"
                    );
                    on_built.fail(e);
                }
            }
        });
    }
}
