use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility.
#[derive(Clone, Default, Debug)]
pub struct ValidatorCounters {
    pub validations: Arc<AtomicU64>,
    pub validated: Arc<AtomicU64>,

    // builds
    pub initial_builds: Arc<AtomicU64>,
    pub changed_builds: Arc<AtomicU64>,
    pub factory_calls: Arc<AtomicU64>,
    pub options_resolved: Arc<AtomicU64>,
    pub construction_failures: Arc<AtomicU64>,
    pub stale_completions: Arc<AtomicU64>,

    // selection failures
    pub transient_failures: Arc<AtomicU64>,
    pub not_found_failures: Arc<AtomicU64>,
}

impl ValidatorCounters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}
