//! Quote-stability seam.
//!
//! A [`StabilityTracker`] decides whether the options currently watched for a
//! spread have been stable long enough to trade. The validator only drives
//! it; how "stable" is measured is up to the implementation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::option::OptionInstrument;

pub trait StabilityTracker {
    /// True once configured with a leg count and not reset since.
    fn is_active(&self) -> bool;

    /// Forget every watched option and go inactive.
    fn reset_options(&mut self);

    fn set_leg_count(&mut self, count: usize);

    /// Watch `option` for leg `index`. May be called long after
    /// `set_leg_count`, or never if construction failed.
    fn set_watch(&mut self, index: usize, option: Weak<OptionInstrument>);

    fn validate(&mut self, duration: Duration) -> bool;
}

/// Millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

/// Clock driven by hand, e.g. from replayed timestamps.
#[derive(Debug, Default, Clone)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn new(now_ms: u64) -> Self {
        Self(Arc::new(AtomicU64::new(now_ms)))
    }

    pub fn set(&self, now_ms: u64) {
        self.0.store(now_ms, Ordering::Relaxed);
    }

    pub fn advance(&self, by: Duration) {
        self.0.fetch_add(by.as_millis() as u64, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Debounce on elapsed time only.
///
/// Validates once every leg has a live watch and `duration` has passed since
/// the watch set became complete. Any new watch restarts the timer.
#[derive(Debug)]
pub struct ElapsedStabilityTracker<C = SystemClock> {
    clock: C,
    active: bool,
    watches: Vec<Option<Weak<OptionInstrument>>>,
    complete_since_ms: Option<u64>,
}

impl<C: Clock> ElapsedStabilityTracker<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            active: false,
            watches: Vec::new(),
            complete_since_ms: None,
        }
    }

    fn all_watched(&self) -> bool {
        self.watches
            .iter()
            .all(|w| w.as_ref().is_some_and(|w| w.strong_count() > 0))
    }

    pub fn leg_count(&self) -> usize {
        self.watches.len()
    }
}

impl Default for ElapsedStabilityTracker<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> StabilityTracker for ElapsedStabilityTracker<C> {
    fn is_active(&self) -> bool {
        self.active
    }

    fn reset_options(&mut self) {
        self.active = false;
        self.watches.clear();
        self.complete_since_ms = None;
    }

    fn set_leg_count(&mut self, count: usize) {
        self.active = true;
        self.watches.clear();
        self.watches.resize(count, None);
        self.complete_since_ms = None;
    }

    fn set_watch(&mut self, index: usize, option: Weak<OptionInstrument>) {
        let Some(slot) = self.watches.get_mut(index) else {
            tracing::warn!(target: "spread", index, legs = self.watches.len(), "watch for unknown leg ignored");
            return;
        };
        *slot = Some(option);
        self.complete_since_ms = self.all_watched().then(|| self.clock.now_ms());
    }

    fn validate(&mut self, duration: Duration) -> bool {
        if !self.active || !self.all_watched() {
            self.complete_since_ms = None;
            return false;
        }

        let now_ms = self.clock.now_ms();
        let since_ms = *self.complete_since_ms.get_or_insert(now_ms);
        now_ms.saturating_sub(since_ms) >= duration.as_millis() as u64
    }
}
