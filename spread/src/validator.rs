//! Per-underlying spread validation.
//!
//! Every tick the validator:
//!   1. Applies option constructions delivered since the last tick.
//!   2. Runs the strike-selection policy, which rewrites the legs in order.
//!   3. Decides whether the legs must be (re)built:
//!        • tracker inactive            → build ("initial build")
//!        • tracker active, any changed → reset tracker, rebuild every leg
//!        • otherwise                   → keep the current build
//!   4. On build, configures the tracker's leg count and requests one option
//!      per leg from the factory.
//!   5. Asks the tracker whether the build has been stable for `duration`.
//!
//! A change to any leg resets and rebuilds all legs, not just the changed
//! ones.
//!
//! Not thread-safe: one instance per underlying, driven from one task.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{instrument, warn};

use crate::chain::ChainMap;
use crate::counters::ValidatorCounters;
use crate::error::{SelectionError, SpreadError};
use crate::events::{BuildReason, LegSnapshot, SpreadEvent, SpreadEventSink, TracingSink};
use crate::factory::{Completion, OptionCompletion, OptionFactory};
use crate::leg::LegState;
use crate::option::{Instrument, OptionHandle};
use crate::selector::{LegWriter, StrikeSelector};
use crate::stability::StabilityTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorState {
    /// No build since construction or the last reset.
    Idle,
    /// Legs have been built and the tracker is watching them.
    Active,
}

pub struct SpreadValidator<F: OptionFactory, T: StabilityTracker> {
    underlying: Arc<Instrument>,
    chains: Arc<ChainMap>,
    factory: F,
    tracker: T,
    legs: Vec<LegState>,

    /// Bumped on every build and reset; completions from older builds are dropped.
    generation: u64,
    completions_tx: UnboundedSender<Completion>,
    completions_rx: UnboundedReceiver<Completion>,

    sink: Arc<dyn SpreadEventSink>,
    counters: ValidatorCounters,
}

impl<F: OptionFactory, T: StabilityTracker> SpreadValidator<F, T> {
    /// Create a validator with no legs; call [`Self::set_size`] before validating.
    pub fn new(underlying: Arc<Instrument>, chains: Arc<ChainMap>, factory: F, tracker: T) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            underlying,
            chains,
            factory,
            tracker,
            legs: Vec::new(),
            generation: 0,
            completions_tx,
            completions_rx,
            sink: Arc::new(TracingSink),
            counters: ValidatorCounters::default(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn SpreadEventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Share counters with other validators or a reporter.
    pub fn with_counters(mut self, counters: ValidatorCounters) -> Self {
        self.counters = counters;
        self
    }

    /// Resize leg storage to exactly `count` legs.
    ///
    /// New legs start empty. If the tracker is active with a different leg
    /// count it is reset, so the next cycle performs an initial build.
    pub fn set_size(&mut self, count: usize) {
        if count == self.legs.len() {
            return;
        }
        self.legs.resize_with(count, LegState::default);

        if self.tracker.is_active() {
            self.tracker.reset_options();
            self.generation += 1;
        }
    }

    /// Run one validation cycle.
    ///
    /// Returns `Ok(true)` when the current combination is built and has been
    /// stable for `duration`.
    ///
    /// # Panics
    /// If the policy writes more legs than configured.
    #[instrument(
        level = "debug",
        target = "spread",
        skip_all,
        fields(underlying = %self.underlying.name, %date, price = price)
    )]
    pub fn validate_spread<S>(
        &mut self,
        date: NaiveDate,
        price: f64,
        duration: Duration,
        choose_strikes: &S,
    ) -> Result<bool, SpreadError>
    where
        S: StrikeSelector + ?Sized,
    {
        ValidatorCounters::bump(&self.counters.validations);
        self.poll_completions();

        self.select(date, price, choose_strikes)?;

        if let Some(reason) = self.build_reason() {
            if reason == BuildReason::SelectionChanged {
                self.tracker.reset_options();
            }
            self.build(reason, price);
        }
        // synchronous factories have already delivered
        self.poll_completions();

        let validated = self.tracker.is_active() && self.tracker.validate(duration);
        if validated {
            ValidatorCounters::bump(&self.counters.validated);
        }
        Ok(validated)
    }

    fn select<S>(&mut self, date: NaiveDate, price: f64, choose_strikes: &S) -> Result<(), SpreadError>
    where
        S: StrikeSelector + ?Sized,
    {
        let mut writer = LegWriter::new(&mut self.legs);
        let outcome = choose_strikes.choose_strikes(&self.chains, date, price, &mut writer);
        let written = writer.written();

        match outcome {
            Ok(()) => {
                if written < self.legs.len() {
                    warn!(
                        target: "spread",
                        underlying = %self.underlying.name,
                        written,
                        legs = self.legs.len(),
                        "strike selection left legs unwritten"
                    );
                }
                Ok(())
            }
            Err(err @ SelectionError::StrikeRangeExceeded { .. }) => {
                ValidatorCounters::bump(&self.counters.transient_failures);
                self.sink.emit(&SpreadEvent::StrikeRangeExceeded {
                    underlying: self.underlying.name.clone(),
                    price,
                    detail: err.to_string(),
                });
                Err(SpreadError::TransientSelectionFailure(err))
            }
            Err(SelectionError::NoStrike { reason }) => {
                ValidatorCounters::bump(&self.counters.not_found_failures);
                self.sink.emit(&SpreadEvent::SelectionNotFound {
                    underlying: self.underlying.name.clone(),
                    price,
                    date,
                    reason: reason.clone(),
                });
                Err(SpreadError::SelectionNotFound {
                    underlying: self.underlying.name.clone(),
                    price,
                    date,
                    reason,
                })
            }
        }
    }

    fn build_reason(&self) -> Option<BuildReason> {
        if !self.tracker.is_active() {
            Some(BuildReason::Initial)
        } else if self.legs.iter().any(LegState::changed) {
            Some(BuildReason::SelectionChanged)
        } else {
            None
        }
    }

    fn build(&mut self, reason: BuildReason, price: f64) {
        self.generation += 1;
        let generation = self.generation;

        match reason {
            BuildReason::Initial => ValidatorCounters::bump(&self.counters.initial_builds),
            BuildReason::SelectionChanged => ValidatorCounters::bump(&self.counters.changed_builds),
        }
        self.sink.emit(&SpreadEvent::Rebuild {
            underlying: self.underlying.name.clone(),
            reason,
            price,
            legs: self.legs.iter().map(LegSnapshot::from).collect(),
        });

        self.tracker.set_leg_count(self.legs.len());

        for (ix, leg) in self.legs.iter_mut().enumerate() {
            leg.reset_changed();
            leg.set_option(None);

            let on_built = OptionCompletion::new(ix, generation, self.completions_tx.clone());
            self.factory.construct(leg.symbol(), &self.underlying, on_built);
            ValidatorCounters::bump(&self.counters.factory_calls);
        }
    }

    /// Apply options delivered by the factory since the last call.
    ///
    /// Each built option is stored in its leg and registered with the
    /// tracker. A failed construction marks its leg changed, so the next
    /// cycle rebuilds the spread. Returns how many options were applied.
    pub fn poll_completions(&mut self) -> usize {
        let mut applied = 0;

        while let Ok(done) = self.completions_rx.try_recv() {
            let current = done.generation == self.generation;
            let Some(leg) = self.legs.get_mut(done.leg).filter(|_| current) else {
                ValidatorCounters::bump(&self.counters.stale_completions);
                self.sink.emit(&SpreadEvent::StaleCompletion {
                    underlying: self.underlying.name.clone(),
                    leg: done.leg,
                    generation: done.generation,
                });
                continue;
            };

            match done.outcome {
                Ok(option) => {
                    self.tracker.set_watch(done.leg, Arc::downgrade(&option));
                    leg.set_option(Some(option));
                    ValidatorCounters::bump(&self.counters.options_resolved);
                    self.sink.emit(&SpreadEvent::OptionResolved {
                        underlying: self.underlying.name.clone(),
                        leg: done.leg,
                        symbol: leg.symbol().to_owned(),
                    });
                    applied += 1;
                }
                Err(error) => {
                    leg.mark_changed();
                    ValidatorCounters::bump(&self.counters.construction_failures);
                    self.sink.emit(&SpreadEvent::OptionFailed {
                        underlying: self.underlying.name.clone(),
                        leg: done.leg,
                        symbol: leg.symbol().to_owned(),
                        error,
                    });
                }
            }
        }

        applied
    }

    /// Hand each leg's option to `callback`, in leg order.
    ///
    /// # Panics
    /// If nothing has been built since the last reset.
    pub fn validated_options<C>(&self, mut callback: C)
    where
        C: FnMut(Option<&OptionHandle>),
    {
        assert!(
            self.tracker.is_active(),
            "validated_options called for {} with no active build",
            self.underlying.name
        );
        for leg in &self.legs {
            callback(leg.option());
        }
    }

    /// Back to Idle: reset the tracker, forget selections and pending builds.
    /// The leg count is kept.
    pub fn clear_validation(&mut self) {
        self.tracker.reset_options();
        self.generation += 1;
        for leg in &mut self.legs {
            leg.clear();
        }
        while self.completions_rx.try_recv().is_ok() {}
    }

    pub fn state(&self) -> ValidatorState {
        if self.tracker.is_active() {
            ValidatorState::Active
        } else {
            ValidatorState::Idle
        }
    }

    pub fn legs(&self) -> &[LegState] {
        &self.legs
    }

    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    pub fn underlying(&self) -> &Arc<Instrument> {
        &self.underlying
    }

    pub fn chains(&self) -> &ChainMap {
        &self.chains
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn counters(&self) -> &ValidatorCounters {
        &self.counters
    }
}

impl<F: OptionFactory, T: StabilityTracker> Drop for SpreadValidator<F, T> {
    fn drop(&mut self) {
        self.tracker.reset_options();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{Chain, ChainEntry};
    use crate::option::{OptionInstrument, OptionKind};
    use crate::selector;
    use crate::stability::{ElapsedStabilityTracker, ManualClock};
    use std::sync::Mutex;
    use tracing_test::traced_test;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    fn e1() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 19).unwrap()
    }

    fn chains() -> Arc<ChainMap> {
        let mut map = ChainMap::new();
        map.insert(
            e1(),
            Chain::new(
                [95.0, 100.0, 105.0]
                    .into_iter()
                    .map(|strike| ChainEntry {
                        strike,
                        call: Some(format!("XYZ C{strike}")),
                        put: Some(format!("XYZ P{strike}")),
                    })
                    .collect(),
            ),
        );
        Arc::new(map)
    }

    /// Builds synchronously and remembers what it was asked for.
    fn sync_factory(
        calls: Arc<Mutex<Vec<String>>>,
    ) -> impl Fn(&str, &Arc<Instrument>, OptionCompletion) {
        move |symbol: &str, underlying: &Arc<Instrument>, on_built: OptionCompletion| {
            calls.lock().unwrap().push(symbol.to_owned());
            on_built.complete(Arc::new(OptionInstrument {
                symbol: symbol.to_owned(),
                underlying: Arc::clone(underlying),
                strike: 0.0,
                expiry: e1(),
                kind: OptionKind::Call,
            }));
        }
    }

    fn validator(
        calls: Arc<Mutex<Vec<String>>>,
        clock: ManualClock,
    ) -> SpreadValidator<impl Fn(&str, &Arc<Instrument>, OptionCompletion), ElapsedStabilityTracker<ManualClock>>
    {
        let mut v = SpreadValidator::new(
            Arc::new(Instrument::new("XYZ")),
            chains(),
            sync_factory(calls),
            ElapsedStabilityTracker::new(clock),
        );
        v.set_size(2);
        v
    }

    /// Straddle-ish policy: put at or below, call at or above.
    fn around_price(
        chains: &ChainMap,
        date: NaiveDate,
        price: f64,
        legs: &mut LegWriter<'_>,
    ) -> Result<(), SelectionError> {
        let (expiry, chain) = chains.front_expiry(date, 7)?;
        let put = chain.at_or_below(price)?;
        let call = chain.at_or_above(price)?;
        legs.update_leg(put.strike, expiry, put.put.as_deref().unwrap_or_default());
        legs.update_leg(call.strike, expiry, call.call.as_deref().unwrap_or_default());
        Ok(())
    }

    #[test]
    fn sync_build_resolves_within_the_call_and_validates_after_duration() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let clock = ManualClock::new(0);
        let mut v = validator(calls.clone(), clock.clone());
        let policy = selector::from_fn(around_price);

        assert_eq!(v.state(), ValidatorState::Idle);
        let ok = v
            .validate_spread(today(), 101.0, Duration::from_secs(1), &policy)
            .unwrap();
        assert!(!ok);
        assert_eq!(v.state(), ValidatorState::Active);
        assert_eq!(*calls.lock().unwrap(), vec!["XYZ P100", "XYZ C105"]);
        assert!(v.legs().iter().all(|l| l.option().is_some()));

        clock.advance(Duration::from_secs(1));
        let ok = v
            .validate_spread(today(), 101.2, Duration::from_secs(1), &policy)
            .unwrap();
        assert!(ok);
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn range_exceeded_is_transient() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut v = validator(calls.clone(), ManualClock::new(0));

        let err = v
            .validate_spread(today(), 120.0, Duration::ZERO, &selector::from_fn(around_price))
            .unwrap_err();
        assert!(err.is_transient());
        assert_eq!(v.state(), ValidatorState::Idle);
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(ValidatorCounters::get(&v.counters().transient_failures), 1);
    }

    #[traced_test]
    #[test]
    fn no_strike_is_logged_with_context_and_propagated() {
        let mut v = validator(Arc::new(Mutex::new(Vec::new())), ManualClock::new(0));
        let late = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let err = v
            .validate_spread(late, 101.0, Duration::ZERO, &selector::from_fn(around_price))
            .unwrap_err();

        assert!(!err.is_transient());
        match &err {
            SpreadError::SelectionNotFound {
                underlying,
                price,
                date,
                ..
            } => {
                assert_eq!(underlying, "XYZ");
                assert_eq!(*price, 101.0);
                assert_eq!(*date, late);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(logs_contain("found no strike"));
        assert!(logs_contain("2024-01-15"));
    }

    #[test]
    #[should_panic(expected = "only 2 legs are configured")]
    fn policy_writing_too_many_legs_is_fatal() {
        let mut v = validator(Arc::new(Mutex::new(Vec::new())), ManualClock::new(0));
        let greedy = selector::from_fn(|_, _, _, legs| {
            for strike in [95.0, 100.0, 105.0] {
                legs.update_leg(strike, e1(), "XYZ");
            }
            Ok(())
        });
        let _ = v.validate_spread(today(), 100.0, Duration::ZERO, &greedy);
    }

    #[test]
    #[should_panic(expected = "no active build")]
    fn validated_options_while_idle_is_fatal() {
        let v = validator(Arc::new(Mutex::new(Vec::new())), ManualClock::new(0));
        v.validated_options(|_| {});
    }

    #[test]
    fn set_size_while_active_forces_initial_build() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut v = validator(calls.clone(), ManualClock::new(0));
        let policy = selector::from_fn(around_price);
        v.validate_spread(today(), 101.0, Duration::ZERO, &policy).unwrap();

        v.set_size(3);
        assert_eq!(v.leg_count(), 3);
        assert_eq!(v.state(), ValidatorState::Idle);

        v.set_size(3);
        v.set_size(0);
        assert_eq!(v.leg_count(), 0);
    }
}
