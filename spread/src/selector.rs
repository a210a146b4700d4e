//! Seam for pluggable strike-selection policies.

use chrono::NaiveDate;

use crate::chain::ChainMap;
use crate::error::SelectionError;
use crate::leg::LegState;

/// Write handle given to a policy for one validation cycle.
///
/// Each [`LegWriter::update_leg`] call fills the next leg, starting at 0.
pub struct LegWriter<'a> {
    legs: &'a mut [LegState],
    next: usize,
}

impl<'a> LegWriter<'a> {
    pub(crate) fn new(legs: &'a mut [LegState]) -> Self {
        Self { legs, next: 0 }
    }

    /// Record the selection for the next leg.
    ///
    /// # Panics
    /// When called more times than there are configured legs. That is a bug
    /// in the policy, not a market condition.
    pub fn update_leg(&mut self, strike: f64, expiry: NaiveDate, symbol: &str) {
        let leg_count = self.legs.len();
        let Some(leg) = self.legs.get_mut(self.next) else {
            panic!(
                "strike selection wrote leg {} but only {} legs are configured",
                self.next, leg_count
            );
        };
        leg.update(strike, expiry, symbol);
        self.next += 1;
    }

    /// Number of legs written so far.
    pub fn written(&self) -> usize {
        self.next
    }

    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }
}

/// Chooses strikes for every leg of a spread.
///
/// Implementations must call [`LegWriter::update_leg`] exactly once per
/// configured leg, in leg order.
pub trait StrikeSelector {
    fn choose_strikes(
        &self,
        chains: &ChainMap,
        date: NaiveDate,
        price: f64,
        legs: &mut LegWriter<'_>,
    ) -> Result<(), SelectionError>;
}

impl<F> StrikeSelector for F
where
    F: Fn(&ChainMap, NaiveDate, f64, &mut LegWriter<'_>) -> Result<(), SelectionError>,
{
    fn choose_strikes(
        &self,
        chains: &ChainMap,
        date: NaiveDate,
        price: f64,
        legs: &mut LegWriter<'_>,
    ) -> Result<(), SelectionError> {
        self(chains, date, price, legs)
    }
}

/// Use a closure as a [`StrikeSelector`].
///
/// Passing the closure through here lets the compiler infer its argument
/// types from the expected signature.
pub fn from_fn<F>(f: F) -> F
where
    F: Fn(&ChainMap, NaiveDate, f64, &mut LegWriter<'_>) -> Result<(), SelectionError>,
{
    f
}
