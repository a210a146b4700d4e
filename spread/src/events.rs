//! Structured events emitted by the validator.
//!
//! The validation path never formats output itself; it hands a
//! [`SpreadEvent`] to the injected [`SpreadEventSink`].

use std::fmt;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::leg::LegState;

/// Why the legs were (re)built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildReason {
    /// Nothing has been built since the last reset.
    Initial,
    /// At least one leg's selection changed.
    SelectionChanged,
}

impl fmt::Display for BuildReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildReason::Initial => "initial build",
            BuildReason::SelectionChanged => "selection changed",
        };
        f.write_str(s)
    }
}

/// Selection of one leg at the time of an event.
#[derive(Debug, Clone, PartialEq)]
pub struct LegSnapshot {
    pub strike: f64,
    pub expiry: Option<NaiveDate>,
    pub symbol: String,
}

impl From<&LegState> for LegSnapshot {
    fn from(leg: &LegState) -> Self {
        Self {
            strike: leg.strike(),
            expiry: leg.expiry(),
            symbol: leg.symbol().to_owned(),
        }
    }
}

impl fmt::Display for LegSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expiry {
            Some(expiry) => write!(f, "strike={}@{}", self.strike, expiry),
            None => write!(f, "strike={}@-", self.strike),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpreadEvent {
    Rebuild {
        underlying: String,
        reason: BuildReason,
        price: f64,
        legs: Vec<LegSnapshot>,
    },
    StrikeRangeExceeded {
        underlying: String,
        price: f64,
        detail: String,
    },
    SelectionNotFound {
        underlying: String,
        price: f64,
        date: NaiveDate,
        reason: String,
    },
    OptionResolved {
        underlying: String,
        leg: usize,
        symbol: String,
    },
    OptionFailed {
        underlying: String,
        leg: usize,
        symbol: String,
        error: String,
    },
    StaleCompletion {
        underlying: String,
        leg: usize,
        generation: u64,
    },
}

pub trait SpreadEventSink: Send + Sync {
    fn emit(&self, event: &SpreadEvent);
}

/// Default sink: one tracing record per event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl SpreadEventSink for TracingSink {
    fn emit(&self, event: &SpreadEvent) {
        match event {
            SpreadEvent::Rebuild {
                underlying,
                reason,
                price,
                legs,
            } => {
                let combo = legs
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                info!(
                    target: "spread",
                    %underlying,
                    %reason,
                    legs = legs.len(),
                    price,
                    %combo,
                    "building spread legs"
                );
            }
            SpreadEvent::StrikeRangeExceeded {
                underlying,
                price,
                detail,
            } => {
                debug!(target: "spread", %underlying, price, %detail, "price not yet within strike range");
            }
            SpreadEvent::SelectionNotFound {
                underlying,
                price,
                date,
                reason,
            } => {
                warn!(
                    target: "spread",
                    %underlying,
                    mid_point = price,
                    today = %date,
                    %reason,
                    "found no strike"
                );
            }
            SpreadEvent::OptionResolved {
                underlying,
                leg,
                symbol,
            } => {
                debug!(target: "spread", %underlying, leg, %symbol, "option resolved");
            }
            SpreadEvent::OptionFailed {
                underlying,
                leg,
                symbol,
                error,
            } => {
                warn!(target: "spread", %underlying, leg, %symbol, %error, "option not built, spread will be rebuilt");
            }
            SpreadEvent::StaleCompletion {
                underlying,
                leg,
                generation,
            } => {
                debug!(target: "spread", %underlying, leg, generation, "discarding option from superseded build");
            }
        }
    }
}
