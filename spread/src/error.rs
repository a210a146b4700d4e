use chrono::NaiveDate;
use thiserror::Error;

/// Failure raised by a strike-selection policy.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SelectionError {
    /// Price is outside the strikes listed for the expiry. Transient: retry
    /// on a later tick.
    #[error("strike range exceeded: price {price} outside [{lower}, {upper}]")]
    StrikeRangeExceeded { price: f64, lower: f64, upper: f64 },

    #[error("no strike: {reason}")]
    NoStrike { reason: String },
}

impl SelectionError {
    pub fn no_strike(reason: impl Into<String>) -> Self {
        Self::NoStrike {
            reason: reason.into(),
        }
    }
}

/// Failure returned by [`crate::validator::SpreadValidator::validate_spread`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpreadError {
    #[error("transient selection failure: {0}")]
    TransientSelectionFailure(SelectionError),

    #[error("{underlying} found no strike for mid-point={price}, today={date} [{reason}]")]
    SelectionNotFound {
        underlying: String,
        price: f64,
        date: NaiveDate,
        reason: String,
    },
}

impl SpreadError {
    /// True when the caller should simply retry on the next tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, SpreadError::TransientSelectionFailure(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}
