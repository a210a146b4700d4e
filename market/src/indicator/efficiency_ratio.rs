//! Efficiency Ratio
//!
//! Net directional movement over total absolute movement inside the window:
//!
//! ```text
//! ratio = (last_add - last_expire) / running_sum
//! ```
//!
//! Near +1 / -1 under a clean one-directional move, near 0 when the window
//! chops back and forth.
//!
//! ## Incremental approximation
//! `running_sum` is the moving total of `|p[i] - p[i-1]|`. On expiry the
//! removed step is measured against `last_expire` (the previously expired
//! price, primed with the first price ever added), and `last_expire` then
//! moves to the expired price. This is O(1) per event and is not the exact
//! sum over the remaining window: the expired element is one step behind the
//! oldest retained element.

use super::{IndicatorResult, IndicatorValidity, SlidingWindow, WindowIndicator};
use crate::types::Trade;

/// Efficiency ratio snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EfficiencyRatioResult {
    /// Trend efficiency, usually within [-1, 1].
    pub ratio: f64,
    /// Sum of absolute successive differences currently attributed to the window.
    pub running_sum: f64,
    /// Lifetime sum of absolute successive differences (diagnostic only).
    pub total: f64,
    pub validity: IndicatorValidity,
}

impl IndicatorResult for EfficiencyRatioResult {
    fn validity(&self) -> IndicatorValidity {
        self.validity
    }
}

/// Efficiency ratio accumulator over [`Trade`] prices.
#[derive(Clone, Debug, Default)]
pub struct EfficiencyRatio {
    last_add: Option<f64>,
    last_expire: f64,
    running_sum: f64,
    total: f64,
    ratio: f64,
    validity: IndicatorValidity,
}

impl EfficiencyRatio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Efficiency ratio over a window `width_ms` wide.
    pub fn windowed(width_ms: u64) -> SlidingWindow<Self> {
        SlidingWindow::new(width_ms, Self::new())
    }

    pub fn last_add(&self) -> Option<f64> {
        self.last_add
    }

    pub fn last_expire(&self) -> f64 {
        self.last_expire
    }

    pub fn running_sum(&self) -> f64 {
        self.running_sum
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }
}

impl WindowIndicator for EfficiencyRatio {
    type Item = Trade;
    type Output = EfficiencyRatioResult;

    fn add(&mut self, trade: &Trade) {
        let price = trade.price;
        match self.last_add {
            Some(prev) => {
                let diff = (price - prev).abs();
                self.running_sum += diff;
                self.total += diff;
            }
            // nothing has expired yet; measure the first expiry from here
            None => self.last_expire = price,
        }
        self.last_add = Some(price);
    }

    fn expire(&mut self, trade: &Trade) {
        let price = trade.price;
        self.running_sum -= (price - self.last_expire).abs();
        self.last_expire = price;
    }

    fn post_update(&mut self) {
        if self.running_sum != 0.0 {
            let last_add = self.last_add.unwrap_or(self.last_expire);
            self.ratio = (last_add - self.last_expire) / self.running_sum;
            self.validity = IndicatorValidity::Valid;
        }
    }

    fn result(&self) -> EfficiencyRatioResult {
        EfficiencyRatioResult {
            ratio: self.ratio,
            running_sum: self.running_sum,
            total: self.total,
            validity: self.validity,
        }
    }
}
