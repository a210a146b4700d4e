//! Incremental indicators over a time-bounded [`Window`].
//!
//! An indicator never rescans the window. The [`SlidingWindow`] engine hands
//! it each element exactly twice: once through [`WindowIndicator::add`] when
//! the element arrives and once through [`WindowIndicator::expire`] when it
//! falls out of the window. Per event the order is always:
//!
//! 1. `add` for the new element (if any),
//! 2. `expire` for every element now outside the window, oldest first,
//! 3. `post_update` exactly once.
//!
//! Dispatch is static: the engine is generic over the concrete indicator.

pub mod efficiency_ratio;

pub use efficiency_ratio::{EfficiencyRatio, EfficiencyRatioResult};

use crate::types::Timestamped;
use crate::window::{Window, WindowError};

/// Whether an indicator result is meaningful yet.
///
/// Warming results MUST NOT drive trading decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IndicatorValidity {
    #[default]
    Warming,

    Valid,
}

/// Trait implemented by all indicator result types.
pub trait IndicatorResult {
    fn validity(&self) -> IndicatorValidity;
}

/// Accumulator state of one indicator.
pub trait WindowIndicator {
    /// Element type held in the window.
    type Item: Timestamped;

    /// Snapshot produced after every event.
    type Output: IndicatorResult;

    fn add(&mut self, item: &Self::Item);

    fn expire(&mut self, item: &Self::Item);

    /// Recompute the derived value from the accumulated state.
    fn post_update(&mut self);

    fn result(&self) -> Self::Output;
}

/// Engine feeding a [`Window`] into a concrete [`WindowIndicator`].
#[derive(Debug, Clone)]
pub struct SlidingWindow<I: WindowIndicator> {
    window: Window<I::Item>,
    indicator: I,
}

impl<I: WindowIndicator> SlidingWindow<I> {
    pub fn new(width_ms: u64, indicator: I) -> Self {
        Self {
            window: Window::new(width_ms),
            indicator,
        }
    }

    /// Feed the next element of the stream.
    ///
    /// Out-of-order elements are rejected before anything is mutated.
    pub fn on_item(&mut self, item: I::Item) -> Result<I::Output, WindowError> {
        self.window.push(item)?;
        if let Some(latest) = self.window.latest() {
            self.indicator.add(latest);
        }
        Ok(self.expire_and_update())
    }

    /// Let time pass without a new element, expiring whatever fell out.
    pub fn advance(&mut self, now_ms: u64) -> Result<I::Output, WindowError> {
        self.window.advance_clock(now_ms)?;
        Ok(self.expire_and_update())
    }

    fn expire_and_update(&mut self) -> I::Output {
        while let Some(expired) = self.window.pop_expired() {
            self.indicator.expire(&expired);
        }
        self.indicator.post_update();
        self.indicator.result()
    }

    pub fn result(&self) -> I::Output {
        self.indicator.result()
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn window(&self) -> &Window<I::Item> {
        &self.window
    }
}
