/// Anything that can live inside a time-bounded [`crate::Window`].
pub trait Timestamped {
    fn ts_ms(&self) -> u64;
}

/// A single print on the underlying.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trade {
    pub ts_ms: u64,
    pub price: f64,
}

impl Trade {
    pub fn new(ts_ms: u64, price: f64) -> Self {
        Self { ts_ms, price }
    }
}

impl Timestamped for Trade {
    fn ts_ms(&self) -> u64 {
        self.ts_ms
    }
}

/// Top-of-book quote on the underlying.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quote {
    pub ts_ms: u64,
    pub bid: f64,
    pub ask: f64,
}

impl Quote {
    /// Mid-point price, or `None` when either side is missing or crossed.
    pub fn mid(&self) -> Option<f64> {
        if self.bid <= 0.0 || self.ask <= 0.0 || self.bid > self.ask {
            return None;
        }
        Some((self.bid + self.ask) / 2.0)
    }
}

impl Timestamped for Quote {
    fn ts_ms(&self) -> u64 {
        self.ts_ms
    }
}
