//! Option chains for one underlying, keyed by expiry then strike.
//!
//! Read-only once built. Strike-selection policies use the lookup helpers
//! here so they raise the same [`SelectionError`]s.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::SelectionError;
use crate::option::OptionKind;

/// Contracts listed at one strike.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChainEntry {
    pub strike: f64,
    #[serde(default)]
    pub call: Option<String>,
    #[serde(default)]
    pub put: Option<String>,
}

impl ChainEntry {
    pub fn symbol(&self, kind: OptionKind) -> Option<&str> {
        match kind {
            OptionKind::Call => self.call.as_deref(),
            OptionKind::Put => self.put.as_deref(),
        }
    }
}

/// All strikes for a single expiry, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chain {
    entries: Vec<ChainEntry>,
}

impl Chain {
    /// Build from unsorted entries. Later duplicates of a strike win.
    pub fn new(entries: Vec<ChainEntry>) -> Self {
        let mut chain = Self::default();
        for entry in entries {
            chain.insert(entry);
        }
        chain
    }

    pub fn insert(&mut self, entry: ChainEntry) {
        match self
            .entries
            .binary_search_by(|e| e.strike.total_cmp(&entry.strike))
        {
            Ok(ix) => self.entries[ix] = entry,
            Err(ix) => self.entries.insert(ix, entry),
        }
    }

    pub fn entries(&self) -> &[ChainEntry] {
        &self.entries
    }

    /// Lowest and highest listed strike.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        Some((self.entries.first()?.strike, self.entries.last()?.strike))
    }

    /// Fails with `StrikeRangeExceeded` when `price` lies outside the listed strikes.
    pub fn check_in_range(&self, price: f64) -> Result<(), SelectionError> {
        let (lower, upper) = self
            .bounds()
            .ok_or_else(|| SelectionError::no_strike("chain has no strikes"))?;

        if price < lower || price > upper {
            return Err(SelectionError::StrikeRangeExceeded {
                price,
                lower,
                upper,
            });
        }
        Ok(())
    }

    /// Highest strike at or below `price`.
    pub fn at_or_below(&self, price: f64) -> Result<&ChainEntry, SelectionError> {
        self.check_in_range(price)?;
        self.entries
            .iter()
            .rev()
            .find(|e| e.strike <= price)
            .ok_or_else(|| SelectionError::no_strike(format!("no strike at or below {price}")))
    }

    /// Lowest strike at or above `price`.
    pub fn at_or_above(&self, price: f64) -> Result<&ChainEntry, SelectionError> {
        self.check_in_range(price)?;
        self.entries
            .iter()
            .find(|e| e.strike >= price)
            .ok_or_else(|| SelectionError::no_strike(format!("no strike at or above {price}")))
    }

    pub fn entry(&self, strike: f64) -> Option<&ChainEntry> {
        self.entries
            .binary_search_by(|e| e.strike.total_cmp(&strike))
            .ok()
            .map(|ix| &self.entries[ix])
    }
}

/// Serialized form of one expiry's chain.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpiryChain {
    pub expiry: NaiveDate,
    pub strikes: Vec<ChainEntry>,
}

/// Where a provider symbol sits in the chain map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContractRef {
    pub expiry: NaiveDate,
    pub strike: f64,
    pub kind: OptionKind,
}

/// Available contracts for one underlying.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainMap {
    chains: BTreeMap<NaiveDate, Chain>,
}

impl ChainMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, expiry: NaiveDate, chain: Chain) {
        self.chains.insert(expiry, chain);
    }

    pub fn get(&self, expiry: NaiveDate) -> Option<&Chain> {
        self.chains.get(&expiry)
    }

    pub fn expiries(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.chains.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Nearest expiry at least `min_days` after `today`.
    pub fn front_expiry(
        &self,
        today: NaiveDate,
        min_days: i64,
    ) -> Result<(NaiveDate, &Chain), SelectionError> {
        let earliest = today + chrono::Duration::days(min_days);
        self.chains
            .range(earliest..)
            .next()
            .map(|(expiry, chain)| (*expiry, chain))
            .ok_or_else(|| {
                SelectionError::no_strike(format!("no expiry on or after {earliest}"))
            })
    }

    /// Reverse lookup of a provider symbol.
    pub fn find_symbol(&self, symbol: &str) -> Option<ContractRef> {
        self.chains.iter().find_map(|(expiry, chain)| {
            chain.entries().iter().find_map(|e| {
                let kind = if e.call.as_deref() == Some(symbol) {
                    OptionKind::Call
                } else if e.put.as_deref() == Some(symbol) {
                    OptionKind::Put
                } else {
                    return None;
                };
                Some(ContractRef {
                    expiry: *expiry,
                    strike: e.strike,
                    kind,
                })
            })
        })
    }
}

impl FromIterator<ExpiryChain> for ChainMap {
    fn from_iter<I: IntoIterator<Item = ExpiryChain>>(iter: I) -> Self {
        let mut map = ChainMap::new();
        for ec in iter {
            map.insert(ec.expiry, Chain::new(ec.strikes));
        }
        map
    }
}
