use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;

/// Base instrument the options are written on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub name: String,
}

impl Instrument {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OptionKind::Call => "C",
            OptionKind::Put => "P",
        };
        f.write_str(s)
    }
}

/// A constructed option contract.
///
/// Pricing and quote state belong to whoever built it; the validator only
/// needs identity.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionInstrument {
    /// Provider symbol the instrument was built from.
    pub symbol: String,
    pub underlying: Arc<Instrument>,
    pub strike: f64,
    pub expiry: NaiveDate,
    pub kind: OptionKind,
}

/// Owning handle to a constructed option. Legs hold the only strong
/// references; stability trackers watch through `Weak`.
pub type OptionHandle = Arc<OptionInstrument>;
