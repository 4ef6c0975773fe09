use super::weight::Weight;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// One inbound transfer recorded against a candidate. `source` is `None`
/// for first-preference votes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferEntry {
    source: Option<String>,
    weight: Weight,
    vote_count: Decimal,
}

impl TransferEntry {
    pub fn new(source: Option<String>, weight: Weight, vote_count: Decimal) -> Self {
        TransferEntry {
            source,
            weight,
            vote_count,
        }
    }

    pub fn first_preference(vote_count: Decimal) -> Self {
        TransferEntry::new(None, Weight::ONE, vote_count)
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn weight(&self) -> Weight {
        self.weight
    }

    pub fn vote_count(&self) -> Decimal {
        self.vote_count
    }

    /// Vote count times weight.
    pub fn value(&self) -> Decimal {
        self.vote_count * self.weight.value()
    }
}

impl fmt::Display for TransferEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x {} = {} from {}",
            self.vote_count,
            self.weight,
            self.value(),
            self.source.as_deref().unwrap_or("first preferences")
        )
    }
}
