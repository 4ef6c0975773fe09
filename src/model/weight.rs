use crate::util::floor_decimal;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of decimal places count reports print transfer weights with.
pub const DEFAULT_PRECISION: u32 = 5;

/// A transfer weight, truncated to a fixed precision so that it can be used
/// as a stack key. Two weights that print the same at that precision are
/// equal regardless of how they were computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Weight(Decimal);

impl Weight {
    pub const ONE: Weight = Weight(Decimal::ONE);

    pub fn new(value: Decimal, precision: u32) -> Self {
        Weight(floor_decimal(value, precision).normalize())
    }

    /// The key this weight maps to once the holder's surplus ratio applies.
    pub fn rescaled(self, ratio: Decimal, precision: u32) -> Self {
        Weight::new(self.0 * ratio, precision)
    }

    pub fn value(self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
