use std::fmt;

use serde::{Deserialize, Serialize};

/// An amount of money in euro cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u32);

impl Price {
    pub const ZERO: Price = Price(0);

    pub fn from_cents(cents: u32) -> Self {
        Self(cents)
    }

    /// Converts a euro amount, rounding to the nearest cent. Negative and
    /// non-finite amounts become zero.
    pub fn from_euros(euros: f64) -> Self {
        if !euros.is_finite() || euros <= 0.0 {
            return Self::ZERO;
        }
        Self((euros * 100.0).round() as u32)
    }

    pub fn cents(self) -> u32 {
        self.0
    }

    pub fn euros(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Price of `minutes` of court time when `self` is the hourly rate,
    /// rounded half up to the cent.
    pub fn for_minutes(self, minutes: u16) -> Self {
        let cents = (u64::from(self.0) * u64::from(minutes) + 30) / 60;
        Self(cents as u32)
    }

    /// One of `parts` equal shares, rounded half up.
    pub fn share(self, parts: u32) -> Self {
        debug_assert!(parts > 0, "a price cannot be split into zero shares");
        let parts = parts.max(1);
        Self((self.0 + parts / 2) / parts)
    }
}

impl fmt::Display for Price {
    /// Renders as `"23,40 €"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{:02} €", self.0 / 100, self.0 % 100)
    }
}
