//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The admin console computes line totals in JavaScript:                  │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  Summing thousands of such bills for a yearly report drifts.            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents internally, decimals on the wire           │
//! │    JSON 10.5  ──► Money(1050) ──► SUM in i64 ──► JSON 10.5              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockbook_core::money::Money;
//!
//! let price = Money::from_cents(1099); // 10.99
//! let line_total = price.multiply_quantity(3);
//! assert_eq!(line_total.cents(), 3297);
//!
//! let parsed: Money = serde_json::from_str("10.99").unwrap();
//! assert_eq!(parsed, price);
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

/// Largest magnitude (in major units) accepted from the wire.
///
/// Keeps `major * 100` exactly representable in an f64 mantissa.
const MAX_WIRE_MAJOR: f64 = 90_000_000_000_000.0;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents/paise).
///
/// ## Design Decisions
/// - **i64 (signed)**: sums and differences can go negative in reports
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Wire format**: a JSON number in major units, rounded to the cent on input
/// - **Saturating arithmetic**: report sums clamp at the i64 bounds instead of wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount in major units, rounding to the nearest cent.
    ///
    /// Returns `None` for NaN, infinities and amounts too large to store.
    ///
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(10.5).unwrap().cents(), 1050);
    /// assert_eq!(Money::from_major(0.125).unwrap().cents(), 13);
    /// assert!(Money::from_major(f64::NAN).is_none());
    /// ```
    pub fn from_major(amount: f64) -> Option<Self> {
        if !amount.is_finite() || amount.abs() > MAX_WIRE_MAJOR {
            return None;
        }
        Some(Money((amount * 100.0).round() as i64))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value in major units (for serialization and display only).
    #[inline]
    pub fn as_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Rounds up to the next multiple of `step`.
    ///
    /// Used for the dashboard's "next revenue target". Zero stays zero.
    ///
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// let step = Money::from_cents(5_000_000);
    /// assert_eq!(Money::from_cents(5_000_001).ceil_to(step).cents(), 10_000_000);
    /// assert_eq!(Money::from_cents(5_000_000).ceil_to(step).cents(), 5_000_000);
    /// ```
    pub fn ceil_to(&self, step: Money) -> Money {
        if step.0 <= 0 || self.0 <= 0 {
            return Money::zero();
        }
        let steps = self.0 / step.0 + i64::from(self.0 % step.0 != 0);
        Money(steps.saturating_mul(step.0))
    }

    /// Number of whole `step`s contained in this amount.
    pub fn whole_steps(&self, step: Money) -> i64 {
        if step.0 <= 0 || self.0 <= 0 {
            return 0;
        }
        self.0 / step.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows two decimals without a currency symbol.
///
/// ## Note
/// The console formats currency itself; this is for logs and errors.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major())
    }
}

/// The inventory form posts its fields as strings, so `"10.5"` is read the
/// same as `10.5`.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireAmount {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = match WireAmount::deserialize(deserializer)? {
            WireAmount::Number(n) => n,
            WireAmount::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                serde::de::Error::custom(format!("'{s}' is not a money amount"))
            })?,
        };
        Money::from_major(amount).ok_or_else(|| {
            serde::de::Error::custom(format!("amount {amount} is not a storable money value"))
        })
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
