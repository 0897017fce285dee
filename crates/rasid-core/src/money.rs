//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A till that drifts by fractions of a piaster eventually disagrees      │
//! │  with the invoice log it produced.                                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every price, debt, and total in the system is an i64 cent count.     │
//! │    Percentages are basis points (1/100 of a percent), so a 10%          │
//! │    discount on 2500 cents is exactly 250 cents.                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rasid_core::money::Money;
//!
//! let price = Money::from_cents(1099); // 10.99
//! let line = price * 3;                // 32.97
//! assert_eq!(line.cents(), 3297);
//!
//! // 10% of the line, in basis points
//! assert_eq!(line.percent_of(1000).cents(), 330);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: refunds and adjustments can be negative intermediates
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Transparent serde**: serializes as a bare number inside documents,
///   so stored invoices stay plain JSON
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Checks whether the amount is exactly zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks whether the amount is greater than zero.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Takes a basis-point fraction of this amount, rounded half-up.
    ///
    /// 1 basis point = 0.01%, so `percent_of(1000)` is 10%.
    ///
    /// ## Rounding
    /// Half-up on the cent: 825 bps of 1000 cents is 82.5 → 83.
    /// The remainder is at most half a cent per line, which is the
    /// conventional tolerance for till arithmetic.
    pub fn percent_of(&self, bps: u32) -> Money {
        let numerator = self.0 * bps as i64;
        Money((numerator + 5_000) / 10_000)
    }

    /// Clamps a negative amount to zero.
    ///
    /// Used where a subtraction may legitimately overshoot (a fixed
    /// discount larger than the subtotal) but the result must stay a
    /// valid charge.
    #[inline]
    pub fn floor_zero(&self) -> Money {
        Money(self.0.max(0))
    }
}

impl Add for Money {
    type Output = Money;

    #[inline]
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    #[inline]
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    #[inline]
    fn mul(self, rhs: i64) -> Money {
        Money(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

impl fmt::Display for Money {
    /// Formats as major.minor, e.g. `1099` cents → `"10.99"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1099);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1599);
        assert_eq!((a - b).cents(), 599);
        assert_eq!((a * 3).cents(), 3297);
    }

    #[test]
    fn test_percent_of_exact() {
        // 10% of 25.00 is exactly 2.50
        assert_eq!(Money::from_cents(2500).percent_of(1000).cents(), 250);
    }

    #[test]
    fn test_percent_of_rounds_half_up() {
        // 8.25% of 10.00 = 0.825 → 0.83
        assert_eq!(Money::from_cents(1000).percent_of(825).cents(), 83);
    }

    #[test]
    fn test_floor_zero() {
        assert_eq!(Money::from_cents(-50).floor_zero().cents(), 0);
        assert_eq!(Money::from_cents(50).floor_zero().cents(), 50);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Money::from_cents(2475)).unwrap();
        assert_eq!(json, "2475");

        let back: Money = serde_json::from_str("2475").unwrap();
        assert_eq!(back, Money::from_cents(2475));
    }

    #[test]
    fn test_sum() {
        let total: Money = [10, 20, 30].iter().map(|&c| Money::from_cents(c)).sum();
        assert_eq!(total.cents(), 60);
    }
}
