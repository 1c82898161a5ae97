//! # Money Module
//!
//! Provides the `Money` type for rupee amounts held as integer paise.
//!
//! ## Why Integer Paise?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ONE FIGURE, THREE PLACES                                               │
//! │                                                                         │
//! │  The bill breakdown is shown on the billing form, stored in the bill   │
//! │  row and printed on the receipt. All three must match to the paisa.    │
//! │                                                                         │
//! │  Floating point:  180 × 5 / 200 = 4.499999...  → "4.50"? "4.49"?       │
//! │  Integer paise:   18000 × 500 / 20000 = 450    → ₹4.50, every time     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rasoi_core::money::Money;
//! use rasoi_core::types::GstRate;
//!
//! let food = Money::from_paise(18_000);              // ₹180.00
//! let cgst = food.half_tax(GstRate::from_bps(500));  // half of 5%
//! assert_eq!(cgst.paise(), 450);
//! assert_eq!(Money::from_paise(10_020).ceil_to_rupee().paise(), 10_100);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::{DiscountPercent, GstRate};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 of a rupee).
///
/// ## Where Money Flows
/// ```text
/// MenuItem.rate ──► OrderLineItem.rate × qty ──► OrderLineItem.line_total
///                                                        │
///                                                        ▼
///                                   compute_breakdown() per GST category
///                                                        │
///                            ┌───────────────────────────┼──────────────┐
///                            ▼                           ▼              ▼
///                       billing form                 bills row      receipt
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    ///
    /// ## Example
    /// ```rust
    /// use rasoi_core::money::Money;
    ///
    /// let rate = Money::from_paise(25_050); // ₹250.50
    /// assert_eq!(rate.paise(), 25_050);
    /// ```
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion (truncated toward zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit rate by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns `percent`% of this amount, rounded half-up to the paisa.
    ///
    /// ## Example
    /// ```rust
    /// use rasoi_core::money::Money;
    /// use rasoi_core::types::DiscountPercent;
    ///
    /// let subtotal = Money::from_paise(20_000);
    /// let ten = DiscountPercent::new(10).unwrap();
    /// assert_eq!(subtotal.percent_of(ten).paise(), 2_000);
    /// ```
    pub fn percent_of(&self, percent: DiscountPercent) -> Money {
        Money(round_div(self.0 as i128 * percent.value() as i128, 100))
    }

    /// Full GST on this amount, rounded half-up to the paisa.
    ///
    /// `(amount × bps + 5000) / 10000`, the same formula used for every tax
    /// figure so display and print never disagree.
    pub fn calculate_tax(&self, rate: GstRate) -> Money {
        Money(round_div(self.0 as i128 * rate.bps() as i128, 10_000))
    }

    /// One half of GST on this amount (the CGST or SGST share).
    ///
    /// Computed from the full rate over 20000 rather than halving an already
    /// rounded tax, so `₹180 @ 5%` yields exactly `₹4.50` per share.
    pub fn half_tax(&self, rate: GstRate) -> Money {
        Money(round_div(self.0 as i128 * rate.bps() as i128, 20_000))
    }

    /// Rounds up to the next whole rupee. Amounts already on a rupee
    /// boundary are unchanged.
    ///
    /// ## Example
    /// ```rust
    /// use rasoi_core::money::Money;
    ///
    /// assert_eq!(Money::from_paise(27_900).ceil_to_rupee().paise(), 27_900);
    /// assert_eq!(Money::from_paise(27_901).ceil_to_rupee().paise(), 28_000);
    /// ```
    pub fn ceil_to_rupee(&self) -> Money {
        let rem = self.0.rem_euclid(100);
        if rem == 0 {
            *self
        } else {
            Money(self.0 - rem + 100)
        }
    }
}

/// Integer division rounding half away from zero.
fn round_div(numerator: i128, denominator: i128) -> i64 {
    let half = denominator / 2;
    let rounded = if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    };
    rounded as i64
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `₹1234.50` (no digit grouping).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(1099);
        assert_eq!(money.paise(), 1099);
        assert_eq!(money.rupees(), 10);
        assert_eq!(money.paise_part(), 99);
        assert_eq!(Money::from_rupees(279).paise(), 27_900);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paise(1099).to_string(), "₹10.99");
        assert_eq!(Money::from_paise(450).to_string(), "₹4.50");
        assert_eq!(Money::from_paise(-550).to_string(), "-₹5.50");
        assert_eq!(Money::zero().to_string(), "₹0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);
        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!((a * 3).paise(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.paise(), 2000);
    }

    #[test]
    fn test_percent_of_rounds_half_up() {
        let ten = DiscountPercent::new(10).unwrap();
        assert_eq!(Money::from_paise(20_000).percent_of(ten).paise(), 2_000);
        // 10% of 1.05 = 0.105 → 0.11
        assert_eq!(Money::from_paise(105).percent_of(ten).paise(), 11);
        // 10% of 1.04 = 0.104 → 0.10
        assert_eq!(Money::from_paise(104).percent_of(ten).paise(), 10);
    }

    #[test]
    fn test_half_tax_uses_full_rate() {
        let five = GstRate::from_bps(500);
        assert_eq!(Money::from_paise(20_000).half_tax(five).paise(), 500);
        assert_eq!(Money::from_paise(18_000).half_tax(five).paise(), 450);
        // 0.99 × 2.5% = 0.02475 → 0.02
        assert_eq!(Money::from_paise(99).half_tax(five).paise(), 2);
    }

    #[test]
    fn test_calculate_tax() {
        let eighteen = GstRate::from_bps(1800);
        assert_eq!(Money::from_paise(10_000).calculate_tax(eighteen).paise(), 1_800);
        assert_eq!(Money::from_paise(10_000).calculate_tax(GstRate::zero()).paise(), 0);
    }

    #[test]
    fn test_ceil_to_rupee_always_rounds_up() {
        assert_eq!(Money::from_paise(10_020).ceil_to_rupee().paise(), 10_100);
        assert_eq!(Money::from_paise(10_001).ceil_to_rupee().paise(), 10_100);
        assert_eq!(Money::from_paise(10_099).ceil_to_rupee().paise(), 10_100);
        assert_eq!(Money::from_paise(10_000).ceil_to_rupee().paise(), 10_000);
        assert_eq!(Money::zero().ceil_to_rupee().paise(), 0);
    }
}
