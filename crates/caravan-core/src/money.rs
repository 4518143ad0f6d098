//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A delivery ledger that drifts by fractions of a unit per line item    │
//! │  will not reconcile against its own invoice totals.                    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Costs, selling prices and commissions are i64 minor units.          │
//! │    Rounding happens exactly once, in the rate math, and is explicit.   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use caravan_core::money::Money;
//!
//! // Create from cents (preferred)
//! let unit_cost = Money::from_cents(5_000); // 50.00
//!
//! // Line total: unit cost × quantity
//! let total = unit_cost.multiply_quantity(2); // 100.00
//! assert_eq!(total.cents(), 10_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::CommissionRate;
use crate::DEFAULT_MARKUP_BPS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values - net profit can go negative
///   when commission exceeds the margin
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// DeliveryItem.unit_cost_cents ──► line total ──► Delivery total cost
///                                                     │
///                        agent rate (bps) ──► commission snapshot
///                                                     │
///        total selling price - total cost - commission = net profit
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use caravan_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major_units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_units(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use caravan_core::money::Money;
    ///
    /// let unit_cost = Money::from_cents(299); // 2.99
    /// let line_total = unit_cost.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 897); // 8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Calculates the agent commission on this amount.
    ///
    /// ## Implementation
    /// Integer math with explicit rounding: `(amount * bps + 5000) / 10000`.
    /// The +5000 rounds half away from zero; i128 intermediates prevent
    /// overflow on large ledgers.
    ///
    /// ## Example
    /// ```rust
    /// use caravan_core::money::Money;
    /// use caravan_core::types::CommissionRate;
    ///
    /// let total_cost = Money::from_cents(10_000); // 100.00
    /// let rate = CommissionRate::from_bps(1500); // 15%
    ///
    /// let commission = total_cost.calculate_commission(rate);
    /// assert_eq!(commission.cents(), 1500); // 15.00
    /// ```
    pub fn calculate_commission(&self, rate: CommissionRate) -> Money {
        let commission_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(commission_cents as i64)
    }

    /// Applies a percentage markup and returns the marked-up amount.
    ///
    /// ## Arguments
    /// * `markup_bps` - Markup in basis points (3000 = 30%)
    ///
    /// ## Example
    /// ```rust
    /// use caravan_core::money::Money;
    ///
    /// let unit_cost = Money::from_cents(1000); // 10.00
    /// let selling = unit_cost.with_markup(3000); // 30% markup
    /// assert_eq!(selling.cents(), 1300); // 13.00
    /// ```
    pub fn with_markup(&self, markup_bps: u32) -> Money {
        let marked = (self.0 as i128 * (10000 + markup_bps as i128) + 5000) / 10000;
        Money::from_cents(marked as i64)
    }

    /// Applies the default 30% markup.
    ///
    /// Used when a line item is submitted without a selling price: the
    /// selling price defaults to `unit_cost × 1.3`.
    #[inline]
    pub fn with_default_markup(&self) -> Money {
        self.with_markup(DEFAULT_MARKUP_BPS)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and log output. The frontend formats currency for
/// actual UI display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:02}",
            sign,
            self.major_units().abs(),
            self.minor_units()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major_units(), 10);
        assert_eq!(money.minor_units(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);

        let mut acc = Money::zero();
        acc += a;
        acc += b;
        assert_eq!(acc.cents(), 1500);
        acc -= b;
        assert_eq!(acc.cents(), 1000);
    }

    #[test]
    fn test_commission_basic() {
        // 100.00 at 15% = 15.00
        let total_cost = Money::from_cents(10_000);
        let rate = CommissionRate::from_bps(1500);
        let commission = total_cost.calculate_commission(rate);
        assert_eq!(commission.cents(), 1500);
    }

    #[test]
    fn test_commission_with_rounding() {
        // 10.00 at 8.25% = 0.825 → 0.83
        let amount = Money::from_cents(1000);
        let rate = CommissionRate::from_bps(825);
        let commission = amount.calculate_commission(rate);
        assert_eq!(commission.cents(), 83);
    }

    #[test]
    fn test_commission_zero_rate() {
        let amount = Money::from_cents(10_000);
        let commission = amount.calculate_commission(CommissionRate::zero());
        assert!(commission.is_zero());
    }

    #[test]
    fn test_default_markup() {
        // unit cost 10.00 → selling price 13.00 (30% default markup)
        let unit_cost = Money::from_cents(1000);
        assert_eq!(unit_cost.with_default_markup().cents(), 1300);

        // unit cost 50.00 → selling price 65.00
        let unit_cost = Money::from_cents(5000);
        assert_eq!(unit_cost.with_default_markup().cents(), 6500);
    }

    #[test]
    fn test_markup_rounding() {
        // 0.33 + 30% = 0.429 → 0.43
        let unit_cost = Money::from_cents(33);
        assert_eq!(unit_cost.with_markup(3000).cents(), 43);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(299);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.cents(), 897);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }

    /// Net profit can legitimately go negative when commission eats the
    /// whole margin; the type must not clamp.
    #[test]
    fn test_negative_profit_preserved() {
        let revenue = Money::from_cents(10_000);
        let cost = Money::from_cents(9_500);
        let commission = Money::from_cents(1_000);

        let profit = revenue - cost - commission;
        assert_eq!(profit.cents(), -500);
    }
}
