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
//! │  The reconciliation gate compares bills with EXACT integer equality.    │
//! │  Any float anywhere in the pipeline and "equal" becomes "close",        │
//! │  which is exactly the client/server drift this engine exists to stop.   │
//! │                                                                         │
//! │  OUR SOLUTION: integers in the smallest currency unit, everywhere.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bistro_core::money::Money;
//!
//! let price = Money::from_cents(43000);
//!
//! // 10% discount, rounded half up
//! let discount = price.percentage(10);
//! assert_eq!(discount.cents(), 4300);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit ("cents").
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate arithmetic may dip negative before
///   clamping; final bill fields are validated non-negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from the smallest currency unit.
    ///
    /// ## Example
    /// ```rust
    /// use bistro_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in the smallest currency unit.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero money value.
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

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the smaller of two values.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    /// Subtracts, flooring the result at zero.
    ///
    /// Fixed-amount discounts use this: a 10000 discount on an 8000 item
    /// yields a free item, never a negative price.
    ///
    /// ## Example
    /// ```rust
    /// use bistro_core::money::Money;
    ///
    /// let price = Money::from_cents(8000);
    /// assert_eq!(price.saturating_sub(Money::from_cents(10000)), Money::zero());
    /// ```
    #[inline]
    pub fn saturating_sub(self, other: Self) -> Self {
        Money((self.0 - other.0).max(0))
    }

    /// Computes a whole-number percentage of this amount, rounded half up.
    ///
    /// ## Rounding Rule
    /// This is the single rounding rule for every percentage discount in the
    /// engine. Integer math over i128: `(amount * pct + 50) / 100`.
    /// The +50 provides round-half-up (50/100 = 0.5). i128 prevents overflow
    /// on large amounts.
    ///
    /// Item-level promotions apply this **once per unit price**, not on the
    /// line total; order-level promotions apply it once on the effective
    /// subtotal. The ordering is fixed so the server recomputation always
    /// reproduces what the cart UI previewed.
    ///
    /// ## Example
    /// ```rust
    /// use bistro_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(38000);
    /// assert_eq!(subtotal.percentage(10).cents(), 3800);
    /// ```
    pub fn percentage(&self, pct: i64) -> Money {
        // A negative percentage would turn a discount into a surcharge
        let pct = pct.max(0);
        let amount = (self.0 as i128 * pct as i128 + 50) / 100;
        Money::from_cents(amount as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use bistro_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(43000);
    /// assert_eq!(unit_price.multiply_quantity(2).cents(), 86000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and logs. The frontend formats for display to
/// handle currency symbol and localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Default money is zero.
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

/// Multiplication by i64 (for quantity calculations).
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
        let money = Money::from_cents(43000);
        assert_eq!(money.cents(), 43000);
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_percentage_basic() {
        // 38000 at 10% = 3800, exact
        assert_eq!(Money::from_cents(38000).percentage(10).cents(), 3800);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 43005 at 10% = 4300.5 → 4301
        assert_eq!(Money::from_cents(43005).percentage(10).cents(), 4301);
        // 43004 at 10% = 4300.4 → 4300
        assert_eq!(Money::from_cents(43004).percentage(10).cents(), 4300);
    }

    #[test]
    fn test_percentage_extremes() {
        assert_eq!(Money::from_cents(43000).percentage(0).cents(), 0);
        assert_eq!(Money::from_cents(43000).percentage(100).cents(), 43000);
    }

    #[test]
    fn test_percentage_negative_clamps_to_zero() {
        // A negative parameter must never grow the amount
        assert_eq!(Money::from_cents(43000).percentage(-10).cents(), 0);
    }

    #[test]
    fn test_percentage_large_amount_no_overflow() {
        // i128 intermediate keeps very large subtotals safe
        let large = Money::from_cents(i64::MAX / 200);
        let result = large.percentage(50);
        assert!(result.cents() > 0);
    }

    #[test]
    fn test_saturating_sub() {
        let price = Money::from_cents(8000);
        assert_eq!(price.saturating_sub(Money::from_cents(3000)).cents(), 5000);
        assert_eq!(price.saturating_sub(Money::from_cents(10000)).cents(), 0);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(43000);
        assert_eq!(unit_price.multiply_quantity(2).cents(), 86000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }
}
