//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  Prices stored as floats drift:                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                        │
//! │                                                                     │
//! │  The sale invariant `total == Σ line totals` must hold exactly,     │
//! │  not "within rounding tolerance".                                   │
//! │                                                                     │
//! │  OUR SOLUTION: Integer Cents                                        │
//! │    $15.50 is 1550. 5 × 1550 = 7750 cents, every time.               │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use selles_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(1550); // $15.50
//!
//! // Arithmetic operations
//! let line = price * 3;                        // $46.50
//! let total = line + Money::from_cents(250);   // $49.00
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for corrections/refunds
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for the snapshot and API payloads
///
/// Every monetary value in the system flows through this type:
/// `Product.price_cents`, cart line totals, `SaleRecord.total_amount`,
/// and the revenue figures the analytics produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use selles_core::money::Money;
    ///
    /// let price = Money::from_cents(1550); // Represents $15.50
    /// assert_eq!(price.cents(), 1550);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// ## Example
    /// ```rust
    /// use selles_core::money::Money;
    ///
    /// let price = Money::from_major_minor(15, 50); // $15.50
    /// assert_eq!(price.cents(), 1550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -$5.50, not -$4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// Widens to i128 internally and saturates at the i64 bounds, so
    /// an extreme operand can never wrap or panic. Validated inputs
    /// (price cap × quantity cap) stay far below saturation.
    ///
    /// ## Example
    /// ```rust
    /// use selles_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(150); // $1.50
    /// let line_total = unit_price.multiply_quantity(2);
    /// assert_eq!(line_total.cents(), 300); // $3.00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        let wide = self.0 as i128 * qty as i128;
        if wide > i64::MAX as i128 {
            Money(i64::MAX)
        } else if wide < i64::MIN as i128 {
            Money(i64::MIN)
        } else {
            Money(wide as i64)
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and receipts in development. Frontend formatting
/// handles localization for actual UI display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations). Saturating, see
/// [`Money::multiply_quantity`].
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
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
        let money = Money::from_cents(1550);
        assert_eq!(money.cents(), 1550);
        assert_eq!(money.dollars(), 15);
        assert_eq!(money.cents_part(), 50);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(15, 50);
        assert_eq!(money.cents(), 1550);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1550)), "$15.50");
        assert_eq!(format!("{}", Money::from_cents(120)), "$1.20");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
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
    fn test_accumulation() {
        let mut total = Money::zero();
        total += Money::from_cents(150) * 2;
        total += Money::from_cents(200) * 3;
        // 2 × $1.50 + 3 × $2.00 = $9.00 exactly
        assert_eq!(total.cents(), 900);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(250);
        let line_total = unit_price.multiply_quantity(4);
        assert_eq!(line_total.cents(), 1000);
    }

    #[test]
    fn test_multiply_saturates_instead_of_wrapping() {
        let huge = Money::from_cents(i64::MAX / 2);
        assert_eq!(huge.multiply_quantity(3).cents(), i64::MAX);
        assert_eq!((huge * 999).cents(), i64::MAX);

        let negative = Money::from_cents(i64::MIN / 2);
        assert_eq!(negative.multiply_quantity(3).cents(), i64::MIN);
    }
}
