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
//! │  In many retail systems:                                                │
//! │    KSh 10.00 / 3 = KSh 3.33 (×3 = KSh 9.99)  → Lost 1 cent!            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    1000 cents / 3 = 333 cents (×3 = 999 cents)                         │
//! │    We KNOW we lost 1 cent, and handle it explicitly                    │
//! │                                                                         │
//! │  M-Pesa settles in whole shillings, tills count coins - every KES      │
//! │  amount in the system is integer cents, end to end.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use duka_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(25000); // KSh 250.00
//!
//! // Arithmetic operations
//! let doubled = price * 2;                       // KSh 500.00
//! let total = price + Money::from_cents(5000);   // KSh 300.00
//!
//! // NEVER do this:
//! // let bad = Money::from_float(250.00); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for KES).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and cash drawer deficits
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money flows
/// ```text
/// Product.retail_price_cents ──► TransactionItem.unit_price_cents
///                                        │
///                                        ▼
/// Transaction.total_cents ◄── sum of line totals
///        │
///        ├──► PaymentSplit.amount_cents (cash / M-Pesa / card / credit)
///        └──► StoreData cash balance (signed running total)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use duka_core::money::Money;
    ///
    /// let price = Money::from_cents(25000); // Represents KSh 250.00
    /// assert_eq!(price.cents(), 25000);
    /// ```
    ///
    /// ## Why Cents?
    /// Using the smallest unit eliminates all floating-point concerns.
    /// Storage, calculations, and the sync payloads all use cents.
    /// Only display code converts to shillings.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (shillings and cents).
    ///
    /// ## Example
    /// ```rust
    /// use duka_core::money::Money;
    ///
    /// let price = Money::from_major_minor(250, 50); // KSh 250.50
    /// assert_eq!(price.cents(), 25050);
    ///
    /// let shortfall = Money::from_major_minor(-5, 50); // -KSh 5.50
    /// assert_eq!(shortfall.cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -KSh 5.50, not -KSh 4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        // Handle sign: if major is negative, minor should subtract
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

    /// Returns the major unit (shillings) portion.
    ///
    /// ## Example
    /// ```rust
    /// use duka_core::money::Money;
    ///
    /// let price = Money::from_cents(25050);
    /// assert_eq!(price.shillings(), 250);
    ///
    /// let negative = Money::from_cents(-550);
    /// assert_eq!(negative.shillings(), -5);
    /// ```
    #[inline]
    pub const fn shillings(&self) -> i64 {
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

    /// Calculates the tax content of this amount at the given rate.
    ///
    /// ## Implementation
    /// Integer math with half-up rounding: `(amount * bps + 5000) / 10000`.
    /// i128 intermediate prevents overflow on large amounts.
    ///
    /// ## Example
    /// ```rust
    /// use duka_core::money::Money;
    /// use duka_core::types::TaxRate;
    ///
    /// let price = Money::from_cents(25000); // KSh 250.00
    /// let vat = TaxRate::from_bps(1600);    // 16% (Kenyan standard VAT)
    ///
    /// let tax = price.calculate_tax(vat);
    /// assert_eq!(tax.cents(), 4000); // KSh 40.00
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // rate.bps() is basis points: 1600 = 16%
        // Formula: amount_cents * bps / 10000, rounded half-up via +5000
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use duka_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(5500); // KSh 55.00
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 16500); // KSh 165.00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money the way Kenyan receipts print it:
/// `KSh 1,234.56` with thousands grouping.
///
/// Receipt rendering relies on this format, so it is part of the contract,
/// not just a debugging convenience.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}KSh {}.{:02}",
            sign,
            group_thousands(self.shillings().abs()),
            self.cents_part()
        )
    }
}

/// Groups a non-negative integer with commas: 1234567 -> "1,234,567".
fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.len();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
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
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
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
        let money = Money::from_cents(25050);
        assert_eq!(money.cents(), 25050);
        assert_eq!(money.shillings(), 250);
        assert_eq!(money.cents_part(), 50);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(250, 50);
        assert_eq!(money.cents(), 25050);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(25050)), "KSh 250.50");
        assert_eq!(format!("{}", Money::from_cents(500)), "KSh 5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-KSh 5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "KSh 0.00");
    }

    #[test]
    fn test_display_thousands_grouping() {
        assert_eq!(format!("{}", Money::from_cents(123456)), "KSh 1,234.56");
        assert_eq!(
            format!("{}", Money::from_cents(123456789)),
            "KSh 1,234,567.89"
        );
        assert_eq!(format!("{}", Money::from_cents(-123456)), "-KSh 1,234.56");
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
    fn test_tax_calculation_basic() {
        // KSh 250.00 at 16% VAT = KSh 40.00
        let amount = Money::from_cents(25000);
        let rate = TaxRate::from_bps(1600);
        let tax = amount.calculate_tax(rate);
        assert_eq!(tax.cents(), 4000);
    }

    #[test]
    fn test_tax_calculation_with_rounding() {
        // KSh 1.99 at 16% = 31.84 cents → rounds to 32 cents
        let amount = Money::from_cents(199);
        let rate = TaxRate::from_bps(1600);
        let tax = amount.calculate_tax(rate);
        assert_eq!(tax.cents(), 32);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(!positive.is_zero());
        assert!(positive.is_positive());
        assert!(!positive.is_negative());

        let negative = Money::from_cents(-100);
        assert!(!negative.is_zero());
        assert!(!negative.is_positive());
        assert!(negative.is_negative());
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(5500);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.cents(), 16500);
    }

    /// Critical test: Verify that KSh 10.00 / 3 × 3 behaves as expected
    /// This documents the intentional precision loss
    #[test]
    fn test_division_precision_loss_documented() {
        let ten_shillings = Money::from_cents(1000);
        // If we split KSh 10.00 three ways: KSh 3.33 each
        let one_third = Money::from_cents(1000 / 3); // 333 cents
        let reconstructed: Money = one_third * 3; // 999 cents

        // We intentionally lose 1 cent - this is documented behavior
        assert_eq!(reconstructed.cents(), 999);
        assert_ne!(reconstructed.cents(), ten_shillings.cents());

        let lost = ten_shillings - reconstructed;
        assert_eq!(lost.cents(), 1);
    }
}
