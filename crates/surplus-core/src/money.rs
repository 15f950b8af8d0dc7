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
//! │  In many checkout pipelines:                                            │
//! │    subtotal → coupon → GST → shipping, each step carrying float error,  │
//! │    then a final round() hides where the paisa went.                     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    Every amount is an i64 count of paise (1/100 rupee).                 │
//! │    Percentage application rounds ONCE, at a named call site.            │
//! │    Each pricing component is exact at two decimals by construction.     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use surplus_core::money::Money;
//!
//! // Create from paise (preferred)
//! let price = Money::from_paise(109_900); // ₹1099.00
//!
//! // Arithmetic operations
//! let doubled = price * 2;
//! let total = price + Money::from_paise(50_000);
//!
//! // JSON output: decimal rupees, exact at 2 decimals
//! assert_eq!(price.rupees(), 1099.00);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in paise (1/100 of a rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate differences may go negative before clamping
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// Every monetary value in the pricing pipeline flows through this type:
/// unit prices, line totals, item discounts, coupon discounts, GST, shipping
/// charges and the final payable amount. The API boundary converts to decimal
/// rupees (decimal-valued JSON numbers) via [`Money::rupees`], which is exact
/// because the internal value is an integer count of paise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from decimal rupees.
    ///
    /// Rounds half away from zero to the nearest paisa. Intended for the
    /// boundary where a database row or request body carries a decimal value;
    /// internal arithmetic never goes back through floats.
    pub fn from_rupees(rupees: f64) -> Self {
        Money((rupees * 100.0).round() as i64)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the value as decimal rupees for JSON output.
    ///
    /// Exact at two decimals: the internal value is an integer count of
    /// paise, so no formatting drift occurs.
    #[inline]
    pub fn rupees(&self) -> f64 {
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

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    /// Subtracts, flooring at zero.
    ///
    /// The pricing invariant `subtotal_after_coupon = max(0, subtotal − coupon)`
    /// is expressed through this method so a discount can never push an order
    /// value negative.
    ///
    /// ## Example
    /// ```rust
    /// use surplus_core::money::Money;
    ///
    /// let subtotal = Money::from_paise(1_000);
    /// let coupon = Money::from_paise(5_000);
    /// assert_eq!(subtotal.sub_or_zero(coupon), Money::zero());
    /// ```
    #[inline]
    pub fn sub_or_zero(self, other: Self) -> Self {
        Money((self.0 - other.0).max(0))
    }

    /// Applies a basis-point rate and returns the resulting amount.
    ///
    /// ## Basis Points
    /// 1 basis point = 0.01% = 1/10000. 1800 bps = 18% (standard GST rate),
    /// 1000 bps = a 10% listing discount.
    ///
    /// ## Rounding
    /// Integer math with half-up rounding: `(amount * bps + 5000) / 10000`.
    /// This is the single place a fractional paisa can arise, and it is
    /// resolved immediately, so downstream sums never accumulate drift.
    ///
    /// ## Example
    /// ```rust
    /// use surplus_core::money::Money;
    ///
    /// let net = Money::from_paise(150_000); // ₹1500.00
    /// let gst = net.apply_bps(1800);        // 18%
    /// assert_eq!(gst.paise(), 27_000);      // ₹270.00
    /// ```
    pub fn apply_bps(&self, bps: u32) -> Money {
        // i128 to prevent overflow on large amounts
        let amount = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_paise(amount as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use surplus_core::money::Money;
    ///
    /// let unit_price = Money::from_paise(100_000); // ₹1000.00
    /// let line_total = unit_price.multiply_quantity(2);
    /// assert_eq!(line_total.paise(), 200_000);     // ₹2000.00
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
/// For debugging and log lines. API responses use [`Money::rupees`] and the
/// frontend handles localization.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}₹{}.{:02}",
            sign,
            (self.0 / 100).abs(),
            (self.0 % 100).abs()
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

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summing an iterator of Money values (line totals, GST shares).
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
