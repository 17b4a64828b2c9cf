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
//! │  OUR SOLUTION: Integer Cents + Decimal Percentages                      │
//! │    Amounts live in i64 cents, never more precise than a cent.           │
//! │    Percentages (10+10 → 19%) live in rust_decimal::Decimal and are      │
//! │    applied at full precision; rounding happens ONCE, at the cent.       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use balcao_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! let price = Money::from_cents(1099); // 10.99
//! let line = price * 3;                // 32.97
//! let off = line.percent(Decimal::from(10));
//! assert_eq!(off.cents(), 330);        // 3.297 → 3.30
//!
//! let typed = Money::parse("12,50").unwrap();
//! assert_eq!(typed.cents(), 1250);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::MAX_AMOUNT_CENTS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: reconciliation differences can be negative (shortage).
///   Inputs such as prices, movement amounts and counted cash are validated
///   as non-negative at the boundary, not by the type.
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  CatalogItem.unit_price ──► CartLine ──► PricingSnapshot.total         │
/// │                                               │                         │
/// │                                               ▼                         │
/// │  CashSession.opening_float ──► CashMovement(SALE) ──► expected balance │
/// │                                                           │             │
/// │                                                           ▼             │
/// │                                  ClosingReconciliation.difference       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use balcao_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// `from_major_minor(-5, 50)` is -5.50, not -4.50.
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

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
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

    /// Floors the value at zero: `max(0, self)`.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Addition that reports overflow instead of wrapping.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use balcao_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    // =========================================================================
    // Decimal Bridge
    // =========================================================================

    /// Returns the amount in cents as an exact `Decimal`.
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::from(self.0)
    }

    /// Rounds a full-precision cent amount to a whole cent.
    ///
    /// Midpoints round away from zero (0.5 cent → 1 cent), the same half-up
    /// rule used everywhere amounts are rounded. Values beyond the i64 range
    /// saturate; use [`Money::checked_from_decimal_cents`] where the input is
    /// not already bounded by a valid amount.
    pub fn from_decimal_cents(cents: Decimal) -> Self {
        Money::checked_from_decimal_cents(cents).unwrap_or(if cents.is_sign_negative() {
            Money(i64::MIN)
        } else {
            Money(i64::MAX)
        })
    }

    /// Rounds like [`Money::from_decimal_cents`], or `None` outside the i64 range.
    pub fn checked_from_decimal_cents(cents: Decimal) -> Option<Self> {
        cents
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .map(Money)
    }

    /// Returns `pct` percent of this amount, rounded to the cent.
    ///
    /// ## Example
    /// ```rust
    /// use balcao_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let base = Money::from_cents(1000);
    /// assert_eq!(base.percent(Decimal::from(19)).cents(), 190);
    /// ```
    pub fn percent(&self, pct: Decimal) -> Money {
        Money::from_decimal_cents(self.to_decimal() * pct / Decimal::ONE_HUNDRED)
    }

    /// Parses a human-typed amount such as `"12,50"`, `"12.50"` or `"12"`.
    ///
    /// Either `,` or `.` is accepted as the decimal separator. Extra
    /// fractional digits are rounded half-up to the cent. Magnitudes above
    /// `MAX_AMOUNT_CENTS` are `OutOfRange`.
    pub fn parse(input: &str) -> Result<Money, ValidationError> {
        let normalized = input.trim().replace(',', ".");
        if normalized.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let units = Decimal::from_str(&normalized).map_err(|_| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("'{}' is not a number", input.trim()),
        })?;

        units
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(Money::checked_from_decimal_cents)
            .filter(|money| (-MAX_AMOUNT_CENTS..=MAX_AMOUNT_CENTS).contains(&money.0))
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "amount".to_string(),
                min: -MAX_AMOUNT_CENTS,
                max: MAX_AMOUNT_CENTS,
            })
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders `12.50` / `-5.00`. Currency symbol and separator are a
/// presentation concern handled by the register configuration.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
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

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
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
