//! # Discount Module
//!
//! Discount instructions and the cascading percentage resolver.
//!
//! ## Cascade vs. Sum
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operator types "10+10" in the discount field                          │
//! │                                                                         │
//! │   base 10.00 ──(-10%)──► 9.00 ──(-10%)──► 8.10                         │
//! │                                                                         │
//! │   retained multiplier M = 0.90 × 0.90 = 0.81                           │
//! │   equivalent percent  E = (1 - M) × 100 = 19%   (NOT 20%)              │
//! │                                                                         │
//! │   The draft stores E as a single Percent spec; the step list is only   │
//! │   for display.                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use balcao_core::discount::resolve_cascade;
//! use balcao_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! let cascade = resolve_cascade("10+10").unwrap();
//! assert_eq!(cascade.equivalent_percent(), Decimal::from(19));
//! assert_eq!(cascade.final_value(Money::from_cents(1000)).cents(), 810);
//!
//! assert!(resolve_cascade("10+150").is_err());
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_AMOUNT_CENTS;

/// Separator between cascade segments.
pub const CASCADE_SEPARATOR: char = '+';

// =============================================================================
// Discount Kinds
// =============================================================================

/// A discount instruction, attached to one cart line or to the whole draft.
///
/// Serialized as `{ "kind": "percent", "value": "19" }` or
/// `{ "kind": "fixed", "value": 500 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum DiscountSpec {
    /// Percentage in `[0, 100]`. Cascade expressions are stored already resolved.
    Percent {
        #[ts(as = "String")]
        value: Decimal,
    },
    /// Fixed amount off. Never cascades.
    Fixed { value: Money },
}

impl DiscountSpec {
    /// Percentage discount.
    pub fn percent(value: Decimal) -> Self {
        DiscountSpec::Percent { value }
    }

    /// Fixed-amount discount.
    pub fn fixed(value: Money) -> Self {
        DiscountSpec::Fixed { value }
    }

    /// Rejects percentages outside `[0, 100]` and negative fixed amounts.
    ///
    /// Negative inputs are never coerced to zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            DiscountSpec::Percent { value } => {
                if *value < Decimal::ZERO || *value > Decimal::ONE_HUNDRED {
                    return Err(ValidationError::invalid_discount(format!(
                        "percentage {} is outside 0-100",
                        value
                    )));
                }
            }
            DiscountSpec::Fixed { value } => {
                if value.is_negative() {
                    return Err(ValidationError::invalid_discount(format!(
                        "fixed amount {} is negative",
                        value
                    )));
                }
                if value.cents() > MAX_AMOUNT_CENTS {
                    return Err(ValidationError::invalid_discount(format!(
                        "fixed amount {} exceeds {}",
                        value,
                        Money::from_cents(MAX_AMOUNT_CENTS)
                    )));
                }
            }
        }
        Ok(())
    }

    /// Amount this discount takes off `base`.
    ///
    /// Percent rounds once, to the cent. A fixed amount is returned as-is even
    /// when it exceeds `base`; the pricing engine clamps at the aggregate.
    pub fn amount_on(&self, base: Money) -> Money {
        match self {
            DiscountSpec::Percent { value } => base.percent(*value),
            DiscountSpec::Fixed { value } => *value,
        }
    }
}

// =============================================================================
// Cascade Resolution
// =============================================================================

/// One successive cut in a cascade, for display.
///
/// Amounts are in cents at full precision; use the `*_amount` accessors for
/// cent-rounded values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CascadeStep {
    /// Percentage applied at this step.
    #[ts(as = "String")]
    pub percent: Decimal,
    /// Value before this step.
    #[ts(as = "String")]
    pub base: Decimal,
    /// Amount taken off at this step.
    #[ts(as = "String")]
    pub discount: Decimal,
    /// Value after this step (the next step's base).
    #[ts(as = "String")]
    pub result: Decimal,
}

impl CascadeStep {
    pub fn base_amount(&self) -> Money {
        Money::from_decimal_cents(self.base)
    }

    pub fn discount_amount(&self) -> Money {
        Money::from_decimal_cents(self.discount)
    }

    pub fn result_amount(&self) -> Money {
        Money::from_decimal_cents(self.result)
    }
}

/// A parsed cascade expression such as `10+5+2,5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeDiscount {
    percentages: Vec<Decimal>,
}

impl CascadeDiscount {
    /// The percentages in the order they are applied.
    pub fn percentages(&self) -> &[Decimal] {
        &self.percentages
    }

    /// `M = Π(1 − p_i/100)`: the fraction of the original value retained.
    pub fn retained_multiplier(&self) -> Decimal {
        self.percentages
            .iter()
            .fold(Decimal::ONE, |acc, pct| {
                acc * (Decimal::ONE - *pct / Decimal::ONE_HUNDRED)
            })
    }

    /// `E = (1 − M) × 100`: the single percentage equivalent to the cascade.
    pub fn equivalent_percent(&self) -> Decimal {
        ((Decimal::ONE - self.retained_multiplier()) * Decimal::ONE_HUNDRED).normalize()
    }

    /// Step-by-step breakdown of the cascade applied to `base`.
    pub fn breakdown(&self, base: Money) -> Vec<CascadeStep> {
        let mut current = base.to_decimal();
        self.percentages
            .iter()
            .map(|pct| {
                let discount = current * *pct / Decimal::ONE_HUNDRED;
                let step = CascadeStep {
                    percent: *pct,
                    base: current,
                    discount,
                    result: current - discount,
                };
                current = step.result;
                step
            })
            .collect()
    }

    /// Value left after the whole cascade, rounded to the cent.
    pub fn final_value(&self, base: Money) -> Money {
        Money::from_decimal_cents(base.to_decimal() * self.retained_multiplier())
    }

    /// The percent discount the draft stores for this cascade.
    pub fn to_spec(&self) -> DiscountSpec {
        DiscountSpec::percent(self.equivalent_percent())
    }
}

/// Parses `p1[+p2[+p3...]]` into a cascade.
///
/// ## Rules
/// - Segments are split on `+` and trimmed; `,` or `.` is the decimal separator
/// - Every segment must be a number in `[0, 100]`
/// - Empty input, empty segments (`"+10"`, `"10+"`, `"10++5"`) are invalid
///
/// Never panics: an `Err` means "no discount applicable yet" and the caller
/// keeps the field editable.
pub fn resolve_cascade(expression: &str) -> Result<CascadeDiscount, ValidationError> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err(ValidationError::invalid_discount("expression is empty"));
    }

    let percentages = expression
        .split(CASCADE_SEPARATOR)
        .map(parse_segment)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CascadeDiscount { percentages })
}

fn parse_segment(segment: &str) -> Result<Decimal, ValidationError> {
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::invalid_discount("empty segment"));
    }

    let value = Decimal::from_str(&trimmed.replace(',', ".")).map_err(|_| {
        ValidationError::invalid_discount(format!("segment '{}' is not a number", trimmed))
    })?;

    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::invalid_discount(format!(
            "segment '{}' is outside 0-100",
            trimmed
        )));
    }

    Ok(value)
}

// =============================================================================
// Unit Tests
// =============================================================================
