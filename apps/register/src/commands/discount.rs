//! # Discount Commands
//!
//! Item and global discounts, plus a side-effect-free cascade preview for
//! the discount field.
//!
//! ## Discount Field Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operator types "10+5" ──► preview_cascade()  (every keystroke)        │
//! │                               │                                         │
//! │                  invalid? ────┴──► INVALID_DISCOUNT, field stays open   │
//! │                               │                                         │
//! │  Operator confirms ─────► set_item_discount() stores 14.5%             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use balcao_core::{resolve_cascade, CascadeStep, DiscountSpec, Money, ValidationError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::commands::cart::{mutate_cart, CartResponse};
use crate::error::ApiError;
use crate::state::CartState;

/// Discount as typed by the operator.
///
/// Percent input is a cascade expression (`"10"`, `"10+5"`); it is resolved
/// to the equivalent single percentage before it reaches the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscountInput {
    Percent { expression: String },
    Fixed { amount: Money },
}

impl DiscountInput {
    pub fn percent(expression: impl Into<String>) -> Self {
        DiscountInput::Percent {
            expression: expression.into(),
        }
    }

    pub fn fixed(amount: Money) -> Self {
        DiscountInput::Fixed { amount }
    }

    /// The discount the draft stores for this input.
    pub fn resolve(&self) -> Result<DiscountSpec, ValidationError> {
        let spec = match self {
            DiscountInput::Percent { expression } => resolve_cascade(expression)?.to_spec(),
            DiscountInput::Fixed { amount } => DiscountSpec::fixed(*amount),
        };
        spec.validate()?;
        Ok(spec)
    }
}

/// Cascade resolution for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadePreview {
    pub percentages: Vec<Decimal>,
    pub retained_multiplier: Decimal,
    pub equivalent_percent: Decimal,
    /// Present when a base amount was given.
    pub steps: Vec<CascadeStep>,
    pub final_value: Option<Money>,
}

/// Sets or clears one line's discount.
pub fn set_item_discount(
    cart: &CartState,
    product_id: &str,
    discount: Option<DiscountInput>,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, ?discount, "set_item_discount command");

    let spec = discount.as_ref().map(DiscountInput::resolve).transpose()?;
    mutate_cart(cart, |draft| {
        draft.set_item_discount(product_id, spec).map(|_| ())
    })
}

/// Sets or clears the single global discount.
pub fn set_global_discount(
    cart: &CartState,
    discount: Option<DiscountInput>,
) -> Result<CartResponse, ApiError> {
    debug!(?discount, "set_global_discount command");

    let spec = discount.as_ref().map(DiscountInput::resolve).transpose()?;
    mutate_cart(cart, |draft| draft.set_global_discount(spec).map(|_| ()))
}

/// Resolves a cascade expression without touching the cart.
pub fn preview_cascade(expression: &str, base: Option<Money>) -> Result<CascadePreview, ApiError> {
    debug!(expression = %expression, "preview_cascade command");

    let cascade = resolve_cascade(expression)?;
    Ok(CascadePreview {
        percentages: cascade.percentages().to_vec(),
        retained_multiplier: cascade.retained_multiplier(),
        equivalent_percent: cascade.equivalent_percent(),
        steps: base.map(|b| cascade.breakdown(b)).unwrap_or_default(),
        final_value: base.map(|b| cascade.final_value(b)),
    })
}
