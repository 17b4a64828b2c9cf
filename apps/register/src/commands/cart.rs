//! # Cart Commands
//!
//! Commands for Sale Draft manipulation.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Discount │────►│Completed │       │
//! │  │  Draft   │     │          │     │          │     │   Sale   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   add_to_cart     set_item_discount   complete_sale    │
//! │                   update_item     set_global_discount  (sale.rs)       │
//! │                   remove_item       (discount.rs)                      │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────►                   │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use balcao_core::{CartLine, CatalogItem, CoreError, DiscountSpec, PricingSnapshot, SaleDraft};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::state::CartState;

/// Cart response including lines, discount instructions and totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub global_discount: Option<DiscountSpec>,
    pub pricing: PricingSnapshot,
}

impl From<&SaleDraft> for CartResponse {
    fn from(draft: &SaleDraft) -> Self {
        CartResponse {
            lines: draft.lines().to_vec(),
            global_discount: draft.global_discount().copied(),
            pricing: draft.snapshot(),
        }
    }
}

/// Runs a fallible draft mutation and returns the updated cart.
pub(crate) fn mutate_cart<F>(cart: &CartState, f: F) -> Result<CartResponse, ApiError>
where
    F: FnOnce(&mut SaleDraft) -> Result<(), CoreError>,
{
    cart.with_cart_mut(|draft| {
        f(draft)?;
        Ok::<_, ApiError>(CartResponse::from(&*draft))
    })?
}

/// Gets the current cart contents.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  CART                                              2 items             │
/// ├─────────────────────────────────────────────────────────────────────────┤
/// │  Ração 1kg               x2   -10%               46,62                 │
/// │  Coleira P               x1                      19,90                 │
/// ├─────────────────────────────────────────────────────────────────────────┤
/// │  Gross                                           71,70                 │
/// │  Discounts                                       -5,18                 │
/// │  TOTAL                                           66,52                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn get_cart(cart: &CartState) -> Result<CartResponse, ApiError> {
    debug!("get_cart command");
    cart.with_cart(|draft| CartResponse::from(draft))
}

/// Adds a catalog item to the cart.
///
/// ## Behavior
/// - If product already in cart: quantity increases
/// - If product not in cart: added as new line
/// - Price is "frozen" at time of adding (won't change if the catalog updates)
///
/// ## Arguments
/// * `item` - Catalog entry supplied by the caller
/// * `quantity` - Quantity to add (default: 1)
pub fn add_to_cart(
    cart: &CartState,
    item: CatalogItem,
    quantity: Option<i64>,
) -> Result<CartResponse, ApiError> {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id = %item.product_id, quantity = %quantity, "add_to_cart command");

    mutate_cart(cart, |draft| draft.add_item(&item, quantity).map(|_| ()))
}

/// Updates the quantity of a line. Quantity 0 removes it.
pub fn update_cart_item(
    cart: &CartState,
    product_id: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, quantity = %quantity, "update_cart_item command");

    mutate_cart(cart, |draft| {
        draft.update_quantity(product_id, quantity).map(|_| ())
    })
}

/// Removes a line. Removing an absent product is not an error.
pub fn remove_from_cart(cart: &CartState, product_id: &str) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, "remove_from_cart command");

    mutate_cart(cart, |draft| {
        draft.remove_item(product_id);
        Ok(())
    })
}

/// Clears the cart and its discounts.
pub fn clear_cart(cart: &CartState) -> Result<CartResponse, ApiError> {
    debug!("clear_cart command");

    mutate_cart(cart, |draft| {
        draft.clear();
        Ok(())
    })
}
