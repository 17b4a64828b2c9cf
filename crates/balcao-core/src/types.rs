//! # Domain Types
//!
//! Value objects the core receives from its collaborators.
//!
//! ## Collaborator Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    What the core consumes                               │
//! │                                                                         │
//! │  Catalog (external)          Core                                       │
//! │  ┌─────────────────┐        ┌──────────────────────────────┐           │
//! │  │  CatalogItem    │───────►│ SaleDraft::add_item()        │           │
//! │  │  ─────────────  │        │   freezes name + unit price  │           │
//! │  │  product_id     │        └──────────────────────────────┘           │
//! │  │  name           │                                                    │
//! │  │  unit_price     │   Retail, restaurant, pet shop and decor           │
//! │  └─────────────────┘   catalogs all reduce to this shape.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{validate_price, validate_product_id, validate_product_name};

/// A sellable product as supplied by the catalog collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CatalogItem {
    /// Identity of the cart line this product becomes.
    pub product_id: String,

    /// Display name shown to the cashier and on the receipt.
    pub name: String,

    /// Price per unit.
    pub unit_price: Money,
}

impl CatalogItem {
    pub fn new(product_id: impl Into<String>, name: impl Into<String>, unit_price: Money) -> Self {
        CatalogItem {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
        }
    }

    /// Checks the fields the pricing engine relies on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_product_id(&self.product_id)?;
        validate_product_name(&self.name)?;
        validate_price(self.unit_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_item_validation() {
        let item = CatalogItem::new("SKU-1", "Ração 1kg", Money::from_cents(2590));
        assert!(item.validate().is_ok());

        let free = CatalogItem::new("SKU-2", "Brinde", Money::zero());
        assert!(free.validate().is_ok());

        let negative = CatalogItem::new("SKU-3", "Vaso", Money::from_cents(-1));
        assert!(negative.validate().is_err());

        let unnamed = CatalogItem::new("SKU-4", "  ", Money::from_cents(100));
        assert!(unnamed.validate().is_err());
    }
}
