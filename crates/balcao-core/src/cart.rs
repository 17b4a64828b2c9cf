//! # Cart Module
//!
//! The Sale Draft: the in-progress cart plus its discount instructions.
//!
//! ## Draft Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Sale Draft Operations                                │
//! │                                                                         │
//! │  Operator Action          Draft Method               Returns            │
//! │  ───────────────          ────────────               ───────            │
//! │                                                                         │
//! │  Scan / click product ──► add_item() ──────────────► PricingSnapshot   │
//! │  Change quantity ───────► update_quantity() ───────► PricingSnapshot   │
//! │  Type "10+5" on a line ─► set_item_discount_expression() ─► Snapshot   │
//! │  Discount whole sale ───► set_global_discount() ───► PricingSnapshot   │
//! │  Remove line ───────────► remove_item() ───────────► PricingSnapshot   │
//! │  Cancel sale ───────────► clear()                                       │
//! │                                                                         │
//! │  Every mutation hands back a fresh snapshot; there is no async         │
//! │  boundary and no cached total to drift.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::discount::{resolve_cascade, DiscountSpec};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::{compute_snapshot, PricingSnapshot};
use crate::types::CatalogItem;
use crate::validation::validate_cart_size;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// A line in the sale draft.
///
/// `name` and `unit_price` are frozen when the product is first added; a
/// later catalog price change does not reprice the open draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    /// Line identity. One line per product.
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Price per unit at time of adding (frozen).
    pub unit_price: Money,

    /// Always ≥ 1 while the line exists.
    pub quantity: i64,

    /// Item discount; percent values are already cascade-resolved.
    pub discount: Option<DiscountSpec>,
}

impl CartLine {
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> Self {
        CartLine {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
            quantity,
            discount: None,
        }
    }

    /// Creates a line from a catalog entry.
    pub fn from_catalog(item: &CatalogItem, quantity: i64) -> Self {
        CartLine::new(item.product_id.clone(), item.name.clone(), item.unit_price, quantity)
    }

    /// `unit_price × quantity`
    #[inline]
    pub fn gross(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Sale Draft
// =============================================================================

/// The mutable cart and its discount instructions, prior to completion.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product increases quantity)
/// - Every line has `1 ≤ quantity ≤ MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_ITEMS` lines
/// - At most one global discount; setting a new one replaces the old
/// - Lines are ordered most-recently-added first
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDraft {
    lines: Vec<CartLine>,
    global_discount: Option<DiscountSpec>,
    created_at: DateTime<Utc>,
}

impl SaleDraft {
    /// Creates a new empty draft.
    pub fn new() -> Self {
        SaleDraft {
            lines: Vec::new(),
            global_discount: None,
            created_at: Utc::now(),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a product or increases its quantity if it is already in the draft.
    ///
    /// ## Behavior
    /// - Product already in the draft: quantity increases, price stays frozen
    /// - Product not in the draft: a new line is created
    /// - Either way, the line moves to the front (most recently touched)
    pub fn add_item(&mut self, item: &CatalogItem, quantity: i64) -> CoreResult<PricingSnapshot> {
        item.validate()?;
        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        match self.position(&item.product_id) {
            Some(index) => {
                let new_qty = self.lines[index].quantity + quantity;
                if new_qty > MAX_ITEM_QUANTITY {
                    return Err(CoreError::QuantityTooLarge {
                        requested: new_qty,
                        max: MAX_ITEM_QUANTITY,
                    });
                }
                let mut line = self.lines.remove(index);
                line.quantity = new_qty;
                self.lines.insert(0, line);
            }
            None => {
                if quantity > MAX_ITEM_QUANTITY {
                    return Err(CoreError::QuantityTooLarge {
                        requested: quantity,
                        max: MAX_ITEM_QUANTITY,
                    });
                }
                validate_cart_size(self.lines.len())
                    .map_err(|_| CoreError::CartTooLarge { max: MAX_CART_ITEMS })?;
                self.lines.insert(0, CartLine::from_catalog(item, quantity));
            }
        }

        Ok(self.snapshot())
    }

    /// Removes a line. No-op if the product is not in the draft.
    pub fn remove_item(&mut self, product_id: &str) -> PricingSnapshot {
        self.lines.retain(|line| line.product_id != product_id);
        self.snapshot()
    }

    /// Sets the quantity of an existing line. Quantity 0 removes the line.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<PricingSnapshot> {
        if quantity < 0 {
            return Err(ValidationError::MustNotBeNegative {
                field: "quantity".to_string(),
            }
            .into());
        }
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let index = self.require(product_id)?;
        if quantity == 0 {
            self.lines.remove(index);
        } else {
            self.lines[index].quantity = quantity;
        }

        Ok(self.snapshot())
    }

    /// Replaces or clears one line's discount.
    ///
    /// A malformed discount (percent outside 0-100, negative or oversized
    /// fixed amount) is rejected with `InvalidDiscount` and the line keeps its previous spec.
    pub fn set_item_discount(
        &mut self,
        product_id: &str,
        spec: Option<DiscountSpec>,
    ) -> CoreResult<PricingSnapshot> {
        if let Some(spec) = &spec {
            spec.validate()?;
        }

        let index = self.require(product_id)?;
        self.lines[index].discount = spec;
        Ok(self.snapshot())
    }

    /// Resolves a cascade expression (`"10+5"`) and stores the equivalent
    /// single percentage on the line.
    pub fn set_item_discount_expression(
        &mut self,
        product_id: &str,
        expression: &str,
    ) -> CoreResult<PricingSnapshot> {
        let cascade = resolve_cascade(expression)?;
        self.set_item_discount(product_id, Some(cascade.to_spec()))
    }

    /// Replaces or clears the single global discount.
    pub fn set_global_discount(&mut self, spec: Option<DiscountSpec>) -> CoreResult<PricingSnapshot> {
        if let Some(spec) = &spec {
            spec.validate()?;
        }

        self.global_discount = spec;
        Ok(self.snapshot())
    }

    /// Clears all lines and the global discount, starting a new draft.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.global_discount = None;
        self.created_at = Utc::now();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Recomputes the pricing snapshot from the current lines.
    pub fn snapshot(&self) -> PricingSnapshot {
        compute_snapshot(&self.lines, self.global_discount.as_ref())
    }

    /// Lines, most recently added first.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    pub fn global_discount(&self) -> Option<&DiscountSpec> {
        self.global_discount.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity of all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.product_id == product_id)
    }

    fn require(&self, product_id: &str) -> CoreResult<usize> {
        self.position(product_id)
            .ok_or_else(|| CoreError::ProductNotInCart(product_id.to_string()))
    }
}

impl Default for SaleDraft {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::MAX_AMOUNT_CENTS;

    fn product(id: &str, price_cents: i64) -> CatalogItem {
        CatalogItem::new(id, format!("Product {}", id), Money::from_cents(price_cents))
    }

    #[test]
    fn test_add_item() {
        let mut draft = SaleDraft::new();
        let snapshot = draft.add_item(&product("1", 999), 2).unwrap();

        assert_eq!(draft.item_count(), 1);
        assert_eq!(draft.total_quantity(), 2);
        assert_eq!(snapshot.gross.cents(), 1998);
        assert_eq!(snapshot.total.cents(), 1998);
    }

    #[test]
    fn test_add_same_product_increases_quantity() {
        let mut draft = SaleDraft::new();
        let p = product("1", 999);

        draft.add_item(&p, 1).unwrap();
        draft.add_item(&p, 1).unwrap();

        assert_eq!(draft.item_count(), 1);
        assert_eq!(draft.lines()[0].quantity, 2);
    }

    #[test]
    fn test_add_moves_line_to_front() {
        let mut draft = SaleDraft::new();
        draft.add_item(&product("a", 100), 1).unwrap();
        draft.add_item(&product("b", 200), 1).unwrap();
        draft.add_item(&product("c", 300), 1).unwrap();
        assert_eq!(ids(&draft), vec!["c", "b", "a"]);

        draft.add_item(&product("a", 100), 1).unwrap();
        assert_eq!(ids(&draft), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_existing_line_keeps_frozen_price() {
        let mut draft = SaleDraft::new();
        draft.add_item(&product("1", 1000), 1).unwrap();
        let snapshot = draft.add_item(&product("1", 1500), 1).unwrap();

        assert_eq!(draft.lines()[0].unit_price.cents(), 1000);
        assert_eq!(snapshot.gross.cents(), 2000);
    }

    #[test]
    fn test_quantity_limits() {
        let mut draft = SaleDraft::new();
        let p = product("1", 100);

        assert!(matches!(
            draft.add_item(&p, 0),
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
        assert!(matches!(
            draft.add_item(&p, MAX_ITEM_QUANTITY + 1),
            Err(CoreError::QuantityTooLarge { .. })
        ));

        draft.add_item(&p, MAX_ITEM_QUANTITY).unwrap();
        assert!(matches!(
            draft.add_item(&p, 1),
            Err(CoreError::QuantityTooLarge { .. })
        ));
        assert_eq!(draft.total_quantity(), MAX_ITEM_QUANTITY);
    }

    #[test]
    fn test_cart_size_limit() {
        let mut draft = SaleDraft::new();
        for i in 0..MAX_CART_ITEMS {
            draft.add_item(&product(&i.to_string(), 100), 1).unwrap();
        }

        let err = draft.add_item(&product("one-too-many", 100), 1).unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { max } if max == MAX_CART_ITEMS));

        // Increasing an existing line is still fine.
        assert!(draft.add_item(&product("0", 100), 1).is_ok());
    }

    #[test]
    fn test_amounts_at_the_limit_price_exactly() {
        let mut draft = SaleDraft::new();
        let err = draft
            .add_item(&product("big", MAX_AMOUNT_CENTS + 1), 2)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
        assert!(draft.is_empty());

        let limit = Money::from_cents(MAX_AMOUNT_CENTS);
        for i in 0..MAX_CART_ITEMS {
            let id = i.to_string();
            draft
                .add_item(&product(&id, MAX_AMOUNT_CENTS), MAX_ITEM_QUANTITY)
                .unwrap();
            draft
                .set_item_discount(&id, Some(DiscountSpec::fixed(limit)))
                .unwrap();
        }
        let snapshot = draft
            .set_global_discount(Some(DiscountSpec::fixed(limit)))
            .unwrap();

        let lines = MAX_CART_ITEMS as i64;
        assert_eq!(snapshot.gross.cents(), MAX_AMOUNT_CENTS * MAX_ITEM_QUANTITY * lines);
        assert_eq!(snapshot.item_discount_total.cents(), MAX_AMOUNT_CENTS * lines);
        assert_eq!(
            snapshot.total.cents(),
            MAX_AMOUNT_CENTS * (MAX_ITEM_QUANTITY * lines - lines - 1)
        );

        let err = draft
            .set_global_discount(Some(DiscountSpec::fixed(Money::from_cents(i64::MAX))))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidDiscount { .. })
        ));
    }

    #[test]
    fn test_remove_item_is_noop_when_absent() {
        let mut draft = SaleDraft::new();
        draft.add_item(&product("1", 500), 1).unwrap();

        let snapshot = draft.remove_item("missing");
        assert_eq!(snapshot.item_count, 1);

        let snapshot = draft.remove_item("1");
        assert_eq!(snapshot.item_count, 0);
        assert!(draft.is_empty());
    }

    #[test]
    fn test_update_quantity() {
        let mut draft = SaleDraft::new();
        draft.add_item(&product("1", 500), 1).unwrap();

        let snapshot = draft.update_quantity("1", 4).unwrap();
        assert_eq!(snapshot.gross.cents(), 2000);

        let snapshot = draft.update_quantity("1", 0).unwrap();
        assert_eq!(snapshot.item_count, 0);

        assert!(matches!(
            draft.update_quantity("1", 2),
            Err(CoreError::ProductNotInCart(_))
        ));
    }

    #[test]
    fn test_set_item_discount_validates_spec() {
        let mut draft = SaleDraft::new();
        draft.add_item(&product("1", 1000), 1).unwrap();
        draft
            .set_item_discount("1", Some(DiscountSpec::percent(dec!(10))))
            .unwrap();

        let err = draft
            .set_item_discount("1", Some(DiscountSpec::fixed(Money::from_cents(-100))))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidDiscount { .. })
        ));

        // Rejected discount leaves the previous one in place.
        assert_eq!(
            draft.line("1").and_then(|l| l.discount),
            Some(DiscountSpec::percent(dec!(10)))
        );

        let snapshot = draft.set_item_discount("1", None).unwrap();
        assert_eq!(snapshot.item_discount_total, Money::zero());
    }

    #[test]
    fn test_discount_on_missing_product() {
        let mut draft = SaleDraft::new();
        assert!(matches!(
            draft.set_item_discount("nope", Some(DiscountSpec::percent(dec!(5)))),
            Err(CoreError::ProductNotInCart(_))
        ));
    }

    #[test]
    fn test_cascade_expression_stores_equivalent_percent() {
        let mut draft = SaleDraft::new();
        draft.add_item(&product("1", 1000), 1).unwrap();

        let snapshot = draft.set_item_discount_expression("1", "10+10").unwrap();
        assert_eq!(
            draft.line("1").and_then(|l| l.discount),
            Some(DiscountSpec::percent(dec!(19)))
        );
        assert_eq!(snapshot.total.cents(), 810);

        assert!(draft.set_item_discount_expression("1", "10+150").is_err());
        assert_eq!(draft.snapshot().total.cents(), 810);
    }

    #[test]
    fn test_global_discount_replaces_previous() {
        let mut draft = SaleDraft::new();
        draft.add_item(&product("1", 10000), 1).unwrap();

        draft
            .set_global_discount(Some(DiscountSpec::percent(dec!(10))))
            .unwrap();
        let snapshot = draft
            .set_global_discount(Some(DiscountSpec::fixed(Money::from_cents(500))))
            .unwrap();

        assert_eq!(snapshot.global_discount_amount.cents(), 500);
        assert_eq!(snapshot.total.cents(), 9500);

        assert!(draft
            .set_global_discount(Some(DiscountSpec::percent(dec!(101))))
            .is_err());
        assert_eq!(
            draft.global_discount(),
            Some(&DiscountSpec::fixed(Money::from_cents(500)))
        );

        let snapshot = draft.set_global_discount(None).unwrap();
        assert_eq!(snapshot.total.cents(), 10000);
    }

    #[test]
    fn test_clear_resets_discounts() {
        let mut draft = SaleDraft::new();
        draft.add_item(&product("1", 1000), 1).unwrap();
        draft
            .set_global_discount(Some(DiscountSpec::percent(dec!(5))))
            .unwrap();

        draft.clear();
        assert!(draft.is_empty());
        assert!(draft.global_discount().is_none());
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let mut draft = SaleDraft::new();
        draft.add_item(&product("1", 1999), 3).unwrap();
        draft.set_item_discount_expression("1", "5+2,5").unwrap();

        assert_eq!(draft.snapshot(), draft.snapshot());
    }

    fn ids(draft: &SaleDraft) -> Vec<&str> {
        draft.lines().iter().map(|l| l.product_id.as_str()).collect()
    }

    fn discount_strategy() -> impl Strategy<Value = Option<DiscountSpec>> {
        prop_oneof![
            Just(None),
            (0u32..=10_000).prop_map(|bps| Some(DiscountSpec::percent(Decimal::new(bps as i64, 2)))),
            (0i64..50_000).prop_map(|cents| Some(DiscountSpec::fixed(Money::from_cents(cents)))),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: whatever items and discounts are applied, the aggregate
        /// ordering 0 ≤ total ≤ net_after_item_discounts ≤ gross holds.
        #[test]
        fn totals_stay_ordered_and_non_negative(
            items in prop::collection::vec((0i64..100_000, 1i64..50, discount_strategy()), 0..12),
            global in discount_strategy(),
        ) {
            let mut draft = SaleDraft::new();
            for (i, (price, qty, discount)) in items.iter().enumerate() {
                let id = format!("P{}", i);
                draft.add_item(&product(&id, *price), *qty).unwrap();
                draft.set_item_discount(&id, *discount).unwrap();
            }
            let s = draft.set_global_discount(global).unwrap();

            prop_assert!(s.total >= Money::zero());
            prop_assert!(s.net_after_item_discounts >= Money::zero());
            prop_assert!(s.total <= s.net_after_item_discounts);
            prop_assert!(s.net_after_item_discounts <= s.gross);
            prop_assert_eq!(s.clone(), draft.snapshot());
        }
    }
}
