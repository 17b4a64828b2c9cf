//! # Pricing Module
//!
//! Pure computation of a `PricingSnapshot` from cart lines and an optional
//! global discount.
//!
//! ## Calculation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  per line:  gross    = unit_price × quantity                           │
//! │             discount = spec.amount_on(gross)      (not capped)         │
//! │             net      = max(0, gross − discount)                        │
//! │                                                                         │
//! │  gross                     = Σ line.gross                              │
//! │  item_discount_total       = Σ line.discount                           │
//! │  net_after_item_discounts  = Σ line.net                                │
//! │  global_discount_amount    = global.amount_on(net_after_item_discounts)│
//! │  total                     = max(0, net_after_item − global)           │
//! │  total_discounts           = item_discount_total + global              │
//! │  savings_percent           = total_discounts / gross × 100             │
//! │                                                                         │
//! │  Invariant: 0 ≤ total ≤ net_after_item_discounts ≤ gross               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The global discount compounds on the post-item-discount base, never on
//! the original gross.
//!
//! A fixed item discount larger than its line's gross is accepted: the
//! line's net floors at zero while `item_discount_total` still reports the
//! full instructed amount. Nothing is clamped when the discount is set.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::CartLine;
use crate::discount::DiscountSpec;
use crate::money::Money;

/// Decimal places kept for `savings_percent`.
const SAVINGS_DECIMAL_PLACES: u32 = 2;

// =============================================================================
// Snapshot Types
// =============================================================================

/// Priced view of one cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LinePricing {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    /// `unit_price × quantity`
    pub gross: Money,
    /// Instructed item discount, possibly larger than `gross`.
    pub discount: Money,
    /// `max(0, gross − discount)`
    pub net: Money,
}

/// Derived totals of a sale draft. Recomputed on every mutation, never stored
/// on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricingSnapshot {
    pub lines: Vec<LinePricing>,
    pub item_count: usize,
    pub total_quantity: i64,
    pub gross: Money,
    pub item_discount_total: Money,
    pub net_after_item_discounts: Money,
    pub global_discount_amount: Money,
    pub total: Money,
    pub total_discounts: Money,
    #[ts(as = "String")]
    pub savings_percent: Decimal,
}

impl PricingSnapshot {
    /// Snapshot of an empty draft.
    pub fn empty() -> Self {
        compute_snapshot(&[], None)
    }
}

// =============================================================================
// Pure Functions
// =============================================================================

/// Discount amount for one line, computed from that line's gross.
pub fn item_discount_amount(line: &CartLine) -> Money {
    line.discount
        .map(|spec| spec.amount_on(line.gross()))
        .unwrap_or_default()
}

/// Global discount amount on the base left after item discounts.
pub fn global_discount_amount(spec: Option<&DiscountSpec>, base_after_item_discounts: Money) -> Money {
    spec.map(|spec| spec.amount_on(base_after_item_discounts))
        .unwrap_or_default()
}

/// Computes the snapshot. Same input, same output.
///
/// ## Example
/// ```rust
/// use balcao_core::cart::CartLine;
/// use balcao_core::discount::DiscountSpec;
/// use balcao_core::money::Money;
/// use balcao_core::pricing::compute_snapshot;
/// use rust_decimal::Decimal;
///
/// let lines = vec![CartLine::new("SKU-1", "Vaso", Money::from_cents(5000), 2)];
/// let global = DiscountSpec::percent(Decimal::from(10));
///
/// let snapshot = compute_snapshot(&lines, Some(&global));
/// assert_eq!(snapshot.gross.cents(), 10000);
/// assert_eq!(snapshot.total.cents(), 9000);
/// ```
pub fn compute_snapshot(lines: &[CartLine], global: Option<&DiscountSpec>) -> PricingSnapshot {
    let priced: Vec<LinePricing> = lines.iter().map(price_line).collect();

    let gross: Money = priced.iter().map(|l| l.gross).sum();
    let item_discount_total: Money = priced.iter().map(|l| l.discount).sum();
    let net_after_item_discounts: Money = priced.iter().map(|l| l.net).sum();

    let global_amount = global_discount_amount(global, net_after_item_discounts);
    let total = (net_after_item_discounts - global_amount).clamp_non_negative();
    let total_discounts = item_discount_total + global_amount;

    PricingSnapshot {
        item_count: priced.len(),
        total_quantity: priced.iter().map(|l| l.quantity).sum(),
        lines: priced,
        gross,
        item_discount_total,
        net_after_item_discounts,
        global_discount_amount: global_amount,
        total,
        total_discounts,
        savings_percent: savings_percent(total_discounts, gross),
    }
}

fn price_line(line: &CartLine) -> LinePricing {
    let gross = line.gross();
    let discount = item_discount_amount(line);

    LinePricing {
        product_id: line.product_id.clone(),
        name: line.name.clone(),
        quantity: line.quantity,
        unit_price: line.unit_price,
        gross,
        discount,
        net: (gross - discount).clamp_non_negative(),
    }
}

fn savings_percent(total_discounts: Money, gross: Money) -> Decimal {
    if !gross.is_positive() {
        return Decimal::ZERO;
    }

    (total_discounts.to_decimal() / gross.to_decimal() * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(SAVINGS_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(id: &str, price_cents: i64, qty: i64, discount: Option<DiscountSpec>) -> CartLine {
        let mut line = CartLine::new(id, format!("Product {}", id), Money::from_cents(price_cents), qty);
        line.discount = discount;
        line
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = PricingSnapshot::empty();
        assert_eq!(snapshot.gross, Money::zero());
        assert_eq!(snapshot.total, Money::zero());
        assert_eq!(snapshot.savings_percent, Decimal::ZERO);
        assert_eq!(snapshot.item_count, 0);
    }

    #[test]
    fn test_gross_and_item_discounts() {
        let lines = vec![
            line("1", 1000, 2, Some(DiscountSpec::percent(dec!(10)))),
            line("2", 500, 1, Some(DiscountSpec::fixed(Money::from_cents(100)))),
            line("3", 250, 4, None),
        ];

        let s = compute_snapshot(&lines, None);
        assert_eq!(s.gross.cents(), 2000 + 500 + 1000);
        assert_eq!(s.item_discount_total.cents(), 200 + 100);
        assert_eq!(s.net_after_item_discounts.cents(), 3200);
        assert_eq!(s.global_discount_amount, Money::zero());
        assert_eq!(s.total.cents(), 3200);
        assert_eq!(s.total_quantity, 7);
        assert_eq!(s.lines[0].net.cents(), 1800);
    }

    #[test]
    fn test_global_discount_compounds_after_item_discounts() {
        let lines = vec![line("1", 10000, 1, Some(DiscountSpec::percent(dec!(10))))];
        let global = DiscountSpec::percent(dec!(10));

        let s = compute_snapshot(&lines, Some(&global));
        // 10% of 90.00, not of 100.00
        assert_eq!(s.global_discount_amount.cents(), 900);
        assert_eq!(s.total.cents(), 8100);
        assert_eq!(s.total_discounts.cents(), 1900);
        assert_eq!(s.savings_percent, dec!(19));
    }

    #[test]
    fn test_fixed_item_discount_over_gross_is_clamped_at_aggregate() {
        let lines = vec![
            line("1", 500, 1, Some(DiscountSpec::fixed(Money::from_cents(800)))),
            line("2", 1000, 1, None),
        ];

        let s = compute_snapshot(&lines, None);
        // Instructed amount is reported in full...
        assert_eq!(s.item_discount_total.cents(), 800);
        assert_eq!(s.lines[0].discount.cents(), 800);
        // ...but the line cannot eat into the other line's value.
        assert_eq!(s.lines[0].net, Money::zero());
        assert_eq!(s.net_after_item_discounts.cents(), 1000);
        assert_eq!(s.total.cents(), 1000);
    }

    #[test]
    fn test_fixed_global_discount_never_drives_total_negative() {
        let lines = vec![line("1", 1000, 1, None)];
        let global = DiscountSpec::fixed(Money::from_cents(5000));

        let s = compute_snapshot(&lines, Some(&global));
        assert_eq!(s.global_discount_amount.cents(), 5000);
        assert_eq!(s.total, Money::zero());
    }

    #[test]
    fn test_percent_rounding_happens_once_per_amount() {
        // 3 × 3.33 = 9.99; 19% = 1.8981 → 1.90
        let lines = vec![line("1", 333, 3, Some(DiscountSpec::percent(dec!(19))))];
        let s = compute_snapshot(&lines, None);
        assert_eq!(s.item_discount_total.cents(), 190);
        assert_eq!(s.total.cents(), 809);
    }

    #[test]
    fn test_savings_percent_is_rounded_to_two_places() {
        let lines = vec![line("1", 300, 1, Some(DiscountSpec::fixed(Money::from_cents(100))))];
        let s = compute_snapshot(&lines, None);
        assert_eq!(s.savings_percent, dec!(33.33));
    }

    #[test]
    fn test_zero_priced_cart_has_zero_savings() {
        let lines = vec![line("1", 0, 3, Some(DiscountSpec::percent(dec!(50))))];
        let s = compute_snapshot(&lines, None);
        assert_eq!(s.gross, Money::zero());
        assert_eq!(s.savings_percent, Decimal::ZERO);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let lines = vec![
            line("1", 1999, 2, Some(DiscountSpec::percent(dec!(27.1)))),
            line("2", 350, 5, None),
        ];
        let global = DiscountSpec::fixed(Money::from_cents(275));

        let first = compute_snapshot(&lines, Some(&global));
        let second = compute_snapshot(&lines, Some(&global));
        assert_eq!(first, second);
    }
}
