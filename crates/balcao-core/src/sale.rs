//! # Sale Completion
//!
//! Turns the Sale Draft into a completed sale and a SALE movement.
//!
//! ## Completion Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  complete_sale(draft, ledger, session_id, tendered)                    │
//! │                                                                         │
//! │  1. draft empty? ─────────────────────────► EmptyCart                  │
//! │  2. snapshot = draft.snapshot()   (copied by value)                    │
//! │  3. tendered < snapshot.total? ───────────► InsufficientTender         │
//! │  4. session not open? ────────────────────► SessionNotOpen             │
//! │  5. ledger.record_sale(snapshot.total)    (skipped when total is 0)    │
//! │  6. build CompletedSale (receipt number, items, change)                │
//! │  7. draft.clear()                                                      │
//! │                                                                         │
//! │  Any failure in 1-5 leaves the draft exactly as it was.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The recorded amount comes from the copied snapshot, so nothing done to
//! the draft afterwards can change an already-recorded sale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::SaleDraft;
use crate::cash::{CashLedger, CashRepository};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{LinePricing, PricingSnapshot};
use crate::validation::validate_non_negative;

/// Receipt data for a finished sale, handed to the print collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CompletedSale {
    pub id: String,
    /// Human-readable number printed on the receipt.
    pub receipt_number: String,
    pub session_id: String,
    pub pricing: PricingSnapshot,
    /// Cash handed over by the customer.
    pub tendered: Money,
    pub change: Money,
    /// SALE movement id; `None` for a zero-total sale.
    pub movement_id: Option<String>,
    #[ts(as = "String")]
    pub completed_at: DateTime<Utc>,
}

impl CompletedSale {
    /// Lines as priced at completion.
    pub fn items(&self) -> &[LinePricing] {
        &self.pricing.lines
    }

    pub fn total(&self) -> Money {
        self.pricing.total
    }
}

/// Completes the draft against an open cash session.
///
/// `tendered` defaults to the exact total.
pub fn complete_sale<R: CashRepository>(
    draft: &mut SaleDraft,
    ledger: &mut CashLedger<R>,
    session_id: &str,
    tendered: Option<Money>,
) -> CoreResult<CompletedSale> {
    if draft.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let pricing = draft.snapshot();
    let total = pricing.total;

    let tendered = match tendered {
        Some(amount) => {
            validate_non_negative("tendered", amount)?;
            amount
        }
        None => total,
    };
    if tendered < total {
        return Err(CoreError::InsufficientTender { tendered, total });
    }

    let session = ledger.session(session_id)?;
    if !session.is_open() {
        return Err(CoreError::SessionNotOpen {
            session_id: session.id,
        });
    }

    let movement_id = if total.is_positive() {
        Some(ledger.record_sale(session_id, total)?.id)
    } else {
        None
    };

    let id = Uuid::new_v4().to_string();
    let completed_at = Utc::now();
    let sale = CompletedSale {
        receipt_number: generate_receipt_number(completed_at, session_id, &id),
        id,
        session_id: session_id.to_string(),
        pricing,
        tendered,
        change: tendered - total,
        movement_id,
        completed_at,
    };

    draft.clear();

    info!(
        sale_id = %sale.id,
        receipt_number = %sale.receipt_number,
        session_id,
        total = %total,
        items = sale.pricing.item_count,
        "Sale completed"
    );

    Ok(sale)
}

/// `YYYYMMDD-SSSS-XXXXXX`: date, last four chars of the session id, first six
/// of the sale id.
fn generate_receipt_number(at: DateTime<Utc>, session_id: &str, sale_id: &str) -> String {
    let session_code: String = {
        let chars: Vec<char> = session_id.chars().collect();
        let start = chars.len().saturating_sub(4);
        chars[start..].iter().collect()
    };
    let sale_code: String = sale_id.chars().filter(|c| *c != '-').take(6).collect();

    format!(
        "{}-{:0>4}-{}",
        at.format("%Y%m%d"),
        session_code.to_uppercase(),
        sale_code.to_uppercase()
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cash::{InMemoryCashRepository, MovementType};
    use crate::discount::DiscountSpec;
    use crate::types::CatalogItem;
    use rust_decimal_macros::dec;

    fn setup() -> (SaleDraft, CashLedger<InMemoryCashRepository>, String) {
        let mut ledger = CashLedger::new(InMemoryCashRepository::new());
        let session = ledger.open(Money::from_cents(10000), Some("Ana")).unwrap();
        (SaleDraft::new(), ledger, session.id)
    }

    fn item(id: &str, cents: i64) -> CatalogItem {
        CatalogItem::new(id, format!("Item {}", id), Money::from_cents(cents))
    }

    #[test]
    fn test_complete_sale_records_total_and_clears_draft() {
        let (mut draft, mut ledger, session_id) = setup();
        draft.add_item(&item("1", 2590), 2).unwrap();
        draft
            .set_global_discount(Some(DiscountSpec::percent(dec!(10))))
            .unwrap();

        let sale = complete_sale(&mut draft, &mut ledger, &session_id, Some(Money::from_cents(5000)))
            .unwrap();

        // 51.80 - 10% = 46.62
        assert_eq!(sale.total().cents(), 4662);
        assert_eq!(sale.change.cents(), 338);
        assert_eq!(sale.items().len(), 1);
        assert!(sale.movement_id.is_some());
        assert!(draft.is_empty());

        let movements = ledger.movements(&session_id).unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].movement_type, MovementType::Sale);
        assert_eq!(movements[0].amount.cents(), 4662);
        assert_eq!(
            ledger.current_expected_balance(&session_id).unwrap().cents(),
            14662
        );
    }

    #[test]
    fn test_exact_tender_by_default() {
        let (mut draft, mut ledger, session_id) = setup();
        draft.add_item(&item("1", 1000), 1).unwrap();

        let sale = complete_sale(&mut draft, &mut ledger, &session_id, None).unwrap();
        assert_eq!(sale.tendered.cents(), 1000);
        assert_eq!(sale.change, Money::zero());
    }

    #[test]
    fn test_empty_draft_is_rejected() {
        let (mut draft, mut ledger, session_id) = setup();
        assert!(matches!(
            complete_sale(&mut draft, &mut ledger, &session_id, None),
            Err(CoreError::EmptyCart)
        ));
    }

    #[test]
    fn test_failures_leave_draft_untouched() {
        let (mut draft, mut ledger, session_id) = setup();
        draft.add_item(&item("1", 1000), 1).unwrap();

        let err = complete_sale(&mut draft, &mut ledger, &session_id, Some(Money::from_cents(999)))
            .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientTender { .. }));
        assert_eq!(draft.item_count(), 1);

        ledger.close(&session_id, Money::from_cents(10000), None).unwrap();
        let err = complete_sale(&mut draft, &mut ledger, &session_id, None).unwrap_err();
        assert!(matches!(err, CoreError::SessionNotOpen { .. }));
        assert_eq!(draft.item_count(), 1);
        assert!(ledger.movements(&session_id).unwrap().is_empty());
    }

    #[test]
    fn test_zero_total_sale_skips_movement() {
        let (mut draft, mut ledger, session_id) = setup();
        draft.add_item(&item("1", 1000), 1).unwrap();
        draft
            .set_item_discount("1", Some(DiscountSpec::percent(dec!(100))))
            .unwrap();

        let sale = complete_sale(&mut draft, &mut ledger, &session_id, None).unwrap();
        assert_eq!(sale.total(), Money::zero());
        assert!(sale.movement_id.is_none());
        assert!(ledger.movements(&session_id).unwrap().is_empty());
    }

    #[test]
    fn test_recorded_amount_is_not_affected_by_later_draft_changes() {
        let (mut draft, mut ledger, session_id) = setup();
        draft.add_item(&item("1", 1000), 1).unwrap();
        let sale = complete_sale(&mut draft, &mut ledger, &session_id, None).unwrap();

        draft.add_item(&item("2", 99999), 5).unwrap();
        assert_eq!(sale.total().cents(), 1000);
        assert_eq!(ledger.movements(&session_id).unwrap()[0].amount.cents(), 1000);
    }

    #[test]
    fn test_receipt_number_format() {
        let at = DateTime::parse_from_rfc3339("2024-03-05T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let number = generate_receipt_number(at, "abc-12ef", "9f1c2d3e-aaaa-bbbb-cccc-dddddddddddd");
        assert_eq!(number, "20240305-12EF-9F1C2D");

        let number = generate_receipt_number(at, "7", "ab");
        assert_eq!(number, "20240305-0007-AB");
    }
}
