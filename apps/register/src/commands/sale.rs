//! # Sale Commands
//!
//! Completes the current draft against the open cash session.
//!
//! ## Complete Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Complete Sale Flow                                   │
//! │                                                                         │
//! │  complete_sale(tendered?)                                              │
//! │       │                                                                 │
//! │       ├── lock cart ──► lock cash (always in this order)               │
//! │       ├── find open session ─────────► SESSION_NOT_OPEN                 │
//! │       ├── balcao_core::complete_sale()                                  │
//! │       │     snapshot by value, SALE movement, clear draft               │
//! │       └── SaleResponse { sale, totalDisplay, changeDisplay }            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use balcao_core::{CashRepository, CompletedSale, Money};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::commands::cash::open_session_id;
use crate::error::ApiError;
use crate::state::{CartState, CashState, RegisterConfig};

/// Completed sale plus display strings for the receipt collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    pub sale: CompletedSale,
    pub store_name: String,
    pub total_display: String,
    pub change_display: String,
}

/// Completes the sale currently in the cart.
///
/// ## Arguments
/// * `tendered` - Cash handed over by the customer (default: exact total)
pub fn complete_sale<R: CashRepository>(
    cart: &CartState,
    cash: &CashState<R>,
    config: &RegisterConfig,
    tendered: Option<Money>,
) -> Result<SaleResponse, ApiError> {
    debug!(?tendered, "complete_sale command");

    let sale = cart.with_cart_mut(|draft| -> Result<CompletedSale, ApiError> {
        cash.with_ledger_mut(|ledger| -> Result<CompletedSale, ApiError> {
            let session_id = open_session_id(ledger)?;
            Ok(balcao_core::complete_sale(draft, ledger, &session_id, tendered)?)
        })?
    })??;

    info!(
        register_id = %config.register.id,
        receipt_number = %sale.receipt_number,
        total = %config.format_currency(sale.total()),
        "Receipt ready"
    );

    Ok(SaleResponse {
        store_name: config.store.name.clone(),
        total_display: config.format_currency(sale.total()),
        change_display: config.format_currency(sale.change),
        sale,
    })
}
