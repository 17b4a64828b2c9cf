//! # Cash Commands
//!
//! Commands for the drawer's cash session.
//!
//! ## Shift Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cash Shift                                       │
//! │                                                                         │
//! │  open_session(float?, operator?) ── defaults from register.toml        │
//! │       │                                                                 │
//! │       ├── complete_sale()         SALE        (sale.rs)                 │
//! │       ├── record_movement()       SANGRIA / SUPRIMENTO                  │
//! │       ├── get_session_status()    expected balance, totals              │
//! │       │                                                                 │
//! │  close_session(counted, observations?)                                  │
//! │       └── ClosingResponse { difference, outcome }                       │
//! │                                                                         │
//! │  list_sessions() ── read-only history                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every command works on the currently open session; there is no way to
//! address a closed session for writing.

use balcao_core::{
    CashLedger, CashMovement, CashRepository, CashSession, ClosingReconciliation, Money,
    MovementType, ReconciliationOutcome, SessionSummary,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{CashState, RegisterConfig};

/// Current drawer state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub open: bool,
    pub session: Option<CashSession>,
    pub summary: Option<SessionSummary>,
}

/// A recorded movement and the balance right after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementResponse {
    pub movement: CashMovement,
    pub expected_balance: Money,
}

/// Result of closing the drawer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingResponse {
    pub closing: ClosingReconciliation,
    pub outcome: ReconciliationOutcome,
    pub summary: SessionSummary,
}

/// One entry of the session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHistoryEntry {
    pub session: CashSession,
    pub summary: SessionSummary,
    pub closing: Option<ClosingReconciliation>,
}

/// Id of the open session, or `SESSION_NOT_OPEN`.
pub(crate) fn open_session_id<R: CashRepository>(ledger: &CashLedger<R>) -> Result<String, ApiError> {
    ledger
        .open_session()?
        .map(|session| session.id)
        .ok_or_else(ApiError::no_open_session)
}

fn status_of<R: CashRepository>(ledger: &CashLedger<R>) -> Result<SessionStatusResponse, ApiError> {
    match ledger.open_session()? {
        Some(session) => {
            let summary = ledger.summary(&session.id)?;
            Ok(SessionStatusResponse {
                open: true,
                session: Some(session),
                summary: Some(summary),
            })
        }
        None => Ok(SessionStatusResponse {
            open: false,
            session: None,
            summary: None,
        }),
    }
}

/// Opens the drawer.
///
/// ## Arguments
/// * `opening_float` - Cash placed in the drawer (default: `register.default_opening_float_cents`)
/// * `operator` - Operator name (default: `register.default_operator`)
pub fn open_session<R: CashRepository>(
    cash: &CashState<R>,
    config: &RegisterConfig,
    opening_float: Option<Money>,
    operator: Option<String>,
) -> Result<SessionStatusResponse, ApiError> {
    let opening_float = opening_float.unwrap_or_else(|| config.default_opening_float());
    let operator = operator.or_else(|| config.register.default_operator.clone());
    debug!(opening_float = %opening_float, ?operator, "open_session command");

    cash.with_ledger_mut(|ledger| -> Result<SessionStatusResponse, ApiError> {
        let session = ledger.open(opening_float, operator.as_deref())?;
        info!(
            register_id = %config.register.id,
            session_id = %session.id,
            float = %config.format_currency(opening_float),
            "Drawer opened"
        );
        status_of(ledger)
    })?
}

/// Records a sangria or suprimento on the open session.
pub fn record_movement<R: CashRepository>(
    cash: &CashState<R>,
    movement_type: MovementType,
    amount: Money,
    reason: Option<String>,
) -> Result<MovementResponse, ApiError> {
    debug!(%movement_type, amount = %amount, "record_movement command");

    cash.with_ledger_mut(|ledger| -> Result<MovementResponse, ApiError> {
        let session_id = open_session_id(ledger)?;
        let movement =
            ledger.record_movement(&session_id, movement_type, amount, reason.as_deref())?;
        let expected_balance = ledger.current_expected_balance(&session_id)?;
        Ok(MovementResponse {
            movement,
            expected_balance,
        })
    })?
}

/// Gets the open session and its totals.
pub fn get_session_status<R: CashRepository>(
    cash: &CashState<R>,
) -> Result<SessionStatusResponse, ApiError> {
    debug!("get_session_status command");
    cash.with_ledger(status_of)?
}

/// Closes the open session against the counted amount.
pub fn close_session<R: CashRepository>(
    cash: &CashState<R>,
    counted: Money,
    observations: Option<String>,
) -> Result<ClosingResponse, ApiError> {
    debug!(counted = %counted, "close_session command");

    cash.with_ledger_mut(|ledger| -> Result<ClosingResponse, ApiError> {
        let session_id = open_session_id(ledger)?;
        let closing = ledger.close(&session_id, counted, observations.as_deref())?;
        let summary = ledger.summary(&session_id)?;
        Ok(ClosingResponse {
            outcome: closing.outcome(),
            closing,
            summary,
        })
    })?
}

/// Lists every session, oldest first, with totals and closing records.
pub fn list_sessions<R: CashRepository>(
    cash: &CashState<R>,
) -> Result<Vec<SessionHistoryEntry>, ApiError> {
    debug!("list_sessions command");

    cash.with_ledger(|ledger| -> Result<Vec<SessionHistoryEntry>, ApiError> {
        ledger
            .sessions()?
            .into_iter()
            .map(|session| -> Result<SessionHistoryEntry, ApiError> {
                let summary = ledger.summary(&session.id)?;
                let closing = ledger.closing(&session.id)?;
                Ok(SessionHistoryEntry {
                    session,
                    summary,
                    closing,
                })
            })
            .collect()
    })?
}
