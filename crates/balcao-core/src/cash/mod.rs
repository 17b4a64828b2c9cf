//! # Cash Module
//!
//! Physical cash custody across a work shift: opening float, movements,
//! closing reconciliation.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cash Session Lifecycle                            │
//! │                                                                         │
//! │   NO_SESSION ──open(float)──► OPEN ──close(counted)──► CLOSED           │
//! │                                │                                        │
//! │                                ├── record_sale(amount)      SALE        │
//! │                                ├── record_movement(...)     SANGRIA     │
//! │                                └── record_movement(...)     SUPRIMENTO  │
//! │                                                                         │
//! │   expected = opening_float + Σ SALE + Σ SUPRIMENTO − Σ SANGRIA          │
//! │                                                                         │
//! │   CLOSED is terminal; reopening means a new session id.                 │
//! │   The movement log is append-only and is the only source of the         │
//! │   balance. Nothing caches a running total.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod ledger;
pub mod repository;

pub use ledger::CashLedger;
pub use repository::{CashRepository, InMemoryCashRepository};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Session
// =============================================================================

/// Status of a cash session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Drawer in use; movements may be recorded.
    Open,
    /// Reconciled. Read-only from here on.
    Closed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Open => write!(f, "open"),
            SessionStatus::Closed => write!(f, "closed"),
        }
    }
}

/// One work shift on one cash drawer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CashSession {
    pub id: String,
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    pub operator: Option<String>,
    pub opening_float: Money,
    pub status: SessionStatus,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl CashSession {
    /// A fresh open session with a new id.
    pub fn open(opening_float: Money, operator: Option<String>) -> Self {
        CashSession {
            id: Uuid::new_v4().to_string(),
            opened_at: Utc::now(),
            operator,
            opening_float,
            status: SessionStatus::Open,
            closed_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }
}

// =============================================================================
// Movement
// =============================================================================

/// Kind of cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Cash received for a completed sale.
    Sale,
    /// Withdrawal from the drawer (bank deposit, safe drop).
    Sangria,
    /// Injection into the drawer (change reinforcement).
    Suprimento,
}

impl MovementType {
    /// `true` when the movement adds cash to the drawer.
    pub fn is_inflow(&self) -> bool {
        !matches!(self, MovementType::Sangria)
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementType::Sale => write!(f, "sale"),
            MovementType::Sangria => write!(f, "sangria"),
            MovementType::Suprimento => write!(f, "suprimento"),
        }
    }
}

/// An entry in a session's append-only movement log.
///
/// `amount` is always positive; `movement_type` carries the direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CashMovement {
    pub id: String,
    pub session_id: String,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub amount: Money,
    pub reason: Option<String>,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

impl CashMovement {
    pub fn new(
        session_id: impl Into<String>,
        movement_type: MovementType,
        amount: Money,
        reason: Option<String>,
    ) -> Self {
        CashMovement {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            movement_type,
            amount,
            reason,
            timestamp: Utc::now(),
        }
    }

    /// Effect on the drawer balance: positive for inflows, negative for sangria.
    pub fn signed_amount(&self) -> Money {
        if self.movement_type.is_inflow() {
            self.amount
        } else {
            Money::zero() - self.amount
        }
    }
}

// =============================================================================
// Closing Reconciliation
// =============================================================================

/// Result of comparing the counted drawer against the expected balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum ReconciliationOutcome {
    /// Counted matches expected.
    Balanced,
    /// Drawer is short by this (positive) amount.
    Shortage(Money),
    /// Drawer has this (positive) amount too much.
    Overage(Money),
}

/// Immutable record produced when a session is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ClosingReconciliation {
    pub session_id: String,
    pub expected: Money,
    pub counted: Money,
    /// `counted − expected`. Negative is a shortage.
    pub difference: Money,
    pub observations: Option<String>,
    #[ts(as = "String")]
    pub closed_at: DateTime<Utc>,
}

impl ClosingReconciliation {
    pub fn new(
        session_id: impl Into<String>,
        expected: Money,
        counted: Money,
        observations: Option<String>,
    ) -> Self {
        ClosingReconciliation {
            session_id: session_id.into(),
            expected,
            counted,
            difference: counted - expected,
            observations,
            closed_at: Utc::now(),
        }
    }

    pub fn outcome(&self) -> ReconciliationOutcome {
        if self.difference.is_negative() {
            ReconciliationOutcome::Shortage(self.difference.abs())
        } else if self.difference.is_positive() {
            ReconciliationOutcome::Overage(self.difference)
        } else {
            ReconciliationOutcome::Balanced
        }
    }

    pub fn is_balanced(&self) -> bool {
        self.difference.is_zero()
    }
}

// =============================================================================
// Summary
// =============================================================================

/// Totals of a session, recomputed from its movement log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionSummary {
    pub session_id: String,
    pub status: SessionStatus,
    pub opening_float: Money,
    pub sales_total: Money,
    pub suprimento_total: Money,
    pub sangria_total: Money,
    pub movement_count: usize,
    pub expected_balance: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
