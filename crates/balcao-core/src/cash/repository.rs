//! # Cash Repository
//!
//! The persistence collaborator of the cash ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CashLedger (state machine, this crate)                                │
//! │       │                                                                 │
//! │       │  load_open_session() / load_movements() / append_movement()    │
//! │       ▼                                                                 │
//! │  CashRepository (trait)                                                │
//! │  ├── InMemoryCashRepository   tests, single-register setups            │
//! │  └── (external)               SQL / key-value store adapters            │
//! │                                                                         │
//! │  The repository stores and returns records. It does not validate       │
//! │  amounts or compute balances; that is the ledger's job.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Calls are synchronous. An adapter over an async store blocks inside its
//! own implementation; the ledger has no suspension points.

use std::collections::HashMap;

use crate::error::RepositoryError;

use super::{CashMovement, CashSession, ClosingReconciliation, SessionStatus};

/// Result alias for repository calls.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Storage contract the ledger depends on.
///
/// Implementations must keep movements in append order and must never
/// rewrite or drop an appended movement.
pub trait CashRepository {
    /// The single session in `Open` status, if any.
    fn load_open_session(&self) -> RepositoryResult<Option<CashSession>>;

    fn load_session(&self, session_id: &str) -> RepositoryResult<Option<CashSession>>;

    /// All sessions, oldest first.
    fn list_sessions(&self) -> RepositoryResult<Vec<CashSession>>;

    /// Inserts or replaces a session record (status transitions).
    fn save_session(&mut self, session: &CashSession) -> RepositoryResult<()>;

    /// Movements of one session in append order.
    fn load_movements(&self, session_id: &str) -> RepositoryResult<Vec<CashMovement>>;

    fn append_movement(&mut self, movement: &CashMovement) -> RepositoryResult<()>;

    /// Stores the closing record. A session has at most one.
    fn save_closing(&mut self, closing: &ClosingReconciliation) -> RepositoryResult<()>;

    fn load_closing(&self, session_id: &str) -> RepositoryResult<Option<ClosingReconciliation>>;
}

// =============================================================================
// In-Memory Implementation
// =============================================================================

/// Process-local store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCashRepository {
    sessions: Vec<CashSession>,
    movements: HashMap<String, Vec<CashMovement>>,
    closings: HashMap<String, ClosingReconciliation>,
}

impl InMemoryCashRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored movements across all sessions.
    pub fn movement_count(&self) -> usize {
        self.movements.values().map(Vec::len).sum()
    }
}

impl CashRepository for InMemoryCashRepository {
    fn load_open_session(&self) -> RepositoryResult<Option<CashSession>> {
        Ok(self
            .sessions
            .iter()
            .find(|s| s.status == SessionStatus::Open)
            .cloned())
    }

    fn load_session(&self, session_id: &str) -> RepositoryResult<Option<CashSession>> {
        Ok(self.sessions.iter().find(|s| s.id == session_id).cloned())
    }

    fn list_sessions(&self) -> RepositoryResult<Vec<CashSession>> {
        Ok(self.sessions.clone())
    }

    fn save_session(&mut self, session: &CashSession) -> RepositoryResult<()> {
        match self.sessions.iter_mut().find(|s| s.id == session.id) {
            Some(existing) => *existing = session.clone(),
            None => self.sessions.push(session.clone()),
        }
        Ok(())
    }

    fn load_movements(&self, session_id: &str) -> RepositoryResult<Vec<CashMovement>> {
        Ok(self.movements.get(session_id).cloned().unwrap_or_default())
    }

    fn append_movement(&mut self, movement: &CashMovement) -> RepositoryResult<()> {
        let log = self.movements.entry(movement.session_id.clone()).or_default();
        if log.iter().any(|m| m.id == movement.id) {
            return Err(RepositoryError::Conflict(format!(
                "movement {} already recorded",
                movement.id
            )));
        }
        log.push(movement.clone());
        Ok(())
    }

    fn save_closing(&mut self, closing: &ClosingReconciliation) -> RepositoryResult<()> {
        if self.closings.contains_key(&closing.session_id) {
            return Err(RepositoryError::Conflict(format!(
                "session {} already has a closing record",
                closing.session_id
            )));
        }
        self.closings
            .insert(closing.session_id.clone(), closing.clone());
        Ok(())
    }

    fn load_closing(&self, session_id: &str) -> RepositoryResult<Option<ClosingReconciliation>> {
        Ok(self.closings.get(session_id).cloned())
    }
}
