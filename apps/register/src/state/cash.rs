//! # Cash State
//!
//! Holds the drawer's [`CashLedger`].
//!
//! The ledger owns its repository. Opening, recording and closing all go
//! through the same mutex, which serializes access per session as the
//! ledger requires (movement log read immediately before each append).

use std::sync::{Arc, Mutex};

use balcao_core::{CashLedger, CashRepository, InMemoryCashRepository};

use crate::error::ApiError;

/// Register-managed cash ledger.
#[derive(Debug)]
pub struct CashState<R = InMemoryCashRepository> {
    ledger: Arc<Mutex<CashLedger<R>>>,
}

impl CashState<InMemoryCashRepository> {
    /// Ledger over a fresh in-memory store.
    pub fn in_memory() -> Self {
        CashState::new(InMemoryCashRepository::new())
    }
}

impl<R: CashRepository> CashState<R> {
    pub fn new(repository: R) -> Self {
        CashState {
            ledger: Arc::new(Mutex::new(CashLedger::new(repository))),
        }
    }

    /// Executes a function with read access to the ledger.
    pub fn with_ledger<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&CashLedger<R>) -> T,
    {
        let ledger = self
            .ledger
            .lock()
            .map_err(|_| ApiError::internal("Cash state is unavailable"))?;
        Ok(f(&ledger))
    }

    /// Executes a function with write access to the ledger.
    pub fn with_ledger_mut<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut CashLedger<R>) -> T,
    {
        let mut ledger = self
            .ledger
            .lock()
            .map_err(|_| ApiError::internal("Cash state is unavailable"))?;
        Ok(f(&mut ledger))
    }
}

impl<R> Clone for CashState<R> {
    fn clone(&self) -> Self {
        CashState {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl Default for CashState<InMemoryCashRepository> {
    fn default() -> Self {
        Self::in_memory()
    }
}
