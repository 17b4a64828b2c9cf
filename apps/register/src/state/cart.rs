//! # Cart State
//!
//! Holds the current Sale Draft.
//!
//! ## Thread Safety
//! The draft is wrapped in `Arc<Mutex<T>>` because:
//! 1. Multiple commands may access/modify the draft
//! 2. Only one command should modify the draft at a time
//! 3. Front ends may issue commands from more than one thread
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Operator Action          Command                 Draft Change          │
//! │  ───────────────          ───────                 ────────────          │
//! │                                                                         │
//! │  Add product ────────────► add_to_cart() ───────► add_item()           │
//! │                                                                         │
//! │  Change Quantity ────────► update_cart_item() ──► update_quantity()    │
//! │                                                                         │
//! │  Line discount ──────────► set_item_discount() ─► set_item_discount()  │
//! │                                                                         │
//! │  Click Clear ────────────► clear_cart() ────────► clear()              │
//! │                                                                         │
//! │  View Cart ──────────────► get_cart() ──────────► (read only)          │
//! │                                                                         │
//! │  NOTE: All write operations acquire the Mutex lock exclusively.         │
//! │        Read operations also acquire the lock but release it quickly.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use balcao_core::SaleDraft;

use crate::error::ApiError;

/// Register-managed Sale Draft.
///
/// ## Why Not RwLock?
/// Draft operations are quick, and most of them mutate. A RwLock would add
/// complexity with minimal benefit.
#[derive(Debug, Clone)]
pub struct CartState {
    draft: Arc<Mutex<SaleDraft>>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        CartState {
            draft: Arc::new(Mutex::new(SaleDraft::new())),
        }
    }

    /// Executes a function with read access to the draft.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let snapshot = cart_state.with_cart(|draft| draft.snapshot())?;
    /// ```
    pub fn with_cart<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&SaleDraft) -> T,
    {
        let draft = self
            .draft
            .lock()
            .map_err(|_| ApiError::internal("Cart state is unavailable"))?;
        Ok(f(&draft))
    }

    /// Executes a function with write access to the draft.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_state.with_cart_mut(|draft| draft.add_item(&item, 1))??;
    /// ```
    pub fn with_cart_mut<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut SaleDraft) -> T,
    {
        let mut draft = self
            .draft
            .lock()
            .map_err(|_| ApiError::internal("Cart state is unavailable"))?;
        Ok(f(&mut draft))
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
    }
}
