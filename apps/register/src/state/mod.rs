//! # State Module
//!
//! Manages application state for the register.
//!
//! ## Why Multiple State Types?
//! Instead of one struct whose internals every command can reach into,
//! each concern gets its own state type:
//!
//! 1. **Separation of Concerns**: Each state type has a single responsibility
//! 2. **Easier Testing**: Commands can be exercised against one state alone
//! 3. **Clearer Command Signatures**: Commands declare exactly what state they need
//! 4. **Reduced Contention**: Cart edits never wait on the cash ledger
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      RegisterState                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │          ┌──────────────────┼──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐              │
//! │  │  CartState   │  │  CashState   │  │  RegisterConfig  │              │
//! │  │              │  │              │  │                  │              │
//! │  │  Arc<Mutex<  │  │  Arc<Mutex<  │  │  store name      │              │
//! │  │   SaleDraft  │  │   CashLedger │  │  operator        │              │
//! │  │  >>          │  │  >>          │  │  opening float   │              │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘              │
//! │                                                                         │
//! │  Lock order when both are needed (sale completion): cart, then cash.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod cash;
mod config;

pub use cart::CartState;
pub use cash::CashState;
pub use config::{ConfigError, RegisterConfig, RegisterSection, StoreConfig, CONFIG_FILE_NAME};

use balcao_core::{CashRepository, InMemoryCashRepository};

/// Everything one register holds.
///
/// Hands out the focused state types; never the draft or ledger themselves.
#[derive(Debug)]
pub struct RegisterState<R = InMemoryCashRepository> {
    cart: CartState,
    cash: CashState<R>,
    config: RegisterConfig,
}

impl RegisterState<InMemoryCashRepository> {
    /// Register backed by the in-memory cash store.
    pub fn in_memory(config: RegisterConfig) -> Self {
        RegisterState::new(config, InMemoryCashRepository::new())
    }
}

impl<R: CashRepository> RegisterState<R> {
    pub fn new(config: RegisterConfig, repository: R) -> Self {
        RegisterState {
            cart: CartState::new(),
            cash: CashState::new(repository),
            config,
        }
    }

    pub fn cart(&self) -> &CartState {
        &self.cart
    }

    pub fn cash(&self) -> &CashState<R> {
        &self.cash
    }

    pub fn config(&self) -> &RegisterConfig {
        &self.config
    }
}
