//! # balcao-core: Financial Core for Balcão POS
//!
//! This crate is the **heart** of Balcão POS. It holds the pricing engine and
//! the cash ledger as pure logic with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Balcão POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Front end (screens, dialogs, printing)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/register                                │   │
//! │  │    add_to_cart, set_item_discount, open_session, close_session │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ balcao-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │ discount │ │ pricing  │ │   cart   │ │   cash   │          │   │
//! │  │   │ cascade  │ │ snapshot │ │SaleDraft │ │  ledger  │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO ASYNC                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CashRepository trait                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          Storage collaborator (in-memory, SQL, key-value)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer cents and one-step rounding
//! - [`discount`] - Discount specs and the cascade resolver (`"10+5"`)
//! - [`pricing`] - Pure `PricingSnapshot` computation
//! - [`cart`] - The Sale Draft
//! - [`cash`] - Cash sessions, movements, reconciliation
//! - [`sale`] - Sale completion (draft → SALE movement → receipt data)
//! - [`types`] - Catalog value objects
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same draft, same snapshot
//! 2. **No I/O**: storage is reached only through [`cash::CashRepository`]
//! 3. **Integer Money**: amounts are cents (i64); percentages are exact decimals
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use balcao_core::{CashLedger, CatalogItem, InMemoryCashRepository, Money, SaleDraft};
//! use balcao_core::sale::complete_sale;
//!
//! let mut ledger = CashLedger::new(InMemoryCashRepository::new());
//! let session = ledger.open(Money::from_cents(10000), Some("Ana")).unwrap();
//!
//! let mut draft = SaleDraft::new();
//! draft.add_item(&CatalogItem::new("SKU-1", "Vaso", Money::from_cents(1000)), 1).unwrap();
//! let snapshot = draft.set_item_discount_expression("SKU-1", "10+10").unwrap();
//! assert_eq!(snapshot.total.cents(), 810);
//!
//! complete_sale(&mut draft, &mut ledger, &session.id, None).unwrap();
//! assert_eq!(ledger.current_expected_balance(&session.id).unwrap().cents(), 10810);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod cash;
pub mod discount;
pub mod error;
pub mod money;
pub mod pricing;
pub mod sale;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use balcao_core::Money` instead of
// `use balcao_core::money::Money`

pub use cart::{CartLine, SaleDraft};
pub use cash::{
    CashLedger, CashMovement, CashRepository, CashSession, ClosingReconciliation,
    InMemoryCashRepository, MovementType, ReconciliationOutcome, SessionStatus, SessionSummary,
};
pub use discount::{resolve_cascade, CascadeDiscount, CascadeStep, DiscountSpec};
pub use error::{CoreError, CoreResult, RepositoryError, ValidationError};
pub use money::Money;
pub use pricing::{compute_snapshot, LinePricing, PricingSnapshot};
pub use sale::{complete_sale, CompletedSale};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single sale draft
///
/// ## Business Reason
/// Prevents runaway carts and keeps receipts printable.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of a movement reason or closing observation
pub const MAX_NOTE_LENGTH: usize = 500;

/// Largest single amount, in cents, the core accepts (R$ 1.000.000.000,00)
///
/// Applies to unit prices, fixed discounts, movement amounts, floats and
/// counted or tendered cash. At this bound a full draft
/// (`MAX_CART_ITEMS` × `MAX_ITEM_QUANTITY` × price) stays far inside `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;
