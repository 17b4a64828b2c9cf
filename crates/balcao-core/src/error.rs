//! # Error Types
//!
//! Domain-specific error types for balcao-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  balcao-core errors (this file)                                        │
//! │  ├── ValidationError  - Malformed input (discounts, amounts)           │
//! │  ├── RepositoryError  - Failures reported by the storage collaborator  │
//! │  └── CoreError        - State errors + wrappers for the two above      │
//! │                                                                         │
//! │  Register app errors (separate crate)                                  │
//! │  └── ApiError         - What the front end sees (serialized)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Front end              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (session ID, amounts, product ID)
//! 3. Errors are enum variants, never String
//! 4. Nothing in the core panics on bad input; everything is reported upward

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// State errors (`SessionAlreadyOpen`, `SessionNotOpen`, `InsufficientBalance`)
/// are typed failures the caller must handle explicitly; the ledger never
/// falls back silently.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A cash session is already open on this drawer.
    ///
    /// ## When This Occurs
    /// - `open()` called twice without an intervening `close()`
    /// - Another register left a session open in the shared store
    #[error("Cash session {session_id} is already open")]
    SessionAlreadyOpen { session_id: String },

    /// The target session exists but is not open.
    #[error("Cash session {session_id} is not open")]
    SessionNotOpen { session_id: String },

    /// The target session does not exist at all.
    #[error("Cash session not found: {0}")]
    SessionNotFound(String),

    /// A sangria would drive the drawer negative.
    ///
    /// ## User Workflow
    /// ```text
    /// Expected balance: 120.00
    ///      │
    ///      ▼
    /// Sangria request: 200.00
    ///      │
    ///      ▼
    /// InsufficientBalance { requested: 200.00, available: 120.00 }
    ///      │
    ///      ▼
    /// UI shows: "Only 120.00 available in the drawer"
    /// ```
    #[error("Insufficient drawer balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Money, available: Money },

    /// The movement log cannot be trusted (bad amount, foreign entry, negative balance).
    #[error("Cash ledger for session {session_id} is corrupted: {reason}")]
    CorruptedLedger { session_id: String, reason: String },

    /// Product is not part of the sale draft.
    #[error("Product {0} is not in the cart")]
    ProductNotInCart(String),

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Completing a sale with nothing in the cart.
    #[error("Cannot complete a sale with an empty cart")]
    EmptyCart,

    /// Cash handed over by the customer does not cover the total.
    #[error("Tendered {tendered} does not cover total {total}")]
    InsufficientTender { tendered: Money, total: Money },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage collaborator failure (wraps RepositoryError).
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are recoverable: the UI keeps the field editable and treats the
/// value as "not applicable yet".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., unparseable amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Malformed discount or cascade expression.
    #[error("Invalid discount: {reason}")]
    InvalidDiscount { reason: String },
}

impl ValidationError {
    /// Shorthand for `InvalidDiscount`.
    pub fn invalid_discount(reason: impl Into<String>) -> Self {
        ValidationError::InvalidDiscount {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Repository Error
// =============================================================================

/// Failures reported by a `CashRepository` implementation.
///
/// The core never retries; retries belong to the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Entity not found in storage.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Write rejected because it conflicts with stored state.
    #[error("Storage conflict: {0}")]
    Conflict(String),

    /// Backend failure (I/O, connection, serialization).
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl RepositoryError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        RepositoryError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientBalance {
            requested: Money::from_cents(20000),
            available: Money::from_cents(12000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient drawer balance: requested 200.00, available 120.00"
        );

        let err = CoreError::SessionAlreadyOpen {
            session_id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Cash session abc is already open");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::invalid_discount("segment '150' is above 100");
        assert_eq!(err.to_string(), "Invalid discount: segment '150' is above 100");

        let err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        assert_eq!(err.to_string(), "amount must be positive");
    }

    #[test]
    fn test_wrapped_errors_convert_to_core_error() {
        let core_err: CoreError = ValidationError::Required {
            field: "operator".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));

        let core_err: CoreError = RepositoryError::not_found("CashSession", "s-1").into();
        assert!(matches!(core_err, CoreError::Repository(_)));
        assert_eq!(
            core_err.to_string(),
            "Repository error: CashSession not found: s-1"
        );
    }
}
