//! # API Error Type
//!
//! Unified error type for register commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Balcão POS                             │
//! │                                                                         │
//! │  Front end                   Rust Register                              │
//! │  ─────────                   ─────────────                              │
//! │                                                                         │
//! │  "sangria 200"                                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  State error? ─── CoreError::InsufficientBalance ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Bad input?  ─── CoreError::Validation ────────── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "INSUFFICIENT_BALANCE",                                      │
//! │    "message": "Insufficient drawer balance: requested 200.00, ..." }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! Front ends need errors as data. We implement `Serialize` and include both
//! a machine-readable `code` and a human-readable `message`.

use balcao_core::{CoreError, RepositoryError};
use serde::Serialize;

use crate::state::ConfigError;

/// API error returned from register commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "SESSION_NOT_OPEN",
///   "message": "Cash session 5f0c... is not open"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// ## Usage in a Front End
/// ```typescript
/// switch (e.code) {
///   case 'INSUFFICIENT_BALANCE':
///     showNotification('Not enough cash in the drawer');
///     break;
///   case 'INVALID_DISCOUNT':
///     keepFieldEditable();
///     break;
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Malformed discount or cascade expression
    InvalidDiscount,

    /// Cart operation failed (limits, unknown line)
    CartError,

    /// Sale completion attempted with an empty cart
    EmptyCart,

    /// Tendered cash does not cover the total
    InsufficientTender,

    /// A cash session is already open
    SessionAlreadyOpen,

    /// Target session is closed, or no session is open
    SessionNotOpen,

    /// Sangria above the expected balance
    InsufficientBalance,

    /// Movement log cannot be trusted
    CorruptedLedger,

    /// Storage collaborator failed
    StorageError,

    /// Configuration could not be loaded
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// No session is open on this register.
    pub fn no_open_session() -> Self {
        ApiError::new(ErrorCode::SessionNotOpen, "No cash session is open")
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::SessionAlreadyOpen { .. } => {
                ApiError::new(ErrorCode::SessionAlreadyOpen, message)
            }
            CoreError::SessionNotOpen { .. } => ApiError::new(ErrorCode::SessionNotOpen, message),
            CoreError::SessionNotFound(id) => ApiError::not_found("Cash session", &id),
            CoreError::InsufficientBalance { .. } => {
                ApiError::new(ErrorCode::InsufficientBalance, message)
            }
            CoreError::CorruptedLedger { .. } => {
                tracing::error!("{}", message);
                ApiError::new(ErrorCode::CorruptedLedger, message)
            }
            CoreError::ProductNotInCart(_)
            | CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. } => ApiError::new(ErrorCode::CartError, message),
            CoreError::EmptyCart => ApiError::new(ErrorCode::EmptyCart, message),
            CoreError::InsufficientTender { .. } => {
                ApiError::new(ErrorCode::InsufficientTender, message)
            }
            CoreError::Validation(e @ balcao_core::ValidationError::InvalidDiscount { .. }) => {
                ApiError::new(ErrorCode::InvalidDiscount, e.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            CoreError::Repository(e) => ApiError::from(e),
        }
    }
}

impl From<balcao_core::ValidationError> for ApiError {
    fn from(err: balcao_core::ValidationError) -> Self {
        ApiError::from(CoreError::from(err))
    }
}

/// Converts storage errors to API errors.
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            RepositoryError::Conflict(e) => {
                tracing::error!("Storage conflict: {}", e);
                ApiError::new(ErrorCode::StorageError, format!("Storage conflict: {}", e))
            }
            RepositoryError::Storage(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Storage failure: {}", e);
                ApiError::new(ErrorCode::StorageError, "Storage operation failed")
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
