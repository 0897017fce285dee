//! # App Error Type
//!
//! Unified error type for the application layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Rasid POS                              │
//! │                                                                         │
//! │  UI Shell                         Application Layer                     │
//! │  ────────                         ─────────────────                     │
//! │                                                                         │
//! │  session.finalize_sale(...)                                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Validation failure? ── CoreError::EmptyCart ──────┐             │  │
//! │  │         │                                          ▼             │  │
//! │  │  Storage failure? ───── StoreError::Io ───────── AppError ─────► │  │
//! │  │         │                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────► │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  The shell receives { code, message }: the code for programmatic       │
//! │  handling, the message for display. Validation failures block the      │
//! │  action; storage failures become transient notifications.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use rasid_core::CoreError;
use rasid_store::StoreError;

/// Error returned from every session operation.
///
/// ## Serialization
/// This is what the shell receives when an operation fails:
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Cannot create an empty invoice"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for session operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced entity does not exist
    NotFound,

    /// Input validation failed; nothing was mutated
    ValidationError,

    /// A business rule blocked the action; nothing was mutated
    BusinessRule,

    /// Login failed
    AuthError,

    /// A storage backend failed; in-memory state may be ahead of disk
    StorageError,

    /// A stored document exists but cannot be parsed
    CorruptData,

    /// Internal error
    Internal,
}

impl AppError {
    /// Creates a new app error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }
}

/// Converts business rule violations to app errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ProductNotFound(_)
            | CoreError::CustomerNotFound(_)
            | CoreError::UserNotFound(_) => ErrorCode::NotFound,

            CoreError::InvalidCredentials | CoreError::InactiveAccount { .. } => {
                ErrorCode::AuthError
            }

            CoreError::EmptyCart | CoreError::Validation(_) => ErrorCode::ValidationError,

            CoreError::DuplicateBarcode { .. }
            | CoreError::OutOfStock { .. }
            | CoreError::CustomerHasDebt { .. }
            | CoreError::LastUser
            | CoreError::SelfDelete
            | CoreError::InvalidSettlement { .. } => ErrorCode::BusinessRule,
        };

        AppError::new(code, err.to_string())
    }
}

/// Converts storage failures to app errors.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let code = match &err {
            StoreError::Corrupt { .. } => ErrorCode::CorruptData,
            _ => ErrorCode::StorageError,
        };

        // Log the full chain; the shell gets the displayable summary.
        tracing::error!(error = %err, "Storage operation failed");
        AppError::new(code, err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

/// Result type for session operations.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_codes() {
        let err: AppError = CoreError::EmptyCart.into();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err: AppError = CoreError::LastUser.into();
        assert_eq!(err.code, ErrorCode::BusinessRule);

        let err: AppError = CoreError::InvalidCredentials.into();
        assert_eq!(err.code, ErrorCode::AuthError);

        let err: AppError = CoreError::ProductNotFound("p9".into()).into();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_store_error_codes() {
        let err: AppError = StoreError::corrupt("products", "bad json").into();
        assert_eq!(err.code, ErrorCode::CorruptData);

        let err: AppError = StoreError::Backend("locked".into()).into();
        assert_eq!(err.code, ErrorCode::StorageError);
    }

    #[test]
    fn test_serialized_shape() {
        let err = AppError::validation("Cannot create an empty invoice");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert!(json["message"].as_str().unwrap().contains("empty invoice"));
    }
}
