//! # Error Types
//!
//! Domain-specific error types for rasid-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rasid-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  rasid-store errors (separate crate)                                   │
//! │  └── StoreError       - Backend read/write failures                    │
//! │                                                                         │
//! │  rasid-app errors                                                      │
//! │  └── AppError         - What the UI shell sees (code + message)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError → UI                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (barcode, name, amounts)
//! 3. Errors are enum variants, never String
//! 4. Every variant maps to a user-facing message; none of these errors
//!    leaves partial state behind - they are all rejected at the boundary

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
///
/// These are rejected synchronously at the mutation boundary; no store
/// write happens for any of them.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Finalizing a sale with nothing in the cart.
    #[error("Cannot create an empty invoice")]
    EmptyCart,

    /// Saving a product whose barcode belongs to a different product.
    #[error("Barcode '{barcode}' is already assigned to another product")]
    DuplicateBarcode { barcode: String },

    /// Adding a product with zero on-hand stock to the cart.
    #[error("Product '{name}' is out of stock")]
    OutOfStock { name: String },

    /// Product id not present in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Customer id not present on the roster.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// User id not present in the directory.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Deleting a customer who still owes money.
    #[error("Customer '{name}' has outstanding debt of {debt}")]
    CustomerHasDebt { name: String, debt: Money },

    /// Deleting the last remaining user account.
    #[error("The last remaining user cannot be deleted")]
    LastUser,

    /// Deleting the currently authenticated account.
    #[error("The currently signed-in user cannot delete their own account")]
    SelfDelete,

    /// Login with an unknown name or wrong password.
    #[error("Incorrect username or password")]
    InvalidCredentials,

    /// Login against a deactivated account.
    #[error("Account '{name}' is inactive")]
    InactiveAccount { name: String },

    /// Debt settlement outside (0, debt].
    #[error("Settlement of {requested} is invalid for a debt of {debt}")]
    InvalidSettlement { requested: Money, debt: Money },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements, before any
/// business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Percentage adjustment above 100%.
    #[error("{field} cannot exceed 100%")]
    PercentageTooLarge { field: String },
}

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
        let err = CoreError::CustomerHasDebt {
            name: "Mona".to_string(),
            debt: Money::from_cents(1_000),
        };
        assert_eq!(err.to_string(), "Customer 'Mona' has outstanding debt of 10.00");

        let err = CoreError::DuplicateBarcode {
            barcode: "6221001234567".to_string(),
        };
        assert!(err.to_string().contains("6221001234567"));
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
