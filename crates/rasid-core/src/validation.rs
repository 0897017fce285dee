//! # Validation Module
//!
//! Mutation-boundary rules for Rasid POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI shell (external)                                          │
//! │  ├── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │  ├── Runs before any document is touched                               │
//! │  └── A failure here means NO partial mutation occurred                 │
//! │                                                                         │
//! │  There is no constraint-enforcing database underneath: the documents   │
//! │  are plain JSON, so this module is the last line of defense.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Adjustment, Customer, Product, User};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length for new passwords.
pub const MIN_PASSWORD_LEN: usize = 4;

// =============================================================================
// Product Rules
// =============================================================================

/// Validates a product's own fields.
///
/// ## Rules
/// - name must not be empty
/// - price and purchase price must not be negative
/// - stock quantity must not be negative
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    if product.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if product.price.cents() < 0 {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    if product.purchase_price.cents() < 0 {
        return Err(ValidationError::Negative {
            field: "purchase price".to_string(),
        });
    }

    if product.quantity < 0 {
        return Err(ValidationError::Negative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Rejects a barcode that already belongs to a *different* product.
///
/// Uniqueness is enforced here, at mutation time - never at storage time.
/// Updating a product keeps its own barcode valid.
pub fn ensure_unique_barcode(catalog: &[Product], candidate: &Product) -> CoreResult<()> {
    let taken = catalog
        .iter()
        .any(|p| p.barcode == candidate.barcode && p.id != candidate.id);

    if taken {
        return Err(CoreError::DuplicateBarcode {
            barcode: candidate.barcode.clone(),
        });
    }

    Ok(())
}

// =============================================================================
// Customer Rules
// =============================================================================

/// Validates a customer's own fields.
pub fn validate_customer(customer: &Customer) -> ValidationResult<()> {
    if customer.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if customer.debt.cents() < 0 {
        return Err(ValidationError::Negative {
            field: "debt".to_string(),
        });
    }

    Ok(())
}

/// A customer with outstanding debt cannot be deleted.
pub fn ensure_customer_deletable(customer: &Customer) -> CoreResult<()> {
    if customer.debt.is_positive() {
        return Err(CoreError::CustomerHasDebt {
            name: customer.name.clone(),
            debt: customer.debt,
        });
    }

    Ok(())
}

/// A settlement must be strictly positive and no larger than the debt.
/// Settling the exact debt drives it to zero, which is allowed.
pub fn validate_settlement(debt: Money, amount: Money) -> CoreResult<()> {
    if !amount.is_positive() || amount > debt {
        return Err(CoreError::InvalidSettlement {
            requested: amount,
            debt,
        });
    }

    Ok(())
}

// =============================================================================
// User Rules
// =============================================================================

/// Validates a user's own fields.
pub fn validate_user(user: &User) -> ValidationResult<()> {
    if user.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    Ok(())
}

/// Validates a newly chosen password.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.len() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

/// Deletion guards for the user directory.
///
/// ## Rules
/// - the roster must never be emptied (at least one account remains)
/// - the currently authenticated user may not delete themself
/// - the target must exist
pub fn ensure_user_deletable(
    users: &[User],
    current_user_id: Option<&str>,
    target_id: &str,
) -> CoreResult<()> {
    if users.len() <= 1 {
        return Err(CoreError::LastUser);
    }

    if current_user_id == Some(target_id) {
        return Err(CoreError::SelfDelete);
    }

    if !users.iter().any(|u| u.id == target_id) {
        return Err(CoreError::UserNotFound(target_id.to_string()));
    }

    Ok(())
}

// =============================================================================
// Adjustment Rules
// =============================================================================

/// A percentage adjustment above 100% can only produce nonsense totals.
pub fn validate_adjustment(adjustment: &Adjustment, field: &str) -> ValidationResult<()> {
    match *adjustment {
        Adjustment::Percentage(bps) if bps > 10_000 => Err(ValidationError::PercentageTooLarge {
            field: field.to_string(),
        }),
        Adjustment::Fixed(amount) if amount.cents() < 0 => Err(ValidationError::Negative {
            field: field.to_string(),
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;
    use crate::types::{UserStatus, ADMIN_USER_ID};

    fn product(id: &str, barcode: &str) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            price: Money::from_cents(1_000),
            purchase_price: Money::from_cents(700),
            unit: defaults::default_units()[0].clone(),
            quantity: 5,
            supplier: String::new(),
            production_date: String::new(),
            expiry_date: String::new(),
            barcode: barcode.to_string(),
        }
    }

    fn customer(debt_cents: i64) -> Customer {
        Customer {
            id: "c1".to_string(),
            name: "Mona".to_string(),
            phone: String::new(),
            address: String::new(),
            notes: String::new(),
            debt: Money::from_cents(debt_cents),
            invoice_count: 0,
            last_transaction: String::new(),
        }
    }

    #[test]
    fn test_barcode_uniqueness() {
        let catalog = vec![product("p1", "111"), product("p2", "222")];

        // New product reusing an existing barcode is rejected
        let dup = product("p3", "111");
        assert!(matches!(
            ensure_unique_barcode(&catalog, &dup),
            Err(CoreError::DuplicateBarcode { .. })
        ));

        // A product keeps its own barcode on update
        let same = product("p1", "111");
        assert!(ensure_unique_barcode(&catalog, &same).is_ok());
    }

    #[test]
    fn test_customer_with_debt_not_deletable() {
        assert!(matches!(
            ensure_customer_deletable(&customer(1_000)),
            Err(CoreError::CustomerHasDebt { .. })
        ));
        assert!(ensure_customer_deletable(&customer(0)).is_ok());
    }

    #[test]
    fn test_settlement_bounds() {
        let debt = Money::from_cents(5_000);

        assert!(validate_settlement(debt, Money::from_cents(0)).is_err());
        assert!(validate_settlement(debt, Money::from_cents(-100)).is_err());
        assert!(validate_settlement(debt, Money::from_cents(5_001)).is_err());

        assert!(validate_settlement(debt, Money::from_cents(1)).is_ok());
        // settling the exact debt reaches zero
        assert!(validate_settlement(debt, debt).is_ok());
    }

    #[test]
    fn test_user_deletion_guards() {
        let admin = User {
            id: ADMIN_USER_ID.to_string(),
            name: "admin".to_string(),
            password: None,
            status: UserStatus::Active,
            permissions: Default::default(),
            role: None,
        };
        let cashier = User {
            id: "u2".to_string(),
            name: "cashier".to_string(),
            password: None,
            status: UserStatus::Active,
            permissions: Default::default(),
            role: None,
        };

        // sole remaining user
        assert!(matches!(
            ensure_user_deletable(std::slice::from_ref(&admin), None, ADMIN_USER_ID),
            Err(CoreError::LastUser)
        ));

        let roster = vec![admin, cashier];

        // self-deletion
        assert!(matches!(
            ensure_user_deletable(&roster, Some("u2"), "u2"),
            Err(CoreError::SelfDelete)
        ));

        // unknown target
        assert!(matches!(
            ensure_user_deletable(&roster, Some(ADMIN_USER_ID), "u9"),
            Err(CoreError::UserNotFound(_))
        ));

        assert!(ensure_user_deletable(&roster, Some(ADMIN_USER_ID), "u2").is_ok());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("").is_err());
        assert!(validate_password("abc").is_err());
        assert!(validate_password("abcd").is_ok());
    }

    #[test]
    fn test_adjustment_bounds() {
        assert!(validate_adjustment(&Adjustment::Percentage(10_000), "discount").is_ok());
        assert!(validate_adjustment(&Adjustment::Percentage(10_001), "discount").is_err());
        assert!(
            validate_adjustment(&Adjustment::Fixed(Money::from_cents(-1)), "discount").is_err()
        );
    }
}
