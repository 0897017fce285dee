//! # Customer Operations
//!
//! Roster mutations: the debt-carrying deletion guard and bounded debt
//! settlement live here.

use uuid::Uuid;

use rasid_core::money::Money;
use rasid_core::types::Customer;
use rasid_core::validation::{ensure_customer_deletable, validate_customer, validate_settlement};
use rasid_core::CoreError;

use crate::error::AppResult;
use crate::notify::Notice;
use crate::session::Session;

impl Session {
    /// Creates or updates a customer. An empty id means "create".
    pub async fn save_customer(&self, mut customer: Customer) -> AppResult<Customer> {
        validate_customer(&customer).map_err(CoreError::from)?;

        let is_new = customer.id.is_empty();
        if is_new {
            customer.id = Uuid::new_v4().to_string();
        }

        let mut roster = self.customers();
        if is_new {
            roster.insert(0, customer.clone());
        } else {
            let existing = roster
                .iter_mut()
                .find(|c| c.id == customer.id)
                .ok_or_else(|| CoreError::CustomerNotFound(customer.id.clone()))?;
            *existing = customer.clone();
        }

        self.save_customers(roster).await?;
        self.notifier.notify(Notice::success(if is_new {
            format!("Customer \"{}\" added", customer.name)
        } else {
            format!("Customer \"{}\" updated", customer.name)
        }));

        Ok(customer)
    }

    /// Removes a customer. Rejected while any debt is outstanding.
    pub async fn delete_customer(&self, customer_id: &str) -> AppResult<()> {
        let mut roster = self.customers();
        let customer = roster
            .iter()
            .find(|c| c.id == customer_id)
            .ok_or_else(|| CoreError::CustomerNotFound(customer_id.to_string()))?;

        ensure_customer_deletable(customer)?;

        roster.retain(|c| c.id != customer_id);
        self.save_customers(roster).await?;
        self.notifier.notify(Notice::success("Customer deleted"));
        Ok(())
    }

    /// Pays down a customer's debt.
    ///
    /// The amount must be strictly positive and no larger than the
    /// current debt; settling the exact debt reaches zero. Debt can
    /// never go negative through this path.
    pub async fn settle_debt(&self, customer_id: &str, amount: Money) -> AppResult<Customer> {
        let mut roster = self.customers();
        let customer = roster
            .iter_mut()
            .find(|c| c.id == customer_id)
            .ok_or_else(|| CoreError::CustomerNotFound(customer_id.to_string()))?;

        validate_settlement(customer.debt, amount)?;

        customer.debt -= amount;
        let updated = customer.clone();

        self.save_customers(roster).await?;
        self.notifier.notify(Notice::success(format!(
            "Received {amount} from \"{}\"; remaining debt {}",
            updated.name, updated.debt
        )));

        Ok(updated)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{customer, test_session};

    #[tokio::test]
    async fn test_save_and_delete_customer() {
        let (session, _) = test_session().await;

        let saved = session.save_customer(customer("", 0)).await.unwrap();
        assert!(!saved.id.is_empty());
        assert_eq!(session.customers().len(), 1);

        session.delete_customer(&saved.id).await.unwrap();
        assert!(session.customers().is_empty());
    }

    #[tokio::test]
    async fn test_debt_blocks_deletion() {
        let (session, _) = test_session().await;

        let debtor = session.save_customer(customer("", 1_000)).await.unwrap();
        let err = session.delete_customer(&debtor.id).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::BusinessRule);
        assert_eq!(session.customers().len(), 1);
    }

    #[tokio::test]
    async fn test_settlement_reduces_debt() {
        let (session, notifier) = test_session().await;

        let debtor = session.save_customer(customer("", 5_000)).await.unwrap();
        let updated = session
            .settle_debt(&debtor.id, Money::from_cents(2_000))
            .await
            .unwrap();

        assert_eq!(updated.debt.cents(), 3_000);
        assert!(notifier.saw("remaining debt"));

        // exact settlement reaches zero, which unblocks deletion
        session
            .settle_debt(&debtor.id, Money::from_cents(3_000))
            .await
            .unwrap();
        session.delete_customer(&debtor.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_over_settlement_rejected() {
        let (session, _) = test_session().await;

        let debtor = session.save_customer(customer("", 1_000)).await.unwrap();
        let err = session
            .settle_debt(&debtor.id, Money::from_cents(1_001))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::BusinessRule);
        assert_eq!(session.customers()[0].debt.cents(), 1_000);
    }

    #[tokio::test]
    async fn test_unknown_customer() {
        let (session, _) = test_session().await;
        let err = session
            .settle_debt("missing", Money::from_cents(1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
