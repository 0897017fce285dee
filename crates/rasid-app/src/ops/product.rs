//! # Product Operations
//!
//! Catalog mutations with the barcode-uniqueness guard, plus custom
//! stock units.

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use rasid_core::types::{Product, Unit};
use rasid_core::validation::{ensure_unique_barcode, validate_product};
use rasid_core::CoreError;

use crate::error::AppResult;
use crate::notify::Notice;
use crate::session::Session;

impl Session {
    /// Creates or updates a catalog product.
    ///
    /// ## Rules
    /// - an empty id means "create": a UUID is assigned
    /// - an empty barcode is auto-generated from the clock
    /// - a barcode belonging to a *different* product is rejected with a
    ///   distinct duplicate-barcode error, never silently overwritten
    pub async fn save_product(&self, mut product: Product) -> AppResult<Product> {
        validate_product(&product).map_err(CoreError::from)?;

        let is_new = product.id.is_empty();
        if is_new {
            product.id = Uuid::new_v4().to_string();
        }
        if product.barcode.is_empty() {
            product.barcode = Utc::now().timestamp_millis().to_string();
            debug!(product = %product.name, barcode = %product.barcode, "Barcode auto-generated");
        }

        let mut catalog = self.products();
        ensure_unique_barcode(&catalog, &product)?;

        if is_new {
            catalog.insert(0, product.clone());
        } else {
            let existing = catalog
                .iter_mut()
                .find(|p| p.id == product.id)
                .ok_or_else(|| CoreError::ProductNotFound(product.id.clone()))?;
            *existing = product.clone();
        }

        self.save_products(catalog).await?;
        self.notifier.notify(Notice::success(if is_new {
            format!("Product \"{}\" added", product.name)
        } else {
            format!("Product \"{}\" updated", product.name)
        }));

        Ok(product)
    }

    /// Removes a product from the catalog.
    pub async fn delete_product(&self, product_id: &str) -> AppResult<()> {
        let mut catalog = self.products();
        let before = catalog.len();
        catalog.retain(|p| p.id != product_id);

        if catalog.len() == before {
            return Err(CoreError::ProductNotFound(product_id.to_string()).into());
        }

        self.save_products(catalog).await?;
        self.notifier.notify(Notice::success("Product deleted"));
        Ok(())
    }

    /// Looks up a product by its barcode (scanner hits land here).
    pub fn product_by_barcode(&self, barcode: &str) -> Option<Product> {
        self.with_state(|s| s.products.iter().find(|p| p.barcode == barcode).cloned())
    }

    /// Adds a custom stock unit; the id is `max(existing) + 1`.
    pub async fn add_unit(&self, name: &str) -> AppResult<Unit> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::from(rasid_core::ValidationError::Required {
                field: "unit name".to_string(),
            })
            .into());
        }

        let mut units = self.units();
        let next_id = units.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let unit = Unit {
            id: next_id,
            name: name.to_string(),
        };
        units.push(unit.clone());

        self.save_units(units).await?;
        self.notifier
            .notify(Notice::success(format!("Unit \"{}\" saved", unit.name)));
        Ok(unit)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::ErrorCode;
    use crate::testing::{product, test_session};

    #[tokio::test]
    async fn test_create_assigns_id_and_prepends() {
        let (session, _) = test_session().await;

        let mut fresh = product("", 1_000, 5);
        fresh.barcode = "111".to_string();
        let saved = session.save_product(fresh).await.unwrap();
        assert!(!saved.id.is_empty());

        let mut second = product("", 2_000, 5);
        second.barcode = "222".to_string();
        session.save_product(second).await.unwrap();

        let catalog = session.products();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].barcode, "222");
    }

    #[tokio::test]
    async fn test_duplicate_barcode_rejected_distinctly() {
        let (session, _) = test_session().await;

        let mut a = product("", 1_000, 5);
        a.barcode = "555".to_string();
        session.save_product(a).await.unwrap();

        let mut b = product("", 2_000, 5);
        b.barcode = "555".to_string();
        let err = session.save_product(b).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::BusinessRule);
        assert!(err.message.contains("555"));
        // nothing was overwritten
        assert_eq!(session.products().len(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_own_barcode() {
        let (session, _) = test_session().await;

        let mut p = product("", 1_000, 5);
        p.barcode = "777".to_string();
        let mut saved = session.save_product(p).await.unwrap();

        saved.name = "Renamed".to_string();
        let updated = session.save_product(saved).await.unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(session.products().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_barcode_is_generated() {
        let (session, _) = test_session().await;

        let mut p = product("", 1_000, 5);
        p.barcode = String::new();
        let saved = session.save_product(p).await.unwrap();

        assert!(!saved.barcode.is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_product() {
        let (session, _) = test_session().await;
        let err = session.delete_product("missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_custom_unit_gets_next_id() {
        let (session, _) = test_session().await;

        // seeded units are 1..=3
        let unit = session.add_unit("dozen").await.unwrap();
        assert_eq!(unit.id, 4);
        assert_eq!(session.units().len(), 4);

        assert!(session.add_unit("   ").await.is_err());
    }
}
