//! # Domain State Loader / Defaulter
//!
//! Loads the six documents through the active backend, seeding defaults
//! for any that are absent.
//!
//! ## Load Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Startup Load (all six concurrent)                   │
//! │                                                                         │
//! │   products ─┐                                                           │
//! │   customers ┤   read(key)                                               │
//! │   invoices ─┤      │                                                    │
//! │   units ────┤      ├── Some(v) → deserialize (Corrupt aborts the load) │
//! │   users ────┤      │                                                    │
//! │   settings ─┘      └── None → seed default + persist it IMMEDIATELY    │
//! │                              (so absence-then-seed happens exactly     │
//! │                               once, not on every load)                 │
//! │                                                                         │
//! │   The load completes only when all six resolve; nothing renders        │
//! │   before that.                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Per-Document Rules
//! - `users`: an absent *or empty* roster seeds the bootstrap admin; a
//!   populated roster gets legacy permission maps back-filled in memory
//! - `settings`: the app layer initializes the scanner integration right
//!   after this load returns (idempotent)

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use rasid_core::defaults;
use rasid_core::types::{Customer, Invoice, Product, SystemSettings, Unit, User, LEGACY_MANAGER_ROLE};

use crate::document::DocumentKey;
use crate::error::{StoreError, StoreResult};
use crate::manager::StorageManager;

/// The six documents, fully loaded and defaulted.
#[derive(Debug, Clone)]
pub struct DomainState {
    pub products: Vec<Product>,
    pub customers: Vec<Customer>,
    pub invoices: Vec<Invoice>,
    pub units: Vec<Unit>,
    pub users: Vec<User>,
    pub settings: SystemSettings,
}

/// Loads all six documents concurrently; returns only when every one
/// has resolved.
pub async fn load_all(manager: &StorageManager) -> StoreResult<DomainState> {
    let (products, customers, invoices, units, users, settings) = tokio::join!(
        load_or_seed(manager, DocumentKey::Products, Vec::new),
        load_or_seed(manager, DocumentKey::Customers, Vec::new),
        load_or_seed(manager, DocumentKey::Invoices, Vec::new),
        load_or_seed(manager, DocumentKey::Units, defaults::default_units),
        load_users(manager),
        load_or_seed(manager, DocumentKey::Settings, defaults::default_settings),
    );

    let state = DomainState {
        products: products?,
        customers: customers?,
        invoices: invoices?,
        units: units?,
        users: users?,
        settings: settings?,
    };

    info!(
        products = state.products.len(),
        customers = state.customers.len(),
        invoices = state.invoices.len(),
        "Domain state loaded"
    );

    Ok(state)
}

/// Reads one document, installing and persisting the default when the
/// key is absent.
///
/// A present-but-undeserializable document is `Corrupt` - recovery is
/// the caller's decision, never a silent reseed.
async fn load_or_seed<T, F>(
    manager: &StorageManager,
    key: DocumentKey,
    default: F,
) -> StoreResult<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    if let Some(value) = manager.read_document(key).await? {
        return serde_json::from_value(value).map_err(|e| StoreError::corrupt(key.as_str(), e));
    }

    debug!(key = %key, "Document absent; seeding default");
    let seeded = default();
    let value = serde_json::to_value(&seeded).map_err(|e| StoreError::corrupt(key.as_str(), e))?;
    manager.write_document(key, &value).await?;

    Ok(seeded)
}

/// Loads the user directory with its two special rules: an empty roster
/// seeds like an absent one, and legacy records get their permission
/// maps back-filled.
async fn load_users(manager: &StorageManager) -> StoreResult<Vec<User>> {
    let stored: Vec<User> = load_or_seed(manager, DocumentKey::Users, defaults::default_users).await?;

    if stored.is_empty() {
        // A previous release could persist an empty roster; treat it as
        // absent so the bootstrap admin always exists.
        debug!("Stored roster is empty; seeding bootstrap admin");
        let seeded = defaults::default_users();
        let value =
            serde_json::to_value(&seeded).map_err(|e| StoreError::corrupt("users", e))?;
        manager.write_document(DocumentKey::Users, &value).await?;
        return Ok(seeded);
    }

    Ok(stored.into_iter().map(backfill_permissions).collect())
}

/// Derives a permission map for legacy records that lack one: full
/// access for the old "system manager" role, nothing otherwise.
fn backfill_permissions(mut user: User) -> User {
    if user.permissions.is_empty() {
        if user.role.as_deref() == Some(LEGACY_MANAGER_ROLE) {
            user.permissions = User::full_permissions();
        }
        // non-managers keep the empty map: no access until granted
    }
    user
}

// =============================================================================
// Unit Tests
// =============================================================================
