//! Shared fixtures for the crate's tests.

use std::sync::Arc;

use rasid_core::money::Money;
use rasid_core::types::{Customer, Product};
use rasid_store::backend::EmbeddedStore;
use rasid_store::StorageManager;

use crate::notify::MemoryNotifier;
use crate::session::{Bootstrap, Collaborators, Session};

/// A ready session over an isolated in-memory store, with a collecting
/// notifier for asserting on user-visible behavior.
pub(crate) async fn test_session() -> (Session, Arc<MemoryNotifier>) {
    let notifier = Arc::new(MemoryNotifier::new());
    let manager = StorageManager::new(EmbeddedStore::open_in_memory().await.unwrap(), None);
    let collaborators = Collaborators {
        notifier: notifier.clone(),
        ..Collaborators::default()
    };

    match Session::bootstrap(manager, collaborators).await.unwrap() {
        Bootstrap::Ready(session) => (session, notifier),
        Bootstrap::AwaitingDirectory(_) => unreachable!("no picker configured"),
    }
}

pub(crate) fn product(id: &str, price_cents: i64, stock: i64) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Product {id}"),
        price: Money::from_cents(price_cents),
        purchase_price: Money::from_cents(price_cents / 2),
        unit: rasid_core::defaults::default_units()[0].clone(),
        quantity: stock,
        supplier: String::new(),
        production_date: String::new(),
        expiry_date: String::new(),
        barcode: format!("bc-{id}"),
    }
}

pub(crate) fn customer(id: &str, debt_cents: i64) -> Customer {
    Customer {
        id: id.to_string(),
        name: format!("Customer {id}"),
        phone: String::new(),
        address: String::new(),
        notes: String::new(),
        debt: Money::from_cents(debt_cents),
        invoice_count: 0,
        last_transaction: String::new(),
    }
}
