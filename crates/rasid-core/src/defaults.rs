//! # Seed Defaults
//!
//! The hardcoded values installed when a document is absent at load time.
//!
//! Seeding happens exactly once per document: the loader persists the
//! default immediately, so the next load reads it back instead of
//! re-seeding. Products, customers, and invoices seed empty; the three
//! documents below carry real content.

use crate::types::{SystemSettings, Unit, User, UserStatus, ADMIN_USER_ID};

/// The three stock units every fresh install starts with.
pub fn default_units() -> Vec<Unit> {
    vec![
        Unit {
            id: 1,
            name: "piece".to_string(),
        },
        Unit {
            id: 2,
            name: "pack".to_string(),
        },
        Unit {
            id: 3,
            name: "carton".to_string(),
        },
    ]
}

/// The bootstrap roster: a single admin with full permissions.
///
/// The default credentials are admin/admin; first-run setup is expected
/// to change them. The password is stored in plaintext (see DESIGN.md).
pub fn default_users() -> Vec<User> {
    vec![User {
        id: ADMIN_USER_ID.to_string(),
        name: "admin".to_string(),
        password: Some("admin".to_string()),
        status: UserStatus::Active,
        permissions: User::full_permissions(),
        role: None,
    }]
}

/// The initial settings document.
pub fn default_settings() -> SystemSettings {
    SystemSettings {
        system_name: "Rasid".to_string(),
        company_name: "ABC Trading Co.".to_string(),
        company_address: "123 Commerce St., Cairo".to_string(),
        company_phone: "01234567890".to_string(),
        custom_invoice_barcode: String::new(),
        allow_invoice_editing: false,
        enable_stock_alerts: true,
        thank_you_message: None,
        barcode_text: None,
        paper_size: None,
        scanner_api_key: None,
        scanner_auth_domain: None,
        scanner_project_id: None,
    }
}
