//! # Document Keys
//!
//! The six persisted documents, plus the reserved keys that live beside
//! them in the embedded store.
//!
//! A *document* is a named, whole-value unit of persisted state: one
//! logical key mapped to one JSON value, written and read atomically.
//! There is no partial update and no deletion - "reset" replaces a
//! document's content with its seed default.

use serde::{Deserialize, Serialize};

// =============================================================================
// Document Keys
// =============================================================================

/// The six document keys.
///
/// In the directory backend each key maps to `<key>.json`; in the
/// embedded backend it is the row key of the `documents` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKey {
    Products,
    Customers,
    Invoices,
    Units,
    Users,
    Settings,
}

impl DocumentKey {
    /// All six keys, in load order.
    pub const ALL: [DocumentKey; 6] = [
        DocumentKey::Products,
        DocumentKey::Customers,
        DocumentKey::Invoices,
        DocumentKey::Units,
        DocumentKey::Users,
        DocumentKey::Settings,
    ];

    /// The storage key string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DocumentKey::Products => "products",
            DocumentKey::Customers => "customers",
            DocumentKey::Invoices => "invoices",
            DocumentKey::Units => "units",
            DocumentKey::Users => "users",
            DocumentKey::Settings => "settings",
        }
    }

    /// The file name used by the directory backend.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl std::fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Reserved Keys
// =============================================================================
// These live ONLY in the embedded store, outside the document set, so
// they survive backend switches. The directory pointer in particular
// must be readable before any directory is available - the bootstrap
// chicken-and-egg the negotiator depends on.

/// Remembered data-directory path (the "directory handle" pointer).
pub const RESERVED_DIRECTORY_POINTER: &str = "directory-pointer";

/// One-time product activation flag.
pub const RESERVED_ACTIVATION: &str = "activation";

/// Set after the user has been told once that the environment lacks a
/// directory picker and embedded storage will be used.
pub const RESERVED_EMBEDDED_NOTICE: &str = "embedded-notice";

/// The pending multi-document commit marker (see `commit` module).
pub const RESERVED_PENDING_COMMIT: &str = "pending-commit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_strings() {
        assert_eq!(DocumentKey::Products.as_str(), "products");
        assert_eq!(DocumentKey::Settings.file_name(), "settings.json");
        assert_eq!(DocumentKey::ALL.len(), 6);
    }

    #[test]
    fn test_key_serde_round_trip() {
        let json = serde_json::to_string(&DocumentKey::Invoices).unwrap();
        assert_eq!(json, "\"invoices\"");

        let back: DocumentKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DocumentKey::Invoices);
    }

    #[test]
    fn test_reserved_keys_never_collide_with_documents() {
        for key in DocumentKey::ALL {
            for reserved in [
                RESERVED_DIRECTORY_POINTER,
                RESERVED_ACTIVATION,
                RESERVED_EMBEDDED_NOTICE,
                RESERVED_PENDING_COMMIT,
            ] {
                assert_ne!(key.as_str(), reserved);
            }
        }
    }
}
