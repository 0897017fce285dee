//! # Store Error Types
//!
//! Error types for storage operations.
//!
//! ## The Absent / Corrupt Distinction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Read Outcomes                                        │
//! │                                                                         │
//! │  read(key)                                                              │
//! │     │                                                                   │
//! │     ├── Ok(Some(value))   document exists and parsed                   │
//! │     │                                                                   │
//! │     ├── Ok(None)          key has never been written                   │
//! │     │                     → the loader seeds a default                 │
//! │     │                                                                   │
//! │     └── Err(Corrupt)      bytes exist but don't parse                  │
//! │                           → NEVER seeded over; surfaced to the user    │
//! │                                                                         │
//! │  Collapsing the last two would let a half-written or damaged file      │
//! │  silently erase a shop's entire catalog on the next startup.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O failed for a document (other than not-found, which is
    /// `Ok(None)` on the read path).
    #[error("I/O failure for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Stored bytes exist but are not valid JSON for the document type.
    ///
    /// Distinct from absence on purpose: seeding over a corrupt document
    /// would destroy recoverable data.
    #[error("Document '{key}' is corrupt: {detail}")]
    Corrupt { key: String, detail: String },

    /// The embedded SQLite store failed.
    #[error("Embedded store failure: {0}")]
    Backend(String),

    /// Read-write access to the chosen directory was denied or revoked.
    #[error("No read-write permission for directory {path:?}")]
    PermissionDenied { path: PathBuf },

    /// An operation that needs the directory-picker collaborator ran
    /// without one configured.
    #[error("No directory picker is available in this environment")]
    PickerUnavailable,
}

impl StoreError {
    /// Creates a Corrupt error for a key.
    pub fn corrupt(key: impl Into<String>, detail: impl ToString) -> Self {
        StoreError::Corrupt {
            key: key.into(),
            detail: detail.to_string(),
        }
    }
}

/// Convert sqlx errors to StoreError.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
