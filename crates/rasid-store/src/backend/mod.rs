//! # Storage Backends
//!
//! One uniform trait, two interchangeable implementations.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     DocumentStore Trait                                 │
//! │                                                                         │
//! │            read(key) ──► Ok(Some) | Ok(None) | Err                     │
//! │            write(key, value) ──► Ok | Err                              │
//! │                      │                                                  │
//! │         ┌────────────┴─────────────┐                                   │
//! │         ▼                          ▼                                   │
//! │  ┌──────────────────┐     ┌──────────────────┐                         │
//! │  │  DirectoryStore  │     │  EmbeddedStore   │                         │
//! │  │  <root>/<k>.json │     │  SQLite KV table │                         │
//! │  │  pretty-printed  │     │  single-key txns │                         │
//! │  └──────────────────┘     └──────────────────┘                         │
//! │                                                                         │
//! │  Callers never branch on which backend is active; the StorageManager   │
//! │  picks one at mode-transition time and dispatches through the trait.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod directory;
pub mod embedded;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreResult;

pub use directory::DirectoryStore;
pub use embedded::EmbeddedStore;

/// Uniform key-document interface over both backends.
///
/// ## Contract
/// - `read` returns `Ok(None)` when the key has never been written -
///   a non-error outcome the loader relies on for default-seeding
/// - unparsable stored bytes are `Err(Corrupt)`, never `Ok(None)`
/// - `write` replaces the whole value (create-or-truncate semantics)
/// - a value written then read back with no intervening write is
///   deep-equal to what was written
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads the document stored under `key`.
    async fn read(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Creates or replaces the document stored under `key`.
    async fn write(&self, key: &str, value: &Value) -> StoreResult<()>;
}
