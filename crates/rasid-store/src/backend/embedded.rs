//! # Embedded Backend
//!
//! A single-table SQLite key-value store: the fallback backend when no
//! directory is available, and the permanent home of the reserved keys
//! (directory pointer, activation flag, pending-commit marker).
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  documents                                                              │
//! │  ┌──────────────────────┬──────────────────────────────────────────┐   │
//! │  │ key TEXT PRIMARY KEY │ value TEXT NOT NULL                      │   │
//! │  ├──────────────────────┼──────────────────────────────────────────┤   │
//! │  │ products             │ [{"id":"...","name":"Tea",...}, ...]     │   │
//! │  │ settings             │ {"systemName":"Rasid",...}               │   │
//! │  │ directory-pointer    │ "/home/shop/pos-data"                    │   │
//! │  │ pending-commit       │ {"writes":[...]}                         │   │
//! │  └──────────────────────┴──────────────────────────────────────────┘   │
//! │                                                                         │
//! │  The table is created lazily on open; every read/write is a single     │
//! │  key-addressed statement, i.e. a single-key transaction.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::DocumentStore;
use crate::error::{StoreError, StoreResult};

/// SQLite-backed key-value document store.
#[derive(Debug, Clone)]
pub struct EmbeddedStore {
    pool: SqlitePool,
}

impl EmbeddedStore {
    /// Opens (creating if missing) the store at the given path.
    ///
    /// ## SQLite Configuration
    /// - WAL journal: readers never block the single writer
    /// - NORMAL synchronous: safe from corruption, fast enough for a
    ///   one-user till
    /// - create-if-missing: first run bootstraps itself
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let url = format!("sqlite://{}?mode=rwc", path.as_ref().display());

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = EmbeddedStore { pool };
        store.create_table().await?;

        info!(path = %path.as_ref().display(), "Embedded store opened");
        Ok(store)
    }

    /// Opens an isolated in-memory store (tests and ephemeral sessions).
    pub async fn open_in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        // a single connection IS the database for :memory:
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = EmbeddedStore { pool };
        store.create_table().await?;
        Ok(store)
    }

    /// Lazily creates the single object table.
    async fn create_table(&self) -> StoreResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for EmbeddedStore {
    async fn read(&self, key: &str) -> StoreResult<Option<Value>> {
        let row: Option<String> =
            sqlx::query_scalar("SELECT value FROM documents WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        let Some(text) = row else {
            debug!(key, "Embedded key absent");
            return Ok(None);
        };

        let value = serde_json::from_str(&text).map_err(|e| StoreError::corrupt(key, e))?;
        Ok(Some(value))
    }

    async fn write(&self, key: &str, value: &Value) -> StoreResult<()> {
        let text = serde_json::to_string(value).map_err(|e| StoreError::corrupt(key, e))?;

        sqlx::query(
            "INSERT INTO documents (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(text)
        .execute(&self.pool)
        .await?;

        debug!(key, "Embedded key written");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_round_trip() {
        let store = EmbeddedStore::open_in_memory().await.unwrap();

        let value = json!({"systemName": "Rasid", "enableStockAlerts": true});
        store.write("settings", &value).await.unwrap();

        assert_eq!(store.read("settings").await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn test_absent_is_none_not_error() {
        let store = EmbeddedStore::open_in_memory().await.unwrap();
        assert!(store.read("customers").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_replaces_whole_value() {
        let store = EmbeddedStore::open_in_memory().await.unwrap();

        store.write("units", &json!([1, 2])).await.unwrap();
        store.write("units", &json!([3])).await.unwrap();

        assert_eq!(store.read("units").await.unwrap(), Some(json!([3])));
    }

    #[tokio::test]
    async fn test_reserved_keys_share_the_table() {
        let store = EmbeddedStore::open_in_memory().await.unwrap();

        store
            .write(crate::document::RESERVED_DIRECTORY_POINTER, &json!("/shop/data"))
            .await
            .unwrap();

        assert_eq!(
            store
                .read(crate::document::RESERVED_DIRECTORY_POINTER)
                .await
                .unwrap(),
            Some(json!("/shop/data"))
        );
        // documents are untouched
        assert!(store.read("products").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rasid.db");

        let store = EmbeddedStore::open(&path).await.unwrap();
        store.write("products", &json!([])).await.unwrap();

        assert!(path.exists());
    }
}
