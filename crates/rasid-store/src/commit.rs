//! # Durable Unit of Work
//!
//! Multi-document commits with crash recovery.
//!
//! ## Why This Exists
//! Finalizing a sale must change three documents together: products
//! (stock), customers (debt), invoices (the new record). The backends
//! only offer single-document writes, so a crash between them could
//! leave a sale half-applied - stock gone, invoice missing.
//!
//! ## Commit Protocol (roll-forward)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  stage(products), stage(customers), stage(invoices)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. write the FULL staged batch to the embedded store under the        │
//! │     reserved `pending-commit` key  ◄── the durability point            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. apply each staged write, in stage order, to the ACTIVE backend     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. clear the marker                                                    │
//! │                                                                         │
//! │  Crash before 1 → nothing happened.                                    │
//! │  Crash after 1  → next startup replays the whole batch (writes are     │
//! │                   whole-document, so replaying is idempotent), then    │
//! │                   clears the marker.                                   │
//! │                                                                         │
//! │  The marker ALWAYS lives in the embedded store: it must be readable    │
//! │  at startup before the directory backend is re-verified.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::backend::DocumentStore;
use crate::document::{DocumentKey, RESERVED_PENDING_COMMIT};
use crate::error::{StoreError, StoreResult};
use crate::manager::StorageManager;

/// One staged whole-document replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedWrite {
    pub key: DocumentKey,
    pub value: Value,
}

/// The durable marker format: the entire batch, in apply order.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PendingCommit {
    writes: Vec<StagedWrite>,
}

/// Stages document replacements and commits them as one ordered,
/// crash-recoverable batch.
pub struct UnitOfWork<'a> {
    manager: &'a StorageManager,
    writes: Vec<StagedWrite>,
}

impl<'a> UnitOfWork<'a> {
    pub fn new(manager: &'a StorageManager) -> Self {
        UnitOfWork {
            manager,
            writes: Vec::new(),
        }
    }

    /// Stages the new full content for a document. Serialization happens
    /// here so a bad value fails before anything touches storage.
    pub fn stage<T: Serialize>(&mut self, key: DocumentKey, content: &T) -> StoreResult<()> {
        let value = serde_json::to_value(content).map_err(|e| StoreError::corrupt(key.as_str(), e))?;
        self.writes.push(StagedWrite { key, value });
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Commits the batch: durable marker, ordered apply, marker clear.
    pub async fn commit(self) -> StoreResult<()> {
        if self.writes.is_empty() {
            return Ok(());
        }

        let marker = serde_json::to_value(&PendingCommit {
            writes: self.writes.clone(),
        })
        .map_err(|e| StoreError::corrupt(RESERVED_PENDING_COMMIT, e))?;

        self.manager
            .embedded()
            .write(RESERVED_PENDING_COMMIT, &marker)
            .await?;

        for staged in &self.writes {
            self.manager.write_document(staged.key, &staged.value).await?;
        }

        clear_marker(self.manager).await?;

        info!(documents = self.writes.len(), "Unit of work committed");
        Ok(())
    }
}

/// Rolls forward a commit interrupted by a crash.
///
/// Call once at startup, BEFORE the loader: a replayed batch must be
/// visible to the initial load. Returns whether anything was replayed.
pub async fn replay_pending(manager: &StorageManager) -> StoreResult<bool> {
    let Some(value) = manager.embedded().read(RESERVED_PENDING_COMMIT).await? else {
        return Ok(false);
    };
    if value.is_null() {
        return Ok(false);
    }

    let pending: PendingCommit = match serde_json::from_value(value) {
        Ok(pending) => pending,
        Err(e) => {
            // A marker we cannot parse cannot be replayed; dropping it is
            // the only way forward, and the documents themselves are
            // untouched by a half-written marker.
            warn!(error = %e, "Discarding unreadable pending-commit marker");
            clear_marker(manager).await?;
            return Ok(false);
        }
    };

    warn!(
        documents = pending.writes.len(),
        "Replaying interrupted commit"
    );

    for staged in &pending.writes {
        manager.write_document(staged.key, &staged.value).await?;
    }

    clear_marker(manager).await?;
    Ok(true)
}

async fn clear_marker(manager: &StorageManager) -> StoreResult<()> {
    manager
        .embedded()
        .write(RESERVED_PENDING_COMMIT, &Value::Null)
        .await
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::EmbeddedStore;
    use serde_json::json;

    async fn fresh_manager() -> StorageManager {
        StorageManager::new(EmbeddedStore::open_in_memory().await.unwrap(), None)
    }

    #[tokio::test]
    async fn test_commit_applies_in_order_and_clears_marker() {
        let manager = fresh_manager().await;

        let mut uow = UnitOfWork::new(&manager);
        uow.stage(DocumentKey::Products, &json!([{"id": "p1"}])).unwrap();
        uow.stage(DocumentKey::Invoices, &json!([{"id": "INV-1"}])).unwrap();
        uow.commit().await.unwrap();

        assert_eq!(
            manager.read_document(DocumentKey::Products).await.unwrap(),
            Some(json!([{"id": "p1"}]))
        );
        assert_eq!(
            manager.read_document(DocumentKey::Invoices).await.unwrap(),
            Some(json!([{"id": "INV-1"}]))
        );

        // no leftover marker
        assert!(!replay_pending(&manager).await.unwrap());
    }

    #[tokio::test]
    async fn test_interrupted_commit_is_rolled_forward() {
        let manager = fresh_manager().await;

        // simulate a crash right after the durability point: the marker
        // is written, none of the documents are
        let marker = json!({
            "writes": [
                {"key": "products",  "value": [{"id": "p1", "quantity": 2}]},
                {"key": "customers", "value": [{"id": "c1", "debt": 1500}]},
                {"key": "invoices",  "value": [{"id": "INV-9"}]}
            ]
        });
        manager
            .embedded()
            .write(RESERVED_PENDING_COMMIT, &marker)
            .await
            .unwrap();

        assert!(replay_pending(&manager).await.unwrap());

        assert_eq!(
            manager.read_document(DocumentKey::Customers).await.unwrap(),
            Some(json!([{"id": "c1", "debt": 1500}]))
        );
        // replay is one-shot
        assert!(!replay_pending(&manager).await.unwrap());
    }

    #[tokio::test]
    async fn test_replay_without_marker_is_a_noop() {
        let manager = fresh_manager().await;
        assert!(!replay_pending(&manager).await.unwrap());
    }

    #[tokio::test]
    async fn test_unreadable_marker_is_discarded() {
        let manager = fresh_manager().await;

        manager
            .embedded()
            .write(RESERVED_PENDING_COMMIT, &json!({"not": "a batch"}))
            .await
            .unwrap();

        assert!(!replay_pending(&manager).await.unwrap());
        // discarded for good
        assert!(!replay_pending(&manager).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_unit_of_work_commits_nothing() {
        let manager = fresh_manager().await;
        let uow = UnitOfWork::new(&manager);
        assert!(uow.is_empty());
        uow.commit().await.unwrap();

        assert!(manager
            .embedded()
            .read(RESERVED_PENDING_COMMIT)
            .await
            .unwrap()
            .is_none());
    }
}
