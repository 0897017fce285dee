//! # Storage Manager & Mode Negotiator
//!
//! Decides at startup which backend is active, keeps that decision
//! consistent for the session, and dispatches every document read/write
//! through it so callers never branch on mode.
//!
//! ## Negotiation State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Undetermined                                                          │
//! │       │                                                                 │
//! │       ├── no picker configured ──────────────► Ready(EmbeddedBacked)   │
//! │       │                                        (one-time notice)        │
//! │       │                                                                 │
//! │       ├── remembered pointer, probe OK ──────► Ready(DirectoryBacked)  │
//! │       │                                                                 │
//! │       └── no pointer / probe failed ─────────► AwaitingPermission      │
//! │                                                     │                   │
//! │                 ┌───────────────────────────────────┤                   │
//! │                 ▼                                   ▼                   │
//! │        user picks a directory              cancel / denied              │
//! │        probe OK, pointer persisted         fall back if not already     │
//! │                 │                          directory-backed             │
//! │                 ▼                                   ▼                   │
//! │        Ready(DirectoryBacked)              Ready(EmbeddedBacked)       │
//! │                                                                         │
//! │  There is NO unrecoverable startup path: every branch ends Ready.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Pointer Chicken-and-Egg
//! The remembered directory pointer is kept in the **embedded** store
//! regardless of the active mode - it must be readable before any
//! directory is available, and it must survive switching away from one.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::backend::{DirectoryStore, DocumentStore, EmbeddedStore};
use crate::document::{
    DocumentKey, RESERVED_ACTIVATION, RESERVED_DIRECTORY_POINTER, RESERVED_EMBEDDED_NOTICE,
};
use crate::error::{StoreError, StoreResult};

// =============================================================================
// Collaborators & Outcomes
// =============================================================================

/// The host environment's directory-selection capability.
///
/// Injected rather than detected: a configured picker *is* the
/// capability. Returning `None` means the user cancelled or the host
/// denied the request - never an error.
#[async_trait]
pub trait DirectoryPicker: Send + Sync {
    async fn pick_directory(&self) -> Option<PathBuf>;
}

/// Which backend is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Documents live as `<key>.json` files in a chosen directory.
    DirectoryBacked,
    /// Documents live in the embedded SQLite store.
    EmbeddedBacked,
}

/// Result of the startup negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Negotiation {
    /// A backend is active; loading may proceed.
    Ready {
        mode: StorageMode,
        /// True exactly once per install: the environment has no picker
        /// and the user has not yet been told data stays embedded.
        first_embedded_fallback: bool,
    },
    /// Blocking state: a directory must be chosen (or declined) before
    /// anything loads.
    AwaitingPermission,
}

/// Result of an explicit directory selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectorySelection {
    /// Switched to the chosen directory; the caller must reload all
    /// documents from it, discarding in-memory state.
    Chosen { name: String },
    /// The picker was dismissed. `fell_back` is true when this resolved
    /// a pending negotiation by activating the embedded store.
    Cancelled { fell_back: bool },
    /// Read-write access to the chosen directory was denied.
    Denied { fell_back: bool },
}

// =============================================================================
// Storage Manager
// =============================================================================

/// Owns both backends and the current mode; the single dispatch point
/// for every document read and write.
///
/// The embedded store is always open (it also hosts the reserved keys);
/// a directory store exists only while directory-backed.
pub struct StorageManager {
    embedded: EmbeddedStore,
    directory: RwLock<Option<DirectoryStore>>,
    mode: RwLock<StorageMode>,
    picker: Option<Arc<dyn DirectoryPicker>>,
}

impl StorageManager {
    /// Creates a manager in the embedded mode; call
    /// [`negotiate`](Self::negotiate) before loading documents.
    pub fn new(embedded: EmbeddedStore, picker: Option<Arc<dyn DirectoryPicker>>) -> Self {
        StorageManager {
            embedded,
            directory: RwLock::new(None),
            mode: RwLock::new(StorageMode::EmbeddedBacked),
            picker,
        }
    }

    /// Whether the host environment can pick directories at all.
    pub fn supports_directory(&self) -> bool {
        self.picker.is_some()
    }

    /// The currently active mode.
    pub fn mode(&self) -> StorageMode {
        *self.mode.read().expect("storage mode lock poisoned")
    }

    /// Display name of the active directory, if directory-backed.
    pub fn directory_name(&self) -> Option<String> {
        self.directory
            .read()
            .expect("directory lock poisoned")
            .as_ref()
            .map(DirectoryStore::name)
    }

    /// The always-available embedded store (reserved keys, pending
    /// commits).
    pub fn embedded(&self) -> &EmbeddedStore {
        &self.embedded
    }

    // -------------------------------------------------------------------------
    // Negotiation
    // -------------------------------------------------------------------------

    /// Runs the startup negotiation.
    ///
    /// Never fails into an unusable state: every error path below is a
    /// genuine store fault (e.g. the embedded database cannot be read),
    /// not a permission problem.
    pub async fn negotiate(&self) -> StoreResult<Negotiation> {
        if self.picker.is_none() {
            // No capability: embedded immediately, with a one-time notice.
            self.set_embedded();

            let notified = self.embedded.read(RESERVED_EMBEDDED_NOTICE).await?.is_some();
            if !notified {
                self.embedded
                    .write(RESERVED_EMBEDDED_NOTICE, &json!(true))
                    .await?;
            }

            info!("No directory capability; embedded store active");
            return Ok(Negotiation::Ready {
                mode: StorageMode::EmbeddedBacked,
                first_embedded_fallback: !notified,
            });
        }

        match self.remembered_directory().await? {
            Some(path) => {
                let store = DirectoryStore::new(path);
                if store.verify_permission().await {
                    info!(directory = %store.name(), "Remembered directory verified");
                    self.install_directory(store);
                    Ok(Negotiation::Ready {
                        mode: StorageMode::DirectoryBacked,
                        first_embedded_fallback: false,
                    })
                } else {
                    // Previously granted access is gone; the user must
                    // re-select before anything renders.
                    warn!("Remembered directory failed permission check");
                    Ok(Negotiation::AwaitingPermission)
                }
            }
            None => Ok(Negotiation::AwaitingPermission),
        }
    }

    /// Runs the picker and, on success, switches to the chosen
    /// directory.
    ///
    /// Used both to resolve `AwaitingPermission` and for a later
    /// "change storage folder" action. Cancellation and denial are
    /// non-fatal; they activate the embedded store only when no
    /// directory was already live.
    pub async fn choose_directory(&self) -> StoreResult<DirectorySelection> {
        let picker = self.picker.as_ref().ok_or(StoreError::PickerUnavailable)?;

        let Some(path) = picker.pick_directory().await else {
            info!("Directory selection cancelled");
            return Ok(DirectorySelection::Cancelled {
                fell_back: self.fall_back_unless_directory_backed(),
            });
        };

        let store = DirectoryStore::new(path);
        if !store.verify_permission().await {
            warn!(directory = %store.name(), "Selected directory denied read-write access");
            return Ok(DirectorySelection::Denied {
                fell_back: self.fall_back_unless_directory_backed(),
            });
        }

        // Persist the pointer first: it lives in the embedded store no
        // matter which mode ends up active.
        self.embedded
            .write(
                RESERVED_DIRECTORY_POINTER,
                &json!(store.root().display().to_string()),
            )
            .await?;

        let name = store.name();
        info!(directory = %name, "Switched to directory-backed storage");
        self.install_directory(store);

        Ok(DirectorySelection::Chosen { name })
    }

    /// Forgets the remembered directory so the next startup negotiates
    /// from scratch. Part of the reset-all flow.
    pub async fn clear_directory_pointer(&self) -> StoreResult<()> {
        self.embedded
            .write(RESERVED_DIRECTORY_POINTER, &Value::Null)
            .await
    }

    async fn remembered_directory(&self) -> StoreResult<Option<PathBuf>> {
        let value = self.embedded.read(RESERVED_DIRECTORY_POINTER).await?;
        Ok(match value {
            Some(Value::String(path)) if !path.is_empty() => Some(PathBuf::from(path)),
            _ => None,
        })
    }

    fn install_directory(&self, store: DirectoryStore) {
        *self.directory.write().expect("directory lock poisoned") = Some(store);
        *self.mode.write().expect("storage mode lock poisoned") = StorageMode::DirectoryBacked;
    }

    fn set_embedded(&self) {
        *self.mode.write().expect("storage mode lock poisoned") = StorageMode::EmbeddedBacked;
    }

    /// Embedded fallback for a failed selection. Returns true when the
    /// mode actually changed (i.e. no directory was already active).
    fn fall_back_unless_directory_backed(&self) -> bool {
        let directory_live = self
            .directory
            .read()
            .expect("directory lock poisoned")
            .is_some();

        if directory_live {
            false
        } else {
            self.set_embedded();
            true
        }
    }

    // -------------------------------------------------------------------------
    // Document Dispatch
    // -------------------------------------------------------------------------

    /// Reads a document through whichever backend is active *now*.
    pub async fn read_document(&self, key: DocumentKey) -> StoreResult<Option<Value>> {
        match self.active_backend() {
            ActiveBackend::Directory(store) => store.read(key.as_str()).await,
            ActiveBackend::Embedded(store) => store.read(key.as_str()).await,
        }
    }

    /// Writes a document through whichever backend is active *now*.
    ///
    /// The backend is chosen per call, not cached from load time, so a
    /// mid-session mode switch redirects subsequent saves.
    pub async fn write_document(&self, key: DocumentKey, value: &Value) -> StoreResult<()> {
        match self.active_backend() {
            ActiveBackend::Directory(store) => store.write(key.as_str(), value).await,
            ActiveBackend::Embedded(store) => store.write(key.as_str(), value).await,
        }
    }

    fn active_backend(&self) -> ActiveBackend {
        if self.mode() == StorageMode::DirectoryBacked {
            let directory = self
                .directory
                .read()
                .expect("directory lock poisoned")
                .clone();
            if let Some(store) = directory {
                return ActiveBackend::Directory(store);
            }
            // Directory mode without a store is a bug elsewhere; degrade
            // loudly rather than lose the write.
            warn!("Directory mode with no directory store; using embedded");
        }
        ActiveBackend::Embedded(self.embedded.clone())
    }

    // -------------------------------------------------------------------------
    // Activation Flag
    // -------------------------------------------------------------------------

    /// Whether the one-time product activation has happened.
    pub async fn is_activated(&self) -> StoreResult<bool> {
        Ok(matches!(
            self.embedded.read(RESERVED_ACTIVATION).await?,
            Some(Value::Bool(true))
        ))
    }

    /// Records the one-time product activation.
    pub async fn activate(&self) -> StoreResult<()> {
        self.embedded.write(RESERVED_ACTIVATION, &json!(true)).await
    }

    /// Clears the activation flag. Part of the reset-all flow.
    pub async fn deactivate(&self) -> StoreResult<()> {
        self.embedded.write(RESERVED_ACTIVATION, &Value::Null).await
    }
}

/// A snapshot of the active backend for one operation.
enum ActiveBackend {
    Directory(DirectoryStore),
    Embedded(EmbeddedStore),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Picker stub that returns a fixed answer.
    struct FixedPicker(Option<PathBuf>);

    #[async_trait]
    impl DirectoryPicker for FixedPicker {
        async fn pick_directory(&self) -> Option<PathBuf> {
            self.0.clone()
        }
    }

    async fn manager_without_picker() -> StorageManager {
        StorageManager::new(EmbeddedStore::open_in_memory().await.unwrap(), None)
    }

    async fn manager_with_picker(answer: Option<PathBuf>) -> StorageManager {
        StorageManager::new(
            EmbeddedStore::open_in_memory().await.unwrap(),
            Some(Arc::new(FixedPicker(answer))),
        )
    }

    #[tokio::test]
    async fn test_no_picker_always_reaches_embedded_without_interaction() {
        let manager = manager_without_picker().await;

        let outcome = manager.negotiate().await.unwrap();
        assert_eq!(
            outcome,
            Negotiation::Ready {
                mode: StorageMode::EmbeddedBacked,
                first_embedded_fallback: true,
            }
        );

        // the notice fires only on the first occurrence
        let outcome = manager.negotiate().await.unwrap();
        assert_eq!(
            outcome,
            Negotiation::Ready {
                mode: StorageMode::EmbeddedBacked,
                first_embedded_fallback: false,
            }
        );
    }

    #[tokio::test]
    async fn test_picker_without_pointer_awaits_permission() {
        let manager = manager_with_picker(None).await;
        assert_eq!(
            manager.negotiate().await.unwrap(),
            Negotiation::AwaitingPermission
        );
    }

    #[tokio::test]
    async fn test_remembered_directory_is_verified_and_activated() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with_picker(None).await;

        // simulate a previous session's persisted pointer
        manager
            .embedded()
            .write(
                RESERVED_DIRECTORY_POINTER,
                &json!(dir.path().display().to_string()),
            )
            .await
            .unwrap();

        let outcome = manager.negotiate().await.unwrap();
        assert_eq!(
            outcome,
            Negotiation::Ready {
                mode: StorageMode::DirectoryBacked,
                first_embedded_fallback: false,
            }
        );
        assert_eq!(manager.mode(), StorageMode::DirectoryBacked);
    }

    #[tokio::test]
    async fn test_stale_pointer_falls_back_to_prompt() {
        let manager = manager_with_picker(None).await;

        manager
            .embedded()
            .write(RESERVED_DIRECTORY_POINTER, &json!("/no/such/directory"))
            .await
            .unwrap();

        assert_eq!(
            manager.negotiate().await.unwrap(),
            Negotiation::AwaitingPermission
        );
    }

    #[tokio::test]
    async fn test_choose_directory_persists_pointer() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with_picker(Some(dir.path().to_path_buf())).await;

        let outcome = manager.choose_directory().await.unwrap();
        assert!(matches!(outcome, DirectorySelection::Chosen { .. }));
        assert_eq!(manager.mode(), StorageMode::DirectoryBacked);

        // the pointer survives in the embedded store for the next start
        let pointer = manager
            .embedded()
            .read(RESERVED_DIRECTORY_POINTER)
            .await
            .unwrap();
        assert_eq!(pointer, Some(json!(dir.path().display().to_string())));
    }

    #[tokio::test]
    async fn test_cancellation_falls_back_only_when_unbacked() {
        let manager = manager_with_picker(None).await;

        let outcome = manager.choose_directory().await.unwrap();
        assert_eq!(outcome, DirectorySelection::Cancelled { fell_back: true });
        assert_eq!(manager.mode(), StorageMode::EmbeddedBacked);
    }

    #[tokio::test]
    async fn test_cancellation_keeps_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with_picker(Some(dir.path().to_path_buf())).await;
        manager.choose_directory().await.unwrap();

        // second selection attempt gets dismissed
        let cancelled = StorageManager::new(
            manager.embedded().clone(),
            Some(Arc::new(FixedPicker(None))),
        );
        cancelled.install_directory(DirectoryStore::new(dir.path()));

        let outcome = cancelled.choose_directory().await.unwrap();
        assert_eq!(outcome, DirectorySelection::Cancelled { fell_back: false });
        assert_eq!(cancelled.mode(), StorageMode::DirectoryBacked);
    }

    #[tokio::test]
    async fn test_dispatch_follows_current_mode() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with_picker(Some(dir.path().to_path_buf())).await;

        // embedded mode first
        manager
            .write_document(DocumentKey::Units, &json!([1]))
            .await
            .unwrap();
        assert!(!dir.path().join("units.json").exists());

        // switch, then the SAME call lands in the directory
        manager.choose_directory().await.unwrap();
        manager
            .write_document(DocumentKey::Units, &json!([2]))
            .await
            .unwrap();
        assert!(dir.path().join("units.json").exists());
    }

    #[tokio::test]
    async fn test_activation_flag() {
        let manager = manager_without_picker().await;

        assert!(!manager.is_activated().await.unwrap());
        manager.activate().await.unwrap();
        assert!(manager.is_activated().await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_directory_pointer() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_with_picker(Some(dir.path().to_path_buf())).await;
        manager.choose_directory().await.unwrap();

        manager.clear_directory_pointer().await.unwrap();

        let fresh = StorageManager::new(
            manager.embedded().clone(),
            Some(Arc::new(FixedPicker(None))),
        );
        assert_eq!(
            fresh.negotiate().await.unwrap(),
            Negotiation::AwaitingPermission
        );
    }
}
