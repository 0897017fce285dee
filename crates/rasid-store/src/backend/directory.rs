//! # Directory Backend
//!
//! One pretty-printed JSON file per document inside a user-chosen
//! directory: `<root>/<key>.json`.
//!
//! ## Permission Model
//! The directory is an external, revocable resource. Access is verified
//! with a probe write at mode-transition time only; a mid-session
//! revocation therefore surfaces as a failed read/write, not a
//! re-prompt. The negotiator in `manager` handles the transition-time
//! failures; this module just reports them faithfully.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::DocumentStore;
use crate::error::{StoreError, StoreResult};

/// Name of the throwaway file used to verify read-write access.
const PROBE_FILE: &str = ".rasid-probe";

/// Directory-of-JSON-files backend.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Wraps a directory path. No I/O happens here; call
    /// [`verify_permission`](Self::verify_permission) before trusting it.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryStore { root: root.into() }
    }

    /// The wrapped directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory's display name (last path component).
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }

    /// Checks that the directory exists and is writable.
    ///
    /// A probe file is created and removed; that is the only reliable
    /// cross-platform answer to "can I write here", the native analogue
    /// of the permission query a sandboxed environment would make.
    pub async fn verify_permission(&self) -> bool {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                warn!(path = %self.root.display(), "Storage path is not a directory");
                return false;
            }
            Err(e) => {
                warn!(path = %self.root.display(), error = %e, "Storage directory unavailable");
                return false;
            }
        }

        let probe = self.root.join(PROBE_FILE);
        match tokio::fs::write(&probe, b"probe").await {
            Ok(()) => {
                // best-effort cleanup; a leftover probe file is harmless
                let _ = tokio::fs::remove_file(&probe).await;
                true
            }
            Err(e) => {
                warn!(path = %self.root.display(), error = %e, "Probe write failed");
                false
            }
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

#[async_trait]
impl DocumentStore for DirectoryStore {
    /// Reads `<root>/<key>.json`.
    ///
    /// A missing file is `Ok(None)`; unparsable content is `Corrupt`.
    /// The two outcomes are deliberately kept apart - only absence may
    /// trigger default-seeding upstream.
    async fn read(&self, key: &str) -> StoreResult<Option<Value>> {
        let path = self.path_for(key);

        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(key, "Document file absent");
                return Ok(None);
            }
            // permission was verified at mode-transition time; the host
            // revoked it mid-session
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                return Err(StoreError::PermissionDenied {
                    path: self.root.clone(),
                })
            }
            Err(source) => {
                return Err(StoreError::Io {
                    key: key.to_string(),
                    source,
                })
            }
        };

        let value = serde_json::from_str(&text).map_err(|e| StoreError::corrupt(key, e))?;
        Ok(Some(value))
    }

    /// Creates or truncates `<root>/<key>.json` with pretty-printed JSON.
    async fn write(&self, key: &str, value: &Value) -> StoreResult<()> {
        let path = self.path_for(key);
        let text = serde_json::to_string_pretty(value).map_err(|e| StoreError::corrupt(key, e))?;

        tokio::fs::write(&path, text)
            .await
            .map_err(|source| match source.kind() {
                ErrorKind::PermissionDenied => StoreError::PermissionDenied {
                    path: self.root.clone(),
                },
                _ => StoreError::Io {
                    key: key.to_string(),
                    source,
                },
            })?;

        debug!(key, path = %path.display(), "Document written");
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
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());

        let value = json!([{"id": "p1", "name": "Tea", "price": 1500}]);
        store.write("products", &value).await.unwrap();

        let back = store.read("products").await.unwrap();
        assert_eq!(back, Some(value));
    }

    #[tokio::test]
    async fn test_absent_is_none_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());

        assert!(store.read("products").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_distinct_from_absent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("products.json"), "{not json!").unwrap();

        let store = DirectoryStore::new(dir.path());
        assert!(matches!(
            store.read("products").await,
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn test_write_truncates_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());

        store.write("units", &json!([1, 2, 3])).await.unwrap();
        store.write("units", &json!([9])).await.unwrap();

        assert_eq!(store.read("units").await.unwrap(), Some(json!([9])));
    }

    #[tokio::test]
    async fn test_files_are_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());

        store.write("settings", &json!({"systemName": "Rasid"})).await.unwrap();

        let text = std::fs::read_to_string(dir.path().join("settings.json")).unwrap();
        assert!(text.contains('\n'), "expected indented JSON, got {text:?}");
    }

    #[tokio::test]
    async fn test_verify_permission() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DirectoryStore::new(dir.path()).verify_permission().await);

        // a path that does not exist has no permission
        let gone = dir.path().join("missing");
        assert!(!DirectoryStore::new(gone).verify_permission().await);
    }

    #[tokio::test]
    async fn test_directory_name() {
        let store = DirectoryStore::new("/data/shop-files");
        assert_eq!(store.name(), "shop-files");
    }
}
