//! # Scanner Collaborator
//!
//! The remote barcode scanner as an injected capability.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  ScannerManager Lifecycle                               │
//! │                                                                         │
//! │  settings loaded ──► initialize(settings)                              │
//! │                          │                                              │
//! │                          ├── already connected ──► no-op               │
//! │                          ├── no scanner config ──► stays idle          │
//! │                          └── config present ─────► connector.connect   │
//! │                                                    (failure logged,    │
//! │                                                     never fatal)       │
//! │                                                                         │
//! │  settings saved with CHANGED scanner fields:                           │
//! │      teardown() ──► initialize(new settings)                           │
//! │                                                                         │
//! │  The manager owns the single live connection. There is no              │
//! │  process-wide singleton; whoever needs scan events holds the           │
//! │  manager (or the session that owns it).                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The core never implements scanning itself: it asks the collaborator
//! to start listening (`request_scan`) and receives decoded barcode
//! strings through a subscription callback.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use rasid_core::types::{ScannerConfig, SystemSettings};

/// Callback invoked with a decoded barcode string when a scan completes.
pub type ScanCallback = Box<dyn Fn(String) + Send + Sync>;

/// Handle returned by `subscribe`; dropping it unsubscribes.
pub struct ScanSubscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl ScanSubscription {
    /// Wraps the collaborator's cancellation hook.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        ScanSubscription {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl Drop for ScanSubscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// A live connection to the remote scanner service.
#[async_trait]
pub trait BarcodeScanner: Send + Sync {
    /// Asks the collaborator to begin listening for a physical scan.
    async fn request_scan(&self);

    /// Registers a callback for decoded barcodes. Replaces any previous
    /// subscription from the same consumer.
    fn subscribe(&self, callback: ScanCallback) -> ScanSubscription;

    /// Round-trips the connection to verify it is alive.
    async fn check_connection(&self) -> bool;
}

/// Builds scanner connections from settings-derived configuration.
#[async_trait]
pub trait ScannerConnector: Send + Sync {
    async fn connect(&self, config: &ScannerConfig) -> Result<Arc<dyn BarcodeScanner>, String>;
}

/// Owns the (at most one) live scanner connection.
pub struct ScannerManager {
    connector: Option<Arc<dyn ScannerConnector>>,
    active: Mutex<Option<Arc<dyn BarcodeScanner>>>,
}

impl ScannerManager {
    /// A manager that can connect through the given collaborator.
    pub fn new(connector: Arc<dyn ScannerConnector>) -> Self {
        ScannerManager {
            connector: Some(connector),
            active: Mutex::new(None),
        }
    }

    /// A manager for environments with no scanner integration at all.
    pub fn disabled() -> Self {
        ScannerManager {
            connector: None,
            active: Mutex::new(None),
        }
    }

    /// Connects if the settings carry a scanner config.
    ///
    /// Idempotent: a live connection makes this a no-op, and connection
    /// failures are logged, never propagated - the till works without
    /// its scanner.
    pub async fn initialize(&self, settings: &SystemSettings) {
        if self.is_active() {
            debug!("Scanner already connected; skipping re-init");
            return;
        }

        let Some(connector) = &self.connector else {
            return;
        };
        let Some(config) = settings.scanner_config() else {
            debug!("No scanner configuration in settings");
            return;
        };

        match connector.connect(&config).await {
            Ok(connection) => {
                info!(project = %config.project_id, "Scanner connected");
                *self.active.lock().expect("scanner lock poisoned") = Some(connection);
            }
            Err(e) => {
                warn!(error = %e, "Scanner connection failed");
            }
        }
    }

    /// Drops the live connection, if any.
    pub fn teardown(&self) {
        if self
            .active
            .lock()
            .expect("scanner lock poisoned")
            .take()
            .is_some()
        {
            info!("Scanner disconnected");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.lock().expect("scanner lock poisoned").is_some()
    }

    /// Asks the collaborator to begin listening for a scan.
    pub async fn request_scan(&self) {
        let connection = self.connection();
        match connection {
            Some(scanner) => scanner.request_scan().await,
            None => warn!("Scan requested with no scanner connected"),
        }
    }

    /// Subscribes to decoded barcodes, if connected.
    pub fn subscribe(&self, callback: ScanCallback) -> Option<ScanSubscription> {
        self.connection().map(|scanner| scanner.subscribe(callback))
    }

    /// Verifies the live connection end to end.
    pub async fn check_connection(&self) -> bool {
        match self.connection() {
            Some(scanner) => scanner.check_connection().await,
            None => false,
        }
    }

    fn connection(&self) -> Option<Arc<dyn BarcodeScanner>> {
        self.active.lock().expect("scanner lock poisoned").clone()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
