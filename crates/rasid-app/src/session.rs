//! # Session
//!
//! The in-memory working set of all six documents, the generic save
//! pipeline that keeps it in lockstep with storage, and the bootstrap
//! state machine that produces a ready session.
//!
//! ## Save Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               One Save, Every Mutation                                  │
//! │                                                                         │
//! │  ops::save_product / settle_debt / finalize_sale / ...                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  save_<document>(new_content)                                           │
//! │       │                                                                 │
//! │       ├── (a) replace the in-memory copy SYNCHRONOUSLY                 │
//! │       │       the shell sees the change immediately                    │
//! │       │                                                                 │
//! │       └── (b) persist the whole document through whichever backend     │
//! │               is active AT THIS MOMENT (never cached from load time)   │
//! │                                                                         │
//! │  There is no rollback: if (b) fails, memory is ahead of storage.       │
//! │  The failure is surfaced as a notice; the next successful save of      │
//! │  the same document re-converges the two.                               │
//! │                                                                         │
//! │  Callers chaining dependent writes await each save before the next     │
//! │  to keep write ordering; checkout goes further and batches its three   │
//! │  writes in a durable unit of work (see ops::checkout).                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Bootstrap
//! ```text
//! replay pending commit ─► negotiate ─┬─► Ready ───────────► Session
//! (roll-forward)                      └─► AwaitingDirectory ─► PendingSession
//!                                          (blocking; resolves either way
//!                                           into a Session)
//! ```

use std::sync::{Arc, Mutex, RwLock};

use serde::Serialize;
use tracing::{info, warn};

use rasid_core::cart::Cart;
use rasid_core::defaults;
use rasid_core::types::{
    Customer, Invoice, Product, SystemSettings, Unit, User,
};
use rasid_store::loader::{self, DomainState};
use rasid_store::manager::{DirectorySelection, Negotiation, StorageMode};
use rasid_store::{commit, DocumentKey, StorageManager};

use crate::error::AppResult;
use crate::notify::{Notice, Notifier, TracingNotifier};
use crate::receipt::{LogReceiptRenderer, ReceiptRenderer};
use crate::scanner::ScannerManager;

// =============================================================================
// Collaborators
// =============================================================================

/// The external collaborators a session talks to.
pub struct Collaborators {
    pub notifier: Arc<dyn Notifier>,
    pub scanner: ScannerManager,
    pub receipt: Arc<dyn ReceiptRenderer>,
}

impl Default for Collaborators {
    /// Headless defaults: log notices, no scanner, log receipts.
    fn default() -> Self {
        Collaborators {
            notifier: Arc::new(TracingNotifier),
            scanner: ScannerManager::disabled(),
            receipt: Arc::new(LogReceiptRenderer),
        }
    }
}

// =============================================================================
// Bootstrap
// =============================================================================

/// Result of starting a session.
pub enum Bootstrap {
    /// Storage is ready and all documents are loaded.
    Ready(Session),
    /// A directory must be chosen (or declined) before anything loads.
    AwaitingDirectory(PendingSession),
}

/// The blocking `AwaitingPermission` state: holds everything needed to
/// finish startup once the user answers the directory prompt.
pub struct PendingSession {
    manager: Arc<StorageManager>,
    collaborators: Collaborators,
}

impl PendingSession {
    /// Runs the directory picker and finishes startup.
    ///
    /// Always resolves into a usable session: a chosen directory becomes
    /// the active backend; cancellation or denial falls back to the
    /// embedded store. There is no failure path that leaves the app
    /// without storage.
    pub async fn choose_directory(self) -> AppResult<Session> {
        let notifier = &self.collaborators.notifier;

        match self.manager.choose_directory().await? {
            DirectorySelection::Chosen { name } => {
                notifier.notify(Notice::success(format!(
                    "Folder \"{name}\" selected; data will be loaded from it"
                )));
            }
            DirectorySelection::Cancelled { .. } => {
                notifier.notify(Notice::error(
                    "No folder selected; data will be kept in the embedded store",
                ));
            }
            DirectorySelection::Denied { .. } => {
                notifier.notify(Notice::error(
                    "Access to the folder was denied; data will be kept in the embedded store",
                ));
            }
        }

        Session::finish_bootstrap(self.manager, self.collaborators).await
    }

    /// Skips the prompt entirely (e.g. a headless run answering "no").
    pub async fn fall_back_to_embedded(self) -> AppResult<Session> {
        Session::finish_bootstrap(self.manager, self.collaborators).await
    }
}

// =============================================================================
// Session
// =============================================================================

/// A running application: loaded documents, the active cart, the
/// authenticated user, and the storage manager behind them.
pub struct Session {
    manager: Arc<StorageManager>,
    state: RwLock<DomainState>,
    cart: Mutex<Cart>,
    current_user: RwLock<Option<User>>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) scanner: ScannerManager,
    pub(crate) receipt: Arc<dyn ReceiptRenderer>,
}

impl Session {
    /// Starts a session: rolls forward any interrupted commit, runs the
    /// storage-mode negotiation, and - when a backend is ready - loads
    /// all six documents.
    pub async fn bootstrap(
        manager: StorageManager,
        collaborators: Collaborators,
    ) -> AppResult<Bootstrap> {
        let manager = Arc::new(manager);

        // An interrupted checkout must be repaired BEFORE the loader
        // reads the documents it touches.
        if commit::replay_pending(&manager).await? {
            collaborators
                .notifier
                .notify(Notice::success("Recovered an interrupted sale"));
        }

        match manager.negotiate().await? {
            Negotiation::Ready {
                first_embedded_fallback,
                ..
            } => {
                if first_embedded_fallback {
                    collaborators.notifier.notify(Notice::error(
                        "This environment cannot save to a folder; data will be kept in the embedded store",
                    ));
                }
                Ok(Bootstrap::Ready(
                    Session::finish_bootstrap(manager, collaborators).await?,
                ))
            }
            Negotiation::AwaitingPermission => Ok(Bootstrap::AwaitingDirectory(PendingSession {
                manager,
                collaborators,
            })),
        }
    }

    /// Loads the documents and assembles the session.
    async fn finish_bootstrap(
        manager: Arc<StorageManager>,
        collaborators: Collaborators,
    ) -> AppResult<Session> {
        let state = loader::load_all(&manager).await?;

        // Loading settings triggers the (idempotent) scanner setup.
        collaborators.scanner.initialize(&state.settings).await;

        info!(mode = ?manager.mode(), "Session ready");

        Ok(Session {
            manager,
            state: RwLock::new(state),
            cart: Mutex::new(Cart::new()),
            current_user: RwLock::new(None),
            notifier: collaborators.notifier,
            scanner: collaborators.scanner,
            receipt: collaborators.receipt,
        })
    }

    // -------------------------------------------------------------------------
    // State Access
    // -------------------------------------------------------------------------

    /// Executes a function with read access to the loaded documents.
    pub fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&DomainState) -> R,
    {
        let state = self.state.read().expect("state lock poisoned");
        f(&state)
    }

    pub fn products(&self) -> Vec<Product> {
        self.with_state(|s| s.products.clone())
    }

    pub fn customers(&self) -> Vec<Customer> {
        self.with_state(|s| s.customers.clone())
    }

    pub fn invoices(&self) -> Vec<Invoice> {
        self.with_state(|s| s.invoices.clone())
    }

    pub fn units(&self) -> Vec<Unit> {
        self.with_state(|s| s.units.clone())
    }

    pub fn users(&self) -> Vec<User> {
        self.with_state(|s| s.users.clone())
    }

    pub fn settings(&self) -> SystemSettings {
        self.with_state(|s| s.settings.clone())
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().expect("cart lock poisoned");
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub(crate) fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().expect("cart lock poisoned");
        f(&mut cart)
    }

    /// The authenticated user, if any.
    pub fn current_user(&self) -> Option<User> {
        self.current_user
            .read()
            .expect("current user lock poisoned")
            .clone()
    }

    pub(crate) fn set_current_user(&self, user: Option<User>) {
        *self
            .current_user
            .write()
            .expect("current user lock poisoned") = user;
    }

    /// The storage manager (mode queries, scanner-free embedders).
    pub fn storage(&self) -> &StorageManager {
        &self.manager
    }

    pub fn storage_mode(&self) -> StorageMode {
        self.manager.mode()
    }

    pub fn directory_name(&self) -> Option<String> {
        self.manager.directory_name()
    }

    // -------------------------------------------------------------------------
    // Save Pipeline
    // -------------------------------------------------------------------------

    /// The one generic save: memory first, then the active backend.
    ///
    /// Serialization happens before the memory update so a bad value
    /// leaves both sides untouched. A persist failure leaves memory
    /// ahead of storage - the accepted gap documented at module level.
    async fn save_document<T, F>(&self, key: DocumentKey, content: T, install: F) -> AppResult<()>
    where
        T: Serialize,
        F: FnOnce(&mut DomainState, T),
    {
        let value = serde_json::to_value(&content)?;

        {
            let mut state = self.state.write().expect("state lock poisoned");
            install(&mut state, content);
        }

        if let Err(e) = self.manager.write_document(key, &value).await {
            warn!(key = %key, error = %e, "Persist failed after memory update");
            self.notifier
                .notify(Notice::error(format!("Saving {key} failed: {e}")));
            return Err(e.into());
        }

        Ok(())
    }

    pub async fn save_products(&self, products: Vec<Product>) -> AppResult<()> {
        self.save_document(DocumentKey::Products, products, |s, v| s.products = v)
            .await
    }

    pub async fn save_customers(&self, customers: Vec<Customer>) -> AppResult<()> {
        self.save_document(DocumentKey::Customers, customers, |s, v| s.customers = v)
            .await
    }

    pub async fn save_invoices(&self, invoices: Vec<Invoice>) -> AppResult<()> {
        self.save_document(DocumentKey::Invoices, invoices, |s, v| s.invoices = v)
            .await
    }

    pub async fn save_units(&self, units: Vec<Unit>) -> AppResult<()> {
        self.save_document(DocumentKey::Units, units, |s, v| s.units = v)
            .await
    }

    pub async fn save_users(&self, users: Vec<User>) -> AppResult<()> {
        self.save_document(DocumentKey::Users, users, |s, v| s.users = v)
            .await
    }

    /// Raw settings save; `ops::settings` wraps this with the scanner
    /// lifecycle handling.
    pub(crate) async fn save_settings_document(&self, settings: SystemSettings) -> AppResult<()> {
        self.save_document(DocumentKey::Settings, settings, |s, v| s.settings = v)
            .await
    }

    /// In-memory install for checkout's batched commit: the unit of work
    /// persists the three documents itself, so memory is updated only
    /// after the commit succeeded (unlike the per-document pipeline,
    /// which updates memory first).
    pub(crate) fn install_documents<F>(&self, install: F)
    where
        F: FnOnce(&mut DomainState),
    {
        let mut state = self.state.write().expect("state lock poisoned");
        install(&mut state);
    }

    // -------------------------------------------------------------------------
    // Storage Mode Changes
    // -------------------------------------------------------------------------

    /// The explicit "change storage folder" action.
    ///
    /// On success every document is reloaded from the new directory's
    /// existing contents - the previous in-memory state is DISCARDED,
    /// never merged. Cancellation keeps an already-active directory.
    pub async fn change_storage_directory(&self) -> AppResult<()> {
        match self.manager.choose_directory().await? {
            DirectorySelection::Chosen { name } => {
                self.notifier.notify(Notice::success(format!(
                    "Folder \"{name}\" selected; data will be loaded from it"
                )));
                self.reload().await
            }
            DirectorySelection::Cancelled { fell_back } => {
                self.notifier
                    .notify(Notice::error("No folder selected"));
                if fell_back {
                    self.reload().await
                } else {
                    Ok(())
                }
            }
            DirectorySelection::Denied { fell_back } => {
                self.notifier
                    .notify(Notice::error("Access to the folder was denied"));
                if fell_back {
                    self.reload().await
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Reloads all six documents from the active backend, replacing the
    /// in-memory state wholesale.
    async fn reload(&self) -> AppResult<()> {
        let fresh = loader::load_all(&self.manager).await?;
        self.scanner.initialize(&fresh.settings).await;

        *self.state.write().expect("state lock poisoned") = fresh;
        info!(mode = ?self.manager.mode(), "Documents reloaded");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Activation & Reset
    // -------------------------------------------------------------------------

    pub async fn is_activated(&self) -> AppResult<bool> {
        Ok(self.manager.is_activated().await?)
    }

    pub async fn activate(&self) -> AppResult<()> {
        Ok(self.manager.activate().await?)
    }

    /// Replaces every document with its seed default and forgets the
    /// remembered directory, so the next startup negotiates afresh.
    ///
    /// This is content replacement through the ordinary save pipeline -
    /// no key is ever deleted.
    pub async fn reset_all(&self) -> AppResult<()> {
        self.save_products(Vec::new()).await?;
        self.save_customers(Vec::new()).await?;
        self.save_invoices(Vec::new()).await?;
        self.save_units(defaults::default_units()).await?;
        self.save_users(defaults::default_users()).await?;
        self.save_settings_document(defaults::default_settings()).await?;

        self.manager.clear_directory_pointer().await?;
        self.manager.deactivate().await?;

        self.set_current_user(None);
        self.with_cart_mut(|cart| cart.clear());

        self.notifier
            .notify(Notice::success("All data has been reset"));
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
