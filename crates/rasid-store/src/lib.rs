//! # rasid-store: Document Storage Layer for Rasid POS
//!
//! This crate provides durable storage for the six domain documents.
//! Everything persisted is a whole JSON value addressed by a string key,
//! written through one of two interchangeable backends.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Rasid POS Data Flow                              │
//! │                                                                         │
//! │  rasid-app (save pipeline, checkout)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     rasid-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ StorageManager│    │    Loader     │    │ UnitOfWork   │  │   │
//! │  │   │ (manager.rs)  │    │ (loader.rs)   │    │ (commit.rs)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ negotiation   │◄───│ seed-once     │    │ pending-     │  │   │
//! │  │   │ mode dispatch │    │ defaulting    │    │ commit marker│  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                                    │   │
//! │  │   ┌───────┴────────────────┐                                   │   │
//! │  │   ▼                        ▼                                   │   │
//! │  │  DirectoryStore         EmbeddedStore                          │   │
//! │  │  <dir>/<key>.json       SQLite `documents` table               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`backend`] - the `DocumentStore` trait and both implementations
//! - [`manager`] - storage-mode negotiation and per-call dispatch
//! - [`loader`] - concurrent six-document load with seed-once defaults
//! - [`commit`] - crash-recoverable multi-document unit of work
//! - [`document`] - the document keys and reserved keys
//! - [`error`] - store error types (absence is NOT an error)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rasid_store::{EmbeddedStore, StorageManager, Negotiation};
//!
//! let embedded = EmbeddedStore::open("rasid.db").await?;
//! let manager = StorageManager::new(embedded, picker);
//!
//! rasid_store::commit::replay_pending(&manager).await?;
//! match manager.negotiate().await? {
//!     Negotiation::Ready { .. } => {
//!         let state = rasid_store::loader::load_all(&manager).await?;
//!         // hand off to the session
//!     }
//!     Negotiation::AwaitingPermission => {
//!         // block until manager.choose_directory() resolves
//!     }
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod commit;
pub mod document;
pub mod error;
pub mod loader;
pub mod manager;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{DirectoryStore, DocumentStore, EmbeddedStore};
pub use commit::UnitOfWork;
pub use document::DocumentKey;
pub use error::{StoreError, StoreResult};
pub use loader::DomainState;
pub use manager::{
    DirectoryPicker, DirectorySelection, Negotiation, StorageManager, StorageMode,
};
