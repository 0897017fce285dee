//! # Rasid Application Layer
//!
//! Headless core of the Rasid POS application: storage bootstrap,
//! in-memory session state, and every domain mutation, exposed to
//! whatever shell sits on top (desktop window, TUI, tests).
//!
//! ## Module Organization
//! ```text
//! rasid_app/
//! ├── lib.rs          ◄─── You are here (wiring & startup helpers)
//! ├── session.rs      ◄─── Session state, save pipeline, bootstrap
//! ├── ops/
//! │   ├── product.rs  ◄─── Catalog mutations, barcode guard, units
//! │   ├── customer.rs ◄─── Roster mutations, debt settlement
//! │   ├── user.rs     ◄─── Auth + user directory with roster guards
//! │   ├── checkout.rs ◄─── Cart ops and the finalize-sale flow
//! │   └── settings.rs ◄─── Settings save + scanner lifecycle
//! ├── scanner.rs      ◄─── Scanner collaborator seam
//! ├── notify.rs       ◄─── Notification collaborator seam
//! ├── receipt.rs      ◄─── Receipt renderer seam
//! └── error.rs        ◄─── AppError (code + message) for the shell
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter (RUST_LOG)                     │
//! │                                                                         │
//! │  2. Open the embedded store ──────────────────────────────────────────► │
//! │     • platform app-data dir, e.g. ~/.local/share/rasid-pos/rasid.db     │
//! │     • always open: reserved keys live here in every mode                │
//! │                                                                         │
//! │  3. Session::bootstrap ───────────────────────────────────────────────► │
//! │     • replay any interrupted checkout commit                            │
//! │     • negotiate storage mode (directory / embedded / prompt)            │
//! │     • load all six documents, seed defaults, init scanner               │
//! │                                                                         │
//! │  4. Shell renders ────────────────────────────────────────────────────► │
//! │     • Ready(session)            → straight to login                     │
//! │     • AwaitingDirectory(pending) → blocking folder prompt               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod notify;
pub mod ops;
pub mod receipt;
pub mod scanner;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

use std::path::PathBuf;

use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

pub use error::{AppError, AppResult, ErrorCode};
pub use notify::{MemoryNotifier, Notice, Notifier, Severity, TracingNotifier};
pub use ops::SaleTerms;
pub use receipt::{LogReceiptRenderer, ReceiptRenderer};
pub use scanner::{BarcodeScanner, ScanCallback, ScanSubscription, ScannerConnector, ScannerManager};
pub use session::{Bootstrap, Collaborators, PendingSession, Session};

// Re-export the layers below for shells that only depend on this crate.
pub use rasid_core;
pub use rasid_store;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=rasid=trace` - Trace the rasid crates only
/// - Default: INFO level, sqlx noise suppressed
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rasid=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// The platform path of the embedded store file.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.rasid.pos/rasid.db`
/// - **Windows**: `%APPDATA%\rasid\pos\rasid.db`
/// - **Linux**: `~/.local/share/rasid-pos/rasid.db`
///
/// ## Development Override
/// Set `RASID_DB_PATH` to use a custom path.
pub fn default_store_path() -> AppResult<PathBuf> {
    if let Ok(path) = std::env::var("RASID_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    let proj_dirs = ProjectDirs::from("com", "rasid", "pos")
        .ok_or_else(|| AppError::internal("Could not determine app data directory"))?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .map_err(|e| AppError::internal(format!("Could not create {data_dir:?}: {e}")))?;

    Ok(data_dir.join("rasid.db"))
}
