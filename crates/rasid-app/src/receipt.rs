//! # Receipt Collaborator
//!
//! Hand-off seam to the external print/receipt renderer. A completed
//! invoice and the current settings go out; nothing comes back.

use tracing::info;

use rasid_core::types::{Invoice, SystemSettings};

/// Renders a completed invoice (print, HTML, PDF - the shell decides).
pub trait ReceiptRenderer: Send + Sync {
    fn render(&self, invoice: &Invoice, settings: &SystemSettings);
}

/// Default renderer for headless deployments: a log line.
#[derive(Debug, Default)]
pub struct LogReceiptRenderer;

impl ReceiptRenderer for LogReceiptRenderer {
    fn render(&self, invoice: &Invoice, settings: &SystemSettings) {
        info!(
            invoice = %invoice.id,
            total = %invoice.total,
            company = %settings.company_name,
            "Receipt ready"
        );
    }
}
