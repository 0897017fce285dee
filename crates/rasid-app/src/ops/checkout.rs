//! # Checkout Orchestrator
//!
//! Cart operations and the finalize-sale flow: the one place three
//! documents change together as a single logical unit.
//!
//! ## Finalize-Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  finalize_sale(terms)                                                   │
//! │       │                                                                 │
//! │       ├── 1. empty cart? ──► validation error, nothing mutated         │
//! │       │                                                                 │
//! │       ├── 2. build the Invoice (pure, rasid-core::checkout):           │
//! │       │      time-derived id, customer snapshot or None, line          │
//! │       │      snapshots, subtotal → discount → tax → total              │
//! │       │                                                                 │
//! │       ├── 3. products: decrement stock per line (to 0, never below -   │
//! │       │      the cart's add-time clamp guarantees it)                  │
//! │       │                                                                 │
//! │       ├── 4. customer attached? debt += outstanding (Credit/Partial),  │
//! │       │      invoice_count += 1, last_transaction = date               │
//! │       │                                                                 │
//! │       ├── 5. invoices: PREPEND (most-recent-first log)                 │
//! │       │                                                                 │
//! │       └── 6. stage 3–5 in ONE unit of work and commit                  │
//! │              (pending marker → ordered writes → clear; a crash         │
//! │               mid-commit is rolled forward at next startup)            │
//! │                                                                         │
//! │  Only after the commit: memory install, cart clear, stock alerts,      │
//! │  receipt hand-off.                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Local;
use tracing::{debug, info};

use rasid_core::cart::{Cart, CartChange};
use rasid_core::checkout::{build_invoice, compute_totals, CheckoutTotals, InvoiceStamp};
use rasid_core::money::Money;
use rasid_core::types::{Adjustment, Customer, Invoice, PaymentType};
use rasid_core::CoreError;
use rasid_store::UnitOfWork;
use rasid_store::DocumentKey;

use crate::error::AppResult;
use crate::notify::Notice;
use crate::session::Session;

/// Everything the till supplies when closing a sale.
#[derive(Debug, Clone)]
pub struct SaleTerms {
    /// Roster id of the attached customer; `None` for a walk-in sale.
    pub customer_id: Option<String>,
    pub discount: Adjustment,
    pub tax: Adjustment,
    pub payment_type: PaymentType,
    /// Ignored for Cash (always the full total); defaults to 0 for
    /// Credit (fully financed).
    pub amount_paid: Option<Money>,
}

impl SaleTerms {
    /// A plain cash sale with no adjustments.
    pub fn cash() -> Self {
        SaleTerms {
            customer_id: None,
            discount: Adjustment::default(),
            tax: Adjustment::default(),
            payment_type: PaymentType::Cash,
            amount_paid: None,
        }
    }
}

impl Session {
    // -------------------------------------------------------------------------
    // Cart Operations
    // -------------------------------------------------------------------------

    /// Adds one unit of a catalog product to the cart.
    ///
    /// Exceeding on-hand stock clamps the line and warns the user -
    /// never a silent drop, never an oversell.
    pub fn add_to_cart(&self, product_id: &str) -> AppResult<()> {
        let product = self
            .with_state(|s| s.products.iter().find(|p| p.id == product_id).cloned())
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        let change = self.with_cart_mut(|cart| cart.add_product(&product))?;
        self.warn_if_clamped(&product.name, change);
        Ok(())
    }

    /// Adds by barcode - the path scanner events take.
    pub fn add_to_cart_by_barcode(&self, barcode: &str) -> AppResult<()> {
        let product = self
            .product_by_barcode(barcode)
            .ok_or_else(|| CoreError::ProductNotFound(barcode.to_string()))?;

        let change = self.with_cart_mut(|cart| cart.add_product(&product))?;
        self.warn_if_clamped(&product.name, change);
        Ok(())
    }

    /// Sets a cart line's quantity, clamped to on-hand stock.
    pub fn set_cart_quantity(&self, product_id: &str, quantity: i64) -> AppResult<()> {
        let (name, on_hand) = self
            .with_state(|s| {
                s.products
                    .iter()
                    .find(|p| p.id == product_id)
                    .map(|p| (p.name.clone(), p.quantity))
            })
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        let change =
            self.with_cart_mut(|cart| cart.set_quantity(product_id, quantity, on_hand))?;
        self.warn_if_clamped(&name, change);
        Ok(())
    }

    pub fn remove_from_cart(&self, product_id: &str) -> AppResult<()> {
        self.with_cart_mut(|cart| cart.remove(product_id))?;
        Ok(())
    }

    pub fn clear_cart(&self) {
        self.with_cart_mut(|cart| cart.clear());
    }

    /// Live totals for the till display.
    pub fn cart_totals(&self, discount: Adjustment, tax: Adjustment) -> CheckoutTotals {
        let subtotal = self.with_cart(Cart::subtotal);
        compute_totals(subtotal, discount, tax)
    }

    fn warn_if_clamped(&self, name: &str, change: CartChange) {
        if let CartChange::Clamped { available } = change {
            self.notifier.notify(Notice::error(format!(
                "Only {available} of \"{name}\" in stock"
            )));
        }
    }

    // -------------------------------------------------------------------------
    // Finalize Sale
    // -------------------------------------------------------------------------

    /// Converts the cart into a persisted invoice plus its consequential
    /// stock and debt updates, committed as one durable batch.
    pub async fn finalize_sale(&self, terms: SaleTerms) -> AppResult<Invoice> {
        let cart = self.with_cart(Cart::clone);
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let customer: Option<Customer> = match &terms.customer_id {
            Some(id) => Some(
                self.with_state(|s| s.customers.iter().find(|c| &c.id == id).cloned())
                    .ok_or_else(|| CoreError::CustomerNotFound(id.clone()))?,
            ),
            None => None,
        };

        let invoice = build_invoice(
            &cart,
            customer.as_ref(),
            terms.discount,
            terms.tax,
            terms.payment_type,
            terms.amount_paid,
            invoice_stamp(),
        )?;

        // Derive the three new document contents from current state.
        let mut products = self.products();
        for item in &invoice.items {
            if let Some(entry) = products.iter_mut().find(|p| p.id == item.product.id) {
                // the add-time clamp guarantees this never goes below 0
                entry.quantity -= item.quantity;
            }
        }

        let customers = customer.as_ref().map(|attached| {
            let accrued = invoice.outstanding();
            let mut roster = self.customers();
            for entry in roster.iter_mut().filter(|c| c.id == attached.id) {
                entry.debt += accrued;
                entry.invoice_count += 1;
                entry.last_transaction = invoice.date.clone();
            }
            roster
        });

        let mut invoices = self.invoices();
        invoices.insert(0, invoice.clone());

        // One durable batch for all three documents.
        let mut uow = UnitOfWork::new(self.storage());
        uow.stage(DocumentKey::Products, &products)?;
        if let Some(roster) = &customers {
            uow.stage(DocumentKey::Customers, roster)?;
        }
        uow.stage(DocumentKey::Invoices, &invoices)?;
        uow.commit().await?;

        debug!(invoice = %invoice.id, "Checkout committed");

        // Memory catches up only after the commit succeeded.
        self.install_documents(|state| {
            state.products = products;
            if let Some(roster) = customers {
                state.customers = roster;
            }
            state.invoices = invoices;
        });
        self.clear_cart();

        self.emit_stock_alerts(&invoice);

        let settings = self.settings();
        self.receipt.render(&invoice, &settings);

        info!(invoice = %invoice.id, total = %invoice.total, "Sale finalized");
        self.notifier.notify(Notice::success(format!(
            "Invoice {} created",
            invoice.id
        )));

        Ok(invoice)
    }

    /// Warns per product the sale drove to zero, when alerts are on.
    fn emit_stock_alerts(&self, invoice: &Invoice) {
        if !self.with_state(|s| s.settings.enable_stock_alerts) {
            return;
        }

        for item in &invoice.items {
            let depleted = self.with_state(|s| {
                s.products
                    .iter()
                    .find(|p| p.id == item.product.id)
                    .is_some_and(|p| p.quantity == 0)
            });
            if depleted {
                self.notifier.notify(Notice::error(format!(
                    "\"{}\" is now out of stock",
                    item.product.name
                )));
            }
        }
    }
}

/// Time-derived identity for a new invoice.
fn invoice_stamp() -> InvoiceStamp {
    let now = Local::now();
    InvoiceStamp {
        id: format!("INV-{}", now.timestamp_millis()),
        date: now.format("%Y-%m-%d").to_string(),
        time: now.format("%H:%M:%S").to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
