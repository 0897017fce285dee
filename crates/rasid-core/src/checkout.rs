//! # Checkout Math
//!
//! Pure construction of an `Invoice` from an in-progress cart.
//!
//! ## Arithmetic Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Totals Derivation                                      │
//! │                                                                         │
//! │  subtotal  = Σ (frozen price × quantity)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  discount  = percentage-of-subtotal  OR  fixed amount                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  taxable   = max(subtotal - discount, 0)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tax       = percentage-of-TAXABLE  OR  fixed amount                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  total     = taxable + tax                                             │
//! │                                                                         │
//! │  The tax base is the POST-discount amount, not the subtotal.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This module has no clock: the caller supplies the id and date/time
//! stamp, so every function here is deterministic.

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Adjustment, Customer, Invoice, InvoiceItem, PaymentType};
use crate::validation::validate_adjustment;

// =============================================================================
// Totals
// =============================================================================

/// The fully derived amounts for a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutTotals {
    pub subtotal: Money,
    pub discount_amount: Money,
    /// Post-discount base the tax is computed on.
    pub taxable: Money,
    pub tax_amount: Money,
    pub total: Money,
}

/// Derives all amounts from a subtotal and the two adjustments.
pub fn compute_totals(subtotal: Money, discount: Adjustment, tax: Adjustment) -> CheckoutTotals {
    let discount_amount = discount.amount_on(subtotal);
    let taxable = (subtotal - discount_amount).floor_zero();
    let tax_amount = tax.amount_on(taxable);

    CheckoutTotals {
        subtotal,
        discount_amount,
        taxable,
        tax_amount,
        total: taxable + tax_amount,
    }
}

// =============================================================================
// Invoice Construction
// =============================================================================

/// Identity and timestamp for a new invoice, supplied by the caller so
/// this module stays clock-free.
#[derive(Debug, Clone)]
pub struct InvoiceStamp {
    /// Time-derived id, `INV-<unix millis>`.
    pub id: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM:SS`.
    pub time: String,
}

/// Builds the immutable invoice record for a finalized sale.
///
/// ## Amount Paid
/// - `Cash`: the full total, regardless of what the caller supplied
/// - `Partial`: the caller-supplied amount
/// - `Credit`: the caller-supplied amount, defaulting to 0 (fully
///   financed)
///
/// ## Errors
/// - `EmptyCart` when there are no lines
/// - adjustment validation failures (percentage > 100%, negative fixed)
pub fn build_invoice(
    cart: &Cart,
    customer: Option<&Customer>,
    discount: Adjustment,
    tax: Adjustment,
    payment_type: PaymentType,
    amount_paid: Option<Money>,
    stamp: InvoiceStamp,
) -> CoreResult<Invoice> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    validate_adjustment(&discount, "discount")?;
    validate_adjustment(&tax, "tax")?;

    let totals = compute_totals(cart.subtotal(), discount, tax);

    let amount_paid = match payment_type {
        PaymentType::Cash => totals.total,
        PaymentType::Credit | PaymentType::Partial => amount_paid.unwrap_or_else(Money::zero),
    };

    let items = cart
        .lines()
        .iter()
        .map(|line| InvoiceItem {
            product: line.product.clone(),
            quantity: line.quantity,
            unit: line.unit.clone(),
            price: line.price,
        })
        .collect();

    Ok(Invoice {
        id: stamp.id,
        date: stamp.date,
        time: stamp.time,
        customer: customer.cloned(),
        items,
        subtotal: totals.subtotal,
        discount,
        tax,
        total: totals.total,
        payment_type,
        amount_paid,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
