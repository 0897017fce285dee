//! # Domain Types
//!
//! The six persisted documents and their building blocks.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Document Types                                  │
//! │                                                                         │
//! │  products   ── Vec<Product>          units    ── Vec<Unit>             │
//! │  customers  ── Vec<Customer>         users    ── Vec<User>             │
//! │  invoices   ── Vec<Invoice>          settings ── SystemSettings        │
//! │                                                                         │
//! │  Every document is serialized WHOLE on every save - there are no       │
//! │  partial or delta writes anywhere in the system.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! An `Invoice` embeds copies of the customer, products, and units it was
//! created with. Editing a product later never retroactively alters a
//! historical invoice. The same applies to a `Product`'s `unit` field: it
//! is an id+name snapshot, not a live join against the unit catalog.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// The bootstrap administrator's fixed id.
///
/// This user has implicit full permissions regardless of the stored
/// permission map, and their Settings permission is pinned on save.
pub const ADMIN_USER_ID: &str = "u1";

/// Legacy role marker found in rosters written by older releases.
/// Users carrying it are back-filled with full permissions at load time.
pub const LEGACY_MANAGER_ROLE: &str = "system-manager";

// =============================================================================
// Units
// =============================================================================

/// A unit of measure (piece, pack, carton, ...).
///
/// Ids are small integers assigned sequentially; a custom unit gets
/// `max(id) + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Unit {
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the cashier and on receipts.
    pub name: String,

    /// Selling price.
    pub price: Money,

    /// Purchase (cost) price, for margin reporting.
    pub purchase_price: Money,

    /// Unit of measure snapshot (id + name, not a live reference).
    pub unit: Unit,

    /// On-hand stock. Never negative; checkout may drive it to exactly 0.
    pub quantity: i64,

    /// Supplier name, free text.
    pub supplier: String,

    /// Production date (ISO `YYYY-MM-DD`, free-form for legacy data).
    pub production_date: String,

    /// Expiry date (ISO `YYYY-MM-DD`, free-form for legacy data).
    pub expiry_date: String,

    /// Barcode, unique across the catalog. Auto-generated from the clock
    /// when left empty at save time.
    pub barcode: String,
}

impl Product {
    /// Whether the requested quantity can be taken from stock.
    #[inline]
    pub fn in_stock(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer on the roster.
///
/// ## Invariants
/// - `debt` is never negative; settlement is bounded by the current debt
/// - a customer with outstanding debt cannot be deleted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub notes: String,

    /// Outstanding credit balance.
    pub debt: Money,

    /// Number of invoices issued to this customer.
    pub invoice_count: i64,

    /// Date of the most recent sale (`YYYY-MM-DD`), empty if none.
    pub last_transaction: String,
}

// =============================================================================
// Invoice
// =============================================================================

/// A single line on an invoice.
///
/// Embeds a full product and unit snapshot; the `price` field is the
/// price frozen at the moment the line was added, which may differ from
/// the product's current price by the time the invoice is read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub product: Product,
    pub quantity: i64,
    pub unit: Unit,
    pub price: Money,
}

impl InvoiceItem {
    /// Line total (frozen price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

/// How a sale was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Paid in full at the till.
    Cash,
    /// Fully financed; the whole total becomes customer debt.
    Credit,
    /// Partly paid; the remainder becomes customer debt.
    Partial,
}

/// A discount or tax adjustment: either a basis-point percentage or a
/// fixed amount.
///
/// Serializes as `{"type": "percentage", "value": 1000}` (10%) or
/// `{"type": "fixed", "value": 250}` (2.50), matching the stored
/// invoice format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Adjustment {
    /// Percentage of the base amount, in basis points (1000 = 10%).
    Percentage(u32),
    /// Fixed amount in cents.
    Fixed(Money),
}

impl Adjustment {
    /// The adjustment amount for a given base.
    pub fn amount_on(&self, base: Money) -> Money {
        match *self {
            Adjustment::Percentage(bps) => base.percent_of(bps),
            Adjustment::Fixed(amount) => amount,
        }
    }

    /// Whether this adjustment changes anything.
    pub fn is_none(&self) -> bool {
        match *self {
            Adjustment::Percentage(bps) => bps == 0,
            Adjustment::Fixed(amount) => amount.is_zero(),
        }
    }
}

impl Default for Adjustment {
    fn default() -> Self {
        Adjustment::Percentage(0)
    }
}

/// A finalized sale.
///
/// Invoices are immutable once created: the log is append-only and every
/// embedded entity is a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Time-derived id, `INV-<unix millis>`.
    pub id: String,

    /// Sale date, `YYYY-MM-DD`.
    pub date: String,

    /// Sale wall-clock time, `HH:MM:SS`.
    pub time: String,

    /// Customer snapshot, or `None` for a walk-in cash sale.
    pub customer: Option<Customer>,

    pub items: Vec<InvoiceItem>,

    /// Σ (frozen price × quantity) over all lines.
    pub subtotal: Money,

    /// Discount applied to the subtotal.
    pub discount: Adjustment,

    /// Tax applied to the post-discount amount.
    pub tax: Adjustment,

    pub total: Money,

    pub payment_type: PaymentType,

    /// Amount received at the till. Equals `total` for cash sales; the
    /// shortfall (`total - amount_paid`) accrues as customer debt for
    /// credit and partial sales.
    pub amount_paid: Money,
}

impl Invoice {
    /// The part of the total that was financed rather than paid.
    pub fn outstanding(&self) -> Money {
        match self.payment_type {
            PaymentType::Cash => Money::zero(),
            PaymentType::Credit | PaymentType::Partial => {
                (self.total - self.amount_paid).floor_zero()
            }
        }
    }
}

// =============================================================================
// Users & Permissions
// =============================================================================

/// The pages a user can be granted access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Page {
    Dashboard,
    Products,
    Pos,
    Customers,
    Invoices,
    Settings,
}

impl Page {
    /// All pages, in display order.
    pub const ALL: [Page; 6] = [
        Page::Dashboard,
        Page::Products,
        Page::Pos,
        Page::Customers,
        Page::Invoices,
        Page::Settings,
    ];
}

/// Whether a user account can log in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// `u1` for the bootstrap admin, `u<millis>` for created accounts.
    pub id: String,

    /// Login name, unique in practice.
    pub name: String,

    /// Stored in plaintext. A known weakness inherited from the data
    /// format; hardening is out of scope (see DESIGN.md).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    pub status: UserStatus,

    /// Page access map. Missing entries mean "no access" - except for
    /// the bootstrap admin, who bypasses the map entirely.
    #[serde(default)]
    pub permissions: HashMap<Page, bool>,

    /// Legacy role marker from rosters written by older releases; only
    /// consulted by the loader's permission back-fill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl User {
    /// Whether this account may open the given page.
    pub fn can_access(&self, page: Page) -> bool {
        self.id == ADMIN_USER_ID || self.permissions.get(&page).copied().unwrap_or(false)
    }

    /// Whether the account can log in.
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// A permission map granting every page.
    pub fn full_permissions() -> HashMap<Page, bool> {
        Page::ALL.iter().map(|&p| (p, true)).collect()
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Receipt paper width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaperSize {
    #[serde(rename = "58mm")]
    #[ts(rename = "58mm")]
    Mm58,
    #[serde(rename = "80mm")]
    #[ts(rename = "80mm")]
    Mm80,
}

/// The singleton settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
    pub system_name: String,
    pub company_name: String,
    pub company_address: String,
    pub company_phone: String,

    /// Base64-encoded image placed on printed invoices; empty when unset.
    pub custom_invoice_barcode: String,

    pub allow_invoice_editing: bool,
    pub enable_stock_alerts: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thank_you_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_size: Option<PaperSize>,

    // Remote scanner connection fields. All three are needed in practice,
    // but only api key + project id gate whether a connection is attempted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanner_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanner_auth_domain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanner_project_id: Option<String>,
}

/// Connection parameters for the remote scanner collaborator, extracted
/// from settings when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    pub api_key: String,
    pub auth_domain: Option<String>,
    pub project_id: String,
}

impl SystemSettings {
    /// The scanner connection config, if the settings carry one.
    ///
    /// Mirrors the activation rule of the original integration: an api
    /// key and a project id are required, the auth domain is optional.
    pub fn scanner_config(&self) -> Option<ScannerConfig> {
        match (&self.scanner_api_key, &self.scanner_project_id) {
            (Some(api_key), Some(project_id))
                if !api_key.is_empty() && !project_id.is_empty() =>
            {
                Some(ScannerConfig {
                    api_key: api_key.clone(),
                    auth_domain: self.scanner_auth_domain.clone(),
                    project_id: project_id.clone(),
                })
            }
            _ => None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
