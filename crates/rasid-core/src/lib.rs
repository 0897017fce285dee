//! # rasid-core: Pure Business Logic for Rasid POS
//!
//! This crate is the **heart** of Rasid POS. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Rasid POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  UI Shell (external collaborator)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   rasid-app (Session + Ops)                     │   │
//! │  │       save pipeline, checkout orchestrator, guards              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ rasid-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ checkout  │  │   │
//! │  │   │ documents │  │   cents   │  │  clamping │  │  totals   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 rasid-store (Document Storage)                  │   │
//! │  │        directory backend / embedded backend / negotiator        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - The six document types (Product, Customer, Invoice, ...)
//! - [`money`] - Integer-cents money with basis-point percentage math
//! - [`cart`] - The in-progress sale with stock clamping
//! - [`checkout`] - Pure invoice construction and totals arithmetic
//! - [`validation`] - Mutation-boundary business rules
//! - [`defaults`] - Seed values for first-run documents
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic - even invoice ids and dates are
//!    supplied by the caller as an [`checkout::InvoiceStamp`]
//! 2. **No I/O**: storage, network, and clock access are FORBIDDEN here
//! 3. **Integer Money**: all monetary values are cents (i64); percentages
//!    are basis points - no floating point anywhere
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use rasid_core::money::Money;
//! use rasid_core::types::Adjustment;
//! use rasid_core::checkout::compute_totals;
//!
//! // 25.00 with a 10% discount and 10% tax on the discounted amount
//! let totals = compute_totals(
//!     Money::from_cents(2500),
//!     Adjustment::Percentage(1000),
//!     Adjustment::Percentage(1000),
//! );
//! assert_eq!(totals.total.cents(), 2475);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod defaults;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use rasid_core::Money` instead of
// `use rasid_core::money::Money`

pub use cart::{Cart, CartChange, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;
