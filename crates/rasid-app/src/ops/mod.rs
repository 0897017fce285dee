//! # Session Operations
//!
//! Every page-level mutation, grouped by domain. Each operation:
//!
//! 1. validates at the boundary (nothing is mutated on failure)
//! 2. derives the new whole-document content
//! 3. goes through the save pipeline - or, for checkout, the durable
//!    unit of work
//! 4. emits user-facing notices through the notifier collaborator
//!
//! ```text
//! ops/
//! ├── product.rs    product CRUD, barcode guard, custom units
//! ├── customer.rs   customer CRUD, debt settlement, deletion guard
//! ├── user.rs       login/logout, user CRUD, roster guards
//! ├── checkout.rs   cart operations and finalize-sale
//! └── settings.rs   settings save + scanner lifecycle, scan passthroughs
//! ```

pub mod checkout;
pub mod customer;
pub mod product;
pub mod settings;
pub mod user;

pub use checkout::SaleTerms;
