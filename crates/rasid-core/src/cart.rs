//! # Cart Module
//!
//! The in-progress sale: a list of lines with frozen product snapshots.
//!
//! ## Stock Clamping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Add-to-Cart Stock Policy                               │
//! │                                                                         │
//! │  On-hand stock is checked HERE, at add/update time - never again at    │
//! │  checkout. The finalize-sale flow trusts the cart and only decrements. │
//! │                                                                         │
//! │  add (stock 0)            → rejected (out of stock)                    │
//! │  add beyond stock         → clamped at available, caller warns user    │
//! │  set quantity > stock     → clamped at available, caller warns user    │
//! │  set quantity ≤ 0         → line removed                               │
//! │                                                                         │
//! │  A line is therefore never larger than the stock observed when it      │
//! │  was last touched, so checkout can never drive stock negative.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Price Freezing
//! A line keeps the price, unit, and full product snapshot captured when
//! it was added. A price edit between add and checkout does not change
//! the sale in progress.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, Unit};

/// A line in the in-progress sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product snapshot taken when the line was created.
    pub product: Product,

    /// Unit snapshot (copied from the product at add time).
    pub unit: Unit,

    /// Frozen unit price.
    pub price: Money,

    pub quantity: i64,
}

impl CartLine {
    fn from_product(product: &Product) -> Self {
        CartLine {
            product: product.clone(),
            unit: product.unit.clone(),
            price: product.price,
            quantity: 1,
        }
    }

    /// Line total (frozen price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

/// What an add/update actually did, so the caller can notify the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new line was created or an existing one incremented.
    Added,
    /// An existing line's quantity was set as requested.
    Updated,
    /// The request exceeded on-hand stock; the line was clamped.
    Clamped { available: i64 },
    /// Quantity reached zero and the line was removed.
    Removed,
}

/// The in-progress sale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds one unit of a product, or increments its existing line.
    ///
    /// `product` is the *live* catalog entry; its `quantity` field is the
    /// on-hand stock the clamp is checked against.
    pub fn add_product(&mut self, product: &Product) -> CoreResult<CartChange> {
        if product.quantity <= 0 {
            return Err(CoreError::OutOfStock {
                name: product.name.clone(),
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            if line.quantity < product.quantity {
                line.quantity += 1;
                return Ok(CartChange::Added);
            }
            // already at the full on-hand stock
            return Ok(CartChange::Clamped {
                available: product.quantity,
            });
        }

        self.lines.push(CartLine::from_product(product));
        Ok(CartChange::Added)
    }

    /// Sets a line's quantity, clamping to on-hand stock.
    ///
    /// `on_hand` is the catalog's current stock for the product; the
    /// caller looks it up because the cart only holds snapshots.
    pub fn set_quantity(
        &mut self,
        product_id: &str,
        requested: i64,
        on_hand: i64,
    ) -> CoreResult<CartChange> {
        if requested <= 0 {
            self.remove(product_id)?;
            return Ok(CartChange::Removed);
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product.id == product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        if requested > on_hand {
            line.quantity = on_hand;
            return Ok(CartChange::Clamped { available: on_hand });
        }

        line.quantity = requested;
        Ok(CartChange::Updated)
    }

    /// Removes a line by product id.
    pub fn remove(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product.id != product_id);

        if self.lines.len() == before {
            return Err(CoreError::ProductNotFound(product_id.to_string()));
        }

        Ok(())
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// The lines, in add order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total unit count across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ (frozen price × quantity).
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(|l| l.line_total()).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;

    fn product(id: &str, price_cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            price: Money::from_cents(price_cents),
            purchase_price: Money::from_cents(price_cents / 2),
            unit: defaults::default_units()[0].clone(),
            quantity: stock,
            supplier: String::new(),
            production_date: String::new(),
            expiry_date: String::new(),
            barcode: format!("bc-{id}"),
        }
    }

    #[test]
    fn test_add_and_subtotal() {
        let mut cart = Cart::new();
        let p = product("p1", 999, 10);

        cart.add_product(&p).unwrap();
        cart.add_product(&p).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.subtotal().cents(), 1998);
    }

    #[test]
    fn test_add_out_of_stock_rejected() {
        let mut cart = Cart::new();
        let p = product("p1", 999, 0);

        assert!(matches!(
            cart.add_product(&p),
            Err(CoreError::OutOfStock { .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_clamps_at_available_stock() {
        let mut cart = Cart::new();
        let p = product("p1", 500, 2);

        assert_eq!(cart.add_product(&p).unwrap(), CartChange::Added);
        assert_eq!(cart.add_product(&p).unwrap(), CartChange::Added);
        // third add would exceed stock
        assert_eq!(
            cart.add_product(&p).unwrap(),
            CartChange::Clamped { available: 2 }
        );
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_set_quantity_clamps_never_oversells() {
        let mut cart = Cart::new();
        let p = product("p1", 500, 5);
        cart.add_product(&p).unwrap();

        assert_eq!(
            cart.set_quantity("p1", 9, 5).unwrap(),
            CartChange::Clamped { available: 5 }
        );
        assert_eq!(cart.total_quantity(), 5);

        assert_eq!(cart.set_quantity("p1", 3, 5).unwrap(), CartChange::Updated);
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        let p = product("p1", 500, 5);
        cart.add_product(&p).unwrap();

        assert_eq!(cart.set_quantity("p1", 0, 5).unwrap(), CartChange::Removed);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_price_frozen_at_add_time() {
        let mut cart = Cart::new();
        let mut p = product("p1", 500, 5);
        cart.add_product(&p).unwrap();

        // catalog price changes after the line was created
        p.price = Money::from_cents(900);

        assert_eq!(cart.lines()[0].price.cents(), 500);
        assert_eq!(cart.subtotal().cents(), 500);
    }

    #[test]
    fn test_remove_unknown_product() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.remove("nope"),
            Err(CoreError::ProductNotFound(_))
        ));
    }
}
