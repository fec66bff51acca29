//! The cart store.
//!
//! [`Cart`] is an explicit store object: a list of (product, quantity) lines
//! with derived totals and a defined empty initial state. It does no I/O -
//! persistence is the job of the [`session::SessionCart`] adapter, which
//! writes the full line list back to the session after every mutation.

pub mod session;

pub use session::SessionCart;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stride_core::ProductId;

/// A single cart line. Unique by product id within a cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    /// Unit price in major units at the time the line was added. Display
    /// only - checkout re-derives prices from the content backend.
    pub unit_price: Decimal,
    pub quantity: u32,
    pub image_url: Option<String>,
    pub brand_title: Option<String>,
}

impl CartLine {
    /// Line subtotal: unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// An in-memory cart: the ordered list of lines a customer has added.
///
/// Lines keep insertion order; adding an already-present product increments
/// its quantity instead of appending a duplicate line.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Rebuild a cart from persisted lines.
    #[must_use]
    pub const fn from_lines(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Consume the cart and return its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add a line. If a line with the same product id already exists its
    /// quantity is incremented; otherwise the line is appended.
    pub fn add(&mut self, line: CartLine) {
        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == line.product_id)
        {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            self.lines.push(line);
        }
    }

    /// Remove the line for a product. Removing an absent product is a no-op.
    pub fn remove(&mut self, product_id: &ProductId) {
        self.lines.retain(|l| &l.product_id != product_id);
    }

    /// Set the quantity for a product's line.
    ///
    /// A quantity below 1 removes the line - a line never exists with a
    /// zero or negative quantity.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        if quantity < 1 {
            self.remove(product_id);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(line) = self.lines.iter_mut().find(|l| &l.product_id == product_id) {
            line.quantity = quantity;
        }
    }

    /// Cart total: the sum of unit price times quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Cart count: the sum of quantities over all lines.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
    }
}
