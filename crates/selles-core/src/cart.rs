//! # Cart
//!
//! The ephemeral set of line items a cashier assembles before a sale
//! is finalized. Held by the register session, discarded after commit
//! or an explicit clear - never persisted.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Cart Operations                                │
//! │                                                                     │
//! │  Register Action            Cart Change                             │
//! │  ───────────────            ───────────                             │
//! │  Click product ───────────► add_product()    merge or push line     │
//! │  Change quantity ─────────► set_quantity()                          │
//! │  Edit price field ────────► override_price() register discount      │
//! │  Click remove ────────────► remove_line()                           │
//! │  Click clear ─────────────► clear()                                 │
//! │                                                                     │
//! │  NOTE: the stock guard here uses the catalog state the register     │
//! │  was rendered from. It can go stale; the sale processor re-checks   │
//! │  every line against live stock at commit time.                      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Product;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// One line of the cart.
///
/// ## Design Notes
/// - `unit_price_cents` is the catalog price frozen at add time
/// - `edited_price_cents` starts equal to it and may be overridden at
///   the register (manager discount). The override is permitted
///   without additional authorization - intentional flexibility of
///   the design, not a bug.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product ID (UUID)
    pub product_id: String,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// Local code at time of adding (frozen)
    pub local_code: String,

    /// Catalog price in cents at time of adding (frozen)
    pub unit_price_cents: i64,

    /// Price in cents actually charged; defaults to the catalog price
    pub edited_price_cents: i64,

    /// Quantity requested (>= 1)
    pub quantity: i64,
}

impl CartLine {
    /// Creates a new cart line from a product and quantity.
    fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            local_code: product.local_code.clone(),
            unit_price_cents: product.price_cents,
            edited_price_cents: product.price_cents,
            quantity,
        }
    }

    /// Calculates the line total (edited price × quantity). Goes
    /// through the saturating money multiply, never raw i64.
    #[inline]
    pub fn total_cents(&self) -> i64 {
        Money::from_cents(self.edited_price_cents)
            .multiply_quantity(self.quantity)
            .cents()
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents())
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The in-progress transaction.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product again
///   increases the quantity)
/// - Quantity of every line is >= 1
/// - At most [`MAX_CART_LINES`] lines, [`MAX_LINE_QUANTITY`] per line
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Lines in insertion order.
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds a product to the cart or increases its quantity if already
    /// present.
    ///
    /// ## Stock Guard
    /// The combined quantity for the product must not exceed the stock
    /// level of the `product` the register was rendered from. This is
    /// the display-time check; commit revalidates against live stock.
    pub fn add_product(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        crate::validation::validate_quantity(quantity)?;

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product.id)
        {
            let new_qty = line.quantity + quantity;
            if new_qty > product.quantity {
                return Err(CoreError::InsufficientStock {
                    name: product.name.clone(),
                    available: product.quantity,
                    requested: new_qty,
                });
            }
            if new_qty > MAX_LINE_QUANTITY {
                return Err(ValidationError::OutOfRange {
                    field: "quantity",
                    min: 1,
                    max: MAX_LINE_QUANTITY,
                }
                .into());
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if quantity > product.quantity {
            return Err(CoreError::InsufficientStock {
                name: product.name.clone(),
                available: product.quantity,
                requested: quantity,
            });
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(ValidationError::OutOfRange {
                field: "cart lines",
                min: 0,
                max: MAX_CART_LINES as i64,
            }
            .into());
        }

        self.lines.push(CartLine::from_product(product, quantity));
        Ok(())
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - Quantity 0 removes the line
    /// - Unknown product id returns NotFound
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_line(product_id);
        }

        crate::validation::validate_quantity(quantity)?;

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or_else(|| CoreError::not_found("Cart line", product_id))?;

        line.quantity = quantity;
        Ok(())
    }

    /// Overrides the charged price of a line (register discount).
    pub fn override_price(&mut self, product_id: &str, price_cents: i64) -> CoreResult<()> {
        crate::validation::validate_price_cents(price_cents)?;

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or_else(|| CoreError::not_found("Cart line", product_id))?;

        line.edited_price_cents = price_cents;
        Ok(())
    }

    /// Removes a line by product ID.
    pub fn remove_line(&mut self, product_id: &str) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);

        if self.lines.len() == initial_len {
            Err(CoreError::not_found("Cart line", product_id))
        } else {
            Ok(())
        }
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Returns the number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Calculates the total payable in cents.
    pub fn total_cents(&self) -> i64 {
        self.lines.iter().map(|l| l.total_cents()).sum()
    }

    /// Returns the total payable as Money.
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents())
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product(id: &str, quantity: i64, price_cents: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            local_code: format!("SKU-{}", id),
            bar_code: String::new(),
            quantity,
            price_cents,
        }
    }

    #[test]
    fn test_add_product() {
        let mut cart = Cart::new();
        let product = test_product("1", 50, 1550);

        cart.add_product(&product, 2).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_cents(), 3100);
    }

    #[test]
    fn test_add_same_product_merges_line() {
        let mut cart = Cart::new();
        let product = test_product("1", 50, 1550);

        cart.add_product(&product, 2).unwrap();
        cart.add_product(&product, 3).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines[0].quantity, 5);
    }

    #[test]
    fn test_add_beyond_stock_rejected() {
        let mut cart = Cart::new();
        let product = test_product("1", 3, 1000);

        cart.add_product(&product, 2).unwrap();
        let err = cart.add_product(&product, 2).unwrap_err();

        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 3,
                requested: 4,
                ..
            }
        ));
        // The existing line is untouched
        assert_eq!(cart.lines[0].quantity, 2);
    }

    #[test]
    fn test_override_price_changes_total() {
        let mut cart = Cart::new();
        let product = test_product("1", 50, 1550);

        cart.add_product(&product, 2).unwrap();
        cart.override_price("1", 1000).unwrap();

        assert_eq!(cart.lines[0].unit_price_cents, 1550);
        assert_eq!(cart.total_cents(), 2000);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        let product = test_product("1", 50, 1550);

        cart.add_product(&product, 2).unwrap();
        cart.set_quantity("1", 0).unwrap();

        assert!(cart.is_empty());
    }

    #[test]
    fn test_negative_price_override_rejected() {
        let mut cart = Cart::new();
        let product = test_product("1", 50, 1550);

        cart.add_product(&product, 1).unwrap();
        assert!(cart.override_price("1", -1).is_err());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        let product = test_product("1", 50, 1550);

        cart.add_product(&product, 2).unwrap();
        assert!(!cart.is_empty());

        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_max_price_line_total_is_exact() {
        let mut cart = Cart::new();
        let product = test_product("1", 999, crate::MAX_PRICE_CENTS);

        cart.add_product(&product, 999).unwrap();

        // The largest total the validators allow; exact, no overflow
        assert_eq!(cart.total_cents(), crate::MAX_PRICE_CENTS * 999);
    }

    #[test]
    fn test_mixed_lines_total() {
        let mut cart = Cart::new();
        let coffee = test_product("1", 50, 150);
        let milk = test_product("2", 30, 200);

        cart.add_product(&coffee, 2).unwrap();
        cart.add_product(&milk, 3).unwrap();

        // 2 × $1.50 + 3 × $2.00 = $9.00
        assert_eq!(cart.total_cents(), 900);
    }
}
