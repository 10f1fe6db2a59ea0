//! # Sale Processor
//!
//! The critical transactional path: turning a cart into a committed
//! `SaleRecord` while decrementing stock, all-or-nothing.
//!
//! ## Commit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        commit_sale                                  │
//! │                                                                     │
//! │  cart ──► empty? ──────────────────────────────► EmptyCart          │
//! │            │                                                        │
//! │            ▼                                                        │
//! │  operator exists? ─────────────────────────────► NotFound           │
//! │            │                                                        │
//! │            ▼                                                        │
//! │  shift slot occupied? ─────────────────────────► NoActiveShift      │
//! │            │                                                        │
//! │            ▼                                                        │
//! │  re-check EVERY line against LIVE stock                             │
//! │  (the cart's own stock guard ran against a possibly stale render)   │
//! │            │                                                        │
//! │            ├── any shortfall ──────────────────► InsufficientStock  │
//! │            │                    (whole commit fails, nothing moves) │
//! │            ▼                                                        │
//! │  swap in next state: decremented catalog + appended record          │
//! │  (one transition - both effects visible together or neither)        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The revalidation closes the race between display and commit: stock
//! may have changed between add-to-cart and checkout (a manager edit,
//! or the same product added on two lines). The check-and-decrement
//! runs against a scratch copy of the catalog; the copy replaces the
//! live one only after every line has passed.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use selles_core::{Cart, CoreError, CoreResult, SaleItem, SaleRecord};

use crate::catalog;
use crate::state::AppState;

/// Commits a sale.
///
/// Price overrides in the cart are honored as charged (register
/// discount - intentional flexibility, no extra authorization). On
/// success the returned record has already been appended to history
/// and stock decremented; the caller is expected to clear the cart.
pub(crate) fn commit_sale(
    state: &mut AppState,
    cart: &Cart,
    operator_id: &str,
) -> CoreResult<SaleRecord> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let operator = state
        .users
        .iter()
        .find(|u| u.id == operator_id)
        .ok_or_else(|| CoreError::not_found("User", operator_id))?
        .clone();

    let active_shift = state.active_shift.as_ref().ok_or(CoreError::NoActiveShift)?;

    // Aggregate requested quantities per product so two cart lines for
    // the same product cannot each pass a check the stock only covers
    // once.
    let mut requested: Vec<(&str, &str, i64)> = Vec::new();
    for line in &cart.lines {
        match requested.iter_mut().find(|(id, _, _)| *id == line.product_id) {
            Some((_, _, qty)) => *qty += line.quantity,
            None => requested.push((&line.product_id, &line.name, line.quantity)),
        }
    }

    // Check-and-decrement against a scratch catalog. A product that
    // vanished since add-to-cart counts as zero stock.
    let mut next_products = state.products.clone();
    for (product_id, name, quantity) in requested {
        catalog::decrement_stock(&mut next_products, product_id, quantity).map_err(
            |err| match err {
                CoreError::NotFound { .. } => CoreError::InsufficientStock {
                    name: name.to_string(),
                    available: 0,
                    requested: quantity,
                },
                other => other,
            },
        )?;
    }

    let items: Vec<SaleItem> = cart
        .lines
        .iter()
        .map(|line| SaleItem {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            price_cents: line.edited_price_cents,
            total_cents: line.total_cents(),
        })
        .collect();

    let total_amount_cents = items.iter().map(|i| i.total_cents).sum();

    let record = SaleRecord {
        id: Uuid::new_v4().to_string(),
        timestamp: Utc::now(),
        user_id: operator.id.clone(),
        username: operator.username.clone(),
        shift: active_shift.shift_type,
        items,
        total_amount_cents,
    };

    // The single state transition: both effects or neither. Everything
    // above only read or worked on scratch copies.
    state.products = next_products;
    state.sales.push(record.clone());

    info!(
        sale_id = %record.id,
        operator = %record.username,
        shift = %record.shift,
        total = %record.total_amount(),
        lines = record.items.len(),
        "Sale committed"
    );

    Ok(record)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shift;
    use selles_core::{Product, ShiftType};

    fn state_with_shift() -> AppState {
        let mut state = AppState::seed();
        shift::activate_shift(&mut state, "user1", ShiftType::A).unwrap();
        state
    }

    fn cart_with(state: &AppState, picks: &[(&str, i64)]) -> Cart {
        let mut cart = Cart::new();
        for (id, qty) in picks {
            let product = state.products.iter().find(|p| p.id == *id).unwrap();
            cart.add_product(product, *qty).unwrap();
        }
        cart
    }

    #[test]
    fn test_empty_cart_rejected() {
        let mut state = state_with_shift();
        let err = commit_sale(&mut state, &Cart::new(), "user1").unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_no_active_shift_rejected() {
        let mut state = AppState::seed();
        let cart = cart_with(&state, &[("1", 1)]);

        let err = commit_sale(&mut state, &cart, "user1").unwrap_err();
        assert!(matches!(err, CoreError::NoActiveShift));
        assert!(state.sales.is_empty());
        assert_eq!(state.products[0].quantity, 50);
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let mut state = state_with_shift();
        let cart = cart_with(&state, &[("1", 1)]);

        let err = commit_sale(&mut state, &cart, "ghost").unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn test_successful_commit_decrements_and_appends() {
        let mut state = state_with_shift();
        let cart = cart_with(&state, &[("1", 2), ("2", 3)]);

        let record = commit_sale(&mut state, &cart, "user1").unwrap();

        assert_eq!(state.products[0].quantity, 48);
        assert_eq!(state.products[1].quantity, 27);
        assert_eq!(state.sales.len(), 1);
        assert_eq!(record.user_id, "user1");
        assert_eq!(record.username, "cashier1");
        assert_eq!(record.shift, ShiftType::A);
    }

    #[test]
    fn test_total_is_sum_of_line_totals() {
        let mut state = state_with_shift();
        state.products.push(Product {
            id: "a".to_string(),
            name: "Item A".to_string(),
            local_code: "A".to_string(),
            bar_code: String::new(),
            quantity: 10,
            price_cents: 150,
        });
        state.products.push(Product {
            id: "b".to_string(),
            name: "Item B".to_string(),
            local_code: "B".to_string(),
            bar_code: String::new(),
            quantity: 10,
            price_cents: 200,
        });

        let cart = cart_with(&state, &[("a", 2), ("b", 3)]);
        let record = commit_sale(&mut state, &cart, "user1").unwrap();

        // 2 × $1.50 + 3 × $2.00 = $9.00
        assert_eq!(record.total_amount_cents, 900);
        let item_sum: i64 = record.items.iter().map(|i| i.total_cents).sum();
        assert_eq!(record.total_amount_cents, item_sum);
    }

    #[test]
    fn test_all_or_nothing_on_mixed_cart() {
        let mut state = state_with_shift();
        let cart = cart_with(&state, &[("1", 2), ("2", 5)]);

        // Stock for Milk drops after the cart was assembled
        state.products[1].quantity = 4;

        let err = commit_sale(&mut state, &cart, "user1").unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 4,
                requested: 5,
                ..
            }
        ));

        // No record, no stock movement - not even for the valid line
        assert!(state.sales.is_empty());
        assert_eq!(state.products[0].quantity, 50);
        assert_eq!(state.products[1].quantity, 4);
    }

    #[test]
    fn test_sell_out_then_second_commit_fails() {
        let mut state = state_with_shift();
        state.products[0].quantity = 5;

        let cart = cart_with(&state, &[("1", 5)]);
        commit_sale(&mut state, &cart, "user1").unwrap();
        assert_eq!(state.products[0].quantity, 0);

        // Rebuild an identical cart against the stale render
        let mut stale_cart = Cart::new();
        let mut stale_product = state.products[0].clone();
        stale_product.quantity = 5;
        stale_cart.add_product(&stale_product, 5).unwrap();

        let err = commit_sale(&mut state, &stale_cart, "user1").unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 0,
                requested: 5,
                ..
            }
        ));
        assert_eq!(state.sales.len(), 1);
    }

    #[test]
    fn test_deleted_product_counts_as_zero_stock() {
        let mut state = state_with_shift();
        let cart = cart_with(&state, &[("1", 1)]);

        state.products.retain(|p| p.id != "1");

        let err = commit_sale(&mut state, &cart, "user1").unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 0, .. }
        ));
    }

    #[test]
    fn test_price_override_is_honored() {
        let mut state = state_with_shift();
        let mut cart = cart_with(&state, &[("1", 2)]);
        cart.override_price("1", 1000).unwrap();

        let record = commit_sale(&mut state, &cart, "user1").unwrap();

        assert_eq!(record.items[0].price_cents, 1000);
        assert_eq!(record.total_amount_cents, 2000);
    }

    #[test]
    fn test_history_is_append_only() {
        let mut state = state_with_shift();

        let cart = cart_with(&state, &[("1", 1)]);
        let first = commit_sale(&mut state, &cart, "user1").unwrap();

        let cart = cart_with(&state, &[("2", 1)]);
        commit_sale(&mut state, &cart, "user1").unwrap();

        assert_eq!(state.sales.len(), 2);
        assert_eq!(state.sales[0].id, first.id);
    }
}
