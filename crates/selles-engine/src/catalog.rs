//! # Catalog Transitions
//!
//! Product create/update/restock/remove/search and the internal stock
//! decrement. Every function here is a plain transition over state the
//! engine already holds the lock for; nothing in this module performs
//! I/O.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use selles_core::validation::{
    validate_local_code, validate_price_cents, validate_product_name, validate_restock_amount,
    validate_stock_level,
};
use selles_core::{CoreError, CoreResult, Product};

use crate::state::AppState;

// =============================================================================
// Input Shapes
// =============================================================================

/// Fields for a new product.
///
/// `quantity`, `price_cents` and `bar_code` default to 0 / 0 / empty
/// when omitted; `name` and `local_code` are mandatory and non-blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub local_code: String,
    #[serde(default)]
    pub bar_code: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub price_cents: Option<i64>,
}

/// A partial update. Present fields replace the stored ones; absent
/// fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub local_code: Option<String>,
    pub bar_code: Option<String>,
    pub quantity: Option<i64>,
    pub price_cents: Option<i64>,
}

// =============================================================================
// Transitions
// =============================================================================

/// Adds a product to the catalog.
pub(crate) fn create_product(state: &mut AppState, spec: NewProduct) -> CoreResult<Product> {
    validate_product_name(&spec.name)?;
    validate_local_code(&spec.local_code)?;

    let quantity = spec.quantity.unwrap_or(0);
    let price_cents = spec.price_cents.unwrap_or(0);
    validate_stock_level(quantity)?;
    validate_price_cents(price_cents)?;

    let product = Product {
        id: Uuid::new_v4().to_string(),
        name: spec.name.trim().to_string(),
        local_code: spec.local_code.trim().to_string(),
        bar_code: spec.bar_code.unwrap_or_default(),
        quantity,
        price_cents,
    };

    debug!(id = %product.id, local_code = %product.local_code, "Product created");
    state.products.push(product.clone());
    Ok(product)
}

/// Merges a patch into an existing product.
pub(crate) fn update_product(
    state: &mut AppState,
    id: &str,
    patch: ProductPatch,
) -> CoreResult<Product> {
    if let Some(name) = &patch.name {
        validate_product_name(name)?;
    }
    if let Some(local_code) = &patch.local_code {
        validate_local_code(local_code)?;
    }
    if let Some(quantity) = patch.quantity {
        validate_stock_level(quantity)?;
    }
    if let Some(price_cents) = patch.price_cents {
        validate_price_cents(price_cents)?;
    }

    let product = state
        .products
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| CoreError::not_found("Product", id))?;

    if let Some(name) = patch.name {
        product.name = name.trim().to_string();
    }
    if let Some(local_code) = patch.local_code {
        product.local_code = local_code.trim().to_string();
    }
    if let Some(bar_code) = patch.bar_code {
        product.bar_code = bar_code;
    }
    if let Some(quantity) = patch.quantity {
        product.quantity = quantity;
    }
    if let Some(price_cents) = patch.price_cents {
        product.price_cents = price_cents;
    }

    debug!(id = %product.id, "Product updated");
    Ok(product.clone())
}

/// Adds stock. Strictly additive; the amount must be positive.
pub(crate) fn restock_product(state: &mut AppState, id: &str, amount: i64) -> CoreResult<Product> {
    validate_restock_amount(amount)?;

    let product = state
        .products
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| CoreError::not_found("Product", id))?;

    product.quantity += amount;
    debug!(id = %product.id, amount, new_quantity = product.quantity, "Product restocked");
    Ok(product.clone())
}

/// Deletes a product unconditionally.
///
/// Sale history is untouched: sold lines carry their own snapshot of
/// name and price, so history remains valid after deletion.
pub(crate) fn remove_product(state: &mut AppState, id: &str) -> CoreResult<()> {
    let initial_len = state.products.len();
    state.products.retain(|p| p.id != id);

    if state.products.len() == initial_len {
        return Err(CoreError::not_found("Product", id));
    }

    debug!(id = %id, "Product removed");
    Ok(())
}

/// Lazily yields products whose name, local code or barcode contains
/// `query` case-insensitively. Restartable: call again for a fresh
/// pass. With `low_stock_only`, additionally filters to `quantity < 10`.
pub(crate) fn search_products<'a>(
    products: &'a [Product],
    query: &'a str,
    low_stock_only: bool,
) -> impl Iterator<Item = &'a Product> + 'a {
    products
        .iter()
        .filter(move |p| p.matches_query(query))
        .filter(move |p| !low_stock_only || p.is_low_stock())
}

/// Checks and decrements stock for one product as a single logical
/// operation. Used only by the sale processor while it holds the
/// state lock; never exposed as a public API.
///
/// A decrement that would drive the quantity negative is rejected in
/// full, never clamped.
pub(crate) fn decrement_stock(products: &mut [Product], id: &str, amount: i64) -> CoreResult<()> {
    let product = products
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| CoreError::not_found("Product", id))?;

    if amount > product.quantity {
        return Err(CoreError::InsufficientStock {
            name: product.name.clone(),
            available: product.quantity,
            requested: amount,
        });
    }

    product.quantity -= amount;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> AppState {
        AppState::seed()
    }

    #[test]
    fn test_create_product_defaults() {
        let mut state = seeded();
        let product = create_product(
            &mut state,
            NewProduct {
                name: "Tea Bags".to_string(),
                local_code: "TEA01".to_string(),
                bar_code: None,
                quantity: None,
                price_cents: None,
            },
        )
        .unwrap();

        assert_eq!(product.quantity, 0);
        assert_eq!(product.price_cents, 0);
        assert_eq!(product.bar_code, "");
        assert_eq!(state.products.len(), 4);
    }

    #[test]
    fn test_create_product_requires_name_and_code() {
        let mut state = seeded();

        let blank_name = create_product(
            &mut state,
            NewProduct {
                name: "  ".to_string(),
                local_code: "TEA01".to_string(),
                bar_code: None,
                quantity: None,
                price_cents: None,
            },
        );
        assert!(matches!(blank_name, Err(CoreError::Validation(_))));

        let blank_code = create_product(
            &mut state,
            NewProduct {
                name: "Tea Bags".to_string(),
                local_code: "".to_string(),
                bar_code: None,
                quantity: None,
                price_cents: None,
            },
        );
        assert!(matches!(blank_code, Err(CoreError::Validation(_))));
        assert_eq!(state.products.len(), 3);
    }

    #[test]
    fn test_update_merges_patch() {
        let mut state = seeded();
        let updated = update_product(
            &mut state,
            "1",
            ProductPatch {
                price_cents: Some(1600),
                ..Default::default()
            },
        )
        .unwrap();

        // Only the patched field changed
        assert_eq!(updated.price_cents, 1600);
        assert_eq!(updated.name, "Coffee Beans");
        assert_eq!(updated.quantity, 50);
    }

    #[test]
    fn test_update_unknown_id() {
        let mut state = seeded();
        let err = update_product(&mut state, "nope", ProductPatch::default()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn test_restock_is_additive() {
        let mut state = seeded();
        let product = restock_product(&mut state, "2", 10).unwrap();
        assert_eq!(product.quantity, 40);
    }

    #[test]
    fn test_restock_rejects_non_positive() {
        let mut state = seeded();
        assert!(restock_product(&mut state, "2", 0).is_err());
        assert!(restock_product(&mut state, "2", -5).is_err());
        assert_eq!(state.products[1].quantity, 30);
    }

    #[test]
    fn test_remove_leaves_history_alone() {
        let mut state = seeded();
        state.sales.push(selles_core::SaleRecord {
            id: "s1".to_string(),
            timestamp: chrono::Utc::now(),
            user_id: "user1".to_string(),
            username: "cashier1".to_string(),
            shift: selles_core::ShiftType::A,
            items: vec![selles_core::SaleItem {
                product_id: "1".to_string(),
                name: "Coffee Beans".to_string(),
                quantity: 1,
                price_cents: 1550,
                total_cents: 1550,
            }],
            total_amount_cents: 1550,
        });

        remove_product(&mut state, "1").unwrap();

        assert_eq!(state.products.len(), 2);
        assert_eq!(state.sales.len(), 1);
        assert_eq!(state.sales[0].items[0].name, "Coffee Beans");
    }

    #[test]
    fn test_search_is_restartable() {
        let state = seeded();

        let first: Vec<_> = search_products(&state.products, "co", false).collect();
        let second: Vec<_> = search_products(&state.products, "co", false).collect();

        assert_eq!(first.len(), 1);
        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].name, "Coffee Beans");
    }

    #[test]
    fn test_search_low_stock_only() {
        let mut state = seeded();
        state.products[1].quantity = 4;

        let results: Vec<_> = search_products(&state.products, "", true).collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Milk 1L");
    }

    #[test]
    fn test_decrement_never_goes_negative() {
        let mut state = seeded();

        // Milk has 30 in stock
        decrement_stock(&mut state.products, "2", 30).unwrap();
        assert_eq!(state.products[1].quantity, 0);

        let err = decrement_stock(&mut state.products, "2", 1).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 0,
                requested: 1,
                ..
            }
        ));
        // Rejected in full, not clamped
        assert_eq!(state.products[1].quantity, 0);
    }

    #[test]
    fn test_interleaved_restock_and_decrement() {
        let mut state = seeded();

        restock_product(&mut state, "3", 20).unwrap();
        decrement_stock(&mut state.products, "3", 100).unwrap();
        assert!(decrement_stock(&mut state.products, "3", 21).is_err());
        decrement_stock(&mut state.products, "3", 20).unwrap();

        assert_eq!(state.products[2].quantity, 0);
    }
}
