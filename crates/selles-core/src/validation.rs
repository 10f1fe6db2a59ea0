//! # Validation Module
//!
//! Input validation utilities for Sellespro POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                              │
//! │                                                                     │
//! │  Layer 1: Frontend                                                  │
//! │  ├── Basic format checks (empty, length)                            │
//! │  └── Immediate user feedback                                        │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: Engine API boundary (Rust)                                │
//! │  └── THIS MODULE: checked once, before any state mutation           │
//! │                                                                     │
//! │  The engine never trusts the frontend's checks.                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_LINE_QUANTITY, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be blank
/// - Must be at most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required { field: "name" });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name",
            max: 200,
        });
    }

    Ok(())
}

/// Validates a local code (SKU).
///
/// ## Rules
/// - Must not be blank
/// - Must be at most 50 characters
pub fn validate_local_code(local_code: &str) -> ValidationResult<()> {
    let local_code = local_code.trim();

    if local_code.is_empty() {
        return Err(ValidationError::Required {
            field: "local code",
        });
    }

    if local_code.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "local code",
            max: 50,
        });
    }

    Ok(())
}

/// Validates a username.
pub fn validate_username(username: &str) -> ValidationResult<()> {
    if username.trim().is_empty() {
        return Err(ValidationError::Required { field: "username" });
    }

    if username.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "username",
            max: 50,
        });
    }

    Ok(())
}

/// Validates a password.
///
/// Blank passwords are rejected; no strength rules beyond that.
/// Credential hardening is out of scope for this core.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.trim().is_empty() {
        return Err(ValidationError::Required { field: "password" });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns the full catalog)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query",
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a restock amount.
///
/// ## Rules
/// - Must be a positive integer (> 0); restock is strictly additive
pub fn validate_restock_amount(amount: i64) -> ValidationResult<()> {
    if amount <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "restock amount",
        });
    }

    Ok(())
}

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive { field: "quantity" });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity",
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock level.
///
/// ## Rules
/// - Must be non-negative (>= 0); the catalog never holds negative stock
pub fn validate_stock_level(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity",
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items, full register discounts)
/// - At most [`MAX_PRICE_CENTS`]; anything above is a typo, and the
///   cap keeps line totals well inside i64
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 || cents > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "price",
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Coffee Beans").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_local_code() {
        assert!(validate_local_code("COF01").is_ok());
        assert!(validate_local_code("").is_err());
        assert!(validate_local_code(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_restock_amount() {
        assert!(validate_restock_amount(1).is_ok());
        assert!(validate_restock_amount(500).is_ok());
        assert!(validate_restock_amount(0).is_err());
        assert!(validate_restock_amount(-10).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1550).is_ok());
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());
        assert!(validate_price_cents(-100).is_err());
        assert!(validate_price_cents(MAX_PRICE_CENTS + 1).is_err());
        assert!(validate_price_cents(i64::MAX).is_err());
    }

    #[test]
    fn test_validate_credentials_fields() {
        assert!(validate_username("cashier1").is_ok());
        assert!(validate_username("  ").is_err());
        assert!(validate_password("password").is_ok());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_search_query_trims() {
        assert_eq!(validate_search_query("  coffee ").unwrap(), "coffee");
        assert!(validate_search_query(&"q".repeat(200)).is_err());
    }
}
