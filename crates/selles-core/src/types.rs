//! # Domain Types
//!
//! Core domain types used throughout Sellespro POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────┐      │
//! │  │    Product     │   │   SaleRecord   │   │  ShiftRecord   │      │
//! │  │  ────────────  │   │  ────────────  │   │  ────────────  │      │
//! │  │  id (UUID)     │   │  id (UUID)     │   │  id (UUID)     │      │
//! │  │  local_code    │   │  items (snap)  │   │  shift_type    │      │
//! │  │  quantity      │   │  total_amount  │   │  is_active     │      │
//! │  │  price_cents   │   │  user_id       │   │  start/end     │      │
//! │  └────────────────┘   └────────────────┘   └────────────────┘      │
//! │                                                                     │
//! │  ┌────────────────┐   ┌────────────────┐                           │
//! │  │      User      │   │    UserRole    │                           │
//! │  │  ────────────  │   │  ────────────  │                           │
//! │  │  username      │   │  Manager       │                           │
//! │  │  password (!)  │   │  User          │                           │
//! │  └────────────────┘   └────────────────┘                           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `SaleItem` freezes product name and price at the moment of sale.
//! Products may be edited or deleted afterwards; sale history never
//! changes, and it stays displayable without a catalog lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// User Role
// =============================================================================

/// The role an operator holds.
///
/// Modeled as a closed enumeration so every operation's required role
/// is an explicit precondition at the API boundary, never an ad-hoc
/// string comparison buried in presentation logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Full access: catalog administration, staff accounts, all analytics.
    Manager,
    /// Cashier: sells against an active shift, sees only own figures.
    User,
}

// =============================================================================
// Shift Type
// =============================================================================

/// The two working-session slots of a store day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ShiftType {
    A,
    B,
}

impl std::fmt::Display for ShiftType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShiftType::A => write!(f, "A"),
            ShiftType::B => write!(f, "B"),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A staff account.
///
/// ## Known Gap (intentional)
/// The password is stored in plaintext and usernames are not checked
/// for uniqueness at creation. A production deployment should hash
/// credentials and enforce uniqueness; this core documents the gap
/// instead of silently changing the contract.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier (UUID v4, except seeded accounts).
    pub id: String,

    /// Login name. Unique by convention, not enforced (see gap above).
    pub username: String,

    /// Plaintext password (see gap above).
    pub password: String,

    /// Role gates which operations are reachable.
    pub role: UserRole,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale, owned exclusively by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the cashier and on the receipt.
    pub name: String,

    /// Local code (SKU) - business identifier, searched case-insensitively.
    pub local_code: String,

    /// Barcode as scanned at the register. May be empty.
    pub bar_code: String,

    /// Current stock level. Never negative.
    pub quantity: i64,

    /// Unit price in cents.
    pub price_cents: i64,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether this product counts as low stock (`quantity < 10`).
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity < LOW_STOCK_THRESHOLD
    }

    /// Case-insensitive substring match against name, local code and
    /// barcode - the register's live search.
    pub fn matches_query(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.local_code.to_lowercase().contains(&query)
            || self.bar_code.to_lowercase().contains(&query)
    }
}

// =============================================================================
// Shift Record
// =============================================================================

/// A bounded working session during which a cashier may sell.
///
/// ## Lifecycle
/// ```text
/// NoShift ──activate──► Active (is_active = true, end_time = None)
/// Active ──deactivate──► Closed (is_active = false, end_time = Some)
/// ```
/// No other transitions exist; shifts never auto-expire.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRecord {
    pub id: String,

    /// The operator who opened the shift.
    pub user_id: String,

    #[ts(as = "String")]
    pub start_time: DateTime<Utc>,

    /// Set when the shift closes.
    #[ts(as = "Option<String>")]
    pub end_time: Option<DateTime<Utc>>,

    pub shift_type: ShiftType,

    pub is_active: bool,
}

// =============================================================================
// Sale Record
// =============================================================================

/// A line item in a completed sale.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    /// The product sold. May no longer exist in the catalog.
    pub product_id: String,

    /// Product name at time of sale (frozen).
    pub name: String,

    /// Quantity sold.
    pub quantity: i64,

    /// Unit price in cents actually charged (may be a register
    /// override of the catalog price).
    pub price_cents: i64,

    /// Line total (quantity × price_cents).
    pub total_cents: i64,
}

impl SaleItem {
    /// Returns the line total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A finalized sale. Immutable once created - the history is append-only.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub id: String,

    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,

    /// The operator who processed the sale. Referenced the existing
    /// user at creation time; that user may later be deleted.
    pub user_id: String,

    /// Operator username at time of sale (frozen), so history stays
    /// displayable after account deletion.
    pub username: String,

    /// Which shift the sale was recorded under.
    pub shift: ShiftType,

    /// Frozen line items.
    pub items: Vec<SaleItem>,

    /// Grand total in cents. Always equals the sum of line totals.
    pub total_amount_cents: i64,
}

impl SaleRecord {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product {
            id: "1".to_string(),
            name: "Coffee Beans".to_string(),
            local_code: "COF01".to_string(),
            bar_code: "1001001".to_string(),
            quantity: 50,
            price_cents: 1550,
        }
    }

    #[test]
    fn test_low_stock_threshold() {
        let mut product = sample_product();
        assert!(!product.is_low_stock());

        product.quantity = 9;
        assert!(product.is_low_stock());

        product.quantity = 10;
        assert!(!product.is_low_stock());
    }

    #[test]
    fn test_matches_query_case_insensitive() {
        let product = sample_product();
        assert!(product.matches_query("coffee"));
        assert!(product.matches_query("cof01"));
        assert!(product.matches_query("1001"));
        assert!(product.matches_query(""));
        assert!(!product.matches_query("milk"));
    }

    #[test]
    fn test_shift_type_display() {
        assert_eq!(ShiftType::A.to_string(), "A");
        assert_eq!(ShiftType::B.to_string(), "B");
    }
}
