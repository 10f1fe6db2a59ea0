//! # selles-core: Pure Business Logic for Sellespro POS
//!
//! This crate is the **heart** of Sellespro POS. It contains all business
//! logic as pure functions and types with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Sellespro POS Architecture                      │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐   │
//! │  │                 Frontend (register / dashboards)            │   │
//! │  │    Search UI ──► Cart UI ──► Checkout ──► Receipt UI        │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │                 selles-engine (state container)             │   │
//! │  │    authenticate, activate_shift, commit_sale, restock, ...  │   │
//! │  └─────────────────────────────┬───────────────────────────────┘   │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐   │
//! │  │               ★ selles-core (THIS CRATE) ★                  │   │
//! │  │                                                             │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌───────────┐          │   │
//! │  │  │  types  │ │  money  │ │  cart   │ │ analytics │          │   │
//! │  │  │ Product │ │  Money  │ │  Cart   │ │ summarize │          │   │
//! │  │  │  Sale   │ │ (cents) │ │CartLine │ │  windows  │          │   │
//! │  │  └─────────┘ └─────────┘ └─────────┘ └───────────┘          │   │
//! │  │                                                             │   │
//! │  │   NO I/O • NO CLOCK • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, User, ShiftRecord, SaleRecord)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The ephemeral cart a cashier assembles before checkout
//! - [`analytics`] - Pure revenue/top-item/volume summaries
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Same input = same output; analytics take `now`
//!    as an explicit argument instead of reading the clock
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) so the
//!    `total == Σ line totals` invariant is exact, never "close enough"
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use selles_core::Money` instead of
// `use selles_core::money::Money`

pub use cart::{Cart, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Stock level below which a product counts as "low stock".
///
/// ## Business Reason
/// A fixed threshold keeps the low-stock filter, the dashboard alert
/// count, and the insight digest in agreement. Could become per-store
/// configuration later; today it is a contract of the design.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Username of the bootstrap manager account.
///
/// This account is seeded on first launch and protected from deletion
/// so a store can never lock itself out of management entirely. The
/// guard matches on username, not role.
pub const BOOTSTRAP_MANAGER_USERNAME: &str = "admin";

/// Maximum distinct lines allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line in the cart.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum accepted unit price, in cents ($1,000,000.00).
///
/// ## Business Reason
/// No register item costs a million dollars; a larger value is a typo.
/// The cap also keeps every line total and cart total far inside i64,
/// so the money arithmetic can never overflow.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;
