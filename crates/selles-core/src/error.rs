//! # Error Types
//!
//! Domain-specific error types for selles-core.
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  CoreError                                                          │
//! │  ├── Validation         - bad input shape/range (recoverable)       │
//! │  ├── NotFound           - stale id reference (recoverable)          │
//! │  ├── InsufficientStock  - blocks commit, names the product          │
//! │  ├── Authentication     - bad credentials, generic message          │
//! │  ├── ShiftAlreadyActive - state machine violation                   │
//! │  ├── NoActiveShift      - state machine violation                   │
//! │  ├── EmptyCart          - nothing to sell                           │
//! │  └── ProtectedAccount   - bootstrap manager cannot be deleted       │
//! │                                                                     │
//! │  None of these are fatal to the process - every core operation      │
//! │  returns a typed outcome rather than crashing.                      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, shortfall, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations or state machine misuse.
/// They are surfaced to the presentation layer for correction and
/// never abort the process.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input validation failed (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// An entity referenced by id does not exist (stale reference).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The catalog cannot cover the requested quantity.
    ///
    /// Raised both by the internal stock decrement and by commit-time
    /// revalidation of a cart. Names the product and the shortfall so
    /// the cashier can correct the offending line.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Bad credentials.
    ///
    /// Deliberately generic: the message never reveals whether the
    /// username or the password was wrong.
    #[error("Invalid username or password")]
    Authentication,

    /// A shift is already active; the single slot is occupied.
    #[error("A shift is already active: {shift_id}")]
    ShiftAlreadyActive { shift_id: String },

    /// No shift is active where one is required.
    #[error("No active shift")]
    NoActiveShift,

    /// The cart has no lines to commit.
    #[error("Cart is empty")]
    EmptyCart,

    /// The bootstrap manager account cannot be deleted.
    #[error("Account '{username}' is protected and cannot be deleted")]
    ProtectedAccount { username: String },
}

impl CoreError {
    /// Creates a NotFound error.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements. Used for
/// early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            name: "Coffee Beans".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Coffee Beans: available 3, requested 5"
        );
    }

    #[test]
    fn test_authentication_message_is_generic() {
        // The message must not leak which field was wrong
        let err = CoreError::Authentication;
        assert_eq!(err.to_string(), "Invalid username or password");
    }

    #[test]
    fn test_not_found_helper() {
        let err = CoreError::not_found("Product", "abc-123");
        assert_eq!(err.to_string(), "Product not found: abc-123");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required { field: "name" };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
