//! # Application State
//!
//! The single state value everything operates on, plus the seed data
//! used on first launch (or whenever no snapshot exists yet).
//!
//! ## Discipline Boundary
//! Fields are public so the snapshot serializer and the transition
//! functions in this crate can reach them, but presentation code must
//! only go through [`crate::PosEngine`]. The engine never hands out
//! `&mut AppState`.

use serde::{Deserialize, Serialize};

use selles_core::{Product, SaleRecord, ShiftRecord, User, UserRole};

/// The complete application state.
///
/// Serialized as-is: the persisted snapshot is exactly this struct as
/// one JSON document, rewritten after every mutating operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// The operator currently signed in at this terminal.
    pub current_user: Option<User>,

    /// The single global shift slot. One active shift across the whole
    /// system at a time - this models a single-terminal store, and is
    /// the literal contract of the design.
    pub active_shift: Option<ShiftRecord>,

    /// The live catalog.
    pub products: Vec<Product>,

    /// Append-only sale history.
    pub sales: Vec<SaleRecord>,

    /// Staff accounts.
    pub users: Vec<User>,
}

impl AppState {
    /// The fixed seed catalog and staff used when no snapshot exists.
    ///
    /// Includes the bootstrap manager account (`admin`), which is
    /// protected from deletion thereafter.
    pub fn seed() -> Self {
        AppState {
            current_user: None,
            active_shift: None,
            products: vec![
                Product {
                    id: "1".to_string(),
                    name: "Coffee Beans".to_string(),
                    local_code: "COF01".to_string(),
                    bar_code: "1001001".to_string(),
                    quantity: 50,
                    price_cents: 1550,
                },
                Product {
                    id: "2".to_string(),
                    name: "Milk 1L".to_string(),
                    local_code: "MILK01".to_string(),
                    bar_code: "2002002".to_string(),
                    quantity: 30,
                    price_cents: 250,
                },
                Product {
                    id: "3".to_string(),
                    name: "Sugar 1kg".to_string(),
                    local_code: "SUG01".to_string(),
                    bar_code: "3003003".to_string(),
                    quantity: 100,
                    price_cents: 120,
                },
            ],
            sales: Vec::new(),
            users: vec![
                User {
                    id: "admin".to_string(),
                    username: "admin".to_string(),
                    password: "password".to_string(),
                    role: UserRole::Manager,
                },
                User {
                    id: "user1".to_string(),
                    username: "cashier1".to_string(),
                    password: "password".to_string(),
                    role: UserRole::User,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_contents() {
        let state = AppState::seed();

        assert_eq!(state.products.len(), 3);
        assert_eq!(state.users.len(), 2);
        assert!(state.sales.is_empty());
        assert!(state.current_user.is_none());
        assert!(state.active_shift.is_none());

        let admin = state.users.iter().find(|u| u.username == "admin").unwrap();
        assert_eq!(admin.role, UserRole::Manager);

        let coffee = &state.products[0];
        assert_eq!(coffee.local_code, "COF01");
        assert_eq!(coffee.price_cents, 1550);
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let state = AppState::seed();
        let json = serde_json::to_string(&state).unwrap();
        let back: AppState = serde_json::from_str(&json).unwrap();

        assert_eq!(back.products.len(), state.products.len());
        assert_eq!(back.users.len(), state.users.len());
    }
}
