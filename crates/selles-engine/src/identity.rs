//! # Identity Transitions
//!
//! Staff accounts and credential checks.
//!
//! ## Known Gaps (deliberate, not oversights)
//! - Passwords are compared and stored in plaintext
//! - `create_user` does not enforce username uniqueness
//!
//! Both are documented design gaps; hardening them is explicitly out
//! of scope for this core.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use selles_core::validation::{validate_password, validate_username};
use selles_core::{CoreError, CoreResult, User, UserRole, BOOTSTRAP_MANAGER_USERNAME};

use crate::state::AppState;

/// Fields for a new staff account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: UserRole,
}

/// Exact-match credential scan. Case-sensitive on both fields.
///
/// The failure is a single generic [`CoreError::Authentication`] so
/// the response never reveals which field was wrong.
pub(crate) fn authenticate(state: &AppState, username: &str, password: &str) -> CoreResult<User> {
    state
        .users
        .iter()
        .find(|u| u.username == username && u.password == password)
        .cloned()
        .ok_or(CoreError::Authentication)
}

/// Creates a staff account.
///
/// Username uniqueness is deliberately not enforced; a duplicate only
/// logs a warning.
pub(crate) fn create_user(state: &mut AppState, spec: NewUser) -> CoreResult<User> {
    validate_username(&spec.username)?;
    validate_password(&spec.password)?;

    if state.users.iter().any(|u| u.username == spec.username) {
        warn!(username = %spec.username, "Creating user with a duplicate username");
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        username: spec.username.trim().to_string(),
        password: spec.password,
        role: spec.role,
    };

    debug!(id = %user.id, username = %user.username, role = ?user.role, "User created");
    state.users.push(user.clone());
    Ok(user)
}

/// Deletes a staff account.
///
/// The bootstrap manager account is protected regardless of who asks;
/// the guard matches on username, not role. Sale history referencing
/// the deleted account stays intact (records carry a frozen username).
pub(crate) fn remove_user(state: &mut AppState, id: &str) -> CoreResult<()> {
    let target = state
        .users
        .iter()
        .find(|u| u.id == id)
        .ok_or_else(|| CoreError::not_found("User", id))?;

    if target.username == BOOTSTRAP_MANAGER_USERNAME {
        return Err(CoreError::ProtectedAccount {
            username: target.username.clone(),
        });
    }

    state.users.retain(|u| u.id != id);
    debug!(id = %id, "User removed");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
