//! # Shift Transitions
//!
//! The single global shift slot.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                                                                     │
//! │   NoShift ────activate(operator, type)────► Active                  │
//! │      ▲                                        │                     │
//! │      └────────────deactivate()────────────────┘                     │
//! │                                                                     │
//! │   activate while Active  → ShiftAlreadyActive (slot untouched)      │
//! │   deactivate while empty → NoActiveShift                            │
//! │                                                                     │
//! │   `is_active` only ever transitions false→true and true→false.      │
//! │   Shifts never auto-expire.                                         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The slot is global, not per-operator: the design models a
//! single-terminal, single-active-cashier store. The access rule -
//! User-role operators must hold an active shift before any selling -
//! is enforced at the surrounding session logic and by the sale
//! processor, not here.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use selles_core::{CoreError, CoreResult, ShiftRecord, ShiftType};

use crate::state::AppState;

/// Opens a shift in the global slot.
pub(crate) fn activate_shift(
    state: &mut AppState,
    operator_id: &str,
    shift_type: ShiftType,
) -> CoreResult<ShiftRecord> {
    if let Some(existing) = &state.active_shift {
        return Err(CoreError::ShiftAlreadyActive {
            shift_id: existing.id.clone(),
        });
    }

    if !state.users.iter().any(|u| u.id == operator_id) {
        return Err(CoreError::not_found("User", operator_id));
    }

    let shift = ShiftRecord {
        id: Uuid::new_v4().to_string(),
        user_id: operator_id.to_string(),
        start_time: Utc::now(),
        end_time: None,
        shift_type,
        is_active: true,
    };

    info!(shift_id = %shift.id, operator = %operator_id, shift_type = %shift_type, "Shift activated");
    state.active_shift = Some(shift.clone());
    Ok(shift)
}

/// Closes the active shift and empties the slot.
pub(crate) fn deactivate_shift(state: &mut AppState) -> CoreResult<ShiftRecord> {
    let mut shift = state.active_shift.take().ok_or(CoreError::NoActiveShift)?;

    shift.is_active = false;
    shift.end_time = Some(Utc::now());

    info!(shift_id = %shift.id, "Shift deactivated");
    Ok(shift)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activate_and_deactivate() {
        let mut state = AppState::seed();

        let shift = activate_shift(&mut state, "user1", ShiftType::A).unwrap();
        assert!(shift.is_active);
        assert!(shift.end_time.is_none());
        assert!(state.active_shift.is_some());

        let closed = deactivate_shift(&mut state).unwrap();
        assert!(!closed.is_active);
        assert!(closed.end_time.is_some());
        assert!(state.active_shift.is_none());
    }

    #[test]
    fn test_double_activation_preserves_existing_shift() {
        let mut state = AppState::seed();

        let first = activate_shift(&mut state, "user1", ShiftType::A).unwrap();
        let err = activate_shift(&mut state, "admin", ShiftType::B).unwrap_err();

        assert!(matches!(err, CoreError::ShiftAlreadyActive { .. }));
        let current = state.active_shift.as_ref().unwrap();
        assert_eq!(current.id, first.id);
        assert_eq!(current.shift_type, ShiftType::A);
    }

    #[test]
    fn test_deactivate_without_shift() {
        let mut state = AppState::seed();
        let err = deactivate_shift(&mut state).unwrap_err();
        assert!(matches!(err, CoreError::NoActiveShift));
    }

    #[test]
    fn test_activate_requires_known_operator() {
        let mut state = AppState::seed();
        let err = activate_shift(&mut state, "ghost", ShiftType::A).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
        assert!(state.active_shift.is_none());
    }
}
