//! # PosEngine: The State Container
//!
//! The single entry point the presentation layer talks to. Every
//! operation locks the one state `Mutex`, runs a transition from this
//! crate's modules (or a pure helper from `selles-core`), and releases
//! the lock before anything slow happens.
//!
//! ## Lock Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  caller ──► PosEngine method                                        │
//! │                 │                                                   │
//! │                 ├─ lock state ─► transition ─► unlock               │
//! │                 │                                                   │
//! │                 └─ on success: schedule snapshot save               │
//! │                      (background task when a runtime is present,    │
//! │                       inline otherwise - callers never wait on it)  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Holding the lock across a whole transition is what makes each
//! operation atomic; the snapshot write happens after the fact from a
//! clone, so disk latency never sits inside the critical section. The
//! in-memory state is authoritative the moment a method returns.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Local;
use tracing::{debug, info, warn};

use selles_core::analytics::{
    self, InsightDigest, SalesSummary, ShiftFilter, Timeframe, Viewer,
};
use selles_core::validation::validate_search_query;
use selles_core::{Cart, CoreResult, Product, SaleRecord, ShiftRecord, ShiftType, User};

use crate::insight::{InsightClient, FALLBACK_INSIGHT};
use crate::persist::{PersistError, SnapshotStore};
use crate::state::AppState;
use crate::{catalog, identity, sale, shift};

pub use crate::catalog::{NewProduct, ProductPatch};
pub use crate::identity::NewUser;

/// The transactional state container.
///
/// Cheap to clone; clones share the same underlying state.
#[derive(Clone)]
pub struct PosEngine {
    state: Arc<Mutex<AppState>>,
    store: Option<Arc<SnapshotStore>>,
    /// Orders scheduled saves; assigned under the state lock so version
    /// order always matches snapshot recency.
    save_seq: Arc<AtomicU64>,
    insight: Option<InsightClient>,
}

impl PosEngine {
    /// An engine with seed data and no persistence. Used by tests and
    /// useful for demos.
    pub fn in_memory() -> Self {
        PosEngine {
            state: Arc::new(Mutex::new(AppState::seed())),
            store: None,
            save_seq: Arc::new(AtomicU64::new(0)),
            insight: None,
        }
    }

    /// An engine backed by a snapshot file. Loads the existing
    /// snapshot, or seeds when none exists yet.
    pub fn with_store(store: SnapshotStore) -> Result<Self, PersistError> {
        let state = store.load()?;
        info!(path = %store.path().display(), "Engine started");
        Ok(PosEngine {
            state: Arc::new(Mutex::new(state)),
            store: Some(Arc::new(store)),
            save_seq: Arc::new(AtomicU64::new(0)),
            insight: None,
        })
    }

    /// Attaches an insight client. Without one, insight requests
    /// short-circuit to the fallback sentence.
    pub fn with_insight_client(mut self, client: InsightClient) -> Self {
        self.insight = Some(client);
        self
    }

    // =========================================================================
    // Lock Helpers
    // =========================================================================

    fn with_state<T>(&self, f: impl FnOnce(&AppState) -> T) -> T {
        let state = self.state.lock().expect("state mutex poisoned");
        f(&state)
    }

    fn with_state_mut<T>(&self, f: impl FnOnce(&mut AppState) -> T) -> T {
        let mut state = self.state.lock().expect("state mutex poisoned");
        f(&mut state)
    }

    /// Runs a mutating transition and schedules a snapshot save when it
    /// succeeds. Failed transitions leave state untouched, so there is
    /// nothing to persist.
    fn transition<T>(&self, f: impl FnOnce(&mut AppState) -> CoreResult<T>) -> CoreResult<T> {
        let result = self.with_state_mut(f);
        if result.is_ok() {
            self.schedule_save();
        }
        result
    }

    /// Persists the current state, off the caller's path when a tokio
    /// runtime is available. Save failures are logged, never surfaced:
    /// the in-memory state already moved on.
    ///
    /// Background saves can reach the blocking pool out of order, so
    /// each one carries a version taken under the state lock; the
    /// store drops any save older than what is already on disk.
    fn schedule_save(&self) {
        let Some(store) = self.store.clone() else {
            return;
        };
        let (snapshot, version) = {
            let state = self.state.lock().expect("state mutex poisoned");
            let version = self.save_seq.fetch_add(1, Ordering::SeqCst) + 1;
            (state.clone(), version)
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || {
                    if let Err(err) = store.save_if_newer(&snapshot, version) {
                        warn!(error = %err, "Background snapshot save failed");
                    }
                });
            }
            Err(_) => {
                if let Err(err) = store.save_if_newer(&snapshot, version) {
                    warn!(error = %err, "Snapshot save failed");
                }
            }
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Verifies credentials and signs the operator in at this terminal.
    pub fn authenticate(&self, username: &str, password: &str) -> CoreResult<User> {
        self.transition(|state| {
            let user = identity::authenticate(state, username, password)?;
            info!(username = %user.username, role = ?user.role, "Operator signed in");
            state.current_user = Some(user.clone());
            Ok(user)
        })
    }

    /// Signs the current operator out. The active shift is not touched;
    /// shifts outlive sessions.
    pub fn logout(&self) {
        self.with_state_mut(|state| {
            if let Some(user) = state.current_user.take() {
                info!(username = %user.username, "Operator signed out");
            }
        });
        self.schedule_save();
    }

    pub fn current_user(&self) -> Option<User> {
        self.with_state(|state| state.current_user.clone())
    }

    // =========================================================================
    // Shifts
    // =========================================================================

    pub fn activate_shift(
        &self,
        operator_id: &str,
        shift_type: ShiftType,
    ) -> CoreResult<ShiftRecord> {
        self.transition(|state| shift::activate_shift(state, operator_id, shift_type))
    }

    pub fn deactivate_shift(&self) -> CoreResult<ShiftRecord> {
        self.transition(shift::deactivate_shift)
    }

    pub fn active_shift(&self) -> Option<ShiftRecord> {
        self.with_state(|state| state.active_shift.clone())
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Searches the catalog. An empty query lists everything;
    /// `low_stock_only` narrows to products under the threshold.
    pub fn list_products(&self, query: &str, low_stock_only: bool) -> CoreResult<Vec<Product>> {
        let query = validate_search_query(query)?;
        Ok(self.with_state(|state| {
            catalog::search_products(&state.products, &query, low_stock_only)
                .cloned()
                .collect()
        }))
    }

    pub fn create_product(&self, spec: NewProduct) -> CoreResult<Product> {
        self.transition(|state| catalog::create_product(state, spec))
    }

    pub fn update_product(&self, id: &str, patch: ProductPatch) -> CoreResult<Product> {
        self.transition(|state| catalog::update_product(state, id, patch))
    }

    pub fn restock_product(&self, id: &str, amount: i64) -> CoreResult<Product> {
        self.transition(|state| catalog::restock_product(state, id, amount))
    }

    pub fn delete_product(&self, id: &str) -> CoreResult<()> {
        self.transition(|state| catalog::remove_product(state, id))
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// Commits the cart as a sale. On success the cart is cleared; on
    /// failure it is left exactly as it was so the cashier can adjust
    /// and retry.
    pub fn commit_sale(&self, cart: &mut Cart, operator_id: &str) -> CoreResult<SaleRecord> {
        let record = self.transition(|state| sale::commit_sale(state, cart, operator_id))?;
        cart.clear();
        Ok(record)
    }

    /// The report view of the history: viewer-scoped, windowed and
    /// shift-filtered, in insertion order. There is no unscoped
    /// listing; a `User` role viewer can never see another operator's
    /// records.
    pub fn list_sales(
        &self,
        timeframe: Timeframe,
        shift_filter: ShiftFilter,
        viewer: &Viewer,
    ) -> Vec<SaleRecord> {
        self.with_state(|state| {
            analytics::filter_sales(&state.sales, timeframe, shift_filter, viewer, Local::now())
                .into_iter()
                .cloned()
                .collect()
        })
    }

    /// Windowed, shift-filtered, viewer-scoped statistics. The clock is
    /// read here, at the boundary, so the analytics stay pure.
    pub fn summarize_sales(
        &self,
        timeframe: Timeframe,
        shift_filter: ShiftFilter,
        viewer: &Viewer,
    ) -> SalesSummary {
        self.with_state(|state| {
            analytics::summarize(
                &state.sales,
                &state.products,
                timeframe,
                shift_filter,
                viewer,
                Local::now(),
            )
        })
    }

    // =========================================================================
    // Staff
    // =========================================================================

    pub fn create_user(&self, spec: NewUser) -> CoreResult<User> {
        self.transition(|state| identity::create_user(state, spec))
    }

    pub fn delete_user(&self, id: &str) -> CoreResult<()> {
        self.transition(|state| identity::remove_user(state, id))
    }

    pub fn list_users(&self) -> Vec<User> {
        self.with_state(|state| state.users.clone())
    }

    // =========================================================================
    // Insight
    // =========================================================================

    /// The condensed digest the insight service is asked to comment on.
    pub fn insight_digest(&self) -> InsightDigest {
        self.with_state(|state| InsightDigest::from_sales(&state.sales, &state.products))
    }

    /// Fetches sales commentary. Best-effort: with no client attached,
    /// or on any service failure, the fallback sentence comes back.
    /// The state lock is released before the network call starts.
    pub async fn generate_insight(&self) -> String {
        let digest = self.insight_digest();
        match &self.insight {
            Some(client) => client.generate(&digest).await,
            None => {
                debug!("No insight client configured");
                FALLBACK_INSIGHT.to_string()
            }
        }
    }

    /// Runs the insight fetch on a detached task so dashboards can kick
    /// it off without blocking. Must be called from within a tokio
    /// runtime.
    pub fn spawn_insight(&self) -> tokio::task::JoinHandle<String> {
        let engine = self.clone();
        tokio::spawn(async move { engine.generate_insight().await })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
