//! # selles-engine: The Transactional State Engine
//!
//! Owns the single application state (users, products, sales, current
//! session) and exposes every operation the presentation layer may
//! perform on it. All mutation happens through [`PosEngine`]; no other
//! code path may touch state fields.
//!
//! ## Control Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                                                                     │
//! │  identity ── authenticates ──► shift ── gates selling ──► sale      │
//! │                                                            │        │
//! │                    catalog ◄── decrements stock ───────────┤        │
//! │                                                            │        │
//! │                    sale history ◄── appends record ────────┘        │
//! │                          │                                          │
//! │                          ▼                                          │
//! │                    analytics (selles-core, read-only)               │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomicity
//! One `Mutex` guards the whole `AppState`. A sale commit computes the
//! complete next state while holding the lock and swaps it in as a
//! single transition - stock decrements and the history append become
//! visible together or not at all. Snapshot persistence runs after the
//! fact on a background task; the in-memory result is authoritative
//! immediately.

// =============================================================================
// Module Declarations
// =============================================================================

mod catalog;
mod identity;
mod sale;
mod shift;

pub mod engine;
pub mod insight;
pub mod persist;
pub mod state;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use engine::{NewProduct, NewUser, PosEngine, ProductPatch};
pub use insight::{InsightClient, FALLBACK_INSIGHT};
pub use persist::{PersistError, SnapshotStore};
pub use state::AppState;

/// Installs the global tracing subscriber, filtered via `RUST_LOG`.
///
/// Call once from the hosting binary before constructing the engine.
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
