//! # Analytics
//!
//! Pure read path over the sale history. No mutation, no hidden state:
//! every figure is a function of the sales, the catalog, the filters,
//! and a `now` the caller passes in explicitly. The same inputs always
//! produce the same summary.
//!
//! ## Filter Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Analytics Pipeline                             │
//! │                                                                     │
//! │  sales (append-only history)                                        │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  viewer scope: User role sees only own sales, Manager sees all      │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  timeframe window: today / week / month / lifetime                  │
//! │       │            (boundaries at local midnight)                   │
//! │       ▼                                                             │
//! │  shift filter: ALL / A / B                                          │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SalesSummary { revenue, top item, volume, low stock count }        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Product, SaleRecord, ShiftType, UserRole};

// =============================================================================
// Filters
// =============================================================================

/// The reporting window, anchored at the viewer's local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// Local midnight to now.
    Today,
    /// Most recent Sunday 00:00 to now.
    Week,
    /// First of the current month 00:00 to now.
    Month,
    /// No lower bound.
    Lifetime,
}

impl Timeframe {
    /// Returns the inclusive lower bound of the window, or `None` for
    /// [`Timeframe::Lifetime`].
    ///
    /// Boundaries are computed in the local calendar (a sale at 23:50
    /// belongs to that day, not to UTC's next day). Around DST jumps a
    /// local midnight can be ambiguous or skipped; the earliest valid
    /// interpretation is used.
    pub fn lower_bound(&self, now: DateTime<Local>) -> Option<DateTime<Utc>> {
        let midnight = |date: chrono::NaiveDate| -> DateTime<Utc> {
            let naive = date.and_hms_opt(0, 0, 0).unwrap_or_default();
            Local
                .from_local_datetime(&naive)
                .earliest()
                .unwrap_or(now)
                .with_timezone(&Utc)
        };

        let today = now.date_naive();
        match self {
            Timeframe::Today => Some(midnight(today)),
            Timeframe::Week => {
                let days_from_sunday = now.weekday().num_days_from_sunday() as i64;
                Some(midnight(today - chrono::Duration::days(days_from_sunday)))
            }
            Timeframe::Month => Some(midnight(today.with_day(1).unwrap_or(today))),
            Timeframe::Lifetime => None,
        }
    }
}

/// Restricts the pool to a shift type, or passes all shifts through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftFilter {
    All,
    A,
    B,
}

impl ShiftFilter {
    fn matches(&self, shift: ShiftType) -> bool {
        match self {
            ShiftFilter::All => true,
            ShiftFilter::A => shift == ShiftType::A,
            ShiftFilter::B => shift == ShiftType::B,
        }
    }
}

/// Who is asking.
///
/// A `User` role viewer only ever sees records with their own
/// `user_id`; a `Manager` sees everything. Applied before windowing.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub user_id: String,
    pub role: UserRole,
}

impl Viewer {
    fn can_see(&self, sale: &SaleRecord) -> bool {
        match self.role {
            UserRole::Manager => true,
            UserRole::User => sale.user_id == self.user_id,
        }
    }
}

// =============================================================================
// Filtering
// =============================================================================

/// Applies viewer scope, timeframe window and shift filter, in that
/// order, preserving the history's insertion order.
pub fn filter_sales<'a>(
    sales: &'a [SaleRecord],
    timeframe: Timeframe,
    shift_filter: ShiftFilter,
    viewer: &Viewer,
    now: DateTime<Local>,
) -> Vec<&'a SaleRecord> {
    let lower_bound = timeframe.lower_bound(now);

    sales
        .iter()
        .filter(|sale| viewer.can_see(sale))
        .filter(|sale| lower_bound.map_or(true, |bound| sale.timestamp >= bound))
        .filter(|sale| shift_filter.matches(sale.shift))
        .collect()
}

// =============================================================================
// Summary
// =============================================================================

/// The item name with the highest summed quantity in the filtered set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TopItem {
    pub name: String,
    pub units: i64,
}

/// Derived statistics for a reporting window.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    /// Σ total_amount over the filtered set, in cents.
    pub total_revenue_cents: i64,

    /// Best seller by summed quantity; `None` when there are no sales.
    /// Ties break by first-encountered insertion order.
    pub top_item: Option<TopItem>,

    /// Count of filtered sale records.
    pub transaction_volume: usize,

    /// Count of catalog products with `quantity < 10`. Not affected by
    /// the sale filters - it is a property of the live catalog.
    pub low_stock_count: usize,
}

/// Computes the summary for a reporting window.
pub fn summarize(
    sales: &[SaleRecord],
    products: &[Product],
    timeframe: Timeframe,
    shift_filter: ShiftFilter,
    viewer: &Viewer,
    now: DateTime<Local>,
) -> SalesSummary {
    let filtered = filter_sales(sales, timeframe, shift_filter, viewer, now);

    let total_revenue_cents = filtered.iter().map(|s| s.total_amount_cents).sum();

    // Accumulate units per item name in first-encounter order so ties
    // resolve deterministically.
    let mut item_units: Vec<(String, i64)> = Vec::new();
    for sale in &filtered {
        for item in &sale.items {
            match item_units.iter_mut().find(|(name, _)| *name == item.name) {
                Some((_, units)) => *units += item.quantity,
                None => item_units.push((item.name.clone(), item.quantity)),
            }
        }
    }

    let mut top_item: Option<TopItem> = None;
    for (name, units) in item_units {
        let beats = top_item.as_ref().map_or(true, |best| units > best.units);
        if beats {
            top_item = Some(TopItem { name, units });
        }
    }

    SalesSummary {
        total_revenue_cents,
        top_item,
        transaction_volume: filtered.len(),
        low_stock_count: products.iter().filter(|p| p.is_low_stock()).count(),
    }
}

// =============================================================================
// Insight Digest
// =============================================================================

/// One entry of the recent-sales tail handed to the insight generator.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RecentSale {
    /// RFC 3339 timestamp of the sale.
    pub date: String,
    pub amount_cents: i64,
}

/// The condensed view of the business handed to the external insight
/// generator. Building it is pure; sending it is the engine's job and
/// strictly best-effort.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InsightDigest {
    pub total_sales: usize,
    pub revenue_cents: i64,
    /// Names of low-stock products.
    pub inventory_alerts: Vec<String>,
    /// The last (up to) five sales.
    pub recent_sales: Vec<RecentSale>,
}

impl InsightDigest {
    /// Condenses the sale pool and catalog into the digest shape.
    pub fn from_sales(sales: &[SaleRecord], products: &[Product]) -> Self {
        let tail_start = sales.len().saturating_sub(5);

        InsightDigest {
            total_sales: sales.len(),
            revenue_cents: sales.iter().map(|s| s.total_amount_cents).sum(),
            inventory_alerts: products
                .iter()
                .filter(|p| p.is_low_stock())
                .map(|p| p.name.clone())
                .collect(),
            recent_sales: sales[tail_start..]
                .iter()
                .map(|s| RecentSale {
                    date: s.timestamp.to_rfc3339(),
                    amount_cents: s.total_amount_cents,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
