//! Stock history (audit log) models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chronify_core::PartNumber;

/// A recorded stock change, read back from `stock_history`.
///
/// Rows are append-only: the dashboard never updates or deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockHistoryEntry {
    pub id: i64,
    pub part_number: PartNumber,
    pub description: String,
    pub category: String,
    /// Stock quantity after the change.
    pub stock_qnt: i32,
    /// Email of the user who saved the change.
    pub user: String,
    pub timestamp: DateTime<Utc>,
}

/// A stock change about to be appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStockHistoryEntry {
    pub part_number: PartNumber,
    pub description: String,
    pub category: String,
    pub stock_qnt: i32,
    pub user: String,
    pub timestamp: DateTime<Utc>,
}
