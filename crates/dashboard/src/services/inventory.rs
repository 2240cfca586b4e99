//! Inventory editing: change detection, per-cell updates and the stock
//! history audit log.
//!
//! Saving an edited inventory table is deliberately non-atomic. Each changed
//! cell is written with its own single-column update; a failed update is
//! reported and the remaining updates still run. The audit rows for stock
//! changes are inserted once, after every update was attempted, and a failure
//! there does not undo the updates.

use std::collections::HashMap;
use std::fmt;

use chrono::Utc;
use tracing::instrument;

use chronify_core::{PartNumber, StockInput};

use crate::db::InventoryStore;
use crate::models::{CurrentUser, EditableRow, FieldUpdate, NewStockHistoryEntry, Notice, TrackedColumn};

/// A row of the inventory management table as submitted by the user.
///
/// The stock cell is kept as raw text so invalid input can be reported.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditedRow {
    pub description: String,
    pub category: String,
    pub stock_qnt: String,
}

impl EditedRow {
    /// An edited row identical to `row`.
    #[must_use]
    pub fn unchanged(row: &EditableRow) -> Self {
        Self {
            description: row.description.clone(),
            category: row.category.clone(),
            stock_qnt: row.stock_qnt.to_string(),
        }
    }
}

/// The new value of a changed cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Description(String),
    Category(String),
    StockQnt(StockInput),
}

impl CellValue {
    #[must_use]
    pub const fn column(&self) -> TrackedColumn {
        match self {
            Self::Description(_) => TrackedColumn::Description,
            Self::Category(_) => TrackedColumn::Category,
            Self::StockQnt(_) => TrackedColumn::StockQnt,
        }
    }

    /// The update that persists this value. Invalid stock input becomes 0.
    #[must_use]
    pub fn to_field_update(&self) -> FieldUpdate {
        match self {
            Self::Description(value) => FieldUpdate::Description(value.clone()),
            Self::Category(value) => FieldUpdate::Category(value.clone()),
            Self::StockQnt(input) => FieldUpdate::StockQnt(input.coerced()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Description(value) | Self::Category(value) => f.write_str(value),
            Self::StockQnt(input) => write!(f, "{}", input.coerced()),
        }
    }
}

/// One differing `(part_number, column)` cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellChange {
    pub part_number: PartNumber,
    pub new_value: CellValue,
}

impl CellChange {
    #[must_use]
    pub const fn column(&self) -> TrackedColumn {
        self.new_value.column()
    }
}

/// Compare the edited table against the original snapshot.
///
/// Rows are visited in edited order and columns in [`TrackedColumn::ALL`]
/// order. A row missing from `original` has no prior value, so all three of
/// its columns count as changed. Text compares exactly; stock compares after
/// integer coercion, and input that cannot be coerced always counts as a
/// change. Rows present only in `original` are ignored.
#[must_use]
pub fn detect_changes(
    original: &HashMap<PartNumber, EditableRow>,
    edited: &[(PartNumber, EditedRow)],
) -> Vec<CellChange> {
    let mut changes = Vec::new();

    for (part_number, row) in edited {
        let before = original.get(part_number);

        for column in TrackedColumn::ALL {
            let new_value = match column {
                TrackedColumn::Description => {
                    if before.is_some_and(|b| b.description == row.description) {
                        continue;
                    }
                    CellValue::Description(row.description.clone())
                }
                TrackedColumn::Category => {
                    if before.is_some_and(|b| b.category == row.category) {
                        continue;
                    }
                    CellValue::Category(row.category.clone())
                }
                TrackedColumn::StockQnt => {
                    let input = StockInput::parse(&row.stock_qnt);
                    if before.is_some_and(|b| input == StockInput::Valid(b.stock_qnt)) {
                        continue;
                    }
                    CellValue::StockQnt(input)
                }
            };

            changes.push(CellChange {
                part_number: part_number.clone(),
                new_value,
            });
        }
    }

    changes
}

/// Result of one single-column update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    /// The store matched no row for the part number.
    NoMatch,
    Failed(String),
}

/// Result of the batched stock history insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    /// No stock quantity changed.
    NotNeeded,
    Logged(u64),
    Failed(String),
}

/// Everything that happened during one save.
#[derive(Debug, Clone)]
pub struct SaveReport {
    /// Each detected change paired with the outcome of its update.
    pub updates: Vec<(CellChange, UpdateOutcome)>,
    /// Stock inputs that were coerced to 0: `(part_number, raw text)`.
    pub coerced: Vec<(PartNumber, String)>,
    /// The audit rows that were submitted.
    pub audit_entries: Vec<NewStockHistoryEntry>,
    pub audit: AuditOutcome,
}

impl SaveReport {
    /// Whether the save found nothing to write.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Number of updates the store applied.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.updates
            .iter()
            .filter(|(_, outcome)| *outcome == UpdateOutcome::Applied)
            .count()
    }

    /// Render the report as page notices, in the order things happened.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        if self.is_empty() {
            return vec![Notice::info("No changes detected.")];
        }

        let mut notices: Vec<Notice> = self
            .coerced
            .iter()
            .map(|(part_number, raw)| {
                Notice::warning(format!(
                    "Invalid stock quantity for part {part_number}: {raw}. Defaulting to 0."
                ))
            })
            .collect();

        for (change, outcome) in &self.updates {
            let part_number = &change.part_number;
            let column = change.column();
            notices.push(match outcome {
                UpdateOutcome::Applied => Notice::info(format!(
                    "Updated {part_number} -> {column} = {}",
                    change.new_value
                )),
                UpdateOutcome::NoMatch => {
                    Notice::warning(format!("No update returned for {part_number} -> {column}"))
                }
                UpdateOutcome::Failed(err) => {
                    Notice::error(format!("Failed to update {part_number} -> {column}: {err}"))
                }
            });
        }

        match &self.audit {
            AuditOutcome::NotNeeded => {}
            AuditOutcome::Logged(n) => {
                notices.push(Notice::success(format!(
                    "{n} change(s) logged to Stock History."
                )));
            }
            AuditOutcome::Failed(err) => {
                notices.push(Notice::warning(format!(
                    "Could not log changes to stock history: {err}"
                )));
            }
        }

        notices.push(Notice::success(format!(
            "Saved {} of {} update(s).",
            self.applied(),
            self.updates.len()
        )));

        notices
    }
}

/// Build one audit entry per edited row whose stock quantity changed.
fn audit_entries(
    changes: &[CellChange],
    edited: &[(PartNumber, EditedRow)],
    user: &CurrentUser,
) -> Vec<NewStockHistoryEntry> {
    let timestamp = Utc::now();

    changes
        .iter()
        .filter_map(|change| match &change.new_value {
            CellValue::StockQnt(input) => Some((&change.part_number, input.coerced())),
            _ => None,
        })
        .filter_map(|(part_number, stock_qnt)| {
            let (_, row) = edited.iter().find(|(pn, _)| pn == part_number)?;
            Some(NewStockHistoryEntry {
                part_number: part_number.clone(),
                description: row.description.clone(),
                category: row.category.clone(),
                stock_qnt,
                user: user.email().to_string(),
                timestamp,
            })
        })
        .collect()
}

/// Detect changes and persist them.
///
/// Never fails as a whole: every store error is captured in the returned
/// [`SaveReport`].
#[instrument(skip_all, fields(user = %user.email(), rows = edited.len()))]
pub async fn save_changes(
    store: &dyn InventoryStore,
    user: &CurrentUser,
    original: &HashMap<PartNumber, EditableRow>,
    edited: &[(PartNumber, EditedRow)],
) -> SaveReport {
    let changes = detect_changes(original, edited);

    let coerced = changes
        .iter()
        .filter_map(|change| match &change.new_value {
            CellValue::StockQnt(StockInput::Invalid(raw)) => {
                Some((change.part_number.clone(), raw.clone()))
            }
            _ => None,
        })
        .collect();

    let mut updates = Vec::with_capacity(changes.len());
    for change in &changes {
        let update = change.new_value.to_field_update();
        let outcome = match store.update_part_field(&change.part_number, &update).await {
            Ok(0) => {
                tracing::warn!(part_number = %change.part_number, column = %change.column(), "Update matched no rows");
                UpdateOutcome::NoMatch
            }
            Ok(_) => {
                tracing::info!(part_number = %change.part_number, column = %change.column(), "Part updated");
                UpdateOutcome::Applied
            }
            Err(e) => {
                tracing::error!(part_number = %change.part_number, column = %change.column(), error = %e, "Part update failed");
                UpdateOutcome::Failed(e.to_string())
            }
        };
        updates.push((change.clone(), outcome));
    }

    let entries = audit_entries(&changes, edited, user);
    let audit = if entries.is_empty() {
        AuditOutcome::NotNeeded
    } else {
        match store.insert_stock_history(&entries).await {
            Ok(n) => {
                tracing::info!(entries = n, "Stock history logged");
                AuditOutcome::Logged(n)
            }
            Err(e) => {
                tracing::error!(error = %e, entries = entries.len(), "Stock history insert failed");
                AuditOutcome::Failed(e.to_string())
            }
        }
    };

    SaveReport {
        updates,
        coerced,
        audit_entries: entries,
        audit,
    }
}
