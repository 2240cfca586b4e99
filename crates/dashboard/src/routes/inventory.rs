//! Inventory pages: the read-only view and the editable management table.

use std::cmp::Ordering;
use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use chronify_core::PartNumber;

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, EditableRow, Notice, Part, TrackedColumn};
use crate::routes::{SelectOption, UserView};
use crate::services::{EditedRow, save_changes};
use crate::state::AppState;

/// Empty rows offered below the table for additions.
const BLANK_ROWS: usize = 3;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(view))
        .route("/inventory/manage", get(manage).post(save))
}

// =============================================================================
// Inventory View
// =============================================================================

#[derive(Debug, Clone)]
pub struct InventoryRow {
    pub part_number: String,
    pub description: String,
    pub category: String,
    pub user: String,
    pub stock_qnt: i32,
}

impl From<&Part> for InventoryRow {
    fn from(part: &Part) -> Self {
        Self {
            part_number: part.part_number.to_string(),
            description: part.description.clone(),
            category: part.category.clone(),
            user: part.user.clone(),
            stock_qnt: part.stock_qnt,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "inventory/view.html")]
pub struct InventoryViewTemplate {
    pub user: Option<UserView>,
    pub current_path: String,
    pub notices: Vec<Notice>,
    pub rows: Vec<InventoryRow>,
}

/// GET /inventory
#[instrument(skip_all, fields(user = %user.email()))]
async fn view(RequireAuth(user): RequireAuth, State(state): State<AppState>) -> InventoryViewTemplate {
    let mut notices = Vec::new();
    let rows: Vec<InventoryRow> = match state.store().list_parts().await {
        Ok(parts) => parts.iter().map(InventoryRow::from).collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load parts");
            notices.push(Notice::error(format!("Failed to load parts: {e}")));
            Vec::new()
        }
    };

    if rows.is_empty() && notices.is_empty() {
        notices.push(Notice::warning("No parts found in the inventory."));
    }

    InventoryViewTemplate {
        user: Some(UserView::from(&user)),
        current_path: "/inventory".to_string(),
        notices,
        rows,
    }
}

// =============================================================================
// Inventory Management
// =============================================================================

/// Sort direction for the management table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "asc" => Ok(Self::Ascending),
            "desc" => Ok(Self::Descending),
            other => Err(AppError::BadRequest(format!("unknown sort order '{other}'"))),
        }
    }
}

/// Table sorting, parsed from `?sort=&order=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sorting {
    pub column: TrackedColumn,
    pub order: SortOrder,
}

impl Default for Sorting {
    fn default() -> Self {
        Self {
            column: TrackedColumn::Description,
            order: SortOrder::Ascending,
        }
    }
}

impl Sorting {
    fn parse(sort: Option<&str>, order: Option<&str>) -> Result<Self, AppError> {
        let column = match sort.filter(|s| !s.is_empty()) {
            None => TrackedColumn::Description,
            Some(s) => TrackedColumn::ALL
                .into_iter()
                .find(|c| c.as_str() == s)
                .ok_or_else(|| AppError::BadRequest(format!("unknown sort column '{s}'")))?,
        };
        let order = match order.filter(|s| !s.is_empty()) {
            None => SortOrder::Ascending,
            Some(s) => SortOrder::parse(s)?,
        };
        Ok(Self { column, order })
    }

    /// Sort parts in place; ties keep part-number order.
    fn apply(self, parts: &mut [Part]) {
        parts.sort_by(|a, b| {
            let ordering = match self.column {
                TrackedColumn::Description => a.description.cmp(&b.description),
                TrackedColumn::Category => a.category.cmp(&b.category),
                TrackedColumn::StockQnt => a.stock_qnt.cmp(&b.stock_qnt),
            };
            let ordering = match self.order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            };
            if ordering == Ordering::Equal {
                a.part_number.cmp(&b.part_number)
            } else {
                ordering
            }
        });
    }
}

#[derive(Debug, Deserialize)]
pub struct ManageQuery {
    pub sort: Option<String>,
    pub order: Option<String>,
}

/// One row of the editable table.
#[derive(Debug, Clone)]
pub struct ManageRow {
    pub part_number: String,
    pub description: String,
    pub category: String,
    pub stock_qnt: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "inventory/manage.html")]
pub struct ManageTemplate {
    pub user: Option<UserView>,
    pub current_path: String,
    pub notices: Vec<Notice>,
    pub sort: &'static str,
    pub order: &'static str,
    pub columns: Vec<SelectOption>,
    pub rows: Vec<ManageRow>,
    pub blank_rows: usize,
}

/// Load parts and render the table, appending any load failure to `notices`.
async fn render_manage(
    state: &AppState,
    user: &CurrentUser,
    sorting: Sorting,
    mut notices: Vec<Notice>,
) -> ManageTemplate {
    let mut parts = match state.store().list_parts().await {
        Ok(parts) => parts,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load parts");
            notices.push(Notice::error(format!("Failed to load parts: {e}")));
            Vec::new()
        }
    };

    if parts.is_empty() {
        notices.push(Notice::warning("No parts available to manage."));
    }
    sorting.apply(&mut parts);

    ManageTemplate {
        user: Some(UserView::from(user)),
        current_path: "/inventory/manage".to_string(),
        notices,
        sort: sorting.column.as_str(),
        order: sorting.order.as_str(),
        columns: SelectOption::list(
            TrackedColumn::ALL.iter().map(|c| c.as_str()),
            sorting.column.as_str(),
        ),
        rows: parts
            .iter()
            .map(|p| ManageRow {
                part_number: p.part_number.to_string(),
                description: p.description.clone(),
                category: p.category.clone(),
                stock_qnt: p.stock_qnt.to_string(),
            })
            .collect(),
        blank_rows: BLANK_ROWS,
    }
}

/// GET /inventory/manage
#[instrument(skip_all, fields(user = %user.email()))]
async fn manage(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ManageQuery>,
) -> Result<ManageTemplate, AppError> {
    let sorting = Sorting::parse(query.sort.as_deref(), query.order.as_deref())?;
    Ok(render_manage(&state, &user, sorting, Vec::new()).await)
}

/// The edited table as submitted.
///
/// `original` holds each row's values as they were rendered, taken from the
/// hidden `orig_*` fields. Rows without them (additions) have no prior value.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SubmittedTable {
    pub sort: Option<String>,
    pub order: Option<String>,
    pub original: HashMap<PartNumber, EditableRow>,
    pub rows: Vec<(PartNumber, EditedRow)>,
}

/// Fields collected for one row while walking the form.
#[derive(Default)]
struct PendingRow {
    part_number: String,
    edited: EditedRow,
    orig_description: Option<String>,
    orig_category: Option<String>,
    orig_stock_qnt: Option<String>,
}

impl PendingRow {
    fn rendered(&self) -> Option<EditableRow> {
        Some(EditableRow {
            description: self.orig_description.clone()?,
            category: self.orig_category.clone()?,
            stock_qnt: self.orig_stock_qnt.as_deref()?.trim().parse().ok()?,
        })
    }
}

impl SubmittedTable {
    /// Rebuild rows from ordered form pairs.
    ///
    /// Each `part_number` field starts a new row; the following
    /// `description`, `category` and `stock_qnt` fields and their `orig_`
    /// counterparts belong to it. Rows with a blank part number are dropped.
    /// A repeated part number replaces the earlier row.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut table = Self::default();
        let mut current: Option<PendingRow> = None;

        for (key, value) in pairs {
            if key == "sort" {
                table.sort = Some(value);
                continue;
            }
            if key == "order" {
                table.order = Some(value);
                continue;
            }
            if key == "part_number" {
                if let Some(done) = current.take() {
                    table.push(done);
                }
                current = Some(PendingRow {
                    part_number: value,
                    ..PendingRow::default()
                });
                continue;
            }

            let Some(row) = current.as_mut() else {
                continue;
            };
            match key.as_str() {
                "description" => row.edited.description = value,
                "category" => row.edited.category = value,
                "stock_qnt" => row.edited.stock_qnt = value,
                "orig_description" => row.orig_description = Some(value),
                "orig_category" => row.orig_category = Some(value),
                "orig_stock_qnt" => row.orig_stock_qnt = Some(value),
                _ => {}
            }
        }
        if let Some(done) = current {
            table.push(done);
        }

        table
    }

    fn push(&mut self, pending: PendingRow) {
        let Ok(part_number) = PartNumber::parse(&pending.part_number) else {
            return;
        };

        match pending.rendered() {
            Some(before) => {
                self.original.insert(part_number.clone(), before);
            }
            None => {
                self.original.remove(&part_number);
            }
        }

        if let Some(existing) = self.rows.iter_mut().find(|(pn, _)| *pn == part_number) {
            existing.1 = pending.edited;
        } else {
            self.rows.push((part_number, pending.edited));
        }
    }
}

/// POST /inventory/manage
#[instrument(skip_all, fields(user = %user.email()))]
async fn save(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<ManageTemplate, AppError> {
    let table = SubmittedTable::from_pairs(pairs);
    let sorting = Sorting::parse(table.sort.as_deref(), table.order.as_deref())?;

    let report = save_changes(state.store(), &user, &table.original, &table.rows).await;
    tracing::info!(
        changes = report.updates.len(),
        applied = report.applied(),
        "Inventory save finished"
    );

    Ok(render_manage(&state, &user, sorting, report.notices()).await)
}
