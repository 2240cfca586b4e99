//! Home page: key stats and the inventory snapshot.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, routing::get};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::set_sentry_user;
use crate::middleware::{RequireAuth, take_notices};
use crate::models::{Notice, Part};
use crate::routes::UserView;
use crate::services::{InventoryMetrics, format_money};
use crate::state::AppState;

/// Snapshot row with derived columns.
#[derive(Debug, Clone)]
pub struct SnapshotRow {
    pub part_number: String,
    pub description: String,
    pub category: String,
    pub material: String,
    pub stock_qnt: i32,
    pub price: String,
    pub stock_value: String,
    pub status: &'static str,
    pub low_stock: bool,
}

impl From<&Part> for SnapshotRow {
    fn from(part: &Part) -> Self {
        let low_stock = part.is_low_stock();
        Self {
            part_number: part.part_number.to_string(),
            description: part.description.clone(),
            category: part.category.clone(),
            material: part.material.clone(),
            stock_qnt: part.stock_qnt,
            price: format_money(part.price),
            stock_value: part
                .stock_value()
                .map_or_else(|| "out of range".to_string(), format_money),
            status: if low_stock { "Low Stock" } else { "In Stock" },
            low_stock,
        }
    }
}

/// Metrics formatted for display.
#[derive(Debug, Clone)]
pub struct MetricsView {
    pub total_items: usize,
    pub total_value: String,
    pub low_stock_count: usize,
}

impl From<InventoryMetrics> for MetricsView {
    fn from(metrics: InventoryMetrics) -> Self {
        Self {
            total_items: metrics.total_items,
            total_value: format_money(metrics.total_value),
            low_stock_count: metrics.low_stock_count,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub user: Option<UserView>,
    pub current_path: String,
    pub notices: Vec<Notice>,
    pub metrics: MetricsView,
    pub rows: Vec<SnapshotRow>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(home))
}

/// GET /
#[instrument(skip_all, fields(user = %user.email()))]
async fn home(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
) -> HomeTemplate {
    set_sentry_user(user.email().as_str());
    let mut notices = take_notices(&session).await;

    let parts = match state.store().list_parts().await {
        Ok(parts) => parts,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load parts");
            notices.push(Notice::error(format!("Failed to load parts: {e}")));
            Vec::new()
        }
    };

    let metrics = InventoryMetrics::compute(&parts);
    if metrics.value_overflowed {
        tracing::warn!("Total stock value overflowed");
        notices.push(Notice::warning(
            "Total stock value is too large to compute; showing the maximum.",
        ));
    }

    HomeTemplate {
        user: Some(UserView::from(&user)),
        current_path: "/".to_string(),
        notices,
        metrics: metrics.into(),
        rows: parts.iter().map(SnapshotRow::from).collect(),
    }
}
