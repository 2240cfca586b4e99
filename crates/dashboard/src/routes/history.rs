//! Stock history page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, routing::get};
use tracing::instrument;

use crate::middleware::RequireAuth;
use crate::models::{Notice, StockHistoryEntry};
use crate::routes::UserView;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct HistoryRow {
    pub timestamp: String,
    pub part_number: String,
    pub description: String,
    pub category: String,
    pub stock_qnt: i32,
    pub user: String,
}

impl From<&StockHistoryEntry> for HistoryRow {
    fn from(entry: &StockHistoryEntry) -> Self {
        Self {
            timestamp: entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            part_number: entry.part_number.to_string(),
            description: entry.description.clone(),
            category: entry.category.clone(),
            stock_qnt: entry.stock_qnt,
            user: entry.user.clone(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "history.html")]
pub struct HistoryTemplate {
    pub user: Option<UserView>,
    pub current_path: String,
    pub notices: Vec<Notice>,
    pub rows: Vec<HistoryRow>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/history", get(history))
}

/// GET /history
#[instrument(skip_all, fields(user = %user.email()))]
async fn history(RequireAuth(user): RequireAuth, State(state): State<AppState>) -> HistoryTemplate {
    let mut notices = Vec::new();
    let rows: Vec<HistoryRow> = match state.store().list_stock_history().await {
        Ok(entries) => entries.iter().map(HistoryRow::from).collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load stock history");
            notices.push(Notice::error(format!("Failed to load stock history: {e}")));
            Vec::new()
        }
    };

    if rows.is_empty() && notices.is_empty() {
        notices.push(Notice::info("No stock changes have been logged yet."));
    }

    HistoryTemplate {
        user: Some(UserView::from(&user)),
        current_path: "/history".to_string(),
        notices,
        rows,
    }
}
