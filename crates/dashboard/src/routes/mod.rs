//! HTTP route handlers for the dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the store)
//!
//! GET  /                       - Home: key stats and inventory snapshot
//!
//! # Inventory
//! GET  /inventory              - Read-only inventory table
//! GET  /inventory/manage       - Editable table (?sort=&order=)
//! POST /inventory/manage       - Save edited cells
//! GET  /history                - Stock change log, newest first
//!
//! # Parts
//! GET  /parts/new              - Add part form
//! POST /parts                  - Create part
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Log in with email and password
//! GET  /auth/signup            - Sign-up page
//! POST /auth/signup            - Create account
//! POST /auth/logout            - Logout
//! ```

use axum::Router;

use crate::models::CurrentUser;
use crate::state::AppState;

pub mod auth;
pub mod health;
pub mod history;
pub mod home;
pub mod inventory;
pub mod parts;

/// Logged-in user as shown in the navigation bar.
#[derive(Debug, Clone)]
pub struct UserView {
    pub email: String,
    pub is_mock: bool,
}

impl From<&CurrentUser> for UserView {
    fn from(user: &CurrentUser) -> Self {
        Self {
            email: user.email().to_string(),
            is_mock: user.is_mock(),
        }
    }
}

/// One `<option>` of a select box.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: &'static str,
    pub selected: bool,
}

impl SelectOption {
    /// Build options from `values`, marking the one equal to `current`.
    pub fn list(values: impl IntoIterator<Item = &'static str>, current: &str) -> Vec<Self> {
        values
            .into_iter()
            .map(|value| Self {
                value,
                selected: value == current,
            })
            .collect()
    }
}

/// Build the page router (health routes excluded).
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(home::router())
        .merge(inventory::router())
        .merge(history::router())
        .merge(parts::router())
        .merge(auth::router())
}
