//! Chronify dashboard library.
//!
//! Internal inventory dashboard: view, add and edit stock records and review
//! the history of stock changes. The binary in `main.rs` wires this library
//! to `PostgreSQL`, the hosted auth provider, sessions and tracing; tests
//! build the same router over in-memory collaborators.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::services::ServeDir;

use crate::error::AppError;
use crate::state::AppState;

/// Directory holding the stylesheet, relative to this crate.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the application router with state applied.
///
/// Session, trace and Sentry layers are added by the caller.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFound(uri.path().to_owned())
}
