//! Database operations for the inventory store.
//!
//! # Tables
//!
//! - `parts` - Stock items keyed by part number
//! - `stock_history` - Append-only log of stock quantity changes
//! - `user_profiles` - Profiles mirroring auth provider identities
//! - `chronify.session` - Session storage (tower-sessions)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/dashboard/migrations/` and run via:
//! ```bash
//! cargo run -p chronify-cli -- migrate
//! ```

pub mod parts;
pub mod stock_history;
pub mod store;
pub mod user_profiles;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use parts::PartRepository;
pub use stock_history::StockHistoryRepository;
pub use store::{InventoryStore, PgInventoryStore};
pub use user_profiles::UserProfileRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., duplicate part number).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique-key violations to [`RepositoryError::Conflict`].
    pub(crate) fn from_insert(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::Conflict(db_err.message().to_owned())
            }
            _ => Self::Database(err),
        }
    }
}

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
