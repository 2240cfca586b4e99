//! CLI subcommands.

pub mod migrate;
pub mod report;

use chronify_dashboard::config::{ConfigError, database_url_from_env};
use chronify_dashboard::db;
use sqlx::PgPool;

/// Errors shared by commands that talk to the database.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] db::RepositoryError),
}

/// Connect using the dashboard's pool settings.
async fn connect() -> Result<PgPool, CommandError> {
    let url = database_url_from_env()?;
    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&url).await?)
}
