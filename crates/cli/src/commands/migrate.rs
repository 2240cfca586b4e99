//! Database migrations.
//!
//! Migration files live in `crates/dashboard/migrations/` and are embedded
//! at compile time.

use super::{CommandError, connect};

/// Apply all pending migrations.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../dashboard/migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
