//! Database operations for the `stock_history` audit log.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use chronify_core::PartNumber;

use super::RepositoryError;
use crate::models::stock_history::{NewStockHistoryEntry, StockHistoryEntry};

#[derive(Debug, sqlx::FromRow)]
struct StockHistoryRow {
    id: i64,
    part_number: String,
    description: Option<String>,
    category: Option<String>,
    stock_qnt: Option<i32>,
    user: Option<String>,
    timestamp: DateTime<Utc>,
}

impl TryFrom<StockHistoryRow> for StockHistoryEntry {
    type Error = RepositoryError;

    fn try_from(row: StockHistoryRow) -> Result<Self, Self::Error> {
        let part_number = PartNumber::parse(&row.part_number).map_err(|e| {
            RepositoryError::DataCorruption(format!("stock_history row {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            part_number,
            description: row.description.unwrap_or_default(),
            category: row.category.unwrap_or_default(),
            stock_qnt: row.stock_qnt.unwrap_or_default(),
            user: row.user.unwrap_or_default(),
            timestamp: row.timestamp,
        })
    }
}

/// Repository for the append-only stock history log.
pub struct StockHistoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StockHistoryRepository<'a> {
    /// Create a new stock history repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a batch of entries in one statement.
    ///
    /// An empty batch is a no-op and returns 0.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails. No entry of the
    /// batch is written in that case.
    pub async fn insert_batch(
        &self,
        entries: &[NewStockHistoryEntry],
    ) -> Result<u64, RepositoryError> {
        if entries.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            r#"INSERT INTO stock_history (part_number, description, category, stock_qnt, "user", "timestamp") "#,
        );
        builder.push_values(entries, |mut row, entry| {
            row.push_bind(&entry.part_number)
                .push_bind(&entry.description)
                .push_bind(&entry.category)
                .push_bind(entry.stock_qnt)
                .push_bind(&entry.user)
                .push_bind(entry.timestamp);
        });

        let result = builder.build().execute(self.pool).await?;

        Ok(result.rows_affected())
    }

    /// List all entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_recent_first(&self) -> Result<Vec<StockHistoryEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, StockHistoryRow>(
            r#"
            SELECT id, part_number, description, category, stock_qnt, "user", "timestamp"
            FROM stock_history
            ORDER BY "timestamp" DESC, id DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(StockHistoryEntry::try_from).collect()
    }
}
