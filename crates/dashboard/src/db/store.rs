//! The inventory store seam.
//!
//! Services and handlers talk to [`InventoryStore`] rather than to the
//! repositories directly, so tests can run the full request flow against an
//! in-memory store.

use async_trait::async_trait;
use sqlx::PgPool;

use chronify_core::{Email, PartNumber};

use super::{PartRepository, RepositoryError, StockHistoryRepository, UserProfileRepository};
use crate::models::{FieldUpdate, NewPart, NewStockHistoryEntry, Part, StockHistoryEntry, UserProfile};

/// Persistence operations the dashboard needs.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Round-trip to the backing store (readiness probe).
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// All parts, ordered by part number.
    async fn list_parts(&self) -> Result<Vec<Part>, RepositoryError>;

    /// Whether a part with this number exists.
    async fn part_exists(&self, part_number: &PartNumber) -> Result<bool, RepositoryError>;

    /// Insert a part. Fails with `Conflict` on a duplicate part number.
    async fn insert_part(&self, part: &NewPart) -> Result<(), RepositoryError>;

    /// Set one column of one part; returns how many rows matched.
    async fn update_part_field(
        &self,
        part_number: &PartNumber,
        update: &FieldUpdate,
    ) -> Result<u64, RepositoryError>;

    /// Append stock history entries as one batch; returns how many were written.
    async fn insert_stock_history(
        &self,
        entries: &[NewStockHistoryEntry],
    ) -> Result<u64, RepositoryError>;

    /// All stock history entries, newest first.
    async fn list_stock_history(&self) -> Result<Vec<StockHistoryEntry>, RepositoryError>;

    async fn find_profile_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserProfile>, RepositoryError>;

    async fn insert_profile(&self, profile: &UserProfile) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed store.
#[derive(Clone)]
pub struct PgInventoryStore {
    pool: PgPool,
}

impl PgInventoryStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_parts(&self) -> Result<Vec<Part>, RepositoryError> {
        PartRepository::new(&self.pool).list().await
    }

    async fn part_exists(&self, part_number: &PartNumber) -> Result<bool, RepositoryError> {
        PartRepository::new(&self.pool).exists(part_number).await
    }

    async fn insert_part(&self, part: &NewPart) -> Result<(), RepositoryError> {
        PartRepository::new(&self.pool).insert(part).await
    }

    async fn update_part_field(
        &self,
        part_number: &PartNumber,
        update: &FieldUpdate,
    ) -> Result<u64, RepositoryError> {
        PartRepository::new(&self.pool)
            .update_field(part_number, update)
            .await
    }

    async fn insert_stock_history(
        &self,
        entries: &[NewStockHistoryEntry],
    ) -> Result<u64, RepositoryError> {
        StockHistoryRepository::new(&self.pool)
            .insert_batch(entries)
            .await
    }

    async fn list_stock_history(&self) -> Result<Vec<StockHistoryEntry>, RepositoryError> {
        StockHistoryRepository::new(&self.pool)
            .list_recent_first()
            .await
    }

    async fn find_profile_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        UserProfileRepository::new(&self.pool)
            .get_by_email(email)
            .await
    }

    async fn insert_profile(&self, profile: &UserProfile) -> Result<(), RepositoryError> {
        UserProfileRepository::new(&self.pool).create(profile).await
    }
}
