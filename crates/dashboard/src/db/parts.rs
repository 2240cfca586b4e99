//! Database operations for the `parts` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use chronify_core::{PartNumber, PartStatus};

use super::RepositoryError;
use crate::models::part::{FieldUpdate, NewPart, Part};

/// Internal row type for part queries.
///
/// Numeric and text columns are nullable in older rows; missing values read
/// as zero or empty.
#[derive(Debug, sqlx::FromRow)]
struct PartRow {
    part_number: String,
    description: Option<String>,
    category: Option<String>,
    material: Option<String>,
    thickness: Option<Decimal>,
    qty_per_sheet: Option<Decimal>,
    stock_qnt: Option<i32>,
    sheet_price: Option<Decimal>,
    multiplier: Option<Decimal>,
    price: Option<Decimal>,
    status: Option<String>,
    user: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PartRow> for Part {
    type Error = RepositoryError;

    fn try_from(row: PartRow) -> Result<Self, Self::Error> {
        let part_number = PartNumber::parse(&row.part_number).map_err(|e| {
            RepositoryError::DataCorruption(format!("parts.part_number {:?}: {e}", row.part_number))
        })?;
        let status = match row.status.as_deref() {
            None | Some("") => PartStatus::default(),
            Some(s) => s.parse().map_err(|e: chronify_core::PartStatusError| {
                RepositoryError::DataCorruption(format!("parts.status for {part_number}: {e}"))
            })?,
        };

        Ok(Self {
            part_number,
            description: row.description.unwrap_or_default(),
            category: row.category.unwrap_or_default(),
            material: row.material.unwrap_or_default(),
            thickness: row.thickness.unwrap_or_default(),
            qty_per_sheet: row.qty_per_sheet.unwrap_or_default(),
            stock_qnt: row.stock_qnt.unwrap_or_default(),
            sheet_price: row.sheet_price.unwrap_or_default(),
            multiplier: row.multiplier.unwrap_or_default(),
            price: row.price.unwrap_or_default(),
            status,
            user: row.user.unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const PART_COLUMNS: &str = r#"
    part_number, description, category, material, thickness, qty_per_sheet,
    stock_qnt, sheet_price, multiplier, price, status, "user",
    created_at, updated_at
"#;

/// Repository for part database operations.
pub struct PartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PartRepository<'a> {
    /// Create a new part repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every part, ordered by part number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a row cannot be decoded.
    pub async fn list(&self) -> Result<Vec<Part>, RepositoryError> {
        let rows = sqlx::query_as::<_, PartRow>(&format!(
            "SELECT {PART_COLUMNS} FROM parts ORDER BY part_number"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Part::try_from).collect()
    }

    /// Check whether a part number is taken.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, part_number: &PartNumber) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM parts WHERE part_number = $1)",
        )
        .bind(part_number)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Insert a new part.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the part number already exists,
    /// `RepositoryError::Database` for other failures.
    pub async fn insert(&self, part: &NewPart) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO parts (
                part_number, description, category, material, thickness,
                qty_per_sheet, stock_qnt, sheet_price, multiplier, price,
                status, "user"
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(&part.part_number)
        .bind(&part.description)
        .bind(&part.category)
        .bind(&part.material)
        .bind(part.thickness)
        .bind(part.qty_per_sheet)
        .bind(part.stock_qnt)
        .bind(part.sheet_price)
        .bind(part.multiplier)
        .bind(part.price)
        .bind(part.status)
        .bind(&part.user)
        .execute(self.pool)
        .await
        .map_err(RepositoryError::from_insert)?;

        Ok(())
    }

    /// Update a single column of one part.
    ///
    /// Returns the number of rows touched (0 when the part number is unknown).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_field(
        &self,
        part_number: &PartNumber,
        update: &FieldUpdate,
    ) -> Result<u64, RepositoryError> {
        let query = match update {
            FieldUpdate::Description(value) => sqlx::query(
                "UPDATE parts SET description = $1, updated_at = NOW() WHERE part_number = $2",
            )
            .bind(value.clone()),
            FieldUpdate::Category(value) => sqlx::query(
                "UPDATE parts SET category = $1, updated_at = NOW() WHERE part_number = $2",
            )
            .bind(value.clone()),
            FieldUpdate::StockQnt(value) => sqlx::query(
                "UPDATE parts SET stock_qnt = $1, updated_at = NOW() WHERE part_number = $2",
            )
            .bind(*value),
        };

        let result = query.bind(part_number).execute(self.pool).await?;

        Ok(result.rows_affected())
    }
}
