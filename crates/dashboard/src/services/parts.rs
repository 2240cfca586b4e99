//! Adding parts to the inventory.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use tracing::instrument;

use chronify_core::{PartNumber, PartStatus};

use crate::db::{InventoryStore, RepositoryError};
use crate::models::{CurrentUser, NewPart};

/// Errors from [`add_part`].
#[derive(Debug, Error)]
pub enum AddPartError {
    /// The part number is already taken.
    #[error("Part number already exists.")]
    Duplicate,

    /// `sheet_price * multiplier` does not fit in a decimal.
    #[error("Sheet price times multiplier is too large.")]
    PriceOutOfRange,

    #[error("Failed to add part: {0}")]
    Repository(#[from] RepositoryError),
}

/// Validated add-part form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPartInput {
    pub part_number: PartNumber,
    pub description: String,
    pub category: String,
    pub material: String,
    pub thickness: Decimal,
    pub qty_per_sheet: Decimal,
    pub stock_qnt: i32,
    pub sheet_price: Decimal,
    pub multiplier: Decimal,
    pub status: PartStatus,
}

/// Unit price: `sheet_price * multiplier` rounded to cents, halves away from zero.
///
/// Returns `None` when the product overflows.
#[must_use]
pub fn compute_price(sheet_price: Decimal, multiplier: Decimal) -> Option<Decimal> {
    sheet_price
        .checked_mul(multiplier)
        .map(|price| price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Insert a new part owned by `user`.
///
/// # Errors
///
/// Returns `AddPartError::PriceOutOfRange` if the price overflows,
/// `AddPartError::Duplicate` if the part number exists (checked first, and
/// again via the store's unique constraint), or `AddPartError::Repository`
/// if the store fails.
#[instrument(skip_all, fields(part_number = %input.part_number, user = %user.email()))]
pub async fn add_part(
    store: &dyn InventoryStore,
    user: &CurrentUser,
    input: AddPartInput,
) -> Result<NewPart, AddPartError> {
    let price = compute_price(input.sheet_price, input.multiplier)
        .ok_or(AddPartError::PriceOutOfRange)?;

    if store.part_exists(&input.part_number).await? {
        tracing::info!("Rejected duplicate part number");
        return Err(AddPartError::Duplicate);
    }

    let part = NewPart {
        price,
        part_number: input.part_number,
        description: input.description,
        category: input.category,
        material: input.material,
        thickness: input.thickness,
        qty_per_sheet: input.qty_per_sheet,
        stock_qnt: input.stock_qnt,
        sheet_price: input.sheet_price,
        multiplier: input.multiplier,
        status: input.status,
        user: user.email().clone(),
    };

    match store.insert_part(&part).await {
        Ok(()) => {
            tracing::info!(price = %part.price, "Part added");
            Ok(part)
        }
        Err(RepositoryError::Conflict(_)) => Err(AddPartError::Duplicate),
        Err(e) => Err(e.into()),
    }
}
