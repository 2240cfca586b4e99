//! Part domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use chronify_core::{Email, PartNumber, PartStatus, is_low_stock};

/// A stock item in the `parts` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// Unique part number.
    pub part_number: PartNumber,
    pub description: String,
    pub category: String,
    pub material: String,
    pub thickness: Decimal,
    /// Pieces cut from one sheet.
    pub qty_per_sheet: Decimal,
    /// Units on hand (never negative).
    pub stock_qnt: i32,
    pub sheet_price: Decimal,
    pub multiplier: Decimal,
    /// Unit price: `sheet_price * multiplier`, rounded to cents at insert time.
    pub price: Decimal,
    pub status: PartStatus,
    /// Email of the user who added the part (blank for imported rows).
    pub user: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Part {
    /// Value of the units on hand: `stock_qnt * price`, or `None` on overflow.
    #[must_use]
    pub fn stock_value(&self) -> Option<Decimal> {
        Decimal::from(self.stock_qnt).checked_mul(self.price)
    }

    /// Whether the part is below the low-stock threshold.
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        is_low_stock(self.stock_qnt)
    }

    /// The columns the inventory management table lets users edit.
    #[must_use]
    pub fn editable_row(&self) -> EditableRow {
        EditableRow {
            description: self.description.clone(),
            category: self.category.clone(),
            stock_qnt: self.stock_qnt,
        }
    }
}

/// Snapshot of a part's editable columns as last read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableRow {
    pub description: String,
    pub category: String,
    pub stock_qnt: i32,
}

/// A part ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewPart {
    pub part_number: PartNumber,
    pub description: String,
    pub category: String,
    pub material: String,
    pub thickness: Decimal,
    pub qty_per_sheet: Decimal,
    pub stock_qnt: i32,
    pub sheet_price: Decimal,
    pub multiplier: Decimal,
    pub price: Decimal,
    pub status: PartStatus,
    /// Acting user recorded as the owner.
    pub user: Email,
}

/// A column of the inventory management table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedColumn {
    Description,
    Category,
    StockQnt,
}

impl TrackedColumn {
    /// All tracked columns, in comparison order.
    pub const ALL: [Self; 3] = [Self::Description, Self::Category, Self::StockQnt];

    /// Column name in the `parts` table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Category => "category",
            Self::StockQnt => "stock_qnt",
        }
    }
}

impl std::fmt::Display for TrackedColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-column update to one part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Description(String),
    Category(String),
    StockQnt(i32),
}

impl FieldUpdate {
    /// The column this update touches.
    #[must_use]
    pub const fn column(&self) -> TrackedColumn {
        match self {
            Self::Description(_) => TrackedColumn::Description,
            Self::Category(_) => TrackedColumn::Category,
            Self::StockQnt(_) => TrackedColumn::StockQnt,
        }
    }
}
