//! Core types for Chronify.
//!
//! Part numbers, emails and statuses are all stored as `TEXT`; with the
//! `postgres` feature each one binds and decodes through [`pg_text!`].

/// Implement `sqlx` text encoding for a type with an `as_str` method.
///
/// `$decode` turns the column's `String` into the type.
#[cfg(feature = "postgres")]
macro_rules! pg_text {
    ($ty:ty, $decode:expr) => {
        impl sqlx::Type<sqlx::Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let raw = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                let decode: fn(String) -> Result<$ty, sqlx::error::BoxDynError> = $decode;
                decode(raw)
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }
    };
}

pub mod email;
pub mod part_number;
pub mod status;
pub mod stock;

pub use email::{Email, EmailError};
pub use part_number::{PartNumber, PartNumberError};
pub use status::{PartStatus, PartStatusError};
pub use stock::{LOW_STOCK_THRESHOLD, StockInput, is_low_stock};
