//! Database operations for `user_profiles`.

use sqlx::PgPool;
use uuid::Uuid;

use chronify_core::Email;

use super::RepositoryError;
use crate::models::UserProfile;

#[derive(Debug, sqlx::FromRow)]
struct UserProfileRow {
    id: Uuid,
    email: Email,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl From<UserProfileRow> for UserProfile {
    fn from(row: UserProfileRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            first_name: row.first_name.unwrap_or_default(),
            last_name: row.last_name.unwrap_or_default(),
        }
    }
}

/// Repository for user profile operations.
pub struct UserProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserProfileRepository<'a> {
    /// Create a new user profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a profile by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<UserProfile>, RepositoryError> {
        let row = sqlx::query_as::<_, UserProfileRow>(
            "SELECT id, email, first_name, last_name FROM user_profiles WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(UserProfile::from))
    }

    /// Create a profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a profile with the same id or
    /// email exists, `RepositoryError::Database` for other failures.
    pub async fn create(&self, profile: &UserProfile) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO user_profiles (id, email, first_name, last_name) VALUES ($1, $2, $3, $4)",
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .execute(self.pool)
        .await
        .map_err(RepositoryError::from_insert)?;

        Ok(())
    }
}
