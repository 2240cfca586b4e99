//! User profile model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chronify_core::Email;

/// Profile row mirroring an auth provider identity.
///
/// Created the first time a user logs in successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Same id the auth provider assigned.
    pub id: Uuid,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
}
