//! Session-related types for dashboard authentication.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chronify_core::Email;

/// Identity used when development mode bypasses authentication.
pub const DEV_MODE_EMAIL: &str = "test@test.com";

/// The user a request acts on behalf of.
///
/// Stored in the session after login and handed to handlers by the
/// `RequireAuth` extractor. Services only ever need the email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurrentUser {
    /// Identity confirmed by the auth provider.
    Authenticated { id: Uuid, email: Email },
    /// Stand-in identity (development mode or the offline fallback account).
    Mock { email: Email },
}

impl CurrentUser {
    /// The fixed identity used in development mode.
    #[must_use]
    pub fn dev_mode() -> Self {
        Self::Mock {
            email: Email::new_unchecked(DEV_MODE_EMAIL),
        }
    }

    /// The user's email address.
    #[must_use]
    pub const fn email(&self) -> &Email {
        match self {
            Self::Authenticated { email, .. } | Self::Mock { email } => email,
        }
    }

    /// Whether this is a stand-in identity.
    #[must_use]
    pub const fn is_mock(&self) -> bool {
        matches!(self, Self::Mock { .. })
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for notices carried across a redirect.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_mode_identity() {
        let user = CurrentUser::dev_mode();
        assert!(user.is_mock());
        assert_eq!(user.email().as_str(), "test@test.com");
    }

    #[test]
    fn test_session_encoding_is_tagged() {
        let user = CurrentUser::Authenticated {
            id: Uuid::nil(),
            email: Email::parse("a@b.co").unwrap(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["kind"], "authenticated");
        assert_eq!(json["email"], "a@b.co");

        let back: CurrentUser = serde_json::from_value(json).unwrap();
        assert_eq!(back, user);
    }
}
