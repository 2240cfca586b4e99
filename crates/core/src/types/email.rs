//! Email addresses of dashboard users.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Why a string was not accepted as an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email is longer than {} characters", Email::MAX_LENGTH)]
    TooLong,
    #[error("email cannot contain spaces")]
    ContainsWhitespace,
    /// Not exactly one `@` with text on both sides.
    #[error("'{0}' is not of the form name@domain")]
    Malformed(String),
}

/// An email address identifying a dashboard user.
///
/// The address is what gets recorded as the acting user on parts and stock
/// history rows. Validation is structural only; the auth provider decides
/// whether the address is real.
///
/// ```
/// use chronify_core::Email;
///
/// let email = Email::parse("  clerk@shop.example ").unwrap();
/// assert_eq!(email.as_str(), "clerk@shop.example");
/// assert_eq!(email.local_part(), "clerk");
///
/// assert!(Email::parse("clerk").is_err());
/// assert!(Email::parse("a@b@c").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Parse a form value, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// See [`EmailError`].
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        match s {
            "" => Err(EmailError::Empty),
            _ if s.len() > Self::MAX_LENGTH => Err(EmailError::TooLong),
            _ if s.chars().any(char::is_whitespace) => Err(EmailError::ContainsWhitespace),
            _ => match s.split_once('@') {
                Some((local, domain))
                    if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
                {
                    Ok(Self(s.to_owned()))
                }
                _ => Err(EmailError::Malformed(s.to_owned())),
            },
        }
    }

    /// Wrap an address that was validated elsewhere (database rows,
    /// identities returned by the auth provider, constants).
    #[must_use]
    pub fn new_unchecked(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything before the `@`.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split_once('@').map_or(self.0.as_str(), |(local, _)| local)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "postgres")]
pg_text!(Email, |raw| Ok(Email(raw)));
