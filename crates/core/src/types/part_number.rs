//! Part number type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PartNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PartNumberError {
    /// The input is empty or only whitespace.
    #[error("part number cannot be empty")]
    Empty,
}

/// The unique key of a part in the inventory.
///
/// Part numbers are free-form strings; the only rule is that they are not
/// blank. Surrounding whitespace is trimmed so that `" A-100 "` and `"A-100"`
/// refer to the same part.
///
/// ```
/// use chronify_core::PartNumber;
///
/// let pn = PartNumber::parse(" LB-2040 ").unwrap();
/// assert_eq!(pn.as_str(), "LB-2040");
/// assert!(PartNumber::parse("  ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PartNumber(String);

impl PartNumber {
    /// Parse a part number, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`PartNumberError::Empty`] if nothing remains after trimming.
    pub fn parse(s: &str) -> Result<Self, PartNumberError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PartNumberError::Empty);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the part number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PartNumber {
    type Err = PartNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "postgres")]
pg_text!(PartNumber, |raw| Ok(PartNumber(raw)));
