//! Part status.

use serde::{Deserialize, Serialize};

/// Error returned when a status string is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid part status: {0} (expected Active or Inactive)")]
pub struct PartStatusError(pub String);

/// Whether a part is currently stocked.
///
/// Stored as the literal text `Active` / `Inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PartStatus {
    #[default]
    Active,
    Inactive,
}

impl PartStatus {
    /// All statuses, in the order they are offered on the add-part form.
    pub const ALL: [Self; 2] = [Self::Active, Self::Inactive];

    /// The stored/display label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

impl std::fmt::Display for PartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PartStatus {
    type Err = PartStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Active" | "active" => Ok(Self::Active),
            "Inactive" | "inactive" => Ok(Self::Inactive),
            other => Err(PartStatusError(other.to_owned())),
        }
    }
}

#[cfg(feature = "postgres")]
pg_text!(PartStatus, |raw| Ok(raw.parse::<PartStatus>()?));

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        assert_eq!("Active".parse::<PartStatus>().unwrap(), PartStatus::Active);
        assert_eq!("inactive".parse::<PartStatus>().unwrap(), PartStatus::Inactive);
        assert!("Retired".parse::<PartStatus>().is_err());
    }

    #[test]
    fn test_default_is_active() {
        assert_eq!(PartStatus::default(), PartStatus::Active);
        assert_eq!(PartStatus::default().to_string(), "Active");
    }
}
