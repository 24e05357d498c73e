//! Semantic newtype for work unit identifiers.
//!
//! Identifiers are parsed once at the boundary: whitespace is trimmed, then
//! the value must be non-empty, at most [`UnitId::MAX_LEN`] characters, start
//! with an ASCII letter and contain only ASCII alphanumerics, `-` or `_`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const FIELD: &str = "unit id";

fn invalid(value: &str, reason: &'static str) -> Error {
    Error::InvalidId {
        field: FIELD,
        value: value.to_string(),
        reason,
    }
}

fn validate_unit_id(s: &str) -> Result<()> {
    if s.is_empty() {
        return Err(invalid(s, "cannot be empty"));
    }
    if s.chars().count() > UnitId::MAX_LEN {
        return Err(invalid(s, "exceeds 64 characters"));
    }
    if !s.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err(invalid(s, "must start with a letter"));
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(invalid(
            s,
            "may only contain letters, digits, '-' and '_'",
        ));
    }
    Ok(())
}

/// A validated work unit ("agent") identifier.
///
/// # Construction
///
/// ```rust
/// use racelab_core::UnitId;
///
/// let id = UnitId::parse("Researcher")?;
/// assert_eq!(id.as_str(), "Researcher");
/// # Ok::<(), racelab_core::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UnitId(String);

impl UnitId {
    /// Maximum identifier length in characters.
    pub const MAX_LEN: usize = 64;

    /// Parse and validate a unit identifier.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidId` if the identifier is invalid.
    pub fn parse(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        let trimmed = s.trim();
        validate_unit_id(trimmed)?;
        Ok(Self(trimmed.to_string()))
    }

    /// Get the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UnitId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for UnitId {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<UnitId> for String {
    fn from(id: UnitId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UnitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_id_valid() -> Result<()> {
        let id = UnitId::parse("Summarizer-2")?;
        assert_eq!(id.as_str(), "Summarizer-2");
        Ok(())
    }

    #[test]
    fn test_unit_id_trims_whitespace() -> Result<()> {
        let id = UnitId::parse("  Critic\n")?;
        assert_eq!(id.as_str(), "Critic");
        Ok(())
    }

    #[test]
    fn test_unit_id_empty_is_invalid() {
        assert!(matches!(
            UnitId::parse("   "),
            Err(Error::InvalidId {
                reason: "cannot be empty",
                ..
            })
        ));
    }

    #[test]
    fn test_unit_id_must_start_with_letter() {
        assert!(UnitId::parse("1st").is_err());
        assert!(UnitId::parse("_agent").is_err());
    }

    #[test]
    fn test_unit_id_rejects_separators() {
        assert!(UnitId::parse("agent/1").is_err());
        assert!(UnitId::parse("agent 1").is_err());
    }

    #[test]
    fn test_unit_id_too_long() {
        let long = format!("a{}", "b".repeat(UnitId::MAX_LEN));
        assert!(UnitId::parse(long).is_err());
    }

    #[test]
    fn test_unit_id_serde_validates() {
        let ok: std::result::Result<UnitId, _> = serde_json::from_str("\"Writer\"");
        assert!(ok.is_ok());
        let bad: std::result::Result<UnitId, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }
}
