//! URL-safe display slug.
//!
//! [`DisplaySlug`] is the stable, human-chosen identifier of a display. It
//! appears in connection paths, names the display's bus groups, and keys
//! the heartbeat store, so it is validated once at the edge and carried as
//! a newtype from there on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::GatewayError;

/// Maximum slug length, matching the content database column.
pub const MAX_SLUG_LEN: usize = 50;

/// Validated display slug: non-empty, at most [`MAX_SLUG_LEN`] bytes of
/// ASCII letters, digits, `-` or `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "lobby-north")]
pub struct DisplaySlug(String);

impl DisplaySlug {
    /// Validates `raw` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidSlug`] if `raw` is empty, too long, or
    /// contains characters outside `[A-Za-z0-9_-]`.
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        if raw.is_empty() || raw.len() > MAX_SLUG_LEN {
            return Err(GatewayError::InvalidSlug(raw.to_string()));
        }
        if !raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(GatewayError::InvalidSlug(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplaySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DisplaySlug {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DisplaySlug {
    type Error = GatewayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DisplaySlug> for String {
    fn from(slug: DisplaySlug) -> Self {
        slug.0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn accepts_url_safe_slugs() {
        for raw in ["lobby", "hall-2", "room_B", "x"] {
            assert!(DisplaySlug::parse(raw).is_ok(), "{raw} should be valid");
        }
    }

    #[test]
    fn rejects_unsafe_slugs() {
        for raw in ["", "with space", "slash/slug", "ümlaut", "dot.slug"] {
            assert!(DisplaySlug::parse(raw).is_err(), "{raw} should be invalid");
        }
        let long = "a".repeat(MAX_SLUG_LEN + 1);
        assert!(DisplaySlug::parse(&long).is_err());
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<DisplaySlug, _> = serde_json::from_str("\"foyer\"");
        let Ok(slug) = ok else {
            panic!("expected valid slug");
        };
        assert_eq!(slug.as_str(), "foyer");

        let bad: Result<DisplaySlug, _> = serde_json::from_str("\"no spaces\"");
        assert!(bad.is_err());
    }
}
