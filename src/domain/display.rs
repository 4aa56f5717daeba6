//! Display identity.
//!
//! A display is identified by its [`DisplaySlug`] (routing key) and a
//! [`DisplayId`] (UUID v4, assigned once and never changed).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::DisplaySlug;

/// System-of-record identifier for a display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct DisplayId(uuid::Uuid);

impl DisplayId {
    /// Creates a new random `DisplayId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for DisplayId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A known display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Display {
    /// Unique routing slug.
    pub slug: DisplaySlug,
    /// Immutable UUID assigned on first registration.
    pub id: DisplayId,
    /// When the display was first registered.
    pub registered_at: DateTime<Utc>,
}
