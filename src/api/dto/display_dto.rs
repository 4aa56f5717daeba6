//! Display status and fleet command DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{DisplayId, DisplaySlug};
use crate::service::{DisplayStatus, ReloadOutcome};

/// Liveness of one display.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DisplayStatusDto {
    /// Display slug.
    pub slug: DisplaySlug,
    /// Display UUID, assigned on first registration.
    pub uuid: DisplayId,
    /// `true` if the display pinged within the freshness window.
    pub online: bool,
    /// Time of the last heartbeat, if any.
    pub last_seen: Option<DateTime<Utc>>,
}

impl From<DisplayStatus> for DisplayStatusDto {
    fn from(status: DisplayStatus) -> Self {
        Self {
            slug: status.slug,
            uuid: status.id,
            online: status.online,
            last_seen: status.last_seen,
        }
    }
}

/// Response for `GET /displays`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DisplayListResponse {
    /// Every known display, ordered by slug.
    pub data: Vec<DisplayStatusDto>,
    /// Number of known displays.
    pub total: usize,
    /// Number of displays currently online.
    pub online: usize,
}

/// Request body for `POST /displays/reload`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReloadAllRequest {
    /// Ask devices to stagger their reloads. Defaults to `true`.
    #[serde(default = "default_delayed")]
    pub delayed: bool,
}

impl Default for ReloadAllRequest {
    fn default() -> Self {
        Self {
            delayed: default_delayed(),
        }
    }
}

const fn default_delayed() -> bool {
    true
}

/// Request body for `POST /content/changed`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ContentChangedRequest {
    /// Identifier of the changed entity, for logs (e.g. `"playlist:12"`).
    pub entity: String,
    /// Slugs of the displays that reference the entity.
    pub displays: Vec<String>,
}

/// Result of a reload request.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReloadResponse {
    /// Number of display groups the reload was published to.
    pub groups: usize,
    /// Whether devices were asked to stagger the reload.
    pub delayed: bool,
}

impl From<ReloadOutcome> for ReloadResponse {
    fn from(outcome: ReloadOutcome) -> Self {
        Self {
            groups: outcome.groups,
            delayed: outcome.delayed,
        }
    }
}
