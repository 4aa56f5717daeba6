//! Fleet service: reload commands and the liveness read model.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bus::{BusEvent, GroupBus};
use crate::directory::DisplayDirectory;
use crate::domain::{Display, DisplayId, DisplaySlug, GroupName};
use crate::error::GatewayError;
use crate::liveness::LivenessTracker;

/// Online status of one known display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayStatus {
    /// Display slug.
    pub slug: DisplaySlug,
    /// Display UUID.
    pub id: DisplayId,
    /// Whether the display pinged within the freshness window.
    pub online: bool,
    /// Last heartbeat, if any.
    pub last_seen: Option<DateTime<Utc>>,
}

/// Result of a reload request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReloadOutcome {
    /// Number of display groups the reload was published to.
    pub groups: usize,
    /// Whether devices were asked to stagger the reload.
    pub delayed: bool,
}

/// Translates operator and content-change actions into bus commands, and
/// serves the liveness read model.
///
/// Stateless coordinator over the [`GroupBus`], the
/// [`LivenessTracker`] and the [`DisplayDirectory`].
#[derive(Debug, Clone)]
pub struct FleetService {
    bus: GroupBus,
    liveness: LivenessTracker,
    directory: Arc<dyn DisplayDirectory>,
    delay_threshold: usize,
}

impl FleetService {
    /// Creates a new `FleetService`.
    #[must_use]
    pub fn new(
        bus: GroupBus,
        liveness: LivenessTracker,
        directory: Arc<dyn DisplayDirectory>,
        delay_threshold: usize,
    ) -> Self {
        Self {
            bus,
            liveness,
            directory,
            delay_threshold,
        }
    }

    /// Returns a reference to the inner [`DisplayDirectory`].
    #[must_use]
    pub fn directory(&self) -> &Arc<dyn DisplayDirectory> {
        &self.directory
    }

    /// Reloads every connected display through the `displays` group.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Bus`] if the publish fails.
    pub async fn reload_all(&self, delayed: bool) -> Result<ReloadOutcome, GatewayError> {
        let receivers = self
            .bus
            .publish(&GroupName::all_displays(), &BusEvent::reload(delayed))
            .await?;
        tracing::info!(delayed, receivers, "fleet-wide reload published");
        Ok(ReloadOutcome {
            groups: 1,
            delayed,
        })
    }

    /// Reloads a single display immediately.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Bus`] if the publish fails.
    pub async fn reload_display(&self, slug: &DisplaySlug) -> Result<ReloadOutcome, GatewayError> {
        self.publish_reload(slug, false).await?;
        tracing::info!(%slug, "display reload published");
        Ok(ReloadOutcome {
            groups: 1,
            delayed: false,
        })
    }

    /// Reloads every display that references a changed content entity.
    ///
    /// Duplicates are collapsed. When more displays are affected than the
    /// configured threshold, the reload is delayed so devices stagger
    /// their requests against the content backend.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Bus`] on the first failed publish.
    pub async fn content_changed(
        &self,
        entity: &str,
        displays: &[DisplaySlug],
    ) -> Result<ReloadOutcome, GatewayError> {
        let targets: BTreeSet<&DisplaySlug> = displays.iter().collect();
        let delayed = self.should_delay(targets.len());
        for slug in &targets {
            self.publish_reload(slug, delayed).await?;
        }
        tracing::info!(entity, displays = targets.len(), delayed, "content change reload published");
        Ok(ReloadOutcome {
            groups: targets.len(),
            delayed,
        })
    }

    /// Returns `true` if a reload of `affected` displays must be delayed.
    #[must_use]
    pub const fn should_delay(&self, affected: usize) -> bool {
        affected > self.delay_threshold
    }

    /// Returns the status of one known display.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DisplayNotFound`] for unknown slugs, or
    /// a store error if the directory or heartbeat read fails.
    pub async fn display_status(&self, slug: &DisplaySlug) -> Result<DisplayStatus, GatewayError> {
        let display = self.directory.get(slug).await?;
        self.status_of(display).await
    }

    /// Returns the status of every known display, ordered by slug.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DirectoryStore`] or
    /// [`GatewayError::HeartbeatStore`] if a store read fails.
    pub async fn fleet_status(&self) -> Result<Vec<DisplayStatus>, GatewayError> {
        let displays = self.directory.list().await?;
        let mut statuses = Vec::with_capacity(displays.len());
        for display in displays {
            statuses.push(self.status_of(display).await?);
        }
        Ok(statuses)
    }

    async fn status_of(&self, display: Display) -> Result<DisplayStatus, GatewayError> {
        let liveness = self.liveness.status(&display.slug).await?;
        Ok(DisplayStatus {
            slug: display.slug,
            id: display.id,
            online: liveness.online,
            last_seen: liveness.last_seen,
        })
    }

    async fn publish_reload(&self, slug: &DisplaySlug, delayed: bool) -> Result<usize, GatewayError> {
        Ok(self
            .bus
            .publish(&GroupName::display(slug), &BusEvent::reload(delayed))
            .await?)
    }
}
