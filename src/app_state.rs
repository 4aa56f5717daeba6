//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use chrono::Duration;

use crate::auth::TokenAuthenticator;
use crate::bus::GroupBus;
use crate::config::GatewayConfig;
use crate::directory::{DisplayDirectory, MemoryDisplayDirectory, RedisDisplayDirectory};
use crate::domain::{Clock, SystemClock};
use crate::error::GatewayError;
use crate::liveness::{HeartbeatStore, LivenessTracker, MemoryHeartbeatStore, RedisHeartbeatStore};
use crate::protocol::NtpResponder;
use crate::service::FleetService;
use crate::session::SessionContext;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Fleet service for reloads and status.
    pub fleet: Arc<FleetService>,
    /// Collaborators for new sessions.
    pub sessions: SessionContext,
    /// Known displays.
    pub directory: Arc<dyn DisplayDirectory>,
    /// Whether display connections under unknown slugs are registered.
    pub auto_register_displays: bool,
    /// Bearer token resolution.
    pub authenticator: Arc<TokenAuthenticator>,
}

impl AppState {
    /// Wires the state from its parts.
    #[must_use]
    pub fn new(
        bus: GroupBus,
        store: Arc<dyn HeartbeatStore>,
        directory: Arc<dyn DisplayDirectory>,
        clock: Arc<dyn Clock>,
        config: &GatewayConfig,
    ) -> Self {
        let liveness = LivenessTracker::new(
            store,
            Arc::clone(&clock),
            Duration::seconds(config.heartbeat_window_secs),
        );
        let fleet = Arc::new(FleetService::new(
            bus.clone(),
            liveness.clone(),
            Arc::clone(&directory),
            config.reload_delay_threshold,
        ));
        let sessions = SessionContext::new(bus, liveness, NtpResponder::new(clock));
        let authenticator = Arc::new(TokenAuthenticator::new(
            config.admin_tokens.clone(),
            config.user_tokens.clone(),
        ));
        Self {
            fleet,
            sessions,
            directory,
            auto_register_displays: config.auto_register_displays,
            authenticator,
        }
    }

    /// Builds the state for `config`: bus, heartbeat store and directory
    /// are Redis-backed when `redis_url` is set, in-process otherwise.
    /// Pre-registers `known_displays`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if Redis is configured but unreachable.
    pub async fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let (bus, store, directory): (GroupBus, Arc<dyn HeartbeatStore>, Arc<dyn DisplayDirectory>) =
            match &config.redis_url {
                Some(url) => (
                    GroupBus::connect_redis(url, config.session_mailbox_capacity).await?,
                    Arc::new(RedisHeartbeatStore::connect(url).await?),
                    Arc::new(RedisDisplayDirectory::connect(url).await?),
                ),
                None => (
                    GroupBus::in_process(config.session_mailbox_capacity),
                    Arc::new(MemoryHeartbeatStore::new()),
                    Arc::new(MemoryDisplayDirectory::new()),
                ),
            };
        let state = Self::new(bus, store, directory, Arc::new(SystemClock), config);
        for slug in &config.known_displays {
            state.directory.register(slug).await?;
        }
        Ok(state)
    }
}
