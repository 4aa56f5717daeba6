//! Heartbeat storage.
//!
//! A heartbeat store is a plain key-value map from display slug to the
//! UTC time of its last ping. Writes overwrite; nothing expires. Whether a
//! display is online is decided by [`super::LivenessTracker`] from the
//! stored time alone.

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

use crate::domain::DisplaySlug;
use crate::error::GatewayError;

/// Key under which a display's last heartbeat is stored.
#[must_use]
pub fn heartbeat_key(slug: &DisplaySlug) -> String {
    format!("{slug}-heartbeat")
}

/// Last-seen storage shared by all sessions.
#[async_trait]
pub trait HeartbeatStore: Debug + Send + Sync {
    /// Overwrites the last-seen time of `slug`.
    async fn put(&self, slug: &DisplaySlug, at: DateTime<Utc>) -> Result<(), GatewayError>;

    /// Returns the last-seen time of `slug`, if any.
    async fn get(&self, slug: &DisplaySlug) -> Result<Option<DateTime<Utc>>, GatewayError>;
}

/// Heartbeats held in this process only.
#[derive(Debug, Default)]
pub struct MemoryHeartbeatStore {
    entries: DashMap<String, DateTime<Utc>>,
}

impl MemoryHeartbeatStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HeartbeatStore for MemoryHeartbeatStore {
    async fn put(&self, slug: &DisplaySlug, at: DateTime<Utc>) -> Result<(), GatewayError> {
        self.entries.insert(heartbeat_key(slug), at);
        Ok(())
    }

    async fn get(&self, slug: &DisplaySlug) -> Result<Option<DateTime<Utc>>, GatewayError> {
        Ok(self.entries.get(&heartbeat_key(slug)).map(|entry| *entry))
    }
}

/// Heartbeats in Redis, shared by every gateway instance.
///
/// Values are RFC 3339 strings written without a TTL.
#[derive(Debug, Clone)]
pub struct RedisHeartbeatStore {
    conn: MultiplexedConnection,
}

impl RedisHeartbeatStore {
    /// Connects to the Redis instance at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::HeartbeatStore`] if Redis cannot be reached.
    pub async fn connect(url: &str) -> Result<Self, GatewayError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl HeartbeatStore for RedisHeartbeatStore {
    async fn put(&self, slug: &DisplaySlug, at: DateTime<Utc>) -> Result<(), GatewayError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(heartbeat_key(slug), at.to_rfc3339()).await?;
        Ok(())
    }

    async fn get(&self, slug: &DisplaySlug) -> Result<Option<DateTime<Utc>>, GatewayError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(heartbeat_key(slug)).await?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(at) => Ok(Some(at.with_timezone(&Utc))),
            Err(e) => {
                tracing::warn!(%slug, value = %raw, error = %e, "unreadable heartbeat treated as absent");
                Ok(None)
            }
        }
    }
}
