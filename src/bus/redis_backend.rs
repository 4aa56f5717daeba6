//! Redis pub/sub backend for multi-instance deployments.
//!
//! Every gateway instance pattern-subscribes to `signage:group:*` and
//! hands each received event to its [`LocalGroups`]. Publishing is a
//! plain `PUBLISH` on `signage:group:<group>`; the publishing instance
//! receives its own events through the same subscription, so local
//! delivery is never done twice.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::StreamExt;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

use super::BusEvent;
use super::local::LocalGroups;
use crate::domain::GroupName;
use crate::error::BusError;

const CHANNEL_PREFIX: &str = "signage:group:";
const CHANNEL_PATTERN: &str = "signage:group:*";
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Publishing half plus the listener's connection flag.
#[derive(Debug, Clone)]
pub(crate) struct RedisBackend {
    conn: MultiplexedConnection,
    listening: Arc<AtomicBool>,
}

impl RedisBackend {
    /// Connects both halves and spawns the listener.
    ///
    /// Fails if either connection cannot be established, so a
    /// misconfigured backend is caught at startup.
    pub(crate) async fn connect(url: &str, local: Arc<LocalGroups>) -> Result<Self, BusError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        let mut pubsub = client.get_async_pubsub().await?;
        pubsub.psubscribe(CHANNEL_PATTERN).await?;

        let listening = Arc::new(AtomicBool::new(true));
        tokio::spawn(listen(client, pubsub, local, Arc::clone(&listening)));
        tracing::info!(pattern = CHANNEL_PATTERN, "redis group bus connected");

        Ok(Self { conn, listening })
    }

    /// Flag set while the listener holds a live subscription.
    pub(crate) fn listening(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.listening)
    }

    /// Publishes `event` to `group`, returning the number of instances
    /// that received it.
    pub(crate) async fn publish(&self, group: &GroupName, event: &BusEvent) -> Result<usize, BusError> {
        let payload = event.encode()?;
        let mut conn = self.conn.clone();
        let receivers: usize = conn.publish(channel_for(group), payload).await?;
        Ok(receivers)
    }
}

fn channel_for(group: &GroupName) -> String {
    format!("{CHANNEL_PREFIX}{group}")
}

/// Forwards backend messages to local subscribers, reconnecting on loss.
async fn listen(
    client: redis::Client,
    pubsub: redis::aio::PubSub,
    local: Arc<LocalGroups>,
    listening: Arc<AtomicBool>,
) {
    let mut pubsub = Some(pubsub);
    loop {
        let current = match pubsub.take() {
            Some(current) => current,
            None => match resubscribe(&client).await {
                Ok(fresh) => fresh,
                Err(e) => {
                    tracing::error!(error = %e, "redis group bus reconnect failed");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                    continue;
                }
            },
        };
        listening.store(true, Ordering::SeqCst);

        let mut messages = current.into_on_message();
        while let Some(msg) = messages.next().await {
            let Some(group) = msg.get_channel_name().strip_prefix(CHANNEL_PREFIX) else {
                continue;
            };
            let group = GroupName::from_wire(group);
            let payload: String = match msg.get_payload() {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!(%group, error = %e, "non-text bus payload dropped");
                    continue;
                }
            };
            match BusEvent::decode(&payload) {
                Ok(event) => {
                    local.deliver(&group, &event);
                }
                Err(e) => tracing::warn!(%group, error = %e, "malformed bus event dropped"),
            }
        }

        listening.store(false, Ordering::SeqCst);
        tracing::error!("redis group bus subscription lost");
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

async fn resubscribe(client: &redis::Client) -> Result<redis::aio::PubSub, BusError> {
    let mut pubsub = client.get_async_pubsub().await?;
    pubsub.psubscribe(CHANNEL_PATTERN).await?;
    tracing::info!(pattern = CHANNEL_PATTERN, "redis group bus resubscribed");
    Ok(pubsub)
}
