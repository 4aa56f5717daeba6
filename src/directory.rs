//! Directory of known displays.
//!
//! The directory is the set of displays the liveness read model reports
//! on. Registration is idempotent: the first registration of a slug assigns
//! its UUID, later registrations return the stored entry unchanged. With
//! several gateway instances the directory must be shared, like the
//! heartbeat store, or instances would hand out different UUIDs for the
//! same slug.

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::{Display, DisplayId, DisplaySlug};
use crate::error::GatewayError;

/// Redis hash holding `slug -> {id, registered_at}`.
pub const DIRECTORY_KEY: &str = "signage:displays";

/// Known-display storage shared by the sessions and the fleet service.
#[async_trait]
pub trait DisplayDirectory: Debug + Send + Sync {
    /// Registers `slug` if unknown and returns its entry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DirectoryStore`] if the backend fails.
    async fn register(&self, slug: &DisplaySlug) -> Result<Display, GatewayError>;

    /// Looks up a display by slug.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DisplayNotFound`] if the slug is unknown.
    async fn get(&self, slug: &DisplaySlug) -> Result<Display, GatewayError>;

    /// Returns all known displays ordered by slug.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DirectoryStore`] if the backend fails.
    async fn list(&self) -> Result<Vec<Display>, GatewayError>;
}

/// Directory held in this process only.
#[derive(Debug, Default)]
pub struct MemoryDisplayDirectory {
    displays: RwLock<HashMap<DisplaySlug, Display>>,
}

impl MemoryDisplayDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DisplayDirectory for MemoryDisplayDirectory {
    async fn register(&self, slug: &DisplaySlug) -> Result<Display, GatewayError> {
        if let Some(existing) = self.displays.read().await.get(slug) {
            return Ok(existing.clone());
        }
        let mut map = self.displays.write().await;
        let display = map
            .entry(slug.clone())
            .or_insert_with(|| {
                tracing::info!(%slug, "display registered");
                Display {
                    slug: slug.clone(),
                    id: DisplayId::new(),
                    registered_at: Utc::now(),
                }
            })
            .clone();
        Ok(display)
    }

    async fn get(&self, slug: &DisplaySlug) -> Result<Display, GatewayError> {
        self.displays
            .read()
            .await
            .get(slug)
            .cloned()
            .ok_or_else(|| GatewayError::DisplayNotFound(slug.to_string()))
    }

    async fn list(&self) -> Result<Vec<Display>, GatewayError> {
        let map = self.displays.read().await;
        let mut displays: Vec<Display> = map.values().cloned().collect();
        displays.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(displays)
    }
}

/// Stored value of one directory entry; the slug is the hash field.
#[derive(Debug, Serialize, Deserialize)]
struct StoredDisplay {
    id: DisplayId,
    registered_at: DateTime<Utc>,
}

fn encode_entry(display: &Display) -> Result<String, GatewayError> {
    serde_json::to_string(&StoredDisplay {
        id: display.id,
        registered_at: display.registered_at,
    })
    .map_err(|e| GatewayError::Internal(e.to_string()))
}

fn decode_entry(slug: DisplaySlug, raw: &str) -> Result<Display, GatewayError> {
    let stored: StoredDisplay = serde_json::from_str(raw)
        .map_err(|e| GatewayError::DirectoryStore(format!("unreadable entry for {slug}: {e}")))?;
    Ok(Display {
        slug,
        id: stored.id,
        registered_at: stored.registered_at,
    })
}

fn store_error(err: redis::RedisError) -> GatewayError {
    GatewayError::DirectoryStore(err.to_string())
}

/// Directory in a Redis hash, shared by every gateway instance.
///
/// `HSETNX` makes the first instance to register a slug the one whose UUID
/// sticks.
#[derive(Debug, Clone)]
pub struct RedisDisplayDirectory {
    conn: MultiplexedConnection,
}

impl RedisDisplayDirectory {
    /// Connects to the Redis instance at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DirectoryStore`] if Redis cannot be reached.
    pub async fn connect(url: &str) -> Result<Self, GatewayError> {
        let client = redis::Client::open(url).map_err(store_error)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(store_error)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl DisplayDirectory for RedisDisplayDirectory {
    async fn register(&self, slug: &DisplaySlug) -> Result<Display, GatewayError> {
        let candidate = Display {
            slug: slug.clone(),
            id: DisplayId::new(),
            registered_at: Utc::now(),
        };
        let mut conn = self.conn.clone();
        let created: bool = conn
            .hset_nx(DIRECTORY_KEY, slug.as_str(), encode_entry(&candidate)?)
            .await
            .map_err(store_error)?;
        if created {
            tracing::info!(%slug, "display registered");
            return Ok(candidate);
        }
        self.get(slug).await
    }

    async fn get(&self, slug: &DisplaySlug) -> Result<Display, GatewayError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .hget(DIRECTORY_KEY, slug.as_str())
            .await
            .map_err(store_error)?;
        let Some(raw) = raw else {
            return Err(GatewayError::DisplayNotFound(slug.to_string()));
        };
        decode_entry(slug.clone(), &raw)
    }

    async fn list(&self) -> Result<Vec<Display>, GatewayError> {
        let mut conn = self.conn.clone();
        let entries: HashMap<String, String> =
            conn.hgetall(DIRECTORY_KEY).await.map_err(store_error)?;
        let mut displays = Vec::with_capacity(entries.len());
        for (field, raw) in entries {
            let parsed = DisplaySlug::parse(&field).and_then(|slug| decode_entry(slug, &raw));
            match parsed {
                Ok(display) => displays.push(display),
                Err(e) => tracing::warn!(field = %field, error = %e, "directory entry skipped"),
            }
        }
        displays.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(displays)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn slug(raw: &str) -> DisplaySlug {
        let Ok(slug) = DisplaySlug::parse(raw) else {
            panic!("valid slug");
        };
        slug
    }

    #[tokio::test]
    async fn register_is_idempotent_and_keeps_uuid() {
        let dir = MemoryDisplayDirectory::new();
        let Ok(first) = dir.register(&slug("lobby")).await else {
            panic!("register failed");
        };
        let Ok(second) = dir.register(&slug("lobby")).await else {
            panic!("register failed");
        };
        assert_eq!(first.id, second.id);
        assert!(matches!(dir.list().await, Ok(list) if list.len() == 1));
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let dir = MemoryDisplayDirectory::new();
        let result = dir.get(&slug("ghost")).await;
        assert!(matches!(result, Err(GatewayError::DisplayNotFound(_))));
    }

    #[tokio::test]
    async fn list_is_sorted_by_slug() {
        let dir = MemoryDisplayDirectory::new();
        tokio_test::assert_ok!(dir.register(&slug("zeta")).await);
        tokio_test::assert_ok!(dir.register(&slug("alpha")).await);
        let Ok(displays) = dir.list().await else {
            panic!("list failed");
        };
        let slugs: Vec<String> = displays.into_iter().map(|d| d.slug.to_string()).collect();
        assert_eq!(slugs, vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[tokio::test]
    async fn shared_directory_gives_one_uuid_to_all_holders() {
        let shared: Arc<dyn DisplayDirectory> = Arc::new(MemoryDisplayDirectory::new());
        let instance_a = Arc::clone(&shared);
        let instance_b = Arc::clone(&shared);
        let Ok(a) = instance_a.register(&slug("lobby")).await else {
            panic!("register failed");
        };
        let Ok(b) = instance_b.register(&slug("lobby")).await else {
            panic!("register failed");
        };
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn stored_entry_keeps_id_and_registration_time() {
        let display = Display {
            slug: slug("lobby"),
            id: DisplayId::new(),
            registered_at: Utc::now(),
        };
        let Ok(raw) = encode_entry(&display) else {
            panic!("encode failed");
        };
        assert!(!raw.contains("lobby"));
        let Ok(decoded) = decode_entry(slug("lobby"), &raw) else {
            panic!("decode failed");
        };
        assert_eq!(decoded, display);
    }

    #[test]
    fn unreadable_entry_is_a_store_error() {
        let result = decode_entry(slug("lobby"), "not json");
        assert!(matches!(result, Err(GatewayError::DirectoryStore(_))));
    }

    /// Two connections to the same Redis stand in for two gateway
    /// instances. Skipped when no Redis is reachable.
    #[tokio::test]
    async fn redis_instances_agree_on_uuid() {
        let url = std::env::var("SIGNAGE_TEST_REDIS_URL")
            .unwrap_or_else(|_| "redis://127.0.0.1:6379/".to_string());
        let (Ok(instance_a), Ok(instance_b)) = (
            RedisDisplayDirectory::connect(&url).await,
            RedisDisplayDirectory::connect(&url).await,
        ) else {
            eprintln!("skip: redis not available");
            return;
        };
        let fresh_slug = slug(&format!("test-{}", uuid::Uuid::new_v4().simple()));
        let Ok(a) = instance_a.register(&fresh_slug).await else {
            panic!("register on first instance failed");
        };
        let Ok(b) = instance_b.register(&fresh_slug).await else {
            panic!("register on second instance failed");
        };
        assert_eq!(a.id, b.id);
        let Ok(listed) = instance_b.get(&fresh_slug).await else {
            panic!("get failed");
        };
        assert_eq!(listed.id, a.id);

        let mut conn = instance_a.conn.clone();
        let _: Result<(), _> = conn.hdel(DIRECTORY_KEY, fresh_slug.as_str()).await;
    }
}
