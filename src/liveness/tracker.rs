//! Online/offline inference from last-seen times.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::HeartbeatStore;
use crate::domain::{Clock, DisplaySlug};
use crate::error::GatewayError;

/// Default freshness window in seconds.
pub const DEFAULT_WINDOW_SECS: i64 = 60;

/// Liveness of one display at the time of the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Liveness {
    /// Whether the last heartbeat is inside the freshness window.
    pub online: bool,
    /// Time of the last heartbeat, if one was ever recorded.
    pub last_seen: Option<DateTime<Utc>>,
}

/// Answers "is display X online" from its last heartbeat.
///
/// A display is online iff a heartbeat exists and `now - last_seen` is
/// strictly less than the window. No heartbeat means offline.
#[derive(Debug, Clone)]
pub struct LivenessTracker {
    store: Arc<dyn HeartbeatStore>,
    clock: Arc<dyn Clock>,
    window: Duration,
}

impl LivenessTracker {
    /// Creates a tracker over `store`, reading time from `clock`.
    #[must_use]
    pub fn new(store: Arc<dyn HeartbeatStore>, clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self {
            store,
            clock,
            window,
        }
    }

    /// Stores `at` as the last heartbeat of `slug`, replacing any earlier
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::HeartbeatStore`] if the store write fails.
    pub async fn record_heartbeat(&self, slug: &DisplaySlug, at: DateTime<Utc>) -> Result<(), GatewayError> {
        self.store.put(slug, at).await
    }

    /// Records a heartbeat for `slug` at the current time.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::HeartbeatStore`] if the store write fails.
    pub async fn touch(&self, slug: &DisplaySlug) -> Result<DateTime<Utc>, GatewayError> {
        let now = self.clock.now();
        self.record_heartbeat(slug, now).await?;
        Ok(now)
    }

    /// Returns `true` if `slug` sent a heartbeat within the window.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::HeartbeatStore`] if the store read fails.
    pub async fn is_online(&self, slug: &DisplaySlug) -> Result<bool, GatewayError> {
        Ok(self.status(slug).await?.online)
    }

    /// Returns the online flag and last-seen time of `slug`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::HeartbeatStore`] if the store read fails.
    pub async fn status(&self, slug: &DisplaySlug) -> Result<Liveness, GatewayError> {
        let last_seen = self.store.get(slug).await?;
        let online = last_seen.is_some_and(|at| is_fresh(at, self.clock.now(), self.window));
        Ok(Liveness { online, last_seen })
    }
}

/// `true` iff `last_seen` is less than `window` before `now`.
#[must_use]
pub fn is_fresh(last_seen: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    now - last_seen < window
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ManualClock;
    use crate::liveness::MemoryHeartbeatStore;

    fn setup() -> (LivenessTracker, Arc<ManualClock>, DisplaySlug) {
        let start = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap_or_default();
        let clock = Arc::new(ManualClock::new(start));
        let tracker = LivenessTracker::new(
            Arc::new(MemoryHeartbeatStore::new()),
            Arc::clone(&clock) as Arc<dyn Clock>,
            Duration::seconds(DEFAULT_WINDOW_SECS),
        );
        let Ok(slug) = DisplaySlug::parse("lobby") else {
            panic!("valid slug");
        };
        (tracker, clock, slug)
    }

    #[tokio::test]
    async fn unknown_display_is_offline() {
        let (tracker, _clock, slug) = setup();
        let Ok(status) = tracker.status(&slug).await else {
            panic!("store read failed");
        };
        assert_eq!(
            status,
            Liveness {
                online: false,
                last_seen: None
            }
        );
    }

    #[tokio::test]
    async fn heartbeat_ages_out_after_window() {
        let (tracker, clock, slug) = setup();
        tokio_test::assert_ok!(tracker.touch(&slug).await);
        assert!(matches!(tracker.is_online(&slug).await, Ok(true)));

        clock.advance(Duration::seconds(59));
        assert!(matches!(tracker.is_online(&slug).await, Ok(true)));

        clock.advance(Duration::seconds(1));
        assert!(matches!(tracker.is_online(&slug).await, Ok(false)));

        clock.advance(Duration::hours(3));
        assert!(matches!(tracker.is_online(&slug).await, Ok(false)));
    }

    #[tokio::test]
    async fn new_heartbeat_brings_display_back() {
        let (tracker, clock, slug) = setup();
        tokio_test::assert_ok!(tracker.touch(&slug).await);
        clock.advance(Duration::minutes(5));
        assert!(matches!(tracker.is_online(&slug).await, Ok(false)));

        tokio_test::assert_ok!(tracker.touch(&slug).await);
        assert!(matches!(tracker.is_online(&slug).await, Ok(true)));
    }

    #[test]
    fn freshness_boundary_is_exclusive() {
        let now = Utc::now();
        let window = Duration::seconds(DEFAULT_WINDOW_SECS);
        assert!(is_fresh(now - Duration::milliseconds(59_999), now, window));
        assert!(!is_fresh(now - window, now, window));
    }
}
