//! Group bus: publish/subscribe keyed by group name.
//!
//! [`GroupBus`] delivers a [`BusEvent`] to every session subscribed to a
//! group, on this instance or, with the Redis backend, on any instance
//! sharing the same Redis. It is constructed once at startup and injected
//! into every session and service that needs it.
//!
//! Each session owns a [`Subscriber`] (its membership) and an [`Inbox`]
//! (its receiving end). Dropping the `Subscriber` removes the session from
//! every group it joined, so membership never outlives the connection.
//!
//! Each publish is delivered once to every session subscribed at that
//! moment, and dropped for a session whose mailbox is full. Order is kept
//! per publisher. Nothing is persisted: sessions that are not subscribed
//! at publish time miss the event.

pub mod event;
mod local;
mod redis_backend;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

pub use event::{BusEvent, CommandPayload};
use local::LocalGroups;
use redis_backend::RedisBackend;

use crate::domain::GroupName;
use crate::error::BusError;

/// Process-unique identifier of a bus subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
enum Backend {
    InProcess,
    Redis(RedisBackend),
}

#[derive(Debug)]
struct BusInner {
    local: Arc<LocalGroups>,
    backend: Backend,
    /// Set while the shared backend's listener holds a subscription.
    listener: Option<Arc<AtomicBool>>,
    mailbox_capacity: usize,
}

/// Handle to the group bus. Cheap to clone.
#[derive(Debug, Clone)]
pub struct GroupBus {
    inner: Arc<BusInner>,
}

impl GroupBus {
    /// Creates a bus that only reaches sessions in this process.
    #[must_use]
    pub fn in_process(mailbox_capacity: usize) -> Self {
        Self {
            inner: Arc::new(BusInner {
                local: Arc::new(LocalGroups::default()),
                backend: Backend::InProcess,
                listener: None,
                mailbox_capacity: mailbox_capacity.max(1),
            }),
        }
    }

    /// In-process bus gated on `listener` like a shared one.
    #[cfg(test)]
    pub(crate) fn in_process_with_listener(mailbox_capacity: usize, listener: Arc<AtomicBool>) -> Self {
        Self {
            inner: Arc::new(BusInner {
                local: Arc::new(LocalGroups::default()),
                backend: Backend::InProcess,
                listener: Some(listener),
                mailbox_capacity: mailbox_capacity.max(1),
            }),
        }
    }

    /// Creates a bus shared through Redis pub/sub.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Backend`] if Redis cannot be reached.
    pub async fn connect_redis(url: &str, mailbox_capacity: usize) -> Result<Self, BusError> {
        let local = Arc::new(LocalGroups::default());
        let backend = RedisBackend::connect(url, Arc::clone(&local)).await?;
        let listener = Some(backend.listening());
        Ok(Self {
            inner: Arc::new(BusInner {
                local,
                backend: Backend::Redis(backend),
                listener,
                mailbox_capacity: mailbox_capacity.max(1),
            }),
        })
    }

    /// Returns `true` if the bus is shared with other instances.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        matches!(self.inner.backend, Backend::Redis(_))
    }

    /// Opens a fresh mailbox for one session.
    #[must_use]
    pub fn open_mailbox(&self) -> (Subscriber, Inbox) {
        let (sender, receiver) = mpsc::channel(self.inner.mailbox_capacity);
        let subscriber = Subscriber {
            id: SessionId::new(),
            sender,
            groups: Vec::new(),
            bus: self.clone(),
        };
        (subscriber, Inbox { receiver })
    }

    /// Adds `subscriber` to `group`. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Unavailable`] if the shared backend listener is
    /// down, since the subscription could not receive anything.
    pub async fn subscribe(&self, group: &GroupName, subscriber: &mut Subscriber) -> Result<(), BusError> {
        if let Some(listener) = &self.inner.listener
            && !listener.load(Ordering::SeqCst)
        {
            return Err(BusError::Unavailable);
        }
        self.inner.local.join(group, subscriber.id, &subscriber.sender);
        if !subscriber.groups.contains(group) {
            subscriber.groups.push(group.clone());
        }
        tracing::debug!(%group, session_id = %subscriber.id, "subscribed");
        Ok(())
    }

    /// Publishes `event` to every subscriber of `group`.
    ///
    /// Returns the number of receivers: local mailboxes for the
    /// in-process backend, gateway instances for the Redis backend.
    ///
    /// # Errors
    ///
    /// Returns [`BusError`] if the shared backend rejects the publish.
    pub async fn publish(&self, group: &GroupName, event: &BusEvent) -> Result<usize, BusError> {
        let receivers = match &self.inner.backend {
            Backend::InProcess => self.inner.local.deliver(group, event),
            Backend::Redis(redis) => redis.publish(group, event).await?,
        };
        tracing::debug!(%group, kind = event.kind(), receivers, "published");
        Ok(receivers)
    }

    /// Returns the number of sessions on this instance subscribed to `group`.
    #[must_use]
    pub fn local_member_count(&self, group: &GroupName) -> usize {
        self.inner.local.member_count(group)
    }
}

/// A session's group membership. Leaves every group on drop.
#[derive(Debug)]
pub struct Subscriber {
    id: SessionId,
    sender: mpsc::Sender<BusEvent>,
    groups: Vec<GroupName>,
    bus: GroupBus,
}

impl Subscriber {
    /// Returns the subscriber's session ID.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the groups joined so far.
    #[must_use]
    pub fn groups(&self) -> &[GroupName] {
        &self.groups
    }
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        for group in &self.groups {
            self.bus.inner.local.leave(group, self.id);
        }
    }
}

/// Receiving end of a session's mailbox.
#[derive(Debug)]
pub struct Inbox {
    receiver: mpsc::Receiver<BusEvent>,
}

impl Inbox {
    /// Waits for the next event. `None` once the subscriber is gone.
    pub async fn recv(&mut self) -> Option<BusEvent> {
        self.receiver.recv().await
    }

    /// Returns an already-delivered event without waiting.
    pub fn try_recv(&mut self) -> Option<BusEvent> {
        self.receiver.try_recv().ok()
    }
}
