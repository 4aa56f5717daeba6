//! In-process group membership and fan-out.
//!
//! [`LocalGroups`] maps each group to the mailboxes of the sessions on
//! this instance that joined it. Delivery never blocks: a full mailbox
//! drops the event for that session only, a closed one is pruned.

use std::collections::HashMap;

use dashmap::DashMap;
use tokio::sync::mpsc;

use super::{BusEvent, SessionId};
use crate::domain::GroupName;

/// Group name → subscribed session mailboxes on this instance.
#[derive(Debug, Default)]
pub(crate) struct LocalGroups {
    groups: DashMap<GroupName, HashMap<SessionId, mpsc::Sender<BusEvent>>>,
}

impl LocalGroups {
    /// Adds a mailbox to a group. Re-adding the same session is a no-op.
    pub(crate) fn join(&self, group: &GroupName, id: SessionId, sender: &mpsc::Sender<BusEvent>) {
        self.groups
            .entry(group.clone())
            .or_default()
            .entry(id)
            .or_insert_with(|| sender.clone());
    }

    /// Removes a session from a group, dropping the group once empty.
    pub(crate) fn leave(&self, group: &GroupName, id: SessionId) {
        if let Some(mut members) = self.groups.get_mut(group) {
            members.remove(&id);
        }
        self.groups.remove_if(group, |_, members| members.is_empty());
    }

    /// Delivers `event` to every local member of `group`.
    ///
    /// Returns the number of mailboxes that accepted the event.
    pub(crate) fn deliver(&self, group: &GroupName, event: &BusEvent) -> usize {
        let Some(mut members) = self.groups.get_mut(group) else {
            return 0;
        };
        let mut delivered = 0;
        members.retain(|session_id, sender| match sender.try_send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(%group, %session_id, kind = event.kind(), "session mailbox full, event dropped");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
        delivered
    }

    /// Returns the number of local members of `group`.
    pub(crate) fn member_count(&self, group: &GroupName) -> usize {
        self.groups.get(group).map_or(0, |members| members.len())
    }
}
