//! Session of a remote-shell admin client.
//!
//! Only superusers get a session; for anyone else [`ShellSession::connect`]
//! returns `None` and the transport must not complete the handshake.
//!
//! The relay round trip is:
//!
//! ```text
//! admin ──rsMSG──▶ ShellSession ──cmd_data──▶ display_<slug>
//!                                                  │
//! device ◀───────────── DisplaySession ◀───────────┘
//!   │
//!   └──rsRES──▶ DisplaySession ──cmd_data──▶ shell_<slug> ──▶ ShellSession ──▶ admin
//! ```

use async_trait::async_trait;

use super::{Session, SessionContext, SessionState};
use crate::bus::{BusEvent, GroupBus, Inbox, Subscriber};
use crate::domain::{DisplaySlug, GroupName, Principal};
use crate::error::{BusError, ProtocolError, SessionError};
use crate::protocol::{OutboundFrame, ShellInbound};

/// Server-side state of one remote-shell connection.
#[derive(Debug)]
pub struct ShellSession {
    slug: DisplaySlug,
    group: GroupName,
    state: SessionState,
    subscriber: Subscriber,
    bus: GroupBus,
}

impl ShellSession {
    /// Joins the shell groups for `slug` if `principal` is a superuser.
    ///
    /// Returns `Ok(None)` for any other principal, without touching the bus.
    ///
    /// # Errors
    ///
    /// Returns [`BusError`] if the bus cannot take the subscriptions.
    pub async fn connect(
        ctx: &SessionContext,
        slug: DisplaySlug,
        principal: Principal,
    ) -> Result<Option<(Self, Inbox)>, BusError> {
        if !principal.is_superuser() {
            tracing::info!(%slug, "remote shell refused");
            return Ok(None);
        }

        let group = GroupName::shell(&slug);
        let (mut subscriber, inbox) = ctx.bus.open_mailbox();
        ctx.bus.subscribe(&group, &mut subscriber).await?;
        ctx.bus
            .subscribe(&GroupName::all_shells(), &mut subscriber)
            .await?;

        let mut session = Self {
            slug,
            group,
            state: SessionState::Connecting,
            subscriber,
            bus: ctx.bus.clone(),
        };
        session.state.advance(SessionState::Accepted);
        tracing::info!(
            slug = %session.slug,
            group = %session.group,
            session_id = %session.subscriber.id(),
            "remote shell accepted"
        );
        Ok(Some((session, inbox)))
    }

    /// Returns the shell group of the watched display.
    #[must_use]
    pub const fn group(&self) -> &GroupName {
        &self.group
    }
}

#[async_trait]
impl Session for ShellSession {
    fn kind(&self) -> &'static str {
        "shell"
    }

    fn slug(&self) -> &DisplaySlug {
        &self.slug
    }

    fn state(&self) -> SessionState {
        self.state
    }

    fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    async fn handle_frame(&mut self, text: &str) -> Result<Option<OutboundFrame>, SessionError> {
        match ShellInbound::parse(text)? {
            ShellInbound::RemoteShellMessage {
                display_slug,
                frame,
            } => {
                let target = GroupName::display(&display_slug);
                let receivers = self.bus.publish(&target, &BusEvent::data(frame)).await?;
                tracing::debug!(slug = %self.slug, target = %target, receivers, "remote shell message relayed");
                Ok(None)
            }
            ShellInbound::Ignored(cmd) => {
                tracing::debug!(slug = %self.slug, %cmd, "unhandled shell command ignored");
                Ok(None)
            }
        }
    }

    fn handle_bus_event(&self, event: BusEvent) -> Result<OutboundFrame, ProtocolError> {
        match event {
            BusEvent::CmdData { data } => Ok(OutboundFrame::Data(data)),
            BusEvent::Cmd { .. } => Err(ProtocolError::UnexpectedEvent("cmd".to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use serde_json::json;

    use super::*;
    use crate::domain::{Clock, SystemClock};
    use crate::liveness::{LivenessTracker, MemoryHeartbeatStore};
    use crate::protocol::NtpResponder;
    use crate::session::DisplaySession;

    fn context() -> SessionContext {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        SessionContext::new(
            GroupBus::in_process(16),
            LivenessTracker::new(
                Arc::new(MemoryHeartbeatStore::new()),
                Arc::clone(&clock),
                Duration::seconds(60),
            ),
            NtpResponder::new(clock),
        )
    }

    fn slug(raw: &str) -> DisplaySlug {
        let Ok(slug) = DisplaySlug::parse(raw) else {
            panic!("valid slug");
        };
        slug
    }

    async fn admin_shell(ctx: &SessionContext, raw: &str) -> (ShellSession, Inbox) {
        let Ok(Some(pair)) = ShellSession::connect(ctx, slug(raw), Principal::Superuser).await else {
            panic!("superuser shell must be accepted");
        };
        pair
    }

    async fn display(ctx: &SessionContext, raw: &str) -> (DisplaySession, Inbox) {
        let Ok(pair) = DisplaySession::connect(ctx, slug(raw), Principal::Anonymous).await else {
            panic!("display connect failed");
        };
        pair
    }

    #[tokio::test]
    async fn non_superusers_are_refused_silently() {
        let ctx = context();
        for principal in [Principal::Anonymous, Principal::Staff] {
            let result = ShellSession::connect(&ctx, slug("foo"), principal).await;
            assert!(matches!(result, Ok(None)));
        }
        assert_eq!(ctx.bus.local_member_count(&GroupName::all_shells()), 0);
        assert_eq!(ctx.bus.local_member_count(&GroupName::shell(&slug("foo"))), 0);
    }

    #[tokio::test]
    async fn superuser_joins_shell_groups() {
        let ctx = context();
        let (shell, _inbox) = admin_shell(&ctx, "foo").await;
        assert_eq!(shell.state(), SessionState::Accepted);
        assert_eq!(shell.group().as_str(), "shell_foo");
        assert_eq!(ctx.bus.local_member_count(&GroupName::all_shells()), 1);
    }

    #[tokio::test]
    async fn rs_msg_reaches_target_display_only() {
        let ctx = context();
        let (mut shell, _shell_inbox) = admin_shell(&ctx, "foo").await;
        let (foo, mut foo_inbox) = display(&ctx, "foo").await;
        let (_bar, mut bar_inbox) = display(&ctx, "bar").await;

        let text = r#"{"cmd": "rsMSG", "displaySlug": "foo", "id": 1, "payload": "document.title"}"#;
        assert!(matches!(shell.handle_frame(text).await, Ok(None)));

        let Some(event) = foo_inbox.try_recv() else {
            panic!("display foo should receive the relay");
        };
        assert_eq!(event.kind(), "cmd_data");
        let Ok(OutboundFrame::Data(frame)) = foo.handle_bus_event(event) else {
            panic!("expected data frame");
        };
        assert_eq!(
            frame,
            json!({"cmd": "rsMSG", "displaySlug": "foo", "id": 1, "payload": "document.title"})
        );
        assert!(bar_inbox.try_recv().is_none());
    }

    #[tokio::test]
    async fn full_relay_round_trip() {
        let ctx = context();
        let (mut shell, mut shell_inbox) = admin_shell(&ctx, "foo").await;
        let (mut device, mut device_inbox) = display(&ctx, "foo").await;
        let (_other_shell, mut other_shell_inbox) = admin_shell(&ctx, "bar").await;

        let request = r#"{"cmd": "rsMSG", "displaySlug": "foo", "id": 4, "payload": "2*21"}"#;
        tokio_test::assert_ok!(shell.handle_frame(request).await);
        let Some(relayed) = device_inbox.try_recv() else {
            panic!("device did not get the request");
        };
        assert!(device.handle_bus_event(relayed).is_ok());

        let result = r#"{"cmd": "rsRES", "id": 4, "reqCmd": "2*21", "result": 42, "error": null}"#;
        tokio_test::assert_ok!(device.handle_frame(result).await);

        let Some(event) = shell_inbox.try_recv() else {
            panic!("shell did not get the result");
        };
        let Ok(OutboundFrame::Data(frame)) = shell.handle_bus_event(event) else {
            panic!("expected data frame for shell");
        };
        assert_eq!(frame.get("result"), Some(&json!(42)));
        assert!(other_shell_inbox.try_recv().is_none());
    }

    #[tokio::test]
    async fn fleet_reload_skips_shells() {
        let ctx = context();
        let (_shell, mut shell_inbox) = admin_shell(&ctx, "foo").await;
        let (_a, mut a_inbox) = display(&ctx, "a").await;
        let (_b, mut b_inbox) = display(&ctx, "b").await;

        let published = ctx
            .bus
            .publish(&GroupName::all_displays(), &BusEvent::reload(true))
            .await;
        assert!(matches!(published, Ok(2)));
        assert!(a_inbox.try_recv().is_some());
        assert!(b_inbox.try_recv().is_some());
        assert!(shell_inbox.try_recv().is_none());
    }

    #[tokio::test]
    async fn shell_rejects_cmd_events() {
        let ctx = context();
        let (shell, _inbox) = admin_shell(&ctx, "foo").await;
        assert!(matches!(
            shell.handle_bus_event(BusEvent::reload(false)),
            Err(ProtocolError::UnexpectedEvent(kind)) if kind == "cmd"
        ));
    }
}
