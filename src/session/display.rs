//! Session of a connected display device.
//!
//! On connect the session joins `display_<slug>` and `displays`. Inbound
//! frames are dispatched on `cmd`:
//!
//! - `ping`: refresh liveness (devices only, not logged-in previews),
//!   reply `pong`.
//! - `NTPRequest`: reply `NTPResponse` to this session only.
//! - `rsRES`: relay the whole frame to `shell_<slug>`.
//! - anything else: ignored.
//!
//! Bus events become frames: `cmd` events are normalised to a command
//! object, `cmd_data` payloads are sent as-is.

use async_trait::async_trait;

use super::{Session, SessionContext, SessionState};
use crate::bus::{BusEvent, GroupBus, Inbox, Subscriber};
use crate::domain::{DisplaySlug, GroupName, Principal};
use crate::error::{BusError, ProtocolError, SessionError};
use crate::liveness::LivenessTracker;
use crate::protocol::{DisplayInbound, NtpResponder, OutboundFrame};

/// Server-side state of one display connection.
#[derive(Debug)]
pub struct DisplaySession {
    slug: DisplaySlug,
    group: GroupName,
    principal: Principal,
    state: SessionState,
    subscriber: Subscriber,
    bus: GroupBus,
    liveness: LivenessTracker,
    ntp: NtpResponder,
}

impl DisplaySession {
    /// Joins the display's groups and returns the accepted session with
    /// its inbox.
    ///
    /// # Errors
    ///
    /// Returns [`BusError`] if the bus cannot take the subscriptions; the
    /// connection must then be refused.
    pub async fn connect(
        ctx: &SessionContext,
        slug: DisplaySlug,
        principal: Principal,
    ) -> Result<(Self, Inbox), BusError> {
        let group = GroupName::display(&slug);
        let (mut subscriber, inbox) = ctx.bus.open_mailbox();
        ctx.bus.subscribe(&group, &mut subscriber).await?;
        ctx.bus
            .subscribe(&GroupName::all_displays(), &mut subscriber)
            .await?;

        let mut session = Self {
            slug,
            group,
            principal,
            state: SessionState::Connecting,
            subscriber,
            bus: ctx.bus.clone(),
            liveness: ctx.liveness.clone(),
            ntp: ctx.ntp.clone(),
        };
        session.state.advance(SessionState::Accepted);
        tracing::info!(
            slug = %session.slug,
            group = %session.group,
            session_id = %session.subscriber.id(),
            authenticated = principal.is_authenticated(),
            "display session accepted"
        );
        Ok((session, inbox))
    }

    /// Returns the display's group.
    #[must_use]
    pub const fn group(&self) -> &GroupName {
        &self.group
    }
}

#[async_trait]
impl Session for DisplaySession {
    fn kind(&self) -> &'static str {
        "display"
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
        match DisplayInbound::parse(text)? {
            DisplayInbound::Ping => {
                if !self.principal.is_authenticated()
                    && let Err(e) = self.liveness.touch(&self.slug).await
                {
                    tracing::error!(slug = %self.slug, error = %e, "heartbeat not recorded");
                }
                Ok(Some(OutboundFrame::Pong))
            }
            DisplayInbound::NtpRequest { send_timestamp } => {
                Ok(Some(self.ntp.respond(send_timestamp)))
            }
            DisplayInbound::RemoteShellResult(frame) => {
                let shell = GroupName::shell(&self.slug);
                self.bus.publish(&shell, &BusEvent::data(frame)).await?;
                Ok(None)
            }
            DisplayInbound::Ignored(cmd) => {
                tracing::debug!(slug = %self.slug, %cmd, "unhandled display command ignored");
                Ok(None)
            }
        }
    }

    fn handle_bus_event(&self, event: BusEvent) -> Result<OutboundFrame, ProtocolError> {
        match event {
            BusEvent::Cmd { cmd } => Ok(OutboundFrame::Command(cmd.into_frame()?)),
            BusEvent::CmdData { data } => Ok(OutboundFrame::Data(data)),
        }
    }
}
