//! Connection sessions: one per live display or remote-shell connection.
//!
//! A session owns its bus membership and knows how to turn inbound text
//! frames and bus events into outbound frames. It never touches the
//! socket; [`crate::ws::connection::run_session`] drives it.

pub mod display;
pub mod shell;
pub mod state;

use async_trait::async_trait;

pub use display::DisplaySession;
pub use shell::ShellSession;
pub use state::SessionState;

use crate::bus::{BusEvent, GroupBus};
use crate::domain::DisplaySlug;
use crate::error::{ProtocolError, SessionError};
use crate::liveness::LivenessTracker;
use crate::protocol::{NtpResponder, OutboundFrame};

/// Collaborators every session is built from.
#[derive(Debug, Clone)]
pub struct SessionContext {
    bus: GroupBus,
    liveness: LivenessTracker,
    ntp: NtpResponder,
}

impl SessionContext {
    /// Bundles the bus, liveness tracker and clock-sync responder.
    #[must_use]
    pub fn new(bus: GroupBus, liveness: LivenessTracker, ntp: NtpResponder) -> Self {
        Self { bus, liveness, ntp }
    }

    /// Returns the group bus.
    #[must_use]
    pub const fn bus(&self) -> &GroupBus {
        &self.bus
    }

    /// Returns the liveness tracker.
    #[must_use]
    pub const fn liveness(&self) -> &LivenessTracker {
        &self.liveness
    }
}

/// Behaviour shared by display and shell sessions.
#[async_trait]
pub trait Session: Send {
    /// Short label for logs (`"display"` or `"shell"`).
    fn kind(&self) -> &'static str;

    /// Slug of the display this session is bound to.
    fn slug(&self) -> &DisplaySlug;

    /// Current lifecycle state.
    fn state(&self) -> SessionState;

    /// Mutable access to the lifecycle state.
    fn state_mut(&mut self) -> &mut SessionState;

    /// Marks the transport handshake as complete.
    fn open(&mut self) {
        if self.state_mut().advance(SessionState::Open) {
            tracing::info!(kind = self.kind(), slug = %self.slug(), "session open");
        }
    }

    /// Marks the transport as gone.
    fn close(&mut self) {
        if self.state_mut().advance(SessionState::Closed) {
            tracing::info!(kind = self.kind(), slug = %self.slug(), "session closed");
        }
    }

    /// Handles one inbound text frame, returning an optional direct reply.
    ///
    /// # Errors
    ///
    /// [`SessionError::Protocol`] for malformed frames (log and continue),
    /// [`SessionError::Bus`] when a relay could not be published (end the
    /// connection).
    async fn handle_frame(&mut self, text: &str) -> Result<Option<OutboundFrame>, SessionError>;

    /// Turns a bus event into the frame to send to the client.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the event is incomplete or not meant for
    /// this kind of session.
    fn handle_bus_event(&self, event: BusEvent) -> Result<OutboundFrame, ProtocolError>;
}
