//! NTP-style clock sync.
//!
//! The device sends its own monotonic send time; the reply carries the
//! server's wall clock plus that send time, so the device can compute the
//! round trip and its offset on receipt. The server keeps no state.

use std::sync::Arc;

use serde_json::Number;

use super::OutboundFrame;
use crate::domain::Clock;

/// Builds `NTPResponse` frames from a [`Clock`].
#[derive(Debug, Clone)]
pub struct NtpResponder {
    clock: Arc<dyn Clock>,
}

impl NtpResponder {
    /// Creates a responder reading `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Answers a request sent at `send_timestamp` (client clock).
    #[must_use]
    pub fn respond(&self, send_timestamp: Number) -> OutboundFrame {
        OutboundFrame::NtpResponse {
            server_time: self.clock.now().timestamp_millis(),
            client_send_timestamp: send_timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ManualClock;
    use chrono::DateTime;

    #[test]
    fn server_time_comes_from_clock() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_500).unwrap_or_default();
        let responder = NtpResponder::new(Arc::new(ManualClock::new(at)));
        let frame = responder.respond(Number::from(42));
        assert_eq!(
            frame,
            OutboundFrame::NtpResponse {
                server_time: 1_700_000_000_500,
                client_send_timestamp: Number::from(42),
            }
        );
    }
}
