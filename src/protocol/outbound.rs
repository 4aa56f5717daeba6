//! Frames sent to clients.

use serde_json::{Map, Number, Value, json};

use super::CommandName;

/// A text frame the gateway sends over a session's connection.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundFrame {
    /// Heartbeat reply.
    Pong,
    /// Clock-sync reply.
    NtpResponse {
        /// Server wall-clock time in milliseconds since the Unix epoch.
        server_time: i64,
        /// The request's `sendTimestamp`, unchanged.
        client_send_timestamp: Number,
    },
    /// A normalised command object from the bus.
    Command(Map<String, Value>),
    /// A bus payload forwarded without modification.
    Data(Value),
}

impl OutboundFrame {
    /// Renders the frame as JSON.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Pong => json!({ "cmd": CommandName::Pong.as_str() }),
            Self::NtpResponse {
                server_time,
                client_send_timestamp,
            } => json!({
                "cmd": CommandName::NtpResponse.as_str(),
                "serverTime": server_time,
                "clientSendTimestamp": client_send_timestamp,
            }),
            Self::Command(frame) => Value::Object(frame.clone()),
            Self::Data(data) => data.clone(),
        }
    }

    /// Renders the frame as JSON text.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_value().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pong_frame() {
        assert_eq!(OutboundFrame::Pong.to_text(), r#"{"cmd":"pong"}"#);
    }

    #[test]
    fn ntp_response_uses_camel_case() {
        let frame = OutboundFrame::NtpResponse {
            server_time: 1_700_000_000_123,
            client_send_timestamp: Number::from(1000),
        };
        assert_eq!(
            frame.to_value(),
            json!({"cmd": "NTPResponse", "serverTime": 1_700_000_000_123_i64, "clientSendTimestamp": 1000})
        );
    }

    #[test]
    fn data_is_sent_verbatim() {
        let data = json!(["not", "an", "object"]);
        assert_eq!(OutboundFrame::Data(data.clone()).to_value(), data);
    }
}
