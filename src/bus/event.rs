//! Events carried by the group bus.
//!
//! Every event has a `type` discriminator selecting the local handler of
//! the receiving session. Two handlers exist:
//!
//! - `cmd`: a command for the device, either a bare name (`"reload"`) or a
//!   command object (`{"cmd": "reload", "delayed": true}`).
//! - `cmd_data`: an arbitrary payload forwarded to the client as-is.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ProtocolError;
use crate::protocol::CommandName;

/// A message published to a bus group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusEvent {
    /// Command to forward to a display after normalisation.
    Cmd {
        /// The command, bare or structured.
        cmd: CommandPayload,
    },
    /// Payload to forward verbatim.
    CmdData {
        /// Arbitrary JSON data.
        data: Value,
    },
}

/// Body of a [`BusEvent::Cmd`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandPayload {
    /// Bare command name, normalised to `{"cmd": name}` before sending.
    Name(String),
    /// Structured command object; must contain a string `cmd`.
    Object(Map<String, Value>),
}

impl CommandPayload {
    /// Normalises the payload into the JSON object sent to the display.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MissingField`] if an object payload has no
    /// `cmd`, or [`ProtocolError::InvalidField`] if `cmd` is not a string.
    pub fn into_frame(self) -> Result<Map<String, Value>, ProtocolError> {
        match self {
            Self::Name(name) => {
                let mut frame = Map::new();
                frame.insert("cmd".to_string(), Value::String(name));
                Ok(frame)
            }
            Self::Object(frame) => match frame.get("cmd") {
                Some(Value::String(_)) => Ok(frame),
                Some(other) => Err(ProtocolError::InvalidField {
                    field: "cmd",
                    reason: format!("expected string, got {other}"),
                }),
                None => Err(ProtocolError::MissingField("cmd")),
            },
        }
    }
}

impl BusEvent {
    /// A bare command event, e.g. `{"type": "cmd", "cmd": "reload"}`.
    #[must_use]
    pub fn command(name: CommandName) -> Self {
        Self::Cmd {
            cmd: CommandPayload::Name(name.as_str().to_string()),
        }
    }

    /// A reload command. Delayed reloads ask the device to stagger its
    /// reload instead of reloading immediately.
    #[must_use]
    pub fn reload(delayed: bool) -> Self {
        if !delayed {
            return Self::command(CommandName::Reload);
        }
        let mut frame = Map::new();
        frame.insert(
            "cmd".to_string(),
            Value::String(CommandName::Reload.as_str().to_string()),
        );
        frame.insert("delayed".to_string(), Value::Bool(true));
        Self::Cmd {
            cmd: CommandPayload::Object(frame),
        }
    }

    /// A verbatim data event.
    #[must_use]
    pub fn data(data: Value) -> Self {
        Self::CmdData { data }
    }

    /// Returns the `type` discriminator.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Cmd { .. } => "cmd",
            Self::CmdData { .. } => "cmd_data",
        }
    }

    /// Encodes the event for the shared backend.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; cannot happen for well-formed values.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decodes an event received from the shared backend.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] if `raw` is not a JSON object, has no
    /// known `type`, or lacks the field its type requires.
    pub fn decode(raw: &str) -> Result<Self, ProtocolError> {
        let Value::Object(mut obj) = serde_json::from_str::<Value>(raw)? else {
            return Err(ProtocolError::NotAnObject);
        };
        let kind = match obj.get("type") {
            Some(Value::String(kind)) => kind.clone(),
            Some(_) => {
                return Err(ProtocolError::InvalidField {
                    field: "type",
                    reason: "expected string".to_string(),
                });
            }
            None => return Err(ProtocolError::MissingField("type")),
        };
        match kind.as_str() {
            "cmd" => match obj.remove("cmd") {
                Some(Value::String(name)) => Ok(Self::Cmd {
                    cmd: CommandPayload::Name(name),
                }),
                Some(Value::Object(frame)) => Ok(Self::Cmd {
                    cmd: CommandPayload::Object(frame),
                }),
                Some(other) => Err(ProtocolError::InvalidField {
                    field: "cmd",
                    reason: format!("expected string or object, got {other}"),
                }),
                None => Err(ProtocolError::MissingField("cmd")),
            },
            "cmd_data" => obj
                .remove("data")
                .map(Self::data)
                .ok_or(ProtocolError::MissingField("data")),
            _ => Err(ProtocolError::UnexpectedEvent(kind)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_command_normalises_to_object() {
        let BusEvent::Cmd { cmd } = BusEvent::command(CommandName::Reload) else {
            panic!("expected cmd event");
        };
        let Ok(frame) = cmd.into_frame() else {
            panic!("bare command must normalise");
        };
        assert_eq!(Value::Object(frame), json!({"cmd": "reload"}));
    }

    #[test]
    fn delayed_reload_carries_flag() {
        let encoded = BusEvent::reload(true).encode().unwrap_or_default();
        let value: Value = serde_json::from_str(&encoded).unwrap_or_default();
        assert_eq!(
            value,
            json!({"type": "cmd", "cmd": {"cmd": "reload", "delayed": true}})
        );
    }

    #[test]
    fn object_without_cmd_is_protocol_error() {
        let payload = CommandPayload::Object(Map::new());
        assert!(matches!(
            payload.into_frame(),
            Err(ProtocolError::MissingField("cmd"))
        ));
    }

    #[test]
    fn decode_requires_cmd_field() {
        let result = BusEvent::decode(r#"{"type": "cmd"}"#);
        assert!(matches!(result, Err(ProtocolError::MissingField("cmd"))));
    }

    #[test]
    fn decode_requires_data_field() {
        let result = BusEvent::decode(r#"{"type": "cmd_data"}"#);
        assert!(matches!(result, Err(ProtocolError::MissingField("data"))));
    }

    #[test]
    fn decode_rejects_unknown_type() {
        let result = BusEvent::decode(r#"{"type": "chat", "text": "hi"}"#);
        assert!(matches!(result, Err(ProtocolError::UnexpectedEvent(_))));
    }

    #[test]
    fn decode_reads_what_encode_writes() {
        let event = BusEvent::data(json!({"cmd": "rsMSG", "id": 7, "payload": "1+1"}));
        let encoded = event.encode().unwrap_or_default();
        let Ok(decoded) = BusEvent::decode(&encoded) else {
            panic!("decode failed for {encoded}");
        };
        assert_eq!(decoded, event);
    }
}
