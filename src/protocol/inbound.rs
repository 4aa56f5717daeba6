//! Frames received from clients, parsed into closed enums.
//!
//! Both client kinds speak JSON objects with a string `cmd`. Anything else
//! is a [`ProtocolError`]; a well-formed frame with a `cmd` the receiver
//! does not handle parses to an `Ignored` variant.

use serde_json::{Map, Number, Value};

use super::CommandName;
use crate::domain::DisplaySlug;
use crate::error::ProtocolError;

/// A frame sent by a display device.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayInbound {
    /// Heartbeat.
    Ping,
    /// Clock-sync request; `send_timestamp` is echoed back verbatim.
    NtpRequest {
        /// Client-side send time, in whatever unit the client chose.
        send_timestamp: Number,
    },
    /// Remote-shell result; the whole frame is relayed to the shell group.
    RemoteShellResult(Value),
    /// A `cmd` this session has no handler for.
    Ignored(String),
}

/// A frame sent by a remote-shell admin client.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellInbound {
    /// Request to relay `frame` to the display `display_slug`.
    RemoteShellMessage {
        /// Target display.
        display_slug: DisplaySlug,
        /// The entire inbound frame.
        frame: Value,
    },
    /// A `cmd` this session has no handler for.
    Ignored(String),
}

impl DisplayInbound {
    /// Parses a text frame from a display.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] if the text is not a JSON object with a
    /// string `cmd`, or an `NTPRequest` lacks a numeric `sendTimestamp`.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let (cmd, obj) = command_object(text)?;
        Ok(match CommandName::from_wire(&cmd) {
            Some(CommandName::Ping) => Self::Ping,
            Some(CommandName::NtpRequest) => match obj.get("sendTimestamp") {
                Some(Value::Number(n)) => Self::NtpRequest {
                    send_timestamp: n.clone(),
                },
                Some(other) => {
                    return Err(ProtocolError::InvalidField {
                        field: "sendTimestamp",
                        reason: format!("expected number, got {other}"),
                    });
                }
                None => return Err(ProtocolError::MissingField("sendTimestamp")),
            },
            Some(CommandName::RemoteShellResult) => Self::RemoteShellResult(Value::Object(obj)),
            _ => Self::Ignored(cmd),
        })
    }
}

impl ShellInbound {
    /// Parses a text frame from a remote-shell client.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] if the text is not a JSON object with a
    /// string `cmd`, or an `rsMSG` lacks a valid `displaySlug` or a
    /// `payload`.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let (cmd, obj) = command_object(text)?;
        if CommandName::from_wire(&cmd) != Some(CommandName::RemoteShellMessage) {
            return Ok(Self::Ignored(cmd));
        }
        let display_slug = match obj.get("displaySlug") {
            Some(Value::String(raw)) => {
                DisplaySlug::parse(raw).map_err(|e| ProtocolError::InvalidField {
                    field: "displaySlug",
                    reason: e.to_string(),
                })?
            }
            Some(_) => {
                return Err(ProtocolError::InvalidField {
                    field: "displaySlug",
                    reason: "expected string".to_string(),
                });
            }
            None => return Err(ProtocolError::MissingField("displaySlug")),
        };
        if !obj.contains_key("payload") {
            return Err(ProtocolError::MissingField("payload"));
        }
        Ok(Self::RemoteShellMessage {
            display_slug,
            frame: Value::Object(obj),
        })
    }
}

/// Splits a frame into its `cmd` string and the full object.
fn command_object(text: &str) -> Result<(String, Map<String, Value>), ProtocolError> {
    let Value::Object(obj) = serde_json::from_str::<Value>(text)? else {
        return Err(ProtocolError::NotAnObject);
    };
    let cmd = match obj.get("cmd") {
        Some(Value::String(cmd)) => cmd.clone(),
        Some(_) => {
            return Err(ProtocolError::InvalidField {
                field: "cmd",
                reason: "expected string".to_string(),
            });
        }
        None => return Err(ProtocolError::MissingField("cmd")),
    };
    Ok((cmd, obj))
}
