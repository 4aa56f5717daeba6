//! Command names on the display wire protocol.

/// Every `cmd` value the gateway sends or understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    /// Device heartbeat.
    Ping,
    /// Heartbeat reply.
    Pong,
    /// Ask the device to reload its content.
    Reload,
    /// Remote-shell request from an admin, relayed to the device.
    RemoteShellMessage,
    /// Remote-shell result from the device, relayed to the admin.
    RemoteShellResult,
    /// Clock-sync request from the device.
    NtpRequest,
    /// Clock-sync reply to the device.
    NtpResponse,
}

impl CommandName {
    /// Returns the wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Pong => "pong",
            Self::Reload => "reload",
            Self::RemoteShellMessage => "rsMSG",
            Self::RemoteShellResult => "rsRES",
            Self::NtpRequest => "NTPRequest",
            Self::NtpResponse => "NTPResponse",
        }
    }

    /// Parses a wire string. Unknown names yield `None`.
    #[must_use]
    pub fn from_wire(raw: &str) -> Option<Self> {
        Some(match raw {
            "ping" => Self::Ping,
            "pong" => Self::Pong,
            "reload" => Self::Reload,
            "rsMSG" => Self::RemoteShellMessage,
            "rsRES" => Self::RemoteShellResult,
            "NTPRequest" => Self::NtpRequest,
            "NTPResponse" => Self::NtpResponse,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_case_sensitive() {
        assert_eq!(CommandName::from_wire("NTPRequest"), Some(CommandName::NtpRequest));
        assert_eq!(CommandName::from_wire("ntprequest"), None);
        assert_eq!(CommandName::RemoteShellResult.as_str(), "rsRES");
    }
}
