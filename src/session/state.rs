//! Session lifecycle.

use std::fmt;

/// Lifecycle of a session: `Connecting → Accepted → Open → Closed`.
///
/// `Accepted` means the session joined its groups and the transport may
/// complete the handshake; `Open` means frames flow. A refused connection
/// never leaves `Connecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum SessionState {
    /// Handshake in progress; no group membership yet.
    #[default]
    Connecting,
    /// Groups joined; waiting for the transport handshake.
    Accepted,
    /// Handshake complete; frames flow both ways.
    Open,
    /// Transport gone.
    Closed,
}

impl SessionState {
    /// Moves to `next` if that is a forward step. Returns whether the
    /// state changed.
    pub fn advance(&mut self, next: Self) -> bool {
        let allowed = matches!(
            (*self, next),
            (Self::Connecting, Self::Accepted)
                | (Self::Accepted, Self::Open)
                | (Self::Connecting | Self::Accepted | Self::Open, Self::Closed)
        );
        if allowed {
            *self = next;
        }
        allowed
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connecting => "connecting",
            Self::Accepted => "accepted",
            Self::Open => "open",
            Self::Closed => "closed",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_path() {
        let mut state = SessionState::default();
        assert!(state.advance(SessionState::Accepted));
        assert!(state.advance(SessionState::Open));
        assert!(state.advance(SessionState::Closed));
        assert_eq!(state, SessionState::Closed);
    }

    #[test]
    fn cannot_skip_acceptance_or_reopen() {
        let mut state = SessionState::Connecting;
        assert!(!state.advance(SessionState::Open));
        assert_eq!(state, SessionState::Connecting);

        let mut closed = SessionState::Closed;
        assert!(!closed.advance(SessionState::Open));
    }
}
