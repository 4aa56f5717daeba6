//! Display/shell wire protocol: JSON text frames with a `cmd` discriminator.
//!
//! Each direction has its own closed enum so every handler matches
//! exhaustively:
//!
//! - [`DisplayInbound`]: device → gateway.
//! - [`ShellInbound`]: remote-shell admin → gateway.
//! - [`OutboundFrame`]: gateway → any client.

pub mod command;
pub mod inbound;
pub mod ntp;
pub mod outbound;

pub use command::CommandName;
pub use inbound::{DisplayInbound, ShellInbound};
pub use ntp::NtpResponder;
pub use outbound::OutboundFrame;
