//! Domain layer: display identity, bus group names, callers, and time.
//!
//! This module contains the server-side domain model shared by the bus,
//! the sessions, and the liveness tracker.

pub mod clock;
pub mod display;
pub mod display_slug;
pub mod group;
pub mod principal;

pub use clock::{Clock, ManualClock, SystemClock};
pub use display::{Display, DisplayId};
pub use display_slug::DisplaySlug;
pub use group::GroupName;
pub use principal::Principal;
