//! Service layer: fleet-wide operations for external collaborators.
//!
//! The [`FleetService`] is the entry point for operator actions and
//! content-change triggers, and the read side of display liveness.

pub mod fleet_service;

pub use fleet_service::{DisplayStatus, FleetService, ReloadOutcome};
