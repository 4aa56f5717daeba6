//! WebSocket layer: upgrade handlers and the per-connection loop.
//!
//! Displays connect at `/ws/display/{slug}`, remote-shell operators at
//! `/ws/shell/{slug}`. Both speak JSON text frames keyed by `cmd`.

pub mod connection;
pub mod handler;
