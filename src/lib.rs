//! # signage-gateway
//!
//! Real-time coordination core for a fleet of digital signage displays.
//!
//! Displays keep a WebSocket open to the gateway. Over it they receive
//! commands (reload, remote-shell requests), send heartbeats, and sync
//! their clocks. Operators open a remote-shell WebSocket to drive one
//! display. Content changes elsewhere in the system turn into reload
//! commands for the displays that show that content.
//!
//! ## Architecture
//!
//! ```text
//! Displays / operators (WebSocket)      Collaborators (HTTP)
//!     │                                     │
//!     ├── WS handlers (ws/)                 ├── REST handlers (api/)
//!     ├── DisplaySession / ShellSession     ├── FleetService (service/)
//!     │        (session/)                   │
//!     ├───────────── GroupBus (bus/) ───────┤
//!     │       in-process or Redis pub/sub   │
//!     │                                     │
//!     ├──── LivenessTracker (liveness/) ────┤
//!     │        memory or Redis heartbeats   │
//!     │                                     │
//!     └─── DisplayDirectory (directory) ────┘
//!              memory or Redis hash
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod bus;
pub mod config;
pub mod directory;
pub mod domain;
pub mod error;
pub mod liveness;
pub mod protocol;
pub mod server;
pub mod service;
pub mod session;
pub mod ws;
