//! Display liveness: heartbeat storage and online inference.

pub mod store;
pub mod tracker;

pub use store::{HeartbeatStore, MemoryHeartbeatStore, RedisHeartbeatStore, heartbeat_key};
pub use tracker::{DEFAULT_WINDOW_SECS, Liveness, LivenessTracker, is_fresh};
