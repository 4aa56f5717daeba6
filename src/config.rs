//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::domain::DisplaySlug;
use crate::liveness::DEFAULT_WINDOW_SECS;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8000`).
    pub listen_addr: SocketAddr,

    /// Redis URL for the shared group bus and heartbeat store. `None`
    /// keeps both in-process (single instance only).
    pub redis_url: Option<String>,

    /// Seconds since the last heartbeat after which a display is offline.
    pub heartbeat_window_secs: i64,

    /// Content-change reloads touching more displays than this are sent
    /// as delayed reloads.
    pub reload_delay_threshold: usize,

    /// Capacity of each session's bus mailbox.
    pub session_mailbox_capacity: usize,

    /// Bearer tokens that authenticate as superuser.
    pub admin_tokens: HashSet<String>,

    /// Bearer tokens that authenticate as non-superuser staff.
    pub user_tokens: HashSet<String>,

    /// Displays known before any of them connects.
    pub known_displays: Vec<DisplaySlug>,

    /// Whether a display connecting under an unknown slug joins the
    /// directory. Defaults to on only when `known_displays` is empty.
    pub auto_register_displays: bool,

    /// Log output format.
    pub log_format: LogFormat,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`], or `KNOWN_DISPLAYS` contains an invalid slug.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
            .parse()?;

        let redis_url = std::env::var("REDIS_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let heartbeat_window_secs = parse_env("HEARTBEAT_WINDOW_SECS", DEFAULT_WINDOW_SECS).max(1);
        let reload_delay_threshold = parse_env("RELOAD_DELAY_THRESHOLD", 10);
        let session_mailbox_capacity = parse_env("SESSION_MAILBOX_CAPACITY", 256);

        let admin_tokens = parse_list("ADMIN_TOKENS").into_iter().collect();
        let user_tokens = parse_list("USER_TOKENS").into_iter().collect();

        let known_displays = parse_list("KNOWN_DISPLAYS")
            .iter()
            .map(|raw| DisplaySlug::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;
        let auto_register_displays =
            parse_env("AUTO_REGISTER_DISPLAYS", known_displays.is_empty());

        let log_format = match std::env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            redis_url,
            heartbeat_window_secs,
            reload_delay_threshold,
            session_mailbox_capacity,
            admin_tokens,
            user_tokens,
            known_displays,
            auto_register_displays,
            log_format,
        })
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            redis_url: None,
            heartbeat_window_secs: DEFAULT_WINDOW_SECS,
            reload_delay_threshold: 10,
            session_mailbox_capacity: 256,
            admin_tokens: HashSet::new(),
            user_tokens: HashSet::new(),
            known_displays: Vec::new(),
            auto_register_displays: true,
            log_format: LogFormat::Text,
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Reads a comma-separated list, skipping blank entries.
fn parse_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .map(|raw| split_list(&raw))
        .unwrap_or_default()
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_trims_and_skips_blanks() {
        assert_eq!(
            split_list(" lobby, ,foyer ,"),
            vec!["lobby".to_string(), "foyer".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn default_is_single_instance() {
        let config = GatewayConfig::default();
        assert!(config.redis_url.is_none());
        assert_eq!(config.heartbeat_window_secs, 60);
        assert!(config.auto_register_displays);
    }
}
