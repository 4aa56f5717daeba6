//! Axum WebSocket upgrade handlers.
//!
//! Every check happens before the upgrade: an invalid slug, a refused
//! shell caller, or an unavailable bus is answered with a plain HTTP error
//! and the socket is never opened.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::connection::run_session;
use crate::app_state::AppState;
use crate::auth::Caller;
use crate::domain::DisplaySlug;
use crate::error::GatewayError;
use crate::session::{DisplaySession, ShellSession};

/// `GET /ws/display/{slug}`: Upgrade a display device connection.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidSlug`] for a malformed slug,
/// [`GatewayError::Bus`] if the group subscriptions fail, or
/// [`GatewayError::DirectoryStore`] if registration fails.
///
/// An unknown slug joins the directory only once the session is set up,
/// and only with auto-registration enabled.
pub async fn display_ws_handler(
    ws: WebSocketUpgrade,
    Path(slug): Path<String>,
    Caller(principal): Caller,
    State(state): State<AppState>,
) -> Result<Response, GatewayError> {
    let slug = DisplaySlug::parse(&slug)?;
    let (session, inbox) =
        DisplaySession::connect(&state.sessions, slug.clone(), principal).await?;
    if state.auto_register_displays {
        state.directory.register(&slug).await?;
    }

    Ok(ws.on_upgrade(move |socket| run_session(socket, session, inbox)))
}

/// `GET /ws/shell/{slug}`: Upgrade a remote-shell operator connection.
///
/// Only superusers are admitted; anyone else gets `403 Forbidden`.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidSlug`] for a malformed slug or
/// [`GatewayError::Bus`] if the group subscriptions fail.
pub async fn shell_ws_handler(
    ws: WebSocketUpgrade,
    Path(slug): Path<String>,
    Caller(principal): Caller,
    State(state): State<AppState>,
) -> Result<Response, GatewayError> {
    let slug = DisplaySlug::parse(&slug)?;
    let Some((session, inbox)) = ShellSession::connect(&state.sessions, slug, principal).await?
    else {
        return Ok(StatusCode::FORBIDDEN.into_response());
    };

    Ok(ws.on_upgrade(move |socket| run_session(socket, session, inbox)))
}
