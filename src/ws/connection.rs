//! WebSocket connection loop.
//!
//! Drives one [`Session`] over an upgraded socket: inbound text frames go to
//! the session, bus events from its inbox are rendered and written back.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use crate::bus::Inbox;
use crate::error::SessionError;
use crate::session::Session;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads text frames from the client and hands them to the session.
/// - Forwards events delivered to the session's inbox to the client.
///
/// Malformed frames are logged and skipped. The loop ends when the client
/// closes, the socket fails, or a relay cannot be published. The session is
/// dropped on return, which releases its group memberships.
pub async fn run_session<S: Session>(socket: WebSocket, mut session: S, mut inbox: Inbox) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    session.open();

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match session.handle_frame(text.as_str()).await {
                            Ok(Some(reply)) => {
                                if ws_tx.send(Message::text(reply.to_text())).await.is_err() {
                                    break;
                                }
                            }
                            Ok(None) => {}
                            Err(SessionError::Protocol(e)) => {
                                tracing::warn!(
                                    kind = session.kind(),
                                    slug = %session.slug(),
                                    error = %e,
                                    "dropping malformed frame"
                                );
                            }
                            Err(SessionError::Bus(e)) => {
                                tracing::error!(
                                    kind = session.kind(),
                                    slug = %session.slug(),
                                    error = %e,
                                    "relay failed, closing connection"
                                );
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(slug = %session.slug(), error = %e, "ws read error");
                        break;
                    }
                    _ => {}
                }
            }
            // Event delivered to one of the session's groups
            event = inbox.recv() => {
                let Some(event) = event else {
                    break;
                };
                match session.handle_bus_event(event) {
                    Ok(frame) => {
                        if ws_tx.send(Message::text(frame.to_text())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            kind = session.kind(),
                            slug = %session.slug(),
                            error = %e,
                            "dropping bus event"
                        );
                    }
                }
            }
        }
    }

    session.close();
}
