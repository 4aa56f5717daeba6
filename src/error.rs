//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the REST surface and the
//! services behind it. Each variant maps to a specific HTTP status code and
//! structured JSON error response.
//!
//! Two narrower enums cover the real-time core:
//!
//! - [`ProtocolError`]: a frame or bus event that does not have the shape
//!   the receiving side expects. Always logged and dropped at the session
//!   boundary, never fatal for the connection.
//! - [`BusError`]: the group bus backend could not be reached. Always
//!   propagated to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "display not found: lobby",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A frame or bus event that is structurally invalid for its receiver.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The text is not valid JSON.
    #[error("malformed JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// The JSON value is not an object.
    #[error("expected a JSON object")]
    NotAnObject,

    /// A required field is absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A field is present but has the wrong type or an invalid value.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A bus event with a `type` the receiver has no handler for.
    #[error("unexpected bus event type `{0}`")]
    UnexpectedEvent(String),
}

/// Failure of the group bus backend.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// The shared backend rejected or failed a command.
    #[error("bus backend error: {0}")]
    Backend(String),

    /// The shared backend listener is not connected; subscriptions would
    /// never receive anything.
    #[error("bus backend unavailable")]
    Unavailable,

    /// The event could not be encoded for the wire.
    #[error("bus event encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<redis::RedisError> for BusError {
    fn from(err: redis::RedisError) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Errors raised while a session handles an inbound frame.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The frame was malformed; log and drop it.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The bus could not relay the frame; the connection must end.
    #[error(transparent)]
    Bus(#[from] BusError),
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | State/Not Found | 404 Not Found              |
/// | 3000–3999 | Server          | 500 / 503                  |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The given string is not a valid display slug.
    #[error("invalid display slug: {0}")]
    InvalidSlug(String),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No display with the given slug is known.
    #[error("display not found: {0}")]
    DisplayNotFound(String),

    /// The group bus could not deliver a fleet command.
    #[error(transparent)]
    Bus(#[from] BusError),

    /// The heartbeat store could not be read or written.
    #[error("heartbeat store error: {0}")]
    HeartbeatStore(String),

    /// The display directory could not be read or written.
    #[error("display directory error: {0}")]
    DirectoryStore(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidSlug(_) => 1001,
            Self::InvalidRequest(_) => 1002,
            Self::DisplayNotFound(_) => 2001,
            Self::Internal(_) => 3000,
            Self::Bus(_) => 3001,
            Self::HeartbeatStore(_) => 3002,
            Self::DirectoryStore(_) => 3003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidSlug(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::DisplayNotFound(_) => StatusCode::NOT_FOUND,
            Self::Bus(_) | Self::HeartbeatStore(_) | Self::DirectoryStore(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<redis::RedisError> for GatewayError {
    fn from(err: redis::RedisError) -> Self {
        Self::HeartbeatStore(err.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
