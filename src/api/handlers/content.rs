//! Content-change trigger.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{ContentChangedRequest, ReloadResponse};
use crate::app_state::AppState;
use crate::domain::DisplaySlug;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /content/changed`: Reload the displays that reference a changed
/// content entity.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for an empty entity,
/// [`GatewayError::InvalidSlug`] for a bad slug, or [`GatewayError::Bus`].
#[utoipa::path(
    post,
    path = "/api/v1/content/changed",
    tag = "Content",
    summary = "Content changed",
    description = "Publishes a reload to every listed display. Reloads affecting more displays than the configured threshold are delayed.",
    request_body = ContentChangedRequest,
    responses(
        (status = 202, description = "Reloads published", body = ReloadResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 503, description = "Bus unavailable", body = ErrorResponse),
    )
)]
pub async fn content_changed(
    State(state): State<AppState>,
    Json(req): Json<ContentChangedRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    if req.entity.trim().is_empty() {
        return Err(GatewayError::InvalidRequest("entity must not be empty".into()));
    }
    let displays = req
        .displays
        .iter()
        .map(|raw| DisplaySlug::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let outcome = state.fleet.content_changed(&req.entity, &displays).await?;
    Ok((StatusCode::ACCEPTED, Json(ReloadResponse::from(outcome))))
}

/// Content routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/content/changed", post(content_changed))
}
