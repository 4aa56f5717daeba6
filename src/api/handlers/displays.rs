//! Display handlers: liveness read model and reload commands.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{DisplayListResponse, DisplayStatusDto, ReloadAllRequest, ReloadResponse};
use crate::app_state::AppState;
use crate::domain::DisplaySlug;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /displays`: Liveness of every known display.
///
/// # Errors
///
/// Returns [`GatewayError::DirectoryStore`] or
/// [`GatewayError::HeartbeatStore`] if a store cannot be read.
#[utoipa::path(
    get,
    path = "/api/v1/displays",
    tag = "Displays",
    summary = "List displays",
    description = "Returns every known display with its online flag and last heartbeat.",
    responses(
        (status = 200, description = "Fleet status", body = DisplayListResponse),
        (status = 503, description = "Directory or heartbeat store unavailable", body = ErrorResponse),
    )
)]
pub async fn list_displays(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GatewayError> {
    let data: Vec<DisplayStatusDto> = state
        .fleet
        .fleet_status()
        .await?
        .into_iter()
        .map(DisplayStatusDto::from)
        .collect();
    let online = data.iter().filter(|d| d.online).count();

    Ok(Json(DisplayListResponse {
        total: data.len(),
        online,
        data,
    }))
}

/// `GET /displays/{slug}`: Liveness of one display.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidSlug`], [`GatewayError::DisplayNotFound`]
/// or [`GatewayError::HeartbeatStore`].
#[utoipa::path(
    get,
    path = "/api/v1/displays/{slug}",
    tag = "Displays",
    summary = "Get display status",
    params(
        ("slug" = String, Path, description = "Display slug"),
    ),
    responses(
        (status = 200, description = "Display status", body = DisplayStatusDto),
        (status = 400, description = "Invalid slug", body = ErrorResponse),
        (status = 404, description = "Display not found", body = ErrorResponse),
    )
)]
pub async fn get_display(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let slug = DisplaySlug::parse(&slug)?;
    let status = state.fleet.display_status(&slug).await?;
    Ok(Json(DisplayStatusDto::from(status)))
}

/// `POST /displays/reload`: Reload every connected display.
///
/// # Errors
///
/// Returns [`GatewayError::Bus`] if the command cannot be published.
#[utoipa::path(
    post,
    path = "/api/v1/displays/reload",
    tag = "Displays",
    summary = "Reload all displays",
    description = "Publishes a reload command to every display. The body is optional; `delayed` defaults to true.",
    request_body(content = ReloadAllRequest, content_type = "application/json"),
    responses(
        (status = 202, description = "Reload published", body = ReloadResponse),
        (status = 503, description = "Bus unavailable", body = ErrorResponse),
    )
)]
pub async fn reload_all(
    State(state): State<AppState>,
    body: Option<Json<ReloadAllRequest>>,
) -> Result<impl IntoResponse, GatewayError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let outcome = state.fleet.reload_all(req.delayed).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(ReloadResponse::from(outcome)),
    ))
}

/// `POST /displays/{slug}/reload`: Reload one display immediately.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidSlug`] or [`GatewayError::Bus`].
#[utoipa::path(
    post,
    path = "/api/v1/displays/{slug}/reload",
    tag = "Displays",
    summary = "Reload one display",
    params(
        ("slug" = String, Path, description = "Display slug"),
    ),
    responses(
        (status = 202, description = "Reload published", body = ReloadResponse),
        (status = 400, description = "Invalid slug", body = ErrorResponse),
        (status = 503, description = "Bus unavailable", body = ErrorResponse),
    )
)]
pub async fn reload_display(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let slug = DisplaySlug::parse(&slug)?;
    let outcome = state.fleet.reload_display(&slug).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(ReloadResponse::from(outcome)),
    ))
}

/// Display routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/displays", get(list_displays))
        .route("/displays/reload", post(reload_all))
        .route("/displays/{slug}", get(get_display))
        .route("/displays/{slug}/reload", post(reload_display))
}
