//! REST API layer: route handlers, DTOs, router composition and the
//! OpenAPI document.
//!
//! Resource endpoints are mounted under `/api/v1`.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document for the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "signage-gateway",
        description = "Display coordination gateway: fleet reloads and display liveness."
    ),
    paths(
        handlers::system::health_handler,
        handlers::displays::list_displays,
        handlers::displays::get_display,
        handlers::displays::reload_all,
        handlers::displays::reload_display,
        handlers::content::content_changed,
    ),
    components(schemas(
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
        handlers::system::HealthResponse,
        dto::DisplayStatusDto,
        dto::DisplayListResponse,
        dto::ReloadAllRequest,
        dto::ContentChangedRequest,
        dto::ReloadResponse,
    )),
    tags(
        (name = "System", description = "Health"),
        (name = "Displays", description = "Display liveness and reload commands"),
        (name = "Content", description = "Content-change triggers"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());
    with_docs(router)
}

#[cfg(feature = "swagger-ui")]
fn with_docs(router: Router<AppState>) -> Router<AppState> {
    router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn with_docs(router: Router<AppState>) -> Router<AppState> {
    use axum::Json;
    use axum::routing::get;

    router.route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
