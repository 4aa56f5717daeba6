//! Router assembly shared by the binary and the integration tests.

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::AppState;
use crate::ws::handler::{display_ws_handler, shell_ws_handler};

/// Builds the full application: REST API, WebSocket endpoints, tracing and
/// CORS layers.
///
/// WebSocket paths are also accepted with a trailing slash, which is how
/// deployed display clients address them.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(api::build_router())
        .route("/ws/display/{slug}", get(display_ws_handler))
        .route("/ws/display/{slug}/", get(display_ws_handler))
        .route("/ws/shell/{slug}", get(shell_ws_handler))
        .route("/ws/shell/{slug}/", get(shell_ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::bus::GroupBus;
    use crate::config::GatewayConfig;
    use crate::directory::{DisplayDirectory, MemoryDisplayDirectory};
    use crate::domain::SystemClock;
    use crate::liveness::MemoryHeartbeatStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    async fn app(config: GatewayConfig) -> Router {
        let Ok(state) = AppState::from_config(&config).await else {
            panic!("in-process state");
        };
        build_app(state)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let Ok(response) = app.oneshot(request).await else {
            panic!("router is infallible");
        };
        let status = response.status();
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body read failed");
        };
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn get(uri: &str) -> Request<Body> {
        let Ok(request) = Request::get(uri).body(Body::empty()) else {
            panic!("valid request");
        };
        request
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        let Ok(request) = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
        else {
            panic!("valid request");
        };
        request
    }

    fn config_with_displays(slugs: &[&str]) -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.known_displays = slugs
            .iter()
            .filter_map(|s| crate::domain::DisplaySlug::parse(s).ok())
            .collect();
        config
    }

    #[tokio::test]
    async fn health_reports_in_process_bus() {
        let (status, body) = send(app(GatewayConfig::default()).await, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["bus"], "in_process");
    }

    #[tokio::test]
    async fn lists_known_displays_offline() {
        let app = app(config_with_displays(&["lobby", "foyer"])).await;
        let (status, body) = send(app, get("/api/v1/displays")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["online"], 0);
        assert_eq!(body["data"][0]["slug"], "foyer");
        assert_eq!(body["data"][0]["online"], false);
        assert!(body["data"][0]["uuid"].is_string());
    }

    #[tokio::test]
    async fn unknown_display_is_404() {
        let (status, body) = send(app(GatewayConfig::default()).await, get("/api/v1/displays/ghost")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], 2001);
    }

    #[tokio::test]
    async fn invalid_slug_is_400() {
        let (status, body) = send(
            app(GatewayConfig::default()).await,
            get("/api/v1/displays/bad%20slug"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], 1001);
    }

    #[tokio::test]
    async fn reload_all_defaults_to_delayed() {
        let Ok(request) = Request::post("/api/v1/displays/reload").body(Body::empty()) else {
            panic!("valid request");
        };
        let (status, body) = send(app(GatewayConfig::default()).await, request).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["delayed"], true);
    }

    #[tokio::test]
    async fn reload_all_honours_body() {
        let (status, body) = send(
            app(GatewayConfig::default()).await,
            post_json("/api/v1/displays/reload", serde_json::json!({ "delayed": false })),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["delayed"], false);
    }

    #[tokio::test]
    async fn content_change_applies_threshold() {
        let mut config = GatewayConfig::default();
        config.reload_delay_threshold = 1;
        let (status, body) = send(
            app(config).await,
            post_json(
                "/api/v1/content/changed",
                serde_json::json!({ "entity": "playlist:7", "displays": ["a", "b"] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["groups"], 2);
        assert_eq!(body["delayed"], true);
    }

    #[tokio::test]
    async fn content_change_rejects_bad_slug() {
        let (status, body) = send(
            app(GatewayConfig::default()).await,
            post_json(
                "/api/v1/content/changed",
                serde_json::json!({ "entity": "view:1", "displays": ["ok", "not ok"] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], 1001);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (status, body) = send(app(GatewayConfig::default()).await, get("/api-docs/openapi.json")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/v1/content/changed"].is_object());
    }

    #[tokio::test]
    async fn display_upgrade_is_503_while_bus_listener_is_down() {
        let config = GatewayConfig::default();
        let directory: Arc<dyn DisplayDirectory> = Arc::new(MemoryDisplayDirectory::new());
        let state = AppState::new(
            GroupBus::in_process_with_listener(8, Arc::new(AtomicBool::new(false))),
            Arc::new(MemoryHeartbeatStore::new()),
            Arc::clone(&directory),
            Arc::new(SystemClock),
            &config,
        );
        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind ephemeral port");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("local addr");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, build_app(state)).await;
        });

        let result = tokio_tungstenite::connect_async(format!("ws://{addr}/ws/display/lobby")).await;
        let Err(tokio_tungstenite::tungstenite::Error::Http(response)) = result else {
            panic!("upgrade must be refused");
        };
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(matches!(directory.list().await, Ok(displays) if displays.is_empty()));
    }
}
