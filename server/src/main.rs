//! Console Server - list service for the access-control admin console.
//!
//! Fetches trip reports, supervisors, audit logs and vendors from the
//! access-control REST backend and serves them to console clients with
//! search, filters and pagination kept per session. Refresh failures are
//! pushed to the session's WebSocket connections as notices.

mod auth;
mod catalog;
mod config;
mod error;
mod format;
mod handlers;
mod notify;
mod routes;
mod session;
mod upstream;
mod websocket;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::session::{spawn_idle_sweep, SessionRegistry};
use crate::upstream::{UpstreamClient, UpstreamError};
use crate::websocket::ConnectionManager;
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub source: Arc<UpstreamClient>,
    pub sessions: Arc<SessionRegistry>,
    pub conn_manager: Arc<ConnectionManager>,
    pub catalog: Arc<Catalog>,
}

impl AppState {
    /// Build state for `config` with the built-in list catalog.
    pub fn new(config: Config) -> Result<Self, UpstreamError> {
        let source = UpstreamClient::new(&config.upstream_url, config.upstream_timeout)?;

        Ok(Self {
            sessions: SessionRegistry::new_shared(config.default_page_size),
            source: Arc::new(source),
            conn_manager: ConnectionManager::new_shared(),
            catalog: Arc::new(Catalog::builtin()),
            config: Arc::new(config),
        })
    }
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "console_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting Console Server on {}:{}", config.host, config.port);
    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config)?;
    tracing::info!(
        upstream = state.source.base_url(),
        require_auth = state.config.require_auth,
        "Upstream configured"
    );

    spawn_idle_sweep(state.sessions.clone(), state.config.session_idle);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_state(require_auth: bool) -> AppState {
        let config = Config::from_lookup(|key| match key {
            // Nothing listens on port 1, so refreshes fail fast.
            "UPSTREAM_URL" => Some("http://127.0.0.1:1".to_string()),
            "UPSTREAM_TIMEOUT_SECS" => Some("2".to_string()),
            "REQUIRE_AUTH" => Some(require_auth.to_string()),
            _ => None,
        })
        .unwrap();
        AppState::new(config).unwrap()
    }

    async fn send(
        state: &AppState,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", "Bearer test-token");
        let body = match body {
            Some(body) => {
                request = request.header("content-type", "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = app(state.clone())
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health() {
        let state = test_state(false);
        let (status, body) = send(&state, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn list_catalog() {
        let state = test_state(false);
        let (status, body) = send(&state, "GET", "/lists", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(["reports", "supervisors", "audit-logs", "vendors"]));
    }

    #[tokio::test]
    async fn unknown_list_is_not_found() {
        let state = test_state(false);
        let (status, body) = send(&state, "GET", "/lists/invoices", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Unknown list: invoices");
    }

    #[tokio::test]
    async fn empty_list_view() {
        let state = test_state(false);
        let (status, body) = send(&state, "GET", "/lists/reports", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalPages"], 1);
        assert_eq!(body["query"]["page"]["itemsPerPage"], 10);
        assert_eq!(body["query"]["filters"]["siteId"], "all");
    }

    #[tokio::test]
    async fn query_changes_persist_per_session() {
        let state = test_state(false);

        let (status, _) = send(
            &state,
            "PUT",
            "/lists/vendors/page-size",
            Some(json!({"itemsPerPage": 25})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(
            &state,
            "PUT",
            "/lists/vendors/search",
            Some(json!({"text": "  Acme "})),
        )
        .await;
        assert_eq!(body["query"]["searchText"], "  Acme ");

        let (_, body) = send(&state, "GET", "/lists/vendors", None).await;
        assert_eq!(body["query"]["page"]["itemsPerPage"], 25);

        let (status, body) = send(
            &state,
            "PUT",
            "/lists/vendors/filters/region",
            Some(json!({"value": "west"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"], false);

        let (_, body) = send(&state, "DELETE", "/lists/vendors/query", None).await;
        assert_eq!(body["query"]["searchText"], "");
    }

    #[tokio::test]
    async fn zero_page_size_is_rejected() {
        let state = test_state(false);
        let (status, _) = send(
            &state,
            "PUT",
            "/lists/reports/page-size",
            Some(json!({"itemsPerPage": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&state, "GET", "/lists/reports/stats", None).await;
        assert_eq!(body["totalRecords"], 0);
    }

    #[tokio::test]
    async fn unreachable_upstream_is_bad_gateway() {
        let state = test_state(false);
        let (status, body) = send(&state, "POST", "/lists/reports/refresh", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Upstream request failed");

        let (status, _) = send(&state, "GET", "/lists/reports", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_token_rejected_when_required() {
        let state = test_state(true);
        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri("/lists/reports")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn end_session() {
        let state = test_state(false);
        send(&state, "GET", "/lists/reports", None).await;
        assert_eq!(state.sessions.session_count(), 1);

        let (status, _) = send(&state, "DELETE", "/session", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(state.sessions.session_count(), 0);
    }
}
