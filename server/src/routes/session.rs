//! Session lifecycle and live notice routes.

use axum::{
    extract::{ws::WebSocketUpgrade, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::Response,
    routing::{delete, get},
    Router,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::handlers::handle_websocket_connection;
use crate::AppState;

/// Create session routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/session", delete(end_session_handler))
        .route("/ws", get(ws_handler))
}

/// Query parameters of the WebSocket handshake.
#[derive(Debug, Deserialize)]
struct WsParams {
    token: Option<String>,
}

/// DELETE /session - Log out: drop the session's lists and credentials.
async fn end_session_handler(State(state): State<AppState>, auth: AuthUser) -> StatusCode {
    state.sessions.end(&auth.session_id);
    StatusCode::NO_CONTENT
}

/// GET /ws - Upgrade to a notice stream for the caller's session.
///
/// Accepts the bearer token as `?token=` for clients that cannot set
/// headers on the handshake.
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<WsParams>,
) -> Result<Response, (StatusCode, &'static str)> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let auth = ws_caller(&state, header, params.token.as_deref())?;

    let conn_manager = state.conn_manager.clone();
    Ok(ws.on_upgrade(move |socket| {
        handle_websocket_connection(socket, conn_manager, auth.session_id)
    }))
}

/// The header wins when both a header and a query token are present.
fn ws_caller(
    state: &AppState,
    header: Option<&str>,
    token: Option<&str>,
) -> Result<AuthUser, (StatusCode, &'static str)> {
    match (header, token.map(str::trim).filter(|t| !t.is_empty())) {
        (None, Some(token)) => Ok(AuthUser::with_token(state, token)),
        _ => AuthUser::from_header(state, header),
    }
}
