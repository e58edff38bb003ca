//! List endpoint routes.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use console_engine::ListStats;

use crate::auth::AuthUser;
use crate::catalog::ResourceSpec;
use crate::error::{AppError, Result};
use crate::handlers::{
    handle_filter, handle_go_to_page, handle_page_size, handle_refresh, handle_reset,
    handle_search, handle_stats, handle_view, FilterRequest, FilterResponse, ListPage,
    PageRequest, PageSizeRequest, SearchRequest,
};
use crate::upstream::FetchHints;
use crate::AppState;

/// Create list routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/lists", get(catalog_handler))
        .route("/lists/{resource}", get(view_handler))
        .route("/lists/{resource}/refresh", post(refresh_handler))
        .route("/lists/{resource}/search", put(search_handler))
        .route("/lists/{resource}/filters/{key}", put(filter_handler))
        .route("/lists/{resource}/query", delete(reset_handler))
        .route("/lists/{resource}/page", put(page_handler))
        .route("/lists/{resource}/page-size", put(page_size_handler))
        .route("/lists/{resource}/stats", get(stats_handler))
}

fn resource<'a>(state: &'a AppState, name: &str) -> Result<&'a ResourceSpec> {
    state
        .catalog
        .get(name)
        .ok_or_else(|| AppError::NotFound(format!("Unknown list: {}", name)))
}

/// GET /lists - Names of the available lists.
async fn catalog_handler(State(state): State<AppState>) -> Json<Vec<&'static str>> {
    Json(state.catalog.names().collect())
}

/// GET /lists/{resource} - Current page.
async fn view_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(name): Path<String>,
) -> Result<Json<ListPage>> {
    let resource = resource(&state, &name)?;
    let session = state.sessions.session(&auth.session_id);
    Ok(Json(handle_view(&session, resource)?))
}

/// POST /lists/{resource}/refresh - Reload the snapshot from upstream.
///
/// Query parameters are forwarded to the upstream request.
async fn refresh_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(name): Path<String>,
    Query(hints): Query<FetchHints>,
) -> Result<Json<ListPage>> {
    let resource = resource(&state, &name)?;
    let session = state.sessions.session(&auth.session_id);
    let notifier = state.conn_manager.notifier_for(auth.session_id.clone());

    let page = handle_refresh(
        state.source.as_ref(),
        &session,
        resource,
        &hints,
        state.config.upstream_token.as_deref(),
        &notifier,
    )
    .await?;
    Ok(Json(page))
}

/// PUT /lists/{resource}/search
async fn search_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(name): Path<String>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<ListPage>> {
    let resource = resource(&state, &name)?;
    let session = state.sessions.session(&auth.session_id);
    Ok(Json(handle_search(&session, resource, request)?))
}

/// PUT /lists/{resource}/filters/{key}
async fn filter_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((name, key)): Path<(String, String)>,
    Json(request): Json<FilterRequest>,
) -> Result<Json<FilterResponse>> {
    let resource = resource(&state, &name)?;
    let session = state.sessions.session(&auth.session_id);
    Ok(Json(handle_filter(&session, resource, &key, request)?))
}

/// DELETE /lists/{resource}/query - Clear search and filters.
async fn reset_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(name): Path<String>,
) -> Result<Json<ListPage>> {
    let resource = resource(&state, &name)?;
    let session = state.sessions.session(&auth.session_id);
    Ok(Json(handle_reset(&session, resource)?))
}

/// PUT /lists/{resource}/page
async fn page_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(name): Path<String>,
    Json(request): Json<PageRequest>,
) -> Result<Json<ListPage>> {
    let resource = resource(&state, &name)?;
    let session = state.sessions.session(&auth.session_id);
    Ok(Json(handle_go_to_page(&session, resource, request)?))
}

/// PUT /lists/{resource}/page-size
async fn page_size_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(name): Path<String>,
    Json(request): Json<PageSizeRequest>,
) -> Result<Json<ListPage>> {
    let resource = resource(&state, &name)?;
    let session = state.sessions.session(&auth.session_id);
    Ok(Json(handle_page_size(&session, resource, request)?))
}

/// GET /lists/{resource}/stats
async fn stats_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(name): Path<String>,
) -> Result<Json<ListStats>> {
    let resource = resource(&state, &name)?;
    let session = state.sessions.session(&auth.session_id);
    Ok(Json(handle_stats(&session, resource)?))
}
