//! HTTP route definitions.

mod health;
mod lists;
mod session;

use crate::AppState;
use axum::Router;

/// Create all application routes.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(lists::routes())
        .merge(session::routes())
}
