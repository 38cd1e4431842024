//! Router configuration for the web server.

use axum::{routing::get, Router};

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/crawler/targets", get(handlers::list_targets))
        .route("/crawler/:target", get(handlers::crawl_target))
        .with_state(state)
}
