//! Request handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use super::AppState;
use crate::config::ConfigError;
use crate::models::CrawlResult;

fn envelope(status: StatusCode, result: CrawlResult) -> Response {
    (status, Json(result)).into_response()
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Configured targets with their primary strategy.
pub async fn list_targets(State(state): State<AppState>) -> impl IntoResponse {
    let targets: Vec<_> = state
        .crawler
        .targets()
        .into_iter()
        .map(|(id, target)| {
            serde_json::json!({
                "id": id,
                "name": target.name_or(id),
                "url": target.url,
                "primary": target.primary,
            })
        })
        .collect();

    Json(targets).into_response()
}

/// Run one crawl in its own task and return the envelope.
///
/// An empty crawl is still a 200 with an `error` envelope; only unknown
/// targets and broken target config map to HTTP errors.
pub async fn crawl_target(
    State(state): State<AppState>,
    Path(target): Path<String>,
) -> impl IntoResponse {
    let crawler = state.crawler.clone();
    let id = target.clone();
    let handle = tokio::spawn(async move { crawler.crawl(&id).await });

    match handle.await {
        Ok(Ok(result)) => envelope(StatusCode::OK, result),
        Ok(Err(ConfigError::UnknownTarget(id))) => {
            warn!("Crawl requested for unknown target '{}'", id);
            envelope(
                StatusCode::NOT_FOUND,
                CrawlResult::error(format!("Unknown target '{}'", id)),
            )
        }
        Ok(Err(e)) => {
            error!("Target '{}' is misconfigured: {}", target, e);
            envelope(
                StatusCode::INTERNAL_SERVER_ERROR,
                CrawlResult::error(e.to_string()),
            )
        }
        Err(e) => {
            error!("Crawl task for '{}' failed: {}", target, e);
            envelope(
                StatusCode::INTERNAL_SERVER_ERROR,
                CrawlResult::error(format!("Crawl of '{}' aborted", target)),
            )
        }
    }
}
