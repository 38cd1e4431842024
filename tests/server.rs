mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{builtin_map, titled, Script, ScriptedStrategy};
use listcrawl::scrapers::StrategyKind;
use listcrawl::server::{create_router, AppState};
use listcrawl::Crawler;
use tower::ServiceExt;

fn app(static_script: Script, dynamic_script: Script) -> axum::Router {
    let crawler = Crawler::new(
        builtin_map(),
        ScriptedStrategy::new(StrategyKind::Static, static_script),
        ScriptedStrategy::new(StrategyKind::Dynamic, dynamic_script),
    );
    create_router(AppState {
        crawler: Arc::new(crawler),
    })
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get_json(app(Script::Empty, Script::Empty), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_crawl_returns_success_envelope() {
    let app = app(
        Script::Records(titled(&["There Will Be Blood", "Spirited Away"])),
        Script::Empty,
    );

    let (status, body) = get_json(app, "/crawler/movie").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["rank"], 1);
    assert_eq!(body["data"][1]["title"], "Spirited Away");
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn test_crawl_with_nothing_found_is_error_envelope() {
    let (status, body) = get_json(app(Script::Timeout, Script::Empty), "/crawler/netflix").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert_eq!(body["count"], 0);
    assert!(body["message"].as_str().unwrap().contains("No records"));
}

#[tokio::test]
async fn test_unknown_target_is_not_found() {
    let (status, body) = get_json(app(Script::Empty, Script::Empty), "/crawler/diary").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert_eq!(body["data"], serde_json::json!([]));
}

#[tokio::test]
async fn test_lists_targets() {
    let (status, body) = get_json(app(Script::Empty, Script::Empty), "/crawler/targets").await;

    assert_eq!(status, StatusCode::OK);
    let targets = body.as_array().unwrap();
    assert_eq!(targets.len(), 2);
    assert_eq!(targets[0]["id"], "movie");
    assert_eq!(targets[0]["primary"], "static");
    assert_eq!(targets[1]["primary"], "dynamic");
}
