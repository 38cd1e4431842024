mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use common::{extractor_for, movie_target, spawn_fixture, KMDB_PAGE};
use listcrawl::config::IdentityConfig;
use listcrawl::scrapers::{
    FetchFault, FetchOutcome, FetchStrategy, IdentityProvider, StaticFetcher, BROWSER_USER_AGENTS,
};

fn fetcher() -> StaticFetcher {
    StaticFetcher::new(Arc::new(IdentityProvider::new(&IdentityConfig::default())))
}

#[tokio::test]
async fn test_table_page_yields_ranked_records() {
    let router = Router::new().route("/list", get(|| async { Html(KMDB_PAGE) }));
    let addr = spawn_fixture(router).await;
    let target = movie_target(format!("http://{}/list", addr));

    let outcome = fetcher().fetch(&target, &extractor_for(&target)).await;

    let records = outcome.into_records();
    assert_eq!(records.len(), 3);
    assert_eq!(
        records.iter().map(|r| r.rank).collect::<Vec<_>>(),
        [1, 2, 3]
    );
    assert_eq!(records[2].title, "Children of Men");
    assert_eq!(records[2].attribute("year"), Some("2006"));
    assert_eq!(records[0].links.as_ref().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_requests_carry_browser_identity() {
    let captured: Arc<Mutex<Option<HeaderMap>>> = Arc::new(Mutex::new(None));
    let sink = captured.clone();
    let router = Router::new().route(
        "/list",
        get(move |headers: HeaderMap| {
            let sink = sink.clone();
            async move {
                *sink.lock().unwrap() = Some(headers);
                Html(KMDB_PAGE)
            }
        }),
    );
    let addr = spawn_fixture(router).await;
    let target = movie_target(format!("http://{}/list", addr));

    fetcher().fetch(&target, &extractor_for(&target)).await;

    let headers = captured.lock().unwrap().take().unwrap();
    let agent = headers["user-agent"].to_str().unwrap();
    assert!(BROWSER_USER_AGENTS.contains(&agent), "{}", agent);
    assert_eq!(headers["referer"], "https://www.kmdb.or.kr/");
    assert!(headers["accept-language"]
        .to_str()
        .unwrap()
        .starts_with("ko-KR"));
}

#[tokio::test]
async fn test_not_found_is_status_fault() {
    let router = Router::new().route("/list", get(|| async { StatusCode::NOT_FOUND }));
    let addr = spawn_fixture(router).await;
    let target = movie_target(format!("http://{}/list", addr));

    let outcome = fetcher().fetch(&target, &extractor_for(&target)).await;

    assert!(matches!(
        outcome.fault(),
        Some(FetchFault::Status { status: 404, .. })
    ));
    assert!(outcome.into_records().is_empty());
}

#[tokio::test]
async fn test_slow_server_hits_request_timeout() {
    let router = Router::new().route(
        "/list",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Html(KMDB_PAGE)
        }),
    );
    let addr = spawn_fixture(router).await;
    let mut target = movie_target(format!("http://{}/list", addr));
    target.request_timeout_secs = 1;

    let outcome = fetcher().fetch(&target, &extractor_for(&target)).await;

    assert!(matches!(outcome.fault(), Some(FetchFault::Timeout(_))));
}

#[tokio::test]
async fn test_page_without_rows_is_empty() {
    let router = Router::new().route(
        "/list",
        get(|| async { Html("<html><body><p>Service unavailable</p></body></html>") }),
    );
    let addr = spawn_fixture(router).await;
    let target = movie_target(format!("http://{}/list", addr));

    let outcome = fetcher().fetch(&target, &extractor_for(&target)).await;

    assert!(matches!(outcome, FetchOutcome::Empty));
}

#[tokio::test]
async fn test_refused_connection_is_network_fault() {
    // bind then drop to get a port with nothing listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let target = movie_target(format!("http://{}/list", addr));

    let outcome = fetcher().fetch(&target, &extractor_for(&target)).await;

    assert!(matches!(outcome.fault(), Some(FetchFault::Network(_))));
}
