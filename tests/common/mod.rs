#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use listcrawl::models::Record;
use listcrawl::scrapers::{
    builtin_targets, FetchFault, FetchOutcome, FetchStrategy, RecordExtractor, StrategyKind,
    TargetConfig,
};

pub const KMDB_PAGE: &str = r#"
<html><body>
<table><tbody>
  <tr>
    <td class="num">1</td>
    <td class="title"><a class="ti">There Will Be Blood</a></td>
    <td class="fcGray1">Paul Thomas Anderson</td>
    <td><a href="https://www.koreafilm.or.kr/library/vod/1"><span>VOD</span></a></td>
    <td class="fcGray1">2007</td>
  </tr>
  <tr>
    <td class="num">2</td>
    <td class="title"><a class="ti">Spirited Away</a></td>
    <td class="fcGray1">Hayao Miyazaki</td>
    <td></td>
    <td class="fcGray1">2001</td>
  </tr>
  <tr>
    <td class="num">3</td>
    <td class="title"></td>
  </tr>
  <tr>
    <td class="num">4</td>
    <td class="title"><a class="ti">Children of Men</a></td>
    <td class="fcGray1">Alfonso Cuarón</td>
    <td></td>
    <td class="fcGray1">2006</td>
  </tr>
</tbody></table>
</body></html>
"#;

/// Serve `router` on an ephemeral local port.
pub async fn spawn_fixture(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// The built-in `movie` target pointed at `url`.
pub fn movie_target(url: String) -> TargetConfig {
    let mut target = builtin_targets().remove("movie").unwrap();
    target.url = url;
    target.referer = Some("https://www.kmdb.or.kr/".to_string());
    target
}

pub fn extractor_for(target: &TargetConfig) -> RecordExtractor {
    RecordExtractor::new(&target.extraction, target.base_url()).unwrap()
}

pub fn titled(titles: &[&str]) -> Vec<Record> {
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| Record::new(i + 1, *title))
        .collect()
}

/// What a scripted strategy hands back.
#[derive(Clone)]
pub enum Script {
    Records(Vec<Record>),
    Empty,
    Timeout,
}

/// Strategy that replays a fixed outcome and counts its calls.
pub struct ScriptedStrategy {
    kind: StrategyKind,
    script: Script,
    calls: AtomicUsize,
    seen_urls: Mutex<Vec<String>>,
}

impl ScriptedStrategy {
    pub fn new(kind: StrategyKind, script: Script) -> Arc<Self> {
        Arc::new(Self {
            kind,
            script,
            calls: AtomicUsize::new(0),
            seen_urls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_urls(&self) -> Vec<String> {
        self.seen_urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FetchStrategy for ScriptedStrategy {
    fn kind(&self) -> StrategyKind {
        self.kind
    }

    async fn fetch(&self, target: &TargetConfig, _extractor: &RecordExtractor) -> FetchOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_urls.lock().unwrap().push(target.url.clone());
        match self.script {
            Script::Records(ref records) => FetchOutcome::from_records(records.clone()),
            Script::Empty => FetchOutcome::Empty,
            Script::Timeout => FetchOutcome::Fault(FetchFault::Timeout(
                "operation timed out after 10s".to_string(),
            )),
        }
    }
}

pub fn builtin_map() -> HashMap<String, TargetConfig> {
    builtin_targets()
}
