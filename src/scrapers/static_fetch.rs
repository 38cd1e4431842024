//! Direct-fetch-and-parse strategy.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::Html;
use tracing::{debug, info, warn};

use super::config::{StrategyKind, TargetConfig};
use super::extract::RecordExtractor;
use super::http_client::{HttpClient, IdentityProvider};
use super::outcome::FetchOutcome;
use super::FetchStrategy;

/// One GET with browser-like headers, then extraction.
pub struct StaticFetcher {
    identity: Arc<IdentityProvider>,
}

impl StaticFetcher {
    pub fn new(identity: Arc<IdentityProvider>) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl FetchStrategy for StaticFetcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Static
    }

    async fn fetch(&self, target: &TargetConfig, extractor: &RecordExtractor) -> FetchOutcome {
        let client = match HttpClient::new(
            self.identity.clone(),
            target.connect_timeout(),
            target.request_timeout(),
        ) {
            Ok(client) => client.with_referer(target.referer.clone()),
            Err(fault) => return FetchOutcome::Fault(fault),
        };

        info!("Fetching {}", target.url);
        let body = match client.get_text(&target.url).await {
            Ok(body) => body,
            Err(fault) => {
                warn!("Static fetch of {} failed: {}", target.url, fault);
                return FetchOutcome::Fault(fault);
            }
        };
        debug!("Received {} bytes", body.len());

        let document = Html::parse_document(&body);
        let candidates = extractor.candidate_count(&document);
        let records = extractor.extract(&document);
        info!(
            "Static fetch found {} candidates, kept {} records",
            candidates,
            records.len()
        );

        FetchOutcome::from_records(records)
    }
}
