//! Render-and-scroll strategy.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::browser::{RenderSession, SessionLauncher};
use super::config::{StrategyKind, TargetConfig};
use super::extract::RecordExtractor;
use super::http_client::IdentityProvider;
use super::outcome::{FetchFault, FetchOutcome};
use super::scroll::{
    poll_until, Clock, PollSpec, ScrollConfig, ScrollController, ScrollOutcome, TokioClock,
};
use super::FetchStrategy;
use crate::models::{dedupe_by_title, rerank};

const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Drives a fresh render session per fetch.
///
/// The session is exclusive to one call and is closed before `fetch`
/// returns, whatever the outcome.
pub struct DynamicFetcher {
    identity: Arc<IdentityProvider>,
    launcher: Arc<dyn SessionLauncher>,
    clock: Arc<dyn Clock>,
    scroll: ScrollConfig,
}

impl DynamicFetcher {
    pub fn new(
        identity: Arc<IdentityProvider>,
        launcher: Arc<dyn SessionLauncher>,
        scroll: ScrollConfig,
    ) -> Self {
        Self {
            identity,
            launcher,
            clock: Arc::new(TokioClock),
            scroll,
        }
    }

    /// Replace the time source used for every pause.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Navigate, wait for first paint, scroll and return the final HTML.
    async fn render(
        &self,
        session: &dyn RenderSession,
        target: &TargetConfig,
    ) -> Result<String, FetchFault> {
        session.navigate(&target.url, target.navigation_timeout()).await?;
        if let Ok(Some(title)) = session.title().await {
            debug!("Page title: {}", title);
        }

        self.clock.sleep(target.initial_wait()).await;

        let ready_selector = target.ready_selector();
        let painted = poll_until(
            self.clock.as_ref(),
            PollSpec::new(READY_POLL_INTERVAL, target.ready_timeout()),
            move || async move {
                matches!(session.count(ready_selector).await, Ok(n) if n > 0)
            },
        )
        .await;
        if !painted {
            warn!(
                "No '{}' after {}s, continuing anyway",
                ready_selector,
                target.ready_timeout().as_secs()
            );
        }

        let scroll = target.scroll.as_ref().unwrap_or(&self.scroll);
        if !scroll.enabled {
            return session.snapshot().await;
        }

        let report = ScrollController::new(
            scroll,
            self.clock.as_ref(),
            &target.extraction.item_selector,
        )
        .run(session)
        .await?;

        if report.outcome == ScrollOutcome::Exhausted {
            warn!(
                "Scrolling {} stopped at the attempt ceiling with {} items",
                target.url, report.final_count
            );
        }
        Ok(report.snapshot)
    }
}

#[async_trait]
impl FetchStrategy for DynamicFetcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Dynamic
    }

    async fn fetch(&self, target: &TargetConfig, extractor: &RecordExtractor) -> FetchOutcome {
        let user_agent = self.identity.identity();
        let session = match self.launcher.launch(&user_agent).await {
            Ok(session) => session,
            Err(fault) => {
                warn!("Could not start render session: {}", fault);
                return FetchOutcome::Fault(fault);
            }
        };

        let rendered = self.render(session.as_ref(), target).await;
        session.close().await;

        let html = match rendered {
            Ok(html) => html,
            Err(fault) => {
                warn!("Dynamic fetch of {} failed: {}", target.url, fault);
                return FetchOutcome::Fault(fault);
            }
        };

        let extracted = extractor.extract_html(&html);
        let extracted_count = extracted.len();
        let mut records = dedupe_by_title(extracted);
        rerank(&mut records);
        info!(
            "Dynamic fetch extracted {} records, {} after removing duplicates",
            extracted_count,
            records.len()
        );

        FetchOutcome::from_records(records)
    }
}
