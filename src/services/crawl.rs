//! Crawl orchestration: primary strategy, fallback, envelope.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{Config, ConfigError};
use crate::models::CrawlResult;
use crate::scrapers::{
    ChromiumLauncher, DynamicFetcher, FetchOutcome, FetchStrategy, IdentityProvider,
    RecordExtractor, StaticFetcher, StrategyKind, TargetConfig,
};

/// Runs crawls against configured targets.
///
/// Holds no per-crawl state: concurrent crawls share only the strategies,
/// and each dynamic fetch opens its own render session.
pub struct Crawler {
    targets: HashMap<String, TargetConfig>,
    static_fetch: Arc<dyn FetchStrategy>,
    dynamic_fetch: Arc<dyn FetchStrategy>,
}

impl Crawler {
    pub fn new(
        targets: HashMap<String, TargetConfig>,
        static_fetch: Arc<dyn FetchStrategy>,
        dynamic_fetch: Arc<dyn FetchStrategy>,
    ) -> Self {
        Self {
            targets,
            static_fetch,
            dynamic_fetch,
        }
    }

    /// Production wiring: one shared identity pool, HTTP and Chrome strategies.
    pub fn from_config(config: &Config) -> Self {
        let identity = Arc::new(IdentityProvider::new(&config.identity));
        let launcher = Arc::new(ChromiumLauncher::new(config.browser.clone()));

        Self::new(
            config.targets.clone(),
            Arc::new(StaticFetcher::new(identity.clone())),
            Arc::new(DynamicFetcher::new(
                identity,
                launcher,
                config.scroll.clone(),
            )),
        )
    }

    pub fn target(&self, id: &str) -> Result<&TargetConfig, ConfigError> {
        self.targets
            .get(id)
            .ok_or_else(|| ConfigError::UnknownTarget(id.to_string()))
    }

    /// Target IDs with their primary strategy, sorted by ID.
    pub fn targets(&self) -> Vec<(&str, &TargetConfig)> {
        let mut targets: Vec<(&str, &TargetConfig)> = self
            .targets
            .iter()
            .map(|(id, target)| (id.as_str(), target))
            .collect();
        targets.sort_unstable_by_key(|(id, _)| *id);
        targets
    }

    fn strategy(&self, kind: StrategyKind) -> &dyn FetchStrategy {
        match kind {
            StrategyKind::Static => self.static_fetch.as_ref(),
            StrategyKind::Dynamic => self.dynamic_fetch.as_ref(),
        }
    }

    /// Crawl a target by ID using its configured primary strategy.
    pub async fn crawl(&self, id: &str) -> Result<CrawlResult, ConfigError> {
        self.crawl_with(id, None).await
    }

    /// Crawl a target by ID, optionally overriding which strategy goes first.
    pub async fn crawl_with(
        &self,
        id: &str,
        primary: Option<StrategyKind>,
    ) -> Result<CrawlResult, ConfigError> {
        let target = self.target(id)?;
        let extractor = RecordExtractor::new(&target.extraction, target.base_url())?;
        let primary = primary.unwrap_or(target.primary);

        Ok(self.run(id, target, &extractor, primary).await)
    }

    /// Primary strategy, then the other one only if the first came back empty.
    async fn run(
        &self,
        id: &str,
        target: &TargetConfig,
        extractor: &RecordExtractor,
        primary: StrategyKind,
    ) -> CrawlResult {
        info!("Crawling '{}' ({} first)", id, primary);

        let strategy = self.strategy(primary);
        let first = strategy.fetch(target, extractor).await;
        if !first.is_empty() {
            info!("'{}': {} via {}", id, first.describe(), strategy.kind());
            return CrawlResult::success(first.into_records());
        }

        let secondary = primary.alternate();
        warn!(
            "'{}': {} via {}, falling back to {}",
            id,
            first.describe(),
            primary,
            secondary
        );

        let strategy = self.strategy(secondary);
        let second = strategy.fetch(target, extractor).await;
        if !second.is_empty() {
            info!("'{}': {} via {}", id, second.describe(), strategy.kind());
            return CrawlResult::success(second.into_records());
        }

        warn!("'{}': both strategies came back empty", id);
        CrawlResult::error(failure_message(
            &target.name_or(id),
            (primary, &first),
            (secondary, &second),
        ))
    }
}

fn failure_message(
    name: &str,
    (first_kind, first): (StrategyKind, &FetchOutcome),
    (second_kind, second): (StrategyKind, &FetchOutcome),
) -> String {
    format!(
        "No records found for {} ({}: {}; {}: {})",
        name,
        first_kind,
        first.describe(),
        second_kind,
        second.describe()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::{builtin_targets, FetchFault};

    #[test]
    fn test_failure_message_names_both_strategies() {
        let message = failure_message(
            "KMDB",
            (
                StrategyKind::Static,
                &FetchOutcome::Fault(FetchFault::Timeout("10s".to_string())),
            ),
            (StrategyKind::Dynamic, &FetchOutcome::Empty),
        );
        assert_eq!(
            message,
            "No records found for KMDB (static: request timed out: 10s; dynamic: no records found)"
        );
    }

    #[tokio::test]
    async fn test_unknown_target_is_config_error() {
        let config = Config::default_with_env();
        let crawler = Crawler::from_config(&config);
        assert!(matches!(
            crawler.crawl("diary").await,
            Err(ConfigError::UnknownTarget(_))
        ));
        assert_eq!(
            crawler
                .targets()
                .iter()
                .map(|(id, _)| *id)
                .collect::<Vec<_>>(),
            ["movie", "netflix"]
        );
    }

    #[tokio::test]
    async fn test_invalid_selector_is_config_error() {
        let mut targets = builtin_targets();
        if let Some(movie) = targets.get_mut("movie") {
            movie.extraction.item_selector = "tr[".to_string();
        }
        let config = Config {
            targets,
            ..Config::default()
        };
        let crawler = Crawler::from_config(&config);
        let result = crawler.crawl("movie").await;
        assert!(matches!(result, Err(ConfigError::Selector { .. })));
    }
}
