//! Record acquisition: page retrieval strategies and extraction.

pub mod browser;
pub mod config;
mod dynamic_fetch;
mod extract;
mod http_client;
mod outcome;
pub mod scroll;
mod static_fetch;
#[cfg(test)]
pub(crate) mod testing;

pub use browser::{BrowserEngineConfig, ChromiumLauncher, RenderSession, SessionLauncher};
pub use config::{
    builtin_targets, ExtractionConfig, FieldConfig, LinkConfig, StrategyKind, TargetConfig,
};
pub use dynamic_fetch::DynamicFetcher;
pub use extract::RecordExtractor;
pub use http_client::{
    HttpClient, IdentityProvider, BROWSER_USER_AGENTS, DEFAULT_ACCEPT_LANGUAGE,
    FALLBACK_USER_AGENT,
};
pub use outcome::{FetchFault, FetchOutcome};
pub use scroll::{ScrollConfig, ScrollController, ScrollOutcome, ScrollReport};
pub use static_fetch::StaticFetcher;

use async_trait::async_trait;

/// One way of turning a target into records.
///
/// Implementations never fail outright: every fault is folded into
/// [`FetchOutcome::Fault`] so the caller can move on to a fallback.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn fetch(&self, target: &TargetConfig, extractor: &RecordExtractor) -> FetchOutcome;
}
