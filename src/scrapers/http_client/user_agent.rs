//! Client identity: randomized user agents and default request headers.

use std::sync::OnceLock;

use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONNECTION, REFERER,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use tracing::debug;

use crate::config::IdentityConfig;

/// Returned whenever the pool cannot supply a usable entry.
pub const FALLBACK_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8";

pub const DEFAULT_ACCEPT_LANGUAGE: &str = "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7";

/// Real browser user agents (updated Nov 2024).
pub const BROWSER_USER_AGENTS: &[&str] = &[
    // Chrome on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    // Chrome on Mac
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    // Firefox on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:132.0) Gecko/20100101 Firefox/132.0",
    // Firefox on Mac
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
    // Safari on Mac
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.6 Safari/605.1.15",
    // Edge on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
];

/// Supplies browser-like identification for HTTP requests and browser sessions.
///
/// Built once at startup and shared behind an `Arc`. The user agent pool is
/// resolved lazily on first use and never changes afterwards.
#[derive(Debug)]
pub struct IdentityProvider {
    custom_agents: Vec<String>,
    accept_language: String,
    pool: OnceLock<Vec<String>>,
}

impl IdentityProvider {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            custom_agents: config.user_agents.clone(),
            accept_language: config
                .accept_language
                .clone()
                .unwrap_or_else(|| DEFAULT_ACCEPT_LANGUAGE.to_string()),
            pool: OnceLock::new(),
        }
    }

    fn pool(&self) -> &[String] {
        self.pool.get_or_init(|| {
            let custom: Vec<String> = self
                .custom_agents
                .iter()
                .map(|ua| ua.trim().to_string())
                .filter(|ua| !ua.is_empty())
                .collect();
            if custom.is_empty() {
                BROWSER_USER_AGENTS.iter().map(|ua| ua.to_string()).collect()
            } else {
                debug!("Using {} configured user agents", custom.len());
                custom
            }
        })
    }

    /// Pick a user agent from the pool. Never fails.
    pub fn identity(&self) -> String {
        let pool = self.pool();
        if pool.is_empty() {
            return FALLBACK_USER_AGENT.to_string();
        }
        pool.get(random_index(pool.len()))
            .cloned()
            .unwrap_or_else(|| FALLBACK_USER_AGENT.to_string())
    }

    /// Default browser-like request headers with a fresh user agent.
    pub fn headers(&self, referer: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let agent = HeaderValue::from_str(&self.identity())
            .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_USER_AGENT));
        headers.insert(USER_AGENT, agent);
        headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&self.accept_language)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE)),
        );
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, br"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        if let Some(referer) = referer.filter(|r| !r.is_empty()) {
            match HeaderValue::from_str(referer) {
                Ok(value) => {
                    headers.insert(REFERER, value);
                }
                Err(_) => debug!("Skipping invalid referer header: {}", referer),
            }
        }

        headers
    }
}

impl Default for IdentityProvider {
    fn default() -> Self {
        Self::new(&IdentityConfig::default())
    }
}

fn random_index(len: usize) -> usize {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos() as usize)
        .unwrap_or(0);
    nanos % len
}
