//! HTTP client with browser-like identity and explicit timeouts.

mod user_agent;

pub use user_agent::{
    IdentityProvider, BROWSER_USER_AGENTS, DEFAULT_ACCEPT_LANGUAGE, FALLBACK_USER_AGENT,
};

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::debug;

use super::outcome::FetchFault;

/// HTTP client bound to one target's timeout budget.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    identity: Arc<IdentityProvider>,
    referer: Option<String>,
}

impl HttpClient {
    /// Create a client with connect and total request timeouts.
    pub fn new(
        identity: Arc<IdentityProvider>,
        connect_timeout: Duration,
        timeout: Duration,
    ) -> Result<Self, FetchFault> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| FetchFault::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            identity,
            referer: None,
        })
    }

    /// Set the Referer header for requests.
    pub fn with_referer(mut self, referer: Option<String>) -> Self {
        self.referer = referer;
        self
    }

    /// GET a page and return its body. Non-2xx statuses are faults.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchFault> {
        let headers = self.identity.headers(self.referer.as_deref());

        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(FetchFault::from_reqwest)?;

        let status = response.status();
        debug!(
            "GET {} -> {} in {}ms",
            url,
            status.as_u16(),
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            return Err(FetchFault::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchFault::Timeout(e.to_string())
            } else {
                FetchFault::Body(e.to_string())
            }
        })
    }
}
