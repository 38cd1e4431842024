//! Headless render sessions for script-rendered pages.
//!
//! A session is one browser plus one page, created per dynamic fetch and
//! torn down when the fetch ends. The trait seam lets the dynamic strategy
//! run against a scripted page in tests.

mod config;
#[cfg(feature = "browser")]
mod session;

pub use config::{BrowserEngineConfig, BROWSER_URL_ENV, CHROME_ENV};
#[cfg(feature = "browser")]
pub use session::ChromiumSession;

use std::time::Duration;

use async_trait::async_trait;

use super::outcome::FetchFault;
use super::scroll::ScrollSurface;

/// An interactive page inside a running browser.
#[async_trait]
pub trait RenderSession: ScrollSurface {
    /// Navigate and wait for the load to finish, bounded by `timeout`.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), FetchFault>;

    async fn title(&self) -> Result<Option<String>, FetchFault>;

    /// Release the page, the browser process and its event loop.
    /// Failures are logged, never surfaced.
    async fn close(self: Box<Self>);
}

/// Creates render sessions presenting a given browser identity.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self, user_agent: &str) -> Result<Box<dyn RenderSession>, FetchFault>;
}

/// Launches (or connects to) Chrome through the DevTools protocol.
#[derive(Debug, Clone, Default)]
pub struct ChromiumLauncher {
    #[cfg_attr(not(feature = "browser"), allow(dead_code))]
    config: BrowserEngineConfig,
}

impl ChromiumLauncher {
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { config }
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    async fn launch(&self, user_agent: &str) -> Result<Box<dyn RenderSession>, FetchFault> {
        let session = ChromiumSession::open(&self.config, user_agent).await?;
        Ok(Box::new(session))
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
#[async_trait]
impl SessionLauncher for ChromiumLauncher {
    async fn launch(&self, _user_agent: &str) -> Result<Box<dyn RenderSession>, FetchFault> {
        Err(FetchFault::Unsupported(
            "Browser support not compiled. Rebuild with: cargo build --features browser"
                .to_string(),
        ))
    }
}

#[cfg(all(test, not(feature = "browser")))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_launch_without_browser_feature_is_unsupported() {
        let launcher = ChromiumLauncher::default();
        let err = launcher.launch("test-agent").await.err().unwrap();
        assert!(matches!(err, FetchFault::Unsupported(_)));
    }
}
