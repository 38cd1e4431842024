//! Headless browser settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Overrides the DevTools endpoint (`remote_url`).
pub const BROWSER_URL_ENV: &str = "LISTCRAWL_BROWSER_URL";
/// Overrides the Chrome executable path.
pub const CHROME_ENV: &str = "LISTCRAWL_CHROME";

/// How render sessions are launched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserEngineConfig {
    /// Run in headless mode (default: true).
    #[serde(default = "default_headless")]
    pub headless: bool,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// CDP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Chrome executable. Discovered from common install paths when unset.
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to an existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,
}

pub fn default_headless() -> bool {
    true
}

pub fn default_window_width() -> u32 {
    1920
}

pub fn default_window_height() -> u32 {
    1080
}

pub fn default_timeout() -> u64 {
    30
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            timeout: default_timeout(),
            chrome_args: Vec::new(),
            executable: None,
            remote_url: None,
        }
    }
}

impl BrowserEngineConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Apply `LISTCRAWL_BROWSER_URL` and `LISTCRAWL_CHROME` if set.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(BROWSER_URL_ENV).ok(),
            std::env::var(CHROME_ENV).ok(),
        )
    }

    fn with_overrides(mut self, remote_url: Option<String>, chrome: Option<String>) -> Self {
        if let Some(url) = remote_url.filter(|u| !u.trim().is_empty()) {
            self.remote_url = Some(url);
        }
        if let Some(path) = chrome.filter(|p| !p.trim().is_empty()) {
            self.executable = Some(PathBuf::from(shellexpand::tilde(&path).into_owned()));
        }
        self
    }
}
