//! Chrome-backed render session.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::handler::{Handler, HandlerConfig};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{BrowserEngineConfig, RenderSession};
use crate::scrapers::outcome::FetchFault;
use crate::scrapers::scroll::{PageMetrics, ScrollSurface};

/// Common Chrome executable paths to check.
const CHROME_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/google/chrome/google-chrome",
];

const LAUNCH_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-blink-features=AutomationControlled",
    "--no-first-run",
    "--no-default-browser-check",
];

const METRICS_SCRIPT: &str = r#"({
    offset: Math.max(0, Math.round(window.pageYOffset || document.documentElement.scrollTop || 0)),
    extent: Math.max(0, Math.round(document.body ? document.body.scrollHeight : 0)),
    viewport: Math.max(0, Math.round(window.innerHeight || 0))
})"#;

const SCROLL_BOTTOM_SCRIPT: &str =
    "(() => { window.scrollTo(0, document.body ? document.body.scrollHeight : 0); return true; })()";

const SCROLL_EVENTS_SCRIPT: &str = r#"(() => {
    window.dispatchEvent(new Event('scroll'));
    window.dispatchEvent(new WheelEvent('wheel', { deltaY: 100 }));
    return true;
})()"#;

fn session_fault(context: &str, err: impl std::fmt::Display) -> FetchFault {
    FetchFault::Session(format!("{}: {}", context, err))
}

/// One Chrome page plus the browser that hosts it.
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    /// Whether this session launched the browser (vs. connected to one).
    owned: bool,
}

impl ChromiumSession {
    /// Start a browser, open a blank page and apply identity and viewport.
    pub async fn open(config: &BrowserEngineConfig, user_agent: &str) -> Result<Self, FetchFault> {
        let (mut browser, handler, owned) = match config.remote_url {
            Some(ref url) => {
                let (browser, handler) = connect_remote(config, url).await?;
                (browser, handler, false)
            }
            None => {
                let (browser, handler) = launch_local(config).await?;
                (browser, handler, true)
            }
        };
        let handler = spawn_handler(handler);

        match prepare_page(&browser, config, user_agent).await {
            Ok(page) => Ok(Self {
                browser,
                page,
                handler,
                owned,
            }),
            Err(e) => {
                if owned {
                    let _ = browser.close().await;
                }
                handler.abort();
                Err(e)
            }
        }
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, script: String) -> Result<T, FetchFault> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| session_fault("Script evaluation failed", e))?
            .into_value()
            .map_err(|e| session_fault("Unexpected script result", e))
    }
}

fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    })
}

/// Find Chrome executable.
fn find_chrome(config: &BrowserEngineConfig) -> Result<PathBuf, FetchFault> {
    if let Some(ref path) = config.executable {
        return Ok(path.clone());
    }

    for path in CHROME_PATHS {
        let p = std::path::Path::new(path);
        if p.exists() {
            info!("Found Chrome at: {}", path);
            return Ok(p.to_path_buf());
        }
    }

    // Check if in PATH via `which`
    for cmd in &[
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ] {
        if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    info!("Found Chrome in PATH: {}", path);
                    return Ok(PathBuf::from(path));
                }
            }
        }
    }

    Err(FetchFault::Session(
        "Chrome/Chromium not found. Install it or set LISTCRAWL_CHROME".to_string(),
    ))
}

async fn launch_local(config: &BrowserEngineConfig) -> Result<(Browser, Handler), FetchFault> {
    info!("Launching browser (headless={})", config.headless);

    let mut builder = BrowserConfig::builder()
        .chrome_executable(find_chrome(config)?)
        .window_size(config.window_width, config.window_height)
        .request_timeout(config.request_timeout());

    if !config.headless {
        builder = builder.with_head();
    }
    for arg in LAUNCH_ARGS {
        builder = builder.arg(*arg);
    }
    for arg in &config.chrome_args {
        builder = builder.arg(arg);
    }

    let browser_config = builder
        .build()
        .map_err(|e| session_fault("Failed to build browser config", e))?;

    Browser::launch(browser_config)
        .await
        .map_err(|e| session_fault("Failed to launch browser", e))
}

/// Connect to a remote Chrome instance.
async fn connect_remote(
    config: &BrowserEngineConfig,
    url: &str,
) -> Result<(Browser, Handler), FetchFault> {
    info!(
        "Connecting to remote browser at {} (timeout: {}s)",
        url, config.timeout
    );

    // Get WebSocket URL from the /json/version endpoint
    let http_url = url
        .replace("ws://", "http://")
        .replace("wss://", "https://");
    let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

    let resp: serde_json::Value = reqwest::Client::new()
        .get(&version_url)
        .timeout(config.request_timeout())
        .send()
        .await
        .map_err(|e| session_fault("Failed to reach remote browser", e))?
        .json()
        .await
        .map_err(|e| session_fault("Failed to parse browser version info", e))?;

    let ws_url = resp
        .get("webSocketDebuggerUrl")
        .and_then(|v| v.as_str())
        .ok_or_else(|| FetchFault::Session("No webSocketDebuggerUrl in response".to_string()))?;

    debug!("Connecting to WebSocket: {}", ws_url);

    let handler_config = HandlerConfig {
        request_timeout: config.request_timeout(),
        ..Default::default()
    };

    Browser::connect_with_config(ws_url, handler_config)
        .await
        .map_err(|e| session_fault("Failed to connect to remote browser", e))
}

async fn prepare_page(
    browser: &Browser,
    config: &BrowserEngineConfig,
    user_agent: &str,
) -> Result<Page, FetchFault> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| session_fault("Failed to open page", e))?;

    // Identity and viewport go in before any navigation
    page.execute(SetUserAgentOverrideParams::new(user_agent.to_string()))
        .await
        .map_err(|e| session_fault("Failed to set user agent", e))?;
    page.execute(SetDeviceMetricsOverrideParams::new(
        config.window_width as i64,
        config.window_height as i64,
        1.0,
        false,
    ))
    .await
    .map_err(|e| session_fault("Failed to set device metrics", e))?;

    Ok(page)
}

#[async_trait]
impl ScrollSurface for ChromiumSession {
    async fn count(&self, selector: &str) -> Result<usize, FetchFault> {
        let quoted = serde_json::to_string(selector)
            .map_err(|e| session_fault("Failed to quote selector", e))?;
        self.eval(format!("document.querySelectorAll({}).length", quoted))
            .await
    }

    async fn metrics(&self) -> Result<PageMetrics, FetchFault> {
        self.eval(METRICS_SCRIPT.to_string()).await
    }

    async fn scroll_to(&self, offset: u64) -> Result<(), FetchFault> {
        let _: bool = self
            .eval(format!(
                "(() => {{ window.scrollTo(0, {}); return true; }})()",
                offset
            ))
            .await?;
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<(), FetchFault> {
        let _: bool = self.eval(SCROLL_BOTTOM_SCRIPT.to_string()).await?;
        Ok(())
    }

    async fn dispatch_scroll_events(&self) -> Result<(), FetchFault> {
        let _: bool = self.eval(SCROLL_EVENTS_SCRIPT.to_string()).await?;
        Ok(())
    }

    async fn snapshot(&self) -> Result<String, FetchFault> {
        self.page
            .content()
            .await
            .map_err(|e| session_fault("Failed to read page content", e))
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), FetchFault> {
        info!("Navigating to {}", url);
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(FetchFault::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(FetchFault::Timeout(format!(
                "navigation to {} exceeded {}s",
                url,
                timeout.as_secs()
            ))),
        }
    }

    async fn title(&self) -> Result<Option<String>, FetchFault> {
        self.page
            .get_title()
            .await
            .map_err(|e| session_fault("Failed to read title", e))
    }

    async fn close(self: Box<Self>) {
        let ChromiumSession {
            mut browser,
            page,
            handler,
            owned,
        } = *self;

        // Close the page to prevent tab accumulation
        if let Err(e) = page.close().await {
            debug!("Page close failed: {}", e);
        }
        if owned {
            if let Err(e) = browser.close().await {
                warn!("Browser close failed: {}", e);
            }
        }
        handler.abort();
        debug!("Render session closed");
    }
}
