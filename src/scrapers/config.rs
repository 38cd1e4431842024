//! Target configuration types.
//!
//! These structs define how each crawl target is fetched and how records
//! are pulled out of its pages. They deserialize from the `targets` table
//! of the config file; built-in definitions cover the stock targets.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::scroll::ScrollConfig;

/// Which acquisition strategy to try first for a target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Single HTTP request, parse the response body.
    #[default]
    Static,
    /// Headless browser session with scroll-driven loading.
    Dynamic,
}

impl StrategyKind {
    /// The strategy used as fallback when this one yields nothing.
    pub fn alternate(self) -> Self {
        match self {
            StrategyKind::Static => StrategyKind::Dynamic,
            StrategyKind::Dynamic => StrategyKind::Static,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Static => "static",
            StrategyKind::Dynamic => "dynamic",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "static" => Ok(StrategyKind::Static),
            "dynamic" => Ok(StrategyKind::Dynamic),
            other => Err(format!(
                "unknown strategy '{}' (expected 'static' or 'dynamic')",
                other
            )),
        }
    }
}

/// A crawl target from config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Display name (optional, the target ID is used otherwise).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Page to crawl.
    pub url: String,
    /// Referer sent with static requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
    /// Base for resolving relative links (defaults to the page URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Strategy to try first.
    #[serde(default)]
    pub primary: StrategyKind,
    /// TCP connect timeout for static requests in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total static request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Browser navigation timeout in seconds.
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,
    /// Fixed pause after navigation before looking at the page, in milliseconds.
    #[serde(default = "default_initial_wait_ms")]
    pub initial_wait_ms: u64,
    /// Selector that signals first paint; defaults to the item selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_selector: Option<String>,
    /// How long to poll for the ready selector, in seconds.
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_secs: u64,
    /// Per-target scroll tuning (falls back to the global scroll config).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll: Option<ScrollConfig>,
    pub extraction: ExtractionConfig,
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    10
}

fn default_navigation_timeout() -> u64 {
    60
}

fn default_initial_wait_ms() -> u64 {
    5000
}

fn default_ready_timeout() -> u64 {
    15
}

impl TargetConfig {
    /// Get the effective name, using the provided default if not set.
    pub fn name_or(&self, default: &str) -> String {
        self.name.clone().unwrap_or_else(|| default.to_string())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn initial_wait(&self) -> Duration {
        Duration::from_millis(self.initial_wait_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    /// Selector polled for during the first-paint wait.
    pub fn ready_selector(&self) -> &str {
        self.ready_selector
            .as_deref()
            .unwrap_or(&self.extraction.item_selector)
    }

    /// Base URL for link resolution.
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(&self.url)
    }
}

/// How to turn a page into records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// CSS selector for candidate blocks, one per record.
    pub item_selector: String,
    /// Title rule. Candidates without a title are skipped.
    pub title: FieldConfig,
    /// Secondary fields in output order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldConfig>,
    /// Typed link rule, if the source carries links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<LinkConfig>,
}

/// One named field resolved through a selector chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(default)]
    pub name: String,
    /// Selectors tried in order; the first one with a match wins.
    /// An empty chain means the candidate block itself.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selectors: Vec<String>,
    /// Attributes tried in order; empty means the element text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
    /// Which match of the selector to use (0-based).
    #[serde(default)]
    pub nth: usize,
    /// Resolve the value as a URL against the target's base URL.
    #[serde(default)]
    pub absolute: bool,
    /// Constant value; selectors are ignored when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl FieldConfig {
    /// Text of the first element matching `selector`.
    pub fn text(name: &str, selector: &str) -> Self {
        Self {
            name: name.to_string(),
            selectors: vec![selector.to_string()],
            ..Default::default()
        }
    }
}

/// Typed links inside a candidate block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Cells of the candidate to search (e.g. `td`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_selector: Option<String>,
    /// Restrict to the n-th cell (0-based). All cells when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_index: Option<usize>,
    #[serde(default = "default_anchor_selector")]
    pub anchor_selector: String,
    /// Only keep hrefs containing this substring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href_contains: Option<String>,
    /// Element inside the anchor holding the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_selector: Option<String>,
    #[serde(default)]
    pub absolute: bool,
}

fn default_anchor_selector() -> String {
    "a".to_string()
}

/// Stock targets, used when the config file does not define them.
pub fn builtin_targets() -> HashMap<String, TargetConfig> {
    let mut targets = HashMap::new();

    // New York Times 21st century top 100 on KMDB: server-rendered table.
    targets.insert(
        "movie".to_string(),
        TargetConfig {
            name: Some("KMDB NYT 21st century top 100".to_string()),
            url: "https://www.kmdb.or.kr/db/list/detail/533/1401".to_string(),
            referer: Some("https://www.kmdb.or.kr/".to_string()),
            base_url: None,
            primary: StrategyKind::Static,
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            navigation_timeout_secs: default_navigation_timeout(),
            initial_wait_ms: default_initial_wait_ms(),
            ready_selector: None,
            ready_timeout_secs: default_ready_timeout(),
            scroll: Some(ScrollConfig {
                enabled: false,
                ..ScrollConfig::default()
            }),
            extraction: ExtractionConfig {
                item_selector: "tbody tr".to_string(),
                title: FieldConfig::text("title", "td.title a.ti"),
                fields: vec![
                    FieldConfig::text("director", "td.fcGray1"),
                    FieldConfig {
                        nth: 1,
                        ..FieldConfig::text("year", "td.fcGray1")
                    },
                ],
                links: Some(LinkConfig {
                    cell_selector: Some("td".to_string()),
                    cell_index: Some(3),
                    anchor_selector: default_anchor_selector(),
                    href_contains: Some("koreafilm.or.kr/library".to_string()),
                    label_selector: Some("span".to_string()),
                    absolute: false,
                }),
            },
        },
    );

    // JustWatch Netflix film-industry grid: infinite scroll, client rendered.
    targets.insert(
        "netflix".to_string(),
        TargetConfig {
            name: Some("JustWatch Netflix film industry".to_string()),
            url: "https://www.justwatch.com/kr/%EB%8F%99%EC%98%81%EC%83%81%EC%84%9C%EB%B9%84%EC%8A%A4/netflix/%EC%98%81%ED%99%94%EC%82%B0%EC%97%85".to_string(),
            referer: Some("https://www.justwatch.com/".to_string()),
            base_url: Some("https://www.justwatch.com".to_string()),
            primary: StrategyKind::Dynamic,
            // Client-rendered page: give the static fallback a longer budget.
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            navigation_timeout_secs: default_navigation_timeout(),
            initial_wait_ms: default_initial_wait_ms(),
            ready_selector: None,
            ready_timeout_secs: default_ready_timeout(),
            scroll: None,
            extraction: ExtractionConfig {
                item_selector: "div.title-list-grid__item[data-title]".to_string(),
                title: FieldConfig {
                    name: "title".to_string(),
                    attributes: vec!["data-title".to_string()],
                    ..Default::default()
                },
                fields: vec![
                    FieldConfig {
                        name: "type".to_string(),
                        value: Some("영화".to_string()),
                        ..Default::default()
                    },
                    FieldConfig {
                        name: "link".to_string(),
                        selectors: vec!["a".to_string()],
                        attributes: vec!["href".to_string()],
                        absolute: true,
                        ..Default::default()
                    },
                    FieldConfig {
                        name: "image".to_string(),
                        selectors: vec!["img".to_string()],
                        attributes: vec![
                            "src".to_string(),
                            "data-src".to_string(),
                            "data-lazy-src".to_string(),
                        ],
                        absolute: true,
                        ..Default::default()
                    },
                ],
                links: None,
            },
        },
    );

    targets
}
