//! Configuration management for listcrawl using the prefer crate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::scrapers::{builtin_targets, BrowserEngineConfig, ScrollConfig, TargetConfig};

/// Default bind address for `listcrawl serve`.
pub const DEFAULT_BIND: &str = "0.0.0.0:9003";

/// IDs taken by fixed server routes under `/crawler/`.
pub const RESERVED_TARGET_IDS: [&str; 1] = ["targets"];

/// Configuration problems. Always fatal for the operation that hit them.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {format} config {path}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    #[error("invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("field name '{0}' clashes with a built-in record key")]
    ReservedField(String),

    #[error("target ID '{0}' is reserved")]
    ReservedTarget(String),

    #[error("unknown target '{0}'")]
    UnknownTarget(String),
}

/// Browser identity presented by both strategies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Replaces the built-in user-agent pool when non-empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_agents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept_language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub browser: BrowserEngineConfig,
    /// Scroll tuning for targets without their own `scroll` table.
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// Crawl targets by ID. Built-in targets fill in missing IDs.
    #[serde(default)]
    pub targets: HashMap<String, TargetConfig>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Falls back to defaults when no listcrawl config file exists.
    pub async fn load() -> Result<Self, ConfigError> {
        match prefer::load("listcrawl").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await,
                None => Ok(Self::default_with_env()),
            },
            Err(e) => {
                debug!("No config file discovered: {}", e);
                Ok(Self::default_with_env())
            }
        }
    }

    /// Defaults plus built-in targets and environment overrides.
    pub fn default_with_env() -> Self {
        Self::default().finish()
    }

    /// Load configuration from a specific file path.
    /// The format follows the extension: TOML, YAML, otherwise JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let path = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |format: &'static str, message: String| ConfigError::Parse {
            path: path.clone(),
            format,
            message,
        };

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| parse_error("TOML", e.to_string()))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| parse_error("YAML", e.to_string()))?
            }
            _ => serde_json::from_str(&contents).map_err(|e| parse_error("JSON", e.to_string()))?,
        };

        if let Some(id) = config
            .targets
            .keys()
            .find(|id| RESERVED_TARGET_IDS.contains(&id.as_str()))
        {
            return Err(ConfigError::ReservedTarget(id.clone()));
        }

        debug!("Loaded config from {}", path.display());
        config.source_path = Some(path);
        Ok(config.finish())
    }

    fn finish(mut self) -> Self {
        for (id, target) in builtin_targets() {
            self.targets.entry(id).or_insert(target);
        }
        for (id, target) in &self.targets {
            if target.url.trim().is_empty() {
                warn!("Target '{}' has no URL", id);
            }
        }
        self.browser = self.browser.with_env_overrides();
        self
    }

    pub fn target(&self, id: &str) -> Result<&TargetConfig, ConfigError> {
        self.targets
            .get(id)
            .ok_or_else(|| ConfigError::UnknownTarget(id.to_string()))
    }

    /// Target IDs in sorted order.
    pub fn target_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.targets.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
