//! listcrawl - ranked list extraction from static and infinite-scroll pages.
//!
//! A target page is fetched either directly over HTTP or through a headless
//! browser that scrolls until the content stops growing. Whichever strategy
//! goes first, the other one is tried when it comes back empty.

pub mod cli;
pub mod config;
pub mod models;
pub mod scrapers;
pub mod server;
pub mod services;

pub use config::{Config, ConfigError};
pub use models::{CrawlResult, CrawlStatus, Record};
pub use services::Crawler;
