//! Data models for listcrawl.

mod crawl_result;
mod record;

pub use crawl_result::{CrawlResult, CrawlStatus};
pub use record::{dedupe_by_title, rerank, Link, Record, NOT_AVAILABLE, RESERVED_KEYS};
