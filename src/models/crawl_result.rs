//! The uniform envelope returned for every crawl.

use serde::Serialize;

use super::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    Success,
    Error,
}

/// Result of one crawl invocation.
///
/// Constructed only through [`CrawlResult::success`] and
/// [`CrawlResult::error`], so `count` always equals `data.len()` and an
/// error never carries records.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    status: CrawlStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    count: usize,
    data: Vec<Record>,
}

impl CrawlResult {
    pub fn success(data: Vec<Record>) -> Self {
        Self {
            status: CrawlStatus::Success,
            message: None,
            count: data.len(),
            data,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: CrawlStatus::Error,
            message: Some(message.into()),
            count: 0,
            data: Vec::new(),
        }
    }

    pub fn status(&self) -> CrawlStatus {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status == CrawlStatus::Success
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn data(&self) -> &[Record] {
        &self.data
    }
}
