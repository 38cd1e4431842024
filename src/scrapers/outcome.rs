//! Strategy outcomes and the fault taxonomy they carry.

use thiserror::Error;

use crate::models::Record;

/// Why a strategy produced nothing.
#[derive(Debug, Error)]
pub enum FetchFault {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("rendering session failed: {0}")]
    Session(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("{0}")]
    Unsupported(String),
}

impl FetchFault {
    /// Classify a reqwest error, separating timeouts from other transport faults.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchFault::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            FetchFault::Status {
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
                status: status.as_u16(),
            }
        } else {
            FetchFault::Network(err.to_string())
        }
    }
}

/// What a single strategy invocation produced.
///
/// `Empty` means the page was retrieved but held no records; `Fault`
/// means retrieval itself failed. Both collapse to an empty sequence at
/// the crawler boundary.
#[derive(Debug)]
pub enum FetchOutcome {
    Records(Vec<Record>),
    Empty,
    Fault(FetchFault),
}

impl FetchOutcome {
    /// Wrap extracted records, mapping an empty list to `Empty`.
    pub fn from_records(records: Vec<Record>) -> Self {
        if records.is_empty() {
            FetchOutcome::Empty
        } else {
            FetchOutcome::Records(records)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FetchOutcome::Records(records) => records.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fault(&self) -> Option<&FetchFault> {
        match self {
            FetchOutcome::Fault(fault) => Some(fault),
            _ => None,
        }
    }

    /// Collapse to the record sequence, discarding the reason for emptiness.
    pub fn into_records(self) -> Vec<Record> {
        match self {
            FetchOutcome::Records(records) => records,
            FetchOutcome::Empty | FetchOutcome::Fault(_) => Vec::new(),
        }
    }

    /// Short description used in logs and error envelopes.
    pub fn describe(&self) -> String {
        match self {
            FetchOutcome::Records(records) => format!("{} records", records.len()),
            FetchOutcome::Empty => "no records found".to_string(),
            FetchOutcome::Fault(fault) => fault.to_string(),
        }
    }
}

impl From<FetchFault> for FetchOutcome {
    fn from(fault: FetchFault) -> Self {
        FetchOutcome::Fault(fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_records_maps_empty() {
        assert!(matches!(
            FetchOutcome::from_records(Vec::new()),
            FetchOutcome::Empty
        ));
        let outcome = FetchOutcome::from_records(vec![Record::new(1, "Boyhood")]);
        assert_eq!(outcome.len(), 1);
    }

    #[test]
    fn test_fault_collapses_to_empty_sequence() {
        let outcome: FetchOutcome = FetchFault::Timeout("10s elapsed".to_string()).into();
        assert!(outcome.is_empty());
        assert!(outcome.describe().contains("timed out"));
        assert!(outcome.into_records().is_empty());
    }
}
