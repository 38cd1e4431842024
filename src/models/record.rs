//! Extracted list records.

use std::collections::HashSet;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Value substituted for any field whose selector chain did not match.
pub const NOT_AVAILABLE: &str = "N/A";

/// Keys every serialized record already carries.
pub const RESERVED_KEYS: [&str; 3] = ["rank", "title", "links"];

/// A typed link attached to a record, e.g. a film library entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Link {
    /// Link label as shown on the page (may be empty).
    #[serde(rename = "type")]
    pub label: String,
    pub url: String,
}

/// One ranked entry scraped from a list page.
///
/// Serializes as a flat JSON object: `rank`, `title`, each attribute in
/// extraction order, then `links` when the source defines link rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub rank: usize,
    pub title: String,
    /// Named secondary fields, in the order the source declares them.
    pub attributes: Vec<(String, String)>,
    /// `None` when the source has no link rules at all.
    pub links: Option<Vec<Link>>,
}

impl Record {
    /// Create a record with no attributes or links.
    pub fn new(rank: usize, title: impl Into<String>) -> Self {
        Self {
            rank,
            title: title.into(),
            attributes: Vec::new(),
            links: None,
        }
    }

    /// Append a named attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Look up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(self.links.is_some());
        let mut map = serializer.serialize_map(Some(2 + self.attributes.len() + extra))?;
        map.serialize_entry("rank", &self.rank)?;
        map.serialize_entry("title", &self.title)?;
        for (name, value) in &self.attributes {
            map.serialize_entry(name, value)?;
        }
        if let Some(ref links) = self.links {
            map.serialize_entry("links", links)?;
        }
        map.end()
    }
}

/// Drop records whose title was already seen. First occurrence wins and
/// the surviving order is the original insertion order.
pub fn dedupe_by_title(records: Vec<Record>) -> Vec<Record> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.title.clone()))
        .collect()
}

/// Reassign ranks 1..N in sequence order.
pub fn rerank(records: &mut [Record]) {
    for (idx, record) in records.iter_mut().enumerate() {
        record.rank = idx + 1;
    }
}
