//! Record extraction from parsed HTML documents.
//!
//! Every candidate block is folded into either an accepted record or a
//! logged skip. Field lookups never abort a record: an unmatched selector
//! chain yields [`NOT_AVAILABLE`] instead. Only a missing title drops the
//! candidate.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::config::{ExtractionConfig, FieldConfig, LinkConfig};
use crate::config::ConfigError;
use crate::models::{Link, Record, NOT_AVAILABLE, RESERVED_KEYS};

/// A field rule with its selectors compiled.
#[derive(Debug)]
struct FieldRule {
    name: String,
    selectors: Vec<Selector>,
    attributes: Vec<String>,
    nth: usize,
    absolute: bool,
    value: Option<String>,
}

#[derive(Debug)]
struct LinkRule {
    cell: Option<Selector>,
    cell_index: Option<usize>,
    anchor: Selector,
    href_contains: Option<String>,
    label: Option<Selector>,
    absolute: bool,
}

/// Outcome for one candidate block.
#[derive(Debug)]
enum Candidate {
    Accepted(Record),
    Skipped(&'static str),
}

/// Maps documents to records for one target.
#[derive(Debug)]
pub struct RecordExtractor {
    item: Selector,
    title: FieldRule,
    fields: Vec<FieldRule>,
    links: Option<LinkRule>,
    base_url: Option<Url>,
}

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

impl FieldRule {
    fn compile(config: &FieldConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            name: config.name.clone(),
            selectors: config
                .selectors
                .iter()
                .map(|s| compile(s))
                .collect::<Result<_, _>>()?,
            attributes: config.attributes.clone(),
            nth: config.nth,
            absolute: config.absolute,
            value: config.value.clone(),
        })
    }
}

impl LinkRule {
    fn compile(config: &LinkConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            cell: config.cell_selector.as_deref().map(compile).transpose()?,
            cell_index: config.cell_index,
            anchor: compile(&config.anchor_selector)?,
            href_contains: config.href_contains.clone(),
            label: config.label_selector.as_deref().map(compile).transpose()?,
            absolute: config.absolute,
        })
    }
}

impl RecordExtractor {
    /// Compile the extraction rules. Invalid selectors are config errors.
    pub fn new(config: &ExtractionConfig, base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            item: compile(&config.item_selector)?,
            title: FieldRule::compile(&config.title)?,
            fields: config
                .fields
                .iter()
                .map(|field| {
                    if RESERVED_KEYS.contains(&field.name.as_str()) {
                        return Err(ConfigError::ReservedField(field.name.clone()));
                    }
                    FieldRule::compile(field)
                })
                .collect::<Result<_, _>>()?,
            links: config.links.as_ref().map(LinkRule::compile).transpose()?,
            base_url: Url::parse(base_url).ok(),
        })
    }

    /// Number of candidate blocks in the document.
    pub fn candidate_count(&self, document: &Html) -> usize {
        document.select(&self.item).count()
    }

    /// Parse raw HTML and extract records.
    pub fn extract_html(&self, html: &str) -> Vec<Record> {
        let document = Html::parse_document(html);
        self.extract(&document)
    }

    /// Extract records, ranked 1..N in document order.
    pub fn extract(&self, document: &Html) -> Vec<Record> {
        let records = document.select(&self.item).enumerate().fold(
            Vec::new(),
            |mut records: Vec<Record>, (idx, element)| {
                match self.candidate(element) {
                    Candidate::Accepted(mut record) => {
                        record.rank = records.len() + 1;
                        records.push(record);
                    }
                    Candidate::Skipped(reason) => {
                        debug!("Skipping candidate {}: {}", idx + 1, reason);
                    }
                }
                records
            },
        );

        debug!("Extracted {} records", records.len());
        records
    }

    fn candidate(&self, element: ElementRef<'_>) -> Candidate {
        let Some(title) = self.resolve(&self.title, element) else {
            return Candidate::Skipped("missing title");
        };

        let attributes = self
            .fields
            .iter()
            .map(|rule| {
                let value = self
                    .resolve(rule, element)
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string());
                (rule.name.clone(), value)
            })
            .collect();

        Candidate::Accepted(Record {
            rank: 0,
            title,
            attributes,
            links: self
                .links
                .as_ref()
                .map(|rule| self.collect_links(rule, element)),
        })
    }

    /// Resolve one field through its selector and attribute chains.
    fn resolve(&self, rule: &FieldRule, element: ElementRef<'_>) -> Option<String> {
        if let Some(ref value) = rule.value {
            return Some(value.clone());
        }

        let target = if rule.selectors.is_empty() {
            Some(element)
        } else {
            rule.selectors
                .iter()
                .find_map(|selector| element.select(selector).nth(rule.nth))
        }?;

        let raw = if rule.attributes.is_empty() {
            element_text(target)
        } else {
            rule.attributes
                .iter()
                .filter_map(|attr| target.value().attr(attr))
                .map(str::trim)
                .find(|v| !v.is_empty())
                .map(str::to_string)
                .unwrap_or_default()
        };

        if raw.is_empty() {
            return None;
        }

        Some(if rule.absolute {
            self.absolutize(&raw)
        } else {
            raw
        })
    }

    fn collect_links(&self, rule: &LinkRule, element: ElementRef<'_>) -> Vec<Link> {
        let cells: Vec<ElementRef<'_>> = match (&rule.cell, rule.cell_index) {
            (Some(cell), Some(idx)) => element.select(cell).nth(idx).into_iter().collect(),
            (Some(cell), None) => element.select(cell).collect(),
            (None, _) => vec![element],
        };

        cells
            .into_iter()
            .flat_map(|cell| cell.select(&rule.anchor).collect::<Vec<_>>())
            .filter_map(|anchor| {
                let href = anchor.value().attr("href").map(str::trim)?;
                if href.is_empty() {
                    return None;
                }
                if let Some(ref needle) = rule.href_contains {
                    if !href.contains(needle.as_str()) {
                        return None;
                    }
                }
                let label = match rule.label {
                    Some(ref label) => anchor
                        .select(label)
                        .next()
                        .map(element_text)
                        .unwrap_or_default(),
                    None => element_text(anchor),
                };
                let url = if rule.absolute {
                    self.absolutize(href)
                } else {
                    href.to_string()
                };
                Some(Link { label, url })
            })
            .collect()
    }

    fn absolutize(&self, raw: &str) -> String {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return raw.to_string();
        }
        if let Some(rest) = raw.strip_prefix("//") {
            return format!("https://{}", rest);
        }
        self.base_url
            .as_ref()
            .and_then(|base| base.join(raw).ok())
            .map(|url| url.to_string())
            .unwrap_or_else(|| raw.to_string())
    }
}

/// Element text with whitespace collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
