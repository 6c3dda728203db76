//! Data models for collected articles and per-fetch results.
//!
//! This module defines the core data structures used throughout the application:
//! - [`CanonicalRecord`]: The normalized article shape every source is mapped into
//! - [`SourceQuery`]: One (keyword, source) cell of a run's fetch matrix
//! - [`FetchResult`]: The outcome of a single fetch, success or failure
//! - [`RunSummary`]: Counts reported when a pipeline run finishes
//!
//! Records are immutable once created: the store only ever inserts them or
//! leaves them absent, never updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fetch strategy a source uses.
///
/// - [`SourceKind::Rss`]: a fixed feed URL, filtered by keyword after parsing
/// - [`SourceKind::HtmlSearch`]: a keyword-parameterized search page, scanned
///   for repeating article blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// RSS/XML feed endpoint.
    Rss,
    /// HTML search results page.
    HtmlSearch,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Rss => write!(f, "rss"),
            SourceKind::HtmlSearch => write!(f, "html_search"),
        }
    }
}

/// A normalized article record.
///
/// Every source-native entry (feed item or markup block) is mapped into this
/// shape before it reaches the store. The `url` is the record's identity:
/// the store enforces global uniqueness on it, and inserting a record whose
/// URL already exists is a counted no-op.
///
/// # Fields
///
/// * `title` - The article headline as published by the source
/// * `url` - Absolute link to the article; unique key in the store
/// * `source` - Origin name the record was collected from (e.g. "lenta.ru")
/// * `found_at` - When this run first saw the record
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CanonicalRecord {
    /// The article headline.
    pub title: String,
    /// Absolute article URL; globally unique in the store.
    pub url: String,
    /// Origin name, e.g. "lenta.ru" or "habr.com".
    pub source: String,
    /// Timestamp of when the record was normalized.
    pub found_at: DateTime<Utc>,
}

impl CanonicalRecord {
    /// Build a record stamped with the current time.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            source: source.into(),
            found_at: Utc::now(),
        }
    }
}

/// One cell of the keyword × source matrix built for a single run.
///
/// Queries are ephemeral: the orchestrator constructs the full cross product
/// at the start of a run and discards it when the run completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    /// The keyword being searched for.
    pub keyword: String,
    /// Origin name of the source being queried.
    pub source_name: String,
    /// How the source is fetched.
    pub kind: SourceKind,
}

/// The outcome of one fetch.
///
/// A failed fetch carries an empty record list and the error message; it is
/// never an `Err` at this layer, so one bad source cannot abort the run.
#[derive(Debug)]
pub struct FetchResult {
    /// The query this result answers.
    pub query: SourceQuery,
    /// Records extracted from the response, empty on failure.
    pub records: Vec<CanonicalRecord>,
    /// The failure message, if the fetch or parse failed.
    pub error: Option<String>,
}

impl FetchResult {
    /// A successful fetch yielding zero or more records.
    pub fn success(query: SourceQuery, records: Vec<CanonicalRecord>) -> Self {
        Self {
            query,
            records,
            error: None,
        }
    }

    /// A failed fetch: no records, error message retained for logging.
    pub fn failed(query: SourceQuery, error: impl fmt::Display) -> Self {
        Self {
            query,
            records: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// Counts reported at the end of a pipeline run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Total records collected across all fetches, before deduplication.
    pub fetched: usize,
    /// Records newly inserted by this run.
    pub inserted: usize,
    /// Records skipped because their URL was already present.
    pub duplicates: usize,
}
