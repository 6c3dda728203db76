//! Content sources and their shared fetch plumbing.
//!
//! Each configured origin becomes one [`Source`] implementation. A source
//! follows a consistent contract:
//!
//! 1. **Fetching**: Perform one bounded HTTP request for a (source, keyword) pair
//! 2. **Normalizing**: Map the source-native payload into
//!    [`CanonicalRecord`](crate::models::CanonicalRecord)s
//!
//! # Supported kinds
//!
//! | Kind | Module | Method | Notes |
//! |------|--------|--------|-------|
//! | RSS | [`rss`] | Feed parsing | Fixed URL, keyword filter on entry titles |
//! | HTML search | [`html_search`] | Markup scanning | Keyword-parameterized URL, configured selectors |
//!
//! # Failure contract
//!
//! A source never returns an `Err` from [`Source::fetch`]: network errors,
//! bad status codes, and unparseable payloads are logged at ERROR and come
//! back as an empty [`FetchResult`] carrying the message. One bad source or
//! keyword can only ever degrade its own cell of the run's fetch matrix.

use crate::config::AppConfig;
use crate::models::{FetchResult, SourceKind};
use async_trait::async_trait;
use std::error::Error;
use std::time::Duration;

pub mod html_search;
pub mod rss;

use html_search::HtmlSearchSource;
use rss::RssSource;

/// Browser-like identification sent with every request. Search endpoints
/// such as habr.com reject clients that present a default library UA.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// A content origin that can be queried for one keyword.
#[async_trait]
pub trait Source: Send + Sync {
    /// Fetch and normalize everything this source has for `keyword`.
    ///
    /// Infallible by contract: failures are logged and yield an empty
    /// [`FetchResult`] with the error message attached.
    async fn fetch(&self, client: &reqwest::Client, keyword: &str) -> FetchResult;

    /// Origin name, e.g. "lenta.ru".
    fn name(&self) -> &str;
}

/// Build the HTTP client shared by every fetch in one run.
///
/// The client-level timeout bounds each request so a hanging source cannot
/// stall the whole run; connections are pooled across concurrent fetches.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client, Box<dyn Error>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(BROWSER_USER_AGENT)
        .build()?;
    Ok(client)
}

/// Instantiate one boxed [`Source`] per configured origin.
///
/// A misconfigured source (an `html_search` entry missing its base URL or
/// selectors, or with unparseable selectors) is an error here, before any
/// network traffic.
pub fn build_sources(config: &AppConfig) -> Result<Vec<Box<dyn Source>>, Box<dyn Error>> {
    let mut sources: Vec<Box<dyn Source>> = Vec::with_capacity(config.sources.len());
    for spec in &config.sources {
        match spec.kind {
            SourceKind::Rss => sources.push(Box::new(RssSource::from_spec(spec))),
            SourceKind::HtmlSearch => sources.push(Box::new(HtmlSearchSource::from_spec(spec)?)),
        }
    }
    Ok(sources)
}

/// GET a URL and return the response body, treating error statuses as failures.
pub(crate) async fn get_text(client: &reqwest::Client, url: &str) -> Result<String, reqwest::Error> {
    let response = client.get(url).send().await?.error_for_status()?;
    response.text().await
}
