//! HTML search-page source.
//!
//! Issues a keyword-parameterized search request and scans the response for
//! repeating article blocks. The block and title-link selectors come from
//! configuration: the markup belongs to the remote site and changes without
//! notice, so the contract is "extract a title and a link per block", not
//! any particular DOM shape.
//!
//! Relative links are resolved against the source's base origin, e.g.
//! `/ru/articles/1/` becomes `https://habr.com/ru/articles/1/`.

use crate::config::SourceSpec;
use crate::models::{CanonicalRecord, FetchResult, SourceKind, SourceQuery};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::error::Error;
use tracing::{error, info, instrument};
use url::Url;

use super::{Source, get_text};

/// A search endpoint scanned for article blocks.
pub struct HtmlSearchSource {
    name: String,
    url_template: String,
    base_url: Url,
    article_selector: Selector,
    title_selector: Selector,
}

impl HtmlSearchSource {
    /// Build a source from its config entry.
    ///
    /// Errors if the entry lacks a base URL or selectors, or if a selector
    /// does not parse. Configuration problems surface here, before any fetch.
    pub fn from_spec(spec: &SourceSpec) -> Result<Self, Box<dyn Error>> {
        let base = spec
            .base_url
            .as_deref()
            .ok_or_else(|| format!("html_search source '{}' is missing base_url", spec.name))?;
        let selectors = spec
            .selectors
            .as_ref()
            .ok_or_else(|| format!("html_search source '{}' is missing selectors", spec.name))?;

        let article_selector = Selector::parse(&selectors.article)
            .map_err(|e| format!("source '{}': bad article selector: {e}", spec.name))?;
        let title_selector = Selector::parse(&selectors.title_link)
            .map_err(|e| format!("source '{}': bad title selector: {e}", spec.name))?;

        Ok(Self {
            name: spec.name.clone(),
            url_template: spec.url.clone(),
            base_url: Url::parse(base)?,
            article_selector,
            title_selector,
        })
    }

    fn query(&self, keyword: &str) -> SourceQuery {
        SourceQuery {
            keyword: keyword.to_string(),
            source_name: self.name.clone(),
            kind: SourceKind::HtmlSearch,
        }
    }

    /// Substitute the URL-encoded keyword into the endpoint template.
    fn search_url(&self, keyword: &str) -> String {
        self.url_template
            .replace("{keyword}", &urlencoding::encode(keyword))
    }

    /// Scan a results page for article blocks and normalize each one.
    ///
    /// A block missing its title link, its href, or a resolvable URL is
    /// skipped silently; partial markup is expected noise.
    fn parse_search_page(&self, html: &str) -> Vec<CanonicalRecord> {
        let document = Html::parse_document(html);
        let mut records = Vec::new();

        for block in document.select(&self.article_selector) {
            let Some(link) = block.select(&self.title_selector).next() else {
                continue;
            };
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let title = link.text().collect::<Vec<_>>().join(" ").trim().to_string();
            if title.is_empty() {
                continue;
            }
            let Ok(resolved) = self.base_url.join(href) else {
                continue;
            };
            records.push(CanonicalRecord::new(
                title,
                resolved.as_str(),
                self.name.as_str(),
            ));
        }
        records
    }
}

#[async_trait]
impl Source for HtmlSearchSource {
    #[instrument(level = "info", skip_all, fields(source = %self.name, %keyword))]
    async fn fetch(&self, client: &reqwest::Client, keyword: &str) -> FetchResult {
        let url = self.search_url(keyword);
        info!(%url, "Fetching search page");

        let body = match get_text(client, &url).await {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, %url, "Search fetch failed");
                return FetchResult::failed(self.query(keyword), e);
            }
        };

        let records = self.parse_search_page(&body);
        info!(count = records.len(), "Extracted article blocks");
        FetchResult::success(self.query(keyword), records)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
