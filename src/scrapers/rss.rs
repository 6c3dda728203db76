//! RSS feed source.
//!
//! Fetches a fixed feed URL and keeps the entries whose title contains the
//! query keyword, case-insensitively. The feed is matched as a plain
//! substring, not a token search, so "ai" matches "AI" and "air" alike by
//! design of the upstream behavior.

use crate::config::SourceSpec;
use crate::models::{CanonicalRecord, FetchResult, SourceKind, SourceQuery};
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info, instrument};

use super::{Source, get_text};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

/// One `<item>` element. Feeds in the wild omit fields, so everything is
/// optional and the normalizer decides what survives.
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
}

/// A feed endpoint with a fixed URL.
pub struct RssSource {
    name: String,
    url: String,
}

impl RssSource {
    pub fn from_spec(spec: &SourceSpec) -> Self {
        Self {
            name: spec.name.clone(),
            url: spec.url.clone(),
        }
    }

    fn query(&self, keyword: &str) -> SourceQuery {
        SourceQuery {
            keyword: keyword.to_string(),
            source_name: self.name.clone(),
            kind: SourceKind::Rss,
        }
    }
}

/// Parse a feed document and normalize the entries matching `keyword`.
///
/// Pure function over the document text so it can be exercised on fixtures.
/// Entries missing a title or link are skipped silently; they are expected
/// noise, not errors.
pub fn parse_feed(
    xml: &str,
    keyword: &str,
    origin: &str,
) -> Result<Vec<CanonicalRecord>, quick_xml::DeError> {
    let feed: Rss = quick_xml::de::from_str(xml)?;
    let needle = keyword.to_lowercase();

    let mut records = Vec::new();
    for item in feed.channel.items {
        let (Some(title), Some(link)) = (item.title, item.link) else {
            continue;
        };
        if title.trim().is_empty() || link.trim().is_empty() {
            continue;
        }
        if title.to_lowercase().contains(&needle) {
            records.push(CanonicalRecord::new(title, link, origin));
        }
    }
    Ok(records)
}

#[async_trait]
impl Source for RssSource {
    #[instrument(level = "info", skip_all, fields(source = %self.name, %keyword))]
    async fn fetch(&self, client: &reqwest::Client, keyword: &str) -> FetchResult {
        info!(url = %self.url, "Fetching RSS feed");

        let body = match get_text(client, &self.url).await {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, url = %self.url, "RSS fetch failed");
                return FetchResult::failed(self.query(keyword), e);
            }
        };

        match parse_feed(&body, keyword, &self.name) {
            Ok(records) => {
                info!(count = records.len(), "Matched feed entries");
                FetchResult::success(self.query(keyword), records)
            }
            Err(e) => {
                error!(
                    error = %e,
                    body_preview = %truncate_for_log(&body, 200),
                    "Failed to parse RSS feed"
                );
                FetchResult::failed(self.query(keyword), e)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0">
  <channel>
    <title>Example feed</title>
    <item>
      <title>Python tutorial for beginners</title>
      <link>https://example.com/python-tutorial</link>
    </item>
    <item>
      <title>Cooking tips</title>
      <link>https://example.com/cooking</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_keyword_filter_is_case_insensitive_substring() {
        let records = parse_feed(FEED, "python", "example.com").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Python tutorial for beginners");
        assert_eq!(records[0].url, "https://example.com/python-tutorial");
        assert_eq!(records[0].source, "example.com");
    }

    #[test]
    fn test_non_matching_entries_are_dropped() {
        let records = parse_feed(FEED, "rust", "example.com").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_entry_missing_link_is_skipped() {
        let feed = r#"<rss><channel>
            <item><title>Python news without a link</title></item>
            <item><title>Python news</title><link>https://example.com/ok</link></item>
        </channel></rss>"#;
        let records = parse_feed(feed, "python", "example.com").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "https://example.com/ok");
    }

    #[test]
    fn test_entry_missing_title_is_skipped() {
        let feed = r#"<rss><channel>
            <item><link>https://example.com/untitled</link></item>
        </channel></rss>"#;
        let records = parse_feed(feed, "python", "example.com").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(parse_feed("not a feed at all", "python", "example.com").is_err());
    }

    #[test]
    fn test_empty_channel_yields_no_records() {
        let records = parse_feed("<rss><channel></channel></rss>", "python", "x").unwrap();
        assert!(records.is_empty());
    }
}
