//! Fan-out collection and the run orchestrator.
//!
//! One pipeline run is a bounded, non-continuous execution:
//!
//! 1. Build the keyword × source cross product
//! 2. Dispatch every fetch concurrently and wait for all of them
//! 3. Flatten the per-pair record lists, in submission order
//! 4. Persist the whole batch in one transaction
//!
//! Per-pair fetch failures degrade only their own cell of the matrix; the
//! only fatal failures are opening the store (handled by the caller before
//! invoking the pipeline) and the persistence transaction itself.

use crate::config::AppConfig;
use crate::models::{CanonicalRecord, RunSummary};
use crate::scrapers::{self, Source};
use crate::store::ArticleStore;
use futures::future::join_all;
use std::error::Error;
use tracing::{info, instrument};

/// Fan out one fetch per (keyword, source) pair and flatten the results.
///
/// All fetches run concurrently; the flattened sequence follows submission
/// order (keyword-major, then source), not completion order, so a run is
/// deterministic given deterministic fetch responses. Failed pairs have
/// already logged their error and contribute nothing.
#[instrument(level = "info", skip_all, fields(keywords = keywords.len(), sources = sources.len()))]
pub async fn collect(
    client: &reqwest::Client,
    sources: &[Box<dyn Source>],
    keywords: &[String],
) -> Vec<CanonicalRecord> {
    let mut fetches = Vec::with_capacity(keywords.len() * sources.len());
    for keyword in keywords {
        for source in sources {
            fetches.push(source.fetch(client, keyword));
        }
    }

    let results = join_all(fetches).await;

    let mut records = Vec::new();
    for result in results {
        if result.error.is_none() {
            info!(
                source = %result.query.source_name,
                keyword = %result.query.keyword,
                count = result.records.len(),
                "Fetch completed"
            );
        }
        records.extend(result.records);
    }
    info!(total = records.len(), "Collected records from all sources");
    records
}

/// Execute one full run against the configured sources.
///
/// The store is opened (and its schema initialized) by the caller before
/// this is invoked, so a broken database aborts the run before any fetch.
pub async fn run(
    config: &AppConfig,
    store: &mut ArticleStore,
) -> Result<RunSummary, Box<dyn Error>> {
    let client = scrapers::build_client(config.fetch_timeout_secs)?;
    let sources = scrapers::build_sources(config)?;
    run_with_sources(&client, &sources, &config.keywords, store).await
}

/// Run the pipeline against an explicit source set.
///
/// Split out from [`run`] so fixture sources can be injected.
pub async fn run_with_sources(
    client: &reqwest::Client,
    sources: &[Box<dyn Source>],
    keywords: &[String],
    store: &mut ArticleStore,
) -> Result<RunSummary, Box<dyn Error>> {
    let records = collect(client, sources, keywords).await;

    if records.is_empty() {
        info!("No new records to save");
        return Ok(RunSummary::default());
    }

    let outcome = store.insert_batch(&records)?;
    let summary = RunSummary {
        fetched: records.len(),
        inserted: outcome.inserted,
        duplicates: outcome.duplicates,
    };
    info!(
        fetched = summary.fetched,
        inserted = summary.inserted,
        duplicates = summary.duplicates,
        "Run complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FetchResult, SourceKind, SourceQuery};
    use crate::scrapers::rss;
    use async_trait::async_trait;

    /// Yields one record per keyword, with the keyword baked into the URL.
    struct FixtureSource {
        name: &'static str,
    }

    #[async_trait]
    impl Source for FixtureSource {
        async fn fetch(&self, _client: &reqwest::Client, keyword: &str) -> FetchResult {
            let query = SourceQuery {
                keyword: keyword.to_string(),
                source_name: self.name.to_string(),
                kind: SourceKind::Rss,
            };
            let record = CanonicalRecord::new(
                format!("{keyword} story"),
                format!("https://{}/{}", self.name, keyword),
                self.name,
            );
            FetchResult::success(query, vec![record])
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    /// Fails every fetch, the way a dead endpoint would.
    struct BrokenSource;

    #[async_trait]
    impl Source for BrokenSource {
        async fn fetch(&self, _client: &reqwest::Client, keyword: &str) -> FetchResult {
            let query = SourceQuery {
                keyword: keyword.to_string(),
                source_name: "broken.test".to_string(),
                kind: SourceKind::HtmlSearch,
            };
            FetchResult::failed(query, "connection refused")
        }

        fn name(&self) -> &str {
            "broken.test"
        }
    }

    /// Serves a canned feed document through the real RSS parser.
    struct CannedFeed {
        origin: &'static str,
        xml: &'static str,
    }

    #[async_trait]
    impl Source for CannedFeed {
        async fn fetch(&self, _client: &reqwest::Client, keyword: &str) -> FetchResult {
            let query = SourceQuery {
                keyword: keyword.to_string(),
                source_name: self.origin.to_string(),
                kind: SourceKind::Rss,
            };
            match rss::parse_feed(self.xml, keyword, self.origin) {
                Ok(records) => FetchResult::success(query, records),
                Err(e) => FetchResult::failed(query, e),
            }
        }

        fn name(&self) -> &str {
            self.origin
        }
    }

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn client() -> reqwest::Client {
        scrapers::build_client(5).unwrap()
    }

    #[tokio::test]
    async fn test_collect_preserves_submission_order() {
        let sources: Vec<Box<dyn Source>> = vec![
            Box::new(FixtureSource { name: "alpha.test" }),
            Box::new(FixtureSource { name: "beta.test" }),
        ];
        let records = collect(&client(), &sources, &keywords(&["one", "two"])).await;

        let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://alpha.test/one",
                "https://beta.test/one",
                "https://alpha.test/two",
                "https://beta.test/two",
            ]
        );
    }

    #[tokio::test]
    async fn test_one_failing_source_degrades_only_itself() {
        let sources: Vec<Box<dyn Source>> = vec![
            Box::new(FixtureSource { name: "alpha.test" }),
            Box::new(BrokenSource),
        ];
        let mut store = ArticleStore::open_in_memory().unwrap();

        let summary = run_with_sources(&client(), &sources, &keywords(&["one", "two"]), &mut store)
            .await
            .unwrap();

        // the healthy source's records for both keywords were persisted
        assert_eq!(summary.fetched, 2);
        assert_eq!(summary.inserted, 2);
        assert_eq!(store.count().unwrap(), 2);
        assert!(store.contains_url("https://alpha.test/one").unwrap());
        assert!(store.contains_url("https://alpha.test/two").unwrap());
    }

    #[tokio::test]
    async fn test_all_sources_failing_is_not_fatal() {
        let sources: Vec<Box<dyn Source>> = vec![Box::new(BrokenSource)];
        let mut store = ArticleStore::open_in_memory().unwrap();

        let summary = run_with_sources(&client(), &sources, &keywords(&["one"]), &mut store)
            .await
            .unwrap();

        assert_eq!(summary, RunSummary::default());
        assert_eq!(store.count().unwrap(), 0);
    }

    const AI_FEED: &str = r#"<rss><channel>
        <item><title>AI breakthrough announced</title><link>https://feed.test/ai-1</link></item>
        <item><title>New AI chip ships</title><link>https://feed.test/ai-2</link></item>
        <item><title>Gardening on a budget</title><link>https://feed.test/garden</link></item>
    </channel></rss>"#;

    struct CannedSearch;

    #[async_trait]
    impl Source for CannedSearch {
        async fn fetch(&self, _client: &reqwest::Client, keyword: &str) -> FetchResult {
            let query = SourceQuery {
                keyword: keyword.to_string(),
                source_name: "search.test".to_string(),
                kind: SourceKind::HtmlSearch,
            };
            let records = vec![
                CanonicalRecord::new("AI roundup", "https://search.test/a", "search.test"),
                CanonicalRecord::new("AI in practice", "https://search.test/b", "search.test"),
            ];
            FetchResult::success(query, records)
        }

        fn name(&self) -> &str {
            "search.test"
        }
    }

    #[tokio::test]
    async fn test_second_identical_run_inserts_nothing() {
        let sources: Vec<Box<dyn Source>> = vec![
            Box::new(CannedFeed {
                origin: "feed.test",
                xml: AI_FEED,
            }),
            Box::new(CannedSearch),
        ];
        let mut store = ArticleStore::open_in_memory().unwrap();
        let client = client();
        let words = keywords(&["ai"]);

        let first = run_with_sources(&client, &sources, &words, &mut store)
            .await
            .unwrap();
        assert_eq!(first.fetched, 4); // 2 matching feed entries + 2 search blocks
        assert_eq!(first.inserted, 4);
        assert_eq!(first.duplicates, 0);
        assert_eq!(store.count().unwrap(), 4);

        let second = run_with_sources(&client, &sources, &words, &mut store)
            .await
            .unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.duplicates, 4);
        assert_eq!(store.count().unwrap(), 4);
    }
}
