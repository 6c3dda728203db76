//! Run configuration: keyword list, source registry, and storage location.
//!
//! Configuration is an explicit value handed to the pipeline, never ambient
//! state. It can be loaded from a YAML file or fall back to the built-in
//! registry (lenta.ru RSS plus habr.com search).
//!
//! # Example file
//!
//! ```yaml
//! keywords:
//!   - python
//!   - rust
//! sources:
//!   - name: lenta.ru
//!     kind: rss
//!     url: https://lenta.ru/rss/news
//!   - name: habr.com
//!     kind: html_search
//!     url: "https://habr.com/ru/search/?q={keyword}&target_type=posts&order=date"
//!     base_url: https://habr.com
//!     selectors:
//!       article: article.tm-articles-list__item
//!       title_link: a.tm-title__link
//! database_path: articles.db
//! fetch_timeout_secs: 15
//! ```

use crate::models::SourceKind;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;

/// CSS selectors for scanning an HTML search results page.
///
/// Search-page markup is owned by the remote site and changes under us, so
/// the selectors live in configuration rather than code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HtmlSelectors {
    /// Selector matching each repeating article block.
    pub article: String,
    /// Selector matching the title link inside one block.
    pub title_link: String,
}

/// One configured content origin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceSpec {
    /// Origin name recorded on every article collected from this source.
    pub name: String,
    /// How the source is fetched and parsed.
    pub kind: SourceKind,
    /// Endpoint URL. For `html_search` sources, `{keyword}` is replaced with
    /// the URL-encoded keyword; for `rss` sources the URL is fetched as-is.
    pub url: String,
    /// Base origin used to resolve relative article links (`html_search` only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Markup selectors (`html_search` only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectors: Option<HtmlSelectors>,
}

/// Full configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Keywords to search every source for, in order.
    pub keywords: Vec<String>,
    /// Registry of content origins to fetch from.
    pub sources: Vec<SourceSpec>,
    /// SQLite database file path.
    pub database_path: String,
    /// Upper bound on any single fetch, in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            keywords: vec![
                "python".to_string(),
                "искусственный интеллект".to_string(),
            ],
            sources: vec![
                SourceSpec {
                    name: "lenta.ru".to_string(),
                    kind: SourceKind::Rss,
                    url: "https://lenta.ru/rss/news".to_string(),
                    base_url: None,
                    selectors: None,
                },
                SourceSpec {
                    name: "habr.com".to_string(),
                    kind: SourceKind::HtmlSearch,
                    url: "https://habr.com/ru/search/?q={keyword}&target_type=posts&order=date"
                        .to_string(),
                    base_url: Some("https://habr.com".to_string()),
                    selectors: Some(HtmlSelectors {
                        article: "article.tm-articles-list__item".to_string(),
                        title_link: "a.tm-title__link".to_string(),
                    }),
                },
            ],
            database_path: "articles.db".to_string(),
            fetch_timeout_secs: 15,
        }
    }
}

impl AppConfig {
    /// Parse a configuration document from YAML text.
    ///
    /// Missing fields fall back to the built-in defaults, so a file may
    /// override only the keywords, for example.
    pub fn from_yaml(text: &str) -> Result<Self, Box<dyn Error>> {
        let config: AppConfig = serde_yaml::from_str(text)?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }
}
