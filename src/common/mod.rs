use std::{collections::HashSet, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod errors;
mod normalizer;
mod repository;

pub use errors::*;

/// Origin extractor of an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    Bbc,
    Ap,
    GoogleNews,
}

impl SourceTag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceTag::Bbc => "bbc",
            SourceTag::Ap => "ap",
            SourceTag::GoogleNews => "google_news",
        }
    }

    /// Human readable name for summaries and logs
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            SourceTag::Bbc => "BBC",
            SourceTag::Ap => "AP",
            SourceTag::GoogleNews => "Google News",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bbc" => Ok(SourceTag::Bbc),
            "ap" => Ok(SourceTag::Ap),
            "google_news" => Ok(SourceTag::GoogleNews),
            other => Err(format!("unknown source: {other}")),
        }
    }
}

/// A normalized headline; `url` is the canonical key
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    pub source: SourceTag,
    pub url: String,
    pub title: String,
    pub published_at: Option<DateTime<Utc>>,
    pub scraped_at: DateTime<Utc>,
}

/// Result of fetching and extracting one sub-endpoint (a section page or a feed topic)
#[derive(Debug)]
pub enum FetchOutcome {
    Articles(Vec<ArticleRecord>),
    Empty,
    Failed(ScrapeError),
}

impl FetchOutcome {
    #[must_use]
    pub fn from_articles(articles: Vec<ArticleRecord>) -> Self {
        if articles.is_empty() {
            FetchOutcome::Empty
        } else {
            FetchOutcome::Articles(articles)
        }
    }
}

pub trait Scrape {
    fn source(&self) -> SourceTag;

    /// Fetch every sub-endpoint of the source and return its unique articles.
    /// Sub-endpoint failures are logged and contribute nothing.
    async fn scrape(&self) -> Vec<ArticleRecord>;
}

/// De-duplicate the articles, keeping the first one seen for every URL.
#[must_use]
pub fn deduplicate(items: &[ArticleRecord]) -> Vec<ArticleRecord> {
    let mut urls: HashSet<&str> = HashSet::new();

    items
        .iter()
        .filter(|item| urls.insert(item.url.as_str()))
        .cloned()
        .collect()
}

pub mod prelude {
    pub use super::errors::*;
    pub use super::normalizer::*;
    pub use super::repository::*;
    pub use super::{deduplicate, ArticleRecord, FetchOutcome, Scrape, SourceTag};
}
