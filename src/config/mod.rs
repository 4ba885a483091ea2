use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::{
    common::prelude::{ConfigError, SourceTag, DEFAULT_MIN_TITLE_LEN},
    transport::Headers,
};

const DEFAULT_DB_FILE: &str = "./articles.db";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Environment variable overriding `db_file`
pub const DB_PATH_ENV: &str = "NEWS_SCRAPER_DB_PATH";

/// A source listing headlines on HTML section pages
#[derive(Debug, Clone, Deserialize)]
pub struct MarkupSource {
    pub tag: SourceTag,
    pub base_url: String,
    /// Section paths relative to `base_url`; `""` is the home page
    pub sections: Vec<String>,
    /// CSS selector for the headline anchors
    pub selector: String,
    /// Regex an anchor's `href` must match to count as an article
    pub link_pattern: String,
    #[serde(default = "default_headers")]
    pub headers: Headers,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedTopic {
    pub name: String,
    pub url: String,
}

/// A source exposing RSS topic feeds
#[derive(Debug, Clone, Deserialize)]
pub struct FeedSource {
    pub tag: SourceTag,
    pub base_url: String,
    pub topics: Vec<FeedTopic>,
    #[serde(default = "default_headers")]
    pub headers: Headers,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Markup(MarkupSource),
    Feed(FeedSource),
}

impl SourceConfig {
    #[must_use]
    pub fn tag(&self) -> SourceTag {
        match self {
            SourceConfig::Markup(source) => source.tag,
            SourceConfig::Feed(source) => source.tag,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db_file: Option<String>,
    pub request_timeout_secs: u64,
    /// Pause between two sources of one run
    pub source_delay_secs: u64,
    pub min_title_len: usize,
    pub retention_days: u32,
    pub sources: Vec<SourceConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_file: None,
            request_timeout_secs: 15,
            source_delay_secs: 2,
            min_title_len: DEFAULT_MIN_TITLE_LEN,
            retention_days: 3,
            sources: default_sources(),
        }
    }
}

impl AppConfig {
    pub fn from_file(file_name: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(file_name)?;
        Self::from_str(&contents)
    }

    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(contents)?;

        Ok(config)
    }

    /// Read the config file if there is one, fall back to the built-in sources otherwise
    pub fn load(file_name: &str) -> Result<Self, ConfigError> {
        if Path::new(file_name).exists() {
            info!(path = file_name, "Loading configuration");
            Self::from_file(file_name)
        } else {
            info!(path = file_name, "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Apply the database path taken from the environment, if any
    #[must_use]
    pub fn with_db_path(mut self, db_path: Option<String>) -> Self {
        if let Some(path) = db_path.filter(|p| !p.trim().is_empty()) {
            self.db_file = Some(path);
        }
        self
    }

    #[must_use]
    pub fn get_db_file(&self) -> String {
        self.db_file
            .clone()
            .unwrap_or_else(|| DEFAULT_DB_FILE.to_string())
    }

    /// Tags of the configured sources, in run order
    #[must_use]
    pub fn source_tags(&self) -> Vec<SourceTag> {
        self.sources.iter().map(SourceConfig::tag).collect()
    }
}

fn default_headers() -> Headers {
    Headers::from([("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string())])
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn default_sources() -> Vec<SourceConfig> {
    const GOOGLE_NEWS_TOPICS: [(&str, &str); 5] = [
        ("world", "https://news.google.com/rss/topics/CAAqJggKIiBDQkFTRWdvSUwyMHZNRGx1YlY4U0FtVnVHZ0pWVXlnQVAB"),
        ("us", "https://news.google.com/rss/topics/CAAqIggKIhxDQkFTRHdvSkwyMHZNRGxqTjNjd0VnSmxiaWdBUAE"),
        ("business", "https://news.google.com/rss/topics/CAAqJggKIiBDQkFTRWdvSUwyMHZNRGx6TVdZU0FtVnVHZ0pWVXlnQVAB"),
        ("technology", "https://news.google.com/rss/topics/CAAqJggKIiBDQkFTRWdvSUwyMHZNRGRqTVhZU0FtVnVHZ0pWVXlnQVAB"),
        ("sports", "https://news.google.com/rss/topics/CAAqJggKIiBDQkFTRWdvSUwyMHZNRFp1ZEdvU0FtVnVHZ0pWVXlnQVAB"),
    ];

    vec![
        SourceConfig::Markup(MarkupSource {
            tag: SourceTag::Bbc,
            base_url: "https://www.bbc.com".to_string(),
            sections: strings(&["/news/world", "/news/business", "/news/technology"]),
            selector: "a[href]".to_string(),
            link_pattern: "/news/articles/".to_string(),
            headers: default_headers(),
        }),
        SourceConfig::Markup(MarkupSource {
            tag: SourceTag::Ap,
            base_url: "https://apnews.com".to_string(),
            sections: strings(&["", "/world-news", "/business", "/technology"]),
            selector: "h3.PagePromo-title a[href]".to_string(),
            link_pattern: "/article/".to_string(),
            headers: default_headers(),
        }),
        SourceConfig::Feed(FeedSource {
            tag: SourceTag::GoogleNews,
            base_url: "https://news.google.com".to_string(),
            topics: GOOGLE_NEWS_TOPICS
                .iter()
                .map(|(name, url)| FeedTopic {
                    name: (*name).to_string(),
                    url: (*url).to_string(),
                })
                .collect(),
            headers: default_headers(),
        }),
    ]
}
