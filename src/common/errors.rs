use thiserror::Error;

/// Problems loading or interpreting the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("Invalid link pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Failure of a single sub-endpoint fetch; never escapes a scraper
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("parsing failed: {0}")]
    Payload(String),
}

impl From<rss::Error> for ScrapeError {
    fn from(e: rss::Error) -> Self {
        ScrapeError::Payload(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("Database query: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Database migration: {0}")]
    Migration(String),

    #[error("Corrupt row {id}: {reason}")]
    Corrupt { id: i32, reason: String },
}
