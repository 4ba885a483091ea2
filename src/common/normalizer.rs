use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;
use url::Url;

use super::{ArticleRecord, SourceTag};

pub const DEFAULT_MIN_TITLE_LEN: usize = 10;

/// Why a raw candidate did not become an article. Noise, not a failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("empty title")]
    EmptyTitle,
    #[error("title too short ({0} chars)")]
    ShortTitle(usize),
    #[error("unresolvable link `{0}`")]
    UnresolvableLink(String),
}

/// Turns raw (title, link, publish date) triples of one source into articles
#[derive(Debug, Clone)]
pub struct Normalizer {
    source: SourceTag,
    base_url: Url,
    min_title_len: usize,
}

impl Normalizer {
    #[must_use]
    pub fn new(source: SourceTag, base_url: Url, min_title_len: usize) -> Self {
        Self {
            source,
            base_url,
            min_title_len,
        }
    }

    pub fn normalize(
        &self,
        raw_title: &str,
        raw_link: &str,
        raw_published_at: Option<&str>,
    ) -> Result<ArticleRecord, Rejection> {
        self.normalize_at(raw_title, raw_link, raw_published_at, Utc::now())
    }

    /// Same as [`Normalizer::normalize`] with an explicit capture time.
    pub fn normalize_at(
        &self,
        raw_title: &str,
        raw_link: &str,
        raw_published_at: Option<&str>,
        scraped_at: DateTime<Utc>,
    ) -> Result<ArticleRecord, Rejection> {
        let url = self.resolve_link(raw_link)?;

        let title = clean_title(raw_title);
        let title_len = title.chars().count();
        if title_len == 0 {
            return Err(Rejection::EmptyTitle);
        }
        if title_len < self.min_title_len {
            return Err(Rejection::ShortTitle(title_len));
        }

        Ok(ArticleRecord {
            source: self.source,
            url,
            title,
            published_at: raw_published_at.and_then(parse_published_at),
            // storage keeps microseconds
            scraped_at: scraped_at.trunc_subsecs(6),
        })
    }

    /// Absolute http(s) links are kept as they are, site-relative ones are
    /// joined onto the source origin; anything else is not guessed at.
    /// Protocol-relative links (`//host/path`) are only taken when they point
    /// at the source's own host.
    pub fn resolve_link(&self, raw_link: &str) -> Result<String, Rejection> {
        let link = raw_link.trim();
        let unresolvable = || Rejection::UnresolvableLink(link.to_string());

        if link.starts_with("//") {
            return match self.base_url.join(link) {
                Ok(joined) if joined.host() == self.base_url.host() => Ok(joined.into()),
                _ => Err(unresolvable()),
            };
        }
        if link.starts_with('/') {
            return self
                .base_url
                .join(link)
                .map(String::from)
                .map_err(|_| unresolvable());
        }

        match Url::parse(link) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
                Ok(link.to_string())
            }
            _ => Err(unresolvable()),
        }
    }
}

/// Trim and collapse runs of whitespace (markup text nodes carry newlines and indentation)
#[must_use]
pub fn clean_title(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a feed date (RFC 2822, or RFC 3339 as a fallback) into UTC
#[must_use]
pub fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
