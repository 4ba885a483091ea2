use std::collections::HashSet;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::{
    common::prelude::{
        deduplicate, ArticleRecord, ConfigError, FetchOutcome, Normalizer, Scrape, SourceTag,
    },
    config::MarkupSource,
    transport::{Headers, Transport},
};

struct Section {
    /// Path as configured, used in logs
    label: String,
    url: Url,
}

/// Scrapes headline anchors from the section pages of one site
pub struct MarkupScraper {
    source: SourceTag,
    sections: Vec<Section>,
    selector: Selector,
    link_pattern: Regex,
    headers: Headers,
    normalizer: Normalizer,
    transport: Transport,
}

impl MarkupScraper {
    pub fn new(
        config: &MarkupSource,
        transport: Transport,
        min_title_len: usize,
    ) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&config.base_url)?;
        let selector = Selector::parse(&config.selector).map_err(|e| ConfigError::Selector {
            selector: config.selector.clone(),
            reason: e.to_string(),
        })?;
        let link_pattern = Regex::new(&config.link_pattern)?;

        let sections = config
            .sections
            .iter()
            .map(|section| -> Result<Section, url::ParseError> {
                Ok(Section {
                    label: if section.is_empty() {
                        "/".to_string()
                    } else {
                        section.clone()
                    },
                    url: base_url.join(section)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: config.tag,
            sections,
            selector,
            link_pattern,
            headers: config.headers.clone(),
            normalizer: Normalizer::new(config.tag, base_url, min_title_len),
            transport,
        })
    }

    /// Extract the articles of one section page. A URL linked several times
    /// keeps the first anchor that makes a valid article.
    #[must_use]
    pub fn extract(&self, payload: &str) -> Vec<ArticleRecord> {
        let document = Html::parse_document(payload);
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut articles = Vec::new();

        for element in document.select(&self.selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if !self.link_pattern.is_match(href) {
                continue;
            }

            let text = element.text().collect::<Vec<_>>().join(" ");
            match self.normalizer.normalize(&text, href, None) {
                Ok(article) => {
                    if seen_urls.insert(article.url.clone()) {
                        articles.push(article);
                    }
                }
                Err(reason) => debug!(source = %self.source, %href, %reason, "Skipping anchor"),
            }
        }

        articles
    }

    #[instrument(level = "debug", skip_all, fields(source = %self.source, section = %section.label))]
    async fn scrape_section(&self, section: &Section) -> FetchOutcome {
        match self.transport.fetch(section.url.as_str(), &self.headers).await {
            Ok(payload) => FetchOutcome::from_articles(self.extract(&payload)),
            Err(e) => FetchOutcome::Failed(e),
        }
    }
}

impl Scrape for MarkupScraper {
    fn source(&self) -> SourceTag {
        self.source
    }

    async fn scrape(&self) -> Vec<ArticleRecord> {
        let mut collected = Vec::new();

        for section in &self.sections {
            match self.scrape_section(section).await {
                FetchOutcome::Articles(articles) => {
                    info!(source = %self.source, section = %section.label, count = articles.len(), "Found articles");
                    collected.extend(articles);
                }
                FetchOutcome::Empty => {
                    info!(source = %self.source, section = %section.label, count = 0, "Found articles");
                }
                FetchOutcome::Failed(e) => {
                    error!(source = %self.source, section = %section.label, error = %e, "Section failed");
                }
            }
        }

        let unique = deduplicate(&collected);
        info!(source = %self.source, count = unique.len(), "Unique articles");
        unique
    }
}
