use rss::Channel;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::{
    common::prelude::{
        deduplicate, ArticleRecord, ConfigError, FetchOutcome, Normalizer, Scrape, ScrapeError,
        SourceTag,
    },
    config::{FeedSource, FeedTopic},
    transport::{Headers, Transport},
};

use super::prelude::FeedEntry;

/// Scrapes the RSS topic feeds of one source
pub struct FeedScraper {
    source: SourceTag,
    topics: Vec<FeedTopic>,
    headers: Headers,
    normalizer: Normalizer,
    transport: Transport,
}

impl FeedScraper {
    pub fn new(
        config: &FeedSource,
        transport: Transport,
        min_title_len: usize,
    ) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&config.base_url)?;

        Ok(Self {
            source: config.tag,
            topics: config.topics.clone(),
            headers: config.headers.clone(),
            normalizer: Normalizer::new(config.tag, base_url, min_title_len),
            transport,
        })
    }

    /// Parse a feed payload into articles; items without a title or a link
    /// and items failing normalization are dropped.
    pub fn extract(&self, payload: &str) -> Result<Vec<ArticleRecord>, ScrapeError> {
        let channel = Channel::read_from(payload.as_bytes())?;

        let articles: Vec<ArticleRecord> = channel
            .items()
            .iter()
            .map(FeedEntry::from)
            .filter_map(|entry| {
                let (Some(title), Some(link)) = (entry.display_title(), entry.link.as_deref())
                else {
                    return None;
                };
                self.normalizer
                    .normalize(&title, link, entry.pub_date.as_deref())
                    .map_err(|reason| debug!(source = %self.source, %link, %reason, "Skipping item"))
                    .ok()
            })
            .collect();

        Ok(deduplicate(&articles))
    }

    #[instrument(level = "debug", skip_all, fields(source = %self.source, topic = %topic.name))]
    async fn scrape_topic(&self, topic: &FeedTopic) -> FetchOutcome {
        let payload = match self.transport.fetch(&topic.url, &self.headers).await {
            Ok(payload) => payload,
            Err(e) => return FetchOutcome::Failed(e),
        };

        match self.extract(&payload) {
            Ok(articles) => FetchOutcome::from_articles(articles),
            Err(e) => FetchOutcome::Failed(e),
        }
    }
}

impl Scrape for FeedScraper {
    fn source(&self) -> SourceTag {
        self.source
    }

    async fn scrape(&self) -> Vec<ArticleRecord> {
        let mut collected = Vec::new();

        for topic in &self.topics {
            match self.scrape_topic(topic).await {
                FetchOutcome::Articles(articles) => {
                    info!(source = %self.source, topic = %topic.name, count = articles.len(), "Found articles");
                    collected.extend(articles);
                }
                FetchOutcome::Empty => {
                    info!(source = %self.source, topic = %topic.name, count = 0, "Found articles");
                }
                FetchOutcome::Failed(e) => {
                    error!(source = %self.source, topic = %topic.name, error = %e, "Topic failed");
                }
            }
        }

        let unique = deduplicate(&collected);
        info!(source = %self.source, count = unique.len(), "Unique articles");
        unique
    }
}
