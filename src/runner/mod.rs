use std::time::Duration;

use tracing::{error, info, warn};

use crate::{
    common::prelude::{deduplicate, ArticleRecord, ConfigError, Scrape, SourceTag, StorageError},
    config::{AppConfig, SourceConfig},
    feeds::prelude::FeedScraper,
    markup::prelude::MarkupScraper,
    storage::{ReconcileReport, Storage},
    transport::Transport,
};

pub enum Scraper {
    Markup(MarkupScraper),
    Feed(FeedScraper),
}

impl Scrape for Scraper {
    fn source(&self) -> SourceTag {
        match self {
            Scraper::Markup(scraper) => scraper.source(),
            Scraper::Feed(scraper) => scraper.source(),
        }
    }

    async fn scrape(&self) -> Vec<ArticleRecord> {
        match self {
            Scraper::Markup(scraper) => scraper.scrape().await,
            Scraper::Feed(scraper) => scraper.scrape().await,
        }
    }
}

/// What a scrape-and-persist pass did
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Unique articles collected over all sources
    pub collected: usize,
    /// `None` when nothing was collected and the store was not touched
    pub report: Option<ReconcileReport>,
    /// Stored article count per configured source, after the run
    pub per_source: Vec<(SourceTag, i64)>,
    pub total: i64,
}

/// Runs every configured source one after another and persists the result
pub struct Runner {
    scrapers: Vec<Scraper>,
    sources: Vec<SourceTag>,
    source_delay: Duration,
}

impl Runner {
    /// Build the scrapers of the configured sources. A source with a broken
    /// configuration is logged and left out; the others still run.
    pub fn new(config: &AppConfig) -> Result<Self, ConfigError> {
        let transport = Transport::new(config.request_timeout_secs)?;

        let mut scrapers = Vec::new();
        for source in &config.sources {
            let scraper = match source {
                SourceConfig::Markup(markup) => {
                    MarkupScraper::new(markup, transport.clone(), config.min_title_len)
                        .map(Scraper::Markup)
                }
                SourceConfig::Feed(feed) => {
                    FeedScraper::new(feed, transport.clone(), config.min_title_len)
                        .map(Scraper::Feed)
                }
            };
            match scraper {
                Ok(scraper) => scrapers.push(scraper),
                Err(e) => error!(source = %source.tag(), error = %e, "Invalid source configuration"),
            }
        }

        Ok(Self {
            scrapers,
            sources: config.source_tags(),
            source_delay: Duration::from_secs(config.source_delay_secs),
        })
    }

    /// Scrape all sources in order, pausing between them, and merge the results
    pub async fn collect(&self) -> Vec<ArticleRecord> {
        let mut all_articles = Vec::new();

        for (i, scraper) in self.scrapers.iter().enumerate() {
            if i > 0 && !self.source_delay.is_zero() {
                tokio::time::sleep(self.source_delay).await;
            }

            let source = scraper.source();
            info!(source = %source, "Scraping {}", source.display_name());
            let articles = scraper.scrape().await;
            info!(source = %source, count = articles.len(), "Collected articles");
            all_articles.extend(articles);
        }

        deduplicate(&all_articles)
    }

    /// One full pass: collect, persist, and read back the totals
    pub async fn run(&self, storage: &mut Storage) -> Result<RunSummary, StorageError> {
        info!("Starting news scraper");
        let articles = self.collect().await;

        let report = if articles.is_empty() {
            warn!("No articles collected");
            None
        } else {
            Some(storage.reconcile(&articles)?)
        };

        let mut per_source = Vec::with_capacity(self.sources.len());
        for tag in &self.sources {
            per_source.push((*tag, storage.count(Some(*tag))?));
        }

        Ok(RunSummary {
            collected: articles.len(),
            report,
            per_source,
            total: storage.count(None)?,
        })
    }
}
