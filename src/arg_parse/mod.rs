use std::{io::Error, num::NonZeroU32};

use crate::common::prelude::SourceTag;

const DEFAULT_RECENT_LIMIT: usize = 20;

/// What the binary was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Scrape all sources and store new articles
    Scrape,
    Recent {
        limit: usize,
        source: Option<SourceTag>,
    },
    /// Sweep old articles; `None` takes the threshold from the config
    Cleanup { days: Option<NonZeroU32> },
}

#[derive(Debug, Clone)]
pub struct CmdArgs {
    pub config: String,
    pub recent: bool,
    pub limit: usize,
    pub source: Option<SourceTag>,
    pub cleanup: bool,
    pub days: Option<NonZeroU32>,
}

impl CmdArgs {
    pub fn parse(args: Vec<String>) -> Result<Self, Error> {
        let mut config = String::from("./config.json");
        let mut recent = false;
        let mut limit = DEFAULT_RECENT_LIMIT;
        let mut source: Option<SourceTag> = None;
        let mut cleanup = false;
        let mut days: Option<u32> = None;
        {
            let mut ap = argparse::ArgumentParser::new();
            ap.set_description("News Scraper - BBC, AP News and Google News headlines");
            ap.refer(&mut config).add_option(
                &["-c", "--config"],
                argparse::Store,
                "Config file path; default is config.json",
            );
            ap.refer(&mut recent).add_option(
                &["--recent"],
                argparse::StoreTrue,
                "Show recent articles instead of scraping",
            );
            ap.refer(&mut limit).add_option(
                &["--limit"],
                argparse::Store,
                "Number of recent articles to show (default: 20)",
            );
            ap.refer(&mut source).add_option(
                &["-s", "--source"],
                argparse::StoreOption,
                "Show recent articles of one source only: bbc, ap or google_news",
            );
            ap.refer(&mut cleanup).add_option(
                &["--cleanup"],
                argparse::StoreTrue,
                "Delete articles older than --days days",
            );
            ap.refer(&mut days).add_option(
                &["--days"],
                argparse::StoreOption,
                "Retention threshold in days for --cleanup (default: 3)",
            );

            match ap.parse(args, &mut std::io::stdout(), &mut std::io::stderr()) {
                Ok(()) => {}
                Err(_) => {
                    return Err(Error::from(std::io::ErrorKind::InvalidInput));
                }
            }
        }

        if recent && cleanup {
            return Err(Error::new(
                std::io::ErrorKind::InvalidInput,
                "--recent and --cleanup cannot be combined",
            ));
        }
        let days = match days {
            Some(d) => Some(NonZeroU32::new(d).ok_or_else(|| {
                Error::new(std::io::ErrorKind::InvalidInput, "--days must be positive")
            })?),
            None => None,
        };

        Ok(CmdArgs {
            config,
            recent,
            limit,
            source,
            cleanup,
            days,
        })
    }

    #[must_use]
    pub fn get_action(&self) -> Operation {
        if self.cleanup {
            Operation::Cleanup { days: self.days }
        } else if self.recent {
            Operation::Recent {
                limit: self.limit,
                source: self.source,
            }
        } else {
            Operation::Scrape
        }
    }
}
