#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
mod arg_parse;
mod common;
mod config;
mod feeds;
mod markup;
mod report;
mod runner;
mod schemas;
mod storage;
mod transport;
mod vacuum;

use std::num::NonZeroU32;

use tracing::{debug, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use crate::{
    arg_parse::{CmdArgs, Operation},
    config::{AppConfig, DB_PATH_ENV},
    runner::Runner,
    storage::Storage,
    vacuum::Vacuum,
};

const PROD_ENV_FILE: &str = "/var/lib/news-scraper/.env";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    // production env file first; dotenvy never overrides what is already set
    dotenvy::from_path(PROD_ENV_FILE).ok();
    dotenvy::dotenv().ok();

    let args = &CmdArgs::parse(std::env::args().collect())?;
    debug!(?args, "Parsed CLI arguments");
    let config = AppConfig::load(&args.config)?.with_db_path(std::env::var(DB_PATH_ENV).ok());
    let mut storage = Storage::open(&config.get_db_file())?;

    match args.get_action() {
        Operation::Scrape => {
            let summary = Runner::new(&config)?.run(&mut storage).await?;
            println!("{}", report::summary_to_text(&summary));
        }
        Operation::Recent { limit, source } => {
            let articles = storage.recent(limit, source)?;
            println!("{}", report::recent_to_text(&articles));
        }
        Operation::Cleanup { days } => {
            let days = match days {
                Some(days) => days,
                None => NonZeroU32::new(config.retention_days).ok_or("retention_days must be positive")?,
            };
            let deleted = Vacuum::new(&mut storage).sweep(days)?;
            let remaining = storage.count(None)?;
            println!("{}", report::cleanup_to_text(deleted, days.get(), remaining));
        }
    }

    info!("Done");
    Ok(())
}
