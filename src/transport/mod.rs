use std::{collections::BTreeMap, time::Duration};

use reqwest::Client;
use tracing::debug;

use crate::common::prelude::{ConfigError, ScrapeError};

/// Header set sent with every request of a source
pub type Headers = BTreeMap<String, String>;

/// Thin HTTP layer shared by all scrapers. Timeouts and status checks
/// happen here; callers only see a payload or a [`ScrapeError`].
#[derive(Clone, Debug)]
pub struct Transport {
    client: Client,
}

impl Transport {
    pub fn new(timeout_secs: u64) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client })
    }

    /// GET the URL and return the body as text; non-2xx statuses are errors
    pub async fn fetch(&self, url: &str, headers: &Headers) -> Result<String, ScrapeError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?.error_for_status()?;
        let body = response.text().await?;
        debug!(%url, bytes = body.len(), "Fetched payload");

        Ok(body)
    }
}
