use crate::scrapers::error::{Result, ScrapeError};
use crate::scrapers::traits::PageFetcher;
use crate::scrapers::types::ScraperConfig;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

/// Plain HTTP fetcher backed by reqwest
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching URL: {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            warn!("{} returned status: {}", url, response.status());
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let html = response.text().await?;
        debug!("Downloaded {} bytes of HTML", html.len());

        Ok(html)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
