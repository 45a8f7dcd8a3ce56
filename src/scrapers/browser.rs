use crate::scrapers::error::{Result, ScrapeError};
use crate::scrapers::traits::PageFetcher;
use crate::scrapers::types::ScraperConfig;
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Fetcher that renders pages in headless Chrome before returning the DOM
pub struct BrowserFetcher {
    browser: Browser,
    settle: Duration,
}

impl BrowserFetcher {
    /// Launch a headless Chrome instance
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .map_err(|e| ScrapeError::Browser(format!("failed to build launch options: {e}")))?;

        let browser = Browser::new(options)
            .map_err(|e| ScrapeError::Browser(format!("failed to launch Chrome: {e}")))?;

        Ok(Self {
            browser,
            settle: config.browser_settle(),
        })
    }

    fn render(browser: &Browser, url: &str, settle: Duration) -> anyhow::Result<String> {
        let tab = browser.new_tab()?;

        tab.navigate_to(url)?;
        tab.wait_until_navigated()?;

        // Client-side rendering keeps going after the load event
        thread::sleep(settle);

        let html = tab.get_content()?;
        let _ = tab.close(true);

        Ok(html)
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Rendering URL: {}", url);

        let browser = self.browser.clone();
        let target = url.to_string();
        let settle = self.settle;

        let html = tokio::task::spawn_blocking(move || Self::render(&browser, &target, settle))
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))?
            .map_err(|e| ScrapeError::Browser(format!("{url}: {e}")))?;

        debug!("Rendered {} bytes of HTML", html.len());
        Ok(html)
    }

    fn name(&self) -> &'static str {
        "headless-chrome"
    }
}
