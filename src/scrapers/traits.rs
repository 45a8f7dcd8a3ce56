use crate::scrapers::error::Result;
use async_trait::async_trait;

/// Source of raw page HTML
/// Swapping implementations lets the same extraction run over plain HTTP,
/// a headless browser, or canned pages in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page body at `url`
    async fn fetch(&self, url: &str) -> Result<String>;

    /// Get the name of the fetcher
    fn name(&self) -> &'static str;
}
