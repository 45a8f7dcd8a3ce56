use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scraper settings, loadable from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Origin that relative listing and category links resolve against
    pub base_url: String,
    /// User agent sent with every HTTP request
    pub user_agent: String,
    /// HTTP request timeout (seconds)
    pub timeout_secs: u64,
    /// Pause after each listing fetch within a page (milliseconds)
    pub request_delay_ms: u64,
    /// Time the headless browser waits for client-side rendering (milliseconds)
    pub browser_settle_ms: u64,
}

impl ScraperConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn browser_settle(&self) -> Duration {
        Duration::from_millis(self.browser_settle_ms)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.kijiji.ca".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            timeout_secs: 30,
            request_delay_ms: 500,
            browser_settle_ms: 2000,
        }
    }
}
