pub mod browser;
pub mod error;
pub mod extract;
pub mod http;
pub mod kijiji;
pub mod traits;
pub mod types;

#[cfg(test)]
mod fixtures;

pub use browser::BrowserFetcher;
pub use http::HttpFetcher;
pub use kijiji::KijijiScraper;
pub use traits::PageFetcher;
pub use types::ScraperConfig;
