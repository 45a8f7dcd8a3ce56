use crate::models::{CategoryContext, Listing, SubcategoryEntry};
use crate::scrapers::error::{Result, ScrapeError};
use crate::scrapers::extract;
use crate::scrapers::traits::PageFetcher;
use crate::scrapers::types::ScraperConfig;
use chrono::Utc;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

const RESULT_ADS: &str = "div.container-results.large-images div[data-ad-id][data-vip-url]";
const RESULTS_SUMMARY: &str = "div.col-2 div.top-bar div.showing";
const SUBCATEGORY_LINKS: &str =
    "div.content li a.category-selected[data-event=\"ChangeCategory\"]";

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));
static CATEGORY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/c(\d+)l\d{4}").expect("valid regex"));
static LOCATION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/c\d+l(\d+)").expect("valid regex"));

/// Counts from the "Showing X - Y out of Z Ads" banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultsSummary {
    pub first: u64,
    pub last: u64,
    pub total: u64,
}

impl ResultsSummary {
    /// Parse the banner text; thousands separators are ignored
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.replace(',', "");
        let numbers: Vec<u64> = DIGITS
            .find_iter(&text)
            .filter_map(|m| m.as_str().parse().ok())
            .collect();

        match numbers.as_slice() {
            [first, last, total, ..] => Some(Self {
                first: *first,
                last: *last,
                total: *total,
            }),
            _ => None,
        }
    }
}

/// One fetched page of category results
///
/// A new value is produced on every page transition; nothing is mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPage {
    pub url: String,
    pub page_number: u32,
    pub context: CategoryContext,
    pub listing_urls: Vec<String>,
    pub summary: Option<ResultsSummary>,
}

impl CategoryPage {
    /// Whether the results banner shows every available ad
    pub fn is_last_page(&self) -> Result<bool> {
        let Some(summary) = self.summary else {
            error!("results summary not found on {}", self.url);
            return Err(ScrapeError::MissingField("results summary"));
        };

        debug!(
            "Showing {} - {} out of {} on page {}",
            summary.first, summary.last, summary.total, self.page_number
        );
        Ok(summary.last >= summary.total)
    }
}

/// Outcome of moving to the following results page
#[derive(Debug)]
pub enum PageAdvance {
    Exhausted,
    Next {
        page: CategoryPage,
        listings: Vec<Listing>,
    },
}

/// Scraper for Kijiji real-estate categories and listings
pub struct KijijiScraper {
    fetcher: Arc<dyn PageFetcher>,
    base_url: Url,
    request_delay: Duration,
}

impl KijijiScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &ScraperConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ScrapeError::InvalidInput(format!("base URL {:?}: {e}", config.base_url))
        })?;

        debug!("Using {} fetcher against {}", fetcher.name(), base_url);

        Ok(Self {
            fetcher,
            base_url,
            request_delay: config.request_delay(),
        })
    }

    /// Category id: the digits between `/c` and `l<location>`
    pub fn category_id(url: &str) -> Result<u64> {
        Self::capture_id(&CATEGORY_ID, url, "category id")
    }

    /// Location id: the digits after `l` in the `/c<category>l<location>` segment
    pub fn location_id(url: &str) -> Result<u64> {
        Self::capture_id(&LOCATION_ID, url, "location id")
    }

    fn capture_id(pattern: &Regex, url: &str, what: &str) -> Result<u64> {
        pattern
            .captures(url)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .ok_or_else(|| {
                error!("{} extraction unsuccessful for {}", what, url);
                ScrapeError::InvalidCategoryUrl {
                    url: url.to_string(),
                    reason: format!("no {what}"),
                }
            })
    }

    /// Category context encoded in `url`
    pub fn category_context(url: &str) -> Result<CategoryContext> {
        Ok(CategoryContext {
            category_id: Self::category_id(url)?,
            location_id: Self::location_id(url)?,
        })
    }

    /// URL of results page `page_number` for the category at `url`
    ///
    /// Kijiji paginates by path: `/{section}/{subsection}/page-N/{id}`.
    pub fn next_page_url(url: &str, page_number: u32) -> Result<String> {
        let invalid = |reason: &str| ScrapeError::InvalidCategoryUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let mut parsed = Url::parse(url).map_err(|e| invalid(&e.to_string()))?;

        let segments: Vec<String> = parsed
            .path_segments()
            .ok_or_else(|| invalid("URL has no path"))?
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        let [section, subsection, .., last] = segments.as_slice() else {
            return Err(invalid("expected /{section}/{subsection}/.../{id}"));
        };

        let path = format!("/{section}/{subsection}/page-{page_number}/{last}");
        parsed.set_path(&path);

        Ok(parsed.into())
    }

    /// Fetch page `page_number` of the category at `url`
    pub async fn begin_category(&self, url: &str, page_number: u32) -> Result<CategoryPage> {
        if url.trim().is_empty() {
            error!("category URL is empty");
            return Err(ScrapeError::InvalidInput("category URL is empty".to_string()));
        }

        let context = Self::category_context(url)?;

        info!("Opening category page {}: {}", page_number, url);
        let html = self.fetcher.fetch(url).await?;

        let (listing_urls, summary) = {
            let document = Html::parse_document(&html);
            (
                self.listing_urls_on_page(&document),
                Self::results_summary(&document),
            )
        };

        Ok(CategoryPage {
            url: url.to_string(),
            page_number,
            context,
            listing_urls,
            summary,
        })
    }

    /// Listing URLs in the results container, in page order
    pub fn listing_urls_on_page(&self, document: &Html) -> Vec<String> {
        let ad_selector = Selector::parse(RESULT_ADS).expect("static selector must parse");

        let urls: Vec<String> = document
            .select(&ad_selector)
            .filter_map(|ad| ad.value().attr("data-vip-url"))
            .filter_map(|href| self.resolve(href))
            .collect();

        debug!("Found {} listing URLs", urls.len());
        urls
    }

    fn results_summary(document: &Html) -> Option<ResultsSummary> {
        let summary_selector =
            Selector::parse(RESULTS_SUMMARY).expect("static selector must parse");

        document
            .select(&summary_selector)
            .next()
            .map(|el| el.text().collect::<String>())
            .and_then(|text| ResultsSummary::parse(text.trim()))
    }

    fn resolve(&self, href: &str) -> Option<String> {
        match self.base_url.join(href) {
            Ok(url) => Some(url.into()),
            Err(e) => {
                debug!("Skipping unresolvable link {:?}: {}", href, e);
                None
            }
        }
    }

    /// Fetch and assemble one listing
    ///
    /// A page missing its title is fetched once more; the second document is
    /// then used for every field.
    pub async fn scrape_listing(&self, url: &str, context: &CategoryContext) -> Result<Listing> {
        if url.trim().is_empty() {
            error!("listing URL is empty");
            return Err(ScrapeError::InvalidInput("listing URL is empty".to_string()));
        }

        let html = self.fetcher.fetch(url).await?;
        if let Some(listing) = Self::assemble_listing(&html, url, context)? {
            debug!("Listing successfully scraped");
            return Ok(listing);
        }

        info!("Re-fetching listing without a title: {}", url);
        let html = self.fetcher.fetch(url).await?;
        match Self::assemble_listing(&html, url, context)? {
            Some(listing) => {
                debug!("Listing successfully scraped");
                Ok(listing)
            }
            None => {
                error!("title not found after retry: {}", url);
                Err(ScrapeError::MissingField("title"))
            }
        }
    }

    /// Build a listing from page HTML; `Ok(None)` when the title is missing
    fn assemble_listing(
        html: &str,
        url: &str,
        context: &CategoryContext,
    ) -> Result<Option<Listing>> {
        let document = Html::parse_document(html);

        let Some(title) = extract::extract_title(&document) else {
            return Ok(None);
        };

        Ok(Some(Listing {
            url: url.to_string(),
            id: extract::extract_id(&document)?,
            category_id: context.category_id,
            location_id: context.location_id,
            title,
            address: extract::extract_address(&document)?,
            price: extract::extract_price(&document)?,
            published_at: Utc::now(),
            bedroom_count: extract::extract_bedroom_count(&document)?,
            bathroom_count: extract::extract_bathroom_count(&document)?,
            furnished: extract::extract_furnished(&document)?,
            pet_friendly: extract::extract_pet_friendly(&document)?,
            size: extract::extract_size(&document)?,
            description: extract::extract_description(&document)?,
        }))
    }

    /// Scrape every listing on `page`, pausing between fetches
    ///
    /// The first failing listing aborts the page.
    pub async fn scrape_category_page_listings(&self, page: &CategoryPage) -> Result<Vec<Listing>> {
        info!("Scraping listings from {}", page.url);

        let mut listings = Vec::with_capacity(page.listing_urls.len());
        for url in &page.listing_urls {
            listings.push(self.scrape_listing(url, &page.context).await?);
            tokio::time::sleep(self.request_delay).await;
        }

        info!(
            "Scraped {} listings from page {}",
            listings.len(),
            page.page_number
        );
        Ok(listings)
    }

    /// Move past `page`, or report that no results remain
    pub async fn advance_page(&self, page: &CategoryPage) -> Result<PageAdvance> {
        if page.is_last_page()? {
            info!("Last page reached");
            return Ok(PageAdvance::Exhausted);
        }

        let page_number = page.page_number + 1;
        info!("Scraping page number: {}", page_number);

        let next_url = Self::next_page_url(&page.url, page_number)?;
        let next = self.begin_category(&next_url, page_number).await?;
        let listings = self.scrape_category_page_listings(&next).await?;

        Ok(PageAdvance::Next {
            page: next,
            listings,
        })
    }

    /// Scrape a category from its first page until exhausted or `max_pages`
    pub async fn walk_category(&self, url: &str, max_pages: Option<u32>) -> Result<Vec<Listing>> {
        let mut page = self.begin_category(url, 1).await?;
        let mut listings = self.scrape_category_page_listings(&page).await?;

        while max_pages.map_or(true, |max| page.page_number < max) {
            match self.advance_page(&page).await? {
                PageAdvance::Exhausted => break,
                PageAdvance::Next {
                    page: next,
                    listings: mut more,
                } => {
                    listings.append(&mut more);
                    page = next;
                }
            }
        }

        info!(
            "Category {} done: {} listings over {} pages",
            page.context.category_id,
            listings.len(),
            page.page_number
        );
        Ok(listings)
    }

    /// Subcategories linked from the navigation of the page at `url`
    pub async fn discover_subcategories(&self, url: &str) -> Result<Vec<SubcategoryEntry>> {
        if url.trim().is_empty() {
            return Err(ScrapeError::InvalidInput("discovery URL is empty".to_string()));
        }

        info!("Discovering subcategories on {}", url);
        let html = self.fetcher.fetch(url).await?;
        let document = Html::parse_document(&html);
        let link_selector =
            Selector::parse(SUBCATEGORY_LINKS).expect("static selector must parse");

        let mut entries = Vec::new();
        for link in document.select(&link_selector) {
            let raw_id = link.value().attr("data-id").unwrap_or_default().trim();
            let id = raw_id.parse::<u64>().map_err(|_| ScrapeError::MalformedField {
                field: "category id",
                value: raw_id.to_string(),
            })?;

            let href = link.value().attr("href").unwrap_or_default();
            let url = self
                .resolve(href)
                .filter(|_| !href.is_empty())
                .ok_or_else(|| ScrapeError::MalformedField {
                    field: "category url",
                    value: href.to_string(),
                })?;

            entries.push(SubcategoryEntry {
                id,
                title: extract::own_text(link).collect::<String>().trim().to_string(),
                url,
            });
        }

        info!("Found {} subcategories", entries.len());
        Ok(entries)
    }
}
