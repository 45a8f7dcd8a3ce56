mod models;
mod scrapers;

use anyhow::Context;
use clap::{Parser, Subcommand};
use models::{CategoryCatalog, Listing};
use scrapers::{BrowserFetcher, HttpFetcher, KijijiScraper, PageFetcher, ScraperConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kijiji-scout", about = "Scrape Kijiji real-estate listings")]
struct Cli {
    /// JSON file with scraper settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Render pages in headless Chrome instead of plain HTTP
    #[arg(long, global = true)]
    browser: bool,

    /// Pause after each listing fetch (milliseconds)
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk one category URL and save every listing
    Scrape {
        url: String,
        #[arg(long)]
        max_pages: Option<u32>,
        #[arg(long, default_value = "listings.json")]
        output: PathBuf,
    },
    /// Save the subcategories linked from a top-level page
    Discover {
        url: String,
        #[arg(long, default_value = "categories.json")]
        output: PathBuf,
    },
    /// Walk every category of a catalog written by `discover`
    ScrapeCatalog {
        catalog: PathBuf,
        #[arg(long)]
        max_pages: Option<u32>,
        #[arg(long, default_value = "listings.json")]
        output: PathBuf,
    },
}

async fn load_config(cli: &Cli) -> anyhow::Result<ScraperConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => ScraperConfig::default(),
    };

    if let Some(delay) = cli.delay_ms {
        config.request_delay_ms = delay;
    }

    Ok(config)
}

async fn save_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn print_listings(listings: &[Listing]) {
    for (i, listing) in listings.iter().enumerate() {
        println!("{}. {} (${:.2})", i + 1, listing.title, listing.price);
        println!("   {}", listing.address);
        if let Some(size) = listing.size {
            println!("   {} sqft", size);
        }
        println!("   ID: {}", listing.id);
        println!("   URL: {}", listing.url);
        println!();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli).await?;

    let fetcher: Arc<dyn PageFetcher> = if cli.browser {
        Arc::new(BrowserFetcher::new(&config)?)
    } else {
        Arc::new(HttpFetcher::new(&config).context("Failed to create HTTP client")?)
    };
    let scraper = KijijiScraper::new(fetcher, &config)?;

    info!("🏠 Kijiji Scout");

    match cli.command {
        Command::Scrape {
            url,
            max_pages,
            output,
        } => {
            let listings = scraper
                .walk_category(&url, max_pages)
                .await
                .with_context(|| format!("Failed to scrape {url}"))?;

            info!("✅ Scraped {} listings", listings.len());
            print_listings(&listings);

            save_json(&output, &listings).await?;
            info!("💾 Saved listings to {}", output.display());
        }
        Command::Discover { url, output } => {
            let category = scraper
                .discover_subcategories(&url)
                .await
                .with_context(|| format!("Failed to discover categories on {url}"))?;

            for entry in &category {
                println!("{:>6}  {}  {}", entry.id, entry.title, entry.url);
            }

            save_json(&output, &CategoryCatalog { category }).await?;
            info!("💾 Saved catalog to {}", output.display());
        }
        Command::ScrapeCatalog {
            catalog,
            max_pages,
            output,
        } => {
            let raw = tokio::fs::read_to_string(&catalog)
                .await
                .with_context(|| format!("Failed to read catalog {}", catalog.display()))?;
            let catalog: CategoryCatalog = serde_json::from_str(&raw)?;

            let mut listings = Vec::new();
            for entry in &catalog.category {
                info!("Scraping category {} ({})", entry.title, entry.id);
                match scraper.walk_category(&entry.url, max_pages).await {
                    Ok(mut found) => listings.append(&mut found),
                    Err(e) => warn!("Skipping category {}: {}", entry.title, e),
                }
            }

            info!(
                "✅ Scraped {} listings from {} categories",
                listings.len(),
                catalog.category.len()
            );
            save_json(&output, &listings).await?;
            info!("💾 Saved listings to {}", output.display());
        }
    }

    Ok(())
}
