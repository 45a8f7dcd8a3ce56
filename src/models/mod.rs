use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category and location ids encoded in a Kijiji category URL (`/c37l1700273`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryContext {
    pub category_id: u64,
    pub location_id: u64,
}

/// One scraped real-estate ad
///
/// Optional attributes are `None` when the page does not carry them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub url: String,
    pub id: u64,
    pub category_id: u64,
    pub location_id: u64,
    pub title: String,
    pub address: String,
    pub price: f64,
    pub published_at: DateTime<Utc>,
    pub bedroom_count: Option<u8>,
    pub bathroom_count: Option<u8>,
    pub furnished: Option<bool>,
    pub pet_friendly: Option<bool>,
    pub size: Option<f64>,
    pub description: String,
}

/// A navigable subcategory found on a top-level page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubcategoryEntry {
    pub id: u64,
    pub title: String,
    pub url: String,
}

/// JSON document written by discovery and read back for batch scraping
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryCatalog {
    pub category: Vec<SubcategoryEntry>,
}
