use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One dataset item exactly as the actor produced it. Actors disagree on
/// field names, so callers normalise these themselves.
pub type RawItem = serde_json::Map<String, serde_json::Value>;

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunData {
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self.status.as_str(), "FAILED" | "ABORTED" | "TIMED-OUT")
    }
}

/// A start URL entry, shared by most URL-driven actors.
#[derive(Debug, Clone, Serialize)]
pub struct StartUrl {
    pub url: String,
}

// --- Competitor ad/product actors ---

/// Input for the ads-library scraper: search the public ad library by
/// advertiser keyword.
#[derive(Debug, Clone, Serialize)]
pub struct AdsLibraryInput {
    #[serde(rename = "searchTerms")]
    pub search_terms: Vec<String>,
    #[serde(rename = "countryCode")]
    pub country_code: String,
    #[serde(rename = "maxItems")]
    pub max_items: u32,
}

/// Input for the shopping-results scraper.
#[derive(Debug, Clone, Serialize)]
pub struct ShoppingSearchInput {
    pub queries: Vec<String>,
    #[serde(rename = "maxResultsPerQuery")]
    pub max_results_per_query: u32,
    #[serde(rename = "countryCode")]
    pub country_code: String,
}

// --- Single-post actors ---

/// Input for post scrapers that accept direct post URLs.
#[derive(Debug, Clone, Serialize)]
pub struct DirectUrlsInput {
    #[serde(rename = "directUrls")]
    pub direct_urls: Vec<String>,
    #[serde(rename = "resultsLimit")]
    pub results_limit: u32,
}

/// Input for post scrapers that take `startUrls` objects.
#[derive(Debug, Clone, Serialize)]
pub struct StartUrlsInput {
    #[serde(rename = "startUrls")]
    pub start_urls: Vec<StartUrl>,
    #[serde(rename = "maxItems")]
    pub max_items: u32,
}

/// Input for the TikTok scraper when given video URLs.
#[derive(Debug, Clone, Serialize)]
pub struct PostUrlsInput {
    #[serde(rename = "postURLs")]
    pub post_urls: Vec<String>,
    #[serde(rename = "resultsPerPage")]
    pub results_per_page: u32,
}
