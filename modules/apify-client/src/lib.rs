pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{
    AdsLibraryInput, DirectUrlsInput, PostUrlsInput, RawItem, RunData, ShoppingSearchInput,
    StartUrl, StartUrlsInput,
};

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use types::ApiResponse;

const BASE_URL: &str = "https://api.apify.com/v2";

/// Actor ID for the public ads-library scraper.
pub const ADS_LIBRARY_SCRAPER: &str = "curious_coder~facebook-ads-library-scraper";

/// Actor ID for the shopping-results scraper.
pub const SHOPPING_SCRAPER: &str = "epctex~google-shopping-scraper";

/// Actor ID for apify/instagram-post-scraper.
pub const INSTAGRAM_POST_SCRAPER: &str = "nH2AHrwxeTRJoN5hX";

/// Actor ID for apify/facebook-posts-scraper.
pub const FACEBOOK_POSTS_SCRAPER: &str = "KoJrdxJCTtpon81KY";

/// Actor ID for apidojo/tweet-scraper.
pub const TWEET_SCRAPER: &str = "61RPP7dywgiy0JPD0";

/// Actor ID for clockworks/tiktok-scraper.
pub const TIKTOK_SCRAPER: &str = "clockworks~tiktok-scraper";

/// Actor ID for streamers/youtube-scraper.
pub const YOUTUBE_SCRAPER: &str = "streamers~youtube-scraper";

/// Actor ID for the LinkedIn post scraper.
pub const LINKEDIN_POST_SCRAPER: &str = "supreme_coder~linkedin-post";

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
    run_timeout: Option<Duration>,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: BASE_URL.to_string(),
            run_timeout: None,
        }
    }

    /// Cap every run this client starts. Apify stops the run on its side
    /// once the budget is spent, even if nobody is polling any more.
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn check<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(resp.json().await?)
    }

    fn run_url(&self, actor_id: &str) -> String {
        let url = format!("{}/acts/{}/runs", self.base_url, actor_id);
        match self.run_timeout {
            // Apify takes whole seconds; never send 0, which means "no limit".
            Some(timeout) => format!("{url}?timeout={}", timeout.as_secs().max(1)),
            None => url,
        }
    }

    /// Start an actor run. Returns immediately with run metadata.
    pub async fn start_run<I: Serialize>(&self, actor_id: &str, input: &I) -> Result<RunData> {
        let url = self.run_url(actor_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let api_resp: ApiResponse<RunData> = Self::check(resp).await?;
        Ok(api_resp.data)
    }

    /// Poll until a run completes. Uses `waitForFinish=60` for efficient long-polling.
    /// Callers bound the total wait with their own timeout.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        loop {
            let url = format!("{}/actor-runs/{}?waitForFinish=60", self.base_url, run_id);
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await?;

            let api_resp: ApiResponse<RunData> = Self::check(resp).await?;
            let run = api_resp.data;
            if run.status == "SUCCEEDED" {
                return Ok(run);
            }
            if run.is_terminal_failure() {
                return Err(ApifyError::RunFailed {
                    run_id: run.id,
                    status: run.status,
                });
            }
            tracing::debug!(run_id, status = %run.status, "Run still in progress");
        }
    }

    /// Fetch dataset items from a completed run.
    pub async fn get_dataset_items<T: DeserializeOwned>(&self, dataset_id: &str) -> Result<Vec<T>> {
        let url = format!("{}/datasets/{}/items?format=json&clean=true", self.base_url, dataset_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        Self::check(resp).await
    }

    /// Run an actor end-to-end: start, poll, fetch the dataset as raw items.
    pub async fn run_actor<I: Serialize>(&self, actor_id: &str, input: &I) -> Result<Vec<RawItem>> {
        let run = self.start_run(actor_id, input).await?;
        tracing::info!(actor_id, run_id = %run.id, "Apify run started, polling for completion");

        let completed = self.wait_for_run(&run.id).await?;
        tracing::info!(
            run_id = %completed.id,
            dataset_id = %completed.default_dataset_id,
            "Run completed, fetching results"
        );

        let items: Vec<RawItem> = self
            .get_dataset_items(&completed.default_dataset_id)
            .await?;
        tracing::info!(actor_id, count = items.len(), "Fetched dataset items");

        Ok(items)
    }

    /// Search the public ad library for an advertiser query.
    pub async fn search_ads_library(&self, query: &str, limit: u32) -> Result<Vec<RawItem>> {
        let input = AdsLibraryInput {
            search_terms: vec![query.to_string()],
            country_code: "US".to_string(),
            max_items: limit,
        };
        self.run_actor(ADS_LIBRARY_SCRAPER, &input).await
    }

    /// Search shopping results for a product query.
    pub async fn search_shopping(&self, query: &str, limit: u32) -> Result<Vec<RawItem>> {
        let input = ShoppingSearchInput {
            queries: vec![query.to_string()],
            max_results_per_query: limit,
            country_code: "us".to_string(),
        };
        self.run_actor(SHOPPING_SCRAPER, &input).await
    }
}
