use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use apify_client::ApifyClient;
use rivalscope_common::CompetitorProfile;

use super::normalize::{lift_nested, RawRecord};

// --- SourceAdapter trait ---

/// One pluggable source of competitor ads or listings.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn name(&self) -> &str;
    /// Platform label stamped on ads whose record does not carry one.
    fn platform(&self) -> &str;
    async fn fetch(&self, competitor: &CompetitorProfile, query: &str) -> Result<Vec<RawRecord>>;
}

/// Default number of records requested per competitor from paid sources.
pub const DEFAULT_RESULT_LIMIT: u32 = 10;

// --- Apify ads library ---

pub struct ApifyAdsAdapter {
    client: Arc<ApifyClient>,
    limit: u32,
}

impl ApifyAdsAdapter {
    pub fn new(client: Arc<ApifyClient>) -> Self {
        Self {
            client,
            limit: DEFAULT_RESULT_LIMIT,
        }
    }
}

#[async_trait]
impl SourceAdapter for ApifyAdsAdapter {
    fn name(&self) -> &str {
        "apify_ads"
    }

    fn platform(&self) -> &str {
        "facebook_ads"
    }

    async fn fetch(&self, competitor: &CompetitorProfile, query: &str) -> Result<Vec<RawRecord>> {
        info!(competitor = %competitor.id, query, "Searching ads library");
        let mut items = self
            .client
            .search_ads_library(query, self.limit)
            .await
            .with_context(|| format!("Ads library search failed for {}", competitor.name))?;
        // Creative fields live under `snapshot`; lift them so alias resolution sees them.
        for item in &mut items {
            lift_nested(item, "snapshot");
        }
        Ok(items)
    }
}

// --- Apify shopping ---

pub struct ApifyShoppingAdapter {
    client: Arc<ApifyClient>,
    limit: u32,
}

impl ApifyShoppingAdapter {
    pub fn new(client: Arc<ApifyClient>) -> Self {
        Self {
            client,
            limit: DEFAULT_RESULT_LIMIT,
        }
    }
}

#[async_trait]
impl SourceAdapter for ApifyShoppingAdapter {
    fn name(&self) -> &str {
        "apify_shopping"
    }

    fn platform(&self) -> &str {
        "google_shopping"
    }

    async fn fetch(&self, competitor: &CompetitorProfile, query: &str) -> Result<Vec<RawRecord>> {
        info!(competitor = %competitor.id, query, "Searching shopping results");
        self.client
            .search_shopping(query, self.limit)
            .await
            .with_context(|| format!("Shopping search failed for {}", competitor.name))
    }
}

// --- Serper shopping ---

const SERPER_SHOPPING_URL: &str = "https://google.serper.dev/shopping";

pub struct SerperShoppingAdapter {
    api_key: String,
    client: reqwest::Client,
    limit: u32,
}

#[derive(Debug, serde::Deserialize)]
struct SerperShoppingResponse {
    #[serde(default)]
    shopping: Vec<RawRecord>,
}

impl SerperShoppingAdapter {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
            limit: DEFAULT_RESULT_LIMIT,
        }
    }
}

#[async_trait]
impl SourceAdapter for SerperShoppingAdapter {
    fn name(&self) -> &str {
        "serper_shopping"
    }

    fn platform(&self) -> &str {
        "serper_shopping"
    }

    async fn fetch(&self, competitor: &CompetitorProfile, query: &str) -> Result<Vec<RawRecord>> {
        info!(competitor = %competitor.id, query, "Serper shopping search");

        let body = serde_json::json!({
            "q": query,
            "num": self.limit,
        });

        let resp = self
            .client
            .post(SERPER_SHOPPING_URL)
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Serper API request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Serper returned {status}: {text}");
        }

        let data: SerperShoppingResponse = resp
            .json()
            .await
            .context("Failed to parse Serper response")?;

        info!(query, count = data.shopping.len(), "Serper shopping search complete");
        Ok(data.shopping)
    }
}

// --- Fixture file ---

/// Serves canned records from a JSON object keyed by competitor id (or
/// display name). Used for offline runs and demos.
pub struct FixtureAdapter {
    records: HashMap<String, Vec<RawRecord>>,
}

impl FixtureAdapter {
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: HashMap<String, Vec<Value>> =
            serde_json::from_str(json).context("Fixture file must map competitor ids to arrays")?;

        let records = parsed
            .into_iter()
            .map(|(key, values)| {
                let items = values
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::Object(map) => Some(map),
                        _ => None,
                    })
                    .collect();
                (key.to_lowercase(), items)
            })
            .collect();

        Ok(Self { records })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixtures from {}", path.display()))?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SourceAdapter for FixtureAdapter {
    fn name(&self) -> &str {
        "fixture"
    }

    fn platform(&self) -> &str {
        "fixture"
    }

    async fn fetch(&self, competitor: &CompetitorProfile, _query: &str) -> Result<Vec<RawRecord>> {
        let records = self
            .records
            .get(&competitor.id.to_lowercase())
            .or_else(|| self.records.get(&competitor.name.to_lowercase()))
            .cloned()
            .unwrap_or_default();
        Ok(records)
    }
}
