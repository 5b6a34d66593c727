use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::Instant;
use tracing::{info, warn};

use apify_client::ApifyError;
use rivalscope_common::{CompetitorProfile, RivalScopeError, ScrapedAd};

use super::adapters::SourceAdapter;
use super::normalize::normalize_record;

/// Fans out every (competitor, adapter) pair concurrently.
///
/// Each adapter call has its own timeout and error boundary: a failure or
/// timeout becomes an empty contribution for that pair. Nothing short of an
/// empty adapter registry is reported to the caller.
pub struct ScrapeOrchestrator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    adapter_timeout: Duration,
}

/// Scrape output plus bookkeeping about how the stage ended.
#[derive(Debug, Default)]
pub struct ScrapeReport {
    /// One slot per requested competitor, keyed by competitor id.
    pub ads_by_competitor: HashMap<String, Vec<ScrapedAd>>,
    /// Competitor ids still in flight when the deadline hit.
    pub abandoned: Vec<String>,
}

impl ScrapeReport {
    pub fn deadline_hit(&self) -> bool {
        !self.abandoned.is_empty()
    }
}

impl ScrapeOrchestrator {
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        adapter_timeout: Duration,
    ) -> Result<Self, RivalScopeError> {
        if adapters.is_empty() {
            return Err(RivalScopeError::Configuration(
                "no scrape adapters registered".to_string(),
            ));
        }
        Ok(Self {
            adapters,
            adapter_timeout,
        })
    }

    pub fn adapter_names(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Scrape every competitor and wait for all of them to settle.
    pub async fn scrape_all(
        &self,
        competitors: &[CompetitorProfile],
        queries: &HashMap<String, String>,
    ) -> HashMap<String, Vec<ScrapedAd>> {
        self.scrape_all_until(competitors, queries, None)
            .await
            .ads_by_competitor
    }

    /// Like `scrape_all`, but stops collecting at `deadline`. Competitors that
    /// have not settled by then keep their empty slot and their in-flight
    /// adapter calls are dropped.
    pub async fn scrape_all_until(
        &self,
        competitors: &[CompetitorProfile],
        queries: &HashMap<String, String>,
        deadline: Option<Instant>,
    ) -> ScrapeReport {
        let mut slots: HashMap<String, Vec<ScrapedAd>> = competitors
            .iter()
            .map(|c| (c.id.clone(), Vec::new()))
            .collect();

        let mut pending: FuturesUnordered<_> = competitors
            .iter()
            .map(|competitor| {
                let query = queries
                    .get(&competitor.id)
                    .cloned()
                    .unwrap_or_else(|| competitor.name.clone());
                async move {
                    let ads = self.scrape_competitor(competitor, &query).await;
                    (competitor.id.clone(), ads)
                }
            })
            .collect();

        let mut settled: Vec<String> = Vec::with_capacity(competitors.len());
        loop {
            let next = match deadline {
                Some(at) => match tokio::time::timeout_at(at, pending.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        warn!(
                            outstanding = pending.len(),
                            "Request deadline reached during scraping, abandoning in-flight competitors"
                        );
                        break;
                    }
                },
                None => pending.next().await,
            };

            match next {
                Some((id, ads)) => {
                    settled.push(id.clone());
                    slots.insert(id, ads);
                }
                None => break,
            }
        }
        drop(pending);

        let abandoned: Vec<String> = competitors
            .iter()
            .filter(|c| !settled.contains(&c.id))
            .map(|c| c.id.clone())
            .collect();

        let total: usize = slots.values().map(Vec::len).sum();
        info!(
            competitors = competitors.len(),
            adapters = self.adapters.len(),
            ads = total,
            abandoned = abandoned.len(),
            "Scraping complete"
        );

        ScrapeReport {
            ads_by_competitor: slots,
            abandoned,
        }
    }

    /// All adapters for one competitor, concatenated in declaration order.
    async fn scrape_competitor(&self, competitor: &CompetitorProfile, query: &str) -> Vec<ScrapedAd> {
        let results = join_all(
            self.adapters
                .iter()
                .map(|adapter| self.fetch_from(adapter.as_ref(), competitor, query)),
        )
        .await;

        results.into_iter().flatten().collect()
    }

    async fn fetch_from(
        &self,
        adapter: &dyn SourceAdapter,
        competitor: &CompetitorProfile,
        query: &str,
    ) -> Vec<ScrapedAd> {
        let outcome =
            tokio::time::timeout(self.adapter_timeout, adapter.fetch(competitor, query)).await;

        let records = match outcome {
            Ok(Ok(records)) => records,
            Ok(Err(e)) => {
                let transient = e
                    .downcast_ref::<ApifyError>()
                    .is_some_and(ApifyError::is_transient);
                let err = RivalScopeError::Adapter {
                    adapter: adapter.name().to_string(),
                    message: format!("{e:#}"),
                };
                warn!(competitor = %competitor.id, error = %err, transient, "Adapter failed, using empty result");
                return Vec::new();
            }
            Err(_) => {
                warn!(
                    competitor = %competitor.id,
                    adapter = adapter.name(),
                    timeout_secs = self.adapter_timeout.as_secs(),
                    "Adapter timed out, using empty result"
                );
                return Vec::new();
            }
        };

        records
            .iter()
            .map(|record| normalize_record(record, &competitor.name, adapter.platform()))
            .collect()
    }
}
