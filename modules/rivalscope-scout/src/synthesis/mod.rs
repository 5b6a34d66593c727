pub mod fallback;
pub mod retrieval;

pub use retrieval::EmbeddingRetriever;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use rivalscope_common::{CompetitiveInsight, MarketTrend, ScrapedAd, SocialPost};

use crate::traits::RetrievalBackend;

/// What synthesis works from.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisInput<'a> {
    pub image_description: &'a str,
    pub ads: &'a [ScrapedAd],
    pub posts: &'a [SocialPost],
}

impl<'a> SynthesisInput<'a> {
    pub fn new(ads: &'a [ScrapedAd], posts: &'a [SocialPost]) -> Self {
        Self {
            image_description: "",
            ads,
            posts,
        }
    }

    pub fn with_description(mut self, description: &'a str) -> Self {
        self.image_description = description;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Synthesis {
    pub insights: Vec<CompetitiveInsight>,
    pub trends: Vec<MarketTrend>,
}

enum Strategy {
    Retrieval(Arc<dyn RetrievalBackend>),
    Fallback,
}

/// Turns scraped ads and social posts into insights and trends.
///
/// The strategy is fixed at construction: retrieval-augmented when a backend
/// is supplied, pure computation otherwise. A retrieval run that fails, or
/// that finds nothing while ads exist, silently returns the fallback output.
pub struct InsightSynthesizer {
    strategy: Strategy,
    generation_timeout: Duration,
}

impl InsightSynthesizer {
    pub fn new(retrieval: Option<Arc<dyn RetrievalBackend>>) -> Self {
        let strategy = match retrieval {
            Some(backend) => Strategy::Retrieval(backend),
            None => Strategy::Fallback,
        };
        Self {
            strategy,
            generation_timeout: Duration::from_secs(30),
        }
    }

    pub fn fallback_only() -> Self {
        Self::new(None)
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn strategy_name(&self) -> &'static str {
        match self.strategy {
            Strategy::Retrieval(_) => "retrieval",
            Strategy::Fallback => "fallback",
        }
    }

    pub async fn synthesize(&self, input: SynthesisInput<'_>) -> Synthesis {
        let backend = match &self.strategy {
            Strategy::Retrieval(backend) => backend,
            Strategy::Fallback => return fallback::synthesize(input.ads),
        };

        match retrieval::synthesize(backend.as_ref(), &input, self.generation_timeout).await {
            Ok(out) if out.insights.is_empty() && !input.ads.is_empty() => {
                info!("Retrieval produced no insights, using fallback synthesis");
                fallback::synthesize(input.ads)
            }
            Ok(out) => out,
            Err(e) => {
                warn!(error = %e, "Retrieval synthesis failed, using fallback synthesis");
                fallback::synthesize(input.ads)
            }
        }
    }
}

impl Default for InsightSynthesizer {
    fn default() -> Self {
        Self::fallback_only()
    }
}
