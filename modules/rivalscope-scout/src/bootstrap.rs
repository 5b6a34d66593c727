//! Wire the pipeline from `Config`: which adapters, extractors and
//! strategies are available depends on which keys are present.

use std::sync::Arc;

use tracing::info;

use ai_client::{Claude, OpenAi};
use apify_client::ApifyClient;
use rivalscope_common::{Config, RivalScopeError};

use crate::coordinator::AnalysisCoordinator;
use crate::options::PipelineOptions;
use crate::pipeline::{
    ApifyAdsAdapter, ApifyShoppingAdapter, FixtureAdapter, ScrapeOrchestrator,
    SerperShoppingAdapter, SourceAdapter,
};
use crate::social::{ExtractorRegistry, SocialSignalAnalyzer};
use crate::synthesis::{EmbeddingRetriever, InsightSynthesizer};
use crate::traits::{ImageDescriber, ImageGenerator, RetrievalBackend, TextGenerator};

/// Everything a request handler needs.
pub struct Pipeline {
    pub coordinator: AnalysisCoordinator,
    pub image_generator: Option<Arc<dyn ImageGenerator>>,
    pub options: PipelineOptions,
}

/// Adapters in declaration order: fixtures, ads library, shopping, Serper.
pub fn adapters_from_config(
    config: &Config,
    options: &PipelineOptions,
    fixtures_path: Option<&str>,
) -> Result<Vec<Arc<dyn SourceAdapter>>, RivalScopeError> {
    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();

    if let Some(path) = fixtures_path.or(config.fixtures_path.as_deref()) {
        let fixtures = FixtureAdapter::from_path(path)
            .map_err(|e| RivalScopeError::Configuration(format!("{e:#}")))?;
        info!(path, records = fixtures.len(), "Fixture adapter enabled");
        adapters.push(Arc::new(fixtures));
    }

    if let Some(key) = &config.apify_api_key {
        // Runs end on Apify's side once the adapter budget is spent.
        let client = Arc::new(ApifyClient::new(key.clone()).with_run_timeout(options.adapter_timeout));
        adapters.push(Arc::new(ApifyAdsAdapter::new(client.clone())));
        adapters.push(Arc::new(ApifyShoppingAdapter::new(client)));
    }

    if let Some(key) = &config.serper_api_key {
        adapters.push(Arc::new(SerperShoppingAdapter::new(key)));
    }

    Ok(adapters)
}

pub fn build_pipeline(
    config: &Config,
    fixtures_path: Option<&str>,
) -> Result<Pipeline, RivalScopeError> {
    let options = PipelineOptions::from_config(config);

    let claude = config
        .anthropic_api_key
        .as_ref()
        .map(|key| Arc::new(Claude::new(key.clone(), config.anthropic_model.clone())));
    let openai = config.openai_api_key.as_ref().map(|key| OpenAi::new(key.clone()));

    let scraper = ScrapeOrchestrator::new(
        adapters_from_config(config, &options, fixtures_path)?,
        options.adapter_timeout,
    )?;
    info!(adapters = ?scraper.adapter_names(), "Scrape adapters registered");

    let extractors = match &config.apify_api_key {
        Some(key) => ExtractorRegistry::apify(Arc::new(
            ApifyClient::new(key.clone()).with_run_timeout(options.extraction_timeout),
        )),
        None => ExtractorRegistry::default(),
    };
    let mut social = SocialSignalAnalyzer::new(extractors)
        .with_timeouts(options.extraction_timeout, options.generation_timeout);
    if let Some(claude) = &claude {
        social = social.with_generator(claude.clone() as Arc<dyn TextGenerator>);
    }

    let retrieval: Option<Arc<dyn RetrievalBackend>> = match (&openai, &claude) {
        (Some(openai), Some(claude)) => Some(Arc::new(EmbeddingRetriever::new(
            openai.clone(),
            claude.clone() as Arc<dyn TextGenerator>,
        ))),
        _ => None,
    };
    let synthesizer =
        InsightSynthesizer::new(retrieval).with_generation_timeout(options.generation_timeout);
    info!(strategy = synthesizer.strategy_name(), "Insight synthesis configured");

    let describer = claude.map(|c| c as Arc<dyn ImageDescriber>);
    let coordinator = AnalysisCoordinator::new(describer, scraper)
        .with_social(social)
        .with_synthesizer(synthesizer)
        .with_options(options.clone());

    Ok(Pipeline {
        coordinator,
        image_generator: openai.map(|o| Arc::new(o) as Arc<dyn ImageGenerator>),
        options,
    })
}
