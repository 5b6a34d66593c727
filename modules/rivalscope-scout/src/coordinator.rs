use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{info, warn};

use rivalscope_common::{
    AnalysisResult, AnalysisSummary, CategoryProfile, CompetitiveInsight, CompetitorProfile, Impact,
    MarketTrend, PriceStats, RivalScopeError, ScrapedAd, Sentiment, SocialAnalysis,
};

use crate::catalog;
use crate::classifier;
use crate::options::PipelineOptions;
use crate::pipeline::ScrapeOrchestrator;
use crate::resolver::CompetitorResolver;
use crate::social::{self, SocialSignalAnalyzer};
use crate::synthesis::{fallback, InsightSynthesizer, SynthesisInput};
use crate::traits::ImageDescriber;

/// Suffix appended to the description for the second detection attempt.
pub const GENERIC_TERMS: &str = " product item merchandise goods";
/// Confidence reported when detection falls through to the default category.
pub const DEFAULT_CATEGORY_CONFIDENCE: f64 = 0.3;
const KEY_INSIGHTS: usize = 5;

const DESCRIBE_PROMPT: &str = "Describe the product in this image for a competitive market analysis. \
Name the product type, any visible brand or logo, colors, materials, and notable features. \
Answer in two to four plain sentences.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    ImageAnalysis,
    CategoryDetection,
    CompetitorResolution,
    Scraping,
    SocialAnalysis,
    Synthesis,
    SummaryAssembly,
    Done,
    Failed,
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnalysisStage::ImageAnalysis => "image_analysis",
            AnalysisStage::CategoryDetection => "category_detection",
            AnalysisStage::CompetitorResolution => "competitor_resolution",
            AnalysisStage::Scraping => "scraping",
            AnalysisStage::SocialAnalysis => "social_analysis",
            AnalysisStage::Synthesis => "synthesis",
            AnalysisStage::SummaryAssembly => "summary_assembly",
            AnalysisStage::Done => "done",
            AnalysisStage::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One analysis request.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub image: Vec<u8>,
    pub mime_type: String,
    /// Free text appended to the image description.
    pub hint: Option<String>,
    pub social_urls: Vec<String>,
}

impl AnalysisRequest {
    pub fn new(image: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            image,
            mime_type: mime_type.into(),
            hint: None,
            social_urls: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_social_urls(mut self, urls: Vec<String>) -> Self {
        self.social_urls = urls;
        self
    }

    pub fn validate(&self) -> Result<(), RivalScopeError> {
        if self.image.is_empty() {
            return Err(RivalScopeError::Validation("image is empty".to_string()));
        }
        if !self.mime_type.starts_with("image/") {
            return Err(RivalScopeError::Validation(format!(
                "unsupported content type '{}', expected image/*",
                self.mime_type
            )));
        }
        Ok(())
    }
}

/// Outcome of category detection, including which tier produced it.
#[derive(Debug, Clone, Copy)]
pub struct CategoryDetection<'a> {
    pub category: &'a CategoryProfile,
    pub confidence: f64,
    /// 1 = raw description, 2 = generic-term augmentation, 3 = default.
    pub tier: u8,
}

/// Always yields a category: raw text, then text plus generic product terms,
/// then the first catalog entry.
pub fn detect_category(description: &str) -> CategoryDetection<'static> {
    detect_category_with(description, catalog::catalog())
}

/// Tiered detection against an explicit category list. The default is the
/// list's first entry, or the catalog default for an empty list.
pub fn detect_category_with<'a>(
    description: &str,
    categories: &'a [CategoryProfile],
) -> CategoryDetection<'a> {
    if let Some(m) = classifier::classify_with(description, categories) {
        return CategoryDetection {
            category: m.category,
            confidence: m.confidence,
            tier: 1,
        };
    }
    let augmented = format!("{description}{GENERIC_TERMS}");
    if let Some(m) = classifier::classify_with(&augmented, categories) {
        return CategoryDetection {
            category: m.category,
            confidence: m.confidence,
            tier: 2,
        };
    }
    CategoryDetection {
        category: categories.first().unwrap_or_else(|| catalog::default_category()),
        confidence: DEFAULT_CATEGORY_CONFIDENCE,
        tier: 3,
    }
}

/// Stage-by-stage record of a run, for tests and diagnostics.
#[derive(Debug)]
pub struct AnalysisTrace {
    pub stages: Vec<AnalysisStage>,
    pub result: Result<AnalysisResult, RivalScopeError>,
}

/// Sequences the whole pipeline for one request.
pub struct AnalysisCoordinator {
    describer: Option<Arc<dyn ImageDescriber>>,
    resolver: CompetitorResolver,
    scraper: ScrapeOrchestrator,
    social: Option<SocialSignalAnalyzer>,
    synthesizer: InsightSynthesizer,
    options: PipelineOptions,
}

impl AnalysisCoordinator {
    /// `describer` is `None` when image-understanding credentials are missing;
    /// every run then fails with a configuration error.
    pub fn new(describer: Option<Arc<dyn ImageDescriber>>, scraper: ScrapeOrchestrator) -> Self {
        Self {
            describer,
            resolver: CompetitorResolver::default(),
            scraper,
            social: None,
            synthesizer: InsightSynthesizer::fallback_only(),
            options: PipelineOptions::default(),
        }
    }

    pub fn with_resolver(mut self, resolver: CompetitorResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_social(mut self, social: SocialSignalAnalyzer) -> Self {
        self.social = Some(social);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: InsightSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisResult, RivalScopeError> {
        self.run_traced(request).await.result
    }

    pub async fn run_traced(&self, request: &AnalysisRequest) -> AnalysisTrace {
        let mut stages = Vec::new();
        let result = self.execute(request, &mut stages).await;
        match &result {
            Ok(_) => enter(&mut stages, AnalysisStage::Done),
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Analysis failed");
                enter(&mut stages, AnalysisStage::Failed);
            }
        }
        AnalysisTrace { stages, result }
    }

    async fn execute(
        &self,
        request: &AnalysisRequest,
        stages: &mut Vec<AnalysisStage>,
    ) -> Result<AnalysisResult, RivalScopeError> {
        request.validate()?;
        let deadline = self.options.request_deadline.map(|d| Instant::now() + d);

        // Image understanding: the only stage whose failure is fatal.
        enter(stages, AnalysisStage::ImageAnalysis);
        let describer = self.describer.as_ref().ok_or_else(|| {
            RivalScopeError::Configuration(
                "image understanding is not configured (ANTHROPIC_API_KEY missing)".to_string(),
            )
        })?;
        let described = match tokio::time::timeout(
            self.options.generation_timeout,
            describer.describe(&request.image, &request.mime_type, DESCRIBE_PROMPT),
        )
        .await
        {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(RivalScopeError::ImageUnderstanding(format!("{e:#}"))),
            Err(_) => {
                return Err(RivalScopeError::ImageUnderstanding(
                    "image description timed out".to_string(),
                ))
            }
        };
        let description = match request.hint.as_deref().map(str::trim) {
            Some(hint) if !hint.is_empty() => format!("{} {hint}", described.trim()),
            _ => described.trim().to_string(),
        };

        enter(stages, AnalysisStage::CategoryDetection);
        let detection = detect_category(&description);
        info!(
            category = %detection.category.name,
            confidence = detection.confidence,
            tier = detection.tier,
            "Category detected"
        );

        enter(stages, AnalysisStage::CompetitorResolution);
        let competitors = self.resolver.resolve(detection.category);
        let queries = self.resolver.queries_for(&competitors);

        // Scraping and social analysis run side by side under the deadline.
        enter(stages, AnalysisStage::Scraping);
        // Repeats must not use up the cap.
        let social_urls: Vec<String> = social::unique_urls(&request.social_urls)
            .into_iter()
            .take(self.options.max_social_urls)
            .map(str::to_string)
            .collect();
        let run_social = self.social.is_some() && !social_urls.is_empty();
        if run_social {
            enter(stages, AnalysisStage::SocialAnalysis);
        }

        let scrape = self.scraper.scrape_all_until(&competitors, &queries, deadline);
        let social = self.social_stage(&social_urls, &detection.category.name, deadline);
        let (report, social_analysis) = tokio::join!(scrape, social);
        if report.deadline_hit() {
            warn!(abandoned = ?report.abandoned, "Scraping cut short by the request deadline");
        }

        let ads: Vec<ScrapedAd> = competitors
            .iter()
            .flat_map(|c| report.ads_by_competitor.get(&c.id).cloned().unwrap_or_default())
            .collect();

        enter(stages, AnalysisStage::Synthesis);
        let posts = social_analysis
            .as_ref()
            .map(|s| s.posts.as_slice())
            .unwrap_or_default();
        let synthesis = self
            .synthesizer
            .synthesize(SynthesisInput::new(&ads, posts).with_description(&description))
            .await;

        let mut insights = synthesis.insights;
        if let Some(social) = &social_analysis {
            insights.extend(social.insights.iter().cloned());
        }

        enter(stages, AnalysisStage::SummaryAssembly);
        let summary = assemble_summary(
            &competitors,
            &report.ads_by_competitor,
            &ads,
            &insights,
            &synthesis.trends,
        );

        Ok(AnalysisResult {
            category: detection.category.name.clone(),
            category_id: detection.category.id.clone(),
            confidence: detection.confidence,
            image_description: description,
            competitors,
            scraped_ads: ads,
            insights,
            trends: synthesis.trends,
            social_analysis,
            summary,
            analyzed_at: Utc::now(),
        })
    }

    /// `None` when there is nothing to analyze, the stage fails outright, or
    /// the deadline passes first.
    async fn social_stage(
        &self,
        urls: &[String],
        category: &str,
        deadline: Option<Instant>,
    ) -> Option<SocialAnalysis> {
        let social = self.social.as_ref()?;
        if urls.is_empty() {
            return None;
        }

        let analysis = social.analyze(urls, category);
        let outcome = match deadline {
            Some(at) => match tokio::time::timeout_at(at, analysis).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!("Request deadline reached during social analysis, skipping it");
                    return None;
                }
            },
            None => analysis.await,
        };

        match outcome {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                warn!(error = %e, "Social analysis unavailable");
                None
            }
        }
    }
}

fn enter(stages: &mut Vec<AnalysisStage>, stage: AnalysisStage) {
    info!(stage = %stage, "Analysis stage");
    stages.push(stage);
}

pub fn assemble_summary(
    competitors: &[CompetitorProfile],
    ads_by_competitor: &HashMap<String, Vec<ScrapedAd>>,
    ads: &[ScrapedAd],
    insights: &[CompetitiveInsight],
    trends: &[MarketTrend],
) -> AnalysisSummary {
    let average_price = PriceStats::from_prices(&fallback::priced(ads))
        .map(|s| s.average)
        .unwrap_or(0.0);

    let mut top_brands: Vec<String> = Vec::new();
    for ad in ads {
        if !top_brands.contains(&ad.brand) {
            top_brands.push(ad.brand.clone());
        }
    }

    let mut ranked: Vec<&CompetitiveInsight> = insights.iter().collect();
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    let key_insights = ranked
        .into_iter()
        .take(KEY_INSIGHTS)
        .map(|i| i.title.clone())
        .collect();

    let market_opportunities = trends
        .iter()
        .filter(|t| matches!(t.impact, Impact::High | Impact::Medium))
        .map(|t| t.description.clone())
        .collect();

    let mut competitive_gaps: Vec<String> = insights
        .iter()
        .filter(|i| i.sentiment == Sentiment::Negative)
        .map(|i| i.title.clone())
        .collect();
    competitive_gaps.extend(
        competitors
            .iter()
            .filter(|c| ads_by_competitor.get(&c.id).map_or(true, Vec::is_empty))
            .map(|c| format!("No active advertising found for {}", c.name)),
    );

    AnalysisSummary {
        total_competitors_analyzed: competitors.len(),
        total_ads_scraped: ads.len(),
        average_price,
        top_brands,
        key_insights,
        market_opportunities,
        competitive_gaps,
    }
}
