//! End-to-end pipeline tests driven entirely by the mocks in `testing`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use rivalscope_common::{InsightType, RivalScopeError, Sentiment};
use rivalscope_scout::catalog;
use rivalscope_scout::classifier::{classify, score_category};
use rivalscope_scout::coordinator::AnalysisCoordinator;
use rivalscope_scout::pipeline::{ScrapeOrchestrator, SourceAdapter};
use rivalscope_scout::resolver::CompetitorResolver;
use rivalscope_scout::social::{ExtractorRegistry, SocialSignalAnalyzer};
use rivalscope_scout::synthesis::{InsightSynthesizer, SynthesisInput};
use rivalscope_scout::testing::{
    ad, competitor, post, raw, FailingAdapter, MockAdapter, MockDescriber, MockExtractor,
    MockGenerator, MockRetrieval, SequenceRandom, SlowAdapter,
};
use rivalscope_scout::{AnalysisRequest, AnalysisStage, PipelineOptions};

const SCENARIO_A: &str = "red running sneakers with white sole, Nike logo visible";
const SCENARIO_B: &str = "anti-aging face serum for daily skincare routine";
const SCENARIO_C: &str = "a wooden chair";

const CLAIMS_CONTEXT: &str = "pull out concrete competitive claims";
const VERIFY_CONTEXT: &str = "fact-checker";

fn orchestrator(adapters: Vec<Arc<dyn SourceAdapter>>) -> ScrapeOrchestrator {
    ScrapeOrchestrator::new(adapters, Duration::from_secs(5)).unwrap()
}

fn shoe_adapter() -> MockAdapter {
    MockAdapter::new("mock")
        .on_competitor(
            "nike",
            vec![
                raw(json!({"title": "Pegasus 41", "price": "$10"})),
                raw(json!({"name": "Air Max", "cost": "$20"})),
            ],
        )
        .on_competitor("adidas", vec![raw(json!({"headline": "Ultraboost", "priceText": "USD 30"}))])
}

fn request() -> AnalysisRequest {
    AnalysisRequest::new(vec![0x89, 0x50, 0x4e, 0x47], "image/png")
}

fn coordinator(describer: MockDescriber, adapters: Vec<Arc<dyn SourceAdapter>>) -> AnalysisCoordinator {
    AnalysisCoordinator::new(Some(Arc::new(describer)), orchestrator(adapters))
        .with_resolver(CompetitorResolver::new(Arc::new(SequenceRandom::new(vec![0.0]))))
        .with_options(PipelineOptions::default().with_request_deadline(None))
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[test]
fn classify_is_pure() {
    let first = classify(SCENARIO_A).map(|m| (m.category.id.clone(), m.score));
    for _ in 0..5 {
        assert_eq!(classify(SCENARIO_A).map(|m| (m.category.id.clone(), m.score)), first);
    }
}

#[test]
fn scenario_a_is_shoes() {
    let m = classify(SCENARIO_A).unwrap();
    assert_eq!(m.category.name, "Shoes");
    assert!(m.confidence > 0.5);
}

#[test]
fn scenario_b_is_skincare() {
    let m = classify(SCENARIO_B).unwrap();
    assert_eq!(m.category.name, "Skincare Products");
}

#[test]
fn display_name_earns_at_least_five() {
    for category in catalog::catalog() {
        let text = format!("look at these {}", category.name);
        assert!(score_category(&text.to_lowercase(), category) >= 5, "{}", category.name);
    }
}

#[test]
fn null_iff_every_score_below_two() {
    for text in [SCENARIO_A, SCENARIO_B, SCENARIO_C, "", "a jacket", "zzz"] {
        let lower = text.to_lowercase();
        let all_low = catalog::catalog().iter().all(|c| score_category(&lower, c) < 2);
        assert_eq!(classify(text).is_none(), all_low, "{text}");
    }
}

#[test]
fn confidence_matches_score() {
    for text in [SCENARIO_A, SCENARIO_B, "shoe sneaker boot footwear running Shoes foot"] {
        let m = classify(text).unwrap();
        assert_eq!(m.confidence, (m.score as f64 / 15.0).min(1.0));
        assert!((0.0..=1.0).contains(&m.confidence));
    }
}

// ---------------------------------------------------------------------------
// Scraping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failing_adapter_never_aborts_the_batch() {
    let competitors = vec![
        competitor("nike", "Nike"),
        competitor("adidas", "Adidas"),
        competitor("puma", "Puma"),
    ];
    let scraper = orchestrator(vec![
        Arc::new(shoe_adapter()),
        Arc::new(FailingAdapter::new("broken")),
    ]);

    let out = scraper.scrape_all(&competitors, &HashMap::new()).await;

    assert_eq!(out.len(), 3);
    assert_eq!(out["nike"].len(), 2);
    assert_eq!(out["adidas"].len(), 1);
    assert!(out["puma"].is_empty());
}

#[tokio::test]
async fn failure_for_one_competitor_is_isolated() {
    let competitors = vec![
        competitor("nike", "Nike"),
        competitor("adidas", "Adidas"),
        competitor("puma", "Puma"),
    ];
    let scraper = orchestrator(vec![Arc::new(
        FailingAdapter::new("flaky").only_for(&["puma"], vec![raw(json!({"title": "Listing"}))]),
    )]);

    let out = scraper.scrape_all(&competitors, &HashMap::new()).await;

    assert_eq!(out["nike"].len(), 1);
    assert_eq!(out["adidas"].len(), 1);
    assert!(out["puma"].is_empty());
}

#[tokio::test]
async fn per_competitor_output_follows_adapter_order() {
    let first = MockAdapter::new("first").on_competitor("nike", vec![raw(json!({"title": "A"}))]);
    let second = MockAdapter::new("second")
        .with_platform("instagram_ads")
        .on_competitor("nike", vec![raw(json!({"title": "B"})), raw(json!({"title": "C"}))]);
    let scraper = orchestrator(vec![Arc::new(first), Arc::new(second)]);

    let out = scraper
        .scrape_all(&[competitor("nike", "Nike")], &HashMap::new())
        .await;

    let titles: Vec<&str> = out["nike"].iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B", "C"]);
    assert_eq!(out["nike"][0].platform, "first");
    assert_eq!(out["nike"][2].platform, "instagram_ads");
    assert!(out["nike"].iter().all(|a| a.brand == "Nike"));
}

#[tokio::test]
async fn name_and_cost_normalize_to_title_and_price() {
    let adapter = MockAdapter::new("mock")
        .on_competitor("nike", vec![raw(json!({"name": "Vomero 18", "cost": "$150"}))]);
    let out = orchestrator(vec![Arc::new(adapter)])
        .scrape_all(&[competitor("nike", "Nike")], &HashMap::new())
        .await;

    assert_eq!(out["nike"][0].title, "Vomero 18");
    assert_eq!(out["nike"][0].price.as_deref(), Some("$150"));
}

#[tokio::test(start_paused = true)]
async fn slow_adapter_times_out_to_empty() {
    let fast = MockAdapter::new("fast").on_competitor("nike", vec![raw(json!({"title": "Fast"}))]);
    let slow = SlowAdapter::new("slow", Duration::from_secs(30), vec![raw(json!({"title": "Slow"}))]);
    let scraper = ScrapeOrchestrator::new(vec![Arc::new(fast), Arc::new(slow)], Duration::from_secs(2)).unwrap();

    let out = scraper
        .scrape_all(&[competitor("nike", "Nike")], &HashMap::new())
        .await;

    let titles: Vec<&str> = out["nike"].iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Fast"]);
}

#[test]
fn empty_adapter_registry_is_a_configuration_error() {
    let err = ScrapeOrchestrator::new(vec![], Duration::from_secs(1)).err().unwrap();
    assert!(matches!(err, RivalScopeError::Configuration(_)));
}

#[tokio::test]
async fn queries_come_from_the_random_source() {
    let adapter = Arc::new(MockAdapter::new("mock"));
    let resolver = CompetitorResolver::new(Arc::new(SequenceRandom::new(vec![0.0])));
    let shoes = catalog::find_category("shoes").unwrap();
    let competitors = resolver.resolve(shoes);
    let queries = resolver.queries_for(&competitors);

    orchestrator(vec![adapter.clone()])
        .scrape_all(&competitors, &queries)
        .await;

    let mut calls = adapter.calls();
    calls.sort();
    assert_eq!(calls.len(), 4);
    assert!(calls.contains(&("nike".to_string(), "Nike running shoes".to_string())));
    assert!(calls.contains(&("puma".to_string(), "Puma sneakers".to_string())));
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fallback_synthesis_reports_price_range() {
    let ads = vec![ad("Nike", Some("$10")), ad("Adidas", Some("$20")), ad("Puma", Some("$30"))];
    let out = InsightSynthesizer::fallback_only()
        .synthesize(SynthesisInput::new(&ads, &[]))
        .await;

    let pricing = out
        .insights
        .iter()
        .find(|i| i.kind == InsightType::Pricing)
        .unwrap();
    assert!(pricing.description.contains("average $20.00"));
    assert!(pricing.description.contains("min $10.00"));
    assert!(pricing.description.contains("max $30.00"));
    assert!(!out.trends.is_empty());
}

#[tokio::test]
async fn fallback_never_empty_when_ads_exist() {
    let ads = vec![ad("Nike", None)];
    let out = InsightSynthesizer::fallback_only()
        .synthesize(SynthesisInput::new(&ads, &[]))
        .await;
    assert!(!out.insights.is_empty());
}

#[tokio::test]
async fn retrieval_answers_become_records() {
    let retrieval = MockRetrieval::new()
        .on_question("pricing strategies", "- Most competitors price between $90 and $160\n- ok")
        .on_question("features", "1. Carbon plates appear across flagship models")
        .on_question("positioned", "Nike leans on athlete endorsements for a younger audience")
        .on_question("trends", "Significant rising interest in recycled materials");
    let retrieval = Arc::new(retrieval);
    let synthesizer = InsightSynthesizer::new(Some(retrieval.clone()));
    assert_eq!(synthesizer.strategy_name(), "retrieval");

    let ads = vec![ad("Nike", Some("$120"))];
    let posts = vec![post("instagram", "https://instagram.com/p/1", "Loving my new Pegasus")];
    let out = synthesizer
        .synthesize(SynthesisInput::new(&ads, &posts).with_description("red sneakers"))
        .await;

    let kinds: Vec<InsightType> = out.insights.iter().map(|i| i.kind).collect();
    assert!(kinds.contains(&InsightType::Pricing));
    assert!(kinds.contains(&InsightType::Feature));
    assert!(kinds.contains(&InsightType::Positioning));
    assert!(out.insights.iter().all(|i| i.source == "retrieval"));
    assert_eq!(out.trends.len(), 1);

    let corpus = &retrieval.corpora()[0];
    assert_eq!(corpus.len(), 3);
    assert!(corpus[0].contains("red sneakers"));
}

#[tokio::test]
async fn failing_retrieval_falls_back_silently() {
    let synthesizer = InsightSynthesizer::new(Some(Arc::new(MockRetrieval::failing())));
    let ads = vec![ad("Nike", Some("$10")), ad("Nike", Some("$30"))];
    let out = synthesizer.synthesize(SynthesisInput::new(&ads, &[])).await;

    assert!(out.insights.iter().all(|i| i.source == "fallback"));
    assert!(out.insights.iter().any(|i| i.kind == InsightType::Pricing));
}

#[tokio::test]
async fn empty_retrieval_with_ads_falls_back() {
    let synthesizer = InsightSynthesizer::new(Some(Arc::new(MockRetrieval::new())));
    let ads = vec![ad("Nike", None)];
    let out = synthesizer.synthesize(SynthesisInput::new(&ads, &[])).await;
    assert_eq!(out.insights[0].source, "fallback");
}

// ---------------------------------------------------------------------------
// Social analysis
// ---------------------------------------------------------------------------

const IG_URL: &str = "https://instagram.com/p/pegasus";
const TT_URL: &str = "https://www.tiktok.com/@runner/video/1";

fn social_posts() -> MockExtractor {
    let mut ig = post("instagram", IG_URL, "Pegasus 41 now $99 #running @nike");
    ig.hashtags = vec!["running".to_string()];
    ig.mentions = vec!["nike".to_string()];
    MockExtractor::new().on_url(ig)
}

const CLAIMS_JSON: &str = r#"{"claims": [
    {"kind": "pricing", "title": "Pegasus discounted to $99", "description": "Post advertises $99", "credibility": 0.6, "brand": "Nike"},
    {"kind": "weather", "title": "Sunny", "description": "n/a"}
]}"#;

#[tokio::test]
async fn social_claims_are_verified() {
    let generator = MockGenerator::new()
        .on_context(CLAIMS_CONTEXT, CLAIMS_JSON)
        .on_context(VERIFY_CONTEXT, r#"{"verified": true, "credibility": 0.9, "evidence": ["nike.com lists $99"]}"#);
    let analyzer = SocialSignalAnalyzer::new(ExtractorRegistry::new(Arc::new(social_posts())))
        .with_generator(Arc::new(generator));

    let urls = vec![IG_URL.to_string(), TT_URL.to_string()];
    let analysis = analyzer.analyze(&urls, "Shoes").await.unwrap();

    assert_eq!(analysis.posts.len(), 1);
    assert_eq!(analysis.insights.len(), 1);
    let insight = &analysis.insights[0];
    assert_eq!(insight.kind, InsightType::Pricing);
    assert_eq!(insight.confidence, 0.9);
    assert_eq!(insight.evidence.last().map(String::as_str), Some("verified"));
    assert_eq!(analysis.confidence, 0.9);
    assert_eq!(analysis.summary.total_posts, 1);
    assert_eq!(analysis.summary.average_engagement, 15.0);
    assert_eq!(analysis.summary.top_hashtags, vec!["running"]);
}

#[tokio::test]
async fn failed_verification_keeps_the_claim() {
    let generator = MockGenerator::new()
        .on_context(CLAIMS_CONTEXT, CLAIMS_JSON)
        .fail_on_context(VERIFY_CONTEXT);
    let analyzer = SocialSignalAnalyzer::new(ExtractorRegistry::new(Arc::new(social_posts())))
        .with_generator(Arc::new(generator));

    let analysis = analyzer.analyze(&[IG_URL.to_string()], "Shoes").await.unwrap();

    assert_eq!(analysis.insights.len(), 1);
    assert_eq!(analysis.insights[0].confidence, 0.6);
    assert_eq!(analysis.insights[0].evidence, vec![IG_URL.to_string()]);
}

#[tokio::test]
async fn unparseable_claims_yield_no_insights() {
    let generator = MockGenerator::new().on_context(CLAIMS_CONTEXT, "Sorry, I can't help with that.");
    let analyzer = SocialSignalAnalyzer::new(ExtractorRegistry::new(Arc::new(social_posts())))
        .with_generator(Arc::new(generator));

    let analysis = analyzer.analyze(&[IG_URL.to_string()], "Shoes").await.unwrap();
    assert_eq!(analysis.posts.len(), 1);
    assert!(analysis.insights.is_empty());
    assert_eq!(analysis.confidence, 0.0);
}

#[tokio::test]
async fn no_extractable_urls_is_an_error() {
    let analyzer = SocialSignalAnalyzer::new(ExtractorRegistry::new(Arc::new(MockExtractor::new())));
    assert!(analyzer.analyze(&[TT_URL.to_string()], "Shoes").await.is_err());
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scenario_a_end_to_end() {
    let trace = coordinator(MockDescriber::returning(SCENARIO_A), vec![Arc::new(shoe_adapter())])
        .run_traced(&request())
        .await;

    assert_eq!(
        trace.stages,
        vec![
            AnalysisStage::ImageAnalysis,
            AnalysisStage::CategoryDetection,
            AnalysisStage::CompetitorResolution,
            AnalysisStage::Scraping,
            AnalysisStage::Synthesis,
            AnalysisStage::SummaryAssembly,
            AnalysisStage::Done,
        ]
    );

    let result = trace.result.unwrap();
    assert_eq!(result.category, "Shoes");
    assert!(result.confidence > 0.5);
    assert_eq!(result.competitors.len(), 4);
    assert_eq!(result.scraped_ads.len(), 3);
    assert!(result.social_analysis.is_none());

    let summary = &result.summary;
    assert_eq!(summary.total_competitors_analyzed, 4);
    assert_eq!(summary.total_ads_scraped, 3);
    assert_eq!(summary.average_price, 20.0);
    assert_eq!(summary.top_brands, vec!["Nike", "Adidas"]);
    assert!(!summary.key_insights.is_empty());
    assert!(summary
        .competitive_gaps
        .contains(&"No active advertising found for Puma".to_string()));
    assert!(!summary.market_opportunities.is_empty());
}

#[tokio::test]
async fn scenario_c_defaults_to_first_category() {
    let result = coordinator(MockDescriber::returning(SCENARIO_C), vec![Arc::new(MockAdapter::new("mock"))])
        .run(&request())
        .await
        .unwrap();

    assert_eq!(result.category, catalog::catalog()[0].name);
    assert_eq!(result.confidence, 0.3);
}

#[tokio::test]
async fn no_priced_ads_means_zero_average() {
    let adapter = MockAdapter::new("mock").on_competitor("nike", vec![raw(json!({"title": "Free gift", "price": "Free"}))]);
    let result = coordinator(MockDescriber::returning(SCENARIO_A), vec![Arc::new(adapter)])
        .run(&request())
        .await
        .unwrap();

    assert_eq!(result.summary.total_ads_scraped, 1);
    assert_eq!(result.summary.average_price, 0.0);
    assert!(!result.summary.average_price.is_nan());
}

#[tokio::test]
async fn hint_is_appended_to_description() {
    let result = coordinator(MockDescriber::returning("a product photo"), vec![Arc::new(MockAdapter::new("mock"))])
        .run(&request().with_hint("hydrating face serum"))
        .await
        .unwrap();
    assert_eq!(result.category, "Skincare Products");
    assert!(result.image_description.ends_with("hydrating face serum"));
}

#[tokio::test]
async fn describer_failure_is_the_only_fatal_path() {
    let trace = coordinator(MockDescriber::failing("vision model down"), vec![Arc::new(FailingAdapter::new("x"))])
        .run_traced(&request())
        .await;

    assert_eq!(trace.stages, vec![AnalysisStage::ImageAnalysis, AnalysisStage::Failed]);
    assert!(matches!(trace.result, Err(RivalScopeError::ImageUnderstanding(_))));
}

#[tokio::test]
async fn missing_describer_is_a_configuration_error() {
    let coordinator = AnalysisCoordinator::new(None, orchestrator(vec![Arc::new(MockAdapter::new("m"))]));
    let err = coordinator.run(&request()).await.unwrap_err();
    assert!(matches!(err, RivalScopeError::Configuration(_)));
}

#[tokio::test]
async fn invalid_input_does_no_work() {
    let describer = Arc::new(MockDescriber::returning(SCENARIO_A));
    let coordinator = AnalysisCoordinator::new(
        Some(describer.clone()),
        orchestrator(vec![Arc::new(MockAdapter::new("m"))]),
    );

    let trace = coordinator
        .run_traced(&AnalysisRequest::new(b"%PDF".to_vec(), "application/pdf"))
        .await;

    assert!(matches!(trace.result, Err(RivalScopeError::Validation(_))));
    assert_eq!(trace.stages, vec![AnalysisStage::Failed]);
    assert_eq!(describer.calls(), 0);
}

#[tokio::test]
async fn social_stage_runs_alongside_scraping() {
    let generator = MockGenerator::new()
        .on_context(CLAIMS_CONTEXT, r#"{"claims": [{"kind": "sentiment", "title": "Runners complain about sizing", "description": "Several replies", "sentiment": "negative", "credibility": 0.4}]}"#)
        .on_context(VERIFY_CONTEXT, r#"{"verified": false, "credibility": 0.3}"#);
    let social = SocialSignalAnalyzer::new(ExtractorRegistry::new(Arc::new(social_posts())))
        .with_generator(Arc::new(generator));

    let trace = coordinator(MockDescriber::returning(SCENARIO_A), vec![Arc::new(shoe_adapter())])
        .with_social(social)
        .run_traced(&request().with_social_urls(vec![IG_URL.to_string()]))
        .await;

    assert!(trace.stages.contains(&AnalysisStage::SocialAnalysis));
    let result = trace.result.unwrap();
    let social = result.social_analysis.as_ref().unwrap();
    assert_eq!(social.insights[0].kind, InsightType::Marketing);
    assert_eq!(social.insights[0].sentiment, Sentiment::Negative);
    assert!(result
        .summary
        .competitive_gaps
        .contains(&"Runners complain about sizing".to_string()));
}

#[tokio::test]
async fn social_failure_degrades_to_none() {
    let social = SocialSignalAnalyzer::new(ExtractorRegistry::new(Arc::new(MockExtractor::new())));
    let result = coordinator(MockDescriber::returning(SCENARIO_A), vec![Arc::new(shoe_adapter())])
        .with_social(social)
        .run(&request().with_social_urls(vec![TT_URL.to_string()]))
        .await
        .unwrap();

    assert!(result.social_analysis.is_none());
    assert_eq!(result.scraped_ads.len(), 3);
}

#[tokio::test]
async fn repeated_social_urls_do_not_use_up_the_cap() {
    let extractor = social_posts().on_url(post("tiktok", TT_URL, "Sale on Pegasus this week"));
    let social = SocialSignalAnalyzer::new(ExtractorRegistry::new(Arc::new(extractor)));
    let options = PipelineOptions {
        max_social_urls: 2,
        ..PipelineOptions::default().with_request_deadline(None)
    };

    let result = coordinator(MockDescriber::returning(SCENARIO_A), vec![Arc::new(shoe_adapter())])
        .with_social(social)
        .with_options(options)
        .run(&request().with_social_urls(vec![
            IG_URL.to_string(),
            IG_URL.to_string(),
            format!(" {IG_URL} "),
            TT_URL.to_string(),
        ]))
        .await
        .unwrap();

    let social = result.social_analysis.unwrap();
    assert_eq!(social.summary.total_posts, 2);
}

#[tokio::test(start_paused = true)]
async fn deadline_abandons_slow_stages() {
    let slow = SlowAdapter::new("slow", Duration::from_secs(60), vec![raw(json!({"title": "Late"}))]);
    let social = SocialSignalAnalyzer::new(ExtractorRegistry::new(Arc::new(
        social_posts().with_delay(Duration::from_secs(60)),
    )));

    let coordinator = AnalysisCoordinator::new(
        Some(Arc::new(MockDescriber::returning(SCENARIO_A))),
        ScrapeOrchestrator::new(vec![Arc::new(slow)], Duration::from_secs(90)).unwrap(),
    )
    .with_social(social)
    .with_options(PipelineOptions::default().with_request_deadline(Some(Duration::from_secs(5))));

    let result = coordinator
        .run(&request().with_social_urls(vec![IG_URL.to_string()]))
        .await
        .unwrap();

    assert!(result.scraped_ads.is_empty());
    assert!(result.social_analysis.is_none());
    assert_eq!(result.summary.average_price, 0.0);
    assert_eq!(result.summary.competitive_gaps.len(), 4);
    assert_eq!(result.trends.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn deadline_report_names_abandoned_competitors() {
    let slow = SlowAdapter::new("slow", Duration::from_secs(60), vec![raw(json!({"title": "Late"}))]);
    let scraper = ScrapeOrchestrator::new(vec![Arc::new(slow)], Duration::from_secs(90)).unwrap();
    let competitors = vec![competitor("nike", "Nike"), competitor("adidas", "Adidas")];

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    let report = scraper
        .scrape_all_until(&competitors, &HashMap::new(), Some(deadline))
        .await;

    assert!(report.deadline_hit());
    assert_eq!(report.abandoned.len(), 2);
    assert!(report.ads_by_competitor["nike"].is_empty());

    let unbounded = scraper.scrape_all_until(&competitors, &HashMap::new(), None).await;
    assert!(!unbounded.deadline_hit());
    assert_eq!(unbounded.ads_by_competitor["adidas"].len(), 1);
}

#[tokio::test]
async fn fixture_file_drives_a_full_run() {
    use rivalscope_scout::pipeline::FixtureAdapter;

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/shoes.json");
    let fixtures = FixtureAdapter::from_path(path).unwrap();
    let result = coordinator(MockDescriber::returning(SCENARIO_A), vec![Arc::new(fixtures)])
        .run(&request())
        .await
        .unwrap();

    assert_eq!(result.scraped_ads.len(), 4);
    assert_eq!(result.summary.top_brands, vec!["Nike", "Adidas", "New Balance"]);
    let ultraboost = result
        .scraped_ads
        .iter()
        .find(|a| a.title == "Ultraboost 5")
        .unwrap();
    assert_eq!(ultraboost.platform, "facebook_ads");
    assert_eq!(ultraboost.description, "Energy return on every stride. Shop the new colorways.");
    // (140 + 130 + 190 + 164.99) / 4
    assert!((result.summary.average_price - 156.2475).abs() < 1e-9);
    assert_eq!(
        result.summary.competitive_gaps,
        vec!["No active advertising found for Puma".to_string()]
    );
}
