// Test mocks for the analysis pipeline.
//
// One mock per trait boundary:
// - MockAdapter / FailingAdapter / SlowAdapter (SourceAdapter)
// - MockDescriber (ImageDescriber)
// - MockGenerator (TextGenerator) — substring-routed canned responses
// - MockRetrieval (RetrievalBackend)
// - MockExtractor (PostExtractor) — URL→SocialPost
// - MockImageGenerator (ImageGenerator)
// - SequenceRandom (RandomSource)
//
// Plus builders for competitors, ads, posts and raw records.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use ai_client::{AiError, GeneratedImage};
use rivalscope_common::{CompetitorProfile, Engagement, ScrapedAd, SocialPost};

use crate::pipeline::{RawRecord, SourceAdapter};
use crate::resolver::RandomSource;
use crate::social::{Platform, PostExtractor};
use crate::traits::{ImageDescriber, ImageGenerator, RetrievalBackend, TextGenerator};

// ---------------------------------------------------------------------------
// SequenceRandom
// ---------------------------------------------------------------------------

/// Replays a fixed sequence, wrapping around at the end.
pub struct SequenceRandom {
    values: Vec<f64>,
    pos: AtomicUsize,
}

impl SequenceRandom {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            pos: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for SequenceRandom {
    fn next(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let i = self.pos.fetch_add(1, Ordering::Relaxed);
        self.values[i % self.values.len()]
    }
}

// ---------------------------------------------------------------------------
// Source adapters
// ---------------------------------------------------------------------------

/// Competitor id → canned records. Unregistered competitors get nothing.
/// Records every `(competitor id, query)` it is called with.
pub struct MockAdapter {
    name: String,
    platform: String,
    records: HashMap<String, Vec<RawRecord>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockAdapter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            platform: name.to_string(),
            records: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_platform(mut self, platform: &str) -> Self {
        self.platform = platform.to_string();
        self
    }

    pub fn on_competitor(mut self, competitor_id: &str, records: Vec<RawRecord>) -> Self {
        self.records.insert(competitor_id.to_string(), records);
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceAdapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn platform(&self) -> &str {
        &self.platform
    }

    async fn fetch(&self, competitor: &CompetitorProfile, query: &str) -> Result<Vec<RawRecord>> {
        self.calls
            .lock()
            .unwrap()
            .push((competitor.id.clone(), query.to_string()));
        Ok(self.records.get(&competitor.id).cloned().unwrap_or_default())
    }
}

/// Fails for every competitor, or only for the listed ones.
pub struct FailingAdapter {
    name: String,
    only: Option<Vec<String>>,
    records: Vec<RawRecord>,
}

impl FailingAdapter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            only: None,
            records: Vec::new(),
        }
    }

    /// Fail only for these competitors; everyone else gets `records`.
    pub fn only_for(mut self, competitor_ids: &[&str], records: Vec<RawRecord>) -> Self {
        self.only = Some(competitor_ids.iter().map(|s| s.to_string()).collect());
        self.records = records;
        self
    }
}

#[async_trait]
impl SourceAdapter for FailingAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn platform(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, competitor: &CompetitorProfile, _query: &str) -> Result<Vec<RawRecord>> {
        match &self.only {
            Some(ids) if !ids.contains(&competitor.id) => Ok(self.records.clone()),
            _ => bail!("{} is down for {}", self.name, competitor.id),
        }
    }
}

/// Sleeps before answering; use with paused tokio time.
pub struct SlowAdapter {
    name: String,
    delay: Duration,
    records: Vec<RawRecord>,
}

impl SlowAdapter {
    pub fn new(name: &str, delay: Duration, records: Vec<RawRecord>) -> Self {
        Self {
            name: name.to_string(),
            delay,
            records,
        }
    }
}

#[async_trait]
impl SourceAdapter for SlowAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn platform(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, _competitor: &CompetitorProfile, _query: &str) -> Result<Vec<RawRecord>> {
        tokio::time::sleep(self.delay).await;
        Ok(self.records.clone())
    }
}

// ---------------------------------------------------------------------------
// MockDescriber
// ---------------------------------------------------------------------------

pub struct MockDescriber {
    response: std::result::Result<String, String>,
    calls: AtomicUsize,
}

impl MockDescriber {
    pub fn returning(description: &str) -> Self {
        Self {
            response: Ok(description.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ImageDescriber for MockDescriber {
    async fn describe(&self, _image: &[u8], _mime_type: &str, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(message) => bail!("{message}"),
        }
    }
}

// ---------------------------------------------------------------------------
// MockGenerator
// ---------------------------------------------------------------------------

enum Route {
    Context(String),
    Prompt(String),
}

/// Canned generation keyed on substrings of the context or the prompt.
/// Rules are checked in insertion order; no match is an error.
pub struct MockGenerator {
    rules: Vec<(Route, std::result::Result<String, String>)>,
    calls: AtomicUsize,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn on_context(mut self, needle: &str, response: &str) -> Self {
        self.rules
            .push((Route::Context(needle.to_string()), Ok(response.to_string())));
        self
    }

    pub fn on_prompt(mut self, needle: &str, response: &str) -> Self {
        self.rules
            .push((Route::Prompt(needle.to_string()), Ok(response.to_string())));
        self
    }

    pub fn fail_on_context(mut self, needle: &str) -> Self {
        self.rules
            .push((Route::Context(needle.to_string()), Err(format!("generation failed for {needle}"))));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str, context: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let hit = self.rules.iter().find(|(route, _)| match route {
            Route::Context(needle) => context.contains(needle.as_str()),
            Route::Prompt(needle) => prompt.contains(needle.as_str()),
        });
        match hit {
            Some((_, Ok(text))) => Ok(text.clone()),
            Some((_, Err(message))) => bail!("{message}"),
            None => bail!("MockGenerator: no canned response for prompt"),
        }
    }
}

// ---------------------------------------------------------------------------
// MockRetrieval
// ---------------------------------------------------------------------------

/// Question-substring → answer. Unmatched questions get an empty answer.
pub struct MockRetrieval {
    answers: Vec<(String, String)>,
    fail: bool,
    corpora: Mutex<Vec<Vec<String>>>,
}

impl MockRetrieval {
    pub fn new() -> Self {
        Self {
            answers: Vec::new(),
            fail: false,
            corpora: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn on_question(mut self, needle: &str, answer: &str) -> Self {
        self.answers.push((needle.to_string(), answer.to_string()));
        self
    }

    /// Every corpus the backend was queried with.
    pub fn corpora(&self) -> Vec<Vec<String>> {
        self.corpora.lock().unwrap().clone()
    }
}

impl Default for MockRetrieval {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RetrievalBackend for MockRetrieval {
    async fn query(&self, corpus: &[String], question: &str) -> Result<String> {
        self.corpora.lock().unwrap().push(corpus.to_vec());
        if self.fail {
            bail!("vector index unavailable");
        }
        Ok(self
            .answers
            .iter()
            .find(|(needle, _)| question.contains(needle.as_str()))
            .map(|(_, answer)| answer.clone())
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// MockExtractor
// ---------------------------------------------------------------------------

/// URL → post. Unregistered URLs fail.
pub struct MockExtractor {
    posts: HashMap<String, SocialPost>,
    delay: Option<Duration>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self {
            posts: HashMap::new(),
            delay: None,
        }
    }

    pub fn on_url(mut self, post: SocialPost) -> Self {
        self.posts.insert(post.url.clone(), post);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostExtractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract(&self, url: &str, _platform: Platform) -> Result<SocialPost> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.posts.get(url) {
            Some(post) => Ok(post.clone()),
            None => bail!("MockExtractor: no post for {url}"),
        }
    }
}

// ---------------------------------------------------------------------------
// MockImageGenerator
// ---------------------------------------------------------------------------

pub enum MockImageGenerator {
    Image(GeneratedImage),
    PolicyRefusal,
    Broken,
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate_image(&self, _prompt: &str) -> Result<GeneratedImage> {
        match self {
            MockImageGenerator::Image(image) => Ok(image.clone()),
            MockImageGenerator::PolicyRefusal => Err(AiError::ContentPolicy(
                "Your request was rejected by the safety system".to_string(),
            )
            .into()),
            MockImageGenerator::Broken => bail!("image service returned 500"),
        }
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Object literal → `RawRecord`. Panics on non-objects (test-only).
pub fn raw(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("raw() expects a JSON object, got {other}"),
    }
}

pub fn competitor(id: &str, name: &str) -> CompetitorProfile {
    CompetitorProfile {
        id: id.to_string(),
        name: name.to_string(),
        website: format!("https://{id}.example"),
        search_terms: vec![name.to_string()],
        product_types: vec!["products".to_string()],
    }
}

pub fn ad(brand: &str, price: Option<&str>) -> ScrapedAd {
    ScrapedAd {
        id: Uuid::new_v4(),
        brand: brand.to_string(),
        title: format!("{brand} listing"),
        description: format!("Latest {brand} product"),
        image_url: String::new(),
        product_url: String::new(),
        price: price.map(str::to_string),
        platform: "fixture".to_string(),
        scraped_at: Utc::now(),
    }
}

pub fn post(platform: &str, url: &str, content: &str) -> SocialPost {
    SocialPost {
        platform: platform.to_string(),
        url: url.to_string(),
        content: content.to_string(),
        author: String::new(),
        timestamp: None,
        engagement: Engagement {
            likes: 10,
            shares: 2,
            comments: 3,
        },
        hashtags: Vec::new(),
        mentions: Vec::new(),
    }
}
