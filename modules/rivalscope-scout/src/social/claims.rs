//! Claims extraction and verification: prompts, tolerant parsing of the
//! model's JSON, and the mapping onto `CompetitiveInsight`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ai_client::strip_code_blocks;
use rivalscope_common::{clamp_unit, CompetitiveInsight, InsightType, Sentiment, SocialPost};

/// Why a model response could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct ParseFailure {
    pub reason: String,
}

impl ParseFailure {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseFailure>;

const DEFAULT_CREDIBILITY: f64 = 0.5;
const CLAIM_RELEVANCE: f64 = 0.7;
const MAX_POST_CHARS: usize = 4000;

fn default_credibility() -> f64 {
    DEFAULT_CREDIBILITY
}

// --- Wire shapes ---

/// One competitive claim found in a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClaimCandidate {
    /// One of: pricing, feature, positioning, sentiment.
    pub kind: String,
    pub title: String,
    pub description: String,
    /// How credible the claim looks on its face, 0 to 1.
    #[serde(default = "default_credibility")]
    pub credibility: f64,
    /// positive, negative or neutral.
    #[serde(default)]
    pub sentiment: Option<String>,
    /// Brand the claim is about, when named.
    #[serde(default)]
    pub brand: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ClaimsResponse {
    pub claims: Vec<ClaimCandidate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, JsonSchema)]
pub struct Verification {
    /// Whether authoritative sources back the claim.
    pub verified: bool,
    /// Updated credibility, 0 to 1.
    #[serde(default = "default_credibility")]
    pub credibility: f64,
    /// Short notes naming the sources consulted.
    #[serde(default)]
    pub evidence: Vec<String>,
}

// --- Prompts ---

pub const CLAIMS_SYSTEM: &str = "You are a competitive-intelligence analyst. You read social media \
posts about consumer products and pull out concrete competitive claims: pricing, product features, \
brand positioning, and audience sentiment. Report only what the post actually says. \
Respond with JSON only.";

pub const VERIFICATION_SYSTEM: &str = "You are a fact-checker for competitive-intelligence claims. \
Judge each claim against what authoritative sources (official brand sites, major retailers, \
reputable press) report. Respond with JSON only.";

fn schema_json<T: JsonSchema>() -> String {
    let schema = schemars::schema_for!(T);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

pub fn claims_prompt(post: &SocialPost, category: &str) -> String {
    let content = ai_client::truncate_to_char_boundary(&post.content, MAX_POST_CHARS);
    format!(
        "Product category: {category}\n\
         Platform: {platform}\n\
         Author: {author}\n\
         URL: {url}\n\n\
         Post:\n{content}\n\n\
         Extract competitive claims from this post. Return an object matching this JSON schema:\n{schema}",
        platform = post.platform,
        author = post.author,
        url = post.url,
        schema = schema_json::<ClaimsResponse>(),
    )
}

pub fn verification_prompt(insight: &CompetitiveInsight, category: &str) -> String {
    format!(
        "Product category: {category}\n\
         Claim ({kind}): {title}\n\
         Details: {description}\n\
         Source: {source}\n\n\
         Cross-reference this claim. Return an object matching this JSON schema:\n{schema}",
        kind = insight.kind,
        title = insight.title,
        description = insight.description,
        source = insight.source,
        schema = schema_json::<Verification>(),
    )
}

// --- Parsing ---

/// Accepts `{"claims": [...]}` or a bare array, optionally fenced.
pub fn parse_claims(text: &str) -> ParseResult<Vec<ClaimCandidate>> {
    let body = strip_code_blocks(text);
    if body.is_empty() {
        return Err(ParseFailure::new("empty response"));
    }
    if let Ok(resp) = serde_json::from_str::<ClaimsResponse>(body) {
        return Ok(resp.claims);
    }
    serde_json::from_str::<Vec<ClaimCandidate>>(body)
        .map_err(|e| ParseFailure::new(format!("claims response is not valid JSON: {e}")))
}

pub fn parse_verification(text: &str) -> ParseResult<Verification> {
    let body = strip_code_blocks(text);
    if body.is_empty() {
        return Err(ParseFailure::new("empty response"));
    }
    serde_json::from_str(body)
        .map_err(|e| ParseFailure::new(format!("verification response is not valid JSON: {e}")))
}

// --- Mapping ---

fn insight_type(kind: &str) -> Option<InsightType> {
    match kind.trim().to_lowercase().as_str() {
        "pricing" | "price" => Some(InsightType::Pricing),
        "feature" | "features" => Some(InsightType::Feature),
        "positioning" => Some(InsightType::Positioning),
        "sentiment" => Some(InsightType::Marketing),
        _ => None,
    }
}

/// `None` for claim kinds outside the known set.
pub fn claim_to_insight(claim: &ClaimCandidate, post: &SocialPost) -> Option<CompetitiveInsight> {
    let Some(kind) = insight_type(&claim.kind) else {
        debug!(kind = %claim.kind, url = %post.url, "Dropping claim of unknown kind");
        return None;
    };

    let mut insight = CompetitiveInsight::new(
        kind,
        claim.title.trim(),
        claim.description.trim(),
        format!("social:{}", post.platform),
    )
    .with_confidence(claim.credibility)
    .with_relevance(CLAIM_RELEVANCE)
    .with_sentiment(
        claim
            .sentiment
            .as_deref()
            .map(Sentiment::from_label)
            .unwrap_or_default(),
    )
    .with_evidence(vec![post.url.clone()])
    .with_platform(post.platform.clone());

    let brand = claim
        .brand
        .as_deref()
        .filter(|b| !b.trim().is_empty())
        .or_else(|| (!post.author.is_empty()).then_some(post.author.as_str()));
    if let Some(brand) = brand {
        insight = insight.with_brand(brand.trim());
    }
    Some(insight)
}

/// Fold a verification into the insight: new credibility, extra evidence,
/// and a trailing verified/unverified marker.
pub fn apply_verification(mut insight: CompetitiveInsight, verification: Verification) -> CompetitiveInsight {
    insight.confidence = clamp_unit(verification.credibility);
    insight.evidence.extend(
        verification
            .evidence
            .into_iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty()),
    );
    insight.evidence.push(
        if verification.verified {
            "verified"
        } else {
            "unverified"
        }
        .to_string(),
    );
    insight
}
