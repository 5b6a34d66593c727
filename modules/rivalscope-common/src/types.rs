use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Clamp a heuristic score into [0, 1]. NaN collapses to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// --- Catalog ---

/// Number of leading keywords that count as "core" for a category.
pub const CORE_KEYWORD_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorProfile {
    pub id: String,
    pub name: String,
    pub website: String,
    pub search_terms: Vec<String>,
    pub product_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProfile {
    pub id: String,
    pub name: String,
    /// Ordered; the first `CORE_KEYWORD_COUNT` are weighted higher.
    pub keywords: Vec<String>,
    pub competitors: Vec<CompetitorProfile>,
}

impl CategoryProfile {
    pub fn core_keywords(&self) -> &[String] {
        let n = self.keywords.len().min(CORE_KEYWORD_COUNT);
        &self.keywords[..n]
    }
}

// --- Scraped data ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedAd {
    pub id: Uuid,
    pub brand: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub product_url: String,
    pub price: Option<String>,
    /// Never empty; falls back to the adapter's platform name.
    pub platform: String,
    pub scraped_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: u64,
    pub shares: u64,
    pub comments: u64,
}

impl Engagement {
    /// Saturates; remote counts can be arbitrarily large.
    pub fn total(&self) -> u64 {
        self.likes
            .saturating_add(self.shares)
            .saturating_add(self.comments)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialPost {
    pub platform: String,
    pub url: String,
    pub content: String,
    pub author: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub engagement: Engagement,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
}

// --- Insights ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    Pricing,
    Feature,
    Marketing,
    Positioning,
    Trend,
}

impl std::fmt::Display for InsightType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InsightType::Pricing => write!(f, "pricing"),
            InsightType::Feature => write!(f, "feature"),
            InsightType::Marketing => write!(f, "marketing"),
            InsightType::Positioning => write!(f, "positioning"),
            InsightType::Trend => write!(f, "trend"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    /// Lenient parse of a model-supplied label. Anything unrecognised is neutral.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightMetadata {
    pub platform: Option<String>,
    pub brand: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitiveInsight {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: InsightType,
    pub title: String,
    pub description: String,
    pub source: String,
    pub confidence: f64,
    pub relevance: f64,
    pub sentiment: Sentiment,
    pub evidence: Vec<String>,
    pub metadata: InsightMetadata,
}

impl CompetitiveInsight {
    pub fn new(
        kind: InsightType,
        title: impl Into<String>,
        description: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            description: description.into(),
            source: source.into(),
            confidence: 0.5,
            relevance: 0.5,
            sentiment: Sentiment::Neutral,
            evidence: Vec::new(),
            metadata: InsightMetadata {
                platform: None,
                brand: None,
                timestamp: Utc::now(),
            },
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = clamp_unit(confidence);
        self
    }

    pub fn with_relevance(mut self, relevance: f64) -> Self {
        self.relevance = clamp_unit(relevance);
        self
    }

    pub fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = sentiment;
        self
    }

    pub fn with_evidence(mut self, evidence: Vec<String>) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.metadata.platform = Some(platform.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.metadata.brand = Some(brand.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTrend {
    pub id: Uuid,
    pub trend: String,
    pub description: String,
    pub impact: Impact,
    pub timeframe: String,
    pub supporting_data: Vec<String>,
    pub confidence: f64,
}

impl MarketTrend {
    pub fn new(
        trend: impl Into<String>,
        description: impl Into<String>,
        impact: Impact,
        timeframe: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            trend: trend.into(),
            description: description.into(),
            impact,
            timeframe: timeframe.into(),
            supporting_data: Vec::new(),
            confidence: clamp_unit(confidence),
        }
    }

    pub fn with_supporting_data(mut self, data: Vec<String>) -> Self {
        self.supporting_data = data;
        self
    }
}

// --- Social analysis ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialSummary {
    pub total_posts: usize,
    pub top_platforms: Vec<String>,
    pub average_engagement: f64,
    pub top_hashtags: Vec<String>,
    pub mentions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialAnalysis {
    pub posts: Vec<SocialPost>,
    pub insights: Vec<CompetitiveInsight>,
    pub summary: SocialSummary,
    pub confidence: f64,
}

// --- Aggregate root ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_competitors_analyzed: usize,
    pub total_ads_scraped: usize,
    /// Zero when no ad carries a usable price; never NaN.
    pub average_price: f64,
    pub top_brands: Vec<String>,
    pub key_insights: Vec<String>,
    pub market_opportunities: Vec<String>,
    pub competitive_gaps: Vec<String>,
}

/// Built once per request by the coordinator and handed out by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub category: String,
    pub category_id: String,
    pub confidence: f64,
    pub image_description: String,
    pub competitors: Vec<CompetitorProfile>,
    pub scraped_ads: Vec<ScrapedAd>,
    pub insights: Vec<CompetitiveInsight>,
    pub trends: Vec<MarketTrend>,
    pub social_analysis: Option<SocialAnalysis>,
    pub summary: AnalysisSummary,
    pub analyzed_at: DateTime<Utc>,
}
