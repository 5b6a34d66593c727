pub mod claims;
pub mod extractors;
pub mod platform;

pub use claims::{ParseFailure, ParseResult};
pub use extractors::{ApifyPostExtractor, ExtractorRegistry, PageMetaExtractor, PostExtractor};
pub use platform::Platform;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::future::join_all;
use tracing::{info, warn};

use rivalscope_common::{CompetitiveInsight, SocialAnalysis, SocialPost, SocialSummary};

use crate::traits::TextGenerator;

const TOP_PLATFORMS: usize = 3;
const TOP_HASHTAGS: usize = 10;

/// Extract posts from social URLs, mine them for competitive claims, and
/// cross-check each claim.
///
/// Every step is isolated per item: a URL that fails to extract, a post whose
/// claims cannot be parsed, or a verification that fails is logged and the
/// rest of the batch carries on.
pub struct SocialSignalAnalyzer {
    extractors: ExtractorRegistry,
    generator: Option<Arc<dyn TextGenerator>>,
    extraction_timeout: Duration,
    generation_timeout: Duration,
}

impl SocialSignalAnalyzer {
    pub fn new(extractors: ExtractorRegistry) -> Self {
        Self {
            extractors,
            generator: None,
            extraction_timeout: Duration::from_secs(60),
            generation_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_timeouts(mut self, extraction: Duration, generation: Duration) -> Self {
        self.extraction_timeout = extraction;
        self.generation_timeout = generation;
        self
    }

    /// Errors only when URLs were given and not a single post could be
    /// extracted; callers treat that as "no social analysis".
    pub async fn analyze(&self, urls: &[String], category: &str) -> Result<SocialAnalysis> {
        let unique = unique_urls(urls);

        let posts = self.extract_posts(&unique).await;
        if posts.is_empty() && !unique.is_empty() {
            anyhow::bail!("none of the {} social URLs could be extracted", unique.len());
        }

        let candidates = self.extract_claims(&posts, category).await;
        let insights = self.verify_claims(candidates, category).await;

        let confidence = mean_confidence(&insights);
        let summary = summarize_posts(&posts);
        info!(
            posts = posts.len(),
            insights = insights.len(),
            confidence,
            "Social analysis complete"
        );

        Ok(SocialAnalysis {
            posts,
            insights,
            summary,
            confidence,
        })
    }

    /// One slot per URL; failed slots are skipped.
    async fn extract_posts(&self, urls: &[&str]) -> Vec<SocialPost> {
        let results = join_all(urls.iter().map(|url| async move {
            let platform = Platform::from_url(url);
            let extractor = self.extractors.for_platform(platform);
            match tokio::time::timeout(self.extraction_timeout, extractor.extract(url, platform)).await {
                Ok(Ok(post)) => Some(post),
                Ok(Err(e)) => {
                    warn!(url, extractor = extractor.name(), error = %e, "Post extraction failed");
                    None
                }
                Err(_) => {
                    warn!(url, extractor = extractor.name(), "Post extraction timed out");
                    None
                }
            }
        }))
        .await;

        results.into_iter().flatten().collect()
    }

    async fn extract_claims(&self, posts: &[SocialPost], category: &str) -> Vec<CompetitiveInsight> {
        let Some(generator) = &self.generator else {
            return Vec::new();
        };

        let per_post = join_all(posts.iter().map(|post| async move {
            let prompt = claims::claims_prompt(post, category);
            let response = match tokio::time::timeout(
                self.generation_timeout,
                generator.generate(&prompt, claims::CLAIMS_SYSTEM),
            )
            .await
            {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => {
                    warn!(url = %post.url, error = %e, "Claims extraction failed");
                    return Vec::new();
                }
                Err(_) => {
                    warn!(url = %post.url, "Claims extraction timed out");
                    return Vec::new();
                }
            };

            match claims::parse_claims(&response) {
                Ok(candidates) => candidates
                    .iter()
                    .filter_map(|c| claims::claim_to_insight(c, post))
                    .collect(),
                Err(failure) => {
                    warn!(url = %post.url, reason = %failure, "Unparseable claims response");
                    Vec::new()
                }
            }
        }))
        .await;

        per_post.into_iter().flatten().collect()
    }

    /// A failed or unparseable verification keeps the insight as it was.
    async fn verify_claims(
        &self,
        candidates: Vec<CompetitiveInsight>,
        category: &str,
    ) -> Vec<CompetitiveInsight> {
        let Some(generator) = &self.generator else {
            return candidates;
        };

        join_all(candidates.into_iter().map(|insight| async move {
            let prompt = claims::verification_prompt(&insight, category);
            let response = match tokio::time::timeout(
                self.generation_timeout,
                generator.generate(&prompt, claims::VERIFICATION_SYSTEM),
            )
            .await
            {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => {
                    warn!(title = %insight.title, error = %e, "Verification failed, keeping claim");
                    return insight;
                }
                Err(_) => {
                    warn!(title = %insight.title, "Verification timed out, keeping claim");
                    return insight;
                }
            };

            match claims::parse_verification(&response) {
                Ok(verification) => claims::apply_verification(insight, verification),
                Err(failure) => {
                    warn!(title = %insight.title, reason = %failure, "Unparseable verification, keeping claim");
                    insight
                }
            }
        }))
        .await
    }
}

pub fn mean_confidence(insights: &[CompetitiveInsight]) -> f64 {
    if insights.is_empty() {
        return 0.0;
    }
    insights.iter().map(|i| i.confidence).sum::<f64>() / insights.len() as f64
}

/// Descending by count; equal counts keep first-appearance order.
fn top_by_frequency<'a>(items: impl IntoIterator<Item = &'a str>, limit: usize) -> Vec<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        let count = counts.entry(item).or_insert(0);
        if *count == 0 {
            order.push(item);
        }
        *count += 1;
    }
    // sort_by is stable, so ties keep first-appearance order
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.into_iter().take(limit).map(str::to_string).collect()
}

/// Trimmed, non-empty URLs in first-seen order, repeats dropped.
pub fn unique_urls(urls: &[String]) -> Vec<&str> {
    let mut unique: Vec<&str> = Vec::new();
    for url in urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty()) {
        if !unique.contains(&url) {
            unique.push(url);
        }
    }
    unique
}

pub fn summarize_posts(posts: &[SocialPost]) -> SocialSummary {
    let total_posts = posts.len();
    let average_engagement = if total_posts == 0 {
        0.0
    } else {
        posts.iter().map(|p| p.engagement.total() as f64).sum::<f64>() / total_posts as f64
    };

    let mut mentions: Vec<String> = Vec::new();
    for mention in posts.iter().flat_map(|p| &p.mentions) {
        if !mentions.contains(mention) {
            mentions.push(mention.clone());
        }
    }

    SocialSummary {
        total_posts,
        top_platforms: top_by_frequency(posts.iter().map(|p| p.platform.as_str()), TOP_PLATFORMS),
        average_engagement,
        top_hashtags: top_by_frequency(
            posts.iter().flat_map(|p| p.hashtags.iter().map(String::as_str)),
            TOP_HASHTAGS,
        ),
        mentions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivalscope_common::Engagement;

    fn post(platform: &str, likes: u64, shares: u64, comments: u64, tags: &[&str], mentions: &[&str]) -> SocialPost {
        SocialPost {
            platform: platform.to_string(),
            url: format!("https://{platform}.example/{likes}"),
            content: "post".to_string(),
            author: String::new(),
            timestamp: None,
            engagement: Engagement { likes, shares, comments },
            hashtags: tags.iter().map(|t| t.to_string()).collect(),
            mentions: mentions.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn summary_aggregates_posts() {
        let posts = vec![
            post("tiktok", 10, 5, 5, &["run", "shoes"], &["nike"]),
            post("instagram", 30, 0, 10, &["shoes"], &["adidas", "nike"]),
            post("tiktok", 0, 0, 0, &["shoes", "run"], &[]),
            post("twitter", 0, 0, 0, &[], &[]),
            post("youtube", 0, 0, 0, &[], &[]),
        ];
        let summary = summarize_posts(&posts);
        assert_eq!(summary.total_posts, 5);
        assert_eq!(summary.top_platforms, vec!["tiktok", "instagram", "twitter"]);
        assert_eq!(summary.average_engagement, 12.0);
        assert_eq!(summary.top_hashtags, vec!["shoes", "run"]);
        assert_eq!(summary.mentions, vec!["nike", "adidas"]);
    }

    #[test]
    fn empty_summary_has_zero_engagement() {
        let summary = summarize_posts(&[]);
        assert_eq!(summary.total_posts, 0);
        assert_eq!(summary.average_engagement, 0.0);
    }

    #[test]
    fn hashtags_capped_at_ten() {
        let tags: Vec<String> = (0..15).map(|i| format!("tag{i}")).collect();
        let refs: Vec<&str> = tags.iter().map(String::as_str).collect();
        let summary = summarize_posts(&[post("tiktok", 0, 0, 0, &refs, &[])]);
        assert_eq!(summary.top_hashtags.len(), 10);
        assert_eq!(summary.top_hashtags[0], "tag0");
    }

    #[test]
    fn huge_remote_counts_do_not_overflow_summary() {
        let record = serde_json::json!({"text": "viral post", "likesCount": 1e30, "shares": 5});
        let record = record.as_object().cloned().unwrap();
        let post = extractors::post_from_record(&record, "https://tiktok.com/@a/video/1", Platform::TikTok)
            .unwrap();
        assert_eq!(post.engagement.likes, u64::MAX);

        let summary = summarize_posts(&[post]);
        assert_eq!(summary.average_engagement, u64::MAX as f64);
    }

    #[test]
    fn mean_confidence_of_nothing_is_zero() {
        assert_eq!(mean_confidence(&[]), 0.0);
    }
}
