use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use serde_json::Value;
use tracing::info;

use apify_client::{
    ApifyClient, DirectUrlsInput, PostUrlsInput, RawItem, StartUrl, StartUrlsInput,
    FACEBOOK_POSTS_SCRAPER, INSTAGRAM_POST_SCRAPER, LINKEDIN_POST_SCRAPER, TIKTOK_SCRAPER,
    TWEET_SCRAPER, YOUTUBE_SCRAPER,
};
use rivalscope_common::{Engagement, SocialPost};

use super::platform::Platform;

// --- PostExtractor trait ---

#[async_trait]
pub trait PostExtractor: Send + Sync {
    fn name(&self) -> &str;
    async fn extract(&self, url: &str, platform: Platform) -> Result<SocialPost>;
}

/// Platform → extractor lookup with a generic fallback.
pub struct ExtractorRegistry {
    by_platform: HashMap<Platform, Arc<dyn PostExtractor>>,
    generic: Arc<dyn PostExtractor>,
}

impl ExtractorRegistry {
    pub fn new(generic: Arc<dyn PostExtractor>) -> Self {
        Self {
            by_platform: HashMap::new(),
            generic,
        }
    }

    pub fn with(mut self, platform: Platform, extractor: Arc<dyn PostExtractor>) -> Self {
        self.by_platform.insert(platform, extractor);
        self
    }

    /// Generic page metadata for everything, Apify actors for the big six.
    pub fn apify(client: Arc<ApifyClient>) -> Self {
        let apify: Arc<dyn PostExtractor> = Arc::new(ApifyPostExtractor::new(client));
        [
            Platform::TikTok,
            Platform::Instagram,
            Platform::Twitter,
            Platform::Facebook,
            Platform::YouTube,
            Platform::LinkedIn,
        ]
        .into_iter()
        .fold(Self::new(Arc::new(PageMetaExtractor::new())), |reg, p| {
            reg.with(p, apify.clone())
        })
    }

    pub fn for_platform(&self, platform: Platform) -> &Arc<dyn PostExtractor> {
        self.by_platform.get(&platform).unwrap_or(&self.generic)
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new(Arc::new(PageMetaExtractor::new()))
    }
}

// --- Field aliases for raw post records ---

const CONTENT_ALIASES: &[&str] = &["text", "caption", "description", "title"];
const AUTHOR_ALIASES: &[&str] = &[
    "ownerUsername",
    "author",
    "authorMeta.name",
    "pageName",
    "channelName",
    "user.name",
];
const LIKES_ALIASES: &[&str] = &[
    "likesCount",
    "likes",
    "diggCount",
    "likeCount",
    "favoriteCount",
    "reactionsCount",
];
const SHARES_ALIASES: &[&str] = &["shares", "sharesCount", "shareCount", "retweetCount"];
const COMMENTS_ALIASES: &[&str] = &["commentsCount", "comments", "commentCount", "replyCount"];
const TIMESTAMP_ALIASES: &[&str] = &["timestamp", "createTimeISO", "createTime", "date", "publishedAt", "time"];

static RE_HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w&])#([\p{L}\p{N}_]+)").unwrap());
static RE_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\w])@([A-Za-z0-9_](?:[A-Za-z0-9_.]*[A-Za-z0-9_])?)").unwrap());

/// Resolve a dotted path such as `authorMeta.name`.
fn lookup<'a>(record: &'a RawItem, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = record.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn first_text(record: &RawItem, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|path| match lookup(record, path)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

/// Counts arrive as numbers, numeric strings ("1,204"), or arrays of items.
fn first_count(record: &RawItem, aliases: &[&str]) -> u64 {
    aliases
        .iter()
        .find_map(|path| match lookup(record, path)? {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
            Value::String(s) => {
                let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
                digits.parse().ok()
            }
            Value::Array(items) => Some(items.len() as u64),
            _ => None,
        })
        .unwrap_or(0)
}

fn first_timestamp(record: &RawItem) -> Option<DateTime<Utc>> {
    TIMESTAMP_ALIASES
        .iter()
        .find_map(|path| match lookup(record, path)? {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Value::Number(n) => n
                .as_i64()
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
            _ => None,
        })
}

/// Lower-cased, de-duplicated, first-appearance order.
fn dedup_lower(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let lowered = item.trim().trim_start_matches(['#', '@']).to_lowercase();
        if !lowered.is_empty() && !out.contains(&lowered) {
            out.push(lowered);
        }
    }
    out
}

/// Tags from a record array (strings or `{name}` objects).
fn tag_array(record: &RawItem, key: &str) -> Option<Vec<String>> {
    let items = record.get(key)?.as_array()?;
    let tags: Vec<String> = items
        .iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Object(o) => o.get("name").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .collect();
    (!tags.is_empty()).then_some(tags)
}

pub fn extract_hashtags(content: &str) -> Vec<String> {
    dedup_lower(RE_HASHTAG.captures_iter(content).map(|c| c[1].to_string()))
}

pub fn extract_mentions(content: &str) -> Vec<String> {
    dedup_lower(RE_MENTION.captures_iter(content).map(|c| c[1].to_string()))
}

/// Build a post from one raw dataset item. Items without any text are rejected.
pub fn post_from_record(record: &RawItem, url: &str, platform: Platform) -> Result<SocialPost> {
    let content = first_text(record, CONTENT_ALIASES)
        .with_context(|| format!("No post content found for {url}"))?;

    let hashtags = tag_array(record, "hashtags")
        .map(dedup_lower)
        .unwrap_or_else(|| extract_hashtags(&content));
    let mentions = tag_array(record, "mentions")
        .map(dedup_lower)
        .unwrap_or_else(|| extract_mentions(&content));

    Ok(SocialPost {
        platform: platform.to_string(),
        url: url.to_string(),
        author: first_text(record, AUTHOR_ALIASES).unwrap_or_default(),
        timestamp: first_timestamp(record),
        engagement: Engagement {
            likes: first_count(record, LIKES_ALIASES),
            shares: first_count(record, SHARES_ALIASES),
            comments: first_count(record, COMMENTS_ALIASES),
        },
        hashtags,
        mentions,
        content,
    })
}

// --- Apify per-platform actors ---

pub struct ApifyPostExtractor {
    client: Arc<ApifyClient>,
}

impl ApifyPostExtractor {
    pub fn new(client: Arc<ApifyClient>) -> Self {
        Self { client }
    }

    async fn run_for(&self, url: &str, platform: Platform) -> Result<Vec<RawItem>> {
        let start_urls = || StartUrlsInput {
            start_urls: vec![StartUrl {
                url: url.to_string(),
            }],
            max_items: 1,
        };

        let items = match platform {
            Platform::Instagram => {
                let input = DirectUrlsInput {
                    direct_urls: vec![url.to_string()],
                    results_limit: 1,
                };
                self.client.run_actor(INSTAGRAM_POST_SCRAPER, &input).await?
            }
            Platform::TikTok => {
                let input = PostUrlsInput {
                    post_urls: vec![url.to_string()],
                    results_per_page: 1,
                };
                self.client.run_actor(TIKTOK_SCRAPER, &input).await?
            }
            Platform::Facebook => self.client.run_actor(FACEBOOK_POSTS_SCRAPER, &start_urls()).await?,
            Platform::Twitter => self.client.run_actor(TWEET_SCRAPER, &start_urls()).await?,
            Platform::YouTube => self.client.run_actor(YOUTUBE_SCRAPER, &start_urls()).await?,
            Platform::LinkedIn => self.client.run_actor(LINKEDIN_POST_SCRAPER, &start_urls()).await?,
            Platform::Generic => anyhow::bail!("No Apify actor for generic URL {url}"),
        };
        Ok(items)
    }
}

#[async_trait]
impl PostExtractor for ApifyPostExtractor {
    fn name(&self) -> &str {
        "apify"
    }

    async fn extract(&self, url: &str, platform: Platform) -> Result<SocialPost> {
        info!(url, platform = %platform, "Extracting post via Apify");
        let items = self
            .run_for(url, platform)
            .await
            .with_context(|| format!("Apify extraction failed for {url}"))?;
        let first = items
            .first()
            .with_context(|| format!("Apify returned no items for {url}"))?;
        post_from_record(first, url, platform)
    }
}

// --- Generic page metadata ---

static RE_META_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<meta\s[^>]*>").unwrap());
static RE_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)([a-z][a-z0-9:_-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());
static RE_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());

fn decode_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// `property`/`name` → `content` for every meta tag in the page.
fn meta_tags(html: &str) -> HashMap<String, String> {
    let mut tags = HashMap::new();
    for tag in RE_META_TAG.find_iter(html) {
        let mut key = None;
        let mut content = None;
        for cap in RE_ATTR.captures_iter(tag.as_str()) {
            let value = cap.get(2).or_else(|| cap.get(3)).map(|m| m.as_str()).unwrap_or("");
            match cap[1].to_lowercase().as_str() {
                "property" | "name" => key = Some(value.to_lowercase()),
                "content" => content = Some(decode_entities(value)),
                _ => {}
            }
        }
        if let (Some(k), Some(c)) = (key, content) {
            tags.entry(k).or_insert(c);
        }
    }
    tags
}

/// Build a post out of a page's `og:*` metadata, falling back to `<title>`
/// and the description meta tag.
pub fn post_from_html(html: &str, url: &str) -> Result<SocialPost> {
    let meta = meta_tags(html);
    let non_empty = |k: &str| meta.get(k).filter(|v| !v.is_empty()).cloned();

    let title = non_empty("og:title").or_else(|| {
        RE_TITLE
            .captures(html)
            .map(|c| decode_entities(&c[1]))
            .filter(|t| !t.is_empty())
    });
    let description = non_empty("og:description").or_else(|| non_empty("description"));

    let content = match (title, description) {
        (Some(t), Some(d)) => format!("{t}\n{d}"),
        (Some(t), None) => t,
        (None, Some(d)) => d,
        (None, None) => anyhow::bail!("No title or description metadata at {url}"),
    };

    Ok(SocialPost {
        platform: Platform::Generic.to_string(),
        url: url.to_string(),
        author: non_empty("og:site_name")
            .or_else(|| non_empty("author"))
            .unwrap_or_default(),
        timestamp: non_empty("article:published_time")
            .and_then(|t| DateTime::parse_from_rfc3339(&t).ok())
            .map(|dt| dt.with_timezone(&Utc)),
        engagement: Engagement::default(),
        hashtags: extract_hashtags(&content),
        mentions: extract_mentions(&content),
        content,
    })
}

pub struct PageMetaExtractor {
    client: reqwest::Client,
}

impl PageMetaExtractor {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for PageMetaExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostExtractor for PageMetaExtractor {
    fn name(&self) -> &str {
        "page_meta"
    }

    async fn extract(&self, url: &str, platform: Platform) -> Result<SocialPost> {
        info!(url, platform = %platform, "Fetching page metadata");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("{url} returned {status}");
        }
        let html = resp.text().await.context("Failed to read page body")?;
        let mut post = post_from_html(&html, url)?;
        post.platform = platform.to_string();
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawItem {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn instagram_item_maps_to_post() {
        let item = record(json!({
            "caption": "New drop! #Running #running @NikeRunning",
            "ownerUsername": "nike",
            "likesCount": 1200,
            "commentsCount": "34",
            "timestamp": "2026-03-01T12:00:00Z",
        }));
        let post = post_from_record(&item, "https://instagram.com/p/1", Platform::Instagram).unwrap();
        assert_eq!(post.platform, "instagram");
        assert_eq!(post.author, "nike");
        assert_eq!(post.engagement.likes, 1200);
        assert_eq!(post.engagement.comments, 34);
        assert_eq!(post.engagement.shares, 0);
        assert_eq!(post.hashtags, vec!["running"]);
        assert_eq!(post.mentions, vec!["nikerunning"]);
        assert!(post.timestamp.is_some());
    }

    #[test]
    fn nested_author_and_array_tags() {
        let item = record(json!({
            "text": "glow up",
            "authorMeta": {"name": "glowco"},
            "diggCount": 50,
            "shareCount": 5,
            "hashtags": [{"name": "Skincare"}, {"name": "glow"}],
            "createTime": 1767225600,
        }));
        let post = post_from_record(&item, "https://tiktok.com/@glowco/video/1", Platform::TikTok).unwrap();
        assert_eq!(post.author, "glowco");
        assert_eq!(post.engagement.total(), 55);
        assert_eq!(post.hashtags, vec!["skincare", "glow"]);
        assert!(post.timestamp.is_some());
    }

    #[test]
    fn record_without_content_is_rejected() {
        let item = record(json!({"likes": 3}));
        assert!(post_from_record(&item, "https://x.com/a/status/1", Platform::Twitter).is_err());
    }

    #[test]
    fn email_addresses_are_not_mentions() {
        assert!(extract_mentions("write to help@example.com").is_empty());
        assert_eq!(extract_mentions("thanks @brand_team."), vec!["brand_team"]);
    }

    #[test]
    fn html_entities_in_anchor_are_not_hashtags() {
        assert!(extract_hashtags("AT&#38;T").is_empty());
    }

    #[test]
    fn page_meta_prefers_open_graph() {
        let html = r#"<html><head>
            <title>Fallback title</title>
            <meta content="Trail Runner X &amp; more" property="og:title">
            <meta property="og:description" content="Our lightest shoe yet #trail">
            <meta property="og:site_name" content="Brooks">
        </head></html>"#;
        let post = post_from_html(html, "https://brooks.example/blog").unwrap();
        assert_eq!(post.content, "Trail Runner X & more\nOur lightest shoe yet #trail");
        assert_eq!(post.author, "Brooks");
        assert_eq!(post.hashtags, vec!["trail"]);
    }

    #[test]
    fn page_meta_falls_back_to_title() {
        let html = "<html><head><TITLE> Summer Sale </TITLE></head></html>";
        let post = post_from_html(html, "https://shop.example").unwrap();
        assert_eq!(post.content, "Summer Sale");
    }

    #[test]
    fn page_without_metadata_is_an_error() {
        assert!(post_from_html("<html></html>", "https://empty.example").is_err());
    }

    #[test]
    fn registry_falls_back_to_generic() {
        let registry = ExtractorRegistry::default();
        assert_eq!(registry.for_platform(Platform::TikTok).name(), "page_meta");

        let apify = ExtractorRegistry::apify(Arc::new(ApifyClient::new("t".to_string())));
        assert_eq!(apify.for_platform(Platform::TikTok).name(), "apify");
        assert_eq!(apify.for_platform(Platform::Generic).name(), "page_meta");
    }
}
