//! Retrieval-augmented synthesis: ask a fixed set of questions against a
//! corpus built from the request, then classify answer lines into insights
//! and trends.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use ai_client::{cosine_similarity, truncate_to_char_boundary, EmbedAgent};
use rivalscope_common::{CompetitiveInsight, Impact, InsightType, MarketTrend, Sentiment};

use super::{Synthesis, SynthesisInput};
use crate::traits::{RetrievalBackend, TextGenerator};

pub const SOURCE: &str = "retrieval";
const MIN_LINE_CHARS: usize = 12;
const TITLE_MAX_BYTES: usize = 80;
const TOP_K: usize = 8;
/// Distinct corpora whose document vectors are kept.
const CORPUS_CACHE_CAPACITY: usize = 8;

/// Question asked of the backend, with the type lines default to.
pub struct Question {
    pub text: &'static str,
    pub default_type: InsightType,
}

pub const QUESTIONS: &[Question] = &[
    Question {
        text: "What pricing strategies and price points are competitors using?",
        default_type: InsightType::Pricing,
    },
    Question {
        text: "Which product features and capabilities do competitors emphasize?",
        default_type: InsightType::Feature,
    },
    Question {
        text: "How are competitor brands positioned, and which audiences do they target?",
        default_type: InsightType::Positioning,
    },
    Question {
        text: "What market trends are emerging in this category?",
        default_type: InsightType::Trend,
    },
];

const TREND_TERMS: &[&str] = &["trend", "emerging", "growing", "rising"];
const PRICING_TERMS: &[&str] = &["pric", "price", "cost", "$"];
const FEATURE_TERMS: &[&str] = &["feature", "function", "capabilit"];
const POSITIONING_TERMS: &[&str] = &["position", "brand", "market", "audience"];
const HIGH_IMPACT_TERMS: &[&str] = &["significant", "major", "rapid"];

const POSITIVE_TERMS: &[&str] = &[
    "strong", "growth", "popular", "premium", "leading", "advantage", "success", "loyal",
];
const NEGATIVE_TERMS: &[&str] = &[
    "decline", "weak", "complaint", "struggl", "lack", "drop", "criticism", "negative",
];

fn mentions_any(lower: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| lower.contains(t))
}

/// First matching rule wins; unmatched lines take the question's type.
pub fn classify_line(line: &str, default_type: InsightType) -> InsightType {
    let lower = line.to_lowercase();
    if mentions_any(&lower, TREND_TERMS) {
        InsightType::Trend
    } else if mentions_any(&lower, PRICING_TERMS) {
        InsightType::Pricing
    } else if mentions_any(&lower, FEATURE_TERMS) {
        InsightType::Feature
    } else if mentions_any(&lower, POSITIONING_TERMS) {
        InsightType::Positioning
    } else {
        default_type
    }
}

fn line_sentiment(line: &str) -> Sentiment {
    let lower = line.to_lowercase();
    match (mentions_any(&lower, POSITIVE_TERMS), mentions_any(&lower, NEGATIVE_TERMS)) {
        (true, false) => Sentiment::Positive,
        (false, true) => Sentiment::Negative,
        _ => Sentiment::Neutral,
    }
}

/// Strip list markers and drop lines too short to say anything.
pub fn clean_line(raw: &str) -> Option<&str> {
    let mut line = raw.trim();
    for marker in ["-", "*", "•"] {
        if let Some(rest) = line.strip_prefix(marker) {
            line = rest.trim_start();
            break;
        }
    }
    // "1." / "12)" numbered lists
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            line = stripped.trim_start();
        }
    }
    (line.chars().count() >= MIN_LINE_CHARS).then_some(line)
}

fn title_for(line: &str) -> String {
    let cut = truncate_to_char_boundary(line, TITLE_MAX_BYTES);
    if cut.len() < line.len() {
        format!("{}...", cut.trim_end())
    } else {
        cut.to_string()
    }
}

/// Turn one answer into structured records.
pub fn parse_answer(answer: &str, question: &Question, out: &mut Synthesis) {
    for line in answer.lines().filter_map(clean_line) {
        match classify_line(line, question.default_type) {
            InsightType::Trend => {
                let impact = if mentions_any(&line.to_lowercase(), HIGH_IMPACT_TERMS) {
                    Impact::High
                } else {
                    Impact::Medium
                };
                out.trends.push(
                    MarketTrend::new(title_for(line), line, impact, "6-12 months", 0.7)
                        .with_supporting_data(vec![question.text.to_string()]),
                );
            }
            kind => out.insights.push(
                CompetitiveInsight::new(kind, title_for(line), line, SOURCE)
                    .with_confidence(0.7)
                    .with_relevance(0.8)
                    .with_sentiment(line_sentiment(line)),
            ),
        }
    }
}

/// Image description, then each ad's title and description, then each post.
pub fn build_corpus(input: &SynthesisInput<'_>) -> Vec<String> {
    let mut corpus = Vec::with_capacity(1 + input.ads.len() + input.posts.len());
    if !input.image_description.trim().is_empty() {
        corpus.push(format!("Product image: {}", input.image_description.trim()));
    }
    for ad in input.ads {
        let text = format!("{}: {} {}", ad.brand, ad.title, ad.description);
        if !text.trim().is_empty() {
            corpus.push(text.trim().to_string());
        }
    }
    for post in input.posts {
        if !post.content.trim().is_empty() {
            corpus.push(format!("{} post: {}", post.platform, post.content.trim()));
        }
    }
    corpus
}

/// Ask every question concurrently. Fails only when no question got an answer.
pub async fn synthesize(
    backend: &dyn RetrievalBackend,
    input: &SynthesisInput<'_>,
    timeout: Duration,
) -> Result<Synthesis> {
    let corpus = build_corpus(input);

    let answers = join_all(QUESTIONS.iter().map(|question| {
        let corpus = &corpus;
        async move {
            match tokio::time::timeout(timeout, backend.query(corpus, question.text)).await {
                Ok(Ok(answer)) => Some((question, answer)),
                Ok(Err(e)) => {
                    warn!(question = question.text, error = %e, "Retrieval query failed");
                    None
                }
                Err(_) => {
                    warn!(question = question.text, "Retrieval query timed out");
                    None
                }
            }
        }
    }))
    .await;

    let answered: Vec<_> = answers.into_iter().flatten().collect();
    if answered.is_empty() {
        anyhow::bail!("retrieval backend answered none of {} questions", QUESTIONS.len());
    }

    let mut out = Synthesis::default();
    for (question, answer) in &answered {
        parse_answer(answer, question, &mut out);
    }
    debug!(
        insights = out.insights.len(),
        trends = out.trends.len(),
        "Parsed retrieval answers"
    );
    Ok(out)
}

// --- Embedding-backed retrieval ---

const ANSWER_SYSTEM: &str = "You are a market analyst. Answer using only the documents provided. \
Write one finding per line, each line a complete sentence. Do not add headings.";

type DocumentVectors = Arc<OnceCell<Vec<Vec<f32>>>>;

/// Ranks the corpus by embedding similarity to the question and answers from
/// the best matches.
///
/// Every question of one synthesis shares a corpus, so document vectors are
/// computed once per corpus. Concurrent questions wait on the same
/// in-flight embedding call.
pub struct EmbeddingRetriever<E: EmbedAgent> {
    embedder: E,
    generator: Arc<dyn TextGenerator>,
    documents: Mutex<HashMap<Vec<String>, DocumentVectors>>,
}

impl<E: EmbedAgent> EmbeddingRetriever<E> {
    pub fn new(embedder: E, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            embedder,
            generator,
            documents: Mutex::new(HashMap::new()),
        }
    }

    fn slot_for(&self, corpus: &[String]) -> DocumentVectors {
        let mut documents = self
            .documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(slot) = documents.get(corpus) {
            return slot.clone();
        }
        if documents.len() >= CORPUS_CACHE_CAPACITY {
            documents.clear();
        }
        let slot = DocumentVectors::default();
        documents.insert(corpus.to_vec(), slot.clone());
        slot
    }

    async fn document_vectors(&self, corpus: &[String]) -> Result<Vec<Vec<f32>>> {
        let slot = self.slot_for(corpus);
        let vectors = slot
            .get_or_try_init(|| self.embedder.embed_batch(corpus.to_vec()))
            .await?;
        Ok(vectors.clone())
    }
}

/// Indices of the `k` highest-scoring documents, best first.
pub fn top_k_indices(question: &[f32], documents: &[Vec<f32>], k: usize) -> Vec<usize> {
    let mut scored: Vec<(usize, f32)> = documents
        .iter()
        .enumerate()
        .map(|(i, doc)| (i, cosine_similarity(question, doc)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.into_iter().take(k).map(|(i, _)| i).collect()
}

#[async_trait]
impl<E: EmbedAgent> RetrievalBackend for EmbeddingRetriever<E> {
    async fn query(&self, corpus: &[String], question: &str) -> Result<String> {
        if corpus.is_empty() {
            anyhow::bail!("empty corpus");
        }
        let documents = self.document_vectors(corpus).await?;
        let query = self.embedder.embed(question.to_string()).await?;

        let context: Vec<String> = top_k_indices(&query, &documents, TOP_K)
            .into_iter()
            .filter_map(|i| corpus.get(i))
            .enumerate()
            .map(|(n, doc)| format!("[{}] {}", n + 1, doc))
            .collect();

        let prompt = format!("Documents:\n{}\n\nQuestion: {question}", context.join("\n"));
        self.generator.generate(&prompt, ANSWER_SYSTEM).await
    }
}
