//! Weighted keyword scoring over the category catalog.
//!
//! Per category: +1 for each keyword found (case-insensitive substring), +3
//! more when that keyword is one of the first five, +5 if the category's
//! display name appears, and +2 once if any of its context terms appears.
//! Highest score wins; ties go to the earlier category. Below 2 nothing is
//! detected. Confidence is `min(score / 15, 1)`.

use rivalscope_common::CategoryProfile;

use crate::catalog;

pub const KEYWORD_POINTS: u32 = 1;
pub const CORE_KEYWORD_BONUS: u32 = 3;
pub const NAME_BONUS: u32 = 5;
pub const CONTEXT_BONUS: u32 = 2;
pub const MIN_SCORE: u32 = 2;
pub const CONFIDENCE_SCALE: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryMatch<'a> {
    pub category: &'a CategoryProfile,
    pub score: u32,
    pub confidence: f64,
}

/// Score one category against already-lowercased text.
pub fn score_category(text_lower: &str, category: &CategoryProfile) -> u32 {
    let mut score = 0;

    let found = |keywords: &[String]| {
        keywords
            .iter()
            .filter(|k| text_lower.contains(k.to_lowercase().as_str()))
            .count() as u32
    };
    score += KEYWORD_POINTS * found(&category.keywords);
    score += CORE_KEYWORD_BONUS * found(category.core_keywords());

    if text_lower.contains(category.name.to_lowercase().as_str()) {
        score += NAME_BONUS;
    }

    if catalog::context_terms(&category.id)
        .iter()
        .any(|term| text_lower.contains(term))
    {
        score += CONTEXT_BONUS;
    }

    score
}

pub fn confidence_for(score: u32) -> f64 {
    (score as f64 / CONFIDENCE_SCALE).min(1.0)
}

/// Classify against an explicit category list.
pub fn classify_with<'a>(text: &str, categories: &'a [CategoryProfile]) -> Option<CategoryMatch<'a>> {
    let text_lower = text.to_lowercase();

    let mut best: Option<(&CategoryProfile, u32)> = None;
    for category in categories {
        let score = score_category(&text_lower, category);
        // Strictly greater keeps the earliest category on ties.
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((category, score));
        }
    }

    let (category, score) = best?;
    if score < MIN_SCORE {
        return None;
    }

    Some(CategoryMatch {
        category,
        score,
        confidence: confidence_for(score),
    })
}

/// Classify against the static catalog.
pub fn classify(text: &str) -> Option<CategoryMatch<'static>> {
    classify_with(text, catalog::catalog())
}
