//! Pure-computation synthesis over scraped ads. Always available.

use rivalscope_common::{
    parse_price, CompetitiveInsight, Impact, InsightType, MarketTrend, PriceStats, ScrapedAd,
};

use super::Synthesis;

pub const SOURCE: &str = "fallback";
const TOP_BRANDS: usize = 3;
const UNNAMED_BRAND: &str = "Unnamed brand";

/// Brand → ad count, most ads first; equal counts keep first-appearance order.
pub fn brand_histogram(ads: &[ScrapedAd]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for ad in ads {
        let brand = match ad.brand.trim() {
            "" => UNNAMED_BRAND,
            b => b,
        };
        match counts.iter_mut().find(|(name, _)| name == brand) {
            Some((_, n)) => *n += 1,
            None => counts.push((brand.to_string(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

pub fn priced(ads: &[ScrapedAd]) -> Vec<f64> {
    ads.iter()
        .filter_map(|ad| ad.price.as_deref().and_then(parse_price))
        .collect()
}

fn pricing_insight(ads: &[ScrapedAd]) -> Option<CompetitiveInsight> {
    let stats = PriceStats::from_prices(&priced(ads))?;
    Some(
        CompetitiveInsight::new(
            InsightType::Pricing,
            "Competitor price range",
            format!(
                "Across {} priced listings: average ${:.2}, min ${:.2}, max ${:.2}",
                stats.count, stats.average, stats.min, stats.max
            ),
            SOURCE,
        )
        .with_confidence(0.8)
        .with_relevance(0.9)
        .with_evidence(vec![format!(
            "{} of {} listings carried a usable price",
            stats.count,
            ads.len()
        )]),
    )
}

fn positioning_insight(ads: &[ScrapedAd]) -> Option<CompetitiveInsight> {
    let histogram = brand_histogram(ads);
    if histogram.is_empty() {
        return None;
    }
    let top: Vec<String> = histogram
        .iter()
        .take(TOP_BRANDS)
        .map(|(brand, n)| format!("{brand} ({n})"))
        .collect();

    let mut insight = CompetitiveInsight::new(
        InsightType::Positioning,
        "Most active brands",
        format!("Most active advertisers by listing count: {}", top.join(", ")),
        SOURCE,
    )
    .with_confidence(0.7)
    .with_relevance(0.8)
    .with_evidence(vec![format!(
        "{} listings across {} brands",
        ads.len(),
        histogram.len()
    )]);
    if let Some((leader, _)) = histogram.first() {
        insight = insight.with_brand(leader.clone());
    }
    Some(insight)
}

fn growth_trend(ads: &[ScrapedAd]) -> MarketTrend {
    MarketTrend::new(
        "Digital marketing growth",
        "Competitors keep shifting spend toward digital storefronts and paid social placements.",
        Impact::High,
        "12 months",
        0.6,
    )
    .with_supporting_data(vec![format!("{} active listings observed", ads.len())])
}

pub fn synthesize(ads: &[ScrapedAd]) -> Synthesis {
    let insights = [pricing_insight(ads), positioning_insight(ads)]
        .into_iter()
        .flatten()
        .collect();

    Synthesis {
        insights,
        trends: vec![growth_trend(ads)],
    }
}
