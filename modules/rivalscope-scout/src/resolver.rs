use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;

use rivalscope_common::{CategoryProfile, CompetitorProfile};

/// Source of uniform values in `[0, 1)`. Injected so query selection can be
/// pinned in tests.
pub trait RandomSource: Send + Sync {
    fn next(&self) -> f64;
}

/// Thread-local RNG.
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Map a `[0, 1)` draw onto an index of a `len`-element list.
/// Out-of-range draws are clamped rather than trusted.
pub fn pick_index(random: &dyn RandomSource, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let draw = random.next();
    let draw = if draw.is_finite() { draw.max(0.0) } else { 0.0 };
    ((draw * len as f64).floor() as usize).min(len - 1)
}

pub struct CompetitorResolver {
    random: Arc<dyn RandomSource>,
}

impl CompetitorResolver {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// Direct catalog lookup.
    pub fn resolve(&self, category: &CategoryProfile) -> Vec<CompetitorProfile> {
        category.competitors.clone()
    }

    /// One random search term followed by one random product type.
    /// A competitor without search terms is searched by name.
    pub fn pick_query(&self, competitor: &CompetitorProfile) -> String {
        let term = if competitor.search_terms.is_empty() {
            competitor.name.as_str()
        } else {
            let i = pick_index(self.random.as_ref(), competitor.search_terms.len());
            competitor.search_terms[i].as_str()
        };

        if competitor.product_types.is_empty() {
            return term.to_string();
        }
        let j = pick_index(self.random.as_ref(), competitor.product_types.len());
        format!("{} {}", term, competitor.product_types[j])
    }

    /// One query per competitor, keyed by competitor id. Draws happen in
    /// competitor order so a fixed sequence yields fixed queries.
    pub fn queries_for(&self, competitors: &[CompetitorProfile]) -> HashMap<String, String> {
        competitors
            .iter()
            .map(|c| (c.id.clone(), self.pick_query(c)))
            .collect()
    }
}

impl Default for CompetitorResolver {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRandom))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::testing::SequenceRandom;

    fn nike() -> CompetitorProfile {
        catalog::find_category("shoes")
            .unwrap()
            .competitors
            .iter()
            .find(|c| c.id == "nike")
            .cloned()
            .unwrap()
    }

    #[test]
    fn resolve_returns_catalog_roster() {
        let resolver = CompetitorResolver::default();
        let shoes = catalog::find_category("shoes").unwrap();
        let competitors = resolver.resolve(shoes);
        assert_eq!(competitors, shoes.competitors);
    }

    #[test]
    fn pick_query_follows_sequence() {
        // Nike: terms ["Nike", "Nike Air"], types ["running shoes", "sneakers", "trainers"]
        let resolver = CompetitorResolver::new(Arc::new(SequenceRandom::new(vec![0.0, 0.99, 0.6, 0.4])));
        assert_eq!(resolver.pick_query(&nike()), "Nike trainers");
        assert_eq!(resolver.pick_query(&nike()), "Nike Air sneakers");
    }

    #[test]
    fn pick_index_clamps_bad_draws() {
        assert_eq!(pick_index(&SequenceRandom::new(vec![1.0]), 3), 2);
        assert_eq!(pick_index(&SequenceRandom::new(vec![-0.5]), 3), 0);
        assert_eq!(pick_index(&SequenceRandom::new(vec![f64::NAN]), 3), 0);
        assert_eq!(pick_index(&SequenceRandom::new(vec![0.5]), 0), 0);
    }

    #[test]
    fn empty_sets_fall_back_to_name() {
        let resolver = CompetitorResolver::new(Arc::new(SequenceRandom::new(vec![0.3])));
        let bare = CompetitorProfile {
            id: "bare".into(),
            name: "Bare Brand".into(),
            website: String::new(),
            search_terms: vec![],
            product_types: vec![],
        };
        assert_eq!(resolver.pick_query(&bare), "Bare Brand");
    }

    #[test]
    fn queries_for_keys_by_id() {
        let resolver = CompetitorResolver::new(Arc::new(SequenceRandom::new(vec![0.0])));
        let shoes = catalog::find_category("shoes").unwrap();
        let queries = resolver.queries_for(&shoes.competitors);
        assert_eq!(queries.len(), shoes.competitors.len());
        assert_eq!(queries["nike"], "Nike running shoes");
        assert_eq!(queries["puma"], "Puma sneakers");
    }
}
