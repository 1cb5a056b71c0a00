//! Category recommendations for an estimate
//!
//! Each category already present votes for every absent category with
//! `co_occurrence × (1 + cosine(embedding_a, embedding_b)) / 2`; a candidate
//! keeps its best vote. An estimate with no recognizable categories gets the
//! most popular starter categories instead.

use super::features;
use crate::estimate::EstimateItem;
use crate::reference::{self, MarketCategory};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const DEFAULT_TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub name: String,
    pub unit: String,
    /// Current reference unit price
    pub typical_price: f64,
    pub score: f64,
    pub reason: String,
}

fn recommendation(category: &MarketCategory, score: f64, reason: String) -> Recommendation {
    Recommendation {
        category: category.key.to_string(),
        name: category.name.to_string(),
        unit: category.unit.to_string(),
        typical_price: category.latest_price(),
        score: (score * 1000.0).round() / 1000.0,
        reason,
    }
}

pub fn recommend(items: &[EstimateItem], top_n: usize) -> Vec<Recommendation> {
    let present: Vec<&'static MarketCategory> = {
        let mut seen = HashSet::new();
        items
            .iter()
            .filter_map(reference::resolve_category)
            .filter(|c| seen.insert(c.key))
            .collect()
    };

    if present.is_empty() {
        return starter_recommendations(top_n);
    }

    let present_keys: HashSet<&str> = present.iter().map(|c| c.key).collect();
    // candidate key -> (score, voting category)
    let mut best: BTreeMap<&'static str, (f64, &'static MarketCategory)> = BTreeMap::new();

    for &source in &present {
        for candidate in reference::categories() {
            if present_keys.contains(candidate.key) {
                continue;
            }
            let weight = reference::co_occurrence(source.key, candidate.key);
            if weight <= 0.0 {
                continue;
            }
            let similarity = features::category_similarity(source, candidate);
            let score = weight * (1.0 + similarity) / 2.0;

            let entry = best.entry(candidate.key).or_insert((0.0, source));
            if score > entry.0 {
                *entry = (score, source);
            }
        }
    }

    let mut ranked: Vec<Recommendation> = best
        .into_iter()
        .filter_map(|(key, (score, source))| {
            let candidate = reference::category(key)?;
            Some(recommendation(
                candidate,
                score,
                format!("Часто выполняется вместе с работами «{}»", source.name),
            ))
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.category.cmp(&b.category)));
    ranked.truncate(top_n);
    ranked
}

fn starter_recommendations(top_n: usize) -> Vec<Recommendation> {
    let mut starters: Vec<&MarketCategory> = reference::categories().iter().collect();
    starters.sort_by(|a, b| b.popularity.total_cmp(&a.popularity).then_with(|| a.key.cmp(b.key)));
    starters
        .into_iter()
        .take(top_n)
        .map(|c| {
            recommendation(
                c,
                c.popularity,
                "Входит в большинство смет на ремонт".to_string(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_estimate_gets_starters() {
        let recs = recommend(&[], 3);
        let keys: Vec<&str> = recs.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(keys, vec!["plaster", "paint", "primer"]);
    }

    #[test]
    fn test_plaster_suggests_putty_first() {
        let items = vec![EstimateItem::new("Штукатурка стен", "м²", 50.0, 460.0)];
        let recs = recommend(&items, DEFAULT_TOP_N);

        assert!(!recs.is_empty());
        assert!(recs.iter().all(|r| r.category != "plaster"));
        assert_eq!(recs[0].category, "putty");
        assert!(recs.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(recs.iter().all(|r| r.score > 0.0 && r.score <= 1.0));
    }

    #[test]
    fn test_only_related_categories_returned() {
        let items = vec![EstimateItem::new("Стяжка пола", "м²", 30.0, 560.0)];
        let keys: Vec<String> = recommend(&items, 10).into_iter().map(|r| r.category).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["flooring", "insulation", "tile"]);
    }

    #[test]
    fn test_top_n_limit() {
        let items = vec![
            EstimateItem::new("Штукатурка", "м²", 1.0, 460.0),
            EstimateItem::new("Монтаж розеток", "шт", 1.0, 400.0),
        ];
        assert!(recommend(&items, 2).len() <= 2);
    }
}
