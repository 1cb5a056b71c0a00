//! Cost optimization by substituting cheaper alternatives
//!
//! For every item with a reference category, the cheapest alternative that
//! meets the quality floor and undercuts the current price becomes a
//! suggestion. Suggestions are ranked by savings. Without a target budget
//! all of them are applied; with one, they are applied greedily until the
//! optimized total drops to the target.

use crate::calculator::round_to_cents;
use crate::estimate::EstimateItem;
use crate::reference;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_QUALITY: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizeOptions {
    #[serde(default = "default_min_quality")]
    pub min_quality: f64,
    #[serde(default)]
    pub target_budget: Option<f64>,
}

fn default_min_quality() -> f64 {
    DEFAULT_MIN_QUALITY
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            min_quality: DEFAULT_MIN_QUALITY,
            target_budget: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub item_id: String,
    pub item_name: String,
    pub category: String,
    pub current_price: f64,
    pub alternative: String,
    pub alternative_price: f64,
    pub quality: f64,
    pub savings: f64,
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub suggestions: Vec<Suggestion>,
    pub original_total: f64,
    pub optimized_total: f64,
    pub savings: f64,
    pub savings_percent: f64,
    /// Present only when a target budget was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_reached: Option<bool>,
}

fn suggest(item: &EstimateItem, min_quality: f64) -> Option<Suggestion> {
    let category = reference::resolve_category(item)?;
    let best = category
        .alternatives
        .iter()
        .filter(|alt| alt.quality >= min_quality && alt.price < item.price)
        .min_by(|a, b| a.price.total_cmp(&b.price))?;

    let savings = (item.price - best.price) * item.quantity * item.coefficient;
    if savings <= 0.0 {
        return None;
    }

    Some(Suggestion {
        item_id: item.id.clone(),
        item_name: item.name.clone(),
        category: category.key.to_string(),
        current_price: item.price,
        alternative: best.name.to_string(),
        alternative_price: best.price,
        quality: best.quality,
        savings: round_to_cents(savings),
        applied: false,
    })
}

pub fn optimize(items: &[EstimateItem], options: &OptimizeOptions) -> OptimizationResult {
    let original: f64 = items.iter().map(EstimateItem::raw_total).sum();

    let mut suggestions: Vec<Suggestion> = items
        .iter()
        .filter_map(|item| suggest(item, options.min_quality))
        .collect();
    suggestions.sort_by(|a, b| b.savings.total_cmp(&a.savings));

    let mut optimized = original;
    for suggestion in suggestions.iter_mut() {
        if let Some(target) = options.target_budget {
            if optimized <= target {
                break;
            }
        }
        optimized -= suggestion.savings;
        suggestion.applied = true;
    }

    let savings = original - optimized;
    let savings_percent = if original > 0.0 {
        savings / original * 100.0
    } else {
        0.0
    };

    OptimizationResult {
        suggestions,
        original_total: round_to_cents(original),
        optimized_total: round_to_cents(optimized),
        savings: round_to_cents(savings),
        savings_percent: round_to_cents(savings_percent),
        target_reached: options.target_budget.map(|t| optimized <= t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<EstimateItem> {
        vec![
            // plaster alternatives: 410 (0.9), 360 (0.75), 300 (0.55)
            EstimateItem::new("Штукатурка стен", "м²", 100.0, 495.0),
            // tile alternatives: 1320 (0.85), 1100 (0.6)
            EstimateItem::new("Облицовка плиткой", "м²", 20.0, 1690.0),
            EstimateItem::new("Вывоз мусора", "т", 2.0, 900.0),
        ]
    }

    #[test]
    fn test_cheapest_alternative_above_quality_floor() {
        let result = optimize(&items(), &OptimizeOptions::default());
        assert_eq!(result.suggestions.len(), 2);

        let plaster = result.suggestions.iter().find(|s| s.category == "plaster").unwrap();
        assert_eq!(plaster.alternative_price, 360.0);
        assert_eq!(plaster.savings, 13_500.0);

        let tile = result.suggestions.iter().find(|s| s.category == "tile").unwrap();
        assert_eq!(tile.alternative_price, 1320.0);
        assert_eq!(tile.savings, 7_400.0);
    }

    #[test]
    fn test_never_more_expensive_or_below_floor() {
        let result = optimize(&items(), &OptimizeOptions { min_quality: 0.8, target_budget: None });
        for s in &result.suggestions {
            assert!(s.alternative_price < s.current_price);
            assert!(s.quality >= 0.8);
        }
    }

    #[test]
    fn test_sorted_by_savings_and_totals() {
        let result = optimize(&items(), &OptimizeOptions::default());
        assert!(result.suggestions[0].savings >= result.suggestions[1].savings);
        assert_eq!(result.original_total, 49_500.0 + 33_800.0 + 1_800.0);
        assert_eq!(result.savings, 20_900.0);
        assert_eq!(result.optimized_total, result.original_total - 20_900.0);
        assert_eq!(result.savings_percent, 24.56);
        assert!(result.target_reached.is_none());
        assert!(result.suggestions.iter().all(|s| s.applied));
    }

    #[test]
    fn test_target_budget_stops_early() {
        let options = OptimizeOptions {
            target_budget: Some(75_000.0),
            ..Default::default()
        };
        let result = optimize(&items(), &options);
        assert_eq!(result.target_reached, Some(true));
        assert!(result.suggestions[0].applied);
        assert!(!result.suggestions[1].applied);
        assert_eq!(result.optimized_total, 85_100.0 - 13_500.0);
    }

    #[test]
    fn test_unreachable_target() {
        let options = OptimizeOptions {
            target_budget: Some(1_000.0),
            ..Default::default()
        };
        let result = optimize(&items(), &options);
        assert_eq!(result.target_reached, Some(false));
        assert!(result.suggestions.iter().all(|s| s.applied));
    }

    #[test]
    fn test_already_cheap_item_gets_no_suggestion() {
        let cheap = vec![EstimateItem::new("Штукатурка стен", "м²", 10.0, 280.0)];
        let result = optimize(&cheap, &OptimizeOptions::default());
        assert!(result.suggestions.is_empty());
        assert_eq!(result.savings, 0.0);
    }
}
