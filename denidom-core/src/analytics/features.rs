//! Feature vectors for categories and line items
//!
//! Category embedding (length [`EMBEDDING_LEN`]):
//! `[median price / max median, σ/mean, labor intensity, durability, slope/mean]`
//!
//! Item features (length [`ITEM_FEATURES_LEN`]):
//! `[ln(1+price), ln(1+quantity), coefficient, area, volume, piece, other]`

use super::stats;
use crate::estimate::EstimateItem;
use crate::reference::{self, MarketCategory};
use crate::units::UnitClass;
use once_cell::sync::Lazy;

pub const EMBEDDING_LEN: usize = 5;
pub const ITEM_FEATURES_LEN: usize = 7;

static MAX_MEDIAN_PRICE: Lazy<f64> = Lazy::new(|| {
    reference::categories()
        .iter()
        .map(|c| stats::median(c.quarterly_prices))
        .fold(0.0, f64::max)
});

/// Relative quarterly price growth from the regression slope
pub fn trend_slope(category: &MarketCategory) -> f64 {
    let prices = category.quarterly_prices;
    let xs: Vec<f64> = (0..prices.len()).map(|i| i as f64).collect();
    let mean = stats::mean(prices);
    match stats::linear_regression(&xs, prices) {
        Some(reg) if mean > 0.0 => reg.slope / mean,
        _ => 0.0,
    }
}

pub fn category_embedding(category: &MarketCategory) -> [f64; EMBEDDING_LEN] {
    let prices = category.quarterly_prices;
    let median = stats::median(prices);
    let mean = stats::mean(prices);

    let normalized_price = if *MAX_MEDIAN_PRICE > 0.0 {
        median / *MAX_MEDIAN_PRICE
    } else {
        0.0
    };
    let volatility = if mean > 0.0 {
        stats::std_dev(prices) / mean
    } else {
        0.0
    };

    [
        normalized_price,
        volatility,
        category.labor_intensity,
        category.durability,
        trend_slope(category).clamp(-1.0, 1.0),
    ]
}

pub fn item_features(item: &EstimateItem) -> [f64; ITEM_FEATURES_LEN] {
    let one_hot = |class: UnitClass| -> f64 {
        if item.measure_unit().class() == class {
            1.0
        } else {
            0.0
        }
    };

    [
        item.price.max(0.0).ln_1p(),
        item.quantity.max(0.0).ln_1p(),
        item.coefficient,
        one_hot(UnitClass::Area),
        one_hot(UnitClass::Volume),
        one_hot(UnitClass::Piece),
        one_hot(UnitClass::Other),
    ]
}

/// Reference category for a free-text item name
pub fn classify_item(name: &str) -> Option<&'static MarketCategory> {
    reference::classify(name)
}

/// Cosine similarity of two category embeddings
pub fn category_similarity(a: &MarketCategory, b: &MarketCategory) -> f64 {
    stats::cosine_similarity(&category_embedding(a), &category_embedding(b))
}
