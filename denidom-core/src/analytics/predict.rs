//! Price prediction from quarterly history
//!
//! A least-squares line through the category's quarterly prices is
//! extrapolated `quarters_ahead` steps past the last point, then scaled by
//! the regional coefficient and the month's seasonal factor. The 95%
//! interval is `± 1.96 × residual σ` under the same scaling.

use super::stats;
use crate::calculator::round_to_cents;
use crate::error::{CoreError, Result};
use crate::reference;
use serde::{Deserialize, Serialize};

/// Two-sided 95% normal quantile
const Z_95: f64 = 1.96;

/// Slopes below this share of the mean price count as flat
const STABLE_SLOPE_RATIO: f64 = 0.01;

pub const MAX_QUARTERS_AHEAD: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePrediction {
    pub category: String,
    pub region: Option<String>,
    pub quarters_ahead: u32,
    pub current_price: f64,
    pub predicted_price: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub trend: Trend,
    /// Roubles per quarter, before regional/seasonal scaling
    pub slope: f64,
    pub regional_coefficient: f64,
    pub seasonal_factor: f64,
}

pub fn predict_price(
    category_key: &str,
    region: Option<&str>,
    quarters_ahead: u32,
    month: Option<u32>,
) -> Result<PricePrediction> {
    let category = reference::category(category_key)
        .ok_or_else(|| CoreError::NotFound(format!("category '{}'", category_key)))?;

    if quarters_ahead > MAX_QUARTERS_AHEAD {
        return Err(CoreError::validation(
            "quarters_ahead",
            format!("must be at most {}", MAX_QUARTERS_AHEAD),
        ));
    }

    let seasonal_factor = match month {
        Some(m) => reference::seasonal_factor(m)
            .ok_or_else(|| CoreError::validation("month", "must be between 1 and 12"))?,
        None => 1.0,
    };
    let regional_coefficient = reference::regional_coefficient(region);

    let prices = category.quarterly_prices;
    let xs: Vec<f64> = (0..prices.len()).map(|i| i as f64).collect();
    let regression = stats::linear_regression(&xs, prices).ok_or_else(|| {
        CoreError::InsufficientData(format!("price history of '{}'", category.key))
    })?;

    let x = (prices.len() - 1) as f64 + quarters_ahead as f64;
    let scale = regional_coefficient * seasonal_factor;
    let predicted = regression.predict(x) * scale;
    let margin = Z_95 * regression.residual_std * scale;

    let mean = stats::mean(prices);
    let trend = if regression.slope.abs() < STABLE_SLOPE_RATIO * mean {
        Trend::Stable
    } else if regression.slope > 0.0 {
        Trend::Rising
    } else {
        Trend::Falling
    };

    Ok(PricePrediction {
        category: category.key.to_string(),
        region: region.map(str::to_string),
        quarters_ahead,
        current_price: category.latest_price(),
        predicted_price: round_to_cents(predicted.max(0.0)),
        lower_bound: round_to_cents((predicted - margin).max(0.0)),
        upper_bound: round_to_cents(predicted + margin),
        trend,
        slope: round_to_cents(regression.slope),
        regional_coefficient,
        seasonal_factor,
    })
}
