//! Anomaly detection for estimate line items
//!
//! Structural checks run on every item; the price check runs only for items
//! that resolve to a reference category. A price is anomalous when it falls
//! outside the category's Tukey fences or deviates more than
//! [`Z_THRESHOLD`] standard deviations from the historical mean.

use super::stats;
use crate::calculator::round_to_cents;
use crate::estimate::EstimateItem;
use crate::reference;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const Z_THRESHOLD: f64 = 2.5;
pub const Z_HIGH_SEVERITY: f64 = 3.0;
pub const COEFFICIENT_RANGE: (f64, f64) = (0.5, 3.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    InvalidPrice,
    InvalidQuantity,
    UnusualCoefficient,
    PriceTooHigh,
    PriceTooLow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Contribution to the risk score
    pub fn weight(&self) -> f64 {
        match self {
            Severity::Low => 0.2,
            Severity::Medium => 0.5,
            Severity::High => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub item_id: String,
    pub item_name: String,
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_range: Option<PriceRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub anomalies: Vec<Anomaly>,
    /// min(1, Σ severity weight / items checked)
    pub risk_score: f64,
    pub items_checked: usize,
}

impl AnomalyReport {
    pub fn has_high_severity(&self) -> bool {
        self.anomalies.iter().any(|a| a.severity == Severity::High)
    }
}

pub fn detect_anomalies(items: &[EstimateItem]) -> AnomalyReport {
    let mut anomalies = Vec::new();

    for item in items {
        check_item(item, &mut anomalies);
    }

    let weight: f64 = anomalies.iter().map(|a| a.severity.weight()).sum();
    let risk_score = if items.is_empty() {
        0.0
    } else {
        round_to_cents((weight / items.len() as f64).min(1.0))
    };

    debug!(
        "Anomaly scan: {} items, {} anomalies, risk {}",
        items.len(),
        anomalies.len(),
        risk_score
    );

    AnomalyReport {
        anomalies,
        risk_score,
        items_checked: items.len(),
    }
}

fn check_item(item: &EstimateItem, out: &mut Vec<Anomaly>) {
    let anomaly = |kind, severity, message: String| Anomaly {
        item_id: item.id.clone(),
        item_name: item.name.clone(),
        kind,
        severity,
        message,
        expected_range: None,
        z_score: None,
    };

    if item.price <= 0.0 {
        out.push(anomaly(
            AnomalyKind::InvalidPrice,
            Severity::High,
            format!("Цена позиции «{}» должна быть больше нуля", item.name),
        ));
    }
    if item.quantity <= 0.0 {
        out.push(anomaly(
            AnomalyKind::InvalidQuantity,
            Severity::High,
            format!("Количество по позиции «{}» должно быть больше нуля", item.name),
        ));
    }
    let (min_k, max_k) = COEFFICIENT_RANGE;
    if item.coefficient < min_k || item.coefficient > max_k {
        out.push(anomaly(
            AnomalyKind::UnusualCoefficient,
            Severity::Medium,
            format!(
                "Коэффициент {} вне обычного диапазона {}–{}",
                item.coefficient, min_k, max_k
            ),
        ));
    }

    if item.price <= 0.0 {
        return;
    }
    let Some(category) = reference::resolve_category(item) else {
        return;
    };

    let prices = category.quarterly_prices;
    let bounds = stats::iqr_bounds(prices);
    let z = stats::z_score(item.price, stats::mean(prices), stats::std_dev(prices));

    if bounds.contains(item.price) && z.abs() <= Z_THRESHOLD {
        return;
    }

    let too_high = item.price > stats::mean(prices);
    let (kind, direction) = if too_high {
        (AnomalyKind::PriceTooHigh, "выше")
    } else {
        (AnomalyKind::PriceTooLow, "ниже")
    };
    let severity = if z.abs() > Z_HIGH_SEVERITY {
        Severity::High
    } else {
        Severity::Medium
    };
    let range = PriceRange {
        min: round_to_cents(bounds.lower.max(0.0)),
        max: round_to_cents(bounds.upper),
    };

    out.push(Anomaly {
        message: format!(
            "Цена {:.2} руб. за {} {} рыночного диапазона {:.2}–{:.2} ({})",
            item.price, category.unit, direction, range.min, range.max, category.name
        ),
        expected_range: Some(range),
        z_score: Some(round_to_cents(z)),
        ..anomaly(kind, severity, String::new())
    });
}
