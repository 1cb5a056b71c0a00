//! Estimate line items and lifecycle statuses

use crate::error::{CoreError, Result};
use crate::units::MeasureUnit;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One line of an estimate
///
/// Stored as an element of the estimate's `items` JSON array. `id` is
/// generated when the client omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateItem {
    #[serde(default = "generate_item_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    pub quantity: f64,
    pub price: f64,
    #[serde(default = "default_coefficient")]
    pub coefficient: f64,
    /// Normative code (`ФЕР15-02-016-01`) when priced from a base
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Reference category key (`plaster`, `tile`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

fn generate_item_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn default_coefficient() -> f64 {
    1.0
}

impl EstimateItem {
    pub fn new(name: &str, unit: &str, quantity: f64, price: f64) -> Self {
        Self {
            id: generate_item_id(),
            name: name.to_string(),
            unit: unit.to_string(),
            quantity,
            price,
            coefficient: 1.0,
            code: None,
            category: None,
        }
    }

    pub fn with_coefficient(mut self, coefficient: f64) -> Self {
        self.coefficient = coefficient;
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    /// quantity × price × coefficient, unrounded
    pub fn raw_total(&self) -> f64 {
        self.quantity * self.price * self.coefficient
    }

    pub fn measure_unit(&self) -> MeasureUnit {
        MeasureUnit::from(self.unit.as_str())
    }
}

/// Estimate lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateStatus {
    #[default]
    Draft,
    InProgress,
    OnReview,
    Approved,
    Archived,
}

impl EstimateStatus {
    pub const ALL: [EstimateStatus; 5] = [
        EstimateStatus::Draft,
        EstimateStatus::InProgress,
        EstimateStatus::OnReview,
        EstimateStatus::Approved,
        EstimateStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::OnReview => "on_review",
            Self::Approved => "approved",
            Self::Archived => "archived",
        }
    }

    /// Russian label used in documents
    pub fn label_ru(&self) -> &'static str {
        match self {
            Self::Draft => "Черновик",
            Self::InProgress => "В работе",
            Self::OnReview => "На проверке",
            Self::Approved => "Утверждена",
            Self::Archived => "В архиве",
        }
    }
}

impl fmt::Display for EstimateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstimateStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .find(|status| status.as_str() == s.trim())
            .copied()
            .ok_or_else(|| CoreError::Parse(format!("unknown estimate status '{}'", s)))
    }
}

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Active,
    Completed,
    Archived,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Draft,
        ProjectStatus::Active,
        ProjectStatus::Completed,
        ProjectStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .find(|status| status.as_str() == s.trim())
            .copied()
            .ok_or_else(|| CoreError::Parse(format!("unknown project status '{}'", s)))
    }
}

/// Per-unit cost split of a normative-priced item
///
/// `direct` is the full unit price; the other fields are its parts
/// (labor = ОЗП, machine_operator = ЗПМ).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitCosts {
    pub direct: f64,
    #[serde(default)]
    pub labor: f64,
    #[serde(default)]
    pub machine_operator: f64,
    #[serde(default)]
    pub materials: f64,
    #[serde(default)]
    pub machines: f64,
}

impl UnitCosts {
    pub fn new(direct: f64, labor: f64, machine_operator: f64, materials: f64, machines: f64) -> Self {
        Self {
            direct,
            labor,
            machine_operator,
            materials,
            machines,
        }
    }

    /// Direct cost equals the sum of its parts within a kopeck
    ///
    /// Machine operator wages are part of machine operation cost, so they
    /// are not added separately.
    pub fn is_consistent(&self) -> bool {
        let sum = self.labor + self.materials + self.machines;
        (self.direct - sum).abs() < 0.01
    }
}

/// Line item priced from a normative base (resource mode)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceItem {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    pub quantity: f64,
    pub unit_costs: UnitCosts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_defaults_from_json() {
        let item: EstimateItem =
            serde_json::from_str(r#"{"name":"Штукатурка","unit":"м²","quantity":10,"price":450}"#)
                .unwrap();
        assert_eq!(item.coefficient, 1.0);
        assert!(!item.id.is_empty());
        assert!(item.code.is_none());
        assert_eq!(item.measure_unit(), MeasureUnit::SquareMeter);
    }

    #[test]
    fn test_raw_total() {
        let item = EstimateItem::new("Плитка", "м²", 12.5, 1150.0).with_coefficient(1.2);
        assert!((item.raw_total() - 17_250.0).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_status_round_trip() {
        for status in EstimateStatus::ALL {
            assert_eq!(status.as_str().parse::<EstimateStatus>().unwrap(), status);
        }
        assert_eq!(
            serde_json::to_string(&EstimateStatus::OnReview).unwrap(),
            "\"on_review\""
        );
        assert!("done".parse::<EstimateStatus>().is_err());
        assert_eq!(EstimateStatus::default(), EstimateStatus::Draft);
    }

    #[test]
    fn test_project_status_parse() {
        assert_eq!("active".parse::<ProjectStatus>().unwrap(), ProjectStatus::Active);
        assert!("paused".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn test_unit_costs_consistency() {
        assert!(UnitCosts::new(1000.0, 300.0, 50.0, 500.0, 200.0).is_consistent());
        assert!(!UnitCosts::new(1000.0, 300.0, 50.0, 500.0, 100.0).is_consistent());
    }
}
