//! Estimate calculator
//!
//! Two modes share the rounding rule (every monetary output rounded to
//! cents after the full-precision computation):
//!
//! **Line-item mode** ([`calculate`]):
//! - subtotal = Σ quantity × price × coefficient
//! - overhead = subtotal × overhead_rate
//! - profit = (subtotal + overhead) × profit_rate
//! - vat = (subtotal + overhead + profit) × vat_rate, or 0 when excluded
//! - total = subtotal + overhead + profit + vat
//!
//! **Resource mode** ([`calculate_resource_totals`]): unit cost splits are
//! summed, scaled by the price index, and overhead/profit are charged on the
//! wage fund (ФОТ = labor + machine operator wages).

use crate::error::{CoreError, Result};
use crate::estimate::{EstimateItem, ResourceItem};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculatorOptions {
    #[serde(default = "default_overhead_rate")]
    pub overhead_rate: f64,
    #[serde(default = "default_profit_rate")]
    pub profit_rate: f64,
    #[serde(default = "default_vat_rate")]
    pub vat_rate: f64,
    #[serde(default = "default_include_vat")]
    pub include_vat: bool,
}

fn default_overhead_rate() -> f64 {
    0.12
}

fn default_profit_rate() -> f64 {
    0.08
}

fn default_vat_rate() -> f64 {
    0.20
}

fn default_include_vat() -> bool {
    true
}

impl Default for CalculatorOptions {
    fn default() -> Self {
        Self {
            overhead_rate: default_overhead_rate(),
            profit_rate: default_profit_rate(),
            vat_rate: default_vat_rate(),
            include_vat: default_include_vat(),
        }
    }
}

impl CalculatorOptions {
    /// Rates must be finite and non-negative
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("overhead_rate", self.overhead_rate),
            ("profit_rate", self.profit_rate),
            ("vat_rate", self.vat_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::validation(field, "must be a non-negative number"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CalculationResult {
    pub subtotal: f64,
    pub overhead: f64,
    pub profit: f64,
    pub vat: f64,
    pub total: f64,
    pub items_count: usize,
}

impl CalculationResult {
    /// subtotal + overhead + profit
    pub fn total_without_vat(&self) -> f64 {
        round_to_cents(self.subtotal + self.overhead + self.profit)
    }
}

/// Round half away from zero to two decimals
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounded quantity × price × coefficient
pub fn item_total(quantity: f64, price: f64, coefficient: f64) -> f64 {
    round_to_cents(quantity * price * coefficient)
}

/// Reject negative quantities/prices and non-positive coefficients
///
/// The error names the offending field as `items[i].field`.
pub fn validate_items(items: &[EstimateItem]) -> Result<()> {
    for (i, item) in items.iter().enumerate() {
        if item.name.trim().is_empty() {
            return Err(CoreError::validation(format!("items[{}].name", i), "must not be empty"));
        }
        if !item.quantity.is_finite() || item.quantity < 0.0 {
            return Err(CoreError::validation(
                format!("items[{}].quantity", i),
                "must be a non-negative number",
            ));
        }
        if !item.price.is_finite() || item.price < 0.0 {
            return Err(CoreError::validation(
                format!("items[{}].price", i),
                "must be a non-negative number",
            ));
        }
        if !item.coefficient.is_finite() || item.coefficient <= 0.0 {
            return Err(CoreError::validation(
                format!("items[{}].coefficient", i),
                "must be greater than zero",
            ));
        }
    }
    Ok(())
}

pub fn calculate(items: &[EstimateItem], options: &CalculatorOptions) -> CalculationResult {
    let subtotal: f64 = items.iter().map(EstimateItem::raw_total).sum();
    let overhead = subtotal * options.overhead_rate;
    let profit = (subtotal + overhead) * options.profit_rate;
    let base = subtotal + overhead + profit;
    let vat = if options.include_vat {
        base * options.vat_rate
    } else {
        0.0
    };

    CalculationResult {
        subtotal: round_to_cents(subtotal),
        overhead: round_to_cents(overhead),
        profit: round_to_cents(profit),
        vat: round_to_cents(vat),
        total: round_to_cents(base + vat),
        items_count: items.len(),
    }
}

/// [`validate_items`] and [`CalculatorOptions::validate`], then [`calculate`]
pub fn calculate_checked(
    items: &[EstimateItem],
    options: &CalculatorOptions,
) -> Result<CalculationResult> {
    options.validate()?;
    validate_items(items)?;
    Ok(calculate(items, options))
}

/// Material consumption ratio of a work type (units of material per unit of work)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRatio {
    pub id: String,
    pub ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkMaterials {
    #[serde(default)]
    pub materials: Vec<MaterialRatio>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialQuantity {
    pub id: String,
    pub quantity: f64,
}

/// Material quantities needed for `quantity` units of work
pub fn materials_for_work(work: &WorkMaterials, quantity: f64) -> Vec<MaterialQuantity> {
    work.materials
        .iter()
        .map(|m| MaterialQuantity {
            id: m.id.clone(),
            quantity: round_to_cents(quantity * m.ratio),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSettings {
    #[serde(default = "default_overhead_rate")]
    pub overhead_rate: f64,
    #[serde(default = "default_profit_rate")]
    pub profit_rate: f64,
    #[serde(default = "default_vat_rate")]
    pub vat_rate: f64,
    /// Base-to-current price index
    #[serde(default = "default_index")]
    pub index: f64,
}

fn default_index() -> f64 {
    1.0
}

impl Default for ResourceSettings {
    fn default() -> Self {
        Self {
            overhead_rate: default_overhead_rate(),
            profit_rate: default_profit_rate(),
            vat_rate: default_vat_rate(),
            index: default_index(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceTotals {
    pub direct_costs: f64,
    pub labor_costs: f64,
    pub machine_operator_costs: f64,
    pub material_costs: f64,
    pub machine_costs: f64,
    pub overhead: f64,
    pub profit: f64,
    pub subtotal: f64,
    pub vat: f64,
    pub total: f64,
}

impl ResourceTotals {
    /// Wage fund (ФОТ) the overhead and profit were charged on
    pub fn wage_fund(&self) -> f64 {
        round_to_cents(self.labor_costs + self.machine_operator_costs)
    }
}

pub fn calculate_resource_totals(items: &[ResourceItem], settings: &ResourceSettings) -> ResourceTotals {
    let mut direct = 0.0;
    let mut labor = 0.0;
    let mut machine_operator = 0.0;
    let mut materials = 0.0;
    let mut machines = 0.0;

    for item in items {
        let q = item.quantity;
        direct += q * item.unit_costs.direct;
        labor += q * item.unit_costs.labor;
        machine_operator += q * item.unit_costs.machine_operator;
        materials += q * item.unit_costs.materials;
        machines += q * item.unit_costs.machines;
    }

    let index = settings.index;
    let (direct, labor, machine_operator, materials, machines) = (
        direct * index,
        labor * index,
        machine_operator * index,
        materials * index,
        machines * index,
    );

    let wage_fund = labor + machine_operator;
    let overhead = wage_fund * settings.overhead_rate;
    let profit = wage_fund * settings.profit_rate;
    let subtotal = direct + overhead + profit;
    let vat = subtotal * settings.vat_rate;

    ResourceTotals {
        direct_costs: round_to_cents(direct),
        labor_costs: round_to_cents(labor),
        machine_operator_costs: round_to_cents(machine_operator),
        material_costs: round_to_cents(materials),
        machine_costs: round_to_cents(machines),
        overhead: round_to_cents(overhead),
        profit: round_to_cents(profit),
        subtotal: round_to_cents(subtotal),
        vat: round_to_cents(vat),
        total: round_to_cents(subtotal + vat),
    }
}
