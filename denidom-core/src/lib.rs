//! # DeniDom Core
//!
//! Pure estimating domain shared by the HTTP service and the CLI:
//! - Calculator (line-item totals, overhead, profit, VAT) and resource mode
//! - Estimate types, measurement units, coefficients, normative bases
//! - Reference market tables and the analytics built on them
//! - KS-2 / KS-3 / M-29 CSV documents
//!
//! Nothing here performs I/O.

pub mod analytics;
pub mod calculator;
pub mod coefficients;
pub mod documents;
pub mod error;
pub mod estimate;
pub mod normatives;
pub mod reference;
pub mod units;

pub use calculator::{calculate, item_total, round_to_cents, CalculationResult, CalculatorOptions};
pub use error::{CoreError, Result};
pub use estimate::{EstimateItem, EstimateStatus};
pub use units::MeasureUnit;
