//! Heuristic analytics over the [`crate::reference`] tables
//!
//! Stateless arithmetic only: nothing is learned or persisted.

pub mod anomaly;
pub mod features;
pub mod optimizer;
pub mod predict;
pub mod recommend;
pub mod stats;

pub use anomaly::{detect_anomalies, Anomaly, AnomalyKind, AnomalyReport, Severity};
pub use optimizer::{optimize, OptimizationResult, OptimizeOptions, Suggestion};
pub use predict::{predict_price, PricePrediction, Trend};
pub use recommend::{recommend, Recommendation};
