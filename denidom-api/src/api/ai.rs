//! AI-assisted flows
//!
//! Both endpoints always answer 200 once the body validates; the `source`
//! field tells whether the model or the heuristics produced the result.

use axum::{extract::State, Json};
use denidom_core::EstimateItem;
use serde::Deserialize;
use validator::Validate;

use crate::ai::{self, CostAdvice, GeneratedEstimate};
use crate::extract::ValidatedJson;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateEstimateRequest {
    #[validate(length(min = 3, max = 2000, message = "must be 3-2000 characters"))]
    pub description: String,
    #[validate(range(min = 0.1, max = 100000.0, message = "must be between 0.1 and 100000"))]
    pub area_m2: Option<f64>,
}

/// POST /api/ai/generate-estimate
pub async fn generate_estimate(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<GenerateEstimateRequest>,
) -> Json<GeneratedEstimate> {
    Json(ai::generate_estimate(state.ai.as_deref(), &req.description, req.area_m2).await)
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdviceRequest {
    #[serde(default)]
    pub items: Vec<EstimateItem>,
}

/// POST /api/ai/advice
pub async fn cost_advice(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<AdviceRequest>,
) -> Json<CostAdvice> {
    Json(ai::cost_advice(state.ai.as_deref(), &req.items).await)
}
