//! Public calculator and analytics endpoints
//!
//! Nothing here is persisted. `calculate` without options takes the rates
//! from the `settings` table.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use denidom_common::db::load_calculator_defaults;
use denidom_core::analytics::{
    detect_anomalies, optimize, predict_price, recommend, recommend::DEFAULT_TOP_N, AnomalyReport,
    OptimizationResult, OptimizeOptions, PricePrediction, Recommendation,
};
use denidom_core::calculator::{
    calculate_checked, calculate_resource_totals, item_total, materials_for_work, CalculationResult,
    CalculatorOptions, MaterialQuantity, ResourceSettings, ResourceTotals, WorkMaterials,
};
use denidom_core::coefficients::{cramped_conditions, temperature_zones, CrampedCondition, TemperatureZone};
use denidom_core::estimate::ResourceItem;
use denidom_core::EstimateItem;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::extract::ValidatedJson;
use crate::AppState;

pub fn calculator_routes() -> Router<AppState> {
    Router::new()
        .route("/api/calculator/calculate", post(calculate))
        .route("/api/calculator/item-total", post(calculate_item_total))
        .route("/api/calculator/materials", post(calculate_materials))
        .route("/api/calculator/coefficients", get(list_coefficients))
        .route("/api/calculator/anomalies", post(find_anomalies))
        .route("/api/calculator/optimize", post(optimize_estimate))
        .route("/api/calculator/recommendations", post(recommend_items))
        .route("/api/calculator/predict", post(predict))
        .route("/api/calculator/resource-totals", post(resource_totals))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CalculateRequest {
    #[serde(default)]
    pub items: Vec<EstimateItem>,
    pub options: Option<CalculatorOptions>,
}

/// POST /api/calculator/calculate
pub async fn calculate(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CalculateRequest>,
) -> ApiResult<Json<CalculationResult>> {
    let options = match req.options {
        Some(options) => options,
        None => {
            let defaults = load_calculator_defaults(&state.db).await?;
            CalculatorOptions {
                overhead_rate: defaults.overhead_rate,
                profit_rate: defaults.profit_rate,
                vat_rate: defaults.vat_rate,
                include_vat: defaults.include_vat,
            }
        }
    };
    Ok(Json(calculate_checked(&req.items, &options)?))
}

fn default_coefficient() -> f64 {
    1.0
}

#[derive(Debug, Deserialize, Validate)]
pub struct ItemTotalRequest {
    #[validate(range(min = 0.0, message = "must be a non-negative number"))]
    pub quantity: f64,
    #[validate(range(min = 0.0, message = "must be a non-negative number"))]
    pub price: f64,
    #[serde(default = "default_coefficient")]
    pub coefficient: f64,
}

#[derive(Debug, Serialize)]
pub struct ItemTotalResponse {
    pub total: f64,
}

/// POST /api/calculator/item-total
pub async fn calculate_item_total(
    ValidatedJson(req): ValidatedJson<ItemTotalRequest>,
) -> ApiResult<Json<ItemTotalResponse>> {
    if !req.coefficient.is_finite() || req.coefficient <= 0.0 {
        return Err(ApiError::validation("coefficient", "must be greater than zero"));
    }
    Ok(Json(ItemTotalResponse {
        total: item_total(req.quantity, req.price, req.coefficient),
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct MaterialsRequest {
    pub work: WorkMaterials,
    #[validate(range(min = 0.0, message = "must be a non-negative number"))]
    pub quantity: f64,
}

#[derive(Debug, Serialize)]
pub struct MaterialsResponse {
    pub materials: Vec<MaterialQuantity>,
}

/// POST /api/calculator/materials
pub async fn calculate_materials(
    ValidatedJson(req): ValidatedJson<MaterialsRequest>,
) -> ApiResult<Json<MaterialsResponse>> {
    Ok(Json(MaterialsResponse {
        materials: materials_for_work(&req.work, req.quantity),
    }))
}

#[derive(Debug, Serialize)]
pub struct CoefficientsResponse {
    pub cramped_conditions: &'static [CrampedCondition],
    pub temperature_zones: &'static [TemperatureZone],
}

/// GET /api/calculator/coefficients
pub async fn list_coefficients() -> Json<CoefficientsResponse> {
    Json(CoefficientsResponse {
        cramped_conditions: cramped_conditions(),
        temperature_zones: temperature_zones(),
    })
}

#[derive(Debug, Deserialize, Validate)]
pub struct ItemsRequest {
    #[serde(default)]
    pub items: Vec<EstimateItem>,
}

/// POST /api/calculator/anomalies
///
/// Items are not validated first: odd values are what the detector reports.
pub async fn find_anomalies(ValidatedJson(req): ValidatedJson<ItemsRequest>) -> Json<AnomalyReport> {
    Json(detect_anomalies(&req.items))
}

#[derive(Debug, Deserialize, Validate)]
pub struct OptimizeRequest {
    #[serde(default)]
    pub items: Vec<EstimateItem>,
    #[validate(range(min = 0.0, max = 1.0, message = "must be between 0 and 1"))]
    pub min_quality: Option<f64>,
    #[validate(range(min = 0.0, message = "must be a non-negative number"))]
    pub target_budget: Option<f64>,
}

/// POST /api/calculator/optimize
pub async fn optimize_estimate(
    ValidatedJson(req): ValidatedJson<OptimizeRequest>,
) -> Json<OptimizationResult> {
    let mut options = OptimizeOptions::default();
    if let Some(min_quality) = req.min_quality {
        options.min_quality = min_quality;
    }
    options.target_budget = req.target_budget;
    Json(optimize(&req.items, &options))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecommendRequest {
    #[serde(default)]
    pub items: Vec<EstimateItem>,
    #[validate(range(min = 1, max = 20, message = "must be between 1 and 20"))]
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub recommendations: Vec<Recommendation>,
}

/// POST /api/calculator/recommendations
pub async fn recommend_items(
    ValidatedJson(req): ValidatedJson<RecommendRequest>,
) -> Json<RecommendResponse> {
    Json(RecommendResponse {
        recommendations: recommend(&req.items, req.top_n.unwrap_or(DEFAULT_TOP_N)),
    })
}

fn default_quarters() -> u32 {
    1
}

#[derive(Debug, Deserialize, Validate)]
pub struct PredictRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub category: String,
    pub region: Option<String>,
    #[serde(default = "default_quarters")]
    pub quarters_ahead: u32,
    pub month: Option<u32>,
}

/// POST /api/calculator/predict
///
/// Range checks on `quarters_ahead` and `month` live in the predictor.
pub async fn predict(ValidatedJson(req): ValidatedJson<PredictRequest>) -> ApiResult<Json<PricePrediction>> {
    let prediction = predict_price(&req.category, req.region.as_deref(), req.quarters_ahead, req.month)?;
    Ok(Json(prediction))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResourceRequest {
    pub items: Vec<ResourceItem>,
    #[serde(default)]
    pub settings: ResourceSettings,
}

/// POST /api/calculator/resource-totals
pub async fn resource_totals(
    ValidatedJson(req): ValidatedJson<ResourceRequest>,
) -> ApiResult<Json<ResourceTotals>> {
    for (i, item) in req.items.iter().enumerate() {
        if !item.quantity.is_finite() || item.quantity < 0.0 {
            return Err(ApiError::validation(
                format!("items[{}].quantity", i),
                "must be a non-negative number",
            ));
        }
    }
    if !req.settings.index.is_finite() || req.settings.index <= 0.0 {
        return Err(ApiError::validation("settings.index", "must be greater than zero"));
    }
    Ok(Json(calculate_resource_totals(&req.items, &req.settings)))
}
