//! Estimate CRUD
//!
//! Estimates are reached through their project; totals in every response
//! come from the stored items and rates.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use denidom_common::db::load_calculator_defaults;

use crate::db::estimates::{self, Estimate, EstimateUpdate, NewEstimate};
use crate::error::ApiResult;
use crate::extract::{AuthUser, ValidatedJson};
use crate::AppState;

/// GET /api/projects/:id/estimates
pub async fn list_estimates(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Vec<Estimate>>> {
    Ok(Json(
        estimates::list_for_project(&state.db, &user.id, &project_id).await?,
    ))
}

/// POST /api/projects/:id/estimates
///
/// Rates missing from the body come from the settings table.
pub async fn create_estimate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(project_id): Path<String>,
    ValidatedJson(input): ValidatedJson<NewEstimate>,
) -> ApiResult<(StatusCode, Json<Estimate>)> {
    let defaults = load_calculator_defaults(&state.db).await?;
    let estimate = estimates::create(&state.db, &user.id, &project_id, &input, &defaults).await?;
    Ok((StatusCode::CREATED, Json(estimate)))
}

/// GET /api/estimates/:id
pub async fn get_estimate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Estimate>> {
    Ok(Json(estimates::get(&state.db, &user.id, &id).await?))
}

/// PUT /api/estimates/:id
pub async fn update_estimate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidatedJson(changes): ValidatedJson<EstimateUpdate>,
) -> ApiResult<Json<Estimate>> {
    Ok(Json(estimates::update(&state.db, &user.id, &id, &changes).await?))
}

/// DELETE /api/estimates/:id
pub async fn delete_estimate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    estimates::delete(&state.db, &user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
