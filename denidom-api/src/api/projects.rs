//! Project CRUD (owner-scoped)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use denidom_common::db::Project;

use crate::db::projects::{self, NewProject, ProjectFilter, ProjectUpdate};
use crate::error::ApiResult;
use crate::extract::{AuthUser, ValidatedJson};
use crate::AppState;

/// GET /api/projects?client_id=&status=
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<ProjectFilter>,
) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(projects::list(&state.db, &user.id, &filter).await?))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(input): ValidatedJson<NewProject>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = projects::create(&state.db, &user.id, &input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Project>> {
    Ok(Json(projects::get(&state.db, &user.id, &id).await?))
}

/// PUT /api/projects/:id
pub async fn update_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidatedJson(changes): ValidatedJson<ProjectUpdate>,
) -> ApiResult<Json<Project>> {
    Ok(Json(projects::update(&state.db, &user.id, &id, &changes).await?))
}

/// DELETE /api/projects/:id
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    projects::delete(&state.db, &user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
