//! Client CRUD (owner-scoped)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use denidom_common::db::Client;

use crate::db::clients::{self, ClientUpdate, NewClient};
use crate::error::ApiResult;
use crate::extract::{AuthUser, ValidatedJson};
use crate::AppState;

/// GET /api/clients
pub async fn list_clients(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Client>>> {
    Ok(Json(clients::list(&state.db, &user.id).await?))
}

/// POST /api/clients
pub async fn create_client(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(input): ValidatedJson<NewClient>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    let client = clients::create(&state.db, &user.id, &input).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// GET /api/clients/:id
pub async fn get_client(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Client>> {
    Ok(Json(clients::get(&state.db, &user.id, &id).await?))
}

/// PUT /api/clients/:id
pub async fn update_client(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidatedJson(changes): ValidatedJson<ClientUpdate>,
) -> ApiResult<Json<Client>> {
    Ok(Json(clients::update(&state.db, &user.id, &id, &changes).await?))
}

/// DELETE /api/clients/:id
///
/// Projects that referenced the client keep existing without one.
pub async fn delete_client(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    clients::delete(&state.db, &user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
