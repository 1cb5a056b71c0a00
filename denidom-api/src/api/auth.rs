//! Account endpoints
//!
//! Password hashing runs on the blocking pool: ten thousand SHA-256 rounds
//! would otherwise stall the runtime worker.

use axum::{extract::State, http::StatusCode, Extension, Json};
use denidom_common::auth::{hash_password, issue_token, verify_password, Claims};
use denidom_common::db::{User, UserRecord};
use denidom_common::time::unix_seconds;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::db::users;
use crate::error::{ApiError, ApiResult};
use crate::extract::{AuthUser, ValidatedJson};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[validate(length(min = 8, max = 128, message = "must be 8-128 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let password = req.password;
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("password hashing task failed: {}", e)))?;

    let record = users::create_user(&state.db, &req.email, &req.name, &hash).await?;
    info!("Registered user {}", record.id);

    let response = auth_response(&state, record)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login
///
/// Unknown email and wrong password give the same 401.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let record = users::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(invalid)?;

    let password = req.password;
    let (hash, salt) = (record.password_hash.clone(), record.password_salt.clone());
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash, &salt))
        .await
        .map_err(|e| ApiError::Internal(format!("password check task failed: {}", e)))?;

    if !verified {
        return Err(invalid());
    }

    Ok(Json(auth_response(&state, record)?))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<User>> {
    let record = users::find_by_id(&state.db, &user.id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;
    Ok(Json(record.into()))
}

fn auth_response(state: &AppState, record: UserRecord) -> ApiResult<AuthResponse> {
    let claims = Claims::new(
        &record.id,
        &record.email,
        &record.role,
        unix_seconds(),
        state.token_ttl_hours,
    );
    let token = issue_token(&claims, &state.jwt_secret)
        .map_err(|e| ApiError::Internal(format!("token signing failed: {}", e)))?;

    Ok(AuthResponse {
        token,
        user: record.into(),
    })
}
