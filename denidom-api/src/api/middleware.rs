//! Bearer token authentication
//!
//! Applied to the protected router only; `/health`, auth endpoints, the
//! calculator and reference lookups stay public.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use denidom_common::auth::{verify_token, TokenError};
use tracing::debug;

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::AppState;

/// Verify `Authorization: Bearer <token>` and attach [`AuthUser`]
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Expected a Bearer token".to_string()))?;

    let claims = verify_token(token, &state.jwt_secret).map_err(|e| {
        debug!("Rejected token: {}", e);
        match e {
            TokenError::Expired { .. } => ApiError::Unauthorized("Token expired".to_string()),
            _ => ApiError::Unauthorized("Invalid token".to_string()),
        }
    })?;

    request.extensions_mut().insert(AuthUser {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
    });

    Ok(next.run(request).await)
}
