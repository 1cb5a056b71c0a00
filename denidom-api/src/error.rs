//! Error types for denidom-api
//!
//! Every failure leaves the service as
//! `{"error": {"code": ..., "message": ..., "details"?: [...]}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use denidom_core::CoreError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// One rejected request field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body failed field validation (400)
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        details: Vec<FieldError>,
    },

    /// Malformed request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or invalid bearer token, wrong credentials (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found or owned by someone else (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Conflict (409), e.g. email already registered
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Common error: {0}")]
    Common(#[from] denidom_common::Error),
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let field = field.into();
        let message = message.into();
        ApiError::Validation {
            message: format!("{}: {}", field, message),
            details: vec![FieldError { field, message }],
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Common(denidom_common::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Common(denidom_common::Error::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) | ApiError::Database(_) | ApiError::Common(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Common(denidom_common::Error::NotFound(_)) => "NOT_FOUND",
            ApiError::Common(denidom_common::Error::InvalidInput(_)) => "BAD_REQUEST",
            ApiError::Internal(_) | ApiError::Database(_) | ApiError::Common(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { field, message } => ApiError::validation(field, message),
            CoreError::NotFound(what) => ApiError::NotFound(what),
            CoreError::Parse(msg) | CoreError::InsufficientData(msg) => ApiError::BadRequest(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        let fields: Vec<&str> = details.iter().map(|d| d.field.as_str()).collect();
        ApiError::Validation {
            message: format!("Invalid fields: {}", fields.join(", ")),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            match &self {
                ApiError::Validation { message, .. }
                | ApiError::BadRequest(message)
                | ApiError::Unauthorized(message)
                | ApiError::NotFound(message)
                | ApiError::Conflict(message) => message.clone(),
                other => other.to_string(),
            }
        };

        let mut error = json!({
            "code": code,
            "message": message,
        });
        if let ApiError::Validation { details, .. } = &self {
            error["details"] = json!(details);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
