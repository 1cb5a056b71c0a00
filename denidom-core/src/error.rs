//! Error types for the estimating domain

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A line item or option failed validation; `field` names the offender
    #[error("Validation error on '{field}': {message}")]
    Validation { field: String, message: String },

    /// Unknown category, region or other reference key
    #[error("Not found: {0}")]
    NotFound(String),

    /// Text could not be parsed into a domain value
    #[error("Parse error: {0}")]
    Parse(String),

    /// Not enough data points for the requested computation
    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

impl CoreError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
