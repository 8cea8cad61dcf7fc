//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::models::RuleError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (malformed input)
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// Repository error
    Repository(RepositoryError),
}

/// Stable machine-readable code per rule violation.
fn rule_code(rule: &RuleError) -> &'static str {
    match rule {
        RuleError::Overlap { .. } => "SCHEDULE_OVERLAP",
        RuleError::CohortMismatch { .. } => "COHORT_MISMATCH",
        RuleError::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
        RuleError::DuplicateAssignment { .. } => "DUPLICATE_ASSIGNMENT",
        RuleError::Ordering { .. } => "INVALID_ORDERING",
        RuleError::Collision { .. } => "CALENDAR_COLLISION",
        RuleError::Role { .. } => "ROLE_MISMATCH",
        RuleError::Eligibility { .. } => "NOT_ELIGIBLE",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Repository(e) => match e {
                // Rule violations are semantically valid requests the engine refuses.
                RepositoryError::Rule(rule) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ApiError::new(rule_code(&rule), rule.to_string()),
                ),
                RepositoryError::NotFound(msg) => {
                    (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg))
                }
                RepositoryError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
                }
                other => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("REPOSITORY_ERROR", other.to_string()),
                ),
            },
        };

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
