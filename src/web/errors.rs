//! # Web API Error Types
//!
//! HTTP-facing errors and their response conversions. Service errors map to
//! status codes here so handlers stay `?`-driven.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::error::{CacheError, RepositoryError, ServiceError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,

    #[error("invalid request: {message}")]
    BadRequest { message: String },

    #[error("service temporarily unavailable")]
    ServiceUnavailable,

    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_code, message) = match &self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found"),
            ApiError::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", message.as_str())
            }
            ApiError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "Service temporarily unavailable",
            ),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error",
            ),
        };

        let body = json!({
            "error": {
                "code": error_code,
                "message": message
            }
        });
        (status_code, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Repository(RepositoryError::NotFound { .. }) => ApiError::NotFound,
            ServiceError::Repository(RepositoryError::InvalidSort { field }) => {
                ApiError::bad_request(format!("invalid sort field: {field}"))
            }
            ServiceError::Repository(RepositoryError::Database(_)) => ApiError::Internal,
            ServiceError::Cache(CacheError::NotFound { .. }) => ApiError::NotFound,
            ServiceError::Cache(CacheError::InvalidArgument { message }) => {
                ApiError::bad_request(message)
            }
            ServiceError::Cache(cache_err) if cache_err.is_retryable() => {
                ApiError::ServiceUnavailable
            }
            ServiceError::Cache(_) => ApiError::Internal,
        }
    }
}
