//! Custom error types for the broadcasts service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::UpstreamError;
use serde_json::json;
use thiserror::Error;

/// Custom error type for the broadcasts service
#[derive(Error, Debug)]
pub enum ApiError {
    /// The broadcast listing could not be fetched
    #[error("Failed to fetch broadcasts: {0}")]
    Upstream(#[from] UpstreamError),

    /// The response could not be serialized
    #[error("Failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A user profile could not be fetched
    #[error("Failed to fetch profile: {0}")]
    Profile(#[source] UpstreamError),

    /// A user stream could not be fetched
    #[error("Failed to fetch stream info: {0}")]
    StreamInfo(#[source] UpstreamError),

    /// The user is not among the live broadcasts
    #[error("User not found in broadcasts: {0}")]
    UserNotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Upstream(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to fetch broadcasts", "details": e.to_string() }),
            ),
            ApiError::Serialization(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to fetch broadcasts", "details": e.to_string() }),
            ),
            ApiError::Profile(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to fetch profile", "details": e.to_string() }),
            ),
            ApiError::StreamInfo(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to fetch stream info", "details": e.to_string() }),
            ),
            ApiError::UserNotFound(user) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "User not found in broadcasts", "user": user }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
