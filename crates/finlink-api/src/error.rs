//! Error types for the HTTP surface.
//!
//! Every error renders as `{"success": false, "error": "..."}` so clients
//! can branch on `success` alone.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// Error type for the finlink API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request parameters failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested page does not exist.
    #[error("Invalid page.")]
    InvalidPage,

    /// Referenced entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Upstream provider error surfaced on a synchronous call.
    #[error("Provider error: {0}")]
    Provider(#[from] finlink_provider::ProviderError),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Failure body shared by all error responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Human-readable description of the failure.
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::InvalidPage => (StatusCode::NOT_FOUND, "Invalid page.".to_string()),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("Not found: {what}")),
            ApiError::Database(e) => {
                error!(error = %e, "Database error handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Provider(e) => {
                error!(error = %e, error_code = e.error_code(), "Provider error handling request");
                (
                    StatusCode::BAD_GATEWAY,
                    "Upstream provider error".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal error handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}
