//! API errors. Callers only ever see a fixed message; detail goes to the log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Error response body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("Intake save failed: {0}")]
    SaveFailed(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::ProcessingFailed(detail) => {
                tracing::error!(detail, "Event processing failed");
                "Error processing file"
            }
            ApiError::SaveFailed(detail) => {
                tracing::error!(detail, "Intake save failed");
                "Failed to save file"
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                "An internal error occurred"
            }
        };

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody { error: message }),
        )
            .into_response()
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("blocking task failed: {err}"))
    }
}
