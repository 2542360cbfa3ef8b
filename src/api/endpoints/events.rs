//! `POST /events`: storage notification in, one pipeline run out.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::event::StorageEvent;
use crate::pipeline::processor::PipelineOutcome;

/// Decodes the notification, then runs the pipeline on the blocking pool.
/// Any failure, including a bad notification, is the generic 500.
pub async fn receive(
    State(ctx): State<ApiContext>,
    body: Bytes,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let event =
        StorageEvent::from_json(&body).map_err(|e| ApiError::ProcessingFailed(e.to_string()))?;

    let processor = ctx.processor.clone();
    let result = tokio::task::spawn_blocking(move || processor.process(&event)).await?;

    match result {
        Ok(_) => Ok((StatusCode::OK, Json(PipelineOutcome::Processed.body()))),
        Err(e) => Err(ApiError::ProcessingFailed(e.to_string())),
    }
}
