//! `POST /intake`: save a base64-encoded upload into the intake bucket.
//!
//! The stored key is the filename as given, so a correctly named upload
//! (`<prefix>-<caseId>-<source>-<target>.<ext>`) triggers a translation run
//! through the storage notification.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::extraction::DocumentFormat;

#[derive(Deserialize)]
pub struct IntakeRequest {
    pub filename: String,
    /// Base64 file content.
    pub content: String,
}

#[derive(Serialize)]
pub struct IntakeResponse {
    pub message: &'static str,
}

pub async fn save(
    State(ctx): State<ApiContext>,
    body: Bytes,
) -> Result<Json<IntakeResponse>, ApiError> {
    let request: IntakeRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::SaveFailed(format!("Invalid intake body: {e}")))?;

    if request.filename.is_empty() {
        return Err(ApiError::SaveFailed("Empty filename".into()));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(request.content.trim())
        .map_err(|e| ApiError::SaveFailed(format!("Invalid base64 content: {e}")))?;

    let content_type = DocumentFormat::detect(&bytes).mime_type();
    let size = bytes.len();
    let store = ctx.store.clone();
    let bucket = ctx.intake_bucket.clone();
    let key = request.filename;

    tokio::task::spawn_blocking({
        let key = key.clone();
        move || store.put_object(&bucket, &key, &bytes, content_type)
    })
    .await?
    .map_err(|e| ApiError::SaveFailed(e.to_string()))?;

    tracing::info!(%key, size, content_type, "Intake file saved");

    Ok(Json(IntakeResponse {
        message: "File saved successfully",
    }))
}
