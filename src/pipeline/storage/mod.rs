pub mod http;
pub mod memory;
pub mod types;

pub use http::*;
pub use memory::*;
pub use types::*;

use thiserror::Error;

use crate::pipeline::render::TranslatedDocument;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid storage endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("Storage service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Persist a rendered document with a single put. No retry, no multipart.
///
/// Once this returns `Ok` the artifact is durable, whatever happens later
/// in the run.
pub fn store_translation(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    document: &TranslatedDocument,
) -> Result<StoredObject, StorageError> {
    store.put_object(bucket, key, document.bytes(), document.content_type())?;
    tracing::info!(
        bucket,
        key,
        size = document.len(),
        "Translated document stored"
    );
    Ok(StoredObject {
        bucket: bucket.to_string(),
        key: key.to_string(),
        size: document.len(),
    })
}
