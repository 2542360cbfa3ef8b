//! Shared state for the API layer.

use std::sync::Arc;

use crate::pipeline::processor::TranslationProcessor;
use crate::pipeline::storage::ObjectStore;

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub processor: Arc<TranslationProcessor>,
    /// Same store the processor reads from; intake writes into it.
    pub store: Arc<dyn ObjectStore>,
    pub intake_bucket: String,
}

impl ApiContext {
    pub fn new(
        processor: TranslationProcessor,
        store: Arc<dyn ObjectStore>,
        intake_bucket: &str,
    ) -> Self {
        Self {
            processor: Arc::new(processor),
            store,
            intake_bucket: intake_bucket.to_string(),
        }
    }
}
