use serde::{Deserialize, Serialize};

use super::TranslationError;

/// Request body for the translation service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TranslateRequest<'a> {
    pub source_language_code: &'a str,
    pub target_language_code: &'a str,
    pub text: &'a str,
}

/// Response body from the translation service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TranslateResponse {
    pub translated_text: String,
}

/// Translation service abstraction (allows mocking for tests)
pub trait TranslationService: Send + Sync {
    fn translate_text(&self, request: &TranslateRequest<'_>) -> Result<String, TranslationError>;
}
