use std::sync::{Arc, Mutex};

use super::types::{TranslateRequest, TranslateResponse, TranslationService};
use super::TranslationError;

/// Translation service reached over HTTP (JSON in, JSON out).
pub struct HttpTranslationService {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpTranslationService {
    pub fn new(endpoint: &str) -> Result<Self, TranslationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|e| TranslationError::HttpClient(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl TranslationService for HttpTranslationService {
    fn translate_text(&self, request: &TranslateRequest<'_>) -> Result<String, TranslationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .map_err(|e| TranslationError::HttpClient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TranslationError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranslateResponse = response
            .json()
            .map_err(|e| TranslationError::ResponseParsing(e.to_string()))?;

        Ok(parsed.translated_text)
    }
}

/// Owned copy of a request seen by `MockTranslationService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTranslation {
    pub source_language_code: String,
    pub target_language_code: String,
    pub text: String,
}

/// Mock translation service. Clones share the call log.
#[derive(Clone)]
pub struct MockTranslationService {
    response: Result<String, String>,
    calls: Arc<Mutex<Vec<RecordedTranslation>>>,
}

impl MockTranslationService {
    pub fn returning(translated: &str) -> Self {
        Self {
            response: Ok(translated.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<RecordedTranslation> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl TranslationService for MockTranslationService {
    fn translate_text(&self, request: &TranslateRequest<'_>) -> Result<String, TranslationError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedTranslation {
                source_language_code: request.source_language_code.to_string(),
                target_language_code: request.target_language_code.to_string(),
                text: request.text.to_string(),
            });
        }
        self.response
            .clone()
            .map_err(TranslationError::Processing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_stub;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    #[tokio::test]
    async fn http_service_posts_request_and_reads_translation() {
        let router = Router::new().route(
            "/translate",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["SourceLanguageCode"], "es");
                assert_eq!(body["TargetLanguageCode"], "en");
                assert_eq!(body["Text"], "Hola\nMundo\n");
                Json(serde_json::json!({ "TranslatedText": "Hello World" }))
            }),
        );
        let base = spawn_stub(router).await;

        let translated = tokio::task::spawn_blocking(move || -> Result<String, TranslationError> {
            let service = HttpTranslationService::new(&format!("{base}/translate"))?;
            service.translate_text(&TranslateRequest {
                source_language_code: "es",
                target_language_code: "en",
                text: "Hola\nMundo\n",
            })
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(translated, "Hello World");
    }

    #[tokio::test]
    async fn http_service_maps_error_status() {
        let router = Router::new().route(
            "/translate",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "ThrottlingException") }),
        );
        let base = spawn_stub(router).await;

        let err = tokio::task::spawn_blocking(move || -> Result<String, TranslationError> {
            let service = HttpTranslationService::new(&format!("{base}/translate"))?;
            service.translate_text(&TranslateRequest {
                source_language_code: "auto",
                target_language_code: "en",
                text: "Hola",
            })
        })
        .await
        .unwrap()
        .unwrap_err();

        assert!(matches!(err, TranslationError::Service { status: 429, .. }));
    }

    #[tokio::test]
    async fn http_service_rejects_missing_field() {
        let router = Router::new().route(
            "/translate",
            post(|| async { Json(serde_json::json!({ "Other": "x" })) }),
        );
        let base = spawn_stub(router).await;

        let err = tokio::task::spawn_blocking(move || -> Result<String, TranslationError> {
            let service = HttpTranslationService::new(&format!("{base}/translate"))?;
            service.translate_text(&TranslateRequest {
                source_language_code: "es",
                target_language_code: "en",
                text: "Hola",
            })
        })
        .await
        .unwrap()
        .unwrap_err();

        assert!(matches!(err, TranslationError::ResponseParsing(_)));
    }
}
