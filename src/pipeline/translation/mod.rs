//! Translation stage: one service call per run with the full extracted text.

pub mod client;
pub mod types;

pub use client::*;
pub use types::*;

use thiserror::Error;

use super::language::{LanguageError, LanguagePair};

/// Source code sent when the service should detect the input language.
pub const AUTO_DETECT: &str = "auto";

#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("Invalid language pair: {0}")]
    InvalidLanguagePair(String),

    #[error("Language error: {0}")]
    Language(#[from] LanguageError),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Translation service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Failed to parse translation response: {0}")]
    ResponseParsing(String),

    #[error("Translation failed: {0}")]
    Processing(String),
}

/// Validates a language pair and delegates to a `TranslationService`.
pub struct Translator {
    service: Box<dyn TranslationService>,
    auto_detect_source: bool,
}

impl Translator {
    pub fn new(service: Box<dyn TranslationService>) -> Self {
        Self {
            service,
            auto_detect_source: false,
        }
    }

    /// Send `"auto"` as the source code instead of the pair's source.
    pub fn with_auto_detect_source(mut self, enabled: bool) -> Self {
        self.auto_detect_source = enabled;
        self
    }

    /// Translate `text` for a pair already resolved through the language table.
    ///
    /// Empty text is still sent to the service.
    pub fn translate(&self, text: &str, pair: LanguagePair) -> Result<String, TranslationError> {
        if pair.source == pair.target {
            return Err(TranslationError::InvalidLanguagePair(format!(
                "source and target are both {}",
                pair.source
            )));
        }

        let source_code = if self.auto_detect_source {
            AUTO_DETECT
        } else {
            pair.source.code()
        };
        let request = TranslateRequest {
            source_language_code: source_code,
            target_language_code: pair.target.code(),
            text,
        };

        tracing::info!(
            source = source_code,
            target = pair.target.code(),
            text_len = text.len(),
            "Translating extracted text"
        );
        let translated = self.service.translate_text(&request)?;
        tracing::info!(translated_len = translated.len(), "Translation complete");
        Ok(translated)
    }

    /// Standalone entry point: resolve names through the table, then translate.
    pub fn translate_names(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationError> {
        let pair = LanguagePair::from_names(source, target)?;
        self.translate(text, pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::language::Language;

    fn spanish_to_english() -> LanguagePair {
        LanguagePair::new(Language::Spanish, Language::English)
    }

    #[test]
    fn sends_pair_codes_and_full_text() {
        let service = MockTranslationService::returning("Hello World");
        let translator = Translator::new(Box::new(service.clone()));

        let out = translator.translate("Hola\nMundo\n", spanish_to_english()).unwrap();

        assert_eq!(out, "Hello World");
        let calls = service.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].source_language_code, "es");
        assert_eq!(calls[0].target_language_code, "en");
        assert_eq!(calls[0].text, "Hola\nMundo\n");
    }

    #[test]
    fn auto_detect_replaces_source_code() {
        let service = MockTranslationService::returning("Hello");
        let translator =
            Translator::new(Box::new(service.clone())).with_auto_detect_source(true);

        translator.translate("Hola", spanish_to_english()).unwrap();

        assert_eq!(service.calls()[0].source_language_code, AUTO_DETECT);
        assert_eq!(service.calls()[0].target_language_code, "en");
    }

    #[test]
    fn empty_text_is_passed_through() {
        let service = MockTranslationService::returning("");
        let translator = Translator::new(Box::new(service.clone()));

        let out = translator.translate("", spanish_to_english()).unwrap();

        assert_eq!(out, "");
        assert_eq!(service.calls().len(), 1);
    }

    #[test]
    fn identical_pair_is_rejected_without_a_call() {
        let service = MockTranslationService::returning("unused");
        let translator = Translator::new(Box::new(service.clone()));

        let err = translator
            .translate("Hola", LanguagePair::new(Language::Spanish, Language::Spanish))
            .unwrap_err();

        assert!(matches!(err, TranslationError::InvalidLanguagePair(_)));
        assert!(service.calls().is_empty());
    }

    #[test]
    fn translate_names_revalidates() {
        let service = MockTranslationService::returning("unused");
        let translator = Translator::new(Box::new(service.clone()));

        let err = translator.translate_names("Hola", "Spanish", "Quenya").unwrap_err();

        assert!(matches!(err, TranslationError::Language(_)));
        assert!(service.calls().is_empty());
    }

    #[test]
    fn translate_names_accepts_known_names() {
        let service = MockTranslationService::returning("Bonjour");
        let translator = Translator::new(Box::new(service.clone()));

        let out = translator.translate_names("Hello", "english", "French").unwrap();

        assert_eq!(out, "Bonjour");
        assert_eq!(service.calls()[0].target_language_code, "fr");
    }

    #[test]
    fn service_failure_propagates() {
        let service = MockTranslationService::failing("TextSizeLimitExceeded");
        let translator = Translator::new(Box::new(service));

        let err = translator.translate("Hola", spanish_to_english()).unwrap_err();
        assert!(matches!(err, TranslationError::Processing(_)));
    }
}
