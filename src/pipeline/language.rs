//! Closed language table: human-readable names → translation service codes.
//!
//! Names arrive as free text embedded in object keys. They are resolved once
//! here and carried as `Language` from then on.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LanguageError {
    #[error("Unsupported language: {0}")]
    Unsupported(String),
}

/// Languages the pipeline can route between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Spanish,
    Japanese,
    French,
    Korean,
    Mandarin,
    Arabic,
    German,
    Italian,
    Portuguese,
    Russian,
    Hindi,
    Vietnamese,
}

impl Language {
    pub const ALL: [Language; 13] = [
        Language::English,
        Language::Spanish,
        Language::Japanese,
        Language::French,
        Language::Korean,
        Language::Mandarin,
        Language::Arabic,
        Language::German,
        Language::Italian,
        Language::Portuguese,
        Language::Russian,
        Language::Hindi,
        Language::Vietnamese,
    ];

    /// Two-letter code understood by the translation service.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::Japanese => "ja",
            Language::French => "fr",
            Language::Korean => "ko",
            Language::Mandarin => "zh",
            Language::Arabic => "ar",
            Language::German => "de",
            Language::Italian => "it",
            Language::Portuguese => "pt",
            Language::Russian => "ru",
            Language::Hindi => "hi",
            Language::Vietnamese => "vi",
        }
    }

    /// Canonical name as it appears in object keys.
    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::Japanese => "Japanese",
            Language::French => "French",
            Language::Korean => "Korean",
            Language::Mandarin => "Mandarin",
            Language::Arabic => "Arabic",
            Language::German => "German",
            Language::Italian => "Italian",
            Language::Portuguese => "Portuguese",
            Language::Russian => "Russian",
            Language::Hindi => "Hindi",
            Language::Vietnamese => "Vietnamese",
        }
    }

    /// Resolve a language name (ASCII case-insensitive).
    pub fn from_name(name: &str) -> Result<Self, LanguageError> {
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| LanguageError::Unsupported(name.to_string()))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated source/target pair for a single translation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguagePair {
    pub source: Language,
    pub target: Language,
}

impl LanguagePair {
    pub fn new(source: Language, target: Language) -> Self {
        Self { source, target }
    }

    /// Resolve both names through the table. The source name is checked first.
    pub fn from_names(source: &str, target: &str) -> Result<Self, LanguageError> {
        Ok(Self {
            source: Language::from_name(source)?,
            target: Language::from_name(target)?,
        })
    }
}
