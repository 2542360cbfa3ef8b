//! Object key codec.
//!
//! Routing metadata is encoded in the uploaded object's name:
//! `<prefix>-<caseId>-<sourceLanguage>-<targetLanguage>.<ext>`.

use serde::Serialize;
use thiserror::Error;

use super::language::{LanguageError, LanguagePair};

/// Marker prepended to a source key to name its translated counterpart.
pub const DEFAULT_TRANSLATED_PREFIX: &str = "translated-";

const TOKEN_COUNT: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Malformed object key '{key}': {reason}")]
    Malformed { key: String, reason: &'static str },
}

/// Routing metadata decoded from a source object key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectKey {
    raw: String,
    pub prefix: String,
    pub case_id: String,
    pub source_language: String,
    pub target_language: String,
    pub extension: String,
}

impl ObjectKey {
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        let malformed = |reason| KeyError::Malformed {
            key: raw.to_string(),
            reason,
        };

        let (stem, extension) = raw
            .rsplit_once('.')
            .ok_or_else(|| malformed("missing file extension"))?;
        if extension.is_empty() {
            return Err(malformed("missing file extension"));
        }

        let tokens: Vec<&str> = stem.split('-').collect();
        if tokens.len() < TOKEN_COUNT {
            return Err(malformed("expected prefix, case id, source and target language"));
        }
        if tokens.len() > TOKEN_COUNT {
            return Err(malformed("too many '-' delimited tokens"));
        }
        if tokens.iter().any(|t| t.is_empty()) {
            return Err(malformed("empty token"));
        }

        Ok(Self {
            raw: raw.to_string(),
            prefix: tokens[0].to_string(),
            case_id: tokens[1].to_string(),
            source_language: tokens[2].to_string(),
            target_language: tokens[3].to_string(),
            extension: extension.to_string(),
        })
    }

    /// The key exactly as received.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Resolve the two language names through the language table.
    pub fn language_pair(&self) -> Result<LanguagePair, LanguageError> {
        LanguagePair::from_names(&self.source_language, &self.target_language)
    }

    /// Key the translated artifact is stored under.
    pub fn translated_key(&self, marker: &str) -> String {
        format!("{marker}{}", self.raw)
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Strip the final extension from a key, if any.
pub fn strip_extension(key: &str) -> &str {
    match key.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => key,
    }
}
