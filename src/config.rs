use std::path::PathBuf;
use std::sync::Arc;

use crate::pipeline::delivery::{
    DeliveryError, SalesforceClient, SalesforceCredentials, DEFAULT_API_VERSION,
    DEFAULT_LOGIN_URL,
};
use crate::pipeline::extraction::{ExtractionError, HttpOcrEngine};
use crate::pipeline::key::DEFAULT_TRANSLATED_PREFIX;
use crate::pipeline::processor::{PipelineSettings, TranslationProcessor};
use crate::pipeline::storage::{HttpObjectStore, ObjectStore, StorageError};
use crate::pipeline::translation::{HttpTranslationService, TranslationError, Translator};

/// Application-level constants
pub const APP_NAME: &str = "case-translator";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "warn,case_translator=info"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read font {path}: {source}")]
    Font {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Process-wide configuration, read once at startup from flags or the
/// environment.
#[derive(Clone, clap::Args)]
pub struct Config {
    /// Bucket uploads land in.
    #[arg(long, env = "INTAKE_BUCKET_NAME")]
    pub intake_bucket: String,

    /// Bucket translated documents are written to.
    #[arg(long, env = "TRANSLATION_BUCKET_NAME")]
    pub translation_bucket: String,

    #[arg(long, env = "TRANSLATED_KEY_PREFIX", default_value = DEFAULT_TRANSLATED_PREFIX)]
    pub translated_prefix: String,

    #[arg(long, env = "STORAGE_ENDPOINT")]
    pub storage_endpoint: String,

    #[arg(long, env = "STORAGE_TOKEN", hide_env_values = true)]
    pub storage_token: Option<String>,

    #[arg(long, env = "OCR_ENDPOINT")]
    pub ocr_endpoint: String,

    #[arg(long, env = "TRANSLATE_ENDPOINT")]
    pub translate_endpoint: String,

    /// Let the translation service detect the source language.
    #[arg(long, env = "TRANSLATE_AUTO_DETECT_SOURCE")]
    pub auto_detect_source: bool,

    #[arg(long, env = "SF_LOGIN_URL", default_value = DEFAULT_LOGIN_URL)]
    pub sf_login_url: String,

    #[arg(long, env = "SF_API_VERSION", default_value = DEFAULT_API_VERSION)]
    pub sf_api_version: String,

    #[arg(long, env = "SF_USERNAME")]
    pub sf_username: String,

    #[arg(long, env = "SF_PASSWORD", hide_env_values = true)]
    pub sf_password: String,

    #[arg(long, env = "SF_SECURITY_TOKEN", hide_env_values = true, default_value = "")]
    pub sf_security_token: String,

    #[arg(long, env = "SF_CLIENT_ID")]
    pub sf_client_id: String,

    #[arg(long, env = "SF_CLIENT_SECRET", hide_env_values = true)]
    pub sf_client_secret: String,

    /// TrueType font for rendering. Needed for non-Latin target scripts.
    #[arg(long, env = "RENDER_FONT_PATH")]
    pub render_font_path: Option<PathBuf>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("intake_bucket", &self.intake_bucket)
            .field("translation_bucket", &self.translation_bucket)
            .field("translated_prefix", &self.translated_prefix)
            .field("storage_endpoint", &self.storage_endpoint)
            .field("storage_token", &self.storage_token.as_ref().map(|_| "<redacted>"))
            .field("ocr_endpoint", &self.ocr_endpoint)
            .field("translate_endpoint", &self.translate_endpoint)
            .field("auto_detect_source", &self.auto_detect_source)
            .field("sf_login_url", &self.sf_login_url)
            .field("sf_api_version", &self.sf_api_version)
            .field("sf_username", &self.sf_username)
            .field("sf_client_id", &self.sf_client_id)
            .field("render_font_path", &self.render_font_path)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn salesforce_credentials(&self) -> SalesforceCredentials {
        SalesforceCredentials {
            login_url: self.sf_login_url.clone(),
            api_version: self.sf_api_version.clone(),
            username: self.sf_username.clone(),
            password: self.sf_password.clone(),
            security_token: self.sf_security_token.clone(),
            client_id: self.sf_client_id.clone(),
            client_secret: self.sf_client_secret.clone(),
        }
    }

    pub fn pipeline_settings(&self) -> Result<PipelineSettings, ConfigError> {
        let font = match &self.render_font_path {
            Some(path) => Some(std::fs::read(path).map_err(|source| ConfigError::Font {
                path: path.clone(),
                source,
            })?),
            None => None,
        };
        Ok(PipelineSettings {
            translation_bucket: self.translation_bucket.clone(),
            translated_prefix: self.translated_prefix.clone(),
            font,
        })
    }

    pub fn build_store(&self) -> Result<Arc<dyn ObjectStore>, ConfigError> {
        let store = HttpObjectStore::new(&self.storage_endpoint, self.storage_token.clone())?;
        Ok(Arc::new(store))
    }

    /// Wire production clients into a processor sharing `store`.
    pub fn build_processor(
        &self,
        store: Arc<dyn ObjectStore>,
    ) -> Result<TranslationProcessor, ConfigError> {
        let ocr = HttpOcrEngine::new(&self.ocr_endpoint)?;
        let translator = Translator::new(Box::new(HttpTranslationService::new(
            &self.translate_endpoint,
        )?))
        .with_auto_detect_source(self.auto_detect_source);
        let crm = SalesforceClient::new(self.salesforce_credentials())?;

        tracing::info!(
            translation_bucket = %self.translation_bucket,
            auto_detect_source = self.auto_detect_source,
            custom_font = self.render_font_path.is_some(),
            "Translation processor configured"
        );

        Ok(TranslationProcessor::new(
            Box::new(ocr),
            translator,
            store,
            Box::new(crm),
            self.pipeline_settings()?,
        ))
    }
}
