//! Translation delivery orchestrator.
//!
//! Drives one run per storage event:
//! key → fetch → OCR → translate → render → store → CRM upload → resolve → link.
//!
//! All external systems are injected as trait objects so the orchestrator is
//! testable with the mock implementations that live next to the real ones.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::pipeline::delivery::{
    resolve_document_id, ContentUpload, CrmClient, DeliveryRecord, DocumentLink,
};
use crate::pipeline::event::StorageEvent;
use crate::pipeline::extraction::{extract_text, OcrEngine};
use crate::pipeline::key::{strip_extension, ObjectKey, DEFAULT_TRANSLATED_PREFIX};
use crate::pipeline::render::{render_document, RenderOptions};
use crate::pipeline::storage::{store_translation, ObjectStore, StoredObject};
use crate::pipeline::translation::Translator;

// ---------------------------------------------------------------------------
// Stages and errors
// ---------------------------------------------------------------------------

/// Run states, in order. A failure is reported against the stage the run
/// was trying to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    KeyParsed,
    Fetched,
    Extracted,
    Translated,
    Rendered,
    Stored,
    Authenticated,
    Uploaded,
    Resolved,
    Linked,
    Completed,
    Failed,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::KeyParsed => "key_parsed",
            Stage::Fetched => "fetched",
            Stage::Extracted => "extracted",
            Stage::Translated => "translated",
            Stage::Rendered => "rendered",
            Stage::Stored => "stored",
            Stage::Authenticated => "authenticated",
            Stage::Uploaded => "uploaded",
            Stage::Resolved => "resolved",
            Stage::Linked => "linked",
            Stage::Completed => "completed",
            Stage::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error taxonomy surfaced by a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MalformedKey,
    UnsupportedLanguage,
    Extraction,
    Translation,
    Render,
    Storage,
    Auth,
    DeliveryUpload,
    LinkResolution,
    LinkCreation,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::MalformedKey => "malformed_key",
            FailureKind::UnsupportedLanguage => "unsupported_language",
            FailureKind::Extraction => "extraction",
            FailureKind::Translation => "translation",
            FailureKind::Render => "render",
            FailureKind::Storage => "storage",
            FailureKind::Auth => "auth",
            FailureKind::DeliveryUpload => "delivery_upload",
            FailureKind::LinkResolution => "link_resolution",
            FailureKind::LinkCreation => "link_creation",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind} error before stage {stage}: {message}")]
pub struct PipelineError {
    pub stage: Stage,
    pub kind: FailureKind,
    pub message: String,
}

impl PipelineError {
    pub fn new(stage: Stage, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind,
            message: message.into(),
        }
    }
}

fn fail<E: std::fmt::Display>(stage: Stage, kind: FailureKind) -> impl FnOnce(E) -> PipelineError {
    move |e| PipelineError::new(stage, kind, e.to_string())
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub source_bucket: String,
    pub source_key: String,
    pub stored: StoredObject,
    pub delivery: DeliveryRecord,
}

/// Caller-facing result of a run. Detail stays in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    Processed,
    Failed,
}

impl PipelineOutcome {
    pub fn of<T, E>(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => PipelineOutcome::Processed,
            Err(_) => PipelineOutcome::Failed,
        }
    }

    pub fn status_code(self) -> u16 {
        match self {
            PipelineOutcome::Processed => 200,
            PipelineOutcome::Failed => 500,
        }
    }

    pub fn body(self) -> serde_json::Value {
        match self {
            PipelineOutcome::Processed => {
                serde_json::json!({ "message": "File processed successfully" })
            }
            PipelineOutcome::Failed => serde_json::json!({ "error": "Error processing file" }),
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Bucket receiving translated artifacts.
    pub translation_bucket: String,
    pub translated_prefix: String,
    /// Font for the rendered document; built-in Helvetica when absent.
    pub font: Option<Vec<u8>>,
}

impl PipelineSettings {
    pub fn new(translation_bucket: &str) -> Self {
        Self {
            translation_bucket: translation_bucket.to_string(),
            translated_prefix: DEFAULT_TRANSLATED_PREFIX.to_string(),
            font: None,
        }
    }
}

/// Runs the translation delivery pipeline for one storage event at a time.
/// Holds no per-run state, so one instance serves concurrent runs.
pub struct TranslationProcessor {
    ocr: Box<dyn OcrEngine>,
    translator: Translator,
    store: Arc<dyn ObjectStore>,
    crm: Box<dyn CrmClient>,
    settings: PipelineSettings,
}

impl TranslationProcessor {
    pub fn new(
        ocr: Box<dyn OcrEngine>,
        translator: Translator,
        store: Arc<dyn ObjectStore>,
        crm: Box<dyn CrmClient>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            ocr,
            translator,
            store,
            crm,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Full run for one event. No compensation: artifacts written before a
    /// failure stay where they are.
    pub fn process(&self, event: &StorageEvent) -> Result<PipelineReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "translation_run",
            %run_id,
            bucket = %event.bucket,
            key = %event.key
        );
        let _guard = span.enter();

        let started_at = Utc::now();
        advance(Stage::Received);

        match self.run(event) {
            Ok((stored, delivery)) => {
                advance(Stage::Completed);
                Ok(PipelineReport {
                    run_id,
                    started_at,
                    finished_at: Utc::now(),
                    source_bucket: event.bucket.clone(),
                    source_key: event.key.clone(),
                    stored,
                    delivery,
                })
            }
            Err(err) => {
                tracing::error!(
                    stage = %err.stage,
                    kind = %err.kind,
                    error = %err.message,
                    "Translation run failed"
                );
                advance(Stage::Failed);
                Err(err)
            }
        }
    }

    fn run(&self, event: &StorageEvent) -> Result<(StoredObject, DeliveryRecord), PipelineError> {
        let key = ObjectKey::parse(&event.key)
            .map_err(fail(Stage::KeyParsed, FailureKind::MalformedKey))?;
        let pair = key
            .language_pair()
            .map_err(fail(Stage::KeyParsed, FailureKind::UnsupportedLanguage))?;
        tracing::info!(
            case_id = %key.case_id,
            source = pair.source.code(),
            target = pair.target.code(),
            "Key decoded"
        );
        advance(Stage::KeyParsed);

        let source = self
            .store
            .get_object(&event.bucket, key.as_str())
            .map_err(fail(Stage::Fetched, FailureKind::Storage))?;
        tracing::info!(size = source.len(), "Source document fetched");
        advance(Stage::Fetched);

        let text = extract_text(self.ocr.as_ref(), &source)
            .map_err(fail(Stage::Extracted, FailureKind::Extraction))?;
        advance(Stage::Extracted);

        let translated = self
            .translator
            .translate(&text, pair)
            .map_err(fail(Stage::Translated, FailureKind::Translation))?;
        advance(Stage::Translated);

        let translated_key = key.translated_key(&self.settings.translated_prefix);
        let options = RenderOptions {
            title: strip_extension(&translated_key).to_string(),
            font: self.settings.font.clone(),
        };
        let document = render_document(&translated, options)
            .map_err(fail(Stage::Rendered, FailureKind::Render))?;
        tracing::info!(size = document.len(), "Document rendered");
        advance(Stage::Rendered);

        let stored = store_translation(
            self.store.as_ref(),
            &self.settings.translation_bucket,
            &translated_key,
            &document,
        )
        .map_err(fail(Stage::Stored, FailureKind::Storage))?;
        advance(Stage::Stored);

        let session = self
            .crm
            .authenticate()
            .map_err(fail(Stage::Authenticated, FailureKind::Auth))?;
        advance(Stage::Authenticated);

        let upload = ContentUpload::for_document(&translated_key, &document);
        let content_version_id = self
            .crm
            .upload_content_version(&session, &upload)
            .map_err(fail(Stage::Uploaded, FailureKind::DeliveryUpload))?;
        tracing::info!(%content_version_id, "Content version uploaded");
        advance(Stage::Uploaded);

        let document_id = resolve_document_id(self.crm.as_ref(), &session, &content_version_id)
            .map_err(fail(Stage::Resolved, FailureKind::LinkResolution))?;
        advance(Stage::Resolved);

        let link = DocumentLink::viewer(&document_id, &key.case_id);
        let link_id = self
            .crm
            .create_document_link(&session, &link)
            .map_err(fail(Stage::Linked, FailureKind::LinkCreation))?;
        tracing::info!(%document_id, %link_id, case_id = %key.case_id, "Document linked to case");
        advance(Stage::Linked);

        Ok((
            stored,
            DeliveryRecord {
                case_id: key.case_id,
                content_version_id,
                document_id,
                link_id,
            },
        ))
    }
}

fn advance(stage: Stage) {
    tracing::info!(stage = %stage, "Stage reached");
}
