use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::DeliveryError;
use crate::pipeline::key::strip_extension;
use crate::pipeline::render::TranslatedDocument;

/// View-level sharing for document links.
pub const SHARE_TYPE_VIEWER: &str = "V";

/// Authenticated CRM session. Lives for one run; never cached.
#[derive(Clone, Deserialize)]
pub struct CrmSession {
    pub access_token: String,
    pub instance_url: String,
}

impl std::fmt::Debug for CrmSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrmSession")
            .field("access_token", &"<redacted>")
            .field("instance_url", &self.instance_url)
            .finish()
    }
}

/// New content version body.
#[derive(Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContentUpload {
    pub title: String,
    pub path_on_client: String,
    /// Base64 of the rendered document.
    pub version_data: String,
}

impl ContentUpload {
    /// Title is the translated key without extension; the client-visible
    /// filename is the translated key itself.
    pub fn for_document(translated_key: &str, document: &TranslatedDocument) -> Self {
        Self {
            title: strip_extension(translated_key).to_string(),
            path_on_client: translated_key.to_string(),
            version_data: base64::engine::general_purpose::STANDARD.encode(document.bytes()),
        }
    }
}

impl std::fmt::Debug for ContentUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentUpload")
            .field("title", &self.title)
            .field("path_on_client", &self.path_on_client)
            .field("version_data_len", &self.version_data.len())
            .finish()
    }
}

/// Association of a document with a case record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DocumentLink {
    pub content_document_id: String,
    pub linked_entity_id: String,
    pub share_type: String,
}

impl DocumentLink {
    pub fn viewer(content_document_id: &str, linked_entity_id: &str) -> Self {
        Self {
            content_document_id: content_document_id.to_string(),
            linked_entity_id: linked_entity_id.to_string(),
            share_type: SHARE_TYPE_VIEWER.to_string(),
        }
    }
}

/// Outcome of a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryRecord {
    pub case_id: String,
    pub content_version_id: String,
    pub document_id: String,
    pub link_id: String,
}

/// CRM platform abstraction (allows mocking for tests)
pub trait CrmClient: Send + Sync {
    fn authenticate(&self) -> Result<CrmSession, DeliveryError>;

    /// Returns the new content version id.
    fn upload_content_version(
        &self,
        session: &CrmSession,
        upload: &ContentUpload,
    ) -> Result<String, DeliveryError>;

    /// Parent document ids of a content version, as returned by the query.
    fn query_content_document_ids(
        &self,
        session: &CrmSession,
        content_version_id: &str,
    ) -> Result<Vec<String>, DeliveryError>;

    /// Returns the new link id.
    fn create_document_link(
        &self,
        session: &CrmSession,
        link: &DocumentLink,
    ) -> Result<String, DeliveryError>;
}
