use std::sync::{Arc, Mutex};

use super::types::{ContentUpload, CrmClient, CrmSession, DocumentLink};
use super::DeliveryError;

/// A call observed by `MockCrmClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrmCall {
    Authenticate,
    UploadContentVersion {
        title: String,
        path_on_client: String,
        version_data: String,
    },
    QueryContentDocument {
        content_version_id: String,
    },
    CreateDocumentLink(DocumentLink),
}

/// Which CRM call the mock should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrmFailure {
    Auth,
    Upload,
    Query,
    Link,
}

#[derive(Default)]
struct MockCrmState {
    calls: Vec<CrmCall>,
    next_id: u64,
}

/// In-process CRM double. Every upload creates a fresh version id and every
/// link a fresh link id, so repeated runs stay distinguishable.
#[derive(Clone, Default)]
pub struct MockCrmClient {
    state: Arc<Mutex<MockCrmState>>,
    failure: Option<CrmFailure>,
    query_result: Option<Vec<String>>,
}

impl MockCrmClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(mut self, failure: CrmFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// Fixed document ids returned by every query.
    pub fn with_query_result(mut self, ids: Vec<String>) -> Self {
        self.query_result = Some(ids);
        self
    }

    pub fn calls(&self) -> Vec<CrmCall> {
        self.state
            .lock()
            .map(|s| s.calls.clone())
            .unwrap_or_default()
    }

    pub fn links(&self) -> Vec<DocumentLink> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                CrmCall::CreateDocumentLink(link) => Some(link),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: CrmCall) -> u64 {
        match self.state.lock() {
            Ok(mut state) => {
                state.calls.push(call);
                state.next_id += 1;
                state.next_id
            }
            Err(_) => 0,
        }
    }

    fn fails_at(&self, stage: CrmFailure) -> bool {
        self.failure == Some(stage)
    }
}

/// Document id the mock assigns to a version it created.
fn document_id_for(version_id: &str) -> String {
    format!("069{}", version_id.trim_start_matches("068"))
}

impl CrmClient for MockCrmClient {
    fn authenticate(&self) -> Result<CrmSession, DeliveryError> {
        self.record(CrmCall::Authenticate);
        if self.fails_at(CrmFailure::Auth) {
            return Err(DeliveryError::Auth("400: invalid_grant".into()));
        }
        Ok(CrmSession {
            access_token: "mock-token".into(),
            instance_url: "https://mock.crm.local".into(),
        })
    }

    fn upload_content_version(
        &self,
        _session: &CrmSession,
        upload: &ContentUpload,
    ) -> Result<String, DeliveryError> {
        let n = self.record(CrmCall::UploadContentVersion {
            title: upload.title.clone(),
            path_on_client: upload.path_on_client.clone(),
            version_data: upload.version_data.clone(),
        });
        if self.fails_at(CrmFailure::Upload) {
            return Err(DeliveryError::Upload("400: REQUIRED_FIELD_MISSING".into()));
        }
        Ok(format!("068{n:012}"))
    }

    fn query_content_document_ids(
        &self,
        _session: &CrmSession,
        content_version_id: &str,
    ) -> Result<Vec<String>, DeliveryError> {
        self.record(CrmCall::QueryContentDocument {
            content_version_id: content_version_id.to_string(),
        });
        if self.fails_at(CrmFailure::Query) {
            return Err(DeliveryError::Query("400: MALFORMED_QUERY".into()));
        }
        Ok(self
            .query_result
            .clone()
            .unwrap_or_else(|| vec![document_id_for(content_version_id)]))
    }

    fn create_document_link(
        &self,
        _session: &CrmSession,
        link: &DocumentLink,
    ) -> Result<String, DeliveryError> {
        let n = self.record(CrmCall::CreateDocumentLink(link.clone()));
        if self.fails_at(CrmFailure::Link) {
            return Err(DeliveryError::LinkCreation("400: INVALID_CROSS_REFERENCE_KEY".into()));
        }
        Ok(format!("06A{n:012}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_query_resolves_the_uploaded_version() {
        let client = MockCrmClient::new();
        let session = client.authenticate().unwrap();
        let upload = ContentUpload {
            title: "t".into(),
            path_on_client: "t.pdf".into(),
            version_data: "JVBERg==".into(),
        };
        let version = client.upload_content_version(&session, &upload).unwrap();
        let docs = client.query_content_document_ids(&session, &version).unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].starts_with("069"));
        assert_eq!(client.calls().len(), 3);
    }

    #[test]
    fn ids_are_unique_per_call() {
        let client = MockCrmClient::new();
        let session = client.authenticate().unwrap();
        let link = DocumentLink::viewer("069A", "001");
        let a = client.create_document_link(&session, &link).unwrap();
        let b = client.create_document_link(&session, &link).unwrap();
        assert_ne!(a, b);
        assert_eq!(client.links().len(), 2);
    }

    #[test]
    fn configured_failure_still_records_the_call() {
        let client = MockCrmClient::new().failing_at(CrmFailure::Auth);
        assert!(matches!(client.authenticate(), Err(DeliveryError::Auth(_))));
        assert_eq!(client.calls(), vec![CrmCall::Authenticate]);
    }
}
