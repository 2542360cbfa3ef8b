//! CRM delivery: authenticate, upload the rendered document as a content
//! version, resolve its parent document, and link that document to the case.

pub mod mock;
pub mod salesforce;
pub mod types;

pub use mock::*;
pub use salesforce::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("CRM authentication failed: {0}")]
    Auth(String),

    #[error("Content version upload failed: {0}")]
    Upload(String),

    #[error("Invalid content version id: {0:?}")]
    InvalidVersionId(String),

    #[error("Content document query failed: {0}")]
    Query(String),

    #[error("No record found for content version {0}")]
    NoRecordForVersion(String),

    #[error("Content version {version_id} resolved to {count} documents")]
    AmbiguousVersion { version_id: String, count: usize },

    #[error("Document link creation failed: {0}")]
    LinkCreation(String),
}

/// Platform record ids are alphanumeric; anything else never reaches a query.
pub fn is_valid_record_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Resolve a content version to its parent document id. Exactly one match is
/// required.
pub fn resolve_document_id(
    client: &dyn CrmClient,
    session: &CrmSession,
    content_version_id: &str,
) -> Result<String, DeliveryError> {
    if !is_valid_record_id(content_version_id) {
        return Err(DeliveryError::InvalidVersionId(content_version_id.to_string()));
    }

    let mut ids = client.query_content_document_ids(session, content_version_id)?;
    match ids.len() {
        0 => Err(DeliveryError::NoRecordForVersion(content_version_id.to_string())),
        1 => Ok(ids.remove(0)),
        count => {
            tracing::error!(
                content_version_id,
                count,
                "Content version resolved to more than one document"
            );
            Err(DeliveryError::AmbiguousVersion {
                version_id: content_version_id.to_string(),
                count,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> CrmSession {
        CrmSession {
            access_token: "token".into(),
            instance_url: "https://crm.local".into(),
        }
    }

    #[test]
    fn single_match_resolves() {
        let client = MockCrmClient::new().with_query_result(vec!["069A".into()]);
        let id = resolve_document_id(&client, &session(), "068A").unwrap();
        assert_eq!(id, "069A");
    }

    #[test]
    fn zero_matches_is_no_record() {
        let client = MockCrmClient::new().with_query_result(vec![]);
        let err = resolve_document_id(&client, &session(), "068A").unwrap_err();
        assert!(matches!(err, DeliveryError::NoRecordForVersion(ref id) if id == "068A"));
        assert_eq!(
            err.to_string(),
            "No record found for content version 068A"
        );
    }

    #[test]
    fn several_matches_is_ambiguous() {
        let client =
            MockCrmClient::new().with_query_result(vec!["069A".into(), "069B".into()]);
        let err = resolve_document_id(&client, &session(), "068A").unwrap_err();
        assert!(matches!(err, DeliveryError::AmbiguousVersion { count: 2, .. }));
    }

    #[test]
    fn non_alphanumeric_version_id_never_queries() {
        let client = MockCrmClient::new();
        let err = resolve_document_id(&client, &session(), "068' OR Id != '").unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidVersionId(_)));
        assert!(client.calls().is_empty());
    }

    #[test]
    fn record_id_validation() {
        assert!(is_valid_record_id("0680900000AbCdE"));
        assert!(!is_valid_record_id(""));
        assert!(!is_valid_record_id("068-1"));
    }
}
