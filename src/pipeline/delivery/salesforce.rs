use serde::Deserialize;

use super::types::{ContentUpload, CrmClient, CrmSession, DocumentLink};
use super::DeliveryError;

pub const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com";
pub const DEFAULT_API_VERSION: &str = "v59.0";

/// Username-password OAuth credentials for a connected app.
#[derive(Clone)]
pub struct SalesforceCredentials {
    pub login_url: String,
    pub api_version: String,
    pub username: String,
    pub password: String,
    pub security_token: String,
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for SalesforceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesforceCredentials")
            .field("login_url", &self.login_url)
            .field("api_version", &self.api_version)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("security_token", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    instance_url: Option<String>,
}

#[derive(Deserialize)]
struct CreatedRecord {
    id: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    records: Vec<ContentVersionRow>,
}

#[derive(Deserialize)]
struct ContentVersionRow {
    #[serde(rename = "ContentDocumentId")]
    content_document_id: String,
}

/// REST client for the Salesforce content APIs.
pub struct SalesforceClient {
    credentials: SalesforceCredentials,
    client: reqwest::blocking::Client,
}

impl SalesforceClient {
    pub fn new(credentials: SalesforceCredentials) -> Result<Self, DeliveryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|e| DeliveryError::HttpClient(e.to_string()))?;

        Ok(Self {
            credentials,
            client,
        })
    }

    fn data_url(&self, session: &CrmSession, path: &str) -> String {
        format!(
            "{}/services/data/{}/{}",
            session.instance_url.trim_end_matches('/'),
            self.credentials.api_version,
            path
        )
    }

    fn create_record<T: serde::Serialize + ?Sized>(
        &self,
        session: &CrmSession,
        sobject: &str,
        body: &T,
    ) -> Result<String, String> {
        let response = self
            .client
            .post(self.data_url(session, &format!("sobjects/{sobject}")))
            .bearer_auth(&session.access_token)
            .json(body)
            .send()
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(format!("{}: {body}", status.as_u16()));
        }

        let created: CreatedRecord = response.json().map_err(|e| e.to_string())?;
        Ok(created.id)
    }
}

impl CrmClient for SalesforceClient {
    fn authenticate(&self) -> Result<CrmSession, DeliveryError> {
        let creds = &self.credentials;
        let password = format!("{}{}", creds.password, creds.security_token);
        let url = format!(
            "{}/services/oauth2/token",
            creds.login_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(url)
            .form(&[
                ("grant_type", "password"),
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("username", creds.username.as_str()),
                ("password", password.as_str()),
            ])
            .send()
            .map_err(|e| DeliveryError::HttpClient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(DeliveryError::Auth(format!("{}: {body}", status.as_u16())));
        }

        let token: TokenResponse = response
            .json()
            .map_err(|e| DeliveryError::Auth(e.to_string()))?;

        match (token.access_token, token.instance_url) {
            (Some(access_token), Some(instance_url)) => Ok(CrmSession {
                access_token,
                instance_url,
            }),
            _ => Err(DeliveryError::Auth(
                "token response missing access_token or instance_url".into(),
            )),
        }
    }

    fn upload_content_version(
        &self,
        session: &CrmSession,
        upload: &ContentUpload,
    ) -> Result<String, DeliveryError> {
        self.create_record(session, "ContentVersion", upload)
            .map_err(DeliveryError::Upload)
    }

    fn query_content_document_ids(
        &self,
        session: &CrmSession,
        content_version_id: &str,
    ) -> Result<Vec<String>, DeliveryError> {
        let soql = format!(
            "SELECT ContentDocumentId FROM ContentVersion WHERE Id = '{content_version_id}'"
        );
        let response = self
            .client
            .get(self.data_url(session, "query"))
            .bearer_auth(&session.access_token)
            .query(&[("q", soql.as_str())])
            .send()
            .map_err(|e| DeliveryError::HttpClient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(DeliveryError::Query(format!("{}: {body}", status.as_u16())));
        }

        let parsed: QueryResponse = response
            .json()
            .map_err(|e| DeliveryError::Query(e.to_string()))?;

        Ok(parsed
            .records
            .into_iter()
            .map(|row| row.content_document_id)
            .collect())
    }

    fn create_document_link(
        &self,
        session: &CrmSession,
        link: &DocumentLink,
    ) -> Result<String, DeliveryError> {
        self.create_record(session, "ContentDocumentLink", link)
            .map_err(DeliveryError::LinkCreation)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Form, Json, Router};

    use super::*;
    use crate::test_support::spawn_stub;

    fn credentials(login_url: &str) -> SalesforceCredentials {
        SalesforceCredentials {
            login_url: login_url.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            username: "ops@example.com".into(),
            password: "hunter2".into(),
            security_token: "TOKEN".into(),
            client_id: "cid".into(),
            client_secret: "csecret".into(),
        }
    }

    #[derive(Default)]
    struct Seen {
        form: HashMap<String, String>,
        soql: Option<String>,
        bodies: Vec<(String, serde_json::Value)>,
        auth: Vec<String>,
    }

    type Shared = Arc<Mutex<Seen>>;

    fn record_auth(seen: &Shared, headers: &HeaderMap) {
        if let Some(v) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
            seen.lock().unwrap().auth.push(v.to_string());
        }
    }

    /// Stub org. The instance url in the token response is filled in by the
    /// test once the listener address is known.
    fn org_router(
        seen: Shared,
        instance: Arc<Mutex<String>>,
        documents: Vec<&'static str>,
    ) -> Router {
        let token = {
            let seen = seen.clone();
            move |Form(form): Form<HashMap<String, String>>| {
                let seen = seen.clone();
                let instance = instance.clone();
                async move {
                    seen.lock().unwrap().form = form;
                    let url = instance.lock().unwrap().clone();
                    Json(serde_json::json!({
                        "access_token": "00Dxx!session",
                        "instance_url": url,
                        "token_type": "Bearer"
                    }))
                }
            }
        };

        async fn version(
            State(seen): State<Shared>,
            headers: HeaderMap,
            Json(body): Json<serde_json::Value>,
        ) -> impl IntoResponse {
            record_auth(&seen, &headers);
            seen.lock().unwrap().bodies.push(("ContentVersion".into(), body));
            (
                StatusCode::CREATED,
                Json(serde_json::json!({ "id": "0680900000AbCdE", "success": true })),
            )
        }

        async fn link(
            State(seen): State<Shared>,
            headers: HeaderMap,
            Json(body): Json<serde_json::Value>,
        ) -> impl IntoResponse {
            record_auth(&seen, &headers);
            if body["LinkedEntityId"] == "bad" {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!([{ "errorCode": "INVALID_CROSS_REFERENCE_KEY" }])),
                );
            }
            seen.lock().unwrap().bodies.push(("ContentDocumentLink".into(), body));
            (
                StatusCode::CREATED,
                Json(serde_json::json!({ "id": "06A0900000XyZ", "success": true })),
            )
        }

        let query = {
            let seen = seen.clone();
            move |headers: HeaderMap, Query(params): Query<HashMap<String, String>>| {
                let seen = seen.clone();
                let documents = documents.clone();
                async move {
                    record_auth(&seen, &headers);
                    seen.lock().unwrap().soql = params.get("q").cloned();
                    let records: Vec<_> = documents
                        .iter()
                        .map(|id| serde_json::json!({ "ContentDocumentId": id }))
                        .collect();
                    Json(serde_json::json!({
                        "totalSize": records.len(),
                        "done": true,
                        "records": records
                    }))
                }
            }
        };

        Router::new()
            .route("/services/oauth2/token", post(token))
            .route("/services/data/v59.0/sobjects/ContentVersion", post(version))
            .route("/services/data/v59.0/sobjects/ContentDocumentLink", post(link))
            .route("/services/data/v59.0/query", get(query))
            .with_state(seen)
    }

    async fn spawn_org(documents: Vec<&'static str>) -> (String, Shared) {
        let seen: Shared = Arc::default();
        let instance = Arc::new(Mutex::new(String::new()));
        let base = spawn_stub(org_router(seen.clone(), instance.clone(), documents)).await;
        *instance.lock().unwrap() = base.clone();
        (base, seen)
    }

    #[tokio::test]
    async fn full_delivery_round_trip_against_stub_org() {
        let (base, seen) = spawn_org(vec!["0690900000QrStU"]).await;

        let (version, documents, link_id) = tokio::task::spawn_blocking(
            move || -> Result<(String, Vec<String>, String), DeliveryError> {
                let client = SalesforceClient::new(credentials(&base))?;
                let session = client.authenticate()?;
                let upload = ContentUpload {
                    title: "translated-case-0012345-Spanish-English".into(),
                    path_on_client: "translated-case-0012345-Spanish-English.pdf".into(),
                    version_data: "JVBERi0xLjQ=".into(),
                };
                let version = client.upload_content_version(&session, &upload)?;
                let documents = client.query_content_document_ids(&session, &version)?;
                let link = DocumentLink::viewer(&documents[0], "0012345");
                let link_id = client.create_document_link(&session, &link)?;
                Ok((version, documents, link_id))
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(version, "0680900000AbCdE");
        assert_eq!(documents, vec!["0690900000QrStU".to_string()]);
        assert_eq!(link_id, "06A0900000XyZ");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.form["grant_type"], "password");
        assert_eq!(seen.form["password"], "hunter2TOKEN");
        assert_eq!(seen.form["client_id"], "cid");
        assert_eq!(
            seen.soql.as_deref(),
            Some("SELECT ContentDocumentId FROM ContentVersion WHERE Id = '0680900000AbCdE'")
        );
        assert!(seen.auth.iter().all(|a| a == "Bearer 00Dxx!session"));
        assert_eq!(seen.auth.len(), 3);

        let (kind, body) = &seen.bodies[0];
        assert_eq!(kind, "ContentVersion");
        assert_eq!(body["Title"], "translated-case-0012345-Spanish-English");
        assert_eq!(body["PathOnClient"], "translated-case-0012345-Spanish-English.pdf");
        let (kind, body) = &seen.bodies[1];
        assert_eq!(kind, "ContentDocumentLink");
        assert_eq!(body["ShareType"], "V");
        assert_eq!(body["LinkedEntityId"], "0012345");
    }

    #[tokio::test]
    async fn empty_query_returns_no_ids() {
        let (base, _) = spawn_org(vec![]).await;

        let ids = tokio::task::spawn_blocking(move || -> Result<Vec<String>, DeliveryError> {
            let client = SalesforceClient::new(credentials(&base))?;
            let session = client.authenticate()?;
            client.query_content_document_ids(&session, "068A")
        })
        .await
        .unwrap()
        .unwrap();

        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn rejected_link_is_link_creation_error() {
        let (base, _) = spawn_org(vec![]).await;

        let err = tokio::task::spawn_blocking(move || -> Result<String, DeliveryError> {
            let client = SalesforceClient::new(credentials(&base))?;
            let session = client.authenticate()?;
            client.create_document_link(&session, &DocumentLink::viewer("069A", "bad"))
        })
        .await
        .unwrap()
        .unwrap_err();

        match err {
            DeliveryError::LinkCreation(msg) => assert!(msg.starts_with("400")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn token_response_without_instance_is_auth_error() {
        let router = Router::new().route(
            "/services/oauth2/token",
            post(|| async { Json(serde_json::json!({ "access_token": "x" })) }),
        );
        let base = spawn_stub(router).await;

        let err = tokio::task::spawn_blocking(move || -> Result<CrmSession, DeliveryError> {
            SalesforceClient::new(credentials(&base))?.authenticate()
        })
        .await
        .unwrap()
        .unwrap_err();

        assert!(matches!(err, DeliveryError::Auth(_)));
    }

    #[tokio::test]
    async fn rejected_login_is_auth_error() {
        let router = Router::new().route(
            "/services/oauth2/token",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({ "error": "invalid_grant" })),
                )
            }),
        );
        let base = spawn_stub(router).await;

        let err = tokio::task::spawn_blocking(move || -> Result<CrmSession, DeliveryError> {
            SalesforceClient::new(credentials(&base))?.authenticate()
        })
        .await
        .unwrap()
        .unwrap_err();

        match err {
            DeliveryError::Auth(msg) => assert!(msg.contains("invalid_grant")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn credentials_debug_hides_secrets() {
        let debug = format!("{:?}", credentials("https://login.example.com"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("csecret"));
        assert!(!debug.contains("TOKEN"));
    }
}
