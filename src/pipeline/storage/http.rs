use reqwest::{StatusCode, Url};

use super::types::ObjectStore;
use super::StorageError;

/// Path-style HTTP object store: `{endpoint}/{bucket}/{key}`.
///
/// GET reads an object, PUT writes one with an explicit content type.
/// An optional bearer token is sent with every request.
pub struct HttpObjectStore {
    endpoint: Url,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpObjectStore {
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self, StorageError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| StorageError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        if endpoint.cannot_be_a_base() {
            return Err(StorageError::InvalidEndpoint(endpoint.to_string()));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|e| StorageError::HttpClient(e.to_string()))?;

        Ok(Self {
            endpoint,
            token,
            client,
        })
    }

    fn object_url(&self, bucket: &str, key: &str) -> Result<Url, StorageError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| StorageError::InvalidEndpoint(self.endpoint.to_string()))?
            .pop_if_empty()
            .push(bucket)
            .extend(key.split('/'));
        Ok(url)
    }

    fn authorize(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl ObjectStore for HttpObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let url = self.object_url(bucket, key)?;
        let response = self
            .authorize(self.client.get(url))
            .send()
            .map_err(|e| StorageError::HttpClient(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StorageError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .map_err(|e| StorageError::HttpClient(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        let url = self.object_url(bucket, key)?;
        let response = self
            .authorize(self.client.put(url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body.to_vec())
            .send()
            .map_err(|e| StorageError::HttpClient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StorageError::Service {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
