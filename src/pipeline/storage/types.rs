use serde::Serialize;

use super::StorageError;

/// Where a put landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub size: usize,
}

/// Object storage abstraction (allows mocking for tests)
pub trait ObjectStore: Send + Sync {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError>;
}
