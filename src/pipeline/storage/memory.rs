use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::types::ObjectStore;
use super::StorageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// In-process object store for tests and dry runs. Clones share contents.
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<Mutex<HashMap<(String, String), StoredBlob>>>,
    puts: Arc<Mutex<usize>>,
    fail_puts: bool,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every put fails after being counted.
    pub fn with_failing_puts(mut self) -> Self {
        self.fail_puts = true;
        self
    }

    /// Seed an object without counting it as a put.
    pub fn insert(&self, bucket: &str, key: &str, bytes: &[u8]) {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert(
                (bucket.to_string(), key.to_string()),
                StoredBlob {
                    bytes: bytes.to_vec(),
                    content_type: None,
                },
            );
        }
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredBlob> {
        self.objects
            .lock()
            .ok()?
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn put_count(&self) -> usize {
        self.puts.lock().map(|p| *p).unwrap_or_default()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        self.object(bucket, key)
            .map(|blob| blob.bytes)
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        if let Ok(mut puts) = self.puts.lock() {
            *puts += 1;
        }
        if self.fail_puts {
            return Err(StorageError::Backend("put rejected".into()));
        }
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| StorageError::Backend("store lock poisoned".into()))?;
        objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredBlob {
                bytes: body.to_vec(),
                content_type: Some(content_type.to_string()),
            },
        );
        Ok(())
    }
}
