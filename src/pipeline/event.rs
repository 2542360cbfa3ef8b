//! Storage notification decoding.

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Invalid storage notification: {0}")]
    Invalid(String),

    #[error("Storage notification has no records")]
    NoRecords,
}

/// Storage notification as delivered to `/events`.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageNotification {
    #[serde(rename = "Records", default)]
    pub records: Vec<NotificationRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationRecord {
    pub s3: NotificationEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationEntity {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectRef {
    pub key: String,
}

/// The object one pipeline run processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub bucket: String,
    pub key: String,
}

impl StorageEvent {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn from_json(body: &[u8]) -> Result<Self, EventError> {
        let notification: StorageNotification =
            serde_json::from_slice(body).map_err(|e| EventError::Invalid(e.to_string()))?;
        Self::from_notification(notification)
    }

    /// First record wins. The key is taken verbatim, without URL decoding.
    pub fn from_notification(notification: StorageNotification) -> Result<Self, EventError> {
        let total = notification.records.len();
        let first = notification
            .records
            .into_iter()
            .next()
            .ok_or(EventError::NoRecords)?;

        if total > 1 {
            tracing::warn!(
                ignored = total - 1,
                "Notification carries several records; only the first is processed"
            );
        }

        Ok(Self {
            bucket: first.s3.bucket.name,
            key: first.s3.object.key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(keys: &[&str]) -> Vec<u8> {
        let records: Vec<_> = keys
            .iter()
            .map(|k| {
                serde_json::json!({
                    "eventName": "ObjectCreated:Put",
                    "s3": { "bucket": { "name": "intake" }, "object": { "key": k, "size": 10 } }
                })
            })
            .collect();
        serde_json::to_vec(&serde_json::json!({ "Records": records })).unwrap()
    }

    #[test]
    fn decodes_first_record() {
        let body = notification(&["case-0012345-Spanish-English.pdf"]);
        let event = StorageEvent::from_json(&body).unwrap();
        assert_eq!(event, StorageEvent::new("intake", "case-0012345-Spanish-English.pdf"));
    }

    #[test]
    fn extra_records_are_ignored() {
        let body = notification(&["a-1-B-C.pdf", "b-2-D-E.pdf"]);
        let event = StorageEvent::from_json(&body).unwrap();
        assert_eq!(event.key, "a-1-B-C.pdf");
    }

    #[test]
    fn empty_records_fail() {
        assert!(matches!(
            StorageEvent::from_json(br#"{"Records":[]}"#),
            Err(EventError::NoRecords)
        ));
        assert!(matches!(StorageEvent::from_json(b"{}"), Err(EventError::NoRecords)));
    }

    #[test]
    fn malformed_body_fails() {
        assert!(matches!(
            StorageEvent::from_json(br#"{"Records":[{"s3":{}}]}"#),
            Err(EventError::Invalid(_))
        ));
        assert!(matches!(StorageEvent::from_json(b"not json"), Err(EventError::Invalid(_))));
    }
}
