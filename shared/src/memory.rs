//! In-memory backends for tests and local runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::ServiceError;
use crate::labels::LabelStore;
use crate::rekognition::LabelDetector;
use crate::s3::ObjectStore;
use crate::types::{DetectedLabel, LabeledImage};

#[derive(Default)]
pub struct MemoryLabelStore {
    records: Mutex<HashMap<String, LabeledImage>>,
    deleted: Mutex<Vec<String>>,
}

impl MemoryLabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, key: &str) -> Option<LabeledImage> {
        lock(&self.records).get(key).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys passed to `delete_labels`, in call order
    pub fn deleted(&self) -> Vec<String> {
        lock(&self.deleted).clone()
    }
}

#[async_trait]
impl LabelStore for MemoryLabelStore {
    async fn put_labels(&self, record: &LabeledImage) -> Result<(), ServiceError> {
        lock(&self.records).insert(record.image.clone(), record.clone());
        Ok(())
    }

    async fn get_labels(&self, key: &str) -> Result<Option<LabeledImage>, ServiceError> {
        Ok(self.record(key))
    }

    async fn delete_labels(&self, key: &str) -> Result<(), ServiceError> {
        lock(&self.records).remove(key);
        lock(&self.deleted).push(key.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub public: bool,
}

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    deleted: Mutex<Vec<(String, String)>>,
    failing_buckets: Mutex<Vec<String>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a private object, as an uploading client would
    pub fn insert(&self, bucket: &str, key: &str, bytes: Vec<u8>) {
        lock(&self.objects).insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                bytes,
                content_type: None,
                public: false,
            },
        );
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        lock(&self.objects)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// (bucket, key) pairs passed to `delete_object`, in call order
    pub fn deleted(&self) -> Vec<(String, String)> {
        lock(&self.deleted).clone()
    }

    /// Make every operation against `bucket` fail
    pub fn fail_bucket(&self, bucket: &str) {
        lock(&self.failing_buckets).push(bucket.to_string());
    }

    fn check(&self, bucket: &str) -> Result<(), ServiceError> {
        if lock(&self.failing_buckets).iter().any(|b| b == bucket) {
            return Err(ServiceError::Storage(format!("bucket {} unavailable", bucket)));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ServiceError> {
        self.check(bucket)?;
        self.object(bucket, key)
            .map(|object| object.bytes)
            .ok_or_else(|| ServiceError::Storage(format!("NoSuchKey: {}/{}", bucket, key)))
    }

    async fn put_public_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ServiceError> {
        self.check(bucket)?;
        lock(&self.objects).insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                bytes,
                content_type: Some(content_type.to_string()),
                public: true,
            },
        );
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ServiceError> {
        lock(&self.deleted).push((bucket.to_string(), key.to_string()));
        self.check(bucket)?;
        lock(&self.objects).remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}

/// Detector answering every image with the same labels
#[derive(Default)]
pub struct StaticDetector {
    labels: Vec<DetectedLabel>,
}

impl StaticDetector {
    pub fn new(labels: Vec<DetectedLabel>) -> Self {
        Self { labels }
    }
}

#[async_trait]
impl LabelDetector for StaticDetector {
    async fn detect_labels(
        &self,
        _bucket: &str,
        _key: &str,
    ) -> Result<Vec<DetectedLabel>, ServiceError> {
        Ok(self.labels.clone())
    }
}

// A poisoned lock only means another test thread panicked mid-write
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
