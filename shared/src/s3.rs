use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client as S3Client;

use crate::error::ServiceError;

/// Object storage across the source and thumbnail buckets
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ServiceError>;

    /// Write an object readable by anyone holding its URL
    async fn put_public_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ServiceError>;

    /// Deleting a missing object is not an error
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ServiceError>;
}

pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ServiceError> {
        let result = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ServiceError::Storage(format!("Failed to get {}/{}: {}", bucket, key, e)))?;

        let body = result
            .body
            .collect()
            .await
            .map_err(|e| ServiceError::Storage(format!("Failed to read {}/{}: {}", bucket, key, e)))?
            .into_bytes();

        Ok(body.to_vec())
    }

    async fn put_public_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ServiceError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| ServiceError::Storage(format!("Failed to upload {}/{}: {}", bucket, key, e)))?;
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ServiceError> {
        // S3 answers 204 for keys that do not exist
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ServiceError::Storage(format!("Failed to delete {}/{}: {}", bucket, key, e)))?;
        Ok(())
    }
}
